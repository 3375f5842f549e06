//! Chart rows with their FOAK and NOAK estimate columns.

use std::collections::HashMap;

use mrc_core::{AccountId, AccountRow, ColumnPair, CostColumn, MrcError, MrcResult, Stage};

use crate::tree::{aggregate, AccountFamily, AccountTree};

/// Filtered chart plus one independent value column per [`CostColumn`].
#[derive(Debug, Clone)]
pub struct CostTable {
    rows: Vec<AccountRow>,
    tree: AccountTree,
    positions: HashMap<AccountId, usize>,
    columns: ColumnPair<Vec<Option<f64>>>,
}

impl CostTable {
    pub fn new(rows: Vec<AccountRow>) -> MrcResult<Self> {
        let tree = AccountTree::build(&rows);
        let mut positions = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if positions.insert(row.account.clone(), i).is_some() {
                return Err(MrcError::Validation(format!(
                    "account {} appears more than once in the chart",
                    row.account
                )));
            }
        }
        let empty = vec![None; rows.len()];
        Ok(Self {
            rows,
            tree,
            positions,
            columns: ColumnPair::new(empty.clone(), empty),
        })
    }

    pub fn rows(&self) -> &[AccountRow] {
        &self.rows
    }

    pub fn tree(&self) -> &AccountTree {
        &self.tree
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn position(&self, account: &AccountId) -> Option<usize> {
        self.positions.get(account).copied()
    }

    pub fn contains(&self, account: u32) -> bool {
        self.positions.contains_key(&AccountId::from(account))
    }

    pub fn column(&self, column: CostColumn) -> &[Option<f64>] {
        self.columns.get(column)
    }

    pub fn column_mut(&mut self, column: CostColumn) -> &mut [Option<f64>] {
        self.columns.get_mut(column)
    }

    /// Value of a whole-numbered account that a derived formula depends on.
    pub fn value(&self, column: CostColumn, account: u32) -> MrcResult<f64> {
        let id = AccountId::from(account);
        let i = self.position(&id).ok_or_else(|| {
            MrcError::config(
                Stage::Derived,
                format!("account {} is required but not in the chart of accounts", id),
            )
        })?;
        self.column(column)[i].ok_or_else(|| {
            MrcError::config(
                Stage::Derived,
                format!("account {} has no {} yet", id, column.label()),
            )
        })
    }

    /// Set a derived account's value.
    pub fn set(&mut self, column: CostColumn, account: u32, value: f64) -> MrcResult<()> {
        let id = AccountId::from(account);
        let i = self.position(&id).ok_or_else(|| {
            MrcError::config(
                Stage::Derived,
                format!("derived account {} is not in the chart of accounts", id),
            )
        })?;
        self.columns.get_mut(column)[i] = Some(value);
        Ok(())
    }

    pub fn aggregate(&mut self, column: CostColumn, family: AccountFamily) {
        aggregate(&self.tree, &self.rows, self.columns.get_mut(column), family);
    }

    /// Row, FOAK value, NOAK value.
    pub fn entries(&self) -> impl Iterator<Item = (&AccountRow, Option<f64>, Option<f64>)> {
        self.rows
            .iter()
            .zip(self.columns.foak.iter().zip(self.columns.noak.iter()))
            .map(|(row, (f, n))| (row, *f, *n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CostTable {
        CostTable::new(vec![
            AccountRow::new(20, 0, "Direct"),
            AccountRow::new(21, 1, "Structures"),
            AccountRow::new(22, 1, "Reactor"),
        ])
        .unwrap()
    }

    #[test]
    fn test_columns_are_independent() {
        let mut t = table();
        t.set(CostColumn::Foak, 21, 10.0).unwrap();
        t.set(CostColumn::Foak, 22, 5.0).unwrap();
        t.set(CostColumn::Noak, 21, 8.0).unwrap();
        t.set(CostColumn::Noak, 22, 4.0).unwrap();
        t.aggregate(CostColumn::Foak, AccountFamily::Base);
        assert_eq!(t.value(CostColumn::Foak, 20).unwrap(), 15.0);
        assert!(t.value(CostColumn::Noak, 20).is_err());
        t.aggregate(CostColumn::Noak, AccountFamily::Base);
        assert_eq!(t.value(CostColumn::Noak, 20).unwrap(), 12.0);
    }

    #[test]
    fn test_missing_account_is_config_error() {
        let t = table();
        assert!(matches!(
            t.value(CostColumn::Foak, 62),
            Err(MrcError::Config { stage: Stage::Derived, .. })
        ));
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let rows = vec![AccountRow::new(20, 0, "Direct"), AccountRow::new("20.0", 0, "Again")];
        assert!(matches!(CostTable::new(rows), Err(MrcError::Validation(_))));
    }
}
