//! Published cost-index table used for inflation normalization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MrcError, MrcResult, Stage};

/// Cost indices keyed by calendar year, one named column per index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InflationIndex {
    columns: Vec<String>,
    years: BTreeMap<i32, Vec<Option<f64>>>,
}

impl InflationIndex {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns: columns.into_iter().map(|c| c.trim().to_string()).collect(),
            years: BTreeMap::new(),
        }
    }

    /// Add one year of index values, in column order.
    pub fn insert_year(&mut self, year: i32, values: Vec<Option<f64>>) -> MrcResult<()> {
        if values.len() != self.columns.len() {
            return Err(MrcError::Validation(format!(
                "inflation index year {} has {} values but {} columns",
                year,
                values.len(),
                self.columns.len()
            )));
        }
        if self.years.insert(year, values).is_some() {
            return Err(MrcError::Validation(format!(
                "inflation index year {} appears more than once",
                year
            )));
        }
        Ok(())
    }

    pub fn with_year(mut self, year: i32, values: &[f64]) -> MrcResult<Self> {
        self.insert_year(year, values.iter().copied().map(Some).collect())?;
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    /// Index value for a year and column; absence is a configuration error.
    pub fn value(&self, year: i32, column: &str) -> MrcResult<f64> {
        let col = self
            .columns
            .iter()
            .position(|c| c == column.trim())
            .ok_or_else(|| {
                MrcError::config(
                    Stage::Inflation,
                    format!(
                        "cost index '{}' is not a column of the inflation table (have: {})",
                        column,
                        self.columns.join(", ")
                    ),
                )
            })?;
        let row = self.years.get(&year).ok_or_else(|| {
            MrcError::config(
                Stage::Inflation,
                format!("year {} not found in the inflation table", year),
            )
        })?;
        row[col].ok_or_else(|| {
            MrcError::config(
                Stage::Inflation,
                format!("cost index '{}' has no value for year {}", column, year),
            )
        })
    }
}
