//! Bottom-up cost estimate for one reactor design.
//!
//! Stages run in a fixed order over both cost columns:
//!
//! 1. inflation normalization of the full chart
//! 2. optional-variable filter; a row left without a parent one level up
//!    is reported and excluded from every roll-up
//! 3. leaf scaling (FOAK)
//! 4. FOAK -> NOAK projection of the leaves
//! 5. base family aggregation, then accounts 31, 32, 75, 82
//! 6. other family aggregation, then OCC and interest (account 62)
//! 7. finance family aggregation, then TCI
//! 8. annual family aggregation, then AC and LCOE
//!
//! Each invocation owns its table and parameters, so designs can be
//! evaluated concurrently with no shared state.

use mrc_core::diagnostics::CATEGORY_HIERARCHY;
use mrc_core::{
    AccountId, AccountRow, ColumnPair, CostColumn, CostReport, DesignParameters, Diagnostics,
    EconomicAssumptions, InflationIndex, LawRegistry, MrcError, MrcResult, PlantFigures,
    ReportRow, SummaryFigures, SummaryKey,
};
use tracing::{info, warn};

use crate::derived;
use crate::filter::filter_irrelevant;
use crate::inflation::{normalize, AdjustedCosts};
use crate::learning::project_leaves;
use crate::levelized::lcoe;
use crate::scaling::scale;
use crate::table::CostTable;
use crate::tree::{AccountFamily, AccountTree};

/// Chart filtered and inflation-adjusted for one design, ready to evaluate.
#[derive(Debug, Clone)]
pub struct PreparedChart {
    pub rows: Vec<AccountRow>,
    /// Parallel to `rows`
    pub adjusted: Vec<AdjustedCosts>,
    pub params: DesignParameters,
    pub economics: EconomicAssumptions,
    pub plant: PlantFigures,
    pub diagnostics: Diagnostics,
}

/// Both cost columns and the summary totals of one evaluation.
#[derive(Debug, Clone)]
pub struct CostEstimate {
    pub table: CostTable,
    pub summary: ColumnPair<SummaryFigures>,
    pub diagnostics: Diagnostics,
    pub escalation_year: i32,
}

impl CostEstimate {
    pub fn value(&self, column: CostColumn, account: &AccountId) -> Option<f64> {
        self.table
            .position(account)
            .and_then(|i| self.table.column(column)[i])
    }

    pub fn lcoe(&self, column: CostColumn) -> f64 {
        self.summary.get(column).lcoe
    }

    /// Chart rows followed by the summary rows.
    pub fn report_rows(&self) -> Vec<ReportRow> {
        let mut rows: Vec<ReportRow> = self
            .table
            .entries()
            .map(|(row, foak, noak)| ReportRow {
                account: row.account.to_string(),
                level: Some(row.level),
                title: row.title.clone(),
                foak,
                noak,
                foak_std: None,
                noak_std: None,
            })
            .collect();
        rows.extend(SummaryKey::ALL.into_iter().map(|key| ReportRow {
            account: key.key().to_string(),
            level: None,
            title: key.title().to_string(),
            foak: Some(self.summary.foak.get(key)),
            noak: Some(self.summary.noak.get(key)),
            foak_std: None,
            noak_std: None,
        }));
        rows
    }

    pub fn into_report(self, params: DesignParameters, design_id: Option<String>) -> CostReport {
        CostReport {
            design_id,
            escalation_year: self.escalation_year,
            samples: None,
            rows: self.report_rows(),
            summary: self.summary,
            summary_std: None,
            parameters: params,
            diagnostics: self.diagnostics,
        }
    }
}

/// Cost engine bound to an inflation index and a law registry.
#[derive(Debug, Clone, Copy)]
pub struct CostEngine<'a> {
    index: &'a InflationIndex,
    laws: &'a LawRegistry,
}

impl<'a> CostEngine<'a> {
    pub fn new(index: &'a InflationIndex, laws: &'a LawRegistry) -> Self {
        Self { index, laws }
    }

    /// Stages 1 and 2: inflation normalization and filtering.
    pub fn prepare(&self, chart: &[AccountRow], params: &DesignParameters) -> MrcResult<PreparedChart> {
        let plant = PlantFigures::from_params(params)?;
        let economics = EconomicAssumptions::from_params(params)?;
        let adjusted = normalize(chart, self.index, plant.escalation_year)?;

        let mut diagnostics = Diagnostics::new();
        let kept = filter_irrelevant(chart, params, &mut diagnostics);
        let rows: Vec<AccountRow> = kept.iter().map(|&i| chart[i].clone()).collect();
        let adjusted: Vec<AdjustedCosts> = kept.iter().map(|&i| adjusted[i]).collect();

        for &i in AccountTree::build(&rows).detached() {
            let row = &rows[i];
            warn!(account = %row.account, level = row.level, "account is not rolled up");
            diagnostics.add_warning_with_entity(
                CATEGORY_HIERARCHY,
                &format!(
                    "level {} account has no parent at level {}; its cost is excluded from the totals",
                    row.level,
                    row.level.saturating_sub(1)
                ),
                row.account.as_str(),
            );
        }

        Ok(PreparedChart {
            rows,
            adjusted,
            params: params.clone(),
            economics,
            plant,
            diagnostics,
        })
    }

    /// Stages 3 to 8 using the prepared chart's own adjusted costs.
    pub fn evaluate(&self, prepared: &PreparedChart) -> MrcResult<CostEstimate> {
        self.evaluate_with(prepared, &prepared.adjusted)
    }

    /// Stages 3 to 8 with substitute adjusted costs (one uncertainty sample).
    pub fn evaluate_with(
        &self,
        prepared: &PreparedChart,
        adjusted: &[AdjustedCosts],
    ) -> MrcResult<CostEstimate> {
        if adjusted.len() != prepared.rows.len() {
            return Err(MrcError::Other(format!(
                "{} adjusted cost entries for {} chart rows",
                adjusted.len(),
                prepared.rows.len()
            )));
        }
        let params = &prepared.params;
        let economics = &prepared.economics;
        let plant = &prepared.plant;
        let mut diagnostics = prepared.diagnostics.clone();
        let mut table = CostTable::new(prepared.rows.clone())?;

        let mut sized = 0usize;
        for (i, (row, costs)) in prepared.rows.iter().zip(adjusted).enumerate() {
            let cost = scale(row, costs, params, self.laws)?;
            sized += cost.is_some() as usize;
            table.column_mut(CostColumn::Foak)[i] = cost;
        }
        info!(sized, "scaled leaf accounts");

        project_leaves(&mut table, params, &mut diagnostics)?;

        let mut summary = ColumnPair::<SummaryFigures>::default();
        for column in CostColumn::BOTH {
            table.aggregate(column, AccountFamily::Base);
            derived::indirect_costs(&mut table, column, economics, plant)?;
        }
        for column in CostColumn::BOTH {
            table.aggregate(column, AccountFamily::Other);
            derived::capital_summary(&mut table, column, economics, plant, summary.get_mut(column))?;
        }
        for column in CostColumn::BOTH {
            table.aggregate(column, AccountFamily::Finance);
            derived::total_capital(&table, column, plant, summary.get_mut(column))?;
        }
        for column in CostColumn::BOTH {
            table.aggregate(column, AccountFamily::Annual);
            let figures = summary.get_mut(column);
            derived::annualized_cost(&table, column, plant, figures)?;
            figures.lcoe = lcoe(
                figures.tci,
                figures.ac,
                economics.interest_rate,
                economics.levelization_period_years,
                plant.power_mwe,
                economics.capacity_factor,
            )?;
            info!(
                column = %column,
                occ = figures.occ,
                tci = figures.tci,
                lcoe = figures.lcoe,
                "computed plant totals"
            );
        }

        Ok(CostEstimate {
            table,
            summary,
            diagnostics,
            escalation_year: plant.escalation_year,
        })
    }

    pub fn estimate(&self, chart: &[AccountRow], params: &DesignParameters) -> MrcResult<CostEstimate> {
        let prepared = self.prepare(chart, params)?;
        self.evaluate(&prepared)
    }
}

/// Run the full pipeline for one design and return its report.
pub fn bottom_up_cost_estimate(
    chart: &[AccountRow],
    index: &InflationIndex,
    params: &DesignParameters,
    laws: &LawRegistry,
) -> MrcResult<CostReport> {
    let estimate = CostEngine::new(index, laws).estimate(chart, params)?;
    Ok(estimate.into_report(params.clone(), None))
}
