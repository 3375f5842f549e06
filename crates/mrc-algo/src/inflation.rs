//! Inflation normalization of chart-of-accounts costs.
//!
//! Every cost in the chart is quoted in its own dollar year. Before any
//! scaling happens the costs are restated in the design's escalation year
//! using the ratio of index values for the row's cost-index column.

use mrc_core::{AccountRow, CostIndexType, CostRange, InflationIndex, MrcError, MrcResult, Stage};
use tracing::{debug, info};

/// A row's costs restated in escalation-year dollars.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AdjustedCosts {
    /// 0 for rows without any cost
    pub multiplier: f64,
    pub fixed: f64,
    pub unit: f64,
    pub range: CostRange,
}

/// Ratio converting `base_year` dollars into `target_year` dollars.
pub fn multiplier(
    index: &InflationIndex,
    base_year: i32,
    cost_index: &CostIndexType,
    target_year: i32,
) -> MrcResult<f64> {
    match cost_index {
        CostIndexType::NotAdjusted => Ok(1.0),
        CostIndexType::Index(column) => {
            let base = index.value(base_year, column)?;
            let target = index.value(target_year, column)?;
            if target == 0.0 {
                return Err(MrcError::config(
                    Stage::Inflation,
                    format!("cost index '{}' is zero in {}", column, target_year),
                ));
            }
            Ok(base / target)
        }
    }
}

/// Restate every row's fixed, unit and range costs in `target_year` dollars.
///
/// Missing cost fields become 0. Rows with neither a fixed nor a unit cost
/// get multiplier 0.
pub fn normalize(
    rows: &[AccountRow],
    index: &InflationIndex,
    target_year: i32,
) -> MrcResult<Vec<AdjustedCosts>> {
    let mut adjusted = Vec::with_capacity(rows.len());
    for row in rows {
        if !row.has_cost_law() {
            adjusted.push(AdjustedCosts::default());
            continue;
        }
        let factor = match (&row.cost_index, row.dollar_year) {
            (CostIndexType::NotAdjusted, _) => 1.0,
            (kind, Some(year)) => multiplier(index, year, kind, target_year).map_err(|err| {
                MrcError::config(
                    Stage::Inflation,
                    format!("account {}: {}", row.account, strip_config(err)),
                )
            })?,
            (_, None) => {
                return Err(MrcError::config(
                    Stage::Inflation,
                    format!(
                        "account {} has a cost but no dollar year for index '{}'",
                        row.account, row.cost_index
                    ),
                ))
            }
        };
        debug!(account = %row.account, multiplier = factor, "inflation multiplier");
        adjusted.push(AdjustedCosts {
            multiplier: factor,
            fixed: row.fixed_cost.unwrap_or(0.0) * factor,
            unit: row.unit_cost.unwrap_or(0.0) * factor,
            range: row.cost_range.scaled(factor),
        });
    }
    info!(
        rows = rows.len(),
        escalation_year = target_year,
        "normalized costs for inflation"
    );
    Ok(adjusted)
}

fn strip_config(err: MrcError) -> String {
    match err {
        MrcError::Config { message, .. } => message,
        other => other.to_string(),
    }
}
