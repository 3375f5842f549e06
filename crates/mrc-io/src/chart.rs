//! Chart-of-accounts CSV reader.
//!
//! **Expected columns:** Account, Level, Account Title, Fixed Cost, Unit Cost,
//! Dollar Year, Type, Scaling Variable, Scaling Variable Ref Value, Exponent,
//! Standard Cost Equation?, Optional Variable, Optional Value,
//! FOAK to NOAK Multiplier Type. The range columns Fixed Cost Low End,
//! Fixed Cost High End, Unit Cost Low End and Unit Cost High End are optional.
//! Empty cells and `NA` mean "not set".

use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use csv::{ReaderBuilder, Trim};
use mrc_core::{
    AccountId, AccountRow, CostIndexType, CostRange, OptionalGate, ParamValue, ScalingSpec,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct ChartRecord {
    #[serde(rename = "Account")]
    account: String,
    #[serde(rename = "Level")]
    level: String,
    #[serde(rename = "Account Title", default)]
    title: Option<String>,
    #[serde(rename = "Fixed Cost", default)]
    fixed_cost: Option<String>,
    #[serde(rename = "Unit Cost", default)]
    unit_cost: Option<String>,
    #[serde(rename = "Dollar Year", default)]
    dollar_year: Option<String>,
    #[serde(rename = "Type", default)]
    cost_index: Option<String>,
    #[serde(rename = "Scaling Variable", default)]
    scaling_variable: Option<String>,
    #[serde(rename = "Scaling Variable Ref Value", default)]
    reference_value: Option<String>,
    #[serde(rename = "Exponent", default)]
    exponent: Option<String>,
    #[serde(rename = "Standard Cost Equation?", default)]
    standard: Option<String>,
    #[serde(rename = "Optional Variable", default)]
    optional_variable: Option<String>,
    #[serde(rename = "Optional Value", default)]
    optional_value: Option<String>,
    #[serde(rename = "FOAK to NOAK Multiplier Type", default)]
    learning: Option<String>,
    #[serde(rename = "Fixed Cost Low End", default)]
    fixed_low: Option<String>,
    #[serde(rename = "Fixed Cost High End", default)]
    fixed_high: Option<String>,
    #[serde(rename = "Unit Cost Low End", default)]
    unit_low: Option<String>,
    #[serde(rename = "Unit Cost High End", default)]
    unit_high: Option<String>,
}

/// Cell text, or None for empty and `NA`-style placeholders.
fn cell(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !["na", "nan", "n/a", "none"].contains(&v.to_ascii_lowercase().as_str()))
}

fn number(value: &Option<String>, column: &str) -> Result<Option<f64>> {
    match cell(value) {
        None => Ok(None),
        Some(text) => text
            .replace(',', "")
            .parse::<f64>()
            .map(Some)
            .map_err(|_| anyhow!("column '{}' is not a number: '{}'", column, text)),
    }
}

fn flag(value: &Option<String>) -> Result<bool> {
    match cell(value).map(|v| v.to_ascii_lowercase()) {
        None => Ok(true),
        Some(v) if matches!(v.as_str(), "yes" | "y" | "true" | "1" | "1.0") => Ok(true),
        Some(v) if matches!(v.as_str(), "no" | "n" | "false" | "0" | "0.0") => Ok(false),
        Some(v) => Err(anyhow!("'Standard Cost Equation?' must be yes or no, got '{}'", v)),
    }
}

impl ChartRecord {
    fn into_row(self) -> Result<AccountRow> {
        let account = AccountId::new(&self.account);
        if account.as_str().is_empty() {
            bail!("row without an account identifier");
        }
        let level = number(&Some(self.level.clone()), "Level")?
            .ok_or_else(|| anyhow!("account {} has no level", account))?;
        if level < 0.0 || level.fract() != 0.0 {
            bail!("account {} has invalid level {}", account, level);
        }

        let scaling = match cell(&self.scaling_variable) {
            Some(variable) => {
                let exponent = number(&self.exponent, "Exponent")?.ok_or_else(|| {
                    anyhow!(
                        "account {} scales with '{}' but has no exponent",
                        account,
                        variable
                    )
                })?;
                Some(ScalingSpec {
                    variable: variable.to_string(),
                    reference_value: number(&self.reference_value, "Scaling Variable Ref Value")?,
                    exponent,
                })
            }
            None => None,
        };

        let gate = match cell(&self.optional_variable) {
            Some(variable) => {
                let raw = cell(&self.optional_value).ok_or_else(|| {
                    anyhow!(
                        "account {} is gated on '{}' without an optional value",
                        account,
                        variable
                    )
                })?;
                let value = raw
                    .parse::<f64>()
                    .map(ParamValue::Number)
                    .unwrap_or_else(|_| ParamValue::Text(raw.to_string()));
                Some(OptionalGate {
                    variable: variable.to_string(),
                    value,
                })
            }
            None => None,
        };

        let dollar_year = number(&self.dollar_year, "Dollar Year")?.map(|y| y.round() as i32);

        Ok(AccountRow {
            level: level as u32,
            title: cell(&self.title).unwrap_or_default().to_string(),
            fixed_cost: number(&self.fixed_cost, "Fixed Cost")?,
            unit_cost: number(&self.unit_cost, "Unit Cost")?,
            cost_range: CostRange {
                fixed_low: number(&self.fixed_low, "Fixed Cost Low End")?,
                fixed_high: number(&self.fixed_high, "Fixed Cost High End")?,
                unit_low: number(&self.unit_low, "Unit Cost Low End")?,
                unit_high: number(&self.unit_high, "Unit Cost High End")?,
            },
            dollar_year,
            cost_index: CostIndexType::parse(cell(&self.cost_index).unwrap_or("NA")),
            scaling,
            standard_equation: flag(&self.standard)?,
            gate,
            learning: cell(&self.learning).and_then(|tag| tag.parse().ok()),
            account,
        })
    }
}

/// Parse a chart of accounts from any CSV reader.
pub fn parse_chart_of_accounts<R: Read>(reader: R) -> Result<Vec<AccountRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let record: ChartRecord =
            result.with_context(|| format!("parsing chart of accounts record {}", line + 1))?;
        let row = record
            .into_row()
            .with_context(|| format!("chart of accounts record {}", line + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Read a chart of accounts CSV file.
pub fn read_chart_of_accounts(path: impl AsRef<Path>) -> Result<Vec<AccountRow>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening chart of accounts '{}'", path.display()))?;
    let rows = parse_chart_of_accounts(file)
        .with_context(|| format!("reading chart of accounts '{}'", path.display()))?;
    info!(rows = rows.len(), path = %path.display(), "loaded chart of accounts");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrc_core::LearningCategory;

    const CHART: &str = "\
Account,Level,Account Title,Fixed Cost,Unit Cost,Dollar Year,Type,Scaling Variable,Scaling Variable Ref Value,Exponent,Standard Cost Equation?,Optional Variable,Optional Value,FOAK to NOAK Multiplier Type
10,0,Capitalized Pre-Construction Costs,,,,,,,,,,,
11.0,1,Land and Land Rights,,3800,2021,CPI,Land Area,,1,Yes,,,No Learning
222.1,3,Primary Pumps,,120000,2023,NA,Primary Pump Power,,0.6,No,Reactor Type,LTMR,Factory Other
212A,3,Pit Preparation,\"2,573,470\",,2022,NA,,,,,,,Onsite Learning
";

    #[test]
    fn test_parse_rows() {
        let rows = parse_chart_of_accounts(CHART.as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[0].account.as_str(), "10");
        assert!(!rows[0].has_cost_law());
        assert!(rows[0].learning.is_none());

        let land = &rows[1];
        assert_eq!(land.account.as_str(), "11");
        assert_eq!(land.unit_cost, Some(3800.0));
        assert_eq!(land.dollar_year, Some(2021));
        assert_eq!(land.cost_index, CostIndexType::Index("CPI".into()));
        assert_eq!(land.scaling.as_ref().unwrap().variable, "Land Area");
        assert!(land.standard_equation);

        let pump = &rows[2];
        assert!(!pump.standard_equation);
        assert_eq!(pump.cost_index, CostIndexType::NotAdjusted);
        let gate = pump.gate.as_ref().unwrap();
        assert_eq!(gate.variable, "Reactor Type");
        assert_eq!(gate.value, ParamValue::from("LTMR"));
        assert_eq!(pump.learning, Some(LearningCategory::FactoryOther));

        assert_eq!(rows[3].fixed_cost, Some(2_573_470.0));
        assert_eq!(rows[3].cost_range, CostRange::default());
    }

    #[test]
    fn test_range_columns() {
        let csv = "\
Account,Level,Account Title,Fixed Cost,Unit Cost,Dollar Year,Type,Fixed Cost Low End,Fixed Cost High End
13,1,Plant Licensing,60000000,,2023,NA,40000000,90000000
";
        let rows = parse_chart_of_accounts(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].cost_range.fixed(), Some((4.0e7, 9.0e7)));
        assert_eq!(rows[0].cost_range.unit(), None);
    }

    #[test]
    fn test_scaling_without_exponent_rejected() {
        let csv = "\
Account,Level,Account Title,Unit Cost,Dollar Year,Type,Scaling Variable
11,1,Land,3800,2021,NA,Land Area
";
        let err = parse_chart_of_accounts(csv.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("no exponent"));
    }

    #[test]
    fn test_bad_number_names_column() {
        let csv = "\
Account,Level,Account Title,Fixed Cost
11,1,Land,lots
";
        let err = parse_chart_of_accounts(csv.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("Fixed Cost"));
    }
}
