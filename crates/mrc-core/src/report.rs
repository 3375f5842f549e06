//! Cost report emitted after a design evaluation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::diagnostics::Diagnostics;
use crate::params::DesignParameters;
use crate::CostColumn;

/// Plant-level totals appended after the chart rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SummaryKey {
    Occ,
    OccPerKw,
    OccExclFuel,
    OccExclFuelPerKw,
    Tci,
    TciPerKw,
    Ac,
    AcPerMwh,
    Lcoe,
}

impl SummaryKey {
    pub const ALL: [SummaryKey; 9] = [
        SummaryKey::Occ,
        SummaryKey::OccPerKw,
        SummaryKey::OccExclFuel,
        SummaryKey::OccExclFuelPerKw,
        SummaryKey::Tci,
        SummaryKey::TciPerKw,
        SummaryKey::Ac,
        SummaryKey::AcPerMwh,
        SummaryKey::Lcoe,
    ];

    /// Identifier used in the account column of the report.
    pub fn key(&self) -> &'static str {
        match self {
            SummaryKey::Occ => "OCC",
            SummaryKey::OccPerKw => "OCC per kW",
            SummaryKey::OccExclFuel => "OCC excl. fuel",
            SummaryKey::OccExclFuelPerKw => "OCC excl. fuel per kW",
            SummaryKey::Tci => "TCI",
            SummaryKey::TciPerKw => "TCI per kW",
            SummaryKey::Ac => "AC",
            SummaryKey::AcPerMwh => "AC per MWh",
            SummaryKey::Lcoe => "LCOE",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SummaryKey::Occ => "Overnight Capital Cost",
            SummaryKey::OccPerKw => "Overnight Capital Cost per kW",
            SummaryKey::OccExclFuel => "Overnight Capital Cost Excluding Fuel",
            SummaryKey::OccExclFuelPerKw => "Overnight Capital Cost Excluding Fuel per kW",
            SummaryKey::Tci => "Total Capital Investment",
            SummaryKey::TciPerKw => "Total Capital Investment per kW",
            SummaryKey::Ac => "Annualized Cost",
            SummaryKey::AcPerMwh => "Annualized Cost per MWh",
            SummaryKey::Lcoe => "Levelized Cost Of Energy ($/MWh)",
        }
    }
}

impl fmt::Display for SummaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Summary totals for one cost column.
///
/// An undefined figure is NaN in memory and `null` in JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryFigures {
    #[serde(deserialize_with = "null_as_nan")]
    pub occ: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub occ_per_kw: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub occ_excl_fuel: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub occ_excl_fuel_per_kw: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub tci: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub tci_per_kw: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub ac: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub ac_per_mwh: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub lcoe: f64,
}

fn null_as_nan<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl SummaryFigures {
    pub fn get(&self, key: SummaryKey) -> f64 {
        match key {
            SummaryKey::Occ => self.occ,
            SummaryKey::OccPerKw => self.occ_per_kw,
            SummaryKey::OccExclFuel => self.occ_excl_fuel,
            SummaryKey::OccExclFuelPerKw => self.occ_excl_fuel_per_kw,
            SummaryKey::Tci => self.tci,
            SummaryKey::TciPerKw => self.tci_per_kw,
            SummaryKey::Ac => self.ac,
            SummaryKey::AcPerMwh => self.ac_per_mwh,
            SummaryKey::Lcoe => self.lcoe,
        }
    }

    pub fn set(&mut self, key: SummaryKey, value: f64) {
        let slot = match key {
            SummaryKey::Occ => &mut self.occ,
            SummaryKey::OccPerKw => &mut self.occ_per_kw,
            SummaryKey::OccExclFuel => &mut self.occ_excl_fuel,
            SummaryKey::OccExclFuelPerKw => &mut self.occ_excl_fuel_per_kw,
            SummaryKey::Tci => &mut self.tci,
            SummaryKey::TciPerKw => &mut self.tci_per_kw,
            SummaryKey::Ac => &mut self.ac,
            SummaryKey::AcPerMwh => &mut self.ac_per_mwh,
            SummaryKey::Lcoe => &mut self.lcoe,
        };
        *slot = value;
    }
}

/// A FOAK value and its NOAK counterpart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnPair<T> {
    pub foak: T,
    pub noak: T,
}

impl<T> ColumnPair<T> {
    pub fn new(foak: T, noak: T) -> Self {
        Self { foak, noak }
    }

    pub fn get(&self, column: CostColumn) -> &T {
        match column {
            CostColumn::Foak => &self.foak,
            CostColumn::Noak => &self.noak,
        }
    }

    pub fn get_mut(&mut self, column: CostColumn) -> &mut T {
        match column {
            CostColumn::Foak => &mut self.foak,
            CostColumn::Noak => &mut self.noak,
        }
    }
}

/// One emitted line: a chart account or a synthetic summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub account: String,
    /// None for summary rows
    pub level: Option<u32>,
    pub title: String,
    pub foak: Option<f64>,
    pub noak: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foak_std: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noak_std: Option<f64>,
}

impl ReportRow {
    pub fn value(&self, column: CostColumn) -> Option<f64> {
        match column {
            CostColumn::Foak => self.foak,
            CostColumn::Noak => self.noak,
        }
    }

    pub fn is_summary(&self) -> bool {
        self.level.is_none()
    }
}

/// Final table for one design, plus the parameters it was evaluated with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_id: Option<String>,
    pub escalation_year: i32,
    /// Number of uncertainty samples behind the values, if sampled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<usize>,
    pub rows: Vec<ReportRow>,
    pub summary: ColumnPair<SummaryFigures>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_std: Option<ColumnPair<SummaryFigures>>,
    pub parameters: DesignParameters,
    pub diagnostics: Diagnostics,
}

impl CostReport {
    pub fn row(&self, account: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|row| row.account == account)
    }

    pub fn lcoe(&self, column: CostColumn) -> f64 {
        self.summary.get(column).lcoe
    }

    /// Flat summary keyed `"<KEY>_<column label>"`, led by the tracked parameters.
    pub fn cost_dictionary(&self, tracked: &[String]) -> BTreeMap<String, serde_json::Value> {
        let mut dict = BTreeMap::new();
        for name in tracked {
            if let Some(value) = self.parameters.get(name) {
                if let Ok(json) = serde_json::to_value(value) {
                    dict.insert(name.clone(), json);
                }
            }
        }
        for key in SummaryKey::ALL {
            for column in CostColumn::BOTH {
                dict.insert(
                    format!("{}_{}", key.key(), column.label()),
                    number(self.summary.get(column).get(key)),
                );
                let std = self
                    .summary_std
                    .as_ref()
                    .map(|pair| number(pair.get(column).get(key)))
                    .unwrap_or(serde_json::Value::Null);
                dict.insert(format!("{}_{} std", key.key(), column.label()), std);
            }
        }
        dict
    }
}

fn number(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Display rounding: one decimal at or above 1, otherwise one significant digit.
pub fn custom_round(value: f64) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }
    if value.abs() >= 1.0 {
        return (value * 10.0).round() / 10.0;
    }
    let decimals = (-value.abs().log10()).ceil() as i32;
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_key_labels() {
        assert_eq!(SummaryKey::OccExclFuelPerKw.to_string(), "OCC excl. fuel per kW");
        assert_eq!(SummaryKey::Lcoe.title(), "Levelized Cost Of Energy ($/MWh)");
    }

    #[test]
    fn test_summary_figures_get_set() {
        let mut figures = SummaryFigures::default();
        figures.set(SummaryKey::TciPerKw, 12_000.0);
        assert_eq!(figures.tci_per_kw, 12_000.0);
        assert_eq!(figures.get(SummaryKey::TciPerKw), 12_000.0);
    }

    #[test]
    fn test_custom_round() {
        assert_eq!(custom_round(1234.56), 1234.6);
        assert_eq!(custom_round(0.0456), 0.05);
        assert_eq!(custom_round(0.3), 0.3);
        assert_eq!(custom_round(0.00123), 0.001);
        assert_eq!(custom_round(0.0), 0.0);
    }

    #[test]
    fn test_cost_dictionary_keys() {
        let report = CostReport {
            design_id: Some("ltmr".into()),
            escalation_year: 2023,
            samples: None,
            rows: Vec::new(),
            summary: ColumnPair::new(
                SummaryFigures {
                    lcoe: 250.0,
                    ..Default::default()
                },
                SummaryFigures {
                    lcoe: f64::NAN,
                    ..Default::default()
                },
            ),
            summary_std: None,
            parameters: DesignParameters::new().with("Power MWe", 6.2),
            diagnostics: Diagnostics::new(),
        };
        let dict = report.cost_dictionary(&["Power MWe".to_string(), "Missing".to_string()]);
        assert_eq!(dict["Power MWe"], serde_json::json!(6.2));
        assert!(!dict.contains_key("Missing"));
        assert_eq!(dict["LCOE_FOAK Estimated Cost"], serde_json::json!(250.0));
        assert!(dict["LCOE_NOAK Estimated Cost"].is_null());
        assert!(dict["OCC_FOAK Estimated Cost std"].is_null());
        assert_eq!(dict.len(), 1 + SummaryKey::ALL.len() * 4);
    }

    #[test]
    fn test_undefined_summary_survives_json() {
        let report = CostReport {
            design_id: None,
            escalation_year: 2024,
            samples: None,
            rows: Vec::new(),
            summary: ColumnPair::new(
                SummaryFigures {
                    lcoe: 250.0,
                    ..Default::default()
                },
                SummaryFigures {
                    ac: f64::NAN,
                    lcoe: f64::NAN,
                    ..Default::default()
                },
            ),
            summary_std: None,
            parameters: DesignParameters::new(),
            diagnostics: Diagnostics::new(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"lcoe\":null"));

        let back: CostReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.summary.foak.lcoe, 250.0);
        assert!(back.lcoe(CostColumn::Noak).is_nan());
        assert!(back.summary.noak.ac.is_nan());
        assert_eq!(back.summary.noak.tci, 0.0);
    }
}
