//! Design parameters consumed by the cost engine.
//!
//! Parameters arrive from two places: the engineering-evaluation stage
//! (masses, volumes, power, fuel lifetime, ...) and the economics table
//! (interest rate, capacity factor, learning multipliers, ...). Both are
//! merged into one read-only [`DesignParameters`] map before the engine runs.
//!
//! Names the engine itself depends on are a closed set, [`ParamKey`]. Those
//! keys are canonicalized on insertion so "interest rate" and "Interest Rate"
//! land in the same slot, and the typed records [`EconomicAssumptions`] and
//! [`PlantFigures`] are extracted once with a configuration error naming any
//! missing key. Scaling variables and optional-variable gates are named by the
//! chart of accounts itself and stay free-form strings.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MrcError, MrcResult, Stage};

/// A parameter value: number, text, or list of numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
    List(Vec<f64>),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            ParamValue::Text(s) => s.trim().parse().ok(),
            ParamValue::List(_) => None,
        }
    }

    /// Gate comparison used by the account filter.
    ///
    /// Numbers compare with a relative tolerance, text compares trimmed and
    /// case-sensitive, and a numeric string equals the number it spells.
    pub fn matches(&self, other: &ParamValue) -> bool {
        match (self, other) {
            (ParamValue::Text(a), ParamValue::Text(b)) => a.trim() == b.trim(),
            (ParamValue::List(a), ParamValue::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| approx_eq(*x, *y))
            }
            (ParamValue::List(_), _) | (_, ParamValue::List(_)) => false,
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => approx_eq(x, y),
                _ => false,
            },
        }
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(v) => write!(f, "{}", v),
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::List(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(value: Vec<f64>) -> Self {
        ParamValue::List(value)
    }
}

/// Parameters the cost engine reads by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    PowerMwe,
    FuelLifetime,
    AnnualElectricityProduction,
    EscalationYear,
    Enrichment,
    PumpIsentropicEfficiency,
    CompressorIsentropicEfficiency,
    CompressorPressureRatio,
    FtesPerOnsiteOperatorPerYear,
    FtesPerOffsiteOperator,
    FtesPerSecurityStaff,
    FtesPerOperatorPerRefueling,
    AnnualReturn,
    InterestRate,
    CapacityFactor,
    ConstructionDuration,
    DebtToEquityRatio,
    LevelizationPeriod,
    IndirectToDirectFieldCost,
    MaintenanceToDirectCostRatio,
    NoLearningMultiplier,
    LicensingLearningMultiplier,
    FactoryPrimaryStructureMultiplier,
    FactoryDrumsMultiplier,
    FactoryOtherMultiplier,
    OnsiteLearningRate,
    NumberOfUnits,
}

impl ParamKey {
    pub const ALL: [ParamKey; 27] = [
        ParamKey::PowerMwe,
        ParamKey::FuelLifetime,
        ParamKey::AnnualElectricityProduction,
        ParamKey::EscalationYear,
        ParamKey::Enrichment,
        ParamKey::PumpIsentropicEfficiency,
        ParamKey::CompressorIsentropicEfficiency,
        ParamKey::CompressorPressureRatio,
        ParamKey::FtesPerOnsiteOperatorPerYear,
        ParamKey::FtesPerOffsiteOperator,
        ParamKey::FtesPerSecurityStaff,
        ParamKey::FtesPerOperatorPerRefueling,
        ParamKey::AnnualReturn,
        ParamKey::InterestRate,
        ParamKey::CapacityFactor,
        ParamKey::ConstructionDuration,
        ParamKey::DebtToEquityRatio,
        ParamKey::LevelizationPeriod,
        ParamKey::IndirectToDirectFieldCost,
        ParamKey::MaintenanceToDirectCostRatio,
        ParamKey::NoLearningMultiplier,
        ParamKey::LicensingLearningMultiplier,
        ParamKey::FactoryPrimaryStructureMultiplier,
        ParamKey::FactoryDrumsMultiplier,
        ParamKey::FactoryOtherMultiplier,
        ParamKey::OnsiteLearningRate,
        ParamKey::NumberOfUnits,
    ];

    /// Canonical parameter name as it appears in design and economics files.
    pub fn name(&self) -> &'static str {
        match self {
            ParamKey::PowerMwe => "Power MWe",
            ParamKey::FuelLifetime => "Fuel Lifetime",
            ParamKey::AnnualElectricityProduction => "Annual Electricity Production",
            ParamKey::EscalationYear => "Escalation Year",
            ParamKey::Enrichment => "Enrichment",
            ParamKey::PumpIsentropicEfficiency => "Pump Isentropic Efficiency",
            ParamKey::CompressorIsentropicEfficiency => "Compressor Isentropic Efficiency",
            ParamKey::CompressorPressureRatio => "Compressor Pressure Ratio",
            ParamKey::FtesPerOnsiteOperatorPerYear => "FTEs Per Onsite Operator Per Year",
            ParamKey::FtesPerOffsiteOperator => "FTEs Per Offsite Operator (24/7)",
            ParamKey::FtesPerSecurityStaff => "FTEs Per Security Staff (24/7)",
            ParamKey::FtesPerOperatorPerRefueling => "FTEs Per Operator Per Year Per Refueling",
            ParamKey::AnnualReturn => "Annual Return",
            ParamKey::InterestRate => "Interest Rate",
            ParamKey::CapacityFactor => "Capacity Factor",
            ParamKey::ConstructionDuration => "Construction Duration",
            ParamKey::DebtToEquityRatio => "Debt To Equity Ratio",
            ParamKey::LevelizationPeriod => "Levelization Period",
            ParamKey::IndirectToDirectFieldCost => "Indirect To Direct Field-Related Cost",
            ParamKey::MaintenanceToDirectCostRatio => "Maintenance To Direct Cost Ratio",
            ParamKey::NoLearningMultiplier => "No Learning Multiplier",
            ParamKey::LicensingLearningMultiplier => "Licensing Learning Multiplier",
            ParamKey::FactoryPrimaryStructureMultiplier => "Factory Primary Structure Multiplier",
            ParamKey::FactoryDrumsMultiplier => "Factory Drums Multiplier",
            ParamKey::FactoryOtherMultiplier => "Factory Other Multiplier",
            ParamKey::OnsiteLearningRate => "Onsite Learning Rate",
            ParamKey::NumberOfUnits => "Number of Units",
        }
    }

    /// Case-insensitive lookup of a canonical name.
    pub fn from_name(name: &str) -> Option<ParamKey> {
        let name = name.trim();
        ParamKey::ALL
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-only parameter map for one reactor design.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, ParamValue>",
    into = "BTreeMap<String, ParamValue>"
)]
pub struct DesignParameters {
    values: BTreeMap<String, ParamValue>,
}

impl DesignParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, canonicalizing engine-known names.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<ParamValue>) {
        let name = name.as_ref().trim();
        let canonical = ParamKey::from_name(name)
            .map(|key| key.name().to_string())
            .unwrap_or_else(|| name.to_string());
        self.values.insert(canonical, value.into());
    }

    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        match ParamKey::from_name(name) {
            Some(key) => self.values.get(key.name()),
            None => self.values.get(name.trim()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.values.iter()
    }

    /// Merge `other` into `self`; values from `other` win on collision.
    pub fn merge(&mut self, other: &DesignParameters) {
        for (name, value) in other.iter() {
            self.insert(name, value.clone());
        }
    }

    /// Numeric value of a free-form parameter (e.g. a scaling variable).
    pub fn number(&self, name: &str, stage: Stage) -> MrcResult<f64> {
        let value = self.get(name).ok_or_else(|| {
            MrcError::config(stage, format!("design parameter '{}' is not defined", name))
        })?;
        value.as_number().ok_or_else(|| {
            MrcError::config(
                stage,
                format!("design parameter '{}' is not numeric (got '{}')", name, value),
            )
        })
    }

    /// Numeric value of an engine-known parameter.
    pub fn require(&self, key: ParamKey, stage: Stage) -> MrcResult<f64> {
        self.number(key.name(), stage)
    }
}

impl FromIterator<(String, ParamValue)> for DesignParameters {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        let mut params = DesignParameters::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

impl From<BTreeMap<String, ParamValue>> for DesignParameters {
    fn from(values: BTreeMap<String, ParamValue>) -> Self {
        values.into_iter().collect()
    }
}

impl From<DesignParameters> for BTreeMap<String, ParamValue> {
    fn from(params: DesignParameters) -> Self {
        params.values
    }
}

/// Financial assumptions used by the derived accounts and the LCOE.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicAssumptions {
    /// Also the discount rate for levelization
    pub interest_rate: f64,
    pub capacity_factor: f64,
    pub construction_duration_months: f64,
    pub debt_to_equity_ratio: f64,
    pub levelization_period_years: u32,
    pub indirect_to_direct_field_cost: f64,
    pub maintenance_to_direct_cost_ratio: f64,
}

impl EconomicAssumptions {
    pub fn from_params(params: &DesignParameters) -> MrcResult<Self> {
        let stage = Stage::Derived;
        let period = params.require(ParamKey::LevelizationPeriod, stage)?;
        if period < 1.0 || period.fract() != 0.0 {
            return Err(MrcError::config(
                stage,
                format!(
                    "'{}' must be a positive whole number of years (got {})",
                    ParamKey::LevelizationPeriod,
                    period
                ),
            ));
        }
        Ok(Self {
            interest_rate: params.require(ParamKey::InterestRate, stage)?,
            capacity_factor: params.require(ParamKey::CapacityFactor, stage)?,
            construction_duration_months: params.require(ParamKey::ConstructionDuration, stage)?,
            debt_to_equity_ratio: params.require(ParamKey::DebtToEquityRatio, stage)?,
            levelization_period_years: period as u32,
            indirect_to_direct_field_cost: params
                .require(ParamKey::IndirectToDirectFieldCost, stage)?,
            maintenance_to_direct_cost_ratio: params
                .require(ParamKey::MaintenanceToDirectCostRatio, stage)?,
        })
    }
}

/// Plant-level figures supplied by the engineering evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantFigures {
    pub power_mwe: f64,
    pub fuel_lifetime_days: f64,
    /// MWh per year
    pub annual_electricity_production: f64,
    pub escalation_year: i32,
}

impl PlantFigures {
    pub fn from_params(params: &DesignParameters) -> MrcResult<Self> {
        let stage = Stage::Derived;
        let year = params.require(ParamKey::EscalationYear, Stage::Inflation)?;
        Ok(Self {
            power_mwe: params.require(ParamKey::PowerMwe, stage)?,
            fuel_lifetime_days: params.require(ParamKey::FuelLifetime, stage)?,
            annual_electricity_production: params
                .require(ParamKey::AnnualElectricityProduction, stage)?,
            escalation_year: year.round() as i32,
        })
    }

    pub fn power_kwe(&self) -> f64 {
        self.power_mwe * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_roundtrip() {
        for key in ParamKey::ALL {
            assert_eq!(ParamKey::from_name(key.name()), Some(key));
        }
        assert_eq!(
            ParamKey::from_name("  interest rate "),
            Some(ParamKey::InterestRate)
        );
        assert_eq!(ParamKey::from_name("Land Area"), None);
    }

    #[test]
    fn test_insert_canonicalizes_known_keys() {
        let params = DesignParameters::new().with("power mwe", 6.2);
        assert!(params.contains("Power MWe"));
        assert_eq!(params.require(ParamKey::PowerMwe, Stage::Derived).unwrap(), 6.2);
        assert_eq!(params.iter().next().unwrap().0, "Power MWe");
    }

    #[test]
    fn test_missing_parameter_is_config_error() {
        let params = DesignParameters::new();
        let err = params.number("Land Area", Stage::Scaling).unwrap_err();
        assert!(matches!(err, MrcError::Config { stage: Stage::Scaling, .. }));
        assert!(err.to_string().contains("Land Area"));
    }

    #[test]
    fn test_non_numeric_parameter_is_config_error() {
        let params = DesignParameters::new().with("Coolant", "NaK");
        assert!(params.number("Coolant", Stage::Scaling).is_err());
    }

    #[test]
    fn test_gate_matching() {
        let text = ParamValue::from("LTMR");
        assert!(text.matches(&ParamValue::from(" LTMR ")));
        assert!(!text.matches(&ParamValue::from("GCMR")));
        assert!(ParamValue::from(2.0).matches(&ParamValue::from("2")));
        assert!(!ParamValue::from(vec![1.0]).matches(&ParamValue::from(1.0)));
    }

    #[test]
    fn test_untagged_deserialization() {
        let yaml = "Power MWe: 6.2\nCoolant: NaK\nFuel Pin Radii: [0.28, 0.31]\n";
        let params: DesignParameters = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(params.get("Power MWe"), Some(&ParamValue::Number(6.2)));
        assert_eq!(params.get("Coolant"), Some(&ParamValue::from("NaK")));
        assert_eq!(
            params.get("Fuel Pin Radii"),
            Some(&ParamValue::List(vec![0.28, 0.31]))
        );
    }

    #[test]
    fn test_merge_other_wins() {
        let mut base = DesignParameters::new().with("Interest Rate", 0.05);
        let economics = DesignParameters::new().with("interest rate", 0.07);
        base.merge(&economics);
        assert_eq!(base.require(ParamKey::InterestRate, Stage::Derived).unwrap(), 0.07);
        assert_eq!(base.len(), 1);
    }

    #[test]
    fn test_economic_assumptions_rejects_fractional_period() {
        let params = DesignParameters::new()
            .with("Interest Rate", 0.07)
            .with("Capacity Factor", 0.93)
            .with("Construction Duration", 24.0)
            .with("Debt To Equity Ratio", 0.5)
            .with("Levelization Period", 59.5)
            .with("Indirect To Direct Field-Related Cost", 0.3)
            .with("Maintenance To Direct Cost Ratio", 0.1);
        assert!(EconomicAssumptions::from_params(&params).is_err());
    }
}
