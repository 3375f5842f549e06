//! Chart-of-accounts rows.
//!
//! One [`AccountRow`] is one line of the cost database. Rows are read once,
//! filtered, and never mutated afterwards; computed cost columns live beside
//! the rows in the engine's cost table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::params::ParamValue;

/// Account identifier: a number ("21", "221.1") or a short code ("212A").
///
/// Integral numbers are normalized on construction so that a spreadsheet
/// export of `21.0` and a hand-written `21` name the same account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // YAML keys like `222.1` arrive as floats, `21` as integers
        struct Visitor;

        impl serde::de::Visitor<'_> for Visitor {
            type Value = AccountId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an account number or code")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<AccountId, E> {
                Ok(AccountId::new(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<AccountId, E> {
                Ok(AccountId(v.to_string()))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<AccountId, E> {
                Ok(AccountId(v.to_string()))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<AccountId, E> {
                Ok(AccountId::new(v.to_string()))
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

impl AccountId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref().trim();
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v.fract() == 0.0 && !raw.contains(['e', 'E']) => {
                AccountId(format!("{}", v as i64))
            }
            _ => AccountId(raw.to_string()),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First character as a digit; drives the account-family match.
    pub fn leading_digit(&self) -> Option<u32> {
        self.0.chars().next().and_then(|c| c.to_digit(10))
    }

    /// True if this identifier is the given whole account number.
    pub fn is(&self, number: u32) -> bool {
        self.0.parse::<u32>().map(|n| n == number).unwrap_or(false)
    }

    /// Numeric value for accounts that are plain numbers.
    pub fn as_number(&self) -> Option<f64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        AccountId::new(value)
    }
}

impl From<u32> for AccountId {
    fn from(value: u32) -> Self {
        AccountId(value.to_string())
    }
}

/// Cost-index column used to escalate a row's costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostIndexType {
    /// "NA": no inflation adjustment
    NotAdjusted,
    /// Named column of the inflation index table
    Index(String),
}

impl CostIndexType {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("NA") {
            CostIndexType::NotAdjusted
        } else {
            CostIndexType::Index(raw.to_string())
        }
    }
}

impl fmt::Display for CostIndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostIndexType::NotAdjusted => f.write_str("NA"),
            CostIndexType::Index(name) => f.write_str(name),
        }
    }
}

/// Scaling term of a cost law.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingSpec {
    /// Design parameter whose value multiplies the unit cost
    pub variable: String,
    /// Reference value for the normalized power law
    pub reference_value: Option<f64>,
    pub exponent: f64,
}

/// Optional-variable gate: keep the row only if the parameter equals `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionalGate {
    pub variable: String,
    pub value: ParamValue,
}

/// Low and high ends of a row's cost range, used for uncertainty sampling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostRange {
    pub fixed_low: Option<f64>,
    pub fixed_high: Option<f64>,
    pub unit_low: Option<f64>,
    pub unit_high: Option<f64>,
}

impl CostRange {
    pub fn fixed(&self) -> Option<(f64, f64)> {
        self.fixed_low.zip(self.fixed_high)
    }

    pub fn unit(&self) -> Option<(f64, f64)> {
        self.unit_low.zip(self.unit_high)
    }

    pub fn scaled(&self, factor: f64) -> CostRange {
        CostRange {
            fixed_low: self.fixed_low.map(|v| v * factor),
            fixed_high: self.fixed_high.map(|v| v * factor),
            unit_low: self.unit_low.map(|v| v * factor),
            unit_high: self.unit_high.map(|v| v * factor),
        }
    }
}

/// Learning-curve rule converting a FOAK cost into a NOAK cost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LearningCategory {
    NoLearning,
    LicensingLearning,
    FactoryPrimaryStructure,
    FactoryDrums,
    FactoryOther,
    OnsiteLearning,
    /// Tag present in the chart but not a known rule
    Unrecognized(String),
}

impl LearningCategory {
    pub fn label(&self) -> &str {
        match self {
            LearningCategory::NoLearning => "No Learning",
            LearningCategory::LicensingLearning => "Licensing Learning",
            LearningCategory::FactoryPrimaryStructure => "Factory Primary Structure",
            LearningCategory::FactoryDrums => "Factory Drums",
            LearningCategory::FactoryOther => "Factory Other",
            LearningCategory::OnsiteLearning => "Onsite Learning",
            LearningCategory::Unrecognized(tag) => tag,
        }
    }
}

impl FromStr for LearningCategory {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        let known = [
            LearningCategory::NoLearning,
            LearningCategory::LicensingLearning,
            LearningCategory::FactoryPrimaryStructure,
            LearningCategory::FactoryDrums,
            LearningCategory::FactoryOther,
            LearningCategory::OnsiteLearning,
        ];
        Ok(known
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(tag))
            .unwrap_or_else(|| LearningCategory::Unrecognized(tag.to_string())))
    }
}

impl fmt::Display for LearningCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One line of the chart of accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRow {
    pub account: AccountId,
    /// Depth in the hierarchy, 0 = top
    pub level: u32,
    pub title: String,
    pub fixed_cost: Option<f64>,
    pub unit_cost: Option<f64>,
    #[serde(default)]
    pub cost_range: CostRange,
    pub dollar_year: Option<i32>,
    pub cost_index: CostIndexType,
    pub scaling: Option<ScalingSpec>,
    /// False selects a per-account non-standard law
    pub standard_equation: bool,
    pub gate: Option<OptionalGate>,
    pub learning: Option<LearningCategory>,
}

impl AccountRow {
    /// A bare hierarchy row with no cost law.
    pub fn new(account: impl Into<AccountId>, level: u32, title: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            level,
            title: title.into(),
            fixed_cost: None,
            unit_cost: None,
            cost_range: CostRange::default(),
            dollar_year: None,
            cost_index: CostIndexType::NotAdjusted,
            scaling: None,
            standard_equation: true,
            gate: None,
            learning: None,
        }
    }

    pub fn with_fixed_cost(mut self, cost: f64, dollar_year: i32) -> Self {
        self.fixed_cost = Some(cost);
        self.dollar_year = Some(dollar_year);
        self
    }

    pub fn with_unit_cost(mut self, cost: f64, dollar_year: i32) -> Self {
        self.unit_cost = Some(cost);
        self.dollar_year = Some(dollar_year);
        self
    }

    pub fn with_cost_index(mut self, index: &str) -> Self {
        self.cost_index = CostIndexType::parse(index);
        self
    }

    pub fn with_scaling(
        mut self,
        variable: impl Into<String>,
        exponent: f64,
        reference_value: Option<f64>,
    ) -> Self {
        self.scaling = Some(ScalingSpec {
            variable: variable.into(),
            reference_value,
            exponent,
        });
        self
    }

    pub fn non_standard(mut self) -> Self {
        self.standard_equation = false;
        self
    }

    pub fn with_gate(mut self, variable: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.gate = Some(OptionalGate {
            variable: variable.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_learning(mut self, tag: &str) -> Self {
        self.learning = tag.parse().ok();
        self
    }

    pub fn with_cost_range(mut self, range: CostRange) -> Self {
        self.cost_range = range;
        self
    }

    /// True if the row carries a fixed or unit cost and is sized by the scaler.
    pub fn has_cost_law(&self) -> bool {
        self.fixed_cost.is_some() || self.unit_cost.is_some()
    }
}
