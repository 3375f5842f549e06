//! Registry of non-standard cost laws.
//!
//! Rows flagged as non-standard in the chart of accounts are sized by a
//! named law instead of the generic power law. Which account uses which law
//! is data: the registry maps account identifiers to law names and can be
//! replaced from a YAML file without touching the engine.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::account::AccountId;

/// Named non-standard cost laws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonStandardLaw {
    Pump,
    Compressor,
    FuelEnrichmentPremium,
    OnsiteOperatorStaffing,
    OffsiteOperatorStaffing,
    SecurityStaffing,
    DecommissioningAnnuity,
    RefuelingLabor,
}

impl NonStandardLaw {
    pub const ALL: [NonStandardLaw; 8] = [
        NonStandardLaw::Pump,
        NonStandardLaw::Compressor,
        NonStandardLaw::FuelEnrichmentPremium,
        NonStandardLaw::OnsiteOperatorStaffing,
        NonStandardLaw::OffsiteOperatorStaffing,
        NonStandardLaw::SecurityStaffing,
        NonStandardLaw::DecommissioningAnnuity,
        NonStandardLaw::RefuelingLabor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NonStandardLaw::Pump => "pump",
            NonStandardLaw::Compressor => "compressor",
            NonStandardLaw::FuelEnrichmentPremium => "fuel_enrichment_premium",
            NonStandardLaw::OnsiteOperatorStaffing => "onsite_operator_staffing",
            NonStandardLaw::OffsiteOperatorStaffing => "offsite_operator_staffing",
            NonStandardLaw::SecurityStaffing => "security_staffing",
            NonStandardLaw::DecommissioningAnnuity => "decommissioning_annuity",
            NonStandardLaw::RefuelingLabor => "refueling_labor",
        }
    }
}

impl fmt::Display for NonStandardLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account to law mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct LawRegistry {
    by_account: HashMap<AccountId, NonStandardLaw>,
}

impl LawRegistry {
    /// Build from an account -> law table (the YAML shape).
    pub fn from_table(table: &BTreeMap<AccountId, NonStandardLaw>) -> Self {
        Self {
            by_account: table
                .iter()
                .map(|(account, law)| (account.clone(), *law))
                .collect(),
        }
    }

    pub fn law_for(&self, account: &AccountId) -> Option<NonStandardLaw> {
        self.by_account.get(account).copied()
    }

    pub fn len(&self) -> usize {
        self.by_account.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_account.is_empty()
    }

    /// Sorted account -> law view.
    pub fn to_table(&self) -> BTreeMap<AccountId, NonStandardLaw> {
        self.by_account
            .iter()
            .map(|(account, law)| (account.clone(), *law))
            .collect()
    }
}

impl Default for LawRegistry {
    /// Assignments matching the bundled cost database.
    fn default() -> Self {
        let defaults = [
            ("222.1", NonStandardLaw::Pump),
            ("222.2", NonStandardLaw::Compressor),
            ("251", NonStandardLaw::FuelEnrichmentPremium),
            ("711", NonStandardLaw::OnsiteOperatorStaffing),
            ("712", NonStandardLaw::OffsiteOperatorStaffing),
            ("713", NonStandardLaw::SecurityStaffing),
            ("721", NonStandardLaw::RefuelingLabor),
            ("78", NonStandardLaw::DecommissioningAnnuity),
        ];
        Self {
            by_account: defaults
                .into_iter()
                .map(|(account, law)| (AccountId::new(account), law))
                .collect(),
        }
    }
}
