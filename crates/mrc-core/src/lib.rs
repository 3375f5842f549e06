//! # mrc-core: Microreactor Cost Data Model
//!
//! Provides the data structures shared by every crate of the cost toolkit:
//! chart-of-accounts rows, design parameters, the unified error type, and
//! the diagnostics collected while a design is evaluated.
//!
//! ## Design Philosophy
//!
//! The chart of accounts is **external data**: account numbers, hierarchy
//! levels, unit costs and scaling variables all come from a table, and the
//! engine never hard-codes more of it than the handful of accounts that
//! derived formulas refer to. Parameters the engine itself reads are a closed
//! enum ([`ParamKey`]) so that key-name drift fails loudly instead of reading
//! a silent default.
//!
//! ## Quick Start
//!
//! ```rust
//! use mrc_core::*;
//!
//! let land = AccountRow::new(11, 1, "Land and Land Rights")
//!     .with_unit_cost(3800.0, 2021)
//!     .with_cost_index("NA")
//!     .with_scaling("Land Area", 1.0, None)
//!     .with_learning("No Learning");
//!
//! let params = DesignParameters::new()
//!     .with("Land Area", 18.0)
//!     .with("Power MWe", 6.2);
//!
//! assert!(land.has_cost_law());
//! assert_eq!(params.number("Land Area", Stage::Scaling).unwrap(), 18.0);
//! ```
//!
//! ## Modules
//!
//! - [`account`] - Chart-of-accounts rows and identifiers
//! - [`params`] - Design parameters and typed economic assumptions
//! - [`error`] - [`MrcError`] and pipeline [`Stage`]
//! - [`diagnostics`] - Non-fatal per-row issues
//! - [`index`] - Inflation index table
//! - [`laws`] - Non-standard cost-law registry
//! - [`report`] - Emitted cost table and summary totals

pub mod account;
pub mod diagnostics;
pub mod error;
pub mod index;
pub mod laws;
pub mod params;
pub mod report;

pub use account::{
    AccountId, AccountRow, CostIndexType, CostRange, LearningCategory, OptionalGate, ScalingSpec,
};
pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{MrcError, MrcResult, Stage};
pub use index::InflationIndex;
pub use laws::{LawRegistry, NonStandardLaw};
pub use params::{DesignParameters, EconomicAssumptions, ParamKey, ParamValue, PlantFigures};
pub use report::{custom_round, ColumnPair, CostReport, ReportRow, SummaryFigures, SummaryKey};

/// Which estimate column a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CostColumn {
    /// First-of-a-kind
    Foak,
    /// Nth-of-a-kind
    Noak,
}

impl CostColumn {
    pub const BOTH: [CostColumn; 2] = [CostColumn::Foak, CostColumn::Noak];

    pub fn label(&self) -> &'static str {
        match self {
            CostColumn::Foak => "FOAK Estimated Cost",
            CostColumn::Noak => "NOAK Estimated Cost",
        }
    }
}

impl std::fmt::Display for CostColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
