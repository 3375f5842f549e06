//! # mrc-algo: Code-of-Accounts Cost Engine
//!
//! Rolls a chart of accounts up into plant-level capital, annual and
//! levelized costs for one microreactor design.
//!
//! ## Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Inflation normalization | [`inflation`] | costs in escalation-year dollars |
//! | Account filter | [`filter`] | rows relevant to the design |
//! | Cost scaler | [`scaling`] | FOAK leaf costs |
//! | FOAK -> NOAK projector | [`learning`] | NOAK leaf costs |
//! | Hierarchy aggregator | [`tree`] | parent accounts |
//! | Derived accounts | [`derived`] | 31, 32, 62, 75, 82, OCC, TCI, AC |
//! | Levelized cost | [`levelized`] | LCOE |
//!
//! [`estimate`] sequences the stages; [`sampling`] reruns them over
//! perturbed costs to estimate uncertainty.
//!
//! ## Example
//!
//! ```ignore
//! use mrc_algo::bottom_up_cost_estimate;
//! use mrc_core::{CostColumn, LawRegistry};
//!
//! let chart = mrc_io::read_chart_of_accounts("test_data/cost_database.csv")?;
//! let index = mrc_io::read_inflation_index("test_data/inflation_index.csv")?;
//! let params = mrc_io::load_design_parameters("test_data/ltmr.yaml")?;
//!
//! let report = bottom_up_cost_estimate(&chart, &index, &params, &LawRegistry::default())?;
//! println!("LCOE: {:.1} $/MWh", report.lcoe(CostColumn::Foak));
//! ```

pub mod derived;
pub mod estimate;
pub mod filter;
pub mod inflation;
pub mod learning;
pub mod levelized;
pub mod sampling;
pub mod scaling;
pub mod table;
pub mod tree;

pub use estimate::{bottom_up_cost_estimate, CostEngine, CostEstimate, PreparedChart};
pub use filter::filter_irrelevant;
pub use inflation::{multiplier as inflation_multiplier, AdjustedCosts};
pub use learning::learning_rate_multiplier;
pub use levelized::{lcoe, lcoe_contributions};
pub use sampling::{sample_estimate, SampledEstimate, SamplingConfig, SamplingDistribution};
pub use table::CostTable;
pub use tree::{aggregate, AccountFamily, AccountTree};
