//! # mrc-io: Cost Engine Inputs & Report Export
//!
//! Loaders for the tables the cost engine consumes and writers for the
//! table it produces.
//!
//! | Input | Format | Loader |
//! |-------|--------|--------|
//! | Chart of accounts | CSV | [`read_chart_of_accounts`] |
//! | Inflation index | CSV (`Year` + index columns) | [`read_inflation_index`] |
//! | Economics parameters | CSV (`Parameter,Value`) | [`read_economics`] |
//! | Design parameters | YAML / JSON | [`load_design_parameters`] |
//! | Non-standard law registry | YAML / JSON | [`load_law_registry`] |
//!
//! All loaders return `anyhow::Result` with the file path in the error
//! context; the engine itself never touches the filesystem.

pub mod chart;
pub mod inflation;
pub mod params;
pub mod report;

pub use chart::{parse_chart_of_accounts, read_chart_of_accounts};
pub use inflation::{parse_inflation_index, read_inflation_index};
pub use params::{
    load_design_parameters, load_law_registry, merge_economics, parse_economics, read_economics,
};
pub use report::{write_cost_dictionary, write_report_csv, write_report_csv_to, write_report_json};
