//! Unified error types for the cost toolkit
//!
//! This module provides a common error type [`MrcError`] shared by every
//! library crate in the workspace. Fatal conditions carry the pipeline
//! [`Stage`] they were raised in so a failed design evaluation can be
//! diagnosed from the message alone.
//!
//! # Example
//!
//! ```ignore
//! use mrc_core::{MrcError, MrcResult, Stage};
//!
//! fn estimate(params: &DesignParameters) -> MrcResult<f64> {
//!     let power = params.require(ParamKey::PowerMwe, Stage::Derived)?;
//!     Ok(power * 1000.0)
//! }
//! ```

use std::fmt;

use thiserror::Error;

/// Pipeline stage in which an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Input,
    Inflation,
    Filter,
    Scaling,
    Projection,
    Aggregation,
    Derived,
    Levelization,
    Sampling,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Input => "input",
            Stage::Inflation => "inflation",
            Stage::Filter => "filter",
            Stage::Scaling => "scaling",
            Stage::Projection => "projection",
            Stage::Aggregation => "aggregation",
            Stage::Derived => "derived accounts",
            Stage::Levelization => "levelization",
            Stage::Sampling => "sampling",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for all cost-engine operations.
#[derive(Error, Debug)]
pub enum MrcError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Malformed input data (e.g. a broken account hierarchy)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A required parameter, index year, index column or account is absent
    #[error("Configuration error ({stage}): {message}")]
    Config { stage: Stage, message: String },

    /// An input outside the domain of a cost law, or a non-finite result
    #[error("Domain error ({stage}) in account {account}: {message}")]
    Domain {
        stage: Stage,
        account: String,
        message: String,
    },

    /// Unknown FOAK to NOAK multiplier tag. Recorded per row, never fatal
    /// inside the pipeline.
    #[error("Learning curve error in account {account}: unrecognized multiplier type '{tag}'")]
    LearningCurve { account: String, tag: String },

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

impl MrcError {
    pub fn config(stage: Stage, message: impl Into<String>) -> Self {
        MrcError::Config {
            stage,
            message: message.into(),
        }
    }

    pub fn domain(stage: Stage, account: impl fmt::Display, message: impl Into<String>) -> Self {
        MrcError::Domain {
            stage,
            account: account.to_string(),
            message: message.into(),
        }
    }

    /// True for errors that must abort a design evaluation.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, MrcError::LearningCurve { .. })
    }
}

/// Convenience type alias for Results using MrcError.
pub type MrcResult<T> = Result<T, MrcError>;

impl From<anyhow::Error> for MrcError {
    fn from(err: anyhow::Error) -> Self {
        MrcError::Other(err.to_string())
    }
}

impl From<String> for MrcError {
    fn from(s: String) -> Self {
        MrcError::Other(s)
    }
}

impl From<&str> for MrcError {
    fn from(s: &str) -> Self {
        MrcError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for MrcError {
    fn from(err: serde_json::Error) -> Self {
        MrcError::Parse(err.to_string())
    }
}
