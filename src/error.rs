//! Error type shared by the combinatorics, table, rank and distribution
//! layers.
//!
//! The special-function layer never returns an error: invalid arguments
//! yield `NaN` so that batch evaluation over many statistics is not
//! interrupted by one bad input.

use thiserror::Error;

/// Errors raised by the probability engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Argument outside the mathematical domain of the operation.
    #[error("domain error: {0}")]
    Domain(String),

    /// Distribution parameter rejected; the previous value is kept.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Table key outside the declared range of its axis.
    #[error("key {key} out of range {min}..={max} on axis {axis}")]
    KeyOutOfRange {
        /// Axis index (0-based).
        axis: usize,
        /// Offending key.
        key: usize,
        /// Smallest valid key.
        min: usize,
        /// Largest valid key.
        max: usize,
    },

    /// Wrong number of keys or row values.
    #[error("expected {expected} values, got {found}")]
    Arity {
        /// Expected count.
        expected: usize,
        /// Supplied count.
        found: usize,
    },

    /// Table declared with an unusable shape.
    #[error("invalid table shape: {0}")]
    InvalidShape(String),

    /// Header missing, non-monotonic, or threshold not present.
    #[error("header error: {0}")]
    Header(String),

    /// Table or configuration document could not be parsed.
    #[error("load error: {0}")]
    Load(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
