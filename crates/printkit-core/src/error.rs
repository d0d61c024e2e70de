//! Error handling for PrintKit.
//!
//! The planner math itself never fails: numeric singularities are clamped
//! (see the planner crate). Errors only arise when loading or validating
//! firmware limits. All error types use `thiserror`.

use thiserror::Error;

/// Error type for PrintKit core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A kinematic limit has a value the planners cannot work with.
    #[error("Invalid firmware limit {name}: {value} (must be > 0)")]
    InvalidLimit {
        /// The name of the offending setting.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Firmware limits could not be parsed from JSON.
    #[error("Failed to parse firmware limits: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
