//! Error types for panel construction and decomposition.

use thiserror::Error;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur while building panels or decomposing shocks.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Malformed input (wrong frequency, mismatched index, ...)
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// What precondition the input violated
        reason: String,
    },

    /// Two input series carry the same column name
    #[error("Duplicate column: {name}")]
    DuplicateColumn {
        /// The offending column name
        name: String,
    },

    /// A referenced column does not exist in the panel
    #[error("Missing column: {name}")]
    MissingColumn {
        /// The requested column name
        name: String,
    },

    /// A join or filter produced zero usable rows
    #[error("Empty result: {reason}")]
    EmptyResult {
        /// Why no rows survived
        reason: String,
    },

    /// Not enough rows for the required degrees of freedom
    #[error("Insufficient data: need at least {required} rows, got {actual}")]
    InsufficientData {
        /// Required number of rows
        required: usize,
        /// Actual number of rows
        actual: usize,
    },

    /// Series transform error
    #[error("Series error: {0}")]
    Series(#[from] brent_series::SeriesError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
