//! Error types for series transforms.

use thiserror::Error;

/// Result type for series operations.
pub type Result<T> = std::result::Result<T, SeriesError>;

/// Errors that can occur during series transforms and model fits.
#[derive(Debug, Error)]
pub enum SeriesError {
    /// Malformed input to a transform (unsorted, non-positive, non-finite, ...)
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// What precondition the input violated
        reason: String,
    },

    /// Not enough observations for the required degrees of freedom
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// The volatility-model optimizer did not reach a usable solution
    #[error("GARCH fit failed: {reason}")]
    FitFailure {
        /// Why the fit was rejected
        reason: String,
    },
}
