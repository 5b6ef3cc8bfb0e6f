#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/brent/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod garch;
pub mod ols;
pub mod resample;
pub mod returns;
pub mod series;

pub use error::{Result, SeriesError};
pub use garch::{Garch11Config, Garch11Fit, Garch11Params, fit_garch11};
pub use ols::{RegressionResult, ols_fit};
pub use resample::{ResampleRule, resample_monthly};
pub use returns::log_returns;
pub use series::{Frequency, TimeSeries};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
