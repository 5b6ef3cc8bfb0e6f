#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/brent/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod pipeline;

// Re-export the workspace layers
pub use brent_data as data;
pub use brent_model as model;
pub use brent_output as output;
pub use brent_series as series;

pub use pipeline::{
    PipelineConfig, PipelineError, PipelineInputs, ShockPipeline, ShockRun, Stage,
};

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
