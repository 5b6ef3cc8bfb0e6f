#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/brent/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod decompose;
pub mod error;
pub mod panel;

pub use decompose::{
    DEMAND_COLUMN, RISK_COLUMN, SUPPLY_COLUMN, ShockSet, decompose, with_shocks,
};
pub use error::{ModelError, Result};
pub use panel::Panel;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
