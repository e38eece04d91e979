#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/paidsearch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod did;
pub mod error;
pub mod group;

// Re-export main types
pub use did::{DidConfig, DidEstimate, DidEstimator, Z_95};
pub use error::{EstimateError, EstimateWarning, Result};
pub use group::GroupSummary;
