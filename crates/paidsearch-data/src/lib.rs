#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/paidsearch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod daily;
pub mod error;
pub mod observation;
pub mod pivot;

pub use daily::{DailyGroupMeans, daily_group_means};
pub use error::{DataError, Result};
pub use observation::{
    DATE_FORMAT, Group, MarketId, Observation, PanelSummary, Period, load_observations,
    read_observations,
};
pub use pivot::{MarketAggregate, MarketTable, build_market_tables};

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
