//! Estimator errors and warnings.

use derive_more::Display;
use paidsearch_data::{Group, MarketId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for estimation.
pub type Result<T> = std::result::Result<T, EstimateError>;

/// Errors that make the estimate undefined.
#[derive(Debug, Error)]
pub enum EstimateError {
    /// Too few markets with a usable difference to estimate a variance
    #[error(
        "Insufficient data: the {group} group needs at least {required} markets with a pre/post difference, got {actual}"
    )]
    InsufficientMarkets {
        /// Group that fell short
        group: Group,
        /// Required number of markets
        required: usize,
        /// Usable markets found
        actual: usize,
    },

    /// A statistic came out infinite or NaN
    #[error("Non-finite {quantity}: {value}")]
    NonFinite {
        /// Which statistic
        quantity: &'static str,
        /// Offending value
        value: f64,
    },

    /// Invalid estimator configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Conditions that leave the estimate defined but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimateWarning {
    /// Market dropped because its pre or post mean is missing.
    #[display("{group} DMA {dma} has no pre/post difference and was excluded")]
    MissingDiff {
        /// Group of the market
        group: Group,
        /// Excluded market
        dma: MarketId,
    },

    /// Every usable market in the group has the same difference.
    #[display("{group} group has zero variance in log revenue differences")]
    ZeroVariance {
        /// Affected group
        group: Group,
    },
}
