//! Error types for data operations.

use crate::observation::{Group, MarketId};
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading or reshaping the panel.
#[derive(Debug, Error)]
pub enum DataError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// A required column is absent from the header row
    #[error("Missing column `{column}` in {source_name}")]
    MissingColumn {
        /// Name of the absent column
        column: &'static str,
        /// File or table that was being read
        source_name: String,
    },

    /// Date could not be parsed with the expected format
    #[error("Record {record}: cannot parse date `{value}` (expected format {format})")]
    InvalidDate {
        /// 1-based data record number
        record: usize,
        /// Raw date text
        value: String,
        /// Expected chrono format string
        format: &'static str,
    },

    /// Revenue is zero, negative or not finite, so its log is undefined
    #[error("Record {record}: revenue {value} for DMA {dma} has no finite logarithm")]
    InvalidRevenue {
        /// 1-based data record number
        record: usize,
        /// Market of the offending record
        dma: MarketId,
        /// Revenue value
        value: f64,
    },

    /// A 0/1 indicator holds some other value
    #[error("Record {record}: column `{column}` must be 0 or 1, got {value}")]
    InvalidFlag {
        /// 1-based data record number
        record: usize,
        /// Indicator column name
        column: &'static str,
        /// Value found
        value: i64,
    },

    /// A market shows up in both the treated and the control group
    #[error("DMA {dma} appears in both the {first} and the {second} group")]
    MixedGroup {
        /// Offending market
        dma: MarketId,
        /// Group of the first occurrence
        first: Group,
        /// Conflicting group
        second: Group,
    },

    /// A per-market table lists the same market twice
    #[error("DMA {0} appears more than once in a per-market table")]
    DuplicateMarket(MarketId),

    /// Input contained no observations
    #[error("No observations in {0}")]
    EmptyPanel(String),

    /// Unexpected content in an aggregated frame
    #[error("Data parsing error: {0}")]
    Parse(String),
}
