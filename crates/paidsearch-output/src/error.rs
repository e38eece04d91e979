//! Error types for output generation.

use thiserror::Error;

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;

/// Errors that can occur while writing tables, exports or figures.
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A figure had no data points to draw.
    #[error("No data to plot for {0}")]
    EmptySeries(String),

    /// PNG rasterization error.
    #[cfg(feature = "png")]
    #[error("PNG encoding error: {0}")]
    Png(String),
}
