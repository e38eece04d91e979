//! Export of the DID results.
//!
//! The estimate can be written as pretty JSON or as a flat CSV of
//! `statistic, scale, value` records.

use crate::error::{OutputError, Result};
use chrono::{DateTime, Utc};
use paidsearch_data::PanelSummary;
use paidsearch_estimate::DidEstimate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Flat `statistic, scale, value` records.
    Csv,

    /// Pretty-printed JSON format.
    PrettyJson,
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String>;

    /// Export data to a file in the specified format, creating parent
    /// directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<()> {
        let content = self.export_to_string(format)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// One statistic of the estimate, flattened for CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRecord {
    /// Statistic name, e.g. `gamma_hat`.
    pub statistic: String,
    /// `log` or `level`.
    pub scale: String,
    /// Value.
    pub value: f64,
}

impl EstimateRecord {
    fn new(statistic: &str, scale: &str, value: f64) -> Self {
        Self {
            statistic: statistic.to_string(),
            scale: scale.to_string(),
            value,
        }
    }
}

/// Flatten an estimate into CSV records.
pub fn estimate_records(e: &DidEstimate) -> Vec<EstimateRecord> {
    let mut records = vec![
        EstimateRecord::new("gamma_hat", "log", e.gamma_hat),
        EstimateRecord::new("std_error", "log", e.std_error),
        EstimateRecord::new("ci_lower", "log", e.ci_lower),
        EstimateRecord::new("ci_upper", "log", e.ci_upper),
        EstimateRecord::new("gamma_hat", "level", e.gamma_hat_exp),
        EstimateRecord::new("ci_lower", "level", e.ci_lower_exp),
        EstimateRecord::new("ci_upper", "level", e.ci_upper_exp),
        EstimateRecord::new("z_critical", "log", e.z_critical),
    ];

    for group in [&e.treated, &e.control] {
        let name = group.group.to_string();
        records.push(EstimateRecord::new(&format!("{name}_n"), "log", group.n as f64));
        records.push(EstimateRecord::new(&format!("{name}_mean"), "log", group.mean));
        records.push(EstimateRecord::new(&format!("{name}_variance"), "log", group.variance));
    }

    records
}

/// Estimate bundled with run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DidReport {
    /// Report generation timestamp.
    pub generated_at: DateTime<Utc>,

    /// Panel the per-market tables were built from, when known.
    pub panel: Option<PanelSummary>,

    /// The estimate.
    pub estimate: DidEstimate,
}

impl DidReport {
    /// Create a report stamped with the current time.
    pub fn new(estimate: DidEstimate, panel: Option<PanelSummary>) -> Self {
        Self {
            generated_at: Utc::now(),
            panel,
            estimate,
        }
    }
}

impl Exporter for DidReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(Vec::new());
                for record in estimate_records(&self.estimate) {
                    wtr.serialize(record)?;
                }
                let bytes = wtr
                    .into_inner()
                    .map_err(|e| OutputError::Io(e.into_error()))?;
                String::from_utf8(bytes).map_err(|e| {
                    OutputError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
                })
            }
        }
    }
}
