//! Two-stage study pipeline.
//!
//! `preprocess` turns the raw panel into the per-market tables and figures;
//! `estimate` reads the tables back and writes the results. The tables on
//! disk are the only state shared between the stages and are overwritten on
//! every run.

use paidsearch_data::{
    DataError, Group, MarketTable, PanelSummary, build_market_tables, daily_group_means,
    load_observations,
};
use paidsearch_estimate::{DidConfig, DidEstimator, EstimateError};
use paidsearch_output::{
    DidReport, ExportFormat, Exporter, FigureConfig, OutputError, write_figures,
    write_latex_table,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Errors from either pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading or reshaping failed
    #[error(transparent)]
    Data(#[from] DataError),

    /// Estimation failed
    #[error(transparent)]
    Estimate(#[from] EstimateError),

    /// Writing results failed
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Result type for pipeline stages.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Where each stage reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelinePaths {
    /// Raw daily panel
    pub input: PathBuf,
    /// Directory of the intermediate per-market tables
    pub temp_dir: PathBuf,
    /// Directory of the LaTeX table and JSON export
    pub tables_dir: PathBuf,
    /// Directory of the figures
    pub figures_dir: PathBuf,
}

impl Default for PipelinePaths {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input/PaidSearch.csv"),
            temp_dir: PathBuf::from("temp"),
            tables_dir: PathBuf::from("output/tables"),
            figures_dir: PathBuf::from("output/figures"),
        }
    }
}

impl PipelinePaths {
    /// Per-market table of the given group.
    pub fn market_table(&self, group: Group) -> PathBuf {
        match group {
            Group::Treated => self.temp_dir.join("treated_pivot.csv"),
            Group::Control => self.temp_dir.join("untreated_pivot.csv"),
        }
    }

    /// LaTeX results table.
    pub fn latex_table(&self) -> PathBuf {
        self.tables_dir.join("did_table.tex")
    }

    /// JSON export of the estimate.
    pub fn estimate_json(&self) -> PathBuf {
        self.tables_dir.join("did_estimate.json")
    }
}

/// What the preprocessing stage produced.
#[derive(Debug, Clone)]
pub struct PreprocessOutcome {
    /// Panel headline counts
    pub summary: PanelSummary,
    /// Treated per-market table
    pub treated: MarketTable,
    /// Control per-market table
    pub control: MarketTable,
    /// Written figure files
    pub figures: Vec<PathBuf>,
}

/// Load the panel, write both per-market tables and render the figures.
pub fn preprocess(paths: &PipelinePaths, figures: &FigureConfig) -> Result<PreprocessOutcome> {
    let observations = load_observations(&paths.input)?;
    let summary = PanelSummary::from_observations(&observations)?;

    let (treated, control) = build_market_tables(&observations)?;
    for table in [&treated, &control] {
        table.write_csv(&paths.market_table(table.group))?;
    }

    let daily = daily_group_means(&observations)?;
    let figures = write_figures(&daily, &paths.figures_dir, figures)?;

    info!(
        treated = treated.len(),
        control = control.len(),
        "preprocessing complete"
    );

    Ok(PreprocessOutcome {
        summary,
        treated,
        control,
        figures,
    })
}

/// Read the per-market tables, estimate the effect and write the LaTeX table
/// and JSON export.
pub fn estimate(
    paths: &PipelinePaths,
    config: DidConfig,
    panel: Option<PanelSummary>,
) -> Result<DidReport> {
    let treated = MarketTable::read_csv(&paths.market_table(Group::Treated), Group::Treated)?;
    let control = MarketTable::read_csv(&paths.market_table(Group::Control), Group::Control)?;

    let estimate = DidEstimator::new(config)?.estimate(&treated, &control)?;
    write_latex_table(&estimate, &paths.latex_table())?;

    let report = DidReport::new(estimate, panel);
    report.export_to_file(&paths.estimate_json(), ExportFormat::PrettyJson)?;

    info!(
        gamma_hat = report.estimate.gamma_hat,
        std_error = report.estimate.std_error,
        "estimation complete"
    );
    Ok(report)
}
