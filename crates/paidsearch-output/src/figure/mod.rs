//! Diagnostic figures.
//!
//! Both charts plot daily group averages with a dashed vertical line at the
//! date paid search was switched off in the treated markets.

pub mod axis;
pub mod canvas;
pub mod charts;
#[cfg(feature = "png")]
pub mod png;

pub use charts::{log_revenue_gap_svg, revenue_by_group_svg};

use crate::error::Result;
use chrono::NaiveDate;
use paidsearch_data::DailyGroupMeans;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File stem of the group revenue chart.
pub const REVENUE_FIGURE: &str = "figure_5_2";
/// File stem of the log revenue gap chart.
pub const LOG_GAP_FIGURE: &str = "figure_5_3";

/// Date paid search was turned off in treated markets.
pub const INTERVENTION_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2012, 5, 22) {
    Some(date) => date,
    None => panic!("invalid intervention date"),
};

/// Image encoding of written figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FigureFormat {
    /// Scalable vector graphics
    #[default]
    Svg,
    /// Rasterized PNG
    #[cfg(feature = "png")]
    Png,
}

impl FigureFormat {
    /// File extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Svg => "svg",
            #[cfg(feature = "png")]
            Self::Png => "png",
        }
    }
}

/// Figure geometry and annotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
    /// Where the dashed marker is drawn
    pub intervention_date: NaiveDate,
    /// Output encoding
    pub format: FigureFormat,
    /// Scale factor applied when rasterizing
    pub png_scale: f32,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            intervention_date: INTERVENTION_DATE,
            format: FigureFormat::Svg,
            png_scale: 1.0,
        }
    }
}

fn write_figure(svg: &str, dir: &Path, stem: &str, config: &FigureConfig) -> Result<PathBuf> {
    let path = dir.join(format!("{stem}.{}", config.format.extension()));
    match config.format {
        FigureFormat::Svg => std::fs::write(&path, svg)?,
        #[cfg(feature = "png")]
        FigureFormat::Png => std::fs::write(&path, png::svg_to_png(svg, config.png_scale)?)?,
    }
    debug!(path = %path.display(), "wrote figure");
    Ok(path)
}

/// Render both charts into `dir`, creating it if needed, and return the
/// written paths (revenue chart first).
pub fn write_figures(
    daily: &[DailyGroupMeans],
    dir: &Path,
    config: &FigureConfig,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let revenue = revenue_by_group_svg(daily, config)?;
    let gap = log_revenue_gap_svg(daily, config)?;
    Ok(vec![
        write_figure(&revenue, dir, REVENUE_FIGURE, config)?,
        write_figure(&gap, dir, LOG_GAP_FIGURE, config)?,
    ])
}
