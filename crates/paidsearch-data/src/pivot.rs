//! Per-market pre/post aggregation.
//!
//! Each group is reduced to one row per market holding the mean log revenue
//! of the pre and post windows and their difference. A market without rows
//! in one of the windows keeps a null in that column, and the difference
//! stays null as well.

use crate::error::{DataError, Result};
use crate::observation::{Group, MarketId, Observation, Period, require_columns};
use chrono::Datelike;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Header of a persisted per-market table.
pub const MARKET_TABLE_COLUMNS: [&str; 4] =
    ["dma", "log_revenue_pre", "log_revenue_post", "log_revenue_diff"];

/// Pre/post mean log revenue for one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAggregate {
    /// Market.
    pub dma: MarketId,
    /// Mean log revenue before the intervention.
    pub log_revenue_pre: Option<f64>,
    /// Mean log revenue after the intervention.
    pub log_revenue_post: Option<f64>,
    /// `log_revenue_post - log_revenue_pre`, missing if either side is.
    pub log_revenue_diff: Option<f64>,
}

impl MarketAggregate {
    /// Build a row, deriving the difference from the two window means.
    pub fn new(dma: MarketId, log_revenue_pre: Option<f64>, log_revenue_post: Option<f64>) -> Self {
        let log_revenue_diff = log_revenue_post.zip(log_revenue_pre).map(|(post, pre)| post - pre);
        Self {
            dma,
            log_revenue_pre,
            log_revenue_post,
            log_revenue_diff,
        }
    }
}

/// One row per market for a single experimental group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTable {
    /// Group every row belongs to.
    pub group: Group,
    /// Rows sorted by market id.
    pub rows: Vec<MarketAggregate>,
}

impl MarketTable {
    /// Create a table, rejecting duplicate markets.
    pub fn new(group: Group, mut rows: Vec<MarketAggregate>) -> Result<Self> {
        rows.sort_by_key(|r| r.dma);
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            if !seen.insert(row.dma) {
                return Err(DataError::DuplicateMarket(row.dma));
            }
        }
        Ok(Self { group, rows })
    }

    /// Number of markets.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no markets.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Markets whose difference is missing.
    pub fn missing_diff_markets(&self) -> Vec<MarketId> {
        self.rows
            .iter()
            .filter(|r| r.log_revenue_diff.is_none())
            .map(|r| r.dma)
            .collect()
    }

    /// Write the table as CSV, creating parent directories and replacing
    /// any existing file. Missing values become empty cells.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut wtr = csv::Writer::from_path(path)?;
        if self.rows.is_empty() {
            wtr.write_record(MARKET_TABLE_COLUMNS)?;
        }
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;

        debug!(group = %self.group, markets = self.len(), path = %path.display(), "wrote market table");
        Ok(())
    }

    /// Read a table written by [`MarketTable::write_csv`].
    pub fn read_csv(path: &Path, group: Group) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, group, &path.display().to_string())
    }

    /// Read a table from any CSV source.
    pub fn from_reader<R: std::io::Read>(reader: R, group: Group, source_name: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        require_columns(rdr.headers()?, &MARKET_TABLE_COLUMNS, source_name)?;

        let rows = rdr
            .deserialize::<MarketAggregate>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Self::new(group, rows)
    }
}

/// Assemble the observation frame used by the polars queries.
///
/// Dates are stored as days from the common era so they survive the
/// round-trip without a temporal dtype.
pub(crate) fn observation_frame(observations: &[Observation]) -> Result<DataFrame> {
    let dmas: Vec<i64> = observations.iter().map(|o| o.dma.0).collect();
    let days: Vec<i32> = observations.iter().map(|o| o.date.num_days_from_ce()).collect();
    let revenues: Vec<f64> = observations.iter().map(|o| o.revenue).collect();
    let log_revenues: Vec<f64> = observations.iter().map(Observation::log_revenue).collect();
    let stays_on: Vec<i32> = observations.iter().map(|o| o.group.search_stays_on()).collect();
    let periods: Vec<i32> = observations.iter().map(|o| o.period.flag()).collect();

    let df = DataFrame::new(vec![
        Series::new("dma".into(), dmas).into(),
        Series::new("day".into(), days).into(),
        Series::new("revenue".into(), revenues).into(),
        Series::new("log_revenue".into(), log_revenues).into(),
        Series::new("search_stays_on".into(), stays_on).into(),
        Series::new("treatment_period".into(), periods).into(),
    ])?;

    Ok(df)
}

fn period_means(means: &LazyFrame, period: Period, alias: &str) -> LazyFrame {
    means
        .clone()
        .filter(col("treatment_period").eq(lit(period.flag())))
        .select([col("dma"), col("mean_log_revenue").alias(alias)])
}

/// Pivot one group of the observation frame into per-market rows.
fn pivot_group(frame: &DataFrame, group: Group) -> Result<MarketTable> {
    let group_rows = frame
        .clone()
        .lazy()
        .filter(col("search_stays_on").eq(lit(group.search_stays_on())));

    let means = group_rows
        .clone()
        .group_by([col("dma"), col("treatment_period")])
        .agg([col("log_revenue").mean().alias("mean_log_revenue")]);

    let markets = group_rows
        .group_by([col("dma")])
        .agg([col("log_revenue").count().alias("n_obs")]);

    let pivot = markets
        .join(
            period_means(&means, Period::Pre, "log_revenue_pre"),
            [col("dma")],
            [col("dma")],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            period_means(&means, Period::Post, "log_revenue_post"),
            [col("dma")],
            [col("dma")],
            JoinArgs::new(JoinType::Left),
        )
        .with_column((col("log_revenue_post") - col("log_revenue_pre")).alias("log_revenue_diff"))
        .select([
            col("dma"),
            col("log_revenue_pre"),
            col("log_revenue_post"),
            col("log_revenue_diff"),
        ])
        .sort(["dma"], Default::default())
        .collect()?;

    let dmas = pivot.column("dma")?.i64()?;
    let pre = pivot.column("log_revenue_pre")?.f64()?;
    let post = pivot.column("log_revenue_post")?.f64()?;
    let diff = pivot.column("log_revenue_diff")?.f64()?;

    let mut rows = Vec::with_capacity(pivot.height());
    for i in 0..pivot.height() {
        let dma = dmas
            .get(i)
            .ok_or_else(|| DataError::Parse("Missing dma in pivot".to_string()))?;
        rows.push(MarketAggregate {
            dma: MarketId(dma),
            log_revenue_pre: pre.get(i),
            log_revenue_post: post.get(i),
            log_revenue_diff: diff.get(i),
        });
    }

    let table = MarketTable::new(group, rows)?;
    debug!(
        %group,
        markets = table.len(),
        missing_diff = table.missing_diff_markets().len(),
        "pivoted market table"
    );
    Ok(table)
}

/// Reduce the panel to per-market pre/post tables, returned as
/// `(treated, control)`.
pub fn build_market_tables(observations: &[Observation]) -> Result<(MarketTable, MarketTable)> {
    if observations.is_empty() {
        return Err(DataError::EmptyPanel("market aggregation".to_string()));
    }
    let frame = observation_frame(observations)?;
    let treated = pivot_group(&frame, Group::Treated)?;
    let control = pivot_group(&frame, Group::Control)?;
    Ok((treated, control))
}
