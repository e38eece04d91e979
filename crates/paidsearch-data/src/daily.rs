//! Per-date group averages.
//!
//! Feeds the two diagnostic figures: mean revenue of each group over time
//! and the gap in mean log revenue between control and treated markets.

use crate::error::{DataError, Result};
use crate::observation::{Group, Observation};
use crate::pivot::observation_frame;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Group averages on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyGroupMeans {
    /// Calendar day.
    pub date: NaiveDate,
    /// Mean revenue across treated markets.
    pub treated_revenue: Option<f64>,
    /// Mean revenue across control markets.
    pub control_revenue: Option<f64>,
    /// Mean log revenue across treated markets.
    pub treated_log_revenue: Option<f64>,
    /// Mean log revenue across control markets.
    pub control_log_revenue: Option<f64>,
}

impl DailyGroupMeans {
    /// `log(rev_control) - log(rev_treat)` for the day, if both groups
    /// reported.
    pub fn log_gap(&self) -> Option<f64> {
        self.control_log_revenue
            .zip(self.treated_log_revenue)
            .map(|(control, treated)| control - treated)
    }
}

fn group_daily(daily: &LazyFrame, group: Group) -> LazyFrame {
    let name = group.to_string();
    daily
        .clone()
        .filter(col("search_stays_on").eq(lit(group.search_stays_on())))
        .select([
            col("day"),
            col("mean_revenue").alias(format!("{name}_revenue")),
            col("mean_log_revenue").alias(format!("{name}_log_revenue")),
        ])
}

/// Average revenue and log revenue per date and group, sorted by date.
pub fn daily_group_means(observations: &[Observation]) -> Result<Vec<DailyGroupMeans>> {
    let frame = observation_frame(observations)?.lazy();

    let daily = frame
        .clone()
        .group_by([col("day"), col("search_stays_on")])
        .agg([
            col("revenue").mean().alias("mean_revenue"),
            col("log_revenue").mean().alias("mean_log_revenue"),
        ]);

    let days = frame
        .group_by([col("day")])
        .agg([col("revenue").count().alias("n_obs")]);

    let wide = days
        .join(
            group_daily(&daily, Group::Treated),
            [col("day")],
            [col("day")],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            group_daily(&daily, Group::Control),
            [col("day")],
            [col("day")],
            JoinArgs::new(JoinType::Left),
        )
        .sort(["day"], Default::default())
        .collect()?;

    let days = wide.column("day")?.i32()?;
    let treated_revenue = wide.column("treated_revenue")?.f64()?;
    let control_revenue = wide.column("control_revenue")?.f64()?;
    let treated_log = wide.column("treated_log_revenue")?.f64()?;
    let control_log = wide.column("control_log_revenue")?.f64()?;

    let mut out = Vec::with_capacity(wide.height());
    for i in 0..wide.height() {
        let date = days
            .get(i)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .ok_or_else(|| DataError::Parse(format!("Invalid day ordinal at row {i}")))?;
        out.push(DailyGroupMeans {
            date,
            treated_revenue: treated_revenue.get(i),
            control_revenue: control_revenue.get(i),
            treated_log_revenue: treated_log.get(i),
            control_log_revenue: control_log.get(i),
        });
    }

    Ok(out)
}
