//! Daily market observations and the panel loader.
//!
//! The input file carries one row per market and day with the columns
//! `date, dma, revenue, search_stays_on, treatment_period`. Column order is
//! free but every column must be present. Loading fails on the first
//! malformed record.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Date format of the raw panel, e.g. `22-May-12`.
pub const DATE_FORMAT: &str = "%d-%b-%y";

/// Columns the raw panel must provide.
pub const REQUIRED_COLUMNS: [&str; 5] =
    ["date", "dma", "revenue", "search_stays_on", "treatment_period"];

/// Designated market area code.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    From,
    Into,
)]
#[serde(transparent)]
pub struct MarketId(pub i64);

/// Experimental arm of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    /// Paid search switched off (`search_stays_on == 0`).
    #[display("treated")]
    Treated,
    /// Paid search left on (`search_stays_on == 1`).
    #[display("control")]
    Control,
}

impl Group {
    /// Map the `search_stays_on` indicator to a group.
    pub const fn from_search_stays_on(flag: bool) -> Self {
        if flag { Self::Control } else { Self::Treated }
    }

    /// Value of the `search_stays_on` column for this group.
    pub const fn search_stays_on(self) -> i32 {
        match self {
            Self::Treated => 0,
            Self::Control => 1,
        }
    }
}

/// Pre- or post-intervention window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// `treatment_period == 0`
    #[display("pre")]
    Pre,
    /// `treatment_period == 1`
    #[display("post")]
    Post,
}

impl Period {
    /// Value of the `treatment_period` column for this period.
    pub const fn flag(self) -> i32 {
        match self {
            Self::Pre => 0,
            Self::Post => 1,
        }
    }
}

/// One market-day of revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Market.
    pub dma: MarketId,
    /// Calendar day.
    pub date: NaiveDate,
    /// Revenue, strictly positive.
    pub revenue: f64,
    /// Experimental arm.
    pub group: Group,
    /// Intervention window.
    pub period: Period,
}

impl Observation {
    /// Natural log of revenue.
    pub fn log_revenue(&self) -> f64 {
        self.revenue.ln()
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    date: String,
    dma: i64,
    revenue: f64,
    search_stays_on: i64,
    treatment_period: i64,
}

fn indicator(record: usize, column: &'static str, value: i64) -> Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(DataError::InvalidFlag {
            record,
            column,
            value,
        }),
    }
}

impl RawRecord {
    fn into_observation(self, record: usize) -> Result<Observation> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).map_err(|_| {
            DataError::InvalidDate {
                record,
                value: self.date.clone(),
                format: DATE_FORMAT,
            }
        })?;

        let dma = MarketId(self.dma);
        if !(self.revenue.is_finite() && self.revenue > 0.0) {
            return Err(DataError::InvalidRevenue {
                record,
                dma,
                value: self.revenue,
            });
        }

        let group = Group::from_search_stays_on(indicator(
            record,
            "search_stays_on",
            self.search_stays_on,
        )?);
        let period = if indicator(record, "treatment_period", self.treatment_period)? {
            Period::Post
        } else {
            Period::Pre
        };

        Ok(Observation {
            dma,
            date,
            revenue: self.revenue,
            group,
            period,
        })
    }
}

/// Check that every column in `required` is in the header row.
pub(crate) fn require_columns(
    headers: &csv::StringRecord,
    required: &[&'static str],
    source_name: &str,
) -> Result<()> {
    for &column in required {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(DataError::MissingColumn {
                column,
                source_name: source_name.to_string(),
            });
        }
    }
    Ok(())
}

/// Read observations from any CSV source.
///
/// `source_name` is only used in error messages.
pub fn read_observations<R: std::io::Read>(
    reader: R,
    source_name: &str,
) -> Result<Vec<Observation>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    require_columns(rdr.headers()?, &REQUIRED_COLUMNS, source_name)?;

    let mut observations = Vec::new();
    let mut groups: HashMap<MarketId, Group> = HashMap::new();

    for (idx, raw) in rdr.deserialize::<RawRecord>().enumerate() {
        let obs = raw?.into_observation(idx + 1)?;

        let first = *groups.entry(obs.dma).or_insert(obs.group);
        if first != obs.group {
            return Err(DataError::MixedGroup {
                dma: obs.dma,
                first,
                second: obs.group,
            });
        }

        observations.push(obs);
    }

    if observations.is_empty() {
        return Err(DataError::EmptyPanel(source_name.to_string()));
    }

    debug!(
        observations = observations.len(),
        markets = groups.len(),
        source = source_name,
        "loaded panel"
    );

    Ok(observations)
}

/// Load the raw panel from a CSV file.
pub fn load_observations(path: &Path) -> Result<Vec<Observation>> {
    let file = std::fs::File::open(path)?;
    read_observations(file, &path.display().to_string())
}

/// Headline counts for a loaded panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSummary {
    /// Number of market-day rows.
    pub observations: usize,
    /// Distinct treated markets.
    pub treated_markets: usize,
    /// Distinct control markets.
    pub control_markets: usize,
    /// Earliest date in the panel.
    pub first_date: NaiveDate,
    /// Latest date in the panel.
    pub last_date: NaiveDate,
}

impl PanelSummary {
    /// Summarize a non-empty panel.
    pub fn from_observations(observations: &[Observation]) -> Result<Self> {
        let first_date = observations
            .iter()
            .map(|o| o.date)
            .min()
            .ok_or_else(|| DataError::EmptyPanel("panel summary".to_string()))?;
        let last_date = observations
            .iter()
            .map(|o| o.date)
            .max()
            .unwrap_or(first_date);

        let mut groups: HashMap<MarketId, Group> = HashMap::new();
        for obs in observations {
            groups.insert(obs.dma, obs.group);
        }
        let treated_markets = groups.values().filter(|g| **g == Group::Treated).count();

        Ok(Self {
            observations: observations.len(),
            treated_markets,
            control_markets: groups.len() - treated_markets,
            first_date,
            last_date,
        })
    }
}

impl fmt::Display for PanelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Treated DMAs: {}", self.treated_markets)?;
        writeln!(f, "Untreated DMAs: {}", self.control_markets)?;
        write!(f, "Date range: {} to {}", self.first_date, self.last_date)
    }
}
