//! Within-group moments of the log revenue change.

use crate::error::{EstimateError, EstimateWarning, Result};
use ndarray::Array1;
use paidsearch_data::{Group, MarketId, MarketTable};
use serde::{Deserialize, Serialize};

/// Sample moments of `log_revenue_diff` for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Group the moments describe
    pub group: Group,
    /// Markets with a usable difference
    pub n: usize,
    /// Sample mean of the differences
    pub mean: f64,
    /// Sample variance of the differences (n - 1 denominator)
    pub variance: f64,
    /// Markets left out because their difference is missing
    pub excluded: Vec<MarketId>,
}

impl GroupSummary {
    /// Compute moments over the markets that have a difference.
    ///
    /// Fails when fewer than `min_markets` usable markets remain, since the
    /// sample variance (and hence the standard error) is undefined.
    pub fn from_table(table: &MarketTable, min_markets: usize) -> Result<Self> {
        let diffs: Array1<f64> = table
            .rows
            .iter()
            .filter_map(|r| r.log_revenue_diff)
            .collect();
        let excluded = table.missing_diff_markets();

        let n = diffs.len();
        if n < min_markets.max(2) {
            return Err(EstimateError::InsufficientMarkets {
                group: table.group,
                required: min_markets.max(2),
                actual: n,
            });
        }

        let mean = diffs.mean().unwrap_or(f64::NAN);
        let variance = diffs.var(1.0);

        for (quantity, value) in [("group mean", mean), ("group variance", variance)] {
            if !value.is_finite() {
                return Err(EstimateError::NonFinite { quantity, value });
            }
        }

        Ok(Self {
            group: table.group,
            n,
            mean,
            variance,
            excluded,
        })
    }

    /// Variance of the group mean, `variance / n`.
    pub fn mean_variance(&self) -> f64 {
        self.variance / self.n as f64
    }

    /// Warnings raised while summarizing the group.
    pub fn warnings(&self) -> Vec<EstimateWarning> {
        let mut warnings: Vec<EstimateWarning> = self
            .excluded
            .iter()
            .map(|&dma| EstimateWarning::MissingDiff {
                group: self.group,
                dma,
            })
            .collect();
        if self.variance == 0.0 {
            warnings.push(EstimateWarning::ZeroVariance { group: self.group });
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use paidsearch_data::MarketAggregate;

    fn table(group: Group, diffs: &[Option<f64>]) -> MarketTable {
        let rows = diffs
            .iter()
            .enumerate()
            .map(|(i, d)| MarketAggregate::new(MarketId(i as i64), Some(0.0), *d))
            .collect();
        MarketTable::new(group, rows).unwrap()
    }

    #[test]
    fn test_sample_variance() {
        let summary =
            GroupSummary::from_table(&table(Group::Treated, &[Some(1.0), Some(2.0), Some(3.0)]), 2)
                .unwrap();
        assert_eq!(summary.n, 3);
        assert_relative_eq!(summary.mean, 2.0);
        assert_relative_eq!(summary.variance, 1.0);
        assert_relative_eq!(summary.mean_variance(), 1.0 / 3.0);
        assert!(summary.warnings().is_empty());
    }

    #[test]
    fn test_missing_excluded_not_zeroed() {
        let summary = GroupSummary::from_table(
            &table(Group::Control, &[Some(0.4), None, Some(0.6)]),
            2,
        )
        .unwrap();
        assert_eq!(summary.n, 2);
        assert_relative_eq!(summary.mean, 0.5);
        assert_eq!(summary.excluded, vec![MarketId(1)]);
        assert_eq!(
            summary.warnings(),
            vec![EstimateWarning::MissingDiff {
                group: Group::Control,
                dma: MarketId(1)
            }]
        );
    }

    #[test]
    fn test_single_market_rejected() {
        let err = GroupSummary::from_table(&table(Group::Treated, &[Some(0.1), None]), 2)
            .unwrap_err();
        assert!(matches!(
            err,
            EstimateError::InsufficientMarkets {
                group: Group::Treated,
                required: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_minimum_never_below_two() {
        let err = GroupSummary::from_table(&table(Group::Treated, &[Some(0.1)]), 0).unwrap_err();
        assert!(matches!(err, EstimateError::InsufficientMarkets { required: 2, .. }));
    }

    #[test]
    fn test_zero_variance_warns() {
        let summary =
            GroupSummary::from_table(&table(Group::Control, &[Some(0.0), Some(0.0)]), 2).unwrap();
        assert_eq!(
            summary.warnings(),
            vec![EstimateWarning::ZeroVariance {
                group: Group::Control
            }]
        );
    }
}
