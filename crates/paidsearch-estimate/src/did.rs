//! Difference-in-differences estimator
//!
//! With `r1` the treated markets' post-minus-pre mean log revenue and `r0`
//! the control markets' equivalent:
//!
//! ```text
//! gamma_hat = mean(r1) - mean(r0)
//! se        = sqrt(var(r1) / n1 + var(r0) / n0)
//! ci        = gamma_hat +/- z * se
//! ```
//!
//! Variances are sample variances and the interval uses a normal critical
//! value rather than a t quantile.

use crate::error::{EstimateError, EstimateWarning, Result};
use crate::group::GroupSummary;
use paidsearch_data::{Group, MarketTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Two-sided 95% normal critical value.
pub const Z_95: f64 = 1.96;

/// Configuration for DID estimation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DidConfig {
    /// Normal critical value for the confidence interval
    pub z_critical: f64,

    /// Minimum markets with a usable difference per group (at least 2)
    pub min_markets_per_group: usize,
}

impl Default for DidConfig {
    fn default() -> Self {
        Self {
            z_critical: Z_95,
            min_markets_per_group: 2,
        }
    }
}

/// DID point estimate with its sampling uncertainty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DidEstimate {
    /// Treated group moments
    pub treated: GroupSummary,
    /// Control group moments
    pub control: GroupSummary,
    /// Point estimate on the log scale
    pub gamma_hat: f64,
    /// Unpooled standard error
    pub std_error: f64,
    /// Critical value used for the interval
    pub z_critical: f64,
    /// Lower confidence bound, log scale
    pub ci_lower: f64,
    /// Upper confidence bound, log scale
    pub ci_upper: f64,
    /// `exp(gamma_hat)`, the multiplicative revenue effect
    pub gamma_hat_exp: f64,
    /// `exp(ci_lower)`
    pub ci_lower_exp: f64,
    /// `exp(ci_upper)`
    pub ci_upper_exp: f64,
    /// Excluded markets and degenerate-statistics notices
    pub warnings: Vec<EstimateWarning>,
}

impl DidEstimate {
    /// Implied change in revenue, `exp(gamma_hat) - 1`.
    pub fn percent_effect(&self) -> f64 {
        self.gamma_hat.exp_m1()
    }

    /// Whether the estimate carries any warning.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Difference-in-differences estimator
#[derive(Debug, Default)]
pub struct DidEstimator {
    config: DidConfig,
}

impl DidEstimator {
    /// Create a new estimator
    pub fn new(config: DidConfig) -> Result<Self> {
        if !(config.z_critical.is_finite() && config.z_critical > 0.0) {
            return Err(EstimateError::InvalidConfig(format!(
                "z_critical must be positive and finite, got {}",
                config.z_critical
            )));
        }
        Ok(Self { config })
    }

    /// Current configuration
    pub const fn config(&self) -> &DidConfig {
        &self.config
    }

    /// Estimate the effect from the treated and control per-market tables.
    ///
    /// Markets with a missing difference are dropped and reported in
    /// [`DidEstimate::warnings`].
    pub fn estimate(&self, treated: &MarketTable, control: &MarketTable) -> Result<DidEstimate> {
        if treated.group != Group::Treated || control.group != Group::Control {
            return Err(EstimateError::InvalidConfig(format!(
                "expected (treated, control) tables, got ({}, {})",
                treated.group, control.group
            )));
        }

        let min = self.config.min_markets_per_group;
        let treated = GroupSummary::from_table(treated, min)?;
        let control = GroupSummary::from_table(control, min)?;

        let gamma_hat = treated.mean - control.mean;
        // Both moments are finite, so each term is at most f64::MAX / 2.
        let std_error = (treated.mean_variance() + control.mean_variance()).sqrt();

        let z = self.config.z_critical;
        let ci_lower = gamma_hat - z * std_error;
        let ci_upper = gamma_hat + z * std_error;

        let mut warnings = treated.warnings();
        warnings.extend(control.warnings());
        for warning in &warnings {
            warn!("{warning}");
        }

        debug!(
            gamma_hat,
            std_error,
            n_treated = treated.n,
            n_control = control.n,
            "estimated DID effect"
        );

        Ok(DidEstimate {
            treated,
            control,
            gamma_hat,
            std_error,
            z_critical: z,
            ci_lower,
            ci_upper,
            gamma_hat_exp: gamma_hat.exp(),
            ci_lower_exp: ci_lower.exp(),
            ci_upper_exp: ci_upper.exp(),
            warnings,
        })
    }
}
