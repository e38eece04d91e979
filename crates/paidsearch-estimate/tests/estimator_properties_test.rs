//! Statistical properties of the DID estimator on synthetic panels.

use approx::assert_relative_eq;
use paidsearch_data::{Group, MarketAggregate, MarketId, MarketTable};
use paidsearch_estimate::{DidEstimator, EstimateError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Table whose pre means are arbitrary and whose diffs are `shift` plus
/// uniform noise on [-0.5, 0.5).
fn synthetic_table(rng: &mut StdRng, group: Group, markets: usize, shift: f64) -> MarketTable {
    let rows = (0..markets)
        .map(|i| {
            let pre = rng.gen_range(8.0..12.0);
            let diff = shift + rng.gen_range(-0.5..0.5);
            MarketAggregate::new(MarketId(i as i64), Some(pre), Some(pre + diff))
        })
        .collect();
    MarketTable::new(group, rows).unwrap()
}

#[test]
fn test_standard_error_finite_and_non_negative() {
    let mut rng = StdRng::seed_from_u64(7);
    let estimator = DidEstimator::default();

    for markets in [2, 3, 10, 50, 200] {
        let treated = synthetic_table(&mut rng, Group::Treated, markets, -0.1);
        let control = synthetic_table(&mut rng, Group::Control, markets, 0.0);
        let est = estimator.estimate(&treated, &control).unwrap();

        assert!(est.std_error.is_finite());
        assert!(est.std_error >= 0.0);
        assert!(est.ci_lower <= est.gamma_hat && est.gamma_hat <= est.ci_upper);
    }
}

#[test]
fn test_identical_distributions_estimate_near_zero() {
    let mut rng = StdRng::seed_from_u64(42);
    let estimator = DidEstimator::default();

    let treated = synthetic_table(&mut rng, Group::Treated, 5_000, 0.0);
    let control = synthetic_table(&mut rng, Group::Control, 5_000, 0.0);
    let est = estimator.estimate(&treated, &control).unwrap();

    // Noise variance is 1/12, so se is about sqrt(2 / 12 / 5000) ~ 0.0058.
    assert!(est.gamma_hat.abs() < 0.03, "gamma_hat = {}", est.gamma_hat);
    assert!(est.std_error < 0.01);
}

#[test]
fn test_recovers_planted_effect() {
    let mut rng = StdRng::seed_from_u64(3);
    let treated = synthetic_table(&mut rng, Group::Treated, 2_000, -0.25);
    let control = synthetic_table(&mut rng, Group::Control, 2_000, 0.05);
    let est = DidEstimator::default().estimate(&treated, &control).unwrap();

    assert!((est.gamma_hat + 0.30).abs() < 0.05);
    assert!(est.ci_lower < -0.30 && -0.30 < est.ci_upper);
}

#[test]
fn test_level_bounds_match_exponentiated_log_bounds() {
    let mut rng = StdRng::seed_from_u64(11);
    let treated = synthetic_table(&mut rng, Group::Treated, 40, -0.05);
    let control = synthetic_table(&mut rng, Group::Control, 60, 0.0);
    let est = DidEstimator::default().estimate(&treated, &control).unwrap();

    assert_relative_eq!(est.ci_lower_exp, est.ci_lower.exp());
    assert_relative_eq!(est.ci_upper_exp, est.ci_upper.exp());
    assert_relative_eq!(est.gamma_hat_exp, est.gamma_hat.exp());
}

#[test]
fn test_pre_only_market_is_flagged_not_zeroed() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut treated = synthetic_table(&mut rng, Group::Treated, 20, 0.3);
    let control = synthetic_table(&mut rng, Group::Control, 20, 0.0);
    let baseline = DidEstimator::default().estimate(&treated, &control).unwrap();

    treated
        .rows
        .push(MarketAggregate::new(MarketId(999), Some(10.0), None));
    let with_gap = DidEstimator::default().estimate(&treated, &control).unwrap();

    assert_relative_eq!(with_gap.gamma_hat, baseline.gamma_hat);
    assert_eq!(with_gap.treated.n, 20);
    assert_eq!(with_gap.treated.excluded, vec![MarketId(999)]);
    assert!(with_gap.has_warnings());
}

#[test]
fn test_all_markets_missing_is_an_error() {
    let treated = MarketTable::new(
        Group::Treated,
        vec![
            MarketAggregate::new(MarketId(1), Some(1.0), None),
            MarketAggregate::new(MarketId(2), None, Some(1.0)),
        ],
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let control = synthetic_table(&mut rng, Group::Control, 5, 0.0);

    let err = DidEstimator::default()
        .estimate(&treated, &control)
        .unwrap_err();
    assert!(matches!(
        err,
        EstimateError::InsufficientMarkets { actual: 0, .. }
    ));
}
