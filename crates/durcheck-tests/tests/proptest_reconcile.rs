//! Property-based tests for the duration reconciler using proptest.
//!
//! ```bash
//! cargo test -p durcheck-tests --test proptest_reconcile
//! ```

use proptest::prelude::*;

use durcheck_core::{
    reconcile, ticks_to_seconds, Measurement, ReconcileConfig, ReconcileError,
    ReconciliationResult,
};

fn measurement_set() -> impl Strategy<Value = Vec<Measurement>> {
    prop::collection::vec(0.0f64..600.0, 1..12).prop_map(|lengths| {
        lengths
            .into_iter()
            .enumerate()
            .map(|(i, seconds)| Measurement::new(format!("file{}.wav", i), seconds, "test"))
            .collect()
    })
}

fn outlier_sources(result: &ReconciliationResult) -> Vec<String> {
    let mut sources: Vec<String> = result
        .outliers()
        .iter()
        .map(|m| m.source().to_string())
        .collect();
    sources.sort();
    sources
}

fn tolerance() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), Just(0.01), 0.0f64..5.0]
}

proptest! {
    /// The range is bounded by the shortest and longest measurement.
    #[test]
    fn range_is_bounded_by_inputs(set in measurement_set(), tol in tolerance()) {
        let result = reconcile(&set, &ReconcileConfig::with_tolerance(tol)).unwrap();
        prop_assert!(result.min_seconds() <= result.max_seconds());
        prop_assert!(result.difference() >= 0.0);
        prop_assert_eq!(result.difference(), result.max_seconds() - result.min_seconds());
        for m in &set {
            prop_assert!(result.min_seconds() <= m.seconds());
            prop_assert!(m.seconds() <= result.max_seconds());
        }
        prop_assert!(set.iter().any(|m| m.seconds() == result.min_seconds()));
        prop_assert!(set.iter().any(|m| m.seconds() == result.max_seconds()));
    }

    /// Agreement and the outlier list always tell the same story.
    #[test]
    fn within_tolerance_iff_no_outliers(set in measurement_set(), tol in tolerance()) {
        let result = reconcile(&set, &ReconcileConfig::with_tolerance(tol)).unwrap();
        prop_assert_eq!(result.within_tolerance(), result.outliers().is_empty());
    }

    /// Outliers are exactly the measurements more than `tol` above the minimum,
    /// kept in input order.
    #[test]
    fn outliers_are_the_excessive_subsequence(set in measurement_set(), tol in tolerance()) {
        let result = reconcile(&set, &ReconcileConfig::with_tolerance(tol)).unwrap();
        let expected: Vec<&Measurement> = set
            .iter()
            .filter(|m| m.seconds() - result.min_seconds() > tol)
            .collect();
        let actual: Vec<&Measurement> = result.outliers().iter().collect();
        prop_assert_eq!(actual, expected);
    }

    /// A single measurement always agrees with itself.
    #[test]
    fn single_measurement_agrees(seconds in 0.0f64..10_000.0, tol in tolerance()) {
        let set = vec![Measurement::new("only.wav", seconds, "test")];
        let result = reconcile(&set, &ReconcileConfig::with_tolerance(tol)).unwrap();
        prop_assert!(result.within_tolerance());
        prop_assert_eq!(result.difference(), 0.0);
    }

    /// Any permutation of the input yields the same range, verdict, and set
    /// of outliers.
    #[test]
    fn order_does_not_change_the_verdict(
        (set, shuffled) in measurement_set()
            .prop_flat_map(|set| (Just(set.clone()), Just(set).prop_shuffle())),
        tol in tolerance(),
    ) {
        let config = ReconcileConfig::with_tolerance(tol);
        let original = reconcile(&set, &config).unwrap();
        let permuted = reconcile(&shuffled, &config).unwrap();

        prop_assert_eq!(original.min_seconds(), permuted.min_seconds());
        prop_assert_eq!(original.max_seconds(), permuted.max_seconds());
        prop_assert_eq!(original.within_tolerance(), permuted.within_tolerance());
        prop_assert_eq!(outlier_sources(&original), outlier_sources(&permuted));
    }

    /// Reconciling the same input twice gives the same result.
    #[test]
    fn reconcile_is_deterministic(set in measurement_set(), tol in tolerance()) {
        let config = ReconcileConfig::with_tolerance(tol);
        prop_assert_eq!(reconcile(&set, &config).unwrap(), reconcile(&set, &config).unwrap());
    }

    /// Non-finite or negative durations are rejected, never reconciled.
    #[test]
    fn invalid_measurement_is_rejected(
        mut set in measurement_set(),
        bad in prop_oneof![Just(f64::NAN), Just(f64::INFINITY), -1000.0f64..-0.001],
    ) {
        set.push(Measurement::new("bad.wav", bad, "test"));
        let err = reconcile(&set, &ReconcileConfig::default()).unwrap_err();
        let is_invalid = matches!(err, ReconcileError::InvalidMeasurement { .. });
        prop_assert!(is_invalid);
    }

    /// Tick conversion scales linearly with the tick count.
    #[test]
    fn ticks_scale_linearly(
        ticks in 0u64..1_000_000,
        tpb in 1u16..=960,
        tempo in 1u32..=2_000_000,
    ) {
        let one = ticks_to_seconds(ticks, tpb, tempo).unwrap();
        let two = ticks_to_seconds(ticks * 2, tpb, tempo).unwrap();
        prop_assert!(one >= 0.0);
        prop_assert!((two - 2.0 * one).abs() <= 1e-9 * two.max(1.0));
    }
}

#[test]
fn empty_input_is_an_error() {
    assert_eq!(
        reconcile(&[], &ReconcileConfig::default()).unwrap_err(),
        ReconcileError::EmptyInput
    );
}
