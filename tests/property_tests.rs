//! Property-based tests for collection and filter invariants
//!
//! - Filtering never grows a collection; a trivially-true predicate keeps it
//! - Slicing preserves relative order and clamps to bounds
//! - Iteration is restartable and identity-preserving
//! - Run with ProptestConfig::with_cases(100)

use proptest::prelude::*;
use repx_meta::experiment::Experiment;
use repx_meta::metadata::{JobMetadata, RunMetadata};
use repx_meta::query::Predicate;
use std::sync::Arc;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Generate an experiment with `n` jobs carrying an integer `count` param.
fn experiment_with_counts(counts: &[i64]) -> Experiment {
    let jobs = counts.iter().enumerate().map(|(i, count)| {
        JobMetadata::builder(format!("{i:04}-job"))
            .name(format!("job-{i}"))
            .stage_type(if count % 2 == 0 { "simple" } else { "worker" })
            .param("count", *count)
            .build()
    });
    Experiment::builder()
        .run(RunMetadata::new("generated", jobs))
        .build()
        .unwrap()
}

fn arb_counts() -> impl Strategy<Value = Vec<i64>> {
    proptest::collection::vec(-1000i64..1000, 0..32)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: a filtered collection never grows
    #[test]
    fn prop_filter_never_grows(counts in arb_counts(), threshold in -1000i64..1000) {
        let exp = experiment_with_counts(&counts);
        let jobs = exp.jobs();
        let filtered = jobs.filter([Predicate::parse("count__gte", threshold)]);

        prop_assert!(filtered.len() <= jobs.len());
        let expected = counts.iter().filter(|c| **c >= threshold).count();
        prop_assert_eq!(filtered.len(), expected);
    }

    /// Property: a trivially-true predicate preserves the collection
    #[test]
    fn prop_trivially_true_filter_is_identity(counts in arb_counts()) {
        let exp = experiment_with_counts(&counts);
        let jobs = exp.jobs();
        let filtered = jobs.filter([Predicate::parse("count__gte", -1000)]);

        prop_assert_eq!(filtered.len(), jobs.len());
        prop_assert_eq!(filtered.ids(), jobs.ids());
    }

    /// Property: filtering leaves the receiver untouched
    #[test]
    fn prop_filter_is_immutable_by_value(counts in arb_counts(), threshold in -1000i64..1000) {
        let exp = experiment_with_counts(&counts);
        let jobs = exp.jobs();
        let before: Vec<String> = jobs.ids().to_vec();
        let _ = jobs.filter([Predicate::parse("count__lt", threshold)]);
        prop_assert_eq!(jobs.ids(), &before[..]);
    }

    /// Property: slicing preserves relative order and clamps to length
    #[test]
    fn prop_slice_preserves_order(counts in arb_counts(), start in 0usize..40, len in 0usize..40) {
        let exp = experiment_with_counts(&counts);
        let jobs = exp.jobs();
        let sliced = jobs.slice(start..start.saturating_add(len));

        prop_assert!(sliced.len() <= len);
        prop_assert!(sliced.len() <= jobs.len());
        // every slice id appears in the source, in the same relative order
        let source = jobs.ids();
        let positions: Vec<usize> = sliced
            .ids()
            .iter()
            .map(|id| source.iter().position(|s| s == id).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    /// Property: iterating twice yields the same id sequence
    #[test]
    fn prop_iteration_is_restartable(counts in arb_counts()) {
        let exp = experiment_with_counts(&counts);
        let jobs = exp.jobs();
        let first: Vec<String> = jobs.iter().map(|v| v.id().to_string()).collect();
        let second: Vec<String> = jobs.iter().map(|v| v.id().to_string()).collect();
        prop_assert_eq!(first, second);
    }

    /// Property: views reached through any collection share one allocation
    #[test]
    fn prop_view_identity_across_collections(counts in arb_counts()) {
        prop_assume!(!counts.is_empty());
        let exp = experiment_with_counts(&counts);
        let direct = exp.get_job("0000-job").unwrap();
        let via_collection = exp.jobs().get(0).unwrap();
        prop_assert!(Arc::ptr_eq(&direct, &via_collection));
    }

    /// Property: an unknown operator suffix is an equality test on the
    /// literal key
    #[test]
    fn prop_unknown_operator_is_literal_equality(counts in arb_counts(), needle in -1000i64..1000) {
        let exp = experiment_with_counts(&counts);
        let unknown = exp.jobs().filter([Predicate::parse("count__bogus", needle)]);
        // no job defines a "count__bogus" param, so nothing can match
        prop_assert_eq!(unknown.len(), 0);
    }
}
