//! Property tests for the matrix generator, estimator and duration formatter.

use attack_runtime::output::{format_duration, round_duration};
use attack_runtime::{
    estimate, AttackKind, ExperimentMatrix, SeedBases, StudyConfig, Transformation, TrialOutcome,
    TrialSeeds,
};
use proptest::prelude::*;

fn cell_strategy(max_len: usize) -> impl Strategy<Value = Vec<TrialOutcome>> {
    prop::collection::vec((0.0f64..=1.0, 0.0f64..1e6), 1..max_len).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(accuracy, measured_time)| TrialOutcome {
                n: 64,
                k: 5,
                challenges: 300_000,
                attack: AttackKind::LogisticRegression,
                transformation: Transformation::Classic,
                accuracy,
                measured_time,
            })
            .collect()
    })
}

fn distinct_bases() -> impl Strategy<Value = SeedBases> {
    prop::collection::btree_set(0u64..(1 << 40), 4).prop_map(|set| {
        let b: Vec<u64> = set.into_iter().collect();
        SeedBases {
            instance: b[0],
            model: b[1],
            challenge: b[2],
            distance: b[3],
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Generating the matrix twice yields the same trials in the same order
    #[test]
    fn prop_matrix_deterministic(repetitions in 1usize..20) {
        let config = StudyConfig::quick().repetitions(repetitions);
        let first = ExperimentMatrix::new(config.clone()).unwrap().trials();
        let second = ExperimentMatrix::new(config).unwrap().trials();
        prop_assert_eq!(first, second);
    }

    /// The four seeds of any repetition are pairwise distinct
    #[test]
    fn prop_seeds_pairwise_distinct(bases in distinct_bases(), repetition in 0usize..100_000) {
        let seeds = TrialSeeds::derive(&bases, repetition).as_array();
        for i in 0..4 {
            for j in (i + 1)..4 {
                prop_assert_ne!(seeds[i], seeds[j]);
            }
        }
    }

    /// Success rate stays within [0, 1]
    #[test]
    fn prop_success_rate_bounded(cell in cell_strategy(50), threshold in 0.0f64..1.0) {
        let est = estimate(&cell, threshold).unwrap();
        prop_assert!((0.0..=1.0).contains(&est.success_rate()));
        prop_assert!(est.expected_seconds() >= 0.0);
    }

    /// An estimate is a lower bound exactly when nothing succeeded
    #[test]
    fn prop_lower_bound_iff_no_success(cell in cell_strategy(50), threshold in 0.0f64..1.0) {
        let est = estimate(&cell, threshold).unwrap();
        prop_assert_eq!(est.is_lower_bound(), est.success_rate() == 0.0);
        prop_assert_eq!(est.trials(), cell.len());
    }

    /// Rounding never increases a duration
    #[test]
    fn prop_rounding_monotonic(seconds in 0.0f64..1e9) {
        prop_assert!(round_duration(seconds) <= seconds);
        prop_assert!(round_duration(seconds) >= 0.0);
    }

    /// Every duration in range renders to a non-empty label
    #[test]
    fn prop_format_total(seconds in 0.0f64..=10_000_000.0) {
        let label = format_duration(seconds);
        prop_assert!(!label.is_empty());
        prop_assert!(label.ends_with('s') || label.ends_with('m'));
    }
}

#[test]
fn matrix_size_matches_config() {
    let config = StudyConfig::attack_runtime();
    let expected = config.total_trials();
    let matrix = ExperimentMatrix::new(config).unwrap();
    assert_eq!(matrix.len(), expected);
    assert_eq!(matrix.iter().count(), 1000 * 5 * 4);
}
