//! Integration tests for ensemble weight learning on synthetic data with a
//! known true ranking.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use rankagg_core::{
    spearman, AggregatorConfig, MetricOrder, MetricTable, RankAggError, RankAggregator,
    WeightVector,
};
use rankagg_runner::{
    bag_size, bagged_trials, mean_weights, EnsembleConfig, EnsembleDriver, RngHierarchy,
    SyntheticConfig, SyntheticDataset, DEFAULT_BAG_FRACTION,
};

const TRIAL_NOISE: [f64; 4] = [100.0, 200.0, 300.0, 400.0];

fn driver(config: AggregatorConfig) -> EnsembleDriver {
    EnsembleDriver::new(EnsembleConfig {
        aggregator: config,
        parallel: true,
    })
    .unwrap()
}

/// Spearman of learned vs equal-weight aggregation against the hidden ranking.
fn learned_vs_equal(seed: u64) -> (f64, f64) {
    let seeds = RngHierarchy::new(seed);
    let data = SyntheticDataset::generate(&SyntheticConfig::default(), &mut seeds.rng_for("base", 0))
        .unwrap();

    let result = driver(AggregatorConfig::default())
        .run_with(30, &data.order, |t| {
            let mut rng = seeds.rng_for("perturb", t as u64);
            Ok(vec![data.perturbed(&TRIAL_NOISE, &mut rng)?])
        })
        .unwrap();

    let learned = result
        .aggregator(AggregatorConfig::default())
        .unwrap()
        .aggregated_rank(&data.base, &data.order)
        .unwrap();

    let mut equal = RankAggregator::new();
    equal.set_weights(vec![1.0; data.order.len()]).unwrap();
    let naive = equal.aggregated_rank(&data.base, &data.order).unwrap();

    let truth = data.true_ranks();
    (
        spearman(learned.as_slice(), &truth).unwrap(),
        spearman(naive.as_slice(), &truth).unwrap(),
    )
}

#[test]
fn learned_weights_beat_equal_weights() {
    let mut strictly_better = 0;
    for seed in 0..5 {
        let (learned, naive) = learned_vs_equal(seed);
        assert!(
            learned >= naive,
            "seed {seed}: learned {learned:.4} < equal {naive:.4}"
        );
        if learned > naive {
            strictly_better += 1;
        }
    }
    assert!(strictly_better >= 3, "only {strictly_better}/5 seeds improved");
}

#[test]
fn random_column_is_down_weighted() {
    let seeds = RngHierarchy::new(17);
    let data = SyntheticDataset::generate(&SyntheticConfig::default(), &mut seeds.rng_for("base", 0))
        .unwrap();
    let result = driver(AggregatorConfig::default())
        .run_with(30, &data.order, |t| {
            Ok(vec![data.perturbed(&TRIAL_NOISE, &mut seeds.rng_for("perturb", t as u64))?])
        })
        .unwrap();

    let w = result.mean_weights.as_slice();
    assert!((result.mean_weights.sum() - 1.0).abs() < 1e-9);
    assert!(w[4] < w[0], "random column outweighs the cleanest: {w:?}");
}

fn noise_ladder() -> SyntheticConfig {
    SyntheticConfig {
        value_scale: 1.0,
        informative_noise: vec![1.0, 2.0, 3.0, 4.0],
        random_columns: 0,
        round_values: false,
        ..Default::default()
    }
}

/// Mean weights over `n_trials` fresh permutations of the noise ladder.
fn ladder_weights(config: AggregatorConfig, n_trials: usize) -> Vec<f64> {
    let synth = noise_ladder();
    let seeds = RngHierarchy::new(42);
    let order = MetricOrder::all_higher(4);
    let result = driver(config)
        .run_with(n_trials, &order, |t| {
            let mut rng = seeds.rng_for("permutation", t as u64);
            Ok(vec![SyntheticDataset::generate(&synth, &mut rng)?.base])
        })
        .unwrap();
    result.mean_weights.as_slice().to_vec()
}

#[test]
fn weights_decrease_with_noise() {
    let w = ladder_weights(AggregatorConfig::default(), 200);
    for pair in w.windows(2) {
        assert!(pair[0] > pair[1], "weights not decreasing: {w:?}");
    }
}

/// A small step and a short horizon keep every column's weight well away
/// from zero while preserving the order.
#[test]
fn soft_weights_decrease_with_noise() {
    let config = AggregatorConfig {
        learning_rate: 0.001,
        max_iterations: 10,
        ..Default::default()
    };
    let w = ladder_weights(config, 40);
    for pair in w.windows(2) {
        assert!(pair[0] > pair[1], "weights not decreasing: {w:?}");
    }
    assert!(w.iter().all(|&x| x > 0.05), "weights collapsed: {w:?}");
}

#[test]
fn parallel_and_sequential_agree_exactly() {
    let seeds = RngHierarchy::new(7);
    let data = SyntheticDataset::generate(&SyntheticConfig::default(), &mut seeds.rng_for("base", 0))
        .unwrap();
    let build = |t: usize| -> Result<Vec<MetricTable>, RankAggError> {
        let mut rng = seeds.rng_for("perturb", t as u64);
        Ok(vec![data.perturbed(&TRIAL_NOISE, &mut rng)?])
    };

    let par = driver(AggregatorConfig::default())
        .run_with(16, &data.order, build)
        .unwrap();
    let seq = driver(AggregatorConfig::default())
        .with_parallelism(false)
        .run_with(16, &data.order, build)
        .unwrap();

    assert_eq!(par.mean_weights, seq.mean_weights);
    assert_eq!(par.trials, seq.trials);
}

#[test]
fn bagged_references_feed_the_ensemble() {
    let seeds = RngHierarchy::new(5);
    let data = SyntheticDataset::generate(&SyntheticConfig::default(), &mut seeds.rng_for("base", 0))
        .unwrap();
    // two raters, eight reference segmentations each
    let pools: Vec<Vec<MetricTable>> = (0..2u64)
        .map(|rater| {
            (0..8u64)
                .map(|r| {
                    let mut rng = StdRng::seed_from_u64(rater * 100 + r);
                    data.perturbed(&TRIAL_NOISE, &mut rng).unwrap()
                })
                .collect()
        })
        .collect();

    let trials = bagged_trials(&pools, 12, DEFAULT_BAG_FRACTION, &seeds).unwrap();
    assert!(trials.iter().all(|t| t.tables.len() == bag_size(8, DEFAULT_BAG_FRACTION)));

    let result = driver(AggregatorConfig::default())
        .run(&trials, &data.order)
        .unwrap();
    assert_eq!(result.trials.len(), 12);
    assert!((result.mean_weights.sum() - 1.0).abs() < 1e-9);

    let ranks = result
        .aggregator(AggregatorConfig::default())
        .unwrap()
        .aggregated_rank_across(&pools[0], &data.order)
        .unwrap();
    assert_eq!(ranks.len(), data.base.n_samples());
}

proptest! {
    #[test]
    fn bag_size_stays_in_bounds(len in 1usize..200, fraction in 0.001f64..=1.0) {
        let k = bag_size(len, fraction);
        prop_assert!(k >= 1);
        prop_assert!(k <= len);
    }

    #[test]
    fn mean_weights_is_a_distribution(
        raw in prop::collection::vec(prop::collection::vec(0.01f64..10.0, 3), 1..10)
    ) {
        let vectors: Vec<WeightVector> = raw
            .into_iter()
            .map(|w| WeightVector::normalized(w).unwrap())
            .collect();
        let mean = mean_weights(&vectors).unwrap();
        prop_assert!((mean.sum() - 1.0).abs() < 1e-9);
        prop_assert!(mean.as_slice().iter().all(|&w| w >= 0.0));
    }
}
