//! Unsupervised metric-weight learner.
//!
//! Multiplicative-weights minimization of each metric's squared disagreement
//! with a thresholded consensus rank, after Klementiev, Roth & Small (2007).
//! There is no ground truth: agreement with the weighted consensus of all
//! metrics stands in for correctness.
//!
//! Per iteration and per trial:
//! 1. Clip ranks to `threshold + 1`; a sample qualifies when any of its
//!    clipped ranks is within the threshold.
//! 2. Skip the trial when fewer than [`MIN_QUALIFYING_SAMPLES`] qualify.
//! 3. Consensus = average-tie re-ranking of the current weighted rank sums
//!    over the qualifying samples.
//! 4. Loss of metric `i` = sum of squared clipped deviations from consensus.
//!
//! Losses accumulate across trials, then `w_i <- w_i * exp(-lr * loss_i)` and
//! renormalize. The update runs in log space so large losses cannot underflow
//! every weight to zero.

use tracing::{debug, trace, warn};

use crate::config::{AggregatorConfig, MIN_QUALIFYING_SAMPLES};
use crate::domain::{RankTable, WeightVector};
use crate::error::RankAggError;
use crate::rank::{average_ranks, clip_rank};

/// Result of one learning run.
#[derive(Debug, Clone, PartialEq)]
pub struct LearnOutcome {
    /// Learned weights (sum to 1.0).
    pub weights: WeightVector,
    /// Iterations that updated the weights.
    pub iterations: usize,
    /// True when the last update moved no weight by more than the tolerance.
    pub converged: bool,
    /// Trial-iterations skipped for having too few qualifying samples.
    pub skipped_trial_iterations: usize,
}

/// Clipped, qualifying rows of one trial. Independent of the weights, so
/// built once per run.
struct PreparedTrial {
    rows: Vec<Vec<f64>>,
}

impl PreparedTrial {
    fn new(table: &RankTable, config: &AggregatorConfig) -> Self {
        let threshold = f64::from(config.threshold);
        let rows = table
            .rows()
            .map(|row| row.iter().map(|&r| clip_rank(r, config)).collect::<Vec<f64>>())
            .filter(|row| row.iter().any(|&r| r <= threshold))
            .collect();
        Self { rows }
    }

    fn qualifies(&self) -> bool {
        self.rows.len() >= MIN_QUALIFYING_SAMPLES
    }

    fn consensus(&self, weights: &WeightVector) -> Vec<f64> {
        let scores: Vec<f64> = self
            .rows
            .iter()
            .map(|row| row.iter().zip(weights.as_slice()).map(|(r, w)| r * w).sum())
            .collect();
        average_ranks(&scores)
    }

    fn accumulate_loss(&self, weights: &WeightVector, config: &AggregatorConfig, loss: &mut [f64]) {
        let consensus = self.consensus(weights);
        for (row, &c) in self.rows.iter().zip(&consensus) {
            for (l, &r) in loss.iter_mut().zip(row) {
                let d = clipped_deviation(r, c, config);
                *l += d * d;
            }
        }
    }
}

/// Deviation of a metric rank from consensus; ranks past the threshold count
/// as `threshold + 1`.
fn clipped_deviation(rank: f64, consensus: f64, config: &AggregatorConfig) -> f64 {
    if rank > f64::from(config.threshold) {
        config.sentinel_rank() - consensus
    } else {
        rank - consensus
    }
}

/// Learn metric weights from one or more rank tables.
///
/// Always starts from uniform weights. Fails with `InvalidInput` on an empty
/// list or mismatched column counts, and `InvalidConfig` on a bad config.
pub fn learn_weights(
    tables: &[RankTable],
    config: &AggregatorConfig,
) -> Result<LearnOutcome, RankAggError> {
    config.validate()?;
    let n_metrics = tables
        .first()
        .map(RankTable::n_metrics)
        .ok_or_else(|| RankAggError::input("aggregate needs at least one table"))?;
    if let Some((i, t)) = tables.iter().enumerate().find(|(_, t)| t.n_metrics() != n_metrics) {
        return Err(RankAggError::input(format!(
            "table {i} has {} columns, expected {n_metrics}",
            t.n_metrics()
        )));
    }

    let trials: Vec<PreparedTrial> = tables
        .iter()
        .map(|t| PreparedTrial::new(t, config))
        .collect();
    let active: Vec<&PreparedTrial> = trials.iter().filter(|t| t.qualifies()).collect();
    let skipped_per_iteration = trials.len() - active.len();

    let mut weights = WeightVector::uniform(n_metrics)?;
    let mut log_weights = vec![0.0; n_metrics];
    let mut outcome = LearnOutcome {
        weights: weights.clone(),
        iterations: 0,
        converged: false,
        skipped_trial_iterations: 0,
    };

    for iteration in 1..=config.max_iterations {
        outcome.skipped_trial_iterations += skipped_per_iteration;
        if active.is_empty() {
            // Inputs are fixed, so every later iteration would skip too.
            warn!(
                trials = trials.len(),
                min_qualifying = MIN_QUALIFYING_SAMPLES,
                "no trial has enough qualifying samples; weights left unchanged"
            );
            break;
        }

        let mut loss = vec![0.0; n_metrics];
        for trial in &active {
            trial.accumulate_loss(&weights, config, &mut loss);
        }

        for (lw, l) in log_weights.iter_mut().zip(&loss) {
            *lw -= config.learning_rate * l;
        }
        let max = log_weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        log_weights.iter_mut().for_each(|lw| *lw -= max);

        let next = WeightVector::from_log_weights(&log_weights);
        let delta = next.max_abs_diff(&weights);
        weights = next;
        outcome.iterations = iteration;
        trace!(iteration, delta, "weight update");

        if delta < config.convergence_tolerance {
            outcome.converged = true;
            break;
        }
    }

    debug!(
        iterations = outcome.iterations,
        converged = outcome.converged,
        skipped = outcome.skipped_trial_iterations,
        weights = ?weights.as_slice(),
        "weight learning finished"
    );
    outcome.weights = weights;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RankVector;

    fn table(columns: Vec<Vec<f64>>) -> RankTable {
        RankTable::from_columns(columns.into_iter().map(RankVector::from_vec).collect()).unwrap()
    }

    fn cfg() -> AggregatorConfig {
        AggregatorConfig::default()
    }

    #[test]
    fn deviation_is_clipped_past_threshold() {
        let c = AggregatorConfig {
            threshold: 5,
            ..Default::default()
        };
        assert_eq!(clipped_deviation(3.0, 2.0, &c), 1.0);
        assert_eq!(clipped_deviation(40.0, 2.0, &c), 4.0);
    }

    #[test]
    fn empty_table_list_rejected() {
        assert!(matches!(
            learn_weights(&[], &cfg()),
            Err(RankAggError::InvalidInput(_))
        ));
    }

    #[test]
    fn column_mismatch_rejected() {
        let a = table(vec![vec![1.0, 2.0], vec![2.0, 1.0]]);
        let b = table(vec![vec![1.0, 2.0]]);
        assert!(matches!(
            learn_weights(&[a, b], &cfg()),
            Err(RankAggError::InvalidInput(_))
        ));
    }

    #[test]
    fn agreeing_metrics_stay_uniform() {
        let col: Vec<f64> = (1..=8).map(f64::from).collect();
        let t = table(vec![col.clone(), col.clone(), col]);
        let out = learn_weights(&[t], &cfg()).unwrap();
        for w in out.weights.as_slice() {
            assert!((w - 1.0 / 3.0).abs() < 1e-12);
        }
        assert!(out.converged);
        assert_eq!(out.iterations, 1);
    }

    #[test]
    fn dissenting_metric_loses_weight() {
        let good: Vec<f64> = (1..=8).map(f64::from).collect();
        let reversed: Vec<f64> = (1..=8).rev().map(f64::from).collect();
        let t = table(vec![good.clone(), good, reversed]);
        let out = learn_weights(&[t], &cfg()).unwrap();
        assert!(out.weights.get(2) < 1e-6);
        assert!((out.weights.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn too_few_samples_leaves_weights_uniform() {
        let t = table(vec![vec![1.0, 2.0, 3.0, 4.0], vec![4.0, 3.0, 2.0, 1.0]]);
        let out = learn_weights(&[t], &cfg()).unwrap();
        assert_eq!(out.weights, WeightVector::uniform(2).unwrap());
        assert_eq!(out.iterations, 0);
        assert!(!out.converged);
        assert_eq!(out.skipped_trial_iterations, 1);
    }

    #[test]
    fn skipped_trial_does_not_block_others() {
        let good: Vec<f64> = (1..=6).map(f64::from).collect();
        let reversed: Vec<f64> = (1..=6).rev().map(f64::from).collect();
        let full = table(vec![good.clone(), good.clone(), reversed]);
        let tiny = table(vec![vec![1.0, 2.0], vec![2.0, 1.0], vec![1.0, 2.0]]);
        let out = learn_weights(&[full, tiny], &cfg()).unwrap();
        assert!(out.iterations >= 1);
        assert_eq!(out.skipped_trial_iterations, out.iterations);
        assert!(out.weights.get(2) < out.weights.get(0));
    }

    #[test]
    fn iteration_cap_respected() {
        let a: Vec<f64> = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b: Vec<f64> = vec![2.0, 1.0, 3.0, 4.0, 6.0, 5.0];
        let c = AggregatorConfig {
            max_iterations: 3,
            learning_rate: 1e-4,
            convergence_tolerance: 0.0,
            ..Default::default()
        };
        let out = learn_weights(&[table(vec![a, b])], &c).unwrap();
        assert_eq!(out.iterations, 3);
        assert!(!out.converged);
    }
}
