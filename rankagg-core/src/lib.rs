//! rankagg core — unsupervised metric weighting and rank aggregation.
//!
//! Given tables of possibly-missing, possibly-mis-scaled metric values per
//! sample, this crate:
//! - Converts each metric column to 1-based average-tie ranks, with
//!   undefined values pinned to a sentinel rank
//! - Learns a non-negative weight per metric that maximizes agreement with a
//!   thresholded consensus (no ground truth needed)
//! - Applies learned or supplied weights to produce a single final ranking
//!
//! Everything here is synchronous and allocation-local; the runner crate
//! fans learning out over many trials.

pub mod aggregator;
pub mod config;
pub mod domain;
pub mod error;
pub mod learner;
pub mod rank;
pub mod stats;

pub use aggregator::{apply_weights, RankAggregator};
pub use config::AggregatorConfig;
pub use domain::{Direction, MetricOrder, MetricTable, RankTable, RankVector, WeightVector};
pub use error::{ConfigLoadError, RankAggError};
pub use learner::{learn_weights, LearnOutcome};
pub use rank::{average_ranks, rank_column, rank_table};
pub use stats::spearman;


#[cfg(test)]
mod tests {
    use super::*;

    /// Learning never inherits weights from an earlier run.
    #[test]
    fn aggregate_restarts_from_uniform() {
        let rows: Vec<Vec<f64>> = (0..4).map(|i| vec![i as f64, -(i as f64)]).collect();
        let table = MetricTable::from_rows(rows).unwrap();
        let order = MetricOrder::all_higher(2);

        let mut agg = RankAggregator::new();
        agg.set_weights(vec![0.99, 0.01]).unwrap();
        // four samples never qualify, so learning leaves the uniform start untouched
        let out = agg.aggregate(&[table], &order).unwrap();
        assert_eq!(out.weights, WeightVector::uniform(2).unwrap());
        assert_eq!(agg.weights(), Some(&out.weights));
    }
}
