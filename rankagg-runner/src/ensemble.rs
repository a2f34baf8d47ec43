//! Ensemble weight learning over independent trials.
//!
//! Each trial is one `aggregate` call over its own tables. Trials share no
//! mutable state, so they run on the rayon pool; results are joined in trial
//! order and averaged only after every trial completes, which keeps the mean
//! identical between parallel and sequential runs.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use rankagg_core::{
    AggregatorConfig, LearnOutcome, MetricOrder, MetricTable, RankAggError, RankAggregator,
    WeightVector,
};

/// One independent observation: the tables handed to a single `aggregate` call.
#[derive(Debug, Clone)]
pub struct Trial {
    pub tables: Vec<MetricTable>,
}

impl Trial {
    pub fn new(tables: Vec<MetricTable>) -> Self {
        Self { tables }
    }

    pub fn single(table: MetricTable) -> Self {
        Self {
            tables: vec![table],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    pub aggregator: AggregatorConfig,
    /// Run trials on the rayon pool (default) or one after another.
    pub parallel: bool,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            aggregator: AggregatorConfig::default(),
            parallel: true,
        }
    }
}

/// Averaged weights plus every trial's own outcome, in trial order.
#[derive(Debug, Clone)]
pub struct EnsembleResult {
    pub mean_weights: WeightVector,
    pub trials: Vec<LearnOutcome>,
}

impl EnsembleResult {
    /// An aggregator primed with the averaged weights, ready to rank the full table.
    pub fn aggregator(&self, config: AggregatorConfig) -> Result<RankAggregator, RankAggError> {
        let mut agg = RankAggregator::with_config(config)?;
        agg.set_weights(self.mean_weights.as_slice().to_vec())?;
        Ok(agg)
    }

    pub fn converged_trials(&self) -> usize {
        self.trials.iter().filter(|t| t.converged).count()
    }
}

#[derive(Debug, Error)]
pub enum EnsembleError {
    #[error("ensemble needs at least one trial")]
    NoTrials,

    #[error("invalid trial plan: {0}")]
    InvalidPlan(String),

    #[error(transparent)]
    Config(RankAggError),

    #[error("trial {index} failed: {source}")]
    Trial {
        index: usize,
        #[source]
        source: RankAggError,
    },
}

/// Runs the weight learner over many trials and averages the results.
#[derive(Debug, Clone)]
pub struct EnsembleDriver {
    config: EnsembleConfig,
}

impl EnsembleDriver {
    pub fn new(config: EnsembleConfig) -> Result<Self, EnsembleError> {
        config.aggregator.validate().map_err(EnsembleError::Config)?;
        Ok(Self { config })
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    /// Learn weights on every prepared trial and average them.
    pub fn run(&self, trials: &[Trial], order: &MetricOrder) -> Result<EnsembleResult, EnsembleError> {
        self.run_with(trials.len(), order, |i| Ok(trials[i].tables.clone()))
    }

    /// Build each trial's tables inside its worker, then learn and average.
    ///
    /// `build` receives the trial index and must derive any randomness from
    /// it (see [`RngHierarchy`](crate::rng::RngHierarchy)) so results do not
    /// depend on scheduling.
    pub fn run_with<F>(
        &self,
        n_trials: usize,
        order: &MetricOrder,
        build: F,
    ) -> Result<EnsembleResult, EnsembleError>
    where
        F: Fn(usize) -> Result<Vec<MetricTable>, RankAggError> + Send + Sync,
    {
        if n_trials == 0 {
            return Err(EnsembleError::NoTrials);
        }

        let run_trial = |index: usize| -> Result<LearnOutcome, EnsembleError> {
            let wrap = |source| EnsembleError::Trial { index, source };
            let tables = build(index).map_err(wrap)?;
            let mut agg =
                RankAggregator::with_config(self.config.aggregator.clone()).map_err(wrap)?;
            let outcome = agg.aggregate(&tables, order).map_err(wrap)?;
            debug!(trial = index, iterations = outcome.iterations, "trial finished");
            Ok(outcome)
        };

        let outcomes: Vec<LearnOutcome> = if self.config.parallel {
            (0..n_trials)
                .into_par_iter()
                .map(run_trial)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            (0..n_trials).map(run_trial).collect::<Result<Vec<_>, _>>()?
        };

        let weights: Vec<WeightVector> = outcomes.iter().map(|o| o.weights.clone()).collect();
        let mean_weights = mean_weights(&weights)?;
        info!(
            trials = n_trials,
            converged = outcomes.iter().filter(|o| o.converged).count(),
            weights = ?mean_weights.as_slice(),
            "ensemble finished"
        );

        Ok(EnsembleResult {
            mean_weights,
            trials: outcomes,
        })
    }
}

/// Arithmetic mean of weight vectors, renormalized to sum to 1.
///
/// Sums in slice order, so the result does not depend on how the vectors
/// were produced.
pub fn mean_weights(weights: &[WeightVector]) -> Result<WeightVector, EnsembleError> {
    let width = weights.first().map(WeightVector::len).ok_or(EnsembleError::NoTrials)?;
    let mut sum = vec![0.0; width];
    for (i, w) in weights.iter().enumerate() {
        if w.len() != width {
            return Err(EnsembleError::InvalidPlan(format!(
                "trial {i} learned {} weights, expected {width}",
                w.len()
            )));
        }
        for (s, x) in sum.iter_mut().zip(w.as_slice()) {
            *s += x;
        }
    }
    let n = weights.len() as f64;
    WeightVector::normalized(sum.into_iter().map(|s| s / n).collect()).map_err(EnsembleError::Config)
}
