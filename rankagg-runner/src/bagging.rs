//! Bagged trial construction from per-reference metric tables.
//!
//! Each trial evaluates a random subset of the references so one outlier
//! reference cannot dominate the learned weights. With several raters, trials
//! cycle through the raters' pools by trial index.

use rand::seq::index;

use rankagg_core::MetricTable;

use crate::ensemble::{EnsembleError, Trial};
use crate::rng::RngHierarchy;

/// Fraction of references drawn per trial when the caller has no preference.
pub const DEFAULT_BAG_FRACTION: f64 = 0.6;

const BAGGING_STREAM: &str = "bagging";

/// Number of references drawn from a pool of `pool_len`: `floor(fraction * len)`, at least 1.
pub fn bag_size(pool_len: usize, fraction: f64) -> usize {
    ((pool_len as f64 * fraction).floor() as usize).clamp(1, pool_len.max(1))
}

/// Build `n_trials` trials, each a without-replacement subset of one pool.
///
/// Trial `t` draws from `pools[t % pools.len()]` using the sub-seed
/// `("bagging", t)`, so any single trial can be rebuilt in isolation.
pub fn bagged_trials(
    pools: &[Vec<MetricTable>],
    n_trials: usize,
    fraction: f64,
    seeds: &RngHierarchy,
) -> Result<Vec<Trial>, EnsembleError> {
    if n_trials == 0 {
        return Err(EnsembleError::NoTrials);
    }
    if pools.is_empty() || pools.iter().any(Vec::is_empty) {
        return Err(EnsembleError::InvalidPlan(
            "every reference pool needs at least one table".into(),
        ));
    }
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(EnsembleError::InvalidPlan(format!(
            "bag fraction must be in (0, 1], got {fraction}"
        )));
    }

    Ok((0..n_trials)
        .map(|t| bag_one(&pools[t % pools.len()], fraction, seeds, t))
        .collect())
}

fn bag_one(pool: &[MetricTable], fraction: f64, seeds: &RngHierarchy, trial: usize) -> Trial {
    let mut rng = seeds.rng_for(BAGGING_STREAM, trial as u64);
    let picked = index::sample(&mut rng, pool.len(), bag_size(pool.len(), fraction));
    Trial::new(picked.into_iter().map(|i| pool[i].clone()).collect())
}
