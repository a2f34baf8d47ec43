//! Synthetic metric tables with a known true ranking.
//!
//! Informative columns are `(n - true_rank) * scale + N(0, sigma_i)`; random
//! columns are uniform noise. Used to check that learned weights beat naive
//! averaging, and for benchmarks.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use rankagg_core::{MetricOrder, MetricTable, RankAggError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub n_samples: usize,
    /// Value units per true-rank step.
    pub value_scale: f64,
    /// One noise standard deviation per informative column.
    pub informative_noise: Vec<f64>,
    /// Pure-noise columns appended after the informative ones.
    pub random_columns: usize,
    /// Random columns draw from `U(0, random_range)`.
    pub random_range: f64,
    /// Round every value to an integer, as metric tools often report.
    pub round_values: bool,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            n_samples: 20,
            value_scale: 100.0,
            informative_noise: vec![20.0, 40.0, 60.0, 80.0],
            random_columns: 1,
            random_range: 100.0,
            round_values: true,
        }
    }
}

impl SyntheticConfig {
    pub fn n_metrics(&self) -> usize {
        self.informative_noise.len() + self.random_columns
    }
}

/// A hidden permutation and the metric table it produced.
#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    /// 0-based true position of each sample (0 = best).
    pub true_rank: Vec<usize>,
    pub base: MetricTable,
    pub order: MetricOrder,
    config: SyntheticConfig,
}

impl SyntheticDataset {
    pub fn generate<R: Rng>(config: &SyntheticConfig, rng: &mut R) -> Result<Self, RankAggError> {
        let n = config.n_samples;
        let mut true_rank: Vec<usize> = (0..n).collect();
        true_rank.shuffle(rng);

        let mut rows = Vec::with_capacity(n);
        for &t in &true_rank {
            let signal = (n - t) as f64 * config.value_scale;
            let mut row: Vec<f64> = config
                .informative_noise
                .iter()
                .map(|&sigma| config.finish(signal + sigma * standard_normal(rng)))
                .collect();
            row.extend((0..config.random_columns).map(|_| config.random_value(rng)));
            rows.push(row);
        }

        Ok(Self {
            true_rank,
            base: MetricTable::from_rows(rows)?,
            order: MetricOrder::all_higher(config.n_metrics()),
            config: config.clone(),
        })
    }

    /// Independently perturbed copy of the base table.
    ///
    /// Informative column `i` gets extra `N(0, noise[i])`; random columns are
    /// redrawn. Missing `noise` entries mean no extra noise.
    pub fn perturbed<R: Rng>(&self, noise: &[f64], rng: &mut R) -> Result<MetricTable, RankAggError> {
        let n_informative = self.config.informative_noise.len();
        let mut values = Vec::with_capacity(self.base.n_samples() * self.base.n_metrics());
        for row in self.base.rows() {
            for (m, &v) in row.iter().enumerate() {
                let value = if m < n_informative {
                    let sigma = noise.get(m).copied().unwrap_or(0.0);
                    self.config.finish(v + sigma * standard_normal(rng))
                } else {
                    self.config.random_value(rng)
                };
                values.push(value);
            }
        }
        MetricTable::new(self.base.n_samples(), self.base.n_metrics(), values)
    }

    /// True 1-based rank of each sample.
    pub fn true_ranks(&self) -> Vec<f64> {
        self.true_rank.iter().map(|&t| t as f64 + 1.0).collect()
    }
}

impl SyntheticConfig {
    fn finish(&self, value: f64) -> f64 {
        if self.round_values {
            value.round()
        } else {
            value
        }
    }

    fn random_value<R: Rng>(&self, rng: &mut R) -> f64 {
        self.finish(rng.gen::<f64>() * self.random_range)
    }
}

/// Box-Muller standard normal draw.
pub fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    // 1 - U keeps u1 in (0, 1] so ln never sees zero
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
