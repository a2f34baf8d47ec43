use serde::{Deserialize, Serialize};

use crate::error::RankAggError;

/// One rank per sample for one metric (or the final aggregate).
///
/// Ranks are 1-based; tied values share the average of the positions they
/// span. Every sample always has a finite rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankVector(Vec<f64>);

impl RankVector {
    pub(crate) fn from_vec(ranks: Vec<f64>) -> Self {
        Self(ranks)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, sample: usize) -> f64 {
        self.0[sample]
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    /// Sample indices ordered best first; equal ranks keep input order.
    pub fn ordering(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..self.0.len()).collect();
        idx.sort_by(|&a, &b| self.0[a].total_cmp(&self.0[b]));
        idx
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

/// Per-metric rank vectors for one table, stored row-major like the table.
#[derive(Debug, Clone, PartialEq)]
pub struct RankTable {
    n_samples: usize,
    n_metrics: usize,
    ranks: Vec<f64>,
}

impl RankTable {
    /// Assemble from one rank vector per metric column.
    pub fn from_columns(columns: Vec<RankVector>) -> Result<Self, RankAggError> {
        let n_metrics = columns.len();
        if n_metrics == 0 {
            return Err(RankAggError::input("rank table needs at least one column"));
        }
        let n_samples = columns[0].len();
        if columns.iter().any(|c| c.len() != n_samples) {
            return Err(RankAggError::input("rank columns differ in length"));
        }
        let mut ranks = Vec::with_capacity(n_samples * n_metrics);
        for s in 0..n_samples {
            ranks.extend(columns.iter().map(|c| c.get(s)));
        }
        Ok(Self {
            n_samples,
            n_metrics,
            ranks,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn n_metrics(&self) -> usize {
        self.n_metrics
    }

    pub fn get(&self, sample: usize, metric: usize) -> f64 {
        self.ranks[sample * self.n_metrics + metric]
    }

    pub fn row(&self, sample: usize) -> &[f64] {
        let start = sample * self.n_metrics;
        &self.ranks[start..start + self.n_metrics]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.ranks.chunks_exact(self.n_metrics)
    }

    pub fn column(&self, metric: usize) -> RankVector {
        RankVector(self.rows().map(|row| row[metric]).collect())
    }
}
