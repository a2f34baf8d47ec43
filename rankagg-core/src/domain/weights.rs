use serde::{Deserialize, Serialize};

use crate::error::RankAggError;

/// Non-negative per-metric weights that always sum to 1.0.
///
/// Every constructor renormalizes, so a `WeightVector` never holds
/// un-normalized values. Deserialization goes through the same path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct WeightVector(Vec<f64>);

impl WeightVector {
    /// `1 / n` for each of `n` metrics.
    pub fn uniform(n_metrics: usize) -> Result<Self, RankAggError> {
        if n_metrics == 0 {
            return Err(RankAggError::input("weight vector needs at least one metric"));
        }
        Ok(Self(vec![1.0 / n_metrics as f64; n_metrics]))
    }

    /// Renormalize caller-supplied weights.
    ///
    /// Rejects empty input, negative or non-finite entries, and an all-zero vector.
    pub fn normalized(raw: Vec<f64>) -> Result<Self, RankAggError> {
        if raw.is_empty() {
            return Err(RankAggError::input("weight vector needs at least one metric"));
        }
        if let Some((i, w)) = raw.iter().enumerate().find(|(_, w)| !w.is_finite() || **w < 0.0) {
            return Err(RankAggError::input(format!(
                "weight {i} must be finite and non-negative, got {w}"
            )));
        }
        let sum: f64 = raw.iter().sum();
        if sum <= 0.0 || !sum.is_finite() {
            return Err(RankAggError::input(format!(
                "weights must have a positive finite sum, got {sum}"
            )));
        }
        Ok(Self(raw.into_iter().map(|w| w / sum).collect()))
    }

    /// Softmax of log-weights, shifted by the max so the largest term is `exp(0)`.
    pub(crate) fn from_log_weights(log_weights: &[f64]) -> Self {
        let max = log_weights
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = log_weights.iter().map(|lw| (lw - max).exp()).collect();
        let sum: f64 = exps.iter().sum();
        Self(exps.into_iter().map(|e| e / sum).collect())
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

    pub fn get(&self, metric: usize) -> f64 {
        self.0[metric]
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Largest absolute elementwise difference.
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    /// Index of the heaviest metric (first on ties).
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, w) in self.0.iter().enumerate() {
            if *w > self.0[best] {
                best = i;
            }
        }
        best
    }
}

impl TryFrom<Vec<f64>> for WeightVector {
    type Error = RankAggError;

    fn try_from(raw: Vec<f64>) -> Result<Self, Self::Error> {
        Self::normalized(raw)
    }
}

impl From<WeightVector> for Vec<f64> {
    fn from(w: WeightVector) -> Self {
        w.0
    }
}
