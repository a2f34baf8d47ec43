//! Aggregator configuration.
//!
//! All knobs are caller-overridable. Defaults are the constants below and never
//! vary between calls.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigLoadError, RankAggError};

/// Top-k cutoff. Ranks beyond it are clipped to `threshold + 1`.
pub const DEFAULT_THRESHOLD: u32 = 1000;

/// Decimal digits kept before ranking.
pub const DEFAULT_DECIMAL_PRECISION: u32 = 6;

/// Upper bound on learner iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 500;

/// Step size of the multiplicative update.
pub const DEFAULT_LEARNING_RATE: f64 = 0.25;

/// Early stop when no weight moves by more than this.
pub const DEFAULT_CONVERGENCE_TOLERANCE: f64 = 1e-6;

/// A trial with fewer qualifying samples than this is skipped for an iteration.
pub const MIN_QUALIFYING_SAMPLES: usize = 5;

/// Largest precision an `f64` can meaningfully round to.
pub const MAX_DECIMAL_PRECISION: u32 = 15;

/// Configuration shared by rank transforms, the learner, and the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Digits kept when rounding normalized metric values (1..=15).
    pub decimal_precision: u32,
    /// Top-k rank cutoff (>= 1).
    pub threshold: u32,
    /// Maximum learner iterations (>= 1).
    pub max_iterations: usize,
    /// Multiplicative-update learning rate (> 0).
    pub learning_rate: f64,
    /// Max elementwise weight change that counts as converged (>= 0).
    pub convergence_tolerance: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            decimal_precision: DEFAULT_DECIMAL_PRECISION,
            threshold: DEFAULT_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            learning_rate: DEFAULT_LEARNING_RATE,
            convergence_tolerance: DEFAULT_CONVERGENCE_TOLERANCE,
        }
    }
}

impl AggregatorConfig {
    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), RankAggError> {
        validate_precision(self.decimal_precision)?;
        validate_threshold(self.threshold)?;
        if self.max_iterations == 0 {
            return Err(RankAggError::config("max_iterations", "must be >= 1"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(RankAggError::config(
                "learning_rate",
                format!("must be finite and > 0, got {}", self.learning_rate),
            ));
        }
        if !self.convergence_tolerance.is_finite() || self.convergence_tolerance < 0.0 {
            return Err(RankAggError::config(
                "convergence_tolerance",
                format!("must be finite and >= 0, got {}", self.convergence_tolerance),
            ));
        }
        Ok(())
    }

    /// Rank assigned to undefined entries and the clip ceiling for all ranks.
    pub fn sentinel_rank(&self) -> f64 {
        f64::from(self.threshold) + 1.0
    }

    /// Parse and validate a config from TOML. Missing keys take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

pub(crate) fn validate_precision(precision: u32) -> Result<(), RankAggError> {
    if precision == 0 || precision > MAX_DECIMAL_PRECISION {
        return Err(RankAggError::config(
            "decimal_precision",
            format!("must be in 1..={MAX_DECIMAL_PRECISION}, got {precision}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_threshold(threshold: u32) -> Result<(), RankAggError> {
    if threshold == 0 {
        return Err(RankAggError::config("threshold", "must be >= 1"));
    }
    Ok(())
}
