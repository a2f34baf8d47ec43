//! Stateful front end: learns or accepts weights, then aggregates rankings.

use tracing::debug;

use crate::config::{validate_precision, validate_threshold, AggregatorConfig};
use crate::domain::{MetricOrder, MetricTable, RankVector, WeightVector};
use crate::error::RankAggError;
use crate::learner::{learn_weights, LearnOutcome};
use crate::rank::{average_ranks, clip_rank, rank_table};

/// Holds a config and the current weight vector.
///
/// Weights are absent until [`aggregate`](Self::aggregate) or
/// [`set_weights`](Self::set_weights) runs; asking for an aggregated rank
/// before then fails with `UninitializedState`.
#[derive(Debug, Clone, Default)]
pub struct RankAggregator {
    config: AggregatorConfig,
    weights: Option<WeightVector>,
}

impl RankAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AggregatorConfig) -> Result<Self, RankAggError> {
        config.validate()?;
        Ok(Self {
            config,
            weights: None,
        })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn set_threshold(&mut self, threshold: u32) -> Result<(), RankAggError> {
        validate_threshold(threshold)?;
        self.config.threshold = threshold;
        Ok(())
    }

    pub fn set_decimal_precision(&mut self, precision: u32) -> Result<(), RankAggError> {
        validate_precision(precision)?;
        self.config.decimal_precision = precision;
        Ok(())
    }

    /// Install caller-supplied weights, renormalized to sum to 1.
    pub fn set_weights(&mut self, raw: Vec<f64>) -> Result<(), RankAggError> {
        self.weights = Some(WeightVector::normalized(raw)?);
        Ok(())
    }

    pub fn weights(&self) -> Option<&WeightVector> {
        self.weights.as_ref()
    }

    /// Learn weights from one or more metric tables and keep them.
    ///
    /// The caller's tables are only read. Learning always restarts from
    /// uniform weights, whatever was stored before.
    pub fn aggregate(
        &mut self,
        tables: &[MetricTable],
        order: &MetricOrder,
    ) -> Result<LearnOutcome, RankAggError> {
        if tables.is_empty() {
            return Err(RankAggError::input("aggregate needs at least one table"));
        }
        let rank_tables = tables
            .iter()
            .map(|t| rank_table(t, order, &self.config))
            .collect::<Result<Vec<_>, _>>()?;

        let outcome = learn_weights(&rank_tables, &self.config)?;
        self.weights = Some(outcome.weights.clone());
        Ok(outcome)
    }

    /// Final ranking of one table under the stored weights.
    pub fn aggregated_rank(
        &self,
        table: &MetricTable,
        order: &MetricOrder,
    ) -> Result<RankVector, RankAggError> {
        let weights = self.weights.as_ref().ok_or(RankAggError::UninitializedState)?;
        apply_weights(table, order, weights, &self.config)
    }

    /// Final ranking across several reference tables over the same samples.
    ///
    /// Each table is aggregated on its own; the per-table ranks are averaged
    /// and re-ranked.
    pub fn aggregated_rank_across(
        &self,
        tables: &[MetricTable],
        order: &MetricOrder,
    ) -> Result<RankVector, RankAggError> {
        let weights = self.weights.as_ref().ok_or(RankAggError::UninitializedState)?;
        let n_samples = tables
            .first()
            .map(MetricTable::n_samples)
            .ok_or_else(|| RankAggError::input("need at least one reference table"))?;

        let mut mean = vec![0.0; n_samples];
        for (i, table) in tables.iter().enumerate() {
            if table.n_samples() != n_samples {
                return Err(RankAggError::input(format!(
                    "reference table {i} has {} samples, expected {n_samples}",
                    table.n_samples()
                )));
            }
            let ranks = apply_weights(table, order, weights, &self.config)?;
            for (m, r) in mean.iter_mut().zip(ranks.iter()) {
                *m += r / tables.len() as f64;
            }
        }
        Ok(RankVector::from_vec(average_ranks(&mean)))
    }
}

/// Rank `table` by the weighted sum of its clipped per-metric ranks.
///
/// The per-metric ranks are re-derived from the raw values, so the table may
/// differ from the ones the weights were learned on. The output is itself a
/// rank vector with average ties.
pub fn apply_weights(
    table: &MetricTable,
    order: &MetricOrder,
    weights: &WeightVector,
    config: &AggregatorConfig,
) -> Result<RankVector, RankAggError> {
    if weights.len() != table.n_metrics() {
        return Err(RankAggError::input(format!(
            "{} weights for a table with {} columns",
            weights.len(),
            table.n_metrics()
        )));
    }
    let ranks = rank_table(table, order, config)?;
    let scores: Vec<f64> = ranks
        .rows()
        .map(|row| {
            row.iter()
                .zip(weights.as_slice())
                .map(|(&r, w)| w * clip_rank(r, config))
                .sum()
        })
        .collect();
    debug!(samples = scores.len(), "applied weights");
    Ok(RankVector::from_vec(average_ranks(&scores)))
}
