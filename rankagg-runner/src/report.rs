//! Human-readable views of averaged metric weights.

use std::collections::BTreeMap;

use serde::Serialize;

use rankagg_core::{Direction, RankAggError, WeightVector};

use crate::layout::{split_column, MetricLayout, WHOLE_SET_SUFFIX};

/// Short IDs scoring sheets use for the common validation metrics.
pub const DEFAULT_METRIC_IDS: &[(&str, &str)] = &[
    ("AveDist", "Adb"),
    ("Dice", "Dice"),
    ("HausdorffDist", "Hdb"),
    ("Jaccard", "Jac"),
    ("Kappa", "Kap"),
    ("PPV", "PPV"),
    ("Specificity", "Spec"),
    ("Sensitivity", "Sens"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightEntry {
    pub name: String,
    pub weight: f64,
    pub direction: Direction,
}

/// One signed entry of a scoring-sheet weight table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitionWeight {
    pub title: String,
    /// `weight * direction sign`: negative for lower-is-better metrics.
    pub weight: f64,
}

/// Column names paired with their weights, in layout order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightReport {
    entries: Vec<WeightEntry>,
}

impl WeightReport {
    pub fn new(layout: &MetricLayout, weights: &WeightVector) -> Result<Self, RankAggError> {
        if layout.len() != weights.len() {
            return Err(RankAggError::InvalidInput(format!(
                "layout has {} columns but {} weights were given",
                layout.len(),
                weights.len()
            )));
        }
        let entries = layout
            .names()
            .iter()
            .zip(layout.order().directions())
            .zip(weights.as_slice())
            .map(|((name, &direction), &weight)| WeightEntry {
                name: name.clone(),
                weight,
                direction,
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    /// Entries by descending weight; equal weights keep layout order.
    pub fn sorted(&self) -> Vec<&WeightEntry> {
        let mut sorted: Vec<&WeightEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        sorted
    }

    /// Summed weight per metric type (`Dice`, `Kappa`, ...).
    pub fn by_metric_type(&self) -> BTreeMap<String, f64> {
        self.grouped(|name| split_column(name).0)
    }

    /// Summed weight per object label (`1`, `2`, ..., `all`).
    pub fn by_object(&self) -> BTreeMap<String, f64> {
        self.grouped(|name| split_column(name).1)
    }

    /// Signed weights keyed by short metric ID, using [`DEFAULT_METRIC_IDS`].
    ///
    /// Per-object columns key as `<ID><k>` (`Dice1`, `Adb2`); whole-set
    /// columns key as the bare ID (`Kap`).
    pub fn competition_weights(&self) -> BTreeMap<String, CompetitionWeight> {
        self.competition_weights_with(DEFAULT_METRIC_IDS)
    }

    /// Like [`competition_weights`](Self::competition_weights) with a custom
    /// `(metric type, ID)` table. Types missing from `ids` key by their own name.
    pub fn competition_weights_with(
        &self,
        ids: &[(&str, &str)],
    ) -> BTreeMap<String, CompetitionWeight> {
        self.entries
            .iter()
            .map(|e| {
                let (metric, label) = split_column(&e.name);
                let id = ids
                    .iter()
                    .find(|(name, _)| *name == metric)
                    .map_or(metric, |(_, id)| *id);
                let key = if label == WHOLE_SET_SUFFIX {
                    id.to_string()
                } else {
                    format!("{id}{label}")
                };
                let weight = CompetitionWeight {
                    title: format!("{metric} (label {label})"),
                    weight: e.weight * e.direction.sign(),
                };
                (key, weight)
            })
            .collect()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    fn grouped<'a, F>(&'a self, key: F) -> BTreeMap<String, f64>
    where
        F: Fn(&'a str) -> &'a str,
    {
        let mut groups = BTreeMap::new();
        for e in &self.entries {
            *groups.entry(key(&e.name).to_string()).or_insert(0.0) += e.weight;
        }
        groups
    }
}
