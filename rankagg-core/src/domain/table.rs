use serde::{Deserialize, Serialize};

use crate::error::RankAggError;

/// Raw metric values: rows are samples, columns are metrics.
///
/// Any non-finite cell (NaN or ±inf) is *undefined*: the metric could not be
/// computed for that sample. The shape is fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMetricTable")]
pub struct MetricTable {
    n_samples: usize,
    n_metrics: usize,
    values: Vec<f64>,
}

/// Wire form of [`MetricTable`]; checked through [`MetricTable::new`].
#[derive(Deserialize)]
struct RawMetricTable {
    n_samples: usize,
    n_metrics: usize,
    values: Vec<f64>,
}

impl TryFrom<RawMetricTable> for MetricTable {
    type Error = RankAggError;

    fn try_from(raw: RawMetricTable) -> Result<Self, Self::Error> {
        Self::new(raw.n_samples, raw.n_metrics, raw.values)
    }
}

impl MetricTable {
    /// Build from a row-major buffer.
    pub fn new(n_samples: usize, n_metrics: usize, values: Vec<f64>) -> Result<Self, RankAggError> {
        if n_metrics == 0 {
            return Err(RankAggError::input("metric table needs at least one column"));
        }
        if values.len() != n_samples * n_metrics {
            return Err(RankAggError::input(format!(
                "expected {} values for a {n_samples}x{n_metrics} table, got {}",
                n_samples * n_metrics,
                values.len()
            )));
        }
        Ok(Self {
            n_samples,
            n_metrics,
            values,
        })
    }

    /// Build from rows; every row must have the same, non-zero width.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, RankAggError> {
        let n_metrics = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| RankAggError::input("metric table needs at least one row"))?;

        let n_samples = rows.len();
        let mut values = Vec::with_capacity(n_samples * n_metrics);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_metrics {
                return Err(RankAggError::input(format!(
                    "row {i} has {} columns, expected {n_metrics}",
                    row.len()
                )));
            }
            values.extend(row);
        }
        Self::new(n_samples, n_metrics, values)
    }

    /// Build from rows where `None` marks an undefined cell.
    pub fn from_optional_rows(rows: Vec<Vec<Option<f64>>>) -> Result<Self, RankAggError> {
        Self::from_rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
                .collect(),
        )
    }

    /// Build from columns; every column must have the same length.
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self, RankAggError> {
        let n_metrics = columns.len();
        let n_samples = columns.first().map(Vec::len).unwrap_or(0);
        if let Some((m, col)) = columns.iter().enumerate().find(|(_, c)| c.len() != n_samples) {
            return Err(RankAggError::input(format!(
                "column {m} has {} rows, expected {n_samples}",
                col.len()
            )));
        }
        let mut values = Vec::with_capacity(n_samples * n_metrics);
        for s in 0..n_samples {
            values.extend(columns.iter().map(|col| col[s]));
        }
        Self::new(n_samples, n_metrics, values)
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn n_metrics(&self) -> usize {
        self.n_metrics
    }

    /// Cell value; panics when out of bounds, like slice indexing.
    pub fn get(&self, sample: usize, metric: usize) -> f64 {
        assert!(metric < self.n_metrics, "metric index {metric} out of range");
        self.values[sample * self.n_metrics + metric]
    }

    pub fn row(&self, sample: usize) -> &[f64] {
        let start = sample * self.n_metrics;
        &self.values[start..start + self.n_metrics]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.n_metrics)
    }

    /// Copy of one metric column.
    pub fn column(&self, metric: usize) -> Vec<f64> {
        self.rows().map(|row| row[metric]).collect()
    }

    /// Whether a cell counts as defined.
    pub fn is_defined(value: f64) -> bool {
        value.is_finite()
    }

    pub fn undefined_count(&self) -> usize {
        self.values.iter().filter(|v| !Self::is_defined(**v)).count()
    }
}
