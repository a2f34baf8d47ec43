//! Rank transform: raw metric column -> 1-based rank vector.
//!
//! Values are direction-normalized (smaller is better), rounded to the
//! configured precision, and ranked with average ties. Undefined entries get
//! the sentinel rank `threshold + 1`.

use crate::config::AggregatorConfig;
use crate::domain::{Direction, MetricOrder, MetricTable, RankTable, RankVector};
use crate::error::RankAggError;

/// 1-based ranks of `values`, ascending, ties averaged.
///
/// Tie groups are formed on exact equality after sorting, so the result does
/// not depend on input order. Callers must pass finite values only.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        // positions start..=end are 0-based; their 1-based mean is (start + end) / 2 + 1
        let shared = (start + end) as f64 / 2.0 + 1.0;
        for &idx in &order[start..=end] {
            ranks[idx] = shared;
        }
        start = end + 1;
    }
    ranks
}

/// Round half away from zero to `precision` decimal digits.
///
/// Values whose scaled form overflows are returned unrounded. Negative zero
/// collapses to zero.
pub fn round_to_precision(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value + 0.0;
    }
    scaled.round() / scale + 0.0
}

/// Rank one raw metric column.
///
/// Defined entries are ranked among themselves; undefined entries all get
/// `config.sentinel_rank()`. An all-undefined column is all sentinel.
pub fn rank_column(column: &[f64], direction: Direction, config: &AggregatorConfig) -> RankVector {
    let sentinel = config.sentinel_rank();
    let defined: Vec<usize> = (0..column.len())
        .filter(|&i| MetricTable::is_defined(column[i]))
        .collect();

    let normalized: Vec<f64> = defined
        .iter()
        .map(|&i| round_to_precision(direction.normalize(column[i]), config.decimal_precision))
        .collect();

    let mut ranks = vec![sentinel; column.len()];
    for (&i, r) in defined.iter().zip(average_ranks(&normalized)) {
        ranks[i] = r;
    }
    RankVector::from_vec(ranks)
}

/// Rank every column of a table under its declared direction.
pub fn rank_table(
    table: &MetricTable,
    order: &MetricOrder,
    config: &AggregatorConfig,
) -> Result<RankTable, RankAggError> {
    order.check_width(table.n_metrics())?;
    let columns = (0..table.n_metrics())
        .map(|m| rank_column(&table.column(m), order.get(m), config))
        .collect();
    RankTable::from_columns(columns)
}

/// Clip a rank to the top-k ceiling `threshold + 1`.
pub fn clip_rank(rank: f64, config: &AggregatorConfig) -> f64 {
    rank.min(config.sentinel_rank())
}
