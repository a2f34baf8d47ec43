//! CSV ingestion of metric tables.
//!
//! First row names the metric columns; each following row is one sample.
//! Empty cells and `nan` / `inf` / `-inf` (any case) are undefined.

use std::io::Read;

use thiserror::Error;
use tracing::debug;

use rankagg_core::{MetricTable, RankAggError};

#[derive(Debug, Error)]
pub enum TableReadError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("metric table has no header columns")]
    EmptyHeader,

    #[error("row {row}, column {column}: cannot parse {value:?} as a number")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },

    #[error(transparent)]
    Shape(#[from] RankAggError),
}

/// Read `(column names, table)` from CSV.
pub fn read_metric_table<R: Read>(reader: R) -> Result<(Vec<String>, MetricTable), TableReadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let names: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if names.is_empty() || names.iter().all(String::is_empty) {
        return Err(TableReadError::EmptyHeader);
    }

    let mut values = Vec::new();
    let mut n_samples = 0;
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        for (field, column) in record.iter().zip(&names) {
            let value = parse_cell(field).ok_or_else(|| TableReadError::Parse {
                row,
                column: column.clone(),
                value: field.to_string(),
            })?;
            values.push(value);
        }
        n_samples += 1;
    }

    let table = MetricTable::new(n_samples, names.len(), values)?;
    debug!(
        samples = n_samples,
        metrics = names.len(),
        undefined = table.undefined_count(),
        "read metric table"
    );
    Ok((names, table))
}

fn parse_cell(field: &str) -> Option<f64> {
    if field.is_empty() {
        return Some(f64::NAN);
    }
    match field.to_ascii_lowercase().as_str() {
        "nan" | "inf" | "-inf" | "+inf" | "infinity" | "-infinity" => Some(f64::NAN),
        other => other.parse::<f64>().ok(),
    }
}
