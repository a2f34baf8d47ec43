//! rankagg runner — ensemble learning and the plumbing around it.
//!
//! This crate builds on `rankagg-core` to provide:
//! - Ensemble weight learning over many independent trials (rayon)
//! - Reproducible trial construction: seed hierarchy, bagging, synthetic data
//! - Metric layouts for metric x object tables and weight reports
//! - CSV ingestion of metric tables

pub mod bagging;
pub mod ensemble;
pub mod layout;
pub mod report;
pub mod rng;
pub mod synthetic;
pub mod table_io;

pub use bagging::{bag_size, bagged_trials, DEFAULT_BAG_FRACTION};
pub use ensemble::{
    mean_weights, EnsembleConfig, EnsembleDriver, EnsembleError, EnsembleResult, Trial,
};
pub use layout::{split_column, LayoutBuilder, LayoutError, MetricKind, MetricLayout, MetricScope};
pub use report::{CompetitionWeight, WeightEntry, WeightReport, DEFAULT_METRIC_IDS};
pub use rng::RngHierarchy;
pub use synthetic::{SyntheticConfig, SyntheticDataset};
pub use table_io::{read_metric_table, TableReadError};
