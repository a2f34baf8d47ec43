//! Domain types: metric tables, directions, ranks, weights.

pub mod order;
pub mod ranks;
pub mod table;
pub mod weights;

pub use order::{Direction, MetricOrder};
pub use ranks::{RankTable, RankVector};
pub use table::MetricTable;
pub use weights::WeightVector;
