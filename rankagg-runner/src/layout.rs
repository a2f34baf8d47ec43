//! Metric layout: column names and directions for metric x object tables.
//!
//! A per-object metric expands into one column per object label,
//! `<Name>_object<k>`; a whole-set metric (e.g. kappa) yields `<Name>_all`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rankagg_core::{Direction, MetricOrder};

/// Suffix of whole-set columns.
pub const WHOLE_SET_SUFFIX: &str = "all";

/// Prefix of per-object column suffixes.
pub const OBJECT_PREFIX: &str = "object";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricScope {
    /// One value per object label.
    PerObject,
    /// One value for the whole label set.
    WholeSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricKind {
    pub name: String,
    pub direction: Direction,
    pub scope: MetricScope,
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("layout has no metrics")]
    Empty,
    #[error("per-object metric {0} needs at least one object")]
    NoObjects(String),
    #[error("metric name {0:?} must be non-empty and free of '_'")]
    InvalidName(String),
    #[error("duplicate column {0}")]
    DuplicateColumn(String),
}

/// Column names and the matching [`MetricOrder`].
#[derive(Debug, Clone, PartialEq)]
pub struct MetricLayout {
    names: Vec<String>,
    order: MetricOrder,
}

impl MetricLayout {
    pub fn builder(n_objects: usize) -> LayoutBuilder {
        LayoutBuilder {
            n_objects,
            kinds: Vec::new(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn order(&self) -> &MetricOrder {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.names.iter().position(|n| n == column)
    }
}

#[derive(Debug, Clone)]
pub struct LayoutBuilder {
    n_objects: usize,
    kinds: Vec<MetricKind>,
}

impl LayoutBuilder {
    pub fn per_object(self, name: &str, direction: Direction) -> Self {
        self.metric(MetricKind {
            name: name.to_string(),
            direction,
            scope: MetricScope::PerObject,
        })
    }

    pub fn whole_set(self, name: &str, direction: Direction) -> Self {
        self.metric(MetricKind {
            name: name.to_string(),
            direction,
            scope: MetricScope::WholeSet,
        })
    }

    pub fn metric(mut self, kind: MetricKind) -> Self {
        self.kinds.push(kind);
        self
    }

    pub fn build(self) -> Result<MetricLayout, LayoutError> {
        if self.kinds.is_empty() {
            return Err(LayoutError::Empty);
        }

        let mut names = Vec::new();
        let mut directions = Vec::new();
        let mut seen = HashSet::new();
        for kind in &self.kinds {
            if kind.name.is_empty() || kind.name.contains('_') {
                return Err(LayoutError::InvalidName(kind.name.clone()));
            }
            let columns: Vec<String> = match kind.scope {
                MetricScope::WholeSet => vec![format!("{}_{WHOLE_SET_SUFFIX}", kind.name)],
                MetricScope::PerObject if self.n_objects == 0 => {
                    return Err(LayoutError::NoObjects(kind.name.clone()))
                }
                MetricScope::PerObject => (1..=self.n_objects)
                    .map(|k| format!("{}_{OBJECT_PREFIX}{k}", kind.name))
                    .collect(),
            };
            for column in columns {
                if !seen.insert(column.clone()) {
                    return Err(LayoutError::DuplicateColumn(column));
                }
                names.push(column);
                directions.push(kind.direction);
            }
        }

        Ok(MetricLayout {
            names,
            order: MetricOrder::new(directions),
        })
    }
}

/// Split a column name into `(metric type, object label)`.
///
/// `Dice_object3` -> `("Dice", "3")`, `Kappa_all` -> `("Kappa", "all")`.
/// Names without `_` are their own type with label `all`.
pub fn split_column(column: &str) -> (&str, &str) {
    match column.split_once('_') {
        Some((metric, rest)) => (metric, rest.strip_prefix(OBJECT_PREFIX).unwrap_or(rest)),
        None => (column, WHOLE_SET_SUFFIX),
    }
}
