//! Error taxonomy for the aggregator.
//!
//! Every variant is a local contract violation: the caller fixes its inputs,
//! nothing here is worth retrying.

use thiserror::Error;

/// Errors raised by rank transforms, weight learning, and aggregation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankAggError {
    #[error("invalid config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("uninitialized weights: call aggregate() or set_weights() first")]
    UninitializedState,
}

impl RankAggError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Errors from loading an [`AggregatorConfig`](crate::config::AggregatorConfig) file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] RankAggError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_message_names_field() {
        let err = RankAggError::config("decimal_precision", "must be >= 1, got 0");
        assert_eq!(
            err.to_string(),
            "invalid config: decimal_precision must be >= 1, got 0"
        );
    }

    #[test]
    fn uninitialized_message_is_actionable() {
        assert!(RankAggError::UninitializedState
            .to_string()
            .contains("uninitialized weights"));
    }
}
