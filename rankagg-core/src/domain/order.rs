use serde::{Deserialize, Serialize};

use crate::error::RankAggError;

/// Which raw values are better for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Larger raw value is better (overlap, sensitivity, kappa).
    HigherIsBetter,
    /// Smaller raw value is better (distances).
    LowerIsBetter,
}

impl Direction {
    /// `+1` for higher-is-better, `-1` for lower-is-better.
    pub fn sign(self) -> f64 {
        match self {
            Self::HigherIsBetter => 1.0,
            Self::LowerIsBetter => -1.0,
        }
    }

    /// Parse a signed flag. Zero carries no direction and is rejected.
    pub fn from_sign(sign: i32) -> Result<Self, RankAggError> {
        match sign.signum() {
            1 => Ok(Self::HigherIsBetter),
            -1 => Ok(Self::LowerIsBetter),
            _ => Err(RankAggError::input("metric order flag must be non-zero")),
        }
    }

    /// Map a raw value so that smaller is uniformly better.
    pub fn normalize(self, value: f64) -> f64 {
        match self {
            Self::HigherIsBetter => -value,
            Self::LowerIsBetter => value,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::HigherIsBetter => Self::LowerIsBetter,
            Self::LowerIsBetter => Self::HigherIsBetter,
        }
    }
}

/// One direction per metric column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricOrder(Vec<Direction>);

impl MetricOrder {
    pub fn new(directions: Vec<Direction>) -> Self {
        Self(directions)
    }

    /// Every column higher-is-better.
    pub fn all_higher(n_metrics: usize) -> Self {
        Self(vec![Direction::HigherIsBetter; n_metrics])
    }

    /// Build from `+1` / `-1` flags.
    pub fn from_signs(signs: &[i32]) -> Result<Self, RankAggError> {
        signs
            .iter()
            .map(|&s| Direction::from_sign(s))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, metric: usize) -> Direction {
        self.0[metric]
    }

    pub fn directions(&self) -> &[Direction] {
        &self.0
    }

    /// Fail unless there is exactly one direction per table column.
    pub fn check_width(&self, n_metrics: usize) -> Result<(), RankAggError> {
        if self.0.len() != n_metrics {
            return Err(RankAggError::input(format!(
                "metric order has {} entries but table has {n_metrics} columns",
                self.0.len()
            )));
        }
        Ok(())
    }
}

impl FromIterator<Direction> for MetricOrder {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_makes_smaller_better() {
        assert_eq!(Direction::HigherIsBetter.normalize(3.0), -3.0);
        assert_eq!(Direction::LowerIsBetter.normalize(3.0), 3.0);
    }

    #[test]
    fn signs_parse() {
        let order = MetricOrder::from_signs(&[1, -1, 5]).unwrap();
        assert_eq!(
            order.directions(),
            &[
                Direction::HigherIsBetter,
                Direction::LowerIsBetter,
                Direction::HigherIsBetter
            ]
        );
        assert!(MetricOrder::from_signs(&[1, 0]).is_err());
    }

    #[test]
    fn width_mismatch_detected() {
        let order = MetricOrder::all_higher(3);
        assert!(order.check_width(3).is_ok());
        assert!(matches!(order.check_width(2), Err(RankAggError::InvalidInput(_))));
    }

    #[test]
    fn flipped_roundtrip() {
        assert_eq!(Direction::HigherIsBetter.flipped().flipped(), Direction::HigherIsBetter);
        assert_eq!(Direction::LowerIsBetter.flipped().sign(), 1.0);
    }
}
