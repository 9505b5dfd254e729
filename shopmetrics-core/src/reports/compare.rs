//! Prior-period comparison arithmetic.
//!
//! The engine fetches and aggregates; this module only turns two period
//! values into a rounded percent change.

use serde::Serialize;

/// Whether a bigger number is good news for a metric.
///
/// Lower-is-better metrics (job completion time) invert the change rule by
/// swapping numerator and denominator, so a drop reads as a positive
/// change. The flag is always explicit, carried by the metric registry;
/// call sites never infer it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// A metric's current-period value against the immediately preceding
/// period of identical length.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Comparison {
    /// Aggregate over the current period
    pub current: f64,
    /// Aggregate over the prior period
    pub prior: f64,
    /// Rounded percent change, sign-adjusted for the metric's direction
    pub change_percent: f64,
}

impl Comparison {
    /// Build a comparison from two period aggregates.
    pub fn from_values(current: f64, prior: f64, direction: Direction) -> Self {
        Self {
            current,
            prior,
            change_percent: change_percent(current, prior, direction),
        }
    }
}

/// Rounded percent change between two period values.
///
/// `(current/prior - 1) * 100` for higher-is-better metrics, with the
/// ratio flipped for lower-is-better ones. When the denominator period is
/// zero there is nothing to compare against and the change is 0.
pub fn change_percent(current: f64, prior: f64, direction: Direction) -> f64 {
    let (numerator, denominator) = match direction {
        Direction::HigherIsBetter => (current, prior),
        Direction::LowerIsBetter => (prior, current),
    };
    if denominator == 0.0 {
        return 0.0;
    }
    ((numerator / denominator - 1.0) * 100.0).round()
}
