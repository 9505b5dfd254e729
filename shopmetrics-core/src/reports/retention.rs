//! Customer retention set intersection.
//!
//! Retention for a period is the share of customers active in the prior
//! period that were active again in the current one. Identifiers are
//! compared as exact strings; empty ids are dropped before set
//! construction so unattributed records never count as a customer.

use serde::Serialize;
use std::collections::HashSet;

use crate::reports::compare::{Comparison, Direction};

/// Overlap of two periods' distinct customer sets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Retention {
    /// Customers active in both periods
    pub retained_count: usize,
    /// Distinct customers active in the earlier period
    pub base_count: usize,
    /// `round(retained/base * 100)`, or 0 when the base is empty
    pub retention_percent: f64,
}

/// Intersect the earlier period's customer ids with the later period's.
pub fn intersect(base_ids: &[String], current_ids: &[String]) -> Retention {
    let base: HashSet<&str> = base_ids
        .iter()
        .map(String::as_str)
        .filter(|id| !id.is_empty())
        .collect();
    let current: HashSet<&str> = current_ids
        .iter()
        .map(String::as_str)
        .filter(|id| !id.is_empty())
        .collect();

    let retained_count = base.intersection(&current).count();
    let base_count = base.len();
    let retention_percent = if base_count == 0 {
        0.0
    } else {
        (retained_count as f64 / base_count as f64 * 100.0).round()
    };

    Retention {
        retained_count,
        base_count,
        retention_percent,
    }
}

/// Retention for the current period alongside the prior period's, with the
/// two percentages compared under the standard change rule.
///
/// Needs three periods of ids: `current` retention intersects period N−1
/// with N, `prior` retention intersects N−2 with N−1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RetentionTrend {
    pub current: Retention,
    pub prior: Retention,
    pub comparison: Comparison,
}

impl RetentionTrend {
    /// Pair two consecutive retention results.
    pub fn from_periods(current: Retention, prior: Retention) -> Self {
        let comparison = Comparison::from_values(
            current.retention_percent,
            prior.retention_percent,
            Direction::HigherIsBetter,
        );
        Self {
            current,
            prior,
            comparison,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_intersection() {
        // Prior {A,B,C}, current {B,C,D}: 2 of 3 retained, 67% rounded.
        let result = intersect(&ids(&["A", "B", "C"]), &ids(&["B", "C", "D"]));
        assert_eq!(result.retained_count, 2);
        assert_eq!(result.base_count, 3);
        assert_eq!(result.retention_percent, 67.0);
    }

    #[test]
    fn test_empty_base() {
        let result = intersect(&[], &ids(&["A", "B"]));
        assert_eq!(result.retained_count, 0);
        assert_eq!(result.base_count, 0);
        assert_eq!(result.retention_percent, 0.0);
    }

    #[test]
    fn test_empty_ids_filtered() {
        let result = intersect(&ids(&["A", "", "B", ""]), &ids(&["", "A"]));
        assert_eq!(result.base_count, 2);
        assert_eq!(result.retained_count, 1);
        assert_eq!(result.retention_percent, 50.0);
    }

    #[test]
    fn test_duplicates_are_distinct() {
        let result = intersect(&ids(&["A", "A", "B"]), &ids(&["A", "A", "A"]));
        assert_eq!(result.base_count, 2);
        assert_eq!(result.retained_count, 1);
    }

    #[test]
    fn test_full_retention() {
        let result = intersect(&ids(&["A", "B"]), &ids(&["A", "B", "C"]));
        assert_eq!(result.retention_percent, 100.0);
    }

    #[test]
    fn test_trend_comparison() {
        let current = intersect(&ids(&["A", "B", "C", "D"]), &ids(&["A", "B", "C"]));
        let prior = intersect(&ids(&["A", "B"]), &ids(&["A"]));
        let trend = RetentionTrend::from_periods(current, prior);

        assert_eq!(trend.current.retention_percent, 75.0);
        assert_eq!(trend.prior.retention_percent, 50.0);
        assert_eq!(trend.comparison.change_percent, 50.0);
    }
}
