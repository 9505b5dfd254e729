//! Metric registry for discovery and configuration.
//!
//! One table declares, per metric, how its rows collapse to a number and
//! which way its change percent points. All report call sites configure
//! the aggregator from here, so no call site carries ad hoc inversion
//! logic.

use crate::reports::compare::Direction;
use crate::reports::series::Aggregation;
use serde::Serialize;

/// The metrics the engine can report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Invoice totals, excluding voided invoices
    InvoicedRevenue,
    /// Number of invoices raised
    InvoiceCount,
    /// Number of diary bookings (cancellations excluded)
    BookingCount,
    /// Number of jobs completed
    JobsCompleted,
    /// Days from job open to completion
    JobCompletionDays,
    /// New customer records created
    NewCustomers,
    /// Value of parts consumed by jobs and counter sales
    PartsConsumed,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        self.def().name
    }

    /// Registry entry for this metric.
    pub fn def(&self) -> &'static MetricDef {
        METRICS
            .iter()
            .find(|d| d.metric == *self)
            .expect("every metric has a registry entry")
    }
}

/// What a metric's numbers mean, for display purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Currency,
    Count,
    Days,
}

/// Descriptor for one reportable metric.
#[derive(Debug, Clone)]
pub struct MetricDef {
    pub metric: Metric,
    /// Stable identifier used by the CLI and logs
    pub name: &'static str,
    /// Human-facing label
    pub display_name: &'static str,
    /// How rows collapse to a bucket/period value
    pub aggregation: Aggregation,
    /// Which way the change percent points
    pub direction: Direction,
    /// Display unit
    pub unit: Unit,
}

/// All reportable metrics.
///
/// Job completion time is the only lower-is-better metric; everything else
/// grows in the happy direction.
pub const METRICS: &[MetricDef] = &[
    MetricDef {
        metric: Metric::InvoicedRevenue,
        name: "invoiced_revenue",
        display_name: "Invoiced revenue",
        aggregation: Aggregation::Sum,
        direction: Direction::HigherIsBetter,
        unit: Unit::Currency,
    },
    MetricDef {
        metric: Metric::InvoiceCount,
        name: "invoice_count",
        display_name: "Invoices raised",
        aggregation: Aggregation::Count,
        direction: Direction::HigherIsBetter,
        unit: Unit::Count,
    },
    MetricDef {
        metric: Metric::BookingCount,
        name: "booking_count",
        display_name: "Bookings",
        aggregation: Aggregation::Count,
        direction: Direction::HigherIsBetter,
        unit: Unit::Count,
    },
    MetricDef {
        metric: Metric::JobsCompleted,
        name: "jobs_completed",
        display_name: "Jobs completed",
        aggregation: Aggregation::Count,
        direction: Direction::HigherIsBetter,
        unit: Unit::Count,
    },
    MetricDef {
        metric: Metric::JobCompletionDays,
        name: "job_completion_days",
        display_name: "Avg completion time",
        aggregation: Aggregation::Average,
        direction: Direction::LowerIsBetter,
        unit: Unit::Days,
    },
    MetricDef {
        metric: Metric::NewCustomers,
        name: "new_customers",
        display_name: "New customers",
        aggregation: Aggregation::Count,
        direction: Direction::HigherIsBetter,
        unit: Unit::Count,
    },
    MetricDef {
        metric: Metric::PartsConsumed,
        name: "parts_consumed",
        display_name: "Parts consumed",
        aggregation: Aggregation::Sum,
        direction: Direction::HigherIsBetter,
        unit: Unit::Currency,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_metric_has_an_entry() {
        for metric in [
            Metric::InvoicedRevenue,
            Metric::InvoiceCount,
            Metric::BookingCount,
            Metric::JobsCompleted,
            Metric::JobCompletionDays,
            Metric::NewCustomers,
            Metric::PartsConsumed,
        ] {
            let def = metric.def();
            assert_eq!(def.metric, metric);
            assert!(!def.name.is_empty());
        }
    }

    #[test]
    fn test_only_completion_time_inverts() {
        let inverted: Vec<_> = METRICS
            .iter()
            .filter(|d| d.direction == Direction::LowerIsBetter)
            .map(|d| d.metric)
            .collect();
        assert_eq!(inverted, vec![Metric::JobCompletionDays]);
    }

    #[test]
    fn test_names_unique() {
        let mut names: Vec<_> = METRICS.iter().map(|d| d.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), METRICS.len());
    }
}
