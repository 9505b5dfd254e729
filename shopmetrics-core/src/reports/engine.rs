//! Report engine
//!
//! Assembles the four report areas (revenue, operations, customers,
//! inventory) from a [`MetricSource`]. One parameterized path serves every
//! metric: fetch the rows for the current and prior periods, bucket the
//! current period into a series, aggregate both periods, and compare them
//! under the metric's registered direction.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       REPORT ENGINE                          │
//! │                                                              │
//! │  registry ──► which aggregation / direction per metric       │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            ReportEngine.metric_section()               │  │
//! │  │  - fetches current + prior rows from the MetricSource  │  │
//! │  │  - builds the bucketed series (period::bucket_spans)   │  │
//! │  │  - compares the two periods (compare::change_percent)  │  │
//! │  │  - converts fetch failures into zeroed Failed sections │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Staleness
//!
//! Every full report carries a [`RequestTicket`] from a monotonic counter.
//! A caller that kicks off a newer computation simply drops any report
//! whose ticket is no longer current, so a slow fetch can never overwrite
//! fresher state.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::reports::compare::Comparison;
use crate::reports::period::DateRange;
use crate::reports::registry::Metric;
use crate::reports::retention::{self, RetentionTrend};
use crate::reports::series::{self, Bucket};
use crate::types::MetricRow;

// ============================================
// Data access seam
// ============================================

/// The data-access collaborator reports run against.
///
/// One call fetches all rows for a metric over a full range; the engine
/// buckets in memory. Implementations are expected to scope rows to the
/// range inclusively on both ends, by the UTC calendar date of the row's
/// timestamp.
pub trait MetricSource {
    /// All observation rows for `metric` within `range`.
    fn fetch_rows(&self, metric: Metric, range: &DateRange) -> Result<Vec<MetricRow>>;

    /// Distinct customer identifiers active within `range`.
    ///
    /// Implementations should already exclude null ids; the retention
    /// intersector additionally drops empty strings.
    fn fetch_customer_ids(&self, range: &DateRange) -> Result<Vec<String>>;
}

// ============================================
// Request tickets
// ============================================

/// Monotonic token identifying one report computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RequestTicket(pub u64);

// ============================================
// Sections
// ============================================

/// Lifecycle of a report section.
///
/// `Pending` is the caller-side initial state while a computation is in
/// flight; the engine itself only ever returns `Ok` or `Failed`. A
/// `Failed` section still carries zero-valued data, so consumers that
/// want the old "missing reads as zero" behavior can ignore the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Pending,
    Ok,
    Failed,
}

/// One metric's chart series and period comparison.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSection {
    pub metric: Metric,
    pub status: SectionStatus,
    /// Bucketed series over the current period, time ascending
    pub series: Vec<Bucket>,
    /// Current vs prior period
    pub comparison: Comparison,
}

impl MetricSection {
    /// Zero-valued section reported when a fetch fails.
    fn failed(metric: Metric) -> Self {
        Self {
            metric,
            status: SectionStatus::Failed,
            series: Vec::new(),
            comparison: Comparison::default(),
        }
    }
}

/// Customer retention with its own period-over-period trend.
#[derive(Debug, Clone, Serialize)]
pub struct RetentionSection {
    pub status: SectionStatus,
    pub trend: RetentionTrend,
}

impl RetentionSection {
    fn failed() -> Self {
        Self {
            status: SectionStatus::Failed,
            trend: RetentionTrend::default(),
        }
    }
}

// ============================================
// Reports
// ============================================

/// Revenue report: invoiced totals and invoice volume.
#[derive(Debug, Clone, Serialize)]
pub struct RevenueReport {
    pub range: DateRange,
    pub revenue: MetricSection,
    pub invoices: MetricSection,
}

/// Operations report: diary and job throughput.
#[derive(Debug, Clone, Serialize)]
pub struct OperationsReport {
    pub range: DateRange,
    pub bookings: MetricSection,
    pub jobs_completed: MetricSection,
    /// Lower is better; the comparison sign is already adjusted
    pub completion_days: MetricSection,
}

/// Customer report: acquisition and retention.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerReport {
    pub range: DateRange,
    pub new_customers: MetricSection,
    pub retention: RetentionSection,
}

/// Inventory report: parts consumption value.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryReport {
    pub range: DateRange,
    pub parts_consumed: MetricSection,
}

/// All four report areas for one range, tagged with the ticket that
/// produced them.
#[derive(Debug, Clone, Serialize)]
pub struct WorkshopReport {
    pub ticket: RequestTicket,
    pub range: DateRange,
    pub revenue: RevenueReport,
    pub operations: OperationsReport,
    pub customers: CustomerReport,
    pub inventory: InventoryReport,
}

// ============================================
// Engine
// ============================================

/// Engine that computes reports from a [`MetricSource`].
///
/// Owns no report state: every call recomputes from the source. The only
/// mutable state is the ticket counter.
pub struct ReportEngine<S: MetricSource> {
    source: S,
    tickets: AtomicU64,
}

impl<S: MetricSource> ReportEngine<S> {
    /// Create an engine over a metric source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            tickets: AtomicU64::new(0),
        }
    }

    /// Issue the next request ticket, superseding all earlier ones.
    pub fn begin_request(&self) -> RequestTicket {
        RequestTicket(self.tickets.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is still the latest issued.
    ///
    /// Callers drop results carrying a stale ticket instead of applying
    /// them.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.tickets.load(Ordering::SeqCst)
    }

    /// Series + comparison for one metric.
    ///
    /// Fetch failures are logged and reported as a zeroed `Failed`
    /// section; they never propagate.
    pub fn metric_section(&self, metric: Metric, range: &DateRange) -> MetricSection {
        match self.compute_section(metric, range) {
            Ok(section) => section,
            Err(e) => {
                tracing::warn!(
                    metric = metric.as_str(),
                    range = %range,
                    error = %e,
                    "Metric fetch failed; reporting zeroes"
                );
                MetricSection::failed(metric)
            }
        }
    }

    fn compute_section(&self, metric: Metric, range: &DateRange) -> Result<MetricSection> {
        let def = metric.def();
        let prior_range = range.prior();

        let rows = self.source.fetch_rows(metric, range)?;
        let prior_rows = self.source.fetch_rows(metric, &prior_range)?;

        let current = series::aggregate(&rows, def.aggregation);
        let prior = series::aggregate(&prior_rows, def.aggregation);

        Ok(MetricSection {
            metric,
            status: SectionStatus::Ok,
            series: series::build_series(&rows, range, def.aggregation),
            comparison: Comparison::from_values(current, prior, def.direction),
        })
    }

    /// Retention trend over three consecutive periods ending at `range`.
    pub fn retention_section(&self, range: &DateRange) -> RetentionSection {
        match self.compute_retention(range) {
            Ok(trend) => RetentionSection {
                status: SectionStatus::Ok,
                trend,
            },
            Err(e) => {
                tracing::warn!(
                    range = %range,
                    error = %e,
                    "Retention fetch failed; reporting zeroes"
                );
                RetentionSection::failed()
            }
        }
    }

    fn compute_retention(&self, range: &DateRange) -> Result<RetentionTrend> {
        let prior = range.prior();
        let prior2 = prior.prior();

        let current_ids = self.source.fetch_customer_ids(range)?;
        let prior_ids = self.source.fetch_customer_ids(&prior)?;
        let prior2_ids = self.source.fetch_customer_ids(&prior2)?;

        let current = retention::intersect(&prior_ids, &current_ids);
        let previous = retention::intersect(&prior2_ids, &prior_ids);
        Ok(RetentionTrend::from_periods(current, previous))
    }

    /// Revenue report for a range.
    pub fn revenue_report(&self, range: &DateRange) -> RevenueReport {
        RevenueReport {
            range: *range,
            revenue: self.metric_section(Metric::InvoicedRevenue, range),
            invoices: self.metric_section(Metric::InvoiceCount, range),
        }
    }

    /// Operations report for a range.
    pub fn operations_report(&self, range: &DateRange) -> OperationsReport {
        OperationsReport {
            range: *range,
            bookings: self.metric_section(Metric::BookingCount, range),
            jobs_completed: self.metric_section(Metric::JobsCompleted, range),
            completion_days: self.metric_section(Metric::JobCompletionDays, range),
        }
    }

    /// Customer report for a range.
    pub fn customer_report(&self, range: &DateRange) -> CustomerReport {
        CustomerReport {
            range: *range,
            new_customers: self.metric_section(Metric::NewCustomers, range),
            retention: self.retention_section(range),
        }
    }

    /// Inventory report for a range.
    pub fn inventory_report(&self, range: &DateRange) -> InventoryReport {
        InventoryReport {
            range: *range,
            parts_consumed: self.metric_section(Metric::PartsConsumed, range),
        }
    }

    /// All four report areas, tagged with a fresh ticket.
    pub fn full_report(&self, range: &DateRange) -> WorkshopReport {
        let ticket = self.begin_request();

        tracing::debug!(
            range = %range,
            granularity = range.granularity().as_str(),
            ticket = ticket.0,
            "Computing workshop report"
        );

        WorkshopReport {
            ticket,
            range: *range,
            revenue: self.revenue_report(range),
            operations: self.operations_report(range),
            customers: self.customer_report(range),
            inventory: self.inventory_report(range),
        }
    }
}
