//! Reporting module for shopmetrics
//!
//! Everything needed to turn workshop records into chart-ready reports:
//! - Date ranges, presets, and adaptive granularity
//! - Bucketed series building over pre-fetched rows
//! - Prior-period comparison with per-metric direction
//! - Customer retention intersection
//! - The report engine tying it together over a [`MetricSource`]
//!
//! The same parameterized path serves every metric; per-metric behavior
//! (aggregation, change direction, display unit) lives in the
//! [`registry`].

pub mod compare;
pub mod engine;
pub mod period;
pub mod registry;
pub mod retention;
pub mod series;

pub use compare::{change_percent, Comparison, Direction};
pub use engine::{
    CustomerReport, InventoryReport, MetricSection, MetricSource, OperationsReport, ReportEngine,
    RequestTicket, RetentionSection, RevenueReport, SectionStatus, WorkshopReport,
};
pub use period::{BucketSpan, DateRange, Granularity, RangePreset};
pub use registry::{Metric, MetricDef, Unit, METRICS};
pub use retention::{intersect, Retention, RetentionTrend};
pub use series::{build_series, Aggregation, Bucket};
