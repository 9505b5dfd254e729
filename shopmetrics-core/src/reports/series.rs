//! Bucketed series building.
//!
//! Rows for the full range are fetched once and bucketed in memory; the
//! bucket windows and labels come from the range's granularity. Every span
//! in the range is represented, so charts render a continuous axis with
//! zeroes where nothing happened.

use crate::reports::period::DateRange;
use crate::types::MetricRow;

/// How rows inside a bucket (or a whole period) collapse to one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregation {
    /// Number of rows
    Count,
    /// Sum of row values
    Sum,
    /// Mean of row values (0 when there are no rows)
    Average,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Count => "count",
            Aggregation::Sum => "sum",
            Aggregation::Average => "average",
        }
    }
}

/// One point on a chart series.
///
/// Created fresh on every aggregation call and never mutated afterwards;
/// series are recomputed, not cached.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Bucket {
    /// Chart label (see [`BucketSpan::label`](crate::reports::BucketSpan::label))
    pub label: String,
    /// Aggregated value for the window
    pub value: f64,
}

/// Collapse rows to a single number.
pub fn aggregate(rows: &[MetricRow], aggregation: Aggregation) -> f64 {
    match aggregation {
        Aggregation::Count => rows.len() as f64,
        Aggregation::Sum => rows.iter().map(|r| r.value).sum(),
        Aggregation::Average => {
            if rows.is_empty() {
                0.0
            } else {
                rows.iter().map(|r| r.value).sum::<f64>() / rows.len() as f64
            }
        }
    }
}

/// Build the ordered, zero-filled series for a range.
///
/// Rows bucket by the UTC calendar date of their timestamp; rows outside
/// the range are ignored. The series length equals the number of bucket
/// spans for the range's granularity, bounded by its day count.
pub fn build_series(rows: &[MetricRow], range: &DateRange, aggregation: Aggregation) -> Vec<Bucket> {
    let granularity = range.granularity();
    range
        .bucket_spans()
        .into_iter()
        .map(|span| {
            let in_span: Vec<MetricRow> = rows
                .iter()
                .filter(|r| span.contains(r.timestamp.date_naive()))
                .cloned()
                .collect();
            Bucket {
                label: span.label(granularity),
                value: aggregate(&in_span, aggregation),
            }
        })
        .collect()
}
