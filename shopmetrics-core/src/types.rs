//! Core domain types for shopmetrics
//!
//! These types represent the canonical workshop records the reports run
//! against. They mirror the hosted backend's tables one-to-one; the sync
//! layer deserializes backend records straight into them.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Customer** | A person or company the workshop does work for |
//! | **Booking** | A diary entry reserving a bay/time slot for a vehicle |
//! | **Job** | A unit of workshop work, opened from a booking or walk-in |
//! | **Invoice** | A bill raised against a customer, usually from a job |
//! | **InventoryMove** | A stock movement (receipt, consumption, adjustment) |
//! | **MetricRow** | One timestamped observation fed to the report engine |
//!
//! Timestamps are stored as RFC 3339 UTC strings in SQLite and parsed back
//! into `DateTime<Utc>`. Every record carries a free-form JSON `metadata`
//! column so backend fields without a dedicated column survive a round trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Customer
// ============================================

/// A workshop customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier (backend id, or generated on import)
    #[serde(default)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Contact email
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone
    #[serde(default)]
    pub phone: Option<String>,
    /// When the customer record was created
    pub created_at: DateTime<Utc>,
    /// Extensible metadata
    #[serde(default = "empty_metadata")]
    pub metadata: serde_json::Value,
}

// ============================================
// Booking
// ============================================

/// Status of a diary booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    /// Returns the identifier used in database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "scheduled",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::NoShow => "no_show",
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(BookingStatus::Scheduled),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "no_show" => Ok(BookingStatus::NoShow),
            _ => Err(format!("unknown booking status: {}", s)),
        }
    }
}

/// A diary booking for a vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier
    #[serde(default)]
    pub id: String,
    /// Customer the booking is for (walk-ins may have none)
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Vehicle registration or description
    #[serde(default)]
    pub vehicle: Option<String>,
    /// When the bay/time slot is reserved
    pub scheduled_at: DateTime<Utc>,
    /// Booking status
    pub status: BookingStatus,
    /// When the booking record was created
    pub created_at: DateTime<Utc>,
    /// Extensible metadata
    #[serde(default = "empty_metadata")]
    pub metadata: serde_json::Value,
}

// ============================================
// Job
// ============================================

/// Status of a workshop job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(JobStatus::Open),
            "in_progress" => Ok(JobStatus::InProgress),
            "completed" => Ok(JobStatus::Completed),
            "cancelled" => Ok(JobStatus::Cancelled),
            _ => Err(format!("unknown job status: {}", s)),
        }
    }
}

/// A unit of workshop work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier
    #[serde(default)]
    pub id: String,
    /// Booking this job was opened from, if any
    #[serde(default)]
    pub booking_id: Option<String>,
    /// Customer the work is for
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Short description of the work
    #[serde(default)]
    pub title: Option<String>,
    /// When the job was opened
    pub opened_at: DateTime<Utc>,
    /// When the job was completed (None while open)
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Job status
    pub status: JobStatus,
    /// Booked labor hours
    #[serde(default)]
    pub labor_hours: Option<f64>,
    /// Extensible metadata
    #[serde(default = "empty_metadata")]
    pub metadata: serde_json::Value,
}

// ============================================
// Invoice
// ============================================

/// Status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    Paid,
    Void,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Issued => "issued",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Void => "void",
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "issued" => Ok(InvoiceStatus::Issued),
            "paid" => Ok(InvoiceStatus::Paid),
            "void" => Ok(InvoiceStatus::Void),
            _ => Err(format!("unknown invoice status: {}", s)),
        }
    }
}

/// A bill raised against a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    #[serde(default)]
    pub id: String,
    /// Customer being billed
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Job this invoice was raised from, if any
    #[serde(default)]
    pub job_id: Option<String>,
    /// When the invoice was issued
    pub issued_at: DateTime<Utc>,
    /// Invoice total, inclusive of tax
    pub total: f64,
    /// Invoice status
    pub status: InvoiceStatus,
    /// Extensible metadata
    #[serde(default = "empty_metadata")]
    pub metadata: serde_json::Value,
}

// ============================================
// Inventory
// ============================================

/// Kind of stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    /// Stock received from a supplier
    Receipt,
    /// Stock consumed by a job or counter sale
    Consumption,
    /// Manual stock correction
    Adjustment,
}

impl MoveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveKind::Receipt => "receipt",
            MoveKind::Consumption => "consumption",
            MoveKind::Adjustment => "adjustment",
        }
    }
}

impl std::str::FromStr for MoveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "receipt" => Ok(MoveKind::Receipt),
            "consumption" => Ok(MoveKind::Consumption),
            "adjustment" => Ok(MoveKind::Adjustment),
            _ => Err(format!("unknown move kind: {}", s)),
        }
    }
}

/// A stock movement for one part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryMove {
    /// Unique identifier
    #[serde(default)]
    pub id: String,
    /// Part number
    pub part_number: String,
    /// Quantity moved (always positive; `kind` carries the direction)
    pub quantity: f64,
    /// Unit cost at the time of the movement
    pub unit_cost: f64,
    /// When the movement happened
    pub moved_at: DateTime<Utc>,
    /// Kind of movement
    pub kind: MoveKind,
    /// Extensible metadata
    #[serde(default = "empty_metadata")]
    pub metadata: serde_json::Value,
}

// ============================================
// Metric observations
// ============================================

/// One timestamped observation fed to the report engine.
///
/// Rows are produced by a [`MetricSource`](crate::reports::MetricSource)
/// for a metric over a date range; the engine buckets and aggregates them.
/// Rows are immutable and owned by nobody past the current computation.
#[derive(Debug, Clone, Serialize)]
pub struct MetricRow {
    /// When the observation happened
    pub timestamp: DateTime<Utc>,
    /// Observed value (1.0 for pure count metrics)
    pub value: f64,
    /// Optional grouping key (e.g. part number)
    pub category: Option<String>,
}

impl MetricRow {
    /// Create a row with no category.
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value,
            category: None,
        }
    }
}

fn empty_metadata() -> serde_json::Value {
    serde_json::json!({})
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_round_trips() {
        for status in [
            BookingStatus::Scheduled,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
            BookingStatus::NoShow,
        ] {
            assert_eq!(BookingStatus::from_str(status.as_str()).unwrap(), status);
        }

        for status in [
            JobStatus::Open,
            JobStatus::InProgress,
            JobStatus::Completed,
            JobStatus::Cancelled,
        ] {
            assert_eq!(JobStatus::from_str(status.as_str()).unwrap(), status);
        }

        for status in [
            InvoiceStatus::Draft,
            InvoiceStatus::Issued,
            InvoiceStatus::Paid,
            InvoiceStatus::Void,
        ] {
            assert_eq!(InvoiceStatus::from_str(status.as_str()).unwrap(), status);
        }

        for kind in [MoveKind::Receipt, MoveKind::Consumption, MoveKind::Adjustment] {
            assert_eq!(MoveKind::from_str(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!(BookingStatus::from_str("parked").is_err());
        assert!(InvoiceStatus::from_str("refunded").is_err());
    }

    #[test]
    fn test_invoice_deserializes_without_metadata() {
        let json = r#"{
            "id": "inv-1",
            "customer_id": "cust-1",
            "issued_at": "2024-06-05T10:00:00Z",
            "total": 420.50,
            "status": "paid"
        }"#;
        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.total, 420.50);
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert!(invoice.job_id.is_none());
        assert_eq!(invoice.metadata, serde_json::json!({}));
    }
}
