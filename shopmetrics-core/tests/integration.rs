//! Integration tests for the store-backed report engine
//!
//! Seeds an in-memory store with three consecutive 10-day periods of
//! workshop activity and checks the reports the engine produces over it.

use chrono::{DateTime, TimeZone, Utc};
use shopmetrics_core::reports::{
    DateRange, Granularity, Metric, MetricSource, ReportEngine, SectionStatus,
};
use shopmetrics_core::store::Store;
use shopmetrics_core::types::*;

fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 11, 30, 0).unwrap()
}

fn customer(id: &str, created: DateTime<Utc>) -> Customer {
    Customer {
        id: id.to_string(),
        name: format!("Customer {}", id),
        email: Some(format!("{}@example.com", id.to_lowercase())),
        phone: None,
        created_at: created,
        metadata: serde_json::json!({}),
    }
}

fn booking(id: &str, customer_id: &str, scheduled: DateTime<Utc>) -> Booking {
    Booking {
        id: id.to_string(),
        customer_id: Some(customer_id.to_string()),
        vehicle: Some("KK19 ABC".to_string()),
        scheduled_at: scheduled,
        status: BookingStatus::Scheduled,
        created_at: scheduled,
        metadata: serde_json::json!({}),
    }
}

fn invoice(id: &str, customer_id: &str, issued: DateTime<Utc>, total: f64) -> Invoice {
    Invoice {
        id: id.to_string(),
        customer_id: Some(customer_id.to_string()),
        job_id: None,
        issued_at: issued,
        total,
        status: InvoiceStatus::Paid,
        metadata: serde_json::json!({}),
    }
}

fn completed_job(id: &str, opened: DateTime<Utc>, completed: DateTime<Utc>) -> Job {
    Job {
        id: id.to_string(),
        booking_id: None,
        customer_id: None,
        title: Some("Service".to_string()),
        opened_at: opened,
        completed_at: Some(completed),
        status: JobStatus::Completed,
        labor_hours: Some(3.0),
        metadata: serde_json::json!({}),
    }
}

/// Three consecutive 10-day periods ending 2024-06-30:
/// - Jun 1-10: customers A and B active
/// - Jun 11-20: customers A, B, C active; revenue 200
/// - Jun 21-30: customers B, C, D active; revenue 300
fn seeded_store() -> Store {
    shopmetrics_core::logging::init_test();

    let store = Store::open_in_memory().expect("open in-memory store");
    store.migrate().expect("migrate schema");

    // Customers: A and B are old, C joined in the prior period, D in the
    // current one.
    store.upsert_customer(&customer("A", ts(2024, 6, 1))).unwrap();
    store.upsert_customer(&customer("B", ts(2024, 6, 5))).unwrap();
    store.upsert_customer(&customer("C", ts(2024, 6, 15))).unwrap();
    store.upsert_customer(&customer("D", ts(2024, 6, 27))).unwrap();

    // Oldest period activity
    store.upsert_booking(&booking("bk-1", "A", ts(2024, 6, 2))).unwrap();
    store.upsert_booking(&booking("bk-2", "B", ts(2024, 6, 5))).unwrap();

    // Prior period activity
    store.upsert_invoice(&invoice("inv-p1", "A", ts(2024, 6, 12), 200.0)).unwrap();
    store.upsert_booking(&booking("bk-3", "B", ts(2024, 6, 13))).unwrap();
    store.upsert_booking(&booking("bk-4", "C", ts(2024, 6, 15))).unwrap();
    store
        .upsert_job(&completed_job("job-p1", ts(2024, 6, 11), ts(2024, 6, 15)))
        .unwrap();

    // Current period activity
    store.upsert_invoice(&invoice("inv-c1", "B", ts(2024, 6, 22), 150.0)).unwrap();
    store.upsert_invoice(&invoice("inv-c2", "C", ts(2024, 6, 25), 150.0)).unwrap();
    store.upsert_booking(&booking("bk-5", "D", ts(2024, 6, 27))).unwrap();
    store
        .upsert_job(&completed_job("job-c1", ts(2024, 6, 21), ts(2024, 6, 23)))
        .unwrap();
    store
        .upsert_inventory_move(&InventoryMove {
            id: "mv-1".to_string(),
            part_number: "OF-114".to_string(),
            quantity: 2.0,
            unit_cost: 45.0,
            moved_at: ts(2024, 6, 24),
            kind: MoveKind::Consumption,
            metadata: serde_json::json!({}),
        })
        .unwrap();

    // Voided invoice in the current period: must never count
    let mut voided = invoice("inv-void", "B", ts(2024, 6, 23), 9999.0);
    voided.status = InvoiceStatus::Void;
    store.upsert_invoice(&voided).unwrap();

    store
}

fn current_range() -> DateRange {
    DateRange::parse("2024-06-21", "2024-06-30").unwrap()
}

#[test]
fn revenue_report_compares_periods() {
    let engine = ReportEngine::new(seeded_store());
    let report = engine.revenue_report(&current_range());

    assert_eq!(report.revenue.status, SectionStatus::Ok);
    assert_eq!(report.revenue.comparison.current, 300.0);
    assert_eq!(report.revenue.comparison.prior, 200.0);
    assert_eq!(report.revenue.comparison.change_percent, 50.0);

    // 10-day range: daily granularity, one bucket per day
    assert_eq!(report.range.granularity(), Granularity::Daily);
    assert_eq!(report.revenue.series.len(), 10);
    assert_eq!(report.revenue.series[0].label, "Jun 21");
    assert_eq!(report.revenue.series[9].label, "Jun 30");

    // Jun 22 and Jun 25 carry the revenue, everything else is zero
    assert_eq!(report.revenue.series[1].value, 150.0);
    assert_eq!(report.revenue.series[4].value, 150.0);
    let total: f64 = report.revenue.series.iter().map(|b| b.value).sum();
    assert_eq!(total, 300.0);

    assert_eq!(report.invoices.comparison.current, 2.0);
    assert_eq!(report.invoices.comparison.prior, 1.0);
    assert_eq!(report.invoices.comparison.change_percent, 100.0);
}

#[test]
fn operations_report_inverts_completion_time() {
    let engine = ReportEngine::new(seeded_store());
    let report = engine.operations_report(&current_range());

    // One booking now vs two in the prior period
    assert_eq!(report.bookings.comparison.current, 1.0);
    assert_eq!(report.bookings.comparison.prior, 2.0);
    assert_eq!(report.bookings.comparison.change_percent, -50.0);

    // One completed job in each period
    assert_eq!(report.jobs_completed.comparison.change_percent, 0.0);

    // Average completion dropped from 4 days to 2: reads as +100%
    assert_eq!(report.completion_days.comparison.current, 2.0);
    assert_eq!(report.completion_days.comparison.prior, 4.0);
    assert_eq!(report.completion_days.comparison.change_percent, 100.0);
}

#[test]
fn customer_report_retention_scenario() {
    let engine = ReportEngine::new(seeded_store());
    let report = engine.customer_report(&current_range());

    // Prior {A,B,C}, current {B,C,D}: 2 of 3 retained
    let retention = &report.retention;
    assert_eq!(retention.status, SectionStatus::Ok);
    assert_eq!(retention.trend.current.retained_count, 2);
    assert_eq!(retention.trend.current.base_count, 3);
    assert_eq!(retention.trend.current.retention_percent, 67.0);

    // Oldest {A,B} vs prior {A,B,C}: full retention
    assert_eq!(retention.trend.prior.retention_percent, 100.0);
    assert_eq!(retention.trend.comparison.change_percent, -33.0);

    // D is the only new customer in the current period, C in the prior one
    assert_eq!(report.new_customers.comparison.current, 1.0);
    assert_eq!(report.new_customers.comparison.prior, 1.0);
}

#[test]
fn inventory_report_guards_zero_prior() {
    let engine = ReportEngine::new(seeded_store());
    let report = engine.inventory_report(&current_range());

    assert_eq!(report.parts_consumed.comparison.current, 90.0);
    assert_eq!(report.parts_consumed.comparison.prior, 0.0);
    // No prior consumption: change is 0, not infinity
    assert_eq!(report.parts_consumed.comparison.change_percent, 0.0);
}

#[test]
fn full_report_ticket_supersedes() {
    let engine = ReportEngine::new(seeded_store());
    let range = current_range();

    let first = engine.full_report(&range);
    assert!(engine.is_current(first.ticket));

    let second = engine.full_report(&range);
    assert!(!engine.is_current(first.ticket), "older report must be stale");
    assert!(engine.is_current(second.ticket));
}

#[test]
fn weekly_range_clips_final_bucket() {
    let engine = ReportEngine::new(seeded_store());
    // 45 days ending 2024-06-30
    let range = DateRange::parse("2024-05-17", "2024-06-30").unwrap();
    assert_eq!(range.duration_days(), 45);
    assert_eq!(range.granularity(), Granularity::Weekly);

    let section = engine.metric_section(Metric::InvoicedRevenue, &range);
    assert_eq!(section.series.len(), 7);
    // The last window is clipped to the range end
    assert_eq!(section.series[6].label, "Jun 28-30");
    // All revenue in the store falls inside this range
    let total: f64 = section.series.iter().map(|b| b.value).sum();
    assert_eq!(total, 500.0);
}

#[test]
fn store_rows_feed_series_directly() {
    let store = seeded_store();
    let range = current_range();

    let rows = store.fetch_rows(Metric::InvoicedRevenue, &range).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| range.contains(r.timestamp.date_naive())));
}
