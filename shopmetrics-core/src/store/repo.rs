//! Store repository layer
//!
//! Provides upsert and query operations for all record types, and
//! implements [`MetricSource`] so reports can run straight off the store.

use crate::error::{Error, Result};
use crate::reports::{DateRange, Metric, MetricSource};
use crate::types::*;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Mutex;

/// Row counts per table, for CLI summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub customers: i64,
    pub bookings: i64,
    pub jobs: i64,
    pub invoices: i64,
    pub inventory_moves: i64,
}

impl StoreCounts {
    /// Total records across all tables.
    pub fn total(&self) -> i64 {
        self.customers + self.bookings + self.jobs + self.invoices + self.inventory_moves
    }
}

/// Store handle with connection pooling (single connection for now)
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open or create a store at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable foreign keys and WAL mode for better concurrency
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this store
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    // ============================================
    // Customer operations
    // ============================================

    /// Insert or update a customer
    pub fn upsert_customer(&self, customer: &Customer) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO customers (id, name, email, phone, created_at, metadata)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                phone = excluded.phone,
                metadata = excluded.metadata
            "#,
            params![
                customer.id,
                customer.name,
                customer.email,
                customer.phone,
                customer.created_at.to_rfc3339(),
                customer.metadata.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Get a customer by ID
    pub fn get_customer(&self, id: &str) -> Result<Option<Customer>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM customers WHERE id = ?", [id], |row| {
            Self::row_to_customer(row)
        })
        .optional()
        .map_err(Error::from)
    }

    fn row_to_customer(row: &Row) -> rusqlite::Result<Customer> {
        let created_at_str: String = row.get("created_at")?;
        let metadata_str: Option<String> = row.get("metadata")?;

        Ok(Customer {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            created_at: parse_ts(&created_at_str).unwrap_or_else(Utc::now),
            metadata: metadata_str
                .and_then(|s| serde_json::from_str(&s).ok())
                .unwrap_or_else(|| serde_json::json!({})),
        })
    }

    // ============================================
    // Booking operations
    // ============================================

    /// Insert or update a booking
    pub fn upsert_booking(&self, booking: &Booking) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO bookings (id, customer_id, vehicle, scheduled_at, status, created_at, metadata)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                customer_id = excluded.customer_id,
                vehicle = excluded.vehicle,
                scheduled_at = excluded.scheduled_at,
                status = excluded.status,
                metadata = excluded.metadata
            "#,
            params![
                booking.id,
                booking.customer_id,
                booking.vehicle,
                booking.scheduled_at.to_rfc3339(),
                booking.status.as_str(),
                booking.created_at.to_rfc3339(),
                booking.metadata.to_string(),
            ],
        )?;
        Ok(())
    }

    // ============================================
    // Job operations
    // ============================================

    /// Insert or update a job
    pub fn upsert_job(&self, job: &Job) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO jobs (id, booking_id, customer_id, title, opened_at, completed_at,
                              status, labor_hours, metadata)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                booking_id = excluded.booking_id,
                customer_id = excluded.customer_id,
                title = excluded.title,
                completed_at = excluded.completed_at,
                status = excluded.status,
                labor_hours = excluded.labor_hours,
                metadata = excluded.metadata
            "#,
            params![
                job.id,
                job.booking_id,
                job.customer_id,
                job.title,
                job.opened_at.to_rfc3339(),
                job.completed_at.map(|t| t.to_rfc3339()),
                job.status.as_str(),
                job.labor_hours,
                job.metadata.to_string(),
            ],
        )?;
        Ok(())
    }

    // ============================================
    // Invoice operations
    // ============================================

    /// Insert or update an invoice
    pub fn upsert_invoice(&self, invoice: &Invoice) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO invoices (id, customer_id, job_id, issued_at, total, status, metadata)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                customer_id = excluded.customer_id,
                job_id = excluded.job_id,
                issued_at = excluded.issued_at,
                total = excluded.total,
                status = excluded.status,
                metadata = excluded.metadata
            "#,
            params![
                invoice.id,
                invoice.customer_id,
                invoice.job_id,
                invoice.issued_at.to_rfc3339(),
                invoice.total,
                invoice.status.as_str(),
                invoice.metadata.to_string(),
            ],
        )?;
        Ok(())
    }

    // ============================================
    // Inventory operations
    // ============================================

    /// Insert or update a stock movement
    pub fn upsert_inventory_move(&self, mv: &InventoryMove) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO inventory_moves (id, part_number, quantity, unit_cost, moved_at, kind, metadata)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                part_number = excluded.part_number,
                quantity = excluded.quantity,
                unit_cost = excluded.unit_cost,
                moved_at = excluded.moved_at,
                kind = excluded.kind,
                metadata = excluded.metadata
            "#,
            params![
                mv.id,
                mv.part_number,
                mv.quantity,
                mv.unit_cost,
                mv.moved_at.to_rfc3339(),
                mv.kind.as_str(),
                mv.metadata.to_string(),
            ],
        )?;
        Ok(())
    }

    // ============================================
    // Summaries
    // ============================================

    /// Row counts per table.
    pub fn counts(&self) -> Result<StoreCounts> {
        let conn = self.conn.lock().unwrap();
        let count = |table: &str| -> Result<i64> {
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
                r.get(0)
            })
            .map_err(Error::from)
        };

        Ok(StoreCounts {
            customers: count("customers")?,
            bookings: count("bookings")?,
            jobs: count("jobs")?,
            invoices: count("invoices")?,
            inventory_moves: count("inventory_moves")?,
        })
    }

    // ============================================
    // Metric queries
    // ============================================

    fn query_rows(
        &self,
        sql: &str,
        range: &DateRange,
        with_category: bool,
    ) -> Result<Vec<MetricRow>> {
        let conn = self.conn.lock().unwrap();
        let start = range.start.format("%Y-%m-%d").to_string();
        let end = range.end.format("%Y-%m-%d").to_string();

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![start, end], |row| {
                let ts: String = row.get(0)?;
                let value: f64 = row.get(1)?;
                let category: Option<String> = if with_category { row.get(2)? } else { None };
                Ok((ts, value, category))
            })?
            .filter_map(|r| r.ok())
            .filter_map(|(ts, value, category)| {
                parse_ts(&ts).map(|timestamp| MetricRow {
                    timestamp,
                    value,
                    category,
                })
            })
            .collect();

        Ok(rows)
    }
}

impl MetricSource for Store {
    fn fetch_rows(&self, metric: Metric, range: &DateRange) -> Result<Vec<MetricRow>> {
        match metric {
            Metric::InvoicedRevenue => self.query_rows(
                r#"
                SELECT issued_at, total FROM invoices
                WHERE status != 'void' AND date(issued_at) BETWEEN ?1 AND ?2
                ORDER BY issued_at
                "#,
                range,
                false,
            ),
            Metric::InvoiceCount => self.query_rows(
                r#"
                SELECT issued_at, 1.0 FROM invoices
                WHERE status != 'void' AND date(issued_at) BETWEEN ?1 AND ?2
                ORDER BY issued_at
                "#,
                range,
                false,
            ),
            Metric::BookingCount => self.query_rows(
                r#"
                SELECT scheduled_at, 1.0 FROM bookings
                WHERE status != 'cancelled' AND date(scheduled_at) BETWEEN ?1 AND ?2
                ORDER BY scheduled_at
                "#,
                range,
                false,
            ),
            Metric::JobsCompleted => self.query_rows(
                r#"
                SELECT completed_at, 1.0 FROM jobs
                WHERE status = 'completed' AND completed_at IS NOT NULL
                  AND date(completed_at) BETWEEN ?1 AND ?2
                ORDER BY completed_at
                "#,
                range,
                false,
            ),
            Metric::JobCompletionDays => self.query_rows(
                r#"
                SELECT completed_at, julianday(completed_at) - julianday(opened_at) FROM jobs
                WHERE status = 'completed' AND completed_at IS NOT NULL
                  AND date(completed_at) BETWEEN ?1 AND ?2
                ORDER BY completed_at
                "#,
                range,
                false,
            ),
            Metric::NewCustomers => self.query_rows(
                r#"
                SELECT created_at, 1.0 FROM customers
                WHERE date(created_at) BETWEEN ?1 AND ?2
                ORDER BY created_at
                "#,
                range,
                false,
            ),
            Metric::PartsConsumed => self.query_rows(
                r#"
                SELECT moved_at, quantity * unit_cost, part_number FROM inventory_moves
                WHERE kind = 'consumption' AND date(moved_at) BETWEEN ?1 AND ?2
                ORDER BY moved_at
                "#,
                range,
                true,
            ),
        }
    }

    fn fetch_customer_ids(&self, range: &DateRange) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let start = range.start.format("%Y-%m-%d").to_string();
        let end = range.end.format("%Y-%m-%d").to_string();

        // A customer is "active" when they were invoiced or had a live
        // booking inside the period.
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT customer_id FROM invoices
            WHERE customer_id IS NOT NULL AND customer_id != ''
              AND status != 'void' AND date(issued_at) BETWEEN ?1 AND ?2
            UNION
            SELECT DISTINCT customer_id FROM bookings
            WHERE customer_id IS NOT NULL AND customer_id != ''
              AND status != 'cancelled' AND date(scheduled_at) BETWEEN ?1 AND ?2
            "#,
        )?;

        let ids = stmt
            .query_map(params![start, end], |row| row.get::<_, String>(0))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(ids)
    }
}

/// Parse an RFC 3339 timestamp from storage.
fn parse_ts(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store.migrate().unwrap();
        store
    }

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::parse(start, end).unwrap()
    }

    fn customer(id: &str, created: DateTime<Utc>) -> Customer {
        Customer {
            id: id.to_string(),
            name: format!("Customer {}", id),
            email: None,
            phone: None,
            created_at: created,
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

    #[test]
    fn test_upsert_customer_updates_in_place() {
        let store = test_store();
        let mut c = customer("cust-1", ts(2024, 6, 1));
        store.upsert_customer(&c).unwrap();

        c.name = "Renamed Garage Regular".to_string();
        store.upsert_customer(&c).unwrap();

        let fetched = store.get_customer("cust-1").unwrap().unwrap();
        assert_eq!(fetched.name, "Renamed Garage Regular");
        assert_eq!(store.counts().unwrap().customers, 1);
    }

    #[test]
    fn test_revenue_rows_respect_range_and_void() {
        let store = test_store();
        store
            .upsert_invoice(&invoice("inv-1", "cust-1", ts(2024, 6, 5), 100.0))
            .unwrap();
        store
            .upsert_invoice(&invoice("inv-2", "cust-1", ts(2024, 6, 25), 200.0))
            .unwrap();
        let mut voided = invoice("inv-3", "cust-1", ts(2024, 6, 6), 999.0);
        voided.status = InvoiceStatus::Void;
        store.upsert_invoice(&voided).unwrap();

        let rows = store
            .fetch_rows(Metric::InvoicedRevenue, &range("2024-06-01", "2024-06-10"))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, 100.0);
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let store = test_store();
        store
            .upsert_invoice(&invoice("inv-1", "c", ts(2024, 6, 1), 10.0))
            .unwrap();
        store
            .upsert_invoice(&invoice("inv-2", "c", ts(2024, 6, 10), 20.0))
            .unwrap();
        store
            .upsert_invoice(&invoice("inv-3", "c", ts(2024, 6, 11), 40.0))
            .unwrap();

        let rows = store
            .fetch_rows(Metric::InvoicedRevenue, &range("2024-06-01", "2024-06-10"))
            .unwrap();
        let total: f64 = rows.iter().map(|r| r.value).sum();
        assert_eq!(total, 30.0);
    }

    #[test]
    fn test_completion_days_rows() {
        let store = test_store();
        store
            .upsert_job(&Job {
                id: "job-1".to_string(),
                booking_id: None,
                customer_id: Some("cust-1".to_string()),
                title: Some("Clutch replacement".to_string()),
                opened_at: ts(2024, 6, 1),
                completed_at: Some(ts(2024, 6, 4)),
                status: JobStatus::Completed,
                labor_hours: Some(6.5),
                metadata: serde_json::json!({}),
            })
            .unwrap();
        // Open job: no completion row
        store
            .upsert_job(&Job {
                id: "job-2".to_string(),
                booking_id: None,
                customer_id: None,
                title: None,
                opened_at: ts(2024, 6, 2),
                completed_at: None,
                status: JobStatus::Open,
                labor_hours: None,
                metadata: serde_json::json!({}),
            })
            .unwrap();

        let rows = store
            .fetch_rows(Metric::JobCompletionDays, &range("2024-06-01", "2024-06-10"))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].value - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_parts_consumed_carries_part_number() {
        let store = test_store();
        store
            .upsert_inventory_move(&InventoryMove {
                id: "mv-1".to_string(),
                part_number: "BP-205".to_string(),
                quantity: 2.0,
                unit_cost: 45.0,
                moved_at: ts(2024, 6, 3),
                kind: MoveKind::Consumption,
                metadata: serde_json::json!({}),
            })
            .unwrap();
        // Receipts don't count as consumption
        store
            .upsert_inventory_move(&InventoryMove {
                id: "mv-2".to_string(),
                part_number: "BP-205".to_string(),
                quantity: 10.0,
                unit_cost: 45.0,
                moved_at: ts(2024, 6, 3),
                kind: MoveKind::Receipt,
                metadata: serde_json::json!({}),
            })
            .unwrap();

        let rows = store
            .fetch_rows(Metric::PartsConsumed, &range("2024-06-01", "2024-06-10"))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, 90.0);
        assert_eq!(rows[0].category.as_deref(), Some("BP-205"));
    }

    #[test]
    fn test_customer_ids_union_and_filtering() {
        let store = test_store();
        store
            .upsert_invoice(&invoice("inv-1", "A", ts(2024, 6, 2), 50.0))
            .unwrap();
        store
            .upsert_booking(&Booking {
                id: "bk-1".to_string(),
                customer_id: Some("B".to_string()),
                vehicle: Some("WV04 XYZ".to_string()),
                scheduled_at: ts(2024, 6, 5),
                status: BookingStatus::Scheduled,
                created_at: ts(2024, 6, 1),
                metadata: serde_json::json!({}),
            })
            .unwrap();
        // Cancelled booking and anonymous invoice don't count
        store
            .upsert_booking(&Booking {
                id: "bk-2".to_string(),
                customer_id: Some("C".to_string()),
                vehicle: None,
                scheduled_at: ts(2024, 6, 6),
                status: BookingStatus::Cancelled,
                created_at: ts(2024, 6, 1),
                metadata: serde_json::json!({}),
            })
            .unwrap();
        store
            .upsert_invoice(&Invoice {
                id: "inv-2".to_string(),
                customer_id: None,
                job_id: None,
                issued_at: ts(2024, 6, 7),
                total: 20.0,
                status: InvoiceStatus::Paid,
                metadata: serde_json::json!({}),
            })
            .unwrap();

        let mut ids = store
            .fetch_customer_ids(&range("2024-06-01", "2024-06-10"))
            .unwrap();
        ids.sort();
        assert_eq!(ids, vec!["A".to_string(), "B".to_string()]);
    }
}
