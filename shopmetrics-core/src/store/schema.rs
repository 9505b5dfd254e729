//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: Initial schema
    r#"
    -- ============================================
    -- Workshop records (mirrors the backend tables)
    -- ============================================

    CREATE TABLE IF NOT EXISTS customers (
        id               TEXT PRIMARY KEY,
        name             TEXT NOT NULL,
        email            TEXT,
        phone            TEXT,
        created_at       DATETIME NOT NULL,
        metadata         JSON
    );

    CREATE TABLE IF NOT EXISTS bookings (
        id               TEXT PRIMARY KEY,
        customer_id      TEXT REFERENCES customers(id),
        vehicle          TEXT,
        scheduled_at     DATETIME NOT NULL,
        status           TEXT NOT NULL,
        created_at       DATETIME NOT NULL,
        metadata         JSON
    );

    CREATE TABLE IF NOT EXISTS jobs (
        id               TEXT PRIMARY KEY,
        booking_id       TEXT REFERENCES bookings(id),
        customer_id      TEXT REFERENCES customers(id),
        title            TEXT,
        opened_at        DATETIME NOT NULL,
        completed_at     DATETIME,
        status           TEXT NOT NULL,
        labor_hours      REAL,
        metadata         JSON
    );

    CREATE TABLE IF NOT EXISTS invoices (
        id               TEXT PRIMARY KEY,
        customer_id      TEXT REFERENCES customers(id),
        job_id           TEXT REFERENCES jobs(id),
        issued_at        DATETIME NOT NULL,
        total            REAL NOT NULL,
        status           TEXT NOT NULL,
        metadata         JSON
    );

    CREATE TABLE IF NOT EXISTS inventory_moves (
        id               TEXT PRIMARY KEY,
        part_number      TEXT NOT NULL,
        quantity         REAL NOT NULL,
        unit_cost        REAL NOT NULL,
        moved_at         DATETIME NOT NULL,
        kind             TEXT NOT NULL,
        metadata         JSON
    );

    -- ============================================
    -- Indexes (reports filter on dates constantly)
    -- ============================================

    CREATE INDEX IF NOT EXISTS idx_customers_created_at ON customers(created_at);
    CREATE INDEX IF NOT EXISTS idx_bookings_scheduled_at ON bookings(scheduled_at);
    CREATE INDEX IF NOT EXISTS idx_bookings_customer ON bookings(customer_id);
    CREATE INDEX IF NOT EXISTS idx_jobs_completed_at ON jobs(completed_at);
    CREATE INDEX IF NOT EXISTS idx_invoices_issued_at ON invoices(issued_at);
    CREATE INDEX IF NOT EXISTS idx_invoices_customer ON invoices(customer_id);
    CREATE INDEX IF NOT EXISTS idx_inventory_moves_moved_at ON inventory_moves(moved_at);
    "#,
];

/// Run any pending migrations on this connection
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        // Run migrations twice - should be idempotent
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_tables_created() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('customers', 'bookings', 'jobs', 'invoices', 'inventory_moves')",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(count, 5);
    }
}
