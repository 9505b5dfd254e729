//! Record sync into the local store
//!
//! Two paths land records in SQLite through the same upserts:
//! - [`pull_all`]: walk the backend's paged export endpoints
//! - [`import_file`]: read a JSON export batch from disk (offline use,
//!   fixtures, tests)

use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::remote::client::BackendClient;
use crate::store::Store;
use crate::types::{Booking, Customer, InventoryMove, Invoice, Job};

/// Counters describing one sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncResult {
    /// Customers upserted
    pub customers: usize,
    /// Bookings upserted
    pub bookings: usize,
    /// Jobs upserted
    pub jobs: usize,
    /// Invoices upserted
    pub invoices: usize,
    /// Inventory movements upserted
    pub inventory_moves: usize,
    /// Non-fatal per-table errors
    pub errors: Vec<String>,
}

impl SyncResult {
    /// Total records upserted across all tables.
    pub fn total(&self) -> usize {
        self.customers + self.bookings + self.jobs + self.invoices + self.inventory_moves
    }
}

/// One JSON export batch, as produced by the backend's bulk export.
///
/// Every table is optional so partial exports import cleanly.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ExportBatch {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub inventory_moves: Vec<InventoryMove>,
}

/// Assign a fresh id to records that arrive without one.
fn ensure_id(id: &mut String) {
    if id.is_empty() {
        *id = Uuid::new_v4().to_string();
    }
}

/// Import a JSON export batch from disk into the store.
pub fn import_file(path: &Path, store: &Store) -> Result<SyncResult> {
    tracing::info!(path = %path.display(), "Importing export batch");

    let content = std::fs::read_to_string(path)?;
    let mut batch: ExportBatch = serde_json::from_str(&content)?;
    let mut result = SyncResult::default();

    for customer in &mut batch.customers {
        ensure_id(&mut customer.id);
        store.upsert_customer(customer)?;
        result.customers += 1;
    }
    for booking in &mut batch.bookings {
        ensure_id(&mut booking.id);
        store.upsert_booking(booking)?;
        result.bookings += 1;
    }
    for job in &mut batch.jobs {
        ensure_id(&mut job.id);
        store.upsert_job(job)?;
        result.jobs += 1;
    }
    for invoice in &mut batch.invoices {
        ensure_id(&mut invoice.id);
        store.upsert_invoice(invoice)?;
        result.invoices += 1;
    }
    for mv in &mut batch.inventory_moves {
        ensure_id(&mut mv.id);
        store.upsert_inventory_move(mv)?;
        result.inventory_moves += 1;
    }

    tracing::info!(records = result.total(), "Import complete");
    Ok(result)
}

/// Pull every table from the backend into the store.
///
/// A table that fails is recorded in `errors` and does not stop the other
/// tables from syncing.
pub async fn pull_all(client: &BackendClient, store: &Store) -> Result<SyncResult> {
    pull_all_with_progress(client, store, |_, _| {}).await
}

/// [`pull_all`] with a progress callback invoked as `(table, records_so_far)`.
pub async fn pull_all_with_progress<F>(
    client: &BackendClient,
    store: &Store,
    mut progress: F,
) -> Result<SyncResult>
where
    F: FnMut(&str, usize),
{
    let mut result = SyncResult::default();

    result.customers = pull_table(
        client,
        "customers",
        &mut result.errors,
        &mut progress,
        |c: Customer| store.upsert_customer(&c),
    )
    .await;
    result.bookings = pull_table(
        client,
        "bookings",
        &mut result.errors,
        &mut progress,
        |b: Booking| store.upsert_booking(&b),
    )
    .await;
    result.jobs = pull_table(
        client,
        "jobs",
        &mut result.errors,
        &mut progress,
        |j: Job| store.upsert_job(&j),
    )
    .await;
    result.invoices = pull_table(
        client,
        "invoices",
        &mut result.errors,
        &mut progress,
        |i: Invoice| store.upsert_invoice(&i),
    )
    .await;
    result.inventory_moves = pull_table(
        client,
        "inventory_moves",
        &mut result.errors,
        &mut progress,
        |m: InventoryMove| store.upsert_inventory_move(&m),
    )
    .await;

    tracing::info!(
        records = result.total(),
        errors = result.errors.len(),
        "Backend pull complete"
    );
    Ok(result)
}

/// Walk one table's pages, upserting each record.
async fn pull_table<T, F, U>(
    client: &BackendClient,
    table: &str,
    errors: &mut Vec<String>,
    progress: &mut F,
    mut upsert: U,
) -> usize
where
    T: serde::de::DeserializeOwned,
    F: FnMut(&str, usize),
    U: FnMut(T) -> Result<()>,
{
    let mut count = 0;
    let mut page = 0;

    loop {
        let records: Vec<T> = match client.fetch_page(table, None, page).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(table, page, error = %e, "Table sync failed");
                errors.push(format!("{}: {}", table, e));
                break;
            }
        };
        let fetched = records.len();

        for record in records {
            if let Err(e) = upsert(record) {
                tracing::warn!(table, error = %e, "Record upsert failed");
                errors.push(format!("{}: {}", table, e));
            } else {
                count += 1;
            }
        }
        progress(table, count);

        // A short page is the last page
        if fetched < client.page_size() {
            break;
        }
        page += 1;
    }

    count
}
