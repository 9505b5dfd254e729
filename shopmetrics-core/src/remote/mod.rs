//! Backend sync for shopmetrics
//!
//! The hosted workshop backend is the system of record; this module pulls
//! its tables down into the local store so reports run without a network
//! dependency. Sync is config-gated (`[backend]` in config.toml) and can
//! also run entirely offline from a JSON export file.

pub mod client;
pub mod sync;

pub use client::BackendClient;
pub use sync::{import_file, pull_all, pull_all_with_progress, ExportBatch, SyncResult};
