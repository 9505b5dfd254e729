//! # shopmetrics-core
//!
//! Core library for shopmetrics - a reporting engine for automotive
//! workshop management data.
//!
//! This library provides:
//! - Domain types for customers, bookings, jobs, invoices, and inventory
//! - A SQLite storage layer the reports run against
//! - The period-comparison report engine (bucketed series, prior-period
//!   trends, customer retention)
//! - A sync client that pulls records down from the hosted workshop backend
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! Records flow in one direction:
//! - **Backend / export files:** the system of record (immutable here)
//! - **Local store:** normalized SQLite tables, refreshed by sync
//! - **Reports:** recomputed from the store on every request, never cached
//!
//! ## Example
//!
//! ```rust,no_run
//! use shopmetrics_core::reports::{DateRange, ReportEngine};
//! use shopmetrics_core::{Config, Store};
//!
//! let store = Store::open(&Config::database_path()).expect("failed to open store");
//! store.migrate().expect("failed to run migrations");
//!
//! let range = DateRange::parse("2024-06-01", "2024-06-30").expect("valid range");
//! let engine = ReportEngine::new(store);
//! let report = engine.full_report(&range);
//! println!("revenue: {}", report.revenue.revenue.comparison.current);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use store::Store;
pub use types::*;

// Public modules
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod remote;
pub mod reports;
pub mod store;
pub mod types;
