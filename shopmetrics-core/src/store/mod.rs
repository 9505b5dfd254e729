//! Storage layer for shopmetrics
//!
//! This module provides the local SQLite store the reports run against:
//! - Schema migrations
//! - Repository pattern for upserts and metric queries
//! - The canonical [`MetricSource`](crate::reports::MetricSource) implementation

pub mod repo;
pub mod schema;

pub use repo::{Store, StoreCounts};
