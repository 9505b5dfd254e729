//! Error types for shopmetrics-core

use thiserror::Error;

/// Main error type for the shopmetrics-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Date range with start after end
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// Backend API error
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type alias for shopmetrics-core
pub type Result<T> = std::result::Result<T, Error>;
