//! Tracker error types

use std::path::PathBuf;

use thiserror::Error;
use tracked_tables_store::StoreError;

/// Result type for tracker operations
pub type TrackerResult<T> = std::result::Result<T, TrackerError>;

/// Errors raised by a [`Tracker`](crate::Tracker)
#[derive(Debug, Error)]
pub enum TrackerError {
    /// No tracked table has this name
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Model error (invalid or duplicate table, bad address)
    #[error(transparent)]
    Core(#[from] tracked_tables_core::Error),

    /// Persistence failed
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Options file could not be read
    #[error("Failed to read options from {path}: {source}")]
    Options {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Options file is not valid JSON
    #[error("Invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}
