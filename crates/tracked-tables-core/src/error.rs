//! Error types for tracked-tables-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tracked-tables-core
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u32, u16),

    /// A table with this name is already registered
    #[error("Tracked table already exists: {0}")]
    DuplicateTable(String),

    /// Invalid table definition
    #[error("Invalid tracked table '{table}': {message}")]
    InvalidTable { table: String, message: String },

    /// Registry (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid-table error
    pub fn invalid_table<T: Into<String>, M: Into<String>>(table: T, message: M) -> Self {
        Error::InvalidTable {
            table: table.into(),
            message: message.into(),
        }
    }
}
