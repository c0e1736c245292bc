//! Store error types

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while loading, saving or clearing state
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A state part that could not be understood
    #[error("Invalid state part: {0}")]
    InvalidPart(String),

    /// The backing storage refused the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Core error (registry serialization)
    #[error("Core error: {0}")]
    Core(#[from] tracked_tables_core::Error),
}
