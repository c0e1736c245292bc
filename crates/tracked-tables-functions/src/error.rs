//! Function error types

use thiserror::Error;

/// Result type for helper functions
pub type FunctionResult<T> = std::result::Result<T, FunctionError>;

/// Errors raised by the worksheet helper functions
#[derive(Debug, Error)]
pub enum FunctionError {
    /// A table name was required but empty
    #[error("Table name must not be empty")]
    EmptyTableName,

    /// A column attribute range is shorter than the column name range
    #[error("Column {index} has no {attribute}")]
    MissingAttribute {
        index: usize,
        attribute: &'static str,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
