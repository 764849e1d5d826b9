//! Domain error types
//!
//! All errors are local to a single request. None of them is retried by the
//! service; the HTTP layer maps each variant to a status code.

use super::outcome::BulkWriteFailure;
use thiserror::Error;

/// Main Docflow error type
#[derive(Debug, Error)]
pub enum DocflowError {
    /// Malformed or invalid input, detected before any store call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Uniqueness violated on insert
    ///
    /// `key` holds the business key for a unique key index violation, or the
    /// record id when the id itself is already taken.
    #[error("{message}")]
    Conflict { key: String, message: String },

    /// Referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bulk write in which some items failed; the others are committed
    #[error("Bulk write error: {0}")]
    PartialFailure(BulkWriteFailure),

    /// Store connectivity, timeout or query failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl DocflowError {
    /// Whether the failure is operational (timeout or connectivity) rather
    /// than caused by the request itself
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DocflowError::Store(StoreError::Timeout { .. })
                | DocflowError::Store(StoreError::Connection(_))
        )
    }
}

/// Store-level failures
///
/// These errors don't expose third-party driver types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The operation exceeded its time budget
    #[error("{operation} timed out after {budget_ms} ms")]
    Timeout { operation: String, budget_ms: u64 },

    /// Could not reach the store
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The store rejected or failed the operation
    #[error("Query failed: {0}")]
    Query(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for DocflowError {
    fn from(err: std::io::Error) -> Self {
        DocflowError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for DocflowError {
    fn from(err: serde_json::Error) -> Self {
        DocflowError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for DocflowError {
    fn from(err: toml::de::Error) -> Self {
        DocflowError::Configuration(format!("TOML parse error: {err}"))
    }
}
