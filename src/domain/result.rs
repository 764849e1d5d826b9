//! Crate-wide result alias over [`DocflowError`]

use super::errors::DocflowError;

/// Result of a domain, store or configuration operation
///
/// ```
/// use docflow::domain::{DocflowError, Result};
///
/// fn require_key(key: &str) -> Result<&str> {
///     if key.is_empty() {
///         return Err(DocflowError::Validation("key is required".to_string()));
///     }
///     Ok(key)
/// }
///
/// assert!(require_key("").is_err());
/// assert_eq!(require_key("INV-001").unwrap(), "INV-001");
/// ```
pub type Result<T> = std::result::Result<T, DocflowError>;
