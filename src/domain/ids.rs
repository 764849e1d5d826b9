//! Domain identifier types with validation
//!
//! Documents and batches share one opaque identifier type. An identifier is
//! either supplied by the caller or generated server-side, exactly once, when
//! the record is created.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier for a stored document or batch
///
/// # Examples
///
/// ```
/// use docflow::domain::ids::DocumentId;
/// use std::str::FromStr;
///
/// let id = DocumentId::from_str("65f1c0de9a1b2c3d4e5f6a7b").unwrap();
/// assert_eq!(id.as_str(), "65f1c0de9a1b2c3d4e5f6a7b");
///
/// let generated = DocumentId::generate();
/// assert_eq!(generated.as_str().len(), 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a DocumentId from a caller-supplied string
    ///
    /// # Returns
    ///
    /// Returns `Ok(DocumentId)` if the ID is non-empty, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Document ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Generates a fresh identifier (UUID v4, simple hex form)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
