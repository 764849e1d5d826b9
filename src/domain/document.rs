//! Document and batch domain models
//!
//! A [`Document`] carries a business key that is unique across the document
//! collection and a [`DocumentState`] that only ever moves forward from
//! `INIT`. A [`DocumentBatch`] is a write-once list of document-shaped entries
//! that is later used to drive one bulk state transition.

use super::errors::DocflowError;
use super::ids::DocumentId;
use super::result::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentState {
    /// Freshly ingested; the only state transitions start from
    Init,
    /// Accepted by a reviewer
    Verified,
    /// Refused by a reviewer
    Rejected,
    /// Marked as handled by a batch run
    Processed,
}

impl DocumentState {
    /// Wire representation of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentState::Init => "INIT",
            DocumentState::Verified => "VERIFIED",
            DocumentState::Rejected => "REJECTED",
            DocumentState::Processed => "PROCESSED",
        }
    }
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "INIT" => Ok(DocumentState::Init),
            "VERIFIED" => Ok(DocumentState::Verified),
            "REJECTED" => Ok(DocumentState::Rejected),
            "PROCESSED" => Ok(DocumentState::Processed),
            other => Err(format!("Unknown document state: {other}")),
        }
    }
}

/// Target of a single-document review transition
///
/// Only `VERIFIED` and `REJECTED` can be requested for one document;
/// `PROCESSED` is reserved for batch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionTarget {
    Verified,
    Rejected,
}

impl TransitionTarget {
    /// The document state this target moves to
    pub fn state(self) -> DocumentState {
        match self {
            TransitionTarget::Verified => DocumentState::Verified,
            TransitionTarget::Rejected => DocumentState::Rejected,
        }
    }
}

impl fmt::Display for TransitionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.state(), f)
    }
}

impl FromStr for TransitionTarget {
    type Err = String;

    /// Parses the lower-case route segment (`verified`, `rejected`)
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "verified" => Ok(TransitionTarget::Verified),
            "rejected" => Ok(TransitionTarget::Rejected),
            other => Err(format!("Unsupported transition target: {other}")),
        }
    }
}

/// Inbound document as submitted by a caller
///
/// Any `state` supplied by the caller is dropped during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewDocument {
    #[serde(default)]
    pub id: Option<DocumentId>,
    pub name: String,
    pub key: String,
}

impl NewDocument {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            key: key.into(),
        }
    }

    /// Sets a caller-chosen identifier
    pub fn with_id(mut self, id: DocumentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Checks the business key before any store call is made
    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(DocflowError::Validation(
                "Document key cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Stored document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub key: String,
    pub state: DocumentState,
}

impl Document {
    /// Builds the record to persist: the id is assigned if absent and the
    /// state is always `INIT`.
    pub fn from_new(new: NewDocument) -> Self {
        Self {
            id: new.id.unwrap_or_else(DocumentId::generate),
            name: new.name,
            key: new.key,
            state: DocumentState::Init,
        }
    }
}

/// One entry of a submitted batch
///
/// Entries are document-shaped; a supplied `id` or `state` is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub name: String,
    pub key: String,
}

impl BatchEntry {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

/// Inbound batch as submitted by a caller
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewBatch {
    #[serde(default)]
    pub id: Option<DocumentId>,
    #[serde(rename = "documentList")]
    pub document_list: Vec<BatchEntry>,
}

impl NewBatch {
    pub fn new(entries: Vec<BatchEntry>) -> Self {
        Self {
            id: None,
            document_list: entries,
        }
    }
}

/// Stored batch record, never updated after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentBatch {
    pub id: DocumentId,
    #[serde(rename = "documentList")]
    pub to_process: Vec<BatchEntry>,
}

impl DocumentBatch {
    pub fn from_new(new: NewBatch) -> Self {
        Self {
            id: new.id.unwrap_or_else(DocumentId::generate),
            to_process: new.document_list,
        }
    }
}
