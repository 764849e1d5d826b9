//! Domain models and types for Docflow.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Identifiers** ([`DocumentId`]) assigned once at creation
//! - **Domain models** ([`Document`], [`DocumentBatch`], [`DocumentState`])
//! - **Write outcomes** ([`UpdateOutcome`], [`BulkWriteSummary`])
//! - **Error types** ([`DocflowError`], [`StoreError`])
//! - **Result type alias** ([`Result`])
//!
//! # Lifecycle
//!
//! ```text
//! INIT ──► VERIFIED
//!   │  └─► REJECTED
//!   └────► PROCESSED   (bulk, from any state other than PROCESSED)
//! ```
//!
//! ```rust
//! use docflow::domain::{Document, DocumentState, NewDocument};
//!
//! let doc = Document::from_new(NewDocument::new("invoice", "INV-001"));
//! assert_eq!(doc.state, DocumentState::Init);
//! ```

pub mod document;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod result;

// Re-export commonly used types for convenience
pub use document::{
    BatchEntry, Document, DocumentBatch, DocumentState, NewBatch, NewDocument, TransitionTarget,
};
pub use errors::{DocflowError, StoreError};
pub use ids::DocumentId;
pub use outcome::{BulkItemFailure, BulkWriteFailure, BulkWriteSummary, UpdateOutcome};
pub use result::Result;
