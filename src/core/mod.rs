//! Core business logic for Docflow.
//!
//! # Modules
//!
//! - [`lifecycle`] - Index assurance, state transitions and batch processing
//!
//! # Document Workflow
//!
//! 1. **Save**: validate, assign an id, force `INIT`, ensure the unique key
//!    index once per collection, insert
//! 2. **Transition**: conditionally move one document from `INIT` to
//!    `VERIFIED` or `REJECTED`
//! 3. **Batch**: store a list of entries, then move every referenced document
//!    that is not yet `PROCESSED` to `PROCESSED` in one bulk request
//!
//! # Example
//!
//! ```rust
//! use docflow::adapters::memory::MemoryDocumentStore;
//! use docflow::config::StoreConfig;
//! use docflow::core::lifecycle::LifecycleService;
//! use docflow::domain::{NewDocument, TransitionTarget};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryDocumentStore::new());
//! let service = LifecycleService::from_config(store, &StoreConfig::default());
//!
//! service.save_document(NewDocument::new("test1", "key1")).await?;
//! let outcome = service.transition("key1", TransitionTarget::Verified).await?;
//! assert_eq!(outcome.to_string(), "Match: 1| Updated: 1 | Update to state: VERIFIED");
//! # Ok(())
//! # }
//! ```

pub mod lifecycle;
