//! Document store abstraction layer
//!
//! The lifecycle core talks to [`StoreGateway`], which wraps any
//! [`DocumentStore`] implementation with per-operation time budgets.

pub mod factory;
pub mod gateway;
pub mod traits;

pub use factory::create_document_store;
pub use gateway::StoreGateway;
pub use traits::{ConditionalUpdate, DocumentStore, StateCondition};
