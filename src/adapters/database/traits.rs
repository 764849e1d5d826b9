//! Document store abstraction
//!
//! This module defines the capability set the lifecycle core needs from a
//! document store, independent of the store's own query language.

use crate::domain::{BulkWriteSummary, DocumentId, DocumentState, Result, UpdateOutcome};
use async_trait::async_trait;
use serde_json::Value;

/// Condition on a document's current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCondition {
    /// `state == value`
    Equals(DocumentState),
    /// `state != value`
    NotEquals(DocumentState),
}

impl StateCondition {
    /// Evaluates the condition against a stored state string
    pub fn matches(&self, state: Option<&str>) -> bool {
        match self {
            StateCondition::Equals(expected) => state == Some(expected.as_str()),
            StateCondition::NotEquals(excluded) => state != Some(excluded.as_str()),
        }
    }
}

/// One conditional update: predicate `{key == key AND <state condition>}`,
/// field set `{state = set_state}`
///
/// At most one document is touched per update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalUpdate {
    pub key: String,
    pub state: StateCondition,
    pub set_state: DocumentState,
}

impl ConditionalUpdate {
    pub fn new(key: impl Into<String>, state: StateCondition, set_state: DocumentState) -> Self {
        Self {
            key: key.into(),
            state,
            set_state,
        }
    }
}

/// Raw document store contract
///
/// Implementations must:
/// - report a unique-key violation on insert as [`DocflowError::Conflict`]
///   naming the offending key,
/// - report a missing record on lookup as [`DocflowError::NotFound`],
/// - never fail a conditional update because nothing matched,
/// - apply each bulk item independently and return
///   [`DocflowError::PartialFailure`] listing every failed item while keeping
///   the others committed,
/// - treat a repeated index creation as a no-op.
///
/// Time budgets are applied by [`StoreGateway`](super::gateway::StoreGateway),
/// not by implementations.
///
/// [`DocflowError::Conflict`]: crate::domain::DocflowError::Conflict
/// [`DocflowError::NotFound`]: crate::domain::DocflowError::NotFound
/// [`DocflowError::PartialFailure`]: crate::domain::DocflowError::PartialFailure
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Test the store connection
    async fn ping(&self) -> Result<()>;

    /// Create a unique index on the `key` field of a collection
    async fn create_unique_key_index(&self, collection: &str) -> Result<()>;

    /// Insert one JSON document under the given id
    async fn insert_one(&self, collection: &str, id: &DocumentId, body: Value)
        -> Result<DocumentId>;

    /// Fetch one JSON document by id
    async fn find_by_id(&self, collection: &str, id: &DocumentId) -> Result<Value>;

    /// Apply one conditional update
    async fn update_one(&self, collection: &str, update: &ConditionalUpdate)
        -> Result<UpdateOutcome>;

    /// Apply independent conditional updates in one request
    async fn bulk_update(
        &self,
        collection: &str,
        updates: &[ConditionalUpdate],
    ) -> Result<BulkWriteSummary>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}
