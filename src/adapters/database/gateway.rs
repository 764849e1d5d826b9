//! Time-budgeted access to the document store
//!
//! Every store call made by the lifecycle core goes through [`StoreGateway`],
//! which bounds it with the configured budget. A call that exceeds its budget
//! is abandoned and reported as [`StoreError::Timeout`]; no partial result is
//! salvaged and nothing is retried.

use super::traits::{ConditionalUpdate, DocumentStore};
use crate::config::TimeoutConfig;
use crate::domain::{BulkWriteSummary, DocumentId, Result, StoreError, UpdateOutcome};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Document store handle with per-operation deadlines
#[derive(Clone)]
pub struct StoreGateway {
    store: Arc<dyn DocumentStore>,
    timeouts: TimeoutConfig,
}

impl StoreGateway {
    pub fn new(store: Arc<dyn DocumentStore>, timeouts: TimeoutConfig) -> Self {
        Self { store, timeouts }
    }

    /// Name of the underlying backend
    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub async fn ping(&self) -> Result<()> {
        with_budget("ping", self.timeouts.ping(), self.store.ping()).await
    }

    pub async fn create_unique_key_index(&self, collection: &str) -> Result<()> {
        with_budget(
            "create_unique_key_index",
            self.timeouts.index(),
            self.store.create_unique_key_index(collection),
        )
        .await
    }

    /// Serialize and insert a record
    pub async fn insert_one<T: Serialize>(
        &self,
        collection: &str,
        id: &DocumentId,
        record: &T,
    ) -> Result<DocumentId> {
        let body = serde_json::to_value(record)?;
        with_budget(
            "insert_one",
            self.timeouts.insert(),
            self.store.insert_one(collection, id, body),
        )
        .await
    }

    /// Fetch and deserialize a record
    pub async fn find_by_id<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<T> {
        let body = with_budget(
            "find_by_id",
            self.timeouts.find(),
            self.store.find_by_id(collection, id),
        )
        .await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn update_one(
        &self,
        collection: &str,
        update: &ConditionalUpdate,
    ) -> Result<UpdateOutcome> {
        with_budget(
            "update_one",
            self.timeouts.update(),
            self.store.update_one(collection, update),
        )
        .await
    }

    pub async fn bulk_update(
        &self,
        collection: &str,
        updates: &[ConditionalUpdate],
    ) -> Result<BulkWriteSummary> {
        with_budget(
            "bulk_update",
            self.timeouts.bulk(),
            self.store.bulk_update(collection, updates),
        )
        .await
    }
}

async fn with_budget<T>(
    operation: &str,
    budget: Duration,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(budget, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                operation = operation,
                budget_ms = budget.as_millis() as u64,
                "Store operation exceeded its time budget"
            );
            Err(StoreError::Timeout {
                operation: operation.to_string(),
                budget_ms: budget.as_millis() as u64,
            }
            .into())
        }
    }
}
