//! Lifecycle service
//!
//! Composes the index registry, the transition handler and the batch
//! processor over one [`StoreGateway`]. One instance is shared by all request
//! handlers.

use super::batch;
use super::registry::IndexRegistry;
use super::transition::{self, TransitionOutcome};
use crate::adapters::database::{DocumentStore, StoreGateway};
use crate::config::StoreConfig;
use crate::domain::{
    BulkWriteSummary, Document, DocumentId, NewBatch, NewDocument, Result, TransitionTarget,
};
use std::sync::Arc;

/// Document lifecycle operations
pub struct LifecycleService {
    gateway: StoreGateway,
    registry: IndexRegistry,
    document_collection: String,
    batch_collection: String,
}

impl LifecycleService {
    /// Create a new service over a gateway
    ///
    /// # Arguments
    ///
    /// * `gateway` - Time-budgeted store handle
    /// * `document_collection` - Collection holding documents
    /// * `batch_collection` - Collection holding submitted batches
    pub fn new(
        gateway: StoreGateway,
        document_collection: impl Into<String>,
        batch_collection: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            registry: IndexRegistry::new(),
            document_collection: document_collection.into(),
            batch_collection: batch_collection.into(),
        }
    }

    /// Create a service from the store section of the configuration
    pub fn from_config(store: Arc<dyn DocumentStore>, config: &StoreConfig) -> Self {
        Self::new(
            StoreGateway::new(store, config.timeouts.clone()),
            config.document_collection.clone(),
            config.batch_collection.clone(),
        )
    }

    pub fn gateway(&self) -> &StoreGateway {
        &self.gateway
    }

    pub fn registry(&self) -> &IndexRegistry {
        &self.registry
    }

    pub fn document_collection(&self) -> &str {
        &self.document_collection
    }

    pub fn batch_collection(&self) -> &str {
        &self.batch_collection
    }

    /// Stores a new document in state `INIT`
    ///
    /// # Errors
    ///
    /// - `Validation` if the key is blank (no store call is made)
    /// - `Conflict` if a document with the same key or id exists
    /// - `Store` on timeout or connectivity failure
    pub async fn save_document(&self, new: NewDocument) -> Result<Document> {
        new.validate()?;
        let document = Document::from_new(new);

        self.registry
            .ensure_index(&self.gateway, &self.document_collection)
            .await;

        self.gateway
            .insert_one(&self.document_collection, &document.id, &document)
            .await?;

        tracing::debug!(id = %document.id, key = %document.key, "Document saved");
        Ok(document)
    }

    /// Moves the document with `key` from `INIT` to `target`
    pub async fn transition(&self, key: &str, target: TransitionTarget) -> Result<TransitionOutcome> {
        transition::transition(&self.gateway, &self.document_collection, key, target).await
    }

    /// Stores a batch for later processing and returns its id
    pub async fn save_batch(&self, batch: NewBatch) -> Result<DocumentId> {
        batch::save_batch(&self.gateway, &self.batch_collection, batch).await
    }

    /// Marks every document referenced by a stored batch as `PROCESSED`
    pub async fn process_batch(&self, batch_id: &DocumentId) -> Result<BulkWriteSummary> {
        batch::process_batch(
            &self.gateway,
            &self.batch_collection,
            &self.document_collection,
            batch_id,
        )
        .await
    }

    /// Pings the store under its time budget
    pub async fn health(&self) -> Result<()> {
        self.gateway.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryDocumentStore;
    use crate::adapters::database::ConditionalUpdate;
    use crate::domain::{BatchEntry, DocflowError, DocumentState, StoreError, UpdateOutcome};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Memory store that refuses to build indexes
    #[derive(Default)]
    struct IndexlessStore {
        inner: MemoryDocumentStore,
        index_calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentStore for IndexlessStore {
        async fn ping(&self) -> Result<()> {
            self.inner.ping().await
        }
        async fn create_unique_key_index(&self, _: &str) -> Result<()> {
            self.index_calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Query("index build refused".to_string()).into())
        }
        async fn insert_one(&self, c: &str, id: &DocumentId, body: Value) -> Result<DocumentId> {
            self.inner.insert_one(c, id, body).await
        }
        async fn find_by_id(&self, c: &str, id: &DocumentId) -> Result<Value> {
            self.inner.find_by_id(c, id).await
        }
        async fn update_one(&self, c: &str, update: &ConditionalUpdate) -> Result<UpdateOutcome> {
            self.inner.update_one(c, update).await
        }
        async fn bulk_update(
            &self,
            c: &str,
            updates: &[ConditionalUpdate],
        ) -> Result<BulkWriteSummary> {
            self.inner.bulk_update(c, updates).await
        }
        fn backend_name(&self) -> &'static str {
            "indexless"
        }
    }

    fn service() -> (Arc<MemoryDocumentStore>, LifecycleService) {
        let store = Arc::new(MemoryDocumentStore::new());
        let service = LifecycleService::from_config(store.clone(), &StoreConfig::default());
        (store, service)
    }

    #[tokio::test]
    async fn test_save_document_forces_init_and_ensures_index() {
        let (store, service) = service();
        let doc = service
            .save_document(NewDocument::new("test1", "key1"))
            .await
            .unwrap();

        assert_eq!(doc.state, DocumentState::Init);
        assert_eq!(doc.id.as_str().len(), 32);
        assert!(service.registry().is_ensured("documentCollection"));
        assert!(store.has_unique_key_index("documentCollection"));
        assert_eq!(store.count("documentCollection"), 1);
    }

    #[tokio::test]
    async fn test_save_document_keeps_caller_id() {
        let (_, service) = service();
        let id = DocumentId::new("caller-id").unwrap();
        let doc = service
            .save_document(NewDocument::new("n", "k").with_id(id.clone()))
            .await
            .unwrap();
        assert_eq!(doc.id, id);
    }

    #[tokio::test]
    async fn test_blank_key_never_reaches_store() {
        let (store, service) = service();
        let err = service
            .save_document(NewDocument::new("n", "  "))
            .await
            .unwrap_err();

        assert!(matches!(err, DocflowError::Validation(_)));
        assert!(!service.registry().is_ensured("documentCollection"));
        assert_eq!(store.count("documentCollection"), 0);
    }

    #[tokio::test]
    async fn test_duplicate_key_conflict() {
        let (_, service) = service();
        service.save_document(NewDocument::new("a", "dup")).await.unwrap();
        let err = service
            .save_document(NewDocument::new("b", "dup"))
            .await
            .unwrap_err();

        match err {
            DocflowError::Conflict { key, message } => {
                assert_eq!(key, "dup");
                assert!(message.contains("dup key: { key: \"dup\" }"));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transition_is_idempotent() {
        let (_, service) = service();
        service.save_document(NewDocument::new("n", "k")).await.unwrap();

        let first = service.transition("k", TransitionTarget::Verified).await.unwrap();
        assert_eq!((first.matched, first.modified), (1, 1));

        let second = service.transition("k", TransitionTarget::Verified).await.unwrap();
        assert_eq!((second.matched, second.modified), (0, 0));

        let rejected = service.transition("k", TransitionTarget::Rejected).await.unwrap();
        assert_eq!(rejected.matched, 0);
    }

    #[tokio::test]
    async fn test_batch_roundtrip_and_rerun() {
        let (_, service) = service();
        service.save_document(NewDocument::new("a", "k1")).await.unwrap();
        service.save_document(NewDocument::new("b", "k2")).await.unwrap();

        let batch_id = service
            .save_batch(NewBatch::new(vec![
                BatchEntry::new("a", "k1"),
                BatchEntry::new("b", "k2"),
                BatchEntry::new("ghost", "k3"),
            ]))
            .await
            .unwrap();

        let first = service.process_batch(&batch_id).await.unwrap();
        assert_eq!(first.submitted_count, 3);
        assert_eq!(first.matched_count, 2);
        assert_eq!(first.modified_count, 2);

        let second = service.process_batch(&batch_id).await.unwrap();
        assert_eq!(second.matched_count, 0);
        assert_eq!(second.modified_count, 0);
    }

    #[tokio::test]
    async fn test_process_unknown_batch() {
        let (_, service) = service();
        let err = service
            .process_batch(&DocumentId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, DocflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_batch_reports_zero() {
        let (_, service) = service();
        let id = service.save_batch(NewBatch::new(Vec::new())).await.unwrap();
        let summary = service.process_batch(&id).await.unwrap();
        assert_eq!(summary, BulkWriteSummary::default());
    }

    #[tokio::test]
    async fn test_health_on_memory_store() {
        let (_, service) = service();
        service.health().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_index_provisioning_does_not_block_save() {
        let store = Arc::new(IndexlessStore::default());
        let service = LifecycleService::from_config(store.clone(), &StoreConfig::default());

        let doc = service
            .save_document(NewDocument::new("test1", "key1"))
            .await
            .unwrap();
        assert_eq!(doc.state, DocumentState::Init);
        assert!(!service.registry().is_ensured("documentCollection"));
        assert_eq!(store.inner.count("documentCollection"), 1);
        assert_eq!(store.index_calls.load(Ordering::SeqCst), 1);

        service
            .save_document(NewDocument::new("test2", "key2"))
            .await
            .unwrap();
        assert_eq!(store.index_calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.inner.count("documentCollection"), 2);
    }
}
