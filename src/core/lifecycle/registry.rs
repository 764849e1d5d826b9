//! Index assurance registry
//!
//! Records, per collection, whether the unique index on `key` has been
//! provisioned in this process so later inserts skip the store round trip.

use crate::adapters::database::StoreGateway;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Per-collection "index ensured" flags
///
/// The lock guards only the in-memory set and is never held across a store
/// call. Two first touches of a fresh collection may therefore both issue an
/// index creation; the store treats the second one as a no-op.
#[derive(Debug, Default)]
pub struct IndexRegistry {
    ensured: Mutex<HashSet<String>>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the index of `collection` is known to exist
    pub fn is_ensured(&self, collection: &str) -> bool {
        self.flags().contains(collection)
    }

    /// Provisions the unique key index unless already done
    ///
    /// A provisioning failure is logged and leaves the collection unmarked,
    /// so the next call retries. It never fails the caller's write.
    pub async fn ensure_index(&self, gateway: &StoreGateway, collection: &str) {
        if self.is_ensured(collection) {
            return;
        }

        match gateway.create_unique_key_index(collection).await {
            Ok(()) => {
                self.flags().insert(collection.to_string());
                tracing::info!(collection = %collection, "Unique key index ensured");
            }
            Err(e) => {
                tracing::warn!(
                    collection = %collection,
                    error = %e,
                    "Failed to ensure unique key index; continuing with write"
                );
            }
        }
    }

    /// Drops the flag of a collection, e.g. after the collection was removed
    pub fn forget(&self, collection: &str) -> bool {
        self.flags().remove(collection)
    }

    // A poisoned set is still a valid set of names.
    fn flags(&self) -> MutexGuard<'_, HashSet<String>> {
        self.ensured.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::DocumentStore;
    use crate::adapters::memory::MemoryDocumentStore;
    use crate::config::TimeoutConfig;
    use crate::domain::DocumentId;
    use std::sync::Arc;

    fn gateway_over(store: Arc<MemoryDocumentStore>) -> StoreGateway {
        StoreGateway::new(store, TimeoutConfig::default())
    }

    #[tokio::test]
    async fn test_ensure_index_marks_collection() {
        let store = Arc::new(MemoryDocumentStore::new());
        let gateway = gateway_over(store.clone());
        let registry = IndexRegistry::new();

        assert!(!registry.is_ensured("docs"));
        registry.ensure_index(&gateway, "docs").await;
        assert!(registry.is_ensured("docs"));
        assert!(store.has_unique_key_index("docs"));
    }

    #[tokio::test]
    async fn test_ensured_collection_skips_store() {
        let store = Arc::new(MemoryDocumentStore::new());
        let gateway = gateway_over(store.clone());
        let registry = IndexRegistry::new();

        registry.ensure_index(&gateway, "docs").await;
        // Dropping the collection behind the registry's back is not noticed
        store.drop_collection("docs");
        registry.ensure_index(&gateway, "docs").await;
        assert!(!store.has_unique_key_index("docs"));

        assert!(registry.forget("docs"));
        registry.ensure_index(&gateway, "docs").await;
        assert!(store.has_unique_key_index("docs"));
    }

    #[tokio::test]
    async fn test_failed_provisioning_is_not_marked() {
        let store = Arc::new(MemoryDocumentStore::new());
        let gateway = gateway_over(store.clone());
        let registry = IndexRegistry::new();

        let body = serde_json::json!({"key": "same"});
        let a = DocumentId::new("a").unwrap();
        let b = DocumentId::new("b").unwrap();
        store.insert_one("docs", &a, body.clone()).await.unwrap();
        store.insert_one("docs", &b, body).await.unwrap();

        registry.ensure_index(&gateway, "docs").await;
        assert!(!registry.is_ensured("docs"));
    }
}
