//! In-memory document store
//!
//! Collections live in one mutex-guarded map, so every operation (including
//! the unique-key check on insert and the match-then-set of a conditional
//! update) is atomic with respect to the others.

use crate::adapters::database::traits::{ConditionalUpdate, DocumentStore};
use crate::domain::{
    BulkWriteSummary, DocflowError, DocumentId, Result, StoreError, UpdateOutcome,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Collection {
    /// Documents keyed by id, in id order
    documents: BTreeMap<String, Value>,
    /// Number of documents per `key` value
    key_counts: HashMap<String, usize>,
    /// Whether the unique index on `key` exists
    unique_key: bool,
}

impl Collection {
    fn key_taken(&self, key: &str) -> bool {
        self.key_counts.get(key).is_some_and(|count| *count > 0)
    }

    fn apply(&mut self, update: &ConditionalUpdate) -> UpdateOutcome {
        let target = self.documents.values_mut().find(|doc| {
            doc.get("key").and_then(Value::as_str) == Some(update.key.as_str())
                && update
                    .state
                    .matches(doc.get("state").and_then(Value::as_str))
        });

        match target {
            Some(doc) => {
                let new_state = Value::String(update.set_state.as_str().to_string());
                let modified = doc.get("state") != Some(&new_state);
                if let Some(fields) = doc.as_object_mut() {
                    fields.insert("state".to_string(), new_state);
                }
                UpdateOutcome::new(1, u64::from(modified))
            }
            None => UpdateOutcome::default(),
        }
    }
}

/// Process-local implementation of [`DocumentStore`]
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, Collection>>,
}

impl MemoryDocumentStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub fn count(&self, collection: &str) -> usize {
        self.lock()
            .map(|guard| guard.get(collection).map_or(0, |c| c.documents.len()))
            .unwrap_or(0)
    }

    /// Whether the unique key index exists on a collection
    pub fn has_unique_key_index(&self, collection: &str) -> bool {
        self.lock()
            .map(|guard| guard.get(collection).is_some_and(|c| c.unique_key))
            .unwrap_or(false)
    }

    /// Removes a collection with its documents and index
    pub fn drop_collection(&self, collection: &str) {
        if let Ok(mut guard) = self.lock() {
            guard.remove(collection);
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Collection>>> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Connection("memory store lock poisoned".to_string()).into())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn ping(&self) -> Result<()> {
        self.lock().map(|_| ())
    }

    async fn create_unique_key_index(&self, collection: &str) -> Result<()> {
        let mut guard = self.lock()?;
        let coll = guard.entry(collection.to_string()).or_default();
        if coll.unique_key {
            return Ok(());
        }

        if let Some((key, _)) = coll.key_counts.iter().find(|(_, count)| **count > 1) {
            return Err(StoreError::Query(format!(
                "cannot build keyIndex: dup key: {{ key: \"{key}\" }}"
            ))
            .into());
        }

        coll.unique_key = true;
        Ok(())
    }

    async fn insert_one(
        &self,
        collection: &str,
        id: &DocumentId,
        mut body: Value,
    ) -> Result<DocumentId> {
        let mut guard = self.lock()?;
        let coll = guard.entry(collection.to_string()).or_default();

        if coll.documents.contains_key(id.as_str()) {
            return Err(DocflowError::Conflict {
                key: id.to_string(),
                message: format!("_id_ dup key: {{ _id: \"{id}\" }}"),
            });
        }

        if coll.unique_key {
            if let Some(key) = body.get("key").and_then(Value::as_str) {
                if coll.key_taken(key) {
                    return Err(DocflowError::Conflict {
                        key: key.to_string(),
                        message: format!(
                            "collection: {collection} index: keyIndex dup key: {{ key: \"{key}\" }}"
                        ),
                    });
                }
            }
        }

        if let Some(key) = body.get("key").and_then(Value::as_str) {
            *coll.key_counts.entry(key.to_string()).or_default() += 1;
        }
        if let Some(fields) = body.as_object_mut() {
            fields.insert("id".to_string(), Value::String(id.to_string()));
        }
        coll.documents.insert(id.to_string(), body);
        Ok(id.clone())
    }

    async fn find_by_id(&self, collection: &str, id: &DocumentId) -> Result<Value> {
        let guard = self.lock()?;
        guard
            .get(collection)
            .and_then(|c| c.documents.get(id.as_str()))
            .cloned()
            .ok_or_else(|| DocflowError::NotFound(format!("no document with id {id} in {collection}")))
    }

    async fn update_one(
        &self,
        collection: &str,
        update: &ConditionalUpdate,
    ) -> Result<UpdateOutcome> {
        let mut guard = self.lock()?;
        Ok(guard
            .get_mut(collection)
            .map(|c| c.apply(update))
            .unwrap_or_default())
    }

    async fn bulk_update(
        &self,
        collection: &str,
        updates: &[ConditionalUpdate],
    ) -> Result<BulkWriteSummary> {
        let mut guard = self.lock()?;
        let mut summary = BulkWriteSummary {
            submitted_count: updates.len() as u64,
            ..Default::default()
        };
        if let Some(coll) = guard.get_mut(collection) {
            for update in updates {
                summary.record(coll.apply(update));
            }
        }
        Ok(summary)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::traits::StateCondition;
    use crate::domain::DocumentState;
    use serde_json::json;

    fn id(s: &str) -> DocumentId {
        DocumentId::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryDocumentStore::new();
        store
            .insert_one("docs", &id("a"), json!({"name": "n", "key": "k", "state": "INIT"}))
            .await
            .unwrap();

        let doc = store.find_by_id("docs", &id("a")).await.unwrap();
        assert_eq!(doc["key"], "k");
        assert_eq!(doc["id"], "a");
        assert_eq!(store.count("docs"), 1);
    }

    #[tokio::test]
    async fn test_find_missing_is_not_found() {
        let store = MemoryDocumentStore::new();
        let err = store.find_by_id("docs", &id("nope")).await.unwrap_err();
        assert!(matches!(err, DocflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unique_key_only_enforced_with_index() {
        let store = MemoryDocumentStore::new();
        let body = json!({"name": "n", "key": "dup"});

        store.insert_one("docs", &id("1"), body.clone()).await.unwrap();
        store.insert_one("docs", &id("2"), body.clone()).await.unwrap();
        assert_eq!(store.count("docs"), 2);

        store.drop_collection("docs");
        store.create_unique_key_index("docs").await.unwrap();
        store.insert_one("docs", &id("1"), body.clone()).await.unwrap();
        let err = store.insert_one("docs", &id("2"), body).await.unwrap_err();
        match err {
            DocflowError::Conflict { key, message } => {
                assert_eq!(key, "dup");
                assert!(message.contains("keyIndex dup key: { key: \"dup\" }"));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_id_is_conflict() {
        let store = MemoryDocumentStore::new();
        store.insert_one("b", &id("x"), json!({})).await.unwrap();
        let err = store
            .insert_one("b", &id("x"), json!({"key": "k"}))
            .await
            .unwrap_err();
        match err {
            DocflowError::Conflict { key, message } => {
                assert_eq!(key, "x");
                assert!(message.contains("_id: \"x\""));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_index_creation_is_idempotent() {
        let store = MemoryDocumentStore::new();
        store.create_unique_key_index("docs").await.unwrap();
        store.create_unique_key_index("docs").await.unwrap();
        assert!(store.has_unique_key_index("docs"));
    }

    #[tokio::test]
    async fn test_index_creation_fails_on_existing_duplicates() {
        let store = MemoryDocumentStore::new();
        store.insert_one("docs", &id("1"), json!({"key": "k"})).await.unwrap();
        store.insert_one("docs", &id("2"), json!({"key": "k"})).await.unwrap();
        assert!(store.create_unique_key_index("docs").await.is_err());
        assert!(!store.has_unique_key_index("docs"));
    }

    #[tokio::test]
    async fn test_update_one_conditional() {
        let store = MemoryDocumentStore::new();
        store
            .insert_one("docs", &id("1"), json!({"key": "k", "state": "INIT"}))
            .await
            .unwrap();

        let update = ConditionalUpdate::new(
            "k",
            StateCondition::Equals(DocumentState::Init),
            DocumentState::Verified,
        );
        assert_eq!(store.update_one("docs", &update).await.unwrap(), UpdateOutcome::new(1, 1));
        assert_eq!(store.update_one("docs", &update).await.unwrap(), UpdateOutcome::new(0, 0));

        let doc = store.find_by_id("docs", &id("1")).await.unwrap();
        assert_eq!(doc["state"], "VERIFIED");
    }

    #[tokio::test]
    async fn test_update_on_missing_collection_matches_nothing() {
        let store = MemoryDocumentStore::new();
        let update = ConditionalUpdate::new(
            "k",
            StateCondition::Equals(DocumentState::Init),
            DocumentState::Rejected,
        );
        assert_eq!(store.update_one("none", &update).await.unwrap(), UpdateOutcome::default());
    }

    #[tokio::test]
    async fn test_bulk_update_counts() {
        let store = MemoryDocumentStore::new();
        store
            .insert_one("docs", &id("1"), json!({"key": "a", "state": "INIT"}))
            .await
            .unwrap();
        store
            .insert_one("docs", &id("2"), json!({"key": "b", "state": "PROCESSED"}))
            .await
            .unwrap();

        let updates: Vec<_> = ["a", "b", "missing"]
            .iter()
            .map(|k| {
                ConditionalUpdate::new(
                    *k,
                    StateCondition::NotEquals(DocumentState::Processed),
                    DocumentState::Processed,
                )
            })
            .collect();

        let summary = store.bulk_update("docs", &updates).await.unwrap();
        assert_eq!(summary.submitted_count, 3);
        assert_eq!(summary.matched_count, 1);
        assert_eq!(summary.modified_count, 1);
    }
}
