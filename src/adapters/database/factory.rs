//! Document store factory
//!
//! This module builds the configured store backend.

use crate::adapters::database::traits::DocumentStore;
use crate::adapters::memory::MemoryDocumentStore;
use crate::adapters::postgresql::{PostgresClient, PostgresDocumentStore};
use crate::config::{StoreBackend, StoreConfig};
use crate::domain::Result;
use std::sync::Arc;

/// Create a document store based on the configuration
///
/// For PostgreSQL the connection is verified and both collection tables are
/// created before the store is returned.
///
/// # Errors
///
/// Returns an error if the store is unreachable or the tables cannot be
/// created. Callers treat this as fatal at startup.
pub async fn create_document_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Creating in-memory document store");
            Ok(Arc::new(MemoryDocumentStore::new()) as Arc<dyn DocumentStore>)
        }
        StoreBackend::Postgres => {
            tracing::info!(
                connection = %config.connection_string_safe(),
                "Creating PostgreSQL document store"
            );
            let client = PostgresClient::new(config)?;
            client.test_connection().await?;

            let store = PostgresDocumentStore::new(client);
            store
                .ensure_collections(&[config.document_collection.as_str(), config.batch_collection.as_str()])
                .await?;

            Ok(Arc::new(store) as Arc<dyn DocumentStore>)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_memory_store() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            ..StoreConfig::default()
        };
        let store = create_document_store(&config).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
        store.ping().await.unwrap();
    }
}
