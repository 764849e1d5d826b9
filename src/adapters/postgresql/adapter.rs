//! PostgreSQL document store
//!
//! Each collection is a table of JSONB documents:
//!
//! ```sql
//! CREATE TABLE "<collection>" (id TEXT PRIMARY KEY, body JSONB NOT NULL);
//! CREATE UNIQUE INDEX "<collection>_key_index" ON "<collection>" ((body->>'key'));
//! ```
//!
//! Conditional updates lock and rewrite at most one row. Bulk updates are
//! pipelined on a single connection, each item autocommitted on its own, so
//! one failing item never rolls back the others.

use super::client::{map_pg_error, quote_ident, PostgresClient};
use crate::adapters::database::traits::{ConditionalUpdate, DocumentStore, StateCondition};
use crate::domain::{
    BulkItemFailure, BulkWriteFailure, BulkWriteSummary, DocflowError, DocumentId, Result,
    UpdateOutcome,
};
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use tokio_postgres::error::SqlState;
use tokio_postgres::Row;

/// Suffix of the unique index on `key`
const KEY_INDEX_SUFFIX: &str = "_key_index";

/// PostgreSQL implementation of [`DocumentStore`]
pub struct PostgresDocumentStore {
    client: Arc<PostgresClient>,
}

impl PostgresDocumentStore {
    pub fn new(client: PostgresClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Create the backing tables if they do not exist yet
    pub async fn ensure_collections(&self, collections: &[&str]) -> Result<()> {
        let conn = self.client.get_connection().await?;
        for collection in collections {
            let statement = create_table_sql(collection);
            if let Err(e) = conn.batch_execute(&statement).await {
                if !is_duplicate_object(&e) {
                    return Err(map_pg_error(e, "create collection"));
                }
            }
            tracing::debug!(collection = %collection, "Collection table ready");
        }
        Ok(())
    }
}

fn create_table_sql(collection: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (id TEXT PRIMARY KEY, body JSONB NOT NULL)",
        quote_ident(collection)
    )
}

/// `IF NOT EXISTS` can still race with a concurrent creator
fn is_duplicate_object(err: &tokio_postgres::Error) -> bool {
    matches!(
        err.code(),
        Some(code) if *code == SqlState::DUPLICATE_TABLE
            || *code == SqlState::DUPLICATE_OBJECT
            || *code == SqlState::UNIQUE_VIOLATION
    )
}

fn violates_key_index(err: &tokio_postgres::Error) -> bool {
    err.as_db_error()
        .and_then(|db| db.constraint())
        .is_some_and(|name| name.ends_with(KEY_INDEX_SUFFIX))
}

fn is_undefined_table(err: &tokio_postgres::Error) -> bool {
    err.code() == Some(&SqlState::UNDEFINED_TABLE)
}

/// Builds the lock-then-update statement for one conditional update
///
/// Parameters: `$1` key, `$2` state operand, `$3` new state. Returns one row
/// per touched document carrying its prior state.
fn conditional_update_sql(collection: &str, condition: &StateCondition) -> String {
    let table = quote_ident(collection);
    let state_predicate = match condition {
        StateCondition::Equals(_) => "body->>'state' = $2",
        StateCondition::NotEquals(_) => "body->>'state' IS DISTINCT FROM $2",
    };
    format!(
        "WITH target AS (\
            SELECT id, body->>'state' AS prior FROM {table} \
            WHERE body->>'key' = $1 AND {state_predicate} \
            LIMIT 1 FOR UPDATE\
        ) \
        UPDATE {table} AS doc \
        SET body = jsonb_set(doc.body, '{{state}}', to_jsonb($3::text)) \
        FROM target WHERE doc.id = target.id \
        RETURNING target.prior"
    )
}

fn condition_operand(condition: &StateCondition) -> &'static str {
    match condition {
        StateCondition::Equals(state) | StateCondition::NotEquals(state) => state.as_str(),
    }
}

fn outcome_from_rows(rows: &[Row], update: &ConditionalUpdate) -> UpdateOutcome {
    let modified = rows
        .iter()
        .filter(|row| {
            row.get::<_, Option<String>>(0).as_deref() != Some(update.set_state.as_str())
        })
        .count();
    UpdateOutcome::new(rows.len() as u64, modified as u64)
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn ping(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn create_unique_key_index(&self, collection: &str) -> Result<()> {
        let conn = self.client.get_connection().await?;
        let statement = format!(
            "{}; CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ((body->>'key'))",
            create_table_sql(collection),
            quote_ident(&format!("{collection}{KEY_INDEX_SUFFIX}")),
            quote_ident(collection)
        );

        match conn.batch_execute(&statement).await {
            Ok(()) => Ok(()),
            // A failed unique build over existing duplicates names the key
            // index itself; a lost creation race names a catalog index.
            Err(e) if is_duplicate_object(&e) && !violates_key_index(&e) => {
                tracing::debug!(collection = %collection, "Key index created concurrently");
                Ok(())
            }
            Err(e) => Err(map_pg_error(e, "create key index")),
        }
    }

    async fn insert_one(
        &self,
        collection: &str,
        id: &DocumentId,
        body: Value,
    ) -> Result<DocumentId> {
        let conn = self.client.get_connection().await?;
        let statement = format!(
            "INSERT INTO {} (id, body) VALUES ($1, $2)",
            quote_ident(collection)
        );

        let mut body = body;
        if let Some(fields) = body.as_object_mut() {
            fields.insert("id".to_string(), Value::String(id.to_string()));
        }

        match conn.execute(&statement, &[&id.as_str(), &body]).await {
            Ok(_) => Ok(id.clone()),
            Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
                if violates_key_index(&e) {
                    let key = body
                        .get("key")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    Err(DocflowError::Conflict {
                        message: format!(
                            "collection: {collection} index: keyIndex dup key: {{ key: \"{key}\" }}"
                        ),
                        key,
                    })
                } else {
                    Err(DocflowError::Conflict {
                        key: id.to_string(),
                        message: format!("_id_ dup key: {{ _id: \"{id}\" }}"),
                    })
                }
            }
            Err(e) => Err(map_pg_error(e, "insert")),
        }
    }

    async fn find_by_id(&self, collection: &str, id: &DocumentId) -> Result<Value> {
        let conn = self.client.get_connection().await?;
        let statement = format!("SELECT body FROM {} WHERE id = $1", quote_ident(collection));

        match conn.query_opt(&statement, &[&id.as_str()]).await {
            Ok(Some(row)) => Ok(row.get::<_, Value>(0)),
            Ok(None) => Err(DocflowError::NotFound(format!(
                "no document with id {id} in {collection}"
            ))),
            Err(e) if is_undefined_table(&e) => Err(DocflowError::NotFound(format!(
                "no document with id {id} in {collection}"
            ))),
            Err(e) => Err(map_pg_error(e, "find by id")),
        }
    }

    async fn update_one(
        &self,
        collection: &str,
        update: &ConditionalUpdate,
    ) -> Result<UpdateOutcome> {
        let conn = self.client.get_connection().await?;
        let statement = conditional_update_sql(collection, &update.state);

        match conn
            .query(
                &statement,
                &[
                    &update.key,
                    &condition_operand(&update.state),
                    &update.set_state.as_str(),
                ],
            )
            .await
        {
            Ok(rows) => Ok(outcome_from_rows(&rows, update)),
            Err(e) if is_undefined_table(&e) => Ok(UpdateOutcome::default()),
            Err(e) => Err(map_pg_error(e, "conditional update")),
        }
    }

    async fn bulk_update(
        &self,
        collection: &str,
        updates: &[ConditionalUpdate],
    ) -> Result<BulkWriteSummary> {
        let mut summary = BulkWriteSummary {
            submitted_count: updates.len() as u64,
            ..Default::default()
        };
        if updates.is_empty() {
            return Ok(summary);
        }

        let conn = self.client.get_connection().await?;
        let statements: Vec<String> = updates
            .iter()
            .map(|update| conditional_update_sql(collection, &update.state))
            .collect();

        // Queries issued concurrently on one client are pipelined over the
        // same connection; outside a transaction each one commits alone.
        let results = join_all(updates.iter().zip(&statements).map(|(update, statement)| {
            let conn = &conn;
            async move {
                conn.query(
                    statement.as_str(),
                    &[
                        &update.key,
                        &condition_operand(&update.state),
                        &update.set_state.as_str(),
                    ],
                )
                .await
            }
        }))
        .await;

        let mut failures = Vec::new();
        for (index, (update, result)) in updates.iter().zip(results).enumerate() {
            match result {
                Ok(rows) => summary.record(outcome_from_rows(&rows, update)),
                Err(e) if is_undefined_table(&e) => {}
                Err(e) => failures.push(BulkItemFailure {
                    index,
                    key: update.key.clone(),
                    message: map_pg_error(e, "bulk item").to_string(),
                }),
            }
        }

        if failures.is_empty() {
            Ok(summary)
        } else {
            Err(DocflowError::PartialFailure(BulkWriteFailure { summary, failures }))
        }
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
