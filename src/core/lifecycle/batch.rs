//! Batch ingestion and processing
//!
//! A batch is stored once, as submitted. Processing it later issues one bulk
//! request that moves every referenced document that is not yet `PROCESSED`
//! to `PROCESSED`. Keys with no document, and documents already processed,
//! simply do not match.

use crate::adapters::database::{ConditionalUpdate, StateCondition, StoreGateway};
use crate::domain::{
    BulkWriteSummary, DocflowError, DocumentBatch, DocumentId, DocumentState, NewBatch, Result,
};

/// Persists a submitted batch and returns its id
///
/// Entries are neither validated nor deduplicated here.
pub async fn save_batch(
    gateway: &StoreGateway,
    batch_collection: &str,
    batch: NewBatch,
) -> Result<DocumentId> {
    let batch = DocumentBatch::from_new(batch);
    let id = gateway
        .insert_one(batch_collection, &batch.id, &batch)
        .await?;

    tracing::info!(
        batch_id = %id,
        entries = batch.to_process.len(),
        "Batch saved"
    );
    Ok(id)
}

/// One `{key == entry.key AND state != PROCESSED}` -> `{state = PROCESSED}`
/// update per entry, in submission order
pub fn processing_updates(batch: &DocumentBatch) -> Vec<ConditionalUpdate> {
    batch
        .to_process
        .iter()
        .map(|entry| {
            ConditionalUpdate::new(
                entry.key.as_str(),
                StateCondition::NotEquals(DocumentState::Processed),
                DocumentState::Processed,
            )
        })
        .collect()
}

/// Processes a stored batch against the document collection
///
/// # Errors
///
/// - `NotFound` if no batch has this id
/// - `PartialFailure` if some bulk items failed; the others stay committed
/// - `Store` on timeout or connectivity failure
pub async fn process_batch(
    gateway: &StoreGateway,
    batch_collection: &str,
    document_collection: &str,
    batch_id: &DocumentId,
) -> Result<BulkWriteSummary> {
    let batch: DocumentBatch = gateway.find_by_id(batch_collection, batch_id).await?;

    let updates = processing_updates(&batch);
    if updates.is_empty() {
        tracing::info!(batch_id = %batch_id, "Batch has no entries, nothing to process");
        return Ok(BulkWriteSummary::default());
    }

    match gateway.bulk_update(document_collection, &updates).await {
        Ok(summary) => {
            tracing::info!(
                batch_id = %batch_id,
                submitted = summary.submitted_count,
                matched = summary.matched_count,
                modified = summary.modified_count,
                "Batch processed"
            );
            Ok(summary)
        }
        Err(DocflowError::PartialFailure(failure)) => {
            for item in &failure.failures {
                tracing::warn!(
                    batch_id = %batch_id,
                    index = item.index,
                    key = %item.key,
                    error = %item.message,
                    "Bulk item failed"
                );
            }
            Err(DocflowError::PartialFailure(failure))
        }
        Err(e) => Err(e),
    }
}
