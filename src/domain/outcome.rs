//! Outcomes reported by conditional and bulk writes
//!
//! Zero matches is a valid outcome of a conditional update, never an error.

use serde::Serialize;
use std::fmt;

/// Counters returned by a single conditional update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

impl UpdateOutcome {
    pub fn new(matched: u64, modified: u64) -> Self {
        Self { matched, modified }
    }
}

/// Aggregate counters of a bulk conditional update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkWriteSummary {
    /// Number of update items submitted
    pub submitted_count: u64,

    /// Items whose predicate matched a document
    pub matched_count: u64,

    /// Documents actually changed
    pub modified_count: u64,
}

impl BulkWriteSummary {
    /// Folds one successful item into the aggregate
    pub fn record(&mut self, outcome: UpdateOutcome) {
        self.matched_count += outcome.matched;
        self.modified_count += outcome.modified;
    }
}

/// Details of one bulk item that the store refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkItemFailure {
    /// Position of the item in the submitted list
    pub index: usize,

    /// Business key the item targeted
    pub key: String,

    /// Store error message for this item
    pub message: String,
}

/// A bulk write in which at least one item failed
///
/// Items that did not fail are committed and counted in `summary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkWriteFailure {
    pub summary: BulkWriteSummary,
    pub failures: Vec<BulkItemFailure>,
}

impl fmt::Display for BulkWriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} bulk items failed",
            self.failures.len(),
            self.summary.submitted_count
        )?;
        for failure in &self.failures {
            write!(
                f,
                "; [{}] key {}: {}",
                failure.index, failure.key, failure.message
            )?;
        }
        Ok(())
    }
}
