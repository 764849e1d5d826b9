//! Single-document state transitions
//!
//! A transition moves one document, found by its business key, from `INIT`
//! to `VERIFIED` or `REJECTED`. Documents in any other state are not matched,
//! which makes repeating a transition harmless.

use crate::adapters::database::{ConditionalUpdate, StateCondition, StoreGateway};
use crate::domain::{DocumentState, Result, TransitionTarget, UpdateOutcome};
use std::fmt;

/// Result of one transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub matched: u64,
    pub modified: u64,
    pub target: DocumentState,
}

impl TransitionOutcome {
    pub fn new(outcome: UpdateOutcome, target: TransitionTarget) -> Self {
        Self {
            matched: outcome.matched,
            modified: outcome.modified,
            target: target.state(),
        }
    }
}

impl fmt::Display for TransitionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Match: {}| Updated: {} | Update to state: {}",
            self.matched, self.modified, self.target
        )
    }
}

/// `{key == key AND state == INIT}` -> `{state = target}`
pub fn transition_update(key: &str, target: TransitionTarget) -> ConditionalUpdate {
    ConditionalUpdate::new(
        key,
        StateCondition::Equals(DocumentState::Init),
        target.state(),
    )
}

/// Applies one transition against the document collection
///
/// Zero matches is a normal outcome. Store failures are returned as-is and
/// never retried.
pub async fn transition(
    gateway: &StoreGateway,
    collection: &str,
    key: &str,
    target: TransitionTarget,
) -> Result<TransitionOutcome> {
    let update = transition_update(key, target);
    let outcome = gateway.update_one(collection, &update).await?;

    tracing::debug!(
        key = %key,
        target = %target,
        matched = outcome.matched,
        modified = outcome.modified,
        "Transition applied"
    );

    Ok(TransitionOutcome::new(outcome, target))
}
