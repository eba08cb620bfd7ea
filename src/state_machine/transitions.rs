//! # Deliverable Transition Table
//!
//! The fixed adjacency table governing deliverable status changes. A move is
//! legal only when the target appears in the source state's entry.
//!
//! ```text
//! draft             -> awaiting_approval
//! awaiting_approval -> approved | draft
//! approved          -> in_qa
//! in_qa             -> ready | qa_failed
//! qa_failed         -> in_qa
//! ready             -> published
//! published         -> archived
//! archived          -> (none)
//! ```

use super::errors::{invalid_transition, StateMachineResult};
use super::states::DeliverableState;
use crate::models::Deliverable;
use chrono::Utc;

/// States reachable in one step from `from`
pub fn allowed_transitions(from: DeliverableState) -> &'static [DeliverableState] {
    use DeliverableState::*;

    match from {
        Draft => &[AwaitingApproval],
        AwaitingApproval => &[Approved, Draft],
        Approved => &[InQa],
        InQa => &[Ready, QaFailed],
        QaFailed => &[InQa],
        Ready => &[Published],
        Published => &[Archived],
        Archived => &[],
    }
}

impl DeliverableState {
    pub fn allowed_transitions(&self) -> &'static [DeliverableState] {
        allowed_transitions(*self)
    }

    pub fn can_transition_to(&self, target: DeliverableState) -> bool {
        allowed_transitions(*self).contains(&target)
    }
}

/// Validate `current -> target` against the table
pub fn validate_transition(
    current: DeliverableState,
    target: DeliverableState,
) -> StateMachineResult<()> {
    if current.can_transition_to(target) {
        Ok(())
    } else {
        Err(invalid_transition(current, target))
    }
}

/// Return a copy of `deliverable` moved to `target`, stamped with the current time.
///
/// The input is never modified; an illegal edge yields `InvalidTransition`.
pub fn transition(
    deliverable: &Deliverable,
    target: DeliverableState,
) -> StateMachineResult<Deliverable> {
    validate_transition(deliverable.status, target)?;

    let mut updated = deliverable.clone();
    updated.status = target;
    updated.updated_at = Utc::now();
    Ok(updated)
}
