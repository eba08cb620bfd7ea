use std::sync::Arc;

use super::{
    context::TransitionContext,
    errors::{PersistenceError, StateMachineResult},
    persistence::TransitionPersistence,
    states::DeliverableState,
    transitions,
};
use crate::constants::{entities, events};
use crate::events::EventPublisher;
use crate::models::Deliverable;
use crate::storage::DeliverableStore;

/// Deliverable state machine: validates, persists, audits and announces each move
pub struct DeliverableStateMachine {
    deliverable: Deliverable,
    store: Arc<dyn DeliverableStore>,
    persistence: Arc<dyn TransitionPersistence>,
    event_publisher: EventPublisher,
}

impl DeliverableStateMachine {
    pub fn new(
        deliverable: Deliverable,
        store: Arc<dyn DeliverableStore>,
        persistence: Arc<dyn TransitionPersistence>,
        event_publisher: EventPublisher,
    ) -> Self {
        Self {
            deliverable,
            store,
            persistence,
            event_publisher,
        }
    }

    pub fn current_state(&self) -> DeliverableState {
        self.deliverable.status
    }

    /// Attempt to move the deliverable to `target`.
    ///
    /// The table is checked before anything is written. The record is saved
    /// first, then the audit entry is appended. When the append fails the
    /// previous record is saved back, so a `PersistenceFailed` result leaves
    /// both the store and the machine at the previous state.
    pub async fn transition(
        &mut self,
        target: DeliverableState,
        context: Option<TransitionContext>,
    ) -> StateMachineResult<Deliverable> {
        let from_state = self.current_state();
        let updated = transitions::transition(&self.deliverable, target)?;
        let entity_id = updated.id.to_string();

        let saved = self.store.save_deliverable(&updated).await.map_err(|e| {
            crate::log_deliverable!(error, "transition_save_failed",
                deliverable_id: entity_id,
                from_state: from_state,
                to_state: target,
                error: e.to_string()
            );
            PersistenceError::RecordSaveFailed {
                entity_type: entities::DELIVERABLE.to_string(),
                entity_id: entity_id.clone(),
                reason: e.to_string(),
            }
        })?;

        let metadata = serde_json::json!({
            "event": "transition",
            "timestamp": saved.updated_at,
        });
        let metadata = match &context {
            Some(context) => context.merge_into_metadata(metadata),
            None => metadata,
        };

        let audit = self
            .persistence
            .persist_transition(
                entities::DELIVERABLE,
                &entity_id,
                Some(from_state.to_string()),
                target.to_string(),
                Some(metadata.clone()),
            )
            .await;
        if let Err(err) = audit {
            self.restore_previous(&entity_id, &err).await;
            return Err(err.into());
        }

        self.event_publisher.publish(
            format!("{}.{}", events::DELIVERABLE_PREFIX, target),
            entity_id.clone(),
            serde_json::json!({
                "from_state": from_state,
                "to_state": target,
                "metadata": metadata,
            }),
        );

        crate::log_deliverable!(info, "transition",
            deliverable_id: entity_id,
            from_state: from_state,
            to_state: target
        );

        self.deliverable = saved.clone();
        Ok(saved)
    }

    /// Put the pre-transition record back after the audit append failed
    async fn restore_previous(&self, entity_id: &str, cause: &PersistenceError) {
        match self.store.save_deliverable(&self.deliverable).await {
            Ok(_) => {
                crate::log_deliverable!(warn, "transition_rolled_back",
                    deliverable_id: entity_id,
                    restored_state: self.deliverable.status,
                    cause: cause.to_string()
                );
            }
            Err(e) => {
                crate::log_deliverable!(error, "rollback_failed",
                    deliverable_id: entity_id,
                    cause: cause.to_string(),
                    error: e.to_string()
                );
            }
        }
    }

    /// Check if the deliverable is in a terminal state
    pub fn is_terminal(&self) -> bool {
        self.current_state().is_terminal()
    }

    pub fn deliverable(&self) -> &Deliverable {
        &self.deliverable
    }
}
