use super::errors::PersistenceResult;
use crate::models::TransitionRecord;
use async_trait::async_trait;
use serde_json::Value;

/// Append-only audit log of state transitions.
///
/// Implementations assign a per-entity `sort_key` so history can be replayed in
/// order; records are never updated or removed.
#[async_trait]
pub trait TransitionPersistence: Send + Sync {
    /// Persist a state transition
    async fn persist_transition(
        &self,
        entity_type: &str,
        entity_id: &str,
        from_state: Option<String>,
        to_state: String,
        metadata: Option<Value>,
    ) -> PersistenceResult<TransitionRecord>;

    /// Every recorded transition for the entity, oldest first
    async fn transition_history(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> PersistenceResult<Vec<TransitionRecord>>;

    /// The most recent `to_state` recorded for the entity
    async fn resolve_current_state(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> PersistenceResult<Option<String>> {
        let history = self.transition_history(entity_type, entity_id).await?;
        Ok(history.last().map(|record| record.to_state.clone()))
    }
}
