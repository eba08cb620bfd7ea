use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::constants::{entities, events, DeliverableStatus};
use crate::error::{BundlrError, Result};
use crate::events::EventPublisher;
use crate::models::{Deliverable, TransitionRecord};
use crate::state_machine::{DeliverableStateMachine, TransitionContext, TransitionPersistence};
use crate::storage::DeliverableStore;

/// Create, load and move deliverables through their approval lifecycle
#[derive(Clone)]
pub struct DeliverableService {
    store: Arc<dyn DeliverableStore>,
    persistence: Arc<dyn TransitionPersistence>,
    event_publisher: EventPublisher,
}

impl DeliverableService {
    pub fn new(
        store: Arc<dyn DeliverableStore>,
        persistence: Arc<dyn TransitionPersistence>,
        event_publisher: EventPublisher,
    ) -> Self {
        Self {
            store,
            persistence,
            event_publisher,
        }
    }

    /// New standalone draft for a client
    pub async fn create_draft(
        &self,
        title: impl Into<String>,
        client_id: Option<Uuid>,
    ) -> Result<Deliverable> {
        self.create(Deliverable::new_draft(title, client_id)).await
    }

    /// New draft produced by a factory
    pub async fn create_for_factory(
        &self,
        title: impl Into<String>,
        factory_id: Uuid,
    ) -> Result<Deliverable> {
        self.create(Deliverable::for_factory(title, factory_id))
            .await
    }

    async fn create(&self, deliverable: Deliverable) -> Result<Deliverable> {
        let saved = self.store.save_deliverable(&deliverable).await?;
        let entity_id = saved.id.to_string();

        // Initial audit entry has no from_state
        let audit = self
            .persistence
            .persist_transition(
                entities::DELIVERABLE,
                &entity_id,
                None,
                saved.status.to_string(),
                None,
            )
            .await;
        if let Err(err) = audit {
            if let Err(e) = self.store.delete_deliverable(saved.id).await {
                crate::log_deliverable!(error, "create_rollback_failed",
                    deliverable_id: entity_id,
                    error: e.to_string()
                );
            }
            return Err(err.into());
        }

        self.event_publisher.publish(
            events::DELIVERABLE_CREATED,
            entity_id.clone(),
            serde_json::json!({
                "title": saved.title,
                "factory_id": saved.factory_id,
                "client_id": saved.client_id,
            }),
        );

        crate::log_deliverable!(info, "create",
            deliverable_id: entity_id,
            title: saved.title
        );

        Ok(saved)
    }

    pub async fn load(&self, deliverable_id: Uuid) -> Result<Deliverable> {
        self.store
            .load_deliverable(deliverable_id)
            .await?
            .ok_or_else(|| BundlrError::NotFound(format!("deliverable {deliverable_id}")))
    }

    /// Move a stored deliverable to `target`.
    ///
    /// Fails with `InvalidTransition` when the edge is not allowed and with
    /// `PersistenceFailure` when either the record save or the audit append
    /// is rejected; in both cases the stored record keeps its previous status.
    pub async fn transition(
        &self,
        deliverable_id: Uuid,
        target: DeliverableStatus,
        context: Option<TransitionContext>,
    ) -> Result<Deliverable> {
        let deliverable = self.load(deliverable_id).await?;
        debug!(
            deliverable_id = %deliverable_id,
            from_state = %deliverable.status,
            to_state = %target,
            "Requesting deliverable transition"
        );

        let mut machine = DeliverableStateMachine::new(
            deliverable,
            self.store.clone(),
            self.persistence.clone(),
            self.event_publisher.clone(),
        );
        Ok(machine.transition(target, context).await?)
    }

    /// Audit trail, oldest first
    pub async fn history(&self, deliverable_id: Uuid) -> Result<Vec<TransitionRecord>> {
        Ok(self
            .persistence
            .transition_history(entities::DELIVERABLE, &deliverable_id.to_string())
            .await?)
    }

    pub async fn list_for_factory(&self, factory_id: Uuid) -> Result<Vec<Deliverable>> {
        Ok(self.store.list_deliverables_for_factory(factory_id).await?)
    }
}
