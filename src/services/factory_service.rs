//! # Factory Service
//!
//! Load, apply, save. Each flow reads the stored factory, runs the matching
//! [`PipelineTracker`] transformation and persists the result. A failed save
//! is logged and returned as `PersistenceFailure`; the stored factory keeps
//! its previous value.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::deliverable_service::DeliverableService;
use crate::constants::{events, DeliverableStatus, FactoryStatus, StageDeliverableStatus};
use crate::error::{BundlrError, Result};
use crate::events::EventPublisher;
use crate::models::{Deliverable, Factory};
use crate::pipeline::PipelineTracker;
use crate::state_machine::{TransitionContext, TransitionPersistence};
use crate::storage::{DeliverableStore, FactoryStore};

#[derive(Clone)]
pub struct FactoryService {
    tracker: Arc<PipelineTracker>,
    store: Arc<dyn FactoryStore>,
    deliverables: DeliverableService,
    event_publisher: EventPublisher,
}

impl FactoryService {
    pub fn new(
        tracker: Arc<PipelineTracker>,
        store: Arc<dyn FactoryStore>,
        deliverables: DeliverableService,
        event_publisher: EventPublisher,
    ) -> Self {
        Self {
            tracker,
            store,
            deliverables,
            event_publisher,
        }
    }

    /// Wire both services over a single backing store
    pub fn with_store<S>(
        tracker: Arc<PipelineTracker>,
        store: Arc<S>,
        event_publisher: EventPublisher,
    ) -> Self
    where
        S: FactoryStore + DeliverableStore + TransitionPersistence + 'static,
    {
        let deliverables =
            DeliverableService::new(store.clone(), store.clone(), event_publisher.clone());
        Self::new(tracker, store, deliverables, event_publisher)
    }

    pub fn tracker(&self) -> &PipelineTracker {
        &self.tracker
    }

    pub fn deliverables(&self) -> &DeliverableService {
        &self.deliverables
    }

    pub fn event_publisher(&self) -> &EventPublisher {
        &self.event_publisher
    }

    pub async fn bootstrap(
        &self,
        contract_id: impl Into<String>,
        client_name: impl Into<String>,
        template_id: &str,
    ) -> Result<Factory> {
        let factory = self
            .tracker
            .create_factory(contract_id, client_name, template_id)?;
        let saved = self.persist(&factory, "bootstrap").await?;

        self.publish(
            events::FACTORY_BOOTSTRAPPED,
            &saved,
            json!({
                "contract_id": saved.contract_id,
                "template_id": saved.template_id,
                "stage_id": saved.current_stage_id,
            }),
        );
        Ok(saved)
    }

    pub async fn load(&self, factory_id: Uuid) -> Result<Factory> {
        self.store
            .load_factory(factory_id)
            .await?
            .ok_or_else(|| BundlrError::NotFound(format!("factory {factory_id}")))
    }

    /// Every stored factory, most recently updated first
    pub async fn list(&self) -> Result<Vec<Factory>> {
        Ok(self.store.list_factories().await?)
    }

    /// Current blockers of a stored factory, without saving anything
    pub async fn check_blockers(&self, factory_id: Uuid) -> Result<Vec<String>> {
        let factory = self.load(factory_id).await?;
        Ok(self.tracker.check_blockers(&factory))
    }

    pub async fn advance(&self, factory_id: Uuid) -> Result<Factory> {
        let factory = self.load(factory_id).await?;
        let next = self.tracker.advance_stage(&factory)?;
        if next == factory {
            return Ok(factory);
        }
        let saved = self.persist(&next, "advance").await?;

        let event = match saved.status {
            FactoryStatus::Completed => events::FACTORY_COMPLETED,
            FactoryStatus::Blocked => events::FACTORY_BLOCKED,
            _ => events::FACTORY_ADVANCED,
        };
        self.publish(
            event,
            &saved,
            json!({
                "from_stage": factory.current_stage_id,
                "stage_id": saved.current_stage_id,
                "blockers": saved.blockers,
            }),
        );
        Ok(saved)
    }

    /// Move one tracked deliverable forward; a no-op update is not saved
    pub async fn update_deliverable(
        &self,
        factory_id: Uuid,
        deliverable_id: &str,
        status: StageDeliverableStatus,
    ) -> Result<Factory> {
        let factory = self.load(factory_id).await?;
        let next = self
            .tracker
            .update_deliverable_status(&factory, deliverable_id, status)?;
        self.save_deliverable_update(factory, next, deliverable_id)
            .await
    }

    /// Cycle a tracked deliverable one step forward
    pub async fn advance_deliverable(
        &self,
        factory_id: Uuid,
        deliverable_id: &str,
    ) -> Result<Factory> {
        let factory = self.load(factory_id).await?;
        let next = self.tracker.advance_deliverable(&factory, deliverable_id)?;
        self.save_deliverable_update(factory, next, deliverable_id)
            .await
    }

    async fn save_deliverable_update(
        &self,
        before: Factory,
        next: Factory,
        deliverable_id: &str,
    ) -> Result<Factory> {
        if next == before {
            return Ok(before);
        }

        let saved = self.persist(&next, "update_deliverable").await?;
        self.publish(
            events::FACTORY_DELIVERABLE_UPDATED,
            &saved,
            json!({
                "deliverable_id": deliverable_id,
                "deliverable_status": saved.deliverable(deliverable_id).map(|d| d.status),
                "factory_status": saved.status,
                "blockers": saved.blockers,
            }),
        );
        Ok(saved)
    }

    /// Re-run blocker evaluation and persist a move into or out of BLOCKED.
    ///
    /// Factories that are not in progress, and evaluations that change
    /// nothing, are returned as stored.
    pub async fn reevaluate(&self, factory_id: Uuid) -> Result<Factory> {
        let factory = self.load(factory_id).await?;
        let next = self.tracker.reevaluate(&factory);
        if next == factory {
            debug!(factory_id = %factory_id, status = %factory.status, "Blockers unchanged");
            return Ok(factory);
        }

        let saved = self.persist(&next, "reevaluate").await?;
        let event = if saved.is_blocked() {
            events::FACTORY_BLOCKED
        } else {
            events::FACTORY_UNBLOCKED
        };
        self.publish(event, &saved, json!({ "blockers": saved.blockers }));
        Ok(saved)
    }

    pub async fn assign(&self, factory_id: Uuid, assignee_id: impl Into<String>) -> Result<Factory> {
        let mut factory = self.load(factory_id).await?;
        factory.assignee_id = Some(assignee_id.into());
        factory.last_updated = chrono::Utc::now();
        self.persist(&factory, "assign").await
    }

    /// Produce the terminal deliverable of a COMPLETED factory.
    ///
    /// The deliverable is created as a draft, submitted for client approval
    /// and linked to the factory, which moves to DELIVERED. When an earlier
    /// attempt left an unlinked final deliverable behind (the factory save
    /// failed), that deliverable is reused so a retry never produces a second
    /// one.
    pub async fn create_final_deliverable(&self, factory_id: Uuid) -> Result<(Factory, Deliverable)> {
        let factory = self.load(factory_id).await?;
        self.tracker.ensure_ready_for_delivery(&factory)?;

        let submitted = self.submit_final_deliverable(&factory).await?;

        let delivered = self.tracker.mark_delivered(&factory, submitted.id)?;
        let saved = self.persist(&delivered, "deliver").await?;

        self.publish(
            events::FACTORY_DELIVERED,
            &saved,
            json!({ "final_deliverable_id": submitted.id }),
        );
        Ok((saved, submitted))
    }

    /// The factory's final deliverable in `awaiting_approval`, created on first use
    async fn submit_final_deliverable(&self, factory: &Factory) -> Result<Deliverable> {
        let pending = self
            .deliverables
            .list_for_factory(factory.id)
            .await?
            .into_iter()
            .rev()
            .find(|d| {
                matches!(
                    d.status,
                    DeliverableStatus::Draft | DeliverableStatus::AwaitingApproval
                )
            });

        let draft = match pending {
            Some(existing) if existing.status == DeliverableStatus::AwaitingApproval => {
                crate::log_factory!(info, "reuse_final_deliverable",
                    factory_id: factory.id,
                    deliverable_id: existing.id
                );
                return Ok(existing);
            }
            Some(existing) => existing,
            None => {
                let template_name = self
                    .tracker
                    .registry()
                    .get(&factory.template_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| factory.template_id.clone());
                self.deliverables
                    .create_for_factory(
                        format!("{} - {}", factory.client_name, template_name),
                        factory.id,
                    )
                    .await?
            }
        };

        let context = TransitionContext::with_correlation_id(factory.id)
            .reason("final deliverable produced by factory");
        self.deliverables
            .transition(draft.id, DeliverableStatus::AwaitingApproval, Some(context))
            .await
    }

    async fn persist(&self, factory: &Factory, operation: &str) -> Result<Factory> {
        self.store.save_factory(factory).await.map_err(|e| {
            crate::log_factory!(error, "persist_failed",
                factory_id: factory.id,
                during: operation,
                error: e.to_string()
            );
            BundlrError::from(e)
        })
    }

    fn publish(&self, event: &str, factory: &Factory, context: serde_json::Value) {
        let mut payload = json!({
            "status": factory.status,
            "stage_id": factory.current_stage_id,
        });
        if let (Some(payload), serde_json::Value::Object(extra)) = (payload.as_object_mut(), context) {
            payload.extend(extra);
        }
        self.event_publisher
            .publish(event, factory.id.to_string(), payload);
    }
}
