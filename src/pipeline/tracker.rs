//! # Pipeline Stage Tracker
//!
//! Pure transformations over [`Factory`] values: bootstrap, blocker evaluation,
//! stage advance, deliverable updates and delivery. Nothing here touches
//! storage; [`FactoryService`](crate::services::FactoryService) loads, applies
//! and saves.
//!
//! ## Status flow
//!
//! ```text
//! IDLE -> ACTIVE <-> BLOCKED -> COMPLETED -> DELIVERED
//! ```
//!
//! - Advancing from the last stage always completes the factory.
//! - Advancing elsewhere is refused while any blocker exists; the factory is
//!   parked in BLOCKED with the blockers recorded and its stage unchanged.
//! - A deliverable update recomputes blockers before returning, so the
//!   returned factory's status already reflects the update.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::errors::{invalid_factory_state, PipelineError, PipelineResult};
use super::registry::TemplateRegistry;
use super::signals::ExternalSignalSource;
use crate::constants::blockers::{CONFIGURATION_ERROR_PREFIX, MISSING_DELIVERABLES_PREFIX};
use crate::models::{Factory, FactoryDeliverable, FactoryLogEvent};
use crate::state_machine::{FactoryStatus, StageDeliverableStatus};

pub struct PipelineTracker {
    registry: Arc<TemplateRegistry>,
    signals: Arc<dyn ExternalSignalSource>,
}

impl PipelineTracker {
    pub fn new(registry: Arc<TemplateRegistry>, signals: Arc<dyn ExternalSignalSource>) -> Self {
        debug!(
            templates = registry.len(),
            signal_source = signals.name(),
            "Creating PipelineTracker"
        );
        Self { registry, signals }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Bootstrap a factory for `contract_id` on `template_id`.
    ///
    /// Every template deliverable is seeded as PENDING and the factory starts
    /// ACTIVE on the template's first stage with a single BOOTSTRAP log entry.
    pub fn create_factory(
        &self,
        contract_id: impl Into<String>,
        client_name: impl Into<String>,
        template_id: &str,
    ) -> PipelineResult<Factory> {
        let template = self.registry.require(template_id)?;
        let first_stage = self.registry.first_stage(template_id)?;
        let now = chrono::Utc::now();

        let mut factory = Factory {
            id: Uuid::new_v4(),
            contract_id: contract_id.into(),
            client_name: client_name.into(),
            template_id: template.id.clone(),
            current_stage_id: first_stage.id.clone(),
            status: FactoryStatus::Idle,
            deliverables: template
                .deliverables
                .iter()
                .map(|d| FactoryDeliverable {
                    id: d.id.clone(),
                    name: d.name.clone(),
                    kind: d.kind.clone(),
                    status: StageDeliverableStatus::Pending,
                })
                .collect(),
            blockers: Vec::new(),
            logs: Vec::new(),
            started_at: now,
            last_updated: now,
            assignee_id: None,
            final_deliverable_id: None,
        };

        factory.status = FactoryStatus::Active;
        factory.record(
            FactoryLogEvent::Bootstrap,
            format!(
                "Factory bootstrapped for {} on '{}' at stage '{}'",
                factory.client_name, template.name, first_stage.name
            ),
        );

        crate::log_factory!(info, "bootstrap",
            factory_id: factory.id,
            contract_id: factory.contract_id,
            template_id: factory.template_id,
            stage_id: factory.current_stage_id
        );

        Ok(factory)
    }

    /// Reasons the factory cannot leave its current stage.
    ///
    /// Configuration problems (unknown template or stage) come back as a
    /// single blocker string rather than an error so callers always have
    /// something to show. Otherwise the list holds at most one aggregated
    /// "Missing deliverables" entry followed by any external signals.
    pub fn check_blockers(&self, factory: &Factory) -> Vec<String> {
        let template = match self.registry.require(&factory.template_id) {
            Ok(template) => template,
            Err(err) => return vec![configuration_blocker(&err)],
        };
        let Some(stage) = template.stage(&factory.current_stage_id) else {
            return vec![configuration_blocker(&PipelineError::StageNotFound {
                template_id: factory.template_id.clone(),
                stage_id: factory.current_stage_id.clone(),
            })];
        };

        let missing: Vec<&str> = stage
            .required_deliverables
            .iter()
            .filter(|required| {
                !factory
                    .deliverable(required)
                    .is_some_and(|d| d.status.satisfies_stage())
            })
            .map(String::as_str)
            .collect();

        let mut blockers = Vec::new();
        if !missing.is_empty() {
            blockers.push(format!("{MISSING_DELIVERABLES_PREFIX}{}", missing.join(", ")));
        }

        let external = self.signals.blockers_for(factory);
        if !external.is_empty() {
            debug!(
                factory_id = %factory.id,
                source = self.signals.name(),
                count = external.len(),
                "External blockers reported"
            );
            blockers.extend(external);
        }

        blockers
    }

    /// Move the factory to its next stage, complete it, or park it as BLOCKED.
    ///
    /// A COMPLETED factory is returned unchanged; a DELIVERED one is rejected.
    pub fn advance_stage(&self, factory: &Factory) -> PipelineResult<Factory> {
        if factory.status.is_terminal() {
            return Err(invalid_factory_state(
                factory.id,
                factory.status,
                "advance stage",
            ));
        }

        if factory.status == FactoryStatus::Completed {
            debug!(factory_id = %factory.id, "Factory already completed; advance is a no-op");
            return Ok(factory.clone());
        }

        let mut next = factory.clone();

        if self
            .registry
            .is_last_stage(&factory.template_id, &factory.current_stage_id)
        {
            next.status = FactoryStatus::Completed;
            next.blockers.clear();
            next.record(
                FactoryLogEvent::Advance,
                format!(
                    "Final stage '{}' finished; factory completed",
                    factory.current_stage_id
                ),
            );
            crate::log_factory!(info, "complete",
                factory_id: next.id,
                stage_id: next.current_stage_id
            );
            return Ok(next);
        }

        let blockers = self.check_blockers(factory);
        if !blockers.is_empty() {
            next.status = FactoryStatus::Blocked;
            next.record(
                FactoryLogEvent::Block,
                format!("Advance blocked: {}", blockers.join("; ")),
            );
            next.blockers = blockers;
            crate::log_factory!(warn, "block",
                factory_id: next.id,
                stage_id: next.current_stage_id,
                blockers: next.blockers
            );
            return Ok(next);
        }

        let following = self
            .registry
            .next_stage(&factory.template_id, &factory.current_stage_id)?
            .ok_or_else(|| PipelineError::StageNotFound {
                template_id: factory.template_id.clone(),
                stage_id: factory.current_stage_id.clone(),
            })?;

        next.current_stage_id = following.id.clone();
        next.status = FactoryStatus::Active;
        next.blockers.clear();
        next.record(
            FactoryLogEvent::Advance,
            format!(
                "Advanced from '{}' to '{}'",
                factory.current_stage_id, following.name
            ),
        );
        crate::log_factory!(info, "advance",
            factory_id: next.id,
            from_stage: factory.current_stage_id,
            to_stage: next.current_stage_id
        );

        Ok(next)
    }

    /// Move one tracked deliverable forward to `requested`.
    ///
    /// Statuses only move forward (`PENDING -> READY -> APPROVED`); a request
    /// at or behind the current status, and any request against an APPROVED
    /// deliverable, returns the factory unchanged. After a change the blockers
    /// are recomputed in the same call.
    pub fn update_deliverable_status(
        &self,
        factory: &Factory,
        deliverable_id: &str,
        requested: StageDeliverableStatus,
    ) -> PipelineResult<Factory> {
        if !factory.status.is_in_progress() {
            return Err(invalid_factory_state(
                factory.id,
                factory.status,
                "update deliverables",
            ));
        }

        let current = factory
            .deliverable(deliverable_id)
            .ok_or_else(|| PipelineError::DeliverableNotFound {
                factory_id: factory.id,
                deliverable_id: deliverable_id.to_string(),
            })?
            .status;

        if current == StageDeliverableStatus::Approved || requested <= current {
            debug!(
                factory_id = %factory.id,
                deliverable_id,
                current = %current,
                requested = %requested,
                "Deliverable update is a no-op"
            );
            return Ok(factory.clone());
        }

        let mut next = factory.clone();
        let name = match next.deliverable_mut(deliverable_id) {
            Some(deliverable) => {
                deliverable.status = requested;
                deliverable.name.clone()
            }
            None => {
                return Err(PipelineError::DeliverableNotFound {
                    factory_id: factory.id,
                    deliverable_id: deliverable_id.to_string(),
                })
            }
        };
        next.record(
            FactoryLogEvent::Update,
            format!("Deliverable '{name}' marked {requested}"),
        );
        crate::log_factory!(info, "update_deliverable",
            factory_id: next.id,
            deliverable_id: deliverable_id,
            from_status: current,
            to_status: requested
        );

        self.apply_blockers(&mut next);
        Ok(next)
    }

    /// Cycle a deliverable one step: PENDING -> READY -> APPROVED, saturating
    pub fn advance_deliverable(
        &self,
        factory: &Factory,
        deliverable_id: &str,
    ) -> PipelineResult<Factory> {
        let current = factory
            .deliverable(deliverable_id)
            .ok_or_else(|| PipelineError::DeliverableNotFound {
                factory_id: factory.id,
                deliverable_id: deliverable_id.to_string(),
            })?
            .status;
        self.update_deliverable_status(factory, deliverable_id, current.next())
    }

    /// Re-run blocker evaluation without advancing.
    ///
    /// Factories past their last stage are returned unchanged.
    pub fn reevaluate(&self, factory: &Factory) -> Factory {
        let mut next = factory.clone();
        if factory.status.is_in_progress() {
            self.apply_blockers(&mut next);
        }
        next
    }

    /// Fail unless the factory may produce its final deliverable
    pub fn ensure_ready_for_delivery(&self, factory: &Factory) -> PipelineResult<()> {
        if factory.status == FactoryStatus::Completed {
            Ok(())
        } else {
            Err(invalid_factory_state(
                factory.id,
                factory.status,
                "create final deliverable",
            ))
        }
    }

    /// Record the terminal deliverable and move the factory to DELIVERED
    pub fn mark_delivered(
        &self,
        factory: &Factory,
        final_deliverable_id: Uuid,
    ) -> PipelineResult<Factory> {
        self.ensure_ready_for_delivery(factory)?;

        let mut next = factory.clone();
        next.status = FactoryStatus::Delivered;
        next.final_deliverable_id = Some(final_deliverable_id);
        next.record(
            FactoryLogEvent::Deliver,
            format!("Final deliverable {final_deliverable_id} produced; awaiting client approval"),
        );
        crate::log_factory!(info, "deliver",
            factory_id: next.id,
            final_deliverable_id: final_deliverable_id
        );
        Ok(next)
    }

    /// Recompute blockers in place and keep `status` consistent with them
    fn apply_blockers(&self, factory: &mut Factory) {
        let blockers = self.check_blockers(factory);
        let was_blocked = factory.is_blocked();

        if blockers.is_empty() {
            factory.status = FactoryStatus::Active;
            factory.blockers.clear();
            if was_blocked {
                factory.record(FactoryLogEvent::Unblock, "Blockers cleared");
            }
        } else {
            if !was_blocked || factory.blockers != blockers {
                factory.record(
                    FactoryLogEvent::Block,
                    format!("Blocked: {}", blockers.join("; ")),
                );
            }
            factory.status = FactoryStatus::Blocked;
            factory.blockers = blockers;
        }
    }
}

fn configuration_blocker(err: &PipelineError) -> String {
    format!("{CONFIGURATION_ERROR_PREFIX}{err}")
}
