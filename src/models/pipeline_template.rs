//! # Pipeline Templates
//!
//! A pipeline template is an ordered list of stages plus the deliverables a
//! factory built from it will track. Each stage names the deliverables that must
//! be READY or APPROVED before the factory may leave it.
//!
//! Templates are immutable once a factory references them; the
//! [`TemplateRegistry`](crate::pipeline::TemplateRegistry) validates them once
//! at construction and only hands out shared references afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::constants::templates;
use crate::pipeline::PipelineError;

/// A deliverable every factory on the template starts out tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverableTemplate {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTemplate {
    pub id: String,
    pub name: String,
    pub order: u32,
    /// Ids of [`DeliverableTemplate`]s gating exit from this stage
    #[serde(default)]
    pub required_deliverables: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTemplate {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub deliverables: Vec<DeliverableTemplate>,
    pub stages: Vec<StageTemplate>,
}

impl PipelineTemplate {
    /// Check structural invariants: at least one stage, unique stage ids and
    /// orders, unique deliverable ids, and every required id configured.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let invalid = |reason: String| PipelineError::InvalidTemplate {
            template_id: self.id.clone(),
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("template id must not be empty".to_string()));
        }
        if self.stages.is_empty() {
            return Err(invalid("template has no stages".to_string()));
        }

        let mut deliverable_ids = HashSet::new();
        for deliverable in &self.deliverables {
            if !deliverable_ids.insert(deliverable.id.as_str()) {
                return Err(invalid(format!(
                    "duplicate deliverable id '{}'",
                    deliverable.id
                )));
            }
        }

        let mut stage_ids = HashSet::new();
        let mut orders = HashSet::new();
        for stage in &self.stages {
            if !stage_ids.insert(stage.id.as_str()) {
                return Err(invalid(format!("duplicate stage id '{}'", stage.id)));
            }
            if !orders.insert(stage.order) {
                return Err(invalid(format!(
                    "stage '{}' reuses order {}",
                    stage.id, stage.order
                )));
            }
            if let Some(unknown) = stage
                .required_deliverables
                .iter()
                .find(|id| !deliverable_ids.contains(id.as_str()))
            {
                return Err(invalid(format!(
                    "stage '{}' requires unknown deliverable '{}'",
                    stage.id, unknown
                )));
            }
        }

        Ok(())
    }

    /// Stages sorted by `order`
    pub fn ordered_stages(&self) -> Vec<&StageTemplate> {
        let mut stages: Vec<&StageTemplate> = self.stages.iter().collect();
        stages.sort_by_key(|stage| stage.order);
        stages
    }

    pub fn first_stage(&self) -> Option<&StageTemplate> {
        self.stages.iter().min_by_key(|stage| stage.order)
    }

    pub fn last_stage(&self) -> Option<&StageTemplate> {
        self.stages.iter().max_by_key(|stage| stage.order)
    }

    pub fn stage(&self, stage_id: &str) -> Option<&StageTemplate> {
        self.stages.iter().find(|stage| stage.id == stage_id)
    }

    /// Zero-based position of the stage in execution order
    pub fn stage_index(&self, stage_id: &str) -> Option<usize> {
        self.ordered_stages()
            .iter()
            .position(|stage| stage.id == stage_id)
    }

    /// The stage after `stage_id`, or None at the end or for an unknown id
    pub fn next_stage(&self, stage_id: &str) -> Option<&StageTemplate> {
        let ordered = self.ordered_stages();
        let index = ordered.iter().position(|stage| stage.id == stage_id)?;
        ordered.get(index + 1).copied()
    }

    pub fn is_last_stage(&self, stage_id: &str) -> bool {
        self.last_stage().is_some_and(|stage| stage.id == stage_id)
    }

    pub fn deliverable(&self, deliverable_id: &str) -> Option<&DeliverableTemplate> {
        self.deliverables.iter().find(|d| d.id == deliverable_id)
    }

    /// Design doc at stage 0, prototype unit at stage 1
    pub fn two_stage_prototype() -> Self {
        Self {
            id: templates::TWO_STAGE_PROTOTYPE.to_string(),
            name: "Two-Stage Prototype".to_string(),
            description: Some("Design sign-off followed by a prototype build".to_string()),
            deliverables: vec![
                deliverable("design-doc", "Design Document", "document"),
                deliverable("proto-unit", "Prototype Unit", "artifact"),
            ],
            stages: vec![
                stage("design", "Design", 0, &["design-doc"]),
                stage("prototype", "Prototype", 1, &["proto-unit"]),
            ],
        }
    }

    /// Retainer content engagement from intake to hand-off
    pub fn standard_content() -> Self {
        Self {
            id: templates::STANDARD_CONTENT.to_string(),
            name: "Standard Content Engagement".to_string(),
            description: Some("Brief, plan, produce, review and deliver client content".to_string()),
            deliverables: vec![
                deliverable("creative-brief", "Creative Brief", "document"),
                deliverable("content-calendar", "Content Calendar", "document"),
                deliverable("draft-assets", "Draft Assets", "asset_bundle"),
                deliverable("final-assets", "Final Assets", "asset_bundle"),
            ],
            stages: vec![
                stage("intake", "Intake", 0, &["creative-brief"]),
                stage("planning", "Planning", 1, &["content-calendar"]),
                stage("production", "Production", 2, &["draft-assets"]),
                stage("review", "Client Review", 3, &["final-assets"]),
                stage("delivery", "Delivery", 4, &[]),
            ],
        }
    }

    /// Templates shipped with the crate
    pub fn builtin() -> Vec<Self> {
        vec![Self::two_stage_prototype(), Self::standard_content()]
    }
}

fn deliverable(id: &str, name: &str, kind: &str) -> DeliverableTemplate {
    DeliverableTemplate {
        id: id.to_string(),
        name: name.to_string(),
        kind: kind.to_string(),
    }
}

fn stage(id: &str, name: &str, order: u32, required: &[&str]) -> StageTemplate {
    StageTemplate {
        id: id.to_string(),
        name: name.to_string(),
        order,
        required_deliverables: required.iter().map(|r| r.to_string()).collect(),
    }
}
