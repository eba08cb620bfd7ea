//! # Factory Model
//!
//! A running instance of a pipeline template tracking one client contract
//! through its stages.
//!
//! ## Invariants
//!
//! - `current_stage_id` references a stage of the template named by `template_id`
//! - `blockers` is non-empty exactly when `status` is `BLOCKED`
//! - `logs` is append-only and ordered by `timestamp`
//!
//! Deliverable ids inside a factory are the template's deliverable ids, so
//! they are unique per factory rather than globally; the pair
//! `(factory.id, deliverable.id)` identifies a tracked deliverable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::state_machine::{FactoryStatus, StageDeliverableStatus};

/// A deliverable tracked inside a factory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryDeliverable {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: StageDeliverableStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactoryLogEvent {
    Bootstrap,
    Advance,
    Block,
    Unblock,
    Update,
    Deliver,
}

impl fmt::Display for FactoryLogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Bootstrap => "BOOTSTRAP",
            Self::Advance => "ADVANCE",
            Self::Block => "BLOCK",
            Self::Unblock => "UNBLOCK",
            Self::Update => "UPDATE",
            Self::Deliver => "DELIVER",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: FactoryLogEvent,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factory {
    pub id: Uuid,
    pub contract_id: String,
    pub client_name: String,
    pub template_id: String,
    pub current_stage_id: String,
    pub status: FactoryStatus,
    pub deliverables: Vec<FactoryDeliverable>,
    pub blockers: Vec<String>,
    pub logs: Vec<FactoryLogEntry>,
    pub started_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    /// Set once the terminal deliverable has been produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_deliverable_id: Option<Uuid>,
}

impl Factory {
    pub fn deliverable(&self, deliverable_id: &str) -> Option<&FactoryDeliverable> {
        self.deliverables.iter().find(|d| d.id == deliverable_id)
    }

    pub(crate) fn deliverable_mut(&mut self, deliverable_id: &str) -> Option<&mut FactoryDeliverable> {
        self.deliverables.iter_mut().find(|d| d.id == deliverable_id)
    }

    /// Append a log entry and bump `last_updated`
    pub(crate) fn record(&mut self, event: FactoryLogEvent, message: impl Into<String>) {
        let now = Utc::now();
        self.logs.push(FactoryLogEntry {
            id: Uuid::new_v4(),
            timestamp: now,
            event,
            message: message.into(),
        });
        self.last_updated = now;
    }

    pub fn is_blocked(&self) -> bool {
        self.status == FactoryStatus::Blocked
    }

    /// The most recent log entry, if any
    pub fn last_log(&self) -> Option<&FactoryLogEntry> {
        self.logs.last()
    }

    /// Log entries of one kind, oldest first
    pub fn logs_of(&self, event: FactoryLogEvent) -> impl Iterator<Item = &FactoryLogEntry> {
        self.logs.iter().filter(move |entry| entry.event == event)
    }
}
