//! # Deliverable Model
//!
//! A unit of client-facing work product with a publishing lifecycle. Status
//! changes go through [`DeliverableStateMachine`](crate::state_machine::DeliverableStateMachine);
//! direct writes to `status` bypass the transition table and its audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state_machine::DeliverableState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deliverable {
    pub id: Uuid,
    pub title: String,
    pub client_id: Option<Uuid>,
    /// Set when the deliverable was produced by a factory
    pub factory_id: Option<Uuid>,
    pub status: DeliverableState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deliverable {
    /// A fresh draft with a new id
    pub fn new_draft(title: impl Into<String>, client_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            client_id,
            factory_id: None,
            status: DeliverableState::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    /// A fresh draft attributed to the factory that produced it
    pub fn for_factory(title: impl Into<String>, factory_id: Uuid) -> Self {
        Self {
            factory_id: Some(factory_id),
            ..Self::new_draft(title, None)
        }
    }
}
