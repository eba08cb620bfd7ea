//! # Transition Record
//!
//! One row of the append-only audit log written on every deliverable status
//! change: who moved which entity from where to where, and when.
//!
//! `sort_key` is assigned per entity starting at 1, so replaying records in
//! `sort_key` order reproduces the entity's history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub id: Uuid,
    pub entity_type: String,
    pub entity_id: String,
    /// None for the record that creates the entity
    pub from_state: Option<String>,
    pub to_state: String,
    pub sort_key: i32,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl TransitionRecord {
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        from_state: Option<String>,
        to_state: impl Into<String>,
        sort_key: i32,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        let created_at = Utc::now();
        let to_state = to_state.into();
        Self {
            id: Uuid::new_v4(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            metadata: metadata.unwrap_or_else(|| {
                serde_json::json!({
                    "event": "transition",
                    "timestamp": created_at,
                })
            }),
            from_state,
            to_state,
            sort_key,
            created_at,
        }
    }

    /// Whether this record created the entity rather than moving it
    pub fn is_initial(&self) -> bool {
        self.from_state.is_none()
    }
}
