//! # Transition Context
//!
//! Attribution data carried through a deliverable transition and merged into
//! the audit record's metadata.
//!
//! ```rust
//! use bundlr_core::state_machine::TransitionContext;
//! use uuid::Uuid;
//!
//! let context = TransitionContext::with_actor("account-manager-7")
//!     .reason("client asked for a second revision");
//!
//! assert_eq!(context.actor_id.as_deref(), Some("account-manager-7"));
//! assert!(context.correlation_id.is_none());
//!
//! let traced = TransitionContext::with_correlation_id(Uuid::new_v4());
//! assert!(traced.has_attribution());
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionContext {
    /// Dashboard user who requested the transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,

    /// Correlation ID linking the transition to the originating request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,

    /// Free-form explanation, e.g. the rejection note on `awaiting_approval -> draft`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TransitionContext {
    pub fn with_actor(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: Some(actor_id.into()),
            ..Self::default()
        }
    }

    pub fn with_correlation_id(correlation_id: Uuid) -> Self {
        Self {
            correlation_id: Some(correlation_id),
            ..Self::default()
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Check if any attribution field is set
    pub fn has_attribution(&self) -> bool {
        self.actor_id.is_some() || self.correlation_id.is_some()
    }

    /// Merge the context fields into existing transition metadata.
    ///
    /// Non-object metadata is replaced by an object holding only the context.
    pub fn merge_into_metadata(&self, mut metadata: serde_json::Value) -> serde_json::Value {
        if !metadata.is_object() {
            metadata = serde_json::json!({});
        }
        if let Some(obj) = metadata.as_object_mut() {
            if let Some(actor_id) = &self.actor_id {
                obj.insert("actor_id".to_string(), serde_json::json!(actor_id));
            }
            if let Some(correlation_id) = self.correlation_id {
                obj.insert(
                    "correlation_id".to_string(),
                    serde_json::json!(correlation_id.to_string()),
                );
            }
            if let Some(reason) = &self.reason {
                obj.insert("reason".to_string(), serde_json::json!(reason));
            }
        }
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context_is_empty() {
        let context = TransitionContext::default();
        assert!(!context.has_attribution());
        assert!(context.reason.is_none());
    }

    #[test]
    fn test_merge_into_metadata() {
        let correlation_id = Uuid::new_v4();
        let context = TransitionContext {
            actor_id: Some("am-1".to_string()),
            correlation_id: Some(correlation_id),
            reason: None,
        };

        let merged = context.merge_into_metadata(serde_json::json!({"event": "transition"}));

        assert_eq!(merged["event"], "transition");
        assert_eq!(merged["actor_id"], "am-1");
        assert_eq!(merged["correlation_id"], correlation_id.to_string());
        assert!(merged.get("reason").is_none());
    }

    #[test]
    fn test_merge_replaces_non_object_metadata() {
        let merged = TransitionContext::with_actor("am-2").merge_into_metadata(serde_json::json!(42));
        assert_eq!(merged, serde_json::json!({"actor_id": "am-2"}));
    }

    #[test]
    fn test_serialization_skips_none() {
        let json = serde_json::to_string(&TransitionContext::with_actor("am-3")).unwrap();
        assert_eq!(json, r#"{"actor_id":"am-3"}"#);
    }
}
