use thiserror::Error;
use uuid::Uuid;

use crate::state_machine::FactoryStatus;

/// Error types for pipeline template and factory operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Template not found: {template_id}")]
    TemplateNotFound { template_id: String },

    #[error("Stage not found: {stage_id} in template {template_id}")]
    StageNotFound {
        template_id: String,
        stage_id: String,
    },

    #[error("Deliverable not found: {deliverable_id} in factory {factory_id}")]
    DeliverableNotFound {
        factory_id: Uuid,
        deliverable_id: String,
    },

    #[error("Factory {factory_id} is {status}; cannot {operation}")]
    InvalidFactoryState {
        factory_id: Uuid,
        status: FactoryStatus,
        operation: String,
    },

    #[error("Invalid template {template_id}: {reason}")]
    InvalidTemplate { template_id: String, reason: String },
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Helper function to create invalid factory state errors
pub fn invalid_factory_state(
    factory_id: Uuid,
    status: FactoryStatus,
    operation: impl Into<String>,
) -> PipelineError {
    PipelineError::InvalidFactoryState {
        factory_id,
        status,
        operation: operation.into(),
    }
}
