//! Crate-level error type.
//!
//! Subsystems keep their own `thiserror` enums; everything converges on
//! [`BundlrError`] at the service boundary.

use crate::config::ConfigurationError;
use crate::pipeline::PipelineError;
use crate::state_machine::errors::{PersistenceError, StateMachineError};
use crate::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BundlrError {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Event error: {0}")]
    EventError(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BundlrError {
    /// Whether the failed action may have left the store untouched and can be retried by the caller
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, Self::PersistenceFailure(_))
    }
}

impl From<StateMachineError> for BundlrError {
    fn from(err: StateMachineError) -> Self {
        match err {
            StateMachineError::InvalidTransition { from, to } => {
                BundlrError::InvalidTransition { from, to }
            }
            StateMachineError::NotFound { .. } => BundlrError::NotFound(err.to_string()),
            StateMachineError::PersistenceFailed { reason } => {
                BundlrError::PersistenceFailure(reason)
            }
            other => BundlrError::Internal(other.to_string()),
        }
    }
}

impl From<PersistenceError> for BundlrError {
    fn from(err: PersistenceError) -> Self {
        BundlrError::PersistenceFailure(err.to_string())
    }
}

impl From<StorageError> for BundlrError {
    fn from(err: StorageError) -> Self {
        BundlrError::PersistenceFailure(err.to_string())
    }
}

impl From<ConfigurationError> for BundlrError {
    fn from(err: ConfigurationError) -> Self {
        BundlrError::ConfigurationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BundlrError>;
