//! # Storage Collaborators
//!
//! Request/response contracts for the hosted relational store. Services hold
//! these as trait objects; no module keeps hidden global state.
//!
//! Saves are last-write-wins: there is no version check, so two dashboards
//! editing the same factory overwrite each other.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Deliverable, Factory};

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for running factories
#[async_trait]
pub trait FactoryStore: Send + Sync {
    /// Insert or replace the factory, returning the stored value
    async fn save_factory(&self, factory: &Factory) -> StorageResult<Factory>;

    async fn load_factory(&self, factory_id: Uuid) -> StorageResult<Option<Factory>>;

    /// All factories, most recently updated first
    async fn list_factories(&self) -> StorageResult<Vec<Factory>>;
}

/// Persistence for deliverable records
#[async_trait]
pub trait DeliverableStore: Send + Sync {
    /// Insert or replace the deliverable, returning the stored value
    async fn save_deliverable(&self, deliverable: &Deliverable) -> StorageResult<Deliverable>;

    async fn load_deliverable(&self, deliverable_id: Uuid) -> StorageResult<Option<Deliverable>>;

    /// Remove a deliverable whose creation could not be completed
    async fn delete_deliverable(&self, deliverable_id: Uuid) -> StorageResult<()>;

    /// Deliverables produced by one factory, oldest first
    async fn list_deliverables_for_factory(
        &self,
        factory_id: Uuid,
    ) -> StorageResult<Vec<Deliverable>>;
}
