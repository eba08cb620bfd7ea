//! In-process store backing tests, demos and single-user tooling.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use super::{DeliverableStore, FactoryStore, StorageError, StorageResult};
use crate::models::{Deliverable, Factory, TransitionRecord};
use crate::state_machine::errors::{PersistenceError, PersistenceResult};
use crate::state_machine::TransitionPersistence;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    factories: DashMap<Uuid, Factory>,
    deliverables: DashMap<Uuid, Deliverable>,
    transitions: RwLock<Vec<TransitionRecord>>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with `StorageError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    pub fn factory_count(&self) -> usize {
        self.factories.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.read().len()
    }
}

#[async_trait]
impl FactoryStore for InMemoryStore {
    async fn save_factory(&self, factory: &Factory) -> StorageResult<Factory> {
        self.check_available()?;
        self.factories.insert(factory.id, factory.clone());
        Ok(factory.clone())
    }

    async fn load_factory(&self, factory_id: Uuid) -> StorageResult<Option<Factory>> {
        Ok(self.factories.get(&factory_id).map(|f| f.value().clone()))
    }

    async fn list_factories(&self) -> StorageResult<Vec<Factory>> {
        let mut factories: Vec<Factory> =
            self.factories.iter().map(|f| f.value().clone()).collect();
        factories.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(factories)
    }
}

#[async_trait]
impl DeliverableStore for InMemoryStore {
    async fn save_deliverable(&self, deliverable: &Deliverable) -> StorageResult<Deliverable> {
        self.check_available()?;
        self.deliverables.insert(deliverable.id, deliverable.clone());
        Ok(deliverable.clone())
    }

    async fn load_deliverable(&self, deliverable_id: Uuid) -> StorageResult<Option<Deliverable>> {
        Ok(self
            .deliverables
            .get(&deliverable_id)
            .map(|d| d.value().clone()))
    }

    async fn delete_deliverable(&self, deliverable_id: Uuid) -> StorageResult<()> {
        self.check_available()?;
        self.deliverables.remove(&deliverable_id);
        Ok(())
    }

    async fn list_deliverables_for_factory(
        &self,
        factory_id: Uuid,
    ) -> StorageResult<Vec<Deliverable>> {
        let mut deliverables: Vec<Deliverable> = self
            .deliverables
            .iter()
            .filter(|d| d.factory_id == Some(factory_id))
            .map(|d| d.value().clone())
            .collect();
        deliverables.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(deliverables)
    }
}

#[async_trait]
impl TransitionPersistence for InMemoryStore {
    async fn persist_transition(
        &self,
        entity_type: &str,
        entity_id: &str,
        from_state: Option<String>,
        to_state: String,
        metadata: Option<Value>,
    ) -> PersistenceResult<TransitionRecord> {
        self.check_available()
            .map_err(|e| PersistenceError::TransitionSaveFailed {
                reason: e.to_string(),
            })?;

        let mut transitions = self.transitions.write();
        let sort_key = transitions
            .iter()
            .filter(|t| t.entity_type == entity_type && t.entity_id == entity_id)
            .map(|t| t.sort_key)
            .max()
            .unwrap_or(0)
            + 1;

        let record = TransitionRecord::new(
            entity_type,
            entity_id,
            from_state,
            to_state,
            sort_key,
            metadata,
        );
        transitions.push(record.clone());
        Ok(record)
    }

    async fn transition_history(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> PersistenceResult<Vec<TransitionRecord>> {
        let mut history: Vec<TransitionRecord> = self
            .transitions
            .read()
            .iter()
            .filter(|t| t.entity_type == entity_type && t.entity_id == entity_id)
            .cloned()
            .collect();
        history.sort_by_key(|t| t.sort_key);
        Ok(history)
    }
}
