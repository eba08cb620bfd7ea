//! # External Blocker Signals
//!
//! Real-world interruptions (supplier delays, client holds, legal review) that
//! block a factory independently of its deliverables. The tracker asks its
//! [`ExternalSignalSource`] for reasons on every blocker evaluation and appends
//! whatever comes back after the deliverable blocker.

use dashmap::DashMap;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::models::Factory;

/// Capability queried by the tracker for blockers originating outside the factory
pub trait ExternalSignalSource: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Zero or more human-readable reasons blocking `factory`
    fn blockers_for(&self, factory: &Factory) -> Vec<String>;
}

/// Source that never reports a blocker
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalSignals;

impl ExternalSignalSource for NoExternalSignals {
    fn name(&self) -> &str {
        "none"
    }

    fn blockers_for(&self, _factory: &Factory) -> Vec<String> {
        Vec::new()
    }
}

/// Blockers raised and cleared by operators or integrations at runtime.
///
/// Global signals apply to every factory; scoped signals to one factory id.
#[derive(Debug, Default)]
pub struct SignalBoard {
    global: RwLock<Vec<String>>,
    scoped: DashMap<Uuid, Vec<String>>,
}

impl SignalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise a blocker for every factory; duplicates are ignored
    pub fn raise_global(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let mut global = self.global.write();
        if !global.contains(&reason) {
            global.push(reason);
        }
    }

    /// Raise a blocker for one factory; duplicates are ignored
    pub fn raise(&self, factory_id: Uuid, reason: impl Into<String>) {
        let reason = reason.into();
        let mut entry = self.scoped.entry(factory_id).or_default();
        if !entry.contains(&reason) {
            entry.push(reason);
        }
    }

    /// Clear every blocker scoped to `factory_id`
    pub fn clear(&self, factory_id: Uuid) {
        self.scoped.remove(&factory_id);
    }

    pub fn clear_global(&self) {
        self.global.write().clear();
    }
}

impl ExternalSignalSource for SignalBoard {
    fn name(&self) -> &str {
        "signal_board"
    }

    fn blockers_for(&self, factory: &Factory) -> Vec<String> {
        let mut reasons = self.global.read().clone();
        if let Some(scoped) = self.scoped.get(&factory.id) {
            reasons.extend(scoped.iter().cloned());
        }
        reasons
    }
}
