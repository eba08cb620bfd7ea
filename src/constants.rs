//! # System Constants
//!
//! Event names, entity labels and operational defaults shared by the state
//! machines, the pipeline tracker and the services.

use std::time::Duration;

pub use crate::state_machine::{
    DeliverableState as DeliverableStatus, FactoryStatus, StageDeliverableStatus,
};

/// Lifecycle events published on the [`EventPublisher`](crate::events::EventPublisher)
pub mod events {
    // Factory lifecycle events
    pub const FACTORY_BOOTSTRAPPED: &str = "factory.bootstrapped";
    pub const FACTORY_BLOCKED: &str = "factory.blocked";
    pub const FACTORY_UNBLOCKED: &str = "factory.unblocked";
    pub const FACTORY_ADVANCED: &str = "factory.advanced";
    pub const FACTORY_COMPLETED: &str = "factory.completed";
    pub const FACTORY_DELIVERED: &str = "factory.delivered";
    pub const FACTORY_DELIVERABLE_UPDATED: &str = "factory.deliverable_updated";

    // Deliverable lifecycle events are `deliverable.<to_state>`
    pub const DELIVERABLE_PREFIX: &str = "deliverable";
    pub const DELIVERABLE_CREATED: &str = "deliverable.created";
}

/// Entity labels written into the audit log
pub mod entities {
    pub const DELIVERABLE: &str = "deliverable";
}

/// Blocker text shared between the tracker and its callers
pub mod blockers {
    pub const MISSING_DELIVERABLES_PREFIX: &str = "Missing deliverables: ";
    pub const CONFIGURATION_ERROR_PREFIX: &str = "Configuration error: ";
}

/// Operational defaults
pub mod system {
    use super::Duration;

    pub const DEFAULT_BLOCKER_POLL_INTERVAL: Duration = Duration::from_secs(10);
    pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1000;
    pub const DEFAULT_DATABASE_POOL: u32 = 10;
    pub const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 5;
    pub const MAX_CONFIG_FILE_SIZE: u64 = 10 * 1024 * 1024;
}

/// Identifiers of the templates shipped with the crate
pub mod templates {
    pub const TWO_STAGE_PROTOTYPE: &str = "two-stage-prototype";
    pub const STANDARD_CONTENT: &str = "standard-content";
}
