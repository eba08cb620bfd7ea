// State machine module for deliverable and factory lifecycles
//
// Deliverables move through a fixed adjacency table; factories carry their own
// status which the pipeline tracker drives.

pub mod context;
pub mod deliverable_state_machine;
pub mod errors;
pub mod persistence;
pub mod states;
pub mod transitions;

// Re-export main types for convenient access
pub use context::TransitionContext;
pub use deliverable_state_machine::DeliverableStateMachine;
pub use errors::{PersistenceError, StateMachineError};
pub use states::{DeliverableState, FactoryStatus, StageDeliverableStatus};
pub use transitions::{allowed_transitions, transition, validate_transition};

// Common traits
pub use persistence::TransitionPersistence;
