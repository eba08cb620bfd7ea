//! Lifecycle event publishing for factories and deliverables.

pub mod publisher;

pub use publisher::{EventPublisher, LifecycleEvent};
