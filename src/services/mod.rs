//! # Services
//!
//! Persistence-backed flows over the pure state machine and pipeline tracker.

pub mod deliverable_service;
pub mod factory_service;

pub use deliverable_service::DeliverableService;
pub use factory_service::FactoryService;
