#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Bundlr Core
//!
//! Deliverable lifecycle and production pipeline engine for the BundlrOS
//! agency platform.
//!
//! ## Overview
//!
//! Two cooperating pieces of domain logic:
//!
//! - **Deliverable status machine**: eight lifecycle states (`draft` through
//!   `archived`) with a fixed table of allowed moves. Every accepted move is
//!   saved, appended to an audit log and announced as a lifecycle event.
//! - **Pipeline stage tracker** ("factory" engine): a factory instantiates a
//!   pipeline template for one client contract, tracks the template's
//!   deliverables through PENDING, READY and APPROVED, and refuses to leave a
//!   stage while any of the stage's required deliverables is missing or an
//!   external signal reports a blocker.
//!
//! ## Module Organization
//!
//! - [`state_machine`] - Deliverable states, transition table and state machine
//! - [`pipeline`] - Template registry, stage tracker, external signals, blocker monitor
//! - [`services`] - Persistence-backed deliverable and factory flows
//! - [`storage`] - Store traits with in-memory and Postgres implementations
//! - [`models`] - Deliverable, factory, template and audit records
//! - [`config`] - YAML configuration with environment overrides
//! - [`database`] - Postgres pool and migrations
//! - [`events`] - Lifecycle event broadcasting
//! - [`error`] - Crate-level error type
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use bundlr_core::events::EventPublisher;
//! use bundlr_core::pipeline::{NoExternalSignals, PipelineTracker, TemplateRegistry};
//! use bundlr_core::services::FactoryService;
//! use bundlr_core::storage::InMemoryStore;
//! use bundlr_core::StageDeliverableStatus;
//!
//! # async fn example() -> bundlr_core::Result<()> {
//! let tracker = Arc::new(PipelineTracker::new(
//!     Arc::new(TemplateRegistry::with_builtin_templates()),
//!     Arc::new(NoExternalSignals),
//! ));
//! let service = FactoryService::with_store(
//!     tracker,
//!     Arc::new(InMemoryStore::new()),
//!     EventPublisher::default(),
//! );
//!
//! let factory = service.bootstrap("contract-42", "Acme", "two-stage-prototype").await?;
//! service
//!     .update_deliverable(factory.id, "design-doc", StageDeliverableStatus::Ready)
//!     .await?;
//! let factory = service.advance(factory.id).await?;
//! assert_eq!(factory.current_stage_id, "prototype");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod state_machine;
pub mod storage;

pub use config::{BundlrConfig, ConfigManager, DatabaseConfig, EventsConfig, PipelineConfig};
pub use constants::{DeliverableStatus, FactoryStatus, StageDeliverableStatus};
pub use error::{BundlrError, Result};
pub use events::{EventPublisher, LifecycleEvent};
pub use models::{Deliverable, Factory, FactoryDeliverable, PipelineTemplate};
pub use pipeline::{PipelineError, PipelineTracker, TemplateRegistry};
pub use services::{DeliverableService, FactoryService};
pub use state_machine::{DeliverableStateMachine, StateMachineError, TransitionContext};
