//! Data model: deliverables, pipeline templates, running factories and the
//! transition audit log.

pub mod deliverable;
pub mod factory;
pub mod pipeline_template;
pub mod transition_record;

// Re-export core models for easy access
pub use deliverable::Deliverable;
pub use factory::{Factory, FactoryDeliverable, FactoryLogEntry, FactoryLogEvent};
pub use pipeline_template::{DeliverableTemplate, PipelineTemplate, StageTemplate};
pub use transition_record::TransitionRecord;
