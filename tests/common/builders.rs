use std::sync::Arc;

use bundlr_core::events::EventPublisher;
use bundlr_core::models::{DeliverableTemplate, PipelineTemplate, StageTemplate};
use bundlr_core::pipeline::{PipelineTracker, SignalBoard, TemplateRegistry};
use bundlr_core::services::FactoryService;
use bundlr_core::storage::InMemoryStore;

/// Factory service over a fresh in-memory store, with a signal board for
/// injecting external blockers
pub struct TestHarness {
    pub service: Arc<FactoryService>,
    pub store: Arc<InMemoryStore>,
    pub signals: Arc<SignalBoard>,
    pub events: EventPublisher,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_templates(PipelineTemplate::builtin())
    }

    pub fn with_templates(templates: Vec<PipelineTemplate>) -> Self {
        let registry = TemplateRegistry::new(templates).expect("test templates are valid");
        let signals = Arc::new(SignalBoard::new());
        let tracker = Arc::new(PipelineTracker::new(Arc::new(registry), signals.clone()));
        let store = Arc::new(InMemoryStore::new());
        let events = EventPublisher::new(64);
        let service = Arc::new(FactoryService::with_store(
            tracker,
            store.clone(),
            events.clone(),
        ));

        Self {
            service,
            store,
            signals,
            events,
        }
    }

    pub fn tracker(&self) -> &PipelineTracker {
        self.service.tracker()
    }
}

/// Tracker with the built-in templates and no external signals
pub fn builtin_tracker() -> PipelineTracker {
    PipelineTracker::new(
        Arc::new(TemplateRegistry::with_builtin_templates()),
        Arc::new(bundlr_core::pipeline::NoExternalSignals),
    )
}

/// Builder for ad-hoc pipeline templates
pub struct TemplateBuilder {
    template: PipelineTemplate,
}

impl TemplateBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            template: PipelineTemplate {
                id: id.to_string(),
                name: format!("Template {id}"),
                description: None,
                deliverables: Vec::new(),
                stages: Vec::new(),
            },
        }
    }

    pub fn deliverable(mut self, id: &str) -> Self {
        self.template.deliverables.push(DeliverableTemplate {
            id: id.to_string(),
            name: id.replace('-', " "),
            kind: "document".to_string(),
        });
        self
    }

    pub fn stage(mut self, id: &str, required: &[&str]) -> Self {
        let order = self.template.stages.len() as u32;
        self.template.stages.push(StageTemplate {
            id: id.to_string(),
            name: id.to_string(),
            order,
            required_deliverables: required.iter().map(|r| r.to_string()).collect(),
        });
        self
    }

    pub fn build(self) -> PipelineTemplate {
        self.template
    }
}
