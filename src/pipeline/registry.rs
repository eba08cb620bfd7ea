use std::collections::HashMap;

use tracing::{debug, info};

use super::errors::{PipelineError, PipelineResult};
use crate::models::{PipelineTemplate, StageTemplate};

/// Immutable id -> template lookup.
///
/// Every template is validated on the way in, so a template obtained from the
/// registry always has at least one stage and consistent deliverable ids.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, PipelineTemplate>,
}

impl TemplateRegistry {
    pub fn new(templates: Vec<PipelineTemplate>) -> PipelineResult<Self> {
        let mut registry = HashMap::with_capacity(templates.len());

        for template in templates {
            template.validate()?;
            if registry.contains_key(&template.id) {
                return Err(PipelineError::InvalidTemplate {
                    template_id: template.id.clone(),
                    reason: "template id registered twice".to_string(),
                });
            }
            debug!(
                template_id = %template.id,
                stages = template.stages.len(),
                deliverables = template.deliverables.len(),
                "Registered pipeline template"
            );
            registry.insert(template.id.clone(), template);
        }

        info!(templates = registry.len(), "📚 Template registry initialized");

        Ok(Self {
            templates: registry,
        })
    }

    /// Registry holding only the templates shipped with the crate
    pub fn with_builtin_templates() -> Self {
        let templates = PipelineTemplate::builtin()
            .into_iter()
            .map(|template| (template.id.clone(), template))
            .collect();
        Self { templates }
    }

    pub fn get(&self, template_id: &str) -> Option<&PipelineTemplate> {
        self.templates.get(template_id)
    }

    /// Lookup that fails with `TemplateNotFound`
    pub fn require(&self, template_id: &str) -> PipelineResult<&PipelineTemplate> {
        self.get(template_id)
            .ok_or_else(|| PipelineError::TemplateNotFound {
                template_id: template_id.to_string(),
            })
    }

    pub fn contains(&self, template_id: &str) -> bool {
        self.templates.contains_key(template_id)
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn first_stage(&self, template_id: &str) -> PipelineResult<&StageTemplate> {
        let template = self.require(template_id)?;
        template
            .first_stage()
            .ok_or_else(|| PipelineError::InvalidTemplate {
                template_id: template_id.to_string(),
                reason: "template has no stages".to_string(),
            })
    }

    pub fn stage(&self, template_id: &str, stage_id: &str) -> PipelineResult<&StageTemplate> {
        self.require(template_id)?
            .stage(stage_id)
            .ok_or_else(|| PipelineError::StageNotFound {
                template_id: template_id.to_string(),
                stage_id: stage_id.to_string(),
            })
    }

    /// The stage following `stage_id`; `Ok(None)` when `stage_id` is the last one
    pub fn next_stage(
        &self,
        template_id: &str,
        stage_id: &str,
    ) -> PipelineResult<Option<&StageTemplate>> {
        let template = self.require(template_id)?;
        self.stage(template_id, stage_id)?;
        Ok(template.next_stage(stage_id))
    }

    pub fn is_last_stage(&self, template_id: &str, stage_id: &str) -> bool {
        self.get(template_id)
            .is_some_and(|template| template.is_last_stage(stage_id))
    }
}
