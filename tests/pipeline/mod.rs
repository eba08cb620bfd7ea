mod blockers;
mod custom_templates;
