use std::sync::Arc;

use bundlr_core::pipeline::{NoExternalSignals, PipelineTracker, TemplateRegistry};
use bundlr_core::{FactoryStatus, PipelineError, StageDeliverableStatus};

use crate::common::TemplateBuilder;

fn tracker_for(template: bundlr_core::PipelineTemplate) -> PipelineTracker {
    PipelineTracker::new(
        Arc::new(TemplateRegistry::new(vec![template]).unwrap()),
        Arc::new(NoExternalSignals),
    )
}

#[test]
fn test_missing_deliverables_listed_in_id_order() {
    let template = TemplateBuilder::new("launch")
        .deliverable("press-kit")
        .deliverable("landing-page")
        .deliverable("teaser")
        .stage("prep", &["press-kit", "landing-page", "teaser"])
        .stage("go-live", &[])
        .build();
    let tracker = tracker_for(template);
    let factory = tracker.create_factory("c-1", "Initech", "launch").unwrap();

    assert_eq!(
        tracker.check_blockers(&factory),
        vec!["Missing deliverables: landing-page, press-kit, teaser".to_string()]
    );

    let partial = tracker
        .update_deliverable_status(&factory, "landing-page", StageDeliverableStatus::Ready)
        .unwrap();
    assert_eq!(
        partial.blockers,
        vec!["Missing deliverables: press-kit, teaser".to_string()]
    );
}

#[test]
fn test_stage_without_requirements_advances() {
    let template = TemplateBuilder::new("retainer")
        .deliverable("report")
        .stage("kickoff", &[])
        .stage("reporting", &["report"])
        .stage("wrap-up", &[])
        .build();
    let tracker = tracker_for(template);
    let factory = tracker.create_factory("c-2", "Initech", "retainer").unwrap();

    let reporting = tracker.advance_stage(&factory).unwrap();
    assert_eq!(reporting.current_stage_id, "reporting");

    let blocked = tracker.advance_stage(&reporting).unwrap();
    assert_eq!(blocked.status, FactoryStatus::Blocked);
    assert_eq!(blocked.current_stage_id, "reporting");
}

#[test]
fn test_single_stage_template_completes_immediately() {
    let template = TemplateBuilder::new("one-shot")
        .deliverable("asset")
        .stage("only", &["asset"])
        .build();
    let tracker = tracker_for(template);
    let factory = tracker.create_factory("c-3", "Initech", "one-shot").unwrap();

    let completed = tracker.advance_stage(&factory).unwrap();
    assert_eq!(completed.status, FactoryStatus::Completed);
}

#[test]
fn test_registry_rejects_dangling_requirement() {
    let template = TemplateBuilder::new("broken")
        .deliverable("asset")
        .stage("only", &["not-declared"])
        .build();

    let err = TemplateRegistry::new(vec![template]).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidTemplate { .. }));
}

#[test]
fn test_registry_rejects_template_without_stages() {
    let template = TemplateBuilder::new("empty").deliverable("asset").build();
    assert!(TemplateRegistry::new(vec![template]).is_err());
}

#[test]
fn test_unknown_deliverable_update() {
    let template = TemplateBuilder::new("tiny")
        .deliverable("asset")
        .stage("only", &["asset"])
        .build();
    let tracker = tracker_for(template);
    let factory = tracker.create_factory("c-4", "Initech", "tiny").unwrap();

    let err = tracker
        .update_deliverable_status(&factory, "nope", StageDeliverableStatus::Ready)
        .unwrap_err();
    assert!(matches!(err, PipelineError::DeliverableNotFound { .. }));
}
