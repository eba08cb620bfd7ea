use std::sync::Arc;

use bundlr_core::pipeline::{PipelineTracker, SignalBoard, TemplateRegistry};
use bundlr_core::{FactoryStatus, PipelineError, StageDeliverableStatus};

use crate::common::builtin_tracker;

#[test]
fn test_prototype_walkthrough() {
    let tracker = builtin_tracker();
    let factory = tracker
        .create_factory("contract-7", "Northwind", "two-stage-prototype")
        .unwrap();

    // Nothing ready yet: advancing parks the factory
    let blocked = tracker.advance_stage(&factory).unwrap();
    assert_eq!(blocked.status, FactoryStatus::Blocked);
    assert_eq!(blocked.current_stage_id, "design");
    assert_eq!(blocked.blockers, vec!["Missing deliverables: design-doc".to_string()]);

    // Marking the design doc READY unblocks in the same call
    let unblocked = tracker
        .update_deliverable_status(&blocked, "design-doc", StageDeliverableStatus::Ready)
        .unwrap();
    assert_eq!(unblocked.status, FactoryStatus::Active);
    assert!(unblocked.blockers.is_empty());

    let prototype = tracker.advance_stage(&unblocked).unwrap();
    assert_eq!(prototype.current_stage_id, "prototype");
    assert_eq!(prototype.status, FactoryStatus::Active);

    // The last stage completes even with its requirement outstanding
    let completed = tracker.advance_stage(&prototype).unwrap();
    assert_eq!(completed.status, FactoryStatus::Completed);
    assert_eq!(completed.current_stage_id, "prototype");
}

#[test]
fn test_approved_satisfies_requirement() {
    let tracker = builtin_tracker();
    let factory = tracker
        .create_factory("contract-7", "Northwind", "standard-content")
        .unwrap();

    let approved = tracker
        .update_deliverable_status(&factory, "creative-brief", StageDeliverableStatus::Approved)
        .unwrap();
    assert!(tracker.check_blockers(&approved).is_empty());

    let planning = tracker.advance_stage(&approved).unwrap();
    assert_eq!(planning.current_stage_id, "planning");
    assert_eq!(
        tracker.check_blockers(&planning),
        vec!["Missing deliverables: content-calendar".to_string()]
    );
}

#[test]
fn test_unknown_template_reported_as_configuration_blocker() {
    let tracker = builtin_tracker();
    let mut factory = tracker
        .create_factory("contract-7", "Northwind", "two-stage-prototype")
        .unwrap();
    factory.template_id = "retired-template".to_string();

    let blockers = tracker.check_blockers(&factory);
    assert_eq!(blockers.len(), 1);
    assert!(blockers[0].starts_with("Configuration error: "));
    assert!(blockers[0].contains("retired-template"));
}

#[test]
fn test_unknown_template_rejected_at_bootstrap() {
    let tracker = builtin_tracker();
    let err = tracker
        .create_factory("contract-7", "Northwind", "missing")
        .unwrap_err();
    assert!(matches!(err, PipelineError::TemplateNotFound { .. }));
}

#[test]
fn test_external_signals_follow_missing_deliverables() {
    let signals = Arc::new(SignalBoard::new());
    let tracker = PipelineTracker::new(
        Arc::new(TemplateRegistry::with_builtin_templates()),
        signals.clone(),
    );
    let factory = tracker
        .create_factory("contract-9", "Globex", "two-stage-prototype")
        .unwrap();

    signals.raise(factory.id, "Supply Chain Delay Detected");
    assert_eq!(
        tracker.check_blockers(&factory),
        vec![
            "Missing deliverables: design-doc".to_string(),
            "Supply Chain Delay Detected".to_string(),
        ]
    );

    // Deliverables in place, the signal alone still blocks
    let ready = tracker
        .update_deliverable_status(&factory, "design-doc", StageDeliverableStatus::Ready)
        .unwrap();
    assert_eq!(ready.status, FactoryStatus::Blocked);
    assert_eq!(ready.blockers, vec!["Supply Chain Delay Detected".to_string()]);

    signals.clear(factory.id);
    let cleared = tracker.reevaluate(&ready);
    assert_eq!(cleared.status, FactoryStatus::Active);
    assert!(cleared.blockers.is_empty());
}

#[test]
fn test_updates_rejected_after_completion() {
    let tracker = builtin_tracker();
    let factory = tracker
        .create_factory("contract-7", "Northwind", "two-stage-prototype")
        .unwrap();
    let ready = tracker
        .update_deliverable_status(&factory, "design-doc", StageDeliverableStatus::Ready)
        .unwrap();
    let completed = tracker
        .advance_stage(&tracker.advance_stage(&ready).unwrap())
        .unwrap();

    let err = tracker
        .update_deliverable_status(&completed, "proto-unit", StageDeliverableStatus::Ready)
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidFactoryState { .. }));

    // Reevaluation leaves a finished factory alone
    assert_eq!(tracker.reevaluate(&completed), completed);
}
