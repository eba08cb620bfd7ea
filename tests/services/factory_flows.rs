use bundlr_core::models::FactoryLogEvent;
use bundlr_core::{BundlrError, DeliverableStatus, FactoryStatus, StageDeliverableStatus};
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

use crate::common::TestHarness;

#[tokio::test]
async fn test_content_engagement_to_delivery() {
    let harness = TestHarness::new();
    let service = &harness.service;

    let factory = assert_ok!(service.bootstrap("contract-100", "Umbrella", "standard-content").await);

    for (deliverable, next_stage) in [
        ("creative-brief", "planning"),
        ("content-calendar", "production"),
        ("draft-assets", "review"),
        ("final-assets", "delivery"),
    ] {
        assert_ok!(service.advance_deliverable(factory.id, deliverable).await);
        let current = assert_ok!(service.advance(factory.id).await);
        assert_eq!(current.current_stage_id, next_stage);
        assert_eq!(current.status, FactoryStatus::Active);
    }

    let completed = assert_ok!(service.advance(factory.id).await);
    assert_eq!(completed.status, FactoryStatus::Completed);
    assert!(completed.logs.len() > factory.logs.len());

    let (delivered, final_deliverable) =
        assert_ok!(service.create_final_deliverable(factory.id).await);
    assert_eq!(delivered.status, FactoryStatus::Delivered);
    assert_eq!(delivered.final_deliverable_id, Some(final_deliverable.id));
    assert_eq!(final_deliverable.status, DeliverableStatus::AwaitingApproval);
    assert_eq!(final_deliverable.factory_id, Some(factory.id));
    assert_eq!(
        final_deliverable.title,
        "Umbrella - Standard Content Engagement"
    );
    assert_eq!(delivered.logs_of(FactoryLogEvent::Deliver).count(), 1);

    let history = assert_ok!(
        service
            .deliverables()
            .history(final_deliverable.id)
            .await
    );
    assert_eq!(history.len(), 2);
    assert_eq!(
        history[1].metadata["correlation_id"],
        factory.id.to_string()
    );

    // DELIVERED is terminal
    let err = assert_err!(service.advance(factory.id).await);
    assert!(matches!(err, BundlrError::Pipeline(_)));
    assert_err!(service.create_final_deliverable(factory.id).await);
}

#[tokio::test]
async fn test_events_follow_factory_lifecycle() {
    let harness = TestHarness::new();
    let mut rx = harness.events.subscribe();
    let service = &harness.service;

    let factory = assert_ok!(service.bootstrap("contract-5", "Hooli", "two-stage-prototype").await);
    assert_ok!(service.advance(factory.id).await);
    assert_ok!(
        service
            .update_deliverable(factory.id, "design-doc", StageDeliverableStatus::Ready)
            .await
    );
    assert_ok!(service.advance(factory.id).await);
    assert_ok!(service.advance(factory.id).await);

    let mut names = Vec::new();
    while let Ok(event) = rx.try_recv() {
        assert_eq!(event.entity_id, factory.id.to_string());
        names.push(event.name);
    }
    assert_eq!(
        names,
        vec![
            "factory.bootstrapped",
            "factory.blocked",
            "factory.deliverable_updated",
            "factory.advanced",
            "factory.completed",
        ]
    );
}

#[tokio::test]
async fn test_blocked_event_carries_blockers() {
    let harness = TestHarness::new();
    let service = &harness.service;
    let factory = assert_ok!(service.bootstrap("contract-5", "Hooli", "two-stage-prototype").await);

    let mut rx = harness.events.subscribe();
    assert_ok!(service.advance(factory.id).await);

    let event = rx.recv().await.unwrap();
    assert_eq!(event.name, "factory.blocked");
    assert_eq!(event.context["status"], "BLOCKED");
    assert_eq!(event.context["stage_id"], "design");
    assert_eq!(event.context["blockers"][0], "Missing deliverables: design-doc");
}

#[tokio::test]
async fn test_failed_save_leaves_stored_factory() {
    let harness = TestHarness::new();
    let service = &harness.service;
    let factory = assert_ok!(service.bootstrap("contract-5", "Hooli", "two-stage-prototype").await);

    harness.store.set_unavailable(true);
    let err = assert_err!(
        service
            .update_deliverable(factory.id, "design-doc", StageDeliverableStatus::Ready)
            .await
    );
    assert!(err.is_persistence_failure());
    harness.store.set_unavailable(false);

    let stored = assert_ok!(service.load(factory.id).await);
    assert_eq!(stored, factory);
}

#[tokio::test]
async fn test_check_blockers_does_not_save() {
    let harness = TestHarness::new();
    let service = &harness.service;
    let factory = assert_ok!(service.bootstrap("contract-5", "Hooli", "two-stage-prototype").await);

    harness.signals.raise_global("Holiday freeze");
    let blockers = assert_ok!(service.check_blockers(factory.id).await);
    assert_eq!(
        blockers,
        vec![
            "Missing deliverables: design-doc".to_string(),
            "Holiday freeze".to_string()
        ]
    );
    assert_eq!(assert_ok!(service.load(factory.id).await).status, FactoryStatus::Active);
}

#[tokio::test]
async fn test_unknown_factory_is_not_found() {
    let harness = TestHarness::new();
    let err = assert_err!(harness.service.advance(Uuid::new_v4()).await);
    assert!(matches!(err, BundlrError::NotFound(_)));
}

#[tokio::test]
async fn test_factories_are_independent() {
    let harness = TestHarness::new();
    let service = &harness.service;
    let first = assert_ok!(service.bootstrap("contract-1", "Acme", "two-stage-prototype").await);
    let second = assert_ok!(service.bootstrap("contract-2", "Globex", "two-stage-prototype").await);

    assert_ok!(
        service
            .update_deliverable(first.id, "design-doc", StageDeliverableStatus::Approved)
            .await
    );

    let untouched = assert_ok!(service.load(second.id).await);
    assert_eq!(
        untouched.deliverable("design-doc").unwrap().status,
        StageDeliverableStatus::Pending
    );
    assert_eq!(harness.store.factory_count(), 2);
    assert_eq!(assert_ok!(service.list().await).len(), 2);
}
