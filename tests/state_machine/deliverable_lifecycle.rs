use std::sync::Arc;

use bundlr_core::events::EventPublisher;
use bundlr_core::services::DeliverableService;
use bundlr_core::storage::InMemoryStore;
use bundlr_core::{BundlrError, DeliverableStatus, TransitionContext};
use tokio_test::{assert_err, assert_ok};

fn service() -> (DeliverableService, EventPublisher) {
    let store = Arc::new(InMemoryStore::new());
    let events = EventPublisher::new(16);
    (
        DeliverableService::new(store.clone(), store, events.clone()),
        events,
    )
}

#[tokio::test]
async fn test_transition_publishes_named_event() {
    let (service, events) = service();
    let mut rx = events.subscribe();

    let created = assert_ok!(service.create_draft("Media kit", None).await);
    let created_event = rx.recv().await.unwrap();
    assert_eq!(created_event.name, "deliverable.created");

    assert_ok!(
        service
            .transition(
                created.id,
                DeliverableStatus::AwaitingApproval,
                Some(TransitionContext::with_actor("account-manager-3").reason("first cut")),
            )
            .await
    );

    let event = rx.recv().await.unwrap();
    assert_eq!(event.name, "deliverable.awaiting_approval");
    assert_eq!(event.entity_id, created.id.to_string());
    assert_eq!(event.context["from_state"], "draft");
    assert_eq!(event.context["metadata"]["reason"], "first cut");
}

#[tokio::test]
async fn test_audit_trail_records_every_move() {
    let (service, _events) = service();
    let created = assert_ok!(service.create_draft("Media kit", None).await);

    assert_ok!(
        service
            .transition(created.id, DeliverableStatus::AwaitingApproval, None)
            .await
    );
    assert_ok!(service.transition(created.id, DeliverableStatus::Draft, None).await);
    assert_err!(service.transition(created.id, DeliverableStatus::Archived, None).await);

    let history = assert_ok!(service.history(created.id).await);
    let moves: Vec<(Option<&str>, &str)> = history
        .iter()
        .map(|t| (t.from_state.as_deref(), t.to_state.as_str()))
        .collect();
    assert_eq!(
        moves,
        vec![
            (None, "draft"),
            (Some("draft"), "awaiting_approval"),
            (Some("awaiting_approval"), "draft"),
        ]
    );
    assert!(history.windows(2).all(|w| w[0].sort_key < w[1].sort_key));
    assert!(history.iter().all(|t| t.entity_type == "deliverable"));
}

#[tokio::test]
async fn test_archived_is_final() {
    let (service, _events) = service();
    let created = assert_ok!(service.create_draft("Media kit", None).await);

    for target in [
        DeliverableStatus::AwaitingApproval,
        DeliverableStatus::Approved,
        DeliverableStatus::InQa,
        DeliverableStatus::Ready,
        DeliverableStatus::Published,
        DeliverableStatus::Archived,
    ] {
        assert_ok!(service.transition(created.id, target, None).await);
    }

    for target in DeliverableStatus::ALL {
        let err = assert_err!(service.transition(created.id, target, None).await);
        assert!(matches!(err, BundlrError::InvalidTransition { .. }));
    }
}
