use bundlr_core::models::Deliverable;
use bundlr_core::state_machine::{allowed_transitions, transition, StateMachineError};
use bundlr_core::DeliverableStatus;

#[test]
fn test_table_matches_lifecycle() {
    use DeliverableStatus::*;

    let expected: [(DeliverableStatus, &[DeliverableStatus]); 8] = [
        (Draft, &[AwaitingApproval]),
        (AwaitingApproval, &[Approved, Draft]),
        (Approved, &[InQa]),
        (InQa, &[Ready, QaFailed]),
        (QaFailed, &[InQa]),
        (Ready, &[Published]),
        (Published, &[Archived]),
        (Archived, &[]),
    ];

    for (from, targets) in expected {
        assert_eq!(allowed_transitions(from), targets, "edges out of {from}");
    }
}

#[test]
fn test_qa_retry_loop() {
    let mut deliverable = Deliverable::new_draft("Launch video", None);
    for target in [
        DeliverableStatus::AwaitingApproval,
        DeliverableStatus::Approved,
        DeliverableStatus::InQa,
        DeliverableStatus::QaFailed,
        DeliverableStatus::InQa,
        DeliverableStatus::QaFailed,
        DeliverableStatus::InQa,
        DeliverableStatus::Ready,
    ] {
        deliverable = transition(&deliverable, target).unwrap();
    }
    assert_eq!(deliverable.status, DeliverableStatus::Ready);
}

#[test]
fn test_rejected_draft_goes_back_to_draft() {
    let deliverable = Deliverable::new_draft("Launch video", None);
    let submitted = transition(&deliverable, DeliverableStatus::AwaitingApproval).unwrap();
    let rejected = transition(&submitted, DeliverableStatus::Draft).unwrap();

    assert_eq!(rejected.status, DeliverableStatus::Draft);
    assert_eq!(rejected.id, deliverable.id);
    assert!(rejected.updated_at >= submitted.updated_at);
}

#[test]
fn test_skipping_qa_is_rejected() {
    let deliverable = Deliverable::new_draft("Launch video", None);
    let approved = transition(
        &transition(&deliverable, DeliverableStatus::AwaitingApproval).unwrap(),
        DeliverableStatus::Approved,
    )
    .unwrap();

    let err = transition(&approved, DeliverableStatus::Published).unwrap_err();
    match err {
        StateMachineError::InvalidTransition { from, to } => {
            assert_eq!(from, "approved");
            assert_eq!(to, "published");
        }
        other => panic!("Expected InvalidTransition, got {other:?}"),
    }
}
