use proptest::prelude::*;

use bundlr_core::{DeliverableStatus, StageDeliverableStatus};

pub fn deliverable_status_strategy() -> impl Strategy<Value = DeliverableStatus> {
    prop::sample::select(DeliverableStatus::ALL.to_vec())
}

pub fn stage_status_strategy() -> impl Strategy<Value = StageDeliverableStatus> {
    prop_oneof![
        Just(StageDeliverableStatus::Pending),
        Just(StageDeliverableStatus::Ready),
        Just(StageDeliverableStatus::Approved),
    ]
}

/// Deliverable ids of the standard-content template
pub fn content_deliverable_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "creative-brief",
        "content-calendar",
        "draft-assets",
        "final-assets",
    ])
}

/// An operation against a running factory
#[derive(Debug, Clone)]
pub enum FactoryOp {
    Update(&'static str, StageDeliverableStatus),
    Advance,
    Reevaluate,
}

pub fn factory_op_strategy() -> impl Strategy<Value = FactoryOp> {
    prop_oneof![
        3 => (content_deliverable_strategy(), stage_status_strategy())
            .prop_map(|(id, status)| FactoryOp::Update(id, status)),
        2 => Just(FactoryOp::Advance),
        1 => Just(FactoryOp::Reevaluate),
    ]
}
