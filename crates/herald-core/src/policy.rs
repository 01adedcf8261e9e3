//! Priority / progress policy: deterministic lookup tables.
//!
//! 状態を持たない純粋関数だけを置く（副作用なし）。

use crate::domain::{OrderStatus, Priority, Workcenter};

/// Fixed production pipeline, in order.
pub static PIPELINE: [Workcenter; 6] = [
    Workcenter::Cutting,
    Workcenter::Printing,
    Workcenter::Sewing,
    Workcenter::Qc,
    Workcenter::Packing,
    Workcenter::Delivery,
];

/// Priority of a client-facing status change notification.
///
/// Only `new_status` is consulted; `_old_status` is kept for call-site symmetry.
pub fn status_change_priority(
    _old_status: Option<&OrderStatus>,
    new_status: &OrderStatus,
) -> Priority {
    match new_status {
        OrderStatus::DesignApproval | OrderStatus::ReadyForDelivery | OrderStatus::Delivered => {
            Priority::High
        }
        OrderStatus::InProgress | OrderStatus::Qc => Priority::Normal,
        _ => Priority::Low,
    }
}

/// Priority of an internal (production manager) status notification.
pub fn internal_priority(status: &OrderStatus) -> Priority {
    if *status == OrderStatus::Blocked {
        Priority::High
    } else {
        Priority::Normal
    }
}

/// Progress shown to the client for an order status, 0..=100.
pub fn progress_percentage(status: &OrderStatus) -> u8 {
    match status {
        OrderStatus::Intake => 5,
        OrderStatus::DesignPending => 15,
        OrderStatus::DesignApproval => 25,
        OrderStatus::ProductionPlanned => 35,
        OrderStatus::InProgress => 60,
        OrderStatus::Qc => 80,
        OrderStatus::Packing => 90,
        OrderStatus::ReadyForDelivery => 95,
        OrderStatus::Delivered => 100,
        OrderStatus::Blocked | OrderStatus::Other(_) => 0,
    }
}

/// The stage after `stage` in [`PIPELINE`]; `None` if `stage` is last or not in the pipeline.
pub fn next_pipeline_stage(stage: &Workcenter) -> Option<&'static Workcenter> {
    let index = PIPELINE.iter().position(|s| s == stage)?;
    PIPELINE.get(index + 1)
}
