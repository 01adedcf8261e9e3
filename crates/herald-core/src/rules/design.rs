//! DESIGN_UPLOADED のルール: クライアント承認待ちのときだけ承認依頼を出す

use crate::domain::{
    ApprovalStatus, Channel, DesignState, NotificationIntent, NotificationKind, Priority, Target,
};

use super::{client_of, order_id_of, po_label};

pub(super) fn derive(entity_id: &str, state: &DesignState) -> Vec<NotificationIntent> {
    if state.approval_status != Some(ApprovalStatus::PendingClientApproval) {
        return Vec::new();
    }
    let order = state.order.as_ref();
    let Some(client_id) = client_of(order) else {
        return Vec::new();
    };
    let po = po_label(order, entity_id);

    vec![
        NotificationIntent::new(
            NotificationKind::DesignApprovalNeeded,
            Channel::ClientPortal,
            Target::client(client_id),
            Priority::High,
            format!("New design uploaded for order {po} - approval required"),
            entity_id,
        )
        .with("designId", state.id.as_deref().unwrap_or(entity_id))
        .with_opt("orderId", order_id_of(order))
        .with_opt("fileName", state.file_name.as_deref())
        .with_opt("version", state.version)
        .with_opt("designType", state.design_type.as_deref()),
    ]
}
