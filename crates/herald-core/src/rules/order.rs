//! ORDER_STATUS_CHANGED のルール
//!
//! 1 イベントから最大 2 件:
//! - クライアント向け（client-portal）: 顧客に見せるステータスのとき
//! - 社内向け（internal, PRODUCTION_MANAGER）: 生産管理が動くステータスのとき
//!
//! 2 つの条件は独立しており、IN_PROGRESS / QC では両方が出る。

use serde_json::Value;

use crate::domain::{
    Channel, NotificationIntent, NotificationKind, OrderState, OrderStatus, Target,
};
use crate::policy::{internal_priority, progress_percentage, status_change_priority};

const PRODUCTION_MANAGER: &str = "PRODUCTION_MANAGER";

pub(super) fn derive(
    entity_id: &str,
    previous: Option<&OrderState>,
    current: &OrderState,
) -> Vec<NotificationIntent> {
    let mut intents = Vec::with_capacity(2);
    let po = current
        .po_number
        .as_deref()
        .or(current.id.as_deref())
        .unwrap_or(entity_id);
    let order_id = current.id.as_deref().unwrap_or(entity_id);
    let old_status = previous.map(|p| &p.status);

    if is_client_visible(&current.status)
        && let Some(client_id) = current.client_id.as_deref()
    {
        let message = client_message(&current.status, po)
            .unwrap_or_else(|| format!("Order {po} status updated to {}", current.status));
        intents.push(
            NotificationIntent::new(
                NotificationKind::OrderStatusChange,
                Channel::ClientPortal,
                Target::client(client_id),
                status_change_priority(old_status, &current.status),
                message,
                entity_id,
            )
            .with("orderId", order_id)
            .with("poNumber", po)
            .with(
                "oldStatus",
                old_status.map_or(Value::Null, |s| Value::from(s.as_str())),
            )
            .with("newStatus", current.status.as_str())
            .with("progressPercentage", progress_percentage(&current.status)),
        );
    }

    if is_production_relevant(&current.status) {
        let requires_action = current.status == OrderStatus::Blocked;
        intents.push(
            NotificationIntent::new(
                NotificationKind::ProductionUpdate,
                Channel::Internal,
                Target::role(PRODUCTION_MANAGER),
                internal_priority(&current.status),
                format!("Order {po} status changed to {}", current.status),
                entity_id,
            )
            .with("orderId", order_id)
            .with("poNumber", po)
            .with("status", current.status.as_str())
            .with("requiresAction", requires_action),
        );
    }

    intents
}

fn is_client_visible(status: &OrderStatus) -> bool {
    matches!(
        status,
        OrderStatus::DesignApproval
            | OrderStatus::InProgress
            | OrderStatus::Qc
            | OrderStatus::ReadyForDelivery
            | OrderStatus::Delivered
    )
}

fn is_production_relevant(status: &OrderStatus) -> bool {
    matches!(
        status,
        OrderStatus::ProductionPlanned
            | OrderStatus::InProgress
            | OrderStatus::Qc
            | OrderStatus::Blocked
    )
}

fn client_message(status: &OrderStatus, po: &str) -> Option<String> {
    let text = match status {
        OrderStatus::DesignApproval => format!("Design for order {po} is ready for your approval"),
        OrderStatus::InProgress => format!("Order {po} is now in production"),
        OrderStatus::Qc => format!("Order {po} is undergoing quality control"),
        OrderStatus::ReadyForDelivery => format!("Order {po} is ready for delivery"),
        OrderStatus::Delivered => format!("Order {po} has been delivered"),
        _ => return None,
    };
    Some(text)
}
