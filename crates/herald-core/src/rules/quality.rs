//! QUALITY_ALERT_RAISED のルール
//!
//! QC_MANAGER には常に通知する。重大度 HIGH のときだけクライアントにも知らせる。

use crate::domain::{
    Channel, NotificationIntent, NotificationKind, Priority, QualityState, Severity, Target,
};

use super::{client_of, order_id_of, po_label};

const QC_MANAGER: &str = "QC_MANAGER";

pub(super) fn derive(entity_id: &str, state: &QualityState) -> Vec<NotificationIntent> {
    let mut intents = Vec::with_capacity(2);
    let order = state.order.as_ref();
    let po = po_label(order, entity_id);
    let issue = state
        .issue_description
        .as_deref()
        .unwrap_or("no description provided");

    intents.push(
        NotificationIntent::new(
            NotificationKind::QualityAlert,
            Channel::QualityControl,
            Target::role(QC_MANAGER),
            Priority::High,
            format!("Quality alert on order {po}: {issue}"),
            entity_id,
        )
        .with_opt("orderId", order_id_of(order))
        .with("poNumber", po.as_str())
        .with_opt("severity", state.severity.as_ref().map(Severity::as_str))
        .with_opt("issueDescription", state.issue_description.as_deref()),
    );

    if state.severity == Some(Severity::High)
        && let Some(client_id) = client_of(order)
    {
        intents.push(
            NotificationIntent::new(
                NotificationKind::QualityIssue,
                Channel::ClientPortal,
                Target::client(client_id),
                Priority::High,
                format!(
                    "We identified a quality issue with order {po} and are working to resolve it"
                ),
                entity_id,
            )
            .with_opt("orderId", order_id_of(order))
            .with("poNumber", po.as_str())
            .with_opt("estimatedDelayHours", state.estimated_delay_hours),
        );
    }

    intents
}
