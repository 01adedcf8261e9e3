//! Rules - Event から NotificationIntent を導出するルールエンジン
//!
//! `derive_intents` は純粋関数。ネットワークにも時計にも触らないので、
//! sink 無しで決定的にテストできる。
//!
//! # 設計原則
//! - event kind ごとに 1 モジュール（order, production, design, quality, delivery）
//! - ルールが必要とするフィールドが欠けていたら、その intent だけを出さない
//! - 兄弟 intent の生成は互いに独立（片方が欠けてももう片方は出る）

mod delivery;
mod design;
mod order;
mod production;
mod quality;

use crate::domain::{Event, EventBody, NotificationIntent, OrderRef};

/// Map one event to zero or more notification intents.
pub fn derive_intents(event: &Event) -> Vec<NotificationIntent> {
    let entity_id = event.entity_id.as_str();
    match &event.body {
        EventBody::OrderStatusChanged {
            previous_state,
            current_state,
        } => order::derive(entity_id, previous_state.as_ref(), current_state),
        EventBody::ProductionStageCompleted { current_state } => {
            production::derive(entity_id, current_state)
        }
        EventBody::DesignUploaded { current_state } => design::derive(entity_id, current_state),
        EventBody::QualityAlertRaised { current_state } => {
            quality::derive(entity_id, current_state)
        }
        EventBody::DeliveryScheduled { current_state } => {
            delivery::derive(entity_id, current_state)
        }
        EventBody::Unknown => Vec::new(),
    }
}

/// Label used for `{po}` in messages: PO number, else order id, else the event's entity id.
fn po_label(order: Option<&OrderRef>, entity_id: &str) -> String {
    order
        .and_then(|o| o.po_number.as_deref().or(o.id.as_deref()))
        .unwrap_or(entity_id)
        .to_string()
}

fn client_of(order: Option<&OrderRef>) -> Option<&str> {
    order.and_then(|o| o.client_id.as_deref())
}

fn order_id_of(order: Option<&OrderRef>) -> Option<String> {
    order.and_then(|o| o.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ApprovalStatus, Channel, DesignState, OrderState, OrderStatus, Priority, StageState,
        Target, Workcenter,
    };

    #[test]
    fn unknown_kind_yields_nothing() {
        let event = Event::new("inv_1", EventBody::Unknown);
        assert!(derive_intents(&event).is_empty());
    }

    #[test]
    fn ready_for_delivery_notifies_client_only() {
        let event = Event::order_status_changed(
            "ord_1",
            None,
            OrderState::new(OrderStatus::ReadyForDelivery)
                .with_po_number("ASH-001")
                .with_client("c1"),
        );

        let intents = derive_intents(&event);
        assert_eq!(intents.len(), 1);
        let client = &intents[0];
        assert_eq!(client.target, Target::client("c1"));
        assert_eq!(client.channel, Channel::ClientPortal);
        assert_eq!(client.priority, Priority::High);
        assert!(client.message.contains("ready for delivery"));
        assert!(intents.iter().all(|i| i.channel != Channel::Internal));
    }

    #[test]
    fn sewing_completion_notifies_client_and_qc_operator() {
        let event = Event::production_stage_completed(
            "step_3",
            StageState {
                workcenter: Workcenter::Sewing,
                efficiency_percentage: None,
                order: Some(OrderRef {
                    id: None,
                    po_number: Some("ASH-002".into()),
                    client_id: Some("c2".into()),
                }),
            },
        );

        let intents = derive_intents(&event);
        assert_eq!(intents.len(), 2);
        assert!(intents.iter().any(|i| i.target == Target::client("c2")));
        assert!(intents.iter().any(|i| i.target == Target::role("QC_OPERATOR")));
    }

    #[test]
    fn approved_design_yields_nothing() {
        let event = Event::design_uploaded(
            "dsg_1",
            DesignState {
                id: None,
                approval_status: Some(ApprovalStatus::Approved),
                file_name: None,
                version: None,
                design_type: None,
                order: None,
            },
        );
        assert!(derive_intents(&event).is_empty());
    }

    #[test]
    fn po_label_falls_back_to_order_id_then_entity_id() {
        let with_po = OrderRef {
            id: Some("ord_1".into()),
            po_number: Some("ASH-9".into()),
            client_id: None,
        };
        let without_po = OrderRef {
            po_number: None,
            ..with_po.clone()
        };
        assert_eq!(po_label(Some(&with_po), "e"), "ASH-9");
        assert_eq!(po_label(Some(&without_po), "e"), "ord_1");
        assert_eq!(po_label(None, "e"), "e");
    }
}
