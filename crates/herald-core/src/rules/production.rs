//! PRODUCTION_STAGE_COMPLETED のルール
//!
//! - 顧客に見せる工程（CUTTING, PRINTING, SEWING, QC）の完了 → クライアント向け
//! - 次工程があれば → `{次工程}_OPERATOR` ロール向けに「準備完了」

use crate::domain::{
    Channel, NotificationIntent, NotificationKind, Priority, StageState, Target, Workcenter,
};
use crate::policy::next_pipeline_stage;

use super::{client_of, order_id_of, po_label};

pub(super) fn derive(entity_id: &str, state: &StageState) -> Vec<NotificationIntent> {
    let mut intents = Vec::with_capacity(2);
    let order = state.order.as_ref();
    let po = po_label(order, entity_id);
    let next_stage = next_pipeline_stage(&state.workcenter);

    if is_client_visible(&state.workcenter)
        && let Some(client_id) = client_of(order)
    {
        intents.push(
            NotificationIntent::new(
                NotificationKind::StageCompleted,
                Channel::ClientPortal,
                Target::client(client_id),
                Priority::Normal,
                format!("{} stage completed for order {po}", state.workcenter),
                entity_id,
            )
            .with_opt("orderId", order_id_of(order))
            .with("poNumber", po.as_str())
            .with("completedStage", state.workcenter.as_str())
            .with_opt("nextStage", next_stage.map(Workcenter::as_str))
            .with_opt("efficiency", state.efficiency_percentage),
        );
    }

    if let Some(next) = next_stage {
        intents.push(
            NotificationIntent::new(
                NotificationKind::StageReady,
                Channel::Production,
                Target::role(format!("{next}_OPERATOR")),
                Priority::Normal,
                format!("Order {po} ready for {next}"),
                entity_id,
            )
            .with_opt("orderId", order_id_of(order))
            .with("poNumber", po.as_str())
            .with("completedStage", state.workcenter.as_str())
            .with("nextStage", next.as_str()),
        );
    }

    intents
}

fn is_client_visible(workcenter: &Workcenter) -> bool {
    matches!(
        workcenter,
        Workcenter::Cutting | Workcenter::Printing | Workcenter::Sewing | Workcenter::Qc
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderRef;
    use rstest::rstest;
    use serde_json::json;

    fn stage(workcenter: Workcenter) -> StageState {
        StageState {
            workcenter,
            efficiency_percentage: Some(92.5),
            order: Some(OrderRef {
                id: Some("ord_2".into()),
                po_number: Some("ASH-002".into()),
                client_id: Some("c2".into()),
            }),
        }
    }

    fn stage_ready(intents: &[NotificationIntent]) -> Vec<&NotificationIntent> {
        intents
            .iter()
            .filter(|i| i.kind == NotificationKind::StageReady)
            .collect()
    }

    #[test]
    fn qc_completion_hands_off_to_packing_operator() {
        let intents = derive("step_4", &stage(Workcenter::Qc));
        let ready = stage_ready(&intents);
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].target, Target::role("PACKING_OPERATOR"));
        assert_eq!(ready[0].channel, Channel::Production);
        assert_eq!(ready[0].message, "Order ASH-002 ready for PACKING");
    }

    #[test]
    fn last_stage_emits_no_handoff() {
        let intents = derive("step_6", &stage(Workcenter::Delivery));
        assert!(stage_ready(&intents).is_empty());
        // DELIVERY は顧客向け工程でもない
        assert!(intents.is_empty());
    }

    #[test]
    fn unknown_workcenter_emits_nothing() {
        let intents = derive("step_x", &stage(Workcenter::from("EMBROIDERY")));
        assert!(intents.is_empty());
    }

    #[rstest]
    #[case(Workcenter::Cutting, 2)]
    #[case(Workcenter::Printing, 2)]
    #[case(Workcenter::Sewing, 2)]
    #[case(Workcenter::Qc, 2)]
    #[case(Workcenter::Packing, 1)]
    #[case(Workcenter::Delivery, 0)]
    fn intent_count_per_workcenter(#[case] workcenter: Workcenter, #[case] expected: usize) {
        assert_eq!(derive("step", &stage(workcenter)).len(), expected);
    }

    #[test]
    fn client_intent_reports_next_stage_and_efficiency() {
        let intents = derive("step_3", &stage(Workcenter::Sewing));
        let client = intents
            .iter()
            .find(|i| i.channel == Channel::ClientPortal)
            .unwrap();

        assert_eq!(client.message, "SEWING stage completed for order ASH-002");
        assert_eq!(client.priority, Priority::Normal);
        assert_eq!(client.payload["nextStage"], json!("QC"));
        assert_eq!(client.payload["efficiency"], json!(92.5));
        assert_eq!(client.payload["orderId"], json!("ord_2"));
        assert_eq!(client.payload["entityId"], json!("step_3"));
    }

    #[test]
    fn missing_order_still_hands_off() {
        let state = StageState {
            workcenter: Workcenter::Cutting,
            efficiency_percentage: None,
            order: None,
        };
        let intents = derive("step_1", &state);
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].target, Target::role("PRINTING_OPERATOR"));
        assert_eq!(intents[0].message, "Order step_1 ready for PRINTING");
        assert!(!intents[0].payload.contains_key("orderId"));
    }
}
