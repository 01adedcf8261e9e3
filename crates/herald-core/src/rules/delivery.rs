//! DELIVERY_SCHEDULED のルール: クライアントに配送予定を 1 件通知する

use crate::domain::{
    Channel, DeliveryState, NotificationIntent, NotificationKind, Priority, Target,
};

use super::{client_of, order_id_of, po_label};

pub(super) fn derive(entity_id: &str, state: &DeliveryState) -> Vec<NotificationIntent> {
    let order = state.order.as_ref();
    let Some(client_id) = client_of(order) else {
        return Vec::new();
    };
    let po = po_label(order, entity_id);

    vec![
        NotificationIntent::new(
            NotificationKind::DeliveryScheduled,
            Channel::ClientPortal,
            Target::client(client_id),
            Priority::Normal,
            format!("Delivery scheduled for order {po}"),
            entity_id,
        )
        .with_opt("orderId", order_id_of(order))
        .with("poNumber", po.as_str())
        .with_opt("deliveryDate", state.scheduled_date.map(|d| d.to_rfc3339()))
        .with_opt("trackingNumber", state.tracking_number.as_deref())
        .with_opt("driverName", state.driver_name.as_deref()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderRef;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn schedules_one_client_notification() {
        let state = DeliveryState {
            scheduled_date: Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()),
            tracking_number: Some("TRK-1".into()),
            driver_name: Some("Dana".into()),
            order: Some(OrderRef {
                id: Some("ord_8".into()),
                po_number: Some("ASH-008".into()),
                client_id: Some("c8".into()),
            }),
        };

        let intents = derive("dlv_1", &state);
        assert_eq!(intents.len(), 1);

        let intent = &intents[0];
        assert_eq!(intent.target, Target::client("c8"));
        assert_eq!(intent.channel, Channel::ClientPortal);
        assert_eq!(intent.priority, Priority::Normal);
        assert_eq!(intent.message, "Delivery scheduled for order ASH-008");
        assert_eq!(intent.payload["deliveryDate"], json!("2024-03-01T09:00:00+00:00"));
        assert_eq!(intent.payload["trackingNumber"], json!("TRK-1"));
        assert_eq!(intent.payload["driverName"], json!("Dana"));
        assert_eq!(intent.order_id(), Some("ord_8"));
    }

    #[test]
    fn missing_client_emits_nothing() {
        let state = DeliveryState {
            scheduled_date: None,
            tracking_number: None,
            driver_name: None,
            order: Some(OrderRef::default()),
        };
        assert!(derive("dlv_1", &state).is_empty());
    }
}
