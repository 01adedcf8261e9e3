//! Event - 外部サブシステムで起きた状態変化の記録
//!
//! Event は呼び出し側（受注管理、生産トラッキング、デザイン管理、品質管理、
//! 配送スケジューリング）が組み立てて渡す。振る舞いは持たない。
//!
//! # 設計原則
//! - kind ごとに `currentState` の形が違うので、sum type（`EventBody`）で表す
//! - ルールが使う任意フィールドは `Option`。欠けていてもパイプラインは落ちない
//! - 未知の kind は `EventBody::Unknown` として受け取る（エラーにしない）

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use super::status::{ApprovalStatus, OrderStatus, Severity, Workcenter};

/// Closed set of event kinds, as a plain tag (for logs and reports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    OrderStatusChanged,
    ProductionStageCompleted,
    DesignUploaded,
    QualityAlertRaised,
    DeliveryScheduled,
    Unknown,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::OrderStatusChanged => "ORDER_STATUS_CHANGED",
            EventKind::ProductionStageCompleted => "PRODUCTION_STAGE_COMPLETED",
            EventKind::DesignUploaded => "DESIGN_UPLOADED",
            EventKind::QualityAlertRaised => "QUALITY_ALERT_RAISED",
            EventKind::DeliveryScheduled => "DELIVERY_SCHEDULED",
            EventKind::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of the domain object an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Order,
    RoutingStep,
    DesignAsset,
    QualityCheck,
    Delivery,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Order => "order",
            EntityKind::RoutingStep => "routingStep",
            EntityKind::DesignAsset => "designAsset",
            EntityKind::QualityCheck => "qualityCheck",
            EntityKind::Delivery => "delivery",
        };
        f.write_str(s)
    }
}

/// Reference to the parent order carried by non-order events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRef {
    pub id: Option<String>,
    pub po_number: Option<String>,
    pub client_id: Option<String>,
}

/// Snapshot of an order for `ORDER_STATUS_CHANGED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderState {
    pub id: Option<String>,
    pub status: OrderStatus,
    pub po_number: Option<String>,
    pub client_id: Option<String>,
}

impl OrderState {
    pub fn new(status: OrderStatus) -> Self {
        Self {
            id: None,
            status,
            po_number: None,
            client_id: None,
        }
    }

    pub fn with_po_number(mut self, po_number: impl Into<String>) -> Self {
        self.po_number = Some(po_number.into());
        self
    }

    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }
}

/// Snapshot of a completed routing step for `PRODUCTION_STAGE_COMPLETED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageState {
    pub workcenter: Workcenter,
    pub efficiency_percentage: Option<f64>,
    pub order: Option<OrderRef>,
}

/// Snapshot of an uploaded design asset for `DESIGN_UPLOADED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignState {
    pub id: Option<String>,
    pub approval_status: Option<ApprovalStatus>,
    pub file_name: Option<String>,
    pub version: Option<u32>,
    pub design_type: Option<String>,
    pub order: Option<OrderRef>,
}

/// Snapshot of a quality check for `QUALITY_ALERT_RAISED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityState {
    pub issue_description: Option<String>,
    pub severity: Option<Severity>,
    pub estimated_delay_hours: Option<f64>,
    pub order: Option<OrderRef>,
}

/// Snapshot of a delivery for `DELIVERY_SCHEDULED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryState {
    /// RFC 3339、または日付だけ（`2024-03-01` は UTC 0 時とみなす）
    #[serde(default, deserialize_with = "lenient_date")]
    pub scheduled_date: Option<DateTime<Utc>>,
    pub tracking_number: Option<String>,
    pub driver_name: Option<String>,
    pub order: Option<OrderRef>,
}

/// 読めない日付は None にする（イベント全体を捨てない）
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(at.with_timezone(&Utc)));
    }
    let midnight = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive));
    if midnight.is_none() {
        warn!(value = %raw, "unreadable date; treating as absent");
    }
    Ok(midnight)
}

/// Kind-specific part of an event: the tag plus its typed state snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventBody {
    #[serde(rename_all = "camelCase")]
    OrderStatusChanged {
        #[serde(default)]
        previous_state: Option<OrderState>,
        current_state: OrderState,
    },

    #[serde(rename_all = "camelCase")]
    ProductionStageCompleted { current_state: StageState },

    #[serde(rename_all = "camelCase")]
    DesignUploaded { current_state: DesignState },

    #[serde(rename_all = "camelCase")]
    QualityAlertRaised { current_state: QualityState },

    #[serde(rename_all = "camelCase")]
    DeliveryScheduled { current_state: DeliveryState },

    /// kind が語彙に無いイベント。ルールは何も出さない。
    #[serde(other)]
    Unknown,
}

impl EventBody {
    pub fn kind(&self) -> EventKind {
        match self {
            EventBody::OrderStatusChanged { .. } => EventKind::OrderStatusChanged,
            EventBody::ProductionStageCompleted { .. } => EventKind::ProductionStageCompleted,
            EventBody::DesignUploaded { .. } => EventKind::DesignUploaded,
            EventBody::QualityAlertRaised { .. } => EventKind::QualityAlertRaised,
            EventBody::DeliveryScheduled { .. } => EventKind::DeliveryScheduled,
            EventBody::Unknown => EventKind::Unknown,
        }
    }

    /// The entity kind this event kind is about.
    pub fn entity_kind(&self) -> Option<EntityKind> {
        match self {
            EventBody::OrderStatusChanged { .. } => Some(EntityKind::Order),
            EventBody::ProductionStageCompleted { .. } => Some(EntityKind::RoutingStep),
            EventBody::DesignUploaded { .. } => Some(EntityKind::DesignAsset),
            EventBody::QualityAlertRaised { .. } => Some(EntityKind::QualityCheck),
            EventBody::DeliveryScheduled { .. } => Some(EntityKind::Delivery),
            EventBody::Unknown => None,
        }
    }
}

/// An immutable record of a state change in an external subsystem.
///
/// # JSON 形
/// ```json
/// {
///   "kind": "ORDER_STATUS_CHANGED",
///   "entityId": "ord_1",
///   "entityKind": "order",
///   "currentState": { "status": "QC", "poNumber": "ASH-001", "clientId": "c1" },
///   "workspaceId": "ws_1",
///   "triggeredBy": "user_9",
///   "occurredAt": "2024-01-01T12:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(flatten)]
    pub body: EventBody,

    pub entity_id: String,

    /// 呼び出し側が申告した entity kind（省略可）。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_kind: Option<EntityKind>,

    #[serde(default)]
    pub workspace_id: String,

    #[serde(default = "system_actor")]
    pub triggered_by: String,

    #[serde(default = "Utc::now")]
    pub occurred_at: DateTime<Utc>,
}

fn system_actor() -> String {
    "system".to_string()
}

impl Event {
    /// Build an event; `entity_kind` is derived from the body.
    pub fn new(entity_id: impl Into<String>, body: EventBody) -> Self {
        Self {
            entity_kind: body.entity_kind(),
            body,
            entity_id: entity_id.into(),
            workspace_id: String::new(),
            triggered_by: system_actor(),
            occurred_at: Utc::now(),
        }
    }

    pub fn order_status_changed(
        order_id: impl Into<String>,
        previous_state: Option<OrderState>,
        current_state: OrderState,
    ) -> Self {
        Self::new(
            order_id,
            EventBody::OrderStatusChanged {
                previous_state,
                current_state,
            },
        )
    }

    pub fn production_stage_completed(step_id: impl Into<String>, state: StageState) -> Self {
        Self::new(
            step_id,
            EventBody::ProductionStageCompleted {
                current_state: state,
            },
        )
    }

    pub fn design_uploaded(design_id: impl Into<String>, state: DesignState) -> Self {
        Self::new(
            design_id,
            EventBody::DesignUploaded {
                current_state: state,
            },
        )
    }

    pub fn quality_alert_raised(check_id: impl Into<String>, state: QualityState) -> Self {
        Self::new(
            check_id,
            EventBody::QualityAlertRaised {
                current_state: state,
            },
        )
    }

    pub fn delivery_scheduled(delivery_id: impl Into<String>, state: DeliveryState) -> Self {
        Self::new(
            delivery_id,
            EventBody::DeliveryScheduled {
                current_state: state,
            },
        )
    }

    pub fn in_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = workspace_id.into();
        self
    }

    pub fn triggered_by(mut self, actor: impl Into<String>) -> Self {
        self.triggered_by = actor.into();
        self
    }

    pub fn occurred_at(mut self, at: DateTime<Utc>) -> Self {
        self.occurred_at = at;
        self
    }

    pub fn kind(&self) -> EventKind {
        self.body.kind()
    }

    /// Declared entity kind, or the one implied by the event kind.
    pub fn resolved_entity_kind(&self) -> Option<EntityKind> {
        self.entity_kind.or_else(|| self.body.entity_kind())
    }

    /// Whether the declared entity kind (if any) matches the event kind.
    pub fn is_consistent(&self) -> bool {
        match (self.entity_kind, self.body.entity_kind()) {
            (Some(declared), Some(implied)) => declared == implied,
            _ => true,
        }
    }
}
