//! NotificationIntent - ルールエンジンの出力 / Dispatcher の入力
//!
//! Intent は「誰に・どのチャネルで・どの優先度で・何を」届けるかが
//! 全て決まった通知。message はレンダリング済みで、下流でテンプレート展開はしない。

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Delivery priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        };
        f.write_str(s)
    }
}

/// Logical delivery topic the sink routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    ClientPortal,
    Internal,
    Production,
    QualityControl,
    AiInsights,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::ClientPortal => "client-portal",
            Channel::Internal => "internal",
            Channel::Production => "production",
            Channel::QualityControl => "quality-control",
            Channel::AiInsights => "ai-insights",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification type tag (the sink's `type` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OrderStatusChange,
    ProductionUpdate,
    StageCompleted,
    StageReady,
    DesignApprovalNeeded,
    QualityAlert,
    QualityIssue,
    DeliveryScheduled,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::OrderStatusChange => "order_status_change",
            NotificationKind::ProductionUpdate => "production_update",
            NotificationKind::StageCompleted => "stage_completed",
            NotificationKind::StageReady => "stage_ready",
            NotificationKind::DesignApprovalNeeded => "design_approval_needed",
            NotificationKind::QualityAlert => "quality_alert",
            NotificationKind::QualityIssue => "quality_issue",
            NotificationKind::DeliveryScheduled => "delivery_scheduled",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audience of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Target {
    User { id: String },
    Client { id: String },
    Role { role: String },
    Broadcast,
}

impl Target {
    pub fn user(id: impl Into<String>) -> Self {
        Target::User { id: id.into() }
    }

    pub fn client(id: impl Into<String>) -> Self {
        Target::Client { id: id.into() }
    }

    pub fn role(role: impl Into<String>) -> Self {
        Target::Role { role: role.into() }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::User { id } => write!(f, "user:{id}"),
            Target::Client { id } => write!(f, "client:{id}"),
            Target::Role { role } => write!(f, "role:{role}"),
            Target::Broadcast => f.write_str("broadcast"),
        }
    }
}

/// A fully-rendered, targeted, prioritized notification.
///
/// `payload` は必ず `entityId`（発生元エンティティの ID）を含む。
/// コンストラクタがそれを保証するので、ルール側で入れ忘れることはない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationIntent {
    pub kind: NotificationKind,
    pub channel: Channel,
    pub target: Target,
    pub priority: Priority,
    pub message: String,
    pub payload: Map<String, Value>,
}

impl NotificationIntent {
    pub fn new(
        kind: NotificationKind,
        channel: Channel,
        target: Target,
        priority: Priority,
        message: impl Into<String>,
        entity_id: &str,
    ) -> Self {
        let mut payload = Map::new();
        payload.insert("entityId".to_string(), Value::String(entity_id.to_string()));
        Self {
            kind,
            channel,
            target,
            priority,
            message: message.into(),
            payload,
        }
    }

    /// Add a payload field.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    /// Add a payload field only when the value is present.
    pub fn with_opt<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.payload.get("entityId").and_then(Value::as_str)
    }

    pub fn order_id(&self) -> Option<&str> {
        self.payload.get("orderId").and_then(Value::as_str)
    }
}
