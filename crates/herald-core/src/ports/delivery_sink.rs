//! DeliverySink port - 通知の配送先（WebSocket / SSE ハブなど）
//!
//! sink はファンアウトの責任を持つ外部ブローカー。ここから見えるのは
//! 「正規化された envelope を 1 件受け取って 2xx を返すかどうか」だけ。
//!
//! # 設計原則
//! - 1 intent = 1 回の deliver 呼び出し（バッチにしない）
//! - リトライしない（冪等キーが無いので重複通知になる）
//! - sink の失敗は SinkError で返し、outcome への変換は Dispatcher が行う

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{
    Channel, ErrorKind, NotificationIntent, NotificationKind, OutcomeKind, Priority, Target,
};

/// SinkMessage は sink に POST する JSON 本体
///
/// ```json
/// {"channel":"client-portal","type":"order_status_change","message":"...",
///  "data":{...},"target_client_id":"c1","order_id":"ord_1","priority":"high"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkMessage {
    pub channel: Channel,

    #[serde(rename = "type")]
    pub kind: NotificationKind,

    pub message: String,

    pub data: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    pub priority: Priority,
}

impl From<&NotificationIntent> for SinkMessage {
    fn from(intent: &NotificationIntent) -> Self {
        let (target_user_id, target_client_id, target_role) = match &intent.target {
            Target::User { id } => (Some(id.clone()), None, None),
            Target::Client { id } => (None, Some(id.clone()), None),
            Target::Role { role } => (None, None, Some(role.clone())),
            Target::Broadcast => (None, None, None),
        };

        Self {
            channel: intent.channel,
            kind: intent.kind,
            message: intent.message.clone(),
            data: intent.payload.clone(),
            target_user_id,
            target_client_id,
            target_role,
            order_id: intent.order_id().map(str::to_string),
            priority: intent.priority,
        }
    }
}

/// SinkError は 1 回の配送の失敗理由
#[derive(Debug, Error)]
pub enum SinkError {
    /// sink が non-2xx を返した
    #[error("sink rejected notification: HTTP {status}")]
    Rejected { status: u16 },

    /// sink 側（HTTP クライアント）のタイムアウト
    #[error("sink timed out")]
    Timeout,

    /// 接続できない・DNS 失敗など
    #[error("sink unreachable: {0}")]
    Transport(String),

    #[error("failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SinkError {
    /// 運用向けの分類
    pub fn kind(&self) -> ErrorKind {
        match self {
            SinkError::Rejected { status } if (400..500).contains(status) => ErrorKind::Permanent,
            SinkError::Rejected { .. } | SinkError::Timeout => ErrorKind::Transient,
            SinkError::Transport(_) => ErrorKind::Infrastructure,
            SinkError::Encode(_) => ErrorKind::Permanent,
        }
    }

    /// DeliveryOutcome に載せる分類
    pub fn outcome_kind(&self) -> OutcomeKind {
        match self {
            SinkError::Rejected { .. } | SinkError::Encode(_) => OutcomeKind::Rejected,
            SinkError::Timeout => OutcomeKind::TimedOut,
            SinkError::Transport(_) => OutcomeKind::Unreachable,
        }
    }
}

/// DeliverySink は正規化済みの通知を外部ブローカーに渡す
///
/// # Thread Safety
/// - `Send + Sync`（`Arc<dyn DeliverySink>` で並行 dispatch から共有する）
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// ログ用の sink 名
    fn name(&self) -> &str;

    /// 1 件配送する。2xx 相当なら Ok。
    async fn deliver(&self, message: &SinkMessage) -> Result<(), SinkError>;
}
