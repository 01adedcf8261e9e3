//! TriggerReport - 1 回の trigger 処理の集計
//!
//! `process` の戻り値であり、同じ内容が info ログにも出る。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DeliveryOutcome, EntityKind, EventKind, TriggerId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerReport {
    pub trigger_id: TriggerId,
    pub kind: EventKind,
    pub entity_id: String,
    pub entity_kind: Option<EntityKind>,
    pub workspace_id: String,

    /// ルールが導出した intent 数
    pub produced: usize,
    pub delivered: usize,
    pub failed: usize,

    /// ルール評価中の panic を捕まえた（sink の panic は該当 outcome の失敗になる）
    #[serde(default)]
    pub panicked: bool,

    pub processed_at: DateTime<Utc>,

    #[serde(default)]
    pub outcomes: Vec<DeliveryOutcome>,
}

impl TriggerReport {
    /// 全 intent が配送できた（intent 0 件も含む）
    pub fn all_delivered(&self) -> bool {
        !self.panicked && self.failed == 0
    }
}
