//! Domain model (events, intents, outcomes, ids, ...).
//!
//! - event: 外部から届く Event（kind ごとの sum type）
//! - status: ERP の状態語彙（OrderStatus, Workcenter, ...）
//! - intent: NotificationIntent と Target / Channel / Priority
//! - outcome: 配送結果（DeliveryOutcome）
//! - ids: エンジン自身が発行する ID（TriggerId, NotificationId）
//! - errors: エラー分類

pub mod errors;
pub mod event;
pub mod ids;
pub mod intent;
pub mod outcome;
pub mod status;

pub use errors::{ErrorKind, HeraldError};
pub use event::{
    DeliveryState, DesignState, EntityKind, Event, EventBody, EventKind, OrderRef, OrderState,
    QualityState, StageState,
};
pub use ids::{NotificationId, TriggerId};
pub use intent::{Channel, NotificationIntent, NotificationKind, Priority, Target};
pub use outcome::{DeliveryOutcome, OutcomeKind};
pub use status::{ApprovalStatus, OrderStatus, Severity, Workcenter};
