//! Outcome model: result of one delivery attempt.
//!
//! DeliveryOutcome is ephemeral. It only feeds logging and the per-trigger
//! report; nothing here is persisted.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ids::NotificationId;
use super::intent::NotificationIntent;

/// Classification of a delivery attempt.
///
/// Serialized as SCREAMING_SNAKE_CASE: DELIVERED / REJECTED / TIMED_OUT / UNREACHABLE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    /// The sink answered 2xx.
    Delivered,

    /// The sink answered with a non-2xx status, the envelope could not be encoded,
    /// or the sink panicked.
    Rejected,

    /// No answer within the dispatch timeout.
    TimedOut,

    /// Transport-level failure (connection refused, DNS, ...).
    Unreachable,
}

/// Success flag plus intent echo for one dispatched notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub notification_id: NotificationId,
    pub kind: OutcomeKind,
    pub intent: NotificationIntent,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    pub elapsed_ms: u64,
}

impl DeliveryOutcome {
    pub fn delivered(
        notification_id: NotificationId,
        intent: NotificationIntent,
        elapsed: Duration,
    ) -> Self {
        Self {
            notification_id,
            kind: OutcomeKind::Delivered,
            intent,
            reason: None,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn failed(
        notification_id: NotificationId,
        intent: NotificationIntent,
        kind: OutcomeKind,
        reason: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            notification_id,
            kind,
            intent,
            reason: Some(reason.into()),
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn success(&self) -> bool {
        self.kind == OutcomeKind::Delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::intent::{Channel, NotificationKind, Priority, Target};
    use ulid::Ulid;

    fn intent() -> NotificationIntent {
        NotificationIntent::new(
            NotificationKind::DeliveryScheduled,
            Channel::ClientPortal,
            Target::client("c1"),
            Priority::Normal,
            "Delivery scheduled for order ASH-001",
            "dlv_1",
        )
    }

    #[test]
    fn outcome_kind_serializes_as_required_names() {
        let s = serde_json::to_string(&OutcomeKind::TimedOut).unwrap();
        assert_eq!(s, "\"TIMED_OUT\"");

        let s = serde_json::to_string(&OutcomeKind::Delivered).unwrap();
        assert_eq!(s, "\"DELIVERED\"");
    }

    #[test]
    fn only_delivered_counts_as_success() {
        let id = NotificationId::from_ulid(Ulid::new());
        let ok = DeliveryOutcome::delivered(id, intent(), Duration::from_millis(3));
        assert!(ok.success());
        assert!(ok.reason.is_none());

        let rejected = DeliveryOutcome::failed(
            id,
            intent(),
            OutcomeKind::Rejected,
            "HTTP 503",
            Duration::from_millis(3),
        );
        assert!(!rejected.success());
        assert_eq!(rejected.reason.as_deref(), Some("HTTP 503"));
    }
}
