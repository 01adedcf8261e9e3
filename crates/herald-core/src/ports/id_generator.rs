//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（本番用）

use crate::domain::ids::{NotificationId, TriggerId};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は trigger / notification の ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（並行 dispatch から使う）
pub trait IdGenerator: Send + Sync {
    /// Trigger ID を生成
    fn generate_trigger_id(&self) -> TriggerId;

    /// Notification ID を生成
    fn generate_notification_id(&self) -> NotificationId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// タイムスタンプ部分は Clock から取る。FixedClock を渡せばテストで検証できる。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_trigger_id(&self) -> TriggerId {
        TriggerId::from(self.next_ulid())
    }

    fn generate_notification_id(&self) -> NotificationId {
        NotificationId::from(self.next_ulid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn ulid_generator_generates_unique_ids() {
        let id_gen = UlidGenerator::new(SystemClock);

        let id1 = id_gen.generate_notification_id();
        let id2 = id_gen.generate_notification_id();
        let id3 = id_gen.generate_notification_id();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn fixed_clock_pins_the_timestamp_part() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let id_gen = UlidGenerator::new(FixedClock::new(fixed_time));

        let id1 = id_gen.generate_trigger_id();
        let id2 = id_gen.generate_trigger_id();

        // ランダム部分があるので ID 自体は異なる
        assert_ne!(id1, id2);
        assert_eq!(id1.as_ulid().timestamp_ms(), id2.as_ulid().timestamp_ms());
        assert_eq!(
            id1.as_ulid().timestamp_ms(),
            fixed_time.timestamp_millis() as u64
        );
    }

    #[test]
    fn prefixes_differ_per_id_type() {
        let id_gen = UlidGenerator::new(SystemClock);
        assert!(id_gen.generate_trigger_id().to_string().starts_with("trg-"));
        assert!(
            id_gen
                .generate_notification_id()
                .to_string()
                .starts_with("ntf-")
        );
    }
}
