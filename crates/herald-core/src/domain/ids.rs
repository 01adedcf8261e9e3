//! Identifiers minted by the engine itself (strongly-typed IDs).
//!
//! Event / order / client の ID は呼び出し側が持ち込む文字列なのでここでは扱わない。
//! ここにあるのは 1 回の trigger 処理と、そこから出た個々の通知を
//! ログ上で突き合わせるための ULID だけ。
//!
//! ## Phantom Type パターン
//! `Id<T>` で共通実装を持ち、`T` はマーカー型（実行時には消える）。
//! TriggerId と NotificationId はコンパイル時に混同できない。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"trg-", "ntf-"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Trigger（processTrigger 1 回分）のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Trigger {}

impl IdMarker for Trigger {
    fn prefix() -> &'static str {
        "trg-"
    }
}

/// Notification（配送 1 回分）のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Notification {}

impl IdMarker for Notification {
    fn prefix() -> &'static str {
        "ntf-"
    }
}

/// Identifier of one trigger-processing call.
pub type TriggerId = Id<Trigger>;

/// Identifier of one delivery attempt. Never sent to the sink.
pub type NotificationId = Id<Notification>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_with_their_prefix() {
        let ulid = Ulid::new();
        let trigger = TriggerId::from_ulid(ulid);
        let notification = NotificationId::from_ulid(ulid);

        assert_eq!(trigger.as_ulid(), notification.as_ulid());
        assert!(trigger.to_string().starts_with("trg-"));
        assert!(notification.to_string().starts_with("ntf-"));
        // let _: TriggerId = notification; // <- does not compile
    }

    #[test]
    fn ids_roundtrip_through_json() {
        let id = TriggerId::from_ulid(Ulid::new());
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json["ulid"], serde_json::Value::String(id.as_ulid().to_string()));

        let back: TriggerId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;
        assert_eq!(size_of::<TriggerId>(), size_of::<Ulid>());
        assert_eq!(size_of::<NotificationId>(), 16);
    }
}
