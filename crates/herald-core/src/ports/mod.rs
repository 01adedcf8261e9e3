//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」。外部の協力者は 2 つだけで、
//! どちらも trait の向こう側にいる。
//!
//! # 設計原則
//! - EventSource: ERP からイベントを受け取る（push される側）
//! - DeliverySink: 通知 envelope を外部ブローカーに渡す
//! - Clock / IdGenerator: テストで差し替えるための薄い抽象

pub mod clock;
pub mod delivery_sink;
pub mod event_source;
pub mod id_generator;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::delivery_sink::{DeliverySink, SinkError, SinkMessage};
pub use self::event_source::{EventSource, SourceError};
pub use self::id_generator::{IdGenerator, UlidGenerator};
