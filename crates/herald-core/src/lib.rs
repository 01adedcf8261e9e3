//! herald-core
//!
//! ERP のドメインイベント（受注ステータス変更、工程完了、デザインアップロード、
//! 品質アラート、配送予定）を、宛先・チャネル・優先度の決まった通知に変えて
//! 外部の配送 sink に届けるエンジン。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（event, intent, outcome, status, ids, errors）
//! - **policy**: 優先度・進捗率・工程順の純粋なルックアップ
//! - **rules**: Event → NotificationIntent のルールエンジン（純粋関数）
//! - **ports**: 抽象化レイヤー（DeliverySink, EventSource, Clock, IdGenerator）
//! - **impls**: 実装（HttpDeliverySink, InMemoryDeliverySink, InMemoryEventSource）
//! - **app**: オーケストレーション（TriggerProcessor, Dispatcher, TriggerListener）
//! - **config**: 設定（TOML + 環境変数）
//! - **telemetry**: tracing の初期化

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod policy;
pub mod ports;
pub mod rules;
pub mod telemetry;

pub use app::{ProcessorBuilder, TriggerListener, TriggerProcessor, TriggerReport};
pub use config::HeraldConfig;
pub use domain::{Event, HeraldError, NotificationIntent};
pub use rules::derive_intents;
