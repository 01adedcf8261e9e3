//! App - アプリケーション層
//!
//! ports とルールエンジンを組み合わせて、trigger 1 件の処理を実装します。
//!
//! # 主要コンポーネント
//! - **ProcessorBuilder**: 構築とワイヤリング（sink の注入、起動時検証）
//! - **TriggerProcessor**: Event → intents → 配送 → TriggerReport
//! - **Dispatcher**: intent 1 件を sink に届ける（タイムアウト付き、リトライなし）
//! - **TriggerListener**: EventSource を読み続けて processor に流す

pub mod builder;
pub mod dispatcher;
pub mod listener;
pub mod processor;
pub mod report;

pub use self::builder::{BuildError, DEFAULT_DISPATCH_TIMEOUT, ProcessorBuilder};
pub use self::dispatcher::Dispatcher;
pub use self::listener::TriggerListener;
pub use self::processor::TriggerProcessor;
pub use self::report::TriggerReport;
