//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **HttpDeliverySink**: 本番用。sink の HTTP エンドポイントへ POST
//! - **InMemoryDeliverySink**: テスト・dry-run 用。受け取ったものを記録する
//! - **InMemoryEventSource**: 開発用のイベントキュー

pub mod http_sink;
pub mod inmem_sink;
pub mod inmem_source;

pub use self::http_sink::HttpDeliverySink;
pub use self::inmem_sink::InMemoryDeliverySink;
pub use self::inmem_source::InMemoryEventSource;
