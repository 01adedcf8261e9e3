//! Errors - エラー型と分類
//!
//! 通知まわりのエラーは呼び出し元（processTrigger の呼び出し側）には決して返らない。
//! ここの型が表に出るのは起動時（設定読み込み・ワイヤリング）と、
//! ログに残す分類（ErrorKind）だけ。

use thiserror::Error;

use crate::app::builder::BuildError;
use crate::config::ConfigError;
use crate::ports::{SinkError, SourceError};

/// ErrorKind は実行エラーの分類（運用向け）
///
/// - Transient: 一時的なエラー（sink の 5xx、タイムアウト）
/// - Permanent: 恒久的なエラー（4xx、エンコード失敗）
/// - Infrastructure: インフラエラー（接続不可など）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
    Infrastructure,
}

/// HeraldError は起動・ワイヤリング時のエラーをまとめたもの
#[derive(Debug, Error)]
pub enum HeraldError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Source(#[from] SourceError),
}
