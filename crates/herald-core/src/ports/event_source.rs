//! EventSource port - ERP 側から押し込まれるイベントの受け口
//!
//! order / production / design / quality / delivery の各サブシステムが
//! 状態変更を永続化したあとに Event を流す。こちらは DB をポーリングしない。

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Event;

#[derive(Debug, Error)]
pub enum SourceError {
    /// これ以上イベントは来ない
    #[error("event source closed")]
    Closed,

    #[error("event source unavailable: {0}")]
    Unavailable(String),
}

/// EventSource は Event を 1 件ずつ渡す
///
/// # 設計原則
/// - blocking pop（timeout 付き）。timeout で `Ok(None)`
/// - 閉じたら `Err(SourceError::Closed)`
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn next(&self, timeout: Duration) -> Result<Option<Event>, SourceError>;
}
