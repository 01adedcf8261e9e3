//! ProcessorBuilder - TriggerProcessor の構築とワイヤリング
//!
//! # 設計原則
//! - sink は明示的に注入する（グローバルなシングルトンにしない）
//! - 起動時検証（Fail-fast）: sink 未設定・タイムアウト 0 は build() で弾く

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::HeraldConfig;
use crate::domain::HeraldError;
use crate::impls::HttpDeliverySink;
use crate::ports::{Clock, DeliverySink, IdGenerator, SinkError, SystemClock, UlidGenerator};

use super::dispatcher::Dispatcher;
use super::processor::TriggerProcessor;

/// 1 回の配送にかけるデフォルトの上限
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(5);

/// BuildError は構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no delivery sink configured")]
    MissingSink,

    #[error("dispatch timeout must be greater than zero")]
    ZeroTimeout,

    #[error("failed to build delivery sink: {0}")]
    Sink(#[from] SinkError),
}

/// ProcessorBuilder は TriggerProcessor を構築
///
/// # 使用例
/// ```ignore
/// let processor = ProcessorBuilder::new()
///     .sink(HttpDeliverySink::from_config(&config.sink)?)
///     .timeout(Duration::from_secs(3))
///     .build()?;
/// ```
pub struct ProcessorBuilder {
    sink: Option<Arc<dyn DeliverySink>>,
    timeout: Duration,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

impl ProcessorBuilder {
    pub fn new() -> Self {
        Self {
            sink: None,
            timeout: DEFAULT_DISPATCH_TIMEOUT,
            clock: None,
            ids: None,
        }
    }

    /// 設定から HTTP sink とタイムアウトを組み立てる
    pub fn from_config(config: &HeraldConfig) -> Result<Self, BuildError> {
        let sink = HttpDeliverySink::from_config(&config.sink)?;
        Ok(Self::new().sink(sink).timeout(config.sink.timeout()))
    }

    /// 設定ファイル（任意）と HERALD_* 環境変数から組み立てる
    pub fn from_config_path(path: Option<&Path>) -> Result<Self, HeraldError> {
        let config = HeraldConfig::load(path)?;
        Ok(Self::from_config(&config)?)
    }

    pub fn sink(self, sink: impl DeliverySink + 'static) -> Self {
        self.sink_arc(Arc::new(sink))
    }

    /// 呼び出し側と共有する sink（テストで中身を覗くときなど）
    pub fn sink_arc(mut self, sink: Arc<dyn DeliverySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Arc::new(ids));
        self
    }

    /// # 検証
    /// - sink が設定されていること
    /// - タイムアウトが 0 でないこと
    pub fn build(self) -> Result<TriggerProcessor, BuildError> {
        let sink = self.sink.ok_or(BuildError::MissingSink)?;
        if self.timeout.is_zero() {
            return Err(BuildError::ZeroTimeout);
        }

        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids: Arc<dyn IdGenerator> = match self.ids {
            Some(ids) => ids,
            None => Arc::new(UlidGenerator::new(Arc::clone(&clock))),
        };

        let dispatcher = Dispatcher::new(sink, self.timeout, Arc::clone(&ids));
        Ok(TriggerProcessor::new(dispatcher, ids, clock))
    }
}

impl Default for ProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
