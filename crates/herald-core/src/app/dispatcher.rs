//! Dispatcher - intent を sink に 1 件ずつ届ける
//!
//! # 設計原則
//! - 1 intent = 1 回の sink 呼び出し。リトライしない
//! - 各呼び出しに上限時間を付ける（タイムアウトは失敗と同じ扱い）
//! - 失敗は warn ログ + `success=false` の outcome。呼び出し元へはエラーにしない
//! - 兄弟 intent は並行に送る。どれかが失敗しても残りは必ず送る
//! - sink 内の panic も intent 単位で捕まえ、失敗 outcome にする

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use futures_util::future::join_all;
use tracing::{debug, error, warn};

use crate::domain::{DeliveryOutcome, NotificationIntent, OutcomeKind};
use crate::ports::{DeliverySink, IdGenerator, SinkMessage};

pub struct Dispatcher {
    sink: Arc<dyn DeliverySink>,
    timeout: Duration,
    ids: Arc<dyn IdGenerator>,
}

impl Dispatcher {
    pub fn new(sink: Arc<dyn DeliverySink>, timeout: Duration, ids: Arc<dyn IdGenerator>) -> Self {
        Self { sink, timeout, ids }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 1 件配送して結果を返す。失敗してもエラーにはしない。
    pub async fn dispatch(&self, intent: &NotificationIntent) -> DeliveryOutcome {
        let notification_id = self.ids.generate_notification_id();
        let message = SinkMessage::from(intent);
        let started = Instant::now();

        let delivery = AssertUnwindSafe(self.sink.deliver(&message)).catch_unwind();
        let result = tokio::time::timeout(self.timeout, delivery).await;
        let elapsed = started.elapsed();

        match result {
            Ok(Ok(Ok(()))) => {
                debug!(
                    notification_id = %notification_id,
                    sink = self.sink.name(),
                    channel = %intent.channel,
                    target = %intent.target,
                    kind = %intent.kind,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "notification delivered"
                );
                DeliveryOutcome::delivered(notification_id, intent.clone(), elapsed)
            }
            Ok(Ok(Err(err))) => {
                warn!(
                    notification_id = %notification_id,
                    sink = self.sink.name(),
                    channel = %intent.channel,
                    target = %intent.target,
                    kind = %intent.kind,
                    error = %err,
                    error_kind = ?err.kind(),
                    "notification delivery failed"
                );
                DeliveryOutcome::failed(
                    notification_id,
                    intent.clone(),
                    err.outcome_kind(),
                    err.to_string(),
                    elapsed,
                )
            }
            Ok(Err(panic)) => {
                let reason = format!("sink panicked: {}", panic_message(panic.as_ref()));
                error!(
                    notification_id = %notification_id,
                    sink = self.sink.name(),
                    channel = %intent.channel,
                    target = %intent.target,
                    kind = %intent.kind,
                    error = %reason,
                    "notification delivery panicked"
                );
                DeliveryOutcome::failed(
                    notification_id,
                    intent.clone(),
                    OutcomeKind::Rejected,
                    reason,
                    elapsed,
                )
            }
            Err(_) => {
                warn!(
                    notification_id = %notification_id,
                    sink = self.sink.name(),
                    channel = %intent.channel,
                    target = %intent.target,
                    kind = %intent.kind,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "notification delivery timed out"
                );
                DeliveryOutcome::failed(
                    notification_id,
                    intent.clone(),
                    OutcomeKind::TimedOut,
                    format!("no response within {} ms", self.timeout.as_millis()),
                    elapsed,
                )
            }
        }
    }

    /// 全 intent を並行に配送する。outcome は intent と同じ順に並ぶ。
    pub async fn dispatch_all(&self, intents: &[NotificationIntent]) -> Vec<DeliveryOutcome> {
        join_all(intents.iter().map(|intent| self.dispatch(intent))).await
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
