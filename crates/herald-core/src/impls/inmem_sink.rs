//! InMemoryDeliverySink - 受け取った SinkMessage を記録するだけの sink
//!
//! テストと CLI の `--dry-run` 用。拒否条件と遅延を注入できるので、
//! 「k 件目だけ失敗」「タイムアウト」を sink 無しで再現できる。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::ports::{DeliverySink, SinkError, SinkMessage};

type RejectFn = dyn Fn(&SinkMessage) -> Option<u16> + Send + Sync;

#[derive(Default)]
pub struct InMemoryDeliverySink {
    delivered: Mutex<Vec<SinkMessage>>,
    attempts: AtomicUsize,
    reject: Option<Arc<RejectFn>>,
    latency: Option<Duration>,
}

impl InMemoryDeliverySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `reject` が `Some(status)` を返したメッセージは non-2xx 扱いにする
    pub fn rejecting<F>(mut self, reject: F) -> Self
    where
        F: Fn(&SinkMessage) -> Option<u16> + Send + Sync + 'static,
    {
        self.reject = Some(Arc::new(reject));
        self
    }

    /// 毎回の deliver の前に待つ
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// 受け付けた（2xx 相当の）メッセージ
    pub async fn delivered(&self) -> Vec<SinkMessage> {
        self.delivered.lock().await.clone()
    }

    /// 拒否分も含めた deliver 呼び出し回数
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliverySink for InMemoryDeliverySink {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn deliver(&self, message: &SinkMessage) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(reject) = &self.reject
            && let Some(status) = reject(message)
        {
            return Err(SinkError::Rejected { status });
        }

        debug!(sink = "in_memory", channel = %message.channel, "notification recorded");
        self.delivered.lock().await.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Channel, NotificationIntent, NotificationKind, Priority, Target};

    fn message(target: Target) -> SinkMessage {
        let intent = NotificationIntent::new(
            NotificationKind::ProductionUpdate,
            Channel::Internal,
            target,
            Priority::Normal,
            "Order ASH-001 status changed to QC",
            "ord_1",
        );
        SinkMessage::from(&intent)
    }

    #[tokio::test]
    async fn records_accepted_messages() {
        let sink = InMemoryDeliverySink::new();
        sink.deliver(&message(Target::role("PRODUCTION_MANAGER")))
            .await
            .unwrap();

        let delivered = sink.delivered().await;
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].target_role.as_deref(), Some("PRODUCTION_MANAGER"));
        assert_eq!(sink.attempts(), 1);
    }

    #[tokio::test]
    async fn rejected_messages_count_as_attempts_only() {
        let sink = InMemoryDeliverySink::new()
            .rejecting(|m| m.target_client_id.is_some().then_some(500));

        let err = sink
            .deliver(&message(Target::client("c1")))
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::Rejected { status: 500 }));

        sink.deliver(&message(Target::Broadcast)).await.unwrap();

        assert_eq!(sink.attempts(), 2);
        assert_eq!(sink.delivered().await.len(), 1);
    }
}
