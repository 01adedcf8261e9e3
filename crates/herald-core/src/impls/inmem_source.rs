//! InMemoryEventSource - 開発用のイベントキュー
//!
//! # 実装詳細
//! - tokio Mutex<VecDeque<Event>> + Notify による blocking pop
//! - `close()` 後は残りを吐き切ってから `SourceError::Closed`

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use crate::domain::Event;
use crate::ports::{EventSource, SourceError};

#[derive(Default)]
pub struct InMemoryEventSource {
    queue: Mutex<VecDeque<Event>>,
    notify: Notify,
    closed: AtomicBool,
}

impl InMemoryEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, event: Event) {
        self.queue.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// 以降 push されたものは受け取らない前提で閉じる
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub async fn len(&self) -> usize {
        self.queue.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.queue.lock().await.is_empty()
    }
}

#[async_trait]
impl EventSource for InMemoryEventSource {
    async fn next(&self, timeout: Duration) -> Result<Option<Event>, SourceError> {
        let deadline = Instant::now() + timeout;
        loop {
            // notified() を先に作っておき、pop と close の間の通知を取りこぼさない
            let notified = self.notify.notified();

            if let Some(event) = self.queue.lock().await.pop_front() {
                return Ok(Some(event));
            }
            if self.closed.load(Ordering::SeqCst) {
                return Err(SourceError::Closed);
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderState, OrderStatus};
    use std::sync::Arc;

    fn event(id: &str) -> Event {
        Event::order_status_changed(id, None, OrderState::new(OrderStatus::Qc))
    }

    #[tokio::test]
    async fn push_next_roundtrip_keeps_order() {
        let source = InMemoryEventSource::new();
        source.push(event("ord_1")).await;
        source.push(event("ord_2")).await;

        let first = source.next(Duration::from_secs(1)).await.unwrap().unwrap();
        let second = source.next(Duration::from_secs(1)).await.unwrap().unwrap();
        assert_eq!(first.entity_id, "ord_1");
        assert_eq!(second.entity_id, "ord_2");
    }

    #[tokio::test]
    async fn next_times_out_with_none() {
        let source = InMemoryEventSource::new();
        let start = Instant::now();
        let got = source.next(Duration::from_millis(100)).await.unwrap();
        assert!(got.is_none());
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn push_wakes_waiting_next() {
        let source = Arc::new(InMemoryEventSource::new());

        let waiter = tokio::spawn({
            let source = Arc::clone(&source);
            async move { source.next(Duration::from_secs(5)).await }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        source.push(event("ord_9")).await;

        let got = waiter.await.unwrap().unwrap().unwrap();
        assert_eq!(got.entity_id, "ord_9");
    }

    #[tokio::test]
    async fn close_drains_then_reports_closed() {
        let source = InMemoryEventSource::new();
        source.push(event("ord_1")).await;
        source.close();

        assert!(source.next(Duration::from_secs(1)).await.unwrap().is_some());
        assert!(matches!(
            source.next(Duration::from_secs(1)).await,
            Err(SourceError::Closed)
        ));
    }
}
