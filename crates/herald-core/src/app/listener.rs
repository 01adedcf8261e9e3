//! TriggerListener - EventSource を読み続けて TriggerProcessor に流す
//!
//! - `shutdown_tx` に true を送ると次のイベント待ちで止まる
//! - 処理中の trigger は中断しない（配送は最後まで走る）
//! - source が Closed を返したら自分で止まる

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::ports::{EventSource, SourceError};

use super::processor::TriggerProcessor;

/// source の `next` に渡す待ち時間のデフォルト
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Listener handle.
pub struct TriggerListener {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<usize>,
}

impl TriggerListener {
    pub fn spawn(source: Arc<dyn EventSource>, processor: Arc<TriggerProcessor>) -> Self {
        Self::spawn_with(source, processor, DEFAULT_POLL_TIMEOUT)
    }

    pub fn spawn_with(
        source: Arc<dyn EventSource>,
        processor: Arc<TriggerProcessor>,
        poll_timeout: Duration,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(listen_loop(source, processor, poll_timeout, shutdown_rx));
        Self { shutdown_tx, join }
    }

    /// Request shutdown. In-flight processing is not cancelled.
    pub fn request_shutdown(&self) {
        // receiver may already be gone if the loop exited on Closed
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait. Returns the number of events processed.
    pub async fn shutdown_and_join(self) -> usize {
        self.request_shutdown();
        self.join().await
    }

    /// Wait for the loop to stop on its own (source closed).
    pub async fn join(self) -> usize {
        match self.join.await {
            Ok(processed) => processed,
            Err(e) => {
                warn!(error = %e, "trigger listener task failed");
                0
            }
        }
    }
}

async fn listen_loop(
    source: Arc<dyn EventSource>,
    processor: Arc<TriggerProcessor>,
    poll_timeout: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> usize {
    let mut processed = 0;
    info!("trigger listener started");

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let next = tokio::select! {
            changed = shutdown_rx.changed() => {
                // sender が drop されたら止める
                if changed.is_err() {
                    break;
                }
                continue;
            }
            next = source.next(poll_timeout) => next,
        };

        match next {
            Ok(Some(event)) => {
                processor.process(event).await;
                processed += 1;
            }
            Ok(None) => debug!("no event within poll timeout"),
            Err(SourceError::Closed) => {
                info!("event source closed");
                break;
            }
            Err(e) => {
                warn!(error = %e, "event source unavailable; backing off");
                tokio::time::sleep(poll_timeout).await;
            }
        }
    }

    info!(processed, "trigger listener stopped");
    processed
}
