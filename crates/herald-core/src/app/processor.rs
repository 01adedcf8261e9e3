//! TriggerProcessor - 1 イベントを通知に変えて配送するオーケストレーター
//!
//! Event → `rules::derive_intents` → `Dispatcher::dispatch_all` → TriggerReport
//!
//! # 設計原則
//! - `process` はエラーを返さないし、panic を外に漏らさない
//! - 集計は 1 件の info ログにまとめる（trigger_id でログを突き合わせる）
//! - 呼び出しをまたぐ可変状態を持たない（sink は `Arc<dyn DeliverySink>` で共有するだけ）

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, info_span, warn};

use crate::domain::Event;
use crate::ports::{Clock, IdGenerator};
use crate::rules::derive_intents;

use super::dispatcher::{Dispatcher, panic_message};
use super::report::TriggerReport;

pub struct TriggerProcessor {
    dispatcher: Dispatcher,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl TriggerProcessor {
    pub(crate) fn new(
        dispatcher: Dispatcher,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            dispatcher,
            ids,
            clock,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Derive intents for `event`, deliver them all, and report.
    pub async fn process(&self, event: Event) -> TriggerReport {
        let trigger_id = self.ids.generate_trigger_id();
        let span = info_span!(
            "trigger",
            trigger_id = %trigger_id,
            kind = %event.kind(),
            entity_id = %event.entity_id,
        );

        async move {
            if !event.is_consistent() {
                warn!(
                    declared = ?event.entity_kind,
                    implied = ?event.body.entity_kind(),
                    "entity kind does not match event kind; processing anyway"
                );
            }

            // sink 側の panic は Dispatcher が intent 単位で捕まえる。ここはルール評価だけ
            let (intents, panicked) =
                match std::panic::catch_unwind(AssertUnwindSafe(|| derive_intents(&event))) {
                    Ok(intents) => (intents, false),
                    Err(panic) => {
                        error!(
                            panic = %panic_message(panic.as_ref()),
                            "rule evaluation panicked"
                        );
                        (Vec::new(), true)
                    }
                };
            let produced = intents.len();
            let outcomes = self.dispatcher.dispatch_all(&intents).await;

            let delivered = outcomes.iter().filter(|o| o.success()).count();
            let report = TriggerReport {
                trigger_id,
                kind: event.kind(),
                entity_id: event.entity_id.clone(),
                entity_kind: event.resolved_entity_kind(),
                workspace_id: event.workspace_id.clone(),
                produced,
                delivered,
                failed: outcomes.len() - delivered,
                panicked,
                processed_at: self.clock.now(),
                outcomes,
            };
            log_report(&report);
            report
        }
        .instrument(span)
        .await
    }

    /// Fire-and-forget: process on a tokio task.
    pub fn spawn(self: &Arc<Self>, event: Event) -> JoinHandle<TriggerReport> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.process(event).await })
    }
}

fn log_report(report: &TriggerReport) {
    let entity_kind = report
        .entity_kind
        .map(|k| k.to_string())
        .unwrap_or_default();
    info!(
        kind = %report.kind,
        entity_kind = %entity_kind,
        workspace_id = %report.workspace_id,
        produced = report.produced,
        delivered = report.delivered,
        failed = report.failed,
        "trigger processed"
    );
}
