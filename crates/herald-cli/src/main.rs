use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use herald_core::domain::{
    ApprovalStatus, DesignState, Event, OrderRef, OrderState, OrderStatus, QualityState, Severity,
    StageState, Workcenter,
};
use herald_core::impls::{InMemoryDeliverySink, InMemoryEventSource};
use herald_core::{HeraldConfig, ProcessorBuilder, TriggerListener, TriggerProcessor};

#[derive(Debug, Parser)]
#[command(name = "herald", version, about = "ERP workflow trigger / notification fan-out")]
struct Cli {
    /// TOML config file (env HERALD_* overrides it)
    #[arg(long, short, global = true, env = "HERALD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Process events (a JSON object or array) and print one report per event
    Process {
        /// Path to the events file, `-` for stdin
        #[arg(long, short, default_value = "-")]
        events: String,

        /// Record notifications in memory instead of POSTing them to the sink
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a few sample events through the listener against an in-memory sink
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = HeraldConfig::load(cli.config.as_deref()).context("loading configuration")?;
    herald_core::telemetry::init_tracing(&config.log).context("initialising logging")?;

    match cli.command {
        Command::Process { events, dry_run } => process(&config, &events, dry_run).await,
        Command::Demo => demo(&config).await,
    }
}

async fn process(config: &HeraldConfig, events_path: &str, dry_run: bool) -> Result<()> {
    let events = read_events(events_path).await?;

    let recorder = Arc::new(InMemoryDeliverySink::new());
    let builder = if dry_run {
        ProcessorBuilder::new()
            .sink_arc(recorder.clone())
            .timeout(config.sink.timeout())
    } else {
        info!(endpoint = %config.sink.endpoint(), "delivering to sink");
        ProcessorBuilder::from_config(config)?
    };
    let processor = builder.build()?;

    for event in events {
        let report = processor.process(event).await;
        println!("{}", serde_json::to_string(&report)?);
    }

    if dry_run {
        for message in recorder.delivered().await {
            eprintln!("{}", serde_json::to_string(&message)?);
        }
    }
    Ok(())
}

async fn demo(config: &HeraldConfig) -> Result<()> {
    let sink = Arc::new(InMemoryDeliverySink::new());
    let processor: Arc<TriggerProcessor> = Arc::new(
        ProcessorBuilder::new()
            .sink_arc(sink.clone())
            .timeout(config.sink.timeout())
            .build()?,
    );

    let source = Arc::new(InMemoryEventSource::new());
    for event in sample_events() {
        source.push(event).await;
    }
    source.close();

    let listener = TriggerListener::spawn_with(source, processor, Duration::from_millis(100));
    let processed = listener.join().await;

    let delivered = sink.delivered().await;
    println!("processed {processed} events, {} notifications", delivered.len());
    for message in delivered {
        println!("{}", serde_json::to_string_pretty(&message)?);
    }
    Ok(())
}

async fn read_events(path: &str) -> Result<Vec<Event>> {
    let raw = if path == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("reading events from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading events from {path}"))?
    };
    parse_events(&raw)
}

/// A single event object or an array of them. Items that do not decode are
/// logged and skipped; the rest are still processed.
fn parse_events(raw: &str) -> Result<Vec<Event>> {
    let value: Value = serde_json::from_str(raw).context("events are not valid JSON")?;
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Event>(item) {
            Ok(event) => Some(event),
            Err(err) => {
                warn!(index, error = %err, "skipping malformed event");
                None
            }
        })
        .collect())
}

fn sample_events() -> Vec<Event> {
    let order = OrderRef {
        id: Some("ord_1".into()),
        po_number: Some("ASH-001".into()),
        client_id: Some("client_1".into()),
    };

    vec![
        Event::order_status_changed(
            "ord_1",
            Some(OrderState::new(OrderStatus::Qc)),
            OrderState::new(OrderStatus::ReadyForDelivery)
                .with_po_number("ASH-001")
                .with_client("client_1"),
        )
        .in_workspace("demo"),
        Event::production_stage_completed(
            "step_4",
            StageState {
                workcenter: Workcenter::Qc,
                efficiency_percentage: Some(94.0),
                order: Some(order.clone()),
            },
        )
        .in_workspace("demo"),
        Event::design_uploaded(
            "dsg_1",
            DesignState {
                id: Some("dsg_1".into()),
                approval_status: Some(ApprovalStatus::PendingClientApproval),
                file_name: Some("front-print.png".into()),
                version: Some(2),
                design_type: Some("SCREEN_PRINT".into()),
                order: Some(order.clone()),
            },
        )
        .in_workspace("demo"),
        Event::quality_alert_raised(
            "qc_1",
            QualityState {
                issue_description: Some("misaligned sleeve print".into()),
                severity: Some(Severity::High),
                estimated_delay_hours: Some(24.0),
                order: Some(order),
            },
        )
        .in_workspace("demo"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::domain::EventKind;

    #[test]
    fn parses_single_event_and_arrays() {
        let one = r#"{"kind":"ORDER_STATUS_CHANGED","entityId":"ord_1",
            "currentState":{"status":"QC","clientId":"c1"}}"#;
        let events = parse_events(one).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), EventKind::OrderStatusChanged);

        let many = format!("[{one},{one}]");
        assert_eq!(parse_events(&many).unwrap().len(), 2);
    }

    #[test]
    fn malformed_items_are_skipped_and_the_rest_kept() {
        let raw = r#"[
            {"kind":"PRODUCTION_STAGE_COMPLETED","entityId":"step_1","currentState":{}},
            5,
            {"kind":"QUALITY_ALERT_RAISED","entityId":"qc_1",
             "currentState":{"severity":"HIGH","order":{"clientId":"c1"}}},
            {"kind":"DELIVERY_SCHEDULED","entityId":"dlv_1",
             "currentState":{"scheduledDate":"2024-03-01","order":{"clientId":"c1"}}}
        ]"#;

        let events = parse_events(raw).unwrap();

        let kinds: Vec<_> = events.iter().map(Event::kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::QualityAlertRaised, EventKind::DeliveryScheduled]
        );
        assert_eq!(events[1].entity_id, "dlv_1");
    }

    #[test]
    fn malformed_single_event_yields_nothing() {
        assert!(parse_events(r#"{"kind":"ORDER_STATUS_CHANGED"}"#).unwrap().is_empty());
        assert!(parse_events("not json").is_err());
    }

    #[test]
    fn sample_events_cover_several_kinds() {
        let kinds: Vec<_> = sample_events().iter().map(Event::kind).collect();
        assert!(kinds.contains(&EventKind::OrderStatusChanged));
        assert!(kinds.contains(&EventKind::QualityAlertRaised));
    }

    #[test]
    fn cli_parses_process_flags() {
        let cli = Cli::try_parse_from(["herald", "process", "--events", "e.json", "--dry-run"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Process { ref events, dry_run: true } if events == "e.json"
        ));
    }
}
