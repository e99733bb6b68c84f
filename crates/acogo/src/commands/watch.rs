//! `watch`: keep the session's pollers running and print entity changes.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

use acogo_core::{Coordinator, EntityState, Session, SessionConfig, Snapshot, entity};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

/// One observed state transition.
#[derive(Debug, Serialize)]
struct WatchEvent {
    at: DateTime<Utc>,
    unique_id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous: Option<EntityState>,
    state: EntityState,
}

/// Apply `watch` flag overrides on top of the profile's session config.
pub fn apply_overrides(args: &WatchArgs, config: &mut SessionConfig) {
    if let Some(secs) = args.gate_interval {
        config.gate_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = args.io_interval {
        config.io_interval = Duration::from_secs(secs);
    }
    if let Some(filter) = args.port_filter {
        config.port_filter = filter.into();
    }
}

fn render_event(event: &WatchEvent, format: &OutputFormat, color: bool) -> String {
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(event, true),
        OutputFormat::Yaml => format!(
            "---\n{}",
            serde_yaml::to_string(event).unwrap_or_default().trim_end()
        ),
        OutputFormat::Plain => format!("{} {}", event.unique_id, event.state),
        OutputFormat::Table => {
            let transition = match event.previous {
                Some(prev) => format!(
                    "{} → {}",
                    output::paint_state(prev, color),
                    output::paint_state(event.state, color)
                ),
                None => output::paint_state(event.state, color),
            };
            format!(
                "{}  {:<24} {}",
                event.at.format("%H:%M:%S"),
                event.name,
                transition
            )
        }
    }
}

/// Forward every snapshot change as a bare tick.
async fn forward<T: Send + Sync + 'static>(
    mut rx: watch::Receiver<Snapshot<T>>,
    tx: mpsc::Sender<()>,
) {
    while rx.changed().await.is_ok() {
        if tx.send(()).await.is_err() {
            break;
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let entities = entity::setup_entities(session).await;
    if entities.is_empty() {
        if !global.quiet {
            eprintln!("No entities to watch.");
        }
        return Ok(());
    }

    let mut last: HashMap<String, EntityState> = HashMap::with_capacity(entities.len());
    for e in &entities {
        let event = WatchEvent {
            at: Utc::now(),
            unique_id: e.unique_id().to_owned(),
            name: e.name().to_owned(),
            previous: None,
            state: e.state(),
        };
        output::print_output(&render_event(&event, &global.output, color), global.quiet);
        last.insert(event.unique_id, event.state);
    }

    let (tx, mut rx) = mpsc::channel(16);
    let mut forwarders = JoinSet::new();
    for gate in session.gates().coordinators() {
        forwarders.spawn(forward(gate.core().subscribe(), tx.clone()));
    }
    for io in session.ios().coordinators() {
        forwarders.spawn(forward(io.core().subscribe(), tx.clone()));
    }
    drop(tx);

    if !global.quiet {
        eprintln!("Watching {} entities. Press Ctrl-C to stop.", entities.len());
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            biased;
            result = &mut ctrl_c => {
                result?;
                break;
            }
            tick = rx.recv() => {
                if tick.is_none() {
                    break;
                }
                for e in &entities {
                    let state = e.state();
                    let previous = last.insert(e.unique_id().to_owned(), state);
                    if previous == Some(state) {
                        continue;
                    }
                    let event = WatchEvent {
                        at: Utc::now(),
                        unique_id: e.unique_id().to_owned(),
                        name: e.name().to_owned(),
                        previous,
                        state,
                    };
                    output::print_output(&render_event(&event, &global.output, color), global.quiet);
                }
            }
        }
    }

    forwarders.abort_all();
    Ok(())
}
