//! I/O module command handlers.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use acogo_core::{
    Coordinator, Device, IoCoordinator, IoDetails, IoOutputCover, PORT_COUNT, PortKind, Session,
};

use crate::cli::{GlobalOpts, IoArgs, IoCommand, OutputLevel};
use crate::error::CliError;
use crate::output;

use super::util::{self, DeviceKind};

// ── Port view ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct PortState {
    port: String,
    name: String,
    /// `None` while the level is unknown (offline, not reported).
    level: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pulse_secs: Option<u64>,
}

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Pulse")]
    pulse: String,
}

impl From<&PortState> for PortRow {
    fn from(p: &PortState) -> Self {
        Self {
            port: p.port.clone(),
            name: p.name.clone(),
            level: level_label(p.level).into(),
            pulse: p.pulse_secs.map_or_else(String::new, |s| format!("{s}s")),
        }
    }
}

fn level_label(level: Option<bool>) -> &'static str {
    match level {
        Some(true) => "on",
        Some(false) => "off",
        None => "-",
    }
}

fn port_states(coordinator: &IoCoordinator, details: &IoDetails) -> Vec<PortState> {
    let snap = coordinator.core().data();
    let mut ports = Vec::with_capacity(usize::from(PORT_COUNT) * 2);
    for kind in [PortKind::Input, PortKind::Output] {
        for n in 1..=PORT_COUNT {
            let level = snap.as_ref().and_then(|s| match kind {
                PortKind::Input => s.input(n),
                PortKind::Output => s.output(n),
            });
            ports.push(PortState {
                port: kind.key(n),
                name: details
                    .port_name(kind, n)
                    .map_or_else(|| kind.default_name(n), str::to_owned),
                level,
                pulse_secs: details.port_time(kind, n),
            });
        }
    }
    ports
}

async fn io_coordinator(
    session: &Session,
    identifier: &str,
) -> Result<(Device, Arc<IoCoordinator>), CliError> {
    let device = util::resolve_device(session, identifier, DeviceKind::Io)?;
    let coordinator = session.io(&device.id).await?;
    Ok((device.clone(), coordinator))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: IoArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        IoCommand::State { device } => {
            let (device, coordinator) = io_coordinator(session, &device).await?;
            if coordinator.core().is_offline() && !global.quiet {
                eprintln!("⚠ {} is offline, levels are unknown", device.id);
            }
            let details = coordinator.details().await;
            let ports = port_states(&coordinator, &details);

            let out = output::render_list(
                &global.output,
                &ports,
                |p| PortRow::from(p),
                |p| format!("{}={}", p.port, level_label(p.level)),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        IoCommand::Details { device } => {
            let (_, coordinator) = io_coordinator(session, &device).await?;
            let details = coordinator.details().await;
            let out = output::render_single(
                &global.output,
                details.as_map(),
                |map| output::render_json(map, false),
                |map| map.keys().cloned().collect::<Vec<_>>().join("\n"),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        IoCommand::Set {
            device,
            port,
            state,
        } => {
            let (device, coordinator) = io_coordinator(session, &device).await?;
            let details = coordinator.details().await;
            let cover = IoOutputCover::new(coordinator, &device, &details, port);

            match state {
                OutputLevel::On => cover.open().await?,
                OutputLevel::Off => cover.close().await?,
            }
            if !global.quiet {
                let level = match state {
                    OutputLevel::On => "on",
                    OutputLevel::Off => "off",
                };
                eprintln!("✓ {} switched {level}", cover.name());
            }
            Ok(())
        }
    }
}
