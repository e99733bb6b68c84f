//! Gate command handlers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use acogo_core::{Coordinator, GateButton, Session};

use crate::cli::{GateArgs, GateCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::{self, DeviceKind};

/// Gate state as reported by `gate status`.
#[derive(Serialize)]
struct GateStatus {
    device_id: String,
    name: String,
    model: String,
    available: bool,
    offline: bool,
    last_update_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    details: Value,
}

fn detail(s: &GateStatus, color: bool) -> String {
    let mut lines = vec![
        format!("ID:        {}", s.device_id),
        format!("Name:      {}", s.name),
        format!("Model:     {}", s.model),
        format!("Available: {}", output::paint_flag(s.available, false, color)),
        format!("Offline:   {}", output::paint_flag(s.offline, true, color)),
        format!(
            "Updated:   {}",
            s.updated_at
                .map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        ),
    ];
    if let Some(ref err) = s.last_error {
        lines.push(format!("Error:     {err}"));
    }
    lines.push(format!("Details:   {}", output::render_json(&s.details, false)));
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: GateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        GateCommand::Open { device } => {
            let device = util::resolve_device(session, &device, DeviceKind::Gate)?;
            let button = GateButton::new(session.gate(&device.id).await?, device.clone());

            let prompt = format!("Open {}?", button.device_name());
            if !util::confirm(&prompt, "gate open", global.yes)? {
                return Ok(());
            }

            button.press().await?;
            if !global.quiet {
                eprintln!("✓ Open order sent to {}", button.device_name());
            }
            Ok(())
        }

        GateCommand::Status { device } => {
            let device = util::resolve_device(session, &device, DeviceKind::Gate)?;
            let coordinator = session.gate(&device.id).await?;
            let snap = coordinator.core().snapshot();

            let status = GateStatus {
                device_id: device.id.clone(),
                name: acogo_core::entity::device_name(device, None),
                model: device.model.to_string(),
                available: snap.available(),
                offline: snap.offline,
                last_update_success: snap.last_update_success,
                last_error: snap.last_error.clone(),
                updated_at: snap.updated_at,
                details: snap.data.as_deref().cloned().unwrap_or(Value::Null),
            };

            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &status,
                |s| detail(s, color),
                |s| String::from(if s.available { "available" } else { "unavailable" }),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
