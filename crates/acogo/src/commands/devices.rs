//! Device command handlers.

use tabled::Tabled;

use acogo_core::{Device, Session};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        let kind = if d.is_gate() {
            "gate"
        } else if d.is_io() {
            "io"
        } else {
            "-"
        };
        Self {
            id: d.id.clone(),
            name: d.name.clone().unwrap_or_default(),
            model: d.model.to_string(),
            kind,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::unnecessary_wraps)]
pub fn handle(session: &Session, args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List => {
            let out = output::render_list(
                &global.output,
                session.devices(),
                |d| DeviceRow::from(d),
                |d| d.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
