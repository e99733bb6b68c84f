//! Shared helpers for command handlers.

use std::io::IsTerminal;

use acogo_core::{Device, Session};

use crate::error::CliError;

/// Device family a command operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Gate,
    Io,
}

impl DeviceKind {
    fn matches(self, device: &Device) -> bool {
        match self {
            Self::Gate => device.is_gate(),
            Self::Io => device.is_io(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Gate => "gate",
            Self::Io => "I/O module",
        }
    }
}

/// Resolve a device identifier (ID or exact name) against the session's
/// device list, checking it is of the expected kind.
pub fn resolve_device<'a>(
    session: &'a Session,
    identifier: &str,
    kind: DeviceKind,
) -> Result<&'a Device, CliError> {
    let device = session
        .device(identifier)
        .or_else(|| {
            session
                .devices()
                .iter()
                .find(|d| d.name.as_deref() == Some(identifier))
        })
        .ok_or_else(|| CliError::NotFound {
            resource_type: "device".into(),
            identifier: identifier.into(),
            list_command: "devices list".into(),
        })?;

    if !kind.matches(device) {
        return Err(CliError::Validation {
            field: "device".into(),
            reason: format!("'{identifier}' is not a {}", kind.label()),
        });
    }
    Ok(device)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
