// ── Core error types ──
//
// Errors surfaced by coordinators, sessions and entities. The
// `From<acogo_api::Error>` impl keeps the offline/other split of the
// transport layer intact so callers can still tell a sleeping device
// from a failing request.

use acogo_api::FailureKind;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Device state ─────────────────────────────────────────────────
    #[error("acoGO! device {device_id} is offline")]
    DeviceOffline { device_id: String },

    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Missing session data for {session_id}")]
    MissingSession { session_id: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Command rejected: {message}")]
    CommandRejected { message: String },

    // ── API errors (wrapped) ─────────────────────────────────────────
    /// The cloud answered 408 for a device.
    #[error("Device offline: {message}")]
    Offline { message: String },

    #[error("API error: {}", api_message(.status, .message))]
    Api {
        status: Option<u16>,
        kind: FailureKind,
        message: String,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

fn api_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("{code}: {message}"),
        None => message.to_owned(),
    }
}

impl CoreError {
    /// Returns `true` for both the wrapped 408 and a coordinator that
    /// already knows its device is offline.
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Offline { .. } | Self::DeviceOffline { .. })
    }

    /// HTTP status of a wrapped API failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Offline { .. } => Some(408),
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns `true` if a wrapped request ran into its timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Api {
                kind: FailureKind::Timeout,
                ..
            }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<acogo_api::Error> for CoreError {
    fn from(err: acogo_api::Error) -> Self {
        match err {
            acogo_api::Error::Offline { message } => Self::Offline { message },
            acogo_api::Error::Api {
                status,
                kind,
                message,
            } => Self::Api {
                status,
                kind,
                message,
            },
            acogo_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid API base URL: {e}"),
            },
            acogo_api::Error::InvalidToken { message } => Self::Config {
                message: format!("Invalid token: {message}"),
            },
            acogo_api::Error::Client(message) => Self::Internal(message),
        }
    }
}
