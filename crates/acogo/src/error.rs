//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use acogo_config::ConfigError;
use acogo_core::{CoreError, FailureKind};

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the acoGO! cloud at {url}")]
    #[diagnostic(
        code(acogo::connection_failed),
        help(
            "Check your network connection and the API base URL.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        timed_out: bool,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(acogo::timeout),
        help("Increase timeout with --timeout or check the cloud's responsiveness.")
    )]
    Timeout { seconds: u64 },

    #[error("Device '{device_id}' is offline")]
    #[diagnostic(
        code(acogo::device_offline),
        help("The cloud cannot reach the device. Check its power and connectivity.")
    )]
    DeviceOffline { device_id: String },

    #[error("Device offline: {message}")]
    #[diagnostic(
        code(acogo::offline),
        help("The cloud answered 408 for this request. Retry once the device is back.")
    )]
    Offline { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(acogo::auth_failed),
        help(
            "Verify your bearer token.\n\
             Run: acogo config set-token --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    #[error("No token configured for profile '{profile}'")]
    #[diagnostic(
        code(acogo::no_credentials),
        help(
            "Configure a profile with: acogo config init\n\
             Or set the ACOGO_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(acogo::not_found),
        help("Run: acogo {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Command rejected: {message}")]
    #[diagnostic(code(acogo::rejected))]
    Rejected { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(acogo::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(acogo::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(acogo::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: acogo config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(acogo::config))]
    Config(Box<figment::Error>),

    #[error("Could not access the system keyring: {message}")]
    #[diagnostic(
        code(acogo::keyring),
        help("Use token_env or a plaintext token in the profile instead.")
    )]
    Keyring { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(acogo::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::DeviceOffline { .. } | Self::Offline { .. } => {
                exit_code::CONNECTION
            }
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::CONFLICT,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Keyring { .. } => exit_code::PERMISSION,
            _ => exit_code::GENERAL,
        }
    }

    /// Reclassify a transport failure caused by the request timeout.
    pub fn with_timeout(self, seconds: u64) -> Self {
        match self {
            Self::ConnectionFailed {
                timed_out: true, ..
            } => Self::Timeout { seconds },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DeviceOffline { device_id } => CliError::DeviceOffline { device_id },

            CoreError::Offline { message } => CliError::Offline { message },

            CoreError::DeviceNotFound { identifier } => CliError::NotFound {
                resource_type: "device".into(),
                identifier,
                list_command: "devices list".into(),
            },

            CoreError::CommandRejected { message } => CliError::Rejected { message },

            CoreError::Api {
                status: Some(401 | 403),
                ..
            } => CliError::AuthFailed {
                profile: "current".into(),
            },

            CoreError::Api {
                status: Some(code),
                message,
                ..
            } => CliError::ApiError {
                code: code.to_string(),
                message,
            },

            // The cloud answered with something unreadable.
            CoreError::Api {
                kind: FailureKind::Decode,
                message,
                ..
            } => CliError::ApiError {
                code: "decode".into(),
                message,
            },

            // No status: the request never produced a response.
            CoreError::Api { kind, message, .. } => CliError::ConnectionFailed {
                url: "(acoGO! cloud)".into(),
                timed_out: kind == FailureKind::Timeout,
                source: message.into(),
            },

            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },

            CoreError::MissingSession { session_id } => CliError::ApiError {
                code: "session".into(),
                message: format!("session '{session_id}' is not set up"),
            },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Keyring(message) => CliError::Keyring { message },
            ConfigError::Figment(err) => CliError::Config(err),
            ConfigError::Serialization(err) => CliError::Validation {
                field: "config".into(),
                reason: err.to_string(),
            },
            ConfigError::Io(err) => CliError::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_maps_to_connection_exit_code() {
        let err = CliError::from(CoreError::DeviceOffline {
            device_id: "g1".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn unauthorized_maps_to_auth_exit_code() {
        let err = CliError::from(CoreError::Api {
            status: Some(401),
            kind: FailureKind::Status,
            message: "Unauthorized".into(),
        });
        assert!(matches!(err, CliError::AuthFailed { .. }));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn rejected_close_is_a_conflict() {
        let err = CliError::from(CoreError::CommandRejected {
            message: "timed output".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONFLICT);
    }

    #[test]
    fn missing_token_maps_to_auth_exit_code() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "home".into(),
        });
        assert_eq!(err.to_string(), "No token configured for profile 'home'");
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn transport_failure_is_a_connection_error() {
        let err = CliError::from(CoreError::Api {
            status: None,
            kind: FailureKind::Transport,
            message: "connection refused".into(),
        })
        .with_timeout(10);
        assert!(matches!(err, CliError::ConnectionFailed { timed_out: false, .. }));
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn undecodable_body_is_an_api_error() {
        let err = CliError::from(CoreError::Api {
            status: None,
            kind: FailureKind::Decode,
            message: "unexpected device list payload".into(),
        });
        assert!(matches!(err, CliError::ApiError { ref code, .. } if code == "decode"));
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn timed_out_transport_becomes_timeout() {
        let err = CliError::from(CoreError::Api {
            status: None,
            kind: FailureKind::Timeout,
            message: "operation timed out".into(),
        })
        .with_timeout(10);
        assert!(matches!(err, CliError::Timeout { seconds: 10 }));
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
    }
}
