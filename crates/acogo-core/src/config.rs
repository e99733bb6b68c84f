// ── Runtime session configuration ──
//
// Describes how one integration session talks to the cloud and how often
// its coordinators poll. Carries the token but never touches disk; the
// CLI builds a `SessionConfig` from its profile and hands it in.

use std::time::Duration;

use acogo_api::{API_BASE, Device};
use secrecy::SecretString;

use crate::model::PortFilter;

/// Default gate-details poll interval.
pub const DEFAULT_GATE_INTERVAL: Duration = Duration::from_secs(30);

/// Default I/O state poll interval.
pub const DEFAULT_IO_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration for a single integration session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Bearer token for the cloud API.
    pub token: SecretString,
    /// API base URL. Only overridden for testing.
    pub api_base: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How often gate coordinators poll. Zero disables polling.
    pub gate_interval: Duration,
    /// How often I/O coordinators poll. Zero disables polling.
    pub io_interval: Duration,
    /// Which I/O ports become entities.
    pub port_filter: PortFilter,
    /// Device list captured earlier. Fetched from the API when `None`.
    pub devices: Option<Vec<Device>>,
}

impl SessionConfig {
    /// Config with every knob at its default.
    pub fn new(token: SecretString) -> Self {
        Self {
            token,
            api_base: API_BASE.to_owned(),
            timeout: acogo_api::transport::DEFAULT_TIMEOUT,
            gate_interval: DEFAULT_GATE_INTERVAL,
            io_interval: DEFAULT_IO_INTERVAL,
            port_filter: PortFilter::default(),
            devices: None,
        }
    }

    /// Use a pre-fetched device list instead of calling `GET /devices`.
    pub fn with_devices(mut self, devices: Vec<Device>) -> Self {
        self.devices = Some(devices);
        self
    }

    /// Point the session at another API base (mock server, staging).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}
