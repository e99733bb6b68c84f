use std::sync::Arc;

use acogo_api::Device;
use tracing::warn;

use super::device_name;
use crate::coordinator::{Coordinator, IoCoordinator};
use crate::error::CoreError;
use crate::integration::Session;
use crate::model::{IoDetails, PORT_COUNT, PortKind};

/// An I/O output exposed as a garage-style cover.
#[derive(Clone)]
pub struct IoOutputCover {
    coordinator: Arc<IoCoordinator>,
    device_id: String,
    device_name: String,
    port: u8,
    name: String,
    unique_id: String,
    /// Pulse duration in seconds; the device reverts the output itself.
    pulse_secs: Option<u64>,
}

impl IoOutputCover {
    pub fn new(
        coordinator: Arc<IoCoordinator>,
        device: &Device,
        details: &IoDetails,
        port: u8,
    ) -> Self {
        let name = details
            .port_name(PortKind::Output, port)
            .map_or_else(|| PortKind::Output.default_name(port), str::to_owned);
        Self {
            coordinator,
            device_id: device.id.clone(),
            device_name: device_name(device, Some(details)),
            port,
            name,
            unique_id: format!("{}_out{port}", device.id),
            pulse_secs: details.port_time(PortKind::Output, port),
        }
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Port name (`out{n}Name` or `"Output {n}"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn port(&self) -> u8 {
        self.port
    }

    pub fn pulse_secs(&self) -> Option<u64> {
        self.pulse_secs
    }

    /// A timed output closes by itself after its pulse.
    pub fn is_timed(&self) -> bool {
        self.pulse_secs.is_some_and(|secs| secs > 0)
    }

    pub fn available(&self) -> bool {
        self.coordinator.core().available()
    }

    /// `None` while the output level is unknown.
    pub fn is_closed(&self) -> Option<bool> {
        self.coordinator
            .core()
            .data()
            .and_then(|snap| snap.output(self.port))
            .map(|on| !on)
    }

    pub async fn open(&self) -> Result<(), CoreError> {
        self.coordinator.set_output(self.port, true).await
    }

    /// Rejected for timed outputs.
    pub async fn close(&self) -> Result<(), CoreError> {
        if self.coordinator.core().is_offline() {
            return Err(CoreError::DeviceOffline {
                device_id: self.device_id.clone(),
            });
        }
        if self.is_timed() {
            return Err(CoreError::CommandRejected {
                message: format!(
                    "output {} of {} is a timed output and closes on its own",
                    self.port, self.device_name
                ),
            });
        }
        self.coordinator.set_output(self.port, false).await
    }
}

/// Covers for the outputs the session's port filter admits. Devices
/// whose coordinator cannot be created are skipped.
pub async fn setup(session: &Session) -> Vec<IoOutputCover> {
    let mut covers = Vec::new();
    for device in session.devices().iter().filter(|d| d.is_io()) {
        let coordinator = match session.io(&device.id).await {
            Ok(c) => c,
            Err(e) => {
                warn!(device_id = %device.id, error = %e, "skipping I/O module");
                continue;
            }
        };
        let details = coordinator.details().await;
        for port in 1..=PORT_COUNT {
            if session
                .port_filter()
                .includes(&details, PortKind::Output, port)
            {
                covers.push(IoOutputCover::new(
                    Arc::clone(&coordinator),
                    device,
                    &details,
                    port,
                ));
            }
        }
    }
    covers
}
