use std::sync::Arc;

use acogo_api::Device;
use tracing::{debug, warn};

use super::device_name;
use crate::coordinator::{Coordinator, GateCoordinator};
use crate::error::CoreError;
use crate::integration::Session;

/// "Open gate" button of a gate-model device.
#[derive(Clone)]
pub struct GateButton {
    coordinator: Arc<GateCoordinator>,
    device: Device,
    device_name: String,
    name: String,
    unique_id: String,
}

impl GateButton {
    pub fn new(coordinator: Arc<GateCoordinator>, device: Device) -> Self {
        let device_name = device_name(&device, None);
        Self {
            name: format!("{device_name} open"),
            unique_id: format!("{}_ez_open", device.id),
            coordinator,
            device,
            device_name,
        }
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn coordinator(&self) -> &Arc<GateCoordinator> {
        &self.coordinator
    }

    pub fn available(&self) -> bool {
        self.coordinator.core().available()
    }

    /// Send the open order. Fails with `DeviceOffline` while offline.
    pub async fn press(&self) -> Result<(), CoreError> {
        debug!(unique_id = %self.unique_id, "gate button pressed");
        self.coordinator.open().await
    }
}

/// One button per gate-model device. Devices whose coordinator cannot be
/// created are skipped.
pub async fn setup(session: &Session) -> Vec<GateButton> {
    let mut buttons = Vec::new();
    for device in session.devices().iter().filter(|d| d.is_gate()) {
        match session.gate(&device.id).await {
            Ok(coordinator) => buttons.push(GateButton::new(coordinator, device.clone())),
            Err(e) => warn!(device_id = %device.id, error = %e, "skipping gate"),
        }
    }
    buttons
}
