use std::sync::Arc;

use acogo_api::Device;
use tracing::warn;

use super::device_name;
use crate::coordinator::{Coordinator, IoCoordinator};
use crate::integration::Session;
use crate::model::{IoDetails, PORT_COUNT, PortKind};

/// An I/O input exposed as a binary sensor.
#[derive(Clone)]
pub struct IoInputSensor {
    coordinator: Arc<IoCoordinator>,
    device_name: String,
    port: u8,
    name: String,
    unique_id: String,
}

impl IoInputSensor {
    pub fn new(
        coordinator: Arc<IoCoordinator>,
        device: &Device,
        details: &IoDetails,
        port: u8,
    ) -> Self {
        let name = details
            .port_name(PortKind::Input, port)
            .map_or_else(|| PortKind::Input.default_name(port), str::to_owned);
        Self {
            coordinator,
            device_name: device_name(device, Some(details)),
            port,
            name,
            unique_id: format!("{}_in_{port}", device.id),
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

    pub fn port(&self) -> u8 {
        self.port
    }

    pub fn available(&self) -> bool {
        self.coordinator.core().available()
    }

    pub fn is_on(&self) -> Option<bool> {
        self.coordinator
            .core()
            .data()
            .and_then(|snap| snap.input(self.port))
    }
}

pub async fn setup(session: &Session) -> Vec<IoInputSensor> {
    let mut sensors = Vec::new();
    for device in session.devices().iter().filter(|d| d.is_io()) {
        let coordinator = match session.io(&device.id).await {
            Ok(c) => c,
            Err(e) => {
                warn!(device_id = %device.id, error = %e, "skipping I/O module");
                continue;
            }
        };
        let details = coordinator.details().await;
        for port in (1..=PORT_COUNT)
            .filter(|&n| session.port_filter().includes(&details, PortKind::Input, n))
        {
            sensors.push(IoInputSensor::new(
                Arc::clone(&coordinator),
                device,
                &details,
                port,
            ));
        }
    }
    sensors
}
