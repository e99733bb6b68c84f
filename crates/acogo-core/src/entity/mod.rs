// ── Entities ──
//
// Host-facing views over coordinators: a gate button per gate, an
// output cover and an input binary sensor per described I/O port.
// Entities never cache state; every read goes to the coordinator.

pub mod binary_sensor;
pub mod button;
pub mod cover;

use acogo_api::Device;
use serde::Serialize;
use strum::Display;

use crate::integration::Session;
use crate::model::IoDetails;

pub use binary_sensor::IoInputSensor;
pub use button::GateButton;
pub use cover::IoOutputCover;

/// Display name of a device: its own name, then the details'
/// `deviceName`, then the details' `name`, then the device id.
pub fn device_name(device: &Device, details: Option<&IoDetails>) -> String {
    device
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .or_else(|| details.and_then(IoDetails::device_name))
        .unwrap_or(device.id.as_str())
        .to_owned()
}

/// Rendered state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityState {
    Unavailable,
    Unknown,
    /// A button that can be pressed.
    Ready,
    Open,
    Closed,
    On,
    Off,
}

/// Entity platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Platform {
    Button,
    Cover,
    BinarySensor,
}

/// Any entity of the integration.
#[derive(Clone)]
pub enum Entity {
    Button(GateButton),
    Cover(IoOutputCover),
    BinarySensor(IoInputSensor),
}

impl Entity {
    pub fn platform(&self) -> Platform {
        match self {
            Self::Button(_) => Platform::Button,
            Self::Cover(_) => Platform::Cover,
            Self::BinarySensor(_) => Platform::BinarySensor,
        }
    }

    pub fn unique_id(&self) -> &str {
        match self {
            Self::Button(e) => e.unique_id(),
            Self::Cover(e) => e.unique_id(),
            Self::BinarySensor(e) => e.unique_id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Button(e) => e.name(),
            Self::Cover(e) => e.name(),
            Self::BinarySensor(e) => e.name(),
        }
    }

    pub fn device_name(&self) -> &str {
        match self {
            Self::Button(e) => e.device_name(),
            Self::Cover(e) => e.device_name(),
            Self::BinarySensor(e) => e.device_name(),
        }
    }

    pub fn available(&self) -> bool {
        match self {
            Self::Button(e) => e.available(),
            Self::Cover(e) => e.available(),
            Self::BinarySensor(e) => e.available(),
        }
    }

    pub fn state(&self) -> EntityState {
        if !self.available() {
            return EntityState::Unavailable;
        }
        match self {
            Self::Button(_) => EntityState::Ready,
            Self::Cover(e) => match e.is_closed() {
                Some(true) => EntityState::Closed,
                Some(false) => EntityState::Open,
                None => EntityState::Unknown,
            },
            Self::BinarySensor(e) => match e.is_on() {
                Some(true) => EntityState::On,
                Some(false) => EntityState::Off,
                None => EntityState::Unknown,
            },
        }
    }
}

/// Set up every platform for a session, buttons first.
pub async fn setup_entities(session: &Session) -> Vec<Entity> {
    let mut entities: Vec<Entity> = button::setup(session)
        .await
        .into_iter()
        .map(Entity::Button)
        .collect();
    entities.extend(cover::setup(session).await.into_iter().map(Entity::Cover));
    entities.extend(
        binary_sensor::setup(session)
            .await
            .into_iter()
            .map(Entity::BinarySensor),
    );
    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use acogo_api::DeviceModel;
    use serde_json::json;

    fn device(name: Option<&str>) -> Device {
        Device {
            id: "io-1".into(),
            name: name.map(str::to_owned),
            model: DeviceModel::Io,
        }
    }

    #[test]
    fn device_name_prefers_device_then_details_then_id() {
        let details = IoDetails::from_value(json!({ "deviceName": "From details", "name": "Alt" }));
        assert_eq!(device_name(&device(Some("Garage")), Some(&details)), "Garage");
        assert_eq!(device_name(&device(None), Some(&details)), "From details");

        let only_name = IoDetails::from_value(json!({ "name": "Alt" }));
        assert_eq!(device_name(&device(Some("")), Some(&only_name)), "Alt");
        assert_eq!(device_name(&device(None), None), "io-1");
    }
}
