// Wire types for the acoGO! device listing.
//
// Only the device list has a stable shape worth typing. Gate details,
// I/O details and I/O state are passed through as `serde_json::Value`
// and interpreted by the coordinators in `acogo-core`.

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Model tag reported for acoGO! I/O modules.
pub const IO_MODEL_TAG: &str = "acoGO! I/O";

/// A device as returned by `GET /devices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Vendor device identifier, unique per account.
    #[serde(rename = "devId")]
    pub id: String,

    /// Display name configured in the vendor app.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Model tag (`"acoGO! P"`, `"acoGO! I/O"`, ...). Missing or null
    /// reads as an empty, unrecognised tag.
    #[serde(default, deserialize_with = "nullable_model")]
    pub model: DeviceModel,
}

impl Device {
    pub fn is_gate(&self) -> bool {
        matches!(self.model, DeviceModel::Gate(_))
    }

    pub fn is_io(&self) -> bool {
        matches!(self.model, DeviceModel::Io)
    }
}

fn nullable_model<'de, D>(deserializer: D) -> Result<DeviceModel, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = Option::<String>::deserialize(deserializer)?;
    Ok(tag.map_or_else(DeviceModel::default, DeviceModel::from))
}

/// Gate model variants that expose the `ez-open` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum GateModel {
    #[strum(serialize = "acoGO!")]
    Standard,
    #[strum(serialize = "acoGO! P")]
    P,
}

/// Parsed model tag. Unknown tags are kept verbatim so they survive a
/// round-trip through persisted device snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceModel {
    Gate(GateModel),
    Io,
    Other(String),
}

impl Default for DeviceModel {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for DeviceModel {
    fn from(tag: String) -> Self {
        if tag == IO_MODEL_TAG {
            return Self::Io;
        }
        tag.parse::<GateModel>()
            .map_or_else(|_| Self::Other(tag), Self::Gate)
    }
}

impl From<DeviceModel> for String {
    fn from(model: DeviceModel) -> Self {
        model.to_string()
    }
}

impl std::fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gate(gate) => gate.fmt(f),
            Self::Io => f.write_str(IO_MODEL_TAG),
            Self::Other(tag) => f.write_str(tag),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_known_model_tags() {
        assert_eq!(
            DeviceModel::from("acoGO! P".to_owned()),
            DeviceModel::Gate(GateModel::P)
        );
        assert_eq!(
            DeviceModel::from("acoGO!".to_owned()),
            DeviceModel::Gate(GateModel::Standard)
        );
        assert_eq!(DeviceModel::from("acoGO! I/O".to_owned()), DeviceModel::Io);
    }

    #[test]
    fn keeps_unknown_model_tag_verbatim() {
        let model = DeviceModel::from("acoGO! X".to_owned());
        assert_eq!(model, DeviceModel::Other("acoGO! X".into()));
        assert_eq!(model.to_string(), "acoGO! X");
    }

    #[test]
    fn deserializes_device_with_missing_fields() {
        let device: Device = serde_json::from_value(json!({ "devId": "io-1" })).unwrap();
        assert_eq!(device.id, "io-1");
        assert_eq!(device.name, None);
        assert!(!device.is_gate());
        assert!(!device.is_io());
    }

    #[test]
    fn null_model_reads_as_unrecognised() {
        let device: Device =
            serde_json::from_value(json!({ "devId": "x1", "name": null, "model": null }))
                .unwrap();
        assert_eq!(device.model, DeviceModel::Other(String::new()));
        assert!(!device.is_gate());
        assert!(!device.is_io());
    }

    #[test]
    fn serializes_model_back_to_tag() {
        let device = Device {
            id: "gate-1".into(),
            name: Some("Gate".into()),
            model: DeviceModel::Gate(GateModel::P),
        };
        let value = serde_json::to_value(&device).unwrap();
        assert_eq!(
            value,
            json!({ "devId": "gate-1", "name": "Gate", "model": "acoGO! P" })
        );
    }
}
