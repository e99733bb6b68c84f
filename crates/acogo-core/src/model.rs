// ── Domain records for I/O modules ──
//
// `IoSnapshot` is the normalized state an I/O coordinator publishes.
// `IoDetails` wraps the semi-static port configuration and answers the
// naming questions entities ask of it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString};

/// Number of inputs and outputs on an acoGO! I/O module.
pub const PORT_COUNT: u8 = 4;

// ── Ports ────────────────────────────────────────────────────────────

/// Direction of an I/O port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum PortKind {
    #[strum(serialize = "in")]
    Input,
    #[strum(serialize = "out")]
    Output,
}

impl PortKind {
    /// Key of port `n` in the state maps (`"in1"`, `"out3"`).
    pub fn key(self, n: u8) -> String {
        format!("{self}{n}")
    }

    /// Fallback display name when details carry none.
    pub fn default_name(self, n: u8) -> String {
        match self {
            Self::Input => format!("Input {n}"),
            Self::Output => format!("Output {n}"),
        }
    }
}

/// Which ports become entities, based on what the details describe.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PortFilter {
    /// Empty details expose every port; otherwise only described ports.
    #[default]
    DescribedOrUnknown,
    /// Every port, regardless of details.
    All,
    /// Only ports with a name or pulse time in the details.
    DescribedOnly,
}

impl PortFilter {
    pub fn includes(self, details: &IoDetails, kind: PortKind, n: u8) -> bool {
        match self {
            Self::All => true,
            Self::DescribedOrUnknown => details.is_empty() || details.describes(kind, n),
            Self::DescribedOnly => details.describes(kind, n),
        }
    }
}

// ── Details ──────────────────────────────────────────────────────────

/// Port naming and configuration of an I/O module (`GET /devices/io/{id}`).
///
/// Keys follow the vendor layout: `in1Name`, `out2Name`, `out2Time`,
/// `deviceName`. Unknown keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IoDetails(Map<String, Value>);

impl IoDetails {
    /// Wrap a raw payload. Anything but an object yields empty details.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// `true` when either the name or the time key of the port is present.
    pub fn describes(&self, kind: PortKind, n: u8) -> bool {
        self.0.contains_key(&format!("{kind}{n}Name"))
            || self.0.contains_key(&format!("{kind}{n}Time"))
    }

    /// Configured name of a port, if non-empty.
    pub fn port_name(&self, kind: PortKind, n: u8) -> Option<&str> {
        non_empty_str(self.0.get(&format!("{kind}{n}Name")))
    }

    /// Configured pulse duration of a port in seconds.
    pub fn port_time(&self, kind: PortKind, n: u8) -> Option<u64> {
        match self.0.get(&format!("{kind}{n}Time"))? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Device name reported by the details, `deviceName` first.
    pub fn device_name(&self) -> Option<&str> {
        non_empty_str(self.0.get("deviceName")).or_else(|| non_empty_str(self.0.get("name")))
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

// ── State ────────────────────────────────────────────────────────────

/// Normalized I/O state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IoSnapshot {
    pub inputs: BTreeMap<String, bool>,
    pub outputs: BTreeMap<String, bool>,
    /// Set on the payload committed while the device is unreachable.
    pub offline: bool,
}

impl IoSnapshot {
    /// Payload committed while the device is offline.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Normalize a raw `GET /io/{id}/state` payload.
    ///
    /// A truthy `message` member is unwrapped first. Missing or malformed
    /// `inputs`/`outputs` become empty maps; levels that are neither bools,
    /// numbers nor on/off strings are dropped.
    pub fn from_raw(raw: &Value) -> Self {
        let payload = match raw.get("message") {
            Some(inner) if is_truthy(inner) => inner,
            _ => raw,
        };
        Self {
            inputs: levels(payload.get("inputs")),
            outputs: levels(payload.get("outputs")),
            offline: false,
        }
    }

    pub fn input(&self, n: u8) -> Option<bool> {
        self.inputs.get(&PortKind::Input.key(n)).copied()
    }

    pub fn output(&self, n: u8) -> Option<bool> {
        self.outputs.get(&PortKind::Output.key(n)).copied()
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn levels(section: Option<&Value>) -> BTreeMap<String, bool> {
    section
        .and_then(Value::as_object)
        .map(|ports| {
            ports
                .iter()
                .filter_map(|(key, raw)| level(raw).map(|on| (key.clone(), on)))
                .collect()
        })
        .unwrap_or_default()
}

fn level(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f.abs() > 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" => Some(true),
            "0" | "false" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
