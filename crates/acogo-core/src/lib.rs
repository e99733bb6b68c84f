// acogo-core: polling coordinators, session lifecycle and entities
// between acogo-api and its consumers (CLI, home-automation hosts).

pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod integration;
pub mod model;
pub mod registry;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_GATE_INTERVAL, DEFAULT_IO_INTERVAL, SessionConfig};
pub use coordinator::{Coordinator, CoordinatorCore, GateCoordinator, IoCoordinator, Snapshot};
pub use entity::{Entity, EntityState, GateButton, IoInputSensor, IoOutputCover, Platform};
pub use error::CoreError;
pub use integration::{CoordinatorHandle, CoordinatorKind, Integration, Session};
pub use model::{IoDetails, IoSnapshot, PORT_COUNT, PortFilter, PortKind};
pub use registry::CoordinatorRegistry;

// Wire types consumers need alongside the core API.
pub use acogo_api::{AcogoClient, Device, DeviceModel, FailureKind, GateModel};
