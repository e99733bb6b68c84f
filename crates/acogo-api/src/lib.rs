// acogo-api: Async Rust client for the acoGO! cloud API (gates + I/O modules)

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{API_BASE, AcogoClient, ApiResponse};
pub use error::{Error, FailureKind};
pub use models::{Device, DeviceModel, GateModel};
pub use transport::TransportConfig;
