// Gate coordinator: polls gate details and tracks reachability.

use std::future::Future;
use std::time::Duration;

use acogo_api::AcogoClient;
use serde_json::{Map, Value};
use tracing::debug;

use super::{Coordinator, CoordinatorCore};
use crate::error::CoreError;

/// Coordinator for one gate-model device.
///
/// Data is the raw gate-details payload. An offline report fails the
/// cycle and flags the device; the previous payload stays in place.
pub struct GateCoordinator {
    core: CoordinatorCore<Value>,
    client: AcogoClient,
}

impl GateCoordinator {
    pub fn new(client: AcogoClient, device_id: &str, interval: Duration) -> Self {
        Self {
            core: CoordinatorCore::new(format!("acogo_gate_{device_id}"), device_id, interval),
            client,
        }
    }

    pub fn device_id(&self) -> &str {
        self.core.device_id()
    }

    /// Issue the `ez-open` order. Refused while the gate is offline.
    pub async fn open(&self) -> Result<(), CoreError> {
        if self.core.is_offline() {
            return Err(CoreError::DeviceOffline {
                device_id: self.device_id().to_owned(),
            });
        }
        self.client.open_gate(self.device_id()).await?;
        Ok(())
    }
}

impl Coordinator for GateCoordinator {
    type Data = Value;

    fn core(&self) -> &CoordinatorCore<Value> {
        &self.core
    }

    fn update(&self) -> impl Future<Output = Result<Value, CoreError>> + Send {
        async move {
            match self.client.get_gate_details(self.device_id()).await {
                Ok(Value::Null) => Ok(Value::Object(Map::new())),
                Ok(details) => Ok(details),
                Err(e) if e.is_offline() => {
                    debug!(device_id = self.device_id(), "acoGO! gate offline (408)");
                    Err(CoreError::DeviceOffline {
                        device_id: self.device_id().to_owned(),
                    })
                }
                Err(e) => Err(e.into()),
            }
        }
    }

    fn fallback_data() -> Value {
        Value::Object(Map::new())
    }
}
