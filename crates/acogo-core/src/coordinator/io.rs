// I/O coordinator: polls input/output levels and memoizes port details.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use acogo_api::AcogoClient;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::{Coordinator, CoordinatorCore};
use crate::error::CoreError;
use crate::model::{IoDetails, IoSnapshot};

/// Coordinator for one acoGO! I/O module.
///
/// An offline report is a valid outcome here: the cycle succeeds and
/// commits [`IoSnapshot::offline`], wiping the last known levels.
pub struct IoCoordinator {
    core: CoordinatorCore<IoSnapshot>,
    client: AcogoClient,
    details: OnceCell<Arc<IoDetails>>,
}

impl IoCoordinator {
    pub fn new(client: AcogoClient, device_id: &str, interval: Duration) -> Self {
        Self {
            core: CoordinatorCore::new(format!("acogo_io_{device_id}"), device_id, interval),
            client,
            details: OnceCell::new(),
        }
    }

    pub fn device_id(&self) -> &str {
        self.core.device_id()
    }

    /// Port details, fetched on first use and cached for the lifetime of
    /// the coordinator. A failed fetch caches empty details.
    pub async fn details(&self) -> Arc<IoDetails> {
        self.details
            .get_or_init(|| async {
                match self.client.get_io_details(self.device_id()).await {
                    Ok(raw) => Arc::new(IoDetails::from_value(raw)),
                    Err(e) => {
                        warn!(device_id = self.device_id(), error = %e, "could not fetch IO details");
                        Arc::new(IoDetails::default())
                    }
                }
            })
            .await
            .clone()
    }

    /// Poll the state now and commit the result. Non-offline failures
    /// are returned.
    pub async fn refresh_state(&self) -> Result<(), CoreError> {
        self.refresh().await
    }

    /// Drive output `port` and re-read the state.
    pub async fn set_output(&self, port: u8, on: bool) -> Result<(), CoreError> {
        if self.core.is_offline() {
            return Err(CoreError::DeviceOffline {
                device_id: self.device_id().to_owned(),
            });
        }
        self.client.set_io_output(self.device_id(), port, on).await?;
        self.refresh_state().await
    }
}

impl Coordinator for IoCoordinator {
    type Data = IoSnapshot;

    fn core(&self) -> &CoordinatorCore<IoSnapshot> {
        &self.core
    }

    fn update(&self) -> impl Future<Output = Result<IoSnapshot, CoreError>> + Send {
        async move {
            match self.client.get_io_state(self.device_id()).await {
                Ok(raw) => Ok(IoSnapshot::from_raw(&raw)),
                Err(e) if e.is_offline() => {
                    debug!(device_id = self.device_id(), "acoGO! I/O offline (408)");
                    Ok(IoSnapshot::offline())
                }
                Err(e) => Err(e.into()),
            }
        }
    }

    fn is_offline_data(data: &IoSnapshot) -> bool {
        data.offline
    }

    fn fallback_data() -> IoSnapshot {
        IoSnapshot::offline()
    }

    fn warm_up(&self) -> impl Future<Output = ()> + Send {
        async move {
            self.details().await;
        }
    }
}
