// ── Per-device polling coordinators ──
//
// A coordinator owns the last-known data of one device, its offline flag
// and the outcome of its last refresh. At most one refresh cycle runs at
// a time: explicit refreshes wait for the in-flight cycle, timer ticks
// skip while one is running. State is published through a `watch`
// channel so entities and the CLI observe every commit.

pub mod gate;
pub mod io;
pub(crate) mod poller;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use crate::error::CoreError;

pub use gate::GateCoordinator;
pub use io::IoCoordinator;

// ── Snapshot ─────────────────────────────────────────────────────────

/// Everything an observer knows about a coordinator at one instant.
#[derive(Debug)]
pub struct Snapshot<T> {
    /// Last committed data. `None` until the first commit.
    pub data: Option<Arc<T>>,
    /// The device was reported unreachable by the last fetch.
    pub offline: bool,
    /// The last refresh cycle succeeded (or a fallback was committed).
    pub last_update_success: bool,
    /// Message of the last failed cycle.
    pub last_error: Option<String>,
    /// When data was last committed.
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Snapshot<T> {
    /// Entities are available iff the device is reachable and the last
    /// cycle succeeded.
    pub fn available(&self) -> bool {
        !self.offline && self.last_update_success
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            offline: false,
            last_update_success: true,
            last_error: None,
            updated_at: None,
        }
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            offline: self.offline,
            last_update_success: self.last_update_success,
            last_error: self.last_error.clone(),
            updated_at: self.updated_at,
        }
    }
}

// ── Shared state ─────────────────────────────────────────────────────

/// State and refresh serialization shared by every coordinator kind.
pub struct CoordinatorCore<T> {
    name: String,
    device_id: String,
    interval: Duration,
    state: watch::Sender<Snapshot<T>>,
    refresh_lock: Mutex<()>,
}

impl<T> CoordinatorCore<T> {
    pub fn new(name: String, device_id: &str, interval: Duration) -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self {
            name,
            device_id: device_id.to_owned(),
            interval,
            state,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Logger name, e.g. `acogo_io_<devId>`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Poll interval. Zero means the coordinator is never polled.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.state.subscribe()
    }

    pub fn data(&self) -> Option<Arc<T>> {
        self.state.borrow().data.clone()
    }

    pub fn is_offline(&self) -> bool {
        self.state.borrow().offline
    }

    pub fn last_update_success(&self) -> bool {
        self.state.borrow().last_update_success
    }

    pub fn available(&self) -> bool {
        self.state.borrow().available()
    }

    /// Replace data after a successful cycle (or a committed fallback).
    fn commit(&self, data: T, offline: bool) {
        self.state.send_modify(|s| {
            s.data = Some(Arc::new(data));
            s.offline = offline;
            s.last_update_success = true;
            s.last_error = None;
            s.updated_at = Some(Utc::now());
        });
    }

    /// Record a failed cycle. Data is kept; the offline flag only moves
    /// when the failure itself is an offline report.
    fn record_failure(&self, err: &CoreError) {
        let offline = err.is_offline();
        self.state.send_modify(|s| {
            if offline {
                s.offline = true;
            }
            s.last_update_success = false;
            s.last_error = Some(err.to_string());
        });
    }
}

// ── Coordinator trait ────────────────────────────────────────────────

/// A per-device data coordinator.
///
/// Implementors provide the fetch (`update`) and the fallback committed
/// when the first refresh fails; the refresh protocol is shared.
pub trait Coordinator: Send + Sync + 'static {
    type Data: Send + Sync + 'static;

    fn core(&self) -> &CoordinatorCore<Self::Data>;

    /// Fetch and transform one payload.
    fn update(&self) -> impl Future<Output = Result<Self::Data, CoreError>> + Send;

    /// Whether a successfully fetched payload means the device is offline.
    fn is_offline_data(_data: &Self::Data) -> bool {
        false
    }

    /// Data committed when the first refresh fails.
    fn fallback_data() -> Self::Data;

    /// Work done once before the first refresh.
    fn warm_up(&self) -> impl Future<Output = ()> + Send {
        async {}
    }

    // ── Provided refresh protocol ────────────────────────────────────

    /// Run one refresh cycle, waiting for any in-flight cycle first.
    ///
    /// The outcome is committed to the snapshot and also returned.
    fn refresh(&self) -> impl Future<Output = Result<(), CoreError>> + Send {
        async move {
            let _guard = self.core().refresh_lock.lock().await;
            run_cycle(self).await
        }
    }

    /// Run one cycle unless another is already in flight. Returns `false`
    /// when the cycle was skipped. Failures are logged, not returned.
    fn try_refresh(&self) -> impl Future<Output = bool> + Send {
        async move {
            let Ok(_guard) = self.core().refresh_lock.try_lock() else {
                debug!(coordinator = self.core().name(), "refresh in flight, skipping tick");
                return false;
            };
            if let Err(e) = run_cycle(self).await {
                warn!(coordinator = self.core().name(), error = %e, "periodic refresh failed");
            }
            true
        }
    }

    /// Refresh and log failures instead of returning them.
    fn request_refresh(&self) -> impl Future<Output = ()> + Send {
        async move {
            if let Err(e) = self.refresh().await {
                debug!(coordinator = self.core().name(), error = %e, "requested refresh failed");
            }
        }
    }

    /// Warm up, then refresh. A failed first refresh marks the device
    /// offline and commits [`fallback_data`](Coordinator::fallback_data)
    /// instead of failing.
    fn first_refresh(&self) -> impl Future<Output = ()> + Send {
        async move {
            self.warm_up().await;
            if let Err(e) = self.refresh().await {
                warn!(
                    device_id = self.core().device_id(),
                    error = %e,
                    "initial refresh failed, starting offline"
                );
                self.core().commit(Self::fallback_data(), true);
            }
        }
    }
}

async fn run_cycle<C: Coordinator + ?Sized>(coordinator: &C) -> Result<(), CoreError> {
    let core = coordinator.core();
    match coordinator.update().await {
        Ok(data) => {
            let offline = C::is_offline_data(&data);
            core.commit(data, offline);
            Ok(())
        }
        Err(e) => {
            core.record_failure(&e);
            Err(e)
        }
    }
}
