// ── Integration sessions ──
//
// An `Integration` holds every active session keyed by its id. A session
// owns one API client, the device list captured at setup, and two
// coordinator registries (gates and I/O modules). Unloading a session
// cancels its pollers and joins them; an in-flight cycle runs to the end.

use std::sync::Arc;
use std::time::Duration;

use acogo_api::{AcogoClient, Device, TransportConfig};
use dashmap::DashMap;
use strum::{Display, EnumString};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::coordinator::{Coordinator, GateCoordinator, IoCoordinator, poller};
use crate::error::CoreError;
use crate::model::PortFilter;
use crate::registry::CoordinatorRegistry;

/// Which coordinator map a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum CoordinatorKind {
    Gate,
    Io,
}

/// A coordinator returned by [`Integration::get_or_create`].
#[derive(Clone)]
pub enum CoordinatorHandle {
    Gate(Arc<GateCoordinator>),
    Io(Arc<IoCoordinator>),
}

impl CoordinatorHandle {
    pub fn kind(&self) -> CoordinatorKind {
        match self {
            Self::Gate(_) => CoordinatorKind::Gate,
            Self::Io(_) => CoordinatorKind::Io,
        }
    }

    pub fn device_id(&self) -> &str {
        match self {
            Self::Gate(c) => c.device_id(),
            Self::Io(c) => c.device_id(),
        }
    }

    pub fn is_offline(&self) -> bool {
        match self {
            Self::Gate(c) => c.core().is_offline(),
            Self::Io(c) => c.core().is_offline(),
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────

/// One set-up integration session.
pub struct Session {
    id: String,
    client: AcogoClient,
    devices: Vec<Device>,
    port_filter: PortFilter,
    gate_interval: Duration,
    io_interval: Duration,
    gates: CoordinatorRegistry<GateCoordinator>,
    ios: CoordinatorRegistry<IoCoordinator>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn client(&self) -> &AcogoClient {
        &self.client
    }

    /// Device list captured at setup.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, device_id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == device_id)
    }

    pub fn port_filter(&self) -> PortFilter {
        self.port_filter
    }

    pub fn gates(&self) -> &CoordinatorRegistry<GateCoordinator> {
        &self.gates
    }

    pub fn ios(&self) -> &CoordinatorRegistry<IoCoordinator> {
        &self.ios
    }

    /// Gate coordinator for `device_id`, created and started on first use.
    pub async fn gate(&self, device_id: &str) -> Result<Arc<GateCoordinator>, CoreError> {
        self.gates
            .get_or_create(device_id, || async {
                let coordinator = Arc::new(GateCoordinator::new(
                    self.client.clone(),
                    device_id,
                    self.gate_interval,
                ));
                coordinator.first_refresh().await;
                self.start_poller(&coordinator).await;
                Ok(coordinator)
            })
            .await
    }

    /// I/O coordinator for `device_id`, created and started on first use.
    pub async fn io(&self, device_id: &str) -> Result<Arc<IoCoordinator>, CoreError> {
        self.ios
            .get_or_create(device_id, || async {
                let coordinator = Arc::new(IoCoordinator::new(
                    self.client.clone(),
                    device_id,
                    self.io_interval,
                ));
                coordinator.first_refresh().await;
                self.start_poller(&coordinator).await;
                Ok(coordinator)
            })
            .await
    }

    async fn start_poller<C: Coordinator>(&self, coordinator: &Arc<C>) {
        if let Some(handle) = poller::spawn(Arc::clone(coordinator), self.cancel.child_token()) {
            self.task_handles.lock().await.push(handle);
        }
    }

    /// Cancel every poller and wait for them to stop.
    async fn shutdown(&self) {
        self.cancel.cancel();

        let mut handles = self.task_handles.lock().await;
        for handle in handles.drain(..) {
            join_poller(&self.id, handle).await;
        }
        drop(handles);

        self.gates.clear();
        self.ios.clear();
        debug!(session_id = %self.id, "session shut down");
    }
}

/// Wait for a poller task. Returns `false` if it panicked or was aborted.
async fn join_poller(session_id: &str, handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            warn!(session_id, error = %e, "poller task ended abnormally");
            false
        }
    }
}

// ── Integration ──────────────────────────────────────────────────────

/// Holds every active session.
#[derive(Default)]
pub struct Integration {
    sessions: DashMap<String, Arc<Session>>,
}

impl Integration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the client, capture the device list and register the session.
    ///
    /// A session already registered under the same id is unloaded first.
    pub async fn setup(
        &self,
        session_id: &str,
        config: SessionConfig,
    ) -> Result<Arc<Session>, CoreError> {
        let client = AcogoClient::with_base_url(
            &config.api_base,
            &config.token,
            &TransportConfig::with_timeout(config.timeout),
        )?;

        let devices = match config.devices {
            Some(devices) => devices,
            None => client.get_devices().await?,
        };

        let session = Arc::new(Session {
            id: session_id.to_owned(),
            client,
            devices,
            port_filter: config.port_filter,
            gate_interval: config.gate_interval,
            io_interval: config.io_interval,
            gates: CoordinatorRegistry::new(),
            ios: CoordinatorRegistry::new(),
            cancel: CancellationToken::new(),
            task_handles: Mutex::new(Vec::new()),
        });

        if let Some(previous) = self
            .sessions
            .insert(session_id.to_owned(), Arc::clone(&session))
        {
            previous.shutdown().await;
        }

        info!(
            session_id,
            devices = session.devices.len(),
            "integration session ready"
        );
        Ok(session)
    }

    /// Tear a session down. Returns `false` when it was not set up.
    pub async fn unload(&self, session_id: &str) -> bool {
        let Some((_, session)) = self.sessions.remove(session_id) else {
            return false;
        };
        session.shutdown().await;
        info!(session_id, "integration session unloaded");
        true
    }

    /// The session registered under `session_id`.
    pub fn session(&self, session_id: &str) -> Result<Arc<Session>, CoreError> {
        self.sessions
            .get(session_id)
            .map(|s| Arc::clone(s.value()))
            .ok_or_else(|| CoreError::MissingSession {
                session_id: session_id.to_owned(),
            })
    }

    /// Coordinator for a device of a session, created on first reference.
    pub async fn get_or_create(
        &self,
        session_id: &str,
        device_id: &str,
        kind: CoordinatorKind,
    ) -> Result<CoordinatorHandle, CoreError> {
        let session = self.session(session_id)?;
        match kind {
            CoordinatorKind::Gate => session.gate(device_id).await.map(CoordinatorHandle::Gate),
            CoordinatorKind::Io => session.io(device_id).await.map(CoordinatorHandle::Io),
        }
    }
}
