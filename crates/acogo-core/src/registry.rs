// ── Coordinator registry ──
//
// One coordinator per device id. Creation is single-flight per key: the
// first caller runs the initializer, concurrent callers for the same
// device wait on the same cell and receive the same instance.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::error::CoreError;

/// Map from device id to its coordinator.
pub struct CoordinatorRegistry<C> {
    entries: DashMap<String, Arc<OnceCell<Arc<C>>>>,
}

impl<C> Default for CoordinatorRegistry<C> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<C> CoordinatorRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the coordinator for `device_id`, running `init` if none
    /// exists yet. A failed `init` leaves the slot empty for a retry.
    pub async fn get_or_create<F, Fut>(&self, device_id: &str, init: F) -> Result<Arc<C>, CoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<C>, CoreError>>,
    {
        // Clone the cell out so no shard lock is held across the await.
        let cell = Arc::clone(&self.entries.entry(device_id.to_owned()).or_default());
        cell.get_or_try_init(init).await.cloned()
    }

    /// The initialized coordinator for `device_id`, if any.
    pub fn get(&self, device_id: &str) -> Option<Arc<C>> {
        self.entries
            .get(device_id)
            .and_then(|cell| cell.get().cloned())
    }

    /// All initialized coordinators.
    pub fn coordinators(&self) -> Vec<Arc<C>> {
        self.entries
            .iter()
            .filter_map(|entry| entry.value().get().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
