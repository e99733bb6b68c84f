use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::Coordinator;

/// Spawn the ticker task of a coordinator. Returns `None` when the
/// coordinator has a zero interval and is never polled.
pub(crate) fn spawn<C: Coordinator>(
    coordinator: Arc<C>,
    cancel: CancellationToken,
) -> Option<JoinHandle<()>> {
    if coordinator.core().interval().is_zero() {
        return None;
    }
    Some(tokio::spawn(poll_task(coordinator, cancel)))
}

async fn poll_task<C: Coordinator>(coordinator: Arc<C>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(coordinator.core().interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                coordinator.try_refresh().await;
            }
        }
    }
    debug!(coordinator = coordinator.core().name(), "poller stopped");
}
