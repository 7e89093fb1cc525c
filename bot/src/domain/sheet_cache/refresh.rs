//! Background sweep that force-refreshes every cached range on a timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::SheetCache;

/// Shortest accepted sweep interval.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to a running refresh task.
///
/// Dropping the handle also stops the task at its next wake-up.
pub struct PeriodicRefresh {
    pub(super) shutdown: watch::Sender<bool>,
    pub(super) task: JoinHandle<()>,
}

impl PeriodicRefresh {
    /// Signal the task to stop and wait for it to finish its current sweep.
    pub async fn stop(self) {
        let Self { shutdown, task } = self;
        if shutdown.send(true).is_err() {
            debug!("sheet refresh task already ended");
        }
        if let Err(error) = task.await {
            warn!(error = %error, "sheet refresh task ended abnormally");
        }
    }
}

impl SheetCache {
    /// Start sweeping every `interval`; the first sweep runs one interval
    /// after the call.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_periodic_refresh(self: &Arc<Self>, interval: Duration) -> PeriodicRefresh {
        let interval = interval.max(MIN_INTERVAL);
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let cache = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = interval.as_secs(), "sheet refresh task started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = cache.refresh_all().await;
                        info!(
                            refreshed = report.refreshed,
                            failed = report.failed,
                            "sheet refresh sweep finished"
                        );
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("sheet refresh task stopped");
        });

        PeriodicRefresh { shutdown, task }
    }
}
