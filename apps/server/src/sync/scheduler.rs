//! Repeating sync scheduler
//!
//! Fires the configured strategy on a fixed interval until cancelled. A
//! failed run is logged and the loop keeps its cadence; sync problems must
//! never take the server down.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::SyncStrategy;

/// Drives a [`SyncStrategy`] on a repeating timer
pub struct SyncScheduler;

impl SyncScheduler {
    /// Spawn the sync loop
    ///
    /// The first run happens one full interval after startup, not
    /// immediately. Runs are serialized: a tick that arrives while a pass is
    /// still in flight is delayed, never overlapped.
    pub fn start(
        strategy: Arc<dyn SyncStrategy>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                strategy = strategy.name(),
                interval_secs = interval.as_secs(),
                "Sync scheduler started"
            );

            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut first_run = true;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!(strategy = strategy.name(), "Sync scheduler stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        if first_run {
                            info!(strategy = strategy.name(), "Running initial sync");
                            first_run = false;
                        }
                        if let Err(e) = strategy.synchronize(false).await {
                            error!(
                                strategy = strategy.name(),
                                error = %e,
                                "Sync run failed"
                            );
                        }
                    }
                }
            }
        })
    }
}
