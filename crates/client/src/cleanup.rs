//! Periodic sweep for stale partitions.
//!
//! Catches partitions that an activation missed, e.g. when the process
//! restarted between two versions.

use std::sync::Arc;
use std::time::Duration;

use offcache_core::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::partitions::PartitionManager;

/// Default sweep interval (24 hours).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct CleanupTask {
    manager: Arc<PartitionManager>,
    interval: Duration,
}

impl CleanupTask {
    pub fn new(manager: Arc<PartitionManager>, interval: Duration) -> Self {
        Self { manager, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One sweep. Returns the names that were deleted.
    pub async fn run_once(&self) -> Result<Vec<String>, Error> {
        let deleted = self.manager.purge_stale_versions().await?;
        if !deleted.is_empty() {
            tracing::info!(count = deleted.len(), "periodic cleanup removed stale partitions");
        }
        Ok(deleted)
    }

    /// Sweep every `interval`, starting one interval from now.
    ///
    /// Failures are logged and the loop keeps going.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    tracing::warn!(error = %e, "periodic cleanup failed");
                }
            }
        })
    }
}
