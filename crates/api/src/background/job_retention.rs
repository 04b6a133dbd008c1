//! Periodic eviction of finished jobs.
//!
//! Only spawned when a job TTL is configured. On each tick, drops finished
//! jobs whose terminal transition is older than the TTL. Jobs still in
//! flight are never evicted.

use std::sync::Arc;
use std::time::Duration;

use docflow_store::JobStore;
use tokio_util::sync::CancellationToken;

/// Run the job retention loop until `cancel` is triggered.
pub async fn run(store: Arc<JobStore>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        ttl_secs = store.config().ttl.map(|ttl| ttl.as_secs()),
        interval_secs = interval.as_secs(),
        "Job retention task started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Job retention task stopping");
                break;
            }
            _ = ticker.tick() => {
                let evicted = store.evict_expired().await;
                if evicted > 0 {
                    tracing::info!(evicted, "Job retention: evicted finished jobs");
                } else {
                    tracing::debug!("Job retention: nothing to evict");
                }
            }
        }
    }
}
