//! Background task that drops idle sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::orchestrator::ChatOrchestrator;

/// Call [`ChatOrchestrator::evict_expired`] every `every` until the task is
/// aborted or the runtime shuts down.
pub fn spawn_session_sweeper(orchestrator: Arc<ChatOrchestrator>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(interval_secs = every.as_secs_f64(), "Session sweeper started");
        let mut interval = tokio::time::interval(every);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let evicted = orchestrator.evict_expired();
            if evicted > 0 {
                tracing::debug!(evicted, remaining = orchestrator.session_count(), "Sweep finished");
            }
        }
    })
}
