use std::sync::Arc;
use std::time::Duration;

use crate::ws::hub::StatusHub;

/// Interval between heartbeat pings (in seconds).
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn a background task that pings every status connection.
///
/// Pings go through the same bounded queues as updates, so a connection
/// whose sender task has exited is pruned on the next beat.
pub fn start_heartbeat(hub: Arc<StatusHub>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let report = hub.ping_all().await;
            tracing::debug!(
                delivered = report.delivered,
                closed = report.closed,
                "Status heartbeat ping"
            );
        }
    })
}
