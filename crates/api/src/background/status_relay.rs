//! Forwards status updates from the in-process event bus to every open
//! status connection.

use std::sync::Arc;

use labelforge_events::StatusUpdate;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

use crate::ws::StatusHub;

/// Run until `cancel` fires or the bus is dropped. Subscribe before
/// spawning so no update published in between is missed.
pub async fn run(
    mut rx: broadcast::Receiver<StatusUpdate>,
    hub: Arc<StatusHub>,
    cancel: CancellationToken,
) {
    tracing::info!("Status relay started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Status relay stopping");
                break;
            }
            received = rx.recv() => match received {
                Ok(update) => {
                    let report = hub.broadcast(&update).await;
                    tracing::debug!(
                        task_id = %update.task_id,
                        status = %update.status,
                        delivered = report.delivered,
                        dropped = report.dropped,
                        closed = report.closed,
                        "Status update broadcast"
                    );
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Status relay lagged, updates skipped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::extract::ws::Message;
    use labelforge_events::EventBus;

    use super::*;

    #[tokio::test]
    async fn bus_updates_reach_connections() {
        let bus = EventBus::default();
        let hub = Arc::new(StatusHub::new(8));
        let mut rx = hub.register("conn".into()).await;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(bus.subscribe(), Arc::clone(&hub), cancel.clone()));

        bus.publish(StatusUpdate::new("abc", "processing"));

        let msg = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let Message::Text(text) = msg else {
            panic!("expected a text frame");
        };
        let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(json["task_id"], "abc");
        assert_eq!(json["status"], "processing");

        cancel.cancel();
        handle.await.unwrap();
    }
}
