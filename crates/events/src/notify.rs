//! Cross-process status delivery over Postgres `LISTEN`/`NOTIFY`.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::bus::{EventBus, StatusUpdate};

/// Notification channel carrying JSON-encoded [`StatusUpdate`]s.
pub const STATUS_CHANNEL: &str = "job_status";

/// Delay before re-subscribing after the listener connection fails.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Send a status update to every listening process.
pub async fn publish_status(pool: &PgPool, update: &StatusUpdate) -> Result<(), sqlx::Error> {
    let payload = serde_json::to_string(update)
        .map_err(|e| sqlx::Error::Protocol(format!("encode status update: {e}")))?;
    sqlx::query("SELECT pg_notify($1, $2)")
        .bind(STATUS_CHANNEL)
        .bind(payload)
        .execute(pool)
        .await?;
    Ok(())
}

/// Forwards notifications from [`STATUS_CHANNEL`] onto an [`EventBus`].
pub struct StatusListener;

impl StatusListener {
    /// Run until `cancel` fires. Connection failures are logged and the
    /// subscription is re-established.
    pub async fn run(pool: PgPool, bus: Arc<EventBus>, cancel: CancellationToken) {
        tracing::info!(channel = STATUS_CHANNEL, "Status listener started");
        loop {
            let mut listener = match Self::subscribe(&pool).await {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::error!(error = %e, "Status listener failed to subscribe");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(RECONNECT_DELAY) => continue,
                    }
                }
            };

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("Status listener stopping");
                        return;
                    }
                    received = listener.recv() => match received {
                        Ok(notification) => {
                            match serde_json::from_str::<StatusUpdate>(notification.payload()) {
                                Ok(update) => bus.publish(update),
                                Err(e) => tracing::warn!(
                                    error = %e,
                                    "Ignoring malformed status notification"
                                ),
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Status listener connection lost");
                            break;
                        }
                    }
                }
            }
        }
        tracing::info!("Status listener stopping");
    }

    async fn subscribe(pool: &PgPool) -> Result<PgListener, sqlx::Error> {
        let mut listener = PgListener::connect_with(pool).await?;
        listener.listen(STATUS_CHANNEL).await?;
        Ok(listener)
    }
}
