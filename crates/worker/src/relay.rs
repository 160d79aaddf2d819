//! Periodic promotion of outbox entries to the `jobs` queue.

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use labelforge_db::repositories::OutboxRepo;

use crate::config::WorkerConfig;

pub struct OutboxRelay;

impl OutboxRelay {
    /// Promote one batch. Returns the number of entries relayed.
    pub async fn relay_once(pool: &PgPool, batch_size: i64) -> Result<u64, sqlx::Error> {
        let relayed = OutboxRepo::relay_pending(pool, batch_size).await?;
        if relayed > 0 {
            tracing::debug!(relayed, "Outbox entries promoted to job queue");
        }
        Ok(relayed)
    }

    /// Relay on a fixed interval until `cancel` fires. A full batch is
    /// followed immediately by another pass.
    pub async fn run(pool: PgPool, config: WorkerConfig, cancel: CancellationToken) {
        tracing::info!(
            batch_size = config.relay_batch_size,
            interval_ms = config.relay_interval.as_millis() as u64,
            "Outbox relay started"
        );
        let mut interval = tokio::time::interval(config.relay_interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Outbox relay stopping");
                    break;
                }
                _ = interval.tick() => {
                    loop {
                        match Self::relay_once(&pool, config.relay_batch_size).await {
                            Ok(n) if n as i64 == config.relay_batch_size => continue,
                            Ok(_) => break,
                            Err(e) => {
                                tracing::error!(error = %e, "Outbox relay pass failed");
                                break;
                            }
                        }
                    }
                }
            }
        }
    }
}
