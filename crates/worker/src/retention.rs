//! Periodic pruning of finished jobs and relayed outbox entries.

use std::time::Duration;

use chrono::Utc;
use labelforge_db::repositories::{JobRepo, OutboxRepo};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// How often the pruning pass runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

pub struct JobRetention;

impl JobRetention {
    /// Delete finished jobs and relayed outbox entries older than
    /// `retention`. Returns `(jobs, outbox_entries)` removed.
    pub async fn prune_once(pool: &PgPool, retention: Duration) -> Result<(u64, u64), sqlx::Error> {
        // A retention too long to express keeps everything.
        let Some(cutoff) = chrono::Duration::from_std(retention)
            .ok()
            .and_then(|age| Utc::now().checked_sub_signed(age))
        else {
            return Ok((0, 0));
        };
        let jobs = JobRepo::delete_finished_before(pool, cutoff).await?;
        let entries = OutboxRepo::delete_relayed_before(pool, cutoff).await?;
        Ok((jobs, entries))
    }

    /// Prune every hour until `cancel` fires.
    pub async fn run(pool: PgPool, retention: Duration, cancel: CancellationToken) {
        tracing::info!(
            retention_hours = retention.as_secs() / 3600,
            interval_secs = CLEANUP_INTERVAL.as_secs(),
            "Job retention started"
        );
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Job retention stopping");
                    break;
                }
                _ = interval.tick() => {
                    match Self::prune_once(&pool, retention).await {
                        Ok((0, 0)) => tracing::debug!("Job retention: nothing to prune"),
                        Ok((jobs, entries)) => {
                            tracing::info!(jobs, outbox_entries = entries, "Job retention: pruned old rows");
                        }
                        Err(e) => tracing::error!(error = %e, "Job retention pass failed"),
                    }
                }
            }
        }
    }
}
