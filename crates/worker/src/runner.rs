//! Job claim loop.

use labelforge_db::models::job::Job;
use labelforge_db::repositories::JobRepo;
use labelforge_events::StatusUpdate;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::config::WorkerConfig;
use crate::context::WorkerContext;
use crate::processors;

pub struct JobRunner {
    ctx: WorkerContext,
    config: WorkerConfig,
}

impl JobRunner {
    pub fn new(ctx: WorkerContext, config: WorkerConfig) -> Self {
        Self { ctx, config }
    }

    /// Claim and run a single queued job. Returns the processed job, or
    /// `None` when the queue is empty.
    pub async fn run_once(&self) -> Result<Option<Job>, sqlx::Error> {
        let Some(job) = JobRepo::claim_next(&self.ctx.pool).await? else {
            return Ok(None);
        };
        tracing::debug!(
            job_id = job.id,
            task_id = %job.task_id,
            kind = %job.job_kind,
            attempt = job.attempts,
            "Job claimed"
        );

        let update = match processors::dispatch(&self.ctx, &job).await {
            Ok(result) => {
                JobRepo::complete(&self.ctx.pool, job.id, &result).await?;
                StatusUpdate::for_job(job.task_id, "completed", &job.job_kind, job.entity_id)
                    .with_data(json!({ "result": result }))
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!(
                    job_id = job.id,
                    task_id = %job.task_id,
                    kind = %job.job_kind,
                    error = %message,
                    "Job failed"
                );
                JobRepo::fail(&self.ctx.pool, job.id, &message).await?;
                StatusUpdate::for_job(job.task_id, "failed", &job.job_kind, job.entity_id)
                    .with_data(json!({ "error": message }))
            }
        };
        self.ctx.notify(update).await;
        Ok(Some(job))
    }

    /// Process jobs until `cancel` fires, waiting `poll_interval` whenever
    /// the queue is empty. A job in progress is finished before stopping.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "Job runner started"
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }
            let idle = match self.run_once().await {
                Ok(Some(_)) => false,
                Ok(None) => true,
                Err(e) => {
                    tracing::error!(error = %e, "Job runner pass failed");
                    true
                }
            };
            if idle {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.config.poll_interval) => {}
                }
            }
        }
        tracing::info!("Job runner stopping");
    }
}
