use std::sync::Arc;

use labelforge_events::{publish_status, StatusUpdate};
use labelforge_pipeline::{Detector, ModelExporter, PipelineConfig, Trainer};
use sqlx::PgPool;

/// Everything a job processor needs, shared by the runner.
#[derive(Clone)]
pub struct WorkerContext {
    pub pool: PgPool,
    pub trainer: Arc<dyn Trainer>,
    pub detector: Arc<dyn Detector>,
    pub exporter: Arc<ModelExporter>,
    pub pipeline: PipelineConfig,
}

impl WorkerContext {
    /// Publish a status update to listening API processes. Delivery is best
    /// effort; failures are logged and never fail the job.
    pub async fn notify(&self, update: StatusUpdate) {
        if let Err(e) = publish_status(&self.pool, &update).await {
            tracing::warn!(
                error = %e,
                task_id = %update.task_id,
                status = %update.status,
                "Failed to publish status update"
            );
        }
    }
}
