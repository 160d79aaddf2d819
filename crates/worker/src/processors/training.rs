use labelforge_core::error::CoreError;
use labelforge_db::models::job::Job;
use labelforge_db::repositories::TrainingRepo;
use labelforge_events::StatusUpdate;
use labelforge_pipeline::TrainingRequest;
use serde_json::{json, Value};

use crate::context::WorkerContext;
use crate::error::WorkerError;

pub async fn process(ctx: &WorkerContext, job: &Job) -> Result<Value, WorkerError> {
    let training_id = job.entity_id;

    let Some(training) = TrainingRepo::start(&ctx.pool, training_id).await? else {
        let existing = TrainingRepo::find_by_id(&ctx.pool, training_id)
            .await?
            .ok_or(CoreError::not_found("Training", training_id))?;
        tracing::info!(
            training_id,
            status = %existing.status,
            "Training already started, skipping redelivered job"
        );
        return Ok(super::skipped(existing.status.as_str()));
    };

    ctx.notify(
        StatusUpdate::for_job(job.task_id, "processing", "train", training_id)
            .with_data(json!({ "model_id": training.model_id })),
    )
    .await;

    let request = TrainingRequest {
        training_id,
        dataset_id: training.dataset_id,
        model_id: training.model_id,
        config: training.config.0.clone(),
    };

    let run = async {
        let outcome = ctx.trainer.train(&request).await?;
        let stored =
            TrainingRepo::complete(&ctx.pool, training_id, &outcome.metrics, &outcome.artifact_key)
                .await?;
        if !stored {
            return Err(WorkerError::from(CoreError::not_found("Training", training_id)));
        }
        Ok::<_, WorkerError>(outcome)
    };

    match run.await {
        Ok(outcome) => {
            tracing::info!(
                training_id,
                model_id = training.model_id,
                map50 = outcome.metrics.map50,
                "Training completed"
            );
            Ok(json!({
                "training_id": training_id,
                "model_id": training.model_id,
                "artifact": outcome.artifact_key,
                "metrics": outcome.metrics,
            }))
        }
        Err(e) => {
            let message = e.to_string();
            TrainingRepo::fail(&ctx.pool, training_id, &message).await?;
            tracing::warn!(training_id, error = %message, "Training failed");
            Err(e)
        }
    }
}
