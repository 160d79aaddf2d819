use std::time::Instant;

use labelforge_core::color::random_color;
use labelforge_core::detection::DetectionOutcome;
use labelforge_core::error::CoreError;
use labelforge_db::models::job::Job;
use labelforge_db::repositories::{DetectionRepo, ImageRepo, ModelRepo};
use labelforge_events::StatusUpdate;
use labelforge_pipeline::DetectionRequest;
use serde_json::{json, Value};

use crate::context::WorkerContext;
use crate::error::WorkerError;

pub async fn process(ctx: &WorkerContext, job: &Job) -> Result<Value, WorkerError> {
    let detection_id = job.entity_id;

    let Some(detection) = DetectionRepo::start(&ctx.pool, detection_id).await? else {
        let existing = DetectionRepo::find_by_id(&ctx.pool, detection_id)
            .await?
            .ok_or(CoreError::not_found("Detection", detection_id))?;
        tracing::info!(
            detection_id,
            status = %existing.status,
            "Detection already started, skipping redelivered job"
        );
        return Ok(super::skipped(existing.status.as_str()));
    };

    ctx.notify(
        StatusUpdate::for_job(job.task_id, "processing", "detect", detection_id)
            .with_data(json!({ "image_id": detection.image_id })),
    )
    .await;

    let run = async {
        let image = ImageRepo::find_by_id(&ctx.pool, detection.image_id)
            .await?
            .ok_or(CoreError::not_found("Image", detection.image_id))?;
        let model = ModelRepo::find_by_id(&ctx.pool, detection.model_id)
            .await?
            .ok_or(CoreError::not_found("Model", detection.model_id))?;

        let request = DetectionRequest {
            detection_id,
            image_key: image.path,
            model_key: model.path,
            confidence_threshold: detection.confidence_threshold,
            max_detections: ctx.pipeline.max_detections,
        };
        let started = Instant::now();
        let objects = ctx.detector.detect(&request).await?;
        let outcome = DetectionOutcome {
            objects,
            processing_time: started.elapsed().as_secs_f64(),
        };

        let stored = DetectionRepo::complete(&ctx.pool, detection_id, &outcome, || {
            random_color(&mut rand::rng())
        })
        .await?;
        if !stored {
            return Err(WorkerError::from(CoreError::not_found("Detection", detection_id)));
        }
        Ok::<_, WorkerError>(outcome)
    };

    // Storing the outcome can fail too; the row must not stay `processing`.
    let outcome = match run.await {
        Ok(outcome) => outcome,
        Err(e) => {
            let message = e.to_string();
            DetectionRepo::fail(&ctx.pool, detection_id, &message).await?;
            tracing::warn!(detection_id, error = %message, "Detection failed");
            return Err(e);
        }
    };

    tracing::info!(
        detection_id,
        objects = outcome.objects.len(),
        processing_time = outcome.processing_time,
        "Detection completed"
    );
    Ok(json!({
        "detection_id": detection_id,
        "objects": outcome.objects.len(),
        "processing_time": outcome.processing_time,
    }))
}
