use labelforge_core::error::CoreError;
use labelforge_core::jobs::ExportPayload;
use labelforge_db::models::job::Job;
use labelforge_db::repositories::ModelRepo;
use serde_json::{json, Value};

use crate::context::WorkerContext;
use crate::error::WorkerError;

pub async fn process(ctx: &WorkerContext, job: &Job) -> Result<Value, WorkerError> {
    let model_id = job.entity_id;
    let payload: ExportPayload = serde_json::from_value(job.payload.clone())
        .map_err(|e| CoreError::Validation(format!("Invalid export payload: {e}")))?;

    let model = ModelRepo::find_by_id(&ctx.pool, model_id)
        .await?
        .ok_or(CoreError::not_found("Model", model_id))?;
    let artifact = model.path.ok_or_else(|| {
        CoreError::Validation(format!("Model {model_id} has no trained weights to export"))
    })?;

    let key = ctx.exporter.export(model_id, &artifact, &payload.format).await?;
    Ok(json!({
        "model_id": model_id,
        "format": payload.format,
        "key": key,
    }))
}
