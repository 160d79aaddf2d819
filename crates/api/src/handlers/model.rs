//! Handlers for models: CRUD, trained artifact download, metrics and
//! export jobs.

use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use labelforge_core::error::CoreError;
use labelforge_core::jobs::{validate_export_format, ExportPayload, JobKind};
use labelforge_core::pagination::PageParams;
use labelforge_core::training::TrainingMetrics;
use labelforge_core::types::{new_task_id, DbId, TaskId};
use labelforge_db::models::job::NewOutboxEntry;
use labelforge_db::models::model::{CreateModel, ExportModelRequest, Model, UpdateModel};
use labelforge_db::repositories::{ModelRepo, OutboxRepo};
use labelforge_storage::Bucket;
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::image::DownloadUrl;
use crate::response::{ApiResponse, Deleted};
use crate::state::AppState;

/// Response body of an accepted export request.
#[derive(Debug, Serialize)]
pub struct ExportAccepted {
    pub task_id: TaskId,
    pub model_id: DbId,
    pub format: String,
}

fn ensure_config_object(config: Option<&serde_json::Value>) -> Result<(), CoreError> {
    match config {
        Some(value) if !value.is_object() => Err(CoreError::Validation(
            "config must be a JSON object".into(),
        )),
        _ => Ok(()),
    }
}

/// GET /api/v1/models
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Vec<Model>>>> {
    let models = ModelRepo::list(&state.pool, params.skip, params.limit).await?;
    let total = ModelRepo::count(&state.pool).await?;
    Ok(Json(ApiResponse::page("Models retrieved", models, total)))
}

/// POST /api/v1/models
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateModel>,
) -> AppResult<(StatusCode, Json<ApiResponse<Model>>)> {
    input.validate()?;
    ensure_config_object(input.config.as_ref())?;
    let model = ModelRepo::create(&state.pool, &input).await?;
    tracing::info!(model_id = model.id, model_type = %model.model_type, "Model created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Model created", model)),
    ))
}

/// GET /api/v1/models/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Model>>> {
    let model = find(&state, id).await?;
    Ok(Json(ApiResponse::ok("Model retrieved", model)))
}

/// PUT /api/v1/models/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateModel>,
) -> AppResult<Json<ApiResponse<Model>>> {
    input.validate()?;
    ensure_config_object(input.config.as_ref())?;
    let model = ModelRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::not_found("Model", id))?;
    Ok(Json(ApiResponse::ok("Model updated", model)))
}

/// DELETE /api/v1/models/{id}
///
/// Trainings and detections of the model are removed with it. The trained
/// artifact is deleted from storage afterwards, best effort.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let model = ModelRepo::delete(&state.pool, id)
        .await?
        .ok_or(CoreError::not_found("Model", id))?;
    if let Some(path) = &model.path {
        if let Err(e) = state.store.delete(Bucket::Models, path).await {
            tracing::warn!(model_id = id, key = %path, error = %e, "Failed to delete model artifact");
        }
    }
    tracing::info!(model_id = id, "Model deleted");
    Ok(Json(ApiResponse::ok("Model deleted", Deleted { id })))
}

/// GET /api/v1/models/{id}/download
pub async fn download_url(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<DownloadUrl>>> {
    let model = find(&state, id).await?;
    let path = trained_path(&model)?;
    let expires_in = state.config.presign_expiry_secs;
    let url = state
        .store
        .presign_get(Bucket::Models, path, Duration::from_secs(expires_in))
        .await?;
    Ok(Json(ApiResponse::ok(
        "Model download URL generated",
        DownloadUrl { url, expires_in },
    )))
}

/// GET /api/v1/models/{id}/metrics
///
/// `data` is `null` until the model has been trained.
pub async fn metrics(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Option<TrainingMetrics>>>> {
    let model = find(&state, id).await?;
    Ok(Json(ApiResponse::ok(
        "Model metrics retrieved",
        model.metrics.map(|m| m.0),
    )))
}

/// POST /api/v1/models/{id}/export
///
/// Queues an export job; poll `/jobs/{task_id}` for the exported key.
pub async fn export(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<ExportModelRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ExportAccepted>>)> {
    validate_export_format(&input.format)?;
    let model = find(&state, id).await?;
    trained_path(&model)?;

    let entry = NewOutboxEntry {
        task_id: new_task_id(),
        kind: JobKind::Export,
        entity_id: id,
        payload: serde_json::to_value(ExportPayload {
            format: input.format.clone(),
        })
        .map_err(|e| AppError::InternalError(e.to_string()))?,
    };
    let queued = OutboxRepo::enqueue(&state.pool, &entry).await?;
    tracing::info!(model_id = id, task_id = %queued.task_id, format = %input.format, "Model export queued");

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::ok(
            "Model export queued",
            ExportAccepted {
                task_id: queued.task_id,
                model_id: id,
                format: input.format,
            },
        )),
    ))
}

fn trained_path(model: &Model) -> Result<&str, CoreError> {
    model.path.as_deref().ok_or_else(|| {
        CoreError::Validation(format!("Model {} has no trained weights", model.id))
    })
}

async fn find(state: &AppState, id: DbId) -> AppResult<Model> {
    ModelRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Model", id)))
}
