//! Handlers for trainings. Creating a training queues its job in the same
//! transaction; deleting it cancels any job that has not started.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use labelforge_core::error::CoreError;
use labelforge_core::training::TrainingMetrics;
use labelforge_core::types::DbId;
use labelforge_db::models::training::{CreateTraining, NewTraining, Training, TrainingFilter};
use labelforge_db::repositories::TrainingRepo;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::response::{ApiResponse, Deleted};
use crate::state::AppState;

/// GET /api/v1/trainings
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<TrainingFilter>,
) -> AppResult<Json<ApiResponse<Vec<Training>>>> {
    let trainings = TrainingRepo::list(&state.pool, &filter).await?;
    let total = TrainingRepo::count(&state.pool, &filter).await?;
    Ok(Json(ApiResponse::page("Trainings retrieved", trainings, total)))
}

/// POST /api/v1/trainings
///
/// Missing hyperparameters take the configured defaults.
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateTraining>,
) -> AppResult<(StatusCode, Json<ApiResponse<Training>>)> {
    input.validate()?;
    let config = input.config.resolve(&state.pipeline.training)?;

    let new = NewTraining {
        name: input
            .name
            .unwrap_or_else(|| format!("Model {} training", input.model_id)),
        description: input.description,
        dataset_id: input.dataset_id,
        model_id: input.model_id,
        config,
    };
    let training = TrainingRepo::create_with_job(&state.pool, &new).await?;
    tracing::info!(
        training_id = training.id,
        task_id = %training.task_id,
        model_id = training.model_id,
        epochs = training.config.epochs,
        "Training queued"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Training queued", training)),
    ))
}

/// GET /api/v1/trainings/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Training>>> {
    let training = TrainingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::not_found("Training", id))?;
    Ok(Json(ApiResponse::ok("Training retrieved", training)))
}

/// DELETE /api/v1/trainings/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    if !TrainingRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Training", id).into());
    }
    tracing::info!(training_id = id, "Training deleted");
    Ok(Json(ApiResponse::ok("Training deleted", Deleted { id })))
}

/// GET /api/v1/trainings/{id}/metrics
///
/// `data` is `null` until the training has completed.
pub async fn metrics(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Option<TrainingMetrics>>>> {
    let training = TrainingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::not_found("Training", id))?;
    Ok(Json(ApiResponse::ok(
        "Training metrics retrieved",
        training.results.map(|r| r.0),
    )))
}
