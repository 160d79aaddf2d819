use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use labelforge_core::error::CoreError;
use labelforge_core::types::DbId;
use labelforge_db::models::detection::{
    CreateDetection, Detection, DetectionFilter, DetectionResult,
};
use labelforge_db::repositories::DetectionRepo;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::response::{ApiResponse, Deleted};
use crate::state::AppState;

/// GET /api/v1/detections
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<DetectionFilter>,
) -> AppResult<Json<ApiResponse<Vec<Detection>>>> {
    let detections = DetectionRepo::list(&state.pool, &filter).await?;
    let total = DetectionRepo::count(&state.pool, &filter).await?;
    Ok(Json(ApiResponse::page("Detections retrieved", detections, total)))
}

/// POST /api/v1/detections
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateDetection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Detection>>)> {
    input.validate()?;
    let threshold = input
        .confidence_threshold
        .unwrap_or(state.pipeline.confidence_threshold);
    let detection =
        DetectionRepo::create_with_job(&state.pool, input.image_id, input.model_id, threshold)
            .await?;
    tracing::info!(
        detection_id = detection.id,
        task_id = %detection.task_id,
        image_id = detection.image_id,
        "Detection queued"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Detection queued", detection)),
    ))
}

/// GET /api/v1/detections/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Detection>>> {
    let detection = DetectionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::not_found("Detection", id))?;
    Ok(Json(ApiResponse::ok("Detection retrieved", detection)))
}

/// DELETE /api/v1/detections/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    if !DetectionRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Detection", id).into());
    }
    Ok(Json(ApiResponse::ok("Detection deleted", Deleted { id })))
}

/// GET /api/v1/detections/{id}/results
pub async fn results(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Vec<DetectionResult>>>> {
    DetectionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::not_found("Detection", id))?;
    let results = DetectionRepo::results(&state.pool, id).await?;
    let total = results.len() as i64;
    Ok(Json(ApiResponse::page("Detection results retrieved", results, total)))
}
