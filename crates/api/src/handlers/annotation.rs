//! Handlers for annotations. Creating, moving and deleting annotations keeps
//! each affected image's `is_labeled` flag in step.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use labelforge_core::error::CoreError;
use labelforge_core::types::DbId;
use labelforge_db::models::annotation::{
    Annotation, AnnotationFilter, BulkCreateAnnotations, CreateAnnotation, UpdateAnnotation,
};
use labelforge_db::repositories::AnnotationRepo;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::response::{ApiResponse, Deleted};
use crate::state::AppState;

/// GET /api/v1/annotations
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<AnnotationFilter>,
) -> AppResult<Json<ApiResponse<Vec<Annotation>>>> {
    let annotations = AnnotationRepo::list(&state.pool, &filter).await?;
    let total = AnnotationRepo::count(&state.pool, &filter).await?;
    Ok(Json(ApiResponse::page("Annotations retrieved", annotations, total)))
}

/// POST /api/v1/annotations
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateAnnotation>,
) -> AppResult<(StatusCode, Json<ApiResponse<Annotation>>)> {
    input.validate()?;
    input.check_geometry()?;
    let annotation = AnnotationRepo::create(&state.pool, &input).await?;
    tracing::info!(
        annotation_id = annotation.id,
        image_id = annotation.image_id,
        "Annotation created"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Annotation created", annotation)),
    ))
}

/// POST /api/v1/annotations/bulk
///
/// All or nothing: one invalid item rejects the whole batch.
pub async fn create_bulk(
    State(state): State<AppState>,
    AppJson(input): AppJson<BulkCreateAnnotations>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vec<Annotation>>>)> {
    input.validate()?;
    for (index, item) in input.annotations.iter().enumerate() {
        item.check_geometry().map_err(|e| match e {
            CoreError::Validation(msg) => {
                CoreError::Validation(format!("annotations[{index}]: {msg}"))
            }
            other => other,
        })?;
    }
    let annotations = AnnotationRepo::create_many(&state.pool, &input.annotations).await?;
    let total = annotations.len() as i64;
    tracing::info!(count = total, "Annotations created in bulk");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::page("Annotations created", annotations, total)),
    ))
}

/// GET /api/v1/annotations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Annotation>>> {
    let annotation = AnnotationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::not_found("Annotation", id))?;
    Ok(Json(ApiResponse::ok("Annotation retrieved", annotation)))
}

/// PUT /api/v1/annotations/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateAnnotation>,
) -> AppResult<Json<ApiResponse<Annotation>>> {
    input.validate_fields()?;
    let annotation = AnnotationRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::not_found("Annotation", id))?;
    Ok(Json(ApiResponse::ok("Annotation updated", annotation)))
}

/// DELETE /api/v1/annotations/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    if !AnnotationRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Annotation", id).into());
    }
    Ok(Json(ApiResponse::ok("Annotation deleted", Deleted { id })))
}
