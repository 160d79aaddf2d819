//! Handlers for object classes (label categories).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use labelforge_core::color::validate_hex_color;
use labelforge_core::error::CoreError;
use labelforge_core::pagination::PageParams;
use labelforge_core::types::DbId;
use labelforge_db::models::object_class::{CreateObjectClass, ObjectClass, UpdateObjectClass};
use labelforge_db::repositories::ObjectClassRepo;
use validator::Validate;

use crate::error::{is_foreign_key_violation, AppError, AppResult};
use crate::extract::AppJson;
use crate::response::{ApiResponse, Deleted};
use crate::state::AppState;

/// GET /api/v1/classes
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Vec<ObjectClass>>>> {
    let classes = ObjectClassRepo::list(&state.pool, params.skip, params.limit).await?;
    let total = ObjectClassRepo::count(&state.pool).await?;
    Ok(Json(ApiResponse::page("Classes retrieved", classes, total)))
}

/// POST /api/v1/classes
///
/// A duplicate name is rejected with 409 by the unique constraint.
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateObjectClass>,
) -> AppResult<(StatusCode, Json<ApiResponse<ObjectClass>>)> {
    input.validate()?;
    if let Some(color) = &input.color {
        validate_hex_color(color)?;
    }
    let class = ObjectClassRepo::create(&state.pool, &input).await?;
    tracing::info!(class_id = class.id, name = %class.name, "Class created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Class created", class)),
    ))
}

/// GET /api/v1/classes/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<ObjectClass>>> {
    let class = ObjectClassRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::not_found("ObjectClass", id))?;
    Ok(Json(ApiResponse::ok("Class retrieved", class)))
}

/// PUT /api/v1/classes/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateObjectClass>,
) -> AppResult<Json<ApiResponse<ObjectClass>>> {
    input.validate()?;
    if let Some(color) = &input.color {
        validate_hex_color(color)?;
    }
    let class = ObjectClassRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::not_found("ObjectClass", id))?;
    Ok(Json(ApiResponse::ok("Class updated", class)))
}

/// DELETE /api/v1/classes/{id}
///
/// A class still referenced by annotations cannot be deleted (409).
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let deleted = match ObjectClassRepo::delete(&state.pool, id).await {
        Ok(deleted) => deleted,
        Err(e) if is_foreign_key_violation(&e) => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Class {id} is still used by annotations"
            ))));
        }
        Err(e) => return Err(e.into()),
    };
    if !deleted {
        return Err(CoreError::not_found("ObjectClass", id).into());
    }
    tracing::info!(class_id = id, "Class deleted");
    Ok(Json(ApiResponse::ok("Class deleted", Deleted { id })))
}
