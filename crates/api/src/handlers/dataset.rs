//! Handlers for datasets and their image membership.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use labelforge_core::error::CoreError;
use labelforge_core::pagination::PageParams;
use labelforge_core::types::DbId;
use labelforge_db::models::dataset::{
    CreateDataset, Dataset, DatasetImageIds, DatasetStats, UpdateDataset,
};
use labelforge_db::models::image::{Image, ImageFilter};
use labelforge_db::repositories::{DatasetRepo, ImageRepo};
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::response::{ApiResponse, Deleted};
use crate::state::AppState;

/// Result of attaching or detaching images.
#[derive(Debug, Serialize)]
pub struct MembershipChange {
    pub dataset_id: DbId,
    pub updated: u64,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/datasets
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Vec<Dataset>>>> {
    let datasets = DatasetRepo::list(&state.pool, params.skip, params.limit).await?;
    let total = DatasetRepo::count(&state.pool).await?;
    Ok(Json(ApiResponse::page("Datasets retrieved", datasets, total)))
}

/// POST /api/v1/datasets
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateDataset>,
) -> AppResult<(StatusCode, Json<ApiResponse<Dataset>>)> {
    input.validate()?;
    let dataset = DatasetRepo::create(&state.pool, &input).await?;
    tracing::info!(dataset_id = dataset.id, "Dataset created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Dataset created", dataset)),
    ))
}

/// GET /api/v1/datasets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Dataset>>> {
    let dataset = find(&state, id).await?;
    Ok(Json(ApiResponse::ok("Dataset retrieved", dataset)))
}

/// PUT /api/v1/datasets/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateDataset>,
) -> AppResult<Json<ApiResponse<Dataset>>> {
    input.validate()?;
    let dataset = DatasetRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::not_found("Dataset", id))?;
    Ok(Json(ApiResponse::ok("Dataset updated", dataset)))
}

/// DELETE /api/v1/datasets/{id}
///
/// Member images are kept and detached; trainings on the dataset are
/// removed.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    if !DatasetRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Dataset", id).into());
    }
    tracing::info!(dataset_id = id, "Dataset deleted");
    Ok(Json(ApiResponse::ok("Dataset deleted", Deleted { id })))
}

/// GET /api/v1/datasets/{id}/stats
pub async fn stats(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<DatasetStats>>> {
    let stats = DatasetRepo::stats(&state.pool, id)
        .await?
        .ok_or(CoreError::not_found("Dataset", id))?;
    Ok(Json(ApiResponse::ok("Dataset statistics retrieved", stats)))
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

/// GET /api/v1/datasets/{id}/images
pub async fn list_images(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<ApiResponse<Vec<Image>>>> {
    find(&state, id).await?;
    let filter = ImageFilter {
        dataset_id: Some(id),
        is_labeled: None,
        skip: params.skip,
        limit: params.limit,
    };
    let images = ImageRepo::list(&state.pool, &filter).await?;
    let total = ImageRepo::count(&state.pool, &filter).await?;
    Ok(Json(ApiResponse::page("Dataset images retrieved", images, total)))
}

/// POST /api/v1/datasets/{id}/images
///
/// Unknown image ids are ignored; `updated` counts the images moved.
pub async fn attach_images(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<DatasetImageIds>,
) -> AppResult<Json<ApiResponse<MembershipChange>>> {
    input.validate()?;
    find(&state, id).await?;
    let updated = ImageRepo::attach_to_dataset(&state.pool, id, &input.image_ids).await?;
    tracing::info!(dataset_id = id, updated, "Images attached to dataset");
    Ok(Json(ApiResponse::ok(
        "Images added to dataset",
        MembershipChange {
            dataset_id: id,
            updated,
        },
    )))
}

/// DELETE /api/v1/datasets/{id}/images
///
/// Only images currently in this dataset are detached.
pub async fn detach_images(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<DatasetImageIds>,
) -> AppResult<Json<ApiResponse<MembershipChange>>> {
    input.validate()?;
    find(&state, id).await?;
    let updated = ImageRepo::detach_from_dataset(&state.pool, id, &input.image_ids).await?;
    tracing::info!(dataset_id = id, updated, "Images detached from dataset");
    Ok(Json(ApiResponse::ok(
        "Images removed from dataset",
        MembershipChange {
            dataset_id: id,
            updated,
        },
    )))
}

async fn find(state: &AppState, id: DbId) -> AppResult<Dataset> {
    DatasetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Dataset", id)))
}
