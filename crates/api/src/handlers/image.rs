//! Handlers for images: multipart upload, metadata CRUD and download URLs.

use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use labelforge_core::error::CoreError;
use labelforge_core::types::DbId;
use labelforge_db::models::annotation::Annotation;
use labelforge_db::models::image::{image_object_key, Image, ImageFilter, NewImage, UpdateImage};
use labelforge_db::repositories::{AnnotationRepo, ImageRepo};
use labelforge_storage::{content_type_for, Bucket};
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::response::{ApiResponse, Deleted};
use crate::state::AppState;
use crate::uploads::{image_extension, StagedUpload};

/// A presigned download link.
#[derive(Debug, Serialize)]
pub struct DownloadUrl {
    pub url: String,
    pub expires_in: u64,
}

/// GET /api/v1/images
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ImageFilter>,
) -> AppResult<Json<ApiResponse<Vec<Image>>>> {
    let images = ImageRepo::list(&state.pool, &filter).await?;
    let total = ImageRepo::count(&state.pool, &filter).await?;
    Ok(Json(ApiResponse::page("Images retrieved", images, total)))
}

/// POST /api/v1/images
///
/// Multipart form with a `file` part and an optional `dataset_id` part.
/// The row is inserted and the object written inside one transaction: a
/// failed storage write rolls the row back.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Image>>)> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut dataset_id: Option<DbId> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((filename, data.to_vec()));
            }
            "dataset_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !text.trim().is_empty() {
                    dataset_id = Some(text.trim().parse().map_err(|_| {
                        AppError::BadRequest(format!("Invalid dataset_id '{text}'"))
                    })?);
                }
            }
            _ => {}
        }
    }

    let (filename, data) =
        file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }
    let ext = image_extension(&filename)?;

    let staged = StagedUpload::write(&state.config.upload_dir, &ext, &data).await?;
    let (width, height) = staged.dimensions().await?;

    let input = NewImage {
        name: filename,
        width: i32::try_from(width)
            .map_err(|_| CoreError::Validation("Image width out of range".into()))?,
        height: i32::try_from(height)
            .map_err(|_| CoreError::Validation("Image height out of range".into()))?,
        format: ext.clone(),
        size: data.len() as i64,
        dataset_id,
    };

    let mut tx = state.pool.begin().await?;
    let inserted = ImageRepo::insert(&mut tx, &input).await?;
    let key = image_object_key(inserted.id, &ext);
    let image = ImageRepo::set_path(&mut tx, inserted.id, &key).await?;

    if let Err(e) = state
        .store
        .put(Bucket::Images, &key, data, content_type_for(&ext))
        .await
    {
        tracing::error!(image_id = image.id, key = %key, error = %e, "Image upload failed, rolling back");
        return Err(e.into());
    }
    if let Err(e) = tx.commit().await {
        if let Err(cleanup) = state.store.delete(Bucket::Images, &key).await {
            tracing::warn!(key = %key, error = %cleanup, "Failed to remove orphaned image object");
        }
        return Err(e.into());
    }
    drop(staged);

    tracing::info!(image_id = image.id, key = %key, width, height, "Image uploaded");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Image uploaded", image)),
    ))
}

/// GET /api/v1/images/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Image>>> {
    let image = find(&state, id).await?;
    Ok(Json(ApiResponse::ok("Image retrieved", image)))
}

/// PUT /api/v1/images/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateImage>,
) -> AppResult<Json<ApiResponse<Image>>> {
    input.validate()?;
    let image = ImageRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::not_found("Image", id))?;
    Ok(Json(ApiResponse::ok("Image updated", image)))
}

/// DELETE /api/v1/images/{id}
///
/// Removes the row (with its annotations and detections) and then the
/// stored object. A failed object delete is logged, not reported.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let image = ImageRepo::delete(&state.pool, id)
        .await?
        .ok_or(CoreError::not_found("Image", id))?;

    if !image.path.is_empty() {
        if let Err(e) = state.store.delete(Bucket::Images, &image.path).await {
            tracing::warn!(image_id = id, key = %image.path, error = %e, "Failed to delete image object");
        }
    }
    tracing::info!(image_id = id, "Image deleted");
    Ok(Json(ApiResponse::ok("Image deleted", Deleted { id })))
}

/// GET /api/v1/images/{id}/url
pub async fn download_url(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<DownloadUrl>>> {
    let image = find(&state, id).await?;
    let expires_in = state.config.presign_expiry_secs;
    let url = state
        .store
        .presign_get(Bucket::Images, &image.path, Duration::from_secs(expires_in))
        .await?;
    Ok(Json(ApiResponse::ok(
        "Image URL generated",
        DownloadUrl { url, expires_in },
    )))
}

/// GET /api/v1/images/{id}/annotations
pub async fn annotations(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Vec<Annotation>>>> {
    find(&state, id).await?;
    let annotations = AnnotationRepo::list_for_image(&state.pool, id).await?;
    let total = annotations.len() as i64;
    Ok(Json(ApiResponse::page(
        "Image annotations retrieved",
        annotations,
        total,
    )))
}

async fn find(state: &AppState, id: DbId) -> AppResult<Image> {
    ImageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Image", id)))
}
