//! Image entity model and DTOs.

use labelforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `images` table. `path` is the object key in the images
/// bucket.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Image {
    pub id: DbId,
    pub name: String,
    pub path: String,
    pub width: i32,
    pub height: i32,
    pub format: String,
    pub size: i64,
    pub is_labeled: bool,
    pub dataset_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Metadata of an uploaded file, extracted before the row is inserted.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub format: String,
    pub size: i64,
    pub dataset_id: Option<DbId>,
}

/// DTO for updating an image. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateImage {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub dataset_id: Option<DbId>,
}

/// Query parameters for `GET /api/v1/images`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageFilter {
    pub dataset_id: Option<DbId>,
    pub is_labeled: Option<bool>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Object key for an image's stored file.
pub fn image_object_key(id: DbId, extension: &str) -> String {
    format!("image_{id}.{extension}")
}
