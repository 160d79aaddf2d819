//! Dataset entity model and DTOs.

use labelforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Default value of `datasets.format`.
pub const DEFAULT_DATASET_FORMAT: &str = "yolo";

/// A row from the `datasets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Dataset {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub format: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a dataset.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDataset {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `yolo` if omitted.
    #[validate(length(min = 1, max = 50))]
    pub format: Option<String>,
}

/// DTO for updating a dataset. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateDataset {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub format: Option<String>,
}

/// Labeling progress of a dataset.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DatasetStats {
    pub dataset_id: DbId,
    pub images_count: i64,
    pub labeled_images_count: i64,
}

/// Body of the attach/detach endpoints.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DatasetImageIds {
    #[validate(length(min = 1, max = 1000))]
    pub image_ids: Vec<DbId>,
}
