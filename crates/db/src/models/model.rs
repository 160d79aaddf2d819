//! Model entity and DTOs.

use labelforge_core::training::TrainingMetrics;
use labelforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

use super::status::ModelStatus;

/// A row from the `models` table.
///
/// `config` is framework-specific and kept as an opaque JSON object;
/// `metrics` is copied from the training that produced the artifact at
/// `path` (an object key in the models bucket).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Model {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub model_type: String,
    pub framework: String,
    pub version: String,
    pub path: Option<String>,
    pub config: Json<serde_json::Value>,
    pub metrics: Option<Json<TrainingMetrics>>,
    pub status: ModelStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a model.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateModel {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `yolov8n`.
    #[validate(length(min = 1, max = 50))]
    pub model_type: Option<String>,
    /// Defaults to `pytorch`.
    #[validate(length(min = 1, max = 50))]
    pub framework: Option<String>,
    /// Defaults to `1.0.0`.
    #[validate(length(min = 1, max = 50))]
    pub version: Option<String>,
    pub config: Option<serde_json::Value>,
}

/// DTO for updating a model. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateModel {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub model_type: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub framework: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub version: Option<String>,
    pub config: Option<serde_json::Value>,
}

/// Body of `POST /api/v1/models/{id}/export`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportModelRequest {
    pub format: String,
}

