//! Detection run model, per-object results and DTOs.

use labelforge_core::detection::DetectionOutcome;
use labelforge_core::geometry::BoundingBox;
use labelforge_core::types::{DbId, TaskId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

use super::status::DetectionStatus;

/// A row from the `detections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Detection {
    pub id: DbId,
    pub task_id: TaskId,
    pub image_id: DbId,
    pub model_id: DbId,
    pub confidence_threshold: f64,
    pub results: Option<Json<DetectionOutcome>>,
    pub status: DetectionStatus,
    pub error: Option<String>,
    /// Seconds spent in the detector.
    pub processing_time: Option<f64>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `detection_results` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DetectionResult {
    pub id: DbId,
    pub detection_id: DbId,
    pub class_id: DbId,
    pub coordinates: Json<BoundingBox>,
    pub confidence: f64,
}

/// Request body of `POST /api/v1/detections`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDetection {
    pub image_id: DbId,
    pub model_id: DbId,
    /// Falls back to the configured default threshold.
    #[validate(range(min = 0.0, max = 1.0))]
    pub confidence_threshold: Option<f64>,
}

/// Query parameters for `GET /api/v1/detections`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectionFilter {
    pub image_id: Option<DbId>,
    pub model_id: Option<DbId>,
    pub status: Option<DetectionStatus>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
