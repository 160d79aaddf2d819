//! Training run model and DTOs.

use labelforge_core::training::{TrainingConfig, TrainingConfigInput, TrainingMetrics};
use labelforge_core::types::{DbId, TaskId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

use super::status::TrainingStatus;

/// A row from the `trainings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Training {
    pub id: DbId,
    pub task_id: TaskId,
    pub name: String,
    pub description: Option<String>,
    pub dataset_id: DbId,
    pub model_id: DbId,
    pub config: Json<TrainingConfig>,
    pub results: Option<Json<TrainingMetrics>>,
    pub status: TrainingStatus,
    pub error: Option<String>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body of `POST /api/v1/trainings`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTraining {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub dataset_id: DbId,
    pub model_id: DbId,
    #[serde(default)]
    pub config: TrainingConfigInput,
}

/// A training ready to insert: name defaulted and config resolved.
#[derive(Debug, Clone)]
pub struct NewTraining {
    pub name: String,
    pub description: Option<String>,
    pub dataset_id: DbId,
    pub model_id: DbId,
    pub config: TrainingConfig,
}

/// Query parameters for `GET /api/v1/trainings`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainingFilter {
    pub model_id: Option<DbId>,
    pub dataset_id: Option<DbId>,
    pub status: Option<TrainingStatus>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
