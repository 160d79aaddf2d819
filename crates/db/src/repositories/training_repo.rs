//! Repository for the `trainings` table.
//!
//! Status only moves forward: each transition is a conditional update on
//! the expected predecessor status, and reports whether it applied.

use labelforge_core::jobs::JobKind;
use labelforge_core::pagination::{clamp_limit, clamp_skip};
use labelforge_core::training::TrainingMetrics;
use labelforge_core::types::{new_task_id, DbId};
use sqlx::types::Json;
use sqlx::PgPool;

use super::{ensure_parent_exists, ModelRepo, OutboxRepo};
use crate::error::DbError;
use crate::models::job::NewOutboxEntry;
use crate::models::status::{ModelStatus, TrainingStatus};
use crate::models::training::{NewTraining, Training, TrainingFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, task_id, name, description, dataset_id, model_id, config, results, \
                       status, error, started_at, completed_at, created_at, updated_at";

/// Provides CRUD and lifecycle operations for trainings.
pub struct TrainingRepo;

impl TrainingRepo {
    /// Insert a training in `created` status together with its `train`
    /// outbox entry, in one transaction.
    ///
    /// Fails validation, persisting nothing, if the dataset or model does
    /// not exist.
    pub async fn create_with_job(pool: &PgPool, input: &NewTraining) -> Result<Training, DbError> {
        let mut tx = pool.begin().await?;
        ensure_parent_exists(&mut *tx, "datasets", "Dataset", input.dataset_id).await?;
        ensure_parent_exists(&mut *tx, "models", "Model", input.model_id).await?;

        let query = format!(
            "INSERT INTO trainings (task_id, name, description, dataset_id, model_id, config)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let training = sqlx::query_as::<_, Training>(&query)
            .bind(new_task_id())
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.dataset_id)
            .bind(input.model_id)
            .bind(Json(&input.config))
            .fetch_one(&mut *tx)
            .await?;

        OutboxRepo::insert(
            &mut tx,
            &NewOutboxEntry {
                task_id: training.task_id,
                kind: JobKind::Train,
                entity_id: training.id,
                payload: serde_json::json!({}),
            },
        )
        .await?;
        tx.commit().await?;
        Ok(training)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Training>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trainings WHERE id = $1");
        sqlx::query_as::<_, Training>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List trainings, optionally filtered by model, dataset and status.
    pub async fn list(pool: &PgPool, filter: &TrainingFilter) -> Result<Vec<Training>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM trainings
             WHERE ($1::BIGINT IS NULL OR model_id = $1)
               AND ($2::BIGINT IS NULL OR dataset_id = $2)
               AND ($3::TEXT IS NULL OR status = $3)
             ORDER BY id
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Training>(&query)
            .bind(filter.model_id)
            .bind(filter.dataset_id)
            .bind(filter.status)
            .bind(clamp_limit(filter.limit))
            .bind(clamp_skip(filter.skip))
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &TrainingFilter) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM trainings
             WHERE ($1::BIGINT IS NULL OR model_id = $1)
               AND ($2::BIGINT IS NULL OR dataset_id = $2)
               AND ($3::TEXT IS NULL OR status = $3)",
        )
        .bind(filter.model_id)
        .bind(filter.dataset_id)
        .bind(filter.status)
        .fetch_one(pool)
        .await
    }

    /// Delete a training. A job still queued for it will find the row gone
    /// and fail. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM trainings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a `created` training to `processing` and its model to
    /// `training`. Returns `None` if the row is missing or already started.
    pub async fn start(pool: &PgPool, id: DbId) -> Result<Option<Training>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE trainings SET status = $2, started_at = NOW()
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        let training = sqlx::query_as::<_, Training>(&query)
            .bind(id)
            .bind(TrainingStatus::Processing)
            .bind(TrainingStatus::Created)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(training) = &training {
            ModelRepo::set_status(&mut tx, training.model_id, ModelStatus::Training).await?;
        }
        tx.commit().await?;
        Ok(training)
    }

    /// Move a `processing` training to `completed`, storing its metrics, and
    /// mark the model trained with the artifact at `artifact_key`.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        metrics: &TrainingMetrics,
        artifact_key: &str,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let model_id: Option<DbId> = sqlx::query_scalar(
            "UPDATE trainings SET status = $2, results = $3, completed_at = NOW()
             WHERE id = $1 AND status = $4
             RETURNING model_id",
        )
        .bind(id)
        .bind(TrainingStatus::Completed)
        .bind(Json(metrics))
        .bind(TrainingStatus::Processing)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(model_id) = model_id else {
            return Ok(false);
        };
        ModelRepo::mark_trained(&mut tx, model_id, metrics, artifact_key).await?;
        tx.commit().await?;
        Ok(true)
    }

    /// Move a `processing` training to `failed` with `error`, and mark its
    /// model failed.
    pub async fn fail(pool: &PgPool, id: DbId, error: &str) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let model_id: Option<DbId> = sqlx::query_scalar(
            "UPDATE trainings SET status = $2, error = $3, completed_at = NOW()
             WHERE id = $1 AND status = $4
             RETURNING model_id",
        )
        .bind(id)
        .bind(TrainingStatus::Failed)
        .bind(error)
        .bind(TrainingStatus::Processing)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(model_id) = model_id else {
            return Ok(false);
        };
        ModelRepo::set_status(&mut tx, model_id, ModelStatus::Failed).await?;
        tx.commit().await?;
        Ok(true)
    }
}
