//! Repository for the `detections` and `detection_results` tables.

use labelforge_core::detection::DetectionOutcome;
use labelforge_core::jobs::JobKind;
use labelforge_core::pagination::{clamp_limit, clamp_skip};
use labelforge_core::types::{new_task_id, DbId};
use sqlx::types::Json;
use sqlx::PgPool;

use super::{ensure_parent_exists, ObjectClassRepo, OutboxRepo};
use crate::error::DbError;
use crate::models::detection::{Detection, DetectionFilter, DetectionResult};
use crate::models::job::NewOutboxEntry;
use crate::models::status::DetectionStatus;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, task_id, image_id, model_id, confidence_threshold, results, status, \
                       error, processing_time, started_at, completed_at, created_at, updated_at";

const RESULT_COLUMNS: &str = "id, detection_id, class_id, coordinates, confidence";

/// Provides CRUD and lifecycle operations for detections.
pub struct DetectionRepo;

impl DetectionRepo {
    /// Insert a detection in `created` status together with its `detect`
    /// outbox entry, in one transaction.
    ///
    /// Fails validation, persisting nothing, if the image or model does not
    /// exist.
    pub async fn create_with_job(
        pool: &PgPool,
        image_id: DbId,
        model_id: DbId,
        confidence_threshold: f64,
    ) -> Result<Detection, DbError> {
        let mut tx = pool.begin().await?;
        ensure_parent_exists(&mut *tx, "images", "Image", image_id).await?;
        ensure_parent_exists(&mut *tx, "models", "Model", model_id).await?;

        let query = format!(
            "INSERT INTO detections (task_id, image_id, model_id, confidence_threshold)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let detection = sqlx::query_as::<_, Detection>(&query)
            .bind(new_task_id())
            .bind(image_id)
            .bind(model_id)
            .bind(confidence_threshold)
            .fetch_one(&mut *tx)
            .await?;

        OutboxRepo::insert(
            &mut tx,
            &NewOutboxEntry {
                task_id: detection.task_id,
                kind: JobKind::Detect,
                entity_id: detection.id,
                payload: serde_json::json!({}),
            },
        )
        .await?;
        tx.commit().await?;
        Ok(detection)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Detection>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM detections WHERE id = $1");
        sqlx::query_as::<_, Detection>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List detections, optionally filtered by image, model and status.
    pub async fn list(
        pool: &PgPool,
        filter: &DetectionFilter,
    ) -> Result<Vec<Detection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM detections
             WHERE ($1::BIGINT IS NULL OR image_id = $1)
               AND ($2::BIGINT IS NULL OR model_id = $2)
               AND ($3::TEXT IS NULL OR status = $3)
             ORDER BY id
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Detection>(&query)
            .bind(filter.image_id)
            .bind(filter.model_id)
            .bind(filter.status)
            .bind(clamp_limit(filter.limit))
            .bind(clamp_skip(filter.skip))
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &DetectionFilter) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM detections
             WHERE ($1::BIGINT IS NULL OR image_id = $1)
               AND ($2::BIGINT IS NULL OR model_id = $2)
               AND ($3::TEXT IS NULL OR status = $3)",
        )
        .bind(filter.image_id)
        .bind(filter.model_id)
        .bind(filter.status)
        .fetch_one(pool)
        .await
    }

    /// Delete a detection with its result rows. Returns `true` if a row was
    /// removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM detections WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a `created` detection to `processing`. Returns `None` if the row
    /// is missing or already started.
    pub async fn start(pool: &PgPool, id: DbId) -> Result<Option<Detection>, sqlx::Error> {
        let query = format!(
            "UPDATE detections SET status = $2, started_at = NOW()
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Detection>(&query)
            .bind(id)
            .bind(DetectionStatus::Processing)
            .bind(DetectionStatus::Created)
            .fetch_optional(pool)
            .await
    }

    /// Move a `processing` detection to `completed`, storing the outcome and
    /// one `detection_results` row per object, in one transaction.
    ///
    /// Class names the system has not seen are registered with a color
    /// drawn from `new_color`.
    pub async fn complete<F>(
        pool: &PgPool,
        id: DbId,
        outcome: &DetectionOutcome,
        mut new_color: F,
    ) -> Result<bool, sqlx::Error>
    where
        F: FnMut() -> String,
    {
        let mut tx = pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE detections
             SET status = $2, results = $3, processing_time = $4, completed_at = NOW()
             WHERE id = $1 AND status = $5",
        )
        .bind(id)
        .bind(DetectionStatus::Completed)
        .bind(Json(outcome))
        .bind(outcome.processing_time)
        .bind(DetectionStatus::Processing)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        for object in &outcome.objects {
            let color = new_color();
            let class_id =
                ObjectClassRepo::find_or_create_by_name(&mut tx, &object.class_name, &color)
                    .await?;
            sqlx::query(
                "INSERT INTO detection_results (detection_id, class_id, coordinates, confidence)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(class_id)
            .bind(Json(object.bounding_box()))
            .bind(object.confidence)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(true)
    }

    /// Move a `processing` detection to `failed` with `error`.
    pub async fn fail(pool: &PgPool, id: DbId, error: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE detections SET status = $2, error = $3, completed_at = NOW()
             WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(DetectionStatus::Failed)
        .bind(error)
        .bind(DetectionStatus::Processing)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Per-object result rows of a detection.
    pub async fn results(
        pool: &PgPool,
        detection_id: DbId,
    ) -> Result<Vec<DetectionResult>, sqlx::Error> {
        let query = format!(
            "SELECT {RESULT_COLUMNS} FROM detection_results WHERE detection_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, DetectionResult>(&query)
            .bind(detection_id)
            .fetch_all(pool)
            .await
    }
}
