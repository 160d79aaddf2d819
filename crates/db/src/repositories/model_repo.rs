//! Repository for the `models` table.

use labelforge_core::pagination::{clamp_limit, clamp_skip};
use labelforge_core::training::TrainingMetrics;
use labelforge_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::models::model::{CreateModel, Model, UpdateModel};
use crate::models::status::ModelStatus;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, model_type, framework, version, path, config, \
                       metrics, status, created_at, updated_at";

/// Provides CRUD operations for models.
pub struct ModelRepo;

impl ModelRepo {
    /// Insert a new model in `created` status, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateModel) -> Result<Model, sqlx::Error> {
        let query = format!(
            "INSERT INTO models (name, description, model_type, framework, version, config)
             VALUES ($1, $2, COALESCE($3, 'yolov8n'), COALESCE($4, 'pytorch'),
                     COALESCE($5, '1.0.0'), COALESCE($6, '{{}}'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Model>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.model_type)
            .bind(&input.framework)
            .bind(&input.version)
            .bind(&input.config)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Model>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM models WHERE id = $1");
        sqlx::query_as::<_, Model>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        skip: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Model>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM models ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Model>(&query)
            .bind(clamp_limit(limit))
            .bind(clamp_skip(skip))
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM models")
            .fetch_one(pool)
            .await
    }

    /// Update a model. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateModel,
    ) -> Result<Option<Model>, sqlx::Error> {
        let query = format!(
            "UPDATE models SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                model_type = COALESCE($4, model_type),
                framework = COALESCE($5, framework),
                version = COALESCE($6, version),
                config = COALESCE($7, config)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Model>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.model_type)
            .bind(&input.framework)
            .bind(&input.version)
            .bind(&input.config)
            .fetch_optional(pool)
            .await
    }

    /// Delete a model with its trainings and detections. Returns the removed
    /// row so the caller can drop the stored artifact.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Model>, sqlx::Error> {
        let query = format!("DELETE FROM models WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Model>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_status(
        conn: &mut PgConnection,
        id: DbId,
        status: ModelStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE models SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Record the outcome of a successful training on its model.
    pub async fn mark_trained(
        conn: &mut PgConnection,
        id: DbId,
        metrics: &TrainingMetrics,
        path: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE models SET status = $2, metrics = $3, path = $4 WHERE id = $1")
            .bind(id)
            .bind(ModelStatus::Trained)
            .bind(Json(metrics))
            .bind(path)
            .execute(conn)
            .await?;
        Ok(())
    }
}
