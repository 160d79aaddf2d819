//! Repository for the `datasets` table.

use labelforge_core::pagination::{clamp_limit, clamp_skip};
use labelforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::dataset::{
    CreateDataset, Dataset, DatasetStats, UpdateDataset, DEFAULT_DATASET_FORMAT,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, format, created_at, updated_at";

/// Provides CRUD operations for datasets.
pub struct DatasetRepo;

impl DatasetRepo {
    /// Insert a new dataset, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateDataset) -> Result<Dataset, sqlx::Error> {
        let query = format!(
            "INSERT INTO datasets (name, description, format)
             VALUES ($1, $2, COALESCE($3, '{DEFAULT_DATASET_FORMAT}'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Dataset>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.format)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Dataset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM datasets WHERE id = $1");
        sqlx::query_as::<_, Dataset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List datasets in insertion order.
    pub async fn list(
        pool: &PgPool,
        skip: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Dataset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM datasets ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Dataset>(&query)
            .bind(clamp_limit(limit))
            .bind(clamp_skip(skip))
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM datasets")
            .fetch_one(pool)
            .await
    }

    /// Update a dataset. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDataset,
    ) -> Result<Option<Dataset>, sqlx::Error> {
        let query = format!(
            "UPDATE datasets SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                format = COALESCE($4, format)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Dataset>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.format)
            .fetch_optional(pool)
            .await
    }

    /// Delete a dataset. Its images are kept with `dataset_id` cleared; its
    /// trainings are removed by cascade. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM datasets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Image counts for a dataset, or `None` if the dataset does not exist.
    pub async fn stats(pool: &PgPool, id: DbId) -> Result<Option<DatasetStats>, sqlx::Error> {
        sqlx::query_as::<_, DatasetStats>(
            "SELECT d.id AS dataset_id,
                    COUNT(i.id) AS images_count,
                    COUNT(i.id) FILTER (WHERE i.is_labeled) AS labeled_images_count
             FROM datasets d
             LEFT JOIN images i ON i.dataset_id = d.id
             WHERE d.id = $1
             GROUP BY d.id",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
