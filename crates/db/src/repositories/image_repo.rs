//! Repository for the `images` table.

use labelforge_core::pagination::{clamp_limit, clamp_skip};
use labelforge_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use super::ensure_parent_exists;
use crate::error::DbError;
use crate::models::image::{Image, ImageFilter, NewImage, UpdateImage};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, path, width, height, format, size, is_labeled, dataset_id, \
                       created_at, updated_at";

/// Provides CRUD operations for images.
pub struct ImageRepo;

impl ImageRepo {
    /// Insert an image row inside the caller's transaction.
    ///
    /// `path` is left empty; the caller sets it with [`ImageRepo::set_path`]
    /// once the id-derived object key is known. Fails validation if
    /// `dataset_id` points at a missing dataset.
    pub async fn insert(conn: &mut PgConnection, input: &NewImage) -> Result<Image, DbError> {
        if let Some(dataset_id) = input.dataset_id {
            ensure_parent_exists(conn, "datasets", "Dataset", dataset_id).await?;
        }
        let query = format!(
            "INSERT INTO images (name, width, height, format, size, dataset_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let image = sqlx::query_as::<_, Image>(&query)
            .bind(&input.name)
            .bind(input.width)
            .bind(input.height)
            .bind(&input.format)
            .bind(input.size)
            .bind(input.dataset_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(image)
    }

    pub async fn set_path(
        conn: &mut PgConnection,
        id: DbId,
        path: &str,
    ) -> Result<Image, sqlx::Error> {
        let query = format!("UPDATE images SET path = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Image>(&query)
            .bind(id)
            .bind(path)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Image>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM images WHERE id = $1");
        sqlx::query_as::<_, Image>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List images, optionally filtered by dataset and labeling state.
    pub async fn list(pool: &PgPool, filter: &ImageFilter) -> Result<Vec<Image>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM images
             WHERE ($1::BIGINT IS NULL OR dataset_id = $1)
               AND ($2::BOOLEAN IS NULL OR is_labeled = $2)
             ORDER BY id
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(filter.dataset_id)
            .bind(filter.is_labeled)
            .bind(clamp_limit(filter.limit))
            .bind(clamp_skip(filter.skip))
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &ImageFilter) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM images
             WHERE ($1::BIGINT IS NULL OR dataset_id = $1)
               AND ($2::BOOLEAN IS NULL OR is_labeled = $2)",
        )
        .bind(filter.dataset_id)
        .bind(filter.is_labeled)
        .fetch_one(pool)
        .await
    }

    /// Update an image's name or dataset. Returns `None` if the image does
    /// not exist; fails validation if the new dataset does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateImage,
    ) -> Result<Option<Image>, DbError> {
        let mut tx = pool.begin().await?;
        let exists: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM images WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(None);
        }
        if let Some(dataset_id) = input.dataset_id {
            ensure_parent_exists(&mut *tx, "datasets", "Dataset", dataset_id).await?;
        }
        let query = format!(
            "UPDATE images SET
                name = COALESCE($2, name),
                dataset_id = COALESCE($3, dataset_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let image = sqlx::query_as::<_, Image>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.dataset_id)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(image)
    }

    /// Delete an image with its annotations and detections, returning the
    /// removed row so the caller can drop the stored object.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Image>, sqlx::Error> {
        let query = format!("DELETE FROM images WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Image>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Move images into a dataset. Unknown image ids are ignored; returns
    /// the number of images moved.
    pub async fn attach_to_dataset(
        pool: &PgPool,
        dataset_id: DbId,
        image_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE images SET dataset_id = $1 WHERE id = ANY($2)")
            .bind(dataset_id)
            .bind(image_ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Remove images from a dataset. Images belonging to another dataset are
    /// left untouched; returns the number of images detached.
    pub async fn detach_from_dataset(
        pool: &PgPool,
        dataset_id: DbId,
        image_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE images SET dataset_id = NULL WHERE dataset_id = $1 AND id = ANY($2)",
        )
        .bind(dataset_id)
        .bind(image_ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Recompute `is_labeled` as "has at least one annotation".
    pub async fn refresh_is_labeled(conn: &mut PgConnection, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE images
             SET is_labeled = EXISTS(SELECT 1 FROM annotations WHERE image_id = $1)
             WHERE id = $1",
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }
}
