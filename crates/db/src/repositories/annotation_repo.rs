//! Repository for the `annotations` table.
//!
//! Every write also refreshes the owning image's `is_labeled` flag inside
//! the same transaction, so the flag always equals "has at least one
//! annotation".

use std::collections::BTreeSet;

use labelforge_core::error::CoreError;
use labelforge_core::pagination::{clamp_limit, clamp_skip};
use labelforge_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use super::{ensure_parent_exists, ImageRepo};
use crate::error::DbError;
use crate::models::annotation::{
    Annotation, AnnotationFilter, CreateAnnotation, UpdateAnnotation,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, image_id, class_id, format, geometry, confidence, created_at, updated_at";

/// Provides CRUD operations for annotations.
pub struct AnnotationRepo;

impl AnnotationRepo {
    /// Insert an annotation and mark its image as labeled.
    ///
    /// Fails validation, persisting nothing, if the image or class does not
    /// exist.
    pub async fn create(pool: &PgPool, input: &CreateAnnotation) -> Result<Annotation, DbError> {
        let mut tx = pool.begin().await?;
        let annotation = Self::insert(&mut tx, input).await?;
        ImageRepo::refresh_is_labeled(&mut tx, annotation.image_id).await?;
        tx.commit().await?;
        Ok(annotation)
    }

    /// Insert many annotations atomically. A single missing image or class
    /// rejects the whole batch.
    pub async fn create_many(
        pool: &PgPool,
        inputs: &[CreateAnnotation],
    ) -> Result<Vec<Annotation>, DbError> {
        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            let annotation = Self::insert(&mut tx, input).await.map_err(|e| match e {
                DbError::Core(CoreError::Validation(msg)) => {
                    CoreError::Validation(format!("annotations[{index}]: {msg}")).into()
                }
                other => other,
            })?;
            created.push(annotation);
        }
        let images: BTreeSet<DbId> = created.iter().map(|a| a.image_id).collect();
        for image_id in images {
            ImageRepo::refresh_is_labeled(&mut tx, image_id).await?;
        }
        tx.commit().await?;
        Ok(created)
    }

    async fn insert(
        conn: &mut PgConnection,
        input: &CreateAnnotation,
    ) -> Result<Annotation, DbError> {
        ensure_parent_exists(conn, "images", "Image", input.image_id).await?;
        ensure_parent_exists(conn, "object_classes", "Class", input.class_id).await?;
        let query = format!(
            "INSERT INTO annotations (image_id, class_id, format, geometry, confidence)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let annotation = sqlx::query_as::<_, Annotation>(&query)
            .bind(input.image_id)
            .bind(input.class_id)
            .bind(input.geometry.format())
            .bind(Json(&input.geometry))
            .bind(input.confidence)
            .fetch_one(&mut *conn)
            .await?;
        Ok(annotation)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Annotation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM annotations WHERE id = $1");
        sqlx::query_as::<_, Annotation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List annotations, optionally filtered by image and class.
    pub async fn list(
        pool: &PgPool,
        filter: &AnnotationFilter,
    ) -> Result<Vec<Annotation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM annotations
             WHERE ($1::BIGINT IS NULL OR image_id = $1)
               AND ($2::BIGINT IS NULL OR class_id = $2)
             ORDER BY id
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Annotation>(&query)
            .bind(filter.image_id)
            .bind(filter.class_id)
            .bind(clamp_limit(filter.limit))
            .bind(clamp_skip(filter.skip))
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &AnnotationFilter) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM annotations
             WHERE ($1::BIGINT IS NULL OR image_id = $1)
               AND ($2::BIGINT IS NULL OR class_id = $2)",
        )
        .bind(filter.image_id)
        .bind(filter.class_id)
        .fetch_one(pool)
        .await
    }

    /// All annotations of one image.
    pub async fn list_for_image(
        pool: &PgPool,
        image_id: DbId,
    ) -> Result<Vec<Annotation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM annotations WHERE image_id = $1 ORDER BY id");
        sqlx::query_as::<_, Annotation>(&query)
            .bind(image_id)
            .fetch_all(pool)
            .await
    }

    /// Update an annotation. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists. Moving the
    /// annotation to another image refreshes both images' labeled flags.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAnnotation,
    ) -> Result<Option<Annotation>, DbError> {
        let mut tx = pool.begin().await?;
        let previous_image: Option<DbId> =
            sqlx::query_scalar("SELECT image_id FROM annotations WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(previous_image) = previous_image else {
            return Ok(None);
        };
        if let Some(image_id) = input.image_id {
            ensure_parent_exists(&mut *tx, "images", "Image", image_id).await?;
        }
        if let Some(class_id) = input.class_id {
            ensure_parent_exists(&mut *tx, "object_classes", "Class", class_id).await?;
        }

        let query = format!(
            "UPDATE annotations SET
                image_id = COALESCE($2, image_id),
                class_id = COALESCE($3, class_id),
                format = COALESCE($4, format),
                geometry = COALESCE($5, geometry),
                confidence = COALESCE($6, confidence)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let annotation = sqlx::query_as::<_, Annotation>(&query)
            .bind(id)
            .bind(input.image_id)
            .bind(input.class_id)
            .bind(input.geometry.as_ref().map(|g| g.format()))
            .bind(input.geometry.as_ref().map(Json))
            .bind(input.confidence)
            .fetch_one(&mut *tx)
            .await?;

        if annotation.image_id != previous_image {
            ImageRepo::refresh_is_labeled(&mut tx, previous_image).await?;
            ImageRepo::refresh_is_labeled(&mut tx, annotation.image_id).await?;
        }
        tx.commit().await?;
        Ok(Some(annotation))
    }

    /// Delete an annotation and recompute its image's labeled flag.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let image_id: Option<DbId> =
            sqlx::query_scalar("DELETE FROM annotations WHERE id = $1 RETURNING image_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(image_id) = image_id else {
            return Ok(false);
        };
        ImageRepo::refresh_is_labeled(&mut tx, image_id).await?;
        tx.commit().await?;
        Ok(true)
    }
}
