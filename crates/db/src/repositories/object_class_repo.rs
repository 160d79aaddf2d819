//! Repository for the `object_classes` table.

use labelforge_core::color::DEFAULT_CLASS_COLOR;
use labelforge_core::pagination::{clamp_limit, clamp_skip};
use labelforge_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::object_class::{CreateObjectClass, ObjectClass, UpdateObjectClass};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, color, description, created_at, updated_at";

/// Provides CRUD operations for object classes.
///
/// Names are unique (`uq_object_classes_name`); a duplicate insert or
/// rename surfaces as a unique violation on that constraint.
pub struct ObjectClassRepo;

impl ObjectClassRepo {
    /// Insert a new class, returning the created row.
    ///
    /// If `color` is `None` in the input, defaults to `#ff0000`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateObjectClass,
    ) -> Result<ObjectClass, sqlx::Error> {
        let query = format!(
            "INSERT INTO object_classes (name, color, description)
             VALUES ($1, COALESCE($2, '{DEFAULT_CLASS_COLOR}'), $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ObjectClass>(&query)
            .bind(&input.name)
            .bind(&input.color)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ObjectClass>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM object_classes WHERE id = $1");
        sqlx::query_as::<_, ObjectClass>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<ObjectClass>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM object_classes WHERE name = $1");
        sqlx::query_as::<_, ObjectClass>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        skip: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<ObjectClass>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM object_classes ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, ObjectClass>(&query)
            .bind(clamp_limit(limit))
            .bind(clamp_skip(skip))
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM object_classes")
            .fetch_one(pool)
            .await
    }

    /// Update a class. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateObjectClass,
    ) -> Result<Option<ObjectClass>, sqlx::Error> {
        let query = format!(
            "UPDATE object_classes SET
                name = COALESCE($2, name),
                color = COALESCE($3, color),
                description = COALESCE($4, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ObjectClass>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.color)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a class. Fails with a foreign-key violation while annotations
    /// still reference it. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM object_classes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Return the id of the class called `name`, registering it with `color`
    /// if it does not exist yet. Safe against concurrent registration of the
    /// same name.
    pub async fn find_or_create_by_name(
        conn: &mut PgConnection,
        name: &str,
        color: &str,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query(
            "INSERT INTO object_classes (name, color) VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_object_classes_name DO NOTHING",
        )
        .bind(name)
        .bind(color)
        .execute(&mut *conn)
        .await?;

        sqlx::query_scalar("SELECT id FROM object_classes WHERE name = $1")
            .bind(name)
            .fetch_one(conn)
            .await
    }
}
