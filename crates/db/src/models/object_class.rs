//! Object class (label category) model and DTOs.

use labelforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `object_classes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ObjectClass {
    pub id: DbId,
    pub name: String,
    pub color: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a class.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateObjectClass {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// `#rrggbb`; defaults to `#ff0000` if omitted.
    pub color: Option<String>,
    pub description: Option<String>,
}

/// DTO for updating a class. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateObjectClass {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

