//! Annotation model and DTOs.

use labelforge_core::error::CoreError;
use labelforge_core::geometry::Geometry;
use labelforge_core::threshold_validation::validate_unit_range;
use labelforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// A row from the `annotations` table. `format` mirrors the geometry tag so
/// the column can be filtered without parsing JSON.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Annotation {
    pub id: DbId,
    pub image_id: DbId,
    pub class_id: DbId,
    pub format: String,
    pub geometry: Json<Geometry>,
    pub confidence: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an annotation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAnnotation {
    pub image_id: DbId,
    pub class_id: DbId,
    pub geometry: Geometry,
    #[validate(range(min = 0.0, max = 1.0))]
    pub confidence: Option<f64>,
}

impl CreateAnnotation {
    /// Shape checks that `validator` cannot express.
    pub fn check_geometry(&self) -> Result<(), CoreError> {
        self.geometry.validate()
    }
}

/// DTO for updating an annotation. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAnnotation {
    pub image_id: Option<DbId>,
    pub class_id: Option<DbId>,
    pub geometry: Option<Geometry>,
    pub confidence: Option<f64>,
}

impl UpdateAnnotation {
    pub fn validate_fields(&self) -> Result<(), CoreError> {
        if let Some(geometry) = &self.geometry {
            geometry.validate()?;
        }
        if let Some(confidence) = self.confidence {
            validate_unit_range(confidence, "confidence")?;
        }
        Ok(())
    }
}

/// Body of `POST /api/v1/annotations/bulk`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkCreateAnnotations {
    #[validate(length(min = 1, max = 1000), nested)]
    pub annotations: Vec<CreateAnnotation>,
}

/// Query parameters for `GET /api/v1/annotations`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnotationFilter {
    pub image_id: Option<DbId>,
    pub class_id: Option<DbId>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
