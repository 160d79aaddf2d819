//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Operations that touch
//! more than one table open their own transaction; helpers meant to run
//! inside a caller's transaction take `&mut PgConnection` instead.

use labelforge_core::error::CoreError;
use labelforge_core::types::DbId;
use sqlx::PgConnection;

use crate::error::DbError;

pub mod annotation_repo;
pub mod dataset_repo;
pub mod detection_repo;
pub mod image_repo;
pub mod job_repo;
pub mod model_repo;
pub mod object_class_repo;
pub mod outbox_repo;
pub mod training_repo;

pub use annotation_repo::AnnotationRepo;
pub use dataset_repo::DatasetRepo;
pub use detection_repo::DetectionRepo;
pub use image_repo::ImageRepo;
pub use job_repo::JobRepo;
pub use model_repo::ModelRepo;
pub use object_class_repo::ObjectClassRepo;
pub use outbox_repo::OutboxRepo;
pub use training_repo::TrainingRepo;

/// Fail with a validation error unless `table` has a row with `id`.
///
/// Used to check referenced parents inside the transaction that inserts
/// the child, so a missing parent is reported as bad input rather than a
/// foreign-key fault.
pub(crate) async fn ensure_parent_exists(
    conn: &mut PgConnection,
    table: &'static str,
    entity: &'static str,
    id: DbId,
) -> Result<(), DbError> {
    let query = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = $1)");
    let exists: bool = sqlx::query_scalar(&query)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    if exists {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("{entity} with id {id} not found")).into())
    }
}
