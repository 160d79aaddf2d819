use labelforge_core::error::CoreError;
use labelforge_pipeline::PipelineError;

/// Error that fails a job. Its display text is stored on the job row and,
/// where one exists, on the entity row.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
