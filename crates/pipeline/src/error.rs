use labelforge_storage::StorageError;

/// Errors raised by job routines. The worker records the display text on
/// the failed row.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Detector error: {0}")]
    Detector(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
