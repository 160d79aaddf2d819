use labelforge_core::error::CoreError;

/// Error returned by repository operations that check domain rules
/// (parent existence, uniqueness) inside their own transaction.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
