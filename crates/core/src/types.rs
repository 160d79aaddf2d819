/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Opaque handle identifying one asynchronous job (outbox entry, queue row,
/// and the entity that requested it all share it).
pub type TaskId = uuid::Uuid;

/// Generate a fresh task handle.
pub fn new_task_id() -> TaskId {
    uuid::Uuid::new_v4()
}
