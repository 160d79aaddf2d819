//! Outbox entries and queued jobs.

use labelforge_core::error::CoreError;
use labelforge_core::jobs::JobKind;
use labelforge_core::types::{DbId, TaskId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::status::JobStatus;

/// A row from the `job_outbox` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OutboxEntry {
    pub id: DbId,
    pub task_id: TaskId,
    pub job_kind: String,
    pub entity_id: DbId,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
    pub relayed_at: Option<Timestamp>,
}

/// A job intent to write alongside its entity row.
#[derive(Debug, Clone)]
pub struct NewOutboxEntry {
    pub task_id: TaskId,
    pub kind: JobKind,
    pub entity_id: DbId,
    pub payload: serde_json::Value,
}

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub task_id: TaskId,
    pub job_kind: String,
    pub entity_id: DbId,
    pub payload: serde_json::Value,
    pub status: JobStatus,
    pub attempts: i32,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub enqueued_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl Job {
    pub fn kind(&self) -> Result<JobKind, CoreError> {
        JobKind::parse(&self.job_kind)
    }
}
