//! Job lookup by task handle.

use axum::extract::{Path, State};
use axum::Json;
use labelforge_core::types::{DbId, TaskId, Timestamp};
use labelforge_db::models::job::Job;
use labelforge_db::repositories::{JobRepo, OutboxRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::state::AppState;

/// A job the relay has not promoted to the queue yet.
#[derive(Debug, Serialize)]
pub struct PendingJob {
    pub task_id: TaskId,
    pub job_kind: String,
    pub entity_id: DbId,
    pub payload: serde_json::Value,
    pub status: &'static str,
    pub created_at: Timestamp,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum JobRecord {
    Queued(Job),
    Pending(PendingJob),
}

/// GET /api/v1/jobs/{task_id}
///
/// Returns the outbox entry with status `pending` while the job has not
/// been relayed, and the queue row afterwards. The relay sets `relayed_at`
/// in the same transaction that inserts the queue row, so reading the
/// outbox first never reports a relayed job as pending.
pub async fn get_by_task_id(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> AppResult<Json<ApiResponse<JobRecord>>> {
    let task_id: TaskId = task_id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid task id '{task_id}'")))?;

    if let Some(entry) = OutboxRepo::find_by_task_id(&state.pool, task_id).await? {
        if entry.relayed_at.is_none() {
            return Ok(Json(ApiResponse::ok(
                "Job retrieved",
                JobRecord::Pending(PendingJob {
                    task_id: entry.task_id,
                    job_kind: entry.job_kind,
                    entity_id: entry.entity_id,
                    payload: entry.payload,
                    status: "pending",
                    created_at: entry.created_at,
                }),
            )));
        }
    }

    let job = JobRepo::find_by_task_id(&state.pool, task_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {task_id} not found")))?;
    Ok(Json(ApiResponse::ok("Job retrieved", JobRecord::Queued(job))))
}
