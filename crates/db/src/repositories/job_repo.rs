//! Repository for the `jobs` table.
//!
//! Status literals come from `JobStatus`; no transition is written as a raw
//! string.

use labelforge_core::types::{DbId, TaskId, Timestamp};
use sqlx::PgPool;

use crate::models::job::Job;
use crate::models::status::JobStatus;

/// Column list for `jobs` queries.
const COLUMNS: &str = "id, task_id, job_kind, entity_id, payload, status, attempts, result, \
                       error, enqueued_at, started_at, completed_at";

/// Provides claim and completion operations for queued jobs.
pub struct JobRepo;

impl JobRepo {
    /// Atomically claim the oldest queued job.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so that concurrent workers never
    /// claim the same job.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs
             SET status = $1, started_at = NOW(), attempts = attempts + 1
             WHERE id = (
                 SELECT id FROM jobs
                 WHERE status = $2
                 ORDER BY enqueued_at, id
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobStatus::Running)
            .bind(JobStatus::Queued)
            .fetch_optional(pool)
            .await
    }

    /// Mark a running job as completed with its result payload.
    pub async fn complete(
        pool: &PgPool,
        job_id: DbId,
        result: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs SET status = $2, result = $3, completed_at = NOW()
             WHERE id = $1 AND status = $4",
        )
        .bind(job_id)
        .bind(JobStatus::Completed)
        .bind(result)
        .bind(JobStatus::Running)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a running job as failed. No automatic retry is performed.
    pub async fn fail(pool: &PgPool, job_id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs SET status = $2, error = $3, completed_at = NOW()
             WHERE id = $1 AND status = $4",
        )
        .bind(job_id)
        .bind(JobStatus::Failed)
        .bind(error)
        .bind(JobStatus::Running)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_task_id(pool: &PgPool, task_id: TaskId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE task_id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(task_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete completed and failed jobs that finished before `cutoff`.
    /// Returns the number of rows removed.
    pub async fn delete_finished_before(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM jobs WHERE status IN ($1, $2) AND completed_at < $3",
        )
        .bind(JobStatus::Completed)
        .bind(JobStatus::Failed)
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
