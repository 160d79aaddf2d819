//! Repository for the `job_outbox` table.

use labelforge_core::types::{TaskId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::job::{NewOutboxEntry, OutboxEntry};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, task_id, job_kind, entity_id, payload, created_at, relayed_at";

/// Writes job intents and promotes them to the `jobs` queue.
pub struct OutboxRepo;

impl OutboxRepo {
    /// Record a job intent inside the caller's transaction.
    pub async fn insert(
        conn: &mut PgConnection,
        entry: &NewOutboxEntry,
    ) -> Result<OutboxEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO job_outbox (task_id, job_kind, entity_id, payload)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OutboxEntry>(&query)
            .bind(entry.task_id)
            .bind(entry.kind.as_str())
            .bind(entry.entity_id)
            .bind(&entry.payload)
            .fetch_one(conn)
            .await
    }

    /// Record a job intent that has no entity row of its own.
    pub async fn enqueue(pool: &PgPool, entry: &NewOutboxEntry) -> Result<OutboxEntry, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::insert(&mut conn, entry).await
    }

    /// Promote up to `batch_size` pending entries to the job queue.
    ///
    /// Pending rows are locked with `SKIP LOCKED`, so concurrent relays never
    /// promote the same entry; the `task_id` conflict guard makes a replay
    /// after a crash harmless. Returns the number of entries relayed.
    pub async fn relay_pending(pool: &PgPool, batch_size: i64) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let pending: Vec<OutboxEntry> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM job_outbox
             WHERE relayed_at IS NULL
             ORDER BY id
             LIMIT $1
             FOR UPDATE SKIP LOCKED"
        ))
        .bind(batch_size)
        .fetch_all(&mut *tx)
        .await?;

        if pending.is_empty() {
            tx.commit().await?;
            return Ok(0);
        }

        for entry in &pending {
            sqlx::query(
                "INSERT INTO jobs (task_id, job_kind, entity_id, payload)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT ON CONSTRAINT uq_jobs_task_id DO NOTHING",
            )
            .bind(entry.task_id)
            .bind(&entry.job_kind)
            .bind(entry.entity_id)
            .bind(&entry.payload)
            .execute(&mut *tx)
            .await?;
        }

        let ids: Vec<i64> = pending.iter().map(|e| e.id).collect();
        sqlx::query("UPDATE job_outbox SET relayed_at = NOW() WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(pending.len() as u64)
    }

    pub async fn find_by_task_id(
        pool: &PgPool,
        task_id: TaskId,
    ) -> Result<Option<OutboxEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM job_outbox WHERE task_id = $1");
        sqlx::query_as::<_, OutboxEntry>(&query)
            .bind(task_id)
            .fetch_optional(pool)
            .await
    }

    /// Number of entries not yet promoted to the queue.
    pub async fn pending_count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM job_outbox WHERE relayed_at IS NULL")
            .fetch_one(pool)
            .await
    }

    /// Delete entries relayed before `cutoff`. Pending entries are never
    /// touched. Returns the number of rows removed.
    pub async fn delete_relayed_before(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM job_outbox WHERE relayed_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
