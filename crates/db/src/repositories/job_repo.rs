//! Repository for the `jobs` table.
//!
//! Every status transition is a conditional UPDATE guarded by the current
//! status, so racing writers resolve at the row level: exactly one claimer
//! wins `pending -> processing`, and a worker's final write against a job
//! that was cancelled mid-flight affects zero rows instead of clobbering the
//! terminal state.

use sqlx::PgPool;
use uuid::Uuid;

use mealsmith_core::types::{DbId, Timestamp};

use crate::models::job::Job;
use crate::models::status::JobStatus;

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, user_id, job_type, status_id, params, result, error_message, \
    created_at, updated_at, processing_started_at, completed_at";

/// Provides CRUD and state-transition operations for generation jobs.
pub struct JobRepo;

impl JobRepo {
    /// Create a new pending job and return the row.
    pub async fn submit(
        pool: &PgPool,
        user_id: DbId,
        job_type: &str,
        params: &serde_json::Value,
    ) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (id, user_id, job_type, status_id, params) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(job_type)
            .bind(JobStatus::Pending.id())
            .bind(params)
            .fetch_one(pool)
            .await
    }

    /// Atomically claim a specific pending job.
    ///
    /// Returns `true` if this caller won the transition to `processing`;
    /// `false` if the job was not pending any more (claimed elsewhere,
    /// cancelled, or gone).
    pub async fn claim(pool: &PgPool, job_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, processing_started_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(job_id)
        .bind(JobStatus::Processing.id())
        .bind(JobStatus::Pending.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Atomically claim the oldest pending job, if any.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so concurrent workers never
    /// double-claim.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs \
             SET status_id = $1, processing_started_at = NOW(), updated_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM jobs \
                 WHERE status_id = $2 \
                 ORDER BY created_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobStatus::Processing.id())
            .bind(JobStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark a processing job completed with its result payload.
    ///
    /// Guarded on `processing`: returns `false` when the job was cancelled
    /// (or otherwise left `processing`) in the meantime, in which case the
    /// result is discarded by the caller.
    pub async fn complete(
        pool: &PgPool,
        job_id: Uuid,
        result: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let outcome = sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, result = $3, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(job_id)
        .bind(JobStatus::Completed.id())
        .bind(result)
        .bind(JobStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(outcome.rows_affected() > 0)
    }

    /// Mark a processing job failed with an error message. Same guard and
    /// return contract as [`Self::complete`].
    pub async fn fail(
        pool: &PgPool,
        job_id: Uuid,
        error: &str,
    ) -> Result<bool, sqlx::Error> {
        let outcome = sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, error_message = $3, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(job_id)
        .bind(JobStatus::Failed.id())
        .bind(error)
        .bind(JobStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(outcome.rows_affected() > 0)
    }

    /// Cancel a job if it is not already in a terminal state.
    ///
    /// Returns `true` if the job was cancelled, `false` if it was already
    /// completed, failed, or cancelled.
    pub async fn cancel(pool: &PgPool, job_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id NOT IN ($3, $4, $5)",
        )
        .bind(job_id)
        .bind(JobStatus::Cancelled.id())
        .bind(JobStatus::Completed.id())
        .bind(JobStatus::Failed.id())
        .bind(JobStatus::Cancelled.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The caller's most recently completed job, optionally constrained to
    /// `completed_at >= since`. `None` is the expected no-match outcome, not
    /// an error.
    pub async fn recover_recent(
        pool: &PgPool,
        user_id: DbId,
        since: Option<Timestamp>,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE user_id = $1 \
               AND status_id = $2 \
               AND ($3::timestamptz IS NULL OR completed_at >= $3) \
             ORDER BY completed_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(user_id)
            .bind(JobStatus::Completed.id())
            .bind(since)
            .fetch_optional(pool)
            .await
    }

    /// Return jobs stuck in `processing` longer than `lease_secs` to
    /// `pending`, so a crashed worker's claims are eventually re-run.
    /// Returns the number of reclaimed jobs.
    pub async fn reclaim_stale(pool: &PgPool, lease_secs: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs \
             SET status_id = $1, processing_started_at = NULL, updated_at = NOW() \
             WHERE status_id = $2 \
               AND processing_started_at < NOW() - make_interval(secs => $3)",
        )
        .bind(JobStatus::Pending.id())
        .bind(JobStatus::Processing.id())
        .bind(lease_secs as f64)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
