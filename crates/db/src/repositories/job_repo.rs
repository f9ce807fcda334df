//! Repository for the `jobs` table.
//!
//! The queue is claim-based: workers pull with `FOR UPDATE SKIP LOCKED`
//! so concurrent workers never double-claim, and retry scheduling is a
//! `run_after` timestamp rather than an external scheduler.

use chrono::Utc;
use sqlx::PgPool;
use skillforge_core::types::DbId;

use crate::models::job::{Job, JOB_COMPLETED, JOB_FAILED, JOB_PENDING, JOB_RUNNING};
use crate::StoreError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, job_type, status, payload, priority, attempts, max_attempts, \
                       last_error, run_after, claimed_at, started_at, completed_at, \
                       created_at, updated_at";

/// Default retry budget for a job.
const DEFAULT_MAX_ATTEMPTS: i32 = 5;

/// Provides queue operations for background jobs.
pub struct JobRepo;

impl JobRepo {
    /// Enqueue a new pending job.
    pub async fn enqueue(
        pool: &PgPool,
        job_type: &str,
        payload: &serde_json::Value,
        priority: i32,
    ) -> Result<Job, StoreError> {
        let query = format!(
            "INSERT INTO jobs (job_type, status, payload, priority, max_attempts)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(job_type)
            .bind(JOB_PENDING)
            .bind(payload)
            .bind(priority)
            .bind(DEFAULT_MAX_ATTEMPTS)
            .fetch_one(pool)
            .await?;
        Ok(job)
    }

    /// Atomically claim the next eligible pending job.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so multiple workers can poll
    /// concurrently without double-claiming. The claim also counts as the
    /// start of an attempt.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<Job>, StoreError> {
        let query = format!(
            "UPDATE jobs \
             SET status = $1, claimed_at = NOW(), started_at = NOW(), \
                 attempts = attempts + 1, updated_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM jobs \
                 WHERE status = $2 AND run_after <= NOW() \
                 ORDER BY priority DESC, created_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(JOB_RUNNING)
            .bind(JOB_PENDING)
            .fetch_optional(pool)
            .await?;
        Ok(job)
    }

    /// Mark a job as successfully completed.
    pub async fn complete(pool: &PgPool, id: DbId) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE jobs SET status = $2, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(JOB_COMPLETED)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Reschedule a job after a transient failure.
    ///
    /// The job goes back to pending with `run_after` pushed out by
    /// `backoff_secs`; the attempt counter was already bumped at claim
    /// time.
    pub async fn fail_retry(
        pool: &PgPool,
        id: DbId,
        error: &str,
        backoff_secs: i64,
    ) -> Result<(), StoreError> {
        let run_after = Utc::now() + chrono::Duration::seconds(backoff_secs);
        sqlx::query(
            "UPDATE jobs \
             SET status = $2, last_error = $3, run_after = $4, \
                 claimed_at = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(JOB_PENDING)
        .bind(error)
        .bind(run_after)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Park a job as permanently failed (no further retries).
    pub async fn fail_permanent(pool: &PgPool, id: DbId, error: &str) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE jobs \
             SET status = $2, last_error = $3, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(JOB_FAILED)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find a job by id.
    pub async fn find(pool: &PgPool, id: DbId) -> Result<Option<Job>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(job)
    }

    /// Count jobs currently in a given status. Operational visibility.
    pub async fn count_by_status(pool: &PgPool, status: &str) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE status = $1")
            .bind(status)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
