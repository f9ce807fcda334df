//! Background job queue model.
//!
//! Jobs are platform infrastructure, not tenant-owned: the tenant a job
//! acts for is re-derived from its payload when the worker picks it up,
//! never inherited from whoever enqueued it.

use serde::Serialize;
use skillforge_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Job status values (CHECK constraint on `jobs.status`).
pub const JOB_PENDING: &str = "pending";
pub const JOB_RUNNING: &str = "running";
pub const JOB_COMPLETED: &str = "completed";
pub const JOB_FAILED: &str = "failed";

/// Well-known job types consumed by the gamification worker.
pub const JOB_TYPE_ACTIVITY_COMPLETED: &str = "gamification.activity_completed";
pub const JOB_TYPE_COURSE_COMPLETED: &str = "gamification.course_completed";
pub const JOB_TYPE_RECONCILE: &str = "gamification.reconcile";

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub job_type: String,
    pub status: String,
    pub payload: serde_json::Value,
    pub priority: i32,
    /// Attempts so far, including the one currently running.
    pub attempts: i32,
    pub max_attempts: i32,
    pub last_error: Option<String>,
    /// Not eligible for claiming before this instant (retry backoff).
    pub run_after: Timestamp,
    pub claimed_at: Option<Timestamp>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Job {
    /// Whether another retry is allowed after a transient failure.
    pub fn retries_remaining(&self) -> bool {
        self.attempts < self.max_attempts
    }
}
