//! Inbound completion signals and their job-queue plumbing.
//!
//! The web layer grades a submission, enqueues an
//! [`ActivityCompletionSignal`] as a background job, and moves on — a
//! failed gamification pipeline must never block the learner from seeing
//! their submission as graded. The worker decodes the payload and hands it
//! to the orchestrator.

use serde::{Deserialize, Serialize};
use skillforge_core::types::{DbId, Timestamp};
use skillforge_db::models::job::{Job, JOB_TYPE_ACTIVITY_COMPLETED, JOB_TYPE_COURSE_COMPLETED};
use skillforge_db::models::user_activity::RecordCompletion;
use skillforge_db::repositories::{JobRepo, UserActivityRepo};
use skillforge_db::{DbPool, TenantScope};
use validator::Validate;

use crate::error::EngineError;

/// The web layer's integration point: persist the graded completion (the
/// core learning-progress record) and enqueue the gamification signal.
///
/// The two writes are deliberately independent — if the enqueue fails the
/// learner still sees their submission as graded, and the signal can be
/// re-enqueued by an operator.
pub async fn submit_graded_completion(
    scope: &TenantScope,
    signal: &ActivityCompletionSignal,
) -> Result<Job, EngineError> {
    signal
        .validate()
        .map_err(|e| EngineError::InvalidSignal(e.to_string()))?;
    UserActivityRepo::record_completion(
        scope,
        &RecordCompletion {
            user_id: signal.user_id,
            activity_id: signal.activity_id,
            score: signal.score,
            time_spent_secs: signal.time_spent_secs,
        },
    )
    .await?;
    signal.enqueue(scope.pool()).await
}

/// Raised whenever a learner's submission for an activity is graded.
/// Consumed exactly once per grading event.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ActivityCompletionSignal {
    pub user_id: DbId,
    pub activity_id: DbId,
    /// Percentage for quizzes; pass flag semantics for other types.
    #[validate(range(min = 0, max = 100))]
    pub score: i32,
    pub time_spent_secs: Option<i64>,
}

/// Raised internally when a course's progress first reaches 100%; also
/// enqueueable on its own for operational replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseCompletionSignal {
    pub user_id: DbId,
    pub course_id: DbId,
    pub enrolled_at: Timestamp,
}

impl ActivityCompletionSignal {
    /// Enqueue this signal for the background worker.
    pub async fn enqueue(&self, pool: &DbPool) -> Result<Job, EngineError> {
        self.validate()
            .map_err(|e| EngineError::InvalidSignal(e.to_string()))?;
        let payload = serde_json::to_value(self)
            .map_err(|e| EngineError::InvalidSignal(e.to_string()))?;
        let job = JobRepo::enqueue(pool, JOB_TYPE_ACTIVITY_COMPLETED, &payload, 0).await?;
        Ok(job)
    }

    /// Decode a queued job payload back into a signal.
    pub fn from_payload(payload: &serde_json::Value) -> Result<Self, EngineError> {
        let signal: Self = serde_json::from_value(payload.clone())
            .map_err(|e| EngineError::InvalidSignal(e.to_string()))?;
        signal
            .validate()
            .map_err(|e| EngineError::InvalidSignal(e.to_string()))?;
        Ok(signal)
    }
}

impl CourseCompletionSignal {
    /// Enqueue this signal for the background worker.
    pub async fn enqueue(&self, pool: &DbPool) -> Result<Job, EngineError> {
        let payload = serde_json::to_value(self)
            .map_err(|e| EngineError::InvalidSignal(e.to_string()))?;
        let job = JobRepo::enqueue(pool, JOB_TYPE_COURSE_COMPLETED, &payload, 0).await?;
        Ok(job)
    }

    /// Decode a queued job payload back into a signal.
    pub fn from_payload(payload: &serde_json::Value) -> Result<Self, EngineError> {
        serde_json::from_value(payload.clone())
            .map_err(|e| EngineError::InvalidSignal(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
