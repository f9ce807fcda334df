//! Background job dispatcher.
//!
//! Polls the `jobs` table every `poll_interval` and runs claimed jobs to
//! completion. Claims use `FOR UPDATE SKIP LOCKED` via
//! [`JobRepo::claim_next`], so any number of worker processes can run
//! concurrently without double-dispatch. Each job is one unit of work:
//! the orchestrator re-establishes the tenant scope from the acting
//! user's persisted tenant id, never from ambient worker state.

use std::sync::Arc;
use std::time::Duration;

use skillforge_db::models::job::{
    Job, JOB_TYPE_ACTIVITY_COMPLETED, JOB_TYPE_COURSE_COMPLETED, JOB_TYPE_RECONCILE,
};
use skillforge_db::repositories::JobRepo;
use skillforge_db::DbPool;
use skillforge_engine::{
    reconcile, ActivityCompletionSignal, CourseCompletionSignal, EngineError, Orchestrator,
};
use tokio_util::sync::CancellationToken;

/// Base delay for the exponential retry backoff.
const RETRY_BASE_SECS: i64 = 30;

/// Background job dispatcher: a single long-lived Tokio task.
pub struct JobDispatcher {
    pool: DbPool,
    orchestrator: Arc<Orchestrator>,
    poll_interval: Duration,
}

impl JobDispatcher {
    pub fn new(pool: DbPool, orchestrator: Arc<Orchestrator>, poll_interval: Duration) -> Self {
        Self {
            pool,
            orchestrator,
            poll_interval,
        }
    }

    /// Run the dispatcher loop until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Job dispatcher started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Job dispatcher shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    // Drain everything claimable before sleeping again.
                    loop {
                        match JobRepo::claim_next(&self.pool).await {
                            Ok(Some(job)) => self.run_job(job).await,
                            Ok(None) => break,
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to claim next job");
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Execute one claimed job and record its terminal state.
    async fn run_job(&self, job: Job) {
        tracing::info!(job_id = job.id, job_type = %job.job_type, attempt = job.attempts, "Job claimed");

        match self.execute(&job).await {
            Ok(()) => {
                if let Err(e) = JobRepo::complete(&self.pool, job.id).await {
                    tracing::error!(job_id = job.id, error = %e, "Failed to mark job completed");
                }
            }
            Err(e) if e.is_permanent() => {
                // Retrying cannot help: the entity is gone or the signal
                // is malformed. Park the job.
                tracing::error!(job_id = job.id, error = %e, "Job failed permanently");
                if let Err(mark_err) =
                    JobRepo::fail_permanent(&self.pool, job.id, &e.to_string()).await
                {
                    tracing::error!(job_id = job.id, error = %mark_err, "Failed to park job");
                }
            }
            Err(e) => {
                if job.retries_remaining() {
                    let backoff = RETRY_BASE_SECS << (job.attempts - 1).clamp(0, 6);
                    tracing::warn!(
                        job_id = job.id,
                        error = %e,
                        backoff_secs = backoff,
                        "Job failed transiently, scheduling retry"
                    );
                    if let Err(mark_err) =
                        JobRepo::fail_retry(&self.pool, job.id, &e.to_string(), backoff).await
                    {
                        tracing::error!(job_id = job.id, error = %mark_err, "Failed to reschedule job");
                    }
                } else {
                    tracing::error!(
                        job_id = job.id,
                        error = %e,
                        attempts = job.attempts,
                        "Job exhausted its retries"
                    );
                    if let Err(mark_err) =
                        JobRepo::fail_permanent(&self.pool, job.id, &e.to_string()).await
                    {
                        tracing::error!(job_id = job.id, error = %mark_err, "Failed to park job");
                    }
                }
            }
        }
    }

    /// Decode and run a single job payload.
    async fn execute(&self, job: &Job) -> Result<(), EngineError> {
        match job.job_type.as_str() {
            JOB_TYPE_ACTIVITY_COMPLETED => {
                let signal = ActivityCompletionSignal::from_payload(&job.payload)?;
                self.orchestrator
                    .process_activity_completion(&self.pool, &signal)
                    .await?;
                Ok(())
            }
            JOB_TYPE_COURSE_COMPLETED => {
                let signal = CourseCompletionSignal::from_payload(&job.payload)?;
                self.orchestrator
                    .process_course_completion(&self.pool, &signal)
                    .await?;
                Ok(())
            }
            JOB_TYPE_RECONCILE => {
                let report = reconcile::reconcile_all(&self.pool).await?;
                tracing::info!(
                    checked = report.users_checked,
                    repaired = report.users_repaired,
                    "On-demand reconciliation finished"
                );
                Ok(())
            }
            other => Err(EngineError::InvalidSignal(format!(
                "unknown job type: {other}"
            ))),
        }
    }
}
