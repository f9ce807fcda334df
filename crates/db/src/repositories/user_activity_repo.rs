//! Repository for the `user_activities` table.

use skillforge_core::types::{DbId, Timestamp};

use crate::models::user_activity::{CompletionFact, RecordCompletion, UserActivity};
use crate::scope::TenantScope;
use crate::StoreError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tenant_id, user_id, activity_id, started_at, completed_at, \
                       score, time_spent_secs, attempts, created_at";

/// Columns for [`CompletionFact`] queries (joined with `activities`).
const FACT_COLUMNS: &str =
    "ua.activity_id, a.activity_type, ua.score, ua.completed_at";

/// Provides CRUD operations for activity completion records.
pub struct UserActivityRepo;

impl UserActivityRepo {
    /// Record a graded completion. Each grading event appends its own row;
    /// the attempt counter continues from the user's prior attempts on the
    /// same activity.
    pub async fn record_completion(
        scope: &TenantScope,
        input: &RecordCompletion,
    ) -> Result<UserActivity, StoreError> {
        let tenant = scope.require_tenant()?;
        let query = format!(
            "INSERT INTO user_activities \
                 (tenant_id, user_id, activity_id, completed_at, score, time_spent_secs, attempts)
             VALUES ($1, $2, $3, NOW(), $4, $5, \
                     1 + (SELECT COUNT(*) FROM user_activities \
                          WHERE user_id = $2 AND activity_id = $3 AND tenant_id = $1))
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserActivity>(&query)
            .bind(tenant)
            .bind(input.user_id)
            .bind(input.activity_id)
            .bind(input.score)
            .bind(input.time_spent_secs)
            .fetch_one(scope.pool())
            .await?;
        Ok(row)
    }

    /// The completion timestamp of the user's most recent completed
    /// activity *other than* `excluding_activity_id`. Feeds the streak
    /// decision, which must not count the completion that triggered it.
    pub async fn last_completion_excluding(
        scope: &TenantScope,
        user_id: DbId,
        excluding_activity_id: DbId,
    ) -> Result<Option<Timestamp>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(None);
        };
        let ts: Option<Timestamp> = sqlx::query_scalar(
            "SELECT completed_at FROM user_activities \
             WHERE user_id = $1 AND tenant_id = $2 AND activity_id != $3 \
               AND completed_at IS NOT NULL \
             ORDER BY completed_at DESC LIMIT 1",
        )
        .bind(user_id)
        .bind(tenant)
        .bind(excluding_activity_id)
        .fetch_optional(scope.pool())
        .await?;
        Ok(ts)
    }

    /// Every completed row for a user, joined with its activity type so
    /// the caller can apply the type-dependent passing threshold.
    pub async fn completed_facts(
        scope: &TenantScope,
        user_id: DbId,
    ) -> Result<Vec<CompletionFact>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(Vec::new());
        };
        let query = format!(
            "SELECT {FACT_COLUMNS} FROM user_activities ua \
             JOIN activities a ON a.id = ua.activity_id \
             WHERE ua.user_id = $1 AND ua.tenant_id = $2 AND ua.completed_at IS NOT NULL \
             ORDER BY ua.completed_at ASC"
        );
        let facts = sqlx::query_as::<_, CompletionFact>(&query)
            .bind(user_id)
            .bind(tenant)
            .fetch_all(scope.pool())
            .await?;
        Ok(facts)
    }

    /// Completed rows for a user restricted to one course's *active*
    /// activities. Input to the progress aggregator.
    pub async fn completed_facts_for_course(
        scope: &TenantScope,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Vec<CompletionFact>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(Vec::new());
        };
        let query = format!(
            "SELECT {FACT_COLUMNS} FROM user_activities ua \
             JOIN activities a ON a.id = ua.activity_id \
             WHERE ua.user_id = $1 AND ua.tenant_id = $2 AND a.course_id = $3 \
               AND a.is_active = true AND ua.completed_at IS NOT NULL \
             ORDER BY ua.completed_at ASC"
        );
        let facts = sqlx::query_as::<_, CompletionFact>(&query)
            .bind(user_id)
            .bind(tenant)
            .bind(course_id)
            .fetch_all(scope.pool())
            .await?;
        Ok(facts)
    }

    /// Average score across a user's completions (score badge criterion).
    pub async fn average_score(
        scope: &TenantScope,
        user_id: DbId,
    ) -> Result<Option<f64>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(None);
        };
        let avg: Option<f64> = sqlx::query_scalar(
            "SELECT AVG(score)::float8 FROM user_activities \
             WHERE user_id = $1 AND tenant_id = $2 AND completed_at IS NOT NULL",
        )
        .bind(user_id)
        .bind(tenant)
        .fetch_one(scope.pool())
        .await?;
        Ok(avg)
    }
}
