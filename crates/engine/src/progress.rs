//! Course progress aggregation and sequential unlocking.

use skillforge_core::progress::{completion_percentage, is_complete, unlock_requirement_met};
use skillforge_core::types::DbId;
use skillforge_db::models::activity::Activity;
use skillforge_db::models::enrollment::CourseEnrollment;
use skillforge_db::repositories::{ActivityRepo, EnrollmentRepo, UserActivityRepo};
use skillforge_db::TenantScope;

use crate::error::EngineError;

/// Result of a progress recomputation.
#[derive(Debug, Clone)]
pub struct ProgressOutcome {
    pub percentage: f64,
    /// `true` exactly once per enrollment: the call that performed the
    /// null -> completed transition. Repeat recomputations report `false`.
    pub just_completed: bool,
    pub enrollment: CourseEnrollment,
}

/// Whether a learner may open an activity yet.
#[derive(Debug, Clone, Copy)]
pub struct AccessDecision {
    pub can_access: bool,
    pub reason: &'static str,
}

/// Recomputes a user's completion percentage for a course.
pub struct ProgressAggregator;

impl ProgressAggregator {
    /// Recompute progress from the underlying completions.
    ///
    /// A completion qualifies when it has a completion timestamp and its
    /// score passes the activity type's threshold; re-attempt rows for the
    /// same activity count once. Returns `None` when the user is not
    /// enrolled in the course.
    ///
    /// Reaching 100% marks the enrollment completed, guarded on
    /// `completed_at IS NULL` so the completion edge fires exactly once
    /// even under replays.
    pub async fn recompute(
        scope: &TenantScope,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Option<ProgressOutcome>, EngineError> {
        let Some(enrollment) = EnrollmentRepo::find_for(scope, user_id, course_id).await? else {
            return Ok(None);
        };

        let activities = ActivityRepo::list_active_for_course(scope, course_id).await?;
        let completed = Self::qualifying_activity_ids(scope, user_id, course_id).await?;
        let percentage = completion_percentage(completed.len(), activities.len());

        EnrollmentRepo::set_progress(scope, enrollment.id, percentage).await?;

        let mut just_completed = false;
        if is_complete(percentage) && !enrollment.is_completed() {
            // The guard re-checks completed_at in SQL; a concurrent unit
            // of work marking it first makes this a no-op.
            just_completed = EnrollmentRepo::mark_completed(scope, enrollment.id).await?;
        }

        tracing::info!(
            user_id,
            course_id,
            percentage,
            completed = completed.len(),
            total = activities.len(),
            just_completed,
            "Course progress updated"
        );

        let enrollment = EnrollmentRepo::find_for(scope, user_id, course_id)
            .await?
            .ok_or(EngineError::EntityNotFound {
                entity: "enrollment",
                id: user_id,
            })?;

        Ok(Some(ProgressOutcome {
            percentage,
            just_completed,
            enrollment,
        }))
    }

    /// Sequential unlocking: the first activity is always accessible;
    /// later ones require 70% of the activities before them passed.
    pub async fn check_activity_access(
        scope: &TenantScope,
        user_id: DbId,
        activity: &Activity,
    ) -> Result<AccessDecision, EngineError> {
        let activities = ActivityRepo::list_active_for_course(scope, activity.course_id).await?;
        let Some(position) = activities.iter().position(|a| a.id == activity.id) else {
            return Ok(AccessDecision {
                can_access: false,
                reason: "activity is not part of the course",
            });
        };

        if position == 0 {
            return Ok(AccessDecision {
                can_access: true,
                reason: "first activity of the course",
            });
        }

        let completed = Self::qualifying_activity_ids(scope, user_id, activity.course_id).await?;
        if completed.contains(&activity.id) {
            return Ok(AccessDecision {
                can_access: true,
                reason: "already completed (review mode)",
            });
        }

        let prior: Vec<DbId> = activities[..position].iter().map(|a| a.id).collect();
        let passed_prior = prior.iter().filter(|id| completed.contains(id)).count();

        if unlock_requirement_met(passed_prior, prior.len()) {
            Ok(AccessDecision {
                can_access: true,
                reason: "enough prior activities passed",
            })
        } else {
            Ok(AccessDecision {
                can_access: false,
                reason: "previous activities not sufficiently completed",
            })
        }
    }

    /// Distinct activity ids with at least one qualifying completion in
    /// the course.
    async fn qualifying_activity_ids(
        scope: &TenantScope,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Vec<DbId>, EngineError> {
        let facts = UserActivityRepo::completed_facts_for_course(scope, user_id, course_id).await?;
        let mut ids: Vec<DbId> = facts
            .iter()
            .filter(|f| f.is_qualifying())
            .map(|f| f.activity_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}
