//! Badge evaluation against the tenant's catalog.
//!
//! Each evaluator loads the relevant slice of the catalog, checks every
//! badge's criteria against a [`LearnerSnapshot`], and grants the newly
//! satisfied ones. Evaluation is side-effect-isolated per badge: one
//! badge's grant failure is logged and must not prevent evaluation of the
//! others.

use serde_json::json;
use skillforge_core::badge::{
    criteria_met, LearnerSnapshot, TriggerContext, ACTIVITY_TRIGGERED_TYPES, BADGE_LEVEL,
    BADGE_PARTICIPATION, BADGE_STREAK, COURSE_TRIGGERED_TYPES,
};
use skillforge_core::types::DbId;
use skillforge_db::models::activity::Activity;
use skillforge_db::models::badge::Badge;
use skillforge_db::models::course::Course;
use skillforge_db::models::point::{CreatePoint, ENTRY_BONUS, SOURCE_BADGE};
use skillforge_db::models::user::User;
use skillforge_db::repositories::{BadgeRepo, EnrollmentRepo, UserActivityRepo, UserBadgeRepo};
use skillforge_db::TenantScope;

use crate::error::EngineError;
use crate::ledger::PointsLedger;

/// Name of the special badge granted on first enrollment.
pub const WELCOME_BADGE_NAME: &str = "Welcome";

/// Stateless badge rules evaluator.
pub struct BadgeEvaluator;

impl BadgeEvaluator {
    /// Badges triggered by an activity completion.
    pub async fn evaluate_activity_badges(
        scope: &TenantScope,
        user: &User,
        activity: &Activity,
        score: i32,
    ) -> Result<Vec<Badge>, EngineError> {
        let badges = BadgeRepo::list_active_by_types(scope, ACTIVITY_TRIGGERED_TYPES).await?;
        let snapshot = Self::snapshot(scope, user).await?;
        let trigger = TriggerContext { score: Some(score) };
        let metadata = json!({
            "activity_id": activity.id,
            "score": score,
            "awarded_for": "activity_completion",
        });
        Self::grant_qualifying(scope, user, &badges, &snapshot, trigger, &metadata).await
    }

    /// Badges triggered by a course completion.
    pub async fn evaluate_course_completion_badges(
        scope: &TenantScope,
        user: &User,
        course: &Course,
    ) -> Result<Vec<Badge>, EngineError> {
        let badges = BadgeRepo::list_active_by_types(scope, COURSE_TRIGGERED_TYPES).await?;
        let snapshot = Self::snapshot(scope, user).await?;
        let metadata = json!({
            "course_id": course.id,
            "awarded_for": "course_completion",
        });
        Self::grant_qualifying(
            scope,
            user,
            &badges,
            &snapshot,
            TriggerContext::default(),
            &metadata,
        )
        .await
    }

    /// Participation badges triggered by enrolling in a course.
    pub async fn evaluate_enrollment_badges(
        scope: &TenantScope,
        user: &User,
        course: &Course,
    ) -> Result<Vec<Badge>, EngineError> {
        let badges = BadgeRepo::list_active_by_types(scope, &[BADGE_PARTICIPATION]).await?;
        let snapshot = Self::snapshot(scope, user).await?;
        let metadata = json!({
            "course_id": course.id,
            "awarded_for": "course_enrollment",
        });
        Self::grant_qualifying(
            scope,
            user,
            &badges,
            &snapshot,
            TriggerContext::default(),
            &metadata,
        )
        .await
    }

    /// The level badge satisfied by reaching `new_level`, if any.
    pub async fn check_level_up_badge(
        scope: &TenantScope,
        user: &User,
        new_level: i32,
    ) -> Result<Option<Badge>, EngineError> {
        let badges = BadgeRepo::list_active_by_types(scope, &[BADGE_LEVEL]).await?;
        let mut snapshot = Self::snapshot(scope, user).await?;
        snapshot.level = new_level;
        let granted = Self::grant_qualifying(
            scope,
            user,
            &badges,
            &snapshot,
            TriggerContext::default(),
            &json!({ "level": new_level, "awarded_for": "level_achievement" }),
        )
        .await?;
        Ok(granted.into_iter().next())
    }

    /// Streak badges satisfied by a streak of `streak_days`.
    pub async fn check_streak_badges(
        scope: &TenantScope,
        user: &User,
        streak_days: i32,
    ) -> Result<Vec<Badge>, EngineError> {
        let badges = BadgeRepo::list_active_by_types(scope, &[BADGE_STREAK]).await?;
        let mut snapshot = Self::snapshot(scope, user).await?;
        snapshot.current_streak = streak_days;
        Self::grant_qualifying(
            scope,
            user,
            &badges,
            &snapshot,
            TriggerContext::default(),
            &json!({ "streak_days": streak_days, "awarded_for": "streak_achievement" }),
        )
        .await
    }

    /// Grant the welcome badge on a user's first enrollment, if the tenant
    /// has one in its catalog.
    pub async fn award_welcome_badge(
        scope: &TenantScope,
        user: &User,
    ) -> Result<Option<Badge>, EngineError> {
        let Some(badge) = BadgeRepo::find_special_by_name(scope, WELCOME_BADGE_NAME).await? else {
            return Ok(None);
        };
        let newly = Self::try_grant(
            scope,
            user,
            &badge,
            &json!({ "awarded_for": "first_enrollment" }),
        )
        .await?;
        Ok(newly.then_some(badge))
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Aggregates consulted by badge criteria.
    ///
    /// `activities_completed` counts distinct qualifying activities, not
    /// attempt rows, so re-attempts and replayed jobs cannot inflate it.
    async fn snapshot(scope: &TenantScope, user: &User) -> Result<LearnerSnapshot, EngineError> {
        let facts = UserActivityRepo::completed_facts(scope, user.id).await?;
        let mut qualifying: Vec<DbId> = facts
            .iter()
            .filter(|f| f.is_qualifying())
            .map(|f| f.activity_id)
            .collect();
        qualifying.sort_unstable();
        qualifying.dedup();

        Ok(LearnerSnapshot {
            total_points: user.total_points,
            level: user.level,
            current_streak: user.current_streak,
            activities_completed: qualifying.len() as i64,
            average_score: UserActivityRepo::average_score(scope, user.id).await?,
            courses_completed: EnrollmentRepo::count_completed_for_user(scope, user.id).await?,
            enrollments_count: EnrollmentRepo::count_for_user(scope, user.id).await?,
        })
    }

    /// Check each badge and grant the newly satisfied ones, isolating
    /// failures per badge.
    async fn grant_qualifying(
        scope: &TenantScope,
        user: &User,
        badges: &[Badge],
        snapshot: &LearnerSnapshot,
        trigger: TriggerContext,
        metadata: &serde_json::Value,
    ) -> Result<Vec<Badge>, EngineError> {
        let mut granted = Vec::new();
        for badge in badges {
            if !criteria_met(&badge.badge_type, &badge.parsed_criteria(), snapshot, trigger) {
                continue;
            }
            match Self::try_grant(scope, user, badge, metadata).await {
                Ok(true) => granted.push(badge.clone()),
                Ok(false) => {} // already held
                Err(e) => {
                    // One badge's failure must not stop the others.
                    tracing::error!(
                        user_id = user.id,
                        badge_id = badge.id,
                        badge_name = %badge.name,
                        error = %e,
                        "Failed to grant badge"
                    );
                }
            }
        }
        Ok(granted)
    }

    /// Grant one badge and its bonus points. Returns `true` when the
    /// grant was new (replays of an already-held badge report `false`).
    async fn try_grant(
        scope: &TenantScope,
        user: &User,
        badge: &Badge,
        metadata: &serde_json::Value,
    ) -> Result<bool, EngineError> {
        let newly = UserBadgeRepo::grant(
            scope,
            user.id,
            badge.id,
            badge.is_repeatable,
            Some(metadata),
        )
        .await?;
        if !newly {
            return Ok(false);
        }

        tracing::info!(
            user_id = user.id,
            badge_id = badge.id,
            badge_name = %badge.name,
            "Badge awarded"
        );

        // Bonus points ride on the badge itself as the audit source, so a
        // replay after a partial failure cannot double-pay them.
        if badge.points_value > 0 {
            PointsLedger::award_once(
                scope,
                &CreatePoint {
                    user_id: user.id,
                    amount: i64::from(badge.points_value),
                    entry_type: ENTRY_BONUS.to_string(),
                    source_kind: SOURCE_BADGE.to_string(),
                    source_id: badge.id,
                    description: Some(format!("Earned badge: {}", badge.name)),
                },
            )
            .await?;
        }
        Ok(true)
    }
}
