//! Streak tracking on top of the pure arithmetic in
//! `skillforge_core::streak`.

use chrono::Utc;
use skillforge_core::streak::{self, StreakState};
use skillforge_core::types::DbId;
use skillforge_db::repositories::{UserActivityRepo, UserRepo};
use skillforge_db::TenantScope;

use crate::error::EngineError;

/// Streak milestones worth a notification.
pub const STREAK_MILESTONES: &[i32] = &[3, 7, 14, 30, 60, 100];

/// Updates a user's daily-activity streak.
pub struct StreakTracker;

impl StreakTracker {
    /// Advance the streak for a completion of `triggering_activity_id`
    /// happening now.
    ///
    /// The triggering activity is excluded from the history lookup so a
    /// completion never extends the streak with itself; only the most
    /// recent *other* completion date matters. Persists the counters and
    /// `last_activity_date`.
    pub async fn update_streak(
        scope: &TenantScope,
        user_id: DbId,
        triggering_activity_id: DbId,
    ) -> Result<StreakState, EngineError> {
        let user = UserRepo::find(scope, user_id)
            .await?
            .ok_or(EngineError::EntityNotFound {
                entity: "user",
                id: user_id,
            })?;

        let last_other =
            UserActivityRepo::last_completion_excluding(scope, user_id, triggering_activity_id)
                .await?
                .map(|ts| ts.date_naive());

        let today = Utc::now().date_naive();
        let state = streak::advance(
            StreakState::new(user.current_streak, user.longest_streak),
            last_other,
            today,
        );

        UserRepo::update_streak(scope, user_id, state.current, state.longest, today).await?;

        tracing::info!(
            user_id,
            current_streak = state.current,
            longest_streak = state.longest,
            "Streak updated"
        );
        Ok(state)
    }

    /// Whether a streak length is a milestone worth notifying about.
    pub fn is_milestone(streak_days: i32) -> bool {
        STREAK_MILESTONES.contains(&streak_days)
    }
}
