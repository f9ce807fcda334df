//! Level recalculation on top of the pure curve in
//! `skillforge_core::level`.

use skillforge_core::level;
use skillforge_core::types::DbId;
use skillforge_db::repositories::UserRepo;
use skillforge_db::TenantScope;

use crate::error::EngineError;

/// A level-up that actually happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelOutcome {
    pub old_level: i32,
    pub new_level: i32,
}

/// Compares the computed level against the stored one and persists
/// forward movement.
pub struct LevelService;

impl LevelService {
    /// Recompute the user's level from their current point total.
    ///
    /// Returns `Some` only when the computed level is strictly greater
    /// than the stored one — that is the level-up event. The stored level
    /// never decreases through this path (points are never revoked here),
    /// and the UPDATE itself guards with `level < new` so a concurrent
    /// pipeline cannot demote.
    pub async fn check_level_up(
        scope: &TenantScope,
        user_id: DbId,
    ) -> Result<Option<LevelOutcome>, EngineError> {
        let user = UserRepo::find(scope, user_id)
            .await?
            .ok_or(EngineError::EntityNotFound {
                entity: "user",
                id: user_id,
            })?;

        let computed = level::level_for_points(user.total_points);
        if computed <= user.level {
            return Ok(None);
        }

        let raised = UserRepo::raise_level(scope, user_id, computed).await?;
        if !raised {
            // Another unit of work got there first; not a level-up here.
            return Ok(None);
        }

        tracing::info!(
            user_id,
            old_level = user.level,
            new_level = computed,
            total_points = user.total_points,
            "User leveled up"
        );
        Ok(Some(LevelOutcome {
            old_level: user.level,
            new_level: computed,
        }))
    }
}
