//! Activity completion records.

use serde::{Deserialize, Serialize};
use skillforge_core::types::{DbId, TenantId, Timestamp};
use sqlx::FromRow;

/// A (user, activity) attempt row from the `user_activities` table.
///
/// Re-attempts create new rows; progression logic reads the latest
/// qualifying completion per (user, activity).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserActivity {
    pub id: DbId,
    pub tenant_id: TenantId,
    pub user_id: DbId,
    pub activity_id: DbId,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    /// Percentage for quizzes, 0/1 pass flag for other activity types.
    pub score: Option<i32>,
    pub time_spent_secs: Option<i64>,
    pub attempts: i32,
    pub created_at: Timestamp,
}

/// DTO for recording a graded completion.
#[derive(Debug, Deserialize)]
pub struct RecordCompletion {
    pub user_id: DbId,
    pub activity_id: DbId,
    pub score: i32,
    pub time_spent_secs: Option<i64>,
}

/// A completed row joined with its activity's type, as consumed by the
/// progress aggregator and streak tracker. Qualification (the
/// type-dependent passing threshold) is decided in `skillforge_core`, not
/// in SQL, so the rule lives in exactly one place.
#[derive(Debug, Clone, FromRow)]
pub struct CompletionFact {
    pub activity_id: DbId,
    pub activity_type: String,
    pub score: Option<i32>,
    pub completed_at: Timestamp,
}

impl CompletionFact {
    /// Whether this completion passes its activity type's threshold.
    pub fn is_qualifying(&self) -> bool {
        self.score
            .is_some_and(|s| skillforge_core::scoring::is_passing(&self.activity_type, s))
    }
}
