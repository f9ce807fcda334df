//! User entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use skillforge_core::types::{DbId, TenantId, Timestamp};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// `total_points`, `level`, and the streak counters are derived caches:
/// they are mutated exclusively through the ledger, level, and streak
/// services so they stay reconcilable with the `points` table and the
/// completion history.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    /// `None` marks a platform operator, never a gamification subject.
    pub tenant_id: Option<TenantId>,
    pub name: String,
    pub email: String,
    pub role: String,
    pub total_points: i64,
    pub level: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a new user under the active tenant.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub role: String,
}
