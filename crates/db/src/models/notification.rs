//! In-app notification models.

use serde::{Deserialize, Serialize};
use skillforge_core::types::{DbId, TenantId, Timestamp};
use sqlx::FromRow;

/// Notification kinds produced by the gamification pipeline.
pub const KIND_ACTIVITY_COMPLETED: &str = "activity_completed";
pub const KIND_BADGE_EARNED: &str = "badge_earned";
pub const KIND_LEVEL_UP: &str = "level_up";
pub const KIND_COURSE_COMPLETED: &str = "course_completed";
pub const KIND_STREAK_MILESTONE: &str = "streak_milestone";

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub tenant_id: TenantId,
    pub user_id: DbId,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub payload: serde_json::Value,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating an in-app notification.
#[derive(Debug, Deserialize)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub payload: serde_json::Value,
}
