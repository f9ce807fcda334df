//! Course entity model and DTOs.

use serde::{Deserialize, Serialize};
use skillforge_core::types::{DbId, TenantId, Timestamp};
use sqlx::FromRow;

/// Course status values (CHECK constraint on `courses.status`).
pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_PUBLISHED: &str = "published";
pub const STATUS_ARCHIVED: &str = "archived";

/// Full course row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub tenant_id: TenantId,
    pub instructor_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    /// Base completion reward; `None` falls back to the engine default.
    pub points_per_completion: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new course under the active tenant.
#[derive(Debug, Deserialize)]
pub struct CreateCourse {
    pub instructor_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub points_per_completion: Option<i32>,
}
