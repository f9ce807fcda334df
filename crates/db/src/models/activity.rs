//! Activity entity model and DTOs.

use serde::{Deserialize, Serialize};
use skillforge_core::types::{DbId, TenantId, Timestamp};
use sqlx::FromRow;

/// Full activity row from the `activities` table.
///
/// `sort_order` defines sequential unlocking within the course.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Activity {
    pub id: DbId,
    pub tenant_id: TenantId,
    pub course_id: DbId,
    pub title: String,
    pub description: Option<String>,
    /// `quiz`, `lesson`, `reading`, ... — see `skillforge_core::scoring`.
    pub activity_type: String,
    /// Base point value; `None` falls back to the engine default.
    pub points_value: Option<i32>,
    /// Expected duration; feeds the time-efficiency multiplier.
    pub duration_minutes: Option<i32>,
    pub sort_order: i32,
    pub is_required: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new activity under the active tenant.
#[derive(Debug, Deserialize)]
pub struct CreateActivity {
    pub course_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub activity_type: String,
    pub points_value: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub sort_order: i32,
    pub is_required: Option<bool>,
}
