//! Repository for the `activities` table.

use skillforge_core::types::DbId;

use crate::models::activity::{Activity, CreateActivity};
use crate::scope::TenantScope;
use crate::StoreError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tenant_id, course_id, title, description, activity_type, \
                       points_value, duration_minutes, sort_order, is_required, \
                       is_active, created_at, updated_at";

/// Provides CRUD operations for activities.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Create an activity under the active tenant.
    pub async fn create(
        scope: &TenantScope,
        input: &CreateActivity,
    ) -> Result<Activity, StoreError> {
        let tenant = scope.require_tenant()?;
        let query = format!(
            "INSERT INTO activities \
                 (tenant_id, course_id, title, description, activity_type, \
                  points_value, duration_minutes, sort_order, is_required)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, true))
             RETURNING {COLUMNS}"
        );
        let activity = sqlx::query_as::<_, Activity>(&query)
            .bind(tenant)
            .bind(input.course_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.activity_type)
            .bind(input.points_value)
            .bind(input.duration_minutes)
            .bind(input.sort_order)
            .bind(input.is_required)
            .fetch_one(scope.pool())
            .await?;
        Ok(activity)
    }

    /// Find an activity by id within the active tenant.
    pub async fn find(scope: &TenantScope, id: DbId) -> Result<Option<Activity>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(None);
        };
        let query = format!("SELECT {COLUMNS} FROM activities WHERE id = $1 AND tenant_id = $2");
        let activity = sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .bind(tenant)
            .fetch_optional(scope.pool())
            .await?;
        Ok(activity)
    }

    /// List a course's active activities in unlock order.
    pub async fn list_active_for_course(
        scope: &TenantScope,
        course_id: DbId,
    ) -> Result<Vec<Activity>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(Vec::new());
        };
        let query = format!(
            "SELECT {COLUMNS} FROM activities \
             WHERE course_id = $1 AND tenant_id = $2 AND is_active = true \
             ORDER BY sort_order ASC"
        );
        let activities = sqlx::query_as::<_, Activity>(&query)
            .bind(course_id)
            .bind(tenant)
            .fetch_all(scope.pool())
            .await?;
        Ok(activities)
    }

    /// Deactivate an activity (it stops counting toward progress).
    pub async fn deactivate(scope: &TenantScope, id: DbId) -> Result<bool, StoreError> {
        let tenant = scope.require_tenant()?;
        let result = sqlx::query(
            "UPDATE activities SET is_active = false, updated_at = NOW() \
             WHERE id = $1 AND tenant_id = $2 AND is_active = true",
        )
        .bind(id)
        .bind(tenant)
        .execute(scope.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
