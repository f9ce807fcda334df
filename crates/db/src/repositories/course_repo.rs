//! Repository for the `courses` table.

use skillforge_core::types::DbId;

use crate::models::course::{Course, CreateCourse, STATUS_PUBLISHED};
use crate::scope::TenantScope;
use crate::StoreError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tenant_id, instructor_id, title, description, status, \
                       points_per_completion, created_at, updated_at";

/// Provides CRUD operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Create a draft course under the active tenant.
    pub async fn create(scope: &TenantScope, input: &CreateCourse) -> Result<Course, StoreError> {
        let tenant = scope.require_tenant()?;
        let query = format!(
            "INSERT INTO courses (tenant_id, instructor_id, title, description, points_per_completion)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let course = sqlx::query_as::<_, Course>(&query)
            .bind(tenant)
            .bind(input.instructor_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.points_per_completion)
            .fetch_one(scope.pool())
            .await?;
        Ok(course)
    }

    /// Find a course by id within the active tenant.
    pub async fn find(scope: &TenantScope, id: DbId) -> Result<Option<Course>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(None);
        };
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1 AND tenant_id = $2");
        let course = sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(tenant)
            .fetch_optional(scope.pool())
            .await?;
        Ok(course)
    }

    /// List the active tenant's published courses.
    pub async fn list_published(scope: &TenantScope) -> Result<Vec<Course>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(Vec::new());
        };
        let query = format!(
            "SELECT {COLUMNS} FROM courses \
             WHERE tenant_id = $1 AND status = $2 \
             ORDER BY created_at DESC"
        );
        let courses = sqlx::query_as::<_, Course>(&query)
            .bind(tenant)
            .bind(STATUS_PUBLISHED)
            .fetch_all(scope.pool())
            .await?;
        Ok(courses)
    }

    /// Count the active tenant's courses (quota checks).
    pub async fn count(scope: &TenantScope) -> Result<i64, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(0);
        };
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE tenant_id = $1")
            .bind(tenant)
            .fetch_one(scope.pool())
            .await?;
        Ok(count)
    }

    /// Move a course to a new status. Returns `true` if the row changed.
    pub async fn set_status(
        scope: &TenantScope,
        id: DbId,
        status: &str,
    ) -> Result<bool, StoreError> {
        let tenant = scope.require_tenant()?;
        let result = sqlx::query(
            "UPDATE courses SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant)
        .bind(status)
        .execute(scope.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
