//! Repository for the `course_enrollments` table.

use skillforge_core::types::DbId;

use crate::models::enrollment::CourseEnrollment;
use crate::scope::TenantScope;
use crate::StoreError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tenant_id, user_id, course_id, enrolled_at, completed_at, \
                       progress_percentage, created_at, updated_at";

/// Provides CRUD operations for course enrollments.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Enroll a user in a course. Idempotent: re-enrolling returns the
    /// existing row unchanged.
    pub async fn enroll(
        scope: &TenantScope,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<CourseEnrollment, StoreError> {
        let tenant = scope.require_tenant()?;
        let query = format!(
            "INSERT INTO course_enrollments (tenant_id, user_id, course_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, course_id) DO UPDATE SET updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        let enrollment = sqlx::query_as::<_, CourseEnrollment>(&query)
            .bind(tenant)
            .bind(user_id)
            .bind(course_id)
            .fetch_one(scope.pool())
            .await?;
        Ok(enrollment)
    }

    /// Find the enrollment of a user in a course.
    pub async fn find_for(
        scope: &TenantScope,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Option<CourseEnrollment>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(None);
        };
        let query = format!(
            "SELECT {COLUMNS} FROM course_enrollments \
             WHERE user_id = $1 AND course_id = $2 AND tenant_id = $3"
        );
        let enrollment = sqlx::query_as::<_, CourseEnrollment>(&query)
            .bind(user_id)
            .bind(course_id)
            .bind(tenant)
            .fetch_optional(scope.pool())
            .await?;
        Ok(enrollment)
    }

    /// Store a freshly computed progress percentage.
    pub async fn set_progress(
        scope: &TenantScope,
        id: DbId,
        percentage: f64,
    ) -> Result<(), StoreError> {
        let tenant = scope.require_tenant()?;
        sqlx::query(
            "UPDATE course_enrollments SET progress_percentage = $3, updated_at = NOW() \
             WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant)
        .bind(percentage)
        .execute(scope.pool())
        .await?;
        Ok(())
    }

    /// Mark an enrollment completed, guarding on `completed_at IS NULL`.
    ///
    /// Returns `true` only when this call performed the transition — the
    /// `just_completed` edge the course sub-pipeline keys on. Repeat calls
    /// return `false` and never clear the timestamp.
    pub async fn mark_completed(scope: &TenantScope, id: DbId) -> Result<bool, StoreError> {
        let tenant = scope.require_tenant()?;
        let result = sqlx::query(
            "UPDATE course_enrollments \
             SET completed_at = NOW(), progress_percentage = 100, updated_at = NOW() \
             WHERE id = $1 AND tenant_id = $2 AND completed_at IS NULL",
        )
        .bind(id)
        .bind(tenant)
        .execute(scope.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a user's enrollments (participation badge criterion).
    pub async fn count_for_user(scope: &TenantScope, user_id: DbId) -> Result<i64, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(0);
        };
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM course_enrollments WHERE user_id = $1 AND tenant_id = $2",
        )
        .bind(user_id)
        .bind(tenant)
        .fetch_one(scope.pool())
        .await?;
        Ok(count)
    }

    /// Count a user's completed courses (course badge criterion).
    pub async fn count_completed_for_user(
        scope: &TenantScope,
        user_id: DbId,
    ) -> Result<i64, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(0);
        };
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM course_enrollments \
             WHERE user_id = $1 AND tenant_id = $2 AND completed_at IS NOT NULL",
        )
        .bind(user_id)
        .bind(tenant)
        .fetch_one(scope.pool())
        .await?;
        Ok(count)
    }
}
