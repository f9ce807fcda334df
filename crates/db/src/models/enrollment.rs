//! Course enrollment model.

use serde::Serialize;
use skillforge_core::types::{DbId, TenantId, Timestamp};
use sqlx::FromRow;

/// A (user, course) enrollment from the `course_enrollments` table.
///
/// `completed_at` is set exactly once by the progress aggregator and never
/// cleared afterwards.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseEnrollment {
    pub id: DbId,
    pub tenant_id: TenantId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub enrolled_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub progress_percentage: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CourseEnrollment {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}
