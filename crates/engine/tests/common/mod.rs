//! Shared fixtures for the engine integration tests.
//!
//! Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use sqlx::PgPool;

use skillforge_core::types::DbId;
use skillforge_db::models::activity::CreateActivity;
use skillforge_db::models::course::CreateCourse;
use skillforge_db::models::tenant::CreateTenant;
use skillforge_db::models::user::CreateUser;
use skillforge_db::models::user_activity::RecordCompletion;
use skillforge_db::repositories::{
    ActivityRepo, CourseRepo, TenantRepo, UserActivityRepo, UserRepo,
};
use skillforge_db::TenantScope;
use skillforge_engine::Orchestrator;
use skillforge_events::{EventBus, InAppDispatcher};

/// Provision a tenant and return a scope bound to it.
pub async fn tenant_scope(pool: &PgPool, id: &str) -> TenantScope {
    TenantRepo::create(
        pool,
        &CreateTenant {
            id: id.to_string(),
            name: format!("{id} org"),
            slug: id.to_string(),
            plan: None,
            max_users: Some(100),
            max_courses: Some(100),
            max_storage_mb: None,
            trial_ends_at: None,
        },
    )
    .await
    .expect("tenant should be created");
    TenantScope::for_tenant(pool.clone(), id)
}

/// An orchestrator wired to the in-app dispatcher.
pub fn orchestrator() -> Orchestrator {
    let bus = Arc::new(EventBus::default());
    Orchestrator::new(Arc::new(InAppDispatcher::new(bus)))
}

pub async fn create_user(scope: &TenantScope, name: &str) -> DbId {
    UserRepo::create(
        scope,
        &CreateUser {
            name: name.to_string(),
            email: format!("{name}@example.com"),
            role: "student".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn create_course(
    scope: &TenantScope,
    instructor_id: DbId,
    points_per_completion: Option<i32>,
) -> DbId {
    CourseRepo::create(
        scope,
        &CreateCourse {
            instructor_id,
            title: "Rust 101".to_string(),
            description: None,
            points_per_completion,
        },
    )
    .await
    .unwrap()
    .id
}

/// A quiz activity with the given base points and expected duration.
pub async fn create_quiz(
    scope: &TenantScope,
    course_id: DbId,
    title: &str,
    points_value: i32,
    duration_minutes: Option<i32>,
    sort_order: i32,
) -> DbId {
    ActivityRepo::create(
        scope,
        &CreateActivity {
            course_id,
            title: title.to_string(),
            description: None,
            activity_type: "quiz".to_string(),
            points_value: Some(points_value),
            duration_minutes,
            sort_order,
            is_required: None,
        },
    )
    .await
    .unwrap()
    .id
}

/// Record a graded completion row, as the web layer does before
/// enqueueing the signal.
pub async fn record_completion(
    scope: &TenantScope,
    user_id: DbId,
    activity_id: DbId,
    score: i32,
    time_spent_secs: Option<i64>,
) -> DbId {
    UserActivityRepo::record_completion(
        scope,
        &RecordCompletion {
            user_id,
            activity_id,
            score,
            time_spent_secs,
        },
    )
    .await
    .unwrap()
    .id
}

/// Shift a completion row back by whole days, to simulate history.
pub async fn backdate_completion(pool: &PgPool, row_id: DbId, days: i32) {
    sqlx::query(
        "UPDATE user_activities \
         SET completed_at = completed_at - make_interval(days => $2) \
         WHERE id = $1",
    )
    .bind(row_id)
    .bind(days)
    .execute(pool)
    .await
    .unwrap();
}

/// Shift an enrollment's start back by whole days.
pub async fn backdate_enrollment(pool: &PgPool, enrollment_id: DbId, days: i32) {
    sqlx::query(
        "UPDATE course_enrollments \
         SET enrolled_at = enrolled_at - make_interval(days => $2) \
         WHERE id = $1",
    )
    .bind(enrollment_id)
    .bind(days)
    .execute(pool)
    .await
    .unwrap();
}
