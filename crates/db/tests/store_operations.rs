//! Repository-level behavior the engine depends on: ledger sums, grant
//! idempotency, the enrollment completion edge, and job queue
//! transitions.

use sqlx::PgPool;

use skillforge_db::models::badge::CreateBadge;
use skillforge_db::models::course::CreateCourse;
use skillforge_db::models::job::{JOB_COMPLETED, JOB_PENDING};
use skillforge_db::models::point::{CreatePoint, ENTRY_BONUS, ENTRY_EARNED, SOURCE_ACTIVITY};
use skillforge_db::models::tenant::CreateTenant;
use skillforge_db::models::user::CreateUser;
use skillforge_db::repositories::{
    BadgeRepo, CourseRepo, EnrollmentRepo, JobRepo, PointRepo, TenantRepo, UserBadgeRepo, UserRepo,
};
use skillforge_db::TenantScope;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn scoped(pool: &PgPool) -> TenantScope {
    TenantRepo::create(
        pool,
        &CreateTenant {
            id: "acme".to_string(),
            name: "Acme".to_string(),
            slug: "acme".to_string(),
            plan: None,
            max_users: Some(100),
            max_courses: Some(100),
            max_storage_mb: None,
            trial_ends_at: None,
        },
    )
    .await
    .expect("tenant should be created");
    TenantScope::for_tenant(pool.clone(), "acme")
}

async fn create_user(scope: &TenantScope, name: &str) -> i64 {
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

fn earned(user_id: i64, amount: i64, source_id: i64) -> CreatePoint {
    CreatePoint {
        user_id,
        amount,
        entry_type: ENTRY_EARNED.to_string(),
        source_kind: SOURCE_ACTIVITY.to_string(),
        source_id,
        description: None,
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn ledger_sum_tracks_cached_total(pool: PgPool) {
    let scope = scoped(&pool).await;
    let user = create_user(&scope, "alice").await;

    for (amount, source) in [(18, 1), (10, 2), (-5, 3)] {
        PointRepo::insert(&scope, &earned(user, amount, source)).await.unwrap();
        UserRepo::add_points(&scope, user, amount).await.unwrap();
    }

    let ledger_sum = PointRepo::total_for_user(&scope, user).await.unwrap();
    let cached = UserRepo::find(&scope, user).await.unwrap().unwrap().total_points;
    assert_eq!(ledger_sum, 23);
    assert_eq!(cached, ledger_sum);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn source_existence_backs_idempotent_awards(pool: PgPool) {
    let scope = scoped(&pool).await;
    let user = create_user(&scope, "alice").await;

    PointRepo::insert(&scope, &earned(user, 18, 42)).await.unwrap();

    assert!(PointRepo::exists_for_source(&scope, user, SOURCE_ACTIVITY, 42, ENTRY_EARNED)
        .await
        .unwrap());
    // A different entry type for the same source is a distinct award.
    assert!(!PointRepo::exists_for_source(&scope, user, SOURCE_ACTIVITY, 42, ENTRY_BONUS)
        .await
        .unwrap());
    assert!(!PointRepo::exists_for_source(&scope, user, SOURCE_ACTIVITY, 43, ENTRY_EARNED)
        .await
        .unwrap());
}

// ---------------------------------------------------------------------------
// Badge grants
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_repeatable_grant_is_unique(pool: PgPool) {
    let scope = scoped(&pool).await;
    let user = create_user(&scope, "alice").await;
    let badge = BadgeRepo::create(
        &scope,
        &CreateBadge {
            name: "First Step".to_string(),
            description: None,
            icon: None,
            color: None,
            badge_type: "activity_completion".to_string(),
            criteria: serde_json::json!({ "activities_completed": 1 }),
            points_value: Some(10),
            is_repeatable: None,
        },
    )
    .await
    .unwrap();

    let first = UserBadgeRepo::grant(&scope, user, badge.id, false, None).await.unwrap();
    let second = UserBadgeRepo::grant(&scope, user, badge.id, false, None).await.unwrap();

    assert!(first, "first grant is new");
    assert!(!second, "replayed grant is a no-op");
    assert_eq!(UserBadgeRepo::grant_count(&scope, user, badge.id).await.unwrap(), 1);
    assert!(UserBadgeRepo::has_badge(&scope, user, badge.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Enrollment completion edge
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn completion_edge_fires_exactly_once(pool: PgPool) {
    let scope = scoped(&pool).await;
    let instructor = create_user(&scope, "teacher").await;
    let student = create_user(&scope, "alice").await;
    let course = CourseRepo::create(
        &scope,
        &CreateCourse {
            instructor_id: instructor,
            title: "Rust 101".to_string(),
            description: None,
            points_per_completion: None,
        },
    )
    .await
    .unwrap();

    let enrollment = EnrollmentRepo::enroll(&scope, student, course.id).await.unwrap();
    assert!(enrollment.completed_at.is_none());

    assert!(EnrollmentRepo::mark_completed(&scope, enrollment.id).await.unwrap());
    // Repeat calls must not re-fire or clear the timestamp.
    assert!(!EnrollmentRepo::mark_completed(&scope, enrollment.id).await.unwrap());

    let after = EnrollmentRepo::find_for(&scope, student, course.id)
        .await
        .unwrap()
        .unwrap();
    assert!(after.completed_at.is_some());
    assert_eq!(after.progress_percentage, 100.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn enroll_is_idempotent(pool: PgPool) {
    let scope = scoped(&pool).await;
    let instructor = create_user(&scope, "teacher").await;
    let student = create_user(&scope, "alice").await;
    let course = CourseRepo::create(
        &scope,
        &CreateCourse {
            instructor_id: instructor,
            title: "Rust 101".to_string(),
            description: None,
            points_per_completion: None,
        },
    )
    .await
    .unwrap();

    let first = EnrollmentRepo::enroll(&scope, student, course.id).await.unwrap();
    let second = EnrollmentRepo::enroll(&scope, student, course.id).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(EnrollmentRepo::count_for_user(&scope, student).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Job queue
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_complete_cycle(pool: PgPool) {
    let payload = serde_json::json!({ "user_id": 1 });
    let job = JobRepo::enqueue(&pool, "gamification.activity_completed", &payload, 0)
        .await
        .unwrap();
    assert_eq!(job.status, JOB_PENDING);
    assert_eq!(job.attempts, 0);

    let claimed = JobRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(claimed.id, job.id);
    assert_eq!(claimed.attempts, 1);

    // Nothing else is claimable while the job is running.
    assert!(JobRepo::claim_next(&pool).await.unwrap().is_none());

    JobRepo::complete(&pool, job.id).await.unwrap();
    let done = JobRepo::find(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(done.status, JOB_COMPLETED);
    assert!(done.completed_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn retry_backoff_delays_reclaim(pool: PgPool) {
    let payload = serde_json::json!({});
    let job = JobRepo::enqueue(&pool, "gamification.activity_completed", &payload, 0)
        .await
        .unwrap();

    let claimed = JobRepo::claim_next(&pool).await.unwrap().unwrap();
    JobRepo::fail_retry(&pool, claimed.id, "lock timeout", 60).await.unwrap();

    let rescheduled = JobRepo::find(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(rescheduled.status, JOB_PENDING);
    assert_eq!(rescheduled.last_error.as_deref(), Some("lock timeout"));

    // run_after is in the future, so the job is not yet claimable.
    assert!(JobRepo::claim_next(&pool).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn priority_orders_claims(pool: PgPool) {
    let payload = serde_json::json!({});
    let low = JobRepo::enqueue(&pool, "gamification.activity_completed", &payload, 0)
        .await
        .unwrap();
    let high = JobRepo::enqueue(&pool, "gamification.activity_completed", &payload, 10)
        .await
        .unwrap();

    let first = JobRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(first.id, high.id);
    JobRepo::complete(&pool, first.id).await.unwrap();

    let second = JobRepo::claim_next(&pool).await.unwrap().unwrap();
    assert_eq!(second.id, low.id);
}
