//! Enrollment-triggered badges: the welcome badge on a first enrollment
//! and participation badges from the catalog.

mod common;

use sqlx::PgPool;

use skillforge_db::repositories::{EnrollmentRepo, UserBadgeRepo};
use skillforge_engine::catalog;

#[sqlx::test(migrations = "../../db/migrations")]
async fn first_enrollment_grants_the_welcome_badge(pool: PgPool) {
    let scope = common::tenant_scope(&pool, "acme").await;
    let orchestrator = common::orchestrator();
    catalog::seed_default_badges(&scope).await.unwrap();

    let instructor = common::create_user(&scope, "teacher").await;
    let student = common::create_user(&scope, "alice").await;
    let course = common::create_course(&scope, instructor, None).await;

    let outcome = orchestrator
        .process_enrollment(&scope, student, course)
        .await
        .unwrap();

    assert!(outcome.badges.iter().any(|name| name == "Welcome"));
    assert_eq!(EnrollmentRepo::count_for_user(&scope, student).await.unwrap(), 1);

    // Enrolling in a second course is no longer a first enrollment.
    let second_course = common::create_course(&scope, instructor, None).await;
    let second = orchestrator
        .process_enrollment(&scope, student, second_course)
        .await
        .unwrap();
    assert!(!second.badges.iter().any(|name| name == "Welcome"));

    // Exactly one grant row per earned badge.
    for grant in UserBadgeRepo::list_for_user(&scope, student).await.unwrap() {
        assert_eq!(
            UserBadgeRepo::grant_count(&scope, student, grant.badge_id).await.unwrap(),
            1
        );
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn enrollment_without_catalog_grants_nothing(pool: PgPool) {
    let scope = common::tenant_scope(&pool, "acme").await;
    let orchestrator = common::orchestrator();

    let instructor = common::create_user(&scope, "teacher").await;
    let student = common::create_user(&scope, "alice").await;
    let course = common::create_course(&scope, instructor, None).await;

    let outcome = orchestrator
        .process_enrollment(&scope, student, course)
        .await
        .unwrap();
    assert!(outcome.badges.is_empty());
    assert!(UserBadgeRepo::list_for_user(&scope, student).await.unwrap().is_empty());
}
