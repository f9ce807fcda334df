//! End-to-end pipeline scenarios: scoring, thresholds, idempotent
//! replays, course completion, streaks, levels, and badges.

mod common;

use assert_matches::assert_matches;
use sqlx::PgPool;

use skillforge_db::models::job::JOB_TYPE_ACTIVITY_COMPLETED;
use skillforge_db::models::notification::KIND_LEVEL_UP;
use skillforge_db::models::point::{ENTRY_EARNED, SOURCE_ACTIVITY, SOURCE_COURSE};
use skillforge_db::repositories::{
    ActivityRepo, EnrollmentRepo, NotificationRepo, PointRepo, UserBadgeRepo, UserRepo,
};
use skillforge_engine::progress::ProgressAggregator;
use skillforge_engine::{ActivityCompletionSignal, EngineError};

fn signal(user_id: i64, activity_id: i64, score: i32, time: Option<i64>) -> ActivityCompletionSignal {
    ActivityCompletionSignal {
        user_id,
        activity_id,
        score,
        time_spent_secs: time,
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn excellent_fast_completion_awards_multiplied_points(pool: PgPool) {
    let scope = common::tenant_scope(&pool, "acme").await;
    let orchestrator = common::orchestrator();

    let instructor = common::create_user(&scope, "teacher").await;
    let student = common::create_user(&scope, "alice").await;
    let course = common::create_course(&scope, instructor, None).await;
    let quiz = common::create_quiz(&scope, course, "Ownership quiz", 10, Some(10), 1).await;

    common::record_completion(&scope, student, quiz, 96, Some(400)).await;
    let outcome = orchestrator
        .process_activity_completion(&pool, &signal(student, quiz, 96, Some(400)))
        .await
        .unwrap();

    // 10 * 1.5 (score >= 95) * 1.2 (efficiency 400/600 <= 0.8) = 18
    assert_eq!(outcome.points_awarded, Some(18));

    let entries = PointRepo::list_for_user(&scope, student, 10).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, 18);
    assert_eq!(entries[0].entry_type, ENTRY_EARNED);
    assert_eq!(entries[0].source_kind, SOURCE_ACTIVITY);
    assert_eq!(entries[0].source_id, quiz);

    let user = UserRepo::find(&scope, student).await.unwrap().unwrap();
    assert_eq!(user.total_points, 18);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failing_score_earns_nothing(pool: PgPool) {
    let scope = common::tenant_scope(&pool, "acme").await;
    let orchestrator = common::orchestrator();

    let instructor = common::create_user(&scope, "teacher").await;
    let student = common::create_user(&scope, "alice").await;
    let course = common::create_course(&scope, instructor, None).await;
    let quiz = common::create_quiz(&scope, course, "Ownership quiz", 10, Some(10), 1).await;

    common::record_completion(&scope, student, quiz, 60, Some(100)).await;
    let outcome = orchestrator
        .process_activity_completion(&pool, &signal(student, quiz, 60, Some(100)))
        .await
        .unwrap();

    // Below the quiz passing threshold: no ledger entry regardless of time.
    assert_eq!(outcome.points_awarded, None);
    assert!(PointRepo::list_for_user(&scope, student, 10).await.unwrap().is_empty());
    let user = UserRepo::find(&scope, student).await.unwrap().unwrap();
    assert_eq!(user.total_points, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn replayed_unit_of_work_awards_once(pool: PgPool) {
    let scope = common::tenant_scope(&pool, "acme").await;
    let orchestrator = common::orchestrator();

    let instructor = common::create_user(&scope, "teacher").await;
    let student = common::create_user(&scope, "alice").await;
    let course = common::create_course(&scope, instructor, None).await;
    let quiz = common::create_quiz(&scope, course, "Ownership quiz", 10, None, 1).await;

    common::record_completion(&scope, student, quiz, 80, None).await;
    let sig = signal(student, quiz, 80, None);

    let first = orchestrator.process_activity_completion(&pool, &sig).await.unwrap();
    // The job system redelivers the same signal (at-least-once).
    let replay = orchestrator.process_activity_completion(&pool, &sig).await.unwrap();

    assert_eq!(first.points_awarded, Some(11)); // 10 * 1.1
    assert_eq!(replay.points_awarded, None, "replay must not double-award");

    let user = UserRepo::find(&scope, student).await.unwrap().unwrap();
    assert_eq!(user.total_points, 11);
    assert_eq!(PointRepo::list_for_user(&scope, student, 10).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Course completion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn finishing_the_course_runs_the_nested_pipeline(pool: PgPool) {
    let scope = common::tenant_scope(&pool, "acme").await;
    let orchestrator = common::orchestrator();

    let instructor = common::create_user(&scope, "teacher").await;
    let student = common::create_user(&scope, "alice").await;
    let course = common::create_course(&scope, instructor, Some(100)).await;
    let quiz = common::create_quiz(&scope, course, "Final quiz", 10, None, 1).await;

    let enrollment = EnrollmentRepo::enroll(&scope, student, course).await.unwrap();
    common::backdate_enrollment(&pool, enrollment.id, 5).await;

    common::record_completion(&scope, student, quiz, 100, None).await;
    let outcome = orchestrator
        .process_activity_completion(&pool, &signal(student, quiz, 100, None))
        .await
        .unwrap();

    assert_eq!(outcome.progress_percentage, Some(100.0));
    let course_outcome = outcome.course.expect("course sub-pipeline should run");
    // 100 base + 50 speed bonus (completed within 7 days of enrollment).
    assert_eq!(course_outcome.points_awarded, Some(150));

    let after = EnrollmentRepo::find_for(&scope, student, course).await.unwrap().unwrap();
    assert!(after.completed_at.is_some());

    // Activity: 10 * 1.5 = 15; course: 150.
    let user = UserRepo::find(&scope, student).await.unwrap().unwrap();
    assert_eq!(user.total_points, 165);
    // 165 points crosses the 100-point boundary into level 2, announced
    // by the nested level check.
    assert_eq!(user.level, 2);
    assert!(course_outcome.level_up.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completion_edge_never_fires_twice(pool: PgPool) {
    let scope = common::tenant_scope(&pool, "acme").await;
    let orchestrator = common::orchestrator();

    let instructor = common::create_user(&scope, "teacher").await;
    let student = common::create_user(&scope, "alice").await;
    let course = common::create_course(&scope, instructor, Some(100)).await;
    let quiz = common::create_quiz(&scope, course, "Final quiz", 10, None, 1).await;

    EnrollmentRepo::enroll(&scope, student, course).await.unwrap();

    common::record_completion(&scope, student, quiz, 100, None).await;
    let first = orchestrator
        .process_activity_completion(&pool, &signal(student, quiz, 100, None))
        .await
        .unwrap();
    assert!(first.course.is_some());

    // A re-attempt arrives after the course is already complete.
    common::record_completion(&scope, student, quiz, 100, None).await;
    let second = orchestrator
        .process_activity_completion(&pool, &signal(student, quiz, 100, None))
        .await
        .unwrap();

    assert_eq!(second.progress_percentage, Some(100.0));
    assert!(second.course.is_none(), "just_completed must fire exactly once");

    // Exactly one course-completion award in the ledger.
    let course_entries: i64 = PointRepo::list_for_user(&scope, student, 50)
        .await
        .unwrap()
        .iter()
        .filter(|p| p.source_kind == SOURCE_COURSE)
        .count() as i64;
    assert_eq!(course_entries, 1);
}

// ---------------------------------------------------------------------------
// Streaks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn completion_after_yesterday_extends_streak(pool: PgPool) {
    let scope = common::tenant_scope(&pool, "acme").await;
    let orchestrator = common::orchestrator();

    let instructor = common::create_user(&scope, "teacher").await;
    let student = common::create_user(&scope, "alice").await;
    let course = common::create_course(&scope, instructor, None).await;
    let quiz_a = common::create_quiz(&scope, course, "Quiz A", 10, None, 1).await;
    let quiz_b = common::create_quiz(&scope, course, "Quiz B", 10, None, 2).await;

    // Yesterday's completion and a running streak of 3 (longest 5).
    let yesterday_row = common::record_completion(&scope, student, quiz_a, 90, None).await;
    common::backdate_completion(&pool, yesterday_row, 1).await;
    UserRepo::overwrite_caches(&scope, student, 0, 1, 3, 5).await.unwrap();

    common::record_completion(&scope, student, quiz_b, 90, None).await;
    let outcome = orchestrator
        .process_activity_completion(&pool, &signal(student, quiz_b, 90, None))
        .await
        .unwrap();

    assert_eq!(outcome.streak.current, 4);
    assert_eq!(outcome.streak.longest, 5);

    let user = UserRepo::find(&scope, student).await.unwrap().unwrap();
    assert_eq!(user.current_streak, 4);
    assert_eq!(user.longest_streak, 5);
    assert!(user.last_activity_date.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn gap_resets_streak(pool: PgPool) {
    let scope = common::tenant_scope(&pool, "acme").await;
    let orchestrator = common::orchestrator();

    let instructor = common::create_user(&scope, "teacher").await;
    let student = common::create_user(&scope, "alice").await;
    let course = common::create_course(&scope, instructor, None).await;
    let quiz_a = common::create_quiz(&scope, course, "Quiz A", 10, None, 1).await;
    let quiz_b = common::create_quiz(&scope, course, "Quiz B", 10, None, 2).await;

    let old_row = common::record_completion(&scope, student, quiz_a, 90, None).await;
    common::backdate_completion(&pool, old_row, 4).await;
    UserRepo::overwrite_caches(&scope, student, 0, 1, 7, 9).await.unwrap();

    common::record_completion(&scope, student, quiz_b, 90, None).await;
    let outcome = orchestrator
        .process_activity_completion(&pool, &signal(student, quiz_b, 90, None))
        .await
        .unwrap();

    assert_eq!(outcome.streak.current, 1);
    assert_eq!(outcome.streak.longest, 9);
}

// ---------------------------------------------------------------------------
// Levels and badges
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn crossing_the_point_curve_levels_up_and_notifies(pool: PgPool) {
    let scope = common::tenant_scope(&pool, "acme").await;
    let orchestrator = common::orchestrator();

    let instructor = common::create_user(&scope, "teacher").await;
    let student = common::create_user(&scope, "alice").await;
    let course = common::create_course(&scope, instructor, None).await;
    let quiz = common::create_quiz(&scope, course, "Big quiz", 100, None, 1).await;

    common::record_completion(&scope, student, quiz, 100, None).await;
    let outcome = orchestrator
        .process_activity_completion(&pool, &signal(student, quiz, 100, None))
        .await
        .unwrap();

    // 100 * 1.5 = 150 points, past the 100-point requirement for level 2.
    assert_eq!(outcome.points_awarded, Some(150));
    let level_up = outcome.level_up.expect("should level up");
    assert_eq!(level_up.old_level, 1);
    assert_eq!(level_up.new_level, 2);

    let user = UserRepo::find(&scope, student).await.unwrap().unwrap();
    assert_eq!(user.level, 2);

    let level_notes = NotificationRepo::list_for_user(&scope, student, false, 50)
        .await
        .unwrap()
        .into_iter()
        .filter(|n| n.kind == KIND_LEVEL_UP)
        .count();
    assert_eq!(level_notes, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn badges_grant_once_under_replay(pool: PgPool) {
    let scope = common::tenant_scope(&pool, "acme").await;
    let orchestrator = common::orchestrator();

    skillforge_engine::catalog::seed_default_badges(&scope).await.unwrap();

    let instructor = common::create_user(&scope, "teacher").await;
    let student = common::create_user(&scope, "alice").await;
    let course = common::create_course(&scope, instructor, None).await;
    let quiz = common::create_quiz(&scope, course, "Ownership quiz", 10, None, 1).await;

    common::record_completion(&scope, student, quiz, 96, None).await;
    let sig = signal(student, quiz, 96, None);
    let first = orchestrator.process_activity_completion(&pool, &sig).await.unwrap();

    // "First Step" (one completed activity) must be among the new grants.
    assert!(first.badges.iter().any(|name| name == "First Step"));

    let replay = orchestrator.process_activity_completion(&pool, &sig).await.unwrap();
    assert!(replay.badges.is_empty(), "replay must not re-grant badges");

    // Identical qualifying state, evaluated twice: exactly one row per badge.
    let grants = UserBadgeRepo::list_for_user(&scope, student).await.unwrap();
    assert!(!grants.is_empty());
    for grant in &grants {
        assert_eq!(
            UserBadgeRepo::grant_count(&scope, student, grant.badge_id).await.unwrap(),
            1
        );
    }
}

// ---------------------------------------------------------------------------
// Signal plumbing and unlocking
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn submitted_completion_enqueues_a_decodable_job(pool: PgPool) {
    let scope = common::tenant_scope(&pool, "acme").await;
    let orchestrator = common::orchestrator();

    let instructor = common::create_user(&scope, "teacher").await;
    let student = common::create_user(&scope, "alice").await;
    let course = common::create_course(&scope, instructor, None).await;
    let quiz = common::create_quiz(&scope, course, "Ownership quiz", 10, None, 1).await;

    let sig = signal(student, quiz, 80, None);
    let job = skillforge_engine::signals::submit_graded_completion(&scope, &sig)
        .await
        .unwrap();
    assert_eq!(job.job_type, JOB_TYPE_ACTIVITY_COMPLETED);

    // The worker decodes the payload and runs the pipeline.
    let decoded = ActivityCompletionSignal::from_payload(&job.payload).unwrap();
    assert_eq!(decoded.activity_id, quiz);
    let outcome = orchestrator
        .process_activity_completion(&pool, &decoded)
        .await
        .unwrap();
    assert_eq!(outcome.points_awarded, Some(11));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn later_activities_unlock_after_prior_progress(pool: PgPool) {
    let scope = common::tenant_scope(&pool, "acme").await;

    let instructor = common::create_user(&scope, "teacher").await;
    let student = common::create_user(&scope, "alice").await;
    let course = common::create_course(&scope, instructor, None).await;
    let first = common::create_quiz(&scope, course, "Quiz 1", 10, None, 1).await;
    let second = common::create_quiz(&scope, course, "Quiz 2", 10, None, 2).await;

    let first_activity = ActivityRepo::find(&scope, first).await.unwrap().unwrap();
    let second_activity = ActivityRepo::find(&scope, second).await.unwrap().unwrap();

    // The first activity is always open; the second is gated.
    let access = ProgressAggregator::check_activity_access(&scope, student, &first_activity)
        .await
        .unwrap();
    assert!(access.can_access);
    let access = ProgressAggregator::check_activity_access(&scope, student, &second_activity)
        .await
        .unwrap();
    assert!(!access.can_access);

    // Passing the first unlocks the second; a failing score does not count.
    common::record_completion(&scope, student, first, 60, None).await;
    let access = ProgressAggregator::check_activity_access(&scope, student, &second_activity)
        .await
        .unwrap();
    assert!(!access.can_access);

    common::record_completion(&scope, student, first, 90, None).await;
    let access = ProgressAggregator::check_activity_access(&scope, student, &second_activity)
        .await
        .unwrap();
    assert!(access.can_access);
}

// ---------------------------------------------------------------------------
// Failure modes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_entities_fail_permanently(pool: PgPool) {
    let scope = common::tenant_scope(&pool, "acme").await;
    let orchestrator = common::orchestrator();
    let student = common::create_user(&scope, "alice").await;

    // Unknown user.
    let err = orchestrator
        .process_activity_completion(&pool, &signal(9999, 1, 80, None))
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::EntityNotFound { entity: "user", .. });
    assert!(err.is_permanent());

    // Known user, unknown activity.
    let err = orchestrator
        .process_activity_completion(&pool, &signal(student, 9999, 80, None))
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::EntityNotFound { entity: "activity", .. });
    assert!(err.is_permanent());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cross_tenant_activity_is_invisible_to_the_pipeline(pool: PgPool) {
    let acme = common::tenant_scope(&pool, "acme").await;
    let globex = common::tenant_scope(&pool, "globex").await;
    let orchestrator = common::orchestrator();

    let acme_student = common::create_user(&acme, "alice").await;
    let globex_teacher = common::create_user(&globex, "bob").await;
    let globex_course = common::create_course(&globex, globex_teacher, None).await;
    let globex_quiz = common::create_quiz(&globex, globex_course, "Foreign quiz", 10, None, 1).await;

    // The signal names a real activity, but it belongs to another tenant:
    // the scoped read must see nothing.
    let err = orchestrator
        .process_activity_completion(&pool, &signal(acme_student, globex_quiz, 90, None))
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::EntityNotFound { entity: "activity", .. });
}
