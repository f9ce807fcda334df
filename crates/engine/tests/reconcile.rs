//! Cache reconciliation: replaying the ledger and completion history must
//! repair corrupted derived fields.

mod common;

use sqlx::PgPool;

use skillforge_db::models::point::{CreatePoint, ENTRY_EARNED, SOURCE_ACTIVITY};
use skillforge_db::repositories::{PointRepo, UserRepo};
use skillforge_engine::reconcile;

#[sqlx::test(migrations = "../../db/migrations")]
async fn corrupted_caches_are_repaired_from_source_tables(pool: PgPool) {
    let scope = common::tenant_scope(&pool, "acme").await;
    let instructor = common::create_user(&scope, "teacher").await;
    let student = common::create_user(&scope, "alice").await;
    let course = common::create_course(&scope, instructor, None).await;
    let quiz = common::create_quiz(&scope, course, "Quiz", 10, None, 1).await;

    // Ledger truth: 130 points across two entries.
    for (amount, source) in [(100_i64, quiz), (30, quiz + 1000)] {
        PointRepo::insert(
            &scope,
            &CreatePoint {
                user_id: student,
                amount,
                entry_type: ENTRY_EARNED.to_string(),
                source_kind: SOURCE_ACTIVITY.to_string(),
                source_id: source,
                description: None,
            },
        )
        .await
        .unwrap();
    }

    // One qualifying completion today.
    common::record_completion(&scope, student, quiz, 90, None).await;

    // Corrupt every derived field.
    UserRepo::overwrite_caches(&scope, student, 9999, 42, 17, 3).await.unwrap();

    let report = reconcile::reconcile_tenant(&scope).await.unwrap();
    assert_eq!(report.users_repaired, 1);

    let user = UserRepo::find(&scope, student).await.unwrap().unwrap();
    // 130 points put the user in level 2 (level 3 needs 204).
    assert_eq!(user.total_points, 130);
    assert_eq!(user.level, 2);
    assert_eq!(user.current_streak, 1);
    assert_eq!(user.longest_streak, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn clean_caches_are_left_alone(pool: PgPool) {
    let scope = common::tenant_scope(&pool, "acme").await;
    common::create_user(&scope, "alice").await;

    let report = reconcile::reconcile_tenant(&scope).await.unwrap();
    assert_eq!(report.users_checked, 1);
    assert_eq!(report.users_repaired, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reconcile_all_walks_every_active_tenant(pool: PgPool) {
    let acme = common::tenant_scope(&pool, "acme").await;
    let globex = common::tenant_scope(&pool, "globex").await;
    let alice = common::create_user(&acme, "alice").await;
    common::create_user(&globex, "bob").await;

    // Drift in one tenant only.
    UserRepo::overwrite_caches(&acme, alice, 500, 1, 0, 0).await.unwrap();

    let report = reconcile::reconcile_all(&pool).await.unwrap();
    assert_eq!(report.users_checked, 2);
    assert_eq!(report.users_repaired, 1);

    let fixed = UserRepo::find(&acme, alice).await.unwrap().unwrap();
    assert_eq!(fixed.total_points, 0);
    assert_eq!(fixed.level, 1);
}
