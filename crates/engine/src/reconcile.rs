//! Cache reconciliation: recompute every derived field on `users` from
//! the source tables and repair drift.
//!
//! `total_points` is replayed from the ledger, `level` from the curve,
//! and the streak counters from the completion history. Drift should
//! never happen in normal operation — when it does, it is repaired and
//! logged loudly enough to investigate.

use std::time::Duration;

use skillforge_core::{level, streak};
use skillforge_db::repositories::{PointRepo, TenantRepo, UserActivityRepo, UserRepo};
use skillforge_db::{DbPool, TenantScope};
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;

/// Summary of one reconciliation sweep.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReconcileReport {
    pub users_checked: u64,
    pub users_repaired: u64,
}

/// Reconcile every active tenant.
pub async fn reconcile_all(pool: &DbPool) -> Result<ReconcileReport, EngineError> {
    let mut report = ReconcileReport::default();
    for tenant in TenantRepo::list_active(pool).await? {
        let scope = TenantScope::for_tenant(pool.clone(), tenant.id.clone());
        let tenant_report = reconcile_tenant(&scope).await?;
        report.users_checked += tenant_report.users_checked;
        report.users_repaired += tenant_report.users_repaired;
    }
    Ok(report)
}

/// Reconcile the caches of every user in the active tenant.
pub async fn reconcile_tenant(scope: &TenantScope) -> Result<ReconcileReport, EngineError> {
    let mut report = ReconcileReport::default();

    for user in UserRepo::list(scope).await? {
        report.users_checked += 1;

        let expected_total = PointRepo::total_for_user(scope, user.id).await?;
        let expected_level = level::level_for_points(expected_total);

        let facts = UserActivityRepo::completed_facts(scope, user.id).await?;
        let dates: Vec<chrono::NaiveDate> = facts
            .iter()
            .filter(|f| f.is_qualifying())
            .map(|f| f.completed_at.date_naive())
            .collect();
        let expected_streak = streak::compute_from_history(&dates);

        let drifted = user.total_points != expected_total
            || user.level != expected_level
            || user.current_streak != expected_streak.current
            || user.longest_streak != expected_streak.longest;
        if !drifted {
            continue;
        }

        tracing::warn!(
            user_id = user.id,
            cached_total = user.total_points,
            expected_total,
            cached_level = user.level,
            expected_level,
            cached_streak = user.current_streak,
            expected_streak = expected_streak.current,
            "Cache drift detected, repairing"
        );
        UserRepo::overwrite_caches(
            scope,
            user.id,
            expected_total,
            expected_level,
            expected_streak.current,
            expected_streak.longest,
        )
        .await?;
        report.users_repaired += 1;
    }

    Ok(report)
}

/// Run reconciliation on a fixed interval until cancelled.
pub async fn run_periodic(pool: DbPool, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Cache reconciliation job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Cache reconciliation job stopping");
                break;
            }
            _ = ticker.tick() => {
                match reconcile_all(&pool).await {
                    Ok(report) => {
                        if report.users_repaired > 0 {
                            tracing::warn!(
                                checked = report.users_checked,
                                repaired = report.users_repaired,
                                "Reconciliation repaired drifted caches"
                            );
                        } else {
                            tracing::debug!(
                                checked = report.users_checked,
                                "Reconciliation found no drift"
                            );
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Reconciliation sweep failed");
                    }
                }
            }
        }
    }
}
