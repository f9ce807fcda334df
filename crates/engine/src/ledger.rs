//! The points ledger service.
//!
//! Wraps the append-only `points` table and keeps the cached
//! `users.total_points` in lockstep: every append atomically bumps the
//! cache in the same logical operation, so a subsequent read in the same
//! unit of work never observes a stale total.

use skillforge_core::types::DbId;
use skillforge_db::models::point::{CreatePoint, Point};
use skillforge_db::repositories::{PointRepo, UserRepo};
use skillforge_db::TenantScope;

use crate::error::EngineError;

/// A ledger append together with the user's new cached total.
#[derive(Debug, Clone)]
pub struct Award {
    pub entry: Point,
    pub new_total: i64,
}

/// Append-only point awarding.
pub struct PointsLedger;

impl PointsLedger {
    /// Append one ledger entry and bump the cached total.
    ///
    /// The cache update is a single atomic `total_points = total_points +
    /// delta` so concurrent completions for the same user cannot lose
    /// updates; the ledger rows themselves never conflict.
    pub async fn award(scope: &TenantScope, input: &CreatePoint) -> Result<Award, EngineError> {
        let entry = PointRepo::insert(scope, input).await?;
        let new_total = UserRepo::add_points(scope, input.user_id, input.amount)
            .await?
            .ok_or(EngineError::EntityNotFound {
                entity: "user",
                id: input.user_id,
            })?;

        tracing::info!(
            user_id = input.user_id,
            amount = input.amount,
            source_kind = %input.source_kind,
            source_id = input.source_id,
            new_total,
            "Points awarded"
        );
        Ok(Award { entry, new_total })
    }

    /// Idempotent award: the logical award is keyed on (user, source kind,
    /// source id, entry type) and skipped when an entry already exists.
    ///
    /// This is what makes the pipeline safe under at-least-once job
    /// delivery — a retried unit of work re-runs this call and gets
    /// `Ok(None)` instead of a double award.
    pub async fn award_once(
        scope: &TenantScope,
        input: &CreatePoint,
    ) -> Result<Option<Award>, EngineError> {
        let already = PointRepo::exists_for_source(
            scope,
            input.user_id,
            &input.source_kind,
            input.source_id,
            &input.entry_type,
        )
        .await?;
        if already {
            tracing::debug!(
                user_id = input.user_id,
                source_kind = %input.source_kind,
                source_id = input.source_id,
                "Skipping duplicate award"
            );
            return Ok(None);
        }
        Ok(Some(Self::award(scope, input).await?))
    }

    /// The authoritative ledger sum for a user.
    pub async fn total_for_user(scope: &TenantScope, user_id: DbId) -> Result<i64, EngineError> {
        Ok(PointRepo::total_for_user(scope, user_id).await?)
    }
}
