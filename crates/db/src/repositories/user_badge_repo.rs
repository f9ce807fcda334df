//! Repository for the `user_badges` grant table.

use skillforge_core::types::DbId;

use crate::models::badge::UserBadge;
use crate::scope::TenantScope;
use crate::StoreError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tenant_id, user_id, badge_id, earned_at, metadata";

/// Provides grant operations for user badges.
pub struct UserBadgeRepo;

impl UserBadgeRepo {
    /// Grant a badge to a user.
    ///
    /// Grants are idempotent: the unique (user_id, badge_id) constraint
    /// means a replayed grant is a no-op and reports `false`. Repeatable
    /// badges instead refresh `earned_at`/`metadata` and always count as
    /// newly earned.
    pub async fn grant(
        scope: &TenantScope,
        user_id: DbId,
        badge_id: DbId,
        repeatable: bool,
        metadata: Option<&serde_json::Value>,
    ) -> Result<bool, StoreError> {
        let tenant = scope.require_tenant()?;
        let conflict_clause = if repeatable {
            "ON CONFLICT (user_id, badge_id) \
             DO UPDATE SET earned_at = NOW(), metadata = EXCLUDED.metadata"
        } else {
            "ON CONFLICT (user_id, badge_id) DO NOTHING"
        };
        let query = format!(
            "INSERT INTO user_badges (tenant_id, user_id, badge_id, metadata)
             VALUES ($1, $2, $3, $4)
             {conflict_clause}"
        );
        let result = sqlx::query(&query)
            .bind(tenant)
            .bind(user_id)
            .bind(badge_id)
            .bind(metadata)
            .execute(scope.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether the user already holds the badge.
    pub async fn has_badge(
        scope: &TenantScope,
        user_id: DbId,
        badge_id: DbId,
    ) -> Result<bool, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(false);
        };
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS( \
                 SELECT 1 FROM user_badges \
                 WHERE user_id = $1 AND badge_id = $2 AND tenant_id = $3)",
        )
        .bind(user_id)
        .bind(badge_id)
        .bind(tenant)
        .fetch_one(scope.pool())
        .await?;
        Ok(exists)
    }

    /// All grants for a user, newest first.
    pub async fn list_for_user(
        scope: &TenantScope,
        user_id: DbId,
    ) -> Result<Vec<UserBadge>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(Vec::new());
        };
        let query = format!(
            "SELECT {COLUMNS} FROM user_badges \
             WHERE user_id = $1 AND tenant_id = $2 \
             ORDER BY earned_at DESC"
        );
        let grants = sqlx::query_as::<_, UserBadge>(&query)
            .bind(user_id)
            .bind(tenant)
            .fetch_all(scope.pool())
            .await?;
        Ok(grants)
    }

    /// Number of grant rows for a (user, badge) pair. Test support for
    /// the uniqueness property.
    pub async fn grant_count(
        scope: &TenantScope,
        user_id: DbId,
        badge_id: DbId,
    ) -> Result<i64, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(0);
        };
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_badges \
             WHERE user_id = $1 AND badge_id = $2 AND tenant_id = $3",
        )
        .bind(user_id)
        .bind(badge_id)
        .bind(tenant)
        .fetch_one(scope.pool())
        .await?;
        Ok(count)
    }
}
