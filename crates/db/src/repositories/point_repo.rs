//! Repository for the append-only `points` ledger.

use skillforge_core::types::DbId;

use crate::models::point::{CreatePoint, Point};
use crate::scope::TenantScope;
use crate::StoreError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tenant_id, user_id, amount, entry_type, source_kind, \
                       source_id, description, created_at";

/// Provides append and read operations for the point ledger.
///
/// There is deliberately no update or delete: the ledger is the audit
/// trail the cached totals reconcile against.
pub struct PointRepo;

impl PointRepo {
    /// Append one ledger entry.
    pub async fn insert(scope: &TenantScope, input: &CreatePoint) -> Result<Point, StoreError> {
        let tenant = scope.require_tenant()?;
        let query = format!(
            "INSERT INTO points \
                 (tenant_id, user_id, amount, entry_type, source_kind, source_id, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let point = sqlx::query_as::<_, Point>(&query)
            .bind(tenant)
            .bind(input.user_id)
            .bind(input.amount)
            .bind(&input.entry_type)
            .bind(&input.source_kind)
            .bind(input.source_id)
            .bind(&input.description)
            .fetch_one(scope.pool())
            .await?;
        Ok(point)
    }

    /// Sum of all ledger entries for a user — the authoritative total the
    /// cached `users.total_points` must agree with.
    pub async fn total_for_user(scope: &TenantScope, user_id: DbId) -> Result<i64, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(0);
        };
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM points \
             WHERE user_id = $1 AND tenant_id = $2",
        )
        .bind(user_id)
        .bind(tenant)
        .fetch_one(scope.pool())
        .await?;
        Ok(total)
    }

    /// Whether a logical award already exists for (user, source, type).
    /// Backs idempotent awards under at-least-once job delivery.
    pub async fn exists_for_source(
        scope: &TenantScope,
        user_id: DbId,
        source_kind: &str,
        source_id: DbId,
        entry_type: &str,
    ) -> Result<bool, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(false);
        };
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS( \
                 SELECT 1 FROM points \
                 WHERE user_id = $1 AND tenant_id = $2 \
                   AND source_kind = $3 AND source_id = $4 AND entry_type = $5)",
        )
        .bind(user_id)
        .bind(tenant)
        .bind(source_kind)
        .bind(source_id)
        .bind(entry_type)
        .fetch_one(scope.pool())
        .await?;
        Ok(exists)
    }

    /// A user's ledger, newest first.
    pub async fn list_for_user(
        scope: &TenantScope,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<Point>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(Vec::new());
        };
        let query = format!(
            "SELECT {COLUMNS} FROM points \
             WHERE user_id = $1 AND tenant_id = $2 \
             ORDER BY created_at DESC LIMIT $3"
        );
        let points = sqlx::query_as::<_, Point>(&query)
            .bind(user_id)
            .bind(tenant)
            .bind(limit)
            .fetch_all(scope.pool())
            .await?;
        Ok(points)
    }
}
