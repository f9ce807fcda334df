//! Repository for the `users` table.

use chrono::NaiveDate;
use sqlx::PgPool;
use skillforge_core::types::{DbId, TenantId};

use crate::models::user::{CreateUser, User};
use crate::scope::TenantScope;
use crate::StoreError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tenant_id, name, email, role, total_points, level, \
                       current_streak, longest_streak, last_activity_date, \
                       created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Register a new user under the active tenant.
    ///
    /// Fails with [`StoreError::MissingTenantContext`] when no tenant is
    /// active — a user row must never be created without its tenant stamp.
    pub async fn create(scope: &TenantScope, input: &CreateUser) -> Result<User, StoreError> {
        let tenant = scope.require_tenant()?;
        let query = format!(
            "INSERT INTO users (tenant_id, name, email, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(tenant)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.role)
            .fetch_one(scope.pool())
            .await?;
        Ok(user)
    }

    /// Find a user by id within the active tenant.
    ///
    /// Returns `None` both when the row does not exist and when it belongs
    /// to a different tenant — a cross-tenant id never resolves.
    pub async fn find(scope: &TenantScope, id: DbId) -> Result<Option<User>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(None);
        };
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND tenant_id = $2");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(tenant)
            .fetch_optional(scope.pool())
            .await?;
        Ok(user)
    }

    /// Find a user by email within the active tenant.
    pub async fn find_by_email(
        scope: &TenantScope,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(None);
        };
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1 AND tenant_id = $2");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .bind(tenant)
            .fetch_optional(scope.pool())
            .await?;
        Ok(user)
    }

    /// List the active tenant's users, most recently created first.
    pub async fn list(scope: &TenantScope) -> Result<Vec<User>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(Vec::new());
        };
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE tenant_id = $1 ORDER BY created_at DESC");
        let users = sqlx::query_as::<_, User>(&query)
            .bind(tenant)
            .fetch_all(scope.pool())
            .await?;
        Ok(users)
    }

    /// Count the active tenant's users (quota checks).
    pub async fn count(scope: &TenantScope) -> Result<i64, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(0);
        };
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE tenant_id = $1")
            .bind(tenant)
            .fetch_one(scope.pool())
            .await?;
        Ok(count)
    }

    /// Atomically add `delta` to the cached point total, returning the new
    /// total. This is the serialized read-modify-write that protects the
    /// cache when two completions for the same user race.
    pub async fn add_points(
        scope: &TenantScope,
        id: DbId,
        delta: i64,
    ) -> Result<Option<i64>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(None);
        };
        let total = sqlx::query_scalar(
            "UPDATE users SET total_points = total_points + $3, updated_at = NOW() \
             WHERE id = $1 AND tenant_id = $2 \
             RETURNING total_points",
        )
        .bind(id)
        .bind(tenant)
        .bind(delta)
        .fetch_optional(scope.pool())
        .await?;
        Ok(total)
    }

    /// Persist a new level for a user. The level only moves forward; a
    /// smaller value is ignored so concurrent pipelines cannot demote.
    pub async fn raise_level(
        scope: &TenantScope,
        id: DbId,
        new_level: i32,
    ) -> Result<bool, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(false);
        };
        let result = sqlx::query(
            "UPDATE users SET level = $3, updated_at = NOW() \
             WHERE id = $1 AND tenant_id = $2 AND level < $3",
        )
        .bind(id)
        .bind(tenant)
        .bind(new_level)
        .execute(scope.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Persist streak counters and the last-activity date.
    pub async fn update_streak(
        scope: &TenantScope,
        id: DbId,
        current: i32,
        longest: i32,
        last_activity_date: NaiveDate,
    ) -> Result<(), StoreError> {
        let tenant = scope.require_tenant()?;
        sqlx::query(
            "UPDATE users SET current_streak = $3, longest_streak = $4, \
                    last_activity_date = $5, updated_at = NOW() \
             WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant)
        .bind(current)
        .bind(longest)
        .bind(last_activity_date)
        .execute(scope.pool())
        .await?;
        Ok(())
    }

    /// Overwrite every derived cache at once. Reconciliation only.
    pub async fn overwrite_caches(
        scope: &TenantScope,
        id: DbId,
        total_points: i64,
        level: i32,
        current_streak: i32,
        longest_streak: i32,
    ) -> Result<(), StoreError> {
        let tenant = scope.require_tenant()?;
        sqlx::query(
            "UPDATE users SET total_points = $3, level = $4, current_streak = $5, \
                    longest_streak = $6, updated_at = NOW() \
             WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant)
        .bind(total_points)
        .bind(level)
        .bind(current_streak)
        .bind(longest_streak)
        .execute(scope.pool())
        .await?;
        Ok(())
    }

    /// Context-bootstrap lookup: the persisted tenant of a user, read
    /// without a scope.
    ///
    /// This is the one deliberately unscoped read in the store — a
    /// background job has only a user id and must re-derive the tenant
    /// before it can build a scope. Returns `Ok(None)` when the user does
    /// not exist and `Ok(Some(None))` for platform operators (who are
    /// never gamification subjects).
    pub async fn tenant_of(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Option<TenantId>>, StoreError> {
        let row: Option<Option<TenantId>> =
            sqlx::query_scalar("SELECT tenant_id FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(pool)
                .await?;
        Ok(row)
    }
}
