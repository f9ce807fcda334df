//! Repository for the `tenants` table.
//!
//! This is the platform-operator ("central") surface: the table itself is
//! not tenant-owned, so methods take a plain pool rather than a scope.

use sqlx::PgPool;
use skillforge_core::types::TenantId;

use crate::error::StoreError;
use crate::models::tenant::{CreateTenant, Tenant};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, plan, max_users, max_courses, max_storage_mb, \
                       is_active, trial_ends_at, created_at, updated_at";

/// Provides CRUD operations for tenants.
pub struct TenantRepo;

impl TenantRepo {
    /// Provision a new tenant, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTenant) -> Result<Tenant, StoreError> {
        let query = format!(
            "INSERT INTO tenants (id, name, slug, plan, max_users, max_courses, max_storage_mb, trial_ends_at)
             VALUES ($1, $2, $3, COALESCE($4, 'trial'), COALESCE($5, 10), COALESCE($6, 5), COALESCE($7, 512), $8)
             RETURNING {COLUMNS}"
        );
        let tenant = sqlx::query_as::<_, Tenant>(&query)
            .bind(&input.id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.plan)
            .bind(input.max_users)
            .bind(input.max_courses)
            .bind(input.max_storage_mb)
            .bind(input.trial_ends_at)
            .fetch_one(pool)
            .await?;
        Ok(tenant)
    }

    /// Find a tenant by its id.
    pub async fn find(pool: &PgPool, id: &str) -> Result<Option<Tenant>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM tenants WHERE id = $1");
        let tenant = sqlx::query_as::<_, Tenant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(tenant)
    }

    /// List active tenants, oldest first. Used by batch jobs that walk
    /// every tenant (e.g. cache reconciliation).
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Tenant>, StoreError> {
        let query =
            format!("SELECT {COLUMNS} FROM tenants WHERE is_active = true ORDER BY created_at ASC");
        let tenants = sqlx::query_as::<_, Tenant>(&query).fetch_all(pool).await?;
        Ok(tenants)
    }

    /// List all tenant ids, active or not.
    pub async fn list_ids(pool: &PgPool) -> Result<Vec<TenantId>, StoreError> {
        let ids = sqlx::query_scalar("SELECT id FROM tenants ORDER BY created_at ASC")
            .fetch_all(pool)
            .await?;
        Ok(ids)
    }

    /// Deactivate a tenant. Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE tenants SET is_active = false, updated_at = NOW() \
             WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
