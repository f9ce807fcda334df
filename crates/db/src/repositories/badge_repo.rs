//! Repository for the `badges` catalog.

use skillforge_core::badge::BADGE_SPECIAL;
use skillforge_core::types::DbId;

use crate::models::badge::{Badge, CreateBadge};
use crate::scope::TenantScope;
use crate::StoreError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tenant_id, name, description, icon, color, badge_type, \
                       criteria, points_value, is_active, is_repeatable, \
                       created_at, updated_at";

/// Provides CRUD operations for the badge catalog.
pub struct BadgeRepo;

impl BadgeRepo {
    /// Add a badge to the active tenant's catalog. Idempotent per
    /// (tenant, name): re-creating an existing badge leaves it unchanged.
    pub async fn create(scope: &TenantScope, input: &CreateBadge) -> Result<Badge, StoreError> {
        let tenant = scope.require_tenant()?;
        let query = format!(
            "INSERT INTO badges \
                 (tenant_id, name, description, icon, color, badge_type, criteria, \
                  points_value, is_repeatable)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 0), COALESCE($9, false))
             ON CONFLICT (tenant_id, name) DO UPDATE SET updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        let badge = sqlx::query_as::<_, Badge>(&query)
            .bind(tenant)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.icon)
            .bind(&input.color)
            .bind(&input.badge_type)
            .bind(&input.criteria)
            .bind(input.points_value)
            .bind(input.is_repeatable)
            .fetch_one(scope.pool())
            .await?;
        Ok(badge)
    }

    /// Find a badge by id within the active tenant.
    pub async fn find(scope: &TenantScope, id: DbId) -> Result<Option<Badge>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(None);
        };
        let query = format!("SELECT {COLUMNS} FROM badges WHERE id = $1 AND tenant_id = $2");
        let badge = sqlx::query_as::<_, Badge>(&query)
            .bind(id)
            .bind(tenant)
            .fetch_optional(scope.pool())
            .await?;
        Ok(badge)
    }

    /// The tenant's active badges of the given types, in catalog order.
    pub async fn list_active_by_types(
        scope: &TenantScope,
        badge_types: &[&str],
    ) -> Result<Vec<Badge>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(Vec::new());
        };
        let types: Vec<String> = badge_types.iter().map(|t| t.to_string()).collect();
        let query = format!(
            "SELECT {COLUMNS} FROM badges \
             WHERE tenant_id = $1 AND is_active = true AND badge_type = ANY($2) \
             ORDER BY id ASC"
        );
        let badges = sqlx::query_as::<_, Badge>(&query)
            .bind(tenant)
            .bind(&types)
            .fetch_all(scope.pool())
            .await?;
        Ok(badges)
    }

    /// All of the tenant's active badges.
    pub async fn list_active(scope: &TenantScope) -> Result<Vec<Badge>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(Vec::new());
        };
        let query = format!(
            "SELECT {COLUMNS} FROM badges \
             WHERE tenant_id = $1 AND is_active = true \
             ORDER BY id ASC"
        );
        let badges = sqlx::query_as::<_, Badge>(&query)
            .bind(tenant)
            .fetch_all(scope.pool())
            .await?;
        Ok(badges)
    }

    /// Look up a special (manually granted) badge by name, e.g. the
    /// welcome badge granted on first enrollment.
    pub async fn find_special_by_name(
        scope: &TenantScope,
        name: &str,
    ) -> Result<Option<Badge>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(None);
        };
        let query = format!(
            "SELECT {COLUMNS} FROM badges \
             WHERE tenant_id = $1 AND name = $2 AND badge_type = $3 AND is_active = true"
        );
        let badge = sqlx::query_as::<_, Badge>(&query)
            .bind(tenant)
            .bind(name)
            .bind(BADGE_SPECIAL)
            .fetch_optional(scope.pool())
            .await?;
        Ok(badge)
    }
}
