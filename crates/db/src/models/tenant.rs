//! Tenant entity model and DTOs.

use serde::{Deserialize, Serialize};
use skillforge_core::quota::TenantLimits;
use skillforge_core::types::{TenantId, Timestamp};
use sqlx::FromRow;

/// Full tenant row from the `tenants` table.
///
/// Created by provisioning; the gamification core treats it as read-only
/// reference data for identity and quota checks.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub slug: String,
    pub plan: String,
    pub max_users: i32,
    pub max_courses: i32,
    pub max_storage_mb: i32,
    pub is_active: bool,
    pub trial_ends_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Tenant {
    /// The quota view consulted before creating tenant-owned rows.
    pub fn limits(&self) -> TenantLimits {
        TenantLimits {
            max_users: self.max_users,
            max_courses: self.max_courses,
            is_active: self.is_active,
        }
    }

    /// Whether the tenant is still inside its trial window.
    pub fn is_trial_active(&self, now: Timestamp) -> bool {
        self.trial_ends_at.is_some_and(|ends| now < ends)
    }
}

/// DTO for provisioning a new tenant.
#[derive(Debug, Deserialize)]
pub struct CreateTenant {
    pub id: TenantId,
    pub name: String,
    pub slug: String,
    pub plan: Option<String>,
    pub max_users: Option<i32>,
    pub max_courses: Option<i32>,
    pub max_storage_mb: Option<i32>,
    pub trial_ends_at: Option<Timestamp>,
}
