//! Badge catalog and grant models.

use serde::{Deserialize, Serialize};
use skillforge_core::badge::BadgeCriteria;
use skillforge_core::types::{DbId, TenantId, Timestamp};
use sqlx::FromRow;

/// A tenant's badge catalog entry from the `badges` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Badge {
    pub id: DbId,
    pub tenant_id: TenantId,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    /// See the type constants in `skillforge_core::badge`.
    pub badge_type: String,
    /// Machine-checkable earning criteria (JSON).
    pub criteria: serde_json::Value,
    /// Bonus points granted alongside the badge, if positive.
    pub points_value: i32,
    pub is_active: bool,
    /// Repeatable badges may be earned again on later qualifying triggers;
    /// everything else is granted at most once per user.
    pub is_repeatable: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Badge {
    /// The typed view of the stored criteria JSON.
    pub fn parsed_criteria(&self) -> BadgeCriteria {
        BadgeCriteria::from_json(&self.criteria)
    }
}

/// DTO for creating a catalog entry under the active tenant.
#[derive(Debug, Deserialize)]
pub struct CreateBadge {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub badge_type: String,
    pub criteria: serde_json::Value,
    pub points_value: Option<i32>,
    pub is_repeatable: Option<bool>,
}

/// A badge grant from the `user_badges` table.
///
/// Uniqueness of (user_id, badge_id) is enforced by the schema, which is
/// what makes grants naturally idempotent under retries.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserBadge {
    pub id: DbId,
    pub tenant_id: TenantId,
    pub user_id: DbId,
    pub badge_id: DbId,
    pub earned_at: Timestamp,
    pub metadata: Option<serde_json::Value>,
}
