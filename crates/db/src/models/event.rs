//! Durable domain event rows.

use serde::Serialize;
use skillforge_core::types::{DbId, TenantId, Timestamp};
use sqlx::FromRow;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredEvent {
    pub id: DbId,
    pub tenant_id: Option<TenantId>,
    /// Dot-separated event name, e.g. `"activity.completed"`.
    pub event_type: String,
    pub source_kind: Option<String>,
    pub source_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}
