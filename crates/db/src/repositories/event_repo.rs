//! Repository for the `events` table.
//!
//! Events are written by the persistence subscriber with the tenant id
//! carried inside the event itself, so this repository takes a plain pool.

use sqlx::PgPool;
use skillforge_core::types::DbId;

use crate::models::event::StoredEvent;
use crate::StoreError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tenant_id, event_type, source_kind, source_id, actor_user_id, \
                       payload, created_at";

/// Provides insert and read operations for durable events.
pub struct EventRepo;

impl EventRepo {
    /// Append an event row, returning its id.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        pool: &PgPool,
        tenant_id: Option<&str>,
        event_type: &str,
        source_kind: Option<&str>,
        source_id: Option<DbId>,
        actor_user_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<DbId, StoreError> {
        let id = sqlx::query_scalar(
            "INSERT INTO events \
                 (tenant_id, event_type, source_kind, source_id, actor_user_id, payload)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(tenant_id)
        .bind(event_type)
        .bind(source_kind)
        .bind(source_id)
        .bind(actor_user_id)
        .bind(payload)
        .fetch_one(pool)
        .await?;
        Ok(id)
    }

    /// The most recent events, newest first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<StoredEvent>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM events ORDER BY created_at DESC LIMIT $1");
        let events = sqlx::query_as::<_, StoredEvent>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(events)
    }
}
