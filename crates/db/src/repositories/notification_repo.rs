//! Repository for the `notifications` table.

use skillforge_core::types::DbId;

use crate::models::notification::{CreateNotification, Notification};
use crate::scope::TenantScope;
use crate::StoreError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tenant_id, user_id, kind, title, body, payload, is_read, \
                       read_at, created_at";

/// Provides CRUD operations for in-app notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Create a notification for a user under the active tenant.
    pub async fn create(
        scope: &TenantScope,
        input: &CreateNotification,
    ) -> Result<Notification, StoreError> {
        let tenant = scope.require_tenant()?;
        let query = format!(
            "INSERT INTO notifications (tenant_id, user_id, kind, title, body, payload)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let notification = sqlx::query_as::<_, Notification>(&query)
            .bind(tenant)
            .bind(input.user_id)
            .bind(&input.kind)
            .bind(&input.title)
            .bind(&input.body)
            .bind(&input.payload)
            .fetch_one(scope.pool())
            .await?;
        Ok(notification)
    }

    /// List notifications for a user, newest first.
    ///
    /// When `unread_only` is `true`, only unread rows are returned.
    pub async fn list_for_user(
        scope: &TenantScope,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(Vec::new());
        };
        let filter = if unread_only {
            "AND is_read = false"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 AND tenant_id = $2 {filter} \
             ORDER BY created_at DESC LIMIT $3"
        );
        let notifications = sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(tenant)
            .bind(limit)
            .fetch_all(scope.pool())
            .await?;
        Ok(notifications)
    }

    /// Mark a single notification as read. Returns `true` if it was found
    /// for the given user and updated.
    pub async fn mark_read(
        scope: &TenantScope,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, StoreError> {
        let tenant = scope.require_tenant()?;
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND tenant_id = $3 AND is_read = false",
        )
        .bind(notification_id)
        .bind(user_id)
        .bind(tenant)
        .execute(scope.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all unread notifications as read for a user. Returns how many
    /// rows changed.
    pub async fn mark_all_read(scope: &TenantScope, user_id: DbId) -> Result<u64, StoreError> {
        let tenant = scope.require_tenant()?;
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE user_id = $1 AND tenant_id = $2 AND is_read = false",
        )
        .bind(user_id)
        .bind(tenant)
        .execute(scope.pool())
        .await?;
        Ok(result.rows_affected())
    }

    /// The number of unread notifications for a user.
    pub async fn unread_count(scope: &TenantScope, user_id: DbId) -> Result<i64, StoreError> {
        let Some(tenant) = scope.tenant() else {
            return Ok(0);
        };
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications \
             WHERE user_id = $1 AND tenant_id = $2 AND is_read = false",
        )
        .bind(user_id)
        .bind(tenant)
        .fetch_one(scope.pool())
        .await?;
        Ok(count)
    }
}
