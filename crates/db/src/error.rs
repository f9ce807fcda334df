//! Store-layer error type.

/// Errors surfaced by the repository layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A write against a tenant-owned table was attempted with no active
    /// tenant. This is a precondition failure, never a fallback to
    /// unscoped access.
    #[error("no tenant context is active")]
    MissingTenantContext,

    /// Any underlying database failure (connection, lock timeout,
    /// constraint violation). Treated as transient by the job layer.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
