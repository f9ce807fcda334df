//! Engine error taxonomy.
//!
//! The split that matters operationally is permanent vs transient: a
//! permanent failure parks the job immediately, a transient one is
//! retried with backoff. Notification failures never appear here at all —
//! they are logged at the dispatch site and swallowed (best effort).

use skillforge_core::types::DbId;
use skillforge_db::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A tenant-scoped operation ran with no active tenant. Fatal
    /// precondition; never falls back to unscoped access.
    #[error("no tenant context is active")]
    MissingTenantContext,

    /// The referenced entity does not exist in the active tenant. A
    /// cross-tenant id looks exactly like a missing row.
    #[error("{entity} {id} not found in the active tenant")]
    EntityNotFound { entity: &'static str, id: DbId },

    /// The inbound signal is malformed (score out of range, user without
    /// a tenant, undecodable payload).
    #[error("invalid signal: {0}")]
    InvalidSignal(String),

    /// Underlying store failure — lock timeout, connection error. The job
    /// layer retries these.
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl EngineError {
    /// Whether retrying the unit of work could possibly succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::MissingTenantContext | Self::EntityNotFound { .. } | Self::InvalidSignal(_)
        )
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingTenantContext => Self::MissingTenantContext,
            StoreError::Database(e) => Self::Store(e),
        }
    }
}
