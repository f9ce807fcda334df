//! Tenant context and the scoped store boundary.
//!
//! [`TenantContext`] is an explicit, unit-of-work-scoped holder of "which
//! tenant is active now" — never a global or thread-local. One is built at
//! the start of each request or background job and dropped with it, so a
//! worker can never inherit the context of whatever ran on it last.
//!
//! [`TenantScope`] captures the pool plus the active tenant and is the
//! single value every repository method takes. Reads without an active
//! tenant return nothing (fail closed); writes fail with
//! [`StoreError::MissingTenantContext`].

use skillforge_core::types::TenantId;

use crate::error::StoreError;
use crate::DbPool;

// ---------------------------------------------------------------------------
// TenantContext
// ---------------------------------------------------------------------------

/// Which tenant the current unit of work acts for.
#[derive(Debug, Default, Clone)]
pub struct TenantContext {
    current: Option<TenantId>,
}

impl TenantContext {
    /// An empty context: no tenant active.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context with `tenant` already active.
    pub fn for_tenant(tenant: impl Into<TenantId>) -> Self {
        Self {
            current: Some(tenant.into()),
        }
    }

    /// Activate a tenant for the remainder of the unit of work.
    pub fn set_current(&mut self, tenant: impl Into<TenantId>) {
        self.current = Some(tenant.into());
    }

    /// The active tenant, if any.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Deactivate the tenant. Subsequent scoped reads return nothing and
    /// scoped writes fail.
    pub fn clear(&mut self) {
        self.current = None;
    }
}

// ---------------------------------------------------------------------------
// TenantScope
// ---------------------------------------------------------------------------

/// A connection pool bound to the tenant captured from a [`TenantContext`].
///
/// Cloning is cheap (the pool is internally reference counted).
#[derive(Debug, Clone)]
pub struct TenantScope {
    pool: DbPool,
    tenant: Option<TenantId>,
}

impl TenantScope {
    /// Scope all access to one tenant.
    pub fn for_tenant(pool: DbPool, tenant: impl Into<TenantId>) -> Self {
        Self {
            pool,
            tenant: Some(tenant.into()),
        }
    }

    /// Capture whatever tenant the context currently holds.
    pub fn from_context(pool: DbPool, context: &TenantContext) -> Self {
        Self {
            pool,
            tenant: context.current().map(str::to_owned),
        }
    }

    /// The platform-operator scope: no tenant. Tenant-owned reads through
    /// this scope return nothing and writes fail; only the central surface
    /// (the `tenants` table itself, the job queue) accepts it.
    pub fn central(pool: DbPool) -> Self {
        Self { pool, tenant: None }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// The active tenant, if any.
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// The active tenant, or [`StoreError::MissingTenantContext`].
    ///
    /// Every INSERT/UPDATE on a tenant-owned table goes through this.
    pub fn require_tenant(&self) -> Result<&str, StoreError> {
        self.tenant.as_deref().ok_or(StoreError::MissingTenantContext)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_starts_empty() {
        let ctx = TenantContext::new();
        assert_eq!(ctx.current(), None);
    }

    #[test]
    fn set_and_clear_round_trip() {
        let mut ctx = TenantContext::new();
        ctx.set_current("acme");
        assert_eq!(ctx.current(), Some("acme"));
        ctx.clear();
        assert_eq!(ctx.current(), None);
    }

    #[test]
    fn for_tenant_starts_active() {
        let ctx = TenantContext::for_tenant("acme");
        assert_eq!(ctx.current(), Some("acme"));
    }
}
