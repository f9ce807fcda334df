//! Tenant plan quota checks.
//!
//! Pure predicates over a tenant's configured limits and current usage.
//! The provisioning surface owns the limits; the gamification core only
//! consults them before creating tenant-owned rows.

use crate::error::CoreError;

/// A tenant's resource limits, as configured on its plan.
#[derive(Debug, Clone, Copy)]
pub struct TenantLimits {
    pub max_users: i32,
    pub max_courses: i32,
    pub is_active: bool,
}

/// Whether `additional` more users fit under the tenant's limit.
pub fn can_create_users(limits: &TenantLimits, current_users: i64, additional: i64) -> bool {
    limits.is_active && current_users + additional <= i64::from(limits.max_users)
}

/// Whether `additional` more courses fit under the tenant's limit.
pub fn can_create_courses(limits: &TenantLimits, current_courses: i64, additional: i64) -> bool {
    limits.is_active && current_courses + additional <= i64::from(limits.max_courses)
}

/// Validate a user-creation request against the quota, with a descriptive
/// error for the caller to surface.
pub fn check_user_quota(
    limits: &TenantLimits,
    current_users: i64,
    additional: i64,
) -> Result<(), CoreError> {
    if !limits.is_active {
        return Err(CoreError::QuotaExceeded(
            "tenant is not active".to_string(),
        ));
    }
    if !can_create_users(limits, current_users, additional) {
        return Err(CoreError::QuotaExceeded(format!(
            "user limit reached ({current} of {max})",
            current = current_users,
            max = limits.max_users
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
