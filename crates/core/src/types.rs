/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Opaque tenant identifier, assigned at provisioning time.
///
/// Tenant ids are slugs, not serial keys, so they can be embedded in
/// subdomains and survive cross-environment restores unchanged.
pub type TenantId = String;
