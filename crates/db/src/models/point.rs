//! Point ledger entries.
//!
//! The `points` table is append-only: entries are inserted, summed, and
//! audited, never updated or deleted. A user's `total_points` cache must
//! always equal the sum of their entries.

use serde::{Deserialize, Serialize};
use skillforge_core::types::{DbId, TenantId, Timestamp};
use sqlx::FromRow;

/// Ledger entry types (CHECK constraint on `points.entry_type`).
pub const ENTRY_EARNED: &str = "earned";
pub const ENTRY_SPENT: &str = "spent";
pub const ENTRY_BONUS: &str = "bonus";
pub const ENTRY_PENALTY: &str = "penalty";

/// Polymorphic source kinds for the audit reference.
pub const SOURCE_ACTIVITY: &str = "activity";
pub const SOURCE_COURSE: &str = "course";
pub const SOURCE_BADGE: &str = "badge";

/// One immutable ledger entry from the `points` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Point {
    pub id: DbId,
    pub tenant_id: TenantId,
    pub user_id: DbId,
    /// Signed; negative amounts are adjustments/penalties.
    pub amount: i64,
    pub entry_type: String,
    pub source_kind: String,
    pub source_id: DbId,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for appending a ledger entry.
#[derive(Debug, Deserialize)]
pub struct CreatePoint {
    pub user_id: DbId,
    pub amount: i64,
    pub entry_type: String,
    pub source_kind: String,
    pub source_id: DbId,
    pub description: Option<String>,
}
