//! Well-known role name constants.
//!
//! These must match the CHECK constraint on `users.role` in the initial
//! migration.

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_INSTRUCTOR: &str = "instructor";
pub const ROLE_ADMIN: &str = "admin";
