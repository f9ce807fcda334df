//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Update DTOs (all `Option` fields) where the entity is patchable

pub mod activity;
pub mod badge;
pub mod course;
pub mod enrollment;
pub mod event;
pub mod job;
pub mod notification;
pub mod point;
pub mod tenant;
pub mod user;
pub mod user_activity;
