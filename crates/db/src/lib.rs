//! Persistence layer: entity models, repositories, and the tenant scope
//! boundary every tenant-owned access funnels through.

pub mod error;
pub mod models;
pub mod repositories;
pub mod scope;

pub use error::StoreError;
pub use scope::{TenantContext, TenantScope};

/// Shared connection pool type.
pub type DbPool = sqlx::PgPool;

/// Connect to the database with sane pool defaults.
pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Cheap connectivity probe used by worker startup.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
