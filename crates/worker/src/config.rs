//! Worker configuration loaded from environment variables.

use std::time::Duration;

/// All fields have defaults suitable for local development except the
/// database URL.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Postgres connection string.
    pub database_url: String,
    /// How often the dispatcher polls for claimable jobs.
    pub poll_interval: Duration,
    /// How often the cache reconciliation sweep runs.
    pub reconcile_interval: Duration,
    /// Optional webhook endpoint mirroring every domain event.
    pub event_webhook_url: Option<String>,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default        |
    /// |---------------------------|----------------|
    /// | `DATABASE_URL`            | — (required)   |
    /// | `POLL_INTERVAL_SECS`      | `1`            |
    /// | `RECONCILE_INTERVAL_SECS` | `3600`         |
    /// | `EVENT_WEBHOOK_URL`       | — (disabled)   |
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let poll_interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .map_err(|_| anyhow::anyhow!("POLL_INTERVAL_SECS must be a valid u64"))?;

        let reconcile_interval_secs: u64 = std::env::var("RECONCILE_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .map_err(|_| anyhow::anyhow!("RECONCILE_INTERVAL_SECS must be a valid u64"))?;

        Ok(Self {
            database_url,
            poll_interval: Duration::from_secs(poll_interval_secs),
            reconcile_interval: Duration::from_secs(reconcile_interval_secs),
            event_webhook_url: std::env::var("EVENT_WEBHOOK_URL").ok(),
        })
    }
}
