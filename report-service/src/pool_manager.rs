//! Database connection pool lifecycle.
//!
//! Owns the single PostgreSQL pool the report runs against. The pool is
//! established eagerly at startup; if the database is unreachable the
//! manager comes up degraded instead of aborting the process, so the
//! liveness endpoint stays reachable while every report call fails fast.

use std::time::Duration;

use common::config::DatabaseConfig;
use common::errors::{AppError, AppResult};
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};

/// Manages the report database pool.
///
/// All shared mutable state of the service lives here; handlers only ever
/// see leased connections. A degraded manager never transitions back to
/// available for the lifetime of the process.
pub struct PoolManager {
    config: DatabaseConfig,
    pool: Option<PgPool>,
}

impl PoolManager {
    /// Eagerly connects the pool. A failed connection is logged and leaves
    /// the manager degraded rather than crashing startup.
    pub async fn init(config: DatabaseConfig) -> Self {
        match Self::connect(&config).await {
            Ok(pool) => {
                tracing::info!(
                    host = %config.host,
                    database = %config.database,
                    min = config.min_connections,
                    max = config.max_connections,
                    "connection pool ready"
                );
                Self {
                    config,
                    pool: Some(pool),
                }
            }
            Err(e) => {
                tracing::error!(
                    host = %config.host,
                    database = %config.database,
                    error = %e,
                    "failed to initialize the connection pool; serving degraded"
                );
                Self { config, pool: None }
            }
        }
    }

    async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url())
            .await
    }

    /// Whether the pool came up at startup.
    pub fn is_available(&self) -> bool {
        self.pool.is_some()
    }

    /// Returns the pool, or fails fast when the manager is degraded.
    pub fn pool(&self) -> AppResult<&PgPool> {
        self.pool.as_ref().ok_or(AppError::PoolUnavailable)
    }

    /// Leases one connection.
    ///
    /// The lease is exclusive and returns to the pool when the handle
    /// drops, on every exit path. An acquire that outwaits the configured
    /// timeout surfaces as [`AppError::PoolExhausted`].
    pub async fn acquire(&self) -> AppResult<PoolConnection<Postgres>> {
        let pool = self.pool()?;
        pool.acquire().await.map_err(AppError::from)
    }

    /// Configured upper bound on concurrently leased connections.
    pub fn capacity(&self) -> u32 {
        self.config.max_connections
    }

    /// Number of connections currently leased out.
    pub fn leased(&self) -> u32 {
        self.pool
            .as_ref()
            .map(|p| p.size().saturating_sub(p.num_idle() as u32))
            .unwrap_or(0)
    }

    /// Closes the pool, waiting for leased connections to return.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            tracing::info!("closing connection pool");
            pool.close().await;
        }
    }
}

#[cfg(test)]
impl PoolManager {
    /// A manager whose initialization failed, for handler tests.
    pub fn degraded(config: DatabaseConfig) -> Self {
        Self { config, pool: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "localhost".to_string(),
            port: 5432,
            database: "reports".to_string(),
            username: "report".to_string(),
            password: "".to_string(),
            min_connections: 1,
            max_connections: 10,
            acquire_timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn degraded_manager_fails_acquire_without_a_round_trip() {
        let manager = PoolManager::degraded(test_config());
        assert!(!manager.is_available());
        let err = manager.acquire().await.unwrap_err();
        assert!(matches!(err, AppError::PoolUnavailable));
    }

    #[test]
    fn degraded_manager_reports_zero_leases_within_capacity() {
        let manager = PoolManager::degraded(test_config());
        assert_eq!(manager.leased(), 0);
        assert!(manager.leased() <= manager.capacity());
    }
}
