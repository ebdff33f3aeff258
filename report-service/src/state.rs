//! Application state for the report service.

use std::sync::Arc;

use common::config::AppConfig;

use crate::pool_manager::PoolManager;
use crate::service::{ReportRunner, ReportService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pool_manager: Arc<PoolManager>,
    /// Report executor; handlers only see this seam, so tests can swap in
    /// a fake runner.
    pub runner: Arc<dyn ReportRunner>,
}

impl AppState {
    /// Eagerly initializes the connection pool. A failed pool leaves the
    /// service running degraded rather than aborting startup.
    pub async fn init(config: AppConfig) -> Self {
        let pool_manager = Arc::new(PoolManager::init(config.database.clone()).await);
        let runner = Arc::new(ReportService::new(pool_manager.clone()));
        Self {
            config,
            pool_manager,
            runner,
        }
    }
}
