//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::api::middleware::RateLimiter;
use crate::config::Config;
use crate::infra::{Database, InMemoryUserStore, PrometheusMetrics, UserRepository, UserStore};
use crate::services::{Argon2Hasher, UserManager, UserService};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    pub rate_limiter: RateLimiter,
    pub config: Arc<Config>,
    /// `None` when running on the in-memory store
    pub database: Option<Arc<Database>>,
    pub metrics: Option<PrometheusMetrics>,
}

impl AppState {
    /// State backed by PostgreSQL.
    pub fn from_database(database: Arc<Database>, config: Config) -> Self {
        let repo: Arc<dyn UserRepository> = Arc::new(UserStore::new(database.get_connection()));
        Self::with_repository(repo, config).with_database(database)
    }

    /// State backed by an empty in-memory store.
    pub fn in_memory(config: Config) -> Self {
        Self::with_repository(Arc::new(InMemoryUserStore::new()), config)
    }

    /// State over any repository, hashing with Argon2.
    pub fn with_repository(repo: Arc<dyn UserRepository>, config: Config) -> Self {
        let user_service = Arc::new(UserManager::new(repo, Arc::new(Argon2Hasher)));
        Self::new(user_service, config)
    }

    /// Create new application state with manually injected services.
    pub fn new(user_service: Arc<dyn UserService>, config: Config) -> Self {
        Self {
            user_service,
            rate_limiter: RateLimiter::from_config(&config),
            config: Arc::new(config),
            database: None,
            metrics: None,
        }
    }

    pub fn with_database(mut self, database: Arc<Database>) -> Self {
        self.database = Some(database);
        self
    }

    pub fn with_metrics(mut self, metrics: Option<PrometheusMetrics>) -> Self {
        self.metrics = metrics;
        self
    }
}
