//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and migrations
//! - User repositories (PostgreSQL and in-memory)
//! - Prometheus metrics recorder

pub mod db;
pub mod monitoring;
pub mod repositories;

pub use db::{Database, Migrator};
pub use monitoring::{init_metrics, PrometheusMetrics};
pub use repositories::{InMemoryUserStore, UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockUserRepository;
