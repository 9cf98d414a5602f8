//! Password hashing collaborator.

use async_trait::async_trait;
use domain::Password;

use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Turns a plain-text password into an opaque hash.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait HashGenerator: Send + Sync {
    async fn hash(&self, plain: &str) -> AppResult<String>;
}

/// Argon2 hashing on the blocking thread pool
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

#[async_trait]
impl HashGenerator for Argon2Hasher {
    async fn hash(&self, plain: &str) -> AppResult<String> {
        let plain = plain.to_string();
        let password = tokio::task::spawn_blocking(move || Password::hash(&plain))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {}", e)))??;
        Ok(password.into_string())
    }
}
