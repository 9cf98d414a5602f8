//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;

use super::constants::{
    DEFAULT_CORS_ORIGINS, DEFAULT_DATABASE_URL, DEFAULT_LOG_LEVEL, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, RATE_LIMIT_REQUESTS, RATE_LIMIT_WINDOW_SECONDS,
};

/// Where users are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub storage: StorageBackend,
    pub cors_origins: Vec<String>,
    pub cors_credentials: bool,
    pub rate_limit_requests: u64,
    pub rate_limit_window_seconds: u64,
    pub log_level: String,
    pub log_format: LogFormat,
    pub metrics_enabled: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("storage", &self.storage)
            .field("cors_origins", &self.cors_origins)
            .field("cors_credentials", &self.cors_credentials)
            .field("rate_limit_requests", &self.rate_limit_requests)
            .field("rate_limit_window_seconds", &self.rate_limit_window_seconds)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env`).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Unset or
    /// unparsable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let cors_origins = lookup("CORS_ORIGIN")
            .map(|v| {
                v.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect());

        Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            server_host: lookup("SERVER_HOST")
                .unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_var(&lookup, "SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            storage: parse_var(&lookup, "STORAGE").unwrap_or(StorageBackend::Postgres),
            cors_origins,
            cors_credentials: lookup("CORS_CREDENTIALS").as_deref() == Some("true"),
            rate_limit_requests: parse_var(&lookup, "RATE_LIMIT_REQUESTS")
                .unwrap_or(RATE_LIMIT_REQUESTS),
            rate_limit_window_seconds: parse_var(&lookup, "RATE_LIMIT_WINDOW_SECONDS")
                .unwrap_or(RATE_LIMIT_WINDOW_SECONDS),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_format: parse_var(&lookup, "LOG_FORMAT").unwrap_or(LogFormat::Pretty),
            metrics_enabled: parse_var(&lookup, "METRICS_ENABLED").unwrap_or(true),
        }
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.cors_origins.len(), 3);
        assert!(!config.cors_credentials);
        assert_eq!(config.rate_limit_requests, 100);
        assert_eq!(config.rate_limit_window_seconds, 60);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.metrics_enabled);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SERVER_PORT", "8081"),
            ("STORAGE", "memory"),
            ("CORS_ORIGIN", "https://a.example, https://b.example"),
            ("CORS_CREDENTIALS", "true"),
            ("RATE_LIMIT_REQUESTS", "5"),
            ("LOG_FORMAT", "json"),
            ("METRICS_ENABLED", "false"),
        ]);
        assert_eq!(config.server_addr(), "0.0.0.0:8081");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(config.cors_credentials);
        assert_eq!(config.rate_limit_requests, 5);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(!config.metrics_enabled);
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = config_from(&[("SERVER_PORT", "not-a-port"), ("STORAGE", "mongo")]);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.storage, StorageBackend::Postgres);
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = config_from(&[("DATABASE_URL", "postgres://u:hunter2@db/x")]);
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
