//! Configuration management for the server.

use std::env;

/// Default number of change log entries per page.
const DEFAULT_PAGE_SIZE: i64 = 36;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Maximum pooled database connections
    pub max_connections: u32,
    /// Change log entries returned when a request sets no limit
    pub page_size: i64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidNumber("DATABASE_MAX_CONNECTIONS"))?;

        let page_size = match env::var("CHANGELOG_PAGE_SIZE") {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("CHANGELOG_PAGE_SIZE"))?,
            Err(_) => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            host,
            port,
            database_url,
            max_connections,
            page_size,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable is required")]
    MissingDatabaseUrl,

    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid {0} value")]
    InvalidNumber(&'static str),
}
