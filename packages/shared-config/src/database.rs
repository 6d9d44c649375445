//! Database configuration types

use std::path::PathBuf;

use crate::{parse_env, ConfigResult};

/// SQLite database configuration
///
/// Chorale ships as a single self-hosted binary, so the database is an
/// embedded SQLite file next to the media library rather than an external
/// server.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// How long a writer waits on a locked database before failing, in seconds
    pub busy_timeout_secs: u64,

    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Load database configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            path: PathBuf::from(
                std::env::var("DATABASE_PATH").unwrap_or_else(|_| "chorale.db".to_string()),
            ),
            max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 5)?,
            busy_timeout_secs: parse_env("DATABASE_BUSY_TIMEOUT", 5)?,
            acquire_timeout_secs: parse_env("DATABASE_ACQUIRE_TIMEOUT", 30)?,
        })
    }

    /// Create a configuration with a custom database file (useful for testing)
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 5,
            busy_timeout_secs: 5,
            acquire_timeout_secs: 30,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::with_path("chorale.db")
    }
}
