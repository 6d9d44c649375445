//! Server configuration loaded from environment variables
//!
//! Wraps the shared [`CommonConfig`] and adds the sync-loop settings: which
//! strategy to run and how often. The strategy choice is consumed once at
//! bootstrap; the scheduler itself never reads configuration.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use chorale_shared_config::{CommonConfig, DatabaseConfig, Environment, ImporterConfig};

/// Which sync strategy the server runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncSource {
    /// Walk the local music folder
    Folder,
    /// Poll an external library manager's export manifest
    Manifest,
}

impl std::str::FromStr for SyncSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "folder" | "scanner" => Ok(Self::Folder),
            "manifest" | "importer" => Ok(Self::Manifest),
            other => Err(format!(
                "unknown sync source '{}', expected 'folder' or 'manifest'",
                other
            )),
        }
    }
}

impl std::fmt::Display for SyncSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Folder => write!(f, "folder"),
            Self::Manifest => write!(f, "manifest"),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with other services
    pub common: CommonConfig,

    /// Seconds between sync runs
    pub sync_interval_secs: u64,

    /// Selected sync strategy
    pub sync_source: SyncSource,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let common = CommonConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        Ok(Self {
            common,

            sync_interval_secs: env::var("SYNC_INTERVAL")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .context("Invalid SYNC_INTERVAL value")?,

            sync_source: env::var("SYNC_SOURCE")
                .unwrap_or_else(|_| "folder".to_string())
                .parse()
                .map_err(|e: String| anyhow::anyhow!("Invalid SYNC_SOURCE value: {}", e))?,
        })
    }

    /// The sync interval as a [`Duration`]
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    // Convenience accessors for common config fields

    /// Get database configuration
    pub fn database(&self) -> &DatabaseConfig {
        &self.common.database
    }

    /// Get the music library path
    pub fn music_library_path(&self) -> &std::path::PathBuf {
        &self.common.music_library_path
    }

    /// Get importer configuration (if configured)
    pub fn importer(&self) -> Option<&ImporterConfig> {
        self.common.importer.as_ref()
    }

    /// Get environment mode
    pub fn environment(&self) -> Environment {
        self.common.environment
    }
}
