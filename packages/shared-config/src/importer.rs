//! External library manager import configuration

use std::env;

use crate::{get_required_env, parse_env, ConfigError, ConfigResult};

/// Configuration for importing from an external library manager
///
/// The manager exposes its catalog as an export manifest over HTTP. The
/// importer strategy polls that manifest and reconciles the local catalog
/// against it.
#[derive(Debug, Clone)]
pub struct ImporterConfig {
    /// Full URL of the export manifest endpoint
    pub manifest_url: String,

    /// API key sent with every manifest request
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ImporterConfig {
    /// Load importer configuration from environment variables
    ///
    /// Returns an error if the required variables (manifest URL and API key)
    /// are not set. This allows consumers to call `.ok()` to get
    /// `Option<ImporterConfig>`.
    pub fn from_env() -> ConfigResult<Self> {
        let manifest_url = get_required_env("IMPORT_MANIFEST_URL")?;
        let api_key = get_required_env("IMPORT_API_KEY")?;

        if manifest_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "IMPORT_MANIFEST_URL".to_string(),
                "URL cannot be empty".to_string(),
            ));
        }

        if api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "IMPORT_API_KEY".to_string(),
                "API key cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            manifest_url,
            api_key,
            timeout_secs: parse_env("IMPORT_TIMEOUT", 30)?,
        })
    }

    /// Check if the importer is configured (both URL and API key are set)
    pub fn is_configured() -> bool {
        env::var("IMPORT_MANIFEST_URL").is_ok() && env::var("IMPORT_API_KEY").is_ok()
    }

    /// Create a configuration with custom URL and API key (useful for testing)
    pub fn new(manifest_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            manifest_url: manifest_url.into(),
            api_key: api_key.into(),
            timeout_secs: 30,
        }
    }

    /// Set the request timeout on this configuration
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
