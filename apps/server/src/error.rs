//! Error handling for the Chorale server
//!
//! A single thiserror hierarchy covers the preference store and both sync
//! strategies. `PropertyNotFound` is a sentinel: it marks an absent row as a
//! normal outcome, distinct from a storage failure.

use thiserror::Error;

/// Main server error type
#[derive(Error, Debug)]
pub enum ServerError {
    // ========== Preference Store Errors ==========
    /// No preference row exists for this (user, key) pair
    #[error("no preference stored for user '{user_id}' under key '{key}'")]
    PropertyNotFound { user_id: String, key: String },

    /// Database query failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    // ========== Folder Scanner Errors ==========
    /// File system access error
    #[error("filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    /// Music library path not found or inaccessible
    #[error("music library path not found: {0}")]
    LibraryNotFound(String),

    // ========== Manifest Importer Errors ==========
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Manifest endpoint returned a non-success status
    #[error("manifest request rejected: {status} - {message}")]
    ManifestRejected { status: u16, message: String },

    /// Manifest body could not be decoded
    #[error("manifest decoding failed: {0}")]
    ManifestDecode(#[from] serde_json::Error),

    // ========== Configuration Errors ==========
    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ServerError {
    /// Check whether this is the not-found sentinel
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PropertyNotFound { .. })
    }

    /// Create a not-found sentinel for a preference lookup
    pub fn property_not_found(user_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self::PropertyNotFound {
            user_id: user_id.into(),
            key: key.into(),
        }
    }

    /// Create a manifest rejection error
    pub fn manifest_rejected(status: u16, message: impl Into<String>) -> Self {
        Self::ManifestRejected {
            status,
            message: message.into(),
        }
    }
}

/// Result type alias for server operations
pub type ServerResult<T> = Result<T, ServerError>;
