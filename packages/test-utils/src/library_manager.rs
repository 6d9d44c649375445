//! Mock external library manager for testing the manifest importer
//!
//! Provides a [`MockManifestServer`] that serves a library export manifest
//! the way a real external manager would, without a real instance.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the export manifest is served under
const EXPORT_PATH: &str = "/api/v1/library/export";

/// Mock external library manager for import tests
///
/// Wraps a [`wiremock::MockServer`] and provides convenience methods for
/// mounting common export-manifest responses and error scenarios.
pub struct MockManifestServer {
    server: MockServer,
    api_key: String,
}

impl MockManifestServer {
    /// Start a new mock server with the default API key
    pub async fn start() -> Self {
        Self::start_with_api_key("test-api-key").await
    }

    /// Start a new mock server with a custom API key
    pub async fn start_with_api_key(api_key: &str) -> Self {
        let server = MockServer::start().await;
        Self {
            server,
            api_key: api_key.to_string(),
        }
    }

    /// Full URL of the export manifest endpoint
    pub fn manifest_url(&self) -> String {
        format!("{}{}", self.server.uri(), EXPORT_PATH)
    }

    /// Get the API key the success mocks expect
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Drop all mounted mocks so a different manifest can be served
    pub async fn reset(&self) {
        self.server.reset().await;
    }

    /// Mount a mock serving the given manifest entries
    pub async fn mock_export_success(&self, entries: Vec<ManifestEntryFixture>) {
        let body: Vec<serde_json::Value> = entries.into_iter().map(|e| e.to_json()).collect();

        Mock::given(method("GET"))
            .and(path(EXPORT_PATH))
            .and(header("X-Api-Key", self.api_key.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock serving an empty manifest
    pub async fn mock_export_empty(&self) {
        Mock::given(method("GET"))
            .and(path(EXPORT_PATH))
            .and(header("X-Api-Key", self.api_key.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock rejecting a specific bad API key with 401
    ///
    /// Only matches requests carrying `bad_api_key`, so it can coexist with
    /// success mocks for the valid key.
    pub async fn mock_auth_failure(&self, bad_api_key: &str) {
        Mock::given(method("GET"))
            .and(path(EXPORT_PATH))
            .and(header("X-Api-Key", bad_api_key))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "Unauthorized"
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock that stalls for the given delay before answering
    ///
    /// Used to exercise client-side request timeouts.
    pub async fn mock_export_stalled(&self, delay: std::time::Duration) {
        Mock::given(method("GET"))
            .and(path(EXPORT_PATH))
            .and(header("X-Api-Key", self.api_key.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Mount a mock answering every export request with a 500
    pub async fn mock_server_error(&self, error_message: &str) {
        Mock::given(method("GET"))
            .and(path(EXPORT_PATH))
            .and(header("X-Api-Key", self.api_key.as_str()))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": error_message
            })))
            .mount(&self.server)
            .await;
    }
}

/// Fixture for one track entry in the export manifest
#[derive(Debug, Clone)]
pub struct ManifestEntryFixture {
    pub path: String,
    /// Always present: the export contract requires a title on every entry
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub size_bytes: i64,
}

impl ManifestEntryFixture {
    /// Create a track entry with a title and artist
    pub fn track(path: &str, title: &str, artist: &str) -> Self {
        Self {
            path: path.to_string(),
            title: title.to_string(),
            artist: Some(artist.to_string()),
            album: None,
            size_bytes: 4_000_000,
        }
    }

    /// Set the album on this entry
    pub fn with_album(mut self, album: &str) -> Self {
        self.album = Some(album.to_string());
        self
    }

    /// Set the file size on this entry
    pub fn with_size(mut self, size_bytes: i64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    /// Convert to the JSON shape the manager exports
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "path": self.path,
            "title": self.title,
            "artist": self.artist,
            "album": self.album,
            "sizeBytes": self.size_bytes
        })
    }
}
