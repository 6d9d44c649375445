//! External library manager importer
//!
//! Polls a library manager's export manifest over HTTP and mirrors its
//! entries into the tracks table. Incremental runs fingerprint the manifest
//! body so an unchanged export costs one GET and no database writes.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use chorale_shared_config::ImporterConfig;

use crate::error::{ServerError, ServerResult};

use super::SyncStrategy;

/// One track entry from the export manifest
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub path: String,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    #[serde(default)]
    pub size_bytes: u64,
}

/// Imports tracks from a library manager's export manifest
pub struct ManifestImporter {
    pool: SqlitePool,
    client: Client,
    config: ImporterConfig,
    /// SHA-256 of the last manifest body that was applied
    last_fingerprint: Mutex<Option<String>>,
}

impl ManifestImporter {
    pub fn new(pool: SqlitePool, config: ImporterConfig) -> ServerResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            pool,
            client,
            config,
            last_fingerprint: Mutex::new(None),
        })
    }

    /// Fetch the manifest body, checking the HTTP status before reading it
    async fn fetch_manifest(&self) -> ServerResult<String> {
        let response = self
            .client
            .get(&self.config.manifest_url)
            .header("X-Api-Key", &self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ServerError::manifest_rejected(status.as_u16(), message));
        }

        Ok(response.text().await?)
    }

    /// Apply manifest entries to the tracks table
    async fn apply(&self, entries: &[ManifestEntry]) -> ServerResult<()> {
        let now = Utc::now().to_rfc3339();

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO tracks (id, path, title, artist, album, size_bytes,
                                    available, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, 1, ?)
                ON CONFLICT (path) DO UPDATE SET
                    title = excluded.title,
                    artist = excluded.artist,
                    album = excluded.album,
                    size_bytes = excluded.size_bytes,
                    available = 1,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&entry.path)
            .bind(&entry.title)
            .bind(&entry.artist)
            .bind(&entry.album)
            .bind(entry.size_bytes as i64)
            .bind(&now)
            .execute(&self.pool)
            .await?;
        }

        // Tracks the manifest no longer lists are gone from the manager
        let listed: HashSet<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        let known: Vec<String> =
            sqlx::query_scalar("SELECT path FROM tracks WHERE available = 1")
                .fetch_all(&self.pool)
                .await?;

        for path in known {
            if !listed.contains(path.as_str()) {
                sqlx::query(
                    "UPDATE tracks SET available = 0, updated_at = ? WHERE path = ?",
                )
                .bind(&now)
                .bind(&path)
                .execute(&self.pool)
                .await?;
                debug!(path = %path, "Track dropped from manifest, marked unavailable");
            }
        }

        Ok(())
    }
}

#[async_trait]
impl SyncStrategy for ManifestImporter {
    fn name(&self) -> &'static str {
        "manifest-importer"
    }

    async fn synchronize(&self, full: bool) -> ServerResult<()> {
        let body = self.fetch_manifest().await?;

        let fingerprint = {
            let mut hasher = Sha256::new();
            hasher.update(body.as_bytes());
            format!("{:x}", hasher.finalize())
        };

        // Scope the guard so it is released before any await
        {
            let last = self.last_fingerprint.lock().unwrap_or_else(|e| e.into_inner());
            if !full && last.as_deref() == Some(fingerprint.as_str()) {
                debug!("Manifest unchanged since last run, skipping import");
                return Ok(());
            }
        }

        let entries: Vec<ManifestEntry> = serde_json::from_str(&body)?;
        info!(count = entries.len(), "Importing manifest entries");

        self.apply(&entries).await?;

        let mut last = self.last_fingerprint.lock().unwrap_or_else(|e| e.into_inner());
        *last = Some(fingerprint);

        Ok(())
    }
}
