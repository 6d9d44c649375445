//! Local folder scanner
//!
//! Walks the music library directory and reconciles the tracks table with
//! what is actually on disk: new files are inserted, changed files are
//! re-hashed and updated, files that vanished are marked unavailable rather
//! than deleted so play history keeps its foreign keys.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::{ServerError, ServerResult};

use super::SyncStrategy;

/// File extensions treated as audio
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "opus", "m4a", "wav", "aac"];

/// Scans a local directory tree for audio files
pub struct FolderScanner {
    pool: SqlitePool,
    library_path: PathBuf,
}

/// Row shape for tracks already known to the database
#[derive(sqlx::FromRow)]
struct KnownTrack {
    id: String,
    path: String,
    content_hash: Option<String>,
}

impl FolderScanner {
    pub fn new(pool: SqlitePool, library_path: PathBuf) -> Self {
        Self { pool, library_path }
    }

    /// Walk the library and collect audio files with their sizes
    fn collect_files(&self) -> ServerResult<Vec<(PathBuf, u64)>> {
        if !self.library_path.is_dir() {
            return Err(ServerError::LibraryNotFound(
                self.library_path.display().to_string(),
            ));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.library_path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() || !is_audio_file(entry.path()) {
                continue;
            }
            match entry.metadata() {
                Ok(meta) => files.push((entry.path().to_path_buf(), meta.len())),
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Skipping unreadable file");
                }
            }
        }
        Ok(files)
    }

    /// Insert or update one on-disk file
    ///
    /// `full` forces a rewrite even when the content hash matches.
    async fn upsert_file(
        &self,
        known: &HashMap<String, (String, Option<String>)>,
        path: &Path,
        size: u64,
        full: bool,
    ) -> ServerResult<bool> {
        let path_str = path.display().to_string();
        let hash = hash_file(path)?;

        if let Some((id, old_hash)) = known.get(&path_str) {
            if !full && old_hash.as_deref() == Some(hash.as_str()) {
                // Unchanged; just make sure it is flagged available again
                sqlx::query("UPDATE tracks SET available = 1 WHERE id = ? AND available = 0")
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                return Ok(false);
            }

            let (title, artist, album) = describe_path(&self.library_path, path);
            sqlx::query(
                r#"
                UPDATE tracks
                SET title = ?, artist = ?, album = ?, size_bytes = ?,
                    content_hash = ?, available = 1, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&title)
            .bind(&artist)
            .bind(&album)
            .bind(size as i64)
            .bind(&hash)
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;

            debug!(path = %path_str, "Updated changed track");
            return Ok(true);
        }

        let (title, artist, album) = describe_path(&self.library_path, path);
        sqlx::query(
            r#"
            INSERT INTO tracks (id, path, title, artist, album, size_bytes,
                                content_hash, available, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&path_str)
        .bind(&title)
        .bind(&artist)
        .bind(&album)
        .bind(size as i64)
        .bind(&hash)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(path = %path_str, "Inserted new track");
        Ok(true)
    }
}

#[async_trait]
impl SyncStrategy for FolderScanner {
    fn name(&self) -> &'static str {
        "folder-scanner"
    }

    async fn synchronize(&self, full: bool) -> ServerResult<()> {
        let files = self.collect_files()?;
        info!(count = files.len(), "Scanning music library");

        let rows: Vec<KnownTrack> =
            sqlx::query_as("SELECT id, path, content_hash FROM tracks")
                .fetch_all(&self.pool)
                .await?;
        let known: HashMap<String, (String, Option<String>)> = rows
            .into_iter()
            .map(|t| (t.path, (t.id, t.content_hash)))
            .collect();

        let mut changed = 0usize;
        let mut seen = HashSet::with_capacity(files.len());
        for (path, size) in &files {
            seen.insert(path.display().to_string());
            if self.upsert_file(&known, path, *size, full).await? {
                changed += 1;
            }
        }

        // Anything in the database that no longer exists on disk
        let mut vanished = 0usize;
        for (path, (id, _)) in &known {
            if !seen.contains(path) {
                let result =
                    sqlx::query("UPDATE tracks SET available = 0, updated_at = ? WHERE id = ?")
                        .bind(Utc::now().to_rfc3339())
                        .bind(id)
                        .execute(&self.pool)
                        .await?;
                vanished += result.rows_affected() as usize;
            }
        }

        info!(
            scanned = files.len(),
            changed = changed,
            vanished = vanished,
            "Library scan complete"
        );
        Ok(())
    }
}

/// Check whether a path has a recognized audio extension
fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Hash a file's contents
fn hash_file(path: &Path) -> ServerResult<String> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Derive display metadata from a file's position in the library
///
/// Libraries are conventionally laid out as artist/album/track; when the
/// file sits shallower than that, only the fields that exist are filled.
fn describe_path(library: &Path, path: &Path) -> (String, Option<String>, Option<String>) {
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();

    let relative = path.strip_prefix(library).unwrap_or(path);
    let components: Vec<&str> = relative
        .parent()
        .map(|p| {
            p.components()
                .filter_map(|c| c.as_os_str().to_str())
                .collect()
        })
        .unwrap_or_default();

    match components.as_slice() {
        [] => (title, None, None),
        [artist] => (title, Some(artist.to_string()), None),
        [artist, rest @ ..] => (
            title,
            Some(artist.to_string()),
            rest.last().map(|a| a.to_string()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("/music/a/b/song.mp3")));
        assert!(is_audio_file(Path::new("/music/song.FLAC")));
        assert!(!is_audio_file(Path::new("/music/cover.jpg")));
        assert!(!is_audio_file(Path::new("/music/README")));
    }

    #[test]
    fn test_describe_path_full_layout() {
        let (title, artist, album) = describe_path(
            Path::new("/music"),
            Path::new("/music/Nina Simone/Pastel Blues/Sinnerman.flac"),
        );
        assert_eq!(title, "Sinnerman");
        assert_eq!(artist.as_deref(), Some("Nina Simone"));
        assert_eq!(album.as_deref(), Some("Pastel Blues"));
    }

    #[test]
    fn test_describe_path_flat_file() {
        let (title, artist, album) =
            describe_path(Path::new("/music"), Path::new("/music/loose-track.mp3"));
        assert_eq!(title, "loose-track");
        assert!(artist.is_none());
        assert!(album.is_none());
    }

    #[test]
    fn test_describe_path_artist_only() {
        let (title, artist, album) = describe_path(
            Path::new("/music"),
            Path::new("/music/Radiohead/Creep.mp3"),
        );
        assert_eq!(title, "Creep");
        assert_eq!(artist.as_deref(), Some("Radiohead"));
        assert!(album.is_none());
    }
}
