//! Integration tests for the manifest importer strategy
//!
//! This test module covers:
//! - Importing and upserting manifest entries
//! - Fingerprint-based skipping of unchanged manifests
//! - Forced full imports
//! - Entries vanishing from the manifest
//! - Auth and server-side failure responses

mod common;

use chorale_server::sync::{ManifestImporter, SyncStrategy};
use chorale_shared_config::ImporterConfig;
use chorale_test_utils::{ManifestEntryFixture, MockManifestServer};

use common::create_test_db;

fn importer_for(server: &MockManifestServer, pool: sqlx::SqlitePool) -> ManifestImporter {
    ManifestImporter::new(
        pool,
        ImporterConfig::new(server.manifest_url(), server.api_key()),
    )
    .expect("importer construction should succeed")
}

#[derive(sqlx::FromRow)]
struct TrackRow {
    path: String,
    title: String,
    album: Option<String>,
    size_bytes: i64,
    available: i64,
}

async fn all_tracks(pool: &sqlx::SqlitePool) -> Vec<TrackRow> {
    sqlx::query_as(
        "SELECT path, title, album, size_bytes, available FROM tracks ORDER BY path",
    )
    .fetch_all(pool)
    .await
    .expect("Failed to query tracks")
}

// =============================================================================
// Import
// =============================================================================

#[tokio::test]
async fn test_import_inserts_manifest_entries() {
    let (_dir, pool) = create_test_db().await;
    let server = MockManifestServer::start().await;
    server
        .mock_export_success(vec![
            ManifestEntryFixture::track("/library/queen/01.flac", "Keep Yourself Alive", "Queen")
                .with_album("Queen")
                .with_size(31_337),
            ManifestEntryFixture::track("/library/queen/02.flac", "Doing All Right", "Queen"),
        ])
        .await;

    let importer = importer_for(&server, pool.clone());
    importer.synchronize(false).await.expect("import should succeed");

    let tracks = all_tracks(&pool).await;
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].title, "Keep Yourself Alive");
    assert_eq!(tracks[0].album.as_deref(), Some("Queen"));
    assert_eq!(tracks[0].size_bytes, 31_337);
    assert_eq!(tracks[0].available, 1);
}

#[tokio::test]
async fn test_import_updates_existing_entries() {
    let (_dir, pool) = create_test_db().await;
    let server = MockManifestServer::start().await;
    server
        .mock_export_success(vec![ManifestEntryFixture::track(
            "/library/a.mp3",
            "Untitled",
            "Unknown",
        )])
        .await;

    let importer = importer_for(&server, pool.clone());
    importer.synchronize(false).await.unwrap();

    // The manager re-tags the file and exports a new manifest
    server.reset().await;
    server
        .mock_export_success(vec![ManifestEntryFixture::track(
            "/library/a.mp3",
            "Proper Title",
            "Real Artist",
        )])
        .await;
    importer.synchronize(false).await.unwrap();

    let tracks = all_tracks(&pool).await;
    assert_eq!(tracks.len(), 1, "re-import must update in place, not duplicate");
    assert_eq!(tracks[0].title, "Proper Title");
}

#[tokio::test]
async fn test_empty_manifest_is_accepted() {
    let (_dir, pool) = create_test_db().await;
    let server = MockManifestServer::start().await;
    server.mock_export_empty().await;

    let importer = importer_for(&server, pool.clone());
    importer.synchronize(false).await.expect("empty manifest is valid");
    assert!(all_tracks(&pool).await.is_empty());
}

// =============================================================================
// Fingerprinting
// =============================================================================

#[tokio::test]
async fn test_unchanged_manifest_skips_database_writes() {
    let (_dir, pool) = create_test_db().await;
    let server = MockManifestServer::start().await;
    server
        .mock_export_success(vec![ManifestEntryFixture::track(
            "/library/a.mp3",
            "Original",
            "Artist",
        )])
        .await;

    let importer = importer_for(&server, pool.clone());
    importer.synchronize(false).await.unwrap();

    // Plant a sentinel: if the second run re-applies the manifest, the
    // upsert would overwrite this title with "Original" again.
    sqlx::query("UPDATE tracks SET title = 'sentinel' WHERE path = '/library/a.mp3'")
        .execute(&pool)
        .await
        .unwrap();

    importer.synchronize(false).await.unwrap();
    assert_eq!(
        all_tracks(&pool).await[0].title,
        "sentinel",
        "an unchanged manifest must not be re-applied"
    );
}

#[tokio::test]
async fn test_full_import_reapplies_unchanged_manifest() {
    let (_dir, pool) = create_test_db().await;
    let server = MockManifestServer::start().await;
    server
        .mock_export_success(vec![ManifestEntryFixture::track(
            "/library/a.mp3",
            "Original",
            "Artist",
        )])
        .await;

    let importer = importer_for(&server, pool.clone());
    importer.synchronize(false).await.unwrap();

    sqlx::query("UPDATE tracks SET title = 'sentinel' WHERE path = '/library/a.mp3'")
        .execute(&pool)
        .await
        .unwrap();

    importer.synchronize(true).await.unwrap();
    assert_eq!(
        all_tracks(&pool).await[0].title,
        "Original",
        "a full import must re-apply even an unchanged manifest"
    );
}

// =============================================================================
// Vanished Entries
// =============================================================================

#[tokio::test]
async fn test_entries_dropped_from_manifest_become_unavailable() {
    let (_dir, pool) = create_test_db().await;
    let server = MockManifestServer::start().await;
    server
        .mock_export_success(vec![
            ManifestEntryFixture::track("/library/keep.mp3", "Keep", "A"),
            ManifestEntryFixture::track("/library/gone.mp3", "Gone", "A"),
        ])
        .await;

    let importer = importer_for(&server, pool.clone());
    importer.synchronize(false).await.unwrap();

    server.reset().await;
    server
        .mock_export_success(vec![ManifestEntryFixture::track(
            "/library/keep.mp3",
            "Keep",
            "A",
        )])
        .await;
    importer.synchronize(false).await.unwrap();

    let tracks = all_tracks(&pool).await;
    let gone = tracks.iter().find(|t| t.path == "/library/gone.mp3").unwrap();
    assert_eq!(gone.available, 0, "dropped entry should be unavailable");
    let keep = tracks.iter().find(|t| t.path == "/library/keep.mp3").unwrap();
    assert_eq!(keep.available, 1);
}

// =============================================================================
// Failure Responses
// =============================================================================

#[tokio::test]
async fn test_wrong_api_key_is_rejected() {
    let (_dir, pool) = create_test_db().await;
    let server = MockManifestServer::start().await;
    server.mock_auth_failure("wrong-key").await;

    let importer = ManifestImporter::new(
        pool.clone(),
        ImporterConfig::new(server.manifest_url(), "wrong-key"),
    )
    .expect("importer construction should succeed");

    let err = importer
        .synchronize(false)
        .await
        .expect_err("401 should surface as an error");
    assert!(
        err.to_string().contains("manifest request rejected: 401"),
        "unexpected error: {err}"
    );
    assert!(all_tracks(&pool).await.is_empty(), "nothing may be imported on auth failure");
}

#[tokio::test]
async fn test_request_honors_configured_timeout() {
    let (_dir, pool) = create_test_db().await;
    let server = MockManifestServer::start().await;
    server
        .mock_export_stalled(std::time::Duration::from_secs(5))
        .await;

    let importer = ManifestImporter::new(
        pool,
        ImporterConfig::new(server.manifest_url(), server.api_key()).with_timeout(1),
    )
    .expect("importer construction should succeed");

    let err = importer
        .synchronize(false)
        .await
        .expect_err("a stalled manifest endpoint should time out");
    assert!(
        err.to_string().contains("HTTP request failed"),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn test_server_error_is_rejected() {
    let (_dir, pool) = create_test_db().await;
    let server = MockManifestServer::start().await;
    server.mock_server_error("database exploded").await;

    let importer = importer_for(&server, pool.clone());
    let err = importer.synchronize(false).await.expect_err("500 should surface");
    assert!(
        err.to_string().contains("manifest request rejected: 500"),
        "unexpected error: {err}"
    );
}
