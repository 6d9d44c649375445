//! Shared helpers for integration tests

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use sqlx::SqlitePool;
use tempfile::TempDir;

use chorale_server::db;
use chorale_shared_config::DatabaseConfig;

/// Open a fresh file-backed test database with the schema applied
///
/// File-backed rather than in-memory so every pool connection sees the same
/// database, which matters for the concurrency tests.
pub async fn create_test_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("Failed to create temp dir for test database");
    let config = DatabaseConfig::with_path(dir.path().join("test.db"));

    let pool = db::connect(&config)
        .await
        .expect("Failed to open test database");
    db::init_schema(&pool)
        .await
        .expect("Failed to initialize test schema");

    (dir, pool)
}

/// Create a temporary directory standing in for the music library
#[allow(dead_code)]
pub fn create_temp_library() -> TempDir {
    TempDir::new().expect("Failed to create temp music library")
}

/// Create a file inside the test library, making parent directories as needed
#[allow(dead_code)]
pub fn create_library_file(library: &Path, relative: &str, content: &[u8]) -> PathBuf {
    let path = library.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    let mut file = File::create(&path).expect("Failed to create library file");
    file.write_all(content).expect("Failed to write library file");
    path
}
