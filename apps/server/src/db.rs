//! SQLite connection pool and schema setup
//!
//! WAL mode is enabled so scanner writes and preference reads can proceed
//! concurrently; the busy timeout keeps concurrent writers from failing fast
//! on a locked database.

use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use chorale_shared_config::DatabaseConfig;

use crate::error::ServerResult;

/// Open a connection pool for the configured database file
///
/// Creates the file if it does not exist.
pub async fn connect(config: &DatabaseConfig) -> ServerResult<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(config.busy_timeout_secs))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create the schema if it is not present yet
///
/// Runs at every startup. The composite primary key on `user_props` is what
/// makes the preference upsert atomic: a single INSERT .. ON CONFLICT can
/// never leave two rows for one (user_id, key) pair.
pub async fn init_schema(pool: &SqlitePool) -> ServerResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_props (
            user_id TEXT NOT NULL,
            key     TEXT NOT NULL,
            value   TEXT NOT NULL,
            PRIMARY KEY (user_id, key)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tracks (
            id           TEXT PRIMARY KEY,
            path         TEXT NOT NULL UNIQUE,
            title        TEXT,
            artist       TEXT,
            album        TEXT,
            size_bytes   INTEGER NOT NULL DEFAULT 0,
            content_hash TEXT,
            available    INTEGER NOT NULL DEFAULT 1,
            updated_at   TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
