//! Per-user key-value preference store
//!
//! Arbitrary string preferences keyed by (user_id, key). The store is schema
//! free on purpose: clients decide what the values mean (theme names,
//! serialized queue state, last-played ids). Writes are single-statement
//! upserts, so concurrent puts for the same pair can never produce duplicate
//! rows or a lost insert.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{ServerError, ServerResult};

/// Repository for user preference operations
#[derive(Clone)]
pub struct UserPropsRepository {
    pool: SqlitePool,
}

impl UserPropsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a preference value, replacing any previous value for the pair
    pub async fn put(&self, user_id: &str, key: &str, value: &str) -> ServerResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_props (user_id, key, value)
            VALUES (?, ?, ?)
            ON CONFLICT (user_id, key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(user_id)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        debug!(user_id = %user_id, key = %key, "Stored user preference");
        Ok(())
    }

    /// Fetch a preference value
    ///
    /// Returns [`ServerError::PropertyNotFound`] when no value has been
    /// stored for this pair.
    pub async fn get(&self, user_id: &str, key: &str) -> ServerResult<String> {
        let value: Option<String> = sqlx::query_scalar(
            "SELECT value FROM user_props WHERE user_id = ? AND key = ?",
        )
        .bind(user_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        value.ok_or_else(|| ServerError::property_not_found(user_id, key))
    }

    /// Fetch a preference value, falling back to a default when absent
    ///
    /// Only the not-found sentinel is absorbed; real storage failures still
    /// surface as errors.
    pub async fn get_or_default(
        &self,
        user_id: &str,
        key: &str,
        default: &str,
    ) -> ServerResult<String> {
        match self.get(user_id, key).await {
            Ok(value) => Ok(value),
            Err(e) if e.is_not_found() => Ok(default.to_string()),
            Err(e) => Err(e),
        }
    }

    /// Remove a preference
    ///
    /// Deleting a pair that was never stored is not an error.
    pub async fn delete(&self, user_id: &str, key: &str) -> ServerResult<()> {
        sqlx::query("DELETE FROM user_props WHERE user_id = ? AND key = ?")
            .bind(user_id)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
