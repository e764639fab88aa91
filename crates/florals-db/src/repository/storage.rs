//! # Storage Repository
//!
//! String keys to JSON documents, with last-write timestamps.

use chrono::Utc;
use serde::de::DeserializeOwned;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// Repository over the `storage_entries` table.
#[derive(Debug, Clone)]
pub struct StorageRepository {
    pool: SqlitePool,
}

impl StorageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StorageRepository { pool }
    }

    /// Raw value stored under `key`.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM storage_entries WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    /// Writes `value` under `key`, replacing what was there.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        upsert(&self.pool, key, value).await
    }

    /// Deletes `key`. Returns whether anything was removed.
    pub async fn remove(&self, key: &str) -> DbResult<bool> {
        debug!(key = %key, "Removing storage entry");

        let result = sqlx::query("DELETE FROM storage_entries WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// `(key, value)` pairs whose key starts with `prefix`, ordered by key.
    pub async fn entries_with_prefix(&self, prefix: &str) -> DbResult<Vec<(String, String)>> {
        // substr avoids LIKE wildcard escaping
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT key, value
            FROM storage_entries
            WHERE substr(key, 1, length(?1)) = ?1
            ORDER BY key
            "#,
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Decodes the JSON document under `key`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> DbResult<Option<T>> {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

/// Insert-or-replace on any executor, so callers can run it inside a
/// transaction.
pub(crate) async fn upsert<'e, E>(executor: E, key: &str, value: &str) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    debug!(key = %key, bytes = value.len(), "Writing storage entry");

    sqlx::query(
        r#"
        INSERT INTO storage_entries (key, value, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(())
}
