//! Key-value cache with TTL expiry
//!
//! Shared by the enrichment engine (last run, audit trail, pause flag, feed)
//! and whatever scheduler or handler drives it. `SqliteCache` keeps entries in
//! the `kv_cache` table; an expired entry is invisible to `get` and is removed
//! lazily by `purge_expired`.

use crate::time::{now, now_rfc3339, to_rfc3339};
use crate::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::time::Duration;

/// Cache collaborator
#[async_trait]
pub trait KvCache: Send + Sync {
    /// Fetch a live (non-expired) value
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace a value; `ttl = None` never expires
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Remove a key; removing an absent key is not an error
    async fn delete(&self, key: &str) -> Result<()>;

    /// Drop expired entries, returning how many were removed
    async fn purge_expired(&self) -> Result<u64>;
}

/// Fetch and decode a JSON value
pub async fn get_json<T: DeserializeOwned>(cache: &dyn KvCache, key: &str) -> Result<Option<T>> {
    match cache.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and store a JSON value
pub async fn put_json<T: Serialize + ?Sized>(
    cache: &dyn KvCache,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    cache.put(key, &raw, ttl).await
}

/// SQLite-backed cache over the `kv_cache` table
#[derive(Clone)]
pub struct SqliteCache {
    pool: SqlitePool,
}

impl SqliteCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KvCache for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT value FROM kv_cache WHERE key = ? AND (expires_at IS NULL OR expires_at > ?)",
        )
        .bind(key)
        .bind(now_rfc3339())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(value,)| value))
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl
            .map(|ttl| {
                chrono::Duration::from_std(ttl)
                    .map_err(|e| crate::Error::InvalidInput(format!("TTL out of range: {}", e)))
            })
            .transpose()?
            .map(|ttl| to_rfc3339(&(now() + ttl)));

        sqlx::query(
            "INSERT INTO kv_cache (key, value, expires_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at",
        )
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_cache WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM kv_cache WHERE expires_at IS NOT NULL AND expires_at <= ?")
            .bind(now_rfc3339())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            tracing::debug!("Purged {} expired cache entries", result.rows_affected());
        }
        Ok(result.rows_affected())
    }
}
