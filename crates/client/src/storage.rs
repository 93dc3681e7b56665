//! Persistent key/value storage for session state.
//!
//! The portal only ever stores two keys (token and cached user), written and
//! cleared together, so the abstraction is a tiny string map with batch
//! writes.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::error::StorageError;

#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write every entry, or none of them.
    async fn set_all(&self, entries: &[(&str, String)]) -> Result<(), StorageError>;

    /// Remove every key, or none of them.
    async fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.set_all(&[(key, value)]).await
    }
}

#[async_trait]
impl<S> SessionStorage for Arc<S>
where
    S: SessionStorage + ?Sized,
{
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key).await
    }

    async fn set_all(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        (**self).set_all(entries).await
    }

    async fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        (**self).remove_all(keys).await
    }
}

/// In-memory storage for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StorageError {
        StorageError::Unavailable("memory storage lock poisoned".into())
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(map.get(key).cloned())
    }

    async fn set_all(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    async fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// SQLite-backed storage; survives process restarts.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (creating if needed) the database at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        tracing::debug!(path = %path.display(), "session database opened");
        Self::with_pool(pool).await
    }

    /// Private in-memory database. One connection, never recycled, so the
    /// data lives as long as the storage.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_kv (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl SessionStorage for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM session_kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.try_get::<String, _>("value")).transpose()?)
    }

    async fn set_all(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let now = chrono::Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;
        for (key, value) in entries {
            sqlx::query(
                r#"
                INSERT INTO session_kv (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
            )
            .bind(*key)
            .bind(value)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        for key in keys {
            sqlx::query("DELETE FROM session_kv WHERE key = ?")
                .bind(*key)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn exercise(storage: &dyn SessionStorage) {
        assert_eq!(storage.get("token").await.unwrap(), None);

        storage
            .set_all(&[("token", "abc".into()), ("user", "{}".into())])
            .await
            .unwrap();
        assert_eq!(storage.get("token").await.unwrap().as_deref(), Some("abc"));

        storage.set("token", "def".into()).await.unwrap();
        assert_eq!(storage.get("token").await.unwrap().as_deref(), Some("def"));

        storage.remove_all(&["token", "user"]).await.unwrap();
        assert_eq!(storage.get("token").await.unwrap(), None);
        assert_eq!(storage.get("user").await.unwrap(), None);

        // Removing what is already gone is fine.
        storage.remove_all(&["token"]).await.unwrap();
    }

    #[tokio::test]
    async fn memory_storage_round_trips_keys() {
        exercise(&MemoryStorage::new()).await;
    }

    #[tokio::test]
    async fn sqlite_storage_round_trips_keys() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        exercise(&storage).await;
    }

    #[tokio::test]
    async fn arc_storage_delegates() {
        let shared = Arc::new(MemoryStorage::new());
        shared.set("token", "t".into()).await.unwrap();
        let view: Arc<dyn SessionStorage> = shared.clone();
        assert_eq!(view.get("token").await.unwrap().as_deref(), Some("t"));
    }
}
