//! # Key-Value Repository
//!
//! Plain string values under string keys, with JSON helpers on top.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Repository over the `kv_store` table.
#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    pub fn new(pool: SqlitePool) -> Self {
        KvRepository { pool }
    }

    pub async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    /// Inserts or replaces a value. Last writer wins.
    pub async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        debug!(key = %key, bytes = value.len(), "kv set");

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes a key. Returns true if it existed.
    pub async fn delete(&self, key: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Decodes a JSON value. Unreadable JSON is a [`StoreError::Corrupt`].
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get(key).await? {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| StoreError::corrupt(key, e)),
            None => Ok(None),
        }
    }

    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let text = serde_json::to_string(value)?;
        self.set(key, &text).await
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, StoreConfig};
    use serde_json::json;

    async fn db() -> Database {
        Database::new(StoreConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_set_get_overwrite_delete() {
        let kv = db().await.kv();

        assert_eq!(kv.get("a").await.unwrap(), None);
        kv.set("a", "1").await.unwrap();
        kv.set("a", "2").await.unwrap();
        assert_eq!(kv.get("a").await.unwrap().as_deref(), Some("2"));

        assert!(kv.delete("a").await.unwrap());
        assert!(!kv.delete("a").await.unwrap());
        assert_eq!(kv.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_json_round_trip_and_corruption() {
        let kv = db().await.kv();

        kv.set_json("doc", &json!({ "n": 3 })).await.unwrap();
        let doc: Option<serde_json::Value> = kv.get_json("doc").await.unwrap();
        assert_eq!(doc, Some(json!({ "n": 3 })));

        kv.set("broken", "{not json").await.unwrap();
        let err = kv.get_json::<serde_json::Value>("broken").await.unwrap_err();
        assert!(matches!(err, crate::StoreError::Corrupt { .. }));
    }
}
