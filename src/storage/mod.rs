//! Local key-value persistence.
//!
//! Values are JSON blobs written in full on every change. Two logical keys are
//! used: [`STATS_KEY`] for usage statistics and [`HISTORY_KEY`] for the saved
//! reply history.

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StorageError, StorageResult};

/// Key holding the JSON-encoded usage statistics.
pub const STATS_KEY: &str = "stats";
/// Key holding the JSON-encoded reply history, newest first.
pub const HISTORY_KEY: &str = "response_history";

/// Storage trait for string values under string keys.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// Read and decode the JSON value under `key`.
///
/// Returns `Ok(None)` when the key is absent.
pub async fn load_json<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> StorageResult<Option<T>> {
    match storage.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Serialization {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Encode `value` as JSON and store it under `key`.
pub async fn save_json<T: Serialize + ?Sized>(
    storage: &dyn Storage,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    let raw = serde_json::to_string(value).map_err(|e| StorageError::Serialization {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    storage.set(key, &raw).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_load_missing_key() {
        let storage = MemoryStorage::new();
        let value: Option<Value> = load_json(&storage, STATS_KEY).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let storage = MemoryStorage::new();
        save_json(&storage, STATS_KEY, &json!({"responses": 2, "timeSaved": 10}))
            .await
            .unwrap();

        let value: Value = load_json(&storage, STATS_KEY).await.unwrap().unwrap();
        assert_eq!(value["timeSaved"], 10);
        assert_eq!(
            storage.get(STATS_KEY).await.unwrap().as_deref(),
            Some(r#"{"responses":2,"timeSaved":10}"#)
        );
    }

    #[tokio::test]
    async fn test_load_corrupt_value() {
        let storage = MemoryStorage::new();
        storage.set(HISTORY_KEY, "[{not json").await.unwrap();

        let err = load_json::<Value>(&storage, HISTORY_KEY).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization { ref key, .. } if key == HISTORY_KEY));
    }
}
