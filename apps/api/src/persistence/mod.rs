// Optional save/restore of the form to an external key-value blob store.
// Off by default: the saved key is cleared at startup unless restore is enabled.

pub mod autosave;
pub mod file_store;
pub mod redis_store;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::form::FormSnapshot;

/// The single key the whole form is stored under.
pub const SNAPSHOT_KEY: &str = "resumeBuilderData";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Raw blob storage. Implementations know nothing about the form schema.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save(&self, key: &str, blob: &str) -> Result<(), StoreError>;
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn clear(&self, key: &str) -> Result<(), StoreError>;

    /// Backend name, for logs.
    fn backend(&self) -> &'static str;
}

/// Overwrites the stored snapshot.
pub async fn save_snapshot(
    store: &dyn SnapshotStore,
    snapshot: &FormSnapshot,
) -> Result<(), StoreError> {
    let blob = serde_json::to_string(snapshot)?;
    store.save(SNAPSHOT_KEY, &blob).await
}

/// Reads the stored snapshot. A missing, unreadable or unparseable blob is
/// logged and reported as "no saved data".
pub async fn load_snapshot(store: &dyn SnapshotStore) -> Option<FormSnapshot> {
    let blob = match store.load(SNAPSHOT_KEY).await {
        Ok(Some(blob)) => blob,
        Ok(None) => return None,
        Err(e) => {
            warn!("Failed to read saved form data from {}: {e}", store.backend());
            return None;
        }
    };

    match serde_json::from_str(&blob) {
        Ok(snapshot) => {
            info!("Loaded saved form data from {}", store.backend());
            Some(snapshot)
        }
        Err(e) => {
            warn!("Failed to load saved data: {e}");
            None
        }
    }
}

pub async fn clear_snapshot(store: &dyn SnapshotStore) -> Result<(), StoreError> {
    store.clear(SNAPSHOT_KEY).await
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-process store for tests.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub blobs: Mutex<HashMap<String, String>>,
        pub saves: Mutex<usize>,
    }

    impl MemoryStore {
        pub(crate) fn get(&self, key: &str) -> Option<String> {
            self.blobs.lock().unwrap().get(key).cloned()
        }

        pub(crate) fn save_count(&self) -> usize {
            *self.saves.lock().unwrap()
        }
    }

    #[async_trait]
    impl SnapshotStore for MemoryStore {
        async fn save(&self, key: &str, blob: &str) -> Result<(), StoreError> {
            *self.saves.lock().unwrap() += 1;
            self.blobs
                .lock()
                .unwrap()
                .insert(key.to_string(), blob.to_string());
            Ok(())
        }

        async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.get(key))
        }

        async fn clear(&self, key: &str) -> Result<(), StoreError> {
            self.blobs.lock().unwrap().remove(key);
            Ok(())
        }

        fn backend(&self) -> &'static str {
            "memory"
        }
    }
}
