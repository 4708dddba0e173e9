//! Durable scalar storage for actor instance state.
//!
//! A worker survives process recycling through exactly two persisted
//! keys: the sync session identifier and the tenant/store identifier.
//! Both are written once and read on every cold start.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use linkhive_core::{DurableState, Error, Result};

/// Durable storage key for the sync session identifier.
pub const KEY_SESSION_ID: &str = "session_id";

/// Durable storage key for the tenant/store identifier.
pub const KEY_STORE_ID: &str = "store_id";

/// File-backed durable state: one JSON object of string keys per actor
/// instance.
pub struct FileDurableState {
    path: PathBuf,
}

impl FileDurableState {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_map(&self) -> Result<HashMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| Error::Storage(format!("corrupt state file: {}", e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(Error::Storage(format!("read failed: {}", e))),
        }
    }
}

#[async_trait]
impl DurableState for FileDurableState {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map().await?.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage(format!("create dir failed: {}", e)))?;
        }

        // Write-then-rename so a crash mid-write never truncates the
        // existing state file.
        let tmp = self.path.with_extension("tmp");
        let raw = serde_json::to_string_pretty(&map)?;
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| Error::Storage(format!("write failed: {}", e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::Storage(format!("rename failed: {}", e)))?;
        Ok(())
    }
}

/// In-memory durable state for tests.
#[derive(Default)]
pub struct MemoryDurableState {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryDurableState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a key, simulating state left behind by a previous
    /// process lifetime.
    pub fn seeded(key: &str, value: &str) -> Self {
        let state = Self::default();
        state
            .map
            .lock()
            .expect("durable state poisoned")
            .insert(key.to_string(), value.to_string());
        state
    }
}

#[async_trait]
impl DurableState for MemoryDurableState {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .map
            .lock()
            .expect("durable state poisoned")
            .get(key)
            .cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.map
            .lock()
            .expect("durable state poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_durable_roundtrip() {
        let state = MemoryDurableState::new();
        assert!(state.get(KEY_SESSION_ID).await.unwrap().is_none());

        state.put(KEY_SESSION_ID, "session-1").await.unwrap();
        assert_eq!(
            state.get(KEY_SESSION_ID).await.unwrap().as_deref(),
            Some("session-1")
        );
    }

    #[tokio::test]
    async fn test_memory_durable_seeded() {
        let state = MemoryDurableState::seeded(KEY_STORE_ID, "tenant-a");
        assert_eq!(
            state.get(KEY_STORE_ID).await.unwrap().as_deref(),
            Some("tenant-a")
        );
    }

    #[tokio::test]
    async fn test_file_durable_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worker.json");

        let state = FileDurableState::new(&path);
        assert!(state.get(KEY_STORE_ID).await.unwrap().is_none());

        state.put(KEY_STORE_ID, "tenant-a").await.unwrap();
        state.put(KEY_SESSION_ID, "session-1").await.unwrap();

        // A fresh handle over the same path sees both keys.
        let reopened = FileDurableState::new(&path);
        assert_eq!(
            reopened.get(KEY_STORE_ID).await.unwrap().as_deref(),
            Some("tenant-a")
        );
        assert_eq!(
            reopened.get(KEY_SESSION_ID).await.unwrap().as_deref(),
            Some("session-1")
        );
    }

    #[tokio::test]
    async fn test_file_durable_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("worker.json");

        let state = FileDurableState::new(&path);
        state.put(KEY_STORE_ID, "tenant-a").await.unwrap();
        assert_eq!(
            state.get(KEY_STORE_ID).await.unwrap().as_deref(),
            Some("tenant-a")
        );
    }
}
