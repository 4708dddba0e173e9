//! In-memory sync backend.
//!
//! Process-local implementation of [`SyncBackend`] used by tests and
//! single-node deployments. A production deployment substitutes a remote
//! backend speaking the real sync protocol; the pipeline only sees the
//! trait.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use linkhive_core::{Error, LogEvent, Result, SyncBackend};

#[derive(Default)]
struct MemoryState {
    /// Append-only log per store.
    logs: HashMap<String, Vec<LogEvent>>,
    /// Last log position each session has observed, by (store, session).
    /// Bookkeeping only; `open` always serves a full materialization.
    positions: HashMap<(String, String), usize>,
}

/// Shared in-memory event log.
#[derive(Default)]
pub struct MemorySyncBackend {
    state: Mutex<MemoryState>,
    fail_commits: AtomicBool,
}

impl MemorySyncBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent commit fail, simulating a store outage.
    pub fn set_fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Full committed log for a store (test inspection).
    pub fn log(&self, store_id: &str) -> Vec<LogEvent> {
        self.state
            .lock()
            .expect("backend state poisoned")
            .logs
            .get(store_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Count committed events matching a predicate (test inspection).
    pub fn count_events(&self, store_id: &str, matches: impl Fn(&LogEvent) -> bool) -> usize {
        self.log(store_id).iter().filter(|e| matches(e)).count()
    }
}

#[async_trait]
impl SyncBackend for MemorySyncBackend {
    async fn open(&self, store_id: &str, session_id: &str) -> Result<Vec<LogEvent>> {
        let mut state = self.state.lock().expect("backend state poisoned");
        let log = state
            .logs
            .get(store_id)
            .cloned()
            .unwrap_or_default();
        let key = (store_id.to_string(), session_id.to_string());
        let resumed = state.positions.contains_key(&key);
        state.positions.insert(key, log.len());
        debug!(
            store_id,
            session_id,
            event_count = log.len(),
            resumed,
            "session opened"
        );
        Ok(log)
    }

    async fn commit(&self, store_id: &str, session_id: &str, events: &[LogEvent]) -> Result<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(Error::Store("commit rejected by backend".to_string()));
        }

        let mut state = self.state.lock().expect("backend state poisoned");
        let log = state.logs.entry(store_id.to_string()).or_default();
        log.extend_from_slice(events);
        let len = log.len();
        state
            .positions
            .insert((store_id.to_string(), session_id.to_string()), len);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn created(url: &str) -> LogEvent {
        LogEvent::LinkCreated {
            id: Uuid::new_v4(),
            url: url.to_string(),
            domain: "example.com".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_open_serves_full_materialization() {
        let backend = MemorySyncBackend::new();
        backend
            .commit("store-a", "writer", &[created("https://example.com/1")])
            .await
            .unwrap();
        backend
            .commit("store-a", "writer", &[created("https://example.com/2")])
            .await
            .unwrap();

        let events = backend.open("store-a", "reader").await.unwrap();
        assert_eq!(events.len(), 2);

        // Reopening the same session reconstructs the same tables.
        let again = backend.open("store-a", "reader").await.unwrap();
        assert_eq!(again, events);
    }

    #[tokio::test]
    async fn test_commit_appends_in_order() {
        let backend = MemorySyncBackend::new();
        let first = created("https://example.com/1");
        let second = created("https://example.com/2");
        backend
            .commit("store-a", "writer", &[first.clone()])
            .await
            .unwrap();
        backend
            .commit("store-a", "writer", &[second.clone()])
            .await
            .unwrap();

        assert_eq!(backend.log("store-a"), vec![first, second]);
    }

    #[tokio::test]
    async fn test_stores_are_isolated() {
        let backend = MemorySyncBackend::new();
        backend
            .commit("store-a", "writer", &[created("https://example.com/1")])
            .await
            .unwrap();

        let events = backend.open("store-b", "reader").await.unwrap();
        assert!(events.is_empty());
        assert_eq!(backend.log("store-a").len(), 1);
    }

    #[tokio::test]
    async fn test_commit_failure_injection() {
        let backend = MemorySyncBackend::new();
        backend.set_fail_commits(true);

        let result = backend
            .commit("store-a", "writer", &[created("https://example.com/1")])
            .await;
        assert!(matches!(result, Err(Error::Store(_))));
        assert!(backend.log("store-a").is_empty());

        backend.set_fail_commits(false);
        backend
            .commit("store-a", "writer", &[created("https://example.com/1")])
            .await
            .unwrap();
        assert_eq!(backend.log("store-a").len(), 1);
    }

    #[tokio::test]
    async fn test_count_events() {
        let backend = MemorySyncBackend::new();
        backend
            .commit(
                "store-a",
                "writer",
                &[
                    created("https://example.com/1"),
                    LogEvent::ProcessingCompleted {
                        link_id: Uuid::new_v4(),
                        updated_at: Utc::now(),
                    },
                ],
            )
            .await
            .unwrap();

        let terminal = backend.count_events("store-a", |e| e.is_terminal());
        assert_eq!(terminal, 1);
    }
}
