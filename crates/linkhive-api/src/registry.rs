//! Per-tenant worker registry.
//!
//! Maps `store_id` → live [`LinkWorker`] instance, creating workers
//! lazily on first wake. The sync route reaches a tenant's actor through
//! this registry — an explicit typed handle, not ambient global state.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use linkhive_core::{DurableState, Error, Result, SyncBackend};
use linkhive_pipeline::{Enrichers, LinkWorker, WorkerConfig};
use linkhive_store::FileDurableState;

/// Lazily-populated map of tenant workers.
pub struct WorkerRegistry {
    data_dir: PathBuf,
    backend: Arc<dyn SyncBackend>,
    enrichers: Enrichers,
    config: WorkerConfig,
    workers: RwLock<HashMap<String, Arc<LinkWorker>>>,
}

impl WorkerRegistry {
    pub fn new(
        data_dir: PathBuf,
        backend: Arc<dyn SyncBackend>,
        enrichers: Enrichers,
        config: WorkerConfig,
    ) -> Self {
        Self {
            data_dir,
            backend,
            enrichers,
            config,
            workers: RwLock::new(HashMap::new()),
        }
    }

    /// Get the tenant's worker, creating it cold on first wake. The
    /// worker decides for itself whether it can recover persisted state.
    pub async fn get_or_create(&self, store_id: &str) -> Result<Arc<LinkWorker>> {
        validate_store_id(store_id)?;

        if let Some(worker) = self.workers.read().await.get(store_id) {
            return Ok(Arc::clone(worker));
        }

        let mut workers = self.workers.write().await;
        // Another wake may have won the race for the write lock.
        if let Some(worker) = workers.get(store_id) {
            return Ok(Arc::clone(worker));
        }

        debug!(store_id, "creating worker instance");
        let durable: Arc<dyn DurableState> = Arc::new(FileDurableState::new(
            self.data_dir.join(format!("{}.json", store_id)),
        ));
        let worker = LinkWorker::new(
            Arc::clone(&self.backend),
            durable,
            self.enrichers.clone(),
            self.config.clone(),
        );
        workers.insert(store_id.to_string(), Arc::clone(&worker));
        Ok(worker)
    }
}

/// Store ids name durable-state files; restrict them to a safe alphabet.
fn validate_store_id(store_id: &str) -> Result<()> {
    if store_id.is_empty() || store_id.len() > 128 {
        return Err(Error::InvalidInput(format!(
            "store_id must be 1-128 characters, got {}",
            store_id.len()
        )));
    }
    if !store_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::InvalidInput(
            "store_id may only contain alphanumerics, '-', and '_'".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use linkhive_enrich::{
        MockContentExtractor, MockMetadataFetcher, MockSummarizer, StaticTenantSettings,
    };
    use linkhive_store::MemorySyncBackend;

    fn registry(dir: &std::path::Path) -> WorkerRegistry {
        let enrichers = Enrichers {
            metadata: Arc::new(MockMetadataFetcher::new()),
            extractor: Arc::new(MockContentExtractor::new()),
            summarizer: Arc::new(MockSummarizer::new()),
            settings: Arc::new(StaticTenantSettings::with_ai_summary(false)),
        };
        WorkerRegistry::new(
            dir.to_path_buf(),
            Arc::new(MemorySyncBackend::new()),
            enrichers,
            WorkerConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_same_store_id_returns_same_worker() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(dir.path());

        let a = registry.get_or_create("tenant-a").await.unwrap();
        let b = registry.get_or_create("tenant-a").await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_distinct_tenants_get_distinct_workers() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(dir.path());

        let a = registry.get_or_create("tenant-a").await.unwrap();
        let b = registry.get_or_create("tenant-b").await.unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_store_id_alphabet_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(dir.path());

        for bad in ["", "../escape", "a/b", "a b", &"x".repeat(200)] {
            let result = registry.get_or_create(bad).await;
            assert!(
                matches!(result, Err(Error::InvalidInput(_))),
                "accepted {:?}",
                bad
            );
        }
        assert!(registry.get_or_create("tenant_A-1").await.is_ok());
    }
}
