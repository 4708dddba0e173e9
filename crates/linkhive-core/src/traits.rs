//! Core traits for linkhive abstractions.
//!
//! These traits define the seams to external collaborators — the sync
//! backend, durable storage, and the enrichment services — enabling
//! pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::events::LogEvent;
use crate::models::{ExtractedContent, PageMetadata, TenantFeatures};

// =============================================================================
// SYNC BACKEND
// =============================================================================

/// Opaque interface to the replicated event-sourced store.
///
/// The store owns write-conflict resolution and cross-client propagation;
/// the pipeline only commits events and replays what the backend hands
/// back. A session identifier names this worker's position in the log so
/// a restarted process resumes instead of replaying from the beginning.
#[async_trait]
pub trait SyncBackend: Send + Sync {
    /// Open or resume a sync session against a tenant's log.
    ///
    /// Returns the event stream needed to materialize the tenant's
    /// tables. A backend that recognizes `session_id` may serve a
    /// compacted checkpoint plus tail instead of replaying the raw log
    /// from the beginning; either way the returned events reconstruct
    /// the same tables.
    async fn open(&self, store_id: &str, session_id: &str) -> Result<Vec<LogEvent>>;

    /// Durably append a batch of events to the tenant's log.
    async fn commit(&self, store_id: &str, session_id: &str, events: &[LogEvent]) -> Result<()>;
}

// =============================================================================
// DURABLE STORAGE
// =============================================================================

/// Scalar key/value storage that survives process recycling.
///
/// The worker persists exactly two keys (`session_id`, `store_id`) —
/// the only cross-restart state the actor depends on.
#[async_trait]
pub trait DurableState: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn put(&self, key: &str, value: &str) -> Result<()>;
}

// =============================================================================
// ENRICHMENT COLLABORATORS
// =============================================================================

/// Fetches title/description/image/favicon metadata for a URL.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Fetch page metadata. Every field of the result is independently
    /// nullable; partial metadata is valid.
    async fn fetch(&self, url: &str) -> Result<PageMetadata>;
}

/// Extracts the readable main content of a page.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Extract full content. `Ok(None)` means the page yielded nothing
    /// usable (non-HTML, empty body) without being an error.
    async fn extract(&self, url: &str) -> Result<Option<ExtractedContent>>;
}

/// Generates a short summary of extracted text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Model identifier recorded on committed summaries.
    fn model(&self) -> &str;

    /// Summarize `text`, targeting roughly `max_chars` output characters.
    /// `Ok(None)` means the model produced nothing usable.
    async fn summarize(&self, text: &str, max_chars: usize) -> Result<Option<String>>;
}

/// Per-tenant settings lookup.
#[async_trait]
pub trait TenantSettings: Send + Sync {
    /// Read the tenant's feature flags. Read per-job, not cached across
    /// jobs, since flags can change between enqueue and run.
    async fn features(&self, tenant_id: &str) -> Result<TenantFeatures>;
}
