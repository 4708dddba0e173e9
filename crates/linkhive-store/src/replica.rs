//! Local replica of a tenant's event log.
//!
//! The replica materializes the append-only log into queryable tables
//! (links, processing status, metadata snapshots, summaries) and exposes
//! the live pending-work view as a watch channel. All pipeline writes go
//! through [`Replica::commit`], which appends to the backend log first
//! and only then applies locally — the view can never fire on a snapshot
//! staler than an event this replica just committed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tracing::{debug, instrument, trace};
use uuid::Uuid;

use linkhive_core::{
    Link, LinkStatus, LogEvent, MetadataSnapshot, ProcessingState, ProcessingStatus, Result,
    Summary, SyncBackend,
};

use crate::pending::PendingSnapshot;

/// Materialized tables, keyed by link id.
#[derive(Default)]
struct Tables {
    links: HashMap<Uuid, Link>,
    processing: HashMap<Uuid, ProcessingStatus>,
    metadata: HashMap<Uuid, Vec<MetadataSnapshot>>,
    summaries: HashMap<Uuid, Vec<Summary>>,
}

impl Tables {
    /// Replay one event into the tables.
    ///
    /// Replay-tolerant: a link creation seen twice keeps the first row,
    /// status transitions upsert the single row per link.
    fn apply(&mut self, event: &LogEvent) {
        trace!(event_type = event.event_type(), "applying event");
        match event {
            LogEvent::LinkCreated {
                id,
                url,
                domain,
                created_at,
            } => {
                self.links.entry(*id).or_insert_with(|| Link {
                    id: *id,
                    url: url.clone(),
                    domain: domain.clone(),
                    status: LinkStatus::Unread,
                    created_at: *created_at,
                    completed_at: None,
                    deleted_at: None,
                });
            }
            LogEvent::ProcessingStarted {
                link_id,
                updated_at,
            } => {
                self.processing.insert(
                    *link_id,
                    ProcessingStatus {
                        link_id: *link_id,
                        status: ProcessingState::Pending,
                        error: None,
                        updated_at: *updated_at,
                    },
                );
            }
            LogEvent::MetadataFetched {
                id,
                link_id,
                title,
                description,
                image,
                favicon,
                fetched_at,
            } => {
                self.metadata
                    .entry(*link_id)
                    .or_default()
                    .push(MetadataSnapshot {
                        id: *id,
                        link_id: *link_id,
                        title: title.clone(),
                        description: description.clone(),
                        image: image.clone(),
                        favicon: favicon.clone(),
                        fetched_at: *fetched_at,
                    });
            }
            LogEvent::Summarized {
                id,
                link_id,
                summary,
                model,
                summarized_at,
            } => {
                self.summaries.entry(*link_id).or_default().push(Summary {
                    id: *id,
                    link_id: *link_id,
                    summary: summary.clone(),
                    model: model.clone(),
                    summarized_at: *summarized_at,
                });
            }
            LogEvent::ProcessingCompleted {
                link_id,
                updated_at,
            } => {
                self.processing.insert(
                    *link_id,
                    ProcessingStatus {
                        link_id: *link_id,
                        status: ProcessingState::Completed,
                        error: None,
                        updated_at: *updated_at,
                    },
                );
            }
            LogEvent::ProcessingFailed {
                link_id,
                error,
                updated_at,
            } => {
                self.processing.insert(
                    *link_id,
                    ProcessingStatus {
                        link_id: *link_id,
                        status: ProcessingState::Failed,
                        error: Some(error.clone()),
                        updated_at: *updated_at,
                    },
                );
            }
        }
    }

    fn pending(&self) -> PendingSnapshot {
        PendingSnapshot::compute(self.links.values(), &self.processing)
    }
}

/// One tenant's live replica: materialized tables plus the pending-work
/// watch channel.
pub struct Replica {
    store_id: String,
    session_id: String,
    backend: Arc<dyn SyncBackend>,
    tables: RwLock<Tables>,
    pending_tx: watch::Sender<PendingSnapshot>,
}

impl Replica {
    /// Open a replica, replaying the event stream the sync session hands
    /// back into fresh tables.
    #[instrument(skip(backend), fields(store_id = %store_id))]
    pub async fn open(
        backend: Arc<dyn SyncBackend>,
        store_id: &str,
        session_id: &str,
    ) -> Result<Self> {
        let backlog = backend.open(store_id, session_id).await?;
        debug!(event_count = backlog.len(), "replaying backlog");

        let mut tables = Tables::default();
        for event in &backlog {
            tables.apply(event);
        }
        let (pending_tx, _) = watch::channel(tables.pending());

        Ok(Self {
            store_id: store_id.to_string(),
            session_id: session_id.to_string(),
            backend,
            tables: RwLock::new(tables),
            pending_tx,
        })
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Commit events to the log, then apply them locally.
    ///
    /// The backend append happens first: the store is the writer of
    /// record, and a local state ahead of the log would be unrecoverable
    /// after eviction. The pending view recomputes under the same write
    /// lock, so a snapshot observed after `commit` returns always
    /// reflects the committed events.
    pub async fn commit(&self, events: Vec<LogEvent>) -> Result<()> {
        self.backend
            .commit(&self.store_id, &self.session_id, &events)
            .await?;

        let mut tables = self.tables.write().await;
        for event in &events {
            tables.apply(event);
        }
        self.refresh_pending(&tables);
        Ok(())
    }

    /// Apply a batch pushed by the sync backend (wake path).
    pub async fn apply_remote(&self, events: &[LogEvent]) {
        if events.is_empty() {
            return;
        }
        let mut tables = self.tables.write().await;
        for event in events {
            tables.apply(event);
        }
        self.refresh_pending(&tables);
    }

    fn refresh_pending(&self, tables: &Tables) {
        let next = tables.pending();
        self.pending_tx.send_if_modified(|current| {
            if *current != next {
                *current = next;
                true
            } else {
                false
            }
        });
    }

    /// Subscribe to pending-work snapshots. The receiver holds the
    /// current snapshot immediately; `changed()` resolves on membership
    /// changes only.
    pub fn subscribe_pending(&self) -> watch::Receiver<PendingSnapshot> {
        self.pending_tx.subscribe()
    }

    /// Current pending-work snapshot.
    pub fn pending(&self) -> PendingSnapshot {
        self.pending_tx.borrow().clone()
    }

    pub async fn link(&self, id: Uuid) -> Option<Link> {
        self.tables.read().await.links.get(&id).cloned()
    }

    /// Find an active (non-deleted) link by exact URL string match.
    ///
    /// No normalization: scheme/host-case/trailing-slash variants are
    /// distinct links at this layer.
    pub async fn find_by_url(&self, url: &str) -> Option<Link> {
        self.tables
            .read()
            .await
            .links
            .values()
            .find(|link| link.is_active() && link.url == url)
            .cloned()
    }

    pub async fn processing_status(&self, link_id: Uuid) -> Option<ProcessingStatus> {
        self.tables.read().await.processing.get(&link_id).cloned()
    }

    /// Most recent metadata snapshot for a link, by `fetched_at`.
    pub async fn latest_metadata(&self, link_id: Uuid) -> Option<MetadataSnapshot> {
        self.tables
            .read()
            .await
            .metadata
            .get(&link_id)
            .and_then(|snapshots| snapshots.iter().max_by_key(|s| s.fetched_at).cloned())
    }

    /// Most recent summary for a link, by `summarized_at`.
    pub async fn latest_summary(&self, link_id: Uuid) -> Option<Summary> {
        self.tables
            .read()
            .await
            .summaries
            .get(&link_id)
            .and_then(|summaries| summaries.iter().max_by_key(|s| s.summarized_at).cloned())
    }

    /// All links, active and deleted.
    pub async fn links(&self) -> Vec<Link> {
        let mut links: Vec<Link> = self.tables.read().await.links.values().cloned().collect();
        links.sort_by_key(|link| link.created_at);
        links
    }
}
