//! Durable worker actor: one per tenant, owner of that tenant's replica
//! and concurrency guard.
//!
//! The actor survives process recycling through two durably-persisted
//! scalars (`session_id`, `store_id`). Startup is two-phase — load the
//! persisted identity, then open the replica — so cold and warm starts
//! share one code path. Wakes arrive three ways: an ingest request, a
//! plain worker ping, or a sync push; all of them funnel into
//! `ensure_initialized`/`ensure_subscribed`, which are idempotent.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, instrument, trace};
use uuid::Uuid;

use linkhive_core::{
    defaults, new_v7, ContentExtractor, DurableState, Error, MetadataFetcher, ProcessingState,
    Result, Summarizer, SyncBackend, SyncPayload, TenantSettings,
};
use linkhive_store::{PendingSnapshot, Replica, KEY_SESSION_ID, KEY_STORE_ID};

use crate::config::WorkerConfig;
use crate::guard::ProcessingGuard;
use crate::ingest::{self, IngestOutcome};
use crate::processor::{self, JobEnv, JobOutcome};

/// The enrichment collaborators a worker drives.
#[derive(Clone)]
pub struct Enrichers {
    pub metadata: Arc<dyn MetadataFetcher>,
    pub extractor: Arc<dyn ContentExtractor>,
    pub summarizer: Arc<dyn Summarizer>,
    pub settings: Arc<dyn TenantSettings>,
}

/// Event emitted by the worker for downstream observers.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// The pending-work subscription is live.
    Subscribed,
    /// A processing attempt was dispatched.
    JobStarted { link_id: Uuid, is_retry: bool },
    /// An attempt reached `ProcessingCompleted`.
    JobCompleted { link_id: Uuid },
    /// An attempt reached `ProcessingFailed`.
    JobFailed { link_id: Uuid, error: String },
}

/// Initialization state, serialized behind one async mutex so concurrent
/// wakes observe a consistent replica.
#[derive(Default)]
struct ActorState {
    store_id: Option<String>,
    replica: Option<Arc<Replica>>,
    subscribed: bool,
}

/// Per-tenant durable worker.
pub struct LinkWorker {
    backend: Arc<dyn SyncBackend>,
    durable: Arc<dyn DurableState>,
    enrichers: Enrichers,
    config: WorkerConfig,
    guard: Arc<ProcessingGuard>,
    state: Mutex<ActorState>,
    /// Serializes the check-then-commit inside ingest so concurrent
    /// ingests of the same URL cannot both miss the dedup lookup.
    ingest_lock: Mutex<()>,
    event_tx: broadcast::Sender<WorkerEvent>,
}

impl LinkWorker {
    pub fn new(
        backend: Arc<dyn SyncBackend>,
        durable: Arc<dyn DurableState>,
        enrichers: Enrichers,
        config: WorkerConfig,
    ) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(defaults::EVENT_BUS_CAPACITY);
        Arc::new(Self {
            backend,
            durable,
            enrichers,
            config,
            guard: ProcessingGuard::new(),
            state: Mutex::new(ActorState::default()),
            ingest_lock: Mutex::new(()),
            event_tx,
        })
    }

    /// Get a receiver for worker events.
    pub fn events(&self) -> broadcast::Receiver<WorkerEvent> {
        self.event_tx.subscribe()
    }

    /// Number of attempts currently in flight in this process.
    pub fn active_jobs(&self) -> usize {
        self.guard.active_count()
    }

    /// The live replica, if this worker has initialized.
    pub async fn replica(&self) -> Option<Arc<Replica>> {
        self.state.lock().await.replica.as_ref().map(Arc::clone)
    }

    /// Idempotently bind this worker to a tenant and open its replica.
    ///
    /// The first call for a process lifetime loads (or mints and
    /// persists) the session identifier, persists the tenant binding,
    /// and opens the replica. Later calls with the same `store_id` are
    /// no-ops; a different `store_id` is an error — one worker instance
    /// is permanently bound to one tenant.
    pub async fn ensure_initialized(&self, store_id: &str) -> Result<Arc<Replica>> {
        let mut state = self.state.lock().await;
        self.initialize_locked(&mut state, store_id).await
    }

    async fn initialize_locked(
        &self,
        state: &mut ActorState,
        store_id: &str,
    ) -> Result<Arc<Replica>> {
        if let Some(replica) = &state.replica {
            let bound = state.store_id.as_deref().unwrap_or_default();
            if bound != store_id {
                return Err(Error::StoreMismatch {
                    bound: bound.to_string(),
                    requested: store_id.to_string(),
                });
            }
            return Ok(Arc::clone(replica));
        }

        // The persisted binding survives restarts and outlives in-memory
        // state: a recycled worker must come back on the same tenant.
        if let Some(persisted) = self.durable.get(KEY_STORE_ID).await? {
            if persisted != store_id {
                return Err(Error::StoreMismatch {
                    bound: persisted,
                    requested: store_id.to_string(),
                });
            }
        }

        let session_id = match self.durable.get(KEY_SESSION_ID).await? {
            Some(session_id) => {
                debug!(session_id = %session_id, "resuming persisted session");
                session_id
            }
            None => {
                let minted = new_v7().to_string();
                self.durable.put(KEY_SESSION_ID, &minted).await?;
                debug!(session_id = %minted, "minted new session");
                minted
            }
        };
        // Both scalars are durable before the open: a failed open leaves
        // persisted state valid and the next wake retries cleanly.
        self.durable.put(KEY_STORE_ID, store_id).await?;

        let replica =
            Arc::new(Replica::open(Arc::clone(&self.backend), store_id, &session_id).await?);
        state.store_id = Some(store_id.to_string());
        state.replica = Some(Arc::clone(&replica));
        info!(store_id, "worker initialized");
        Ok(replica)
    }

    /// Idempotently establish the pending-work subscription.
    ///
    /// Tolerates being called before initialization: the tenant binding
    /// is recovered from durable storage when absent in memory.
    pub async fn ensure_subscribed(self: &Arc<Self>) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.subscribed {
            return Ok(());
        }

        let replica = match state.replica.clone() {
            Some(replica) => replica,
            None => {
                let store_id = self.durable.get(KEY_STORE_ID).await?.ok_or_else(|| {
                    Error::Store("no tenant bound; nothing to subscribe to".to_string())
                })?;
                self.initialize_locked(&mut state, &store_id).await?
            }
        };

        if !self.config.enabled {
            info!("link worker disabled; subscription skipped");
            state.subscribed = true;
            return Ok(());
        }

        self.spawn_consumer(replica);
        state.subscribed = true;
        let _ = self.event_tx.send(WorkerEvent::Subscribed);
        Ok(())
    }

    /// Wake path from the sync backend: new events are available.
    ///
    /// Recovers the tenant binding from durable storage when this
    /// process instance has none in memory (post-hibernation wake with
    /// no prior HTTP request). With no recoverable binding there is
    /// nothing to process: log and return.
    #[instrument(skip(self, payload), fields(event_count = payload.events.len()))]
    pub async fn on_sync_update(self: &Arc<Self>, payload: SyncPayload) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            let replica = match state.replica.clone() {
                Some(replica) => replica,
                None => match self.durable.get(KEY_STORE_ID).await? {
                    Some(store_id) => {
                        info!(store_id = %store_id, "recovered tenant binding from durable storage");
                        self.initialize_locked(&mut state, &store_id).await?
                    }
                    None => {
                        info!("sync push before any tenant binding; ignoring");
                        return Ok(());
                    }
                },
            };
            replica.apply_remote(&payload.events).await;
        }
        self.ensure_subscribed().await
    }

    /// Ingest a URL for this tenant. Also a legitimate wake path:
    /// initialization and subscription are ensured first.
    pub async fn ingest(self: &Arc<Self>, store_id: &str, raw_url: &str) -> Result<IngestOutcome> {
        let replica = self.ensure_initialized(store_id).await?;
        self.ensure_subscribed().await?;

        let _serial = self.ingest_lock.lock().await;
        ingest::create_link(&replica, raw_url).await
    }

    /// One consumer task per worker drains pending-work snapshots and
    /// dispatches unguarded ids as independent jobs.
    fn spawn_consumer(self: &Arc<Self>, replica: Arc<Replica>) {
        let worker = Arc::clone(self);
        tokio::spawn(async move {
            let mut rx = replica.subscribe_pending();
            loop {
                let snapshot = rx.borrow_and_update().clone();
                worker.dispatch(&replica, snapshot).await;
                if rx.changed().await.is_err() {
                    debug!("pending view closed; consumer exiting");
                    break;
                }
            }
        });
    }

    /// Dispatch policy per snapshot: skip guarded ids, mark the rest,
    /// spawn one job each. `is_retry` distinguishes "never started" from
    /// "started but the process died mid-flight before this snapshot".
    async fn dispatch(self: &Arc<Self>, replica: &Arc<Replica>, snapshot: PendingSnapshot) {
        if snapshot.is_empty() {
            return;
        }
        debug!(pending_count = snapshot.len(), "dispatching pending links");

        for link_id in snapshot.iter() {
            let Some(token) = self.guard.acquire(link_id) else {
                trace!(link_id = %link_id, "attempt already in flight; skipping");
                continue;
            };

            let Some(link) = replica.link(link_id).await else {
                continue;
            };
            let is_retry = matches!(
                replica.processing_status(link_id).await,
                Some(row) if row.status == ProcessingState::Pending
            );

            let env = JobEnv {
                replica: Arc::clone(replica),
                metadata: Arc::clone(&self.enrichers.metadata),
                extractor: Arc::clone(&self.enrichers.extractor),
                summarizer: Arc::clone(&self.enrichers.summarizer),
                settings: Arc::clone(&self.enrichers.settings),
                store_id: replica.store_id().to_string(),
                summary_input_cap: self.config.summary_input_cap,
            };
            let worker = Arc::clone(self);
            tokio::spawn(async move {
                // Held for the whole attempt; released on drop whatever
                // the outcome.
                let _token = token;
                let _ = worker
                    .event_tx
                    .send(WorkerEvent::JobStarted { link_id, is_retry });
                match processor::process_link(&env, &link, is_retry).await {
                    JobOutcome::Completed => {
                        let _ = worker.event_tx.send(WorkerEvent::JobCompleted { link_id });
                    }
                    JobOutcome::Failed { classification } => {
                        let _ = worker.event_tx.send(WorkerEvent::JobFailed {
                            link_id,
                            error: classification,
                        });
                    }
                }
            });
        }
    }
}
