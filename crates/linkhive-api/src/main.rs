//! linkhive-api - per-tenant worker HTTP endpoint for linkhive.
//!
//! Surface:
//! - `GET /worker?store_id=<id>[&ingest=<url>]` — wake the tenant's
//!   worker; with `ingest`, also create a link (idempotent on URL)
//! - `POST /worker/sync?store_id=<id>` — internal RPC from the sync
//!   backend pushing a batch of newly-available events
//! - `GET /health` — liveness probe

mod registry;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linkhive_core::{defaults, Error, SyncPayload};
use linkhive_enrich::{
    HttpContentExtractor, HttpMetadataFetcher, OllamaSummarizer, StaticTenantSettings,
};
use linkhive_pipeline::{Enrichers, WorkerConfig};
use linkhive_store::MemorySyncBackend;

use registry::WorkerRegistry;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    registry: Arc<WorkerRegistry>,
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn health() -> Json<Value> {
    Json(json!({
        "service": "linkhive-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Deserialize)]
struct WorkerParams {
    /// Tenant identifier. `storeId` accepted for wire compatibility.
    #[serde(default, alias = "storeId")]
    store_id: Option<String>,
    /// URL to ingest; absent means wake-only.
    #[serde(default)]
    ingest: Option<String>,
}

/// Wake (and optionally ingest into) a tenant's worker.
async fn worker_handler(
    State(state): State<AppState>,
    Query(params): Query<WorkerParams>,
) -> (StatusCode, Json<Value>) {
    let Some(store_id) = params.store_id.as_deref().filter(|s| !s.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing store_id" })),
        );
    };

    let worker = match state.registry.get_or_create(store_id).await {
        Ok(worker) => worker,
        Err(e) => return error_response(e),
    };

    match params.ingest.as_deref() {
        Some(url) => match worker.ingest(store_id, url).await {
            Ok(outcome) => (
                StatusCode::OK,
                Json(json!({
                    "linkId": outcome.link_id(),
                    "status": outcome.status(),
                })),
            ),
            Err(e) => error_response(e),
        },
        None => {
            if let Err(e) = worker.ensure_initialized(store_id).await {
                return error_response(e);
            }
            if let Err(e) = worker.ensure_subscribed().await {
                return error_response(e);
            }
            (StatusCode::OK, Json(json!({ "status": "awake" })))
        }
    }
}

#[derive(Debug, Deserialize)]
struct SyncParams {
    #[serde(default, alias = "storeId")]
    store_id: Option<String>,
}

/// Internal RPC: the sync backend pushes newly-committed events so a
/// cold worker processes new links promptly. Best-effort — correctness
/// comes from the pending view once the worker is awake.
async fn sync_handler(
    State(state): State<AppState>,
    Query(params): Query<SyncParams>,
    Json(payload): Json<SyncPayload>,
) -> (StatusCode, Json<Value>) {
    let Some(store_id) = params.store_id.as_deref().filter(|s| !s.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing store_id" })),
        );
    };

    let worker = match state.registry.get_or_create(store_id).await {
        Ok(worker) => worker,
        Err(e) => return error_response(e),
    };

    match worker.on_sync_update(payload).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "applied" }))),
        Err(e) => error_response(e),
    }
}

fn error_response(e: Error) -> (StatusCode, Json<Value>) {
    let status = match &e {
        Error::InvalidUrl(_) | Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::StoreMismatch { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() })))
}

// =============================================================================
// ROUTER / MAIN
// =============================================================================

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/worker", get(worker_handler))
        .route("/worker/sync", post(sync_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(defaults::SERVER_PORT);
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| defaults::DATA_DIR.to_string());

    let enrichers = Enrichers {
        metadata: Arc::new(HttpMetadataFetcher::new()?),
        extractor: Arc::new(HttpContentExtractor::new()?),
        summarizer: Arc::new(OllamaSummarizer::from_env()),
        settings: Arc::new(StaticTenantSettings::from_env()),
    };
    let registry = WorkerRegistry::new(
        PathBuf::from(data_dir),
        Arc::new(MemorySyncBackend::new()),
        enrichers,
        WorkerConfig::from_env(),
    );
    let app = router(AppState {
        registry: Arc::new(registry),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "linkhive worker listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
