//! # linkhive-pipeline
//!
//! Durable per-tenant link processing pipeline.
//!
//! This crate provides:
//! - [`LinkWorker`]: the durable worker actor, one per tenant, with
//!   idempotent initialize/subscribe/wake entry points
//! - The processing state machine driving each link through metadata
//!   fetch, content extraction, and summarization, committing exactly
//!   one terminal event per attempt
//! - [`ProcessingGuard`]: per-link in-flight serialization
//! - The ingest gateway, idempotent on URL
//!
//! ## Example
//!
//! ```ignore
//! use linkhive_pipeline::{Enrichers, LinkWorker, WorkerConfig};
//!
//! let worker = LinkWorker::new(backend, durable, enrichers, WorkerConfig::from_env());
//!
//! // Any wake path initializes and subscribes idempotently.
//! let outcome = worker.ingest("tenant-a", "https://example.com/post").await?;
//! println!("{}: {}", outcome.status(), outcome.link_id());
//!
//! // Observe job lifecycle events.
//! let mut events = worker.events();
//! while let Ok(event) = events.recv().await {
//!     println!("{:?}", event);
//! }
//! ```

pub mod actor;
pub mod config;
pub mod guard;
pub mod ingest;
pub mod processor;

// Re-export core types
pub use linkhive_core::*;

pub use actor::{Enrichers, LinkWorker, WorkerEvent};
pub use config::WorkerConfig;
pub use guard::{GuardToken, ProcessingGuard};
pub use ingest::IngestOutcome;
pub use processor::{JobEnv, JobOutcome};
