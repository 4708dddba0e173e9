//! # linkhive-core
//!
//! Core types, traits, and abstractions for linkhive.
//!
//! This crate provides the foundational data structures and trait
//! definitions that other linkhive crates depend on: the replicated-table
//! models, the event log schema, and the collaborator seams (sync
//! backend, durable storage, enrichment services).

pub mod defaults;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{LogEvent, SyncPayload};
pub use models::{
    ExtractedContent, Link, LinkStatus, MetadataSnapshot, PageMetadata, ProcessingState,
    ProcessingStatus, Summary, TenantFeatures,
};
pub use traits::{
    ContentExtractor, DurableState, MetadataFetcher, Summarizer, SyncBackend, TenantSettings,
};
pub use uuid_utils::{extract_timestamp, new_v7};
