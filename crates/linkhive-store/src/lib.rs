//! # linkhive-store
//!
//! Replica materialization and durable state for linkhive.
//!
//! This crate provides:
//! - [`Replica`]: a tenant's local materialization of the append-only
//!   event log, with commit-then-apply write ordering
//! - [`PendingSnapshot`]: the live pending-work view over the replicated
//!   tables, delivered through a watch channel
//! - [`MemorySyncBackend`]: process-local [`SyncBackend`] implementation
//! - [`FileDurableState`] / [`MemoryDurableState`]: the two-key durable
//!   storage actors persist their identity in

pub mod backend;
pub mod durable;
pub mod pending;
pub mod replica;

// Re-export core types
pub use linkhive_core::SyncBackend;

pub use backend::MemorySyncBackend;
pub use durable::{FileDurableState, MemoryDurableState, KEY_SESSION_ID, KEY_STORE_ID};
pub use pending::PendingSnapshot;
pub use replica::Replica;
