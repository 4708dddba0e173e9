//! Structured logging schema and field name constants for linkhive.
//!
//! All crates use these constants for consistent structured logging
//! fields, so log aggregation tools can query by standardized names
//! across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, wake, subscription), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration (pending-set members, log replay) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "api", "store", "pipeline", "enrich"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "replica", "worker", "ingest", "summarizer"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "ingest", "process_link", "commit", "sync_update"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Link UUID being operated on.
pub const LINK_ID: &str = "link_id";

/// Tenant/store identifier the actor is bound to.
pub const STORE_ID: &str = "store_id";

/// Sync session identifier (log position token).
pub const SESSION_ID: &str = "session_id";

/// URL being ingested or enriched.
pub const URL: &str = "url";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of events in a commit or sync batch.
pub const EVENT_COUNT: &str = "event_count";

/// Size of the pending-work set at dispatch time.
pub const PENDING_COUNT: &str = "pending_count";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for summarization.
pub const MODEL: &str = "model";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Whether a job dispatch was a retry of a stuck attempt.
pub const IS_RETRY: &str = "is_retry";
