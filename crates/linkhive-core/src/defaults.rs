//! Centralized default constants for the linkhive system.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3400;

/// Default root directory for per-tenant durable state files.
pub const DATA_DIR: &str = "./data";

// =============================================================================
// WORKER
// =============================================================================

/// Capacity of the worker event broadcast channel.
pub const EVENT_BUS_CAPACITY: usize = 256;

// =============================================================================
// ENRICHMENT
// =============================================================================

/// HTTP timeout for metadata fetch and content extraction requests.
pub const FETCH_TIMEOUT_SECS: u64 = 30;

/// Maximum redirects followed when fetching a page.
pub const FETCH_MAX_REDIRECTS: usize = 5;

/// Browser-like User-Agent; some sites reject obvious bot agents.
pub const FETCH_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// =============================================================================
// SUMMARIZATION
// =============================================================================

/// Maximum characters of extracted text handed to the summarizer,
/// bounding downstream context usage.
pub const SUMMARY_INPUT_CAP: usize = 4000;

/// Target maximum summary length in characters.
pub const SUMMARY_MAX_LENGTH: usize = 500;

/// Default Ollama API base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default generation model for summaries.
pub const GEN_MODEL: &str = "llama3.2";

/// Timeout for one generation request.
pub const GEN_TIMEOUT_SECS: u64 = 120;
