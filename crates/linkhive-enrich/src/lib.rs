//! # linkhive-enrich
//!
//! Enrichment collaborators for linkhive.
//!
//! This crate provides the three external-facing enrichment services the
//! pipeline drives, plus deterministic mocks:
//! - [`HttpMetadataFetcher`]: OpenGraph/meta-tag scraping
//! - [`HttpContentExtractor`]: readable main-content extraction
//! - [`OllamaSummarizer`]: AI summaries via the Ollama generation API
//! - [`StaticTenantSettings`]: process-wide tenant feature flags
//! - [`mock`]: call-logging mocks with failure injection

pub mod extract;
pub mod metadata;
pub mod mock;
pub mod settings;
pub mod summarizer;

// Re-export core types
pub use linkhive_core::{
    ContentExtractor, ExtractedContent, MetadataFetcher, PageMetadata, Summarizer, TenantFeatures,
    TenantSettings,
};

pub use extract::HttpContentExtractor;
pub use metadata::HttpMetadataFetcher;
pub use mock::{MockContentExtractor, MockMetadataFetcher, MockSummarizer};
pub use settings::StaticTenantSettings;
pub use summarizer::OllamaSummarizer;
