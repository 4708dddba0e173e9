//! Mock enrichment collaborators for deterministic testing.
//!
//! Each mock records its calls, can inject failures, and can simulate
//! latency, so pipeline tests can assert exactly which enrichment steps
//! ran and drive in-flight concurrency scenarios.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use linkhive_core::{
    ContentExtractor, Error, ExtractedContent, MetadataFetcher, PageMetadata, Result, Summarizer,
};

#[derive(Default)]
struct MockState {
    calls: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl MockState {
    fn record(&self, input: &str) {
        self.calls
            .lock()
            .expect("mock call log poisoned")
            .push(input.to_string());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("mock call log poisoned").clone()
    }

    fn failing(&self) -> bool {
        self.fail.load(Ordering::SeqCst)
    }
}

// =============================================================================
// METADATA
// =============================================================================

/// Mock metadata fetcher with a fixed response.
#[derive(Clone, Default)]
pub struct MockMetadataFetcher {
    state: Arc<MockState>,
    metadata: PageMetadata,
    latency: Option<Duration>,
}

impl MockMetadataFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with the given metadata.
    pub fn with_metadata(mut self, metadata: PageMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Respond with a populated title/description.
    pub fn with_title(self, title: &str) -> Self {
        self.with_metadata(PageMetadata {
            title: Some(title.to_string()),
            description: Some(format!("Description of {}", title)),
            ..Default::default()
        })
    }

    /// Fail every fetch.
    pub fn failing(self) -> Self {
        self.state.fail.store(true, Ordering::SeqCst);
        self
    }

    /// Sleep before responding, keeping jobs in flight.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.calls()
    }

    pub fn call_count(&self) -> usize {
        self.state.calls().len()
    }
}

#[async_trait]
impl MetadataFetcher for MockMetadataFetcher {
    async fn fetch(&self, url: &str) -> Result<PageMetadata> {
        self.state.record(url);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.state.failing() {
            return Err(Error::Enrichment("mock metadata failure".to_string()));
        }
        Ok(self.metadata.clone())
    }
}

// =============================================================================
// EXTRACTION
// =============================================================================

/// Mock content extractor with a fixed response.
#[derive(Clone, Default)]
pub struct MockContentExtractor {
    state: Arc<MockState>,
    text: Option<String>,
}

impl MockContentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with the given extracted text.
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Respond with `Ok(None)` — page yielded nothing usable.
    pub fn empty(mut self) -> Self {
        self.text = None;
        self
    }

    /// Fail every extraction.
    pub fn failing(self) -> Self {
        self.state.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn call_count(&self) -> usize {
        self.state.calls().len()
    }
}

#[async_trait]
impl ContentExtractor for MockContentExtractor {
    async fn extract(&self, url: &str) -> Result<Option<ExtractedContent>> {
        self.state.record(url);
        if self.state.failing() {
            return Err(Error::Enrichment("mock extraction failure".to_string()));
        }
        Ok(self.text.as_ref().map(|text| ExtractedContent {
            title: Some("Extracted Title".to_string()),
            content: format!("<p>{}</p>", text),
            text_content: text.clone(),
        }))
    }
}

// =============================================================================
// SUMMARIZATION
// =============================================================================

/// Mock summarizer with a fixed response; records the exact inputs it
/// was handed so tests can assert truncation.
#[derive(Clone)]
pub struct MockSummarizer {
    state: Arc<MockState>,
    summary: Option<String>,
}

impl Default for MockSummarizer {
    fn default() -> Self {
        Self {
            state: Arc::default(),
            summary: Some("Mock summary.".to_string()),
        }
    }
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    /// Respond with `Ok(None)` — model produced nothing usable.
    pub fn empty(mut self) -> Self {
        self.summary = None;
        self
    }

    /// Fail every summarization.
    pub fn failing(self) -> Self {
        self.state.fail.store(true, Ordering::SeqCst);
        self
    }

    /// Inputs handed to the summarizer, in call order.
    pub fn inputs(&self) -> Vec<String> {
        self.state.calls()
    }

    pub fn call_count(&self) -> usize {
        self.state.calls().len()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    fn model(&self) -> &str {
        "mock-model"
    }

    async fn summarize(&self, text: &str, _max_chars: usize) -> Result<Option<String>> {
        self.state.record(text);
        if self.state.failing() {
            return Err(Error::Inference("mock summarization failure".to_string()));
        }
        Ok(self.summary.clone())
    }
}
