//! AI summarizer backed by the Ollama generation API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use linkhive_core::{defaults, Error, Result, Summarizer};

/// Summarizes extracted page text via Ollama's `/api/generate`.
///
/// Input is already truncated upstream to the pipeline's input cap, so a
/// single direct generation pass suffices — no map-reduce chunking.
pub struct OllamaSummarizer {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaSummarizer {
    /// Create a summarizer against the given Ollama base URL and model.
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            model,
        }
    }

    /// Create from environment variables (`OLLAMA_URL`, `GEN_MODEL`),
    /// with defaults from [`linkhive_core::defaults`].
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OLLAMA_URL").unwrap_or_else(|_| defaults::OLLAMA_URL.to_string());
        let model = std::env::var("GEN_MODEL").unwrap_or_else(|_| defaults::GEN_MODEL.to_string());
        Self::new(base_url, model)
    }
}

#[async_trait]
impl Summarizer for OllamaSummarizer {
    fn model(&self) -> &str {
        &self.model
    }

    async fn summarize(&self, text: &str, max_chars: usize) -> Result<Option<String>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let prompt = format!(
            "Summarize the following web page content in approximately {} characters \
            or less. Focus on the key points and main ideas. Respond with the summary \
            only:\n\n{}",
            max_chars, text
        );

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(Duration::from_secs(defaults::GEN_TIMEOUT_SECS))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("summarization request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("failed to parse response: {}", e)))?;

        let summary = result.response.trim().to_string();
        debug!(model = %self.model, response_len = summary.len(), "summary generated");
        if summary.is_empty() {
            Ok(None)
        } else {
            Ok(Some(summary))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor() {
        let summarizer = OllamaSummarizer::new(
            "http://localhost:11434".to_string(),
            "test-model".to_string(),
        );
        assert_eq!(summarizer.base_url, "http://localhost:11434");
        assert_eq!(summarizer.model(), "test-model");
    }

    #[tokio::test]
    async fn test_empty_input_short_circuits() {
        // No HTTP call is made for blank input, so an unroutable URL is safe.
        let summarizer =
            OllamaSummarizer::new("http://invalid.test:1".to_string(), "m".to_string());
        let result = summarizer.summarize("   \n ", 500).await.unwrap();
        assert!(result.is_none());
    }

    // HTTP behavior against a live Ollama instance is covered by
    // integration environments, not unit tests.
}
