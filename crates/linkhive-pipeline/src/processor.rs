//! Link processing state machine.
//!
//! Drives one link through the enrichment steps for a single attempt:
//! start → fetch metadata → (extract + summarize)? → terminal event.
//! Each enrichment step is fault-isolated — a step's failure degrades
//! the output but never aborts the job. Only store-commit failures are
//! unrecoverable, and those end the attempt with `ProcessingFailed`
//! carrying a sanitized error classification. Nothing propagates out of
//! [`process_link`].

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use linkhive_core::{
    defaults, new_v7, ContentExtractor, Error, Link, LogEvent, MetadataFetcher, PageMetadata,
    Result, Summarizer, TenantFeatures, TenantSettings,
};
use linkhive_store::Replica;

/// Everything one processing attempt needs.
pub struct JobEnv {
    pub replica: Arc<Replica>,
    pub metadata: Arc<dyn MetadataFetcher>,
    pub extractor: Arc<dyn ContentExtractor>,
    pub summarizer: Arc<dyn Summarizer>,
    pub settings: Arc<dyn TenantSettings>,
    pub store_id: String,
    pub summary_input_cap: usize,
}

/// Terminal outcome of one processing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Failed { classification: String },
}

/// Run one processing attempt to its terminal event.
///
/// Exactly one of `ProcessingCompleted`/`ProcessingFailed` is committed
/// per call (unless the store itself refuses both commits, which is
/// logged and leaves the attempt retryable).
#[instrument(skip(env, link), fields(link_id = %link.id, is_retry))]
pub async fn process_link(env: &JobEnv, link: &Link, is_retry: bool) -> JobOutcome {
    let started = Instant::now();

    match drive(env, link, is_retry).await {
        Ok(()) => {
            let completed = env
                .replica
                .commit(vec![LogEvent::ProcessingCompleted {
                    link_id: link.id,
                    updated_at: Utc::now(),
                }])
                .await;
            match completed {
                Ok(()) => {
                    info!(
                        duration_ms = started.elapsed().as_millis() as u64,
                        "link processed"
                    );
                    JobOutcome::Completed
                }
                Err(e) => {
                    error!(error = %e, "failed to commit completion");
                    fail(env, link, &e).await
                }
            }
        }
        Err(e) => {
            warn!(
                error = %e,
                duration_ms = started.elapsed().as_millis() as u64,
                "link processing failed"
            );
            fail(env, link, &e).await
        }
    }
}

/// Commit the terminal failure event with a sanitized classification.
async fn fail(env: &JobEnv, link: &Link, cause: &Error) -> JobOutcome {
    let classification = cause.classification().to_string();
    let committed = env
        .replica
        .commit(vec![LogEvent::ProcessingFailed {
            link_id: link.id,
            error: classification.clone(),
            updated_at: Utc::now(),
        }])
        .await;
    if let Err(e) = committed {
        // Store is refusing writes entirely; the row stays `pending` and
        // the next wake retries the attempt.
        error!(error = %e, "failed to commit terminal failure event");
    }
    JobOutcome::Failed { classification }
}

/// The fallible portion of an attempt. An `Err` here is unrecoverable
/// (store commit failure); enrichment failures are absorbed inside.
async fn drive(env: &JobEnv, link: &Link, is_retry: bool) -> Result<()> {
    if !is_retry {
        env.replica
            .commit(vec![LogEvent::ProcessingStarted {
                link_id: link.id,
                updated_at: Utc::now(),
            }])
            .await?;
    }

    let metadata = fetch_metadata(env, link).await?;

    // Read per-job: the flag can change between enqueue and run.
    let features = match env.settings.features(&env.store_id).await {
        Ok(features) => features,
        Err(e) => {
            warn!(error = %e, "settings lookup failed; summaries skipped");
            TenantFeatures::default()
        }
    };
    if features.ai_summary_enabled {
        summarize(env, link, metadata.as_ref()).await?;
    }

    Ok(())
}

/// Fetch metadata and commit a snapshot. A fetch failure logs and
/// continues with null metadata; only the commit can error.
async fn fetch_metadata(env: &JobEnv, link: &Link) -> Result<Option<PageMetadata>> {
    match env.metadata.fetch(&link.url).await {
        Ok(metadata) => {
            env.replica
                .commit(vec![LogEvent::MetadataFetched {
                    id: new_v7(),
                    link_id: link.id,
                    title: metadata.title.clone(),
                    description: metadata.description.clone(),
                    image: metadata.image.clone(),
                    favicon: metadata.favicon.clone(),
                    fetched_at: Utc::now(),
                }])
                .await?;
            Ok(Some(metadata))
        }
        Err(e) => {
            warn!(error = %e, url = %link.url, "metadata fetch failed; continuing without");
            Ok(None)
        }
    }
}

/// Extract content and summarize it. Extraction failure falls back to
/// metadata fields; summarization failure logs and continues. Only the
/// `Summarized` commit can error.
async fn summarize(env: &JobEnv, link: &Link, metadata: Option<&PageMetadata>) -> Result<()> {
    let input = match env.extractor.extract(&link.url).await {
        Ok(Some(content)) => content.text_content,
        Ok(None) => {
            debug!(url = %link.url, "no extractable content; falling back to metadata");
            metadata_text(metadata)
        }
        Err(e) => {
            warn!(error = %e, url = %link.url, "extraction failed; falling back to metadata");
            metadata_text(metadata)
        }
    };

    let input = truncate_chars(&input, env.summary_input_cap);
    if input.trim().is_empty() {
        debug!("nothing to summarize");
        return Ok(());
    }

    match env
        .summarizer
        .summarize(input, defaults::SUMMARY_MAX_LENGTH)
        .await
    {
        Ok(Some(summary)) => {
            env.replica
                .commit(vec![LogEvent::Summarized {
                    id: new_v7(),
                    link_id: link.id,
                    summary,
                    model: env.summarizer.model().to_string(),
                    summarized_at: Utc::now(),
                }])
                .await?;
        }
        Ok(None) => debug!("summarizer produced no output"),
        Err(e) => warn!(error = %e, "summarization failed; completing without summary"),
    }
    Ok(())
}

/// Title + description as summarizer input when full extraction is
/// unavailable.
fn metadata_text(metadata: Option<&PageMetadata>) -> String {
    metadata
        .map(|m| {
            [m.title.as_deref(), m.description.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

/// Truncate on a character boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short_input_untouched() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_chars_cuts_at_cap() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
    }

    #[test]
    fn test_truncate_chars_respects_multibyte_boundaries() {
        let text = "héllo wörld";
        let cut = truncate_chars(text, 4);
        assert_eq!(cut, "héll");
        assert_eq!(cut.chars().count(), 4);
    }

    #[test]
    fn test_metadata_text_joins_fields() {
        let metadata = PageMetadata {
            title: Some("A Title".to_string()),
            description: Some("A description.".to_string()),
            ..Default::default()
        };
        assert_eq!(metadata_text(Some(&metadata)), "A Title\nA description.");
    }

    #[test]
    fn test_metadata_text_partial_and_missing() {
        let title_only = PageMetadata {
            title: Some("Just a title".to_string()),
            ..Default::default()
        };
        assert_eq!(metadata_text(Some(&title_only)), "Just a title");
        assert_eq!(metadata_text(None), "");
        assert_eq!(metadata_text(Some(&PageMetadata::default())), "");
    }
}
