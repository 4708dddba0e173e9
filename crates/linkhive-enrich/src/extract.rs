//! Full-text content extraction: fetch a page and pull out the readable
//! main content region.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use linkhive_core::{defaults, ContentExtractor, Error, ExtractedContent, Result};

/// Selectors tried in order for the main content region; first match
/// wins, `body` is the fallback.
const MAIN_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role=\"main\"]",
    "#content",
    "#main",
    ".content",
    ".post-content",
];

/// Extracts readable page content with reqwest + CSS-selector heuristics.
///
/// No JavaScript rendering: static HTML only. Pages that render entirely
/// client-side come back empty and are reported as `None`, letting the
/// caller fall back to metadata-only summarization.
pub struct HttpContentExtractor {
    client: Client,
}

impl HttpContentExtractor {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::FETCH_TIMEOUT_SECS))
            .user_agent(defaults::FETCH_USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(
                defaults::FETCH_MAX_REDIRECTS,
            ))
            .build()
            .map_err(|e| Error::Enrichment(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ContentExtractor for HttpContentExtractor {
    async fn extract(&self, url: &str) -> Result<Option<ExtractedContent>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Enrichment(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Enrichment(format!("HTTP {} for {}", status, url)));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.is_empty() && !content_type.contains("html") {
            debug!(url, content_type, "skipping non-HTML content");
            return Ok(None);
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::Enrichment(format!("failed to read body: {}", e)))?;

        Ok(extract_content(&html))
    }
}

/// Parse HTML and extract the main content region as markup + plain text.
fn extract_content(html: &str) -> Option<ExtractedContent> {
    let document = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty());

    let region = main_region(&document);
    let text_content = region
        .map(|el| readable_text(el))
        .unwrap_or_default();

    if text_content.is_empty() {
        return None;
    }

    let content = region
        .map(|el| el.html())
        .unwrap_or_default();

    Some(ExtractedContent {
        title,
        content,
        text_content,
    })
}

fn main_region(document: &Html) -> Option<ElementRef<'_>> {
    for selector_str in MAIN_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(region) = document.select(&selector).next() {
                return Some(region);
            }
        }
    }
    Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next())
}

/// Collect visible text, skipping script/style/nav noise and collapsing
/// whitespace.
fn readable_text(region: ElementRef<'_>) -> String {
    const SKIP: &[&str] = &["script", "style", "nav", "header", "footer", "noscript"];

    let mut out = String::new();
    for node in region.descendants() {
        if let Some(text) = node.value().as_text() {
            let in_skipped = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .map(|el| SKIP.contains(&el.name()))
                    .unwrap_or(false)
            });
            if in_skipped {
                continue;
            }
            let mut words = text.split_whitespace().peekable();
            if words.peek().is_some() {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(&words.collect::<Vec<_>>().join(" "));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_article_region() {
        let html = r#"<html><head><title>Post</title></head><body>
            <nav>Site navigation</nav>
            <article><p>The actual article text.</p></article>
            <footer>Copyright</footer>
        </body></html>"#;

        let content = extract_content(html).expect("content extracted");
        assert_eq!(content.title.as_deref(), Some("Post"));
        assert_eq!(content.text_content, "The actual article text.");
        assert!(content.content.contains("<p>"));
    }

    #[test]
    fn test_falls_back_to_body() {
        let html = "<html><body><p>Plain body text.</p></body></html>";
        let content = extract_content(html).expect("content extracted");
        assert_eq!(content.text_content, "Plain body text.");
    }

    #[test]
    fn test_skips_script_and_style() {
        let html = r#"<html><body>
            <script>var x = "hidden";</script>
            <style>.a { color: red }</style>
            <p>Visible text.</p>
        </body></html>"#;
        let content = extract_content(html).expect("content extracted");
        assert_eq!(content.text_content, "Visible text.");
    }

    #[test]
    fn test_empty_page_is_none() {
        assert!(extract_content("<html><body></body></html>").is_none());
        assert!(extract_content("").is_none());
    }

    #[test]
    fn test_whitespace_collapsed() {
        let html = "<html><body><main><p>First\n\n   line.</p><p>Second line.</p></main></body></html>";
        let content = extract_content(html).expect("content extracted");
        assert_eq!(content.text_content, "First line. Second line.");
    }
}
