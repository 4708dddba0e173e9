//! HTTP metadata fetcher: OpenGraph/meta-tag scraping over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use linkhive_core::{defaults, Error, MetadataFetcher, PageMetadata, Result};

/// Fetches page metadata with a browser-like HTTP client and CSS-selector
/// scraping.
pub struct HttpMetadataFetcher {
    client: Client,
}

impl HttpMetadataFetcher {
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

    async fn fetch_html(&self, url: &str) -> Result<String> {
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

        response
            .text()
            .await
            .map_err(|e| Error::Enrichment(format!("failed to read body: {}", e)))
    }
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, url: &str) -> Result<PageMetadata> {
        let html = self.fetch_html(url).await?;
        let metadata = scrape_metadata(&html, url);
        debug!(
            url,
            has_title = metadata.title.is_some(),
            has_description = metadata.description.is_some(),
            "metadata scraped"
        );
        Ok(metadata)
    }
}

/// Pull title/description/image/favicon out of an HTML document.
///
/// OpenGraph tags win over their plain-HTML equivalents; every field is
/// independently optional.
fn scrape_metadata(html: &str, base_url: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    let title = meta_property(&document, "og:title")
        .or_else(|| select_text(&document, "title"))
        .filter(|s| !s.is_empty());

    let description = meta_property(&document, "og:description")
        .or_else(|| meta_name(&document, "description"))
        .filter(|s| !s.is_empty());

    let image = meta_property(&document, "og:image")
        .and_then(|src| resolve(base_url, &src));

    let favicon = favicon_href(&document)
        .and_then(|href| resolve(base_url, &href))
        .or_else(|| resolve(base_url, "/favicon.ico"));

    PageMetadata {
        title,
        description,
        image,
        favicon,
    }
}

fn meta_property(document: &Html, property: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[property="{}"]"#, property)).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
}

fn meta_name(document: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[name="{}"]"#, name)).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

fn favicon_href(document: &Html) -> Option<String> {
    // "icon" and "shortcut icon" both occur in the wild.
    for rel in ["icon", "shortcut icon", "apple-touch-icon"] {
        let selector = Selector::parse(&format!(r#"link[rel="{}"]"#, rel)).ok()?;
        if let Some(href) = document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr("href"))
        {
            return Some(href.to_string());
        }
    }
    None
}

/// Resolve a possibly-relative reference against the page URL.
fn resolve(base_url: &str, reference: &str) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    base.join(reference).ok().map(|u| u.to_string())
}
