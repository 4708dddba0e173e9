//! Ingest gateway: create a new link, idempotent on URL.

use chrono::Utc;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use linkhive_core::{new_v7, Error, LogEvent, Result};
use linkhive_store::Replica;

/// Result of an ingest call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A new link was created.
    Ingested { link_id: Uuid },
    /// An active link with exactly this URL already exists; nothing was
    /// committed.
    Duplicate { link_id: Uuid },
}

impl IngestOutcome {
    pub fn link_id(&self) -> Uuid {
        match self {
            IngestOutcome::Ingested { link_id } | IngestOutcome::Duplicate { link_id } => *link_id,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            IngestOutcome::Ingested { .. } => "ingested",
            IngestOutcome::Duplicate { .. } => "duplicate",
        }
    }
}

/// Validate, dedup, and commit a `LinkCreated` event.
///
/// Dedup is exact string match on the stored URL — scheme, host case,
/// and trailing-slash variants are distinct links here even though the
/// UI layer does its own normalization for duplicate warnings.
pub(crate) async fn create_link(replica: &Replica, raw_url: &str) -> Result<IngestOutcome> {
    let trimmed = raw_url.trim();
    let parsed =
        Url::parse(trimmed).map_err(|e| Error::InvalidUrl(format!("{}: {}", trimmed, e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::InvalidUrl(format!("{}: missing host", trimmed)))?;
    let domain = host.strip_prefix("www.").unwrap_or(host).to_string();

    if let Some(existing) = replica.find_by_url(trimmed).await {
        debug!(
            link_id = %existing.id,
            url = trimmed,
            "duplicate ingest; returning existing link"
        );
        return Ok(IngestOutcome::Duplicate {
            link_id: existing.id,
        });
    }

    let id = new_v7();
    replica
        .commit(vec![LogEvent::LinkCreated {
            id,
            url: trimmed.to_string(),
            domain: domain.clone(),
            created_at: Utc::now(),
        }])
        .await?;
    info!(link_id = %id, url = trimmed, domain = %domain, "link ingested");

    Ok(IngestOutcome::Ingested { link_id: id })
}
