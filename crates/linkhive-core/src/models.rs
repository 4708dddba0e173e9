//! Core data models for linkhive.
//!
//! These types are shared across all linkhive crates and represent the
//! replicated tables that clients and the worker materialize from the
//! event log. Wire format is camelCase JSON to match the client replay
//! protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// LINK
// =============================================================================

/// User-facing read status of a link.
///
/// Owned by user actions (complete/uncomplete); the processing pipeline
/// never transitions this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Unread,
    Completed,
}

/// A saved URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Immutable identifier, unique per tenant (UUIDv7).
    pub id: Uuid,
    /// Exact URL string as ingested. Uniqueness is enforced at ingest
    /// time only; concurrent-ingest duplicates are tolerated.
    pub url: String,
    /// URL host with a leading `www.` stripped.
    pub domain: String,
    pub status: LinkStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Soft-delete marker. Deleted links leave the pending-work view.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Link {
    /// Whether this link is visible (not soft-deleted).
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

// =============================================================================
// PROCESSING STATUS
// =============================================================================

/// Enrichment progress of one link. One row per link once processing
/// has started; never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingState {
    Pending,
    Completed,
    Failed,
}

/// Per-link enrichment progress row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStatus {
    pub link_id: Uuid,
    pub status: ProcessingState,
    /// Error classification label, populated on failure.
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ProcessingStatus {
    /// Terminal states are not retried automatically; `failed` re-enters
    /// the pending-work view and is reprocessed on the next wake.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            ProcessingState::Completed | ProcessingState::Failed
        )
    }
}

// =============================================================================
// ENRICHMENT RECORDS
// =============================================================================

/// Immutable metadata enrichment record. Multiple snapshots may exist per
/// link; readers take the most recent by `fetched_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataSnapshot {
    pub id: Uuid,
    pub link_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub favicon: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Immutable AI-generated summary record, most-recent-wins like
/// [`MetadataSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: Uuid,
    pub link_id: Uuid,
    pub summary: String,
    pub model: String,
    pub summarized_at: DateTime<Utc>,
}

// =============================================================================
// COLLABORATOR PAYLOADS
// =============================================================================

/// Result of a metadata fetch. Every field is independently nullable;
/// partial metadata is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub favicon: Option<String>,
}

impl PageMetadata {
    /// Whether the fetch recovered anything at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.favicon.is_none()
    }
}

/// Result of full-content extraction from a URL.
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    pub title: Option<String>,
    /// Cleaned markup of the main content region.
    pub content: String,
    /// Plain text of the main content region, summarizer input.
    pub text_content: String,
}

/// Per-tenant feature flags, read per-job since they can change between
/// a job being enqueued and being run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantFeatures {
    pub ai_summary_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_link() -> Link {
        Link {
            id: Uuid::new_v4(),
            url: "https://example.com/a".to_string(),
            domain: "example.com".to_string(),
            status: LinkStatus::Unread,
            created_at: Utc::now(),
            completed_at: None,
            deleted_at: None,
        }
    }

    #[test]
    fn test_link_is_active() {
        let mut link = sample_link();
        assert!(link.is_active());

        link.deleted_at = Some(Utc::now());
        assert!(!link.is_active());
    }

    #[test]
    fn test_link_wire_format_is_camel_case() {
        let link = sample_link();
        let json = serde_json::to_value(&link).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("deletedAt").is_some());
        assert_eq!(json["status"], "unread");
    }

    #[test]
    fn test_processing_status_terminal() {
        let mut row = ProcessingStatus {
            link_id: Uuid::new_v4(),
            status: ProcessingState::Pending,
            error: None,
            updated_at: Utc::now(),
        };
        assert!(!row.is_terminal());

        row.status = ProcessingState::Completed;
        assert!(row.is_terminal());

        row.status = ProcessingState::Failed;
        assert!(row.is_terminal());
    }

    #[test]
    fn test_processing_state_serialization() {
        assert_eq!(
            serde_json::to_string(&ProcessingState::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&ProcessingState::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn test_page_metadata_is_empty() {
        let empty = PageMetadata::default();
        assert!(empty.is_empty());

        let partial = PageMetadata {
            title: Some("A title".to_string()),
            ..Default::default()
        };
        assert!(!partial.is_empty());
    }

    #[test]
    fn test_tenant_features_default_off() {
        let features = TenantFeatures::default();
        assert!(!features.ai_summary_enabled);
    }
}
