//! Event log schema for the replicated store.
//!
//! Every write the pipeline performs is expressed as one of these events
//! appended to the tenant's log. The store is the single writer-of-record;
//! the worker and all clients replay the log into local tables. Wire
//! format is camelCase JSON with a `type` tag, matching the client replay
//! protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One event in the tenant's append-only log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LogEvent {
    /// A new link was ingested.
    #[serde(rename_all = "camelCase")]
    LinkCreated {
        id: Uuid,
        url: String,
        domain: String,
        created_at: DateTime<Utc>,
    },
    /// A processing attempt started; creates/ensures the status row at
    /// `pending`.
    #[serde(rename_all = "camelCase")]
    ProcessingStarted {
        link_id: Uuid,
        updated_at: DateTime<Utc>,
    },
    /// Metadata enrichment succeeded (fields independently nullable).
    #[serde(rename_all = "camelCase")]
    MetadataFetched {
        id: Uuid,
        link_id: Uuid,
        title: Option<String>,
        description: Option<String>,
        image: Option<String>,
        favicon: Option<String>,
        fetched_at: DateTime<Utc>,
    },
    /// AI summary generated.
    #[serde(rename_all = "camelCase")]
    Summarized {
        id: Uuid,
        link_id: Uuid,
        summary: String,
        model: String,
        summarized_at: DateTime<Utc>,
    },
    /// Terminal success of one processing attempt.
    #[serde(rename_all = "camelCase")]
    ProcessingCompleted {
        link_id: Uuid,
        updated_at: DateTime<Utc>,
    },
    /// Terminal failure of one processing attempt. `error` carries a
    /// sanitized classification label, never a raw message.
    #[serde(rename_all = "camelCase")]
    ProcessingFailed {
        link_id: Uuid,
        error: String,
        updated_at: DateTime<Utc>,
    },
}

impl LogEvent {
    /// Dot-namespaced event type name (e.g. `"link.created"`).
    pub fn event_type(&self) -> &'static str {
        match self {
            LogEvent::LinkCreated { .. } => "link.created",
            LogEvent::ProcessingStarted { .. } => "processing.started",
            LogEvent::MetadataFetched { .. } => "metadata.fetched",
            LogEvent::Summarized { .. } => "link.summarized",
            LogEvent::ProcessingCompleted { .. } => "processing.completed",
            LogEvent::ProcessingFailed { .. } => "processing.failed",
        }
    }

    /// The link this event relates to.
    pub fn link_id(&self) -> Uuid {
        match self {
            LogEvent::LinkCreated { id, .. } => *id,
            LogEvent::ProcessingStarted { link_id, .. } => *link_id,
            LogEvent::MetadataFetched { link_id, .. } => *link_id,
            LogEvent::Summarized { link_id, .. } => *link_id,
            LogEvent::ProcessingCompleted { link_id, .. } => *link_id,
            LogEvent::ProcessingFailed { link_id, .. } => *link_id,
        }
    }

    /// Whether this event ends a processing attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LogEvent::ProcessingCompleted { .. } | LogEvent::ProcessingFailed { .. }
        )
    }
}

/// Batch of newly-available events pushed by the sync backend to wake a
/// tenant's worker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncPayload {
    pub events: Vec<LogEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        let event = LogEvent::LinkCreated {
            id: Uuid::new_v4(),
            url: "https://example.com".to_string(),
            domain: "example.com".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(event.event_type(), "link.created");

        let event = LogEvent::ProcessingFailed {
            link_id: Uuid::new_v4(),
            error: "enrichment".to_string(),
            updated_at: Utc::now(),
        };
        assert_eq!(event.event_type(), "processing.failed");
    }

    #[test]
    fn test_link_id_extraction() {
        let id = Uuid::new_v4();
        let event = LogEvent::Summarized {
            id: Uuid::new_v4(),
            link_id: id,
            summary: "short".to_string(),
            model: "llama3.2".to_string(),
            summarized_at: Utc::now(),
        };
        assert_eq!(event.link_id(), id);
    }

    #[test]
    fn test_terminal_events() {
        let completed = LogEvent::ProcessingCompleted {
            link_id: Uuid::new_v4(),
            updated_at: Utc::now(),
        };
        let started = LogEvent::ProcessingStarted {
            link_id: Uuid::new_v4(),
            updated_at: Utc::now(),
        };
        assert!(completed.is_terminal());
        assert!(!started.is_terminal());
    }

    #[test]
    fn test_wire_format() {
        let event = LogEvent::LinkCreated {
            id: Uuid::nil(),
            url: "https://example.com/a".to_string(),
            domain: "example.com".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "linkCreated");
        assert!(json.get("createdAt").is_some());

        let back: LogEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_sync_payload_roundtrip() {
        let payload = SyncPayload {
            events: vec![LogEvent::ProcessingCompleted {
                link_id: Uuid::new_v4(),
                updated_at: Utc::now(),
            }],
        };
        let json = serde_json::to_string(&payload).unwrap();
        let back: SyncPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back.events, payload.events);
    }
}
