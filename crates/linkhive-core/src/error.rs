//! Error types for linkhive.

use thiserror::Error;

/// Result type alias using linkhive's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for linkhive operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Event store commit/query/open failed
    #[error("Store error: {0}")]
    Store(String),

    /// Worker is already bound to a different tenant
    #[error("Store mismatch: worker bound to {bound}, requested {requested}")]
    StoreMismatch { bound: String, requested: String },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Link not found
    #[error("Link not found: {0}")]
    LinkNotFound(uuid::Uuid),

    /// Ingest rejected a malformed URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Metadata fetch or content extraction failed
    #[error("Enrichment error: {0}")]
    Enrichment(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Durable storage read/write failed
    #[error("Durable storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable classification label for terminal failure events.
    ///
    /// Committed into the log instead of the raw message so that error
    /// details (URLs, hostnames, response bodies) never leave the worker.
    pub fn classification(&self) -> &'static str {
        match self {
            Error::Store(_) => "store",
            Error::StoreMismatch { .. } => "store_mismatch",
            Error::NotFound(_) => "not_found",
            Error::LinkNotFound(_) => "link_not_found",
            Error::InvalidUrl(_) => "invalid_url",
            Error::Enrichment(_) => "enrichment",
            Error::Inference(_) => "inference",
            Error::Storage(_) => "storage",
            Error::Serialization(_) => "serialization",
            Error::Config(_) => "config",
            Error::InvalidInput(_) => "invalid_input",
            Error::Request(_) => "request",
            Error::Internal(_) => "internal",
            Error::Io(_) => "io",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_store() {
        let err = Error::Store("commit rejected".to_string());
        assert_eq!(err.to_string(), "Store error: commit rejected");
    }

    #[test]
    fn test_error_display_store_mismatch() {
        let err = Error::StoreMismatch {
            bound: "tenant-a".to_string(),
            requested: "tenant-b".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Store mismatch: worker bound to tenant-a, requested tenant-b"
        );
    }

    #[test]
    fn test_error_display_link_not_found() {
        let id = Uuid::nil();
        let err = Error::LinkNotFound(id);
        assert_eq!(err.to_string(), format!("Link not found: {}", id));
    }

    #[test]
    fn test_error_display_invalid_url() {
        let err = Error::InvalidUrl("no scheme".to_string());
        assert_eq!(err.to_string(), "Invalid URL: no scheme");
    }

    #[test]
    fn test_error_display_enrichment() {
        let err = Error::Enrichment("fetch timed out".to_string());
        assert_eq!(err.to_string(), "Enrichment error: fetch timed out");
    }

    #[test]
    fn test_error_display_inference() {
        let err = Error::Inference("model timeout".to_string());
        assert_eq!(err.to_string(), "Inference error: model timeout");
    }

    #[test]
    fn test_classification_strips_detail() {
        let err = Error::Enrichment("GET https://secret.internal failed".to_string());
        assert_eq!(err.classification(), "enrichment");

        let err = Error::Store("pg://user:password@host".to_string());
        assert_eq!(err.classification(), "store");
    }

    #[test]
    fn test_classification_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert_eq!(err.classification(), "io");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }
}
