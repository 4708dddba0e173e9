//! UUID v7 utilities for time-ordered identifiers.
//!
//! Links, metadata snapshots, and summaries all use UUIDv7, which embeds
//! a millisecond-precision timestamp in the first 48 bits. Time-ordered
//! ids keep "most recent by timestamp" reads cheap and make event logs
//! naturally sortable.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Extract the embedded timestamp from a UUIDv7.
///
/// Returns `None` for non-v7 UUIDs.
pub fn extract_timestamp(id: &Uuid) -> Option<DateTime<Utc>> {
    if id.get_version_num() != 7 {
        return None;
    }
    let bytes = id.as_bytes();
    let mut millis: u64 = 0;
    for byte in &bytes[0..6] {
        millis = (millis << 8) | u64::from(*byte);
    }
    Utc.timestamp_millis_opt(millis as i64).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_v7_is_version_7() {
        let id = new_v7();
        assert_eq!(id.get_version_num(), 7);
    }

    #[test]
    fn test_new_v7_is_time_ordered() {
        let a = new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = new_v7();
        assert!(a < b);
    }

    #[test]
    fn test_extract_timestamp_roundtrip() {
        let before = Utc::now();
        let id = new_v7();
        let after = Utc::now();

        let ts = extract_timestamp(&id).expect("v7 UUID carries a timestamp");
        // Millisecond precision: allow 1ms slack on both ends.
        assert!(ts >= before - chrono::Duration::milliseconds(1));
        assert!(ts <= after + chrono::Duration::milliseconds(1));
    }

    #[test]
    fn test_extract_timestamp_rejects_v4() {
        let id = Uuid::new_v4();
        assert!(extract_timestamp(&id).is_none());
    }
}
