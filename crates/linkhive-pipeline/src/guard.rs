//! Concurrency guard: the in-memory set of link ids with an attempt in
//! flight in this process.
//!
//! The guard is the only serialization primitive inside one worker, and
//! it serializes at the granularity of a single link id. It carries no
//! cross-restart meaning — after an eviction the set is empty and stuck
//! `pending` rows are picked up again through the retry path.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

/// In-memory set of actively-processed link ids.
#[derive(Default)]
pub struct ProcessingGuard {
    active: Mutex<HashSet<Uuid>>,
}

/// Proof of an acquired guard slot. Releases the slot on drop, so a job
/// that panics or is cancelled still frees its link id.
pub struct GuardToken {
    guard: Arc<ProcessingGuard>,
    link_id: Uuid,
}

impl ProcessingGuard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Atomically claim a link id. Returns `None` if an attempt for that
    /// id is already in flight.
    pub fn acquire(self: &Arc<Self>, link_id: Uuid) -> Option<GuardToken> {
        let mut active = self.active.lock().expect("guard set poisoned");
        if active.insert(link_id) {
            Some(GuardToken {
                guard: Arc::clone(self),
                link_id,
            })
        } else {
            None
        }
    }

    pub fn is_active(&self, link_id: Uuid) -> bool {
        self.active
            .lock()
            .expect("guard set poisoned")
            .contains(&link_id)
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().expect("guard set poisoned").len()
    }
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        self.guard
            .active
            .lock()
            .expect("guard set poisoned")
            .remove(&self.link_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_is_exclusive() {
        let guard = ProcessingGuard::new();
        let id = Uuid::new_v4();

        let token = guard.acquire(id).expect("first acquire succeeds");
        assert!(guard.acquire(id).is_none());
        assert!(guard.is_active(id));

        drop(token);
        assert!(!guard.is_active(id));
        assert!(guard.acquire(id).is_some());
    }

    #[test]
    fn test_distinct_ids_do_not_contend() {
        let guard = ProcessingGuard::new();
        let a = guard.acquire(Uuid::new_v4());
        let b = guard.acquire(Uuid::new_v4());
        assert!(a.is_some());
        assert!(b.is_some());
        assert_eq!(guard.active_count(), 2);
    }

    #[test]
    fn test_token_releases_on_drop_mid_scope() {
        let guard = ProcessingGuard::new();
        let id = Uuid::new_v4();
        {
            let _token = guard.acquire(id).unwrap();
            assert_eq!(guard.active_count(), 1);
        }
        assert_eq!(guard.active_count(), 0);
    }
}
