//! Pending-work view: the derived set of links that need a processing
//! attempt.
//!
//! Membership rule: active (non-deleted) links, minus links whose status
//! row says `completed`. Links with no status row, a `pending` row, or a
//! `failed` row are all included — a failed attempt is not permanently
//! abandoned.

use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

use linkhive_core::{Link, ProcessingState, ProcessingStatus};

/// One snapshot of the pending-work set.
///
/// Ordered set so snapshots compare deterministically; the view only
/// notifies subscribers when membership actually changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSnapshot {
    link_ids: BTreeSet<Uuid>,
}

impl PendingSnapshot {
    /// Recompute the pending set from the replicated tables.
    pub fn compute<'a>(
        links: impl Iterator<Item = &'a Link>,
        processing: &HashMap<Uuid, ProcessingStatus>,
    ) -> Self {
        let link_ids = links
            .filter(|link| link.is_active())
            .filter(|link| {
                processing
                    .get(&link.id)
                    .map(|row| row.status != ProcessingState::Completed)
                    .unwrap_or(true)
            })
            .map(|link| link.id)
            .collect();
        Self { link_ids }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.link_ids.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.link_ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.link_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.link_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use linkhive_core::LinkStatus;

    fn link(id: Uuid, deleted: bool) -> Link {
        Link {
            id,
            url: format!("https://example.com/{}", id),
            domain: "example.com".to_string(),
            status: LinkStatus::Unread,
            created_at: Utc::now(),
            completed_at: None,
            deleted_at: deleted.then(Utc::now),
        }
    }

    fn status(link_id: Uuid, state: ProcessingState) -> ProcessingStatus {
        ProcessingStatus {
            link_id,
            status: state,
            error: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_status_row_is_pending() {
        let id = Uuid::new_v4();
        let links = vec![link(id, false)];
        let processing = HashMap::new();

        let snap = PendingSnapshot::compute(links.iter(), &processing);
        assert!(snap.contains(id));
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn test_pending_status_row_stays_pending() {
        let id = Uuid::new_v4();
        let links = vec![link(id, false)];
        let mut processing = HashMap::new();
        processing.insert(id, status(id, ProcessingState::Pending));

        let snap = PendingSnapshot::compute(links.iter(), &processing);
        assert!(snap.contains(id));
    }

    #[test]
    fn test_failed_is_eligible_for_reprocessing() {
        let id = Uuid::new_v4();
        let links = vec![link(id, false)];
        let mut processing = HashMap::new();
        processing.insert(id, status(id, ProcessingState::Failed));

        let snap = PendingSnapshot::compute(links.iter(), &processing);
        assert!(snap.contains(id));
    }

    #[test]
    fn test_completed_leaves_the_view() {
        let id = Uuid::new_v4();
        let links = vec![link(id, false)];
        let mut processing = HashMap::new();
        processing.insert(id, status(id, ProcessingState::Completed));

        let snap = PendingSnapshot::compute(links.iter(), &processing);
        assert!(!snap.contains(id));
        assert!(snap.is_empty());
    }

    #[test]
    fn test_deleted_links_excluded() {
        let id = Uuid::new_v4();
        let links = vec![link(id, true)];
        let processing = HashMap::new();

        let snap = PendingSnapshot::compute(links.iter(), &processing);
        assert!(snap.is_empty());
    }

    #[test]
    fn test_snapshot_equality_is_membership() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let links_one = vec![link(a, false), link(b, false)];
        let links_two = vec![link(b, false), link(a, false)];
        let processing = HashMap::new();

        let snap_one = PendingSnapshot::compute(links_one.iter(), &processing);
        let snap_two = PendingSnapshot::compute(links_two.iter(), &processing);
        assert_eq!(snap_one, snap_two);
    }
}
