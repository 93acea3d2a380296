//! Snapshot Cache
//!
//! One slot behind one mutex. The lock is held only to swap or clone an
//! `Arc`, never while probing or serializing.

use super::snapshot::Snapshot;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Holds the latest published [`Snapshot`]
#[derive(Debug)]
pub struct SnapshotCache {
    slot: Mutex<Arc<Snapshot>>,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCache {
    /// Cache holding the empty snapshot
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Arc::new(Snapshot::empty())),
        }
    }

    /// Replace the current snapshot; returns the published handle
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(snapshot);
        let previous = std::mem::replace(&mut *self.lock(), Arc::clone(&next));
        // Drop the old snapshot outside the lock
        drop(previous);
        next
    }

    /// The latest published snapshot
    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.lock())
    }

    // The slot is always a whole Arc, so a poisoned lock still guards a
    // consistent value.
    fn lock(&self) -> MutexGuard<'_, Arc<Snapshot>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::UserRecord;

    #[test]
    fn test_initially_empty() {
        let cache = SnapshotCache::new();
        assert!(cache.current().is_empty());
    }

    #[test]
    fn test_publish_replaces_current() {
        let cache = SnapshotCache::new();
        let published = cache.publish(Snapshot::from_records(vec![UserRecord::new("alice")]));

        let current = cache.current();
        assert!(Arc::ptr_eq(&published, &current));
        assert_eq!(current.records()[0].username, "alice");
    }

    #[test]
    fn test_current_is_idempotent() {
        let cache = SnapshotCache::new();
        cache.publish(Snapshot::from_records(vec![UserRecord::new("bob")]));

        let first = cache.current();
        let second = cache.current();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[test]
    fn test_readers_keep_old_snapshot_after_publish() {
        let cache = SnapshotCache::new();
        cache.publish(Snapshot::from_records(vec![UserRecord::new("old")]));
        let held = cache.current();

        cache.publish(Snapshot::from_records(vec![UserRecord::new("new")]));

        assert_eq!(held.records()[0].username, "old");
        assert_eq!(cache.current().records()[0].username, "new");
    }
}
