//! Snapshot: the result set of one refresh cycle

use crate::roster::UserRecord;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Every user's record from one cycle, sorted by username ignoring case
///
/// Immutable once built; the cache hands out shared references to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    records: Vec<UserRecord>,
    generated_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// The snapshot served before the first cycle completes
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sort `records` into snapshot order and stamp the completion time
    pub fn from_records(mut records: Vec<UserRecord>) -> Self {
        records.sort_by(compare_usernames);
        Self {
            records,
            generated_at: Some(Utc::now()),
        }
    }

    pub fn records(&self) -> &[UserRecord] {
        &self.records
    }

    /// `None` for the initial empty snapshot
    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.generated_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// Case-insensitive, with the exact spelling as a tie-break so "Bob" and
// "bob" land in a stable order.
fn compare_usernames(a: &UserRecord, b: &UserRecord) -> Ordering {
    a.username
        .to_lowercase()
        .cmp(&b.username.to_lowercase())
        .then_with(|| a.username.cmp(&b.username))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(snapshot: &Snapshot) -> Vec<&str> {
        snapshot
            .records()
            .iter()
            .map(|r| r.username.as_str())
            .collect()
    }

    #[test]
    fn test_sorted_case_insensitively() {
        let snapshot = Snapshot::from_records(vec![
            UserRecord::new("zhafner"),
            UserRecord::new("Bob"),
            UserRecord::new("alice"),
            UserRecord::new("ChristiHarlow"),
        ]);
        assert_eq!(
            names(&snapshot),
            vec!["alice", "Bob", "ChristiHarlow", "zhafner"]
        );
        assert!(snapshot.generated_at().is_some());
    }

    #[test]
    fn test_case_variants_have_stable_order() {
        let a = Snapshot::from_records(vec![UserRecord::new("bob"), UserRecord::new("Bob")]);
        let b = Snapshot::from_records(vec![UserRecord::new("Bob"), UserRecord::new("bob")]);
        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.len(), 0);
        assert!(snapshot.generated_at().is_none());
    }
}
