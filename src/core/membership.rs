// McWatch - core/membership.rs
//
// Set of users currently connected to the server, as observed through
// join and leave lines. Owned and mutated only by the stream engine.

use std::collections::HashSet;

/// Mutable membership set. Both mutations are idempotent.
#[derive(Debug, Clone, Default)]
pub struct MembershipTracker {
    members: HashSet<String>,
}

impl MembershipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `id`. Returns `false` if it was already a member.
    pub fn add(&mut self, id: &str) -> bool {
        if self.members.contains(id) {
            return false;
        }
        self.members.insert(id.to_string())
    }

    /// Remove `id`. Returns `false` if it was not a member; that is not an error.
    pub fn remove(&mut self, id: &str) -> bool {
        self.members.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Read-only view used for one record's classification.
    ///
    /// The view borrows the tracker, so no mutation can happen while any
    /// rule of that record is being evaluated.
    pub fn snapshot(&self) -> MembershipSnapshot<'_> {
        MembershipSnapshot {
            members: &self.members,
        }
    }

    /// Members sorted by name, for reporting.
    pub fn sorted(&self) -> Vec<String> {
        let mut names: Vec<String> = self.members.iter().cloned().collect();
        names.sort();
        names
    }
}

/// Borrowed, immutable view of the membership set.
#[derive(Debug, Clone, Copy)]
pub struct MembershipSnapshot<'a> {
    members: &'a HashSet<String>,
}

impl MembershipSnapshot<'_> {
    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_add_is_idempotent() {
        let mut tracker = MembershipTracker::new();
        assert!(tracker.add("Alice"));
        assert!(!tracker.add("Alice"));
        assert_eq!(tracker.len(), 1);
        assert!(tracker.contains("Alice"));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut tracker = MembershipTracker::new();
        tracker.add("Alice");
        assert!(!tracker.remove("Bob"));
        assert_eq!(tracker.sorted(), vec!["Alice".to_string()]);
    }

    #[test]
    fn test_remove_present() {
        let mut tracker = MembershipTracker::new();
        tracker.add("Alice");
        assert!(tracker.remove("Alice"));
        assert!(tracker.is_empty());
        assert!(!tracker.snapshot().contains("Alice"));
    }

    #[test]
    fn test_sorted_orders_by_name() {
        let mut tracker = MembershipTracker::new();
        for name in ["carol", "Alice", "bob"] {
            tracker.add(name);
        }
        assert_eq!(tracker.sorted(), vec!["Alice", "bob", "carol"]);
    }
}
