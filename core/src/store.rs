//! Notification store — the live set of queued notifications.
//!
//! Entries are kept most recent first. With a fixed TTL and a monotonic
//! clock, insertion order is also expiry order: the back of the deque always
//! holds the earliest expiry. Sweeping pops from the back and never touches
//! the relative order of survivors.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use herald_types::{Notification, NotificationId, NotificationKind, Ttl};

/// Expiry used when `now + ttl` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Result of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SweepOutcome {
    pub removed: usize,
    /// Earliest expiry among survivors; `None` when the store is now empty.
    pub next_expiry: Option<Instant>,
}

#[derive(Debug)]
pub(crate) struct NotificationStore {
    entries: VecDeque<Notification>,
    next_id: u64,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            next_id: 1,
        }
    }

    pub fn enqueue(
        &mut self,
        kind: NotificationKind,
        title: String,
        now: Instant,
        ttl: Ttl,
    ) -> NotificationId {
        let id = NotificationId::new(self.next_id);
        self.next_id += 1;

        let expires_at = now
            .checked_add(ttl.as_duration())
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        debug_assert!(
            self.entries
                .front()
                .is_none_or(|newest| newest.expires_at() <= expires_at),
            "expiry must be non-decreasing in insertion order"
        );
        self.entries
            .push_front(Notification::new(id, kind, title, expires_at));
        id
    }

    /// Remove the entry with `id`. Unknown ids are ignored.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        match self.entries.iter().position(|n| n.id() == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn sweep_expired(&mut self, now: Instant) -> SweepOutcome {
        let mut removed = 0;
        while self.entries.back().is_some_and(|oldest| oldest.is_expired(now)) {
            self.entries.pop_back();
            removed += 1;
        }
        SweepOutcome {
            removed,
            next_expiry: self.earliest_expiry(),
        }
    }

    pub fn earliest_expiry(&self) -> Option<Instant> {
        self.entries.back().map(Notification::expires_at)
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.entries.iter().cloned().collect()
    }

    /// Drop every entry, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ttl() -> Ttl {
        Ttl::from_millis(5000).unwrap()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn titles(store: &NotificationStore) -> Vec<String> {
        store
            .snapshot()
            .iter()
            .map(|n| n.title().to_string())
            .collect()
    }

    #[test]
    fn enqueue_is_most_recent_first() {
        let t0 = Instant::now();
        let mut store = NotificationStore::new();
        store.enqueue(NotificationKind::Success, "a".into(), t0, ttl());
        store.enqueue(NotificationKind::Failure, "b".into(), t0 + ms(10), ttl());
        store.enqueue(NotificationKind::Success, "c".into(), t0 + ms(20), ttl());

        assert_eq!(titles(&store), ["c", "b", "a"]);
        assert_eq!(store.earliest_expiry(), Some(t0 + ms(5000)));
    }

    #[test]
    fn identical_content_gets_distinct_ids() {
        let t0 = Instant::now();
        let mut store = NotificationStore::new();
        let first = store.enqueue(NotificationKind::Success, "saved".into(), t0, ttl());
        let second = store.enqueue(NotificationKind::Success, "saved".into(), t0, ttl());
        assert_ne!(first, second);

        assert!(store.dismiss(first));
        let remaining = store.snapshot();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), second);
    }

    #[test]
    fn dismiss_preserves_order() {
        let t0 = Instant::now();
        let mut store = NotificationStore::new();
        store.enqueue(NotificationKind::Success, "a".into(), t0, ttl());
        let b = store.enqueue(NotificationKind::Success, "b".into(), t0 + ms(1), ttl());
        store.enqueue(NotificationKind::Success, "c".into(), t0 + ms(2), ttl());
        store.enqueue(NotificationKind::Success, "d".into(), t0 + ms(3), ttl());

        assert!(store.dismiss(b));
        assert_eq!(titles(&store), ["d", "c", "a"]);
    }

    #[test]
    fn dismiss_unknown_is_noop() {
        let t0 = Instant::now();
        let mut store = NotificationStore::new();
        let id = store.enqueue(NotificationKind::Failure, "x".into(), t0, ttl());

        assert!(!store.dismiss(NotificationId::new(999)));
        assert!(store.dismiss(id));
        assert!(!store.dismiss(id));
        assert!(store.is_empty());
    }

    #[test]
    fn sweep_removes_exactly_expired() {
        let t0 = Instant::now();
        let mut store = NotificationStore::new();
        store.enqueue(NotificationKind::Success, "a".into(), t0, ttl());
        store.enqueue(NotificationKind::Failure, "b".into(), t0 + ms(1000), ttl());
        store.enqueue(NotificationKind::Success, "c".into(), t0 + ms(2000), ttl());

        // Late sweep: a (5000) and b (6000) are due, c (7000) is not.
        let outcome = store.sweep_expired(t0 + ms(6000));
        assert_eq!(outcome.removed, 2);
        assert_eq!(outcome.next_expiry, Some(t0 + ms(7000)));
        assert_eq!(titles(&store), ["c"]);
    }

    #[test]
    fn sweep_before_expiry_removes_nothing() {
        let t0 = Instant::now();
        let mut store = NotificationStore::new();
        store.enqueue(NotificationKind::Success, "a".into(), t0, ttl());

        let outcome = store.sweep_expired(t0 + ms(4999));
        assert_eq!(outcome.removed, 0);
        assert_eq!(outcome.next_expiry, Some(t0 + ms(5000)));
    }

    #[test]
    fn sweep_is_idempotent() {
        let t0 = Instant::now();
        let mut store = NotificationStore::new();
        store.enqueue(NotificationKind::Success, "a".into(), t0, ttl());
        store.enqueue(NotificationKind::Success, "b".into(), t0 + ms(3000), ttl());

        let now = t0 + ms(5500);
        let first = store.sweep_expired(now);
        let after_first = store.snapshot();
        let second = store.sweep_expired(now);

        assert_eq!(first.removed, 1);
        assert_eq!(second.removed, 0);
        assert_eq!(first.next_expiry, second.next_expiry);
        assert_eq!(store.snapshot(), after_first);
    }

    #[test]
    fn sweep_to_empty_reports_none() {
        let t0 = Instant::now();
        let mut store = NotificationStore::new();
        store.enqueue(NotificationKind::Success, "a".into(), t0, ttl());

        let outcome = store.sweep_expired(t0 + ms(5000));
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.next_expiry, None);
        assert!(store.is_empty());
    }

    #[test]
    fn earliest_expiry_after_dismissing_oldest() {
        let t0 = Instant::now();
        let mut store = NotificationStore::new();
        let a = store.enqueue(NotificationKind::Success, "a".into(), t0, ttl());
        store.enqueue(NotificationKind::Success, "b".into(), t0 + ms(1000), ttl());

        store.dismiss(a);
        assert_eq!(store.earliest_expiry(), Some(t0 + ms(6000)));
    }

    #[test]
    fn oversized_ttl_saturates_instead_of_overflowing() {
        let t0 = Instant::now();
        let mut store = NotificationStore::new();
        let huge = Ttl::new(Duration::MAX).unwrap();
        store.enqueue(NotificationKind::Success, "a".into(), t0, huge);
        store.enqueue(NotificationKind::Success, "b".into(), t0 + ms(1), huge);

        let earliest = store.earliest_expiry().unwrap();
        assert!(earliest > t0 + Duration::from_secs(365 * 24 * 60 * 60));

        let outcome = store.sweep_expired(t0 + Duration::from_secs(24 * 60 * 60));
        assert_eq!(outcome.removed, 0);
        assert_eq!(titles(&store), ["b", "a"]);
    }

    #[test]
    fn clear_counts_removed() {
        let t0 = Instant::now();
        let mut store = NotificationStore::new();
        store.enqueue(NotificationKind::Success, "a".into(), t0, ttl());
        store.enqueue(NotificationKind::Success, "b".into(), t0, ttl());

        assert_eq!(store.clear(), 2);
        assert_eq!(store.len(), 0);
        assert_eq!(store.earliest_expiry(), None);
    }
}
