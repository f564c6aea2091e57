//! NotificationQueue facade — the producer-facing API.
//!
//! One lock guards the store and the scheduler together, so an enqueue and a
//! timer fire can never interleave halfway. The timer task reaches back into
//! the queue through a `Weak`; dropping the queue aborts the timer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use herald_types::{NotificationId, NotificationKind, NotificationSnapshot, Ttl};
use thiserror::Error;
use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::watch;

use crate::scheduler::{ExpiryScheduler, FireTarget, clock_now};
use crate::store::NotificationStore;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("notification queue requires a Tokio runtime: {0}")]
    NoRuntime(#[from] TryCurrentError),
}

/// Lifetime counters for one queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub enqueued: u64,
    pub dismissed: u64,
    pub expired: u64,
    /// Timer fires that swept the store (stale fires are not counted).
    pub sweeps: u64,
    pub timers_armed: u64,
}

struct QueueState {
    store: NotificationStore,
    scheduler: ExpiryScheduler<Shared>,
    stats: QueueStats,
    version: u64,
}

struct Shared {
    ttl: Ttl,
    state: Mutex<QueueState>,
    changes: watch::Sender<NotificationSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &mut QueueState) {
        state.version += 1;
        let snapshot = NotificationSnapshot::new(state.version, state.store.snapshot());
        self.changes.send_replace(snapshot);
    }
}

impl FireTarget for Shared {
    fn fire(&self, epoch: u64) {
        let mut guard = self.lock();
        let state = &mut *guard;
        let now = clock_now();

        let Some(outcome) = state.scheduler.on_fire(epoch, &mut state.store, now) else {
            return;
        };
        state.stats.sweeps += 1;
        state.stats.timers_armed = state.scheduler.timers_armed();
        if outcome.removed > 0 {
            state.stats.expired += outcome.removed as u64;
            tracing::debug!(
                removed = outcome.removed,
                remaining = state.store.len(),
                "Expired notifications"
            );
            self.publish(state);
        }
    }
}

/// Queue of short-lived success/failure notifications.
///
/// Every entry disappears `ttl` after it was queued. However many entries
/// are queued, at most one timer is pending. Share across producers with
/// `Arc`; each queue owns its own timer, so independent queues never
/// interfere.
pub struct NotificationQueue {
    shared: Arc<Shared>,
}

impl NotificationQueue {
    /// Create a queue on the current Tokio runtime.
    pub fn new(ttl: Ttl) -> Result<Self, QueueError> {
        Ok(Self::with_runtime(ttl, Handle::try_current()?))
    }

    /// Create a queue whose timer runs on `runtime`.
    ///
    /// `runtime` must outlive the queue. Once it shuts down no timer can be
    /// armed: entries are still queued but never expire, and `is_armed`
    /// stays `false`.
    #[must_use]
    pub fn with_runtime(ttl: Ttl, runtime: Handle) -> Self {
        let (changes, _) = watch::channel(NotificationSnapshot::default());
        let shared = Arc::new_cyclic(|weak| Shared {
            ttl,
            state: Mutex::new(QueueState {
                store: NotificationStore::new(),
                scheduler: ExpiryScheduler::new(weak.clone(), runtime),
                stats: QueueStats::default(),
                version: 0,
            }),
            changes,
        });
        Self { shared }
    }

    /// Queue a success notification.
    pub fn success(&self, title: impl Into<String>) -> NotificationId {
        self.enqueue(NotificationKind::Success, title)
    }

    /// Queue a failure notification.
    pub fn fail(&self, title: impl Into<String>) -> NotificationId {
        self.enqueue(NotificationKind::Failure, title)
    }

    pub fn enqueue(&self, kind: NotificationKind, title: impl Into<String>) -> NotificationId {
        let mut guard = self.shared.lock();
        let state = &mut *guard;
        let now = clock_now();

        let id = state.store.enqueue(kind, title.into(), now, self.shared.ttl);
        state.scheduler.ensure_armed(&state.store, now);
        state.stats.enqueued += 1;
        state.stats.timers_armed = state.scheduler.timers_armed();

        tracing::debug!(
            %id,
            kind = kind.label(),
            queued = state.store.len(),
            "Queued notification"
        );
        self.shared.publish(state);
        id
    }

    /// Remove a notification before it expires.
    ///
    /// Dismissing an id that already expired or was already dismissed is a
    /// no-op; returns whether anything was removed. Emptying the queue this
    /// way also cancels the pending timer.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let mut guard = self.shared.lock();
        let state = &mut *guard;

        if !state.store.dismiss(id) {
            tracing::trace!(%id, "Dismiss of unknown notification ignored");
            return false;
        }
        state.stats.dismissed += 1;
        if state.store.is_empty() {
            state.scheduler.cancel();
        }
        tracing::debug!(%id, remaining = state.store.len(), "Dismissed notification");
        self.shared.publish(state);
        true
    }

    /// Dismiss everything. Returns how many notifications were removed.
    pub fn clear(&self) -> usize {
        let mut guard = self.shared.lock();
        let state = &mut *guard;

        let removed = state.store.clear();
        state.scheduler.cancel();
        if removed > 0 {
            state.stats.dismissed += removed as u64;
            tracing::debug!(removed, "Cleared notifications");
            self.shared.publish(state);
        }
        removed
    }

    /// Current contents, most recent first.
    #[must_use]
    pub fn snapshot(&self) -> NotificationSnapshot {
        let state = self.shared.lock();
        NotificationSnapshot::new(state.version, state.store.snapshot())
    }

    /// Subscribe to changes. The receiver always holds the latest snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NotificationSnapshot> {
        self.shared.changes.subscribe()
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.shared.lock().scheduler.is_armed()
    }

    /// Instant the pending timer will fire at, if one is armed.
    #[must_use]
    pub fn next_expiry(&self) -> Option<Instant> {
        self.shared.lock().scheduler.deadline()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.lock().store.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.lock().store.is_empty()
    }

    #[must_use]
    pub fn ttl(&self) -> Ttl {
        self.shared.ttl
    }

    #[must_use]
    pub fn stats(&self) -> QueueStats {
        self.shared.lock().stats
    }
}

impl std::fmt::Debug for NotificationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("NotificationQueue")
            .field("ttl", &self.shared.ttl)
            .field("len", &state.store.len())
            .field("armed", &state.scheduler.is_armed())
            .finish_non_exhaustive()
    }
}

impl Drop for NotificationQueue {
    fn drop(&mut self) {
        // A fire in progress may briefly hold another strong reference, so
        // cancel explicitly instead of waiting for `Shared` to drop.
        self.shared.lock().scheduler.cancel();
    }
}
