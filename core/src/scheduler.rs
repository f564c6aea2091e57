//! Expiry scheduler — owns the single pending timer of one queue.
//!
//! Idle: no timer. Armed: exactly one Tokio task sleeping until the earliest
//! expiry in the store. Arming while Armed is a no-op; that is the whole
//! coalescing guarantee. Each armed timer carries an epoch, and a fire is only
//! honored when its epoch matches the armed one. A callback that was already
//! running when its timer was cancelled or replaced therefore does nothing.

use std::sync::Weak;
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::store::{NotificationStore, SweepOutcome};

/// Receiver of timer fires.
///
/// The timer task holds only a `Weak` to its target, so a pending timer never
/// keeps a disposed queue alive.
pub(crate) trait FireTarget: Send + Sync + 'static {
    fn fire(&self, epoch: u64);
}

/// Current time on Tokio's clock (virtual under a paused test runtime).
pub(crate) fn clock_now() -> Instant {
    tokio::time::Instant::now().into_std()
}

#[derive(Debug)]
struct ArmedTimer {
    epoch: u64,
    deadline: Instant,
    task: JoinHandle<()>,
}

#[derive(Debug)]
enum SchedulerState {
    Idle,
    Armed(ArmedTimer),
}

pub(crate) struct ExpiryScheduler<T: FireTarget> {
    target: Weak<T>,
    runtime: Handle,
    state: SchedulerState,
    next_epoch: u64,
    timers_armed: u64,
}

impl<T: FireTarget> ExpiryScheduler<T> {
    pub fn new(target: Weak<T>, runtime: Handle) -> Self {
        Self {
            target,
            runtime,
            state: SchedulerState::Idle,
            next_epoch: 0,
            timers_armed: 0,
        }
    }

    /// Arm a timer for the earliest expiry in `store` unless one is already
    /// pending. Does nothing for an empty store.
    pub fn ensure_armed(&mut self, store: &NotificationStore, now: Instant) {
        if let SchedulerState::Armed(timer) = &self.state {
            tracing::trace!(epoch = timer.epoch, "Expiry timer already armed");
            return;
        }
        if let Some(earliest) = store.earliest_expiry() {
            self.arm(earliest, now);
        }
    }

    /// Handle a fire for `epoch` at `now`.
    ///
    /// Returns `None` when the fire is stale. Otherwise sweeps the store and
    /// either re-arms for the next expiry or goes idle.
    pub fn on_fire(
        &mut self,
        epoch: u64,
        store: &mut NotificationStore,
        now: Instant,
    ) -> Option<SweepOutcome> {
        match &self.state {
            SchedulerState::Armed(timer) if timer.epoch == epoch => {}
            _ => {
                tracing::trace!(epoch, "Ignoring stale expiry timer");
                return None;
            }
        }

        // The firing task is finishing on its own; drop its handle, don't abort.
        self.state = SchedulerState::Idle;

        let outcome = store.sweep_expired(now);
        match outcome.next_expiry {
            Some(next) => self.arm(next, now),
            None => tracing::debug!(epoch, "Notification store empty, scheduler idle"),
        }
        Some(outcome)
    }

    /// Abort the pending timer, if any, and go idle.
    pub fn cancel(&mut self) {
        if let SchedulerState::Armed(timer) =
            std::mem::replace(&mut self.state, SchedulerState::Idle)
        {
            tracing::debug!(epoch = timer.epoch, "Cancelled expiry timer");
            timer.task.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, SchedulerState::Armed(_))
    }

    /// Instant the pending timer targets.
    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            SchedulerState::Armed(timer) => Some(timer.deadline),
            SchedulerState::Idle => None,
        }
    }

    /// Total timers ever armed by this scheduler.
    pub fn timers_armed(&self) -> u64 {
        self.timers_armed
    }

    #[cfg(test)]
    fn armed_epoch(&self) -> Option<u64> {
        match &self.state {
            SchedulerState::Armed(timer) => Some(timer.epoch),
            SchedulerState::Idle => None,
        }
    }

    fn arm(&mut self, deadline: Instant, now: Instant) {
        let epoch = self.next_epoch;
        self.next_epoch += 1;

        let delay = deadline.saturating_duration_since(now);
        let target = self.target.clone();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(target) = target.upgrade() {
                target.fire(epoch);
            }
        });

        // A runtime that has shut down completes spawned tasks as cancelled
        // before `spawn` returns. The queue holds the lock across this call,
        // so a live timer cannot have reached `fire` yet.
        if task.is_finished() {
            tracing::warn!(epoch, "Runtime has shut down; expiry timer not armed");
            return;
        }

        self.timers_armed += 1;
        tracing::debug!(epoch, ?delay, "Armed expiry timer");
        self.state = SchedulerState::Armed(ArmedTimer {
            epoch,
            deadline,
            task,
        });
    }
}

impl<T: FireTarget> Drop for ExpiryScheduler<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
