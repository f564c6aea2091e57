//! Transient notification queue with coalesced TTL expiry.
//!
//! Producers call [`NotificationQueue::success`] / [`NotificationQueue::fail`];
//! renderers read [`NotificationQueue::snapshot`] or subscribe to changes.
//! Entries expire a fixed TTL after they were queued, swept by a single timer
//! per queue.

mod queue;
mod scheduler;
mod store;

pub use herald_types::{
    InvalidTtl, Notification, NotificationId, NotificationKind, NotificationSnapshot, Ttl,
};
pub use queue::{NotificationQueue, QueueError, QueueStats};
