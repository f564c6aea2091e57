use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::NotificationId;

/// Outcome a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Failure,
}

impl NotificationKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "ok",
            Self::Failure => "fail",
        }
    }
}

/// A single transient notification.
///
/// Fields are private; a notification never changes after it is queued.
/// Consumers read via accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    id: NotificationId,
    kind: NotificationKind,
    title: String,
    expires_at: Instant,
}

impl Notification {
    #[must_use]
    pub fn new(
        id: NotificationId,
        kind: NotificationKind,
        title: String,
        expires_at: Instant,
    ) -> Self {
        Self {
            id,
            kind,
            title,
            expires_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> NotificationId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// An entry whose expiry equals `now` is already expired.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Immutable, ordered view of a queue, suitable for UI rendering.
///
/// Entries are most recent first. `version` increases by one for every
/// change the queue publishes, so a renderer can skip redundant frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationSnapshot {
    version: u64,
    entries: Vec<Notification>,
}

impl NotificationSnapshot {
    #[must_use]
    pub fn new(version: u64, entries: Vec<Notification>) -> Self {
        Self { version, entries }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<NotificationId> {
        self.entries.iter().map(Notification::id).collect()
    }
}

impl<'a> IntoIterator for &'a NotificationSnapshot {
    type Item = &'a Notification;
    type IntoIter = std::slice::Iter<'a, Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
