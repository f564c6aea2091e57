use std::time::Duration;

use thiserror::Error;

/// Lifetime of a notification, guaranteed positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ttl(Duration);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("notification TTL must be a positive duration")]
pub struct InvalidTtl;

impl Ttl {
    pub const DEFAULT: Ttl = Ttl(Duration::from_millis(5000));

    pub fn new(duration: Duration) -> Result<Self, InvalidTtl> {
        if duration.is_zero() {
            Err(InvalidTtl)
        } else {
            Ok(Self(duration))
        }
    }

    pub fn from_millis(millis: u64) -> Result<Self, InvalidTtl> {
        Self::new(Duration::from_millis(millis))
    }

    #[must_use]
    pub fn as_duration(self) -> Duration {
        self.0
    }
}

impl Default for Ttl {
    fn default() -> Self {
        Self::DEFAULT
    }
}
