//! Stored entries and expiry conversion.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Cap for expiries too far out to be represented as an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// Entry stored in the session store.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    /// Stored payload.
    pub value: V,

    /// Absolute instant after which the entry is logically dead.
    pub expires_at: Instant,
}

impl<V> Entry<V> {
    /// Create a new entry.
    pub fn new(value: V, expires_at: Instant) -> Self {
        Self { value, expires_at }
    }

    /// Check whether the entry is dead as of `now`.
    ///
    /// An entry is still live at exactly its expiry instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    /// Check whether the entry is dead right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Time left before the entry expires, or `None` if it already has.
    pub fn remaining(&self) -> Option<Duration> {
        let now = Instant::now();
        if self.is_expired_at(now) {
            None
        } else {
            Some(self.expires_at.duration_since(now))
        }
    }
}

/// Absolute expiry accepted by [`MemoryStore::insert`](crate::MemoryStore::insert).
///
/// Wall-clock timestamps are converted to a monotonic instant once, at the
/// moment of conversion, so later clock adjustments do not shift the expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Expiry(Instant);

impl Expiry {
    /// Expire `ttl` from now.
    pub fn after(ttl: Duration) -> Self {
        let now = Instant::now();
        Self(now.checked_add(ttl).unwrap_or_else(|| far_future(now)))
    }

    /// The monotonic instant this expiry resolves to.
    pub fn instant(self) -> Instant {
        self.0
    }
}

impl From<Instant> for Expiry {
    fn from(at: Instant) -> Self {
        Self(at)
    }
}

impl From<DateTime<Utc>> for Expiry {
    fn from(at: DateTime<Utc>) -> Self {
        let now = Instant::now();
        let wall_now = Utc::now();

        let instant = match (at - wall_now).to_std() {
            Ok(remaining) => now
                .checked_add(remaining)
                .unwrap_or_else(|| far_future(now)),
            // Already in the past: keep it in the past on the monotonic clock too.
            Err(_) => {
                let overdue = (wall_now - at).to_std().unwrap_or_default();
                now.checked_sub(overdue)
                    .unwrap_or_else(|| far_past(now, overdue))
            }
        };

        Self(instant)
    }
}

fn far_future(now: Instant) -> Instant {
    now.checked_add(FAR_FUTURE).unwrap_or(now)
}

/// Step back from `now` by as much of `overdue` as the platform can represent.
fn far_past(now: Instant, overdue: Duration) -> Instant {
    let mut at = now;
    let mut step = overdue;
    while !step.is_zero() {
        match at.checked_sub(step) {
            Some(earlier) => at = earlier,
            None => step /= 2,
        }
    }
    at
}
