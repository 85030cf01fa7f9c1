#![forbid(unsafe_code)]

//! One-shot deadline timer driven by host time.
//!
//! The host passes a monotonic `Duration` (time since session start) into
//! every call, so the timer never sleeps or spawns anything and tests can
//! step time deterministically.

use std::time::Duration;

/// A deferred callback slot: armed with a deadline, fired at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettleTimer {
    deadline: Option<Duration>,
}

impl SettleTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire `delay` after `now`. Re-arming replaces the
    /// previous deadline.
    pub fn arm(&mut self, now: Duration, delay: Duration) {
        self.deadline = Some(now.saturating_add(delay));
    }

    /// Disarm without firing. Returns whether a deadline was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Fire if the deadline has passed. A fired timer is disarmed.
    pub fn fire(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
