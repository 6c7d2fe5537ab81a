//! Fixed-period triggers for the scheduling loop.

use std::time::{Duration, Instant};

/// A periodic trigger driven by the caller's clock.
///
/// `fire` reports at most one firing per call. Periods missed while the
/// caller was stalled are dropped, not replayed: after a long stall the
/// ticker fires once and re-arms relative to the stall, so there is never
/// a burst of catch-up firings.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    deadline: Instant,
}

impl Ticker {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            deadline: now + period,
        }
    }

    /// True when the deadline has passed; re-arms for the next period.
    pub fn fire(&mut self, now: Instant) -> bool {
        if now < self.deadline {
            return false;
        }
        // Re-arm from the old deadline while lateness stays under one
        // period, so jitter does not drift the rate. Beyond that, missed
        // periods are dropped and the phase restarts from now.
        let next = self.deadline + self.period;
        self.deadline = if next <= now { now + self.period } else { next };
        true
    }

    /// When the trigger is next due.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}
