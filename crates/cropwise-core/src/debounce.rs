//! Cancellable single-shot timer.
//!
//! The host owns the clock: it passes an [`Instant`] to every call and polls
//! [`Debouncer::fire_if_due`] from its run loop. At most one firing is pending;
//! scheduling again replaces it.

use std::time::{Duration, Instant};

/// Identifies one scheduled firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(TimerHandle, Instant)>,
    next_id: u64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            next_id: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending firing, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, at)| at)
    }

    /// Schedules a firing `delay` after `now`, replacing any pending one.
    pub fn schedule(&mut self, now: Instant) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending = Some((handle, now + self.delay));
        handle
    }

    /// Cancels the pending firing and schedules a new one.
    pub fn reschedule(&mut self, now: Instant) -> TimerHandle {
        self.cancel();
        self.schedule(now)
    }

    /// Drops the pending firing. Returns its handle when there was one.
    pub fn cancel(&mut self) -> Option<TimerHandle> {
        self.pending.take().map(|(handle, _)| handle)
    }

    /// Consumes the pending firing once its deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> Option<TimerHandle> {
        match self.pending {
            Some((handle, at)) if now >= at => {
                self.pending = None;
                Some(handle)
            }
            _ => None,
        }
    }
}
