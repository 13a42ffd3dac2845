//! Clock and timer slots.
//!
//! Widgets never own real OS timers. Each pending delay is a slot holding a
//! due time; cancelling is clearing the slot. A host advances time and asks
//! controllers to `tick`, and each controller fires whatever slots came due,
//! in time order.
//!
//! Because a slot holds at most one due time, starting an already running
//! [`Interval`] is a no-op: there is no way to end up with two autoplay timers
//! ticking for one carousel.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

#[derive(Debug)]
enum Source {
    System(Instant),
    Manual(Cell<u64>),
}

/// Millisecond clock shared by every controller on a page.
///
/// [`Clock::system`] follows wall time; [`Clock::manual`] only moves when
/// [`Clock::advance`] is called, which is what tests and simulations use.
#[derive(Debug, Clone)]
pub struct Clock {
    source: Rc<Source>,
}

impl Clock {
    pub fn system() -> Self {
        Self {
            source: Rc::new(Source::System(Instant::now())),
        }
    }

    pub fn manual() -> Self {
        Self {
            source: Rc::new(Source::Manual(Cell::new(0))),
        }
    }

    pub fn now_ms(&self) -> u64 {
        match &*self.source {
            Source::System(start) => start.elapsed().as_millis() as u64,
            Source::Manual(now) => now.get(),
        }
    }

    /// Move a manual clock forward. Has no effect on a system clock.
    pub fn advance(&self, ms: u64) {
        if let Source::Manual(now) = &*self.source {
            now.set(now.get() + ms);
        }
    }
}

/// A one-shot delay.
#[derive(Debug, Clone, Default)]
pub struct Timeout {
    due: Option<u64>,
}

impl Timeout {
    /// Arm (or re-arm) the slot to fire `delay_ms` after `now`.
    pub fn start(&mut self, now: u64, delay_ms: u64) {
        self.due = Some(now + delay_ms);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    pub fn due(&self) -> Option<u64> {
        self.due
    }

    /// Fire if due at `now`, clearing the slot.
    pub fn fire(&mut self, now: u64) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

/// A repeating delay with a single live handle.
#[derive(Debug, Clone)]
pub struct Interval {
    period_ms: u64,
    next_due: Option<u64>,
}

impl Interval {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            next_due: None,
        }
    }

    /// Start ticking from `now`. Returns `false` if it was already running.
    pub fn start(&mut self, now: u64) -> bool {
        if self.next_due.is_some() {
            return false;
        }
        self.next_due = Some(now + self.period_ms);
        true
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn period(&self) -> u64 {
        self.period_ms
    }

    /// Change the period. A running interval restarts from `now` so the new
    /// period applies to the very next tick.
    pub fn set_period(&mut self, period_ms: u64, now: u64) {
        self.period_ms = period_ms.max(1);
        if self.next_due.is_some() {
            self.next_due = Some(now + self.period_ms);
        }
    }

    pub fn due(&self) -> Option<u64> {
        self.next_due
    }

    /// Fire one tick if due at `now` and schedule the next one a full period
    /// after `now`.
    ///
    /// Returns the instant the tick was due at. Periods missed while the host
    /// was not ticking are dropped, never replayed.
    pub fn fire(&mut self, now: u64) -> Option<u64> {
        match self.next_due {
            Some(due) if due <= now => {
                self.next_due = Some(now + self.period_ms);
                Some(due)
            }
            _ => None,
        }
    }
}
