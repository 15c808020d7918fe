//! Clock abstraction and a host-ticked implementation
//!
//! Presentations never sleep or spawn threads. They ask a [`Clock`] to run a
//! callback later and to forget about it again. [`FrameClock`] is the
//! reference implementation: virtual time that only moves when the host
//! advances it, typically once per frame or from a test.

use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;

new_key_type! {
    /// Handle to a scheduled one-shot callback
    pub struct TimerId;
}

/// Deferred callback type
pub type TimerCallback = Box<dyn FnOnce()>;

/// One-shot, cancellable deferred callbacks
///
/// Implementations must never run a callback from inside `schedule` or
/// `cancel`; callbacks run later, from whatever drives the clock, and may
/// themselves schedule or cancel timers on the same clock.
pub trait Clock {
    /// Current time in milliseconds
    fn now_ms(&self) -> f64;

    /// Run `callback` once, `delay_ms` from now
    fn schedule(&self, delay_ms: f64, callback: TimerCallback) -> TimerId;

    /// Cancel a pending callback
    ///
    /// Returns `true` if the callback was still pending.
    fn cancel(&self, id: TimerId) -> bool;
}

struct PendingTimer {
    due_ms: f64,
    /// Tie-breaker so timers with the same deadline fire in scheduling order
    seq: u64,
    callback: TimerCallback,
}

struct ClockInner {
    now_ms: f64,
    next_seq: u64,
    timers: SlotMap<TimerId, PendingTimer>,
}

impl ClockInner {
    /// Remove and return the earliest timer due at or before `limit_ms`
    fn pop_due(&mut self, limit_ms: f64) -> Option<(TimerId, PendingTimer)> {
        let id = self
            .timers
            .iter()
            .filter(|(_, t)| t.due_ms <= limit_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)))
            .map(|(id, _)| id)?;
        self.timers.remove(id).map(|timer| (id, timer))
    }
}

/// Virtual clock driven by the host
///
/// Time starts at zero and moves forward only through [`FrameClock::advance`]
/// or [`FrameClock::tick`]. Due callbacks run in deadline order, and each one
/// is removed from the clock before it runs.
///
/// ```rust
/// use impress_animation::{Clock, FrameClock};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let clock = FrameClock::new();
/// let fired = Rc::new(Cell::new(false));
/// let flag = fired.clone();
/// clock.schedule(100.0, Box::new(move || flag.set(true)));
///
/// clock.advance(99.0);
/// assert!(!fired.get());
/// clock.advance(1.0);
/// assert!(fired.get());
/// ```
pub struct FrameClock {
    inner: RefCell<ClockInner>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(ClockInner {
                now_ms: 0.0,
                next_seq: 0,
                timers: SlotMap::with_key(),
            }),
        }
    }

    /// Move time forward by `dt_ms` and run everything that came due
    ///
    /// Returns the number of callbacks that ran.
    pub fn advance(&self, dt_ms: f64) -> usize {
        let target = self.now_ms() + dt_ms.max(0.0);
        self.run_until(target)
    }

    /// Move time forward to `now_ms`; earlier times are ignored
    ///
    /// Returns the number of callbacks that ran.
    pub fn tick(&self, now_ms: f64) -> usize {
        let target = now_ms.max(self.now_ms());
        self.run_until(target)
    }

    /// Run every pending callback, moving time to each deadline in turn
    ///
    /// Callbacks that keep rescheduling themselves will keep this running;
    /// `limit` bounds the number of callbacks. Returns the number that ran.
    pub fn run_pending(&self, limit: usize) -> usize {
        let mut fired = 0;
        while fired < limit {
            match self.next_deadline() {
                Some(due) => fired += self.run_one(due),
                None => break,
            }
        }
        fired
    }

    /// Number of callbacks still waiting
    pub fn pending(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<f64> {
        self.inner
            .borrow()
            .timers
            .values()
            .map(|t| t.due_ms)
            .min_by(f64::total_cmp)
    }

    fn run_until(&self, target_ms: f64) -> usize {
        let mut fired = 0;
        while self.run_one(target_ms) == 1 {
            fired += 1;
        }
        self.inner.borrow_mut().now_ms = target_ms;
        fired
    }

    /// Run the earliest callback due by `limit_ms`, if any
    fn run_one(&self, limit_ms: f64) -> usize {
        // The borrow must end before the callback runs: it may reschedule
        let due = {
            let mut inner = self.inner.borrow_mut();
            let due = inner.pop_due(limit_ms);
            if let Some((_, timer)) = &due {
                inner.now_ms = inner.now_ms.max(timer.due_ms);
            }
            due
        };

        match due {
            Some((id, timer)) => {
                tracing::trace!("clock: firing {:?} at {}ms", id, timer.due_ms);
                (timer.callback)();
                1
            }
            None => 0,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FrameClock {
    fn now_ms(&self) -> f64 {
        self.inner.borrow().now_ms
    }

    fn schedule(&self, delay_ms: f64, callback: TimerCallback) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        // NaN and negative delays mean "as soon as possible"
        let delay_ms = if delay_ms > 0.0 { delay_ms } else { 0.0 };
        let due_ms = inner.now_ms + delay_ms;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let id = inner.timers.insert(PendingTimer {
            due_ms,
            seq,
            callback,
        });
        tracing::trace!("clock: scheduled {:?} for {}ms", id, due_ms);
        id
    }

    fn cancel(&self, id: TimerId) -> bool {
        let removed = self.inner.borrow_mut().timers.remove(id).is_some();
        if removed {
            tracing::trace!("clock: cancelled {:?}", id);
        }
        removed
    }
}
