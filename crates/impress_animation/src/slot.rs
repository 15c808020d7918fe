//! Single-slot timers
//!
//! A [`TimerSlot`] holds at most one pending callback. Arming it again
//! cancels whatever was pending, so under rapid re-arming only the most
//! recent callback ever runs. [`Debouncer`] builds trailing-edge coalescing
//! on top of it.

use crate::clock::{Clock, TimerId};
use std::cell::Cell;
use std::rc::Rc;

/// At most one pending callback, with cancel-and-replace semantics
pub struct TimerSlot {
    clock: Rc<dyn Clock>,
    pending: Rc<Cell<Option<TimerId>>>,
}

impl TimerSlot {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            pending: Rc::new(Cell::new(None)),
        }
    }

    /// Cancel any pending callback and arm `callback` after `delay_ms`
    pub fn replace<F>(&self, delay_ms: f64, callback: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        self.cancel();
        let pending = Rc::clone(&self.pending);
        let id = self.clock.schedule(
            delay_ms,
            Box::new(move || {
                // Cleared first so the callback may re-arm the slot
                pending.set(None);
                callback();
            }),
        );
        self.pending.set(Some(id));
        id
    }

    /// Cancel the pending callback, returning whether there was one
    pub fn cancel(&self) -> bool {
        match self.pending.take() {
            Some(id) => self.clock.cancel(id),
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }

    pub fn clock(&self) -> &Rc<dyn Clock> {
        &self.clock
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Trailing-edge debouncer
///
/// Every call within `window_ms` of the previous one replaces it; only the
/// last call of a burst runs, `window_ms` after it was made.
pub struct Debouncer {
    slot: TimerSlot,
    window_ms: f64,
}

impl Debouncer {
    pub fn new(clock: Rc<dyn Clock>, window_ms: f64) -> Self {
        Self {
            slot: TimerSlot::new(clock),
            window_ms,
        }
    }

    pub fn call<F>(&self, f: F)
    where
        F: FnOnce() + 'static,
    {
        self.slot.replace(self.window_ms, f);
    }

    pub fn cancel(&self) -> bool {
        self.slot.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }

    pub fn window_ms(&self) -> f64 {
        self.window_ms
    }
}
