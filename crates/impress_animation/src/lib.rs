//! Impress Animation
//!
//! Timing primitives for presentation transitions.
//!
//! # Features
//!
//! - **Clock**: one-shot, cancellable deferred callbacks behind a trait
//! - **FrameClock**: virtual time advanced by the host (frame loop or tests)
//! - **TimerSlot**: a single pending callback with cancel-and-replace semantics
//! - **Debouncer**: trailing-edge coalescing of bursts of calls

pub mod clock;
pub mod slot;

pub use clock::{Clock, FrameClock, TimerCallback, TimerId};
pub use slot::{Debouncer, TimerSlot};
