//! Impress
//!
//! Navigation engine for spatial presentations. Steps sit anywhere in 3D
//! space; a single camera moves between them with direction-aware, staggered
//! transitions.
//!
//! The engine renders nothing and never blocks. It talks to the outside
//! world through three seams:
//!
//! - [`RenderSink`]: receives surface transitions and step placements
//! - [`Clock`](impress_animation::Clock): runs the deferred "step entered"
//!   notification and the debounced step updates
//! - [`LifecycleListener`]: observes `Init`, `StepEnter` and `StepLeave`
//!
//! # Example
//!
//! ```rust
//! use impress::{HeadlessSink, Presentation, PresentationEvent};
//! use impress_animation::FrameClock;
//! use impress_core::Step;
//! use std::rc::Rc;
//!
//! let clock = Rc::new(FrameClock::new());
//! let presentation = Presentation::builder("impress", clock.clone())
//!     .sink(HeadlessSink::default())
//!     .listener(|_: &Presentation, event: &PresentationEvent| {
//!         println!("{}", event.name());
//!     })
//!     .build();
//!
//! presentation.init();
//! presentation.add_step(Step::new("overview").scaled(10.0));
//! presentation.add_step(Step::new("detail").at(800.0, 0.0, 0.0));
//!
//! presentation.next();
//! clock.run_pending(16);
//! ```

pub mod error;
pub mod event;
pub mod presentation;
pub mod presentations;
pub mod render;

pub use error::{NavigationError, Result};
pub use event::{LifecycleListener, PresentationEvent};
pub use presentation::{Presentation, PresentationBuilder, DEFAULT_UPDATE_WINDOW_MS};
pub use presentations::{PresentationRegistry, DEFAULT_ROOT_ID};
pub use render::{
    HeadlessRecord, HeadlessSink, RenderSink, Surface, SurfaceTransform, SurfaceTransition,
};

pub use impress_core::{Config, StepHandle, StepPhase, StepRef};
