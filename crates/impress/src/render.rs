//! Rendering sink interface
//!
//! The engine never renders anything itself. It describes, per surface, what
//! transform to transition to and with what timing, and leaves turning that
//! into actual pixels (CSS transforms, GPU matrices, ...) to a [`RenderSink`].
//!
//! Two layered surfaces are driven separately so their transitions can be
//! staggered:
//!
//! ```text
//! Scale surface         perspective(p / s) scale(s)
//!   └─ Orientation      rotateZ rotateY rotateX translate3d
//!        └─ steps       translate3d rotateX rotateY rotateZ scale
//! ```

use impress_core::{Step, StepPhase, Vec3, ViewportSize};
use std::cell::RefCell;
use std::rc::Rc;

/// One of the two layered presentation surfaces
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Outer surface, carries zoom and perspective
    Scale,
    /// Inner surface, carries rotation and translation
    Orientation,
}

/// Target transform of a surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SurfaceTransform {
    /// `perspective` is already divided by `scale`, so the perspective
    /// looks the same at every zoom level
    Scale { scale: f64, perspective: f64 },
    /// Rotation is applied in reverse order (Z, then Y, then X), followed by
    /// the translation
    Orientation { rotate: Vec3, translate: Vec3 },
}

impl SurfaceTransform {
    /// Scale transform for an effective scale and a base perspective
    pub fn scale(scale: f64, base_perspective: f64) -> Self {
        SurfaceTransform::Scale {
            scale,
            perspective: base_perspective / scale,
        }
    }
}

/// A transform plus the timing to reach it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceTransition {
    pub transform: SurfaceTransform,
    pub duration_ms: f64,
    pub delay_ms: f64,
}

impl SurfaceTransition {
    /// Apply without animation
    pub fn immediate(transform: SurfaceTransform) -> Self {
        Self {
            transform,
            duration_ms: 0.0,
            delay_ms: 0.0,
        }
    }
}

/// Where presentation output goes
///
/// Sinks are called while the presentation updates its own state and must
/// not call back into the presentation.
pub trait RenderSink {
    /// Current viewport size, consulted whenever the window scale is computed
    fn viewport(&self) -> ViewportSize;

    /// Start transitioning `surface`
    fn apply_transition(&mut self, surface: Surface, transition: &SurfaceTransition);

    /// Position a step on the orientation surface, centered on its own origin
    fn place_step(&mut self, _step: &Step) {}

    /// A step changed lifecycle phase
    fn phase_changed(&mut self, _step: &Step, _phase: StepPhase) {}
}

/// Everything a [`HeadlessSink`] has been asked to do
#[derive(Clone, Debug, Default)]
pub struct HeadlessRecord {
    pub viewport: ViewportSize,
    pub transitions: Vec<(Surface, SurfaceTransition)>,
    pub placements: Vec<Step>,
    pub phases: Vec<(String, StepPhase)>,
}

/// Sink that renders nothing and records every call
///
/// Clones share the same record, so keep one to inspect what a presentation
/// did with the other. Useful for tests and for running decks without a
/// display.
#[derive(Clone, Debug, Default)]
pub struct HeadlessSink {
    record: Rc<RefCell<HeadlessRecord>>,
}

impl HeadlessSink {
    pub fn new(viewport: ViewportSize) -> Self {
        Self {
            record: Rc::new(RefCell::new(HeadlessRecord {
                viewport,
                ..HeadlessRecord::default()
            })),
        }
    }

    /// Change the reported viewport, e.g. to simulate a window resize
    pub fn set_viewport(&self, viewport: ViewportSize) {
        self.record.borrow_mut().viewport = viewport;
    }

    /// Copy of everything recorded so far
    pub fn record(&self) -> HeadlessRecord {
        self.record.borrow().clone()
    }

    /// Most recent transition applied to `surface`
    pub fn last(&self, surface: Surface) -> Option<SurfaceTransition> {
        self.record
            .borrow()
            .transitions
            .iter()
            .rev()
            .find(|(s, _)| *s == surface)
            .map(|(_, t)| *t)
    }

    pub fn transition_count(&self) -> usize {
        self.record.borrow().transitions.len()
    }

    /// Forget recorded calls, keeping the viewport
    pub fn clear(&self) {
        let mut record = self.record.borrow_mut();
        record.transitions.clear();
        record.placements.clear();
        record.phases.clear();
    }
}

impl RenderSink for HeadlessSink {
    fn viewport(&self) -> ViewportSize {
        self.record.borrow().viewport
    }

    fn apply_transition(&mut self, surface: Surface, transition: &SurfaceTransition) {
        self.record
            .borrow_mut()
            .transitions
            .push((surface, *transition));
    }

    fn place_step(&mut self, step: &Step) {
        self.record.borrow_mut().placements.push(step.clone());
    }

    fn phase_changed(&mut self, step: &Step, phase: StepPhase) {
        self.record
            .borrow_mut()
            .phases
            .push((step.id.clone(), phase));
    }
}
