//! Presentation steps
//!
//! A [`Step`] is plain data: an id plus a position, orientation and scale in
//! presentation space. Steps are owned by the caller and shared with a
//! presentation through a [`StepHandle`], which is what the registry stores
//! and what identity comparisons use.

use crate::math::Vec3;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::Rc;

/// A named point in presentation space
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Step {
    /// Lookup key for string-based navigation
    pub id: String,
    /// Position of the step's center
    pub translate: Vec3,
    /// Orientation in degrees, applied X then Y then Z
    pub rotate: Vec3,
    /// Size relative to the presentation; must be positive
    pub scale: f64,
    /// Advisory ordering, only consulted by an explicit sort
    pub order: i32,
}

impl Default for Step {
    fn default() -> Self {
        Self {
            id: String::new(),
            translate: Vec3::ZERO,
            rotate: Vec3::ZERO,
            scale: 1.0,
            order: 0,
        }
    }
}

impl Step {
    /// Create a step at the origin with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the position (builder)
    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.translate = Vec3::new(x, y, z);
        self
    }

    /// Set the rotation in degrees (builder)
    pub fn rotated(mut self, x: f64, y: f64, z: f64) -> Self {
        self.rotate = Vec3::new(x, y, z);
        self
    }

    /// Set the scale (builder)
    pub fn scaled(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Set the advisory order (builder)
    pub fn ordered(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

/// Visual lifecycle phase of a step
///
/// Every step is in exactly one phase. It starts out `Future`, becomes
/// `Present` when entered and `Past` when left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StepPhase {
    #[default]
    Future,
    Present,
    Past,
}

impl StepPhase {
    /// Style class name conventionally used for this phase
    pub fn class_name(self) -> &'static str {
        match self {
            StepPhase::Future => "future",
            StepPhase::Present => "present",
            StepPhase::Past => "past",
        }
    }
}

struct StepCell {
    step: RefCell<Step>,
    phase: Cell<StepPhase>,
}

/// Shared reference to a caller-owned step
///
/// Cloning is cheap and yields another reference to the same step.
/// Equality is identity: two handles are equal only if they point at the
/// same step, regardless of the step data.
#[derive(Clone)]
pub struct StepHandle(Rc<StepCell>);

impl StepHandle {
    pub fn new(step: Step) -> Self {
        Self(Rc::new(StepCell {
            step: RefCell::new(step),
            phase: Cell::new(StepPhase::Future),
        }))
    }

    /// Borrow the step data
    ///
    /// # Panics
    ///
    /// Panics if called from inside [`StepHandle::update`] on the same step.
    pub fn get(&self) -> Ref<'_, Step> {
        self.0.step.borrow()
    }

    /// Copy of the current step data
    pub fn snapshot(&self) -> Step {
        self.0.step.borrow().clone()
    }

    pub fn id(&self) -> String {
        self.0.step.borrow().id.clone()
    }

    /// Check the id without cloning it
    pub fn has_id(&self, id: &str) -> bool {
        self.0.step.borrow().id == id
    }

    /// Mutate the step in place
    ///
    /// Presentations are not notified; call `update_step` afterwards to
    /// re-apply the geometry.
    pub fn update<R>(&self, f: impl FnOnce(&mut Step) -> R) -> R {
        f(&mut self.0.step.borrow_mut())
    }

    pub fn phase(&self) -> StepPhase {
        self.0.phase.get()
    }

    /// Set the lifecycle phase. Normally driven by the presentation.
    pub fn set_phase(&self, phase: StepPhase) {
        self.0.phase.set(phase);
    }

    #[inline]
    pub fn ptr_eq(&self, other: &StepHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Step> for StepHandle {
    fn from(step: Step) -> Self {
        Self::new(step)
    }
}

impl PartialEq for StepHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for StepHandle {}

impl fmt::Debug for StepHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepHandle")
            .field("id", &self.0.step.borrow().id)
            .field("phase", &self.phase())
            .finish()
    }
}
