//! Camera states and transition planning
//!
//! The camera is modeled as the inverse of the active step's transform: it is
//! what gets applied to the whole canvas so the step ends up centered and
//! upright. A transition is split over two surfaces that animate with
//! different start delays:
//!
//! - the **scale** surface carries the zoom
//! - the **orientation** surface carries rotation and translation
//!
//! Zooming in starts with the orientation change and delays the zoom; zooming
//! out starts with the zoom and delays the orientation change.

use crate::config::Config;
use crate::math::Vec3;
use crate::step::Step;

/// Inverse transform applied to the presentation canvas
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub translate: Vec3,
    pub rotate: Vec3,
    pub scale: f64,
}

impl CameraState {
    /// Camera looking at the origin, unrotated, at scale 1
    pub const IDENTITY: CameraState = CameraState {
        translate: Vec3::ZERO,
        rotate: Vec3::ZERO,
        scale: 1.0,
    };

    /// Camera state that brings `step` into centered view
    pub fn for_step(step: &Step) -> Self {
        Self {
            translate: -step.translate,
            rotate: -step.rotate,
            scale: 1.0 / step.scale,
        }
    }

    /// Whether moving from `self` to `target` counts as zooming in
    ///
    /// Equal scales count as zooming in.
    #[inline]
    pub fn zooms_in_to(&self, target: &CameraState) -> bool {
        target.scale >= self.scale
    }

    /// Whether a transition to `target` needs no phase gap between surfaces
    ///
    /// True when the scale is unchanged, or when translation and rotation
    /// are both unchanged. Comparisons are exact.
    pub fn holds_still_to(&self, target: &CameraState) -> bool {
        self.scale == target.scale
            || (self.rotate.exact_eq(&target.rotate) && self.translate.exact_eq(&target.translate))
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Timing and target for one navigation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionPlan {
    pub target: CameraState,
    pub zoom_in: bool,
    /// Duration of each surface's transition
    pub duration_ms: f64,
    /// Start delay for the scale surface
    pub scale_delay_ms: f64,
    /// Start delay for the orientation surface
    pub orient_delay_ms: f64,
    /// Phase gap after suppression; zero when nothing needs staggering
    pub delay_ms: f64,
    /// When the step counts as entered, relative to the start of the transition
    pub enter_after_ms: f64,
}

/// Plan the transition from `current` to `step`
///
/// `duration_ms` overrides the configured transition duration when it is a
/// finite number.
pub fn plan_transition(
    current: &CameraState,
    step: &Step,
    duration_ms: Option<f64>,
    config: &Config,
) -> TransitionPlan {
    let target = CameraState::for_step(step);
    let zoom_in = current.zooms_in_to(&target);

    let duration_ms = duration_ms
        .filter(|d| d.is_finite())
        .unwrap_or(config.transition_duration);
    let half = duration_ms / 2.0;

    let (scale_delay_ms, orient_delay_ms) = if zoom_in { (half, 0.0) } else { (0.0, half) };

    let delay_ms = if current.holds_still_to(&target) {
        0.0
    } else {
        half
    };

    TransitionPlan {
        target,
        zoom_in,
        duration_ms,
        scale_delay_ms,
        orient_delay_ms,
        delay_ms,
        enter_after_ms: duration_ms + delay_ms,
    }
}
