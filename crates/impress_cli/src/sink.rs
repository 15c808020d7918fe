//! Render sink that writes what it is asked to do to the log

use impress::{RenderSink, Surface, SurfaceTransform, SurfaceTransition};
use impress_core::{Step, StepPhase, ViewportSize};
use tracing::{debug, trace};

/// Headless sink for the player
pub struct LogSink {
    viewport: ViewportSize,
}

impl LogSink {
    pub fn new(viewport: ViewportSize) -> Self {
        Self { viewport }
    }
}

impl RenderSink for LogSink {
    fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    fn apply_transition(&mut self, surface: Surface, transition: &SurfaceTransition) {
        let transform = match transition.transform {
            SurfaceTransform::Scale { scale, perspective } => {
                format!("perspective({perspective}px) scale({scale})")
            }
            SurfaceTransform::Orientation { rotate, translate } => format!(
                "rotateZ({}deg) rotateY({}deg) rotateX({}deg) translate3d({}px,{}px,{}px)",
                rotate.z, rotate.y, rotate.x, translate.x, translate.y, translate.z
            ),
        };
        debug!(
            "{:?} surface -> {} over {}ms after {}ms",
            surface, transform, transition.duration_ms, transition.delay_ms
        );
    }

    fn place_step(&mut self, step: &Step) {
        trace!(
            "place '{}' at ({}, {}, {}) rotate ({}, {}, {}) scale {}",
            step.id,
            step.translate.x,
            step.translate.y,
            step.translate.z,
            step.rotate.x,
            step.rotate.y,
            step.rotate.z,
            step.scale
        );
    }

    fn phase_changed(&mut self, step: &Step, phase: StepPhase) {
        trace!("'{}' is now {}", step.id, phase.class_name());
    }
}
