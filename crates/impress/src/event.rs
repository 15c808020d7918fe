//! Lifecycle events
//!
//! A presentation notifies listeners when it is initialized and whenever a
//! step is entered (its transition finished) or left (a transition away from
//! it just started).

use crate::presentation::Presentation;
use impress_core::StepHandle;

/// Something that happened to a presentation
#[derive(Clone, Debug, PartialEq)]
pub enum PresentationEvent {
    /// `init` completed
    Init,
    /// The step is now fully in view
    StepEnter(StepHandle),
    /// The camera started moving away from the step
    StepLeave(StepHandle),
}

impl PresentationEvent {
    /// Conventional event name
    pub fn name(&self) -> &'static str {
        match self {
            PresentationEvent::Init => "impress:init",
            PresentationEvent::StepEnter(_) => "impress:stepenter",
            PresentationEvent::StepLeave(_) => "impress:stepleave",
        }
    }

    /// Step the event is about, if any
    pub fn step(&self) -> Option<&StepHandle> {
        match self {
            PresentationEvent::Init => None,
            PresentationEvent::StepEnter(step) | PresentationEvent::StepLeave(step) => Some(step),
        }
    }
}

/// Receives lifecycle events
///
/// Listeners get the presentation itself and may call back into it, e.g. to
/// advance automatically from a `StepEnter` handler.
pub trait LifecycleListener {
    fn on_event(&self, presentation: &Presentation, event: &PresentationEvent);
}

impl<F> LifecycleListener for F
where
    F: Fn(&Presentation, &PresentationEvent),
{
    fn on_event(&self, presentation: &Presentation, event: &PresentationEvent) {
        self(presentation, event)
    }
}
