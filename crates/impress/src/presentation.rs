//! Presentation navigation state machine
//!
//! A [`Presentation`] owns the step registry, the single camera state and the
//! single pending "enter" timer of one presentation root. Navigation is
//! synchronous: sink transitions are applied and `StepLeave` is emitted
//! before `goto` returns. Only `StepEnter` is deferred, until the transition
//! is expected to have finished.
//!
//! # Re-entrancy
//!
//! Listeners may call back into the presentation. Events are emitted only
//! after internal state has been released, so a `StepEnter` handler can
//! call `next()` without any special care. `StepLeave` is emitted before the
//! camera moves: its listeners still see the step being left as active.
//!
//! ```rust
//! use impress::{HeadlessSink, Presentation};
//! use impress_animation::FrameClock;
//! use impress_core::Step;
//! use std::rc::Rc;
//!
//! let clock = Rc::new(FrameClock::new());
//! let deck = Presentation::builder("impress", clock.clone())
//!     .sink(HeadlessSink::default())
//!     .build();
//! deck.init();
//!
//! let intro = deck.add_step(Step::new("intro"));
//! deck.add_step(Step::new("details").at(1000.0, 0.0, 0.0));
//! assert_eq!(deck.active_step(), Some(intro));
//!
//! deck.next();
//! clock.advance(2000.0);
//! assert_eq!(deck.active_step().unwrap().id(), "details");
//! ```

use crate::error::{NavigationError, Result};
use crate::event::{LifecycleListener, PresentationEvent};
use crate::render::{HeadlessSink, RenderSink, Surface, SurfaceTransform, SurfaceTransition};
use impress_animation::{Clock, Debouncer, TimerSlot};
use impress_core::{
    compute_window_scale, plan_transition, Added, CameraState, Config, ConfigSource,
    StepHandle, StepPhase, StepRef, StepRegistry,
};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Coalescing window for re-navigation after a step is updated
pub const DEFAULT_UPDATE_WINDOW_MS: f64 = 100.0;

type Listeners = SmallVec<[Rc<dyn LifecycleListener>; 4]>;

/// Mutable navigation state
struct NavState {
    initialized: bool,
    config: Config,
    window_scale: f64,
    current: CameraState,
    steps: StepRegistry,
    active: Option<StepHandle>,
    /// Last step a `StepEnter` was emitted for, cleared when it is left
    last_entered: Option<StepHandle>,
}

impl NavState {
    /// Leave `step` if it is the last entered one
    fn leave(&mut self, step: &StepHandle) -> Option<PresentationEvent> {
        if self.last_entered.as_ref() != Some(step) {
            return None;
        }
        self.last_entered = None;
        step.set_phase(StepPhase::Past);
        Some(PresentationEvent::StepLeave(step.clone()))
    }

    /// Enter the active step unless it already is the last entered one
    fn enter_active(&mut self) -> Option<PresentationEvent> {
        let active = self.active.clone()?;
        if self.last_entered.as_ref() == Some(&active) {
            return None;
        }
        self.last_entered = Some(active.clone());
        active.set_phase(StepPhase::Present);
        Some(PresentationEvent::StepEnter(active))
    }
}

struct PresentationInner {
    root_id: String,
    state: RefCell<NavState>,
    sink: RefCell<Box<dyn RenderSink>>,
    config_source: Box<dyn ConfigSource>,
    listeners: RefCell<Vec<Rc<dyn LifecycleListener>>>,
    enter_timer: TimerSlot,
    update_debounce: Debouncer,
}

/// Handle to one presentation
///
/// Cheap to clone; clones refer to the same presentation.
#[derive(Clone)]
pub struct Presentation {
    inner: Rc<PresentationInner>,
}

impl Presentation {
    /// Start building a presentation for `root_id`, timed by `clock`
    pub fn builder(root_id: impl Into<String>, clock: Rc<dyn Clock>) -> PresentationBuilder {
        PresentationBuilder {
            root_id: root_id.into(),
            clock,
            sink: None,
            config_source: None,
            listeners: Vec::new(),
            update_window_ms: DEFAULT_UPDATE_WINDOW_MS,
        }
    }

    fn from_weak(weak: &Weak<PresentationInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Initialize the presentation
    ///
    /// Resolves the configuration, computes the window scale, lays out the
    /// scale surface and resets the camera. Emits `Init`. If steps were added
    /// beforehand, the first one is selected. Calling it again does nothing.
    pub fn init(&self) {
        let select_first = {
            let mut state = self.inner.state.borrow_mut();
            if state.initialized {
                return;
            }

            let config = Config::from_source(self.inner.config_source.as_ref());
            let mut sink = self.inner.sink.borrow_mut();
            let window_scale = compute_window_scale(sink.viewport(), &config);
            sink.apply_transition(
                Surface::Scale,
                &SurfaceTransition::immediate(SurfaceTransform::scale(
                    window_scale,
                    config.perspective,
                )),
            );

            state.config = config;
            state.window_scale = window_scale;
            state.current = CameraState::IDENTITY;
            state.initialized = true;

            tracing::debug!(
                "presentation '{}': initialized, window scale {}",
                self.inner.root_id,
                window_scale
            );
            !state.steps.is_empty() && state.active.is_none()
        };

        self.emit([PresentationEvent::Init]);

        if select_first {
            self.goto(0);
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.state.borrow().initialized
    }

    pub fn root_id(&self) -> &str {
        &self.inner.root_id
    }

    /// Register a listener for lifecycle events
    pub fn add_listener<L>(&self, listener: L)
    where
        L: LifecycleListener + 'static,
    {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Move to a step using the configured transition duration
    ///
    /// Returns the step, or `None` if the presentation is not initialized or
    /// the reference does not resolve; nothing changes in that case.
    pub fn goto<'a>(&self, step: impl Into<StepRef<'a>>) -> Option<StepHandle> {
        self.try_goto(step, None).ok()
    }

    /// Move to a step with an explicit transition duration
    pub fn goto_with_duration<'a>(
        &self,
        step: impl Into<StepRef<'a>>,
        duration_ms: f64,
    ) -> Option<StepHandle> {
        self.try_goto(step, Some(duration_ms)).ok()
    }

    /// Move to a step, reporting why nothing happened on failure
    pub fn try_goto<'a>(
        &self,
        step: impl Into<StepRef<'a>>,
        duration_ms: Option<f64>,
    ) -> Result<StepHandle> {
        let step_ref = step.into();

        // Leave first, while the step being left is still active
        let leave = {
            let mut state = self.inner.state.borrow_mut();
            if !state.initialized {
                return Err(NavigationError::NotInitialized);
            }
            let target = state
                .steps
                .resolve(step_ref)
                .ok_or_else(|| NavigationError::not_found(step_ref))?;
            match state.active.clone() {
                Some(active) if active != target => state.leave(&active),
                _ => None,
            }
        };
        self.emit(leave);

        let mut state = self.inner.state.borrow_mut();
        // A leave listener may have removed the target
        let target = state
            .steps
            .resolve(step_ref)
            .ok_or_else(|| NavigationError::not_found(step_ref))?;
        let reselect = state.active.as_ref() == Some(&target);

        let plan = plan_transition(&state.current, &target.get(), duration_ms, &state.config);

        let mut sink = self.inner.sink.borrow_mut();
        if reselect {
            // Re-selecting the active step is how hosts signal a resize
            state.window_scale = compute_window_scale(sink.viewport(), &state.config);
        }

        let scale = plan.target.scale * state.window_scale;
        sink.apply_transition(
            Surface::Scale,
            &SurfaceTransition {
                transform: SurfaceTransform::scale(scale, state.config.perspective),
                duration_ms: plan.duration_ms,
                delay_ms: plan.scale_delay_ms,
            },
        );
        sink.apply_transition(
            Surface::Orientation,
            &SurfaceTransition {
                transform: SurfaceTransform::Orientation {
                    rotate: plan.target.rotate,
                    translate: plan.target.translate,
                },
                duration_ms: plan.duration_ms,
                delay_ms: plan.orient_delay_ms,
            },
        );
        drop(sink);

        tracing::debug!(
            "presentation '{}': goto '{}' (zoom {}, duration {}ms, enter in {}ms)",
            self.inner.root_id,
            target.id(),
            if plan.zoom_in { "in" } else { "out" },
            plan.duration_ms,
            plan.enter_after_ms
        );

        state.current = plan.target;
        state.active = Some(target.clone());
        self.arm_enter(plan.enter_after_ms);
        Ok(target)
    }

    /// Move to the step after the active one, wrapping to the first
    pub fn next(&self) -> Option<StepHandle> {
        let index = {
            let state = self.inner.state.borrow();
            match self.active_index(&state) {
                Some(i) if i + 1 < state.steps.len() => (i + 1) as isize,
                _ => 0,
            }
        };
        self.goto(index)
    }

    /// Move to the step before the active one, wrapping to the last
    pub fn prev(&self) -> Option<StepHandle> {
        let index = {
            let state = self.inner.state.borrow();
            match self.active_index(&state) {
                Some(i) if i >= 1 => (i - 1) as isize,
                _ => -1,
            }
        };
        self.goto(index)
    }

    fn active_index(&self, state: &NavState) -> Option<usize> {
        state
            .active
            .as_ref()
            .and_then(|active| state.steps.index_of(active))
    }

    /// Cancel the pending enter notification and arm a new one
    ///
    /// The callback enters whatever step is active when it fires.
    fn arm_enter(&self, delay_ms: f64) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.enter_timer.replace(delay_ms, move || {
            if let Some(presentation) = Presentation::from_weak(&weak) {
                let event = presentation.inner.state.borrow_mut().enter_active();
                presentation.emit(event);
            }
        });
    }

    // =========================================================================
    // STEPS
    // =========================================================================

    /// Register a step and place it on the sink
    ///
    /// The first step ever added to an initialized presentation becomes the
    /// active step. Adding an already registered step does nothing.
    pub fn add_step(&self, step: impl Into<StepHandle>) -> StepHandle {
        let step = step.into();
        let added = self.inner.state.borrow_mut().steps.add(step.clone());
        if added == Added::AlreadyRegistered {
            return step;
        }

        self.inner.sink.borrow_mut().place_step(&step.get());

        if added == Added::First {
            self.goto(0);
        }
        step
    }

    /// Unregister a step
    ///
    /// If it is the active step, the presentation first moves to the
    /// previous step. Returns the removed step, or `None` if it was not
    /// registered.
    pub fn remove_step<'a>(&self, step: impl Into<StepRef<'a>>) -> Option<StepHandle> {
        let step_ref = step.into();
        let (removed, was_active) = {
            let state = self.inner.state.borrow();
            let removed = state.steps.resolve(step_ref)?;
            let was_active = state.active.as_ref() == Some(&removed);
            (removed, was_active)
        };

        if was_active {
            self.prev();
        }

        // Only step left: there was nowhere else to go
        let leave = {
            let mut state = self.inner.state.borrow_mut();
            if state.active.as_ref() == Some(&removed) {
                state.leave(&removed)
            } else {
                None
            }
        };
        self.emit(leave);

        let mut state = self.inner.state.borrow_mut();
        state.steps.remove(StepRef::Step(&removed));
        if state.active.as_ref() == Some(&removed) {
            state.active = None;
            self.inner.enter_timer.cancel();
        }
        tracing::debug!(
            "presentation '{}': removed step '{}'",
            self.inner.root_id,
            removed.id()
        );
        Some(removed)
    }

    /// Re-apply a step's geometry after it was changed through its handle
    ///
    /// If the step is active the camera follows it too, debounced so a burst
    /// of updates causes a single re-navigation. Returns `false` for steps
    /// that are not registered.
    pub fn update_step(&self, step: &StepHandle) -> bool {
        let is_active = {
            let state = self.inner.state.borrow();
            if !state.steps.contains(step) {
                return false;
            }
            state.active.as_ref() == Some(step)
        };

        self.inner.sink.borrow_mut().place_step(&step.get());

        if is_active {
            let weak = Rc::downgrade(&self.inner);
            let step = step.clone();
            self.inner.update_debounce.call(move || {
                if let Some(presentation) = Presentation::from_weak(&weak) {
                    presentation.goto(&step);
                }
            });
        }
        true
    }

    /// Stable-sort the steps by their `order`
    pub fn sort_steps(&self) {
        self.inner.state.borrow_mut().steps.sort_by_order();
    }

    // =========================================================================
    // STATE
    // =========================================================================

    pub fn active_step(&self) -> Option<StepHandle> {
        self.inner.state.borrow().active.clone()
    }

    /// Registered steps in presentation order
    pub fn steps(&self) -> Vec<StepHandle> {
        self.inner.state.borrow().steps.as_slice().to_vec()
    }

    pub fn step_count(&self) -> usize {
        self.inner.state.borrow().steps.len()
    }

    /// Look up a registered step without navigating
    pub fn step<'a>(&self, step: impl Into<StepRef<'a>>) -> Option<StepHandle> {
        self.inner.state.borrow().steps.resolve(step.into())
    }

    /// Current camera state; `None` before `init`
    pub fn camera_state(&self) -> Option<CameraState> {
        let state = self.inner.state.borrow();
        state.initialized.then_some(state.current)
    }

    /// Current window scale; `None` before `init`
    pub fn window_scale(&self) -> Option<f64> {
        let state = self.inner.state.borrow();
        state.initialized.then_some(state.window_scale)
    }

    /// Resolved configuration; `None` before `init`
    pub fn config(&self) -> Option<Config> {
        let state = self.inner.state.borrow();
        state.initialized.then_some(state.config)
    }

    /// Whether a `StepEnter` notification is still pending
    pub fn is_transitioning(&self) -> bool {
        self.inner.enter_timer.is_pending()
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    fn emit(&self, events: impl IntoIterator<Item = PresentationEvent>) {
        for event in events {
            if let Some(step) = event.step() {
                self.inner
                    .sink
                    .borrow_mut()
                    .phase_changed(&step.get(), step.phase());
            }
            tracing::debug!(
                "presentation '{}': {} {}",
                self.inner.root_id,
                event.name(),
                event.step().map(StepHandle::id).unwrap_or_default()
            );

            // Listeners may add listeners
            let listeners: Listeners = self.inner.listeners.borrow().iter().cloned().collect();
            for listener in listeners {
                listener.on_event(self, &event);
            }
        }
    }
}

impl PartialEq for Presentation {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Presentation")
            .field("root_id", &self.inner.root_id)
            .field("initialized", &state.initialized)
            .field("steps", &state.steps.len())
            .field("active", &state.active)
            .finish()
    }
}

/// Builder for [`Presentation`]
pub struct PresentationBuilder {
    root_id: String,
    clock: Rc<dyn Clock>,
    sink: Option<Box<dyn RenderSink>>,
    config_source: Option<Box<dyn ConfigSource>>,
    listeners: Vec<Rc<dyn LifecycleListener>>,
    update_window_ms: f64,
}

impl PresentationBuilder {
    /// Where transitions go (default: a [`HeadlessSink`])
    pub fn sink<S: RenderSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Where `init` reads config overrides from (default: none)
    pub fn config_source<C: ConfigSource + 'static>(mut self, source: C) -> Self {
        self.config_source = Some(Box::new(source));
        self
    }

    pub fn listener<L: LifecycleListener + 'static>(mut self, listener: L) -> Self {
        self.listeners.push(Rc::new(listener));
        self
    }

    /// Coalescing window for `update_step` re-navigation
    pub fn update_window_ms(mut self, window_ms: f64) -> Self {
        self.update_window_ms = window_ms;
        self
    }

    pub fn build(self) -> Presentation {
        let sink = self
            .sink
            .unwrap_or_else(|| Box::new(HeadlessSink::default()));
        let config_source = self.config_source.unwrap_or_else(|| Box::new(()));

        Presentation {
            inner: Rc::new(PresentationInner {
                root_id: self.root_id,
                state: RefCell::new(NavState {
                    initialized: false,
                    config: Config::default(),
                    window_scale: 1.0,
                    current: CameraState::IDENTITY,
                    steps: StepRegistry::new(),
                    active: None,
                    last_entered: None,
                }),
                sink: RefCell::new(sink),
                config_source,
                listeners: RefCell::new(self.listeners),
                enter_timer: TimerSlot::new(self.clock.clone()),
                update_debounce: Debouncer::new(self.clock, self.update_window_ms),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impress_animation::FrameClock;
    use impress_core::{overrides, Step, Vec3, ViewportSize};

    /// Presentation wired to a virtual clock, a recording sink and an event log
    struct Harness {
        clock: Rc<FrameClock>,
        sink: HeadlessSink,
        events: Rc<RefCell<Vec<(&'static str, String)>>>,
        deck: Presentation,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_viewport(ViewportSize::new(1024.0, 768.0))
        }

        fn with_viewport(viewport: ViewportSize) -> Self {
            let clock = Rc::new(FrameClock::new());
            let sink = HeadlessSink::new(viewport);
            let events = Rc::new(RefCell::new(Vec::new()));
            let log = events.clone();
            let deck = Presentation::builder("test", clock.clone())
                .sink(sink.clone())
                .listener(move |_: &Presentation, event: &PresentationEvent| {
                    let id = event.step().map(StepHandle::id).unwrap_or_default();
                    log.borrow_mut().push((event.name(), id));
                })
                .build();
            Self {
                clock,
                sink,
                events,
                deck,
            }
        }

        fn initialized() -> Self {
            let harness = Self::new();
            harness.deck.init();
            harness
        }

        fn add(&self, step: Step) -> StepHandle {
            self.deck.add_step(step)
        }

        fn settle(&self) {
            self.clock.run_pending(1000);
        }

        fn enters(&self) -> Vec<String> {
            self.named("impress:stepenter")
        }

        fn leaves(&self) -> Vec<String> {
            self.named("impress:stepleave")
        }

        fn named(&self, name: &str) -> Vec<String> {
            self.events
                .borrow()
                .iter()
                .filter(|(n, _)| *n == name)
                .map(|(_, id)| id.clone())
                .collect()
        }

        fn active_id(&self) -> Option<String> {
            self.deck.active_step().map(|s| s.id())
        }
    }

    #[test]
    fn test_init_is_idempotent() {
        let h = Harness::new();
        assert!(!h.deck.is_initialized());
        assert!(h.deck.camera_state().is_none());

        h.deck.init();
        h.deck.init();

        assert!(h.deck.is_initialized());
        assert_eq!(h.deck.camera_state(), Some(CameraState::IDENTITY));
        assert_eq!(h.named("impress:init").len(), 1);
        // Initial layout of the scale surface only
        assert_eq!(h.sink.transition_count(), 1);
    }

    #[test]
    fn test_init_reads_config_source() {
        let clock = Rc::new(FrameClock::new());
        let deck = Presentation::builder("cfg", clock)
            .sink(HeadlessSink::new(ViewportSize::new(800.0, 600.0)))
            .config_source(overrides([("transitionDuration", "250"), ("width", "oops")]))
            .build();
        assert!(deck.config().is_none());

        deck.init();
        let config = deck.config().unwrap();
        assert_eq!(config.transition_duration, 250.0);
        assert_eq!(config.width, 1024.0);
        assert_eq!(deck.window_scale(), Some(0.78125));
    }

    #[test]
    fn test_init_lays_out_scale_surface() {
        let h = Harness::with_viewport(ViewportSize::new(512.0, 384.0));
        h.deck.init();
        let layout = h.sink.last(Surface::Scale).unwrap();
        assert_eq!(
            layout,
            SurfaceTransition::immediate(SurfaceTransform::Scale {
                scale: 0.5,
                perspective: 2000.0
            })
        );
    }

    #[test]
    fn test_goto_before_init_fails() {
        let h = Harness::new();
        let a = h.add(Step::new("a"));
        assert_eq!(h.deck.try_goto(&a, None), Err(NavigationError::NotInitialized));
        assert!(h.deck.active_step().is_none());
    }

    #[test]
    fn test_first_step_is_selected() {
        let h = Harness::initialized();
        let a = h.add(Step::new("a"));
        h.add(Step::new("b"));
        assert_eq!(h.deck.active_step(), Some(a));

        h.settle();
        assert_eq!(h.enters(), vec!["a"]);
        assert_eq!(h.deck.step(0).unwrap().phase(), StepPhase::Present);
    }

    #[test]
    fn test_steps_added_before_init_are_selected_on_init() {
        let h = Harness::new();
        h.add(Step::new("a"));
        h.add(Step::new("b"));
        assert!(h.deck.active_step().is_none());

        h.deck.init();
        assert_eq!(h.active_id().as_deref(), Some("a"));
        assert_eq!(h.events.borrow()[0].0, "impress:init");
    }

    #[test]
    fn test_unresolved_goto_changes_nothing() {
        let h = Harness::initialized();
        h.add(Step::new("a").scaled(2.0));
        h.settle();
        let camera = h.deck.camera_state();
        let transitions = h.sink.transition_count();

        assert!(h.deck.goto("missing").is_none());
        assert!(h.deck.goto(5).is_none());
        let stranger = StepHandle::new(Step::new("a"));
        assert_eq!(
            h.deck.try_goto(&stranger, None),
            Err(NavigationError::StepNotFound("'a' (unregistered)".into()))
        );

        assert_eq!(h.deck.camera_state(), camera);
        assert_eq!(h.active_id().as_deref(), Some("a"));
        assert_eq!(h.sink.transition_count(), transitions);
        assert!(!h.deck.is_transitioning());
    }

    #[test]
    fn test_goto_applies_both_surfaces() {
        let h = Harness::initialized();
        h.add(Step::new("a"));
        h.add(
            Step::new("b")
                .at(500.0, 250.0, 0.0)
                .rotated(0.0, 0.0, 90.0)
                .scaled(2.0),
        );
        h.settle();

        h.deck.goto("b");
        let camera = h.deck.camera_state().unwrap();
        assert_eq!(camera.translate, Vec3::new(-500.0, -250.0, 0.0));
        assert_eq!(camera.rotate, Vec3::new(0.0, 0.0, -90.0));
        assert_eq!(camera.scale, 0.5);

        // Zooming out: scale leads, orientation is delayed
        let scale = h.sink.last(Surface::Scale).unwrap();
        assert_eq!(scale.transform, SurfaceTransform::scale(0.5, 1000.0));
        assert_eq!(scale.duration_ms, 1000.0);
        assert_eq!(scale.delay_ms, 0.0);

        let orient = h.sink.last(Surface::Orientation).unwrap();
        assert_eq!(
            orient.transform,
            SurfaceTransform::Orientation {
                rotate: Vec3::new(0.0, 0.0, -90.0),
                translate: Vec3::new(-500.0, -250.0, 0.0),
            }
        );
        assert_eq!(orient.delay_ms, 500.0);
    }

    #[test]
    fn test_window_scale_multiplies_into_scale_surface() {
        let h = Harness::with_viewport(ViewportSize::new(800.0, 600.0));
        h.deck.init();
        h.add(Step::new("a").scaled(0.5));

        let scale = h.sink.last(Surface::Scale).unwrap();
        assert_eq!(scale.transform, SurfaceTransform::scale(2.0 * 0.78125, 1000.0));
    }

    #[test]
    fn test_enter_fires_after_duration_plus_delay() {
        let h = Harness::initialized();
        h.add(Step::new("a"));
        h.add(Step::new("b").at(100.0, 0.0, 0.0).scaled(2.0));
        h.settle();

        h.deck.goto_with_duration("b", 400.0);
        h.clock.advance(599.0);
        assert_eq!(h.enters(), vec!["a"]);
        h.clock.advance(1.0);
        assert_eq!(h.enters(), vec!["a", "b"]);
    }

    #[test]
    fn test_leave_is_immediate() {
        let h = Harness::initialized();
        let a = h.add(Step::new("a"));
        h.add(Step::new("b"));
        h.settle();

        h.deck.next();
        assert_eq!(h.leaves(), vec!["a"]);
        assert_eq!(a.phase(), StepPhase::Past);
        assert!(h.deck.is_transitioning());
    }

    #[test]
    fn test_rapid_navigation_enters_once() {
        let h = Harness::initialized();
        h.add(Step::new("s0"));
        h.add(Step::new("s1").at(1000.0, 0.0, 0.0));
        h.add(Step::new("s2").at(2000.0, 0.0, 0.0));
        h.settle();

        h.deck.goto("s1");
        h.clock.advance(100.0);
        h.deck.goto("s2");
        h.settle();

        assert_eq!(h.enters(), vec!["s0", "s2"]);
        // s1 was never entered, so it is never left either
        assert_eq!(h.leaves(), vec!["s0"]);
        assert_eq!(h.deck.step("s1").unwrap().phase(), StepPhase::Future);
    }

    #[test]
    fn test_reselect_refreshes_window_scale() {
        let h = Harness::initialized();
        h.add(Step::new("a"));
        h.settle();
        assert_eq!(h.deck.window_scale(), Some(1.0));

        h.sink.set_viewport(ViewportSize::new(800.0, 600.0));
        // Navigating elsewhere does not pick up the new viewport...
        h.add(Step::new("b"));
        h.deck.goto("b");
        assert_eq!(h.deck.window_scale(), Some(1.0));

        // ...re-selecting the active step does
        let active = h.deck.active_step();
        assert_eq!(h.deck.goto("b"), active);
        assert_eq!(h.deck.window_scale(), Some(0.78125));
        assert_eq!(h.deck.active_step(), active);
        assert!(h.leaves().iter().all(|id| id != "b"));
    }

    #[test]
    fn test_reselect_does_not_reenter() {
        let h = Harness::initialized();
        h.add(Step::new("a"));
        h.settle();
        h.deck.goto(0);
        h.settle();
        assert_eq!(h.enters(), vec!["a"]);
    }

    #[test]
    fn test_identical_target_has_no_delay() {
        let h = Harness::initialized();
        let a = h.add(Step::new("a").at(10.0, 20.0, 0.0).scaled(3.0));
        h.settle();

        // Re-selecting: target equals current on every field
        let before = h.clock.now_ms();
        h.deck.goto(&a);
        h.settle();
        assert_eq!(h.clock.now_ms() - before, 1000.0);
    }

    #[test]
    fn test_next_prev_wrap() {
        let h = Harness::initialized();
        h.add(Step::new("s0"));
        h.add(Step::new("s1"));
        h.add(Step::new("s2"));

        assert_eq!(h.deck.prev().unwrap().id(), "s2");
        assert_eq!(h.deck.next().unwrap().id(), "s0");
        assert_eq!(h.deck.next().unwrap().id(), "s1");
    }

    #[test]
    fn test_next_prev_cycle() {
        let h = Harness::initialized();
        for i in 0..5 {
            h.add(Step::new(format!("s{i}")).at(i as f64 * 100.0, 0.0, 0.0));
        }
        h.deck.goto(3);
        let start = h.deck.active_step();

        for _ in 0..5 {
            h.deck.next();
        }
        assert_eq!(h.deck.active_step(), start);

        for _ in 0..5 {
            h.deck.prev();
        }
        assert_eq!(h.deck.active_step(), start);
    }

    #[test]
    fn test_next_without_steps() {
        let h = Harness::initialized();
        assert!(h.deck.next().is_none());
        assert!(h.deck.prev().is_none());
    }

    #[test]
    fn test_negative_index() {
        let h = Harness::initialized();
        h.add(Step::new("s0"));
        h.add(Step::new("s1"));
        h.add(Step::new("s2"));
        assert_eq!(h.deck.goto(-2).unwrap().id(), "s1");
        assert!(h.deck.goto(-4).is_none());
    }

    #[test]
    fn test_remove_active_step() {
        let h = Harness::initialized();
        let a = h.add(Step::new("a"));
        let b = h.add(Step::new("b").at(100.0, 0.0, 0.0));
        h.settle();

        assert_eq!(h.deck.remove_step(&a), Some(a.clone()));
        assert_eq!(h.deck.steps(), vec![b.clone()]);
        assert_eq!(h.deck.active_step(), Some(b));
        assert_eq!(h.leaves(), vec!["a"]);

        h.settle();
        assert_eq!(h.enters(), vec!["a", "b"]);
    }

    #[test]
    fn test_remove_only_step() {
        let h = Harness::initialized();
        let a = h.add(Step::new("a"));
        h.settle();

        h.deck.remove_step("a");
        assert!(h.deck.active_step().is_none());
        assert_eq!(h.deck.step_count(), 0);
        assert_eq!(h.leaves(), vec!["a"]);
        assert!(!h.deck.is_transitioning());
        assert_eq!(a.phase(), StepPhase::Past);
    }

    #[test]
    fn test_remove_inactive_and_unknown() {
        let h = Harness::initialized();
        h.add(Step::new("a"));
        h.add(Step::new("b"));
        let stranger = StepHandle::new(Step::new("c"));

        assert!(h.deck.remove_step(&stranger).is_none());
        assert_eq!(h.deck.remove_step(1).map(|s| s.id()).as_deref(), Some("b"));
        assert_eq!(h.active_id().as_deref(), Some("a"));
        assert_eq!(h.deck.step_count(), 1);
    }

    #[test]
    fn test_update_step_debounces_navigation() {
        let h = Harness::initialized();
        let a = h.add(Step::new("a"));
        h.settle();
        h.sink.clear();

        for x in 1..=5 {
            a.update(|s| s.translate.x = x as f64 * 10.0);
            assert!(h.deck.update_step(&a));
            h.clock.advance(20.0);
        }

        // Every update is placed immediately, the camera follows once
        let record = h.sink.record();
        assert_eq!(record.placements.len(), 5);
        assert!(record.transitions.is_empty());

        h.clock.advance(100.0);
        let record = h.sink.record();
        assert_eq!(record.transitions.len(), 2);
        assert_eq!(
            h.deck.camera_state().unwrap().translate,
            Vec3::new(-50.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_update_inactive_step_does_not_navigate() {
        let h = Harness::initialized();
        h.add(Step::new("a"));
        let b = h.add(Step::new("b"));
        h.settle();
        h.sink.clear();

        b.update(|s| s.scale = 4.0);
        assert!(h.deck.update_step(&b));
        h.settle();

        assert_eq!(h.sink.record().placements.len(), 1);
        assert_eq!(h.sink.transition_count(), 0);
        assert_eq!(h.active_id().as_deref(), Some("a"));

        let stranger = StepHandle::new(Step::new("x"));
        assert!(!h.deck.update_step(&stranger));
    }

    #[test]
    fn test_debounced_update_navigates_back() {
        let h = Harness::initialized();
        let a = h.add(Step::new("a"));
        h.add(Step::new("b"));
        h.settle();

        // The trailing call always runs, even after navigating elsewhere
        h.deck.update_step(&a);
        h.deck.goto("b");
        h.clock.advance(150.0);
        assert_eq!(h.active_id().as_deref(), Some("a"));
    }

    #[test]
    fn test_leave_listener_sees_step_being_left() {
        let h = Harness::initialized();
        h.add(Step::new("a"));
        h.add(Step::new("b").at(500.0, 0.0, 0.0));
        h.settle();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        h.deck.add_listener(move |p: &Presentation, event: &PresentationEvent| {
            if let PresentationEvent::StepLeave(step) = event {
                log.borrow_mut().push((
                    step.id(),
                    p.active_step().map(|s| s.id()),
                    p.camera_state().map(|c| c.translate.x),
                ));
            }
        });

        h.deck.goto("b");
        assert_eq!(
            *seen.borrow(),
            vec![("a".to_string(), Some("a".to_string()), Some(0.0))]
        );
        assert_eq!(h.active_id().as_deref(), Some("b"));
        assert_eq!(h.deck.camera_state().unwrap().translate.x, -500.0);
    }

    #[test]
    fn test_target_removed_by_leave_listener() {
        let h = Harness::initialized();
        h.add(Step::new("a"));
        h.add(Step::new("b"));
        h.settle();
        let transitions = h.sink.transition_count();

        h.deck.add_listener(|p: &Presentation, event: &PresentationEvent| {
            if let PresentationEvent::StepLeave(_) = event {
                p.remove_step("b");
            }
        });

        assert_eq!(
            h.deck.try_goto("b", None),
            Err(NavigationError::StepNotFound("'b'".into()))
        );
        assert_eq!(h.active_id().as_deref(), Some("a"));
        assert_eq!(h.deck.step_count(), 1);
        assert_eq!(h.sink.transition_count(), transitions);
    }

    #[test]
    fn test_removing_only_step_leaves_while_registered() {
        let h = Harness::initialized();
        h.add(Step::new("a"));
        h.settle();

        let seen = Rc::new(RefCell::new(None));
        let log = seen.clone();
        h.deck.add_listener(move |p: &Presentation, event: &PresentationEvent| {
            if let PresentationEvent::StepLeave(_) = event {
                *log.borrow_mut() = Some((p.step_count(), p.active_step().map(|s| s.id())));
            }
        });

        h.deck.remove_step("a");
        assert_eq!(*seen.borrow(), Some((1, Some("a".to_string()))));
        assert!(h.deck.active_step().is_none());
    }

    #[test]
    fn test_listener_can_navigate_reentrantly() {
        let clock = Rc::new(FrameClock::new());
        let deck = Presentation::builder("auto", clock.clone()).build();
        let entered = Rc::new(RefCell::new(Vec::new()));
        let log = entered.clone();
        deck.add_listener(move |p: &Presentation, event: &PresentationEvent| {
            if let PresentationEvent::StepEnter(step) = event {
                log.borrow_mut().push(step.id());
                if log.borrow().len() < 3 {
                    p.next();
                }
            }
        });
        deck.init();
        deck.add_step(Step::new("a"));
        deck.add_step(Step::new("b"));

        clock.run_pending(100);
        assert_eq!(*entered.borrow(), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_adding_registered_step_again_is_ignored() {
        let h = Harness::initialized();
        let a = h.add(Step::new("a"));
        h.add(Step::new("b"));
        h.sink.clear();

        assert_eq!(h.deck.add_step(a.clone()), a);
        assert_eq!(h.deck.step_count(), 2);
        assert!(h.sink.record().placements.is_empty());
        assert_eq!(h.active_id().as_deref(), Some("a"));
    }

    #[test]
    fn test_sort_steps() {
        let h = Harness::initialized();
        h.add(Step::new("a").ordered(3));
        h.add(Step::new("b").ordered(1));
        h.add(Step::new("c").ordered(2));
        h.deck.sort_steps();

        let ids: Vec<String> = h.deck.steps().iter().map(StepHandle::id).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        // Active step is unchanged, only its position moved
        assert_eq!(h.active_id().as_deref(), Some("a"));
        assert_eq!(h.deck.next().unwrap().id(), "b");
    }

    #[test]
    fn test_phase_changes_reach_sink() {
        let h = Harness::initialized();
        h.add(Step::new("a"));
        h.add(Step::new("b"));
        h.settle();
        h.deck.next();
        h.settle();

        assert_eq!(
            h.sink.record().phases,
            vec![
                ("a".to_string(), StepPhase::Present),
                ("a".to_string(), StepPhase::Past),
                ("b".to_string(), StepPhase::Present),
            ]
        );
    }

    #[test]
    fn test_dropped_presentation_cancels_timers() {
        let clock = Rc::new(FrameClock::new());
        {
            let deck = Presentation::builder("gone", clock.clone()).build();
            deck.init();
            deck.add_step(Step::new("a"));
            assert_eq!(clock.pending(), 1);
        }
        assert_eq!(clock.pending(), 0);
    }
}
