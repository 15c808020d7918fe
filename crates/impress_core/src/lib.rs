//! Impress Core
//!
//! Data model and pure logic for spatial presentations:
//!
//! - **Steps**: named points in 3D presentation space, shared through [`StepHandle`]
//! - **Step Registry**: ordered steps with index / id / handle lookup
//! - **Camera Model**: inverse camera states and two-phase transition planning
//! - **Window Scale**: fitting the logical presentation size to a viewport
//! - **Config**: lenient numeric overrides with documented defaults
//! - **Decks**: TOML files describing a full presentation
//!
//! # Example
//!
//! ```rust
//! use impress_core::{plan_transition, CameraState, Config, Step};
//!
//! let overview = Step::new("overview").scaled(10.0);
//! let plan = plan_transition(&CameraState::IDENTITY, &overview, None, &Config::default());
//!
//! // Going to a bigger step zooms out: scale first, then move
//! assert!(!plan.zoom_in);
//! assert_eq!(plan.scale_delay_ms, 0.0);
//! assert_eq!(plan.orient_delay_ms, 500.0);
//! ```

pub mod camera;
pub mod config;
pub mod deck;
pub mod math;
pub mod registry;
pub mod scale;
pub mod step;

pub use camera::{plan_transition, CameraState, TransitionPlan};
pub use config::{overrides, Config, ConfigError, ConfigSource, ConfigValue};
pub use deck::{Deck, StepSpec};
pub use math::Vec3;
pub use registry::{Added, StepRef, StepRegistry};
pub use scale::{compute_window_scale, ViewportSize};
pub use step::{Step, StepHandle, StepPhase};
