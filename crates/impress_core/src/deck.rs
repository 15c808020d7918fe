//! Deck files
//!
//! A deck is a TOML document describing a whole presentation: an optional
//! `[config]` table of overrides and an ordered `[[steps]]` array. Step
//! fields use the flat attribute names presentation authors are used to:
//!
//! ```toml
//! [config]
//! transitionDuration = 600
//!
//! [[steps]]
//! id = "intro"
//! x = -1000
//! rotate = 90        # shorthand for rotateZ
//! scale = 4
//! ```

use crate::config::{Config, ConfigError};
use crate::math::Vec3;
use crate::step::{Step, StepHandle};
use serde::Deserialize;
use std::path::Path;

/// Step as written in a deck file
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StepSpec {
    pub id: Option<String>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub rotate_x: f64,
    pub rotate_y: f64,
    pub rotate_z: Option<f64>,
    /// Alias for `rotateZ`, used when `rotateZ` is absent
    pub rotate: Option<f64>,
    pub scale: Option<f64>,
    pub order: i32,
}

impl StepSpec {
    /// Build the step, generating an id from `index` when none was given
    pub fn to_step(&self, index: usize) -> Step {
        Step {
            id: self
                .id
                .clone()
                .unwrap_or_else(|| format!("step-{}", index + 1)),
            translate: Vec3::new(self.x, self.y, self.z),
            rotate: Vec3::new(
                self.rotate_x,
                self.rotate_y,
                self.rotate_z.or(self.rotate).unwrap_or(0.0),
            ),
            scale: self.scale.unwrap_or(1.0),
            order: self.order,
        }
    }
}

/// A parsed deck
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Deck {
    /// Raw overrides, resolved leniently through [`Config::from_source`]
    pub config: toml::Table,
    pub steps: Vec<StepSpec>,
}

impl Deck {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolved configuration
    pub fn resolve_config(&self) -> Config {
        Config::from_source(&self.config)
    }

    /// Fresh handles for every step, in deck order
    pub fn step_handles(&self) -> Vec<StepHandle> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, spec)| StepHandle::new(spec.to_step(index)))
            .collect()
    }
}
