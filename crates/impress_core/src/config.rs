//! Presentation configuration
//!
//! Configuration is resolved once, when a presentation is initialized, from
//! a [`ConfigSource`]. Every recognized key is optional; missing or
//! non-numeric values silently fall back to the defaults below.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_WIDTH: f64 = 1024.0;
pub const DEFAULT_HEIGHT: f64 = 768.0;
pub const DEFAULT_MAX_SCALE: f64 = 1.0;
pub const DEFAULT_MIN_SCALE: f64 = 0.0;
pub const DEFAULT_PERSPECTIVE: f64 = 1000.0;
pub const DEFAULT_TRANSITION_DURATION: f64 = 1000.0;

/// Resolved presentation configuration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Logical width of the presentation
    pub width: f64,
    /// Logical height of the presentation
    pub height: f64,
    /// Upper bound for the window scale (0 disables)
    pub max_scale: f64,
    /// Lower bound for the window scale (0 disables)
    pub min_scale: f64,
    /// Perspective distance in pixels, before window scaling
    pub perspective: f64,
    /// Default transition duration in milliseconds
    pub transition_duration: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            max_scale: DEFAULT_MAX_SCALE,
            min_scale: DEFAULT_MIN_SCALE,
            perspective: DEFAULT_PERSPECTIVE,
            transition_duration: DEFAULT_TRANSITION_DURATION,
        }
    }
}

impl Config {
    /// Keys recognized by [`Config::from_source`]
    pub const KEYS: [&'static str; 6] = [
        "width",
        "height",
        "maxScale",
        "minScale",
        "perspective",
        "transitionDuration",
    ];

    /// Resolve a config from a source, substituting defaults for anything
    /// missing or invalid
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        let defaults = Config::default();
        let read = |key: &str, fallback: f64| match source.lookup(key) {
            Some(raw) => raw.as_number().unwrap_or_else(|| {
                tracing::debug!("config: ignoring invalid {key}={raw:?}, using {fallback}");
                fallback
            }),
            None => fallback,
        };

        Self {
            width: read("width", defaults.width),
            height: read("height", defaults.height),
            max_scale: read("maxScale", defaults.max_scale),
            min_scale: read("minScale", defaults.min_scale),
            perspective: read("perspective", defaults.perspective),
            transition_duration: read("transitionDuration", defaults.transition_duration),
        }
    }

    /// Parse a TOML document of overrides
    ///
    /// Only a malformed document is an error. Unknown keys are ignored and
    /// invalid values fall back to defaults, same as [`Config::from_source`].
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = content.parse()?;
        Ok(Self::from_source(&table))
    }

    /// Load overrides from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// A raw configuration value as provided by a source
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigValue<'a> {
    Number(f64),
    Text(Cow<'a, str>),
    /// Present but of a type that can never be numeric (tables, booleans, ...)
    Other,
}

impl ConfigValue<'_> {
    /// Numeric interpretation of the value, if it has one
    ///
    /// Text is trimmed and parsed; non-finite results are rejected.
    pub fn as_number(&self) -> Option<f64> {
        let number = match self {
            ConfigValue::Number(n) => *n,
            ConfigValue::Text(text) => text.trim().parse::<f64>().ok()?,
            ConfigValue::Other => return None,
        };
        number.is_finite().then_some(number)
    }
}

/// Anything that can provide raw config overrides by key
pub trait ConfigSource {
    fn lookup(&self, key: &str) -> Option<ConfigValue<'_>>;
}

impl ConfigSource for () {
    fn lookup(&self, _key: &str) -> Option<ConfigValue<'_>> {
        None
    }
}

impl<S: BuildHasher> ConfigSource for HashMap<String, String, S> {
    fn lookup(&self, key: &str) -> Option<ConfigValue<'_>> {
        self.get(key)
            .map(|value| ConfigValue::Text(Cow::Borrowed(value.as_str())))
    }
}

impl<S: BuildHasher> ConfigSource for HashMap<String, f64, S> {
    fn lookup(&self, key: &str) -> Option<ConfigValue<'_>> {
        self.get(key).map(|value| ConfigValue::Number(*value))
    }
}

impl ConfigSource for toml::Table {
    fn lookup(&self, key: &str) -> Option<ConfigValue<'_>> {
        self.get(key).map(|value| match value {
            toml::Value::Integer(i) => ConfigValue::Number(*i as f64),
            toml::Value::Float(f) => ConfigValue::Number(*f),
            toml::Value::String(s) => ConfigValue::Text(Cow::Borrowed(s.as_str())),
            _ => ConfigValue::Other,
        })
    }
}

impl ConfigSource for Config {
    fn lookup(&self, key: &str) -> Option<ConfigValue<'_>> {
        let value = match key {
            "width" => self.width,
            "height" => self.height,
            "maxScale" => self.max_scale,
            "minScale" => self.min_scale,
            "perspective" => self.perspective,
            "transitionDuration" => self.transition_duration,
            _ => return None,
        };
        Some(ConfigValue::Number(value))
    }
}

/// Convenience for building string overrides in code
pub fn overrides<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> FxHashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Errors from loading configuration or deck files
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid TOML or has the wrong shape
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
