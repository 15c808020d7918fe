//! Window scale calculation
//!
//! Maps the presentation's logical size onto the actual viewport.

use crate::config::Config;

/// Viewport size in pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::new(1024.0, 768.0)
    }
}

/// Scale factor that fits the configured presentation size into `viewport`
///
/// The smaller of the two axis ratios wins, then the result is clamped to
/// `[min_scale, max_scale]`. A bound of zero is treated as unset.
pub fn compute_window_scale(viewport: ViewportSize, config: &Config) -> f64 {
    let h_scale = viewport.height / config.height;
    let w_scale = viewport.width / config.width;
    let mut scale = if h_scale > w_scale { w_scale } else { h_scale };

    if config.max_scale != 0.0 && scale > config.max_scale {
        scale = config.max_scale;
    }
    if config.min_scale != 0.0 && scale < config.min_scale {
        scale = config.min_scale;
    }
    scale
}
