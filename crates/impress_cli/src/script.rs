//! Navigation scripts
//!
//! A script is a comma-separated list of commands, e.g.
//! `next,next,goto:intro,wait:500,prev`.

use anyhow::{bail, Context, Result};
use impress::{Presentation, StepHandle};
use impress_core::ViewportSize;
use std::str::FromStr;

/// One scripted action
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Next,
    Prev,
    /// Go to a step by index (numeric) or id
    Goto(String),
    /// Only let time pass
    Wait(f64),
}

impl Command {
    /// Run against `presentation`, returning the step navigated to
    pub fn apply(&self, presentation: &Presentation) -> Option<StepHandle> {
        match self {
            Command::Next => presentation.next(),
            Command::Prev => presentation.prev(),
            Command::Goto(target) => match target.parse::<isize>() {
                Ok(index) => presentation.goto(index),
                Err(_) => presentation.goto(target),
            },
            Command::Wait(_) => None,
        }
    }
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg.trim())),
            None => (s, None),
        };

        match (name, arg) {
            ("next", None) => Ok(Command::Next),
            ("prev", None) => Ok(Command::Prev),
            ("goto", Some(target)) if !target.is_empty() => Ok(Command::Goto(target.to_string())),
            ("wait", Some(ms)) => {
                let ms: f64 = ms
                    .parse()
                    .with_context(|| format!("Invalid wait duration '{}'", ms))?;
                if !ms.is_finite() || ms < 0.0 {
                    bail!("Wait duration must be a non-negative number, got {}", ms);
                }
                Ok(Command::Wait(ms))
            }
            _ => bail!(
                "Unknown command '{}'. Valid commands: next, prev, goto:<index|id>, wait:<ms>",
                s
            ),
        }
    }
}

/// Parse a comma-separated script; empty entries are skipped
pub fn parse_script(script: &str) -> Result<Vec<Command>> {
    script
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Parse a `WIDTHxHEIGHT` viewport size
pub fn parse_viewport(s: &str) -> Result<ViewportSize> {
    let Some((w, h)) = s.split_once(['x', 'X']) else {
        bail!("Invalid viewport '{}', expected WIDTHxHEIGHT", s);
    };
    let width: f64 = w
        .trim()
        .parse()
        .with_context(|| format!("Invalid viewport width '{}'", w))?;
    let height: f64 = h
        .trim()
        .parse()
        .with_context(|| format!("Invalid viewport height '{}'", h))?;
    if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
        bail!("Viewport dimensions must be positive, got {}x{}", width, height);
    }
    Ok(ViewportSize::new(width, height))
}
