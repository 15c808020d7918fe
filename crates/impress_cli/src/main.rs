//! Impress CLI
//!
//! Play and validate presentation decks without a display.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use impress::{Presentation, PresentationEvent, DEFAULT_ROOT_ID};
use impress_animation::{Clock, FrameClock};
use impress_core::{Deck, StepHandle, ViewportSize};
use rustc_hash::FxHashSet;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod script;
mod sink;

use script::{parse_script, parse_viewport, Command};
use sink::LogSink;

#[derive(Parser)]
#[command(name = "impress")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Headless player for impress decks", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a deck, following a navigation script
    Play {
        /// Deck file
        deck: PathBuf,

        /// Comma-separated commands: next, prev, goto:<index|id>, wait:<ms>
        #[arg(short, long, default_value = "")]
        script: String,

        /// Time to let pass after each command (default: twice the transition duration)
        #[arg(long)]
        step_ms: Option<f64>,

        /// Viewport size
        #[arg(long, default_value = "1024x768")]
        viewport: String,
    },

    /// Validate a deck and show what it resolves to
    Check {
        /// Deck file
        deck: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Play {
            deck,
            script,
            step_ms,
            viewport,
        } => cmd_play(&deck, &script, step_ms, &viewport),
        Commands::Check { deck } => cmd_check(&deck),
    }
}

fn load_deck(path: &Path) -> Result<Deck> {
    Deck::load(path).with_context(|| format!("Failed to load deck {}", path.display()))
}

fn cmd_play(path: &Path, script: &str, step_ms: Option<f64>, viewport: &str) -> Result<()> {
    let deck = load_deck(path)?;
    let commands = parse_script(script).context("Invalid script")?;
    let viewport = parse_viewport(viewport)?;
    let config = deck.resolve_config();
    let step_ms = step_ms
        .filter(|ms| ms.is_finite() && *ms >= 0.0)
        .unwrap_or(config.transition_duration * 2.0);

    info!("Playing {} ({} steps)", path.display(), deck.steps.len());

    let clock = Rc::new(FrameClock::new());
    let entered = Rc::new(RefCell::new(Vec::new()));
    let log = entered.clone();
    let now = clock.clone();

    let presentation = Presentation::builder(DEFAULT_ROOT_ID, clock.clone())
        .sink(LogSink::new(viewport))
        .config_source(deck.config.clone())
        .listener(move |_: &Presentation, event: &PresentationEvent| {
            match event.step() {
                Some(step) => info!("[{:>7.0}ms] {} '{}'", now.now_ms(), event.name(), step.id()),
                None => info!("{}", event.name()),
            }
            if let PresentationEvent::StepEnter(step) = event {
                log.borrow_mut().push(step.id());
            }
        })
        .build();

    presentation.init();
    for step in deck.step_handles() {
        presentation.add_step(step);
    }
    if deck.steps.iter().any(|s| s.order != 0) {
        presentation.sort_steps();
    }
    clock.advance(step_ms);

    for command in &commands {
        match command {
            Command::Wait(ms) => {
                clock.advance(*ms);
                continue;
            }
            _ => {
                if command.apply(&presentation).is_none() {
                    warn!("{:?} did nothing", command);
                }
            }
        }
        clock.advance(step_ms);
    }

    // Let a pending enter land before summarizing
    clock.run_pending(usize::MAX);

    let active = presentation
        .active_step()
        .map(|s| s.id())
        .unwrap_or_else(|| "<none>".to_string());
    info!(
        "Done after {}ms: active step '{}', entered {}",
        clock.now_ms(),
        active,
        entered.borrow().join(" -> ")
    );
    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let deck = load_deck(path)?;
    let config = deck.resolve_config();

    for key in deck.config.keys() {
        if !impress_core::Config::KEYS.contains(&key.as_str()) {
            warn!("Unknown config key '{}'", key);
        }
    }

    println!("Deck: {}", path.display());
    println!(
        "Config: {}x{}, scale {}..{}, perspective {}, transition {}ms",
        config.width,
        config.height,
        config.min_scale,
        config.max_scale,
        config.perspective,
        config.transition_duration
    );
    println!(
        "Window scale at 1024x768: {}",
        impress_core::compute_window_scale(ViewportSize::default(), &config)
    );

    let steps = deck.step_handles();
    println!("Steps ({}):", steps.len());
    for id in duplicate_ids(&steps) {
        warn!("Duplicate step id '{}', lookups by id find the first", id);
    }
    for (index, step) in steps.iter().enumerate() {
        let step = step.get();
        println!(
            "  {:>3}  {:<16} at ({}, {}, {}) rotate ({}, {}, {}) scale {} order {}",
            index,
            step.id,
            step.translate.x,
            step.translate.y,
            step.translate.z,
            step.rotate.x,
            step.rotate.y,
            step.rotate.z,
            step.scale,
            step.order
        );
        if !(step.scale > 0.0) || !step.scale.is_finite() {
            warn!("Step '{}' has non-positive scale {}", step.id, step.scale);
        }
    }

    if steps.is_empty() {
        warn!("Deck has no steps");
    }
    Ok(())
}

/// Ids used by more than one step, in order of their second use
fn duplicate_ids(steps: &[StepHandle]) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut duplicates = Vec::new();
    for step in steps {
        let id = step.id();
        if !seen.insert(id.clone()) && !duplicates.contains(&id) {
            duplicates.push(id);
        }
    }
    duplicates
}
