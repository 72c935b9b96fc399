//! Command line arguments layered over an optional TOML settings file.

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use ascii_rogue_world::WorldConfig;
use clap::Parser;
use serde::Deserialize;

/// Command line arguments. Every value overrides the settings file.
#[derive(Debug, Parser)]
#[command(
    name = "ascii-rogue",
    about = "Minimal ASCII roguelike simulation",
    version
)]
pub(crate) struct Args {
    /// TOML file with `[world]` and `[display]` tables
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Seed for world generation and creature movement
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Number of tile columns
    #[arg(long)]
    pub(crate) width: Option<u32>,

    /// Number of tile rows
    #[arg(long)]
    pub(crate) height: Option<u32>,

    /// Probability that a cell becomes a wall (0.0 to 1.0)
    #[arg(long)]
    pub(crate) wall_probability: Option<f32>,

    /// Maximum number of creatures placed at startup
    #[arg(long)]
    pub(crate) max_creatures: Option<usize>,

    /// Simulated milliseconds between turns
    #[arg(long)]
    pub(crate) tick_interval_ms: Option<u64>,

    /// Simulated milliseconds per rendered frame
    #[arg(long)]
    pub(crate) frame_ms: Option<u64>,

    /// Stop after this many frames instead of running forever
    #[arg(long)]
    pub(crate) frames: Option<u64>,

    /// Run as fast as possible instead of sleeping between frames
    #[arg(long)]
    pub(crate) no_realtime: bool,

    /// Append frames instead of redrawing the terminal
    #[arg(long)]
    pub(crate) no_clear: bool,
}

/// Presentation settings for the terminal backend.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DisplayConfig {
    pub(crate) frame_ms: u64,
    pub(crate) frames: Option<u64>,
    pub(crate) realtime: bool,
    pub(crate) clear_screen: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            frame_ms: 100,
            frames: None,
            realtime: true,
            clear_screen: true,
        }
    }
}

impl DisplayConfig {
    pub(crate) fn frame_dt(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

/// Fully resolved settings for a run.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) world: WorldConfig,
    pub(crate) display: DisplayConfig,
}

impl Settings {
    /// Resolves defaults, then the settings file, then command line overrides.
    pub(crate) fn load(args: &Args) -> Result<Self> {
        let mut settings = match &args.config {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("failed to read settings from {}", path.display()))?;
                Self::from_toml(&contents)
                    .with_context(|| format!("invalid settings in {}", path.display()))?
            }
            None => Self::default(),
        };
        settings.apply(args);
        settings
            .world
            .validate()
            .context("invalid world configuration")?;
        Ok(settings)
    }

    fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse settings toml")
    }

    fn apply(&mut self, args: &Args) {
        let world = &mut self.world;
        if let Some(seed) = args.seed {
            world.seed = seed;
        }
        if let Some(width) = args.width {
            world.width = width;
        }
        if let Some(height) = args.height {
            world.height = height;
        }
        if let Some(probability) = args.wall_probability {
            world.wall_probability = probability;
        }
        if let Some(max_creatures) = args.max_creatures {
            world.max_creatures = max_creatures;
        }
        if let Some(interval) = args.tick_interval_ms {
            world.tick_interval_ms = interval;
        }

        let display = &mut self.display;
        if let Some(frame_ms) = args.frame_ms {
            display.frame_ms = frame_ms;
        }
        if args.frames.is_some() {
            display.frames = args.frames;
        }
        if args.no_realtime {
            display.realtime = false;
        }
        if args.no_clear {
            display.clear_screen = false;
        }
    }
}
