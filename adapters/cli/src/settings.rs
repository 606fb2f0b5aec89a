//! Layered run settings: built-in defaults, an optional TOML file, then flags.

use std::{error::Error, fmt, fs, io, path::Path, path::PathBuf};

use clap::Args;
use firefighter_core::SimulationConfig;
use serde::Deserialize;

/// Presentation options for the windowed mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DisplaySettings {
    /// Pixels per cell edge.
    pub zoom: u32,
    /// Whether presentation waits for the display refresh.
    pub vsync: bool,
    /// Whether frame timings are logged once per second.
    pub show_fps: bool,
    /// Whether the statistics overlay starts visible.
    pub show_overlay: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            zoom: 1,
            vsync: true,
            show_fps: false,
            show_overlay: false,
        }
    }
}

/// Fully resolved settings for a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Seed for ignition points; drawn from the wall clock when absent.
    pub seed: Option<u64>,
    /// Simulation parameters.
    pub simulation: SimulationConfig,
    /// Presentation options.
    pub display: DisplaySettings,
}

impl Settings {
    /// Parses settings from TOML text; missing keys keep their defaults.
    pub(crate) fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Reads and parses a TOML settings file.
    pub(crate) fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Applies command-line overrides on top of the current values.
    #[must_use]
    pub(crate) fn with_overrides(mut self, overrides: &Overrides) -> Self {
        let simulation = &mut self.simulation;
        apply(&mut simulation.width, overrides.width);
        apply(&mut simulation.height, overrides.height);
        apply(&mut simulation.total_firefighters, overrides.firefighters);
        apply(&mut simulation.total_fires, overrides.fires);
        apply(&mut simulation.initial_fire_steps, overrides.initial_fire_steps);
        apply(&mut simulation.milliseconds_per_turn, overrides.ms_per_turn);
        apply(&mut self.display.zoom, overrides.zoom);

        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
        if overrides.no_vsync {
            self.display.vsync = false;
        }
        if overrides.show_fps {
            self.display.show_fps = true;
        }
        if overrides.overlay {
            self.display.show_overlay = true;
        }
        self
    }
}

fn apply<T: Copy>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Command-line flags that override file and default settings.
#[derive(Args, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Overrides {
    /// Grid width in cells.
    #[arg(long, global = true)]
    pub width: Option<u32>,
    /// Grid height in cells.
    #[arg(long, global = true)]
    pub height: Option<u32>,
    /// Firefighters placed per eligible turn.
    #[arg(long, global = true)]
    pub firefighters: Option<u32>,
    /// Number of random ignition points.
    #[arg(long, global = true)]
    pub fires: Option<u32>,
    /// Turns the fire spreads before firefighters respond.
    #[arg(long, global = true)]
    pub initial_fire_steps: Option<u32>,
    /// Real time between turns, in milliseconds.
    #[arg(long, global = true)]
    pub ms_per_turn: Option<u32>,
    /// Seed for ignition points and chase start positions.
    #[arg(long, global = true)]
    pub seed: Option<u64>,
    /// Pixels per cell edge.
    #[arg(long, global = true)]
    pub zoom: Option<u32>,
    /// Render as fast as possible instead of waiting for vsync.
    #[arg(long, global = true)]
    pub no_vsync: bool,
    /// Log frame timings once per second.
    #[arg(long, global = true)]
    pub show_fps: bool,
    /// Show the statistics overlay at startup.
    #[arg(long, global = true)]
    pub overlay: bool,
}

/// Errors raised while loading a settings file.
#[derive(Debug)]
pub(crate) enum SettingsError {
    /// The file could not be read.
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The file was not valid settings TOML.
    Parse {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying parse failure.
        source: toml::de::Error,
    },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, .. } => {
                write!(f, "could not read settings file '{}'", path.display())
            }
            Self::Parse { path, .. } => {
                write!(f, "could not parse settings file '{}'", path.display())
            }
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}
