#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the firefighter simulation.

mod settings;

use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use firefighter_core::{CellCoord, GridSize, WINDOW_TITLE};
use firefighter_rendering::{
    Clock, Color, ManualClock, Presentation, RenderingBackend, Scene, SceneStats, Viewport,
};
use firefighter_rendering_macroquad::MacroquadBackend;
use firefighter_simulation::Simulation;
use firefighter_system_pursuit::{Chase, ChaseOutcome, Evader};
use firefighter_world::{query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use self::settings::{Overrides, Settings};

#[derive(Debug, Parser)]
#[command(name = "firefighter", version, about = "Firefighter problem cellular automaton")]
struct Cli {
    /// TOML settings file layered beneath the command-line flags.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(flatten)]
    overrides: Overrides,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Clone, Copy, Debug, Subcommand)]
enum Mode {
    /// Open a window and animate the simulation in real time (default).
    Run,
    /// Run turns without a window until the fire is contained.
    Headless {
        /// Stop after this many turns even if the fire is still spreading.
        #[arg(long, default_value_t = 100_000)]
        max_turns: u32,
    },
    /// Run the pursuit sub-model and report when the evader is caught.
    Chase {
        /// Steps between evader moves.
        #[arg(long, default_value_t = Evader::DEFAULT_CADENCE)]
        cadence: u32,
        /// Stop after this many steps even if the evader is still at large.
        #[arg(long, default_value_t = 100_000)]
        max_steps: u32,
    },
}

/// Entry point for the firefighter command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let base = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let settings = base.with_overrides(&cli.overrides);
    let seed = settings.seed.unwrap_or_else(seed_from_clock);
    log::info!("using seed {seed}");

    match cli.mode.unwrap_or(Mode::Run) {
        Mode::Run => run_windowed(settings, seed),
        Mode::Headless { max_turns } => run_headless(settings, seed, max_turns),
        Mode::Chase { cadence, max_steps } => run_chase(settings, seed, cadence, max_steps),
    }
}

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

fn run_windowed(settings: Settings, seed: u64) -> Result<()> {
    let mut simulation =
        Simulation::new(settings.simulation, seed).context("invalid simulation parameters")?;
    let viewport = Viewport::new(settings.simulation.grid_size(), settings.display.zoom)
        .context("invalid display settings")?;

    let mut scene = Scene::new(viewport.grid_size());
    populate_scene(&mut scene, simulation.world());
    let presentation =
        Presentation::new(WINDOW_TITLE, Color::from_rgb_hex(0x000000), viewport, scene);

    MacroquadBackend::new()
        .with_vsync(settings.display.vsync)
        .with_show_fps(settings.display.show_fps)
        .with_overlay(settings.display.show_overlay)
        .run(presentation, move |dt, input, scene| {
            let _ = simulation.advance(dt);

            if input.pointer_pressed() {
                if let Some(cell) = input.hovered_cell {
                    let state = query::composite_view(simulation.world()).state(cell);
                    log::info!("cell ({}, {}) is {state:?}", cell.column(), cell.row());
                }
            }

            populate_scene(scene, simulation.world());
        })
}

fn run_headless(settings: Settings, seed: u64, max_turns: u32) -> Result<()> {
    let mut simulation =
        Simulation::new(settings.simulation, seed).context("invalid simulation parameters")?;
    let mut clock = ManualClock::new(settings.simulation.turn_interval());

    let mut turns = 0_u32;
    while !simulation.is_frozen() && turns < max_turns {
        let _ = simulation.advance(clock.tick());
        turns += 1;
    }

    let world = simulation.world();
    let census = query::census(world);
    let frozen = query::is_frozen(world);
    if !frozen {
        log::warn!("stopped after {max_turns} turns while the fire was still spreading");
    }
    println!(
        "turns: {} | simulated: {:.1}s | frozen: {frozen} | burning: {} | protected: {} | firefighters: {} | unprotected: {}",
        query::turn(world).get(),
        clock.elapsed().as_secs_f64(),
        census.burning,
        census.protected,
        census.firefighters,
        census.unprotected,
    );
    Ok(())
}

fn run_chase(settings: Settings, seed: u64, cadence: u32, max_steps: u32) -> Result<()> {
    let size = settings.simulation.grid_size();
    settings
        .simulation
        .validate()
        .context("invalid simulation parameters")?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut random_cell = |size: GridSize| {
        CellCoord::new(
            rng.gen_range(0..size.width()),
            rng.gen_range(0..size.height()),
        )
    };
    let pursuer = random_cell(size);
    let evader = random_cell(size);
    log::info!("pursuer starts at {pursuer:?}, evader at {evader:?}");

    let mut chase = Chase::new(size, pursuer, evader, cadence);
    match chase.run(max_steps) {
        ChaseOutcome::Caught { steps } => {
            println!(
                "caught after {steps} steps at ({}, {})",
                chase.evader().column(),
                chase.evader().row()
            );
        }
        ChaseOutcome::Pursuing => {
            log::warn!("evader still at large after {max_steps} steps");
            println!("escaped after {} steps", chase.steps());
        }
    }
    Ok(())
}

fn populate_scene(scene: &mut Scene, world: &World) {
    let census = query::census(world);
    let stats = SceneStats {
        turn: query::turn(world).get(),
        unprotected: census.unprotected,
        burning: census.burning,
        protected: census.protected,
        firefighters: census.firefighters,
        frozen: query::is_frozen(world),
    };
    scene.refresh(query::composite_view(world), stats);
}
