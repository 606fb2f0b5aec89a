#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn driver wiring the world to the firefighter systems.
//!
//! [`Simulation`] owns the authoritative [`World`] together with the turn
//! scheduler, the fire spread system and the containment system. Every call
//! to [`Simulation::advance`] pumps one batch of commands and events through
//! them in a fixed order:
//!
//! 1. the elapsed time is submitted as a tick;
//! 2. the scheduler decides whether a new turn begins;
//! 3. fire spread and containment both plan from the same composite buffer;
//! 4. the world merges the grids and evaluates the termination predicate.

use std::time::Duration;

use firefighter_core::{
    CellCoord, Command, ConfigError, ContainmentStrategy, Event, SimulationConfig,
};
use firefighter_system_containment::{Containment, PreciseLanding};
use firefighter_system_fire_spread::FireSpread;
use firefighter_system_turn_scheduler::{self as turn_scheduler, TurnScheduler};
use firefighter_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Authoritative simulation together with the systems that drive it.
#[derive(Debug)]
pub struct Simulation<S = PreciseLanding> {
    config: SimulationConfig,
    world: World,
    scheduler: TurnScheduler,
    fire_spread: FireSpread,
    containment: Containment<S>,
}

impl Simulation<PreciseLanding> {
    /// Creates a simulation whose ignition points are drawn from `seed`.
    pub fn new(config: SimulationConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let ignitions = random_ignitions(&config, seed);
        log::info!(
            "seeded {} ignition points on a {}x{} grid (seed {seed})",
            ignitions.len(),
            config.width,
            config.height
        );
        Self::with_ignitions(config, &ignitions)
    }

    /// Creates a simulation that ignites exactly the provided cells.
    pub fn with_ignitions(
        config: SimulationConfig,
        ignitions: &[CellCoord],
    ) -> Result<Self, ConfigError> {
        Self::with_strategy(config, PreciseLanding, ignitions)
    }
}

impl<S: ContainmentStrategy> Simulation<S> {
    /// Creates a simulation placing firefighters with a custom strategy.
    pub fn with_strategy(
        config: SimulationConfig,
        strategy: S,
        ignitions: &[CellCoord],
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut world = World::new(config.grid_size());
        let mut events = Vec::new();
        for cell in ignitions {
            world::apply(&mut world, Command::Ignite { cell: *cell }, &mut events);
        }
        for event in &events {
            match event {
                Event::FireIgnited { cell } => log::trace!("ignited {cell:?}"),
                Event::IgnitionRejected { cell, reason } => {
                    log::warn!("ignition at {cell:?} rejected: {reason:?}");
                }
                _ => {}
            }
        }

        Ok(Self {
            config,
            world,
            scheduler: TurnScheduler::new(turn_scheduler::Config::from(&config)),
            fire_spread: FireSpread::new(),
            containment: Containment::new(strategy, config.total_firefighters),
        })
    }

    /// Parameters the simulation was created with.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Reports whether the termination predicate has fired.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        query::is_frozen(&self.world)
    }

    /// Advances real time by `dt`, running at most one turn, and returns the
    /// events the world emitted along the way.
    pub fn advance(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut begin = Vec::new();
        self.scheduler.handle(&events, &mut begin);
        if begin.is_empty() {
            return events;
        }

        let mut turn_events = Vec::new();
        for command in begin {
            world::apply(&mut self.world, command, &mut turn_events);
        }
        let started = turn_events
            .iter()
            .any(|event| matches!(event, Event::TurnStarted { .. }));

        let mut commands = Vec::new();
        {
            let composite = query::composite_view(&self.world);
            self.fire_spread.handle(&turn_events, composite, &mut commands);
            self.containment.handle(&turn_events, composite, &mut commands);
        }
        events.append(&mut turn_events);

        let mut placements = 0_usize;
        for command in commands {
            if let Command::PlaceFirefighter { cell } = command {
                log::trace!("placing firefighter at {cell:?}");
                placements += 1;
            }
            world::apply(&mut self.world, command, &mut events);
        }

        if started {
            let mut resolution = Vec::new();
            world::apply(&mut self.world, Command::ResolveTurn, &mut resolution);
            self.report(&resolution, placements);
            let mut ignored = Vec::new();
            self.scheduler.handle(&resolution, &mut ignored);
            events.append(&mut resolution);
        }

        events
    }

    /// Advances by exactly one turn interval, which always opens a turn
    /// unless the simulation has frozen.
    pub fn step_turn(&mut self) -> Vec<Event> {
        self.advance(self.config.turn_interval())
    }

    fn report(&self, resolution: &[Event], placements: usize) {
        for event in resolution {
            match event {
                Event::TurnResolved {
                    turn,
                    newly_burning,
                } => log::debug!(
                    "turn {} resolved: {newly_burning} newly burning, {placements} firefighters placed",
                    turn.get()
                ),
                Event::SimulationFrozen { turn, survivors } => log::info!(
                    "fire contained after turn {}; {survivors} cells survived",
                    turn.get()
                ),
                _ => {}
            }
        }
    }
}

/// Draws `total_fires` uniformly distributed ignition points from `seed`.
///
/// Duplicate draws are kept, so fewer distinct cells may end up burning.
#[must_use]
pub fn random_ignitions(config: &SimulationConfig, seed: u64) -> Vec<CellCoord> {
    if config.width == 0 || config.height == 0 {
        return Vec::new();
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..config.total_fires)
        .map(|_| {
            CellCoord::new(
                rng.gen_range(0..config.width),
                rng.gen_range(0..config.height),
            )
        })
        .collect()
}
