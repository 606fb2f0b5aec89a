#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Real-time turn pacing for the firefighter simulation.
//!
//! The scheduler accumulates elapsed time from [`Event::TimeAdvanced`] and
//! opens at most one turn per handled batch once the configured interval has
//! elapsed. Excess time is discarded rather than replayed, so a slow frame
//! never triggers a burst of catch-up turns. The first `initial_fire_steps`
//! turns are opened with containment withheld to model the response delay.

use std::time::Duration;

use firefighter_core::{Command, Event, SimulationConfig};

/// Configuration parameters required to construct the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    turn_interval: Duration,
    initial_fire_steps: u32,
}

impl Config {
    /// Creates a configuration from a turn interval and response delay.
    #[must_use]
    pub const fn new(turn_interval: Duration, initial_fire_steps: u32) -> Self {
        Self {
            turn_interval,
            initial_fire_steps,
        }
    }
}

impl From<&SimulationConfig> for Config {
    fn from(config: &SimulationConfig) -> Self {
        Self::new(config.turn_interval(), config.initial_fire_steps)
    }
}

/// Pure system that decides when the next turn begins.
#[derive(Debug)]
pub struct TurnScheduler {
    turn_interval: Duration,
    accumulator: Duration,
    withheld_turns: u32,
    frozen: bool,
}

impl TurnScheduler {
    /// Creates a new scheduler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            turn_interval: config.turn_interval,
            accumulator: Duration::ZERO,
            withheld_turns: config.initial_fire_steps,
            frozen: false,
        }
    }

    /// Reports whether the scheduler has stopped after the world froze.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.frozen
    }

    /// Time accumulated toward the next turn.
    #[must_use]
    pub const fn accumulated(&self) -> Duration {
        self.accumulator
    }

    /// Consumes world events and emits a `BeginTurn` command when one is due.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                Event::SimulationFrozen { .. } => self.frozen = true,
                _ => {}
            }
        }

        if self.frozen {
            self.accumulator = Duration::ZERO;
            return;
        }

        if elapsed.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(elapsed);
        if self.accumulator < self.turn_interval {
            return;
        }
        self.accumulator = Duration::ZERO;

        let containment = if self.withheld_turns > 0 {
            self.withheld_turns -= 1;
            false
        } else {
            true
        };
        out.push(Command::BeginTurn { containment });
    }
}
