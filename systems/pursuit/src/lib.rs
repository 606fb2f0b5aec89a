#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid pursuit sub-model: a pursuer chasing an evader across a bounded grid.
//!
//! Agents move one orthogonal cell per step and never leave the grid. The
//! evader only moves on every `cadence`-th step, which lets the pursuer close
//! the Manhattan gap and guarantees capture.

use firefighter_core::{CellCoord, GridSize};

/// Mobile entity that reacts to a target on each step.
pub trait Agent {
    /// Current cell occupied by the agent.
    fn position(&self) -> CellCoord;

    /// Moves the agent relative to `target` and reports whether both share a
    /// cell afterwards.
    fn step(&mut self, target: CellCoord, size: GridSize) -> bool;
}

/// Agent that closes the gap to its target along the wider axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pursuer {
    position: CellCoord,
}

impl Pursuer {
    /// Creates a pursuer standing on `position`.
    #[must_use]
    pub const fn new(position: CellCoord) -> Self {
        Self { position }
    }
}

impl Agent for Pursuer {
    fn position(&self) -> CellCoord {
        self.position
    }

    fn step(&mut self, target: CellCoord, size: GridSize) -> bool {
        let column_gap = i64::from(target.column()) - i64::from(self.position.column());
        let row_gap = i64::from(target.row()) - i64::from(self.position.row());

        let delta = if column_gap == 0 && row_gap == 0 {
            (0, 0)
        } else if column_gap.abs() >= row_gap.abs() {
            (column_gap.signum(), 0)
        } else {
            (0, row_gap.signum())
        };

        if let Some(next) = self.position.offset(delta.0, delta.1) {
            if size.contains(next) {
                self.position = next;
            }
        }
        self.position == target
    }
}

/// Agent that flees from its target, moving once every `cadence` steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Evader {
    position: CellCoord,
    cadence: u32,
    tick: u32,
}

impl Evader {
    /// Default number of steps between evader moves.
    pub const DEFAULT_CADENCE: u32 = 2;

    /// Creates an evader standing on `position` that moves every `cadence`
    /// steps. A cadence below two is raised to two so capture stays possible.
    #[must_use]
    pub fn new(position: CellCoord, cadence: u32) -> Self {
        Self {
            position,
            cadence: cadence.max(Self::DEFAULT_CADENCE),
            tick: 0,
        }
    }

    /// Steps between evader moves.
    #[must_use]
    pub const fn cadence(&self) -> u32 {
        self.cadence
    }

    fn flee(&mut self, target: CellCoord, size: GridSize) {
        let current = self.position.manhattan_distance(target);
        let best = size
            .four_neighbors(self.position)
            .filter(|cell| *cell != target)
            .map(|cell| (cell.manhattan_distance(target), cell))
            .filter(|(distance, _)| *distance > current)
            .fold(None, |best: Option<(u32, CellCoord)>, candidate| match best {
                Some(best) if best.0 >= candidate.0 => Some(best),
                _ => Some(candidate),
            });
        if let Some((_, cell)) = best {
            self.position = cell;
        }
    }
}

impl Agent for Evader {
    fn position(&self) -> CellCoord {
        self.position
    }

    fn step(&mut self, target: CellCoord, size: GridSize) -> bool {
        self.tick = self.tick.wrapping_add(1);
        if self.position != target && self.tick % self.cadence == 0 {
            self.flee(target, size);
        }
        self.position == target
    }
}

/// State of a chase after a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChaseOutcome {
    /// The evader is still at large.
    Pursuing,
    /// The pursuer reached the evader.
    Caught {
        /// Number of steps taken until capture.
        steps: u32,
    },
}

/// Pairing of one pursuer and one evader on a bounded grid.
#[derive(Clone, Debug)]
pub struct Chase {
    size: GridSize,
    pursuer: Pursuer,
    evader: Evader,
    steps: u32,
    caught: bool,
}

impl Chase {
    /// Creates a chase between agents standing on the provided cells.
    ///
    /// Starting cells outside the grid are clamped onto its last row and column.
    #[must_use]
    pub fn new(size: GridSize, pursuer: CellCoord, evader: CellCoord, cadence: u32) -> Self {
        let clamp = |cell: CellCoord| {
            CellCoord::new(
                cell.column().min(size.width().saturating_sub(1)),
                cell.row().min(size.height().saturating_sub(1)),
            )
        };
        let pursuer = clamp(pursuer);
        let evader = clamp(evader);
        Self {
            size,
            pursuer: Pursuer::new(pursuer),
            evader: Evader::new(evader, cadence),
            steps: 0,
            caught: pursuer == evader,
        }
    }

    /// Current pursuer position.
    #[must_use]
    pub fn pursuer(&self) -> CellCoord {
        self.pursuer.position()
    }

    /// Current evader position.
    #[must_use]
    pub fn evader(&self) -> CellCoord {
        self.evader.position()
    }

    /// Number of steps taken so far.
    #[must_use]
    pub const fn steps(&self) -> u32 {
        self.steps
    }

    /// Advances both agents by one step; the evader moves first.
    pub fn step(&mut self) -> ChaseOutcome {
        if self.caught {
            return ChaseOutcome::Caught { steps: self.steps };
        }

        self.steps = self.steps.saturating_add(1);
        let evader_caught = self.evader.step(self.pursuer.position(), self.size);
        let pursuer_caught = self.pursuer.step(self.evader.position(), self.size);
        self.caught = evader_caught || pursuer_caught;

        if self.caught {
            ChaseOutcome::Caught { steps: self.steps }
        } else {
            ChaseOutcome::Pursuing
        }
    }

    /// Steps until capture or until `max_steps` have elapsed.
    pub fn run(&mut self, max_steps: u32) -> ChaseOutcome {
        let mut outcome = if self.caught {
            ChaseOutcome::Caught { steps: self.steps }
        } else {
            ChaseOutcome::Pursuing
        };
        while outcome == ChaseOutcome::Pursuing && self.steps < max_steps {
            outcome = self.step();
        }
        outcome
    }
}
