#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the firefighter simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The simulation driver submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable views such as [`CompositeView`], and respond exclusively
//! with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical title shown by adapters when the simulation boots.
pub const WINDOW_TITLE: &str = "Firefighter Problem";

/// State held by a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Flammable cell that has neither burned nor been protected.
    #[default]
    Unprotected,
    /// Cell that is on fire.
    Burning,
    /// Cell shielded by a neighbouring firefighter; it will never burn.
    Protected,
    /// Cell occupied by a firefighter unit; it will never burn.
    Firefighter,
}

impl CellState {
    /// Reports whether the state shields the cell from fire permanently.
    #[must_use]
    pub const fn is_shielded(self) -> bool {
        matches!(self, Self::Protected | Self::Firefighter)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Offsets the coordinate by the provided column and row deltas.
    ///
    /// Returns `None` when either axis would leave the unsigned range.
    #[must_use]
    pub fn offset(self, column_delta: i64, row_delta: i64) -> Option<CellCoord> {
        let column = u32::try_from(i64::from(self.column) + column_delta).ok()?;
        let row = u32::try_from(i64::from(self.row) + row_delta).ok()?;
        Some(CellCoord::new(column, row))
    }
}

/// Dimensions of a simulation grid measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Creates a new grid size descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.width) * u64::from(self.height);
        usize::try_from(count).unwrap_or(0)
    }

    /// Reports whether the coordinate lies within `[0, width) x [0, height)`.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Converts a coordinate into a row-major index, if it is in bounds.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }

    /// Converts a row-major index back into a coordinate.
    #[must_use]
    pub fn coord(&self, index: usize) -> Option<CellCoord> {
        if index >= self.cell_count() || self.width == 0 {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Enumerates the in-bounds orthogonal neighbours of `cell`.
    ///
    /// Neighbours outside the grid are skipped rather than wrapped, so edge
    /// cells yield three neighbours and corner cells two.
    pub fn four_neighbors(self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        const OFFSETS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        OFFSETS
            .into_iter()
            .filter_map(move |(column_delta, row_delta)| cell.offset(column_delta, row_delta))
            .filter(move |neighbor| self.contains(*neighbor))
    }
}

/// Sequential identifier of a simulation turn. The first turn is `1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurnIndex(u64);

impl TurnIndex {
    /// Creates a new turn identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the turn.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns the identifier of the following turn.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of real time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Marks a cell of the fire grid as burning.
    Ignite {
        /// Cell receiving the ignition.
        cell: CellCoord,
    },
    /// Opens a new turn.
    BeginTurn {
        /// Whether firefighters may be placed during this turn.
        containment: bool,
    },
    /// Spreads fire from a burning composite cell into its fire-grid neighbours.
    SpreadFire {
        /// Burning cell the fire spreads out of.
        origin: CellCoord,
    },
    /// Places a firefighter and protects its orthogonal neighbours.
    PlaceFirefighter {
        /// Cell the firefighter lands on.
        cell: CellCoord,
    },
    /// Merges the fire and firefighter grids into the composite buffer and
    /// evaluates the termination predicate.
    ResolveTurn,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of real time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a fire was ignited in the fire grid.
    FireIgnited {
        /// Cell that caught fire.
        cell: CellCoord,
    },
    /// Reports that an ignition request was rejected.
    IgnitionRejected {
        /// Cell provided in the request.
        cell: CellCoord,
        /// Specific reason the ignition failed.
        reason: RejectionReason,
    },
    /// Announces that a new turn has started.
    TurnStarted {
        /// Identifier of the turn that started.
        turn: TurnIndex,
        /// Whether firefighters may be placed during the turn.
        containment_enabled: bool,
    },
    /// Confirms that a firefighter landed on the grid.
    FirefighterPlaced {
        /// Cell occupied by the firefighter.
        cell: CellCoord,
    },
    /// Reports that a firefighter placement was rejected.
    PlacementRejected {
        /// Cell provided in the request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: RejectionReason,
    },
    /// Reports the outcome of merging the grids at the end of a turn.
    TurnResolved {
        /// Identifier of the resolved turn.
        turn: TurnIndex,
        /// Number of composite cells that started burning during the merge.
        newly_burning: u32,
    },
    /// Announces that the fire can no longer expand and the grid is frozen.
    SimulationFrozen {
        /// Turn that triggered the freeze.
        turn: TurnIndex,
        /// Number of unprotected cells reclassified as protected.
        survivors: u32,
    },
}

/// Reasons an explicit cell command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The simulation has frozen and no longer accepts mutations.
    Frozen,
}

/// Read-only view into the composite (display) buffer.
#[derive(Clone, Copy, Debug)]
pub struct CompositeView<'a> {
    cells: &'a [CellState],
    size: GridSize,
}

impl<'a> CompositeView<'a> {
    /// Captures a new view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [CellState], size: GridSize) -> Self {
        Self { cells, size }
    }

    /// Dimensions of the underlying grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Returns the state of the provided cell, if it is in bounds.
    #[must_use]
    pub fn state(&self, cell: CellCoord) -> Option<CellState> {
        self.size
            .index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Iterates over every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellState)> + 'a {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(index, state)| size.coord(index).map(|cell| (cell, *state)))
    }

    /// Counts the cells currently holding `state`.
    #[must_use]
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|cell| **cell == state).count()
    }

    /// Exposes the raw row-major cells.
    #[must_use]
    pub fn cells(&self) -> &'a [CellState] {
        self.cells
    }
}

/// Strategy deciding where firefighters land during a turn.
pub trait ContainmentStrategy {
    /// Selects at most `budget` placement cells from the composite buffer.
    fn select_placements(&self, composite: CompositeView<'_>, budget: u32) -> Vec<CellCoord>;
}

impl<S: ContainmentStrategy + ?Sized> ContainmentStrategy for Box<S> {
    fn select_placements(&self, composite: CompositeView<'_>, budget: u32) -> Vec<CellCoord> {
        (**self).select_placements(composite, budget)
    }
}

/// Read-only parameters fixed when the simulation starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of grid columns.
    pub width: u32,
    /// Number of grid rows.
    pub height: u32,
    /// Firefighters placed per eligible turn.
    pub total_firefighters: u32,
    /// Number of random ignition points seeded at start.
    pub total_fires: u32,
    /// Turns the fire spreads before firefighters respond.
    pub initial_fire_steps: u32,
    /// Real time that must elapse between turns.
    pub milliseconds_per_turn: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            total_firefighters: 1,
            total_fires: 10,
            initial_fire_steps: 1,
            milliseconds_per_turn: 100,
        }
    }
}

impl SimulationConfig {
    /// Dimensions of the simulated grid.
    #[must_use]
    pub const fn grid_size(&self) -> GridSize {
        GridSize::new(self.width, self.height)
    }

    /// Real-time interval between successive turns.
    #[must_use]
    pub fn turn_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.milliseconds_per_turn))
    }

    /// Checks that the parameters describe a runnable simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.milliseconds_per_turn == 0 {
            return Err(ConfigError::ZeroTurnInterval);
        }
        Ok(())
    }
}

/// Errors raised when simulation parameters cannot be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Grid must contain at least one cell.
    #[error("grid must have a positive size (received {width}x{height})")]
    EmptyGrid {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// Turns must be separated by a positive real-time interval.
    #[error("milliseconds_per_turn must be positive")]
    ZeroTurnInterval,
}
