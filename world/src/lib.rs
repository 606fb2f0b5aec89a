#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the firefighter simulation.
//!
//! The world owns three same-shaped grids: the fire grid recording ignited
//! cells, the firefighter grid recording units and their protected halos, and
//! the composite buffer that merges both and is shown to players. All
//! mutation flows through [`apply`].

use firefighter_core::{
    CellCoord, CellState, Command, CompositeView, Event, GridSize, RejectionReason, TurnIndex,
};

/// Dense row-major grid of cell states with bounds-checked access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellGrid {
    size: GridSize,
    cells: Vec<CellState>,
}

impl CellGrid {
    /// Allocates a grid with every cell `Unprotected`.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![CellState::Unprotected; size.cell_count()],
        }
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Returns the state stored at `cell`, if it is in bounds.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<CellState> {
        self.size
            .index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Writes `state` into `cell`. Out-of-bounds writes are skipped.
    pub fn set(&mut self, cell: CellCoord, state: CellState) {
        if let Some(index) = self.size.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = state;
            }
        }
    }

    /// Writes `state` into every in-bounds orthogonal neighbour of `cell`,
    /// leaving `cell` itself untouched.
    pub fn spread_to_neighbors(&mut self, cell: CellCoord, state: CellState) {
        for neighbor in self.size.four_neighbors(cell) {
            self.set(neighbor, state);
        }
    }

    /// Captures a read-only view over the grid.
    #[must_use]
    pub fn view(&self) -> CompositeView<'_> {
        CompositeView::new(&self.cells, self.size)
    }
}

/// Represents the authoritative simulation world.
#[derive(Debug)]
pub struct World {
    fire: CellGrid,
    firefighters: CellGrid,
    composite: CellGrid,
    turn: TurnIndex,
    frozen: bool,
}

impl World {
    /// Creates a world whose three grids share the provided dimensions.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self {
            fire: CellGrid::new(size),
            firefighters: CellGrid::new(size),
            composite: CellGrid::new(size),
            turn: TurnIndex::default(),
            frozen: false,
        }
    }

    fn resolve_turn(&mut self, out_events: &mut Vec<Event>) {
        let newly_burning = self.merge();
        out_events.push(Event::TurnResolved {
            turn: self.turn,
            newly_burning,
        });

        if newly_burning == 0 {
            let survivors = self.reclassify_survivors();
            self.frozen = true;
            out_events.push(Event::SimulationFrozen {
                turn: self.turn,
                survivors,
            });
        }
    }

    /// Folds the fire and firefighter grids into the composite buffer and
    /// returns how many composite cells caught fire.
    fn merge(&mut self) -> u32 {
        let mut newly_burning = 0_u32;
        let sources = self.fire.cells.iter().zip(self.firefighters.cells.iter());
        for (slot, (fire, unit)) in self.composite.cells.iter_mut().zip(sources) {
            if unit.is_shielded() {
                *slot = *unit;
            }
            if *fire == CellState::Burning && !slot.is_shielded() && *slot != CellState::Burning {
                *slot = CellState::Burning;
                newly_burning = newly_burning.saturating_add(1);
            }
        }
        newly_burning
    }

    fn reclassify_survivors(&mut self) -> u32 {
        let mut survivors = 0_u32;
        for slot in &mut self.composite.cells {
            if *slot == CellState::Unprotected {
                *slot = CellState::Protected;
                survivors = survivors.saturating_add(1);
            }
        }
        survivors
    }

    fn check_cell(&self, cell: CellCoord) -> Result<(), RejectionReason> {
        if self.frozen {
            Err(RejectionReason::Frozen)
        } else if !self.composite.size().contains(cell) {
            Err(RejectionReason::OutOfBounds)
        } else {
            Ok(())
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::Ignite { cell } => match world.check_cell(cell) {
            Ok(()) => {
                world.fire.set(cell, CellState::Burning);
                out_events.push(Event::FireIgnited { cell });
            }
            Err(reason) => out_events.push(Event::IgnitionRejected { cell, reason }),
        },
        Command::BeginTurn { containment } => {
            if world.frozen {
                return;
            }
            world.turn = world.turn.next();
            out_events.push(Event::TurnStarted {
                turn: world.turn,
                containment_enabled: containment,
            });
        }
        Command::SpreadFire { origin } => {
            if world.frozen {
                return;
            }
            world.fire.spread_to_neighbors(origin, CellState::Burning);
        }
        Command::PlaceFirefighter { cell } => match world.check_cell(cell) {
            Ok(()) => {
                world.firefighters.set(cell, CellState::Firefighter);
                world
                    .firefighters
                    .spread_to_neighbors(cell, CellState::Protected);
                out_events.push(Event::FirefighterPlaced { cell });
            }
            Err(reason) => out_events.push(Event::PlacementRejected { cell, reason }),
        },
        Command::ResolveTurn => {
            if world.frozen {
                return;
            }
            world.resolve_turn(out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use firefighter_core::{CellState, CompositeView, GridSize, TurnIndex};

    /// Dimensions shared by all three grids.
    #[must_use]
    pub fn grid_size(world: &World) -> GridSize {
        world.composite.size()
    }

    /// Read-only view of the composite buffer used for rendering and planning.
    #[must_use]
    pub fn composite_view(world: &World) -> CompositeView<'_> {
        world.composite.view()
    }

    /// Read-only view of the fire grid.
    #[must_use]
    pub fn fire_view(world: &World) -> CompositeView<'_> {
        world.fire.view()
    }

    /// Read-only view of the firefighter grid.
    #[must_use]
    pub fn firefighter_view(world: &World) -> CompositeView<'_> {
        world.firefighters.view()
    }

    /// Identifier of the most recently started turn; zero before the first.
    #[must_use]
    pub fn turn(world: &World) -> TurnIndex {
        world.turn
    }

    /// Reports whether the termination predicate has fired.
    #[must_use]
    pub fn is_frozen(world: &World) -> bool {
        world.frozen
    }

    /// Counts composite cells per state.
    #[must_use]
    pub fn census(world: &World) -> Census {
        let mut census = Census::default();
        for state in world.composite.view().cells() {
            match state {
                CellState::Unprotected => census.unprotected += 1,
                CellState::Burning => census.burning += 1,
                CellState::Protected => census.protected += 1,
                CellState::Firefighter => census.firefighters += 1,
            }
        }
        census
    }

    /// Number of composite cells in each state.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Census {
        /// Cells that are neither burning nor protected.
        pub unprotected: usize,
        /// Cells that are burning.
        pub burning: usize,
        /// Cells that are protected.
        pub protected: usize,
        /// Cells occupied by firefighters.
        pub firefighters: usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn world_with(size: GridSize) -> World {
        World::new(size)
    }

    fn run(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            apply(world, command, &mut events);
        }
        events
    }

    #[test]
    fn set_writes_single_cell_and_skips_out_of_bounds() {
        let mut grid = CellGrid::new(GridSize::new(3, 3));
        grid.set(CellCoord::new(1, 1), CellState::Burning);
        grid.set(CellCoord::new(3, 0), CellState::Burning);

        assert_eq!(grid.get(CellCoord::new(1, 1)), Some(CellState::Burning));
        assert_eq!(grid.view().count(CellState::Burning), 1);
    }

    #[test]
    fn spread_leaves_origin_unchanged() {
        let mut grid = CellGrid::new(GridSize::new(3, 3));
        grid.spread_to_neighbors(CellCoord::new(1, 1), CellState::Protected);

        assert_eq!(grid.get(CellCoord::new(1, 1)), Some(CellState::Unprotected));
        assert_eq!(grid.view().count(CellState::Protected), 4);
    }

    #[test]
    fn spread_from_corner_reaches_first_row_and_column() {
        let mut grid = CellGrid::new(GridSize::new(3, 3));
        grid.spread_to_neighbors(CellCoord::new(1, 0), CellState::Burning);

        assert_eq!(grid.get(CellCoord::new(0, 0)), Some(CellState::Burning));
        assert_eq!(grid.get(CellCoord::new(2, 0)), Some(CellState::Burning));
        assert_eq!(grid.get(CellCoord::new(1, 1)), Some(CellState::Burning));
        assert_eq!(grid.view().count(CellState::Burning), 3);
    }

    #[test]
    fn tick_reports_time_advanced() {
        let mut world = world_with(GridSize::new(2, 2));
        let dt = Duration::from_millis(16);
        let events = run(&mut world, vec![Command::Tick { dt }]);
        assert_eq!(events, vec![Event::TimeAdvanced { dt }]);
    }

    #[test]
    fn ignition_appears_in_composite_only_after_resolution() {
        let mut world = world_with(GridSize::new(4, 4));
        let cell = CellCoord::new(2, 1);
        let events = run(&mut world, vec![Command::Ignite { cell }]);

        assert_eq!(events, vec![Event::FireIgnited { cell }]);
        assert_eq!(query::fire_view(&world).state(cell), Some(CellState::Burning));
        assert_eq!(
            query::composite_view(&world).state(cell),
            Some(CellState::Unprotected)
        );

        let events = run(
            &mut world,
            vec![
                Command::BeginTurn { containment: false },
                Command::ResolveTurn,
            ],
        );
        assert_eq!(
            events.last(),
            Some(&Event::TurnResolved {
                turn: TurnIndex::new(1),
                newly_burning: 1,
            })
        );
        assert_eq!(
            query::composite_view(&world).state(cell),
            Some(CellState::Burning)
        );
    }

    #[test]
    fn out_of_bounds_commands_are_rejected() {
        let mut world = world_with(GridSize::new(2, 2));
        let cell = CellCoord::new(5, 0);
        let events = run(
            &mut world,
            vec![Command::Ignite { cell }, Command::PlaceFirefighter { cell }],
        );

        assert_eq!(
            events,
            vec![
                Event::IgnitionRejected {
                    cell,
                    reason: RejectionReason::OutOfBounds,
                },
                Event::PlacementRejected {
                    cell,
                    reason: RejectionReason::OutOfBounds,
                },
            ]
        );
    }

    #[test]
    fn protection_takes_precedence_over_fire() {
        let mut world = world_with(GridSize::new(5, 5));
        let center = CellCoord::new(2, 2);
        let _ = run(
            &mut world,
            vec![
                Command::Ignite {
                    cell: CellCoord::new(1, 2),
                },
                Command::Ignite {
                    cell: CellCoord::new(4, 4),
                },
                Command::BeginTurn { containment: true },
                Command::PlaceFirefighter { cell: center },
                Command::ResolveTurn,
            ],
        );

        let composite = query::composite_view(&world);
        assert_eq!(composite.state(center), Some(CellState::Firefighter));
        assert_eq!(
            composite.state(CellCoord::new(1, 2)),
            Some(CellState::Protected)
        );
        assert_eq!(
            composite.state(CellCoord::new(4, 4)),
            Some(CellState::Burning)
        );
        assert_eq!(
            query::fire_view(&world).state(CellCoord::new(1, 2)),
            Some(CellState::Burning),
            "fire grid keeps the ignition even though the composite hides it"
        );
    }

    #[test]
    fn resolution_without_new_fire_freezes_and_reclassifies() {
        let mut world = world_with(GridSize::new(3, 3));
        let events = run(
            &mut world,
            vec![Command::BeginTurn { containment: false }, Command::ResolveTurn],
        );

        assert_eq!(
            events,
            vec![
                Event::TurnStarted {
                    turn: TurnIndex::new(1),
                    containment_enabled: false,
                },
                Event::TurnResolved {
                    turn: TurnIndex::new(1),
                    newly_burning: 0,
                },
                Event::SimulationFrozen {
                    turn: TurnIndex::new(1),
                    survivors: 9,
                },
            ]
        );
        assert!(query::is_frozen(&world));
        assert_eq!(query::census(&world).protected, 9);
    }

    #[test]
    fn frozen_world_ignores_further_mutation() {
        let mut world = world_with(GridSize::new(3, 3));
        let _ = run(
            &mut world,
            vec![Command::BeginTurn { containment: false }, Command::ResolveTurn],
        );
        let before = query::composite_view(&world).cells().to_vec();

        let cell = CellCoord::new(1, 1);
        let events = run(
            &mut world,
            vec![
                Command::Ignite { cell },
                Command::BeginTurn { containment: true },
                Command::SpreadFire { origin: cell },
                Command::PlaceFirefighter { cell },
                Command::ResolveTurn,
            ],
        );

        assert_eq!(
            events,
            vec![
                Event::IgnitionRejected {
                    cell,
                    reason: RejectionReason::Frozen,
                },
                Event::PlacementRejected {
                    cell,
                    reason: RejectionReason::Frozen,
                },
            ]
        );
        assert_eq!(query::composite_view(&world).cells(), before.as_slice());
        assert_eq!(query::turn(&world), TurnIndex::new(1));
    }

    #[test]
    fn census_counts_each_state() {
        let mut world = world_with(GridSize::new(4, 4));
        let _ = run(
            &mut world,
            vec![
                Command::Ignite {
                    cell: CellCoord::new(0, 0),
                },
                Command::BeginTurn { containment: true },
                Command::PlaceFirefighter {
                    cell: CellCoord::new(2, 2),
                },
                Command::ResolveTurn,
            ],
        );

        let census = query::census(&world);
        assert_eq!(census.burning, 1);
        assert_eq!(census.firefighters, 1);
        assert_eq!(census.protected, 4);
        assert_eq!(census.unprotected, 10);
    }
}
