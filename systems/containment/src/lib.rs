#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Containment planning: decides where firefighters land each turn.
//!
//! [`PreciseLanding`] scans every 2x2 block of the composite buffer, column by
//! column and top to bottom within a column, and compares it against a fixed,
//! ordered table of single-burning-corner patterns. A block matching a pattern receives a firefighter at the
//! pattern's landing offset. [`Containment`] wraps any
//! [`ContainmentStrategy`] and turns its choices into world commands.

use firefighter_core::{CellCoord, CellState, Command, CompositeView, ContainmentStrategy, Event};

use CellState::{Burning as B, Unprotected as U};

/// States of a 2x2 block read as `(top_left, top_right, bottom_left, bottom_right)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    /// Cell at `(x, y)`.
    pub top_left: CellState,
    /// Cell at `(x + 1, y)`.
    pub top_right: CellState,
    /// Cell at `(x, y + 1)`.
    pub bottom_left: CellState,
    /// Cell at `(x + 1, y + 1)`.
    pub bottom_right: CellState,
}

impl Block {
    /// Reads the block anchored at `origin`, if all four corners are in bounds.
    #[must_use]
    pub fn read(composite: &CompositeView<'_>, origin: CellCoord) -> Option<Self> {
        let at = |column_delta, row_delta| {
            origin
                .offset(column_delta, row_delta)
                .and_then(|cell| composite.state(cell))
        };
        Some(Self {
            top_left: at(0, 0)?,
            top_right: at(1, 0)?,
            bottom_left: at(0, 1)?,
            bottom_right: at(1, 1)?,
        })
    }

    const fn from_corners(corners: [CellState; 4]) -> Self {
        Self {
            top_left: corners[0],
            top_right: corners[1],
            bottom_left: corners[2],
            bottom_right: corners[3],
        }
    }
}

/// Single row of the axiom table: a block pattern and where to land on a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Axiom {
    /// Block the composite must match exactly.
    pub pattern: Block,
    /// Landing offset `(column, row)` relative to the block origin.
    pub landing: (u32, u32),
}

/// Ordered axiom table; the lowest index wins when several could match.
pub const PRECISE_AXIOMS: [Axiom; 4] = [
    Axiom {
        pattern: Block::from_corners([U, U, U, B]),
        landing: (1, 1),
    },
    Axiom {
        pattern: Block::from_corners([U, U, B, U]),
        landing: (0, 1),
    },
    Axiom {
        pattern: Block::from_corners([U, B, U, U]),
        landing: (1, 0),
    },
    Axiom {
        pattern: Block::from_corners([B, U, U, U]),
        landing: (0, 0),
    },
];

/// Look-ahead firebreak heuristic matching lone burning corners.
#[derive(Clone, Copy, Debug, Default)]
pub struct PreciseLanding;

impl PreciseLanding {
    /// Returns the landing offset for `block`, if any axiom matches it.
    #[must_use]
    pub fn landing_for(block: Block) -> Option<(u32, u32)> {
        PRECISE_AXIOMS
            .iter()
            .find(|axiom| axiom.pattern == block)
            .map(|axiom| axiom.landing)
    }
}

impl ContainmentStrategy for PreciseLanding {
    fn select_placements(&self, composite: CompositeView<'_>, budget: u32) -> Vec<CellCoord> {
        let size = composite.size();
        let mut remaining = budget;
        let mut placements = Vec::new();
        if remaining == 0 || size.width() < 2 || size.height() < 2 {
            return placements;
        }

        for column in 0..size.width() - 1 {
            for row in 0..size.height() - 1 {
                let origin = CellCoord::new(column, row);
                let Some(block) = Block::read(&composite, origin) else {
                    continue;
                };
                let Some((column_offset, row_offset)) = Self::landing_for(block) else {
                    continue;
                };

                placements.push(CellCoord::new(column + column_offset, row + row_offset));
                remaining -= 1;
                if remaining == 0 {
                    return placements;
                }
            }
        }

        placements
    }
}

/// Pure system that asks a strategy for placements on eligible turns.
#[derive(Debug)]
pub struct Containment<S = PreciseLanding> {
    strategy: S,
    budget: u32,
}

impl Containment<PreciseLanding> {
    /// Creates a containment system driven by [`PreciseLanding`].
    #[must_use]
    pub const fn precise_landing(budget: u32) -> Self {
        Self::new(PreciseLanding, budget)
    }
}

impl<S: ContainmentStrategy> Containment<S> {
    /// Creates a containment system placing at most `budget` units per turn.
    #[must_use]
    pub const fn new(strategy: S, budget: u32) -> Self {
        Self { strategy, budget }
    }

    /// Number of firefighters available per eligible turn.
    #[must_use]
    pub const fn budget(&self) -> u32 {
        self.budget
    }

    /// Consumes world events and the composite buffer to emit placement commands.
    pub fn handle(&mut self, events: &[Event], composite: CompositeView<'_>, out: &mut Vec<Command>) {
        let eligible = events.iter().any(|event| {
            matches!(
                event,
                Event::TurnStarted {
                    containment_enabled: true,
                    ..
                }
            )
        });
        if !eligible {
            return;
        }

        let placements = self.strategy.select_placements(composite, self.budget);
        debug_assert!(placements.len() <= self.budget as usize);
        out.extend(
            placements
                .into_iter()
                .map(|cell| Command::PlaceFirefighter { cell }),
        );
    }
}
