#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure fire-spread system that advances the fire front by one ring per turn.

use firefighter_core::{CellState, Command, CompositeView, Event};

/// Emits a spread command for every burning composite cell when a turn starts.
///
/// The world writes the spread into the fire grid only; protected and
/// occupied cells are filtered out later, when the turn is resolved.
#[derive(Debug, Default, Clone)]
pub struct FireSpread;

impl FireSpread {
    /// Creates a new fire-spread system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Consumes world events and the composite buffer to emit spread commands.
    pub fn handle(&mut self, events: &[Event], composite: CompositeView<'_>, out: &mut Vec<Command>) {
        let turn_started = events
            .iter()
            .any(|event| matches!(event, Event::TurnStarted { .. }));
        if !turn_started {
            return;
        }

        out.extend(
            composite
                .iter()
                .filter(|(_, state)| *state == CellState::Burning)
                .map(|(origin, _)| Command::SpreadFire { origin }),
        );
    }
}
