use std::{collections::BTreeSet, time::Duration};

use firefighter_core::{CellCoord, CellState, Event, SimulationConfig, TurnIndex};
use firefighter_simulation::Simulation;
use firefighter_world::query;

fn config(width: u32, height: u32, firefighters: u32, initial_fire_steps: u32) -> SimulationConfig {
    SimulationConfig {
        width,
        height,
        total_firefighters: firefighters,
        total_fires: 0,
        initial_fire_steps,
        milliseconds_per_turn: 100,
    }
}

fn burning_cells(simulation: &Simulation) -> BTreeSet<CellCoord> {
    query::composite_view(simulation.world())
        .iter()
        .filter(|(_, state)| *state == CellState::Burning)
        .map(|(cell, _)| cell)
        .collect()
}

#[test]
fn uncontained_fire_grows_one_ring_per_turn() {
    let center = CellCoord::new(5, 5);
    let mut simulation =
        Simulation::with_ignitions(config(10, 10, 0, 0), &[center]).expect("valid config");

    for _ in 0..3 {
        let _ = simulation.step_turn();
    }

    let expected: BTreeSet<CellCoord> = (0..10)
        .flat_map(|row| (0..10).map(move |column| CellCoord::new(column, row)))
        .filter(|cell| cell.manhattan_distance(center) <= 2)
        .collect();
    assert_eq!(expected.len(), 13);
    assert_eq!(burning_cells(&simulation), expected);
}

#[test]
fn ignition_surfaces_on_first_turn() {
    let cell = CellCoord::new(1, 1);
    let mut simulation =
        Simulation::with_ignitions(config(4, 4, 0, 0), &[cell]).expect("valid config");
    assert!(burning_cells(&simulation).is_empty());

    let events = simulation.step_turn();

    assert!(events.contains(&Event::TurnResolved {
        turn: TurnIndex::new(1),
        newly_burning: 1,
    }));
    assert_eq!(burning_cells(&simulation), BTreeSet::from([cell]));
}

#[test]
fn corner_fire_is_contained_and_grid_freezes() {
    let mut simulation =
        Simulation::with_ignitions(config(4, 4, 4, 0), &[CellCoord::new(0, 0)])
            .expect("valid config");

    let first = simulation.step_turn();
    assert!(!first
        .iter()
        .any(|event| matches!(event, Event::FirefighterPlaced { .. })));

    let second = simulation.step_turn();
    assert!(second.contains(&Event::FirefighterPlaced {
        cell: CellCoord::new(0, 0),
    }));
    assert!(second.contains(&Event::SimulationFrozen {
        turn: TurnIndex::new(2),
        survivors: 13,
    }));
    assert!(simulation.is_frozen());

    let census = query::census(simulation.world());
    assert_eq!(census.firefighters, 1);
    assert_eq!(census.protected, 15);
    assert_eq!(census.burning, 0);
    assert_eq!(census.unprotected, 0);
}

#[test]
fn frozen_grid_never_changes() {
    let mut simulation =
        Simulation::with_ignitions(config(4, 4, 4, 0), &[CellCoord::new(0, 0)])
            .expect("valid config");
    let _ = simulation.step_turn();
    let _ = simulation.step_turn();
    assert!(simulation.is_frozen());
    let snapshot = query::composite_view(simulation.world()).cells().to_vec();

    for _ in 0..5 {
        let events = simulation.step_turn();
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(100),
            }]
        );
    }

    assert_eq!(
        query::composite_view(simulation.world()).cells(),
        snapshot.as_slice()
    );
    assert_eq!(query::turn(simulation.world()), TurnIndex::new(2));
}

#[test]
fn response_delay_withholds_placements() {
    let mut simulation =
        Simulation::with_ignitions(config(9, 9, 2, 2), &[CellCoord::new(4, 4)])
            .expect("valid config");

    for turn in 1..=4_u64 {
        let events = simulation.step_turn();
        let placed = events
            .iter()
            .filter(|event| matches!(event, Event::FirefighterPlaced { .. }))
            .count();
        let enabled = events.iter().find_map(|event| match event {
            Event::TurnStarted {
                containment_enabled,
                ..
            } => Some(*containment_enabled),
            _ => None,
        });

        assert_eq!(enabled, Some(turn > 2), "turn {turn}");
        if turn <= 2 {
            assert_eq!(placed, 0, "turn {turn} must not place firefighters");
        }
        assert!(placed <= 2, "turn {turn} exceeded the per-turn budget");
    }
}

#[test]
fn slow_frames_run_a_single_turn() {
    let mut simulation =
        Simulation::with_ignitions(config(9, 9, 0, 0), &[CellCoord::new(4, 4)])
            .expect("valid config");

    let events = simulation.advance(Duration::from_secs(3));

    let turns = events
        .iter()
        .filter(|event| matches!(event, Event::TurnStarted { .. }))
        .count();
    assert_eq!(turns, 1);
}

#[test]
fn seeded_runs_replay_identically() {
    let config = SimulationConfig {
        width: 48,
        height: 32,
        total_firefighters: 3,
        total_fires: 6,
        initial_fire_steps: 1,
        milliseconds_per_turn: 50,
    };

    let replay = || {
        let mut simulation = Simulation::new(config, 0x5eed).expect("valid config");
        let mut log = Vec::new();
        for frame in 0..400_u64 {
            log.extend(simulation.advance(Duration::from_millis(10 + frame % 7)));
        }
        let cells = query::composite_view(simulation.world()).cells().to_vec();
        (log, cells)
    };

    let first = replay();
    let second = replay();
    assert_eq!(first, second, "replay diverged between runs");
}
