use std::time::Duration;

use firefighter_core::{Command, Event, SimulationConfig, TurnIndex};
use firefighter_system_turn_scheduler::{Config, TurnScheduler};

fn tick(millis: u64) -> Event {
    Event::TimeAdvanced {
        dt: Duration::from_millis(millis),
    }
}

fn drive(scheduler: &mut TurnScheduler, frames: &[u64]) -> Vec<Option<bool>> {
    frames
        .iter()
        .map(|millis| {
            let mut commands = Vec::new();
            scheduler.handle(&[tick(*millis)], &mut commands);
            assert!(commands.len() <= 1, "at most one turn per frame");
            commands.first().map(|command| match command {
                Command::BeginTurn { containment } => *containment,
                other => panic!("unexpected command emitted: {other:?}"),
            })
        })
        .collect()
}

#[test]
fn turn_waits_for_full_interval() {
    let mut scheduler = TurnScheduler::new(Config::new(Duration::from_millis(100), 0));

    let turns = drive(&mut scheduler, &[40, 40, 19, 1]);

    assert_eq!(turns, vec![None, None, None, Some(true)]);
    assert_eq!(scheduler.accumulated(), Duration::ZERO);
}

#[test]
fn long_frames_never_catch_up() {
    let mut scheduler = TurnScheduler::new(Config::new(Duration::from_millis(100), 0));

    let turns = drive(&mut scheduler, &[450, 10, 90]);

    assert_eq!(
        turns,
        vec![Some(true), None, Some(true)],
        "surplus time from the long frame must be discarded"
    );
}

#[test]
fn initial_fire_steps_withhold_containment() {
    let config = SimulationConfig {
        initial_fire_steps: 2,
        milliseconds_per_turn: 50,
        ..SimulationConfig::default()
    };
    let mut scheduler = TurnScheduler::new(Config::from(&config));

    let turns = drive(&mut scheduler, &[50, 50, 50, 50]);

    assert_eq!(turns, vec![Some(false), Some(false), Some(true), Some(true)]);
}

#[test]
fn frozen_simulation_stops_scheduling() {
    let mut scheduler = TurnScheduler::new(Config::new(Duration::from_millis(10), 0));
    let mut commands = Vec::new();

    scheduler.handle(
        &[Event::SimulationFrozen {
            turn: TurnIndex::new(4),
            survivors: 12,
        }],
        &mut commands,
    );
    let turns = drive(&mut scheduler, &[100, 100]);

    assert!(commands.is_empty());
    assert_eq!(turns, vec![None, None]);
    assert!(scheduler.is_stopped());
}

#[test]
fn idle_batches_do_not_advance_time() {
    let mut scheduler = TurnScheduler::new(Config::new(Duration::from_millis(10), 0));
    let mut commands = Vec::new();

    scheduler.handle(&[], &mut commands);

    assert!(commands.is_empty());
    assert_eq!(scheduler.accumulated(), Duration::ZERO);
}
