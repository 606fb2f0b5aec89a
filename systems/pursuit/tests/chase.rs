use firefighter_core::{CellCoord, GridSize};
use firefighter_system_pursuit::{Chase, ChaseOutcome};

#[test]
fn pursuer_catches_evader_in_open_field() {
    let size = GridSize::new(32, 24);
    let pursuer = CellCoord::new(0, 0);
    let evader = CellCoord::new(16, 12);
    let mut chase = Chase::new(size, pursuer, evader, 2);

    let outcome = chase.run(1_000);

    let bound = 2 * pursuer.manhattan_distance(evader);
    match outcome {
        ChaseOutcome::Caught { steps } => assert!(steps <= bound, "{steps} > {bound}"),
        ChaseOutcome::Pursuing => panic!("evader escaped"),
    }
    assert_eq!(chase.pursuer(), chase.evader());
}

#[test]
fn capture_is_guaranteed_from_every_start() {
    let size = GridSize::new(6, 5);
    for pursuer_index in 0..size.cell_count() {
        for evader_index in 0..size.cell_count() {
            let pursuer = size.coord(pursuer_index).expect("in bounds");
            let evader = size.coord(evader_index).expect("in bounds");
            let mut chase = Chase::new(size, pursuer, evader, 3);

            let outcome = chase.run(200);

            assert!(
                matches!(outcome, ChaseOutcome::Caught { .. }),
                "{pursuer:?} never caught {evader:?}"
            );
        }
    }
}

#[test]
fn chases_replay_identically() {
    let size = GridSize::new(20, 20);
    let mut first = Chase::new(size, CellCoord::new(19, 0), CellCoord::new(3, 17), 2);
    let mut second = first.clone();

    for _ in 0..50 {
        assert_eq!(first.step(), second.step());
        assert_eq!(first.pursuer(), second.pursuer());
        assert_eq!(first.evader(), second.evader());
    }
}

#[test]
fn shared_start_counts_as_immediate_capture() {
    let cell = CellCoord::new(2, 2);
    let mut chase = Chase::new(GridSize::new(4, 4), cell, cell, 2);

    assert_eq!(chase.run(10), ChaseOutcome::Caught { steps: 0 });
    assert_eq!(chase.steps(), 0);
}

#[test]
fn run_stops_at_step_limit() {
    let mut chase = Chase::new(
        GridSize::new(50, 50),
        CellCoord::new(0, 0),
        CellCoord::new(49, 49),
        2,
    );

    assert_eq!(chase.run(5), ChaseOutcome::Pursuing);
    assert_eq!(chase.steps(), 5);
}
