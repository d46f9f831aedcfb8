use capture_line_sat::capture::{CellState, OutcomeValidator, Verdict};
use capture_line_sat::config::SolverBackend;
use capture_line_sat::game::{Ball, Canvas, Direction, Orientation, Position, Scenario};
use capture_line_sat::sat::SatEncoder;
use capture_line_sat::{CaptureProblem, Settings};

fn open_row_scenario() -> Scenario {
    Scenario::new(Canvas::new(5, 5), Orientation::Horizontal, Position::new(2, 2), vec![])
}

fn ball_on_cursor_scenario() -> Scenario {
    Scenario::new(
        Canvas::new(3, 3),
        Orientation::Vertical,
        Position::new(1, 1),
        vec![Ball::new(1, 1, 1, 1)],
    )
}

fn solve(scenario: Scenario, backend: SolverBackend) -> Verdict {
    SatEncoder::with_backend(scenario, backend).solve().unwrap()
}

#[test]
fn horizontal_line_on_open_canvas_captures_middle_row() {
    let mut settings = Settings::default();
    settings.scenario.balls.clear();
    let mut problem = CaptureProblem::with_scenario(settings, open_row_scenario());

    let verdict = problem.solve().unwrap();
    let outcome = verdict.outcome().unwrap();
    assert!(!outcome.life_lost);
    assert_eq!(outcome.horizon(), 5);

    let initial = outcome.initial_snapshot().unwrap();
    let heads = initial.builder_heads();
    assert_eq!(heads.len(), 2);
    assert!(heads.contains(&(Direction::East, Position::new(2, 2))));
    assert!(heads.contains(&(Direction::West, Position::new(2, 2))));

    let t = 4;
    let snapshot = outcome.snapshot(t).unwrap();
    assert!(snapshot.finished.contains(&Direction::East));
    assert!(snapshot.finished.contains(&Direction::West));
    for x in 0..5 {
        assert_eq!(snapshot.cell(x, 2), Some(CellState::Captured), "cell ({x}, 2) at t = {t}");
    }
    assert_eq!(snapshot.captured_count(), 5);
    assert!(snapshot.builder_heads().is_empty());
}

#[test]
fn builder_crossing_ball_costs_a_life() {
    let verdict = solve(ball_on_cursor_scenario(), SolverBackend::Cadical);
    let outcome = verdict.outcome().unwrap();

    assert!(outcome.life_lost);
    assert_eq!(outcome.first_life_loss(), Some(1));
    assert_eq!(outcome.snapshot(0).unwrap().collisions, vec![Position::new(1, 1)]);
}

#[test]
fn cursor_on_captured_cell_has_no_valid_run() {
    let scenario = Scenario::new(Canvas::bordered(5, 5), Orientation::Horizontal, Position::new(0, 0), vec![]);
    let verdict = solve(scenario, SolverBackend::Cadical);

    assert!(matches!(verdict, Verdict::NoValidRun));
    assert_eq!(verdict.life_lost(), None);
}

#[test]
fn decoded_runs_satisfy_model_invariants() {
    for scenario in [open_row_scenario(), ball_on_cursor_scenario()] {
        let verdict = solve(scenario.clone(), SolverBackend::Cadical);
        let outcome = verdict.outcome().unwrap();

        let validation = OutcomeValidator::new(&scenario).validate(outcome, &scenario);
        assert!(validation.is_valid, "{}", validation);
    }
}

#[test]
fn initial_snapshot_round_trips_into_equivalent_scenario() {
    for scenario in [open_row_scenario(), ball_on_cursor_scenario()] {
        let first = solve(scenario.clone(), SolverBackend::Cadical);
        let initial = first.outcome().unwrap().initial_snapshot().unwrap();

        let rebuilt = Scenario::from_snapshot(initial, scenario.orientation, scenario.cursor);
        assert_eq!(rebuilt.canvas, scenario.canvas);
        assert_eq!(rebuilt.balls, scenario.balls);

        let second = solve(rebuilt, SolverBackend::Cadical);
        assert_eq!(first.life_lost(), second.life_lost());
    }
}

#[test]
fn backends_agree_on_verdict() {
    let unsatisfiable = Scenario::new(Canvas::bordered(4, 4), Orientation::Vertical, Position::new(3, 1), vec![]);

    for scenario in [open_row_scenario(), ball_on_cursor_scenario(), unsatisfiable] {
        let cadical = solve(scenario.clone(), SolverBackend::Cadical);
        let varisat = solve(scenario, SolverBackend::Varisat);
        assert_eq!(cadical.life_lost(), varisat.life_lost());
    }
}

#[test]
fn ball_entering_cell_as_it_is_captured_has_no_valid_run() {
    // the ball reaches (3,3) at t = 3 heading for (4,2), which is still
    // building at t = 3 and captured at t = 4
    let scenario = Scenario::new(
        Canvas::new(5, 7),
        Orientation::Horizontal,
        Position::new(2, 2),
        vec![Ball::new(0, 6, 1, -1)],
    );

    for backend in [SolverBackend::Cadical, SolverBackend::Varisat] {
        let verdict = solve(scenario.clone(), backend);
        assert!(matches!(verdict, Verdict::NoValidRun));
    }
}
