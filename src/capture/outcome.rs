//! Decoded runs: per-tick snapshots and the life-loss verdict

use crate::game::{Ball, Canvas, Direction, Orientation, Position, Scenario};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What occupies a cell at one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    Empty,
    Captured,
    Building,
    BuilderHead(Direction),
}

impl CellState {
    pub fn is_captured(self) -> bool {
        self == CellState::Captured
    }
}

/// A ball as decoded at one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallState {
    pub ball: usize,
    pub x: usize,
    pub y: usize,
    pub vx: i8,
    pub vy: i8,
}

/// The decoded game state at tick `t`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub t: usize,
    pub width: usize,
    pub height: usize,
    /// Row-major cell states, one per cell for display
    pub cells: Vec<CellState>,
    /// Every builder head at this tick; opposite builders may share a cell
    pub builders: Vec<(Direction, Position)>,
    pub balls: Vec<BallState>,
    pub collisions: Vec<Position>,
    pub finished: Vec<Direction>,
    pub life_lost: bool,
}

impl Snapshot {
    /// State of `(x, y)`, `None` outside the grid
    pub fn cell(&self, x: usize, y: usize) -> Option<CellState> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x).copied()
    }

    pub fn is_captured(&self, x: usize, y: usize) -> bool {
        self.cell(x, y).is_some_and(CellState::is_captured)
    }

    pub fn captured_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_captured()).count()
    }

    /// Builder heads present at this tick
    pub fn builder_heads(&self) -> &[(Direction, Position)] {
        &self.builders
    }

    pub fn balls_at(&self, x: usize, y: usize) -> impl Iterator<Item = &BallState> {
        self.balls.iter().filter(move |ball| ball.x == x && ball.y == y)
    }

    /// Captured cells as a canvas
    pub fn to_canvas(&self) -> Canvas {
        let mut canvas = Canvas::new(self.width, self.height);
        for (i, cell) in self.cells.iter().enumerate() {
            canvas.cells[i] = cell.is_captured();
        }
        canvas
    }
}

/// A full decoded run from `t = 0` to the horizon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub orientation: Orientation,
    pub snapshots: Vec<Snapshot>,
    /// `LoseLife` at the horizon
    pub life_lost: bool,
    #[serde(skip)]
    pub solve_time: Duration,
}

impl Outcome {
    pub fn horizon(&self) -> usize {
        self.snapshots.len().saturating_sub(1)
    }

    pub fn snapshot(&self, t: usize) -> Option<&Snapshot> {
        self.snapshots.get(t)
    }

    pub fn initial_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.first()
    }

    pub fn final_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// First tick at which the life is lost
    pub fn first_life_loss(&self) -> Option<usize> {
        self.snapshots.iter().find(|snapshot| snapshot.life_lost).map(|snapshot| snapshot.t)
    }

    pub fn summary(&self) -> OutcomeSummary {
        let initial = self.initial_snapshot().map_or(0, Snapshot::captured_count);
        let final_captured = self.final_snapshot().map_or(0, Snapshot::captured_count);

        OutcomeSummary {
            orientation: self.orientation,
            horizon: self.horizon(),
            life_lost: self.life_lost,
            first_life_loss: self.first_life_loss(),
            newly_captured: final_captured.saturating_sub(initial),
            solve_time_ms: self.solve_time.as_millis() as u64,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}

/// Short description of an outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub orientation: Orientation,
    pub horizon: usize,
    pub life_lost: bool,
    pub first_life_loss: Option<usize>,
    pub newly_captured: usize,
    pub solve_time_ms: u64,
}

/// Result of modelling one line-drawing action
#[derive(Debug, Clone)]
pub enum Verdict {
    /// A consistent run exists; it is fully decoded
    Simulated(Outcome),
    /// The formula is unsatisfiable, e.g. the cursor sits on captured territory
    NoValidRun,
}

impl Verdict {
    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            Verdict::Simulated(outcome) => Some(outcome),
            Verdict::NoValidRun => None,
        }
    }

    /// `Some(true)` if the action costs a life, `None` without a valid run
    pub fn life_lost(&self) -> Option<bool> {
        self.outcome().map(|outcome| outcome.life_lost)
    }
}

impl Scenario {
    /// Rebuild a scenario from a decoded snapshot: its captured cells become
    /// the canvas and its balls (with their velocities) the ball list
    pub fn from_snapshot(snapshot: &Snapshot, orientation: Orientation, cursor: Position) -> Self {
        let mut balls: Vec<&BallState> = snapshot.balls.iter().collect();
        balls.sort_by_key(|ball| ball.ball);

        Scenario::new(
            snapshot.to_canvas(),
            orientation,
            cursor,
            balls.into_iter().map(|ball| Ball::new(ball.x, ball.y, ball.vx, ball.vy)).collect(),
        )
    }
}

impl std::fmt::Display for OutcomeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Outcome Summary:")?;
        writeln!(f, "  Orientation: {:?}", self.orientation)?;
        writeln!(f, "  Horizon: {} ticks", self.horizon)?;
        writeln!(f, "  Life lost: {}", self.life_lost)?;
        if let Some(t) = self.first_life_loss {
            writeln!(f, "  First life loss at: t = {}", t)?;
        }
        writeln!(f, "  Newly captured cells: {}", self.newly_captured)?;
        writeln!(f, "  Solve time: {}ms", self.solve_time_ms)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn snapshot(t: usize, life_lost: bool) -> Snapshot {
        let mut cells = vec![CellState::Empty; 6];
        cells[0] = CellState::Captured;
        cells[4] = CellState::BuilderHead(Direction::East);
        cells[3] = CellState::Building;
        Snapshot {
            t,
            width: 3,
            height: 2,
            cells,
            builders: vec![(Direction::East, Position::new(1, 1))],
            balls: vec![BallState { ball: 0, x: 2, y: 0, vx: -1, vy: 1 }],
            collisions: Vec::new(),
            finished: Vec::new(),
            life_lost,
        }
    }

    fn outcome() -> Outcome {
        Outcome {
            orientation: Orientation::Horizontal,
            snapshots: vec![snapshot(0, false), snapshot(1, false), snapshot(2, true), snapshot(3, true)],
            life_lost: true,
            solve_time: Duration::from_millis(12),
        }
    }

    #[test]
    fn test_snapshot_accessors() {
        let snapshot = snapshot(0, false);
        assert!(snapshot.is_captured(0, 0));
        assert_eq!(snapshot.cell(1, 1), Some(CellState::BuilderHead(Direction::East)));
        assert_eq!(snapshot.captured_count(), 1);
        assert_eq!(snapshot.builder_heads(), &[(Direction::East, Position::new(1, 1))]);
        assert_eq!(snapshot.balls_at(2, 0).count(), 1);
    }

    #[test]
    fn test_cell_outside_grid() {
        let snapshot = snapshot(0, false);
        assert_eq!(snapshot.cell(3, 0), None);
        assert_eq!(snapshot.cell(0, 2), None);
        assert!(!snapshot.is_captured(7, 7));
    }

    #[test]
    fn test_outcome_summary() {
        let outcome = outcome();
        assert_eq!(outcome.horizon(), 3);
        assert_eq!(outcome.first_life_loss(), Some(2));

        let summary = outcome.summary();
        assert!(summary.life_lost);
        assert_eq!(summary.newly_captured, 0);
        assert_eq!(summary.solve_time_ms, 12);
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("outcome.json");

        outcome().save_to_file(&path).unwrap();
        let loaded = Outcome::load_from_file(&path).unwrap();

        assert_eq!(loaded.snapshots, outcome().snapshots);
        assert!(loaded.life_lost);
    }

    #[test]
    fn test_scenario_from_snapshot() {
        let scenario = Scenario::from_snapshot(&snapshot(0, false), Orientation::Vertical, Position::new(1, 1));

        assert!(scenario.canvas.is_captured(0, 0));
        assert!(!scenario.canvas.is_captured(1, 1));
        assert_eq!(scenario.balls, vec![Ball::new(2, 0, -1, 1)]);
        assert_eq!(scenario.orientation, Orientation::Vertical);
    }

    #[test]
    fn test_verdict_accessors() {
        assert_eq!(Verdict::NoValidRun.life_lost(), None);
        assert_eq!(Verdict::Simulated(outcome()).life_lost(), Some(true));
    }
}
