//! Invariant checks for decoded outcomes

use super::outcome::{Outcome, Snapshot};
use crate::game::{Position, Scenario};
use rayon::prelude::*;
use std::time::Instant;

/// Maximum number of simultaneous builder heads
const MAX_BUILDER_HEADS: usize = 2;

/// Re-checks decoded outcomes against the model invariants
pub struct OutcomeValidator {
    ball_count: usize,
}

/// Result of outcome validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub violations: Vec<InvariantViolation>,
    pub metrics: ValidationMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    InitialCanvasMismatch,
    CaptureNotMonotone,
    LifeLossNotMonotone,
    LifeLostAtStart,
    TooManyBuilders,
    TooManyBalls,
    BallOnCapturedCell,
    VerdictMismatch,
}

/// One broken invariant
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    pub t: usize,
    pub position: Option<Position>,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ValidationMetrics {
    pub validation_time_ms: u64,
    pub snapshots_checked: usize,
}

impl InvariantViolation {
    fn new(t: usize, position: Option<Position>, kind: ViolationKind, description: String) -> Self {
        Self { t, position, kind, description }
    }
}

impl OutcomeValidator {
    pub fn new(scenario: &Scenario) -> Self {
        Self { ball_count: scenario.balls.len() }
    }

    /// Check every invariant of `outcome`; `scenario` supplies the initial canvas
    pub fn validate(&self, outcome: &Outcome, scenario: &Scenario) -> ValidationResult {
        let start_time = Instant::now();
        let mut violations = Vec::new();

        if let Some(initial) = outcome.initial_snapshot() {
            violations.extend(self.check_initial_canvas(initial, scenario));
            if initial.life_lost {
                violations.push(InvariantViolation::new(
                    0,
                    None,
                    ViolationKind::LifeLostAtStart,
                    "life is already lost at t = 0".to_string(),
                ));
            }
        }

        violations.extend(
            outcome.snapshots
                .par_iter()
                .flat_map_iter(|snapshot| self.check_snapshot(snapshot))
                .collect::<Vec<_>>(),
        );

        violations.extend(
            outcome.snapshots
                .par_windows(2)
                .flat_map_iter(|pair| self.check_transition(&pair[0], &pair[1]))
                .collect::<Vec<_>>(),
        );

        if let Some(last) = outcome.final_snapshot() {
            if last.life_lost != outcome.life_lost {
                violations.push(InvariantViolation::new(
                    last.t,
                    None,
                    ViolationKind::VerdictMismatch,
                    format!("verdict says {} but the final tick says {}", outcome.life_lost, last.life_lost),
                ));
            }
        }

        violations.sort_by_key(|violation| violation.t);

        ValidationResult {
            is_valid: violations.is_empty(),
            violations,
            metrics: ValidationMetrics {
                validation_time_ms: start_time.elapsed().as_millis() as u64,
                snapshots_checked: outcome.snapshots.len(),
            },
        }
    }

    fn check_initial_canvas(&self, initial: &Snapshot, scenario: &Scenario) -> Vec<InvariantViolation> {
        let canvas = &scenario.canvas;
        if canvas.width != initial.width || canvas.height != initial.height {
            return vec![InvariantViolation::new(
                0,
                None,
                ViolationKind::InitialCanvasMismatch,
                format!(
                    "snapshot is {}x{} but the canvas is {}x{}",
                    initial.width, initial.height, canvas.width, canvas.height
                ),
            )];
        }

        let mut violations = Vec::new();
        for y in 0..canvas.height {
            for x in 0..canvas.width {
                if canvas.is_captured(x, y) != initial.is_captured(x, y) {
                    violations.push(InvariantViolation::new(
                        0,
                        Some(Position::new(x, y)),
                        ViolationKind::InitialCanvasMismatch,
                        format!("cell ({}, {}) differs from the canvas at t = 0", x, y),
                    ));
                }
            }
        }
        violations
    }

    fn check_snapshot(&self, snapshot: &Snapshot) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        let heads = snapshot.builder_heads();
        if heads.len() > MAX_BUILDER_HEADS {
            violations.push(InvariantViolation::new(
                snapshot.t,
                None,
                ViolationKind::TooManyBuilders,
                format!("{} builder heads, at most {} allowed", heads.len(), MAX_BUILDER_HEADS),
            ));
        }

        if snapshot.balls.len() > self.ball_count {
            violations.push(InvariantViolation::new(
                snapshot.t,
                None,
                ViolationKind::TooManyBalls,
                format!("{} ball positions, at most {} allowed", snapshot.balls.len(), self.ball_count),
            ));
        }

        for ball in &snapshot.balls {
            if snapshot.is_captured(ball.x, ball.y) {
                violations.push(InvariantViolation::new(
                    snapshot.t,
                    Some(Position::new(ball.x, ball.y)),
                    ViolationKind::BallOnCapturedCell,
                    format!("ball {} sits on captured cell ({}, {})", ball.ball, ball.x, ball.y),
                ));
            }
        }

        violations
    }

    fn check_transition(&self, current: &Snapshot, next: &Snapshot) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        for y in 0..current.height {
            for x in 0..current.width {
                if current.is_captured(x, y) && !next.is_captured(x, y) {
                    violations.push(InvariantViolation::new(
                        next.t,
                        Some(Position::new(x, y)),
                        ViolationKind::CaptureNotMonotone,
                        format!("cell ({}, {}) lost its captured state", x, y),
                    ));
                }
            }
        }

        if current.life_lost && !next.life_lost {
            violations.push(InvariantViolation::new(
                next.t,
                None,
                ViolationKind::LifeLossNotMonotone,
                "a lost life was restored".to_string(),
            ));
        }

        violations
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Validation Result:")?;
        writeln!(f, "  Valid: {}", self.is_valid)?;
        writeln!(f, "  Snapshots checked: {}", self.metrics.snapshots_checked)?;
        writeln!(f, "  Validation time: {}ms", self.metrics.validation_time_ms)?;

        if !self.violations.is_empty() {
            writeln!(f, "  Violations ({}):", self.violations.len())?;
            for violation in self.violations.iter().take(10) {
                writeln!(f, "    t={} {:?}: {}", violation.t, violation.kind, violation.description)?;
            }
            if self.violations.len() > 10 {
                writeln!(f, "    ... and {} more", self.violations.len() - 10)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::outcome::{BallState, CellState};
    use crate::game::{Ball, Canvas, Direction, Orientation};
    use std::time::Duration;

    fn scenario() -> Scenario {
        let mut canvas = Canvas::new(3, 1);
        canvas.set_captured(2, 0, true).unwrap();
        Scenario::new(canvas, Orientation::Horizontal, Position::new(0, 0), vec![Ball::new(1, 0, 1, 1)])
    }

    fn snapshot(t: usize, cells: [CellState; 3], balls: Vec<BallState>, life_lost: bool) -> Snapshot {
        let builders = cells.iter()
            .enumerate()
            .filter_map(|(x, cell)| match cell {
                CellState::BuilderHead(dir) => Some((*dir, Position::new(x, 0))),
                _ => None,
            })
            .collect();

        Snapshot {
            t,
            width: 3,
            height: 1,
            cells: cells.to_vec(),
            builders,
            balls,
            collisions: Vec::new(),
            finished: Vec::new(),
            life_lost,
        }
    }

    fn ball(x: usize) -> BallState {
        BallState { ball: 0, x, y: 0, vx: 1, vy: 1 }
    }

    fn outcome(snapshots: Vec<Snapshot>) -> Outcome {
        let life_lost = snapshots.last().map_or(false, |snapshot| snapshot.life_lost);
        Outcome {
            orientation: Orientation::Horizontal,
            snapshots,
            life_lost,
            solve_time: Duration::ZERO,
        }
    }

    fn kinds(result: &ValidationResult) -> Vec<ViolationKind> {
        result.violations.iter().map(|violation| violation.kind).collect()
    }

    #[test]
    fn test_valid_outcome() {
        use CellState::*;
        let outcome = outcome(vec![
            snapshot(0, [BuilderHead(Direction::East), Empty, Captured], vec![ball(1)], false),
            snapshot(1, [Building, BuilderHead(Direction::East), Captured], vec![], true),
        ]);

        let scenario = scenario();
        let result = OutcomeValidator::new(&scenario).validate(&outcome, &scenario);
        assert!(result.is_valid, "{}", result);
        assert_eq!(result.metrics.snapshots_checked, 2);
    }

    #[test]
    fn test_capture_and_life_must_be_monotone() {
        use CellState::*;
        let outcome = outcome(vec![
            snapshot(0, [Empty, Empty, Captured], vec![], false),
            snapshot(1, [Empty, Empty, Captured], vec![], true),
            snapshot(2, [Empty, Empty, Empty], vec![], false),
        ]);

        let scenario = scenario();
        let result = OutcomeValidator::new(&scenario).validate(&outcome, &scenario);
        assert!(!result.is_valid);
        assert_eq!(kinds(&result), vec![ViolationKind::CaptureNotMonotone, ViolationKind::LifeLossNotMonotone]);
    }

    #[test]
    fn test_ball_on_captured_and_too_many_balls() {
        use CellState::*;
        let outcome = outcome(vec![
            snapshot(0, [Empty, Empty, Captured], vec![ball(1), ball(2)], false),
        ]);

        let scenario = scenario();
        let result = OutcomeValidator::new(&scenario).validate(&outcome, &scenario);
        let kinds = kinds(&result);
        assert!(kinds.contains(&ViolationKind::TooManyBalls));
        assert!(kinds.contains(&ViolationKind::BallOnCapturedCell));
    }

    #[test]
    fn test_initial_canvas_mismatch() {
        use CellState::*;
        let outcome = outcome(vec![snapshot(0, [Captured, Empty, Captured], vec![], false)]);

        let scenario = scenario();
        let result = OutcomeValidator::new(&scenario).validate(&outcome, &scenario);
        assert_eq!(kinds(&result), vec![ViolationKind::InitialCanvasMismatch]);
        assert_eq!(result.violations[0].position, Some(Position::new(0, 0)));
    }

    #[test]
    fn test_too_many_builders() {
        use CellState::*;
        let heads = [BuilderHead(Direction::East), BuilderHead(Direction::West), BuilderHead(Direction::East)];
        let outcome = outcome(vec![snapshot(0, heads, vec![], false)]);

        let scenario = Scenario::new(Canvas::new(3, 1), Orientation::Horizontal, Position::new(0, 0), vec![]);
        let result = OutcomeValidator::new(&scenario).validate(&outcome, &scenario);
        assert_eq!(kinds(&result), vec![ViolationKind::TooManyBuilders]);
    }

    #[test]
    fn test_builders_sharing_a_cell_are_counted() {
        use CellState::*;
        let mut stacked = snapshot(0, [BuilderHead(Direction::East), Empty, BuilderHead(Direction::West)], vec![], false);
        stacked.builders.push((Direction::West, Position::new(0, 0)));
        let outcome = outcome(vec![stacked]);

        let scenario = Scenario::new(Canvas::new(3, 1), Orientation::Horizontal, Position::new(0, 0), vec![]);
        let result = OutcomeValidator::new(&scenario).validate(&outcome, &scenario);
        assert_eq!(kinds(&result), vec![ViolationKind::TooManyBuilders]);
    }
}
