//! Constraint generation for the capture-line SAT encoding
//!
//! Every rule group is an independent `generate_*` method returning its own
//! constraints. Builders and balls are described by small transition tables
//! ([`BuilderStep`], [`Ahead`]) that are compiled into implications.

use super::formula::{Constraint, Formula};
use super::variables::{Domain, VariableIndex};
use crate::error::ModelResult;
use crate::game::scenario::offset;
use crate::game::{Direction, Scenario};
use tracing::debug;

/// What a builder standing on a cell does at the next tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderStep {
    /// Moves onto the neighbour if it is free, finishes if it is captured
    Advance { x: usize, y: usize },
    /// No neighbour in this direction: finishes unconditionally
    Edge,
}

impl BuilderStep {
    fn of(dir: Direction, x: usize, y: usize, domain: &Domain) -> Self {
        match dir.step(x, y, domain.width, domain.height) {
            Some((x, y)) => BuilderStep::Advance { x, y },
            None => BuilderStep::Edge,
        }
    }
}

/// Velocity axis of a ball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// What a ball sees next to it along one axis; `OffGrid` reflects,
/// `Cell` reflects iff captured and keeps the sign otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ahead {
    OffGrid,
    Cell { x: usize, y: usize },
}

impl Ahead {
    fn of(axis: Axis, positive: bool, x: usize, y: usize, domain: &Domain) -> Self {
        let sign = if positive { 1 } else { -1 };
        let (dx, dy) = match axis {
            Axis::X => (sign, 0),
            Axis::Y => (0, sign),
        };
        match offset(x, y, dx, dy, domain.width, domain.height) {
            Some((x, y)) => Ahead::Cell { x, y },
            None => Ahead::OffGrid,
        }
    }
}

const DIAGONALS: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Signed literal: `var` when `positive`, its negation otherwise
fn signed(var: i32, positive: bool) -> i32 {
    if positive { var } else { -var }
}

/// Generates SAT constraints for one capture-line scenario
pub struct ConstraintGenerator {
    index: VariableIndex,
    scenario: Scenario,
}

impl ConstraintGenerator {
    /// Create a generator and declare the full universe of facts
    pub fn new(scenario: &Scenario) -> ModelResult<Self> {
        let mut index = VariableIndex::new(Domain::for_scenario(scenario));
        let declared = index.declare_universe()?;
        debug!(variables = declared, "declared fact universe");

        Ok(Self {
            index,
            scenario: scenario.clone(),
        })
    }

    pub fn index(&self) -> &VariableIndex {
        &self.index
    }

    pub fn into_index(self) -> VariableIndex {
        self.index
    }

    fn domain(&self) -> Domain {
        *self.index.domain()
    }

    /// Generate every rule group into one formula
    pub fn generate_all_constraints(&mut self) -> ModelResult<Formula> {
        let groups = [
            ("initial", self.generate_initial_constraints()?),
            ("orientation", self.generate_orientation_constraints()?),
            ("spawn", self.generate_spawn_constraints()?),
            ("builder_advance", self.generate_builder_advance_constraints()?),
            ("building", self.generate_building_constraints()?),
            ("capture", self.generate_capture_constraints()?),
            ("mutual_exclusion", self.generate_mutual_exclusion_constraints()?),
            ("cardinality", self.generate_cardinality_constraints()?),
            ("ball_exclusion", self.generate_ball_exclusion_constraints()?),
            ("ball_movement", self.generate_ball_movement_constraints()?),
            ("ball_bounce", self.generate_ball_bounce_constraints()?),
            ("collision", self.generate_collision_constraints()?),
            ("life", self.generate_life_constraints()?),
        ];

        let mut formula = Formula::new(self.index.variable_count());
        for (group, constraints) in groups {
            debug!(group, constraints = constraints.len(), "generated rule group");
            formula.extend(constraints);
        }
        formula.set_variable_count(self.index.variable_count());

        Ok(formula)
    }

    /// Fix the state at `t = 0` from the scenario
    pub fn generate_initial_constraints(&mut self) -> ModelResult<Vec<Constraint>> {
        let domain = self.domain();
        let mut constraints = Vec::new();

        constraints.push(Constraint::unit(self.index.orientation(self.scenario.orientation)?));

        let cursor = self.scenario.cursor;
        constraints.push(Constraint::unit(self.index.cursor(cursor.x, cursor.y)?));
        for (x, y) in domain.cells() {
            if (x, y) != (cursor.x, cursor.y) {
                constraints.push(Constraint::unit(-self.index.cursor(x, y)?));
            }

            let captured = self.index.captured(x, y, 0)?;
            constraints.push(Constraint::unit(signed(captured, self.scenario.canvas.is_captured(x, y))));
        }

        for (i, ball) in self.scenario.balls.clone().into_iter().enumerate() {
            constraints.push(Constraint::unit(self.index.ball(i, ball.x, ball.y, 0)?));
            for (x, y) in domain.cells() {
                if (x, y) != (ball.x, ball.y) {
                    constraints.push(Constraint::unit(-self.index.ball(i, x, y, 0)?));
                }
            }
            constraints.push(Constraint::unit(signed(self.index.velocity_x(i, 0)?, ball.moving_right())));
            constraints.push(Constraint::unit(signed(self.index.velocity_y(i, 0)?, ball.moving_down())));
        }

        constraints.push(Constraint::unit(-self.index.lose_life(0)?));
        for dir in Direction::ALL {
            constraints.push(Constraint::unit(-self.index.finished(dir, 0)?));
        }

        Ok(constraints)
    }

    /// Exactly one of `Horizontal` / `Vertical`
    pub fn generate_orientation_constraints(&mut self) -> ModelResult<Vec<Constraint>> {
        let horizontal = self.index.horizontal()?;
        let vertical = self.index.vertical()?;

        Ok(vec![
            Constraint::clause(vec![horizontal, vertical]),
            Constraint::exclude(horizontal, vertical),
        ])
    }

    /// Both builders of the chosen orientation start on the cursor
    pub fn generate_spawn_constraints(&mut self) -> ModelResult<Vec<Constraint>> {
        let domain = self.domain();
        let mut constraints = Vec::new();

        for dir in Direction::ALL {
            let orientation = self.index.orientation(dir.orientation())?;

            for (x, y) in domain.cells() {
                let cursor = self.index.cursor(x, y)?;
                let head = self.index.builder(dir, x, y, 0)?;
                constraints.push(Constraint::implies(&[orientation, cursor], &[head]));
                constraints.push(Constraint::implies(&[head], &[cursor]));
            }

            for t in domain.times() {
                for (x, y) in domain.cells() {
                    let head = self.index.builder(dir, x, y, t)?;
                    constraints.push(Constraint::implies(&[head], &[orientation]));
                }
            }
        }

        Ok(constraints)
    }

    /// Builder heads move one cell per tick until blocked or at the edge
    pub fn generate_builder_advance_constraints(&mut self) -> ModelResult<Vec<Constraint>> {
        let domain = self.domain();
        let mut constraints = Vec::new();

        for dir in Direction::ALL {
            let orientation = self.index.orientation(dir.orientation())?;

            for t in domain.times() {
                let done = self.index.finished(dir, t)?;
                constraints.push(Constraint::implies(&[done], &[orientation]));

                for (x, y) in domain.cells() {
                    let head = self.index.builder(dir, x, y, t)?;
                    let captured = self.index.captured(x, y, t)?;
                    constraints.push(Constraint::implies(&[head], &[-captured]));
                    constraints.push(Constraint::implies(&[done], &[-head]));
                }

                if t == domain.horizon {
                    continue;
                }

                let next_done = self.index.finished(dir, t + 1)?;
                constraints.push(Constraint::implies(&[done], &[next_done]));

                for (x, y) in domain.cells() {
                    let head = self.index.builder(dir, x, y, t)?;
                    match BuilderStep::of(dir, x, y, &domain) {
                        BuilderStep::Advance { x: nx, y: ny } => {
                            let blocked = self.index.captured(nx, ny, t)?;
                            let next_head = self.index.builder(dir, nx, ny, t + 1)?;
                            constraints.push(Constraint::implies(&[head, -blocked], &[next_head]));
                            constraints.push(Constraint::implies(&[head, -blocked], &[-next_done]));
                            constraints.push(Constraint::implies(&[head, blocked], &[next_done]));
                        }
                        BuilderStep::Edge => {
                            constraints.push(Constraint::implies(&[head], &[next_done]));
                        }
                    }

                    // a head at t+1 came from the cell behind it over a free cell
                    let arrived = self.index.builder(dir, x, y, t + 1)?;
                    match dir.opposite().step(x, y, domain.width, domain.height) {
                        Some((bx, by)) => {
                            let behind = self.index.builder(dir, bx, by, t)?;
                            constraints.push(Constraint::implies(&[arrived], &[behind]));
                        }
                        None => constraints.push(Constraint::unit(-arrived)),
                    }
                    let captured = self.index.captured(x, y, t)?;
                    constraints.push(Constraint::implies(&[arrived], &[-captured]));
                }
            }
        }

        Ok(constraints)
    }

    /// Cells under construction persist until their builder finishes, then convert
    pub fn generate_building_constraints(&mut self) -> ModelResult<Vec<Constraint>> {
        let domain = self.domain();
        let mut constraints = Vec::new();

        for dir in Direction::ALL {
            for t in domain.times() {
                for (x, y) in domain.cells() {
                    let head = self.index.builder(dir, x, y, t)?;
                    let building = self.index.building(dir, x, y, t)?;
                    constraints.push(Constraint::implies(&[head], &[building]));

                    if t == 0 {
                        constraints.push(Constraint::implies(&[building], &[head]));
                    }
                }
            }

            for t in 0..domain.horizon {
                let done = self.index.finished(dir, t)?;
                for (x, y) in domain.cells() {
                    let building = self.index.building(dir, x, y, t)?;
                    let next_building = self.index.building(dir, x, y, t + 1)?;
                    let next_head = self.index.builder(dir, x, y, t + 1)?;
                    let next_captured = self.index.captured(x, y, t + 1)?;

                    constraints.push(Constraint::implies(&[building, -done], &[next_building]));
                    constraints.push(Constraint::implies(&[building, done], &[next_captured]));
                    constraints.push(Constraint::implies(&[next_building], &[next_head, building]));
                    constraints.push(Constraint::implies(&[next_building], &[next_head, -done]));
                }
            }
        }

        Ok(constraints)
    }

    /// Captured cells stay captured; new ones only come from finished building
    pub fn generate_capture_constraints(&mut self) -> ModelResult<Vec<Constraint>> {
        let domain = self.domain();
        let mut constraints = Vec::new();

        for t in 0..domain.horizon {
            for (x, y) in domain.cells() {
                let captured = self.index.captured(x, y, t)?;
                let next_captured = self.index.captured(x, y, t + 1)?;
                constraints.push(Constraint::implies(&[captured], &[next_captured]));

                let mut sources = vec![vec![captured]];
                for dir in Direction::ALL {
                    sources.push(vec![
                        self.index.building(dir, x, y, t)?,
                        self.index.finished(dir, t)?,
                    ]);
                }
                constraints.extend(Constraint::implies_any(&[next_captured], &sources));
            }
        }

        Ok(constraints)
    }

    /// North/south facts never share a cell with east/west facts
    pub fn generate_mutual_exclusion_constraints(&mut self) -> ModelResult<Vec<Constraint>> {
        let domain = self.domain();
        let mut constraints = Vec::new();

        for t in domain.times() {
            for (x, y) in domain.cells() {
                for vertical in [Direction::North, Direction::South] {
                    for horizontal in [Direction::East, Direction::West] {
                        constraints.push(Constraint::exclude(
                            self.index.building(vertical, x, y, t)?,
                            self.index.building(horizontal, x, y, t)?,
                        ));
                        constraints.push(Constraint::exclude(
                            self.index.builder(vertical, x, y, t)?,
                            self.index.builder(horizontal, x, y, t)?,
                        ));
                    }
                }
            }
        }

        Ok(constraints)
    }

    /// At most two builder heads and at most `|balls|` ball positions per tick
    pub fn generate_cardinality_constraints(&mut self) -> ModelResult<Vec<Constraint>> {
        let domain = self.domain();
        let mut constraints = Vec::new();

        for t in domain.times() {
            let mut heads = Vec::with_capacity(Direction::ALL.len() * domain.width * domain.height);
            for dir in Direction::ALL {
                for (x, y) in domain.cells() {
                    heads.push(self.index.builder(dir, x, y, t)?);
                }
            }
            constraints.push(Constraint::at_most(heads, 2));

            if domain.balls > 0 {
                let mut positions = Vec::with_capacity(domain.balls * domain.width * domain.height);
                for ball in 0..domain.balls {
                    for (x, y) in domain.cells() {
                        positions.push(self.index.ball(ball, x, y, t)?);
                    }
                }
                constraints.push(Constraint::at_most(positions, domain.balls));
            }
        }

        Ok(constraints)
    }

    /// Balls never sit on captured cells
    pub fn generate_ball_exclusion_constraints(&mut self) -> ModelResult<Vec<Constraint>> {
        let domain = self.domain();
        let mut constraints = Vec::new();

        for ball in 0..domain.balls {
            for t in domain.times() {
                for (x, y) in domain.cells() {
                    constraints.push(Constraint::exclude(
                        self.index.ball(ball, x, y, t)?,
                        self.index.captured(x, y, t)?,
                    ));
                }
            }
        }

        Ok(constraints)
    }

    /// Diagonal movement onto a free in-grid neighbour.
    ///
    /// Nothing places a ball whose diagonal neighbour is captured or off the
    /// grid; its position at `t + 1` is left open.
    pub fn generate_ball_movement_constraints(&mut self) -> ModelResult<Vec<Constraint>> {
        let domain = self.domain();
        let mut constraints = Vec::new();

        for ball in 0..domain.balls {
            for t in 0..domain.horizon {
                let vx = self.index.velocity_x(ball, t)?;
                let vy = self.index.velocity_y(ball, t)?;

                for (x, y) in domain.cells() {
                    let position = self.index.ball(ball, x, y, t)?;
                    for (dx, dy) in DIAGONALS {
                        let Some((nx, ny)) = offset(x, y, dx, dy, domain.width, domain.height) else {
                            continue;
                        };
                        let blocked = self.index.captured(nx, ny, t)?;
                        let next = self.index.ball(ball, nx, ny, t + 1)?;
                        constraints.push(Constraint::implies(
                            &[position, signed(vx, dx > 0), signed(vy, dy > 0), -blocked],
                            &[next],
                        ));
                    }
                }
            }
        }

        Ok(constraints)
    }

    /// Per axis: the velocity sign flips iff the neighbour ahead is captured or off the grid
    pub fn generate_ball_bounce_constraints(&mut self) -> ModelResult<Vec<Constraint>> {
        let domain = self.domain();
        let mut constraints = Vec::new();

        for ball in 0..domain.balls {
            for t in 0..domain.horizon {
                for axis in [Axis::X, Axis::Y] {
                    let (velocity, next_velocity) = match axis {
                        Axis::X => (self.index.velocity_x(ball, t)?, self.index.velocity_x(ball, t + 1)?),
                        Axis::Y => (self.index.velocity_y(ball, t)?, self.index.velocity_y(ball, t + 1)?),
                    };

                    for (x, y) in domain.cells() {
                        let position = self.index.ball(ball, x, y, t)?;
                        for positive in [true, false] {
                            let moving = signed(velocity, positive);
                            let keeps = signed(next_velocity, positive);

                            match Ahead::of(axis, positive, x, y, &domain) {
                                Ahead::OffGrid => {
                                    constraints.push(Constraint::implies(&[position, moving], &[-keeps]));
                                }
                                Ahead::Cell { x: nx, y: ny } => {
                                    let wall = self.index.captured(nx, ny, t)?;
                                    constraints.push(Constraint::implies(&[position, moving, wall], &[-keeps]));
                                    constraints.push(Constraint::implies(&[position, moving, -wall], &[keeps]));
                                }
                            }
                        }
                    }
                }
            }
        }

        Ok(constraints)
    }

    /// A ball on a building cell is a collision, and a collision costs a life next tick
    pub fn generate_collision_constraints(&mut self) -> ModelResult<Vec<Constraint>> {
        let domain = self.domain();
        let mut constraints = Vec::new();

        for t in domain.times() {
            for (x, y) in domain.cells() {
                let collision = self.index.collision(x, y, t)?;

                let balls = (0..domain.balls)
                    .map(|ball| self.index.ball(ball, x, y, t))
                    .collect::<ModelResult<Vec<_>>>()?;
                let buildings = Direction::ALL.iter()
                    .map(|&dir| self.index.building(dir, x, y, t))
                    .collect::<ModelResult<Vec<_>>>()?;

                for &ball in &balls {
                    for &building in &buildings {
                        constraints.push(Constraint::implies(&[ball, building], &[collision]));
                    }
                }
                constraints.push(Constraint::implies(&[collision], &balls));
                constraints.push(Constraint::implies(&[collision], &buildings));

                if t < domain.horizon {
                    let next_lose = self.index.lose_life(t + 1)?;
                    constraints.push(Constraint::implies(&[collision], &[next_lose]));
                }
            }
        }

        Ok(constraints)
    }

    /// A lost life stays lost; a new loss needs a collision on the previous tick
    pub fn generate_life_constraints(&mut self) -> ModelResult<Vec<Constraint>> {
        let domain = self.domain();
        let mut constraints = Vec::new();

        for t in 0..domain.horizon {
            let lose = self.index.lose_life(t)?;
            let next_lose = self.index.lose_life(t + 1)?;
            constraints.push(Constraint::implies(&[lose], &[next_lose]));

            let mut causes = vec![lose];
            for (x, y) in domain.cells() {
                causes.push(self.index.collision(x, y, t)?);
            }
            constraints.push(Constraint::implies(&[next_lose], &causes));
        }

        Ok(constraints)
    }
}
