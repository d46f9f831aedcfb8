//! Domain variable index: typed fact keys mapped to SAT variables and back

use crate::error::{ModelError, ModelResult};
use crate::game::{Direction, Orientation, Scenario};
use itertools::iproduct;
use std::collections::{BTreeMap, HashMap};

/// A boolean fact about the game, identified by its kind and typed parameters.
///
/// Two keys with the same kind and parameters always resolve to the same
/// variable; distinct keys never share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactKey {
    Horizontal,
    Vertical,
    /// The cell the line is drawn from
    Cursor { x: usize, y: usize },
    /// Cell is permanent territory at time t
    Captured { x: usize, y: usize, t: usize },
    /// Cell is part of the unfinished line of the `dir` builder at time t
    Building { dir: Direction, x: usize, y: usize, t: usize },
    /// Head of the `dir` builder is on the cell at time t
    BuilderPos { dir: Direction, x: usize, y: usize, t: usize },
    /// The `dir` builder has stopped by time t
    BuilderFinished { dir: Direction, t: usize },
    BallPos { ball: usize, x: usize, y: usize, t: usize },
    /// Ball moves towards increasing x at time t
    BallVelocityX { ball: usize, t: usize },
    /// Ball moves towards increasing y at time t
    BallVelocityY { ball: usize, t: usize },
    /// A life has been lost at or before time t
    LoseLife { t: usize },
    /// Some ball shares the cell with some building fact at time t
    Collision { x: usize, y: usize, t: usize },
}

impl FactKey {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FactKey::Horizontal | FactKey::Vertical => "orientation",
            FactKey::Cursor { .. } => "cursor",
            FactKey::Captured { .. } => "captured",
            FactKey::Building { .. } => "building",
            FactKey::BuilderPos { .. } => "builder",
            FactKey::BuilderFinished { .. } => "builder_finished",
            FactKey::BallPos { .. } => "ball_position",
            FactKey::BallVelocityX { .. } | FactKey::BallVelocityY { .. } => "ball_velocity",
            FactKey::LoseLife { .. } => "lose_life",
            FactKey::Collision { .. } => "collision",
        }
    }

    fn position(&self) -> Option<(usize, usize)> {
        match *self {
            FactKey::Cursor { x, y }
            | FactKey::Captured { x, y, .. }
            | FactKey::Building { x, y, .. }
            | FactKey::BuilderPos { x, y, .. }
            | FactKey::BallPos { x, y, .. }
            | FactKey::Collision { x, y, .. } => Some((x, y)),
            _ => None,
        }
    }

    fn time(&self) -> Option<usize> {
        match *self {
            FactKey::Horizontal | FactKey::Vertical | FactKey::Cursor { .. } => None,
            FactKey::Captured { t, .. }
            | FactKey::Building { t, .. }
            | FactKey::BuilderPos { t, .. }
            | FactKey::BuilderFinished { t, .. }
            | FactKey::BallPos { t, .. }
            | FactKey::BallVelocityX { t, .. }
            | FactKey::BallVelocityY { t, .. }
            | FactKey::LoseLife { t }
            | FactKey::Collision { t, .. } => Some(t),
        }
    }

    fn ball(&self) -> Option<usize> {
        match *self {
            FactKey::BallPos { ball, .. }
            | FactKey::BallVelocityX { ball, .. }
            | FactKey::BallVelocityY { ball, .. } => Some(ball),
            _ => None,
        }
    }
}

/// Parameter domains every fact must fall into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    pub width: usize,
    pub height: usize,
    /// Last time index; times range over `0..=horizon`
    pub horizon: usize,
    pub balls: usize,
}

impl Domain {
    pub fn for_scenario(scenario: &Scenario) -> Self {
        Self {
            width: scenario.width(),
            height: scenario.height(),
            horizon: scenario.horizon(),
            balls: scenario.balls.len(),
        }
    }

    /// All cells in row-major order, as `(x, y)`
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        iproduct!(0..self.height, 0..self.width).map(|(y, x)| (x, y))
    }

    pub fn times(&self) -> std::ops::RangeInclusive<usize> {
        0..=self.horizon
    }

    fn validate(&self, key: &FactKey) -> ModelResult<()> {
        let out_of_domain = |reason: String| ModelError::OutOfDomain { key: *key, reason };

        if let Some((x, y)) = key.position() {
            if x >= self.width {
                return Err(out_of_domain(format!("x = {} but width is {}", x, self.width)));
            }
            if y >= self.height {
                return Err(out_of_domain(format!("y = {} but height is {}", y, self.height)));
            }
        }
        if let Some(t) = key.time() {
            if t > self.horizon {
                return Err(out_of_domain(format!("t = {} but horizon is {}", t, self.horizon)));
            }
        }
        if let Some(ball) = key.ball() {
            if ball >= self.balls {
                return Err(out_of_domain(format!("ball {} but only {} balls", ball, self.balls)));
            }
        }
        Ok(())
    }
}

/// Injective map between fact keys and DIMACS variable ids (starting at 1)
#[derive(Debug)]
pub struct VariableIndex {
    domain: Domain,
    forward: HashMap<FactKey, i32>,
    /// `reverse[id - 1]` is the key of variable `id`
    reverse: Vec<FactKey>,
}

impl VariableIndex {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            forward: HashMap::new(),
            reverse: Vec::new(),
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Get or create the variable for a fact
    pub fn variable(&mut self, key: FactKey) -> ModelResult<i32> {
        if let Some(&id) = self.forward.get(&key) {
            return Ok(id);
        }

        self.domain.validate(&key)?;

        self.reverse.push(key);
        let id = self.reverse.len() as i32;
        self.forward.insert(key, id);
        Ok(id)
    }

    /// Resolve a fact without growing the index
    pub fn lookup(&self, key: &FactKey) -> ModelResult<Option<i32>> {
        self.domain.validate(key)?;
        Ok(self.forward.get(key).copied())
    }

    pub fn key_of(&self, var: i32) -> Option<&FactKey> {
        let idx = usize::try_from(var).ok()?.checked_sub(1)?;
        self.reverse.get(idx)
    }

    /// Declare every fact of the domain, in a fixed order, before any
    /// constraint mentions them. Returns the number of variables.
    pub fn declare_universe(&mut self) -> ModelResult<usize> {
        let domain = self.domain;

        self.variable(FactKey::Horizontal)?;
        self.variable(FactKey::Vertical)?;
        for (x, y) in domain.cells() {
            self.variable(FactKey::Cursor { x, y })?;
        }

        for t in domain.times() {
            for (x, y) in domain.cells() {
                self.variable(FactKey::Captured { x, y, t })?;
                self.variable(FactKey::Collision { x, y, t })?;
            }
            for dir in Direction::ALL {
                self.variable(FactKey::BuilderFinished { dir, t })?;
                for (x, y) in domain.cells() {
                    self.variable(FactKey::BuilderPos { dir, x, y, t })?;
                    self.variable(FactKey::Building { dir, x, y, t })?;
                }
            }
            for ball in 0..domain.balls {
                self.variable(FactKey::BallVelocityX { ball, t })?;
                self.variable(FactKey::BallVelocityY { ball, t })?;
                for (x, y) in domain.cells() {
                    self.variable(FactKey::BallPos { ball, x, y, t })?;
                }
            }
            self.variable(FactKey::LoseLife { t })?;
        }

        Ok(self.variable_count())
    }

    pub fn horizontal(&mut self) -> ModelResult<i32> {
        self.variable(FactKey::Horizontal)
    }

    pub fn vertical(&mut self) -> ModelResult<i32> {
        self.variable(FactKey::Vertical)
    }

    pub fn orientation(&mut self, orientation: Orientation) -> ModelResult<i32> {
        match orientation {
            Orientation::Horizontal => self.horizontal(),
            Orientation::Vertical => self.vertical(),
        }
    }

    pub fn cursor(&mut self, x: usize, y: usize) -> ModelResult<i32> {
        self.variable(FactKey::Cursor { x, y })
    }

    pub fn captured(&mut self, x: usize, y: usize, t: usize) -> ModelResult<i32> {
        self.variable(FactKey::Captured { x, y, t })
    }

    pub fn building(&mut self, dir: Direction, x: usize, y: usize, t: usize) -> ModelResult<i32> {
        self.variable(FactKey::Building { dir, x, y, t })
    }

    pub fn builder(&mut self, dir: Direction, x: usize, y: usize, t: usize) -> ModelResult<i32> {
        self.variable(FactKey::BuilderPos { dir, x, y, t })
    }

    pub fn finished(&mut self, dir: Direction, t: usize) -> ModelResult<i32> {
        self.variable(FactKey::BuilderFinished { dir, t })
    }

    pub fn ball(&mut self, ball: usize, x: usize, y: usize, t: usize) -> ModelResult<i32> {
        self.variable(FactKey::BallPos { ball, x, y, t })
    }

    pub fn velocity_x(&mut self, ball: usize, t: usize) -> ModelResult<i32> {
        self.variable(FactKey::BallVelocityX { ball, t })
    }

    pub fn velocity_y(&mut self, ball: usize, t: usize) -> ModelResult<i32> {
        self.variable(FactKey::BallVelocityY { ball, t })
    }

    pub fn lose_life(&mut self, t: usize) -> ModelResult<i32> {
        self.variable(FactKey::LoseLife { t })
    }

    pub fn collision(&mut self, x: usize, y: usize, t: usize) -> ModelResult<i32> {
        self.variable(FactKey::Collision { x, y, t })
    }

    pub fn variable_count(&self) -> usize {
        self.reverse.len()
    }

    pub fn statistics(&self) -> VariableStatistics {
        let mut by_kind = BTreeMap::new();
        for key in &self.reverse {
            *by_kind.entry(key.kind_name()).or_insert(0) += 1;
        }

        VariableStatistics {
            total_variables: self.variable_count(),
            by_kind,
        }
    }
}

/// Statistics about variable usage
#[derive(Debug, Clone)]
pub struct VariableStatistics {
    pub total_variables: usize,
    pub by_kind: BTreeMap<&'static str, usize>,
}

impl std::fmt::Display for VariableStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Variable Statistics:")?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        for (kind, count) in &self.by_kind {
            writeln!(f, "  {}: {}", kind, count)?;
        }
        Ok(())
    }
}
