//! Decoding a satisfying assignment back into per-tick snapshots

use super::outcome::{BallState, CellState, Outcome, Snapshot};
use crate::error::{ModelError, ModelResult};
use crate::game::{Direction, Orientation, Position};
use crate::sat::variables::{FactKey, VariableIndex};
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

/// Reads an assignment through the variable index
pub struct ResultProjector<'a> {
    index: &'a VariableIndex,
    assignment: &'a HashMap<i32, bool>,
}

impl<'a> ResultProjector<'a> {
    pub fn new(index: &'a VariableIndex, assignment: &'a HashMap<i32, bool>) -> Self {
        Self { index, assignment }
    }

    /// Value of one fact; a fact without a variable or without a value is a decode error
    pub fn value(&self, key: FactKey) -> ModelResult<bool> {
        let var = self.index.lookup(&key)?
            .ok_or_else(|| ModelError::Decode(format!("{:?} was never declared", key)))?;

        self.assignment.get(&var)
            .copied()
            .ok_or_else(|| ModelError::Decode(format!("variable {} ({:?}) is missing from the assignment", var, key)))
    }

    pub fn orientation(&self) -> ModelResult<Orientation> {
        match (self.value(FactKey::Horizontal)?, self.value(FactKey::Vertical)?) {
            (true, false) => Ok(Orientation::Horizontal),
            (false, true) => Ok(Orientation::Vertical),
            (horizontal, vertical) => Err(ModelError::Decode(format!(
                "orientation is not exclusive (horizontal = {}, vertical = {})",
                horizontal, vertical
            ))),
        }
    }

    /// Decode the state at tick `t`
    pub fn snapshot(&self, t: usize) -> ModelResult<Snapshot> {
        let domain = *self.index.domain();
        let mut cells = Vec::with_capacity(domain.width * domain.height);
        let mut builders = Vec::new();
        let mut collisions = Vec::new();

        for (x, y) in domain.cells() {
            for dir in Direction::ALL {
                if self.value(FactKey::BuilderPos { dir, x, y, t })? {
                    builders.push((dir, Position::new(x, y)));
                }
            }
            cells.push(self.cell_state(x, y, t)?);
            if self.value(FactKey::Collision { x, y, t })? {
                collisions.push(Position::new(x, y));
            }
        }

        let mut balls = Vec::new();
        for ball in 0..domain.balls {
            let vx = if self.value(FactKey::BallVelocityX { ball, t })? { 1 } else { -1 };
            let vy = if self.value(FactKey::BallVelocityY { ball, t })? { 1 } else { -1 };

            let before = balls.len();
            for (x, y) in domain.cells() {
                if self.value(FactKey::BallPos { ball, x, y, t })? {
                    balls.push(BallState { ball, x, y, vx, vy });
                }
            }

            let found = balls.len() - before;
            if found != 1 {
                warn!(ball, t, positions = found, "ball does not decode to exactly one cell");
            }
        }

        let mut finished = Vec::new();
        for dir in Direction::ALL {
            if self.value(FactKey::BuilderFinished { dir, t })? {
                finished.push(dir);
            }
        }

        Ok(Snapshot {
            t,
            width: domain.width,
            height: domain.height,
            cells,
            builders,
            balls,
            collisions,
            finished,
            life_lost: self.value(FactKey::LoseLife { t })?,
        })
    }

    /// Display state of one cell; the first head found wins
    fn cell_state(&self, x: usize, y: usize, t: usize) -> ModelResult<CellState> {
        for dir in Direction::ALL {
            if self.value(FactKey::BuilderPos { dir, x, y, t })? {
                return Ok(CellState::BuilderHead(dir));
            }
        }
        if self.value(FactKey::Captured { x, y, t })? {
            return Ok(CellState::Captured);
        }
        for dir in Direction::ALL {
            if self.value(FactKey::Building { dir, x, y, t })? {
                return Ok(CellState::Building);
            }
        }
        Ok(CellState::Empty)
    }

    /// Decode every tick `0..=T` plus the final verdict
    pub fn project(&self, solve_time: Duration) -> ModelResult<Outcome> {
        let domain = *self.index.domain();

        let snapshots = domain.times()
            .into_par_iter()
            .map(|t| self.snapshot(t))
            .collect::<ModelResult<Vec<_>>>()?;

        Ok(Outcome {
            orientation: self.orientation()?,
            life_lost: self.value(FactKey::LoseLife { t: domain.horizon })?,
            snapshots,
            solve_time,
        })
    }
}
