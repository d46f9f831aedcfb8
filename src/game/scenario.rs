//! The static scenario: canvas, cursor, orientation and balls

use super::Canvas;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Orientation of the line the player draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// The two opposite builder directions spawned for this orientation
    pub fn directions(self) -> [Direction; 2] {
        match self {
            Orientation::Horizontal => [Direction::East, Direction::West],
            Orientation::Vertical => [Direction::North, Direction::South],
        }
    }
}

/// Heading of a line builder. `y` grows downward, so North is `y - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::North, Direction::East, Direction::South, Direction::West];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    pub fn orientation(self) -> Orientation {
        match self {
            Direction::East | Direction::West => Orientation::Horizontal,
            Direction::North | Direction::South => Orientation::Vertical,
        }
    }

    /// The cell one step ahead of `(x, y)`, if it lies on a `width` x `height` grid
    pub fn step(self, x: usize, y: usize, width: usize, height: usize) -> Option<(usize, usize)> {
        let (dx, dy) = self.delta();
        offset(x, y, dx, dy, width, height)
    }

    /// Single-character tag, used in compact output
    pub fn arrow(self) -> char {
        match self {
            Direction::North => '↑',
            Direction::East => '→',
            Direction::South => '↓',
            Direction::West => '←',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "N",
            Direction::East => "E",
            Direction::South => "S",
            Direction::West => "W",
        };
        write!(f, "{}", name)
    }
}

/// Move `(x, y)` by `(dx, dy)` and keep the result only if it stays on the grid
pub fn offset(x: usize, y: usize, dx: isize, dy: isize, width: usize, height: usize) -> Option<(usize, usize)> {
    let nx = x.checked_add_signed(dx)?;
    let ny = y.checked_add_signed(dy)?;
    (nx < width && ny < height).then_some((nx, ny))
}

/// A cell coordinate on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A ball with its initial cell and unit-diagonal velocity signs (`+1` / `-1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ball {
    pub x: usize,
    pub y: usize,
    pub vx: i8,
    pub vy: i8,
}

impl Ball {
    pub fn new(x: usize, y: usize, vx: i8, vy: i8) -> Self {
        Self { x, y, vx, vy }
    }

    pub fn moving_right(&self) -> bool {
        self.vx > 0
    }

    pub fn moving_down(&self) -> bool {
        self.vy > 0
    }

    pub fn has_unit_velocity(&self) -> bool {
        self.vx.abs() == 1 && self.vy.abs() == 1
    }
}

/// Everything the constraint model needs to know about one line-drawing action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub canvas: Canvas,
    pub orientation: Orientation,
    pub cursor: Position,
    pub balls: Vec<Ball>,
}

impl Scenario {
    pub fn new(canvas: Canvas, orientation: Orientation, cursor: Position, balls: Vec<Ball>) -> Self {
        Self {
            canvas,
            orientation,
            cursor,
            balls,
        }
    }

    pub fn width(&self) -> usize {
        self.canvas.width
    }

    pub fn height(&self) -> usize {
        self.canvas.height
    }

    /// The time horizon: one tick per column a builder could traverse
    pub fn horizon(&self) -> usize {
        self.canvas.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_directions_are_opposite() {
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            let [a, b] = orientation.directions();
            assert_eq!(a.opposite(), b);
            assert_eq!(a.orientation(), orientation);
            assert_eq!(b.orientation(), orientation);
        }
    }

    #[test]
    fn test_direction_step_respects_edges() {
        assert_eq!(Direction::East.step(1, 1, 3, 3), Some((2, 1)));
        assert_eq!(Direction::East.step(2, 1, 3, 3), None);
        assert_eq!(Direction::North.step(1, 0, 3, 3), None);
        assert_eq!(Direction::North.step(1, 2, 3, 3), Some((1, 1)));
        assert_eq!(Direction::West.step(0, 0, 3, 3), None);
    }

    #[test]
    fn test_ball_velocity() {
        let ball = Ball::new(0, 0, 1, -1);
        assert!(ball.moving_right());
        assert!(!ball.moving_down());
        assert!(ball.has_unit_velocity());
        assert!(!Ball::new(0, 0, 0, 1).has_unit_velocity());
    }

    #[test]
    fn test_horizon_is_width() {
        let scenario = Scenario::new(
            Canvas::new(7, 3),
            Orientation::Vertical,
            Position { x: 1, y: 1 },
            vec![],
        );
        assert_eq!(scenario.horizon(), 7);
    }
}
