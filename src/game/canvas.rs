//! Canvas representation: the static grid of pre-captured cells

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rectangular canvas; `true` marks a cell that is already captured territory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<bool>,
}

impl Canvas {
    /// Create an empty (fully uncaptured) canvas
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Create a canvas from rows of cells, `rows[y][x]`
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self> {
        if rows.is_empty() {
            anyhow::bail!("Canvas cannot be empty");
        }

        let height = rows.len();
        let width = rows[0].len();

        if width == 0 {
            anyhow::bail!("Canvas width cannot be zero");
        }

        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                anyhow::bail!("Row {} has length {}, expected {}", y, row.len(), width);
            }
        }

        Ok(Self {
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// A canvas whose outer ring is captured, the usual Qix starting board
    pub fn bordered(width: usize, height: usize) -> Self {
        let mut canvas = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                    let idx = canvas.index(x, y);
                    canvas.cells[idx] = true;
                }
            }
        }
        canvas
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Whether `(x, y)` starts out captured; cells off the canvas are not
    pub fn is_captured(&self, x: usize, y: usize) -> bool {
        self.contains(x, y) && self.cells[self.index(x, y)]
    }

    pub fn set_captured(&mut self, x: usize, y: usize, captured: bool) -> Result<()> {
        if !self.contains(x, y) {
            anyhow::bail!("Coordinates ({}, {}) out of bounds for {}x{} canvas", x, y, self.width, self.height);
        }
        let idx = self.index(x, y);
        self.cells[idx] = captured;
        Ok(())
    }

    pub fn captured_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// Fraction of the canvas already captured (0.0 to 1.0)
    pub fn captured_ratio(&self) -> f64 {
        self.captured_count() as f64 / self.cells.len() as f64
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                write!(f, "{}", if self.is_captured(x, y) { "⬛" } else { "⬜" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_creation() {
        let canvas = Canvas::new(4, 3);
        assert_eq!(canvas.width, 4);
        assert_eq!(canvas.height, 3);
        assert_eq!(canvas.cells.len(), 12);
        assert_eq!(canvas.captured_count(), 0);
    }

    #[test]
    fn test_from_rows_uses_x_y_order() {
        let rows = vec![
            vec![false, true, false],
            vec![false, false, false],
        ];
        let canvas = Canvas::from_rows(rows).unwrap();
        assert!(canvas.is_captured(1, 0));
        assert!(!canvas.is_captured(0, 1));
        assert!(!canvas.is_captured(7, 7));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![false, true], vec![true]];
        assert!(Canvas::from_rows(rows).is_err());
        assert!(Canvas::from_rows(vec![]).is_err());
    }

    #[test]
    fn test_bordered_canvas() {
        let canvas = Canvas::bordered(5, 4);
        // 2 full rows of 5 plus 2 side cells on each of the 2 inner rows
        assert_eq!(canvas.captured_count(), 14);
        assert!(canvas.is_captured(0, 2));
        assert!(!canvas.is_captured(2, 2));
    }
}
