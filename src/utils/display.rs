//! Display and output formatting utilities

use crate::capture::{CellState, Outcome, Snapshot};
use crate::config::OutputFormat;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Format decoded outcomes for display
pub struct OutcomeFormatter;

impl OutcomeFormatter {
    /// Glyph for one cell: collisions, then balls, then the cell state
    fn glyph(snapshot: &Snapshot, x: usize, y: usize) -> char {
        if snapshot.collisions.iter().any(|p| p.x == x && p.y == y) {
            return 'X';
        }
        if snapshot.balls_at(x, y).next().is_some() {
            return 'o';
        }
        match snapshot.cell(x, y) {
            Some(CellState::Empty) | None => '·',
            Some(CellState::Captured) => '█',
            Some(CellState::Building) => '▒',
            Some(CellState::BuilderHead(dir)) => dir.arrow(),
        }
    }

    /// Format a snapshot in compact form
    pub fn format_snapshot_compact(snapshot: &Snapshot) -> String {
        let mut output = String::new();
        for y in 0..snapshot.height {
            for x in 0..snapshot.width {
                output.push(Self::glyph(snapshot, x, y));
            }
            output.push('\n');
        }
        output
    }

    /// Format a snapshot with coordinates
    pub fn format_snapshot_with_coords(snapshot: &Snapshot) -> String {
        let mut output = String::new();

        output.push_str("   ");
        for x in 0..snapshot.width {
            output.push_str(&format!("{:2}", x % 10));
        }
        output.push('\n');

        for y in 0..snapshot.height {
            output.push_str(&format!("{:2} ", y));
            for x in 0..snapshot.width {
                let glyph = Self::glyph(snapshot, x, y);
                output.push(glyph);
                output.push(glyph);
            }
            output.push('\n');
        }

        output
    }

    fn format_tick_header(snapshot: &Snapshot) -> String {
        let mut header = format!("t = {} (captured: {})", snapshot.t, snapshot.captured_count());
        if !snapshot.finished.is_empty() {
            let finished: Vec<String> = snapshot.finished.iter().map(|dir| dir.to_string()).collect();
            header.push_str(&format!(", finished: {}", finished.join(" ")));
        }
        if snapshot.life_lost {
            header.push_str(", LIFE LOST");
        }
        header
    }

    /// Format an outcome for console output
    pub fn format_outcome(outcome: &Outcome, show_steps: bool) -> String {
        let mut output = String::new();

        output.push_str("=== Capture Line Outcome ===\n");
        output.push_str(&format!("Orientation: {:?}\n", outcome.orientation));
        output.push_str(&format!("Horizon: {} ticks\n", outcome.horizon()));
        output.push_str(&format!("Solve Time: {:.3}s\n", outcome.solve_time.as_secs_f64()));
        match outcome.first_life_loss() {
            Some(t) => output.push_str(&format!("Life lost: yes (from t = {})\n", t)),
            None => output.push_str("Life lost: no\n"),
        }
        output.push('\n');

        if show_steps {
            for snapshot in &outcome.snapshots {
                output.push_str(&Self::format_tick_header(snapshot));
                output.push('\n');
                output.push_str(&Self::format_snapshot_compact(snapshot));
                output.push('\n');
            }
        } else {
            if let Some(initial) = outcome.initial_snapshot() {
                output.push_str("Initial State:\n");
                output.push_str(&Self::format_snapshot_compact(initial));
                output.push('\n');
            }
            if let Some(last) = outcome.final_snapshot() {
                output.push_str(&format!("Final State ({}):\n", Self::format_tick_header(last)));
                output.push_str(&Self::format_snapshot_compact(last));
            }
        }

        output
    }

    /// Save an outcome in the configured format; returns the written file
    pub fn save_outcome<P: AsRef<Path>>(
        outcome: &Outcome,
        output_dir: P,
        format: OutputFormat,
    ) -> Result<PathBuf> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;

        let filepath = match format {
            OutputFormat::Text => {
                let filepath = output_dir.join("outcome.txt");
                let mut content = Self::format_outcome(outcome, true);
                content.push_str("\nLegend: █ captured, · empty, ▒ building, ↑→↓← builder, o ball, X collision\n");
                std::fs::write(&filepath, content)?;
                filepath
            }
            OutputFormat::Json => {
                let filepath = output_dir.join("outcome.json");
                outcome.save_to_file(&filepath)?;

                let summary_path = output_dir.join("outcome_summary.json");
                let summary_json = serde_json::to_string_pretty(&outcome.summary())?;
                std::fs::write(summary_path, summary_json)?;
                filepath
            }
        };

        Ok(filepath)
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() &&
        (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::BallState;
    use crate::game::{Direction, Orientation, Position};
    use std::time::Duration;
    use tempfile::tempdir;

    fn snapshot() -> Snapshot {
        Snapshot {
            t: 1,
            width: 4,
            height: 1,
            cells: vec![
                CellState::Captured,
                CellState::Building,
                CellState::BuilderHead(Direction::East),
                CellState::Empty,
            ],
            builders: vec![(Direction::East, Position::new(2, 0))],
            balls: vec![BallState { ball: 0, x: 3, y: 0, vx: 1, vy: 1 }],
            collisions: Vec::new(),
            finished: vec![Direction::West],
            life_lost: false,
        }
    }

    fn outcome() -> Outcome {
        Outcome {
            orientation: Orientation::Horizontal,
            snapshots: vec![snapshot()],
            life_lost: false,
            solve_time: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_snapshot_formatting() {
        let compact = OutcomeFormatter::format_snapshot_compact(&snapshot());
        assert_eq!(compact, "█▒→o\n");

        let with_coords = OutcomeFormatter::format_snapshot_with_coords(&snapshot());
        assert!(with_coords.contains(" 0 1 2 3"));
        assert!(with_coords.contains("██▒▒→→oo"));
    }

    #[test]
    fn test_collision_glyph() {
        let mut snapshot = snapshot();
        snapshot.collisions.push(Position::new(1, 0));
        assert_eq!(OutcomeFormatter::format_snapshot_compact(&snapshot), "█X→o\n");
    }

    #[test]
    fn test_outcome_formatting() {
        let text = OutcomeFormatter::format_outcome(&outcome(), true);
        assert!(text.contains("Life lost: no"));
        assert!(text.contains("t = 1 (captured: 1), finished: W"));
    }

    #[test]
    fn test_save_outcome() {
        let dir = tempdir().unwrap();

        let text_file = OutcomeFormatter::save_outcome(&outcome(), dir.path(), OutputFormat::Text).unwrap();
        assert!(std::fs::read_to_string(text_file).unwrap().contains("Legend"));

        let json_file = OutcomeFormatter::save_outcome(&outcome(), dir.path(), OutputFormat::Json).unwrap();
        let loaded = Outcome::load_from_file(json_file).unwrap();
        assert_eq!(loaded.snapshots, outcome().snapshots);
        assert!(dir.path().join("outcome_summary.json").exists());
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::colored("test", Color::Red);
        assert!(colored.contains("test"));

        let success = ColorOutput::success("OK");
        assert!(success.contains("OK"));
    }
}
