//! File I/O for canvases

use super::Canvas;
use anyhow::{Context, Result};
use std::path::Path;

/// Load a canvas from a text file.
/// Format: each line is a row, `1` for a captured cell and `0` for an open one.
pub fn load_canvas_from_file<P: AsRef<Path>>(path: P) -> Result<Canvas> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read canvas file: {}", path.as_ref().display()))?;

    parse_canvas_from_string(&content)
        .with_context(|| format!("Failed to parse canvas from file: {}", path.as_ref().display()))
}

/// Parse a canvas from its text representation
pub fn parse_canvas_from_string(content: &str) -> Result<Canvas> {
    let lines: Vec<&str> = content.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        anyhow::bail!("Canvas file is empty or contains no valid rows");
    }

    let width = lines[0].len();
    let mut rows = Vec::with_capacity(lines.len());

    for (y, line) in lines.iter().enumerate() {
        if line.len() != width {
            anyhow::bail!("Row {} has length {}, expected {} (all rows must have the same length)",
                         y, line.len(), width);
        }

        let row = line.chars()
            .enumerate()
            .map(|(x, ch)| match ch {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(anyhow::anyhow!(
                    "Invalid character '{}' at ({}, {}). Only '0' and '1' are allowed", ch, x, y
                )),
            })
            .collect::<Result<Vec<bool>>>()?;
        rows.push(row);
    }

    Canvas::from_rows(rows)
}

/// Save a canvas to a text file, creating parent directories as needed
pub fn save_canvas_to_file<P: AsRef<Path>>(canvas: &Canvas, path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, canvas_to_string(canvas))
        .with_context(|| format!("Failed to write canvas to file: {}", path.as_ref().display()))?;

    Ok(())
}

pub fn canvas_to_string(canvas: &Canvas) -> String {
    let mut result = String::with_capacity(canvas.height * (canvas.width + 1));

    for y in 0..canvas.height {
        for x in 0..canvas.width {
            result.push(if canvas.is_captured(x, y) { '1' } else { '0' });
        }
        result.push('\n');
    }

    result
}

/// Write the example canvases used by `setup`
pub fn create_example_canvases<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    // Classic starting board: only the frame is captured
    save_canvas_to_file(&Canvas::bordered(27, 19), dir.join("bordered.txt"))?;

    save_canvas_to_file(&Canvas::new(5, 5), dir.join("open_5x5.txt"))?;

    // A board with a captured block in the middle to bounce off
    let mut island = Canvas::bordered(12, 8);
    for y in 3..5 {
        for x in 5..7 {
            island.set_captured(x, y, true)?;
        }
    }
    save_canvas_to_file(&island, dir.join("island.txt"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_canvas_from_string() {
        let canvas = parse_canvas_from_string("111\n101\n111\n").unwrap();

        assert_eq!(canvas.width, 3);
        assert_eq!(canvas.height, 3);
        assert_eq!(canvas.captured_count(), 8);
        assert!(!canvas.is_captured(1, 1));
    }

    #[test]
    fn test_round_trip_text() {
        let original = "0110\n0000\n";
        let canvas = parse_canvas_from_string(original).unwrap();
        assert_eq!(canvas_to_string(&canvas), original);
    }

    #[test]
    fn test_file_operations() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("nested/canvas.txt");

        let canvas = Canvas::bordered(4, 3);
        save_canvas_to_file(&canvas, &file_path).unwrap();
        let loaded = load_canvas_from_file(&file_path).unwrap();

        assert_eq!(canvas, loaded);
    }

    #[test]
    fn test_invalid_input() {
        assert!(parse_canvas_from_string("010\n1X1\n010\n").is_err());
        assert!(parse_canvas_from_string("010\n11\n010\n").is_err());
        assert!(parse_canvas_from_string("").is_err());
    }

    #[test]
    fn test_create_example_canvases() {
        let temp_dir = tempdir().unwrap();
        create_example_canvases(temp_dir.path()).unwrap();

        assert!(temp_dir.path().join("bordered.txt").exists());
        assert!(temp_dir.path().join("open_5x5.txt").exists());

        let island = load_canvas_from_file(temp_dir.path().join("island.txt")).unwrap();
        assert!(island.is_captured(5, 3));
        assert!(!island.is_captured(4, 3));
    }
}
