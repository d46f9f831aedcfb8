//! Configuration settings for the capture-line solver

use crate::game::{Ball, Orientation, Position};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub scenario: ScenarioConfig,
    pub solver: SolverConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub canvas_file: PathBuf,
    pub orientation: Orientation,
    pub cursor: Position,
    #[serde(default)]
    pub balls: Vec<Ball>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    Cadical,
    Varisat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub output_directory: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scenario: ScenarioConfig {
                canvas_file: PathBuf::from("input/canvases/bordered.txt"),
                orientation: Orientation::Horizontal,
                cursor: Position::new(13, 9),
                balls: vec![Ball::new(3, 3, 1, 1)],
            },
            solver: SolverConfig {
                backend: SolverBackend::Cadical,
                timeout_seconds: 300,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                output_directory: PathBuf::from("output/runs"),
            },
        }
    }
}

impl SolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.solver.timeout_seconds == 0 {
            anyhow::bail!("Solver timeout must be positive");
        }

        for (index, ball) in self.scenario.balls.iter().enumerate() {
            if !ball.has_unit_velocity() {
                anyhow::bail!(
                    "Ball {} has velocity ({}, {}); both components must be +1 or -1",
                    index, ball.vx, ball.vy
                );
            }
        }

        if !self.scenario.canvas_file.exists() {
            anyhow::bail!("Canvas file does not exist: {}", self.scenario.canvas_file.display());
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(ref canvas_file) = cli_overrides.canvas_file {
            self.scenario.canvas_file = canvas_file.clone();
        }
        if let Some(orientation) = cli_overrides.orientation {
            self.scenario.orientation = orientation;
        }
        if let Some(x) = cli_overrides.cursor_x {
            self.scenario.cursor.x = x;
        }
        if let Some(y) = cli_overrides.cursor_y {
            self.scenario.cursor.y = y;
        }
        if let Some(backend) = cli_overrides.backend {
            self.solver.backend = backend;
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = output_dir.clone();
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub canvas_file: Option<PathBuf>,
    pub orientation: Option<Orientation>,
    pub cursor_x: Option<usize>,
    pub cursor_y: Option<usize>,
    pub backend: Option<SolverBackend>,
    pub output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn settings_with_canvas(dir: &std::path::Path) -> Settings {
        let canvas_file = dir.join("canvas.txt");
        std::fs::write(&canvas_file, "000\n000\n000\n").unwrap();

        let mut settings = Settings::default();
        settings.scenario.canvas_file = canvas_file;
        settings
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempdir().unwrap();
        let settings = settings_with_canvas(dir.path());
        let config_path = dir.path().join("config").join("settings.yaml");

        settings.to_file(&config_path).unwrap();
        let loaded = Settings::from_file(&config_path).unwrap();

        assert_eq!(loaded.scenario.orientation, Orientation::Horizontal);
        assert_eq!(loaded.scenario.cursor, Position::new(13, 9));
        assert_eq!(loaded.scenario.balls, vec![Ball::new(3, 3, 1, 1)]);
        assert_eq!(loaded.solver.backend, SolverBackend::Cadical);
        assert_eq!(loaded.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_parse_yaml_layout() {
        let yaml = r#"
scenario:
  canvas_file: canvas.txt
  orientation: vertical
  cursor: { x: 1, y: 2 }
solver:
  backend: varisat
  timeout_seconds: 5
output:
  format: json
  output_directory: out
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.scenario.orientation, Orientation::Vertical);
        assert!(settings.scenario.balls.is_empty());
        assert_eq!(settings.solver.backend, SolverBackend::Varisat);
        assert_eq!(settings.solver.timeout(), Duration::from_secs(5));
        assert_eq!(settings.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_validate_rejects_bad_velocity() {
        let dir = tempdir().unwrap();
        let mut settings = settings_with_canvas(dir.path());
        assert!(settings.validate().is_ok());

        settings.scenario.balls.push(Ball::new(0, 0, 0, 1));
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_canvas_and_zero_timeout() {
        let mut settings = Settings::default();
        settings.scenario.canvas_file = PathBuf::from("/nonexistent/canvas.txt");
        assert!(settings.validate().is_err());

        let dir = tempdir().unwrap();
        let mut settings = settings_with_canvas(dir.path());
        settings.solver.timeout_seconds = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_merge_with_cli() {
        let mut settings = Settings::default();
        let overrides = CliOverrides {
            canvas_file: Some(PathBuf::from("other.txt")),
            orientation: Some(Orientation::Vertical),
            cursor_x: Some(4),
            cursor_y: None,
            backend: Some(SolverBackend::Varisat),
            output_dir: Some(PathBuf::from("elsewhere")),
        };

        settings.merge_with_cli(&overrides);

        assert_eq!(settings.scenario.canvas_file, PathBuf::from("other.txt"));
        assert_eq!(settings.scenario.orientation, Orientation::Vertical);
        assert_eq!(settings.scenario.cursor, Position::new(4, 9));
        assert_eq!(settings.solver.backend, SolverBackend::Varisat);
        assert_eq!(settings.output.output_directory, PathBuf::from("elsewhere"));
    }
}
