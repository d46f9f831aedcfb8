//! Capture-line problem definition

use super::outcome::Verdict;
use super::validator::OutcomeValidator;
use crate::config::Settings;
use crate::game::{load_canvas_from_file, Scenario};
use crate::sat::encoder::{ComplexityEstimate, EncodingStatistics, SatEncoder};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// One line-drawing action to be modelled
pub struct CaptureProblem {
    settings: Settings,
    encoder: SatEncoder,
    validator: OutcomeValidator,
}

impl CaptureProblem {
    /// Create a problem from settings, loading the canvas file
    pub fn new(settings: Settings) -> Result<Self> {
        let canvas = load_canvas_from_file(&settings.scenario.canvas_file)
            .context("Failed to load canvas file")?;

        let scenario = Scenario::new(
            canvas,
            settings.scenario.orientation,
            settings.scenario.cursor,
            settings.scenario.balls.clone(),
        );

        Ok(Self::with_scenario(settings, scenario))
    }

    /// Create a problem with an explicit scenario (useful for testing)
    pub fn with_scenario(settings: Settings, scenario: Scenario) -> Self {
        let validator = OutcomeValidator::new(&scenario);
        let encoder = SatEncoder::new(scenario, &settings.solver);

        Self {
            settings,
            encoder,
            validator,
        }
    }

    /// Build, solve, decode and validate
    pub fn solve(&mut self) -> Result<Verdict> {
        let scenario = self.encoder.scenario();
        info!(
            width = scenario.width(),
            height = scenario.height(),
            balls = scenario.balls.len(),
            orientation = ?scenario.orientation,
            "modelling capture line from ({}, {})",
            scenario.cursor.x,
            scenario.cursor.y
        );
        info!("{}", self.encoder.estimate_complexity());

        let verdict = self.encoder.solve().context("SAT solving failed")?;

        if let Verdict::Simulated(outcome) = &verdict {
            let validation = self.validator.validate(outcome, self.encoder.scenario());
            if !validation.is_valid {
                warn!(violations = validation.violations.len(), "decoded run breaks model invariants");
                anyhow::bail!("Decoded run failed validation:\n{}", validation);
            }
        }

        Ok(verdict)
    }

    pub fn scenario(&self) -> &Scenario {
        self.encoder.scenario()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Statistics of the last solve
    pub fn encoding_statistics(&self) -> Option<&EncodingStatistics> {
        self.encoder.statistics()
    }

    /// Encode without solving
    pub fn analyze(&self) -> Result<EncodingStatistics> {
        self.encoder.analyze().context("Failed to encode scenario")
    }

    pub fn estimate_complexity(&self) -> ComplexityEstimate {
        self.encoder.estimate_complexity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{save_canvas_to_file, Canvas, Orientation, Position};
    use tempfile::tempdir;

    #[test]
    fn test_problem_from_settings() {
        let dir = tempdir().unwrap();
        let canvas_file = dir.path().join("canvas.txt");
        save_canvas_to_file(&Canvas::bordered(5, 5), &canvas_file).unwrap();

        let mut settings = Settings::default();
        settings.scenario.canvas_file = canvas_file;
        settings.scenario.cursor = Position::new(2, 2);
        settings.scenario.balls.clear();

        let mut problem = CaptureProblem::new(settings).unwrap();
        assert_eq!(problem.scenario().width(), 5);

        let verdict = problem.solve().unwrap();
        assert_eq!(verdict.life_lost(), Some(false));
        assert!(problem.encoding_statistics().is_some());
    }

    #[test]
    fn test_missing_canvas_file() {
        let mut settings = Settings::default();
        settings.scenario.canvas_file = "/nonexistent/canvas.txt".into();
        assert!(CaptureProblem::new(settings).is_err());
    }

    #[test]
    fn test_analyze() {
        let scenario = Scenario::new(Canvas::new(4, 3), Orientation::Horizontal, Position::new(1, 1), vec![]);
        let problem = CaptureProblem::with_scenario(Settings::default(), scenario);

        let stats = problem.analyze().unwrap();
        assert_eq!(stats.grid_height, 3);
        assert_eq!(stats.horizon, 4);
    }
}
