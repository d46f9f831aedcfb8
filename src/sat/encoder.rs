//! SAT encoder: builds the formula for a scenario, solves it and decodes the run

use super::constraints::ConstraintGenerator;
use super::formula::{Formula, FormulaStatistics};
use super::solver::{compile_formula, CompiledFormula, SolveOutcome, SolverOptions, SolverStatistics};
use super::solver_factory::UnifiedSatSolver;
use super::variables::{VariableIndex, VariableStatistics};
use crate::capture::outcome::Verdict;
use crate::capture::projector::ResultProjector;
use crate::config::{SolverBackend, SolverConfig};
use crate::error::ModelResult;
use crate::game::Scenario;
use tracing::info;

/// Main SAT encoder for capture-line scenarios
pub struct SatEncoder {
    scenario: Scenario,
    backend: SolverBackend,
    options: SolverOptions,
    statistics: Option<EncodingStatistics>,
}

impl SatEncoder {
    /// Create an encoder using the configured backend and timeout
    pub fn new(scenario: Scenario, config: &SolverConfig) -> Self {
        Self {
            scenario,
            backend: config.backend,
            options: SolverOptions { timeout: Some(config.timeout()) },
            statistics: None,
        }
    }

    /// Create an encoder without a timeout
    pub fn with_backend(scenario: Scenario, backend: SolverBackend) -> Self {
        Self {
            scenario,
            backend,
            options: SolverOptions::default(),
            statistics: None,
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Build the variable index and the full formula
    pub fn encode(&self) -> ModelResult<(Formula, VariableIndex)> {
        let mut generator = ConstraintGenerator::new(&self.scenario)?;
        let formula = generator.generate_all_constraints()?;
        Ok((formula, generator.into_index()))
    }

    /// Encode, solve once and decode
    pub fn solve(&mut self) -> ModelResult<Verdict> {
        let (formula, index) = self.encode()?;
        info!(
            variables = formula.variable_count(),
            constraints = formula.len(),
            "encoded capture-line scenario"
        );

        let compiled = compile_formula(&formula);
        let mut solver = UnifiedSatSolver::new(self.backend);
        solver.configure(&self.options);
        let outcome = solver.solve_compiled(&compiled)?;

        let mut statistics = self.collect_statistics(&formula, &compiled, &index);
        statistics.solver = Some(solver.statistics());
        self.statistics = Some(statistics);

        match outcome {
            SolveOutcome::Satisfiable(solution) => {
                let projector = ResultProjector::new(&index, &solution.assignment);
                let outcome = projector.project(solution.solve_time)?;
                info!(life_lost = outcome.life_lost, "decoded run");
                Ok(Verdict::Simulated(outcome))
            }
            SolveOutcome::Unsatisfiable => {
                info!("formula is unsatisfiable; no valid run");
                Ok(Verdict::NoValidRun)
            }
        }
    }

    /// Statistics of the last solve, if any
    pub fn statistics(&self) -> Option<&EncodingStatistics> {
        self.statistics.as_ref()
    }

    /// Encode and compile without solving
    pub fn analyze(&self) -> ModelResult<EncodingStatistics> {
        let (formula, index) = self.encode()?;
        let compiled = compile_formula(&formula);
        Ok(self.collect_statistics(&formula, &compiled, &index))
    }

    fn collect_statistics(
        &self,
        formula: &Formula,
        compiled: &CompiledFormula,
        index: &VariableIndex,
    ) -> EncodingStatistics {
        EncodingStatistics {
            grid_width: self.scenario.width(),
            grid_height: self.scenario.height(),
            horizon: self.scenario.horizon(),
            balls: self.scenario.balls.len(),
            backend: self.backend,
            variables: index.statistics(),
            formula: formula.statistics(),
            cnf_clauses: compiled.clauses.len(),
            auxiliary_variables: compiled.auxiliary_variables,
            solver: None,
        }
    }

    /// Rough size estimate without building the formula
    pub fn estimate_complexity(&self) -> ComplexityEstimate {
        let cells = self.scenario.width() * self.scenario.height();
        let time_steps = self.scenario.horizon() + 1;
        let balls = self.scenario.balls.len();

        // per cell and tick: captured, collision, 4 heads, 4 buildings, one position per ball
        let per_tick = cells * (10 + balls) + 4 + 1 + 2 * balls;
        let estimated_variables = 2 + cells + per_tick * time_steps;
        // the distributed capture frame dominates with 17 clauses per cell and tick
        let estimated_clauses = cells * time_steps * (60 + 12 * balls);

        let complexity_level = if estimated_variables < 1000 {
            ComplexityLevel::Low
        } else if estimated_variables < 10000 {
            ComplexityLevel::Medium
        } else if estimated_variables < 100000 {
            ComplexityLevel::High
        } else {
            ComplexityLevel::VeryHigh
        };

        ComplexityEstimate {
            complexity_level,
            estimated_variables,
            estimated_clauses,
            captured_ratio: self.scenario.canvas.captured_ratio(),
            grid_size: cells,
            time_steps,
        }
    }
}

/// Statistics about the SAT encoding
#[derive(Debug, Clone)]
pub struct EncodingStatistics {
    pub grid_width: usize,
    pub grid_height: usize,
    pub horizon: usize,
    pub balls: usize,
    pub backend: SolverBackend,
    pub variables: VariableStatistics,
    pub formula: FormulaStatistics,
    pub cnf_clauses: usize,
    pub auxiliary_variables: usize,
    pub solver: Option<SolverStatistics>,
}

/// Complexity estimate for the problem
#[derive(Debug, Clone)]
pub struct ComplexityEstimate {
    pub complexity_level: ComplexityLevel,
    pub estimated_variables: usize,
    pub estimated_clauses: usize,
    pub captured_ratio: f64,
    pub grid_size: usize,
    pub time_steps: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl std::fmt::Display for EncodingStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Encoding Statistics:")?;
        writeln!(f, "  Grid: {}x{}", self.grid_width, self.grid_height)?;
        writeln!(f, "  Horizon: {} ticks", self.horizon)?;
        writeln!(f, "  Balls: {}", self.balls)?;
        writeln!(f, "  Backend: {:?}", self.backend)?;
        writeln!(f, "  Model variables: {}", self.variables.total_variables)?;
        writeln!(f, "  Auxiliary variables: {}", self.auxiliary_variables)?;
        writeln!(f, "  Constraints: {} clauses, {} implications, {} cardinality bounds",
                 self.formula.clauses, self.formula.implications, self.formula.cardinality_bounds)?;
        writeln!(f, "  CNF clauses: {}", self.cnf_clauses)?;
        if let Some(solver) = &self.solver {
            writeln!(f, "  Solve time: {:.3}s ({:?})", solver.solve_time.as_secs_f64(), solver.result)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for ComplexityEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Problem Complexity Estimate:")?;
        writeln!(f, "  Complexity level: {:?}", self.complexity_level)?;
        writeln!(f, "  Estimated variables: {}", self.estimated_variables)?;
        writeln!(f, "  Estimated clauses: {}", self.estimated_clauses)?;
        writeln!(f, "  Grid size: {} cells", self.grid_size)?;
        writeln!(f, "  Time steps: {}", self.time_steps)?;
        writeln!(f, "  Captured ratio: {:.2}%", self.captured_ratio * 100.0)?;

        let recommendation = match self.complexity_level {
            ComplexityLevel::Low => "Should solve quickly",
            ComplexityLevel::Medium => "May take some time to solve",
            ComplexityLevel::High => "Likely to be challenging, consider a smaller canvas",
            ComplexityLevel::VeryHigh => "Very challenging, consider a smaller canvas or fewer balls",
        };
        writeln!(f, "  Recommendation: {}", recommendation)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Ball, Canvas, Orientation, Position};

    fn open_scenario(balls: Vec<Ball>) -> Scenario {
        Scenario::new(Canvas::new(3, 3), Orientation::Vertical, Position::new(1, 1), balls)
    }

    #[test]
    fn test_encode_declares_full_universe() {
        let encoder = SatEncoder::with_backend(open_scenario(vec![]), SolverBackend::Cadical);
        let (formula, index) = encoder.encode().unwrap();

        assert_eq!(formula.variable_count(), index.variable_count());
        assert!(!formula.is_empty());
    }

    #[test]
    fn test_analyze_without_solving() {
        let encoder = SatEncoder::with_backend(open_scenario(vec![Ball::new(0, 0, 1, 1)]), SolverBackend::Cadical);
        let stats = encoder.analyze().unwrap();

        assert_eq!(stats.grid_width, 3);
        assert_eq!(stats.horizon, 3);
        assert_eq!(stats.balls, 1);
        assert!(stats.cnf_clauses > stats.formula.clauses);
        assert!(stats.solver.is_none());
        assert!(encoder.statistics().is_none());
    }

    #[test]
    fn test_solve_records_statistics() {
        let mut encoder = SatEncoder::with_backend(open_scenario(vec![]), SolverBackend::Cadical);
        let verdict = encoder.solve().unwrap();

        assert_eq!(verdict.life_lost(), Some(false));
        let stats = encoder.statistics().unwrap();
        let solver = stats.solver.as_ref().unwrap();
        // the solver was loaded with exactly the clauses reported
        assert_eq!(solver.clause_count, stats.cnf_clauses);
        assert_eq!(stats.cnf_clauses, encoder.analyze().unwrap().cnf_clauses);
    }

    #[test]
    fn test_complexity_estimation() {
        let encoder = SatEncoder::with_backend(open_scenario(vec![]), SolverBackend::Cadical);
        let estimate = encoder.estimate_complexity();

        assert_eq!(estimate.grid_size, 9);
        assert_eq!(estimate.time_steps, 4);
        assert_eq!(estimate.complexity_level, ComplexityLevel::Low);
        assert_eq!(estimate.captured_ratio, 0.0);
    }
}
