//! Varisat SAT solver integration

use super::formula::Clause;
use super::solver::{CompiledFormula, SolveOutcome, SolverOptions, SolverResultType, SolverSolution, SolverStatistics};
use crate::error::{ModelError, ModelResult};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use varisat::{ExtendFormula, Lit, Solver};

/// SAT solver wrapper for Varisat (pure Rust CDCL)
pub struct VarisatSatSolver {
    solver: Solver<'static>,
    variable_count: usize,
    clause_count: usize,
    model_variables: Option<usize>,
    has_empty_clause: bool,
    last_result: SolverResultType,
    last_solve_time: Duration,
}

impl VarisatSatSolver {
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            variable_count: 0,
            clause_count: 0,
            model_variables: None,
            has_empty_clause: false,
            last_result: SolverResultType::NotSolved,
            last_solve_time: Duration::ZERO,
        }
    }

    pub fn configure(&mut self, options: &SolverOptions) {
        if options.timeout.is_some() {
            warn!("varisat backend ignores the solver timeout");
        }
    }

    pub fn add_clauses(&mut self, clauses: &[Clause]) -> ModelResult<()> {
        for clause in clauses {
            self.add_clause(clause)?;
        }
        Ok(())
    }

    pub fn add_clause(&mut self, clause: &Clause) -> ModelResult<()> {
        if clause.is_empty() {
            self.has_empty_clause = true;
            self.clause_count += 1;
            return Ok(());
        }

        let mut lits = Vec::with_capacity(clause.literals.len());
        for &literal in &clause.literals {
            if literal == 0 || literal == i32::MIN {
                return Err(ModelError::Solver(format!("invalid literal {} in clause", literal)));
            }
            self.variable_count = self.variable_count.max(literal.unsigned_abs() as usize);
            lits.push(Lit::from_dimacs(literal as isize));
        }

        self.solver.add_clause(&lits);
        self.clause_count += 1;
        Ok(())
    }

    pub fn add_compiled(&mut self, compiled: &CompiledFormula) -> ModelResult<()> {
        self.add_clauses(&compiled.clauses)?;
        self.model_variables = Some(compiled.model_variables);
        self.variable_count = self.variable_count.max(compiled.model_variables);
        Ok(())
    }

    pub fn solve(&mut self) -> ModelResult<SolveOutcome> {
        let start_time = Instant::now();

        if self.has_empty_clause {
            self.record(SolverResultType::Unsatisfiable, start_time.elapsed());
            return Ok(SolveOutcome::Unsatisfiable);
        }

        info!(
            variables = self.variable_count,
            clauses = self.clause_count,
            "running varisat"
        );
        let result = self.solver.solve();
        let solve_time = start_time.elapsed();

        match result {
            Ok(true) => {
                self.record(SolverResultType::Satisfiable, solve_time);
                let assignment = self.extract_assignment()?;
                Ok(SolveOutcome::Satisfiable(SolverSolution { assignment, solve_time }))
            }
            Ok(false) => {
                self.record(SolverResultType::Unsatisfiable, solve_time);
                Ok(SolveOutcome::Unsatisfiable)
            }
            Err(err) => {
                self.record(SolverResultType::Interrupted, solve_time);
                Err(ModelError::Solver(format!("varisat failed: {:?}", err)))
            }
        }
    }

    fn record(&mut self, result: SolverResultType, solve_time: Duration) {
        self.last_result = result;
        self.last_solve_time = solve_time;
    }

    fn extract_assignment(&self) -> ModelResult<HashMap<i32, bool>> {
        let model = self.solver.model()
            .ok_or_else(|| ModelError::Solver("varisat reported SAT without a model".to_string()))?;
        let reported = self.model_variables.unwrap_or(self.variable_count) as isize;

        Ok(model.into_iter()
            .filter(|lit| lit.var().to_dimacs() <= reported)
            .map(|lit| (lit.var().to_dimacs() as i32, lit.is_positive()))
            .collect())
    }

    pub fn statistics(&self) -> SolverStatistics {
        SolverStatistics {
            variable_count: self.variable_count,
            clause_count: self.clause_count,
            solve_time: self.last_solve_time,
            result: self.last_result,
        }
    }

    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    pub fn clause_count(&self) -> usize {
        self.clause_count
    }
}

impl Default for VarisatSatSolver {
    fn default() -> Self {
        Self::new()
    }
}
