//! SAT solver integration using CaDiCaL, plus formula-to-CNF compilation

use super::cardinality::{encode_at_most, AuxiliaryAllocator};
use super::formula::{Clause, Constraint, Formula};
use crate::error::{ModelError, ModelResult};
use cadical::{Solver, Timeout};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A formula lowered to plain clauses
#[derive(Debug, Clone)]
pub struct CompiledFormula {
    pub clauses: Vec<Clause>,
    /// Variables `1..=model_variables` belong to the model; the rest are auxiliary
    pub model_variables: usize,
    pub auxiliary_variables: usize,
}

/// Lower implications and cardinality bounds to CNF
pub fn compile_formula(formula: &Formula) -> CompiledFormula {
    let mut aux = AuxiliaryAllocator::after(formula.variable_count());
    let mut clauses = Vec::with_capacity(formula.len());

    for constraint in formula.constraints() {
        match constraint {
            Constraint::Clause(clause) => clauses.push(clause.clone()),
            Constraint::Implies { premises, conclusions } => {
                clauses.push(Clause::implication(premises, conclusions));
            }
            Constraint::AtMost { literals, bound } => {
                clauses.extend(encode_at_most(literals, *bound, &mut aux));
            }
        }
    }

    debug!(
        clauses = clauses.len(),
        auxiliary = aux.allocated(),
        "compiled formula to CNF"
    );

    CompiledFormula {
        clauses,
        model_variables: formula.variable_count(),
        auxiliary_variables: aux.allocated(),
    }
}

/// SAT solver wrapper for CaDiCaL
pub struct SatSolver {
    solver: Solver,
    variable_count: usize,
    clause_count: usize,
    /// When set, only these variables are reported back in an assignment
    model_variables: Option<usize>,
    has_empty_clause: bool,
    timeout: Option<Duration>,
    last_result: SolverResultType,
    last_solve_time: Duration,
}

/// A satisfying assignment over the model variables
#[derive(Debug, Clone)]
pub struct SolverSolution {
    pub assignment: HashMap<i32, bool>,
    pub solve_time: Duration,
}

/// Terminal result of a solve call; solver failures are `Err(ModelError::Solver)`
#[derive(Debug, Clone)]
pub enum SolveOutcome {
    Satisfiable(SolverSolution),
    Unsatisfiable,
}

impl SolveOutcome {
    pub fn is_satisfiable(&self) -> bool {
        matches!(self, SolveOutcome::Satisfiable(_))
    }
}

/// Statistics about the solving process
#[derive(Debug, Clone)]
pub struct SolverStatistics {
    pub variable_count: usize,
    pub clause_count: usize,
    pub solve_time: Duration,
    pub result: SolverResultType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverResultType {
    NotSolved,
    Satisfiable,
    Unsatisfiable,
    Interrupted,
}

impl SatSolver {
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            variable_count: 0,
            clause_count: 0,
            model_variables: None,
            has_empty_clause: false,
            timeout: None,
            last_result: SolverResultType::NotSolved,
            last_solve_time: Duration::ZERO,
        }
    }

    /// Set solving timeout; CaDiCaL terminates the search once it elapses
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    pub fn configure(&mut self, options: &SolverOptions) {
        if let Some(timeout) = options.timeout {
            self.set_timeout(timeout);
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
            // the formula is unsatisfiable; remember it instead of feeding CaDiCaL
            self.has_empty_clause = true;
            self.clause_count += 1;
            return Ok(());
        }

        for &literal in &clause.literals {
            if literal == 0 || literal == i32::MIN {
                return Err(ModelError::Solver(format!("invalid literal {} in clause", literal)));
            }
            let var = literal.unsigned_abs() as usize;
            if var > self.variable_count {
                self.variable_count = var;
            }
        }

        self.solver.add_clause(clause.literals.iter().copied());
        self.clause_count += 1;
        Ok(())
    }

    /// Load a compiled formula; only its model variables are reported back
    pub fn add_compiled(&mut self, compiled: &CompiledFormula) -> ModelResult<()> {
        self.add_clauses(&compiled.clauses)?;
        self.model_variables = Some(compiled.model_variables);
        self.variable_count = self.variable_count.max(compiled.model_variables);
        Ok(())
    }

    /// Solve once and return the outcome
    pub fn solve(&mut self) -> ModelResult<SolveOutcome> {
        let start_time = Instant::now();

        if self.has_empty_clause {
            self.record(SolverResultType::Unsatisfiable, start_time.elapsed());
            return Ok(SolveOutcome::Unsatisfiable);
        }

        if let Some(timeout) = self.timeout {
            self.solver.set_callbacks(Some(Timeout::new(timeout.as_secs_f32())));
        }

        info!(
            variables = self.variable_count,
            clauses = self.clause_count,
            "running CaDiCaL"
        );
        let result = self.solver.solve();
        let solve_time = start_time.elapsed();

        match result {
            Some(true) => {
                self.record(SolverResultType::Satisfiable, solve_time);
                let assignment = self.extract_assignment();
                Ok(SolveOutcome::Satisfiable(SolverSolution { assignment, solve_time }))
            }
            Some(false) => {
                self.record(SolverResultType::Unsatisfiable, solve_time);
                Ok(SolveOutcome::Unsatisfiable)
            }
            None => {
                self.record(SolverResultType::Interrupted, solve_time);
                Err(ModelError::Solver(format!(
                    "CaDiCaL stopped without a verdict after {:.3}s (timeout or interruption)",
                    solve_time.as_secs_f64()
                )))
            }
        }
    }

    fn record(&mut self, result: SolverResultType, solve_time: Duration) {
        self.last_result = result;
        self.last_solve_time = solve_time;
    }

    fn extract_assignment(&self) -> HashMap<i32, bool> {
        let reported = self.model_variables.unwrap_or(self.variable_count);
        let mut assignment = HashMap::with_capacity(reported);

        for var in 1..=reported as i32 {
            if let Some(value) = self.solver.value(var) {
                assignment.insert(var, value);
            }
        }

        assignment
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

impl Default for SatSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration options for the SAT solver
#[derive(Debug, Clone, Default)]
pub struct SolverOptions {
    pub timeout: Option<Duration>,
}

impl std::fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Solver Statistics:")?;
        writeln!(f, "  Variables: {}", self.variable_count)?;
        writeln!(f, "  Clauses: {}", self.clause_count)?;
        writeln!(f, "  Solve time: {:.3}s", self.solve_time.as_secs_f64())?;
        writeln!(f, "  Result: {:?}", self.result)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_creation() {
        let solver = SatSolver::new();
        assert_eq!(solver.variable_count(), 0);
        assert_eq!(solver.clause_count(), 0);
        assert_eq!(solver.statistics().result, SolverResultType::NotSolved);
    }

    #[test]
    fn test_simple_satisfiable() {
        let mut solver = SatSolver::new();

        // (x1 ∨ x2) ∧ (¬x1 ∨ x2)
        solver.add_clause(&Clause::new(vec![1, 2])).unwrap();
        solver.add_clause(&Clause::new(vec![-1, 2])).unwrap();

        match solver.solve().unwrap() {
            SolveOutcome::Satisfiable(solution) => {
                assert_eq!(solution.assignment.get(&2), Some(&true));
            }
            SolveOutcome::Unsatisfiable => panic!("expected SAT"),
        }
        assert_eq!(solver.statistics().result, SolverResultType::Satisfiable);
    }

    #[test]
    fn test_unsatisfiable() {
        let mut solver = SatSolver::new();
        solver.add_clause(&Clause::unit(1)).unwrap();
        solver.add_clause(&Clause::unit(-1)).unwrap();

        assert!(!solver.solve().unwrap().is_satisfiable());
    }

    #[test]
    fn test_empty_clause_is_unsatisfiable() {
        let mut solver = SatSolver::new();
        solver.add_clause(&Clause::unit(1)).unwrap();
        solver.add_clause(&Clause::new(vec![])).unwrap();

        assert!(!solver.solve().unwrap().is_satisfiable());
    }

    #[test]
    fn test_invalid_literal_rejected() {
        let mut solver = SatSolver::new();
        assert!(matches!(
            solver.add_clause(&Clause::new(vec![1, 0])),
            Err(ModelError::Solver(_))
        ));
    }

    #[test]
    fn test_variable_count_tracking() {
        let mut solver = SatSolver::new();

        solver.add_clause(&Clause::new(vec![1, -5, 3])).unwrap();
        assert_eq!(solver.variable_count(), 5);

        solver.add_clause(&Clause::new(vec![2, -7])).unwrap();
        assert_eq!(solver.variable_count(), 7);
    }

    #[test]
    fn test_compile_formula() {
        let mut formula = Formula::new(12);
        formula.push(Constraint::implies(&[1, 2], &[3]));
        formula.push(Constraint::at_most((1..=12).collect(), 1));

        let compiled = compile_formula(&formula);
        assert_eq!(compiled.model_variables, 12);
        assert!(compiled.auxiliary_variables > 0);
        assert_eq!(compiled.clauses[0].literals, vec![-1, -2, 3]);
    }

    #[test]
    fn test_auxiliary_variables_stripped() {
        let mut formula = Formula::new(12);
        formula.push(Constraint::at_most((1..=12).collect(), 1));
        formula.push(Constraint::unit(4));

        let compiled = compile_formula(&formula);
        let mut solver = SatSolver::new();
        solver.add_compiled(&compiled).unwrap();

        match solver.solve().unwrap() {
            SolveOutcome::Satisfiable(solution) => {
                assert!(solution.assignment.keys().all(|&var| var <= 12));
                assert_eq!(solution.assignment.get(&4), Some(&true));
                assert!(formula.is_satisfied_by(&solution.assignment));
            }
            SolveOutcome::Unsatisfiable => panic!("expected SAT"),
        }
    }

    #[test]
    fn test_timeout_configuration() {
        let mut solver = SatSolver::new();
        solver.configure(&SolverOptions { timeout: Some(Duration::from_secs(10)) });
        solver.add_clause(&Clause::new(vec![1, 2])).unwrap();

        assert!(solver.solve().unwrap().is_satisfiable());
    }
}
