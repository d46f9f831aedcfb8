//! Factory for creating SAT solver instances based on configuration

use super::formula::{Clause, Formula};
use super::solver::{compile_formula, CompiledFormula, SatSolver, SolveOutcome, SolverOptions, SolverStatistics};
use super::varisat_solver::VarisatSatSolver;
use crate::config::SolverBackend;
use crate::error::ModelResult;
use tracing::debug;

/// Unified SAT solver interface that can use different backends
pub enum UnifiedSatSolver {
    Cadical(SatSolver),
    Varisat(VarisatSatSolver),
}

impl UnifiedSatSolver {
    /// Create a new solver instance based on the specified backend
    pub fn new(backend: SolverBackend) -> Self {
        match backend {
            SolverBackend::Cadical => UnifiedSatSolver::Cadical(SatSolver::new()),
            SolverBackend::Varisat => UnifiedSatSolver::Varisat(VarisatSatSolver::new()),
        }
    }

    pub fn add_clauses(&mut self, clauses: &[Clause]) -> ModelResult<()> {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.add_clauses(clauses),
            UnifiedSatSolver::Varisat(solver) => solver.add_clauses(clauses),
        }
    }

    pub fn add_clause(&mut self, clause: &Clause) -> ModelResult<()> {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.add_clause(clause),
            UnifiedSatSolver::Varisat(solver) => solver.add_clause(clause),
        }
    }

    pub fn solve(&mut self) -> ModelResult<SolveOutcome> {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.solve(),
            UnifiedSatSolver::Varisat(solver) => solver.solve(),
        }
    }

    /// Compile `formula`, load it and solve once; auxiliary variables are
    /// left out of the returned assignment
    pub fn solve_formula(&mut self, formula: &Formula) -> ModelResult<SolveOutcome> {
        self.solve_compiled(&compile_formula(formula))
    }

    /// Load an already compiled formula and solve once
    pub fn solve_compiled(&mut self, compiled: &CompiledFormula) -> ModelResult<SolveOutcome> {
        debug!(
            backend = ?self.backend(),
            clauses = compiled.clauses.len(),
            "loading compiled formula"
        );

        match self {
            UnifiedSatSolver::Cadical(solver) => solver.add_compiled(compiled)?,
            UnifiedSatSolver::Varisat(solver) => solver.add_compiled(compiled)?,
        }
        self.solve()
    }

    pub fn statistics(&self) -> SolverStatistics {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.statistics(),
            UnifiedSatSolver::Varisat(solver) => solver.statistics(),
        }
    }

    pub fn variable_count(&self) -> usize {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.variable_count(),
            UnifiedSatSolver::Varisat(solver) => solver.variable_count(),
        }
    }

    pub fn clause_count(&self) -> usize {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.clause_count(),
            UnifiedSatSolver::Varisat(solver) => solver.clause_count(),
        }
    }

    pub fn configure(&mut self, options: &SolverOptions) {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.configure(options),
            UnifiedSatSolver::Varisat(solver) => solver.configure(options),
        }
    }

    pub fn backend(&self) -> SolverBackend {
        match self {
            UnifiedSatSolver::Cadical(_) => SolverBackend::Cadical,
            UnifiedSatSolver::Varisat(_) => SolverBackend::Varisat,
        }
    }
}

impl Default for UnifiedSatSolver {
    fn default() -> Self {
        UnifiedSatSolver::Cadical(SatSolver::new())
    }
}
