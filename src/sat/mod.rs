//! SAT solving components for the capture-line model

pub mod cardinality;
pub mod constraints;
pub mod encoder;
pub mod formula;
pub mod solver;
pub mod solver_factory;
pub mod variables;
pub mod varisat_solver;

pub use variables::{FactKey, VariableIndex};
pub use constraints::ConstraintGenerator;
pub use encoder::SatEncoder;
pub use formula::{Clause, Constraint, Formula};
pub use solver::{SatSolver, SolveOutcome, SolverOptions, SolverSolution};
pub use solver_factory::UnifiedSatSolver;
