//! Error types for the capture-line model

use crate::sat::variables::FactKey;
use thiserror::Error;

/// Errors raised while building, solving or decoding the model.
///
/// An unsatisfiable formula is not an error; it is reported as
/// [`crate::sat::SolveOutcome::Unsatisfiable`].
#[derive(Debug, Error)]
pub enum ModelError {
    /// A fact was requested outside the declared position/time/entity domain
    #[error("fact {key:?} is outside the declared domain: {reason}")]
    OutOfDomain { key: FactKey, reason: String },

    /// The SAT engine failed, was interrupted or hit its timeout
    #[error("SAT solver failed: {0}")]
    Solver(String),

    /// The assignment does not match the variable index
    #[error("cannot decode assignment: {0}")]
    Decode(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
