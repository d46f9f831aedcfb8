//! Capture-line problem definition, decoding and validation

pub mod outcome;
pub mod problem;
pub mod projector;
pub mod validator;

pub use outcome::{BallState, CellState, Outcome, Snapshot, Verdict};
pub use problem::CaptureProblem;
pub use projector::ResultProjector;
pub use validator::OutcomeValidator;
