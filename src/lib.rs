//! Capture-line SAT model
//!
//! Decides whether drawing a capture line in a Qix-style territory game costs
//! a life, by compiling the game's discrete-time dynamics into a SAT instance
//! and decoding the satisfying assignment into per-tick snapshots.

pub mod capture;
pub mod config;
pub mod error;
pub mod game;
pub mod sat;
pub mod utils;

pub use capture::{CaptureProblem, Outcome, Verdict};
pub use config::Settings;
pub use error::{ModelError, ModelResult};

use anyhow::Result;

/// Main entry point: model the configured line-drawing action
pub fn simulate(settings: Settings) -> Result<Verdict> {
    let mut problem = CaptureProblem::new(settings)?;
    problem.solve()
}
