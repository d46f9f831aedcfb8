//! Configuration management for the capture-line solver

pub mod settings;

pub use settings::{
    Settings, ScenarioConfig, SolverConfig, OutputConfig, OutputFormat, CliOverrides, SolverBackend
};
