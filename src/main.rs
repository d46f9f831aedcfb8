//! Main CLI application for the capture-line solver

use anyhow::{Context, Result};
use capture_line_sat::{
    capture::{CaptureProblem, Verdict},
    config::{CliOverrides, Settings, SolverBackend},
    game::{create_example_canvases, load_canvas_from_file, Orientation, Position, Scenario},
    utils::{ColorOutput, OutcomeFormatter},
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "capture_line_sat")]
#[command(about = "Decide whether drawing a capture line costs a life, via SAT")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Horizontal,
    Vertical,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Horizontal => Orientation::Horizontal,
            OrientationArg::Vertical => Orientation::Vertical,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Cadical,
    Varisat,
}

impl From<BackendArg> for SolverBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Cadical => SolverBackend::Cadical,
            BackendArg::Varisat => SolverBackend::Varisat,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Model one line-drawing action and report whether it costs a life
    Solve {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Canvas file (overrides config)
        #[arg(long)]
        canvas: Option<PathBuf>,

        /// Line orientation (overrides config)
        #[arg(long, value_enum)]
        orientation: Option<OrientationArg>,

        /// Cursor column (overrides config)
        #[arg(long)]
        cursor_x: Option<usize>,

        /// Cursor row (overrides config)
        #[arg(long)]
        cursor_y: Option<usize>,

        /// SAT backend (overrides config)
        #[arg(long, value_enum)]
        backend: Option<BackendArg>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print every tick of the decoded run
        #[arg(long)]
        show_steps: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Create example configuration and canvas files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Print canvas and encoding statistics without solving
    Analyze {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Canvas file (overrides config)
        #[arg(long)]
        canvas: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Solve { verbose: true, .. });
    init_logging(verbose)?;

    match cli.command {
        Commands::Solve {
            config, canvas, orientation, cursor_x, cursor_y, backend, output,
            show_steps, verbose
        } => {
            let overrides = CliOverrides {
                canvas_file: canvas,
                orientation: orientation.map(Orientation::from),
                cursor_x,
                cursor_y,
                backend: backend.map(SolverBackend::from),
                output_dir: output,
            };
            solve_command(config, overrides, show_steps, verbose)
        }
        Commands::Setup { directory, force } => {
            setup_command(directory, force)
        }
        Commands::Analyze { config, canvas } => {
            analyze_command(config, canvas)
        }
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn load_settings(config_path: &PathBuf) -> Result<Settings> {
    if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))
    } else {
        println!("{}", ColorOutput::warning(&format!(
            "Config file {} not found, using defaults", config_path.display()
        )));
        Ok(Settings::default())
    }
}

fn solve_command(
    config_path: PathBuf,
    overrides: CliOverrides,
    show_steps: bool,
    verbose: bool,
) -> Result<()> {
    println!("{}", ColorOutput::info("Starting capture-line solver"));

    let mut settings = load_settings(&config_path)?;
    settings.merge_with_cli(&overrides);

    if verbose {
        println!("Configuration:");
        println!("  Canvas file: {}", settings.scenario.canvas_file.display());
        println!("  Orientation: {:?}", settings.scenario.orientation);
        println!("  Cursor: ({}, {})", settings.scenario.cursor.x, settings.scenario.cursor.y);
        println!("  Balls: {}", settings.scenario.balls.len());
        println!("  Backend: {:?}", settings.solver.backend);
        println!("  Output dir: {}", settings.output.output_directory.display());
        println!();
    }

    settings.validate()
        .context("Configuration validation failed")?;

    let start_time = Instant::now();
    let mut problem = CaptureProblem::new(settings.clone())
        .context("Failed to create capture problem")?;

    if verbose {
        println!("{}", problem.estimate_complexity());
    }

    println!("{}", ColorOutput::info("Generating SAT constraints and solving..."));
    let verdict = problem.solve()
        .context("Failed to solve capture problem")?;
    let total_time = start_time.elapsed();

    let outcome = match verdict {
        Verdict::NoValidRun => {
            println!("{}", ColorOutput::warning(&format!(
                "No valid run exists for this action ({:.3}s)", total_time.as_secs_f64()
            )));
            return Ok(());
        }
        Verdict::Simulated(outcome) => outcome,
    };

    if outcome.life_lost {
        println!("{}", ColorOutput::error(&format!(
            "Drawing this line costs a life (solved in {:.3}s)", total_time.as_secs_f64()
        )));
    } else {
        println!("{}", ColorOutput::success(&format!(
            "Drawing this line is safe (solved in {:.3}s)", total_time.as_secs_f64()
        )));
    }

    println!("\n{}", OutcomeFormatter::format_outcome(&outcome, show_steps));

    let saved = OutcomeFormatter::save_outcome(&outcome, &settings.output.output_directory, settings.output.format)
        .context("Failed to save outcome")?;
    println!("{}", ColorOutput::success(&format!("Outcome saved to {}", saved.display())));

    if verbose {
        if let Some(stats) = problem.encoding_statistics() {
            println!("\n{}", stats);
        }
    }

    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let input_dir = directory.join("input/canvases");
    let output_dir = directory.join("output/runs");

    for dir in [&config_dir, &input_dir, &output_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default().to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    create_example_canvases(&input_dir)
        .context("Failed to create example canvases")?;
    println!("Created example canvases in: {}", input_dir.display());

    let variants_dir = config_dir.join("variants");
    std::fs::create_dir_all(&variants_dir)?;

    let mut open = Settings::default();
    open.scenario.canvas_file = PathBuf::from("input/canvases/open_5x5.txt");
    open.scenario.cursor = Position::new(2, 2);
    open.scenario.balls.clear();
    open.to_file(&variants_dir.join("open.yaml"))?;

    let mut island = Settings::default();
    island.scenario.canvas_file = PathBuf::from("input/canvases/island.txt");
    island.scenario.orientation = Orientation::Vertical;
    island.scenario.cursor = Position::new(3, 4);
    island.scenario.balls = vec![capture_line_sat::game::Ball::new(8, 2, -1, 1)];
    island.to_file(&variants_dir.join("island.yaml"))?;

    println!("Created example configurations in: {}", variants_dir.display());

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Draw your own canvases in {}", input_dir.display());
    println!("3. Run: cargo run -- solve --config config/default.yaml");

    Ok(())
}

fn analyze_command(config_path: PathBuf, canvas_override: Option<PathBuf>) -> Result<()> {
    println!("{}", ColorOutput::info("Analyzing scenario..."));

    let mut settings = load_settings(&config_path)?;
    if let Some(canvas_file) = canvas_override {
        settings.scenario.canvas_file = canvas_file;
    }

    let canvas = load_canvas_from_file(&settings.scenario.canvas_file)
        .with_context(|| format!("Failed to load canvas from {}", settings.scenario.canvas_file.display()))?;

    println!("Canvas ({}x{}):", canvas.width, canvas.height);
    println!("{}", canvas);
    println!("Canvas Statistics:");
    println!("  Captured cells: {}", canvas.captured_count());
    println!("  Captured ratio: {:.1}%", canvas.captured_ratio() * 100.0);

    let scenario = Scenario::new(
        canvas,
        settings.scenario.orientation,
        settings.scenario.cursor,
        settings.scenario.balls.clone(),
    );
    let problem = CaptureProblem::with_scenario(settings, scenario);

    println!("\n{}", problem.estimate_complexity());
    println!("{}", problem.analyze()?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "capture_line_sat",
            "solve",
            "--config", "test.yaml",
            "--orientation", "vertical",
            "--cursor-x", "3",
            "--backend", "varisat",
        ]);

        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_rejects_unknown_orientation() {
        let cli = Cli::try_parse_from([
            "capture_line_sat",
            "solve",
            "--orientation", "diagonal",
        ]);

        assert!(cli.is_err());
    }

    #[test]
    fn test_setup_command() {
        let temp_dir = tempdir().unwrap();
        let result = setup_command(temp_dir.path().to_path_buf(), false);

        assert!(result.is_ok());
        assert!(temp_dir.path().join("config/default.yaml").exists());
        assert!(temp_dir.path().join("config/variants/island.yaml").exists());
        assert!(temp_dir.path().join("input/canvases/bordered.txt").exists());
    }
}
