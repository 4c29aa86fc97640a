//! puzzlebox - circuit puzzle controller
//!
//! Hosts the puzzle engine on simulated hardware and validates configuration
//! files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use puzzlebox_core::Level;
use puzzlebox_engine::{LevelStateMachine, PuzzleConfig, PuzzleEngine};
use puzzlebox_hardware::mock::{MockBoard, MockIndicators, MockNarrator, MockTrigger};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod bench;

use bench::{Bench, HELP};

/// puzzlebox - circuit puzzle controller
#[derive(Parser, Debug)]
#[command(name = "puzzlebox")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the puzzle configuration file
    #[arg(short, long, global = true, default_value = "puzzlebox.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the puzzle on the simulated board with an interactive bench
    Run {
        /// Resume at this level (0-5, anything else means completed)
        #[arg(long)]
        level: Option<u8>,

        /// Start with verbose per-gate logging
        #[arg(long)]
        diagnostics: bool,
    },

    /// Validate a configuration and print its token registry
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Run { level, diagnostics } => run(&cli.config, level, diagnostics).await,
        Commands::Check => check(&cli.config),
    }
}

fn load(path: &Path) -> Result<PuzzleConfig> {
    PuzzleConfig::from_file(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

async fn run(path: &Path, level: Option<u8>, diagnostics: bool) -> Result<()> {
    let mut config = load(path)?;
    if diagnostics {
        config = config.with_diagnostics(true);
    }
    let registry = config.build_registry()?;

    let (reader, gates, board) = MockBoard::new();
    let (narrator, audio) = MockNarrator::new();
    let (indicators, lights) = MockIndicators::new();
    let (mut trigger, button) = MockTrigger::new();

    let mut engine = PuzzleEngine::new(&config, reader, gates, narrator, indicators)
        .context("failed to create puzzle engine")?;
    if let Some(raw) = level {
        let levels = LevelStateMachine::builder()
            .with_initial_level(Level::from_raw(raw))
            .build();
        engine = engine.with_levels(levels);
    }

    let bench = Bench::new(board, button, audio, lights, registry);
    println!("{HELP}");

    tokio::select! {
        result = engine.run(&mut trigger) => result.context("puzzle engine stopped")?,
        result = bench.run() => result?,
    }

    info!(
        level = %engine.level(),
        transitions = engine.levels().history().len(),
        "bench closed"
    );
    Ok(())
}

fn check(path: &Path) -> Result<()> {
    let config = load(path)?;
    let registry = config.build_registry()?;

    println!("{}: ok", path.display());
    println!(
        "admin keys: {}",
        if config.admin_enabled { "enabled" } else { "disabled" }
    );
    println!("diagnostics: {}", if config.diagnostics { "on" } else { "off" });
    println!("tokens: {}", registry.len());
    for (identity, category) in registry.entries() {
        println!("  {identity}  {category}");
    }
    Ok(())
}
