//! Gate scan and puzzle validation engine.
//!
//! Players build a circuit by dropping tokens on six gates and press a
//! trigger to have it checked. Each press runs one cycle:
//!
//! - [`GateScanner`] reads every gate through the shared reader and maps the
//!   identities found to categories with the [`CategoryRegistry`];
//! - [`CategoryTally`] counts the snapshot per component group;
//! - [`evaluate`] applies the topology check, the level's allowed set and its
//!   ordered rules to produce a [`Verdict`];
//! - [`LevelStateMachine`] moves to the next stage on [`Verdict::Advance`];
//! - [`FeedbackDispatcher`] narrates the result and drives the stage lights.
//!
//! Admin keys on the board bypass the rules and run an [`AdminCommand`]
//! instead. [`PuzzleEngine`] ties all of it together.
//!
//! # Example
//!
//! ```no_run
//! use puzzlebox_engine::{PuzzleConfig, PuzzleEngine};
//! use puzzlebox_hardware::mock::{MockBoard, MockIndicators, MockNarrator, MockTrigger};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PuzzleConfig::from_file("puzzlebox.toml".as_ref())?;
//!     let (reader, gates, _board) = MockBoard::new();
//!     let (narrator, _audio) = MockNarrator::new();
//!     let (indicators, _lights) = MockIndicators::new();
//!     let (mut trigger, _button) = MockTrigger::new();
//!
//!     let mut engine = PuzzleEngine::new(&config, reader, gates, narrator, indicators)?;
//!     engine.run(&mut trigger).await?;
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod config;
pub mod cue;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod level;
pub mod registry;
pub mod rules;
pub mod scanner;
pub mod tally;
pub mod topology;

pub use admin::{AdminCommand, admin_commands};
pub use config::{PuzzleConfig, TimingConfig, TokenEntry};
pub use cue::{Cue, FailureHint};
pub use engine::{CycleOutcome, CycleReport, PuzzleEngine, format_uptime};
pub use error::{ConfigError, EngineError, Result};
pub use feedback::{FeedbackDispatcher, FeedbackTiming};
pub use level::{LevelStateMachine, LevelStateMachineBuilder, LevelTransition, TransitionCause};
pub use registry::CategoryRegistry;
pub use rules::{
    Count, LEVEL_RULES, LevelRules, Outcome, Predicate, Rule, Verdict, evaluate, failure_hint,
    rules_for,
};
pub use scanner::{GateScanner, ScanTiming};
pub use tally::CategoryTally;
pub use topology::is_legal_topology;
