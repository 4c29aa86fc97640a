//! Hardware device abstraction layer for the circuit puzzle board.
//!
//! This crate provides trait-based abstractions for the peripherals the puzzle
//! engine drives: one shared token reader, six gate relays, a serial narrator,
//! five stage indicators and the trigger button. These traits enable easy
//! substitution between mock implementations (for development and testing)
//! and real drivers.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations are asynchronous using native `async fn`
//!   in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Thread-safe**: All traits require `Send + Sync` for use with Tokio.
//! - **Error-aware**: All operations return `Result<T>` with detailed error information.
//!
//! # Device Traits
//!
//! - [`TokenReader`]: wake / select / halt cycle against whichever gate is active.
//! - [`GateActuator`]: connects one gate antenna at a time.
//! - [`Narrator`]: plays numbered tracks and reports completion.
//! - [`IndicatorBank`]: stage lights.
//! - [`TriggerInput`]: debounced button presses.
//!
//! ```no_run
//! use puzzlebox_hardware::mock::MockBoard;
//! use puzzlebox_hardware::traits::{GateActuator, TokenReader};
//! use puzzlebox_core::GateIndex;
//!
//! #[tokio::main]
//! async fn main() -> puzzlebox_hardware::Result<()> {
//!     let (mut reader, mut gates, handle) = MockBoard::new();
//!     let gate = GateIndex::new(0)?;
//!     handle.place_token(gate, "04:A1:B2:C3".parse()?).await;
//!
//!     gates.set_gate_active(gate, true).await?;
//!     reader.reinitialize().await?;
//!     assert!(reader.wake().await?);
//!     let identity = reader.select_and_read_identity().await?;
//!     reader.release_and_stop().await?;
//!     gates.set_gate_active(gate, false).await?;
//!
//!     assert!(identity.is_some());
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] which uses the
//! [`HardwareError`] error type.
//!
//! [`TokenReader`]: traits::TokenReader
//! [`GateActuator`]: traits::GateActuator
//! [`Narrator`]: traits::Narrator
//! [`IndicatorBank`]: traits::IndicatorBank
//! [`TriggerInput`]: traits::TriggerInput

pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use traits::{GateActuator, IndicatorBank, Narrator, TokenReader, TriggerInput};
pub use types::{ReaderInfo, Track, TriggerEvent};
