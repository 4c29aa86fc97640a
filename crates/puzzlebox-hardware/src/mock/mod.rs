//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled
//! programmatically without requiring the physical puzzle board.

pub mod board;
pub mod indicators;
pub mod narrator;
pub mod trigger;

// Re-export commonly used types
pub use board::{
    MAX_RELAY_LOG, MockBoard, MockBoardHandle, MockGates, MockReader, ReaderStats, mock_identity,
};
pub use indicators::{MockIndicators, MockIndicatorsHandle};
pub use narrator::{MockNarrator, MockNarratorHandle};
pub use trigger::{MockTrigger, MockTriggerHandle};
