//! Board-level constants for the circuit puzzle.
//!
//! This module defines the fixed physical layout of the puzzle board (gate and
//! indicator counts), token identity sizing, scan retry bounds, the table of
//! legal gate topologies, and the default timings used by the feedback
//! sequences. Everything here is immutable configuration: changing a value
//! changes the puzzle the players solve.
//!
//! # Board Layout
//!
//! ```text
//!   gate 0 ── gate 1 ── gate 2
//!      │                  │
//!   gate 3 ── gate 4 ── gate 5
//!
//!   indicators: [0] [1] [2] [3] [4]   (one per cleared stage)
//! ```
//!
//! # Usage
//!
//! ```
//! use puzzlebox_core::constants::*;
//!
//! assert_eq!(GATE_COUNT, 6);
//! assert_eq!(LEGAL_TOPOLOGIES.len(), 15);
//!
//! // Gates 0-2 occupied is a legal circuit
//! assert!(LEGAL_TOPOLOGIES.contains(&0b000111));
//! ```

// ============================================================================
// Board Layout
// ============================================================================

/// Number of physical token slots ("gates") on the board.
///
/// Gate indices `0..GATE_COUNT` map to fixed positions and are significant
/// for topology validation.
pub const GATE_COUNT: usize = 6;

/// Number of stage indicator lights.
///
/// Indicator `n` is lit when stage `n + 1` has been cleared.
pub const INDICATOR_COUNT: usize = 5;

/// Mask with every gate bit set.
pub const ALL_GATES_MASK: u8 = (1 << GATE_COUNT) - 1;

// ============================================================================
// Token Identity
// ============================================================================

/// Stored token identity length in bytes.
///
/// Readers report 4, 7 or 10 byte UIDs (ISO 14443 single, double and triple
/// size). The board compares 7-byte buffers; shorter UIDs are zero-padded.
pub const TOKEN_IDENTITY_LENGTH: usize = 7;

/// Minimum UID length in bytes accepted from a reader.
pub const MIN_UID_LENGTH: usize = 4;

// ============================================================================
// Scanning
// ============================================================================

/// Maximum read attempts per gate before the gate is treated as empty.
pub const MAX_SCAN_ATTEMPTS: usize = 3;

/// Pause after reinitializing the reader, before the first attempt (ms).
pub const DEFAULT_READER_STABILIZE_MS: u64 = 50;

/// Pause between failed read attempts on the same gate (ms).
pub const DEFAULT_SCAN_RETRY_DELAY_MS: u64 = 20;

/// Pause after switching a gate signal, letting the antenna field settle (ms).
pub const DEFAULT_GATE_SETTLE_MS: u64 = 20;

// ============================================================================
// Levels
// ============================================================================

/// Highest playable stage.
pub const FINAL_STAGE: u8 = 5;

/// Raw level value of the completed puzzle.
pub const COMPLETED_LEVEL: u8 = 10;

// ============================================================================
// Topology
// ============================================================================

/// Build an occupancy mask from a gate row (`1` = occupied).
///
/// Bit `n` of the result corresponds to gate `n`.
///
/// # Examples
///
/// ```
/// use puzzlebox_core::constants::occupancy_mask;
///
/// assert_eq!(occupancy_mask([1, 1, 1, 0, 0, 0]), 0b000111);
/// assert_eq!(occupancy_mask([0, 0, 0, 0, 0, 1]), 0b100000);
/// ```
pub const fn occupancy_mask(row: [u8; GATE_COUNT]) -> u8 {
    let mut mask = 0u8;
    let mut gate = 0;
    while gate < GATE_COUNT {
        if row[gate] != 0 {
            mask |= 1 << gate;
        }
        gate += 1;
    }
    mask
}

/// Occupancy patterns that form a closed circuit on the board.
///
/// A snapshot is structurally valid only if its occupancy mask equals one of
/// these rows exactly. Which component sits on a gate is irrelevant here.
pub const LEGAL_TOPOLOGIES: [u8; 15] = [
    occupancy_mask([1, 1, 1, 0, 0, 0]),
    occupancy_mask([0, 0, 0, 1, 1, 1]),
    occupancy_mask([1, 0, 0, 1, 1, 1]),
    occupancy_mask([0, 1, 0, 1, 1, 1]),
    occupancy_mask([0, 0, 1, 1, 1, 1]),
    occupancy_mask([1, 1, 1, 1, 0, 0]),
    occupancy_mask([1, 1, 1, 0, 1, 0]),
    occupancy_mask([1, 1, 1, 0, 0, 1]),
    occupancy_mask([0, 1, 1, 1, 1, 1]),
    occupancy_mask([1, 0, 1, 1, 1, 1]),
    occupancy_mask([1, 1, 0, 1, 1, 1]),
    occupancy_mask([1, 1, 1, 0, 1, 1]),
    occupancy_mask([1, 1, 1, 1, 0, 1]),
    occupancy_mask([1, 1, 1, 1, 1, 0]),
    occupancy_mask([1, 1, 1, 1, 1, 1]),
];

// ============================================================================
// Narration
// ============================================================================

/// Storage folder holding the narration tracks.
pub const NARRATION_FOLDER: u8 = 1;

/// Interval between "playback finished" polls (ms).
pub const DEFAULT_PLAYBACK_POLL_MS: u64 = 10;

/// Longest wait for a single track to finish (ms).
pub const DEFAULT_PLAYBACK_TIMEOUT_MS: u64 = 120_000;

/// Pause between the welcome track and the first briefing (ms).
pub const DEFAULT_INTRO_PAUSE_MS: u64 = 500;

/// Pause between a "stage cleared" track and the next briefing (ms).
pub const DEFAULT_BRIEFING_PAUSE_MS: u64 = 1000;

// ============================================================================
// Light Sequences
// ============================================================================

/// Number of on/off cycles when flickering a stage indicator.
pub const DEFAULT_FLICKER_COUNT: u32 = 3;

/// Half period of an indicator flicker or blink (ms).
pub const DEFAULT_FLICKER_PERIOD_MS: u64 = 500;

/// Delay before the first-stage cascade starts (ms).
///
/// Lets the opening of the "stage cleared" narration play before the lights.
pub const DEFAULT_CASCADE_DELAY_MS: u64 = 5000;

/// Delay between lighting consecutive indicators in the cascade (ms).
pub const DEFAULT_CASCADE_STEP_MS: u64 = 500;

/// Number of all-indicator blinks closing the cascade.
pub const DEFAULT_BLINK_COUNT: u32 = 3;
