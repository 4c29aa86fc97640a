//! Mock token reader and gate relays for testing and development.
//!
//! The physical board routes one reader through six relay-switched antennas.
//! [`MockBoard`] reproduces that wiring: the reader only sees the token on
//! the gate that is currently active, and sees nothing when zero or several
//! gates are active (adjacent fields cross-talk).

use crate::{
    HardwareError, Result,
    traits::{GateActuator, TokenReader},
    types::ReaderInfo,
};
use puzzlebox_core::constants::GATE_COUNT;
use puzzlebox_core::{GateIndex, TokenIdentity};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Relay changes kept by the board, enough for several full scans.
pub const MAX_RELAY_LOG: usize = 120;

/// Operation counters recorded by the mock reader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Calls to `reinitialize`.
    pub reinitializations: u32,

    /// Calls to `wake`.
    pub wakes: u32,

    /// Calls to `select_and_read_identity`.
    pub reads: u32,

    /// Calls to `release_and_stop`.
    pub releases: u32,
}

/// Shared state of the simulated board.
#[derive(Debug, Default)]
struct BoardState {
    /// Token lying on each gate.
    tokens: [Option<TokenIdentity>; GATE_COUNT],

    /// Relay state of each gate.
    active: [bool; GATE_COUNT],

    /// Remaining failed wakes to inject per gate.
    flaky_wakes: [u32; GATE_COUNT],

    /// Token woken by the last successful `wake`.
    woken: Option<TokenIdentity>,

    /// Latest relay changes, oldest first.
    relay_log: VecDeque<(GateIndex, bool)>,

    /// Peak number of simultaneously active gates.
    max_active: usize,

    stats: ReaderStats,
}

impl BoardState {
    fn active_gates(&self) -> Vec<usize> {
        (0..GATE_COUNT).filter(|&i| self.active[i]).collect()
    }
}

/// Factory for the mock reader, relays and control handle.
///
/// # Examples
///
/// ```
/// use puzzlebox_hardware::mock::MockBoard;
/// use puzzlebox_core::GateIndex;
///
/// #[tokio::main]
/// async fn main() {
///     let (_reader, _gates, handle) = MockBoard::new();
///     let gate = GateIndex::new(2).unwrap();
///     handle.place_token(gate, "04:11:22:33".parse().unwrap()).await;
///     assert!(handle.token_at(gate).await.is_some());
/// }
/// ```
pub struct MockBoard;

impl MockBoard {
    /// Create a reader, relay bank and handle sharing one simulated board.
    pub fn new() -> (MockReader, MockGates, MockBoardHandle) {
        Self::with_name("Mock Token Reader".to_string())
    }

    /// Create a simulated board with a custom reader name.
    pub fn with_name(name: String) -> (MockReader, MockGates, MockBoardHandle) {
        let state = Arc::new(Mutex::new(BoardState::default()));

        let reader = MockReader {
            state: Arc::clone(&state),
            name,
        };
        let gates = MockGates {
            state: Arc::clone(&state),
        };
        let handle = MockBoardHandle { state };

        (reader, gates, handle)
    }
}

/// Mock token reader.
///
/// Reads the token on the single active gate.
#[derive(Debug)]
pub struct MockReader {
    state: Arc<Mutex<BoardState>>,

    /// Device name
    name: String,
}

impl TokenReader for MockReader {
    async fn reinitialize(&mut self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.stats.reinitializations += 1;
        state.woken = None;
        Ok(())
    }

    async fn wake(&mut self) -> Result<bool> {
        let mut state = self.state.lock().await;
        state.stats.wakes += 1;
        state.woken = None;

        let active = state.active_gates();
        let [gate] = active[..] else {
            return Ok(false);
        };

        if state.flaky_wakes[gate] > 0 {
            state.flaky_wakes[gate] -= 1;
            return Ok(false);
        }

        state.woken = state.tokens[gate];
        Ok(state.woken.is_some())
    }

    async fn select_and_read_identity(&mut self) -> Result<Option<TokenIdentity>> {
        let mut state = self.state.lock().await;
        state.stats.reads += 1;
        Ok(state.woken)
    }

    async fn release_and_stop(&mut self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.stats.releases += 1;
        state.woken = None;
        Ok(())
    }

    async fn reader_info(&self) -> Result<ReaderInfo> {
        Ok(
            ReaderInfo::new(self.name.clone(), vec!["ISO14443A".to_string()])
                .with_firmware_version("mock-1.0"),
        )
    }
}

/// Mock gate relay bank.
#[derive(Debug)]
pub struct MockGates {
    state: Arc<Mutex<BoardState>>,
}

impl GateActuator for MockGates {
    async fn set_gate_active(&mut self, gate: GateIndex, active: bool) -> Result<()> {
        let mut state = self.state.lock().await;
        state.active[gate.as_usize()] = active;
        state.relay_log.push_back((gate, active));
        if state.relay_log.len() > MAX_RELAY_LOG {
            state.relay_log.pop_front();
        }
        let count = state.active_gates().len();
        state.max_active = state.max_active.max(count);
        Ok(())
    }
}

/// Handle for placing tokens on the simulated board and inspecting it.
#[derive(Debug, Clone)]
pub struct MockBoardHandle {
    state: Arc<Mutex<BoardState>>,
}

impl MockBoardHandle {
    /// Place a token on a gate, replacing any token already there.
    pub async fn place_token(&self, gate: GateIndex, identity: TokenIdentity) {
        self.state.lock().await.tokens[gate.as_usize()] = Some(identity);
    }

    /// Remove the token from a gate.
    pub async fn remove_token(&self, gate: GateIndex) {
        self.state.lock().await.tokens[gate.as_usize()] = None;
    }

    /// Remove every token from the board.
    pub async fn clear(&self) {
        self.state.lock().await.tokens = [None; GATE_COUNT];
    }

    /// Token currently lying on a gate.
    pub async fn token_at(&self, gate: GateIndex) -> Option<TokenIdentity> {
        self.state.lock().await.tokens[gate.as_usize()]
    }

    /// Make the next `count` wakes on a gate fail.
    pub async fn inject_failed_wakes(&self, gate: GateIndex, count: u32) {
        self.state.lock().await.flaky_wakes[gate.as_usize()] = count;
    }

    /// Current relay state of a gate.
    pub async fn is_gate_active(&self, gate: GateIndex) -> bool {
        self.state.lock().await.active[gate.as_usize()]
    }

    /// The last [`MAX_RELAY_LOG`] relay changes, oldest first.
    pub async fn relay_log(&self) -> Vec<(GateIndex, bool)> {
        self.state.lock().await.relay_log.iter().copied().collect()
    }

    /// Peak number of gates that were active at the same time.
    pub async fn max_simultaneously_active(&self) -> usize {
        self.state.lock().await.max_active
    }

    /// Reader operation counters.
    pub async fn reader_stats(&self) -> ReaderStats {
        self.state.lock().await.stats
    }

    /// Reset relay log and reader counters.
    pub async fn reset_log(&self) {
        let mut state = self.state.lock().await;
        state.relay_log.clear();
        state.max_active = 0;
        state.stats = ReaderStats::default();
    }
}

impl Default for MockReader {
    fn default() -> Self {
        MockBoard::new().0
    }
}

/// Build an identity for mock tokens from a short tag.
///
/// # Errors
///
/// Returns an error if the tag cannot form a valid UID.
pub fn mock_identity(tag: &[u8]) -> Result<TokenIdentity> {
    TokenIdentity::from_uid(tag).map_err(HardwareError::from)
}
