//! Shared rig for engine integration tests.
//!
//! Every category gets [`GATE_COUNT`] registered tokens, one per gate, so a
//! layout can put the same category on several gates:
//!
//! ```ignore
//! let mut rig = common::Rig::at_level(1);
//! rig.lay_out([LED, RES, LC, E, E, E]).await;
//! let report = rig.press().await;
//! ```

#![allow(dead_code)]

use puzzlebox_core::constants::GATE_COUNT;
use puzzlebox_core::{Category, GateIndex, Level, TokenIdentity};
use puzzlebox_engine::{CycleReport, LevelStateMachine, PuzzleConfig, PuzzleEngine, TimingConfig};
use puzzlebox_hardware::TriggerEvent;
use puzzlebox_hardware::mock::{
    MockBoard, MockBoardHandle, MockGates, MockIndicators, MockIndicatorsHandle, MockNarrator,
    MockNarratorHandle, MockReader, mock_identity,
};

pub const E: Category = Category::Empty;
pub const LS: Category = Category::LineStraight;
pub const LC: Category = Category::LineCorner;
pub const LT: Category = Category::LineTJunction;
pub const LED: Category = Category::LedStraight;
pub const RES: Category = Category::ResistorCorner;
pub const SW: Category = Category::SwitchStraight;
pub const PSW: Category = Category::PushSwitchStraight;
pub const PD: Category = Category::Photodiode;

pub type TestEngine = PuzzleEngine<MockReader, MockGates, MockNarrator, MockIndicators>;

/// Token for `category` meant for gate `slot`.
pub fn token(category: Category, slot: usize) -> TokenIdentity {
    mock_identity(&[0x04, category.code(), slot as u8, 0x5E]).unwrap()
}

/// Configuration registering every category with default timing.
pub fn config() -> PuzzleConfig {
    Category::ALL
        .iter()
        .filter(|category| !category.is_empty())
        .flat_map(|&category| (0..GATE_COUNT).map(move |slot| (category, slot)))
        .fold(PuzzleConfig::default(), |config, (category, slot)| {
            config.with_token(token(category, slot), category)
        })
}

/// Same registry with every delay set to zero.
pub fn instant_config() -> PuzzleConfig {
    config().with_timing(TimingConfig::instant())
}

pub struct Rig {
    pub engine: TestEngine,
    pub board: MockBoardHandle,
    pub audio: MockNarratorHandle,
    pub lights: MockIndicatorsHandle,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_config(config())
    }

    pub fn with_config(config: PuzzleConfig) -> Self {
        Self::build(config, MockNarrator::new())
    }

    /// Rig whose narrator needs `polls` unfinished polls per track.
    pub fn with_track_length(polls: u32) -> Self {
        Self::build(config(), MockNarrator::with_track_length(polls))
    }

    pub fn at_level(raw: u8) -> Self {
        let rig = Self::new();
        rig.resume_at(raw)
    }

    pub fn resume_at(mut self, raw: u8) -> Self {
        let levels = LevelStateMachine::builder()
            .with_initial_level(Level::from_raw(raw))
            .build();
        self.engine = self.engine.with_levels(levels);
        self
    }

    fn build(config: PuzzleConfig, (narrator, audio): (MockNarrator, MockNarratorHandle)) -> Self {
        let (reader, gates, board) = MockBoard::new();
        let (indicators, lights) = MockIndicators::new();
        let engine = PuzzleEngine::new(&config, reader, gates, narrator, indicators).unwrap();

        Self {
            engine,
            board,
            audio,
            lights,
        }
    }

    /// Replace the board contents with `layout`.
    pub async fn lay_out(&self, layout: [Category; GATE_COUNT]) {
        self.board.clear().await;
        for (slot, category) in layout.into_iter().enumerate() {
            if category.is_occupied() {
                self.board
                    .place_token(gate(slot), token(category, slot))
                    .await;
            }
        }
    }

    /// Press the trigger and run the cycle.
    pub async fn press(&mut self) -> CycleReport {
        self.engine
            .on_trigger(TriggerEvent::now())
            .await
            .expect("fresh trigger must run a cycle")
    }

    /// Lay out the board, press, and forget previous narration.
    pub async fn play(&mut self, layout: [Category; GATE_COUNT]) -> CycleReport {
        self.audio.clear_history().await;
        self.lay_out(layout).await;
        self.press().await
    }

    pub fn level(&self) -> u8 {
        self.engine.level().as_u8()
    }
}

pub fn gate(index: usize) -> GateIndex {
    GateIndex::new(index).unwrap()
}
