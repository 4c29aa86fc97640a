//! Level progression state machine.
//!
//! The machine holds the current [`Level`] and a bounded history of changes.
//! Only three things move the level:
//!
//! - an [`Verdict::Advance`] from the rule engine (`n → n+1`, `5 → completed`),
//! - the admin overrides ([`reset`](LevelStateMachine::reset),
//!   [`step_back`](LevelStateMachine::step_back),
//!   [`force_advance`](LevelStateMachine::force_advance)),
//! - restoring a machine through [`LevelStateMachine::builder`].
//!
//! Failures of any kind leave the level untouched.
//!
//! # Examples
//!
//! ```
//! use puzzlebox_core::Level;
//! use puzzlebox_engine::{LevelStateMachine, Verdict};
//!
//! let mut machine = LevelStateMachine::new();
//! assert!(machine.apply_verdict(Verdict::GenericFailure).is_none());
//!
//! let transition = machine.apply_verdict(Verdict::Advance).unwrap();
//! assert_eq!(transition.to, Level::from_raw(1));
//! assert_eq!(machine.current(), Level::from_raw(1));
//! ```

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use puzzlebox_core::Level;
use serde::{Deserialize, Serialize};

use crate::rules::Verdict;

/// Maximum number of level changes kept in history.
const MAX_HISTORY_SIZE: usize = 100;

/// Why the level changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    /// The rule engine accepted the circuit.
    Advance,
    /// Admin key C.
    ForceAdvance,
    /// Admin key B.
    StepBack,
    /// Admin key A.
    Reset,
}

impl fmt::Display for TransitionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TransitionCause::Advance => "advance",
            TransitionCause::ForceAdvance => "force advance",
            TransitionCause::StepBack => "step back",
            TransitionCause::Reset => "reset",
        };
        f.write_str(text)
    }
}

/// A single level change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTransition {
    /// Level before the change.
    pub from: Level,

    /// Level after the change.
    pub to: Level,

    /// What caused it.
    pub cause: TransitionCause,

    /// When it happened.
    pub at: DateTime<Utc>,
}

impl LevelTransition {
    /// Record a change happening now.
    pub fn new(from: Level, to: Level, cause: TransitionCause) -> Self {
        Self {
            from,
            to,
            cause,
            at: Utc::now(),
        }
    }
}

impl fmt::Display for LevelTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.from, self.to, self.cause)
    }
}

/// Current puzzle level with its change history.
#[derive(Debug, Clone)]
pub struct LevelStateMachine {
    current: Level,
    history: VecDeque<LevelTransition>,
}

impl LevelStateMachine {
    /// Machine at the first stage with empty history.
    pub fn new() -> Self {
        Self {
            current: Level::START,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    /// Builder for restoring a machine at a given level.
    ///
    /// ```
    /// use puzzlebox_core::Level;
    /// use puzzlebox_engine::LevelStateMachine;
    ///
    /// let machine = LevelStateMachine::builder()
    ///     .with_initial_level(Level::from_raw(3))
    ///     .build();
    /// assert_eq!(machine.current(), Level::from_raw(3));
    /// ```
    pub fn builder() -> LevelStateMachineBuilder {
        LevelStateMachineBuilder::default()
    }

    /// Current level.
    #[inline]
    pub fn current(&self) -> Level {
        self.current
    }

    /// Recorded changes, oldest first.
    pub fn history(&self) -> &VecDeque<LevelTransition> {
        &self.history
    }

    /// The last `count` changes, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<LevelTransition> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).cloned().collect()
    }

    /// Apply a rule verdict.
    ///
    /// Only [`Verdict::Advance`] changes the level.
    pub fn apply_verdict(&mut self, verdict: Verdict) -> Option<LevelTransition> {
        if !verdict.is_advance() {
            return None;
        }
        self.move_forward(TransitionCause::Advance)
    }

    /// Clear the current stage regardless of the board. No-op once completed.
    pub fn force_advance(&mut self) -> Option<LevelTransition> {
        self.move_forward(TransitionCause::ForceAdvance)
    }

    /// Go back one stage, staying at the first stage.
    ///
    /// Returns `None` when the level does not change, which includes the
    /// completed state.
    pub fn step_back(&mut self) -> Option<LevelTransition> {
        let target = self.current.previous();
        (target != self.current).then(|| self.change(target, TransitionCause::StepBack))
    }

    /// Return to the first stage. Always recorded, even from the first stage.
    pub fn reset(&mut self) -> LevelTransition {
        self.change(Level::START, TransitionCause::Reset)
    }

    fn move_forward(&mut self, cause: TransitionCause) -> Option<LevelTransition> {
        if self.current.is_completed() {
            return None;
        }
        Some(self.change(self.current.next(), cause))
    }

    fn change(&mut self, to: Level, cause: TransitionCause) -> LevelTransition {
        let transition = LevelTransition::new(self.current, to, cause);
        self.current = to;
        self.add_to_history(transition.clone());
        transition
    }

    fn add_to_history(&mut self, transition: LevelTransition) {
        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for LevelStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`LevelStateMachine`].
#[derive(Debug, Default)]
pub struct LevelStateMachineBuilder {
    initial_level: Level,
    history: VecDeque<LevelTransition>,
}

impl LevelStateMachineBuilder {
    /// Start at this level. Out-of-range values are already normalized by
    /// [`Level`].
    pub fn with_initial_level(mut self, level: Level) -> Self {
        self.initial_level = level;
        self
    }

    /// Pre-populate history; only the newest entries that fit are kept.
    pub fn with_history(mut self, history: VecDeque<LevelTransition>) -> Self {
        self.history = history;
        self
    }

    /// Build the machine.
    pub fn build(mut self) -> LevelStateMachine {
        while self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        LevelStateMachine {
            current: self.initial_level,
            history: self.history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::FailureHint;
    use rstest::rstest;

    fn at(raw: u8) -> LevelStateMachine {
        LevelStateMachine::builder()
            .with_initial_level(Level::from_raw(raw))
            .build()
    }

    #[test]
    fn test_new_machine_starts_at_first_stage() {
        let machine = LevelStateMachine::new();
        assert_eq!(machine.current(), Level::START);
        assert!(machine.history().is_empty());
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 2)]
    #[case(4, 5)]
    #[case(5, 10)]
    fn test_advance(#[case] from: u8, #[case] to: u8) {
        let mut machine = at(from);
        let transition = machine.apply_verdict(Verdict::Advance).unwrap();

        assert_eq!(transition.from, Level::from_raw(from));
        assert_eq!(transition.to, Level::from_raw(to));
        assert_eq!(transition.cause, TransitionCause::Advance);
        assert_eq!(machine.current().as_u8(), to);
    }

    #[rstest]
    #[case(Verdict::IllegalTopology)]
    #[case(Verdict::IllegalComponent)]
    #[case(Verdict::NarratedFailure(FailureHint::NoLed))]
    #[case(Verdict::GenericFailure)]
    #[case(Verdict::PuzzleComplete)]
    fn test_failures_keep_level(#[case] verdict: Verdict) {
        let mut machine = at(2);
        assert!(machine.apply_verdict(verdict).is_none());
        assert_eq!(machine.current(), Level::from_raw(2));
        assert!(machine.history().is_empty());
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut machine = at(10);
        assert!(machine.apply_verdict(Verdict::Advance).is_none());
        assert!(machine.force_advance().is_none());
        assert!(machine.current().is_completed());
    }

    #[rstest]
    #[case(3, Some(2))]
    #[case(1, Some(0))]
    #[case(0, None)]
    #[case(10, None)]
    fn test_step_back(#[case] from: u8, #[case] expected: Option<u8>) {
        let mut machine = at(from);
        let transition = machine.step_back();

        assert_eq!(transition.map(|t| t.to.as_u8()), expected);
        assert_eq!(machine.current().as_u8(), expected.unwrap_or(from));
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(10)]
    fn test_reset(#[case] from: u8) {
        let mut machine = at(from);
        let transition = machine.reset();

        assert_eq!(transition.cause, TransitionCause::Reset);
        assert_eq!(machine.current(), Level::START);
        assert_eq!(machine.history().len(), 1);
    }

    #[test]
    fn test_force_advance_cause() {
        let mut machine = at(2);
        let transition = machine.force_advance().unwrap();
        assert_eq!(transition.cause, TransitionCause::ForceAdvance);
        assert_eq!(machine.current(), Level::from_raw(3));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut machine = LevelStateMachine::new();
        for _ in 0..(MAX_HISTORY_SIZE + 20) {
            machine.force_advance();
            machine.reset();
        }
        assert_eq!(machine.history().len(), MAX_HISTORY_SIZE);
        assert_eq!(
            machine.history().back().map(|t| t.cause),
            Some(TransitionCause::Reset)
        );
    }

    #[test]
    fn test_last_transitions() {
        let mut machine = LevelStateMachine::new();
        machine.apply_verdict(Verdict::Advance);
        machine.apply_verdict(Verdict::Advance);
        machine.step_back();

        let last = machine.last_transitions(2);
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].cause, TransitionCause::Advance);
        assert_eq!(last[1].cause, TransitionCause::StepBack);
        assert_eq!(machine.last_transitions(10).len(), 3);
    }

    #[test]
    fn test_builder_trims_history() {
        let history: VecDeque<_> = (0..150)
            .map(|_| LevelTransition::new(Level::START, Level::from_raw(1), TransitionCause::Advance))
            .collect();
        let machine = LevelStateMachine::builder().with_history(history).build();
        assert_eq!(machine.history().len(), MAX_HISTORY_SIZE);
    }

    #[test]
    fn test_transition_serialization() {
        let transition =
            LevelTransition::new(Level::from_raw(5), Level::COMPLETED, TransitionCause::Advance);
        let json = serde_json::to_string(&transition).unwrap();
        let back: LevelTransition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, transition);
        assert_eq!(transition.to_string(), "level 5 -> completed (advance)");
    }
}
