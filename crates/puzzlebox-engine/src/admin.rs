//! Operator override keys.
//!
//! Admin keys are ordinary tokens registered under the reserved
//! `admin_key_*` categories. When any of them lies on the board the cycle is
//! handled here instead of by the level rules.

use std::fmt;

use puzzlebox_core::{Category, GateIndex, GateSnapshot, Level};
use serde::{Deserialize, Serialize};

use crate::cue::Cue;
use crate::rules::failure_hint;

/// Action bound to an admin key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminCommand {
    /// Key A: back to the first stage, indicators off, greeting replayed.
    Reset,
    /// Key B: one stage back.
    StepBack,
    /// Key C: clear the current stage with full advance feedback.
    ForceAdvance,
    /// Keys D, E, F: replay the 1st, 2nd or 3rd failure cue of the level.
    ReplayHint(u8),
    /// Key G: play the illegal component cue.
    PlayFallback,
    /// Key H: replay the current stage briefing.
    ReplayBriefing,
    /// Key J: toggle verbose diagnostics.
    ToggleDiagnostics,
    /// Key I: recognized but bound to nothing.
    Unassigned,
}

impl AdminCommand {
    /// Command bound to an admin key category.
    ///
    /// Returns `None` for component categories and [`Category::Empty`].
    pub fn from_category(category: Category) -> Option<Self> {
        let command = match category {
            Category::AdminKeyA => AdminCommand::Reset,
            Category::AdminKeyB => AdminCommand::StepBack,
            Category::AdminKeyC => AdminCommand::ForceAdvance,
            Category::AdminKeyD => AdminCommand::ReplayHint(1),
            Category::AdminKeyE => AdminCommand::ReplayHint(2),
            Category::AdminKeyF => AdminCommand::ReplayHint(3),
            Category::AdminKeyG => AdminCommand::PlayFallback,
            Category::AdminKeyH => AdminCommand::ReplayBriefing,
            Category::AdminKeyI => AdminCommand::Unassigned,
            Category::AdminKeyJ => AdminCommand::ToggleDiagnostics,
            _ => return None,
        };
        Some(command)
    }

    /// Returns `true` if this command replaces normal rule evaluation.
    pub fn is_override(self) -> bool {
        !matches!(self, AdminCommand::Unassigned)
    }

    /// Narration a replay command plays at a level.
    ///
    /// `None` when the command does not narrate or the level has no such cue.
    pub fn replay_cue(self, level: Level) -> Option<Cue> {
        match self {
            AdminCommand::ReplayHint(1) if level == Level::START => Some(Cue::IllegalArrangement),
            AdminCommand::ReplayHint(ordinal) => {
                failure_hint(level, usize::from(ordinal)).map(Cue::Hint)
            }
            AdminCommand::PlayFallback => Some(Cue::IllegalComponent),
            AdminCommand::ReplayBriefing => Cue::briefing_for(level),
            _ => None,
        }
    }
}

impl fmt::Display for AdminCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminCommand::Reset => write!(f, "reset"),
            AdminCommand::StepBack => write!(f, "step back"),
            AdminCommand::ForceAdvance => write!(f, "force advance"),
            AdminCommand::ReplayHint(ordinal) => write!(f, "replay hint {ordinal}"),
            AdminCommand::PlayFallback => write!(f, "fallback cue"),
            AdminCommand::ReplayBriefing => write!(f, "replay briefing"),
            AdminCommand::ToggleDiagnostics => write!(f, "toggle diagnostics"),
            AdminCommand::Unassigned => write!(f, "unassigned"),
        }
    }
}

/// Admin commands present in a snapshot, in gate order.
pub fn admin_commands(snapshot: &GateSnapshot) -> Vec<(GateIndex, AdminCommand)> {
    snapshot
        .admin_keys()
        .filter_map(|(gate, category)| AdminCommand::from_category(category).map(|c| (gate, c)))
        .collect()
}
