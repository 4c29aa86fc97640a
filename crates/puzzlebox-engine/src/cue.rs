//! Narration cues and the tracks that carry them.

use std::fmt;

use puzzlebox_core::Level;
use puzzlebox_hardware::Track;
use serde::{Deserialize, Serialize};

/// Briefing track per stage.
const BRIEFING_TRACKS: [u8; 6] = [3, 6, 10, 14, 18, 22];

/// "Level cleared" track per stage.
const CLEARED_TRACKS: [u8; 6] = [4, 7, 11, 15, 19, 23];

/// Explanation narrated when a level's circuit is recognizably wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureHint {
    /// The circuit has no LED.
    NoLed,
    /// The circuit has no resistor.
    NoResistor,
    /// LED and resistor are present but the switch is missing.
    NoSwitch,
    /// A switch is present without an LED.
    SwitchWithoutLed,
    /// A toggle switch was used where a push switch belongs.
    WrongSwitch,
    /// The push switch is missing.
    NoPushSwitch,
    /// Two LEDs share a single resistor.
    SingleResistor,
    /// Only one LED is present.
    SingleLed,
    /// The light sensor or push button is missing.
    MissingSensorOrButton,
    /// The resistor or T-junction is missing.
    MissingResistorOrJunction,
}

impl FailureHint {
    /// Narration track explaining this failure.
    pub fn track(self) -> Track {
        let file = match self {
            FailureHint::NoLed => 8,
            FailureHint::NoResistor => 9,
            FailureHint::NoSwitch => 12,
            FailureHint::SwitchWithoutLed => 13,
            FailureHint::WrongSwitch => 16,
            FailureHint::NoPushSwitch => 17,
            FailureHint::SingleResistor => 20,
            FailureHint::SingleLed => 21,
            FailureHint::MissingSensorOrButton => 24,
            FailureHint::MissingResistorOrJunction => 25,
        };
        Track::narration(file)
    }
}

impl fmt::Display for FailureHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureHint::NoLed => "no LED",
            FailureHint::NoResistor => "no resistor",
            FailureHint::NoSwitch => "no switch present with LED and resistor",
            FailureHint::SwitchWithoutLed => "switch without LED",
            FailureHint::WrongSwitch => "toggle switch instead of push switch",
            FailureHint::NoPushSwitch => "no push switch",
            FailureHint::SingleResistor => "two LEDs on one resistor",
            FailureHint::SingleLed => "only one LED",
            FailureHint::MissingSensorOrButton => "missing light sensor or push button",
            FailureHint::MissingResistorOrJunction => "missing resistor or T-junction",
        };
        f.write_str(text)
    }
}

/// Something the narrator can say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Greeting played at power-up and after a reset.
    Welcome,
    /// A component not used at this level lies on the board.
    IllegalComponent,
    /// The occupied gates do not form a circuit, or nothing more specific applies.
    IllegalArrangement,
    /// Instructions for a stage.
    Briefing(u8),
    /// Congratulations for clearing a stage.
    LevelCleared(u8),
    /// Explanation of a specific mistake.
    Hint(FailureHint),
    /// Closing narration once every stage is cleared.
    Finale,
}

impl Cue {
    /// Briefing for a level, `None` once completed.
    pub fn briefing_for(level: Level) -> Option<Self> {
        level.stage().map(Cue::Briefing)
    }

    /// Track that carries this cue.
    ///
    /// Returns `None` for briefings or clear cues of a stage that does not
    /// exist.
    pub fn track(self) -> Option<Track> {
        let file = match self {
            Cue::Welcome => 1,
            Cue::IllegalComponent => 2,
            Cue::IllegalArrangement => 5,
            Cue::Briefing(stage) => *BRIEFING_TRACKS.get(usize::from(stage))?,
            Cue::LevelCleared(stage) => *CLEARED_TRACKS.get(usize::from(stage))?,
            Cue::Hint(hint) => return Some(hint.track()),
            Cue::Finale => 26,
        };
        Some(Track::narration(file))
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cue::Welcome => write!(f, "welcome"),
            Cue::IllegalComponent => write!(f, "illegal component"),
            Cue::IllegalArrangement => write!(f, "illegal arrangement"),
            Cue::Briefing(stage) => write!(f, "briefing {stage}"),
            Cue::LevelCleared(stage) => write!(f, "level {stage} cleared"),
            Cue::Hint(hint) => write!(f, "hint: {hint}"),
            Cue::Finale => write!(f, "finale"),
        }
    }
}
