//! Level acceptance rules.
//!
//! Each level has a set of allowed categories and an ordered list of rules
//! over the [`CategoryTally`]. Evaluation is a pure function of
//! `(level, snapshot, tally)`:
//!
//! 1. An occupancy pattern outside the legal topologies yields
//!    [`Verdict::IllegalTopology`] at any level.
//! 2. At [`Level::COMPLETED`] nothing else applies: [`Verdict::PuzzleComplete`].
//! 3. Any occupied gate holding a category the level does not allow yields
//!    [`Verdict::IllegalComponent`].
//! 4. The level's rules are tried in order and the first match wins. The first
//!    rule of every level is the advance rule; the rest name a
//!    [`FailureHint`]. No match yields [`Verdict::GenericFailure`].
//!
//! Rule order is significant and some rules overlap on purpose: a tally that
//! matches an earlier rule never reaches a later one.

use std::fmt;

use puzzlebox_core::{Category, CategoryGroup, GateSnapshot, Level};
use serde::{Deserialize, Serialize};

use crate::cue::FailureHint;
use crate::tally::CategoryTally;
use crate::topology::is_legal_topology;

/// Result of evaluating one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The occupied gates do not form a circuit.
    IllegalTopology,
    /// A component not used at this level is on the board.
    IllegalComponent,
    /// The level is solved.
    Advance,
    /// A recognizable mistake with its own explanation.
    NarratedFailure(FailureHint),
    /// Wrong, but no rule describes how.
    GenericFailure,
    /// Every stage is already cleared.
    PuzzleComplete,
}

impl Verdict {
    /// Returns `true` only for [`Verdict::Advance`].
    #[inline]
    pub fn is_advance(self) -> bool {
        matches!(self, Verdict::Advance)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::IllegalTopology => write!(f, "illegal topology"),
            Verdict::IllegalComponent => write!(f, "illegal component"),
            Verdict::Advance => write!(f, "advance"),
            Verdict::NarratedFailure(hint) => write!(f, "failure ({hint})"),
            Verdict::GenericFailure => write!(f, "generic failure"),
            Verdict::PuzzleComplete => write!(f, "puzzle complete"),
        }
    }
}

/// Exact count of one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Count(pub CategoryGroup, pub u8);

impl Count {
    fn holds(&self, tally: &CategoryTally) -> bool {
        tally.get(self.0) == self.1
    }
}

/// Condition over a tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Every count holds. An empty list always matches.
    All(&'static [Count]),
    /// At least one count holds.
    Any(&'static [Count]),
}

impl Predicate {
    /// Returns `true` if the tally satisfies this predicate.
    pub fn matches(&self, tally: &CategoryTally) -> bool {
        match self {
            Predicate::All(counts) => counts.iter().all(|c| c.holds(tally)),
            Predicate::Any(counts) => counts.iter().any(|c| c.holds(tally)),
        }
    }
}

/// What a matching rule means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Advance,
    Hint(FailureHint),
}

/// One row of a level's rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub predicate: Predicate,
    pub outcome: Outcome,
}

/// Allowed categories and ordered rules of one stage.
#[derive(Debug, Clone, Copy)]
pub struct LevelRules {
    pub allowed: &'static [Category],
    pub rules: &'static [Rule],
}

impl LevelRules {
    /// Returns `true` if the category may be placed at this level.
    ///
    /// Empty gates are always allowed.
    pub fn allows(&self, category: Category) -> bool {
        category.is_empty() || self.allowed.contains(&category)
    }

    /// Hints this level can narrate, in rule order.
    pub fn hints(&self) -> impl Iterator<Item = FailureHint> + '_ {
        self.rules.iter().filter_map(|rule| match rule.outcome {
            Outcome::Hint(hint) => Some(hint),
            Outcome::Advance => None,
        })
    }
}

use CategoryGroup::{Led, Photodiode, PushSwitch, Resistor, Switch, TJunction};

const LINES: &[Category] = &[
    Category::LineStraight,
    Category::LineCorner,
    Category::LineTJunction,
];

const LEVEL_1_ALLOWED: &[Category] = &[
    Category::LineStraight,
    Category::LineCorner,
    Category::LineTJunction,
    Category::LedStraight,
    Category::LedCornerRight,
    Category::LedCornerLeft,
    Category::ResistorStraight,
    Category::ResistorCorner,
];

const LEVEL_2_ALLOWED: &[Category] = &[
    Category::LineStraight,
    Category::LineCorner,
    Category::LineTJunction,
    Category::LedStraight,
    Category::LedCornerRight,
    Category::LedCornerLeft,
    Category::ResistorStraight,
    Category::ResistorCorner,
    Category::SwitchStraight,
    Category::SwitchCorner,
];

const LEVEL_3_ALLOWED: &[Category] = &[
    Category::LineStraight,
    Category::LineCorner,
    Category::LineTJunction,
    Category::LedStraight,
    Category::LedCornerRight,
    Category::LedCornerLeft,
    Category::ResistorStraight,
    Category::ResistorCorner,
    Category::PushSwitchStraight,
    Category::PushSwitchCorner,
];

const LEVEL_5_ALLOWED: &[Category] = &[
    Category::LineStraight,
    Category::LineCorner,
    Category::LineTJunction,
    Category::LedStraight,
    Category::LedCornerRight,
    Category::LedCornerLeft,
    Category::ResistorStraight,
    Category::ResistorCorner,
    Category::SwitchStraight,
    Category::SwitchCorner,
    Category::PushSwitchStraight,
    Category::PushSwitchCorner,
    Category::Photodiode,
];

const fn advance(predicate: Predicate) -> Rule {
    Rule {
        predicate,
        outcome: Outcome::Advance,
    }
}

const fn hint(predicate: Predicate, hint: FailureHint) -> Rule {
    Rule {
        predicate,
        outcome: Outcome::Hint(hint),
    }
}

/// Rule tables for stages 0 through 5.
pub static LEVEL_RULES: [LevelRules; 6] = [
    // Any legal arrangement of plain lines clears the first stage.
    LevelRules {
        allowed: LINES,
        rules: &[advance(Predicate::All(&[]))],
    },
    LevelRules {
        allowed: LEVEL_1_ALLOWED,
        rules: &[
            advance(Predicate::All(&[Count(Led, 1), Count(Resistor, 1)])),
            hint(Predicate::All(&[Count(Led, 0)]), FailureHint::NoLed),
            hint(Predicate::All(&[Count(Resistor, 0)]), FailureHint::NoResistor),
        ],
    },
    LevelRules {
        allowed: LEVEL_2_ALLOWED,
        rules: &[
            advance(Predicate::All(&[
                Count(Switch, 1),
                Count(Led, 1),
                Count(Resistor, 1),
            ])),
            hint(Predicate::All(&[Count(Resistor, 0)]), FailureHint::NoResistor),
            hint(
                Predicate::All(&[Count(Switch, 0), Count(Led, 1), Count(Resistor, 1)]),
                FailureHint::NoSwitch,
            ),
            hint(
                Predicate::All(&[Count(Switch, 1), Count(Led, 0)]),
                FailureHint::SwitchWithoutLed,
            ),
        ],
    },
    LevelRules {
        allowed: LEVEL_3_ALLOWED,
        rules: &[
            advance(Predicate::All(&[
                Count(PushSwitch, 1),
                Count(Led, 1),
                Count(Resistor, 1),
            ])),
            hint(Predicate::All(&[Count(Resistor, 0)]), FailureHint::NoResistor),
            // Toggle switches are not allowed here, so this row only matters
            // if the allowed set is widened.
            hint(
                Predicate::All(&[Count(Switch, 1), Count(Led, 1), Count(Resistor, 1)]),
                FailureHint::WrongSwitch,
            ),
            hint(
                Predicate::All(&[Count(PushSwitch, 0)]),
                FailureHint::NoPushSwitch,
            ),
        ],
    },
    LevelRules {
        allowed: LEVEL_1_ALLOWED,
        rules: &[
            advance(Predicate::All(&[Count(Led, 2), Count(Resistor, 2)])),
            hint(Predicate::All(&[Count(Resistor, 0)]), FailureHint::NoResistor),
            hint(
                Predicate::All(&[Count(Led, 2), Count(Resistor, 1)]),
                FailureHint::SingleResistor,
            ),
            hint(Predicate::All(&[Count(Led, 1)]), FailureHint::SingleLed),
        ],
    },
    LevelRules {
        allowed: LEVEL_5_ALLOWED,
        rules: &[
            advance(Predicate::All(&[
                Count(Photodiode, 1),
                Count(Resistor, 1),
                Count(PushSwitch, 1),
                Count(Led, 1),
                Count(TJunction, 1),
            ])),
            hint(Predicate::All(&[Count(Resistor, 0)]), FailureHint::NoResistor),
            hint(
                Predicate::Any(&[Count(Photodiode, 0), Count(PushSwitch, 0)]),
                FailureHint::MissingSensorOrButton,
            ),
            hint(
                Predicate::Any(&[Count(Resistor, 0), Count(TJunction, 0)]),
                FailureHint::MissingResistorOrJunction,
            ),
        ],
    },
];

/// Rule table for a level, `None` once completed.
pub fn rules_for(level: Level) -> Option<&'static LevelRules> {
    level
        .stage()
        .and_then(|stage| LEVEL_RULES.get(usize::from(stage)))
}

/// Evaluate a snapshot against the rules of a level.
///
/// # Examples
///
/// ```
/// use puzzlebox_core::{Category, GateSnapshot, Level};
/// use puzzlebox_engine::{CategoryTally, Verdict, evaluate};
///
/// let e = Category::Empty;
/// let snapshot = GateSnapshot::new([
///     Category::LedStraight,
///     Category::ResistorCorner,
///     Category::LineCorner,
///     e, e, e,
/// ]);
/// let tally = CategoryTally::of(&snapshot);
///
/// assert_eq!(evaluate(Level::from_raw(1), &snapshot, &tally), Verdict::Advance);
/// ```
pub fn evaluate(level: Level, snapshot: &GateSnapshot, tally: &CategoryTally) -> Verdict {
    if !is_legal_topology(snapshot) {
        return Verdict::IllegalTopology;
    }

    let Some(table) = rules_for(level) else {
        return Verdict::PuzzleComplete;
    };

    if snapshot.occupied().any(|(_, category)| !table.allows(category)) {
        return Verdict::IllegalComponent;
    }

    table
        .rules
        .iter()
        .find(|rule| rule.predicate.matches(tally))
        .map_or(Verdict::GenericFailure, |rule| match rule.outcome {
            Outcome::Advance => Verdict::Advance,
            Outcome::Hint(hint) => Verdict::NarratedFailure(hint),
        })
}

/// The `ordinal`-th (1-based) failure cue of a level, as narrated by the
/// replay admin keys.
///
/// The first stage has no hints; its only failure cue is the illegal
/// arrangement narration, reported here as `None` with the caller choosing
/// that fallback.
pub fn failure_hint(level: Level, ordinal: usize) -> Option<FailureHint> {
    rules_for(level)?.hints().nth(ordinal.checked_sub(1)?)
}
