use crate::{
    Result,
    constants::{COMPLETED_LEVEL, FINAL_STAGE, GATE_COUNT, MIN_UID_LENGTH, TOKEN_IDENTITY_LENGTH},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Identity read from a physical token (7 bytes, zero-padded)
///
/// # Security
/// Admin keys are ordinary tokens with reserved categories, so identities are
/// compared in constant time.
#[derive(Debug, Clone, Copy, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenIdentity([u8; TOKEN_IDENTITY_LENGTH]);

impl TokenIdentity {
    /// Create an identity from a raw reader UID.
    ///
    /// UIDs shorter than [`TOKEN_IDENTITY_LENGTH`] are zero-padded.
    ///
    /// # Errors
    /// Returns `Error::InvalidTokenIdentity` if the UID is shorter than
    /// [`MIN_UID_LENGTH`] or longer than [`TOKEN_IDENTITY_LENGTH`] bytes.
    pub fn from_uid(uid: &[u8]) -> Result<Self> {
        let len = uid.len();
        if !(MIN_UID_LENGTH..=TOKEN_IDENTITY_LENGTH).contains(&len) {
            return Err(Error::InvalidTokenIdentity {
                message: format!(
                    "UID must be {MIN_UID_LENGTH}-{TOKEN_IDENTITY_LENGTH} bytes, got {len}"
                ),
            });
        }

        let mut bytes = [0u8; TOKEN_IDENTITY_LENGTH];
        bytes[..len].copy_from_slice(uid);
        Ok(TokenIdentity(bytes))
    }

    /// Get the padded identity bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; TOKEN_IDENTITY_LENGTH] {
        &self.0
    }

    /// Format as contiguous uppercase hex (`04A1B2C3000000`).
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02X}")).collect()
    }
}

impl fmt::Display for TokenIdentity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|b| format!("{b:02X}")).collect();
        write!(f, "{}", parts.join(":"))
    }
}

impl std::str::FromStr for TokenIdentity {
    type Err = Error;

    /// Parse `04:A1:B2:C3`, `04-a1-b2-c3` or `04A1B2C3`.
    fn from_str(s: &str) -> Result<Self> {
        let digits: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ':' | '-' | ' '))
            .collect();

        if digits.len() % 2 != 0 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidTokenIdentity {
                message: format!("Invalid hex UID: {s}"),
            });
        }

        let uid = (0..digits.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&digits[i..i + 2], 16))
            .collect::<std::result::Result<Vec<u8>, _>>()
            .map_err(|e| Error::InvalidTokenIdentity {
                message: format!("Invalid hex UID '{s}': {e}"),
            })?;

        TokenIdentity::from_uid(&uid)
    }
}

impl TryFrom<String> for TokenIdentity {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TokenIdentity> for String {
    fn from(identity: TokenIdentity) -> Self {
        identity.to_string()
    }
}

/// Constant-time comparison implementation for TokenIdentity
impl PartialEq for TokenIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl std::hash::Hash for TokenIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Component category a token represents
///
/// Codes 1-13 are circuit components, 14-23 are reserved admin keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Category {
    /// No token, unreadable token, or unknown identity.
    Empty = 0,
    LineStraight = 1,
    LineCorner = 2,
    LineTJunction = 3,
    LedStraight = 4,
    LedCornerRight = 5,
    LedCornerLeft = 6,
    SwitchStraight = 7,
    SwitchCorner = 8,
    PushSwitchStraight = 9,
    PushSwitchCorner = 10,
    ResistorStraight = 11,
    ResistorCorner = 12,
    Photodiode = 13,
    AdminKeyA = 14,
    AdminKeyB = 15,
    AdminKeyC = 16,
    AdminKeyD = 17,
    AdminKeyE = 18,
    AdminKeyF = 19,
    AdminKeyG = 20,
    AdminKeyH = 21,
    AdminKeyI = 22,
    AdminKeyJ = 23,
}

impl Category {
    /// Every category, ordered by code.
    pub const ALL: [Category; 24] = [
        Category::Empty,
        Category::LineStraight,
        Category::LineCorner,
        Category::LineTJunction,
        Category::LedStraight,
        Category::LedCornerRight,
        Category::LedCornerLeft,
        Category::SwitchStraight,
        Category::SwitchCorner,
        Category::PushSwitchStraight,
        Category::PushSwitchCorner,
        Category::ResistorStraight,
        Category::ResistorCorner,
        Category::Photodiode,
        Category::AdminKeyA,
        Category::AdminKeyB,
        Category::AdminKeyC,
        Category::AdminKeyD,
        Category::AdminKeyE,
        Category::AdminKeyF,
        Category::AdminKeyG,
        Category::AdminKeyH,
        Category::AdminKeyI,
        Category::AdminKeyJ,
    ];

    /// Create a category from its numeric code.
    ///
    /// # Errors
    /// Returns `Error::UnknownCategory` if the code is not assigned.
    #[inline]
    pub fn from_code(code: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or_else(|| Error::UnknownCategory(code.to_string()))
    }

    /// Convert the category to its numeric code.
    #[inline]
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Configuration name (`led_corner_right`).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Category::Empty => "empty",
            Category::LineStraight => "line_straight",
            Category::LineCorner => "line_corner",
            Category::LineTJunction => "line_t_junction",
            Category::LedStraight => "led_straight",
            Category::LedCornerRight => "led_corner_right",
            Category::LedCornerLeft => "led_corner_left",
            Category::SwitchStraight => "switch_straight",
            Category::SwitchCorner => "switch_corner",
            Category::PushSwitchStraight => "push_switch_straight",
            Category::PushSwitchCorner => "push_switch_corner",
            Category::ResistorStraight => "resistor_straight",
            Category::ResistorCorner => "resistor_corner",
            Category::Photodiode => "photodiode",
            Category::AdminKeyA => "admin_key_a",
            Category::AdminKeyB => "admin_key_b",
            Category::AdminKeyC => "admin_key_c",
            Category::AdminKeyD => "admin_key_d",
            Category::AdminKeyE => "admin_key_e",
            Category::AdminKeyF => "admin_key_f",
            Category::AdminKeyG => "admin_key_g",
            Category::AdminKeyH => "admin_key_h",
            Category::AdminKeyI => "admin_key_i",
            Category::AdminKeyJ => "admin_key_j",
        }
    }

    /// Tally group this category counts toward, if any.
    ///
    /// Plain line segments and admin keys belong to no group.
    #[must_use]
    pub fn group(self) -> Option<CategoryGroup> {
        match self {
            Category::LedStraight | Category::LedCornerRight | Category::LedCornerLeft => {
                Some(CategoryGroup::Led)
            }
            Category::ResistorStraight | Category::ResistorCorner => Some(CategoryGroup::Resistor),
            Category::SwitchStraight | Category::SwitchCorner => Some(CategoryGroup::Switch),
            Category::PushSwitchStraight | Category::PushSwitchCorner => {
                Some(CategoryGroup::PushSwitch)
            }
            Category::Photodiode => Some(CategoryGroup::Photodiode),
            Category::LineTJunction => Some(CategoryGroup::TJunction),
            _ => None,
        }
    }

    /// Returns `true` for [`Category::Empty`].
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        matches!(self, Category::Empty)
    }

    /// Returns `true` if a recognized token occupies the gate.
    #[inline]
    #[must_use]
    pub fn is_occupied(self) -> bool {
        !self.is_empty()
    }

    /// Returns `true` for the reserved admin key categories.
    #[inline]
    #[must_use]
    pub fn is_admin_key(self) -> bool {
        self.code() >= Category::AdminKeyA.code()
    }

    /// Letter of an admin key (`'A'..='J'`).
    #[must_use]
    pub fn admin_key_letter(self) -> Option<char> {
        if !self.is_admin_key() {
            return None;
        }
        char::from_u32(u32::from(b'A' + (self.code() - Category::AdminKeyA.code())))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.name() == name)
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

/// Component group counted by the category tally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    Led,
    Resistor,
    Switch,
    PushSwitch,
    Photodiode,
    TJunction,
}

impl CategoryGroup {
    /// Every group, in tally order.
    pub const ALL: [CategoryGroup; 6] = [
        CategoryGroup::Led,
        CategoryGroup::Resistor,
        CategoryGroup::Switch,
        CategoryGroup::PushSwitch,
        CategoryGroup::Photodiode,
        CategoryGroup::TJunction,
    ];

    /// Position of this group in [`CategoryGroup::ALL`].
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CategoryGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            CategoryGroup::Led => "LED",
            CategoryGroup::Resistor => "Resistor",
            CategoryGroup::Switch => "Switch",
            CategoryGroup::PushSwitch => "PushSwitch",
            CategoryGroup::Photodiode => "Photodiode",
            CategoryGroup::TJunction => "TJunction",
        };
        write!(f, "{name}")
    }
}

/// Physical gate position (0-5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GateIndex(usize);

impl GateIndex {
    /// Create a gate index with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidGateIndex` if the index is not below [`GATE_COUNT`].
    pub fn new(index: usize) -> Result<Self> {
        if index >= GATE_COUNT {
            return Err(Error::InvalidGateIndex {
                index,
                max: GATE_COUNT - 1,
            });
        }
        Ok(GateIndex(index))
    }

    /// Iterate over every gate in physical order.
    pub fn all() -> impl Iterator<Item = GateIndex> {
        (0..GATE_COUNT).map(GateIndex)
    }

    /// Get the raw index.
    #[inline]
    #[must_use]
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl fmt::Display for GateIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "gate {}", self.0)
    }
}

/// Categories found on all six gates during one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GateSnapshot([Category; GATE_COUNT]);

impl GateSnapshot {
    /// Create a snapshot from per-gate categories.
    #[must_use]
    pub fn new(categories: [Category; GATE_COUNT]) -> Self {
        GateSnapshot(categories)
    }

    /// Snapshot with every gate empty.
    #[must_use]
    pub fn empty() -> Self {
        GateSnapshot([Category::Empty; GATE_COUNT])
    }

    /// Category on a gate.
    #[must_use]
    pub fn get(&self, gate: GateIndex) -> Category {
        self.0[gate.as_usize()]
    }

    /// Per-gate categories in physical order.
    #[must_use]
    pub fn categories(&self) -> &[Category; GATE_COUNT] {
        &self.0
    }

    /// Iterate over `(gate, category)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (GateIndex, Category)> + '_ {
        GateIndex::all().zip(self.0.iter().copied())
    }

    /// Iterate over occupied gates only.
    pub fn occupied(&self) -> impl Iterator<Item = (GateIndex, Category)> + '_ {
        self.iter().filter(|(_, category)| category.is_occupied())
    }

    /// Occupied/empty pattern, bit `n` set when gate `n` is occupied.
    #[must_use]
    pub fn occupancy_mask(&self) -> u8 {
        self.occupied()
            .fold(0u8, |mask, (gate, _)| mask | (1 << gate.as_usize()))
    }

    /// Admin keys present, in gate order.
    pub fn admin_keys(&self) -> impl Iterator<Item = (GateIndex, Category)> + '_ {
        self.iter().filter(|(_, category)| category.is_admin_key())
    }
}

impl Default for GateSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for GateSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|c| c.name()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Puzzle progression level
///
/// Stages 0-5 are playable; [`Level::COMPLETED`] (raw 10) is terminal.
/// Every other raw value is normalized to completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    /// First stage.
    pub const START: Level = Level(0);

    /// Terminal state after the final stage is cleared.
    pub const COMPLETED: Level = Level(COMPLETED_LEVEL);

    /// Create a level from a raw value, normalizing out-of-range values.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        if raw <= FINAL_STAGE {
            Level(raw)
        } else {
            Self::COMPLETED
        }
    }

    /// Playable stage number, `None` when completed.
    #[inline]
    #[must_use]
    pub fn stage(self) -> Option<u8> {
        (self.0 <= FINAL_STAGE).then_some(self.0)
    }

    /// Raw level value (0-5 or 10).
    #[inline]
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self.0
    }

    /// Returns `true` once the final stage has been cleared.
    #[inline]
    #[must_use]
    pub fn is_completed(self) -> bool {
        self.0 == COMPLETED_LEVEL
    }

    /// Level reached by clearing this one (5 advances to completed).
    #[must_use]
    pub fn next(self) -> Self {
        Level::from_raw(self.0.saturating_add(1))
    }

    /// Level one step back, floored at 0.
    ///
    /// Stepping back from completed lands on raw 9, which normalizes back
    /// to completed.
    #[must_use]
    pub fn previous(self) -> Self {
        Level::from_raw(self.0.saturating_sub(1))
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::START
    }
}

impl From<u8> for Level {
    fn from(raw: u8) -> Self {
        Level::from_raw(raw)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.stage() {
            Some(stage) => write!(f, "level {stage}"),
            None => write!(f, "completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("04:A1:B2:C3", [0x04, 0xA1, 0xB2, 0xC3, 0, 0, 0])]
    #[case("04a1b2c3d4e5f6", [0x04, 0xA1, 0xB2, 0xC3, 0xD4, 0xE5, 0xF6])]
    #[case("04-A1-B2-C3-D4", [0x04, 0xA1, 0xB2, 0xC3, 0xD4, 0, 0])]
    fn test_token_identity_valid(#[case] input: &str, #[case] expected: [u8; 7]) {
        let identity: TokenIdentity = input.parse().unwrap();
        assert_eq!(identity.as_bytes(), &expected);
    }

    #[rstest]
    #[case("04:A1:B2")] // too short
    #[case("04A1B2C3D4E5F6A7")] // too long
    #[case("04A1B2C")] // odd digit count
    #[case("ZZ:A1:B2:C3")] // non-hex
    fn test_token_identity_invalid(#[case] input: &str) {
        let result: Result<TokenIdentity> = input.parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_token_identity_padding_equality() {
        let short = TokenIdentity::from_uid(&[0x01, 0x02, 0x03, 0x04]).unwrap();
        let padded = TokenIdentity::from_uid(&[0x01, 0x02, 0x03, 0x04, 0, 0, 0]).unwrap();
        assert_eq!(short, padded);
    }

    #[test]
    fn test_token_identity_display() {
        let identity: TokenIdentity = "04A1B2C3D4E5F6".parse().unwrap();
        assert_eq!(identity.to_string(), "04:A1:B2:C3:D4:E5:F6");
        assert_eq!(identity.to_hex(), "04A1B2C3D4E5F6");
    }

    #[test]
    fn test_token_identity_serde() {
        let identity: TokenIdentity = "04:A1:B2:C3".parse().unwrap();
        let json = serde_json::to_string(&identity).unwrap();
        assert_eq!(json, "\"04:A1:B2:C3:00:00:00\"");
        let back: TokenIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(identity, back);
    }

    #[rstest]
    #[case(Category::LedStraight, Some(CategoryGroup::Led))]
    #[case(Category::LedCornerRight, Some(CategoryGroup::Led))]
    #[case(Category::LedCornerLeft, Some(CategoryGroup::Led))]
    #[case(Category::ResistorStraight, Some(CategoryGroup::Resistor))]
    #[case(Category::ResistorCorner, Some(CategoryGroup::Resistor))]
    #[case(Category::SwitchCorner, Some(CategoryGroup::Switch))]
    #[case(Category::PushSwitchStraight, Some(CategoryGroup::PushSwitch))]
    #[case(Category::Photodiode, Some(CategoryGroup::Photodiode))]
    #[case(Category::LineTJunction, Some(CategoryGroup::TJunction))]
    #[case(Category::LineStraight, None)]
    #[case(Category::LineCorner, None)]
    #[case(Category::AdminKeyA, None)]
    #[case(Category::Empty, None)]
    fn test_category_group(#[case] category: Category, #[case] expected: Option<CategoryGroup>) {
        assert_eq!(category.group(), expected);
    }

    #[test]
    fn test_category_codes_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_code(category.code()).unwrap(), category);
        }
        assert!(Category::from_code(24).is_err());
    }

    #[test]
    fn test_category_names_parse() {
        for category in Category::ALL {
            assert_eq!(category.name().parse::<Category>().unwrap(), category);
        }
        assert!("capacitor".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_matches_name() {
        let json = serde_json::to_string(&Category::PushSwitchCorner).unwrap();
        assert_eq!(json, "\"push_switch_corner\"");
    }

    #[test]
    fn test_admin_keys() {
        assert!(!Category::Photodiode.is_admin_key());
        assert!(Category::AdminKeyA.is_admin_key());
        assert_eq!(Category::AdminKeyA.admin_key_letter(), Some('A'));
        assert_eq!(Category::AdminKeyJ.admin_key_letter(), Some('J'));
        assert_eq!(Category::LedStraight.admin_key_letter(), None);
    }

    #[rstest]
    #[case(0)]
    #[case(5)]
    fn test_gate_index_valid(#[case] index: usize) {
        assert_eq!(GateIndex::new(index).unwrap().as_usize(), index);
    }

    #[test]
    fn test_gate_index_invalid() {
        assert!(GateIndex::new(6).is_err());
    }

    #[test]
    fn test_snapshot_occupancy_mask() {
        let snapshot = GateSnapshot::new([
            Category::LineStraight,
            Category::LineCorner,
            Category::LineTJunction,
            Category::Empty,
            Category::Empty,
            Category::Empty,
        ]);
        assert_eq!(snapshot.occupancy_mask(), 0b000111);
        assert_eq!(snapshot.occupied().count(), 3);
        assert_eq!(GateSnapshot::empty().occupancy_mask(), 0);
    }

    #[test]
    fn test_snapshot_display() {
        let snapshot = GateSnapshot::new([
            Category::LedStraight,
            Category::Empty,
            Category::Empty,
            Category::Empty,
            Category::Empty,
            Category::ResistorCorner,
        ]);
        assert_eq!(
            snapshot.to_string(),
            "{led_straight, empty, empty, empty, empty, resistor_corner}"
        );
    }

    #[rstest]
    #[case(0, Level(0))]
    #[case(5, Level(5))]
    #[case(10, Level::COMPLETED)]
    #[case(9, Level::COMPLETED)]
    #[case(6, Level::COMPLETED)]
    #[case(255, Level::COMPLETED)]
    fn test_level_from_raw(#[case] raw: u8, #[case] expected: Level) {
        assert_eq!(Level::from_raw(raw), expected);
    }

    #[test]
    fn test_level_next() {
        assert_eq!(Level::START.next(), Level(1));
        assert_eq!(Level(5).next(), Level::COMPLETED);
        assert_eq!(Level::COMPLETED.next(), Level::COMPLETED);
    }

    #[test]
    fn test_level_previous() {
        assert_eq!(Level::START.previous(), Level::START);
        assert_eq!(Level(3).previous(), Level(2));
        assert_eq!(Level::COMPLETED.previous(), Level::COMPLETED);
    }

    #[test]
    fn test_level_display() {
        assert_eq!(Level(2).to_string(), "level 2");
        assert_eq!(Level::COMPLETED.to_string(), "completed");
    }

    #[test]
    fn test_level_stage() {
        assert_eq!(Level::from_raw(4).stage(), Some(4));
        assert_eq!(Level::COMPLETED.stage(), None);
    }
}
