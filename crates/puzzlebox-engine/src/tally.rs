//! Per-group component counts for a gate snapshot.

use std::fmt;

use puzzlebox_core::{CategoryGroup, GateSnapshot};
use serde::{Deserialize, Serialize};

/// How many tokens of each [`CategoryGroup`] a snapshot holds.
///
/// Each category belongs to at most one group, so no token is counted twice.
/// Plain line segments, admin keys and empty gates are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryTally {
    counts: [u8; CategoryGroup::ALL.len()],
}

impl CategoryTally {
    /// Count the groups present in a snapshot.
    #[must_use]
    pub fn of(snapshot: &GateSnapshot) -> Self {
        let mut tally = Self::default();
        for (_, category) in snapshot.iter() {
            if let Some(group) = category.group() {
                tally.counts[group.index()] += 1;
            }
        }
        tally
    }

    /// Count for one group.
    #[inline]
    #[must_use]
    pub fn get(&self, group: CategoryGroup) -> u8 {
        self.counts[group.index()]
    }

    /// Total number of counted tokens.
    #[must_use]
    pub fn total(&self) -> u8 {
        self.counts.iter().sum()
    }
}

impl fmt::Display for CategoryTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = CategoryGroup::ALL
            .iter()
            .map(|group| format!("{group}={}", self.get(*group)))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}
