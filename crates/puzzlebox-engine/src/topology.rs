//! Structural validation of which gates are occupied.

use puzzlebox_core::GateSnapshot;
use puzzlebox_core::constants::LEGAL_TOPOLOGIES;

/// Returns `true` if the occupied gates form one of the legal circuits.
///
/// Only occupancy matters; the categories on the gates are checked later by
/// the level rules.
///
/// # Examples
///
/// ```
/// use puzzlebox_core::{Category, GateSnapshot};
/// use puzzlebox_engine::is_legal_topology;
///
/// let l = Category::LineStraight;
/// let e = Category::Empty;
/// assert!(is_legal_topology(&GateSnapshot::new([l, l, l, e, e, e])));
/// assert!(!is_legal_topology(&GateSnapshot::new([l, l, e, e, e, e])));
/// ```
#[must_use]
pub fn is_legal_topology(snapshot: &GateSnapshot) -> bool {
    LEGAL_TOPOLOGIES.contains(&snapshot.occupancy_mask())
}
