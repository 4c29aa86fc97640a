//! Property-based tests for rule evaluation and level progression.
//!
//! Snapshots are drawn from every category, including admin keys and empty
//! gates, so illegal arrangements and foreign components show up often.

use proptest::prelude::*;
use puzzlebox_core::constants::{GATE_COUNT, LEGAL_TOPOLOGIES};
use puzzlebox_core::{Category, CategoryGroup, GateSnapshot, Level};
use puzzlebox_engine::{
    CategoryTally, FailureHint, LevelStateMachine, Verdict, evaluate, is_legal_topology,
    rules_for,
};

/// Strategy for any category, empty included.
fn any_category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

/// Strategy for arbitrary snapshots.
fn any_snapshot() -> impl Strategy<Value = GateSnapshot> {
    prop::array::uniform6(any_category()).prop_map(GateSnapshot::new)
}

/// Strategy for the six stages and the completed state.
fn any_level() -> impl Strategy<Value = Level> {
    prop_oneof![(0u8..=5).prop_map(Level::from_raw), Just(Level::COMPLETED)]
}

/// Strategy for snapshots with a legal occupancy pattern drawn from `pool`.
fn legal_snapshot(pool: Vec<Category>) -> impl Strategy<Value = GateSnapshot> {
    (
        prop::sample::select(LEGAL_TOPOLOGIES.to_vec()),
        prop::array::uniform6(prop::sample::select(pool)),
    )
        .prop_map(|(mask, picks)| {
            let mut gates = [Category::Empty; GATE_COUNT];
            for (index, category) in picks.into_iter().enumerate() {
                if mask & (1 << index) != 0 {
                    gates[index] = category;
                }
            }
            GateSnapshot::new(gates)
        })
}

/// Strategy for any verdict.
fn any_verdict() -> impl Strategy<Value = Verdict> {
    prop_oneof![
        Just(Verdict::IllegalTopology),
        Just(Verdict::IllegalComponent),
        Just(Verdict::Advance),
        Just(Verdict::NarratedFailure(FailureHint::NoLed)),
        Just(Verdict::GenericFailure),
        Just(Verdict::PuzzleComplete),
    ]
}

/// Level 2 components that are not resistors.
fn stage_two_without_resistors() -> Vec<Category> {
    rules_for(Level::from_raw(2))
        .expect("stage 2 has rules")
        .allowed
        .iter()
        .copied()
        .filter(|category| category.group() != Some(CategoryGroup::Resistor))
        .collect()
}

proptest! {
    /// Property: evaluation depends only on its inputs.
    #[test]
    fn prop_evaluation_is_deterministic(level in any_level(), snapshot in any_snapshot()) {
        let tally = CategoryTally::of(&snapshot);
        prop_assert_eq!(evaluate(level, &snapshot, &tally), evaluate(level, &snapshot, &tally));
    }

    /// Property: an illegal occupancy pattern is reported before anything else.
    #[test]
    fn prop_topology_gates_rules(level in any_level(), snapshot in any_snapshot()) {
        let tally = CategoryTally::of(&snapshot);
        let verdict = evaluate(level, &snapshot, &tally);

        prop_assert_eq!(
            verdict == Verdict::IllegalTopology,
            !is_legal_topology(&snapshot)
        );
    }

    /// Property: a component outside the allowed set always wins over the
    /// rules, even when the tally would advance.
    #[test]
    fn prop_illegal_component_precedence(stage in 0u8..=5, snapshot in any_snapshot()) {
        let level = Level::from_raw(stage);
        let rules = rules_for(level).expect("stages have rules");
        prop_assume!(is_legal_topology(&snapshot));

        let tally = CategoryTally::of(&snapshot);
        let foreign = snapshot.occupied().any(|(_, category)| !rules.allows(category));

        prop_assert_eq!(
            evaluate(level, &snapshot, &tally) == Verdict::IllegalComponent,
            foreign
        );
    }

    /// Property: any legal arrangement of lines clears the first stage.
    #[test]
    fn prop_lines_clear_first_stage(
        snapshot in legal_snapshot(vec![
            Category::LineStraight,
            Category::LineCorner,
            Category::LineTJunction,
        ])
    ) {
        let tally = CategoryTally::of(&snapshot);
        prop_assert_eq!(evaluate(Level::START, &snapshot, &tally), Verdict::Advance);
    }

    /// Property: at stage 2 a board without resistors always gets the
    /// missing resistor hint, whatever later rows would also match.
    #[test]
    fn prop_first_match_wins(snapshot in legal_snapshot(stage_two_without_resistors())) {
        let tally = CategoryTally::of(&snapshot);
        prop_assert_eq!(tally.get(CategoryGroup::Resistor), 0);
        prop_assert_eq!(
            evaluate(Level::from_raw(2), &snapshot, &tally),
            Verdict::NarratedFailure(FailureHint::NoResistor)
        );
    }

    /// Property: completed boards never produce rule outcomes.
    #[test]
    fn prop_completed_is_terminal(snapshot in any_snapshot()) {
        let tally = CategoryTally::of(&snapshot);
        let verdict = evaluate(Level::COMPLETED, &snapshot, &tally);
        prop_assert!(matches!(verdict, Verdict::IllegalTopology | Verdict::PuzzleComplete));
    }

    /// Property: verdicts never move the level backwards, and only
    /// advances move it at all.
    #[test]
    fn prop_monotonic_progression(verdicts in prop::collection::vec(any_verdict(), 0..40)) {
        let mut machine = LevelStateMachine::new();

        for verdict in verdicts {
            let before = machine.current();
            let transition = machine.apply_verdict(verdict);
            let after = machine.current();

            prop_assert!(after >= before);
            prop_assert_eq!(transition.is_some(), after != before);
            if !verdict.is_advance() {
                prop_assert_eq!(after, before);
            }
        }
    }

    /// Property: raw level values are either a stage or completed.
    #[test]
    fn prop_level_normalization(raw in any::<u8>()) {
        let level = Level::from_raw(raw);
        prop_assert!(level.stage().is_some() || level.is_completed());
        prop_assert_eq!(level.stage().is_some(), raw <= 5);
    }
}
