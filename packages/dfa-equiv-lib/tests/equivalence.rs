use std::time::Duration;

use dfa_equiv_lib::{
    automaton::{
        DeterministicAutomaton, Language,
        dfa::{Dfa, DfaError, node::DfaNode},
    },
    config::EquivalenceConfig,
    definition::DfaFields,
    solver::{
        SolverStatus,
        equivalence::{
            EquivalenceChecker, EquivalenceError, EquivalenceUnknownReason, Side,
            check_equivalence, word_to_string,
        },
    },
    validation::same_language::first_distinguishing_word,
};

fn fields(states: &str, alphabet: &str, start: &str, accept: &str, transitions: &str) -> DfaFields {
    DfaFields {
        states: states.to_string(),
        alphabet: alphabet.to_string(),
        start: start.to_string(),
        accept: accept.to_string(),
        transitions: transitions.to_string(),
    }
}

/// Accepts the binary words that contain a "1".
fn contains_one(accept: &str) -> Dfa<String, String> {
    fields(
        "q0,q1",
        "0,1",
        "q0",
        accept,
        "q0 0 q0; q0 1 q1; q1 0 q1; q1 1 q1",
    )
    .build()
    .unwrap()
}

#[test]
fn test_identical_automata_are_equivalent() {
    let a = contains_one("q1");
    let b = contains_one("q1");

    let result = check_equivalence(&a, &b).unwrap();
    assert_eq!(result.status, SolverStatus::True(()));
    assert!(result.statistics.visited_pairs <= a.state_count() * b.state_count());
}

#[test]
fn test_check_is_reflexive() {
    let a = contains_one("q1");

    let result = check_equivalence(&a, &a).unwrap();
    assert!(result.is_success());
    assert_eq!(result.statistics.visited_pairs, 2);
}

#[test]
fn test_flipped_acceptance_disagrees_on_the_empty_word() {
    // The start state is accepting in `b` only, so the empty word already
    // distinguishes them.
    let a = contains_one("q1");
    let b = contains_one("q0");

    let witness = check_equivalence(&a, &b).unwrap().unwrap_failure();
    assert_eq!(witness, Vec::<String>::new());
    assert_eq!(word_to_string(&witness), "");

    let b = contains_one("q0,q1");
    let witness = check_equivalence(&a, &b).unwrap().unwrap_failure();
    assert_eq!(word_to_string(&witness), "");
}

#[test]
fn test_only_zeros_is_distinguished_by_zero() {
    // `b` accepts the non empty words without a "1"
    let a = contains_one("q1");
    let b = fields(
        "p0,p1,p2",
        "0,1",
        "p0",
        "p1",
        "p0 0 p1; p0 1 p2; p1 0 p1; p1 1 p2; p2 0 p2; p2 1 p2",
    )
    .build()
    .unwrap();

    let witness = check_equivalence(&a, &b).unwrap().unwrap_failure();
    assert_eq!(witness, vec!["0".to_string()]);
}

#[test]
fn test_shortest_witness_is_one() {
    // `a` accepts words containing a "1", `b` accepts nothing.
    let a = contains_one("q1");
    let b = fields("p0", "0,1", "p0", "", "p0 0 p0; p0 1 p0")
        .build()
        .unwrap();

    let witness = check_equivalence(&a, &b).unwrap().unwrap_failure();
    assert_eq!(word_to_string(&witness), "1");
    assert_eq!(a.accepts(&witness), Ok(true));
    assert_eq!(b.accepts(&witness), Ok(false));
}

#[test]
fn test_single_state_automata_disagree_on_the_empty_word() {
    let a = fields("q0", "a", "q0", "q0", "q0 a q0").build().unwrap();
    let b = fields("p0", "a", "p0", "", "p0 a p0").build().unwrap();

    let result = check_equivalence(&a, &b).unwrap();
    assert_eq!(result.status, SolverStatus::False(vec![]));
    assert_eq!(result.statistics.visited_pairs, 1);
}

#[test]
fn test_renamed_states_are_equivalent() {
    let a = contains_one("q1");
    let b = fields(
        "one,zero",
        "0,1",
        "zero",
        "one",
        "zero 0 zero; zero 1 one; one 0 one; one 1 one",
    )
    .build()
    .unwrap();

    assert!(check_equivalence(&a, &b).unwrap().is_success());
}

#[test]
fn test_different_state_types_can_be_compared() {
    let a = contains_one("q1");

    let mut b = Dfa::<u32, String>::new(vec!["0".to_string(), "1".to_string()]);
    let p0 = b.add_state(DfaNode::non_accepting(0));
    let p1 = b.add_state(DfaNode::accepting(1));
    let p2 = b.add_state(DfaNode::accepting(2));
    b.set_start(p0).unwrap();
    b.add_transition(p0, p0, "0".to_string()).unwrap();
    b.add_transition(p0, p1, "1".to_string()).unwrap();
    b.add_transition(p1, p2, "0".to_string()).unwrap();
    b.add_transition(p1, p1, "1".to_string()).unwrap();
    b.add_transition(p2, p2, "0".to_string()).unwrap();
    b.add_transition(p2, p1, "1".to_string()).unwrap();

    // non minimal, but the same language
    let result = check_equivalence(&a, &b).unwrap();
    assert!(result.is_success());
    assert_eq!(result.statistics.visited_pairs, 3);
}

#[test]
fn test_unreachable_states_are_ignored() {
    let a = contains_one("q1");
    let b = fields(
        "q0,q1,dead",
        "0,1",
        "q0",
        "q1,dead",
        "q0 0 q0; q0 1 q1; q1 0 q1; q1 1 q1; dead 0 q0; dead 1 dead",
    )
    .build()
    .unwrap();

    let result = check_equivalence(&a, &b).unwrap();
    assert!(result.is_success());
    assert_eq!(result.statistics.visited_pairs, 2);
}

#[test]
fn test_empty_alphabet_compares_start_states() {
    let a = fields("q0", "", "q0", "q0", "").build().unwrap();
    let b = fields("p0,p1", "", "p0", "p0", "").build().unwrap();
    assert!(check_equivalence(&a, &b).unwrap().is_success());

    let c = fields("r0", "", "r0", "", "").build().unwrap();
    let result = check_equivalence(&a, &c).unwrap();
    assert_eq!(result.status, SolverStatus::False(vec![]));
}

#[test]
fn test_missing_transition_is_an_error() {
    let a = contains_one("q1");

    let mut b = Dfa::<String, String>::new(vec!["0".to_string(), "1".to_string()]);
    let p0 = b.add_state(DfaNode::non_accepting("p0".to_string()));
    let p1 = b.add_state(DfaNode::accepting("p1".to_string()));
    b.set_start(p0).unwrap();
    b.add_transition(p0, p0, "0".to_string()).unwrap();
    b.add_transition(p0, p1, "1".to_string()).unwrap();
    b.add_transition(p1, p1, "0".to_string()).unwrap();
    // p1 has no transition on "1"

    let err = check_equivalence(&a, &b).unwrap_err();
    assert_eq!(
        err,
        EquivalenceError::MalformedAutomaton {
            side: Side::Right,
            source: DfaError::MissingTransition {
                state: "\"p1\"".to_string(),
                letter: "\"1\"".to_string(),
            },
        }
    );

    let err = check_equivalence(&b, &a).unwrap_err();
    assert!(matches!(
        err,
        EquivalenceError::MalformedAutomaton {
            side: Side::Left,
            ..
        }
    ));

    // The well formed automaton is unaffected and still checks fine.
    assert!(check_equivalence(&a, &a).unwrap().is_success());
}

#[test]
fn test_missing_unreachable_transition_is_harmless() {
    let a = contains_one("q1");

    let mut b = Dfa::<String, String>::new(vec!["0".to_string(), "1".to_string()]);
    let p0 = b.add_state(DfaNode::non_accepting("p0".to_string()));
    let p1 = b.add_state(DfaNode::accepting("p1".to_string()));
    let _orphan = b.add_state(DfaNode::accepting("orphan".to_string()));
    b.set_start(p0).unwrap();
    b.add_transition(p0, p0, "0".to_string()).unwrap();
    b.add_transition(p0, p1, "1".to_string()).unwrap();
    b.add_transition(p1, p1, "0".to_string()).unwrap();
    b.add_transition(p1, p1, "1".to_string()).unwrap();

    assert!(!b.is_complete());
    assert!(check_equivalence(&a, &b).unwrap().is_success());
}

#[test]
fn test_missing_start_is_an_error() {
    let a = contains_one("q1");
    let mut b = Dfa::<String, String>::new(vec!["0".to_string(), "1".to_string()]);
    b.add_state(DfaNode::accepting("p0".to_string()));

    assert_eq!(
        check_equivalence(&a, &b).unwrap_err(),
        EquivalenceError::MissingStart { side: Side::Right }
    );
}

#[test]
fn test_alphabet_mismatch_is_rejected() {
    let a = contains_one("q1");
    let b = fields("p0", "0,2", "p0", "", "p0 0 p0; p0 2 p0")
        .build()
        .unwrap();

    let err = check_equivalence(&a, &b).unwrap_err();
    assert_eq!(
        err,
        EquivalenceError::AlphabetMismatch {
            only_left: vec!["\"1\"".to_string()],
            only_right: vec!["\"2\"".to_string()],
        }
    );
    assert_eq!(
        err.to_string(),
        "the automata have different alphabets (only in left: [\"1\"], only in right: [\"2\"])"
    );
}

#[test]
fn test_alphabet_order_only_affects_tie_breaking() {
    // Both accept exactly the words of length one.
    let a = fields(
        "s,t,u",
        "x,y",
        "s",
        "t",
        "s x t; s y t; t x u; t y u; u x u; u y u",
    )
    .build()
    .unwrap();
    let b = fields(
        "s,t,u",
        "y,x",
        "s",
        "t",
        "s x t; s y t; t x u; t y u; u x u; u y u",
    )
    .build()
    .unwrap();
    assert!(check_equivalence(&a, &b).unwrap().is_success());

    // Accepts nothing, so every word of length one is a witness.
    let empty = fields("e", "y,x", "e", "", "e x e; e y e").build().unwrap();

    let witness = check_equivalence(&a, &empty).unwrap().unwrap_failure();
    assert_eq!(witness, vec!["x".to_string()]);

    let witness = check_equivalence(&empty, &a).unwrap().unwrap_failure();
    assert_eq!(witness, vec!["y".to_string()]);
}

#[test]
fn test_witness_matches_brute_force() {
    // a: words whose number of "a" is divisible by 3
    let a = fields(
        "r0,r1,r2",
        "a,b",
        "r0",
        "r0",
        "r0 a r1; r1 a r2; r2 a r0; r0 b r0; r1 b r1; r2 b r2",
    )
    .build()
    .unwrap();
    // b: words whose number of "a" is even
    let b = fields("e,o", "a,b", "e", "e", "e a o; o a e; e b e; o b o")
        .build()
        .unwrap();

    let witness = check_equivalence(&a, &b).unwrap().unwrap_failure();
    assert_eq!(word_to_string(&witness), "aa");
    assert_eq!(
        first_distinguishing_word(&a, &b, 4).unwrap(),
        Some(witness.clone())
    );
    assert_ne!(a.accepts(&witness), b.accepts(&witness));
}

#[test]
fn test_product_state_limit_gives_unknown() {
    let a = contains_one("q1");
    let b = contains_one("q1");

    let config = EquivalenceConfig::default().with_max_product_states(Some(1));
    let result = EquivalenceChecker::new(&a, &b, config).check().unwrap();
    assert_eq!(
        result.status,
        SolverStatus::Unknown(EquivalenceUnknownReason::ProductStateLimit)
    );
    assert_eq!(result.statistics.visited_pairs, 1);

    let config = EquivalenceConfig::default().with_max_product_states(Some(2));
    let result = EquivalenceChecker::new(&a, &b, config).check().unwrap();
    assert!(result.is_success());
}

#[test]
fn test_zero_timeout_gives_unknown() {
    let a = contains_one("q1");
    let b = contains_one("q1");

    let config = EquivalenceConfig::default().with_timeout(Some(Duration::ZERO));
    let result = EquivalenceChecker::new(&a, &b, config).check().unwrap();

    assert_eq!(
        result.status,
        SolverStatus::Unknown(EquivalenceUnknownReason::Timeout)
    );
    assert_eq!(result.statistics.visited_pairs, 0);
}

#[test]
fn test_checker_can_be_rerun() {
    let a = contains_one("q1");
    let b = contains_one("q0");

    let mut checker = EquivalenceChecker::new(&a, &b, EquivalenceConfig::default());
    let first = checker.check().unwrap();
    let second = checker.check().unwrap();

    assert_eq!(first.status, second.status);
    assert_eq!(
        first.statistics.visited_pairs,
        second.statistics.visited_pairs
    );
}
