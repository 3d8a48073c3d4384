use std::{fs, path::Path};

use dfa_equiv_lib::{
    automaton::{DeterministicAutomaton, Language},
    config::{DfaEquivConfig, ImageFormat},
    definition::{DefinitionError, DfaDefinition, DfaFields, TransitionRule},
    solver::equivalence::{check_equivalence, word_to_string},
};
use tempfile::tempdir;

fn fields(states: &str, alphabet: &str, start: &str, accept: &str, transitions: &str) -> DfaFields {
    DfaFields {
        states: states.to_string(),
        alphabet: alphabet.to_string(),
        start: start.to_string(),
        accept: accept.to_string(),
        transitions: transitions.to_string(),
    }
}

fn build_err(fields: DfaFields) -> DefinitionError {
    fields.build().unwrap_err()
}

#[test]
fn test_build_from_fields() {
    let dfa = fields(
        "q0, q1",
        "0, 1",
        "q0",
        "q1",
        "q0 0 q0; q0 1 q1; q1 0 q1; q1 1 q1;",
    )
    .build()
    .unwrap();

    assert_eq!(dfa.state_count(), 2);
    assert_eq!(dfa.transition_count(), 4);
    assert!(dfa.is_complete());

    let q0 = dfa.find_state(&"q0".to_string()).unwrap();
    assert_eq!(dfa.get_start(), Some(q0));

    let word = ["0", "0", "1", "0"].map(String::from);
    assert_eq!(dfa.accepts(&word), Ok(true));
    assert_eq!(dfa.accepts(&word[..2]), Ok(false));
}

#[test]
fn test_states_keep_declaration_order() {
    let dfa = fields("b, a, c", "x", "c", "", "a x a; b x b; c x c")
        .build()
        .unwrap();

    let names = dfa
        .graph()
        .node_weights()
        .map(|node| node.data.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["b", "a", "c"]);
}

#[test]
fn test_duplicates_that_agree_are_accepted() {
    let dfa = fields("q0,q1", "a", "q0", "q1,q1", "q0 a q1; q1 a q1; q0 a q1")
        .build()
        .unwrap();

    assert_eq!(dfa.transition_count(), 2);
    assert_eq!(dfa.accepting_states().count(), 1);
}

#[test]
fn test_no_states() {
    assert_eq!(build_err(fields("", "a", "q0", "", "")), DefinitionError::NoStates);
    assert_eq!(
        build_err(fields(" , ,", "a", "q0", "", "")),
        DefinitionError::NoStates
    );
}

#[test]
fn test_empty_identifier() {
    let definition = DfaDefinition {
        states: vec!["q0".to_string(), " ".to_string()],
        alphabet: vec!["a".to_string()],
        start: "q0".to_string(),
        accept: vec![],
        transitions: vec![],
    };
    assert_eq!(
        definition.build().unwrap_err(),
        DefinitionError::EmptyIdentifier("states")
    );

    let definition = DfaDefinition {
        states: vec!["q0".to_string()],
        alphabet: vec![String::new()],
        ..definition
    };
    assert_eq!(
        definition.build().unwrap_err(),
        DefinitionError::EmptyIdentifier("alphabet")
    );
}

#[test]
fn test_duplicate_declarations() {
    assert_eq!(
        build_err(fields("q0,q1,q0", "a", "q0", "", "")),
        DefinitionError::DuplicateState("q0".to_string())
    );
    assert_eq!(
        build_err(fields("q0", "a,b,a", "q0", "", "")),
        DefinitionError::DuplicateSymbol("a".to_string())
    );
}

#[test]
fn test_unknown_start_and_accept() {
    assert_eq!(
        build_err(fields("q0", "a", "q9", "", "q0 a q0")),
        DefinitionError::UnknownStart("q9".to_string())
    );
    assert_eq!(
        build_err(fields("q0", "a", "q0", "q0,q9", "q0 a q0")),
        DefinitionError::UnknownAcceptState("q9".to_string())
    );
}

#[test]
fn test_unknown_state_and_symbol_in_rule() {
    assert_eq!(
        build_err(fields("q0", "a", "q0", "", "q0 a q9")),
        DefinitionError::UnknownState {
            rule: "q0 a q9".to_string(),
            state: "q9".to_string(),
        }
    );
    assert_eq!(
        build_err(fields("q0", "a", "q0", "", "q0 a q0; q0 b q0")),
        DefinitionError::UnknownSymbol {
            rule: "q0 b q0".to_string(),
            symbol: "b".to_string(),
        }
    );
}

#[test]
fn test_conflicting_transition() {
    assert_eq!(
        build_err(fields("q0,q1", "a", "q0", "", "q0 a q0; q1 a q1; q0 a q1")),
        DefinitionError::ConflictingTransition {
            state: "q0".to_string(),
            symbol: "a".to_string(),
            first: "q0".to_string(),
            second: "q1".to_string(),
        }
    );
}

#[test]
fn test_incomplete_transitions() {
    let err = build_err(fields("q0,q1", "a,b", "q0", "q1", "q0 a q1"));
    assert_eq!(
        err,
        DefinitionError::IncompleteTransitions(vec![
            ("q0".to_string(), "b".to_string()),
            ("q1".to_string(), "a".to_string()),
            ("q1".to_string(), "b".to_string()),
        ])
    );
    assert_eq!(
        err.to_string(),
        "the transition function is not total, missing: (q0, b), (q1, a), (q1, b)"
    );
}

#[test]
fn test_syntax_error_is_reported_before_validation() {
    assert_eq!(
        build_err(fields("q0", "a", "q0", "", "q0 a")),
        DefinitionError::Syntax {
            field: "transitions",
            remaining: "q0 a".to_string(),
        }
    );
}

#[test]
fn test_fields_from_json() {
    let fields: DfaFields = serde_json::from_str(
        r#"{ "states": "q0", "alphabet": "a", "start": "q0", "transitions": "q0 a q0" }"#,
    )
    .unwrap();

    assert_eq!(fields.accept, "");
    let dfa = fields.build().unwrap();
    assert_eq!(dfa.accepting_states().count(), 0);
}

const CONTAINS_ONE_TOML: &str = r#"
states = ["q0", "q1"]
alphabet = ["0", "1"]
start = "q0"
accept = ["q1"]

[[transitions]]
from = "q0"
symbol = "0"
to = "q0"

[[transitions]]
from = "q0"
symbol = "1"
to = "q1"

[[transitions]]
from = "q1"
symbol = "0"
to = "q1"

[[transitions]]
from = "q1"
symbol = "1"
to = "q1"
"#;

#[test]
fn test_definition_from_files() {
    let dir = tempdir().unwrap();

    let toml_path = dir.path().join("contains_one.toml");
    fs::write(&toml_path, CONTAINS_ONE_TOML).unwrap();
    let from_toml = DfaDefinition::from_file(&toml_path).unwrap();

    assert_eq!(from_toml.states, vec!["q0", "q1"]);
    assert_eq!(from_toml.transitions[1], TransitionRule::new("q0", "1", "q1"));

    let json_path = dir.path().join("contains_one.json");
    fs::write(&json_path, serde_json::to_string_pretty(&from_toml).unwrap()).unwrap();
    let from_json = DfaDefinition::from_file(&json_path).unwrap();

    assert_eq!(from_toml, from_json);

    let left = from_toml.build().unwrap();
    let right = fields(
        "q0,q1",
        "0,1",
        "q0",
        "q1",
        "q0 0 q0; q0 1 q1; q1 0 q1; q1 1 q1",
    )
    .build()
    .unwrap();
    assert!(check_equivalence(&left, &right).unwrap().is_success());
}

#[test]
fn test_definition_from_invalid_files() {
    let dir = tempdir().unwrap();

    assert!(DfaDefinition::from_file(dir.path().join("missing.toml")).is_err());

    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"states\": [\"q0\"] }").unwrap();
    assert!(DfaDefinition::from_file(&path).is_err());
}

#[test]
fn test_demo_files() {
    let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");

    let left = DfaDefinition::from_file(demos.join("contains_one.toml"))
        .unwrap()
        .build()
        .unwrap();
    let right = DfaDefinition::from_file(demos.join("ends_in_one.json"))
        .unwrap()
        .build()
        .unwrap();

    let witness = check_equivalence(&left, &right).unwrap().unwrap_failure();
    assert_eq!(word_to_string(&witness), "10");

    let config = DfaEquivConfig::from_file(demos.join("config.toml")).unwrap();
    assert_eq!(config.get_render().get_format(), &ImageFormat::Svg);
}
