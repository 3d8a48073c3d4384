//! Textual and serialized DFA definitions.
//!
//! A DFA can be described with the five fields of a web form, each a plain
//! string:
//!
//! ```text
//! states:      q0, q1
//! alphabet:    0, 1
//! start:       q0
//! accept:      q1
//! transitions: q0 0 q0; q0 1 q1; q1 0 q1; q1 1 q1
//! ```
//!
//! Lists are comma separated, transition rules are `state symbol next-state`
//! separated by semicolons. Whitespace around entries is ignored, as are empty
//! list entries and empty rules. Identifiers cannot contain whitespace, `,` or
//! `;`.
//!
//! [`DfaFields::parse`] turns the text into a [`DfaDefinition`], which can
//! also be read from TOML or JSON files. [`DfaDefinition::build`] validates
//! the definition and produces a complete [`Dfa`].
use std::{fmt::Display, path::Path};

use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use nom::{
    Parser,
    bytes::complete::{tag, take_till1},
    character::complete::{multispace0, multispace1},
    combinator::opt,
    error::ParseError,
    sequence::delimited,
};
use serde::{Deserialize, Serialize};

use crate::automaton::dfa::{Dfa, DfaError, node::DfaNode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("invalid {field} field, could not parse {remaining:?}")]
    Syntax {
        field: &'static str,
        remaining: String,
    },
    #[error("the {0} field contains an empty identifier")]
    EmptyIdentifier(&'static str),
    #[error("the automaton has no states")]
    NoStates,
    #[error("state {0} is declared more than once")]
    DuplicateState(String),
    #[error("symbol {0} is declared more than once")]
    DuplicateSymbol(String),
    #[error("start state {0} is not a declared state")]
    UnknownStart(String),
    #[error("accepting state {0} is not a declared state")]
    UnknownAcceptState(String),
    #[error("transition {rule} uses undeclared state {state}")]
    UnknownState { rule: String, state: String },
    #[error("transition {rule} uses undeclared symbol {symbol}")]
    UnknownSymbol { rule: String, symbol: String },
    #[error("conflicting transitions from {state} on {symbol}: to {first} and to {second}")]
    ConflictingTransition {
        state: String,
        symbol: String,
        first: String,
        second: String,
    },
    #[error(
        "the transition function is not total, missing: {}",
        .0.iter().map(|(state, symbol)| format!("({state}, {symbol})")).join(", ")
    )]
    IncompleteTransitions(Vec<(String, String)>),
    #[error(transparent)]
    Dfa(#[from] DfaError),
}

/// One rule `from symbol to` of the transition function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionRule {
    pub from: String,
    pub symbol: String,
    pub to: String,
}

impl TransitionRule {
    pub fn new(from: impl Into<String>, symbol: impl Into<String>, to: impl Into<String>) -> Self {
        TransitionRule {
            from: from.into(),
            symbol: symbol.into(),
            to: to.into(),
        }
    }
}

impl Display for TransitionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.from, self.symbol, self.to)
    }
}

/// A DFA over string identifiers, as written in definition files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfaDefinition {
    pub states: Vec<String>,
    pub alphabet: Vec<String>,
    pub start: String,
    #[serde(default)]
    pub accept: Vec<String>,
    #[serde(default)]
    pub transitions: Vec<TransitionRule>,
}

impl DfaDefinition {
    /// Reads a definition from a `.json` file, or a TOML file for any other
    /// extension.
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> anyhow::Result<Self> {
        let path = file_path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    /// Validates the definition and builds the automaton.
    ///
    /// The result is deterministic and complete, with states added in
    /// declaration order. Duplicate rules with the same target are accepted,
    /// duplicate accepting states are ignored.
    pub fn build(&self) -> Result<Dfa<String, String>, DefinitionError> {
        if self.states.is_empty() {
            return Err(DefinitionError::NoStates);
        }

        check_identifiers("states", &self.states)?;
        check_identifiers("alphabet", &self.alphabet)?;
        check_identifiers("start", std::slice::from_ref(&self.start))?;
        check_identifiers("accept", &self.accept)?;

        if let Some(state) = self.states.iter().duplicates().next() {
            return Err(DefinitionError::DuplicateState(state.clone()));
        }
        if let Some(symbol) = self.alphabet.iter().duplicates().next() {
            return Err(DefinitionError::DuplicateSymbol(symbol.clone()));
        }

        let state_set = self.states.iter().collect::<HashSet<_>>();
        let symbol_set = self.alphabet.iter().collect::<HashSet<_>>();

        if !state_set.contains(&self.start) {
            return Err(DefinitionError::UnknownStart(self.start.clone()));
        }
        if let Some(state) = self.accept.iter().find(|s| !state_set.contains(s)) {
            return Err(DefinitionError::UnknownAcceptState(state.clone()));
        }

        let mut targets: HashMap<(&String, &String), &String> = HashMap::new();
        for rule in &self.transitions {
            for state in [&rule.from, &rule.to] {
                if !state_set.contains(state) {
                    return Err(DefinitionError::UnknownState {
                        rule: rule.to_string(),
                        state: state.clone(),
                    });
                }
            }

            if !symbol_set.contains(&rule.symbol) {
                return Err(DefinitionError::UnknownSymbol {
                    rule: rule.to_string(),
                    symbol: rule.symbol.clone(),
                });
            }

            let first = targets.entry((&rule.from, &rule.symbol)).or_insert(&rule.to);
            if *first != &rule.to {
                return Err(DefinitionError::ConflictingTransition {
                    state: rule.from.clone(),
                    symbol: rule.symbol.clone(),
                    first: (*first).clone(),
                    second: rule.to.clone(),
                });
            }
        }

        let accepting = self.accept.iter().collect::<HashSet<_>>();
        let mut dfa = Dfa::new(self.alphabet.clone());
        let mut indices = HashMap::new();

        for state in &self.states {
            let node = DfaNode::new(accepting.contains(state), state.clone());
            indices.insert(state, dfa.add_state(node));
        }

        dfa.set_start(indices[&self.start])?;

        for rule in &self.transitions {
            dfa.add_transition(indices[&rule.from], indices[&rule.to], rule.symbol.clone())?;
        }

        let missing = dfa.missing_transitions();
        if !missing.is_empty() {
            return Err(DefinitionError::IncompleteTransitions(
                missing
                    .into_iter()
                    .map(|(state, symbol)| (dfa.graph()[state].data.clone(), symbol))
                    .collect_vec(),
            ));
        }

        Ok(dfa)
    }
}

fn check_identifiers(field: &'static str, identifiers: &[String]) -> Result<(), DefinitionError> {
    if identifiers.iter().any(|id| id.trim().is_empty()) {
        return Err(DefinitionError::EmptyIdentifier(field));
    }

    Ok(())
}

/// The raw text fields describing one DFA, see the module docs for the format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DfaFields {
    pub states: String,
    pub alphabet: String,
    pub start: String,
    #[serde(default)]
    pub accept: String,
    #[serde(default)]
    pub transitions: String,
}

impl DfaFields {
    pub fn parse(&self) -> Result<DfaDefinition, DefinitionError> {
        type Error<'a> = nom::error::Error<&'a str>;

        let states = parse_field("states", &self.states, identifier_list::<Error>)?;
        let alphabet = parse_field("alphabet", &self.alphabet, identifier_list::<Error>)?;
        let start = parse_field("start", &self.start, single_identifier::<Error>)?;
        let accept = parse_field("accept", &self.accept, identifier_list::<Error>)?;
        let transitions = parse_field("transitions", &self.transitions, rules::<Error>)?;

        Ok(DfaDefinition {
            states,
            alphabet,
            start,
            accept,
            transitions,
        })
    }

    /// Parses and validates in one go.
    pub fn build(&self) -> Result<Dfa<String, String>, DefinitionError> {
        self.parse()?.build()
    }
}

/// Runs `parser` on the whole `input`, leftover input is a syntax error.
fn parse_field<'a, T>(
    field: &'static str,
    input: &'a str,
    mut parser: impl Parser<&'a str, Output = T, Error = nom::error::Error<&'a str>>,
) -> Result<T, DefinitionError> {
    match parser.parse(input) {
        Ok(("", value)) => Ok(value),
        Ok((remaining, _)) => Err(DefinitionError::Syntax {
            field,
            remaining: remaining.to_string(),
        }),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(DefinitionError::Syntax {
            field,
            remaining: e.input.to_string(),
        }),
        Err(nom::Err::Incomplete(_)) => Err(DefinitionError::Syntax {
            field,
            remaining: input.to_string(),
        }),
    }
}

fn identifier<'a, E: ParseError<&'a str>>(input: &'a str) -> nom::IResult<&'a str, &'a str, E> {
    take_till1(|c: char| c.is_whitespace() || c == ',' || c == ';').parse(input)
}

fn padded_identifier<'a, E: ParseError<&'a str>>(
    input: &'a str,
) -> nom::IResult<&'a str, Option<&'a str>, E> {
    delimited(multispace0, opt(identifier), multispace0).parse(input)
}

// E.g., q0, q1 ,q2
fn identifier_list<'a, E: ParseError<&'a str>>(
    input: &'a str,
) -> nom::IResult<&'a str, Vec<String>, E> {
    let (input, entries) = nom::multi::separated_list0(tag(","), padded_identifier).parse(input)?;

    Ok((
        input,
        entries.into_iter().flatten().map(str::to_string).collect(),
    ))
}

fn single_identifier<'a, E: ParseError<&'a str>>(
    input: &'a str,
) -> nom::IResult<&'a str, String, E> {
    let (input, id) = delimited(multispace0, identifier, multispace0).parse(input)?;
    Ok((input, id.to_string()))
}

// E.g., q0 a q1
fn rule<'a, E: ParseError<&'a str>>(input: &'a str) -> nom::IResult<&'a str, TransitionRule, E> {
    let (input, from) = identifier(input)?;
    let (input, _) = multispace1(input)?;
    let (input, symbol) = identifier(input)?;
    let (input, _) = multispace1(input)?;
    let (input, to) = identifier(input)?;

    Ok((input, TransitionRule::new(from, symbol, to)))
}

// E.g., q0 a q1; q1 a q0;
fn rules<'a, E: ParseError<&'a str>>(
    input: &'a str,
) -> nom::IResult<&'a str, Vec<TransitionRule>, E> {
    let (input, entries) = nom::multi::separated_list0(
        tag(";"),
        delimited(multispace0, opt(rule), multispace0),
    )
    .parse(input)?;

    Ok((input, entries.into_iter().flatten().collect()))
}

#[test]
fn test_identifier_list() {
    let (rest, ids) = identifier_list::<nom::error::Error<&str>>(" q0, q1 ,q2,,").unwrap();
    assert_eq!(rest, "");
    assert_eq!(ids, vec!["q0", "q1", "q2"]);

    let (_, ids) = identifier_list::<nom::error::Error<&str>>("").unwrap();
    assert!(ids.is_empty());
}

#[test]
fn test_identifier_list_rejects_spaces_inside_entry() {
    let (rest, ids) = identifier_list::<nom::error::Error<&str>>("q0, q 1").unwrap();
    assert_eq!(ids, vec!["q0", "q"]);
    assert_eq!(rest, "1");
}

#[test]
fn test_rule() {
    let (_, rule) = rule::<nom::error::Error<&str>>("q0 a q1").unwrap();
    assert_eq!(rule, TransitionRule::new("q0", "a", "q1"));
}

#[test]
fn test_rules() {
    let input = "q0 0 q0; q0 1 q1;\n  q1 0 q1 ;; q1 1 q1;";
    let (rest, rules) = rules::<nom::error::Error<&str>>(input).unwrap();
    assert_eq!(rest, "");
    assert_eq!(rules.len(), 4);
    assert_eq!(rules[1], TransitionRule::new("q0", "1", "q1"));
}

#[test]
fn test_rules_incomplete_rule() {
    let (rest, rules) = rules::<nom::error::Error<&str>>("q0 0 q0; q0 1").unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rest, "q0 1");
}

#[test]
fn test_fields_parse() {
    let fields = DfaFields {
        states: "q0,q1".to_string(),
        alphabet: "0,1".to_string(),
        start: " q0 ".to_string(),
        accept: "q1".to_string(),
        transitions: "q0 0 q0; q0 1 q1; q1 0 q1; q1 1 q1".to_string(),
    };

    let definition = fields.parse().unwrap();
    assert_eq!(definition.states, vec!["q0", "q1"]);
    assert_eq!(definition.alphabet, vec!["0", "1"]);
    assert_eq!(definition.start, "q0");
    assert_eq!(definition.accept, vec!["q1"]);
    assert_eq!(definition.transitions.len(), 4);
}

#[test]
fn test_fields_syntax_errors() {
    let fields = DfaFields {
        states: "q0".to_string(),
        alphabet: "a".to_string(),
        start: "q0 q1".to_string(),
        accept: String::new(),
        transitions: "q0 a q0".to_string(),
    };
    assert_eq!(
        fields.parse(),
        Err(DefinitionError::Syntax {
            field: "start",
            remaining: "q1".to_string()
        })
    );

    let fields = DfaFields {
        start: String::new(),
        ..fields
    };
    assert!(matches!(
        fields.parse(),
        Err(DefinitionError::Syntax { field: "start", .. })
    ));

    let fields = DfaFields {
        start: "q0".to_string(),
        transitions: "q0 a q0 q0".to_string(),
        ..fields
    };
    assert_eq!(
        fields.parse(),
        Err(DefinitionError::Syntax {
            field: "transitions",
            remaining: "q0".to_string()
        })
    );
}
