use std::{
    collections::VecDeque,
    fmt::{Debug, Display},
    time::{Duration, Instant},
};

use hashbrown::HashSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    automaton::{DeterministicAutomaton, dfa::DfaError},
    config::EquivalenceConfig,
    solver::{SolverResult, SolverStatus},
};

/// Which of the two compared automata something refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Inputs on which no verdict can be given. These are never turned into an
/// equivalent / not equivalent answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EquivalenceError {
    #[error("the {side} automaton is malformed: {source}")]
    MalformedAutomaton { side: Side, source: DfaError },
    #[error(
        "the automata have different alphabets (only in left: [{}], only in right: [{}])",
        .only_left.join(", "),
        .only_right.join(", ")
    )]
    AlphabetMismatch {
        only_left: Vec<String>,
        only_right: Vec<String>,
    },
    #[error("the {side} automaton has no start state")]
    MissingStart { side: Side },
}

/// Why a check stopped before reaching a verdict.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquivalenceUnknownReason {
    Timeout,
    ProductStateLimit,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalenceStatistics {
    /// Number of distinct product states that were dequeued.
    pub visited_pairs: usize,
    pub max_queue_len: usize,
    pub time: Duration,
}

/// `True` if the languages are equal, `False` with the shortest
/// distinguishing word otherwise.
pub type EquivalenceStatus<L> = SolverStatus<(), Vec<L>, EquivalenceUnknownReason>;

pub type EquivalenceResult<L> =
    SolverResult<(), Vec<L>, EquivalenceUnknownReason, EquivalenceStatistics>;

/// Checks language equivalence of two automata with the default
/// configuration, i.e. without any resource bounds.
pub fn check_equivalence<A, B>(
    left: &A,
    right: &B,
) -> Result<EquivalenceResult<A::Letter>, EquivalenceError>
where
    A: DeterministicAutomaton,
    B: DeterministicAutomaton<Letter = A::Letter>,
{
    EquivalenceChecker::new(left, right, EquivalenceConfig::default()).check()
}

/// Concatenates a word over a displayable alphabet, e.g. a witness.
pub fn word_to_string<L: Display>(word: &[L]) -> String {
    word.iter().map(|letter| letter.to_string()).join("")
}

fn describe_letters<L: Debug + Ord>(letters: impl Iterator<Item = L>) -> Vec<String> {
    letters
        .sorted()
        .map(|letter| format!("{:?}", letter))
        .collect_vec()
}

/// Breadth first search over the product of two deterministic automata.
///
/// Product states `(left, right)` are explored in FIFO order, successors in
/// the order of the left alphabet. The first product state whose components
/// disagree on acceptance yields the shortest distinguishing word, ties
/// broken by alphabet order. Every product state is expanded at most once, so
/// at most `|left| * |right|` states are visited.
#[derive(Debug)]
pub struct EquivalenceChecker<'a, A, B>
where
    A: DeterministicAutomaton,
    B: DeterministicAutomaton<Letter = A::Letter>,
{
    left: &'a A,
    right: &'a B,
    config: EquivalenceConfig,
    visited: HashSet<(A::NIndex, B::NIndex)>,
    max_queue_len: usize,
    start_time: Option<Instant>,
}

impl<'a, A, B> EquivalenceChecker<'a, A, B>
where
    A: DeterministicAutomaton,
    B: DeterministicAutomaton<Letter = A::Letter>,
{
    pub fn new(left: &'a A, right: &'a B, config: EquivalenceConfig) -> Self {
        EquivalenceChecker {
            left,
            right,
            config,
            visited: HashSet::new(),
            max_queue_len: 0,
            start_time: None,
        }
    }

    pub fn check(&mut self) -> Result<EquivalenceResult<A::Letter>, EquivalenceError> {
        self.start_time = Some(Instant::now());
        self.visited.clear();
        self.max_queue_len = 0;

        self.print_start_banner();

        let status = match self.check_inner() {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(error = %err, "Equivalence check aborted");
                return Err(err);
            }
        };

        let result = EquivalenceResult::new(status, self.get_statistics());
        self.print_end_banner(&result);

        Ok(result)
    }

    fn check_inner(&mut self) -> Result<EquivalenceStatus<A::Letter>, EquivalenceError> {
        self.check_alphabets()?;

        let left_start = self
            .left
            .get_start()
            .ok_or(EquivalenceError::MissingStart { side: Side::Left })?;
        let right_start = self
            .right
            .get_start()
            .ok_or(EquivalenceError::MissingStart { side: Side::Right })?;

        let mut queue = VecDeque::new();
        queue.push_back((left_start, right_start, Vec::new()));

        while let Some((left_state, right_state, word)) = queue.pop_front() {
            if self.visited.contains(&(left_state, right_state)) {
                continue;
            }

            if let Err(status) = self.limits_reached() {
                return Ok(status);
            }

            self.visited.insert((left_state, right_state));

            if self.left.is_accepting(left_state) != self.right.is_accepting(right_state) {
                tracing::debug!(
                    depth = word.len(),
                    left_accepting = self.left.is_accepting(left_state),
                    "Found distinguishing word"
                );
                return Ok(SolverStatus::False(word));
            }

            for letter in self.left.alphabet() {
                let next_left = self.left.transition(left_state, letter).map_err(|source| {
                    EquivalenceError::MalformedAutomaton {
                        side: Side::Left,
                        source,
                    }
                })?;
                let next_right = self.right.transition(right_state, letter).map_err(|source| {
                    EquivalenceError::MalformedAutomaton {
                        side: Side::Right,
                        source,
                    }
                })?;

                let mut next_word = word.clone();
                next_word.push(letter.clone());
                queue.push_back((next_left, next_right, next_word));
            }

            self.max_queue_len = self.max_queue_len.max(queue.len());
        }

        Ok(SolverStatus::True(()))
    }

    /// Both automata must be defined over the same set of letters. The order
    /// may differ, the left alphabet decides the exploration order.
    fn check_alphabets(&self) -> Result<(), EquivalenceError> {
        let left = self.left.alphabet().iter().collect::<HashSet<_>>();
        let right = self.right.alphabet().iter().collect::<HashSet<_>>();

        if left == right {
            return Ok(());
        }

        Err(EquivalenceError::AlphabetMismatch {
            only_left: describe_letters(left.difference(&right)),
            only_right: describe_letters(right.difference(&left)),
        })
    }

    /// Checks the configured product state limit and time limit.
    /// If one is hit, returns the `Unknown` status as an `Err` value.
    fn limits_reached(&self) -> Result<(), EquivalenceStatus<A::Letter>> {
        if let Some(max) = self.config.get_max_product_states()
            && self.visited.len() >= *max
        {
            return Err(SolverStatus::Unknown(
                EquivalenceUnknownReason::ProductStateLimit,
            ));
        }

        if let Some(t) = self.get_time()
            && let Some(max_time) = self.config.get_timeout()
            && &t > max_time
        {
            return Err(SolverStatus::Unknown(EquivalenceUnknownReason::Timeout));
        }

        Ok(())
    }

    fn get_statistics(&self) -> EquivalenceStatistics {
        EquivalenceStatistics {
            visited_pairs: self.visited.len(),
            max_queue_len: self.max_queue_len,
            time: self.get_time().unwrap_or_default(),
        }
    }

    fn get_time(&self) -> Option<Duration> {
        self.start_time.map(|x| x.elapsed())
    }

    fn print_start_banner(&self) {
        tracing::info!(
            left_states = %self.left.state_count(),
            right_states = %self.right.state_count(),
            alphabet_size = %self.left.alphabet().len(),
            "Checking equivalence"
        );
    }

    fn print_end_banner(&self, result: &EquivalenceResult<A::Letter>) {
        tracing::info!(
            result = ?result.status,
            visited_pairs = %result.statistics.visited_pairs,
            max_queue_len = %result.statistics.max_queue_len,
            time = ?result.statistics.time,
            "Result"
        );
    }
}
