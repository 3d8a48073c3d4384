use itertools::{Itertools, repeat_n};

use crate::automaton::{DeterministicAutomaton, Language, dfa::DfaError};

/// Enumerates all words up to `max_word_length` letters, shortest first and in
/// alphabet order of `a` within one length, and returns the first one that
/// `a` and `b` disagree on.
pub fn first_distinguishing_word<A, B>(
    a: &A,
    b: &B,
    max_word_length: usize,
) -> Result<Option<Vec<A::Letter>>, DfaError>
where
    A: DeterministicAutomaton,
    B: DeterministicAutomaton<Letter = A::Letter>,
{
    if a.accepts(&[])? != b.accepts(&[])? {
        return Ok(Some(Vec::new()));
    }

    for i in 1..=max_word_length {
        let combinations = repeat_n(a.alphabet(), i).multi_cartesian_product();

        for word in combinations {
            let word = word.into_iter().cloned().collect_vec();
            if a.accepts(&word)? != b.accepts(&word)? {
                return Ok(Some(word));
            }
        }
    }

    Ok(None)
}

/// Checks if two automata accept the same words up to a certain length.
pub fn same_language<A, B>(a: &A, b: &B, max_word_length: usize) -> Result<bool, DfaError>
where
    A: DeterministicAutomaton,
    B: DeterministicAutomaton<Letter = A::Letter>,
{
    Ok(first_distinguishing_word(a, b, max_word_length)?.is_none())
}

pub fn assert_same_language<A, B>(a: &A, b: &B, max_word_length: usize)
where
    A: DeterministicAutomaton,
    B: DeterministicAutomaton<Letter = A::Letter>,
{
    match first_distinguishing_word(a, b, max_word_length) {
        Ok(None) => {}
        Ok(Some(word)) => match a.accepts(&word) {
            Ok(true) => panic!(
                "{:?} is accepted by automaton `a` but not by automaton `b`. Thus their languages are not equal.",
                word
            ),
            _ => panic!(
                "{:?} is accepted by automaton `b` but not by automaton `a`. Thus their languages are not equal.",
                word
            ),
        },
        Err(err) => panic!("could not compare the languages: {}", err),
    }
}
