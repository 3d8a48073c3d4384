use std::{fmt::Debug, hash::Hash};

pub mod dfa;

use dfa::DfaError;

/// This trait represents types that can be used as node data in an automaton.
pub trait AutomatonNode: Debug + Clone + PartialEq + Eq + Hash {}
impl<T> AutomatonNode for T where T: Debug + Clone + PartialEq + Eq + Hash {}

/// This trait represents types that can be used as the letters of an
/// alphabet.
pub trait Letter: Debug + Clone + PartialEq + Eq + Hash + Ord {}
impl<T: Debug + Clone + PartialEq + Eq + Hash + Ord> Letter for T {}

pub trait Alphabet {
    type Letter: Letter;

    /// The alphabet in declaration order.
    fn alphabet(&self) -> &[Self::Letter];
}

/// An automaton with at most one start node in which every (node, letter)
/// pair has at most one successor.
///
/// Node indices are opaque. Two automata can be compared through this trait
/// even if they use different node types, only acceptance and the
/// transition structure are visible.
pub trait DeterministicAutomaton: Alphabet {
    /// The index type used to identify nodes.
    type NIndex: Debug + Copy + Eq + Hash;

    /// Returns the number of nodes in the automaton.
    fn state_count(&self) -> usize;

    /// Returns the start node, or `None` if no start node was set.
    fn get_start(&self) -> Option<Self::NIndex>;

    /// Returns true if the passed in node is accepting. Returns false
    /// otherwise, also for invalid indices.
    fn is_accepting(&self, node: Self::NIndex) -> bool;

    /// Returns the successor of `node` on `letter`, or
    /// [`DfaError::MissingTransition`] if the transition function has no entry
    /// for the pair.
    fn transition(
        &self,
        node: Self::NIndex,
        letter: &Self::Letter,
    ) -> Result<Self::NIndex, DfaError>;

    fn successor(&self, node: Self::NIndex, letter: &Self::Letter) -> Option<Self::NIndex> {
        self.transition(node, letter).ok()
    }

    /// Follows `input` from the start node and returns the node the run ends
    /// in.
    fn run<'a>(
        &self,
        input: impl IntoIterator<Item = &'a Self::Letter>,
    ) -> Result<Self::NIndex, DfaError>
    where
        Self::Letter: 'a,
    {
        let mut current = self.get_start().ok_or(DfaError::MissingStart)?;

        for letter in input {
            current = self.transition(current, letter)?;
        }

        Ok(current)
    }
}

/// The basic trait for anything that defines a language over a set alphabet.
pub trait Language: Alphabet {
    fn accepts<'a>(
        &self,
        input: impl IntoIterator<Item = &'a Self::Letter>,
    ) -> Result<bool, DfaError>
    where
        Self::Letter: 'a;
}

impl<T: DeterministicAutomaton> Language for T {
    fn accepts<'a>(
        &self,
        input: impl IntoIterator<Item = &'a Self::Letter>,
    ) -> Result<bool, DfaError>
    where
        Self::Letter: 'a,
    {
        let end = self.run(input)?;
        Ok(self.is_accepting(end))
    }
}
