use std::fmt::{Debug, Display};

use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use node::DfaNode;
use petgraph::{
    graph::{DiGraph, EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use crate::automaton::{Alphabet, AutomatonNode, DeterministicAutomaton, Letter};

pub mod node;

/// Errors raised by the DFA model itself.
///
/// States and letters are carried in their `Debug` form so the error does not
/// depend on the node and letter types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DfaError {
    /// The transition function has no entry for a (state, letter) pair.
    #[error("no transition from state {state} on letter {letter}")]
    MissingTransition { state: String, letter: String },
    /// Adding the transition would give a (state, letter) pair two different
    /// successors.
    #[error(
        "state {state} already moves to {existing} on letter {letter}, cannot add a transition to {new}"
    )]
    Nondeterministic {
        state: String,
        letter: String,
        existing: String,
        new: String,
    },
    #[error("state index {0} does not exist")]
    UnknownState(usize),
    #[error("letter {0} is not part of the alphabet")]
    UnknownLetter(String),
    #[error("the automaton has no start state")]
    MissingStart,
}

/// A deterministic finite automaton.
///
/// States live in a [`DiGraph`], one edge per transition. Next to the graph we
/// keep a two-level table (state -> letter -> successor) so that
/// [`DeterministicAutomaton::transition`] is a constant time lookup.
///
/// The builder methods do not require the transition function to be total.
/// Use [`Dfa::missing_transitions`] to find the gaps.
#[derive(Clone)]
pub struct Dfa<N: AutomatonNode, E: Letter> {
    start: Option<NodeIndex<u32>>,
    graph: DiGraph<DfaNode<N>, E>,
    alphabet: Vec<E>,
    table: Vec<HashMap<E, (NodeIndex<u32>, EdgeIndex<u32>)>>,
}

impl<N: AutomatonNode, E: Letter> Dfa<N, E> {
    pub fn new(alphabet: Vec<E>) -> Self {
        Dfa {
            alphabet,
            start: None,
            graph: DiGraph::new(),
            table: Vec::new(),
        }
    }

    pub fn graph(&self) -> &DiGraph<DfaNode<N>, E> {
        &self.graph
    }

    pub fn add_state(&mut self, data: DfaNode<N>) -> NodeIndex<u32> {
        self.table.push(HashMap::new());
        self.graph.add_node(data)
    }

    /// Adds the transition `from -letter-> to`.
    ///
    /// Adding a transition that already exists returns the existing edge.
    /// A transition to a different target for the same (state, letter) pair
    /// is rejected with [`DfaError::Nondeterministic`].
    pub fn add_transition(
        &mut self,
        from: NodeIndex<u32>,
        to: NodeIndex<u32>,
        letter: E,
    ) -> Result<EdgeIndex<u32>, DfaError> {
        self.check_state(from)?;
        self.check_state(to)?;

        if !self.alphabet.contains(&letter) {
            return Err(DfaError::UnknownLetter(format!("{:?}", letter)));
        }

        if let Some((existing, edge)) = self.table[from.index()].get(&letter) {
            if *existing == to {
                return Ok(*edge);
            }

            return Err(DfaError::Nondeterministic {
                state: self.describe_state(from),
                letter: format!("{:?}", letter),
                existing: self.describe_state(*existing),
                new: self.describe_state(to),
            });
        }

        let edge = self.graph.add_edge(from, to, letter.clone());
        self.table[from.index()].insert(letter, (to, edge));

        Ok(edge)
    }

    pub fn set_start(&mut self, start: NodeIndex<u32>) -> Result<(), DfaError> {
        self.check_state(start)?;
        self.start = Some(start);
        Ok(())
    }

    pub fn transition_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn state_data(&self, state: NodeIndex<u32>) -> Option<&N> {
        self.graph.node_weight(state).map(|node| node.data())
    }

    /// Returns the first state carrying `data`.
    pub fn find_state(&self, data: &N) -> Option<NodeIndex<u32>> {
        self.graph
            .node_indices()
            .find(|node| &self.graph[*node].data == data)
    }

    pub fn accepting_states(&self) -> impl Iterator<Item = NodeIndex<u32>> + '_ {
        self.graph
            .node_indices()
            .filter(|node| self.graph[*node].accepting)
    }

    /// Iterates over all transitions as `(from, letter, to)`.
    pub fn transitions(&self) -> impl Iterator<Item = (NodeIndex<u32>, &E, NodeIndex<u32>)> {
        self.graph
            .edge_references()
            .map(|edge| (edge.source(), edge.weight(), edge.target()))
    }

    /// All (state, letter) pairs without a transition, in state then alphabet
    /// order.
    pub fn missing_transitions(&self) -> Vec<(NodeIndex<u32>, E)> {
        self.graph
            .node_indices()
            .cartesian_product(self.alphabet.iter())
            .filter(|(state, letter)| !self.table[state.index()].contains_key(*letter))
            .map(|(state, letter)| (state, letter.clone()))
            .collect_vec()
    }

    /// A DFA is complete if every state has a transition for every letter in
    /// the alphabet.
    pub fn is_complete(&self) -> bool {
        self.graph.node_indices().all(|state| {
            self.alphabet
                .iter()
                .all(|letter| self.table[state.index()].contains_key(letter))
        })
    }

    /// The edges taken when reading `input` from the start state.
    pub fn path_edges<'a>(
        &self,
        input: impl IntoIterator<Item = &'a E>,
    ) -> Result<HashSet<EdgeIndex<u32>>, DfaError>
    where
        E: 'a,
    {
        let mut current = self.start.ok_or(DfaError::MissingStart)?;
        let mut edges = HashSet::new();

        for letter in input {
            let (next, edge) = self.lookup(current, letter)?;
            edges.insert(edge);
            current = next;
        }

        Ok(edges)
    }

    fn lookup(
        &self,
        state: NodeIndex<u32>,
        letter: &E,
    ) -> Result<(NodeIndex<u32>, EdgeIndex<u32>), DfaError> {
        self.table
            .get(state.index())
            .and_then(|row| row.get(letter))
            .copied()
            .ok_or_else(|| DfaError::MissingTransition {
                state: self.describe_state(state),
                letter: format!("{:?}", letter),
            })
    }

    fn check_state(&self, state: NodeIndex<u32>) -> Result<(), DfaError> {
        if state.index() < self.graph.node_count() {
            Ok(())
        } else {
            Err(DfaError::UnknownState(state.index()))
        }
    }

    fn describe_state(&self, state: NodeIndex<u32>) -> String {
        match self.state_data(state) {
            Some(data) => format!("{:?}", data),
            None => format!("#{}", state.index()),
        }
    }
}

impl<N: AutomatonNode + Display, E: Letter + Display> Dfa<N, E> {
    /// Graphviz source for this automaton. Accepting states are drawn with a
    /// double circle, the start state is marked by an arrow from an unlabeled
    /// point. Edges in `highlight` are colored red.
    pub fn to_graphviz(&self, highlight: Option<&HashSet<EdgeIndex<u32>>>) -> String {
        let mut dot = String::new();
        dot.push_str("digraph finite_state_machine {\n");
        dot.push_str("fontname=\"Helvetica,Arial,sans-serif\"\n");
        dot.push_str("node [fontname=\"Helvetica,Arial,sans-serif\"]\n");
        dot.push_str("edge [fontname=\"Helvetica,Arial,sans-serif\"]\n");
        dot.push_str("rankdir=LR;\n");
        dot.push_str("node [shape=point,label=\"\"]START\n");

        for node in self.graph.node_indices() {
            let data = &self.graph[node];
            let shape = if data.accepting {
                "doublecircle"
            } else {
                "circle"
            };

            dot.push_str(&format!(
                "{} [shape={} label=\"{}\"];\n",
                node.index(),
                shape,
                escape_label(&data.data.to_string())
            ));
        }

        if let Some(start) = self.start {
            dot.push_str(&format!("START -> {};\n", start.index()));
        }

        for edge in self.graph.edge_references() {
            let mut attrs = vec![(
                "label",
                format!("\"{}\"", escape_label(&edge.weight().to_string())),
            )];

            if let Some(edges) = highlight
                && edges.contains(&edge.id())
            {
                attrs.push(("color", "red".to_string()));
            }

            dot.push_str(&format!(
                "{} -> {} [ {} ];\n",
                edge.source().index(),
                edge.target().index(),
                attrs.iter().map(|(k, v)| format!("{}={}", k, v)).join(" ")
            ));
        }

        dot.push_str("}\n");

        dot
    }
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

impl<N: AutomatonNode, E: Letter> Alphabet for Dfa<N, E> {
    type Letter = E;

    fn alphabet(&self) -> &[E] {
        &self.alphabet
    }
}

impl<N: AutomatonNode, E: Letter> DeterministicAutomaton for Dfa<N, E> {
    type NIndex = NodeIndex<u32>;

    fn state_count(&self) -> usize {
        self.graph.node_count()
    }

    fn get_start(&self) -> Option<NodeIndex<u32>> {
        self.start
    }

    fn is_accepting(&self, node: NodeIndex<u32>) -> bool {
        self.graph
            .node_weight(node)
            .is_some_and(|data| data.accepting)
    }

    fn transition(&self, node: NodeIndex<u32>, letter: &E) -> Result<NodeIndex<u32>, DfaError> {
        self.lookup(node, letter).map(|(next, _)| next)
    }
}

impl<N: AutomatonNode, E: Letter> Debug for Dfa<N, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dfa")
            .field("alphabet", &self.alphabet)
            .field("state_count", &self.graph.node_count())
            .field(
                "states",
                &self
                    .graph
                    .node_indices()
                    .map(|node| (&self.graph[node].data, node))
                    .collect_vec(),
            )
            .field("initial_state", &self.start)
            .field("final_states", &self.accepting_states().collect_vec())
            .field("edge_count", &self.graph.edge_count())
            .field(
                "edges",
                &self
                    .graph
                    .edge_references()
                    .map(|edge| {
                        format!(
                            "{:?} --- {:?} --> {:?}",
                            edge.source(),
                            edge.weight(),
                            edge.target()
                        )
                    })
                    .collect_vec(),
            )
            .finish()
    }
}
