//! State networks: reachable state combinations and the atomic transitions
//! between them.

use std::fmt::{Display, Formatter};

use crate::element::{Dimension, ElementState};
use crate::system::NodeState;

/// Identifier of a [`NetworkNode`], its index in [`StateNetwork::nodes`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ChangeKind {
    Failure(Dimension),
    /// Failure of a dimension with an unbounded budget.
    InfiniteFailure(Dimension),
    Recovery(Dimension),
}

impl ChangeKind {
    pub const fn dimension(self) -> Dimension {
        match self {
            ChangeKind::Failure(d) | ChangeKind::InfiniteFailure(d) | ChangeKind::Recovery(d) => d,
        }
    }
}

/// The atomic change that produced a node during enumeration.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Change {
    /// Leaf index of the changed element.
    pub element: usize,
    pub kind: ChangeKind,
}

impl Display for Change {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let action = match self.kind {
            ChangeKind::Failure(_) => "fail",
            ChangeKind::InfiniteFailure(_) => "fail*",
            ChangeKind::Recovery(_) => "recover",
        };
        write!(f, "{} {}#{}", action, self.kind.dimension().short_name(), self.element)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NetworkNode {
    pub id: NodeId,
    pub state: NodeState,
    /// One entry per element, in leaf order.
    pub elements_states: Vec<ElementState>,
    /// `None` for the initial, fully active node.
    pub change: Option<Change>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EdgeKind {
    Failure,
    Recovery,
}

impl Display for EdgeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeKind::Failure => write!(f, "failure"),
            EdgeKind::Recovery => write!(f, "recovery"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct NetworkEdge {
    pub kind: EdgeKind,
    pub source: NodeId,
    pub target: NodeId,
    /// Leaf index of the element whose dimension changes.
    pub element: usize,
    pub dimension: Dimension,
}

/// Number of nodes per classification.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct StateCounts {
    pub active: usize,
    pub recovery: usize,
    pub terminal: usize,
}

/// The finished network. Immutable once built.
#[derive(Debug, Clone)]
pub struct StateNetwork {
    nodes: Vec<NetworkNode>,
    edges: Vec<NetworkEdge>,
    element_names: Vec<String>,
}

impl StateNetwork {
    pub(crate) fn new(nodes: Vec<NetworkNode>, edges: Vec<NetworkEdge>, element_names: Vec<String>) -> Self {
        Self {
            nodes,
            edges,
            element_names,
        }
    }

    pub fn nodes(&self) -> &[NetworkNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[NetworkEdge] {
        &self.edges
    }

    /// Element names in leaf order, matching every `elements_states` vector.
    pub fn element_names(&self) -> &[String] {
        &self.element_names
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: NodeId) -> &NetworkNode {
        &self.nodes[id.0]
    }

    /// The fully active node. Always the first one.
    pub fn initial(&self) -> &NetworkNode {
        &self.nodes[0]
    }

    /// Finds the node whose element states equal `states`.
    pub fn find(&self, states: &[ElementState]) -> Option<&NetworkNode> {
        self.nodes.iter().find(|node| node.elements_states == states)
    }

    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &NetworkEdge> {
        self.edges.iter().filter(move |edge| edge.source == id)
    }

    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = &NetworkEdge> {
        self.edges.iter().filter(move |edge| edge.target == id)
    }

    /// Whether no transition leaves this node.
    pub fn is_absorbing(&self, id: NodeId) -> bool {
        self.outgoing(id).next().is_none()
    }

    pub fn count_by_state(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for node in self.nodes.iter() {
            match node.state {
                NodeState::Active => counts.active += 1,
                NodeState::Recovery => counts.recovery += 1,
                NodeState::Terminal => counts.terminal += 1,
            }
        }
        counts
    }

    /// Human-readable description of a node's element states, e.g. `A=hw-0 B=hw+1`.
    pub fn describe(&self, id: NodeId) -> String {
        self.element_names
            .iter()
            .zip(self.node(id).elements_states.iter())
            .map(|(name, state)| format!("{}={}", name, state))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
