//! State-space enumeration.
//!
//! Every element moves through its own local states by atomic changes. The
//! enumerator walks those local states element by element, depth first: each
//! local state reached on element `i` becomes a node, after which every
//! combination of elements `0..i` is explored from there before the next local
//! state of `i` is tried. Each combination of local states is produced exactly
//! once, and the first node is always the fully active combination.
//!
//! Edges are not produced here, see [`crate::edges`].

use std::collections::HashSet;

use log::{debug, info};
use num_bigint::BigUint;

use crate::edges::infer_edges;
use crate::element::{Budget, Dimension, Dimensions, ElementState};
use crate::error::{Error, Result};
use crate::network::{Change, ChangeKind, NetworkNode, NodeId, StateNetwork};
use crate::system::System;

/// Which dimension of a dual-dimension element branches first.
///
/// Only the order (and hence the ids) of generated nodes depends on this; the
/// set of nodes and the edges between them do not.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum BranchOrder {
    #[default]
    HardwareFirst,
    SoftwareFirst,
}

impl BranchOrder {
    pub const fn dimensions(self) -> [Dimension; 2] {
        match self {
            BranchOrder::HardwareFirst => [Dimension::Hardware, Dimension::Software],
            BranchOrder::SoftwareFirst => [Dimension::Software, Dimension::Hardware],
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub branch_order: BranchOrder,
    /// Refuse to enumerate state spaces larger than this.
    pub max_nodes: Option<usize>,
    /// Pair every failure of an unbounded dimension with a recovery edge back.
    pub reciprocal_unbounded: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            branch_order: BranchOrder::default(),
            max_nodes: Some(1 << 16),
            reciprocal_unbounded: true,
        }
    }
}

impl GeneratorConfig {
    pub fn with_branch_order(mut self, branch_order: BranchOrder) -> Self {
        self.branch_order = branch_order;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: Option<usize>) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_reciprocal_unbounded(mut self, reciprocal_unbounded: bool) -> Self {
        self.reciprocal_unbounded = reciprocal_unbounded;
        self
    }
}

/// Atomic changes available to an element in `state`, in priority order.
///
/// Failures of active dimensions come first, then recoveries of failed ones;
/// within each group dimensions follow `order`. A failed dimension recovers
/// only with a finite budget that is not yet used up.
pub fn atomic_changes(
    budgets: &Dimensions<Budget>,
    state: &ElementState,
    order: BranchOrder,
) -> Vec<(ChangeKind, ElementState)> {
    let mut changes = Vec::with_capacity(2);

    for dimension in order.dimensions() {
        let (Some(budget), Some(current)) = (budgets.get(dimension), state.get(dimension)) else {
            continue;
        };
        if current.is_active {
            let kind = if budget.is_unbounded() {
                ChangeKind::InfiniteFailure(dimension)
            } else {
                ChangeKind::Failure(dimension)
            };
            changes.extend(state.with(dimension, current.failed()).map(|next| (kind, next)));
        }
    }

    for dimension in order.dimensions() {
        let (Some(budget), Some(current)) = (budgets.get(dimension), state.get(dimension)) else {
            continue;
        };
        if !current.is_active && !budget.is_unbounded() && budget.allows(current.count) {
            changes.extend(
                state
                    .with(dimension, current.recovered())
                    .map(|next| (ChangeKind::Recovery(dimension), next)),
            );
        }
    }

    changes
}

/// A local state of one element and the change that first reached it.
#[derive(Debug, Copy, Clone)]
struct LocalStep {
    kind: ChangeKind,
    state: ElementState,
}

/// Local states of one element reachable from `initial`, depth first, in the
/// order they are first reached. `initial` itself is not included.
///
/// The walk keeps its own stack of pending changes per visited state, so its
/// depth is not bounded by the call stack.
fn local_steps(budgets: &Dimensions<Budget>, initial: ElementState, order: BranchOrder) -> Vec<LocalStep> {
    let mut visited = HashSet::from([initial]);
    let mut steps = Vec::new();
    let mut stack = vec![atomic_changes(budgets, &initial, order).into_iter()];

    while let Some(pending) = stack.last_mut() {
        match pending.next() {
            Some((kind, next)) => {
                if visited.insert(next) {
                    steps.push(LocalStep { kind, state: next });
                    stack.push(atomic_changes(budgets, &next, order).into_iter());
                }
            }
            None => {
                stack.pop();
            }
        }
    }

    steps
}

struct Enumerator<'a> {
    system: &'a System,
    /// Local steps per element, in leaf order.
    steps: Vec<Vec<LocalStep>>,
    nodes: Vec<NetworkNode>,
}

impl<'a> Enumerator<'a> {
    fn new(system: &'a System, order: BranchOrder) -> Self {
        let steps = system
            .elements()
            .iter()
            .map(|element| local_steps(&element.budgets, element.initial_state(), order))
            .collect();
        Self {
            system,
            steps,
            nodes: Vec::new(),
        }
    }

    fn record(&mut self, states: Vec<ElementState>, change: Option<Change>) {
        let id = NodeId::new(self.nodes.len());
        let state = self.system.classify(&states);
        match change {
            Some(change) => debug!("node {} ({}): {}", id, state, change),
            None => debug!("node {} ({}): initial", id, state),
        }
        self.nodes.push(NetworkNode {
            id,
            state,
            elements_states: states,
            change,
        });
    }

    /// Explores every combination of elements `0..end`, the rest fixed as in `states`.
    ///
    /// Elements `0..end` must be in their initial state.
    fn explore(&mut self, states: &[ElementState], end: usize) {
        for element in 0..end {
            for k in 0..self.steps[element].len() {
                let step = self.steps[element][k];
                let mut next = states.to_vec();
                next[element] = step.state;
                self.record(next.clone(), Some(Change { element, kind: step.kind }));
                self.explore(&next, element);
            }
        }
    }

    fn run(mut self) -> Vec<NetworkNode> {
        let initial = self.system.initial_states();
        self.record(initial.clone(), None);
        self.explore(&initial, self.system.num_elements());
        self.nodes
    }
}

/// Enumerates every reachable combination of element states.
///
/// Nodes are returned in generation order; their ids are their positions.
///
/// # Errors
///
/// [`Error::StateSpaceTooLarge`] if the state space exceeds `config.max_nodes`.
pub fn enumerate_states(system: &System, config: &GeneratorConfig) -> Result<Vec<NetworkNode>> {
    let size = system.state_space_size();
    if let Some(limit) = config.max_nodes {
        if size > BigUint::from(limit) {
            return Err(Error::StateSpaceTooLarge { size, limit });
        }
    }
    debug!("enumerate: {} elements, {} combinations", system.num_elements(), size);

    Ok(Enumerator::new(system, config.branch_order).run())
}

/// Builds the full state network of a bound system.
pub fn generate(system: &System, config: &GeneratorConfig) -> Result<StateNetwork> {
    let nodes = enumerate_states(system, config)?;
    let edges = infer_edges(system, &nodes, config.reciprocal_unbounded);
    info!(
        "generated {} nodes and {} edges for `{}` ({} elements)",
        nodes.len(),
        edges.len(),
        system,
        system.num_elements()
    );
    Ok(StateNetwork::new(nodes, edges, system.element_names()))
}
