//! Edge inference.
//!
//! Two nodes are connected when their state vectors differ by exactly one
//! atomic change: a single dimension of a single element either fails (active
//! to inactive, same count) or recovers (inactive to active, count plus one).
//! The result depends only on the state vectors, never on the order in which
//! nodes were enumerated.

use log::debug;

use crate::element::{Dimension, ElementState};
use crate::network::{EdgeKind, NetworkEdge, NetworkNode};
use crate::system::System;

/// A single atomic change from one state vector to another.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Transition {
    pub kind: EdgeKind,
    pub element: usize,
    pub dimension: Dimension,
}

/// Returns the transition leading from `from` to `to`, if they differ by
/// exactly one atomic change.
pub fn single_transition(from: &[ElementState], to: &[ElementState]) -> Option<Transition> {
    debug_assert_eq!(from.len(), to.len());

    let mut differing = from.iter().zip(to.iter()).enumerate().filter(|(_, (a, b))| a != b);
    let (element, (before, after)) = differing.next()?;
    if differing.next().is_some() {
        return None;
    }

    let mut changed = Dimension::ALL
        .into_iter()
        .filter(|&d| before.get(d) != after.get(d));
    let dimension = changed.next()?;
    if changed.next().is_some() {
        return None;
    }

    let (before, after) = (before.get(dimension)?, after.get(dimension)?);
    let kind = if before.is_active && !after.is_active && before.count == after.count {
        EdgeKind::Failure
    } else if !before.is_active && after.is_active && after.count == before.count + 1 {
        EdgeKind::Recovery
    } else {
        return None;
    };

    Some(Transition {
        kind,
        element,
        dimension,
    })
}

/// Infers all edges between `nodes` by comparing every pair once.
///
/// A failure of a dimension with an unbounded budget is followed by a
/// reciprocal recovery edge back to the source when `reciprocal_unbounded`
/// is set.
pub fn infer_edges(system: &System, nodes: &[NetworkNode], reciprocal_unbounded: bool) -> Vec<NetworkEdge> {
    let mut edges = Vec::new();

    for (i, a) in nodes.iter().enumerate() {
        for b in nodes[i + 1..].iter() {
            let forward = single_transition(&a.elements_states, &b.elements_states);
            let backward = single_transition(&b.elements_states, &a.elements_states);
            let (source, target, transition) = match (forward, backward) {
                (Some(t), None) => (a, b, t),
                (None, Some(t)) => (b, a, t),
                _ => continue,
            };

            let edge = NetworkEdge {
                kind: transition.kind,
                source: source.id,
                target: target.id,
                element: transition.element,
                dimension: transition.dimension,
            };
            debug!("edge {} -> {}: {} of {}#{}", edge.source, edge.target, edge.kind, edge.dimension, edge.element);
            edges.push(edge);

            let unbounded = system
                .element(transition.element)
                .budgets
                .get(transition.dimension)
                .is_some_and(|budget| budget.is_unbounded());
            if reciprocal_unbounded && transition.kind == EdgeKind::Failure && unbounded {
                edges.push(NetworkEdge {
                    kind: EdgeKind::Recovery,
                    source: target.id,
                    target: source.id,
                    ..edge
                });
            }
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use test_log::test;

    use super::*;
    use crate::element::{Budget, Dimensions, ElementConfig, RecoveryState};
    use crate::generate::{enumerate_states, GeneratorConfig};
    use crate::network::NodeId;
    use crate::system::NodeState;

    fn hw(count: u32, is_active: bool) -> ElementState {
        Dimensions::Hardware(RecoveryState { count, is_active })
    }

    fn sw(count: u32, is_active: bool) -> ElementState {
        Dimensions::Software(RecoveryState { count, is_active })
    }

    fn node(id: usize, states: Vec<ElementState>) -> NetworkNode {
        NetworkNode {
            id: NodeId::new(id),
            state: NodeState::Active,
            elements_states: states,
            change: None,
        }
    }

    fn system(expression: &str, entries: &[(&str, ElementConfig)]) -> System {
        let configs: HashMap<String, ElementConfig> =
            entries.iter().map(|(name, config)| (name.to_string(), *config)).collect();
        System::from_expression(expression, &configs).unwrap()
    }

    #[test]
    fn test_single_failure() {
        let t = single_transition(&[hw(0, true), hw(0, true)], &[hw(0, false), hw(0, true)]);
        assert_eq!(
            t,
            Some(Transition {
                kind: EdgeKind::Failure,
                element: 0,
                dimension: Dimension::Hardware
            })
        );
        // Reverse direction is not a failure, nor a recovery (count unchanged).
        assert_eq!(single_transition(&[hw(0, false), hw(0, true)], &[hw(0, true), hw(0, true)]), None);
    }

    #[test]
    fn test_single_recovery() {
        let t = single_transition(&[sw(1, false)], &[sw(2, true)]);
        assert_eq!(
            t,
            Some(Transition {
                kind: EdgeKind::Recovery,
                element: 0,
                dimension: Dimension::Software
            })
        );
        assert_eq!(single_transition(&[sw(0, false)], &[sw(2, true)]), None);
    }

    #[test]
    fn test_two_elements_differ() {
        assert_eq!(single_transition(&[hw(0, true), hw(0, true)], &[hw(0, false), hw(0, false)]), None);
    }

    #[test]
    fn test_two_dimensions_differ() {
        let from = [Dimensions::Both {
            hardware: RecoveryState::INITIAL,
            software: RecoveryState::INITIAL,
        }];
        let to = [Dimensions::Both {
            hardware: RecoveryState::INITIAL.failed(),
            software: RecoveryState::INITIAL.failed(),
        }];
        assert_eq!(single_transition(&from, &to), None);
        assert_eq!(single_transition(&from, &from), None);
    }

    #[test]
    fn test_failure_edge_bounded() {
        let system = system("A & B", &[("A", ElementConfig::hardware(1)), ("B", ElementConfig::hardware(1))]);
        let nodes = vec![
            node(0, vec![hw(0, true), hw(0, true)]),
            node(1, vec![hw(0, false), hw(0, true)]),
        ];
        let edges = infer_edges(&system, &nodes, true);
        assert_eq!(
            edges,
            vec![NetworkEdge {
                kind: EdgeKind::Failure,
                source: NodeId::new(0),
                target: NodeId::new(1),
                element: 0,
                dimension: Dimension::Hardware,
            }]
        );
    }

    #[test]
    fn test_failure_edge_unbounded_reciprocal() {
        let system = system(
            "A & B",
            &[("A", ElementConfig::software(Budget::Unbounded)), ("B", ElementConfig::hardware(1))],
        );
        // Listed target first: direction comes from the states, not the order.
        let nodes = vec![
            node(0, vec![sw(0, false), hw(0, true)]),
            node(1, vec![sw(0, true), hw(0, true)]),
        ];
        let edges = infer_edges(&system, &nodes, true);
        assert_eq!(edges.len(), 2);
        assert_eq!((edges[0].kind, edges[0].source, edges[0].target), (EdgeKind::Failure, NodeId::new(1), NodeId::new(0)));
        assert_eq!((edges[1].kind, edges[1].source, edges[1].target), (EdgeKind::Recovery, NodeId::new(0), NodeId::new(1)));
        assert_eq!(edges[1].dimension, Dimension::Software);

        assert_eq!(infer_edges(&system, &nodes, false).len(), 1);
    }

    #[test]
    fn test_no_edge_for_multi_element_diff() {
        let system = system("A | B", &[("A", ElementConfig::hardware(1)), ("B", ElementConfig::hardware(1))]);
        let nodes = vec![
            node(0, vec![hw(0, true), hw(0, true)]),
            node(1, vec![hw(0, false), hw(0, false)]),
        ];
        assert!(infer_edges(&system, &nodes, true).is_empty());
    }

    #[test]
    fn test_chain_budget_one() {
        let system = system("A", &[("A", ElementConfig::hardware(1))]);
        let nodes = enumerate_states(&system, &GeneratorConfig::default()).unwrap();
        let edges = infer_edges(&system, &nodes, true);
        let summary: Vec<(EdgeKind, usize, usize)> = edges
            .iter()
            .map(|e| (e.kind, e.source.index(), e.target.index()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (EdgeKind::Failure, 0, 1),
                (EdgeKind::Recovery, 1, 2),
                (EdgeKind::Failure, 2, 3),
            ]
        );
    }
}
