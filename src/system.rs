//! Bound systems: expression trees whose leaves carry element budgets.
//!
//! A [`System`] stores its tree as a flat arena in post-order, so children
//! always precede their parent and the root is the last node. Elements are
//! numbered in the order their leaves are reached, which is the left-to-right
//! order of operands in the source expression. That numbering is the index
//! used by every state vector downstream.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use log::{debug, warn};
use num_bigint::BigUint;

use crate::ast::{parse, Ast};
use crate::element::{Budget, Dimensions, ElementConfig, ElementState, RecoveryState};
use crate::error::{Error, Result};
use crate::token::Operator;

/// Classification of an element or of the whole system.
///
/// Variants are ordered from weakest to strongest, so AND is [`Ord::min`] and
/// OR is [`Ord::max`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum NodeState {
    Terminal,
    Recovery,
    Active,
}

impl NodeState {
    /// Series composition: as weak as the weakest side.
    pub fn and(self, other: Self) -> Self {
        self.min(other)
    }

    /// Parallel composition: as strong as the strongest side.
    pub fn or(self, other: Self) -> Self {
        self.max(other)
    }

    pub fn apply(op: Operator, lhs: Self, rhs: Self) -> Self {
        match op {
            Operator::And => lhs.and(rhs),
            Operator::Or => lhs.or(rhs),
        }
    }
}

impl Display for NodeState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeState::Active => write!(f, "active"),
            NodeState::Recovery => write!(f, "recovery"),
            NodeState::Terminal => write!(f, "terminal"),
        }
    }
}

/// A leaf of the system together with its recovery budgets.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Element {
    pub name: String,
    pub budgets: Dimensions<Budget>,
}

impl Element {
    pub fn new(name: impl Into<String>, budgets: Dimensions<Budget>) -> Self {
        Self {
            name: name.into(),
            budgets,
        }
    }

    /// Every declared dimension active, nothing consumed.
    pub fn initial_state(&self) -> ElementState {
        self.budgets.map(|_, _| RecoveryState::INITIAL)
    }

    /// Classifies this element in the given state.
    ///
    /// Active if every declared dimension is active. Otherwise Recovery if
    /// each failed dimension still has budget left, and Terminal if not.
    pub fn classify(&self, state: &ElementState) -> NodeState {
        let mut result = NodeState::Active;
        for (dimension, budget) in self.budgets.iter() {
            let Some(current) = state.get(dimension) else {
                continue;
            };
            if current.is_active {
                continue;
            }
            if budget.allows(current.count) {
                result = NodeState::Recovery;
            } else {
                return NodeState::Terminal;
            }
        }
        result
    }

    /// Number of distinct states this element can reach.
    pub fn num_states(&self) -> BigUint {
        self.budgets
            .iter()
            .map(|(_, budget)| BigUint::from(budget.num_states()))
            .product()
    }
}

/// Arena index of a [`SystemNode`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Idx(usize);

impl Idx {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SystemNode<I = Idx> {
    /// Index into [`System::elements`].
    Element(usize),
    Operator(Operator, I, I),
}

impl<A> SystemNode<A> {
    #[inline(always)]
    pub fn fmap_ref<B, F>(&self, mut f: F) -> SystemNode<B>
    where
        F: FnMut(&A) -> B,
    {
        match self {
            SystemNode::Element(index) => SystemNode::Element(*index),
            SystemNode::Operator(op, a, b) => SystemNode::Operator(*op, f(a), f(b)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct System {
    /// Post-order: children before parents, root last.
    nodes: Vec<SystemNode>,
    elements: Vec<Element>,
    ast: Ast,
}

impl System {
    /// Attaches a configuration to every leaf of `ast`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownElement`] if a leaf has no configuration,
    /// - [`Error::InvalidConfiguration`] if a configuration declares no dimension.
    pub fn bind(ast: &Ast, configs: &HashMap<String, ElementConfig>) -> Result<Self> {
        let mut system = System {
            nodes: Vec::new(),
            elements: Vec::new(),
            ast: ast.clone(),
        };
        system.push(ast, configs)?;

        for name in configs.keys() {
            if !system.elements.iter().any(|e| &e.name == name) {
                warn!("element `{}` is configured but not used in `{}`", name, ast);
            }
        }

        debug!(
            "bind: {} elements, {} nodes, root {}",
            system.elements.len(),
            system.nodes.len(),
            system.ast
        );
        Ok(system)
    }

    /// Parses `expression` and binds it against `configs`.
    pub fn from_expression(expression: &str, configs: &HashMap<String, ElementConfig>) -> Result<Self> {
        let ast = parse(expression)?;
        Self::bind(&ast, configs)
    }

    fn push(&mut self, ast: &Ast, configs: &HashMap<String, ElementConfig>) -> Result<Idx> {
        let node = match ast {
            Ast::Operand(name) => {
                let config = configs.get(name).ok_or_else(|| Error::UnknownElement(name.clone()))?;
                let budgets = config.dimensions().map_err(|source| Error::InvalidConfiguration {
                    name: name.clone(),
                    source,
                })?;
                self.elements.push(Element::new(name.as_str(), budgets));
                SystemNode::Element(self.elements.len() - 1)
            }
            Ast::Operator(op, left, right) => {
                let left = self.push(left, configs)?;
                let right = self.push(right, configs)?;
                SystemNode::Operator(*op, left, right)
            }
        };
        self.nodes.push(node);
        Ok(Idx(self.nodes.len() - 1))
    }

    pub fn nodes(&self) -> &[SystemNode] {
        &self.nodes
    }

    pub fn root(&self) -> Idx {
        Idx(self.nodes.len() - 1)
    }

    /// Leaf elements, in leaf order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, index: usize) -> &Element {
        &self.elements[index]
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn element_names(&self) -> Vec<String> {
        self.elements.iter().map(|e| e.name.clone()).collect()
    }

    /// The combination where every element is fully active.
    pub fn initial_states(&self) -> Vec<ElementState> {
        self.elements.iter().map(Element::initial_state).collect()
    }

    /// Exact number of state combinations reachable by the enumerator.
    pub fn state_space_size(&self) -> BigUint {
        self.elements.iter().map(Element::num_states).product()
    }

    fn collapse<R, F>(&self, mut collapse: F) -> R
    where
        R: Copy,
        F: FnMut(SystemNode<R>) -> R,
    {
        let mut results: Vec<R> = Vec::with_capacity(self.nodes.len());
        for node in self.nodes.iter() {
            let node = node.fmap_ref(|idx| results[idx.0]);
            let result = collapse(node);
            results.push(result);
        }
        results[self.root().0]
    }

    /// Evaluates the system tree bottom-up over a combination of element states.
    ///
    /// `states` is indexed in leaf order and must hold one state per element;
    /// the length is only checked in debug builds.
    pub fn classify(&self, states: &[ElementState]) -> NodeState {
        debug_assert_eq!(states.len(), self.elements.len(), "one state per element expected");
        self.collapse(|node| match node {
            SystemNode::Element(index) => self.elements[index].classify(&states[index]),
            SystemNode::Operator(op, lhs, rhs) => NodeState::apply(op, lhs, rhs),
        })
    }
}

impl Display for System {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ast)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::element::Dimension;
    use crate::error::ConfigError;

    fn configs(entries: &[(&str, ElementConfig)]) -> HashMap<String, ElementConfig> {
        entries.iter().map(|(name, config)| (name.to_string(), *config)).collect()
    }

    fn hw(count: u32, is_active: bool) -> ElementState {
        Dimensions::Hardware(RecoveryState { count, is_active })
    }

    #[test]
    fn test_node_state_composition() {
        use NodeState::*;
        assert_eq!(Active.and(Recovery), Recovery);
        assert_eq!(Recovery.and(Terminal), Terminal);
        assert_eq!(Active.and(Active), Active);
        assert_eq!(Terminal.or(Recovery), Recovery);
        assert_eq!(Recovery.or(Active), Active);
        assert_eq!(Terminal.or(Terminal), Terminal);
    }

    #[test]
    fn test_element_classify() {
        let element = Element::new("A", Dimensions::Hardware(Budget::Finite(1)));
        assert_eq!(element.classify(&hw(0, true)), NodeState::Active);
        assert_eq!(element.classify(&hw(0, false)), NodeState::Recovery);
        assert_eq!(element.classify(&hw(1, true)), NodeState::Active);
        assert_eq!(element.classify(&hw(1, false)), NodeState::Terminal);
    }

    #[test]
    fn test_element_classify_both_dimensions() {
        let element = Element::new(
            "A",
            Dimensions::Both {
                hardware: Budget::Finite(0),
                software: Budget::Unbounded,
            },
        );
        let state = |hw_active: bool, sw_active: bool| Dimensions::Both {
            hardware: RecoveryState {
                count: 0,
                is_active: hw_active,
            },
            software: RecoveryState {
                count: 0,
                is_active: sw_active,
            },
        };
        assert_eq!(element.classify(&state(true, true)), NodeState::Active);
        assert_eq!(element.classify(&state(true, false)), NodeState::Recovery);
        assert_eq!(element.classify(&state(false, true)), NodeState::Terminal);
        assert_eq!(element.classify(&state(false, false)), NodeState::Terminal);
    }

    #[test]
    fn test_bind_leaf_order() {
        let configs = configs(&[
            ("A", ElementConfig::hardware(1)),
            ("B", ElementConfig::software(2)),
            ("C", ElementConfig::both(1, 1)),
        ]);
        let system = System::from_expression("C | (A & B)", &configs).unwrap();
        assert_eq!(system.element_names(), vec!["C", "A", "B"]);
        assert_eq!(system.element(2).budgets, Dimensions::Software(Budget::Finite(2)));
        assert_eq!(system.nodes().len(), 5);
        assert!(matches!(
            system.nodes()[system.root().index()],
            SystemNode::Operator(Operator::Or, _, _)
        ));
    }

    #[test]
    fn test_bind_unknown_element() {
        let configs = configs(&[("A", ElementConfig::hardware(1))]);
        let err = System::from_expression("A & B", &configs).unwrap_err();
        assert_eq!(err, Error::UnknownElement("B".to_string()));
    }

    #[test]
    fn test_bind_invalid_configuration() {
        let configs = configs(&[("A", ElementConfig::default())]);
        let err = System::from_expression("A", &configs).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidConfiguration {
                name: "A".to_string(),
                source: ConfigError::NoDimensions,
            }
        );
    }

    #[test]
    fn test_bind_propagates_parse_error() {
        let err = System::from_expression("", &HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_classify_and() {
        let configs = configs(&[("A", ElementConfig::hardware(1)), ("B", ElementConfig::hardware(1))]);
        let system = System::from_expression("A & B", &configs).unwrap();
        assert_eq!(system.classify(&system.initial_states()), NodeState::Active);
        assert_eq!(system.classify(&[hw(0, false), hw(0, true)]), NodeState::Recovery);
        assert_eq!(system.classify(&[hw(1, false), hw(0, true)]), NodeState::Terminal);
    }

    #[test]
    fn test_classify_or() {
        let configs = configs(&[("A", ElementConfig::hardware(1)), ("B", ElementConfig::hardware(1))]);
        let system = System::from_expression("A | B", &configs).unwrap();
        assert_eq!(system.classify(&[hw(0, false), hw(0, true)]), NodeState::Active);
        assert_eq!(system.classify(&[hw(1, false), hw(0, false)]), NodeState::Recovery);
        assert_eq!(system.classify(&[hw(1, false), hw(1, false)]), NodeState::Terminal);
    }

    #[test]
    fn test_classify_nested() {
        let configs = configs(&[
            ("A", ElementConfig::hardware(0)),
            ("B", ElementConfig::hardware(0)),
            ("C", ElementConfig::hardware(0)),
        ]);
        let system = System::from_expression("A & (B | C)", &configs).unwrap();
        assert_eq!(system.classify(&[hw(0, true), hw(0, false), hw(0, true)]), NodeState::Active);
        assert_eq!(system.classify(&[hw(0, true), hw(0, false), hw(0, false)]), NodeState::Terminal);
        assert_eq!(system.classify(&[hw(0, false), hw(0, true), hw(0, true)]), NodeState::Terminal);
    }

    #[test]
    fn test_state_space_size() {
        let configs = configs(&[
            ("A", ElementConfig::hardware(1)),
            ("B", ElementConfig::both(0, Budget::Unbounded)),
        ]);
        let system = System::from_expression("A | B", &configs).unwrap();
        // A: 4 states; B: 2 * 2 states.
        assert_eq!(system.state_space_size(), BigUint::from(16u32));
        assert!(system.element(1).budgets.has(Dimension::Software));
    }
}
