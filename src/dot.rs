//! State network to DOT (Graphviz) conversion.
//!
//! The generated DOT output follows these conventions:
//! - **Nodes** are labeled with their id and, optionally, the state of every
//!   element, and filled with a color per classification
//! - **Failure edges** are solid, **recovery edges** dashed; both are labeled
//!   with the element name and the changed dimension
//! - The initial (fully active) node is drawn with a double border
//!
//! Layout and drawing are left to Graphviz (`dot`, `neato`, `fdp`, ...).
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//!
//! use relnet::element::ElementConfig;
//!
//! let configs = HashMap::from([("A".to_string(), ElementConfig::hardware(1))]);
//! let network = relnet::build_state_network("A", &configs).unwrap();
//!
//! let dot = network.to_dot().unwrap();
//! assert!(dot.starts_with("digraph {"));
//! // Render with: dot -Tsvg network.dot -o network.svg
//! ```

use crate::network::{EdgeKind, StateNetwork};
use crate::system::NodeState;

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for state nodes (default: "box")
    pub node_shape: &'static str,
    /// Fill color of active nodes (default: "palegreen")
    pub active_color: &'static str,
    /// Fill color of recovery nodes (default: "khaki")
    pub recovery_color: &'static str,
    /// Fill color of terminal nodes (default: "lightcoral")
    pub terminal_color: &'static str,
    /// Style for failure edges (default: "solid")
    pub failure_edge_style: &'static str,
    /// Style for recovery edges (default: "dashed")
    pub recovery_edge_style: &'static str,
    /// Whether node labels list the state of every element (default: true)
    pub show_element_states: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "box",
            active_color: "palegreen",
            recovery_color: "khaki",
            terminal_color: "lightcoral",
            failure_edge_style: "solid",
            recovery_edge_style: "dashed",
            show_element_states: true,
        }
    }
}

impl DotConfig {
    fn color(&self, state: NodeState) -> &'static str {
        match state {
            NodeState::Active => self.active_color,
            NodeState::Recovery => self.recovery_color,
            NodeState::Terminal => self.terminal_color,
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl StateNetwork {
    /// Converts the network to DOT format with the default configuration.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the network to DOT format.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    ///
    /// use relnet::dot::DotConfig;
    /// use relnet::element::ElementConfig;
    ///
    /// let configs = HashMap::from([("A".to_string(), ElementConfig::hardware(1))]);
    /// let network = relnet::build_state_network("A", &configs).unwrap();
    ///
    /// let config = DotConfig {
    ///     show_element_states: false,
    ///     ..DotConfig::default()
    /// };
    /// let dot = network.to_dot_with_config(&config).unwrap();
    /// assert!(dot.contains("s0 [label=\"s0\""));
    /// ```
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        use std::fmt::Write as _;

        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "node [shape={}, style=filled];", config.node_shape)?;

        for node in self.nodes() {
            let mut label = node.id.to_string();
            if config.show_element_states {
                for (name, state) in self.element_names().iter().zip(node.elements_states.iter()) {
                    write!(label, "\\n{}: {}", escape(name), state)?;
                }
            }
            let peripheries = if node.change.is_none() { 2 } else { 1 };
            writeln!(
                dot,
                "{} [label=\"{}\", fillcolor={}, peripheries={}];",
                node.id,
                label,
                config.color(node.state),
                peripheries
            )?;
        }

        for edge in self.edges() {
            let style = match edge.kind {
                EdgeKind::Failure => config.failure_edge_style,
                EdgeKind::Recovery => config.recovery_edge_style,
            };
            let name = self.element_names().get(edge.element).map(String::as_str).unwrap_or("?");
            writeln!(
                dot,
                "{} -> {} [style={}, label=\"{}.{}\"];",
                edge.source,
                edge.target,
                style,
                escape(name),
                edge.dimension.short_name()
            )?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
