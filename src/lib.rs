//! # relnet: reliability state networks in Rust
//!
//! **`relnet`** builds the state network of a composite system: every reachable
//! combination of element failures and recoveries, classified as active,
//! recovering or terminal, and connected by single failure or recovery events.
//! The result is the transition structure of a continuous-time Markov chain;
//! rates are left to the caller.
//!
//! ## Systems
//!
//! A system is a logical expression over element names, with `&` for series
//! (AND) and `|` for parallel (OR) composition. `&` binds tighter than `|`, and
//! parentheses group as usual. Each element fails and recovers along a hardware
//! dimension, a software dimension, or both; every dimension has a recovery
//! budget that is either a finite count or unbounded.
//!
//! ## Basic Usage
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use relnet::element::{Budget, ElementConfig};
//! use relnet::system::NodeState;
//!
//! let configs = HashMap::from([
//!     ("pump".to_string(), ElementConfig::hardware(1)),
//!     ("ctrl".to_string(), ElementConfig::software(Budget::Unbounded)),
//! ]);
//!
//! let network = relnet::build_state_network("pump & ctrl", &configs).unwrap();
//!
//! // pump: 4 states, ctrl: 2 states
//! assert_eq!(network.num_nodes(), 8);
//! assert_eq!(network.initial().state, NodeState::Active);
//! assert_eq!(network.element_names(), ["pump", "ctrl"]);
//! ```
//!
//! ## Core Components
//!
//! - **[`token`], [`postfix`], [`ast`]**: expression front end.
//! - **[`system`]**: binding elements to the tree, and classification.
//! - **[`generate`]**: state-space enumeration.
//! - **[`edges`]**: transition inference between enumerated states.
//! - **[`network`]**: the resulting [`StateNetwork`][crate::network::StateNetwork].
//! - **[`dot`]**: Graphviz export.

use std::collections::HashMap;

pub mod ast;
pub mod dot;
pub mod edges;
pub mod element;
pub mod error;
pub mod generate;
pub mod network;
pub mod postfix;
pub mod system;
pub mod token;

pub use crate::error::{Error, Result};

use crate::element::ElementConfig;
use crate::generate::{generate, GeneratorConfig};
use crate::network::StateNetwork;
use crate::system::System;

/// Parses `expression`, binds it against `configs` and generates its state
/// network with the default [`GeneratorConfig`].
pub fn build_state_network(expression: &str, configs: &HashMap<String, ElementConfig>) -> Result<StateNetwork> {
    build_state_network_with_config(expression, configs, &GeneratorConfig::default())
}

pub fn build_state_network_with_config(
    expression: &str,
    configs: &HashMap<String, ElementConfig>,
    config: &GeneratorConfig,
) -> Result<StateNetwork> {
    let system = System::from_expression(expression, configs)?;
    generate(&system, config)
}
