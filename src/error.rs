//! Error types.
//!
//! Parsing, configuration and binding failures are reported eagerly; the
//! enumeration and edge inference stages are total over a bound system and
//! have no error cases of their own, apart from the size guard of
//! [`GeneratorConfig`][crate::generate::GeneratorConfig].

use num_bigint::BigUint;
use thiserror::Error;

use crate::token::Operator;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Malformed logical expression.
///
/// Positions are character offsets into the original (unstripped) input.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ParseError {
    #[error("empty expression")]
    Empty,

    #[error("unmatched `)` at position {position}")]
    UnmatchedClosing { position: usize },

    #[error("unmatched `(` at position {position}")]
    UnmatchedOpening { position: usize },

    #[error("operator `{operator}` at position {position} is missing an operand")]
    MissingOperand { operator: Operator, position: usize },

    #[error("operand `{operand}` at position {position} is not connected to the rest of the expression")]
    DanglingOperand { operand: String, position: usize },
}

/// Invalid element configuration.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ConfigError {
    #[error("element declares neither a hardware nor a software recovery dimension")]
    NoDimensions,

    #[error("dimension `{0}` is declared more than once")]
    DuplicateDimension(String),

    #[error("unknown recovery dimension `{0}`")]
    UnknownDimension(String),

    #[error("invalid recovery budget `{0}`")]
    InvalidBudget(String),

    #[error("malformed dimension entry `{0}`, expected `<dimension>:<budget>`")]
    MalformedEntry(String),
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum Error {
    #[error("malformed expression: {0}")]
    Parse(#[from] ParseError),

    #[error("unknown element `{0}`")]
    UnknownElement(String),

    #[error("invalid configuration for element `{name}`: {source}")]
    InvalidConfiguration {
        name: String,
        #[source]
        source: ConfigError,
    },

    #[error("state space has {size} nodes, exceeding the limit of {limit}")]
    StateSpaceTooLarge { size: BigUint, limit: usize },
}
