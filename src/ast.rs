//! Expression trees.
//!
//! [`parse`] runs the whole front end: [`tokenize`], [`to_postfix`] and
//! [`postfix_to_ast`].
//!
//! ```
//! use relnet::ast::parse;
//!
//! let ast = parse("A & B | C").unwrap();
//! assert_eq!(ast.to_string(), "((A & B) | C)");
//! assert_eq!(ast.leaves().collect::<Vec<_>>(), vec!["A", "B", "C"]);
//! ```

use std::fmt::{Display, Formatter};

use log::debug;

use crate::error::ParseError;
use crate::postfix::to_postfix;
use crate::token::{tokenize, Group, Operator, Token, TokenKind};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Ast {
    Operand(String),
    Operator(Operator, Box<Ast>, Box<Ast>),
}

impl Ast {
    pub fn operand(name: impl Into<String>) -> Self {
        Ast::Operand(name.into())
    }

    pub fn and(lhs: Self, rhs: Self) -> Self {
        Ast::Operator(Operator::And, Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        Ast::Operator(Operator::Or, Box::new(lhs), Box::new(rhs))
    }

    /// Operand names in left-to-right order.
    ///
    /// The order is that of a post-order walk restricted to leaves, which is
    /// exactly the reading order of the operands in the source expression.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    pub fn num_leaves(&self) -> usize {
        self.leaves().count()
    }

    pub fn depth(&self) -> usize {
        match self {
            Ast::Operand(_) => 1,
            Ast::Operator(_, left, right) => 1 + left.depth().max(right.depth()),
        }
    }
}

impl Display for Ast {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Ast::Operand(name) => write!(f, "{}", name),
            Ast::Operator(op, left, right) => write!(f, "({} {} {})", left, op, right),
        }
    }
}

/// Iterator over the operand names of an [`Ast`], see [`Ast::leaves`].
#[derive(Debug, Clone)]
pub struct Leaves<'a> {
    stack: Vec<&'a Ast>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Ast::Operand(name) => return Some(name),
                Ast::Operator(_, left, right) => {
                    // Right is pushed first so that left is visited first.
                    self.stack.push(right);
                    self.stack.push(left);
                }
            }
        }
        None
    }
}

/// Builds a tree from postfix tokens.
///
/// Every operator takes the two most recent nodes: the first popped is the
/// right child, the second the left child.
///
/// # Errors
///
/// - [`ParseError::Empty`] if there are no tokens,
/// - [`ParseError::MissingOperand`] if an operator finds fewer than two nodes,
/// - [`ParseError::DanglingOperand`] if more than one node remains at the end,
/// - [`ParseError::UnmatchedOpening`] / [`ParseError::UnmatchedClosing`] if a
///   parenthesis is found (postfix input never contains one).
pub fn postfix_to_ast(tokens: &[Token]) -> Result<Ast, ParseError> {
    // Nodes are kept with the position of their leftmost token, for error reporting.
    let mut stack: Vec<(Ast, usize)> = Vec::new();

    for token in tokens {
        match &token.kind {
            TokenKind::Operand(name) => stack.push((Ast::operand(name.as_str()), token.position)),
            TokenKind::Operator(op) => {
                let (right, left) = match (stack.pop(), stack.pop()) {
                    (Some(right), Some(left)) => (right, left),
                    _ => {
                        return Err(ParseError::MissingOperand {
                            operator: *op,
                            position: token.position,
                        })
                    }
                };
                let node = Ast::Operator(*op, Box::new(left.0), Box::new(right.0));
                stack.push((node, left.1));
            }
            TokenKind::Group(Group::Opening) => return Err(ParseError::UnmatchedOpening { position: token.position }),
            TokenKind::Group(Group::Closing) => return Err(ParseError::UnmatchedClosing { position: token.position }),
        }
    }

    let mut nodes = stack.into_iter();
    let root = nodes.next().ok_or(ParseError::Empty)?;
    if let Some((dangling, position)) = nodes.next() {
        let operand = dangling.leaves().next().unwrap_or_default().to_string();
        return Err(ParseError::DanglingOperand { operand, position });
    }

    Ok(root.0)
}

/// Parses an expression into a tree.
pub fn parse(expression: &str) -> Result<Ast, ParseError> {
    let tokens = tokenize(expression);
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let postfix = to_postfix(&tokens)?;
    let ast = postfix_to_ast(&postfix)?;
    debug!("parse({:?}) = {}", expression, ast);
    Ok(ast)
}
