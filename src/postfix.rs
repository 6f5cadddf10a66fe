//! Infix to postfix conversion (shunting-yard).

use log::debug;

use crate::error::ParseError;
use crate::token::{Group, Token, TokenKind};

/// Reorders infix tokens into postfix order.
///
/// Both operators are left-associative: an operator on the stack is emitted
/// whenever the incoming operator binds no tighter than it. Parentheses never
/// appear in the output.
///
/// # Errors
///
/// Unbalanced parentheses are reported with the position of the offending
/// token. Operand arity is not checked here, see [`crate::ast::postfix_to_ast`].
pub fn to_postfix(tokens: &[Token]) -> Result<Vec<Token>, ParseError> {
    let mut output: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<&Token> = Vec::new();

    for token in tokens {
        match &token.kind {
            TokenKind::Operand(_) => output.push(token.clone()),
            TokenKind::Operator(op) => {
                while let Some(top) = stack.last() {
                    match &top.kind {
                        TokenKind::Operator(top_op) if op.precedence() <= top_op.precedence() => {
                            debug!("postfix: emit {} before {}", top_op, op);
                            output.push((*top).clone());
                            stack.pop();
                        }
                        _ => break,
                    }
                }
                stack.push(token);
            }
            TokenKind::Group(Group::Opening) => stack.push(token),
            TokenKind::Group(Group::Closing) => loop {
                match stack.pop() {
                    Some(Token {
                        kind: TokenKind::Group(Group::Opening),
                        ..
                    }) => break,
                    Some(top) => output.push(top.clone()),
                    None => return Err(ParseError::UnmatchedClosing { position: token.position }),
                }
            },
        }
    }

    while let Some(top) = stack.pop() {
        if let TokenKind::Group(Group::Opening) = top.kind {
            return Err(ParseError::UnmatchedOpening { position: top.position });
        }
        output.push(top.clone());
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::token::{join, tokenize};

    fn postfix(expression: &str) -> Result<String, ParseError> {
        to_postfix(&tokenize(expression)).map(|tokens| join(&tokens))
    }

    #[test]
    fn test_precedence() {
        assert_eq!(postfix("A & B | C").unwrap(), "AB&C|");
        assert_eq!(postfix("A | B & C").unwrap(), "ABC&|");
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(postfix("A & B & C").unwrap(), "AB&C&");
        assert_eq!(postfix("A | B | C").unwrap(), "AB|C|");
    }

    #[test]
    fn test_grouping() {
        assert_eq!(postfix("(A | B) & C").unwrap(), "AB|C&");
        assert_eq!(postfix("A & (B | C)").unwrap(), "ABC|&");
        assert_eq!(postfix("((A))").unwrap(), "A");
    }

    #[test]
    fn test_unmatched_closing() {
        assert_eq!(postfix("A & B)"), Err(ParseError::UnmatchedClosing { position: 5 }));
    }

    #[test]
    fn test_unmatched_opening() {
        assert_eq!(postfix("(A & (B | C)"), Err(ParseError::UnmatchedOpening { position: 0 }));
    }

    #[test]
    fn test_empty() {
        assert_eq!(postfix("").unwrap(), "");
    }
}
