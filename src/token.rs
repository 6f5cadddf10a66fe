//! Expression tokenizer.
//!
//! An expression is made of operand names, the binary operators `&` (AND) and
//! `|` (OR), and parentheses. Whitespace is never part of a token.
//!
//! ```
//! use relnet::token::{tokenize, TokenKind};
//!
//! let tokens = tokenize("pump & (valve1 | valve2)");
//! assert_eq!(tokens.len(), 7);
//! assert_eq!(tokens[0].kind, TokenKind::Operand("pump".to_string()));
//! assert_eq!(tokens[2].position, 7);
//! ```

use std::fmt::{Display, Formatter};

use log::debug;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '&' => Some(Operator::And),
            '|' => Some(Operator::Or),
            _ => None,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Operator::And => '&',
            Operator::Or => '|',
        }
    }

    /// Binding strength: AND binds tighter than OR.
    pub const fn precedence(self) -> u8 {
        match self {
            Operator::And => 2,
            Operator::Or => 1,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Group {
    Opening,
    Closing,
}

impl Group {
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '(' => Some(Group::Opening),
            ')' => Some(Group::Closing),
            _ => None,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Group::Opening => '(',
            Group::Closing => ')',
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum TokenKind {
    Operator(Operator),
    Group(Group),
    Operand(String),
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Operator(op) => write!(f, "{}", op),
            TokenKind::Group(group) => write!(f, "{}", group.as_char()),
            TokenKind::Operand(name) => write!(f, "{}", name),
        }
    }
}

/// A token together with the character offset where it starts.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, position: usize) -> Self {
        Self { kind, position }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}

/// Pending operand characters, flushed on every operator or group character.
#[derive(Debug, Default)]
struct OperandBuffer {
    value: String,
    start: usize,
}

impl OperandBuffer {
    fn push(&mut self, c: char, position: usize) {
        if self.value.is_empty() {
            self.start = position;
        }
        self.value.push(c);
    }

    fn flush(&mut self, tokens: &mut Vec<Token>) {
        if self.value.is_empty() {
            return;
        }
        let name = std::mem::take(&mut self.value);
        debug!("tokenize: operand `{}` at {}", name, self.start);
        tokens.push(Token::new(TokenKind::Operand(name), self.start));
    }
}

/// Splits an expression into tokens.
///
/// Operand tokens are maximal runs of characters that are neither whitespace,
/// operators nor parentheses. An empty (or all-whitespace) input yields no
/// tokens.
pub fn tokenize(expression: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut buffer = OperandBuffer::default();

    for (position, c) in expression.chars().enumerate() {
        if c.is_whitespace() {
            continue;
        }
        if let Some(op) = Operator::from_char(c) {
            buffer.flush(&mut tokens);
            tokens.push(Token::new(TokenKind::Operator(op), position));
        } else if let Some(group) = Group::from_char(c) {
            buffer.flush(&mut tokens);
            tokens.push(Token::new(TokenKind::Group(group), position));
        } else {
            buffer.push(c, position);
        }
    }
    buffer.flush(&mut tokens);

    tokens
}

/// Concatenates tokens back into an expression without whitespace.
pub fn join(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.to_string()).collect()
}

/// Operand names in order of appearance, duplicates included.
pub fn operand_names(tokens: &[Token]) -> Vec<&str> {
    tokens
        .iter()
        .filter_map(|t| match &t.kind {
            TokenKind::Operand(name) => Some(name.as_str()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn kinds(expression: &str) -> Vec<TokenKind> {
        tokenize(expression).into_iter().map(|t| t.kind).collect()
    }

    fn operand(name: &str) -> TokenKind {
        TokenKind::Operand(name.to_string())
    }

    #[test]
    fn test_simple() {
        assert_eq!(
            kinds("A & B"),
            vec![operand("A"), TokenKind::Operator(Operator::And), operand("B")]
        );
    }

    #[test]
    fn test_groups() {
        assert_eq!(
            kinds("(A|B)&C"),
            vec![
                TokenKind::Group(Group::Opening),
                operand("A"),
                TokenKind::Operator(Operator::Or),
                operand("B"),
                TokenKind::Group(Group::Closing),
                TokenKind::Operator(Operator::And),
                operand("C"),
            ]
        );
    }

    #[test]
    fn test_whitespace_inside_name_is_dropped() {
        assert_eq!(kinds("main pump & x"), vec![operand("mainpump"), TokenKind::Operator(Operator::And), operand("x")]);
    }

    #[test]
    fn test_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \t\n").is_empty());
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("  ab &(c)");
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![2, 5, 6, 7, 8]);
    }

    #[test]
    fn test_symbols_in_names() {
        assert_eq!(
            kinds("cpu-1.a|disk_2"),
            vec![operand("cpu-1.a"), TokenKind::Operator(Operator::Or), operand("disk_2")]
        );
    }

    #[test]
    fn test_round_trip() {
        for expression in [
            "A & B | C",
            "(A | B) & C",
            "((x1&x2)|(y1 & y2)) & z",
            "a|b|c|d",
            "  spaced   out  ",
            "))&&((",
        ] {
            let stripped: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
            assert_eq!(join(&tokenize(expression)), stripped);
        }
    }

    #[test]
    fn test_operand_names() {
        let tokens = tokenize("A & (B | A)");
        assert_eq!(operand_names(&tokens), vec!["A", "B", "A"]);
    }
}
