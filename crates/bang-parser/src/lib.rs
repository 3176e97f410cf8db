//! bang-parser: token windows to an untyped AST.
//!
//! There is no grammar table. Statements are collected line by line from a
//! [`TokenSource`], and every expression window is taken apart by depth-aware
//! scans over its flat token list (see [`segment`]).

pub mod expr;
pub mod segment;
pub mod source;
pub mod stmt;
pub mod type_literal;

use std::fmt;

pub use expr::parse_expression;
pub use source::{LexerSource, SliceSource, TokenSource};
pub use stmt::Parser;
pub use type_literal::{parse_type_list, parse_type_literal};

/// Which of the three independently counted bracket kinds is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    Paren,
    Brace,
    Bracket,
}

impl fmt::Display for Nesting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Nesting::Paren => "( and )",
            Nesting::Brace => "{ and }",
            Nesting::Bracket => "[ and ]",
        })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("error on line {line}: illegal character '{ch}'")]
    IllegalCharacter { line: usize, ch: String },
    #[error("error on line {line}: unexpected {found}, expected {expected}")]
    UnexpectedToken { line: usize, found: String, expected: String },
    #[error("error on line {line}: invalid token {token}")]
    InvalidToken { line: usize, token: String },
    #[error("error on line {line}: amount of {kind} in expression does not match")]
    UnbalancedNesting { line: usize, kind: Nesting },
    #[error("internal parser error: {0}")]
    Internal(String),
    #[error("error on line {line}: expected an expression")]
    EmptyExpression { line: usize },
    #[error("error on line {line}: {message}")]
    Syntax { line: usize, message: String },
}

impl ParseError {
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::IllegalCharacter { line, .. }
            | ParseError::UnexpectedToken { line, .. }
            | ParseError::InvalidToken { line, .. }
            | ParseError::UnbalancedNesting { line, .. }
            | ParseError::EmptyExpression { line }
            | ParseError::Syntax { line, .. } => Some(*line),
            ParseError::Internal(_) => None,
        }
    }
}

/// Parse a whole compilation unit.
pub fn parse(src: &str) -> Result<bang_ast::ast::Program, ParseError> {
    Parser::new(LexerSource::new(src)).parse_program()
}
