use std::fmt;
use thiserror::Error;

/// Line/column position of a construct within a parsed fragment (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A fragment or source file that does not conform to the grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("syntax error at {position}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub position: Position,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        SyntaxError {
            message: message.into(),
            position,
        }
    }
}
