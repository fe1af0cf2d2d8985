//! Turtle loader errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TurtleResult<T> = Result<T, TurtleError>;

/// Malformed Turtle input. Always fatal for a conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurtleError {
    /// Invalid token.
    Lexer {
        line: usize,
        column: usize,
        message: String,
    },
    /// Unexpected token or invalid statement structure.
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
    /// Prefixed name uses a prefix that was never declared.
    UndefinedPrefix(String),
    /// Relative IRI without a base to resolve it against.
    IriResolution(String),
}

impl Display for TurtleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexer {
                line,
                column,
                message,
            } => write!(f, "turtle lexer error at {line}:{column}: {message}"),
            Self::Parse {
                line,
                column,
                message,
            } => write!(f, "turtle parse error at {line}:{column}: {message}"),
            Self::UndefinedPrefix(prefix) => write!(f, "undefined turtle prefix `{prefix}:`"),
            Self::IriResolution(message) => write!(f, "cannot resolve IRI: {message}"),
        }
    }
}

impl Error for TurtleError {}

/// Converts a byte offset into a 1-based `(line, column)` pair.
pub(crate) fn line_col(input: &str, position: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (offset, ch) in input.char_indices() {
        if offset >= position {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}
