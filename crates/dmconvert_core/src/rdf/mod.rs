//! Turtle triple loader.
//!
//! # Responsibility
//! - Parse a serialized triple document into an ordered triple sequence.
//! - Report malformed input as [`TurtleError`] with a line/column position.
//!
//! # Invariants
//! - Triples are returned in document order.
//! - Literal datatypes and language tags are dropped; only lexical values
//!   survive.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod vocab;

pub use error::{TurtleError, TurtleResult};

/// One `(subject, predicate, object)` statement from the source graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTriple {
    pub subject: String,
    pub predicate: String,
    /// IRI, blank node label, or literal value depending on `literal`.
    pub object: String,
    pub literal: bool,
}

/// Parses a Turtle document into triples.
pub fn parse_turtle(input: &str) -> TurtleResult<Vec<RawTriple>> {
    parser::Parser::new(input)?.parse()
}
