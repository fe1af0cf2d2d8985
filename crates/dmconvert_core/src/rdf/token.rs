//! Turtle token types.

/// A token with its source span (byte offsets).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }
}

/// Token kinds for the Turtle subset understood by the loader.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `<http://example.org/>`, escapes already decoded.
    Iri(String),
    /// `prefix:local`. `local` is empty for a bare `prefix:`.
    PrefixedName { prefix: String, local: String },
    /// `_:label`, stored without the `_:`.
    BlankNodeLabel(String),
    /// `[]`
    Anon,
    /// `()`
    Nil,
    /// String literal with escapes decoded.
    String(String),
    /// Numeric literals keep their lexical form.
    Integer(String),
    Decimal(String),
    Double(String),
    /// Language tag without the leading `@`.
    LangTag(String),
    KwPrefix,
    KwBase,
    KwSparqlPrefix,
    KwSparqlBase,
    KwA,
    KwTrue,
    KwFalse,
    Dot,
    Comma,
    Semicolon,
    DoubleCaret,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Eof,
}
