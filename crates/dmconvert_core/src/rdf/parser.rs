//! Turtle parser producing an ordered triple sequence.
//!
//! Recursive descent over the token stream from [`super::lexer`]. Triples are
//! emitted in document order; anonymous blank nodes get `_:genidN` labels.

use std::collections::HashMap;

use super::error::{line_col, TurtleError, TurtleResult};
use super::lexer::tokenize;
use super::token::{Token, TokenKind};
use super::vocab::{RDF_FIRST, RDF_NIL, RDF_REST, RDF_TYPE};
use super::RawTriple;

/// Object position term before it is flattened into a [`RawTriple`].
#[derive(Debug, Clone)]
enum Term {
    Node(String),
    Literal(String),
}

pub struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    prefixes: HashMap<String, String>,
    base: Option<String>,
    next_blank: usize,
    triples: Vec<RawTriple>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> TurtleResult<Self> {
        Ok(Self {
            input,
            tokens: tokenize(input)?,
            pos: 0,
            prefixes: HashMap::new(),
            base: None,
            next_blank: 0,
            triples: Vec::new(),
        })
    }

    /// Parses the whole document.
    pub fn parse(mut self) -> TurtleResult<Vec<RawTriple>> {
        while !self.is_at_end() {
            self.parse_statement()?;
        }
        Ok(self.triples)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> TurtleError {
        let (line, column) = line_col(self.input, self.current().start);
        TurtleError::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> TurtleResult<()> {
        if self.current().kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {kind:?}, found {:?}",
                self.current().kind
            )))
        }
    }

    fn parse_statement(&mut self) -> TurtleResult<()> {
        match self.current().kind {
            TokenKind::KwPrefix | TokenKind::KwSparqlPrefix => self.parse_prefix_directive(),
            TokenKind::KwBase | TokenKind::KwSparqlBase => self.parse_base_directive(),
            _ => {
                let subject = self.parse_subject()?;
                if matches!(self.current().kind, TokenKind::Dot)
                    && subject.starts_with("_:")
                    && self.previous_closed_property_list()
                {
                    // `[ p o ] .` is a complete statement on its own.
                    self.advance();
                    return Ok(());
                }
                self.parse_predicate_object_list(&subject)?;
                self.expect(TokenKind::Dot)
            }
        }
    }

    fn previous_closed_property_list(&self) -> bool {
        self.pos > 0 && matches!(self.tokens[self.pos - 1].kind, TokenKind::RBracket)
    }

    fn parse_prefix_directive(&mut self) -> TurtleResult<()> {
        let sparql_style = matches!(self.advance().kind, TokenKind::KwSparqlPrefix);

        let prefix = match self.advance().kind {
            TokenKind::PrefixedName { prefix, local } if local.is_empty() => prefix,
            other => return Err(self.error(format!("expected prefix name, found {other:?}"))),
        };
        let namespace = match self.advance().kind {
            TokenKind::Iri(iri) => self.resolve_iri(&iri)?,
            other => return Err(self.error(format!("expected namespace IRI, found {other:?}"))),
        };
        self.prefixes.insert(prefix, namespace);

        if !sparql_style {
            self.expect(TokenKind::Dot)?;
        }
        Ok(())
    }

    fn parse_base_directive(&mut self) -> TurtleResult<()> {
        let sparql_style = matches!(self.advance().kind, TokenKind::KwSparqlBase);
        let base = match self.advance().kind {
            TokenKind::Iri(iri) => self.resolve_iri(&iri)?,
            other => return Err(self.error(format!("expected base IRI, found {other:?}"))),
        };
        self.base = Some(base);

        if !sparql_style {
            self.expect(TokenKind::Dot)?;
        }
        Ok(())
    }

    fn parse_subject(&mut self) -> TurtleResult<String> {
        match self.current().kind.clone() {
            TokenKind::Iri(_) | TokenKind::PrefixedName { .. } => self.parse_iri(),
            TokenKind::BlankNodeLabel(label) => {
                self.advance();
                Ok(format!("_:{label}"))
            }
            TokenKind::Anon => {
                self.advance();
                Ok(self.fresh_blank())
            }
            TokenKind::LBracket => self.parse_blank_node_property_list(),
            TokenKind::LParen => self.parse_collection(),
            TokenKind::Nil => {
                self.advance();
                Ok(RDF_NIL.to_string())
            }
            other => Err(self.error(format!("expected subject, found {other:?}"))),
        }
    }

    fn parse_predicate_object_list(&mut self, subject: &str) -> TurtleResult<()> {
        loop {
            let predicate = self.parse_predicate()?;
            self.parse_object_list(subject, &predicate)?;

            if !matches!(self.current().kind, TokenKind::Semicolon) {
                return Ok(());
            }
            while matches!(self.current().kind, TokenKind::Semicolon) {
                self.advance();
            }
            if matches!(
                self.current().kind,
                TokenKind::Dot | TokenKind::RBracket | TokenKind::Eof
            ) {
                return Ok(());
            }
        }
    }

    fn parse_predicate(&mut self) -> TurtleResult<String> {
        if matches!(self.current().kind, TokenKind::KwA) {
            self.advance();
            return Ok(RDF_TYPE.to_string());
        }
        self.parse_iri()
    }

    fn parse_object_list(&mut self, subject: &str, predicate: &str) -> TurtleResult<()> {
        loop {
            let object = self.parse_object()?;
            self.emit(subject, predicate, object);

            if matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
            } else {
                return Ok(());
            }
        }
    }

    fn parse_object(&mut self) -> TurtleResult<Term> {
        match self.current().kind.clone() {
            TokenKind::String(value) => {
                self.advance();
                match self.current().kind {
                    TokenKind::LangTag(_) => {
                        self.advance();
                    }
                    TokenKind::DoubleCaret => {
                        self.advance();
                        self.parse_iri()?;
                    }
                    _ => {}
                }
                Ok(Term::Literal(value))
            }
            TokenKind::Integer(lexical)
            | TokenKind::Decimal(lexical)
            | TokenKind::Double(lexical) => {
                self.advance();
                Ok(Term::Literal(lexical))
            }
            TokenKind::KwTrue => {
                self.advance();
                Ok(Term::Literal("true".to_string()))
            }
            TokenKind::KwFalse => {
                self.advance();
                Ok(Term::Literal("false".to_string()))
            }
            TokenKind::Iri(_)
            | TokenKind::PrefixedName { .. }
            | TokenKind::BlankNodeLabel(_)
            | TokenKind::Anon
            | TokenKind::LBracket
            | TokenKind::LParen
            | TokenKind::Nil => Ok(Term::Node(self.parse_subject()?)),
            other => Err(self.error(format!("expected object, found {other:?}"))),
        }
    }

    fn parse_iri(&mut self) -> TurtleResult<String> {
        match self.current().kind.clone() {
            TokenKind::Iri(iri) => {
                let resolved = self.resolve_iri(&iri)?;
                self.advance();
                Ok(resolved)
            }
            TokenKind::PrefixedName { prefix, local } => {
                let namespace = self
                    .prefixes
                    .get(&prefix)
                    .ok_or_else(|| TurtleError::UndefinedPrefix(prefix.clone()))?;
                let expanded = format!("{namespace}{local}");
                self.advance();
                Ok(expanded)
            }
            other => Err(self.error(format!("expected IRI, found {other:?}"))),
        }
    }

    fn parse_blank_node_property_list(&mut self) -> TurtleResult<String> {
        self.expect(TokenKind::LBracket)?;
        let node = self.fresh_blank();
        self.parse_predicate_object_list(&node)?;
        self.expect(TokenKind::RBracket)?;
        Ok(node)
    }

    fn parse_collection(&mut self) -> TurtleResult<String> {
        self.expect(TokenKind::LParen)?;
        let head = self.fresh_blank();
        let mut cell = head.clone();

        loop {
            let item = self.parse_object()?;
            self.emit(&cell, RDF_FIRST, item);

            if matches!(self.current().kind, TokenKind::RParen) {
                self.emit(&cell, RDF_REST, Term::Node(RDF_NIL.to_string()));
                break;
            }
            if self.is_at_end() {
                return Err(self.error("unterminated collection"));
            }
            let next = self.fresh_blank();
            self.emit(&cell, RDF_REST, Term::Node(next.clone()));
            cell = next;
        }

        self.expect(TokenKind::RParen)?;
        Ok(head)
    }

    fn fresh_blank(&mut self) -> String {
        let label = format!("_:genid{}", self.next_blank);
        self.next_blank += 1;
        label
    }

    fn emit(&mut self, subject: &str, predicate: &str, object: Term) {
        let (object, literal) = match object {
            Term::Node(uri) => (uri, false),
            Term::Literal(value) => (value, true),
        };
        self.triples.push(RawTriple {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            object,
            literal,
        });
    }

    /// Resolves an IRI reference against the current base.
    fn resolve_iri(&self, reference: &str) -> TurtleResult<String> {
        if has_scheme(reference) {
            return Ok(reference.to_string());
        }
        let Some(base) = self.base.as_deref() else {
            return Err(TurtleError::IriResolution(format!(
                "relative IRI `{reference}` without base"
            )));
        };

        if reference.is_empty() {
            return Ok(strip_fragment(base).to_string());
        }
        if reference.starts_with('#') {
            return Ok(format!("{}{reference}", strip_fragment(base)));
        }
        if let Some(rest) = reference.strip_prefix("//") {
            let scheme = &base[..base.find(':').unwrap_or(0)];
            return Ok(format!("{scheme}://{rest}"));
        }
        if reference.starts_with('/') {
            return Ok(format!("{}{reference}", base_origin(base)));
        }
        let directory = match base.rfind('/') {
            Some(idx) => &base[..=idx],
            None => base,
        };
        Ok(format!("{directory}{reference}"))
    }
}

fn has_scheme(reference: &str) -> bool {
    let Some(colon) = reference.find(':') else {
        return false;
    };
    let scheme = &reference[..colon];
    scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn strip_fragment(iri: &str) -> &str {
    iri.split('#').next().unwrap_or(iri)
}

/// `scheme://authority` part of an absolute IRI.
fn base_origin(base: &str) -> &str {
    match base.find("://") {
        Some(idx) => {
            let after = idx + 3;
            match base[after..].find('/') {
                Some(slash) => &base[..after + slash],
                None => base,
            }
        }
        None => base.find(':').map_or(base, |idx| &base[..=idx]),
    }
}
