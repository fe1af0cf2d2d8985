//! Turtle lexer.
//!
//! Tokenizes Turtle input into tokens with byte spans. Fails fast on the
//! first lexical error with a line/column position.

use super::error::{line_col, TurtleError, TurtleResult};
use super::token::{Token, TokenKind};

/// Characters that may follow a backslash in a prefixed-name local part.
const LOCAL_ESCAPABLE: &str = "_~.-!$&'()*+,;=/?#@%";

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenizes the entire input. The last token is always `Eof`.
    pub fn tokenize(mut self) -> TurtleResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_ws_and_comments();
            let start = self.pos;
            let Some(ch) = self.peek() else {
                tokens.push(Token::new(TokenKind::Eof, start, start));
                return Ok(tokens);
            };
            let kind = self.next_token(ch)?;
            tokens.push(Token::new(kind, start, self.pos));
        }
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn error(&self, position: usize, message: impl Into<String>) -> TurtleError {
        let (line, column) = line_col(self.input, position);
        TurtleError::Lexer {
            line,
            column,
            message: message.into(),
        }
    }

    fn skip_ws_and_comments(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.bump();
            } else if ch == '#' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self, ch: char) -> TurtleResult<TokenKind> {
        match ch {
            '<' => self.lex_iri(),
            '"' | '\'' => self.lex_string(ch),
            '@' => self.lex_at(),
            '_' if self.peek_nth(1) == Some(':') => self.lex_blank_label(),
            '[' => {
                self.bump();
                Ok(if self.close_follows(']') {
                    TokenKind::Anon
                } else {
                    TokenKind::LBracket
                })
            }
            '(' => {
                self.bump();
                Ok(if self.close_follows(')') {
                    TokenKind::Nil
                } else {
                    TokenKind::LParen
                })
            }
            ']' => self.single(TokenKind::RBracket),
            ')' => self.single(TokenKind::RParen),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            '^' => {
                if self.rest().starts_with("^^") {
                    self.pos += 2;
                    Ok(TokenKind::DoubleCaret)
                } else {
                    Err(self.error(self.pos, "expected `^^`"))
                }
            }
            '.' => {
                if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
                    self.lex_number()
                } else {
                    self.single(TokenKind::Dot)
                }
            }
            '+' | '-' | '0'..='9' => self.lex_number(),
            _ => self.lex_name(),
        }
    }

    fn single(&mut self, kind: TokenKind) -> TurtleResult<TokenKind> {
        self.bump();
        Ok(kind)
    }

    /// After an opening bracket, consumes `close` if only whitespace separates it.
    fn close_follows(&mut self, close: char) -> bool {
        self.skip_ws_and_comments();
        if self.peek() == Some(close) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn lex_iri(&mut self) -> TurtleResult<TokenKind> {
        let start = self.pos;
        self.bump();
        let mut value = String::new();
        loop {
            let at = self.pos;
            match self.bump() {
                Some('>') => return Ok(TokenKind::Iri(value)),
                Some('\\') => match self.bump() {
                    Some('u') => value.push(self.read_hex(4)?),
                    Some('U') => value.push(self.read_hex(8)?),
                    _ => return Err(self.error(at, "invalid escape in IRI")),
                },
                Some(c) if c.is_whitespace() || "<\"{}|^`".contains(c) => {
                    return Err(self.error(at, format!("invalid character `{c}` in IRI")));
                }
                Some(c) => value.push(c),
                None => return Err(self.error(start, "unterminated IRI")),
            }
        }
    }

    fn read_hex(&mut self, len: usize) -> TurtleResult<char> {
        let start = self.pos;
        let digits: String = self.rest().chars().take(len).collect();
        if digits.len() != len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(self.error(start, "invalid unicode escape"));
        }
        self.pos += len;
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(start, format!("invalid code point `{digits}`")))
    }

    fn lex_string(&mut self, quote: char) -> TurtleResult<TokenKind> {
        let start = self.pos;
        let triple: String = std::iter::repeat(quote).take(3).collect();
        let mut value = String::new();

        if self.rest().starts_with(triple.as_str()) {
            self.pos += 3;
            loop {
                if self.rest().starts_with(triple.as_str()) {
                    self.pos += 3;
                    return Ok(TokenKind::String(value));
                }
                match self.bump() {
                    Some('\\') => value.push(self.read_escape()?),
                    Some(c) => value.push(c),
                    None => return Err(self.error(start, "unterminated string literal")),
                }
            }
        }

        self.bump();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(TokenKind::String(value)),
                Some('\\') => value.push(self.read_escape()?),
                Some('\n') | Some('\r') | None => {
                    return Err(self.error(start, "unterminated string literal"));
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn read_escape(&mut self) -> TurtleResult<char> {
        let at = self.pos;
        match self.bump() {
            Some('t') => Ok('\t'),
            Some('b') => Ok('\u{8}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('f') => Ok('\u{c}'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some('\\') => Ok('\\'),
            Some('u') => self.read_hex(4),
            Some('U') => self.read_hex(8),
            _ => Err(self.error(at, "invalid escape sequence")),
        }
    }

    fn lex_at(&mut self) -> TurtleResult<TokenKind> {
        let start = self.pos;
        self.bump();
        let word = self.take_while(|c| c.is_ascii_alphanumeric() || c == '-');
        match word.as_str() {
            "prefix" => Ok(TokenKind::KwPrefix),
            "base" => Ok(TokenKind::KwBase),
            tag if tag.starts_with(|c: char| c.is_ascii_alphabetic()) => {
                Ok(TokenKind::LangTag(tag.to_string()))
            }
            _ => Err(self.error(start, "invalid language tag")),
        }
    }

    fn lex_blank_label(&mut self) -> TurtleResult<TokenKind> {
        let start = self.pos;
        self.pos += 2;
        let mut label = self.take_while(is_name_char);
        self.rewind_trailing_dots(&mut label);
        if label.is_empty() {
            return Err(self.error(start, "empty blank node label"));
        }
        Ok(TokenKind::BlankNodeLabel(label))
    }

    fn lex_number(&mut self) -> TurtleResult<TokenKind> {
        let start = self.pos;
        if matches!(self.peek(), Some('+') | Some('-')) {
            self.bump();
        }
        let int_digits = self.take_while(|c| c.is_ascii_digit()).len();
        let mut decimal = false;
        let mut double = false;

        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.take_while(|c| c.is_ascii_digit());
            decimal = true;
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let save = self.pos;
            self.bump();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.bump();
            }
            if self.take_while(|c| c.is_ascii_digit()).is_empty() {
                self.pos = save;
            } else {
                double = true;
            }
        }
        if int_digits == 0 && !decimal {
            return Err(self.error(start, "expected number"));
        }

        let lexical = self.input[start..self.pos].to_string();
        Ok(if double {
            TokenKind::Double(lexical)
        } else if decimal {
            TokenKind::Decimal(lexical)
        } else {
            TokenKind::Integer(lexical)
        })
    }

    fn lex_name(&mut self) -> TurtleResult<TokenKind> {
        let start = self.pos;
        let mut word = self.take_while(is_name_char);

        if self.peek() == Some(':') {
            if word.ends_with('.') {
                return Err(self.error(start, "prefix name cannot end with `.`"));
            }
            self.bump();
            let local = self.lex_local()?;
            return Ok(TokenKind::PrefixedName {
                prefix: word,
                local,
            });
        }

        self.rewind_trailing_dots(&mut word);
        match word.as_str() {
            "a" => Ok(TokenKind::KwA),
            "true" => Ok(TokenKind::KwTrue),
            "false" => Ok(TokenKind::KwFalse),
            w if w.eq_ignore_ascii_case("prefix") => Ok(TokenKind::KwSparqlPrefix),
            w if w.eq_ignore_ascii_case("base") => Ok(TokenKind::KwSparqlBase),
            "" => {
                let bad = self.peek().unwrap_or('?');
                Err(self.error(start, format!("unexpected character `{bad}`")))
            }
            other => Err(self.error(start, format!("unexpected token `{other}`"))),
        }
    }

    fn lex_local(&mut self) -> TurtleResult<String> {
        let mut local = String::new();
        let mut trailing_dots = 0;
        while let Some(ch) = self.peek() {
            if ch == '.' {
                self.bump();
                local.push('.');
                trailing_dots += 1;
                continue;
            }
            if is_name_char(ch) || ch == ':' {
                self.bump();
                local.push(ch);
            } else if ch == '%' {
                let at = self.pos;
                self.bump();
                let hex: String = self.rest().chars().take(2).collect();
                if hex.len() != 2 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(self.error(at, "invalid percent escape in local name"));
                }
                self.pos += 2;
                local.push('%');
                local.push_str(&hex);
            } else if ch == '\\' {
                let at = self.pos;
                self.bump();
                match self.bump() {
                    Some(c) if LOCAL_ESCAPABLE.contains(c) => local.push(c),
                    _ => return Err(self.error(at, "invalid escape in local name")),
                }
            } else {
                break;
            }
            trailing_dots = 0;
        }
        local.truncate(local.len() - trailing_dots);
        self.pos -= trailing_dots;
        Ok(local)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }
        self.input[start..self.pos].to_string()
    }

    /// A trailing `.` terminates the statement rather than belonging to a name.
    fn rewind_trailing_dots(&mut self, word: &mut String) {
        while word.ends_with('.') {
            word.pop();
            self.pos -= 1;
        }
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == '.' || !ch.is_ascii()
}

/// Tokenizes a Turtle document.
pub fn tokenize(input: &str) -> TurtleResult<Vec<Token>> {
    Lexer::new(input).tokenize()
}
