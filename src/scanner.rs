//! Lexical analyzer.

use std::rc::Rc;

use crate::ctx::Context;
use crate::diag::{Diagnostic, Line};
use crate::token::{Literal, Token, TokenKind};

/// Turns source text into a sequence of tokens.
///
/// Lexical errors are recorded as diagnostics and scanning continues, so a
/// single invocation reports as many errors as possible. The token stream
/// always ends with exactly one `Eof` token.
pub struct Scanner<'s> {
    source: &'s str,
    start: usize,
    current: usize,
    line: Line,
    ctx: Rc<Context>,
    tokens: Vec<Token>,
    diags: Vec<Diagnostic>,
}

impl<'s> Scanner<'s> {
    pub fn new(source: &'s str, ctx: Rc<Context>) -> Scanner<'s> {
        Scanner {
            source,
            start: 0,
            current: 0,
            line: 1,
            ctx,
            tokens: Vec::new(),
            diags: Vec::new(),
        }
    }

    /// Scans the whole source. The diagnostics vector is empty exactly when
    /// no lexical error occurred.
    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }
        self.tokens.push(Token::new(TokenKind::Eof, "", None, self.line));
        (self.tokens, self.diags)
    }

    fn scan_token(&mut self) {
        let ch = self.advance();
        match ch {
            ' ' | '\t' | '\r' => (),
            '\n' => self.line += 1,
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            '-' => self.add_token(TokenKind::Minus),
            '+' => self.add_token(TokenKind::Plus),
            ';' => self.add_token(TokenKind::Semicolon),
            '*' => self.add_token(TokenKind::Star),
            '/' => {
                if self.matches('/') {
                    self.skip_comment();
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }
            '=' => {
                if self.matches('=') {
                    self.add_token(TokenKind::EqualEqual);
                } else {
                    self.add_token(TokenKind::Equal);
                }
            }
            '!' => {
                if self.matches('=') {
                    self.add_token(TokenKind::BangEqual);
                } else {
                    self.add_token(TokenKind::Bang);
                }
            }
            '<' => {
                if self.matches('=') {
                    self.add_token(TokenKind::LessEqual);
                } else {
                    self.add_token(TokenKind::Less);
                }
            }
            '>' => {
                if self.matches('=') {
                    self.add_token(TokenKind::GreaterEqual);
                } else {
                    self.add_token(TokenKind::Greater);
                }
            }
            '"' => self.string(),
            '0'..='9' => self.number(),
            // 👉 and 📝 assign; a directly following '=' upgrades to equality.
            '\u{1f449}' | '\u{1f4dd}' => {
                if self.matches('=') {
                    self.add_token(TokenKind::EqualEqual);
                } else {
                    self.add_token(TokenKind::Equal);
                }
            }
            // ⚖️ ▶️ ◀️ are operators only with their U+FE0F variation
            // selector; the bare base character scans as an identifier.
            '\u{2696}' => {
                if self.matches('\u{fe0f}') {
                    self.add_token(TokenKind::EqualEqual);
                } else {
                    self.identifier();
                }
            }
            '\u{25b6}' => {
                if self.matches('\u{fe0f}') {
                    self.add_token(TokenKind::Greater);
                } else {
                    self.identifier();
                }
            }
            '\u{25c0}' => {
                if self.matches('\u{fe0f}') {
                    self.add_token(TokenKind::Less);
                } else {
                    self.identifier();
                }
            }
            ch if is_identifier_start(ch) => self.identifier(),
            ch => {
                self.diags.push(Diagnostic::scan(
                    self.line,
                    format!("Unexpected character: {}", ch),
                ));
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn string(&mut self) {
        // Strings may span lines; the token is reported at the opening quote.
        let opening_line = self.line;
        loop {
            match self.peek() {
                None => {
                    self.diags
                        .push(Diagnostic::scan(opening_line, "Unterminated string."));
                    return;
                }
                Some('"') => break,
                Some(ch) => {
                    if ch == '\n' {
                        self.line += 1;
                    }
                    self.advance();
                }
            }
        }
        self.advance();

        let content = &self.source[self.start + 1..self.current - 1];
        self.tokens.push(Token::new(
            TokenKind::Str,
            &self.source[self.start..self.current],
            Some(Literal::Str(content.to_string())),
            opening_line,
        ));
    }

    fn number(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.advance();
        }

        // A '.' is part of the number only when digits follow it.
        if self.peek() == Some('.') && matches!(self.peek_next(), Some(ch) if ch.is_ascii_digit()) {
            self.advance();
            while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
                self.advance();
            }
        }

        let lexeme = &self.source[self.start..self.current];
        let literal = Literal::Number(normalize_number(lexeme));
        self.tokens
            .push(Token::new(TokenKind::Number, lexeme, Some(literal), self.line));
    }

    fn identifier(&mut self) {
        while matches!(self.peek(), Some(ch) if is_identifier_continue(ch)) {
            self.advance();
        }

        let sym = self.ctx.symbol(&self.source[self.start..self.current]);
        let kind = self.ctx.keyword(&sym).unwrap_or(TokenKind::Identifier);
        self.add_token(kind);
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.tokens.push(Token::new(
            kind,
            &self.source[self.start..self.current],
            None,
            self.line,
        ));
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    /// Consume the next character. Only call after checking `is_at_end`.
    fn advance(&mut self) -> char {
        let ch = self.source[self.current..].chars().next().unwrap();
        self.current += ch.len_utf8();
        ch
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        self.source[self.current..].chars().nth(1)
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }
}

/// Identifiers start with an ASCII letter, `_`, or any non-ASCII character,
/// which is how emoji keywords scan as single lexemes.
fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

fn is_identifier_continue(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit()
}

/// Normalizes a number lexeme for the token's literal field: integer
/// literals gain `.0`, fractional literals keep at least one fractional
/// digit but lose trailing zeros.
fn normalize_number(lexeme: &str) -> String {
    match lexeme.split_once('.') {
        None => format!("{}.0", lexeme),
        Some((int_part, frac_part)) => {
            let frac_part = frac_part.trim_end_matches('0');
            if frac_part.is_empty() {
                format!("{}.0", int_part)
            } else {
                format!("{}.{}", int_part, frac_part)
            }
        }
    }
}
