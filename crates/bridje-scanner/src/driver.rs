//! Drive the scanner over a whole string.
//!
//! This stands in for the grammar engine when there is no grammar at hand:
//! every token kind is acceptable, and the few lexemes the grammar lexes
//! itself (brackets, block-call colons, strings, comments, discards) are
//! recognized here so that scanning can carry on past them.

use thiserror::Error;

use crate::classify::{is_inline_whitespace, is_line_break};
use crate::cursor::{Cursor, SourceCursor};
use crate::scanner::Scanner;
use crate::token::{Position, Token, ValidTokens};

/// Errors that can occur while tokenizing a string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("No token can be formed at line {line}, column {column}")]
    NoToken { line: usize, column: usize },

    #[error("Unterminated string literal at line {line}, column {column}")]
    UnterminatedString { line: usize, column: usize },
}

impl ScanError {
    fn no_token(pos: Position) -> Self {
        ScanError::NoToken {
            line: pos.line_number(),
            column: pos.column_number(),
        }
    }
}

/// Lexemes the grammar lexes on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    OpenBracket,
    CloseBracket,
    Colon,
    String,
    Comment,
    Discard,
}

/// A lexeme recognized on the grammar's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLexeme {
    pub kind: HostKind,
    pub text: String,
    pub start: Position,
    pub end: Position,
}

/// One item of tokenizer output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexeme {
    Token(Token),
    Host(HostLexeme),
}

impl Lexeme {
    pub fn start(&self) -> Position {
        match self {
            Lexeme::Token(token) => token.start,
            Lexeme::Host(host) => host.start,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Lexeme::Token(token) => &token.text,
            Lexeme::Host(host) => &host.text,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Lexeme::Token(token) => Some(token),
            Lexeme::Host(_) => None,
        }
    }
}

/// Iterator of lexemes over a string.
pub struct Tokenizer<'a> {
    cursor: SourceCursor<'a>,
    scanner: Scanner,
    valid: ValidTokens,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer with a fresh scanner.
    pub fn new(input: &'a str) -> Self {
        Self::with_scanner(input, Scanner::new())
    }

    /// Create a tokenizer using a configured (or restored) scanner.
    pub fn with_scanner(input: &'a str, scanner: Scanner) -> Self {
        Self {
            cursor: SourceCursor::new(input),
            scanner,
            valid: ValidTokens::all(),
            done: false,
        }
    }

    /// Resume tokenizing `input` at `position` with a restored scanner.
    pub fn resume(input: &'a str, position: Position, scanner: Scanner) -> Self {
        let mut tokenizer = Self::with_scanner(input, scanner);
        tokenizer.cursor.reset_to(position);
        tokenizer
    }

    /// Restrict the token kinds offered to the scanner.
    pub fn with_valid_tokens(mut self, valid: ValidTokens) -> Self {
        self.valid = valid;
        self
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    pub fn into_scanner(self) -> Scanner {
        self.scanner
    }

    /// The position the next lexeme will be scanned from.
    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    /// Produce the next lexeme, or `None` at end of input.
    pub fn next_lexeme(&mut self) -> Result<Option<Lexeme>, ScanError> {
        let before = self.cursor.position();
        self.cursor.begin_token();
        if let Some(kind) = self.scanner.scan(&mut self.cursor, self.valid) {
            let (start, end) = self.cursor.token_bounds();
            let text = self.cursor.slice(start, end).to_string();
            self.cursor.reset_to(end);
            return Ok(Some(Lexeme::Token(Token::new(kind, text, start, end))));
        }

        self.cursor.reset_to(before);
        self.host_lexeme()
    }

    fn host_lexeme(&mut self) -> Result<Option<Lexeme>, ScanError> {
        self.cursor
            .eat_while(|c| is_inline_whitespace(c) || is_line_break(c), true);
        let start = self.cursor.position();
        let Some(ch) = self.cursor.lookahead() else {
            return Ok(None);
        };

        self.cursor.advance(false);
        let kind = match ch {
            '(' | '[' | '{' => HostKind::OpenBracket,
            ')' | ']' | '}' => HostKind::CloseBracket,
            ':' => HostKind::Colon,
            '#' if self.cursor.lookahead() == Some('{') => {
                self.cursor.advance(false);
                HostKind::OpenBracket
            }
            '#' if self.cursor.lookahead() == Some('_') => {
                self.cursor.advance(false);
                HostKind::Discard
            }
            ';' => {
                self.cursor.eat_while(|c| !is_line_break(c), false);
                HostKind::Comment
            }
            '"' => {
                self.string_body(start)?;
                HostKind::String
            }
            _ => return Err(ScanError::no_token(start)),
        };

        let end = self.cursor.position();
        Ok(Some(Lexeme::Host(HostLexeme {
            kind,
            text: self.cursor.slice(start, end).to_string(),
            start,
            end,
        })))
    }

    fn string_body(&mut self, start: Position) -> Result<(), ScanError> {
        loop {
            match self.cursor.lookahead() {
                None => {
                    return Err(ScanError::UnterminatedString {
                        line: start.line_number(),
                        column: start.column_number(),
                    });
                }
                Some('"') => {
                    self.cursor.advance(false);
                    return Ok(());
                }
                Some('\\') => {
                    self.cursor.advance(false);
                    self.cursor.advance(false);
                }
                Some(_) => self.cursor.advance(false),
            }
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Lexeme, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_lexeme() {
            Ok(Some(lexeme)) => Some(Ok(lexeme)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Tokenize an input string into lexemes.
pub fn tokenize(input: &str) -> Result<Vec<Lexeme>, ScanError> {
    Tokenizer::new(input).collect()
}

/// Tokenize an input string, keeping only the scanner's tokens.
pub fn scan_tokens(input: &str) -> Result<Vec<Token>, ScanError> {
    let mut tokens = Vec::new();
    for lexeme in Tokenizer::new(input) {
        if let Lexeme::Token(token) = lexeme? {
            tokens.push(token);
        }
    }
    Ok(tokens)
}
