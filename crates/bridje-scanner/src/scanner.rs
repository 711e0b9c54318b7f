//! The scanner entry point the grammar engine calls once per token.

use tracing::{debug, trace};

use crate::classify::{CharClasses, is_closing_bracket, is_inline_whitespace, is_line_break};
use crate::cursor::Cursor;
use crate::indent;
use crate::number::scan_number;
use crate::state::{ScannerState, StateError};
use crate::symbol::{scan_caret, scan_dot_symbol, scan_symbol};
use crate::token::{TokenKind, ValidTokens};

/// External scanner for Bridje.
///
/// Owns the indentation state for one parse session. Each call to
/// [`scan`](Scanner::scan) produces at most one token.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    state: ScannerState,
    classes: CharClasses,
}

impl Scanner {
    /// Create a scanner with the default symbol character classes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scanner with custom symbol character classes.
    pub fn with_classes(classes: CharClasses) -> Self {
        Self {
            state: ScannerState::new(),
            classes,
        }
    }

    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    pub fn classes(&self) -> &CharClasses {
        &self.classes
    }

    /// Serialize the indentation state.
    pub fn serialize(&self) -> Vec<u8> {
        self.state.serialize()
    }

    /// Serialize the indentation state into `buf`.
    pub fn serialize_into(&self, buf: &mut [u8]) -> Result<usize, StateError> {
        self.state.serialize_into(buf)
    }

    /// Restore a serialized state. An empty buffer resets the scanner.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), StateError> {
        self.state.restore(bytes)
    }

    /// Reset to the state of a fresh session.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Scan one token from `cursor`, considering only the structural and
    /// metadata kinds contained in `valid`.
    ///
    /// Returns `None` when no acceptable token can be formed here; the state
    /// is left unchanged in that case.
    pub fn scan(&mut self, cursor: &mut impl Cursor, valid: ValidTokens) -> Option<TokenKind> {
        let kind = self.dispatch(cursor, valid);
        match kind {
            Some(kind) => trace!(%kind, depth = self.state.depth(), "scanned token"),
            None => trace!(lookahead = ?cursor.lookahead(), "no token"),
        }
        kind
    }

    fn dispatch(&mut self, cursor: &mut impl Cursor, valid: ValidTokens) -> Option<TokenKind> {
        if let Some(kind) = indent::resume_dedent(&mut self.state, valid) {
            return Some(kind);
        }

        cursor.eat_while(is_inline_whitespace, true);

        if cursor.at(is_line_break) {
            skip_blank_lines(cursor);
            if !cursor.is_eof() {
                let column = cursor.column();
                match indent::at_line_start(&mut self.state, column, valid) {
                    Ok(Some(kind)) => return Some(kind),
                    Ok(None) => {}
                    Err(err) => {
                        debug!(%err, column, "indentation rejected");
                        return None;
                    }
                }
            }
        }

        if cursor.is_eof() {
            return indent::close_level(&mut self.state, valid);
        }

        let ch = cursor.lookahead()?;
        if is_closing_bracket(ch) {
            return indent::close_level(&mut self.state, valid);
        }

        match ch {
            '0'..='9' => scan_number(cursor),
            '.' => scan_dot_symbol(cursor, &self.classes),
            '^' if valid.contains(TokenKind::Caret) => scan_caret(cursor, &self.classes),
            c if self.classes.is_symbol_head(c) => scan_symbol(cursor, &self.classes, valid),
            _ => None,
        }
    }
}

/// Skip a line break together with any whitespace-only lines after it.
/// Comment-only lines are not blank here: their indentation is measured like
/// any other line, since comments belong to the grammar.
fn skip_blank_lines(cursor: &mut impl Cursor) {
    while cursor.at(is_line_break) {
        cursor.advance(true);
        cursor.eat_while(is_inline_whitespace, true);
    }
}
