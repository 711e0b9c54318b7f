//! Character stream cursor consumed by the scanner.

use crate::token::Position;

/// The view of the input the scanner works against.
///
/// This mirrors the lexer handle a grammar engine passes to an external
/// scanner: a single lookahead character, `advance` that may leave the
/// character out of the token, and `mark_end` to commit the token end before
/// looking further ahead.
pub trait Cursor {
    /// The current character, or `None` at end of input.
    fn lookahead(&self) -> Option<char>;

    /// Consume the current character. With `skip` set, the character becomes
    /// whitespace before the token rather than part of it.
    fn advance(&mut self, skip: bool);

    /// Freeze the token end at the current position. Characters consumed
    /// afterwards are not part of the token unless `mark_end` is called again.
    fn mark_end(&mut self);

    /// 0-based column of the current position.
    fn column(&mut self) -> u32;

    fn is_eof(&self) -> bool;

    /// Returns true if the current character satisfies `pred`.
    fn at(&self, pred: impl FnOnce(char) -> bool) -> bool
    where
        Self: Sized,
    {
        self.lookahead().is_some_and(pred)
    }

    /// Advance while the current character satisfies `pred`.
    fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool, skip: bool)
    where
        Self: Sized,
    {
        while self.lookahead().is_some_and(&mut pred) {
            self.advance(skip);
        }
    }
}

/// A [`Cursor`] over an in-memory string.
///
/// Token boundaries follow the grammar engine's rules: skipped characters move
/// the token start, and the token ends at the last `mark_end` or, failing
/// that, wherever the scanner stopped.
#[derive(Debug, Clone)]
pub struct SourceCursor<'a> {
    input: &'a str,
    current: Position,
    token_start: Position,
    marked_end: Option<Position>,
}

impl<'a> SourceCursor<'a> {
    /// Create a cursor positioned at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            current: Position::default(),
            token_start: Position::default(),
            marked_end: None,
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    /// The current position.
    pub fn position(&self) -> Position {
        self.current
    }

    /// Start a new token at the current position, forgetting any marked end.
    pub fn begin_token(&mut self) {
        self.token_start = self.current;
        self.marked_end = None;
    }

    /// The start and end of the token scanned since [`begin_token`].
    ///
    /// [`begin_token`]: SourceCursor::begin_token
    pub fn token_bounds(&self) -> (Position, Position) {
        let end = self.marked_end.unwrap_or(self.current);
        if end.offset < self.token_start.offset {
            (end, end)
        } else {
            (self.token_start, end)
        }
    }

    /// Move back (or forward) to a previously observed position. A position
    /// past the end of the input or inside a character is pulled back to the
    /// nearest character boundary.
    pub fn reset_to(&mut self, position: Position) {
        let position = self.clamp(position);
        self.current = position;
        self.token_start = position;
        self.marked_end = None;
    }

    fn clamp(&self, position: Position) -> Position {
        if self.input.is_char_boundary(position.offset) {
            return position;
        }
        let mut offset = position.offset.min(self.input.len());
        while !self.input.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &self.input[..offset];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count();
        Position::new(offset, line, column)
    }

    /// The source text between two positions.
    pub fn slice(&self, start: Position, end: Position) -> &'a str {
        &self.input[start.offset..end.offset]
    }
}

impl Cursor for SourceCursor<'_> {
    fn lookahead(&self) -> Option<char> {
        self.input[self.current.offset..].chars().next()
    }

    fn advance(&mut self, skip: bool) {
        let Some(ch) = self.lookahead() else {
            return;
        };
        self.current.offset += ch.len_utf8();
        if ch == '\n' {
            self.current.line += 1;
            self.current.column = 0;
        } else {
            self.current.column += 1;
        }
        if skip {
            self.token_start = self.current;
        }
    }

    fn mark_end(&mut self) {
        self.marked_end = Some(self.current);
    }

    fn column(&mut self) -> u32 {
        u32::try_from(self.current.column).unwrap_or(u32::MAX)
    }

    fn is_eof(&self) -> bool {
        self.current.offset >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_tracks_lines_and_columns() {
        let mut cursor = SourceCursor::new("ab\ncd");
        cursor.advance(false);
        cursor.advance(false);
        assert_eq!(cursor.column(), 2);
        cursor.advance(false);
        assert_eq!(cursor.position(), Position::new(3, 1, 0));
        assert_eq!(cursor.lookahead(), Some('c'));
    }

    #[test]
    fn test_skip_moves_token_start() {
        let mut cursor = SourceCursor::new("  foo");
        cursor.begin_token();
        cursor.advance(true);
        cursor.advance(true);
        cursor.eat_while(|c| c.is_alphabetic(), false);
        let (start, end) = cursor.token_bounds();
        assert_eq!(cursor.slice(start, end), "foo");
    }

    #[test]
    fn test_mark_end_excludes_lookahead() {
        let mut cursor = SourceCursor::new("foo:");
        cursor.begin_token();
        cursor.eat_while(|c| c.is_alphabetic(), false);
        cursor.mark_end();
        cursor.advance(false);
        assert!(cursor.is_eof());
        let (start, end) = cursor.token_bounds();
        assert_eq!(cursor.slice(start, end), "foo");
    }

    #[test]
    fn test_multibyte_characters() {
        let mut cursor = SourceCursor::new("λx");
        cursor.advance(false);
        assert_eq!(cursor.position().offset, 2);
        assert_eq!(cursor.column(), 1);
        assert!(cursor.at(|c| c == 'x'));
    }

    #[test]
    fn test_advance_at_eof_is_noop() {
        let mut cursor = SourceCursor::new("");
        cursor.advance(false);
        assert!(cursor.is_eof());
        assert_eq!(cursor.lookahead(), None);
        assert_eq!(cursor.position(), Position::default());
    }

    #[test]
    fn test_reset_to() {
        let mut cursor = SourceCursor::new("abc");
        let start = cursor.position();
        cursor.advance(false);
        cursor.advance(false);
        cursor.reset_to(start);
        assert_eq!(cursor.lookahead(), Some('a'));
    }

    #[test]
    fn test_reset_to_clamps_out_of_range_positions() {
        let mut cursor = SourceCursor::new("a\nλ");
        cursor.reset_to(Position::new(99, 7, 7));
        assert!(cursor.is_eof());
        assert_eq!(cursor.lookahead(), None);
        assert_eq!(cursor.position(), Position::new(4, 1, 1));

        cursor.reset_to(Position::new(3, 1, 1));
        assert_eq!(cursor.position(), Position::new(2, 1, 0));
        assert_eq!(cursor.lookahead(), Some('λ'));
    }
}
