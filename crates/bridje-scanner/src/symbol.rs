//! Symbol scanning: plain, qualified, member-access and metadata markers.

use crate::classify::CharClasses;
use crate::cursor::Cursor;
use crate::token::{TokenKind, ValidTokens};

/// Scan a symbol starting at a symbol-head character.
///
/// `ns:name` segments chain into a qualified symbol. A colon that is not
/// followed by another symbol-head is a block-call suffix and is left out of
/// the token, as is anything after a trailing gensym `#`. When `valid` does
/// not accept a qualified symbol, the token stops before the first colon.
pub fn scan_symbol(
    cursor: &mut impl Cursor,
    classes: &CharClasses,
    valid: ValidTokens,
) -> Option<TokenKind> {
    if !cursor.at(|c| classes.is_symbol_head(c)) {
        return None;
    }

    let mut kind = TokenKind::Symbol;
    loop {
        cursor.eat_while(|c| classes.is_symbol_char(c), false);
        cursor.mark_end();

        match cursor.lookahead() {
            Some('#') => {
                cursor.advance(false);
                cursor.mark_end();
                return Some(kind);
            }
            Some(':') if !valid.contains(TokenKind::QualifiedSymbol) => return Some(kind),
            Some(':') => {
                cursor.advance(false);
                if !cursor.at(|c| classes.is_symbol_head(c)) {
                    return Some(kind);
                }
                kind = TokenKind::QualifiedSymbol;
            }
            _ => return Some(kind),
        }
    }
}

/// Scan a member-access symbol such as `.length`.
pub fn scan_dot_symbol(cursor: &mut impl Cursor, classes: &CharClasses) -> Option<TokenKind> {
    if cursor.lookahead() != Some('.') {
        return None;
    }
    cursor.advance(false);
    if !cursor.at(|c| classes.is_symbol_head(c)) {
        return None;
    }
    cursor.eat_while(|c| classes.is_symbol_char(c), false);
    cursor.mark_end();
    Some(TokenKind::DotSymbol)
}

/// Scan a `^` metadata marker. Only the caret itself is part of the token; the
/// symbol or map that follows is scanned separately.
pub fn scan_caret(cursor: &mut impl Cursor, classes: &CharClasses) -> Option<TokenKind> {
    if cursor.lookahead() != Some('^') {
        return None;
    }
    cursor.advance(false);
    cursor.mark_end();
    if cursor.at(|c| c == '{' || classes.is_symbol_head(c)) {
        Some(TokenKind::Caret)
    } else {
        None
    }
}
