//! Numeric literal scanning.

use crate::classify::is_number_terminator;
use crate::cursor::Cursor;
use crate::token::TokenKind;

/// Scan an integer, float, bigint (`n`) or bigdec (`m`) literal starting at a
/// decimal digit.
///
/// A `.` that is not followed by a digit ends the integer without being part
/// of it, so `1.foo` scans as `1` and leaves `.foo` for the next call.
pub fn scan_number(cursor: &mut impl Cursor) -> Option<TokenKind> {
    if !cursor.at(|c| c.is_ascii_digit()) {
        return None;
    }
    cursor.eat_while(|c| c.is_ascii_digit(), false);

    let mut is_float = false;
    loop {
        match cursor.lookahead() {
            Some('.') if is_float => return None,
            Some('.') => {
                cursor.mark_end();
                cursor.advance(false);
                if !cursor.at(|c| c.is_ascii_digit()) {
                    return Some(TokenKind::Int);
                }
                is_float = true;
                cursor.eat_while(|c| c.is_ascii_digit(), false);
            }
            Some('n' | 'N') => {
                if is_float {
                    return None;
                }
                cursor.advance(false);
                return finish(cursor, TokenKind::BigInt);
            }
            Some('m' | 'M') => {
                cursor.advance(false);
                return finish(cursor, TokenKind::BigDec);
            }
            _ => {
                let kind = if is_float {
                    TokenKind::Float
                } else {
                    TokenKind::Int
                };
                return finish(cursor, kind);
            }
        }
    }
}

/// Accept the literal only if it is followed by a terminator.
fn finish(cursor: &mut impl Cursor, kind: TokenKind) -> Option<TokenKind> {
    if cursor.is_eof() || cursor.at(is_number_terminator) {
        cursor.mark_end();
        Some(kind)
    } else {
        None
    }
}
