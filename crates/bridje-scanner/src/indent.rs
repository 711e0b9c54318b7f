//! Indentation state machine.
//!
//! Each function here decides at most one structural token. Multi-level
//! dedents are unwound one level per call through the pending dedent target
//! kept in [`ScannerState`].

use thiserror::Error;
use tracing::trace;

use crate::state::{MAX_DEPTH, MAX_WIDTH, ScannerState};
use crate::token::{TokenKind, ValidTokens};

/// Indentation the state cannot represent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndentError {
    #[error("Indentation nested deeper than {max} levels")]
    TooDeep { max: usize },

    #[error("Indentation width {width} exceeds the maximum of {max}")]
    TooWide { width: u32, max: u16 },
}

/// Continue an unfinished dedent, one level per call.
///
/// Returns `None` once the stack has unwound to the target (clearing it) or
/// while the grammar does not accept a DEDENT here.
pub fn resume_dedent(state: &mut ScannerState, valid: ValidTokens) -> Option<TokenKind> {
    let target = state.pending_dedent()?;
    if state.top() <= target {
        state.clear_dedent();
        return None;
    }
    if !valid.contains(TokenKind::Dedent) || !state.pop() {
        return None;
    }
    trace!(dedent_to = target, top = state.top(), "resumed dedent");
    Some(TokenKind::Dedent)
}

/// Compare the first column of a new line against the innermost level.
pub fn at_line_start(
    state: &mut ScannerState,
    column: u32,
    valid: ValidTokens,
) -> Result<Option<TokenKind>, IndentError> {
    let top = u32::from(state.top());

    if column > top {
        if !valid.contains(TokenKind::Indent) {
            return Ok(None);
        }
        let width = u16::try_from(column)
            .ok()
            .filter(|&width| width <= MAX_WIDTH)
            .ok_or(IndentError::TooWide {
                width: column,
                max: MAX_WIDTH,
            })?;
        if state.is_full() {
            return Err(IndentError::TooDeep { max: MAX_DEPTH });
        }
        state.push(width);
        trace!(width, depth = state.depth(), "indent");
        return Ok(Some(TokenKind::Indent));
    }

    if column < top {
        if !valid.contains(TokenKind::Dedent) {
            return Ok(None);
        }
        // column < top, so it fits the stack's width type
        state.start_dedent(column as u16);
        state.pop();
        trace!(dedent_to = column, top = state.top(), "dedent");
        return Ok(Some(TokenKind::Dedent));
    }

    Ok(valid
        .contains(TokenKind::Newline)
        .then_some(TokenKind::Newline))
}

/// Close the innermost level at end of input or before a closing bracket.
pub fn close_level(state: &mut ScannerState, valid: ValidTokens) -> Option<TokenKind> {
    if !valid.contains(TokenKind::Dedent) || !state.pop() {
        return None;
    }
    trace!(top = state.top(), "closed level");
    Some(TokenKind::Dedent)
}
