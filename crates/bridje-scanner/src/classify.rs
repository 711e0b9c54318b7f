//! Character classification.
//!
//! The punctuation allowed at the start of a symbol has changed between
//! grammar revisions, so it is carried as configuration in [`CharClasses`]
//! rather than fixed here. The remaining classes are plain functions.

/// Punctuation that may start a symbol in the current grammar.
pub const DEFAULT_SYMBOL_PUNCTUATION: &str = "*-_+=?!<>&";

/// Punctuation accepted by the earlier grammar revision.
pub const LEGACY_SYMBOL_PUNCTUATION: &str = "%*-_+=?!<>|";

/// Configurable symbol character classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharClasses {
    punctuation: Vec<char>,
}

impl CharClasses {
    /// Classes using an explicit set of symbol-head punctuation.
    pub fn with_punctuation(punctuation: &str) -> Self {
        let mut chars: Vec<char> = punctuation.chars().collect();
        chars.sort_unstable();
        chars.dedup();
        Self { punctuation: chars }
    }

    /// Classes for the earlier grammar revision (`%` and `|`, no `&`).
    pub fn legacy() -> Self {
        Self::with_punctuation(LEGACY_SYMBOL_PUNCTUATION)
    }

    pub fn punctuation(&self) -> &[char] {
        &self.punctuation
    }

    /// Can `ch` start a symbol?
    pub fn is_symbol_head(&self, ch: char) -> bool {
        ch.is_alphabetic() || self.punctuation.binary_search(&ch).is_ok()
    }

    /// Can `ch` continue a symbol?
    pub fn is_symbol_char(&self, ch: char) -> bool {
        self.is_symbol_head(ch) || ch.is_ascii_digit()
    }
}

impl Default for CharClasses {
    fn default() -> Self {
        Self::with_punctuation(DEFAULT_SYMBOL_PUNCTUATION)
    }
}

/// Whitespace that never carries structure. Commas are separators.
pub fn is_inline_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | ',' | '\r')
}

/// Whitespace that ends a line and triggers indentation handling.
pub fn is_line_break(ch: char) -> bool {
    ch == '\n'
}

pub fn is_closing_bracket(ch: char) -> bool {
    matches!(ch, ']' | ')' | '}')
}

/// Characters that may directly follow a numeric literal.
pub fn is_number_terminator(ch: char) -> bool {
    is_inline_whitespace(ch) || is_line_break(ch) || is_closing_bracket(ch)
}
