//! Token types produced by the Bridje external scanner.

use std::fmt;

/// Token kinds the external scanner can produce.
///
/// The discriminants are the external symbol indices the grammar declares, so
/// the order here must match the grammar's `externals` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TokenKind {
    // Symbols
    Symbol,
    QualifiedSymbol,
    DotSymbol,

    // Numbers
    Int,
    Float,
    BigInt,
    BigDec,

    // Metadata
    Caret,

    // Structural
    Indent,
    Dedent,
    Newline,
}

impl TokenKind {
    /// Every kind, in external symbol order.
    pub const ALL: [TokenKind; 11] = [
        TokenKind::Symbol,
        TokenKind::QualifiedSymbol,
        TokenKind::DotSymbol,
        TokenKind::Int,
        TokenKind::Float,
        TokenKind::BigInt,
        TokenKind::BigDec,
        TokenKind::Caret,
        TokenKind::Indent,
        TokenKind::Dedent,
        TokenKind::Newline,
    ];

    /// Number of token kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the external symbol index of this kind.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Looks up a kind by external symbol index.
    pub fn from_index(index: usize) -> Option<TokenKind> {
        Self::ALL.get(index).copied()
    }

    /// Block-boundary tokens that carry no text.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            TokenKind::Indent | TokenKind::Dedent | TokenKind::Newline
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Symbol => "SYMBOL",
            TokenKind::QualifiedSymbol => "QUALIFIED_SYMBOL",
            TokenKind::DotSymbol => "DOT_SYMBOL",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::BigInt => "BIGINT",
            TokenKind::BigDec => "BIGDEC",
            TokenKind::Caret => "CARET",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::Newline => "NEWLINE",
        };
        write!(f, "{}", s)
    }
}

/// The set of token kinds the grammar will accept at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ValidTokens(u16);

impl ValidTokens {
    /// No kind is acceptable.
    pub const fn none() -> Self {
        Self(0)
    }

    /// Every kind is acceptable.
    pub const fn all() -> Self {
        Self((1 << TokenKind::COUNT) - 1)
    }

    /// Builds a set from a list of kinds.
    pub fn of(kinds: &[TokenKind]) -> Self {
        kinds.iter().fold(Self::none(), |set, &kind| set.with(kind))
    }

    /// Builds a set from a boolean flag per kind, indexed in external symbol
    /// order. Missing trailing entries count as not acceptable.
    pub fn from_flags(flags: &[bool]) -> Self {
        TokenKind::ALL
            .iter()
            .zip(flags)
            .filter(|(_, accepted)| **accepted)
            .fold(Self::none(), |set, (&kind, _)| set.with(kind))
    }

    pub fn with(self, kind: TokenKind) -> Self {
        Self(self.0 | Self::bit(kind))
    }

    pub fn without(self, kind: TokenKind) -> Self {
        Self(self.0 & !Self::bit(kind))
    }

    pub fn contains(self, kind: TokenKind) -> bool {
        self.0 & Self::bit(kind) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the contained kinds in external symbol order.
    pub fn iter(self) -> impl Iterator<Item = TokenKind> {
        TokenKind::ALL.into_iter().filter(move |&kind| self.contains(kind))
    }

    fn bit(kind: TokenKind) -> u16 {
        1 << kind.index()
    }
}

impl FromIterator<TokenKind> for ValidTokens {
    fn from_iter<I: IntoIterator<Item = TokenKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), |set, kind| set.with(kind))
    }
}

/// Position in source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset within the input.
    pub offset: usize,
    /// 0-indexed line number.
    pub line: usize,
    /// 0-indexed column, counted in characters from the start of the line.
    pub column: usize,
}

impl Position {
    /// Create a new Position.
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Returns the 1-indexed line number.
    pub fn line_number(&self) -> usize {
        self.line + 1
    }

    /// Returns the 1-indexed column number.
    pub fn column_number(&self) -> usize {
        self.column + 1
    }
}

/// A token produced by the scanner, with the text it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The covered source text. Empty for structural tokens.
    pub text: String,
    /// Start position in source.
    pub start: Position,
    /// End position in source.
    pub end: Position,
}

impl Token {
    /// Create a new Token.
    pub fn new(kind: TokenKind, text: String, start: Position, end: Position) -> Self {
        Self {
            kind,
            text,
            start,
            end,
        }
    }
}
