//! Bridje external scanner - the hand-written part of the Bridje grammar.
//!
//! The grammar engine calls [`Scanner::scan`] whenever it may need a token
//! the declarative grammar cannot describe: block structure from significant
//! indentation, and symbols and numbers whose shape depends on lookahead.
//!
//! # Example
//!
//! ```
//! use bridje_scanner::{scan_tokens, TokenKind};
//!
//! let tokens = scan_tokens("when: ready?\n  go 1.5").unwrap();
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         TokenKind::Symbol,
//!         TokenKind::Symbol,
//!         TokenKind::Indent,
//!         TokenKind::Symbol,
//!         TokenKind::Float,
//!         TokenKind::Dedent,
//!     ]
//! );
//! ```

pub mod classify;
pub mod cursor;
pub mod driver;
pub mod ffi;
pub mod indent;
pub mod number;
pub mod scanner;
pub mod state;
pub mod symbol;
pub mod token;


pub use classify::CharClasses;
pub use cursor::{Cursor, SourceCursor};
pub use driver::{HostKind, HostLexeme, Lexeme, ScanError, Tokenizer, scan_tokens, tokenize};
pub use indent::IndentError;
pub use scanner::Scanner;
pub use state::{ScannerState, StateError};
pub use token::{Position, Token, TokenKind, ValidTokens};
