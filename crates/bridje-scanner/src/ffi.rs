//! C entry points linked into the generated Bridje parser.
//!
//! The parser calls these through its external scanner table. The payload is
//! a boxed [`Scanner`]; the lexer handle is wrapped in a [`Cursor`].

use std::ffi::{c_char, c_void};
use std::ptr::NonNull;
use std::slice;

use tracing::{debug, warn};

use crate::cursor::Cursor;
use crate::scanner::Scanner;
use crate::token::{TokenKind, ValidTokens};

/// Size of the buffer the parser hands to `serialize`.
pub const SERIALIZATION_BUFFER_SIZE: usize = 1024;

/// The parser's lexer handle, as laid out by the parser runtime.
#[repr(C)]
pub struct TSLexer {
    pub lookahead: i32,
    pub result_symbol: u16,
    pub advance: unsafe extern "C" fn(*mut TSLexer, bool),
    pub mark_end: unsafe extern "C" fn(*mut TSLexer),
    pub get_column: unsafe extern "C" fn(*mut TSLexer) -> u32,
    pub is_at_included_range_start: unsafe extern "C" fn(*const TSLexer) -> bool,
    pub eof: unsafe extern "C" fn(*const TSLexer) -> bool,
}

/// [`Cursor`] over a parser lexer handle.
struct LexerCursor {
    lexer: NonNull<TSLexer>,
}

impl LexerCursor {
    /// # Safety
    ///
    /// `lexer` must stay valid and unaliased for the life of the cursor.
    unsafe fn new(lexer: NonNull<TSLexer>) -> Self {
        Self { lexer }
    }
}

impl Cursor for LexerCursor {
    fn lookahead(&self) -> Option<char> {
        if self.is_eof() {
            return None;
        }
        // SAFETY: the lexer outlives the cursor (see `new`).
        let raw = unsafe { self.lexer.as_ref().lookahead };
        u32::try_from(raw).ok().and_then(char::from_u32)
    }

    fn advance(&mut self, skip: bool) {
        let lexer = self.lexer.as_ptr();
        // SAFETY: the lexer outlives the cursor (see `new`).
        unsafe { ((*lexer).advance)(lexer, skip) }
    }

    fn mark_end(&mut self) {
        let lexer = self.lexer.as_ptr();
        // SAFETY: the lexer outlives the cursor (see `new`).
        unsafe { ((*lexer).mark_end)(lexer) }
    }

    fn column(&mut self) -> u32 {
        let lexer = self.lexer.as_ptr();
        // SAFETY: the lexer outlives the cursor (see `new`).
        unsafe { ((*lexer).get_column)(lexer) }
    }

    fn is_eof(&self) -> bool {
        let lexer = self.lexer.as_ptr();
        // SAFETY: the lexer outlives the cursor (see `new`).
        unsafe { ((*lexer).eof)(lexer) }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn tree_sitter_bridje_external_scanner_create() -> *mut c_void {
    Box::into_raw(Box::new(Scanner::new())).cast()
}

/// # Safety
///
/// `payload` must come from `create` and not have been destroyed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tree_sitter_bridje_external_scanner_destroy(payload: *mut c_void) {
    if !payload.is_null() {
        // SAFETY: payload was produced by Box::into_raw in `create`.
        drop(unsafe { Box::from_raw(payload.cast::<Scanner>()) });
    }
}

/// # Safety
///
/// `payload` must come from `create`; `buffer` must hold
/// [`SERIALIZATION_BUFFER_SIZE`] writable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tree_sitter_bridje_external_scanner_serialize(
    payload: *mut c_void,
    buffer: *mut c_char,
) -> u32 {
    // SAFETY: guaranteed by the caller.
    let (scanner, buf) = unsafe {
        (
            &*payload.cast::<Scanner>(),
            slice::from_raw_parts_mut(buffer.cast::<u8>(), SERIALIZATION_BUFFER_SIZE),
        )
    };
    match scanner.serialize_into(buf) {
        Ok(written) => written as u32,
        Err(err) => {
            warn!(%err, "could not serialize scanner state");
            0
        }
    }
}

/// # Safety
///
/// `payload` must come from `create`; `buffer` must hold `length` readable
/// bytes unless `length` is 0.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tree_sitter_bridje_external_scanner_deserialize(
    payload: *mut c_void,
    buffer: *const c_char,
    length: u32,
) {
    // SAFETY: guaranteed by the caller.
    let scanner = unsafe { &mut *payload.cast::<Scanner>() };
    let bytes: &[u8] = if length == 0 || buffer.is_null() {
        &[]
    } else {
        // SAFETY: guaranteed by the caller.
        unsafe { slice::from_raw_parts(buffer.cast::<u8>(), length as usize) }
    };
    if let Err(err) = scanner.restore(bytes) {
        debug!(%err, "resetting malformed scanner state");
        scanner.reset();
    }
}

/// # Safety
///
/// `payload` must come from `create`; `lexer` must be a live lexer handle;
/// `valid_symbols` must hold one flag per external token kind.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tree_sitter_bridje_external_scanner_scan(
    payload: *mut c_void,
    lexer: *mut TSLexer,
    valid_symbols: *const bool,
) -> bool {
    let Some(lexer) = NonNull::new(lexer) else {
        return false;
    };
    // SAFETY: guaranteed by the caller.
    let (scanner, flags) = unsafe {
        (
            &mut *payload.cast::<Scanner>(),
            slice::from_raw_parts(valid_symbols, TokenKind::COUNT),
        )
    };
    let valid = ValidTokens::from_flags(flags);

    // SAFETY: the lexer handle is live for the duration of this call.
    let mut cursor = unsafe { LexerCursor::new(lexer) };
    match scanner.scan(&mut cursor, valid) {
        Some(kind) => {
            // SAFETY: as above; the cursor no longer touches the lexer.
            unsafe { (*lexer.as_ptr()).result_symbol = kind as u16 };
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::SourceCursor;
    use crate::token::Position;

    /// A lexer handle backed by a [`SourceCursor`], standing in for the
    /// parser runtime.
    #[repr(C)]
    struct FakeLexer {
        base: TSLexer,
        cursor: SourceCursor<'static>,
    }

    unsafe extern "C" fn fake_advance(lexer: *mut TSLexer, skip: bool) {
        let fake = unsafe { &mut *lexer.cast::<FakeLexer>() };
        fake.cursor.advance(skip);
        fake.sync();
    }

    unsafe extern "C" fn fake_mark_end(lexer: *mut TSLexer) {
        let fake = unsafe { &mut *lexer.cast::<FakeLexer>() };
        fake.cursor.mark_end();
    }

    unsafe extern "C" fn fake_get_column(lexer: *mut TSLexer) -> u32 {
        let fake = unsafe { &mut *lexer.cast::<FakeLexer>() };
        fake.cursor.column()
    }

    unsafe extern "C" fn fake_included_range_start(_: *const TSLexer) -> bool {
        false
    }

    unsafe extern "C" fn fake_eof(lexer: *const TSLexer) -> bool {
        let fake = unsafe { &*lexer.cast::<FakeLexer>() };
        fake.cursor.is_eof()
    }

    impl FakeLexer {
        fn new(input: &'static str) -> Box<Self> {
            let mut fake = Box::new(FakeLexer {
                base: TSLexer {
                    lookahead: 0,
                    result_symbol: u16::MAX,
                    advance: fake_advance,
                    mark_end: fake_mark_end,
                    get_column: fake_get_column,
                    is_at_included_range_start: fake_included_range_start,
                    eof: fake_eof,
                },
                cursor: SourceCursor::new(input),
            });
            fake.sync();
            fake
        }

        fn sync(&mut self) {
            self.base.lookahead = self.cursor.lookahead().map_or(0, |c| c as i32);
        }

        fn begin(&mut self) {
            self.cursor.begin_token();
            self.sync();
        }

        fn finish(&mut self) -> (Position, Position) {
            let bounds = self.cursor.token_bounds();
            self.cursor.reset_to(bounds.1);
            self.sync();
            bounds
        }
    }

    fn scan(payload: *mut c_void, fake: &mut FakeLexer, valid: &[bool]) -> Option<TokenKind> {
        fake.begin();
        let lexer = std::ptr::from_mut(fake).cast::<TSLexer>();
        let found =
            unsafe { tree_sitter_bridje_external_scanner_scan(payload, lexer, valid.as_ptr()) };
        found.then(|| TokenKind::from_index(fake.base.result_symbol as usize))?
    }

    #[test]
    fn test_scan_through_c_abi() {
        let payload = tree_sitter_bridje_external_scanner_create();
        let mut fake = FakeLexer::new("foo:bar\n  1.5");
        let valid = [true; TokenKind::COUNT];

        assert_eq!(scan(payload, &mut fake, &valid), Some(TokenKind::QualifiedSymbol));
        let (start, end) = fake.finish();
        assert_eq!(fake.cursor.slice(start, end), "foo:bar");

        assert_eq!(scan(payload, &mut fake, &valid), Some(TokenKind::Indent));
        fake.finish();
        assert_eq!(scan(payload, &mut fake, &valid), Some(TokenKind::Float));
        fake.finish();
        assert_eq!(scan(payload, &mut fake, &valid), Some(TokenKind::Dedent));
        fake.finish();
        assert_eq!(scan(payload, &mut fake, &valid), None);

        unsafe { tree_sitter_bridje_external_scanner_destroy(payload) };
    }

    #[test]
    fn test_valid_symbols_gate_structural_tokens() {
        let payload = tree_sitter_bridje_external_scanner_create();
        let mut fake = FakeLexer::new("\n  x");
        let mut valid = [true; TokenKind::COUNT];
        valid[TokenKind::Indent.index()] = false;

        assert_eq!(scan(payload, &mut fake, &valid), Some(TokenKind::Symbol));
        unsafe { tree_sitter_bridje_external_scanner_destroy(payload) };
    }

    #[test]
    fn test_serialize_round_trip_through_c_abi() {
        let payload = tree_sitter_bridje_external_scanner_create();
        let mut fake = FakeLexer::new("a\n  b\n    c\nd");
        let valid = [true; TokenKind::COUNT];
        for _ in 0..6 {
            assert!(scan(payload, &mut fake, &valid).is_some());
            fake.finish();
        }

        let mut buffer = [0 as c_char; SERIALIZATION_BUFFER_SIZE];
        let written =
            unsafe { tree_sitter_bridje_external_scanner_serialize(payload, buffer.as_mut_ptr()) };
        assert_eq!(written, 7);

        let other = tree_sitter_bridje_external_scanner_create();
        unsafe {
            tree_sitter_bridje_external_scanner_deserialize(other, buffer.as_ptr(), written);
        }
        assert_eq!(scan(other, &mut fake, &valid), Some(TokenKind::Dedent));

        unsafe {
            tree_sitter_bridje_external_scanner_destroy(payload);
            tree_sitter_bridje_external_scanner_destroy(other);
        }
    }

    #[test]
    fn test_deserialize_resets_on_empty_or_malformed() {
        let payload = tree_sitter_bridje_external_scanner_create();
        let garbage = [5 as c_char, 1, 2];
        unsafe {
            tree_sitter_bridje_external_scanner_deserialize(payload, garbage.as_ptr(), 3);
            assert_eq!((*payload.cast::<Scanner>()).state().stack(), &[0]);

            tree_sitter_bridje_external_scanner_deserialize(payload, std::ptr::null(), 0);
            let scanner = &*payload.cast::<Scanner>();
            assert_eq!(scanner.state().stack(), &[0]);
            assert!(!scanner.state().is_dedenting());

            tree_sitter_bridje_external_scanner_destroy(payload);
        }
    }
}
