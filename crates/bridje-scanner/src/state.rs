//! Persistent scanner state and its serialized form.
//!
//! The serialized layout is
//!
//! ```text
//! [size: u8] [pending: i16] [width: u16; size]
//! ```
//!
//! with multi-byte values little-endian and `pending == -1` meaning no dedent
//! is in progress.

use thiserror::Error;

/// Maximum number of entries on the indentation stack, base level included.
pub const MAX_DEPTH: usize = u8::MAX as usize;

/// Widest indentation the serialized form can represent.
pub const MAX_WIDTH: u16 = i16::MAX as u16;

/// Bytes needed to serialize the fullest possible state.
pub const MAX_SERIALIZED_LEN: usize = HEADER_LEN + 2 * MAX_DEPTH;

const HEADER_LEN: usize = 3;
const NOT_DEDENTING: i16 = -1;

/// Errors that can occur while serializing or restoring scanner state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Serialized state truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Serialized state has an empty indentation stack")]
    EmptyStack,

    #[error("Indentation stack must start at width 0, found {width}")]
    NonZeroBase { width: u16 },

    #[error("Indentation width {width} is too wide to serialize")]
    WidthTooLarge { width: u16 },

    #[error("Indentation stack is not strictly increasing at index {index}")]
    NotIncreasing { index: usize },

    #[error("Pending dedent target {target} is invalid for stack top {top}")]
    InvalidPending { target: i16, top: u16 },

    #[error("Output buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

/// The indentation stack and pending dedent target, carried between scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerState {
    stack: Vec<u16>,
    pending_dedent: Option<u16>,
}

impl ScannerState {
    /// A fresh state: one level at width 0, not dedenting.
    pub fn new() -> Self {
        let mut stack = Vec::with_capacity(8);
        stack.push(0);
        Self {
            stack,
            pending_dedent: None,
        }
    }

    /// Widths from the outermost level to the innermost.
    pub fn stack(&self) -> &[u16] {
        &self.stack
    }

    /// Width of the innermost open level.
    pub fn top(&self) -> u16 {
        self.stack.last().copied().unwrap_or(0)
    }

    /// Number of levels above the base.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    pub fn pending_dedent(&self) -> Option<u16> {
        self.pending_dedent
    }

    pub fn is_dedenting(&self) -> bool {
        self.pending_dedent.is_some()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.stack.len() >= MAX_DEPTH
    }

    /// Open a level. Callers check capacity and ordering first.
    pub(crate) fn push(&mut self, width: u16) {
        debug_assert!(width > self.top());
        debug_assert!(!self.is_full());
        self.stack.push(width);
    }

    /// Close the innermost level. The base level is never removed. Returns
    /// false if there was nothing to close.
    pub(crate) fn pop(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        if self.pending_dedent.is_some_and(|target| self.top() <= target) {
            self.pending_dedent = None;
        }
        true
    }

    /// Begin unwinding towards `target`.
    pub(crate) fn start_dedent(&mut self, target: u16) {
        self.pending_dedent = (target < self.top()).then_some(target);
    }

    pub(crate) fn clear_dedent(&mut self) {
        self.pending_dedent = None;
    }

    /// Reset to the fresh state.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.stack.push(0);
        self.pending_dedent = None;
    }

    /// Number of bytes [`serialize_into`](Self::serialize_into) will write.
    pub fn serialized_len(&self) -> usize {
        HEADER_LEN + 2 * self.stack.len()
    }

    /// Serialize into a new buffer.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = vec![0; self.serialized_len()];
        let written = self.write(&mut buf);
        buf.truncate(written);
        buf
    }

    /// Serialize into `buf`, returning the number of bytes written.
    pub fn serialize_into(&self, buf: &mut [u8]) -> Result<usize, StateError> {
        let needed = self.serialized_len();
        if buf.len() < needed {
            return Err(StateError::BufferTooSmall {
                needed,
                available: buf.len(),
            });
        }
        Ok(self.write(buf))
    }

    fn write(&self, buf: &mut [u8]) -> usize {
        // The stack never exceeds MAX_DEPTH, which fits in the size byte.
        buf[0] = self.stack.len() as u8;
        let pending = self
            .pending_dedent
            .map_or(NOT_DEDENTING, |target| target as i16);
        buf[1..3].copy_from_slice(&pending.to_le_bytes());
        for (slot, width) in buf[HEADER_LEN..].chunks_exact_mut(2).zip(&self.stack) {
            slot.copy_from_slice(&width.to_le_bytes());
        }
        self.serialized_len()
    }

    /// Decode a serialized state. An empty buffer decodes to the fresh state.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, StateError> {
        if bytes.is_empty() {
            return Ok(Self::new());
        }
        if bytes.len() < HEADER_LEN {
            return Err(StateError::Truncated {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }

        let size = bytes[0] as usize;
        let expected = HEADER_LEN + 2 * size;
        if bytes.len() < expected {
            return Err(StateError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }
        if size == 0 {
            return Err(StateError::EmptyStack);
        }

        let stack: Vec<u16> = bytes[HEADER_LEN..expected]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        if stack[0] != 0 {
            return Err(StateError::NonZeroBase { width: stack[0] });
        }
        if let Some(&width) = stack.iter().find(|&&width| width > MAX_WIDTH) {
            return Err(StateError::WidthTooLarge { width });
        }
        if let Some(index) = stack.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(StateError::NotIncreasing { index: index + 1 });
        }

        let top = stack[size - 1];
        let raw_pending = i16::from_le_bytes([bytes[1], bytes[2]]);
        let pending_dedent = match raw_pending {
            NOT_DEDENTING => None,
            target if target >= 0 && (target as u16) < top => Some(target as u16),
            target => return Err(StateError::InvalidPending { target, top }),
        };

        Ok(Self {
            stack,
            pending_dedent,
        })
    }

    /// Replace this state with a serialized one, resetting on an empty buffer.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), StateError> {
        *self = Self::deserialize(bytes)?;
        Ok(())
    }
}

impl Default for ScannerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(stack: &[u16], pending: Option<u16>) -> ScannerState {
        ScannerState {
            stack: stack.to_vec(),
            pending_dedent: pending,
        }
    }

    #[test]
    fn test_new_state() {
        let s = ScannerState::new();
        assert_eq!(s.stack(), &[0]);
        assert_eq!(s.top(), 0);
        assert_eq!(s.depth(), 0);
        assert!(!s.is_dedenting());
    }

    #[test]
    fn test_serialize_layout() {
        let s = state(&[0, 2, 260], Some(1));
        assert_eq!(s.serialize(), vec![3, 1, 0, 0, 0, 2, 0, 4, 1]);

        let idle = ScannerState::new();
        assert_eq!(idle.serialize(), vec![1, 0xff, 0xff, 0, 0]);
    }

    #[test]
    fn test_deserialize_empty_resets() {
        assert_eq!(ScannerState::deserialize(&[]).unwrap(), ScannerState::new());

        let mut s = state(&[0, 4, 8], Some(2));
        s.restore(&[]).unwrap();
        assert_eq!(s, ScannerState::new());
    }

    #[test]
    fn test_deserialize_restores_serialized() {
        let s = state(&[0, 2, 4, 8], Some(2));
        assert_eq!(ScannerState::deserialize(&s.serialize()).unwrap(), s);
    }

    #[test]
    fn test_deserialize_rejects_malformed() {
        assert!(matches!(
            ScannerState::deserialize(&[1, 0xff]),
            Err(StateError::Truncated { .. })
        ));
        assert!(matches!(
            ScannerState::deserialize(&[2, 0xff, 0xff, 0, 0]),
            Err(StateError::Truncated { expected: 7, actual: 5 })
        ));
        assert_eq!(
            ScannerState::deserialize(&[0, 0xff, 0xff]),
            Err(StateError::EmptyStack)
        );
        assert_eq!(
            ScannerState::deserialize(&[1, 0xff, 0xff, 3, 0]),
            Err(StateError::NonZeroBase { width: 3 })
        );
        assert_eq!(
            ScannerState::deserialize(&[3, 0xff, 0xff, 0, 0, 4, 0, 4, 0]),
            Err(StateError::NotIncreasing { index: 2 })
        );
        assert_eq!(
            ScannerState::deserialize(&[2, 4, 0, 0, 0, 4, 0]),
            Err(StateError::InvalidPending { target: 4, top: 4 })
        );
        assert_eq!(
            ScannerState::deserialize(&[2, 0xff, 0xff, 0, 0, 0, 0x80]),
            Err(StateError::WidthTooLarge { width: 0x8000 })
        );
    }

    #[test]
    fn test_full_stack_round_trip() {
        let widths: Vec<u16> = (0..MAX_DEPTH as u16).map(|i| i * 4).collect();
        let s = state(&widths, Some(100));
        assert!(s.is_full());

        let mut buf = [0u8; 1024];
        let written = s.serialize_into(&mut buf).unwrap();
        assert_eq!(written, MAX_SERIALIZED_LEN);
        assert_eq!(buf[0], 255);
        assert_eq!(ScannerState::deserialize(&buf[..written]).unwrap(), s);
    }

    #[test]
    fn test_serialize_into_small_buffer() {
        let s = state(&[0, 2], None);
        let mut buf = [0u8; 4];
        assert_eq!(
            s.serialize_into(&mut buf),
            Err(StateError::BufferTooSmall {
                needed: 7,
                available: 4
            })
        );
        let mut buf = [0u8; MAX_SERIALIZED_LEN];
        assert_eq!(s.serialize_into(&mut buf), Ok(7));
    }

    #[test]
    fn test_pop_keeps_base_and_clears_pending() {
        let mut s = state(&[0, 2, 4], None);
        s.start_dedent(2);
        assert_eq!(s.pending_dedent(), Some(2));
        assert!(s.pop());
        assert_eq!(s.top(), 2);
        assert!(!s.is_dedenting());
        assert!(s.pop());
        assert!(!s.pop());
        assert_eq!(s.stack(), &[0]);
    }

    #[test]
    fn test_start_dedent_ignores_non_lower_target() {
        let mut s = state(&[0, 2], None);
        s.start_dedent(2);
        assert!(!s.is_dedenting());
    }
}
