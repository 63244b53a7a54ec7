//! Index-based cursor for byte scanning over markup input.
//!
//! The cursor never owns or mutates the input; it only tracks an offset.
//! Every scanning routine in the tokenizer, entity resolver and formatter
//! works through it so that no code does manual offset arithmetic.

/// A cursor for byte-by-byte scanning of an immutable slice.
///
/// # Example
/// ```
/// use imhtml::cursor::Cursor;
///
/// let input = b"<b>Hello</b>";
/// let mut cursor = Cursor::new(input);
///
/// assert!(cursor.eat(b'<'));
/// assert!(cursor.eat_ignore_case(b"B>"));
/// assert_eq!(cursor.peek(), Some(b'H'));
/// ```
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor over a byte slice.
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Create a cursor starting at an offset.
    #[inline]
    pub fn new_at(input: &'a [u8], offset: usize) -> Self {
        debug_assert!(offset <= input.len());
        Self {
            input,
            pos: offset.min(input.len()),
        }
    }

    /// Current offset from the start of input.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Number of bytes remaining.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Peek the current byte without advancing.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Peek at byte n positions ahead.
    #[inline]
    pub fn peek_ahead(&self, n: usize) -> Option<u8> {
        self.input.get(self.pos + n).copied()
    }

    /// Advance by n bytes, saturating at end of input.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.remaining());
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Advance by 1 byte.
    #[inline]
    pub fn bump(&mut self) {
        self.advance(1);
    }

    /// Check if current position matches a byte.
    #[inline]
    pub fn at(&self, b: u8) -> bool {
        self.peek() == Some(b)
    }

    /// Skip while predicate is true.
    #[inline]
    pub fn skip_while<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(u8) -> bool,
    {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !predicate(b) {
                break;
            }
            self.pos += 1;
        }
        self.pos - start
    }

    /// Consume a specific byte if present.
    #[inline]
    pub fn eat(&mut self, b: u8) -> bool {
        if self.at(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume a specific byte sequence if present.
    #[inline]
    pub fn eat_bytes(&mut self, bytes: &[u8]) -> bool {
        if self.remaining_slice().starts_with(bytes) {
            self.pos += bytes.len();
            true
        } else {
            false
        }
    }

    /// True if the remaining input starts with `bytes`, ignoring ASCII case.
    #[inline]
    pub fn starts_with_ignore_case(&self, bytes: &[u8]) -> bool {
        let rest = self.remaining_slice();
        rest.len() >= bytes.len() && rest[..bytes.len()].eq_ignore_ascii_case(bytes)
    }

    /// Consume `bytes` if present, ignoring ASCII case.
    #[inline]
    pub fn eat_ignore_case(&mut self, bytes: &[u8]) -> bool {
        if self.starts_with_ignore_case(bytes) {
            self.pos += bytes.len();
            true
        } else {
            false
        }
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_slice(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    /// Bytes from `start` up to the current position.
    #[inline]
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        &self.input[start.min(self.pos)..self.pos]
    }

    /// Find the next occurrence of a byte using memchr.
    #[inline]
    pub fn find(&self, needle: u8) -> Option<usize> {
        memchr::memchr(needle, self.remaining_slice())
    }

    /// Find the next occurrence of a byte sequence.
    #[inline]
    pub fn find_bytes(&self, needle: &[u8]) -> Option<usize> {
        memchr::memmem::find(self.remaining_slice(), needle)
    }
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("offset", &self.offset())
            .field("remaining", &self.remaining())
            .finish()
    }
}
