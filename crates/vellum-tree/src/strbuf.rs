use crate::Arena;

/// Growable text accumulator used by every parser.
///
/// Parsers append characters as they consume input, then [`seal`](StrBuf::seal)
/// the accumulated text into an arena-owned string and keep reusing the same
/// buffer. Sealed strings stay valid across later resets; raw views into the
/// buffer do not survive a reset or a grow.
pub struct StrBuf {
    buf: String,
}

impl StrBuf {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.buf.push(c);
    }

    pub fn push_str(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    /// Append raw bytes, replacing invalid UTF-8 sequences with U+FFFD.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        match std::str::from_utf8(bytes) {
            Ok(s) => self.buf.push_str(s),
            Err(_) => self.buf.push_str(&String::from_utf8_lossy(bytes)),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Drop the accumulated text, keeping the allocation for reuse.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Copy the accumulated text into `arena` and reset the buffer.
    pub fn seal<'a>(&mut self, arena: &'a Arena) -> &'a str {
        let sealed = arena.alloc_str(&self.buf);
        self.buf.clear();
        sealed
    }
}

impl Default for StrBuf {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sealed_strings_survive_reset() {
        let arena = Arena::new();
        let mut buf = StrBuf::new();

        buf.push_str("hello");
        let first = buf.seal(&arena);
        assert!(buf.is_empty());

        buf.push_char('w');
        buf.push_str("orld");
        let second = buf.seal(&arena);

        assert_eq!(first, "hello");
        assert_eq!(second, "world");
    }
}
