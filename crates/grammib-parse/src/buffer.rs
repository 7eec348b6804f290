//! Streaming character buffer with unbounded look-ahead.
//!
//! [`CharBuffer`] pulls characters from a [`TextSource`] on demand, keeping
//! a growing window of look-ahead in memory. Consumed characters are trimmed
//! away block by block, retaining a short history for look-back. The buffer
//! tracks the 1-based line and column of the next character to consume;
//! only `\n` terminates a line, a standalone `\r` is ordinary data.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::SourceError;

/// Characters fetched from the source per refill, and the consumed-prefix
/// length that triggers trimming.
const BLOCK_SIZE: usize = 1024;

/// Characters of history retained before the read position when trimming.
const HISTORY: usize = 16;

/// A pull-based source of characters.
pub trait TextSource {
    /// Append up to `max` characters to `out`, returning the number
    /// appended. Zero means end of input.
    fn read_chars(&mut self, out: &mut String, max: usize) -> Result<usize, SourceError>;
}

/// An in-memory text source.
pub struct StringSource {
    text: String,
    pos: usize,
}

impl StringSource {
    /// Create a source over the given text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pos: 0,
        }
    }
}

impl TextSource for StringSource {
    fn read_chars(&mut self, out: &mut String, max: usize) -> Result<usize, SourceError> {
        let mut count = 0;
        let mut iter = self.text[self.pos..].chars();
        while count < max {
            let Some(c) = iter.next() else { break };
            out.push(c);
            self.pos += c.len_utf8();
            count += 1;
        }
        Ok(count)
    }
}

/// A text source decoding UTF-8 from any [`std::io::Read`].
///
/// Bytes that do not form valid UTF-8 are reported as a [`SourceError`].
#[cfg(feature = "std")]
pub struct ReaderSource<R> {
    reader: R,
    /// Undecoded bytes carried over from the previous read (an incomplete
    /// UTF-8 sequence at the end of a chunk).
    carry: Vec<u8>,
    done: bool,
}

#[cfg(feature = "std")]
impl<R: std::io::Read> ReaderSource<R> {
    /// Create a source over the given reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            carry: Vec::new(),
            done: false,
        }
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read> TextSource for ReaderSource<R> {
    fn read_chars(&mut self, out: &mut String, max: usize) -> Result<usize, SourceError> {
        use alloc::string::ToString;

        let mut count = 0;
        while count < max {
            if !self.carry.is_empty() {
                // Decode the valid prefix of the carried bytes.
                let (valid, incomplete) = match core::str::from_utf8(&self.carry) {
                    Ok(s) => (s.len(), false),
                    Err(e) => (e.valid_up_to(), e.error_len().is_none()),
                };
                if valid > 0 {
                    let decoded = match core::str::from_utf8(&self.carry[..valid]) {
                        Ok(s) => s,
                        Err(_) => return Err(SourceError::new("invalid UTF-8 in input")),
                    };
                    let mut used = 0;
                    for c in decoded.chars() {
                        if count >= max {
                            break;
                        }
                        out.push(c);
                        used += c.len_utf8();
                        count += 1;
                    }
                    self.carry.drain(..used);
                    continue;
                }
                if !incomplete || self.done {
                    return Err(SourceError::new("invalid UTF-8 in input"));
                }
            }
            if self.done {
                break;
            }
            let mut chunk = [0u8; 4096];
            let n = self
                .reader
                .read(&mut chunk)
                .map_err(|e| SourceError::new(e.to_string()))?;
            if n == 0 {
                self.done = true;
            } else {
                self.carry.extend_from_slice(&chunk[..n]);
            }
        }
        Ok(count)
    }
}

/// Streaming character buffer over a [`TextSource`].
pub struct CharBuffer {
    /// The buffered window.
    chars: Vec<char>,
    /// Absolute stream position of `chars[0]`.
    start: usize,
    /// Absolute stream position of the next character to consume.
    pos: usize,
    /// 1-based line of the next character to consume.
    line: u32,
    /// 1-based column of the next character to consume.
    column: u32,
    /// The source; `None` once exhausted, failed or closed.
    source: Option<Box<dyn TextSource>>,
}

impl CharBuffer {
    /// Create a buffer over the given source.
    #[must_use]
    pub fn new(source: Box<dyn TextSource>) -> Self {
        Self {
            chars: Vec::new(),
            start: 0,
            pos: 0,
            line: 1,
            column: 1,
            source: Some(source),
        }
    }

    /// Create a buffer over in-memory text.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(Box::new(StringSource::new(text)))
    }

    /// Replace the source, discarding all buffered state.
    ///
    /// The buffered window is released and line/column tracking restarts
    /// at 1/1.
    pub fn reset(&mut self, source: Box<dyn TextSource>) {
        self.chars = Vec::new();
        self.start = 0;
        self.pos = 0;
        self.line = 1;
        self.column = 1;
        self.source = Some(source);
    }

    /// Absolute stream position of the next character to consume.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total number of characters buffered so far (absolute).
    #[must_use]
    pub fn length(&self) -> usize {
        self.start + self.chars.len()
    }

    /// 1-based line of the next character to consume.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 1-based column of the next character to consume.
    #[must_use]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Ensure at least `target` absolute characters are buffered, or the
    /// source is exhausted. IO failures discard the source.
    fn ensure(&mut self, target: usize) -> Result<(), SourceError> {
        while self.length() < target {
            let Some(source) = self.source.as_mut() else {
                return Ok(());
            };
            let mut chunk = String::new();
            match source.read_chars(&mut chunk, BLOCK_SIZE) {
                Ok(0) => {
                    self.source = None;
                }
                Ok(_) => {
                    self.chars.extend(chunk.chars());
                }
                Err(e) => {
                    self.source = None;
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Look at the character `offset` positions past the next one to
    /// consume. Returns `None` at end of input.
    pub fn peek(&mut self, offset: usize) -> Result<Option<char>, SourceError> {
        self.ensure(self.pos + offset + 1)?;
        Ok(self.chars.get(self.pos - self.start + offset).copied())
    }

    /// Consume up to `max` characters, returning them as a string. Returns
    /// fewer at end of input and `None` if nothing remains.
    ///
    /// Line and column counters advance over the consumed characters; each
    /// `\n` starts a new line.
    pub fn read(&mut self, max: usize) -> Result<Option<String>, SourceError> {
        self.ensure(self.pos + max)?;
        let avail = self.length() - self.pos;
        let count = avail.min(max);
        if count == 0 {
            return Ok(None);
        }
        let from = self.pos - self.start;
        let out: String = self.chars[from..from + count].iter().collect();
        for c in &self.chars[from..from + count] {
            if *c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += count;
        self.trim();
        Ok(Some(out))
    }

    /// Copy `len` characters starting at absolute position `index`.
    ///
    /// Returns `None` if the range has been trimmed away or is not yet
    /// buffered.
    #[must_use]
    pub fn substring(&self, index: usize, len: usize) -> Option<String> {
        if index < self.start || index + len > self.length() {
            return None;
        }
        let from = index - self.start;
        Some(self.chars[from..from + len].iter().collect())
    }

    /// Check whether the buffer is at end of input.
    pub fn at_end(&mut self) -> Result<bool, SourceError> {
        Ok(self.peek(0)?.is_none())
    }

    /// Drop the consumed prefix once it exceeds one block, keeping a short
    /// history window for look-back.
    fn trim(&mut self) {
        if self.pos - self.start > BLOCK_SIZE {
            let keep_from = self.pos - HISTORY;
            self.chars.drain(..keep_from - self.start);
            self.start = keep_from;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_then_read() {
        let mut buf = CharBuffer::from_text("abc");
        assert_eq!(buf.peek(0).unwrap(), Some('a'));
        assert_eq!(buf.peek(2).unwrap(), Some('c'));
        assert_eq!(buf.peek(3).unwrap(), None);
        assert_eq!(buf.read(2).unwrap(), Some("ab".into()));
        assert_eq!(buf.peek(0).unwrap(), Some('c'));
        assert_eq!(buf.read(5).unwrap(), Some("c".into()));
        assert_eq!(buf.read(1).unwrap(), None);
    }

    #[test]
    fn test_line_column_tracking() {
        let mut buf = CharBuffer::from_text("ab\ncd");
        assert_eq!((buf.line(), buf.column()), (1, 1));
        buf.read(1).unwrap();
        assert_eq!((buf.line(), buf.column()), (1, 2));
        buf.read(2).unwrap();
        assert_eq!((buf.line(), buf.column()), (2, 1));
        buf.read(2).unwrap();
        assert_eq!((buf.line(), buf.column()), (2, 3));
    }

    #[test]
    fn test_carriage_return_is_ordinary() {
        let mut buf = CharBuffer::from_text("a\rb");
        buf.read(3).unwrap();
        assert_eq!((buf.line(), buf.column()), (1, 4));
    }

    #[test]
    fn test_read_matches_peek() {
        let mut buf = CharBuffer::from_text("hello world");
        let peeked: Vec<char> = (0..5).map(|i| buf.peek(i).unwrap().unwrap()).collect();
        let read = buf.read(5).unwrap().unwrap();
        assert_eq!(read.chars().collect::<Vec<_>>(), peeked);
    }

    #[test]
    fn test_trim_keeps_history() {
        let text: String = core::iter::repeat('x').take(3000).collect();
        let mut buf = CharBuffer::from_text(text);
        buf.read(2000).unwrap();
        // Recent history is still available for look-back.
        assert_eq!(buf.substring(1990, 10), Some("xxxxxxxxxx".into()));
        // The distant prefix has been trimmed away.
        assert_eq!(buf.substring(0, 10), None);
        assert_eq!(buf.position(), 2000);
    }

    #[test]
    fn test_substring_of_lookahead() {
        let mut buf = CharBuffer::from_text("abcdef");
        buf.peek(5).unwrap();
        assert_eq!(buf.substring(2, 3), Some("cde".into()));
    }

    #[test]
    fn test_reset_releases_state() {
        let mut buf = CharBuffer::from_text("abc\ndef");
        buf.read(5).unwrap();
        buf.reset(Box::new(StringSource::new("xy")));
        assert_eq!((buf.line(), buf.column()), (1, 1));
        assert_eq!(buf.position(), 0);
        assert_eq!(buf.read(2).unwrap(), Some("xy".into()));
    }

    struct FailingSource;

    impl TextSource for FailingSource {
        fn read_chars(&mut self, _out: &mut String, _max: usize) -> Result<usize, SourceError> {
            Err(SourceError::new("boom"))
        }
    }

    #[test]
    fn test_source_error_discards_reader() {
        let mut buf = CharBuffer::new(Box::new(FailingSource));
        assert!(buf.peek(0).is_err());
        // The reader is gone; the buffer now reports end of input.
        assert_eq!(buf.peek(0).unwrap(), None);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_reader_source() {
        let data = "line one\nline two";
        let mut buf = CharBuffer::new(Box::new(ReaderSource::new(data.as_bytes())));
        assert_eq!(buf.read(100).unwrap(), Some(data.into()));
    }
}
