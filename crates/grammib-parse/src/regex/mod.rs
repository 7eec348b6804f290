//! Backtracking regular expression engine.
//!
//! A [`Regex`] is an immutable compiled pattern and may be shared freely.
//! Matching state lives in a [`Matcher`], which is bound to one position of
//! a [`CharBuffer`] at a time and must not be shared.
//!
//! Supported syntax: literal characters, `.`, `[set]` with optional leading
//! `^` and `a-b` ranges, grouping `(…)`, alternation `|`, repetition
//! `? * + {n} {n,} {n,m}` with an optional `?` (reluctant) or `+`
//! (possessive) suffix, and the escapes `\0ooo \xHH \uHHHH \t \n \r \f \a
//! \e \d \D \s \S \w \W`. The `^` and `$` anchors, back-references and
//! look-around are rejected at compile time.

mod compiler;
mod element;

pub use element::RepeatMode;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::buffer::CharBuffer;
use crate::error::SourceError;
use element::{Element, MatchContext};

/// The kind of a pattern compile error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegexErrorKind {
    /// A character that cannot appear here.
    UnexpectedCharacter {
        /// The offending character.
        ch: char,
    },
    /// The pattern ended inside a group, set, repeat count or escape.
    UnterminatedPattern,
    /// A `{n,m}` count was empty or had `m < n`.
    InvalidRepeatCount,
    /// An escape sequence that is not supported.
    UnsupportedEscape {
        /// The escape introducer.
        ch: char,
    },
    /// A special character that is deliberately not supported (`^`, `$`).
    UnsupportedSpecial {
        /// The offending character.
        ch: char,
    },
}

/// A pattern compile error with the offset it occurred at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegexError {
    /// What went wrong.
    pub kind: RegexErrorKind,
    /// Character offset into the pattern.
    pub position: usize,
}

impl fmt::Display for RegexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RegexErrorKind::UnexpectedCharacter { ch } => {
                write!(f, "unexpected character {ch:?} at offset {}", self.position)
            }
            RegexErrorKind::UnterminatedPattern => {
                write!(f, "unterminated pattern at offset {}", self.position)
            }
            RegexErrorKind::InvalidRepeatCount => {
                write!(f, "invalid repeat count at offset {}", self.position)
            }
            RegexErrorKind::UnsupportedEscape { ch } => {
                write!(f, "unsupported escape \\{ch} at offset {}", self.position)
            }
            RegexErrorKind::UnsupportedSpecial { ch } => {
                write!(f, "unsupported special character {ch:?} at offset {}", self.position)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RegexError {}

/// An immutable compiled regular expression.
#[derive(Clone, Debug)]
pub struct Regex {
    pattern: String,
    ignore_case: bool,
    element: Element,
}

impl Regex {
    /// Compile a case-sensitive pattern.
    pub fn new(pattern: &str) -> Result<Self, RegexError> {
        Self::compile(pattern, false)
    }

    /// Compile a pattern, optionally case-insensitive.
    ///
    /// Case-insensitive compilation lower-cases literal characters and
    /// range endpoints (ASCII, locale-independent); the matcher lower-cases
    /// input the same way.
    pub fn compile(pattern: &str, ignore_case: bool) -> Result<Self, RegexError> {
        let element = compiler::compile(pattern, ignore_case)?;
        Ok(Self {
            pattern: pattern.into(),
            ignore_case,
            element,
        })
    }

    /// The source pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the pattern was compiled case-insensitively.
    #[must_use]
    pub fn is_ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Create a fresh matcher for this pattern.
    #[must_use]
    pub fn matcher(&self) -> Matcher {
        Matcher {
            element: self.element.clone(),
            ignore_case: self.ignore_case,
            length: None,
            end_of_buffer: false,
            alternates: Vec::new(),
            raw_skip: 0,
            exhausted: false,
        }
    }
}

/// Stateful matcher produced by [`Regex::matcher`].
///
/// A matcher carries per-node backtracking state and must not be shared
/// between threads or interleaved across buffers.
#[derive(Debug)]
pub struct Matcher {
    element: Element,
    ignore_case: bool,
    length: Option<usize>,
    end_of_buffer: bool,
    /// Distinct match lengths already produced, in production order.
    alternates: Vec<usize>,
    raw_skip: usize,
    exhausted: bool,
}

impl Matcher {
    /// Clear all match state.
    pub fn reset(&mut self) {
        self.length = None;
        self.end_of_buffer = false;
        self.alternates.clear();
        self.raw_skip = 0;
        self.exhausted = false;
    }

    /// Match at the given peek offset of the buffer, returning the first
    /// (preferred) match length.
    pub fn match_at(
        &mut self,
        buf: &mut CharBuffer,
        start: usize,
    ) -> Result<Option<usize>, SourceError> {
        self.reset();
        let mut ctx = MatchContext {
            buf,
            ignore_case: self.ignore_case,
            end_of_buffer: false,
        };
        let result = self.element.match_at(&mut ctx, start, 0)?;
        self.end_of_buffer = ctx.end_of_buffer;
        self.raw_skip = 1;
        if let Some(len) = result {
            self.alternates.push(len);
        } else {
            self.exhausted = true;
        }
        self.length = result;
        Ok(result)
    }

    /// Return the `skip`-th distinct alternative match length at the same
    /// position, continuing the backtracking walk started by
    /// [`match_at`](Self::match_at). `skip == 0` repeats the first result.
    pub fn match_alternate(
        &mut self,
        buf: &mut CharBuffer,
        start: usize,
        skip: usize,
    ) -> Result<Option<usize>, SourceError> {
        while self.alternates.len() <= skip && !self.exhausted {
            let mut ctx = MatchContext {
                buf,
                ignore_case: self.ignore_case,
                end_of_buffer: self.end_of_buffer,
            };
            let result = self.element.match_at(&mut ctx, start, self.raw_skip)?;
            self.end_of_buffer = ctx.end_of_buffer;
            self.raw_skip += 1;
            match result {
                Some(len) => {
                    if !self.alternates.contains(&len) {
                        self.alternates.push(len);
                    }
                }
                None => self.exhausted = true,
            }
        }
        let result = self.alternates.get(skip).copied();
        self.length = result;
        Ok(result)
    }

    /// Length of the most recent match, if any.
    #[must_use]
    pub fn length(&self) -> Option<usize> {
        self.length
    }

    /// Whether the last match attempt read past the end of the buffered
    /// input (lets callers tell "no match" from "need more input").
    #[must_use]
    pub fn has_read_past_end(&self) -> bool {
        self.end_of_buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_match(pattern: &str, text: &str) -> Option<usize> {
        let re = Regex::new(pattern).unwrap();
        let mut m = re.matcher();
        let mut buf = CharBuffer::from_text(text);
        m.match_at(&mut buf, 0).unwrap()
    }

    #[test]
    fn test_literal() {
        assert_eq!(first_match("abc", "abcdef"), Some(3));
        assert_eq!(first_match("abc", "abx"), None);
    }

    #[test]
    fn test_dot_excludes_newline() {
        assert_eq!(first_match(".", "x"), Some(1));
        assert_eq!(first_match(".", "\n"), None);
    }

    #[test]
    fn test_backtracking_alternation() {
        assert_eq!(first_match("a(bc|b)c", "abcc"), Some(4));
        assert_eq!(first_match("a(bc|b)c", "abc"), Some(3));
        assert_eq!(first_match("a(bc|b)c", "ab"), None);
    }

    #[test]
    fn test_greedy_alternates_strictly_decrease() {
        let re = Regex::new("a*").unwrap();
        let mut m = re.matcher();
        let mut buf = CharBuffer::from_text("aaa");
        assert_eq!(m.match_at(&mut buf, 0).unwrap(), Some(3));
        assert_eq!(m.match_alternate(&mut buf, 0, 1).unwrap(), Some(2));
        assert_eq!(m.match_alternate(&mut buf, 0, 2).unwrap(), Some(1));
        assert_eq!(m.match_alternate(&mut buf, 0, 3).unwrap(), Some(0));
        assert_eq!(m.match_alternate(&mut buf, 0, 4).unwrap(), None);
    }

    #[test]
    fn test_reluctant_prefers_shortest() {
        let re = Regex::new("a*?").unwrap();
        let mut m = re.matcher();
        let mut buf = CharBuffer::from_text("aaa");
        assert_eq!(m.match_at(&mut buf, 0).unwrap(), Some(0));
        assert_eq!(m.match_alternate(&mut buf, 0, 1).unwrap(), Some(1));
    }

    #[test]
    fn test_possessive_blocks_backtracking() {
        // The possessive star eats every 'a', leaving none for the tail.
        assert_eq!(first_match("a*+a", "aaa"), None);
        assert_eq!(first_match("a*a", "aaa"), Some(3));
    }

    #[test]
    fn test_repeat_counts() {
        assert_eq!(first_match("a{2}", "aaa"), Some(2));
        assert_eq!(first_match("a{2,}", "aaa"), Some(3));
        assert_eq!(first_match("a{1,2}", "aaa"), Some(2));
        assert_eq!(first_match("a{3}", "aa"), None);
    }

    #[test]
    fn test_char_set() {
        assert_eq!(first_match("[a-c]+", "abcd"), Some(3));
        assert_eq!(first_match("[^0-9]", "x"), Some(1));
        assert_eq!(first_match("[^0-9]", "5"), None);
        // Trailing '-' is a literal.
        assert_eq!(first_match("[a-]", "-"), Some(1));
    }

    #[test]
    fn test_classes() {
        assert_eq!(first_match("\\d+", "123a"), Some(3));
        assert_eq!(first_match("\\w+", "ab_9-"), Some(4));
        assert_eq!(first_match("\\s", "\t"), Some(1));
        assert_eq!(first_match("[\\d-]+", "1-2"), Some(3));
    }

    #[test]
    fn test_escapes() {
        assert_eq!(first_match("\\x41", "A"), Some(1));
        assert_eq!(first_match("\\u0041", "A"), Some(1));
        assert_eq!(first_match("\\0101", "A"), Some(1));
        assert_eq!(first_match("\\t", "\t"), Some(1));
        assert_eq!(first_match("\\.", "."), Some(1));
    }

    #[test]
    fn test_case_insensitive() {
        let re = Regex::compile("a[b-d]+", true).unwrap();
        let mut m = re.matcher();
        let mut buf = CharBuffer::from_text("ABCD");
        assert_eq!(m.match_at(&mut buf, 0).unwrap(), Some(4));
    }

    #[test]
    fn test_anchors_rejected() {
        assert!(matches!(
            Regex::new("^a").unwrap_err().kind,
            RegexErrorKind::UnsupportedSpecial { ch: '^' }
        ));
        assert!(matches!(
            Regex::new("a$").unwrap_err().kind,
            RegexErrorKind::UnsupportedSpecial { ch: '$' }
        ));
    }

    #[test]
    fn test_compile_errors() {
        assert!(matches!(
            Regex::new("(ab").unwrap_err().kind,
            RegexErrorKind::UnterminatedPattern
        ));
        assert!(matches!(
            Regex::new("[ab").unwrap_err().kind,
            RegexErrorKind::UnterminatedPattern
        ));
        assert!(matches!(
            Regex::new("a{3,1}").unwrap_err().kind,
            RegexErrorKind::InvalidRepeatCount
        ));
        assert!(matches!(
            Regex::new("a{}").unwrap_err().kind,
            RegexErrorKind::InvalidRepeatCount
        ));
        assert!(matches!(
            Regex::new("\\q").unwrap_err().kind,
            RegexErrorKind::UnsupportedEscape { ch: 'q' }
        ));
        assert!(matches!(
            Regex::new("*a").unwrap_err().kind,
            RegexErrorKind::UnexpectedCharacter { ch: '*' }
        ));
    }

    #[test]
    fn test_read_past_end_flag() {
        let re = Regex::new("abc").unwrap();
        let mut m = re.matcher();
        let mut buf = CharBuffer::from_text("ab");
        assert_eq!(m.match_at(&mut buf, 0).unwrap(), None);
        assert!(m.has_read_past_end());

        let mut m2 = re.matcher();
        let mut buf2 = CharBuffer::from_text("ax");
        assert_eq!(m2.match_at(&mut buf2, 0).unwrap(), None);
        assert!(!m2.has_read_past_end());
    }

    #[test]
    fn test_match_at_offset() {
        let re = Regex::new("b+").unwrap();
        let mut m = re.matcher();
        let mut buf = CharBuffer::from_text("abbc");
        assert_eq!(m.match_at(&mut buf, 1).unwrap(), Some(2));
    }

    #[test]
    fn test_comment_shaped_pattern() {
        // The SMI comment pattern: body up to a closing dash pair, trailing
        // dash runs absorbed.
        let pattern = "--([^\\r\\n-]|-[^\\r\\n-])*-*";
        assert_eq!(first_match(pattern, "-- text --code"), Some(10));
        assert_eq!(first_match(pattern, "---------"), Some(9));
        assert_eq!(first_match(pattern, "-- a - b\nrest"), Some(8));
    }
}
