//! Regular expression match elements.
//!
//! A compiled pattern is a tree of elements. Matching follows the
//! skip-based backtracking contract: `match_at(ctx, start, skip)` returns
//! the length of the `skip`-th alternative match starting at the given
//! peek offset, or `None` once the alternatives are exhausted. `skip == 0`
//! resets any per-element backtracking state.

use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::buffer::CharBuffer;
use crate::error::SourceError;

/// Unbounded repetition count.
pub const UNBOUNDED: u32 = u32::MAX;

/// Shared matching state: the buffer plus flags recorded during a match.
pub(crate) struct MatchContext<'a> {
    pub buf: &'a mut CharBuffer,
    pub ignore_case: bool,
    /// Set when a peek ran past the end of the buffered input.
    pub end_of_buffer: bool,
}

impl MatchContext<'_> {
    /// Peek the character at the given offset, lower-casing it for
    /// case-insensitive matching and recording end-of-buffer reads.
    fn peek(&mut self, offset: usize) -> Result<Option<char>, SourceError> {
        match self.buf.peek(offset)? {
            Some(c) => Ok(Some(if self.ignore_case {
                c.to_ascii_lowercase()
            } else {
                c
            })),
            None => {
                self.end_of_buffer = true;
                Ok(None)
            }
        }
    }
}

/// A predefined character class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CharClass {
    /// Any character except line terminators.
    Dot,
    /// ASCII digits.
    Digit,
    /// Everything but ASCII digits.
    NonDigit,
    /// Space, tab, form feed, vertical tab and line terminators.
    Whitespace,
    /// Everything but whitespace.
    NonWhitespace,
    /// `[A-Za-z0-9_]`.
    Word,
    /// Everything but word characters.
    NonWord,
}

impl CharClass {
    fn contains(self, c: char) -> bool {
        match self {
            Self::Dot => c != '\n' && c != '\r',
            Self::Digit => c.is_ascii_digit(),
            Self::NonDigit => !c.is_ascii_digit(),
            Self::Whitespace => matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r'),
            Self::NonWhitespace => !Self::Whitespace.contains(c),
            Self::Word => c.is_ascii_alphanumeric() || c == '_',
            Self::NonWord => !Self::Word.contains(c),
        }
    }
}

/// One member of a character set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SetItem {
    /// A single character.
    Char(char),
    /// An inclusive range of characters.
    Range(char, char),
    /// A predefined class used inside the set.
    Class(CharClass),
}

/// A character set element, possibly inverted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SetElement {
    pub inverted: bool,
    pub items: Vec<SetItem>,
}

impl SetElement {
    /// The `.` wildcard.
    pub fn dot() -> Self {
        Self::class(CharClass::Dot)
    }

    /// A set holding a single predefined class.
    pub fn class(class: CharClass) -> Self {
        Self {
            inverted: false,
            items: alloc::vec![SetItem::Class(class)],
        }
    }

    fn contains(&self, c: char) -> bool {
        let hit = self.items.iter().any(|item| match item {
            SetItem::Char(m) => *m == c,
            SetItem::Range(lo, hi) => *lo <= c && c <= *hi,
            SetItem::Class(class) => class.contains(c),
        });
        hit != self.inverted
    }
}

/// Repetition greediness.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepeatMode {
    /// Longest first, backtracking to shorter counts.
    Greedy,
    /// Shortest first, backtracking to longer counts.
    Reluctant,
    /// Longest only; the parent gets no alternates.
    Possessive,
}

/// A repetition of a sub-element.
#[derive(Clone, Debug)]
pub(crate) struct RepeatElement {
    pub elem: Element,
    pub min: u32,
    pub max: u32,
    pub mode: RepeatMode,
    /// Backtracking cache: match lengths at `cached_start`, in preference
    /// order. Recomputed whenever the parent restarts with `skip == 0`.
    cached_start: usize,
    cached: Vec<usize>,
    valid: bool,
}

impl RepeatElement {
    pub fn new(elem: Element, min: u32, max: u32, mode: RepeatMode) -> Self {
        Self {
            elem,
            min,
            max,
            mode,
            cached_start: 0,
            cached: Vec::new(),
            valid: false,
        }
    }

    fn match_at(
        &mut self,
        ctx: &mut MatchContext<'_>,
        start: usize,
        skip: usize,
    ) -> Result<Option<usize>, SourceError> {
        if skip == 0 || !self.valid || self.cached_start != start {
            self.compute(ctx, start)?;
        }
        if skip > 0 && self.mode == RepeatMode::Possessive {
            return Ok(None);
        }
        Ok(self.cached.get(skip).copied())
    }

    /// Fill the cache with every achievable match length at `start`.
    fn compute(&mut self, ctx: &mut MatchContext<'_>, start: usize) -> Result<(), SourceError> {
        self.cached_start = start;
        self.cached.clear();
        self.valid = true;

        if self.mode == RepeatMode::Possessive {
            // Consume as much as possible, first match only, no alternates.
            let mut pos = start;
            let mut count = 0u32;
            while count < self.max {
                match self.elem.match_at(ctx, pos, 0)? {
                    Some(len) => {
                        pos += len;
                        count += 1;
                        if len == 0 {
                            break;
                        }
                    }
                    None => break,
                }
            }
            if count >= self.min {
                self.cached.push(pos - start);
            }
            return Ok(());
        }

        // Expand the set of end offsets reachable with each repetition
        // count. Sequences saturate once no new offsets appear.
        let mut results: BTreeSet<usize> = BTreeSet::new();
        if self.min == 0 {
            results.insert(0);
        }
        let mut current: BTreeSet<usize> = BTreeSet::new();
        current.insert(start);
        let mut count = 0u32;
        while count < self.max {
            count += 1;
            let mut next: BTreeSet<usize> = BTreeSet::new();
            for &p in &current {
                let mut cskip = 0;
                let mut seen: BTreeSet<usize> = BTreeSet::new();
                while let Some(len) = self.elem.match_at(ctx, p, cskip)? {
                    if seen.insert(len) {
                        next.insert(p + len);
                    }
                    cskip += 1;
                }
            }
            if next.is_empty() {
                break;
            }
            let grew = next != current;
            if count >= self.min {
                for &p in &next {
                    results.insert(p - start);
                }
            }
            if !grew && count >= self.min {
                // Fixpoint: further repetitions add nothing new.
                break;
            }
            current = next;
        }

        match self.mode {
            RepeatMode::Greedy | RepeatMode::Possessive => {
                self.cached.extend(results.iter().rev().copied());
            }
            RepeatMode::Reluctant => {
                self.cached.extend(results.iter().copied());
            }
        }
        Ok(())
    }
}

/// An ordered choice between two elements, longest match first.
#[derive(Clone, Debug)]
pub(crate) struct AltElement {
    pub left: Element,
    pub right: Element,
}

impl AltElement {
    fn match_at(
        &mut self,
        ctx: &mut MatchContext<'_>,
        start: usize,
        skip: usize,
    ) -> Result<Option<usize>, SourceError> {
        let mut skip_left = 0;
        let mut skip_right = 0;
        let mut remaining = skip;
        loop {
            let l = self.left.match_at(ctx, start, skip_left)?;
            let r = self.right.match_at(ctx, start, skip_right)?;
            // Take the longer side; the left side wins ties.
            let take_left = match (l, r) {
                (None, _) => false,
                (_, None) => true,
                (Some(a), Some(b)) => a >= b,
            };
            let length = if take_left {
                skip_left += 1;
                l
            } else {
                skip_right += 1;
                r
            };
            let Some(length) = length else {
                return Ok(None);
            };
            if remaining == 0 {
                return Ok(Some(length));
            }
            remaining -= 1;
        }
    }
}

/// Concatenation of two elements.
#[derive(Clone, Debug)]
pub(crate) struct CombineElement {
    pub left: Element,
    pub right: Element,
}

impl CombineElement {
    fn match_at(
        &mut self,
        ctx: &mut MatchContext<'_>,
        start: usize,
        skip: usize,
    ) -> Result<Option<usize>, SourceError> {
        let mut skip_left = 0;
        let mut skip_right = 0;
        let mut remaining = skip;
        loop {
            let Some(left_len) = self.left.match_at(ctx, start, skip_left)? else {
                return Ok(None);
            };
            match self.right.match_at(ctx, start + left_len, skip_right)? {
                None => {
                    skip_left += 1;
                    skip_right = 0;
                }
                Some(right_len) => {
                    if remaining == 0 {
                        return Ok(Some(left_len + right_len));
                    }
                    remaining -= 1;
                    skip_right += 1;
                }
            }
        }
    }
}

/// A node in the compiled pattern tree.
#[derive(Clone, Debug)]
pub(crate) enum Element {
    /// A literal character sequence.
    Str(Vec<char>),
    /// A character set.
    Set(SetElement),
    /// A repetition.
    Repeat(Box<RepeatElement>),
    /// An alternation.
    Alternative(Box<AltElement>),
    /// A concatenation.
    Combine(Box<CombineElement>),
}

impl Element {
    pub(crate) fn match_at(
        &mut self,
        ctx: &mut MatchContext<'_>,
        start: usize,
        skip: usize,
    ) -> Result<Option<usize>, SourceError> {
        match self {
            Self::Str(chars) => {
                if skip != 0 {
                    return Ok(None);
                }
                for (i, want) in chars.iter().enumerate() {
                    match ctx.peek(start + i)? {
                        Some(c) if c == *want => {}
                        _ => return Ok(None),
                    }
                }
                Ok(Some(chars.len()))
            }
            Self::Set(set) => {
                if skip != 0 {
                    return Ok(None);
                }
                match ctx.peek(start)? {
                    Some(c) if set.contains(c) => Ok(Some(1)),
                    _ => Ok(None),
                }
            }
            Self::Repeat(rep) => rep.match_at(ctx, start, skip),
            Self::Alternative(alt) => alt.match_at(ctx, start, skip),
            Self::Combine(com) => com.match_at(ctx, start, skip),
        }
    }
}
