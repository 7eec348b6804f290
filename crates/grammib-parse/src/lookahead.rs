//! Look-ahead sets and grammar analysis.
//!
//! A [`LookAheadSet`] is a set of short token-id [`Sequence`]s. During
//! preparation the analysis computes, for every production, a set per
//! alternative with the smallest k that makes the alternatives
//! conflict-free, and a continuation set for every repeatable element.
//! Sequences truncated by an unbounded repetition carry the `repetitive`
//! flag; overlaps where both sides are repetitive are not conflicts, since
//! the parser resolves them greedily without risk of misprediction.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::error::GrammarError;
use crate::grammar::{ElementKind, ProductionElement, ProductionPattern, UNBOUNDED};
use crate::tokenizer::{TokenId, Tokenizer};

/// Maximum look-ahead length tried before a grammar is declared ambiguous.
const MAX_LOOKAHEAD: usize = 8;

/// A sequence of token ids, possibly flagged as repetitive (it may recur
/// without bound past its truncated end).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Sequence {
    tokens: Vec<TokenId>,
    repetitive: bool,
}

impl Sequence {
    /// The empty sequence.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tokens: Vec::new(),
            repetitive: false,
        }
    }

    /// A one-token sequence, honouring the caller's `repetitive` flag.
    #[must_use]
    pub fn single(token: TokenId, repetitive: bool) -> Self {
        Self {
            tokens: alloc::vec![token],
            repetitive,
        }
    }

    /// The token ids.
    #[must_use]
    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether this is the empty sequence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whether the sequence may recur without bound.
    #[must_use]
    pub fn is_repetitive(&self) -> bool {
        self.repetitive
    }

    /// Whether `self` is a prefix of `other`.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.tokens.starts_with(&self.tokens)
    }

    /// Concatenate, truncating to `max_length`. A sequence already at
    /// `max_length` passes through unchanged.
    #[must_use]
    fn concat(&self, other: &Self, max_length: usize) -> Self {
        if self.tokens.len() >= max_length {
            return self.clone();
        }
        let mut tokens = self.tokens.clone();
        for &t in &other.tokens {
            if tokens.len() >= max_length {
                break;
            }
            tokens.push(t);
        }
        Self {
            tokens,
            repetitive: other.repetitive,
        }
    }
}

/// A set of look-ahead sequences with a maximum sequence length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LookAheadSet {
    max_length: usize,
    sequences: Vec<Sequence>,
}

impl LookAheadSet {
    /// Create an empty set with the given maximum sequence length.
    #[must_use]
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            sequences: Vec::new(),
        }
    }

    /// Create a set containing only the empty sequence.
    #[must_use]
    pub fn with_empty(max_length: usize) -> Self {
        let mut set = Self::new(max_length);
        set.add(Sequence::empty());
        set
    }

    /// The maximum sequence length.
    #[must_use]
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// The sequences, unordered.
    #[must_use]
    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    /// Whether the set has no sequences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Whether the set contains the empty sequence.
    #[must_use]
    pub fn has_empty_sequence(&self) -> bool {
        self.sequences.iter().any(Sequence::is_empty)
    }

    /// Add a sequence, truncating to the maximum length and dropping
    /// duplicates. A repetitive duplicate upgrades the stored flag.
    pub fn add(&mut self, mut seq: Sequence) {
        if seq.tokens.len() > self.max_length {
            seq.tokens.truncate(self.max_length);
        }
        for existing in &mut self.sequences {
            if existing.tokens == seq.tokens {
                existing.repetitive = existing.repetitive || seq.repetitive;
                return;
            }
        }
        self.sequences.push(seq);
    }

    /// Add the empty sequence.
    pub fn add_empty(&mut self) {
        self.add(Sequence::empty());
    }

    /// Add all sequences of another set.
    pub fn add_all(&mut self, other: &Self) {
        for seq in &other.sequences {
            self.add(seq.clone());
        }
    }

    /// Sequences starting with `token`, shifted one position left.
    #[must_use]
    pub fn create_next_set(&self, token: TokenId) -> Self {
        let mut result = Self::new(self.max_length.saturating_sub(1));
        for seq in &self.sequences {
            if seq.tokens.first() == Some(&token) {
                result.add(Sequence {
                    tokens: seq.tokens[1..].to_vec(),
                    repetitive: seq.repetitive,
                });
            }
        }
        result
    }

    /// Sequences present in both sets; the repetitive flag survives only
    /// when set on both sides.
    #[must_use]
    pub fn create_intersection(&self, other: &Self) -> Self {
        let mut result = Self::new(self.max_length);
        for seq in &self.sequences {
            if let Some(o) = other.sequences.iter().find(|o| o.tokens == seq.tokens) {
                result.add(Sequence {
                    tokens: seq.tokens.clone(),
                    repetitive: seq.repetitive && o.repetitive,
                });
            }
        }
        result
    }

    /// Cartesian concatenation, truncated to this set's maximum length.
    /// A sequence already at maximum length passes through unchanged; the
    /// empty sequence is replaced by the other set's sequences.
    #[must_use]
    pub fn create_combination(&self, other: &Self) -> Self {
        let mut result = Self::new(self.max_length);
        if other.sequences.is_empty() {
            result.add_all(self);
            return result;
        }
        for seq in &self.sequences {
            if seq.tokens.len() >= self.max_length {
                result.add(seq.clone());
            } else if seq.is_empty() {
                for o in &other.sequences {
                    result.add(o.clone());
                }
            } else {
                for o in &other.sequences {
                    result.add(seq.concat(o, self.max_length));
                }
            }
        }
        result
    }

    /// Left-trim: sequences of this set with a prefix from `other`
    /// removed.
    #[must_use]
    pub fn create_filter(&self, other: &Self) -> Self {
        let mut result = Self::new(self.max_length);
        for seq in &self.sequences {
            for o in &other.sequences {
                if o.is_prefix_of(seq) {
                    result.add(Sequence {
                        tokens: seq.tokens[o.tokens.len()..].to_vec(),
                        repetitive: seq.repetitive,
                    });
                }
            }
        }
        result
    }

    /// Sequences of this set that are a prefix of some sequence in
    /// `other`, or vice versa.
    #[must_use]
    pub fn create_overlaps(&self, other: &Self) -> Self {
        let mut result = Self::new(self.max_length);
        for seq in &self.sequences {
            for o in &other.sequences {
                if seq.is_prefix_of(o) || o.is_prefix_of(seq) {
                    result.add(seq.clone());
                    break;
                }
            }
        }
        result
    }

    /// A clone with every sequence flagged repetitive.
    #[must_use]
    pub fn create_repetitive(&self) -> Self {
        let mut result = Self::new(self.max_length);
        for seq in &self.sequences {
            result.add(Sequence {
                tokens: seq.tokens.clone(),
                repetitive: true,
            });
        }
        result
    }

    /// Flag sequences of exactly `len` tokens as repetitive (used when an
    /// unbounded repetition saturates the look-ahead length).
    fn mark_length_repetitive(&mut self, len: usize) {
        for seq in &mut self.sequences {
            if seq.tokens.len() == len {
                seq.repetitive = true;
            }
        }
    }

    /// Whether any overlap with `other` constitutes a conflict. Pairs where
    /// both sequences are repetitive are exempt; the empty sequence is
    /// exempt when `ignore_empty` is set (repetition decisions fall back to
    /// the outer context there).
    fn conflicts_with(&self, other: &Self, ignore_empty: bool) -> bool {
        for seq in &self.sequences {
            for o in &other.sequences {
                if ignore_empty && (seq.is_empty() || o.is_empty()) {
                    continue;
                }
                if (seq.is_prefix_of(o) || o.is_prefix_of(seq))
                    && !(seq.is_repetitive() && o.is_repetitive())
                {
                    return true;
                }
            }
        }
        false
    }

    /// Whether any sequence matches the upcoming tokens; `peek` reports
    /// the token id at a given offset.
    pub fn is_next(&self, peek: &mut dyn FnMut(usize) -> Option<TokenId>) -> bool {
        self.longest_match(peek).is_some()
    }

    /// Length of the longest sequence matching the upcoming tokens.
    pub fn longest_match(&self, peek: &mut dyn FnMut(usize) -> Option<TokenId>) -> Option<usize> {
        let mut best: Option<usize> = None;
        for seq in &self.sequences {
            let len = seq.len();
            if best.is_some_and(|b| b >= len) {
                continue;
            }
            let mut matched = true;
            for (i, &want) in seq.tokens.iter().enumerate() {
                if peek(i) != Some(want) {
                    matched = false;
                    break;
                }
            }
            if matched {
                best = Some(len);
            }
        }
        best
    }

    /// Distinct first tokens across all sequences, for error messages.
    #[must_use]
    pub fn first_tokens(&self) -> Vec<TokenId> {
        let mut out: Vec<TokenId> = Vec::new();
        for seq in &self.sequences {
            if let Some(&t) = seq.tokens.first() {
                if !out.contains(&t) {
                    out.push(t);
                }
            }
        }
        out
    }
}

/// Grammar-wide look-ahead analysis. Verifies references, then fills in
/// alternative and element look-ahead sets.
pub(crate) fn analyze(
    patterns: &mut [ProductionPattern],
    tokenizer: &Tokenizer,
) -> Result<(), GrammarError> {
    let index: BTreeMap<usize, usize> = patterns
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id, i))
        .collect();

    // Reference checks.
    for pattern in patterns.iter() {
        if pattern.alternatives().is_empty() {
            return Err(GrammarError::EmptyProduction {
                name: pattern.name.clone(),
            });
        }
        for alt in pattern.alternatives() {
            for elem in alt.elements() {
                match elem.kind {
                    ElementKind::Production => {
                        if !index.contains_key(&elem.id) {
                            return Err(GrammarError::ProductionNotFound {
                                referrer: pattern.name.clone(),
                                id: elem.id,
                            });
                        }
                    }
                    ElementKind::Token => {
                        if tokenizer.pattern(elem.id).is_none() {
                            return Err(GrammarError::TokenNotFound {
                                referrer: pattern.name.clone(),
                                id: elem.id,
                            });
                        }
                    }
                }
            }
        }
    }

    // Alternative look-aheads: grow k per production until conflict-free.
    for pidx in 0..patterns.len() {
        let mut chosen: Option<(usize, Vec<LookAheadSet>)> = None;
        for k in 1..=MAX_LOOKAHEAD {
            let mut sets = Vec::new();
            for alt in patterns[pidx].alternatives() {
                let mut stack = Vec::new();
                sets.push(first_of_elements(
                    patterns,
                    &index,
                    alt.elements(),
                    k,
                    &mut stack,
                )?);
            }
            // A single nullable alternative is a legal fallback (it is
            // chosen when nothing longer matches); two nullable
            // alternatives are inherently ambiguous.
            let mut conflict = false;
            for i in 0..sets.len() {
                for j in i + 1..sets.len() {
                    if sets[i].conflicts_with(&sets[j], true)
                        || (sets[i].has_empty_sequence() && sets[j].has_empty_sequence())
                    {
                        conflict = true;
                    }
                }
            }
            if !conflict {
                chosen = Some((k, sets));
                break;
            }
        }
        let Some((_, sets)) = chosen else {
            return Err(GrammarError::AmbiguousAlternatives {
                name: patterns[pidx].name.clone(),
            });
        };
        for (alt, set) in patterns[pidx].alternatives_mut().iter_mut().zip(sets) {
            alt.lookahead = Some(set);
        }
    }

    // Element look-aheads for repetition decisions.
    for pidx in 0..patterns.len() {
        let name = patterns[pidx].name.clone();
        for aidx in 0..patterns[pidx].alternatives().len() {
            let count = patterns[pidx].alternatives()[aidx].elements().len();
            for eidx in 0..count {
                let elem = patterns[pidx].alternatives()[aidx].elements()[eidx].clone();
                if elem.max <= elem.min {
                    continue;
                }
                let set = element_continuation(patterns, &index, &name, aidx, eidx, pidx, &elem)?;
                patterns[pidx].alternatives_mut()[aidx].elements_mut()[eidx].lookahead = Some(set);
            }
        }
    }
    Ok(())
}

/// Compute the continuation look-ahead for a repeatable element, growing k
/// until it no longer conflicts with what may follow it inside the
/// alternative.
fn element_continuation(
    patterns: &[ProductionPattern],
    index: &BTreeMap<usize, usize>,
    name: &str,
    aidx: usize,
    eidx: usize,
    pidx: usize,
    elem: &ProductionElement,
) -> Result<LookAheadSet, GrammarError> {
    let mut result = None;
    for k in 1..=MAX_LOOKAHEAD {
        let single = ProductionElement {
            min: 1,
            max: 1,
            ..elem.clone()
        };
        let mut stack = Vec::new();
        let cont = first_of_element(patterns, index, &single, k, &mut stack)?;
        let rest = patterns[pidx].alternatives()[aidx].elements()[eidx + 1..].to_vec();
        let mut stack = Vec::new();
        let follow = first_of_elements(patterns, index, &rest, k, &mut stack)?;
        if !cont.conflicts_with(&follow, true) {
            result = Some(cont);
            break;
        }
        if k == MAX_LOOKAHEAD {
            // Unbounded repetitions resolve greedily; bounded ones are a
            // genuine ambiguity.
            if elem.max == UNBOUNDED {
                result = Some(cont);
            } else {
                return Err(GrammarError::AmbiguousElement {
                    name: name.into(),
                    position: eidx,
                });
            }
        }
    }
    match result {
        Some(set) => Ok(set),
        None => Err(GrammarError::AmbiguousElement {
            name: name.into(),
            position: eidx,
        }),
    }
}

/// FIRST(k) of an element sequence.
///
/// Each element is expanded only as deep as the shortest sequence built so
/// far still needs. Recursing with the remaining length (instead of the
/// full k) is what keeps grammars that mention a production inside itself
/// behind a consumed token (`Type → … → Type`) from looking left
/// recursive.
fn first_of_elements(
    patterns: &[ProductionPattern],
    index: &BTreeMap<usize, usize>,
    elements: &[ProductionElement],
    k: usize,
    stack: &mut Vec<(usize, usize)>,
) -> Result<LookAheadSet, GrammarError> {
    let mut result = LookAheadSet::with_empty(k);
    for elem in elements {
        // Stop once every sequence is saturated.
        let shortest = result
            .sequences()
            .iter()
            .map(Sequence::len)
            .filter(|&l| l < k)
            .min();
        let Some(shortest) = shortest else { break };
        let need = k - shortest;
        let first = first_of_element(patterns, index, elem, need, stack)?;
        result = result.create_combination(&first);
    }
    Ok(result)
}

/// FIRST(k) of a single element, including its repetition range.
fn first_of_element(
    patterns: &[ProductionPattern],
    index: &BTreeMap<usize, usize>,
    elem: &ProductionElement,
    k: usize,
    stack: &mut Vec<(usize, usize)>,
) -> Result<LookAheadSet, GrammarError> {
    let base = match elem.kind {
        ElementKind::Token => {
            let mut set = LookAheadSet::new(k);
            set.add(Sequence::single(elem.id, false));
            set
        }
        ElementKind::Production => first_of_pattern(patterns, index, elem.id, k, stack)?,
    };

    let mut result = LookAheadSet::new(k);
    if elem.min == 0 {
        result.add_empty();
    }
    let mut current = LookAheadSet::with_empty(k);
    let mut count: u32 = 0;
    while count < elem.max {
        count += 1;
        let next = current.create_combination(&base);
        let grew = next != current;
        if count >= elem.min {
            result.add_all(&next);
        } else if !grew {
            // Fixpoint below the minimum: every later count yields this set.
            result.add_all(&next);
        }
        if !grew {
            break;
        }
        // Saturation: every sequence at full length.
        let saturated = next.sequences().iter().all(|s| s.len() >= k);
        current = next;
        if saturated && count >= elem.min {
            break;
        }
    }
    if elem.max == UNBOUNDED {
        result.mark_length_repetitive(k);
    }
    Ok(result)
}

/// FIRST(k) of a production: the union over its alternatives. Recursion
/// into a production already being expanded at the same remaining length
/// means no token was consumed in between: left recursion.
fn first_of_pattern(
    patterns: &[ProductionPattern],
    index: &BTreeMap<usize, usize>,
    id: usize,
    k: usize,
    stack: &mut Vec<(usize, usize)>,
) -> Result<LookAheadSet, GrammarError> {
    let Some(&pidx) = index.get(&id) else {
        // Checked before analysis; defensive.
        return Ok(LookAheadSet::new(k));
    };
    if stack.contains(&(id, k)) {
        return Err(GrammarError::InfiniteLoop {
            name: patterns[pidx].name.clone(),
        });
    }
    stack.push((id, k));
    let mut result = LookAheadSet::new(k);
    for alt in patterns[pidx].alternatives() {
        let set = first_of_elements(patterns, index, alt.elements(), k, stack)?;
        result.add_all(&set);
    }
    stack.pop();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(tokens: &[TokenId]) -> Sequence {
        Sequence {
            tokens: tokens.to_vec(),
            repetitive: false,
        }
    }

    #[test]
    fn test_add_dedupes_and_truncates() {
        let mut set = LookAheadSet::new(2);
        set.add(seq(&[1, 2, 3]));
        set.add(seq(&[1, 2]));
        assert_eq!(set.sequences().len(), 1);
        assert_eq!(set.sequences()[0].tokens(), &[1, 2]);
    }

    #[test]
    fn test_next_set() {
        let mut set = LookAheadSet::new(2);
        set.add(seq(&[1, 2]));
        set.add(seq(&[3, 4]));
        let next = set.create_next_set(1);
        assert_eq!(next.sequences().len(), 1);
        assert_eq!(next.sequences()[0].tokens(), &[2]);
    }

    #[test]
    fn test_intersection_ands_repetitive() {
        let mut a = LookAheadSet::new(2);
        a.add(Sequence {
            tokens: alloc::vec![1],
            repetitive: true,
        });
        let mut b = LookAheadSet::new(2);
        b.add(seq(&[1]));
        b.add(seq(&[2]));
        let i = a.create_intersection(&b);
        assert_eq!(i.sequences().len(), 1);
        assert!(!i.sequences()[0].is_repetitive());
    }

    #[test]
    fn test_combination() {
        let mut a = LookAheadSet::new(2);
        a.add(seq(&[1]));
        a.add(Sequence::empty());
        let mut b = LookAheadSet::new(2);
        b.add(seq(&[2, 3]));
        let c = a.create_combination(&b);
        // [1] + [2,3] truncated to [1,2]; empty replaced by [2,3].
        assert!(c.sequences().iter().any(|s| s.tokens() == [1, 2]));
        assert!(c.sequences().iter().any(|s| s.tokens() == [2, 3]));
        assert_eq!(c.sequences().len(), 2);
    }

    #[test]
    fn test_filter_trims_prefixes() {
        let mut a = LookAheadSet::new(3);
        a.add(seq(&[1, 2, 3]));
        let mut b = LookAheadSet::new(3);
        b.add(seq(&[1]));
        let f = a.create_filter(&b);
        assert_eq!(f.sequences().len(), 1);
        assert_eq!(f.sequences()[0].tokens(), &[2, 3]);
    }

    #[test]
    fn test_overlaps() {
        let mut a = LookAheadSet::new(2);
        a.add(seq(&[1]));
        a.add(seq(&[4]));
        let mut b = LookAheadSet::new(2);
        b.add(seq(&[1, 2]));
        let o = a.create_overlaps(&b);
        assert_eq!(o.sequences().len(), 1);
        assert_eq!(o.sequences()[0].tokens(), &[1]);
    }

    #[test]
    fn test_repetitive_clone() {
        let mut a = LookAheadSet::new(2);
        a.add(seq(&[1]));
        let r = a.create_repetitive();
        assert!(r.sequences()[0].is_repetitive());
        assert!(!a.sequences()[0].is_repetitive());
    }

    #[test]
    fn test_single_sequence_honours_flag() {
        assert!(Sequence::single(7, true).is_repetitive());
        assert!(!Sequence::single(7, false).is_repetitive());
    }

    #[test]
    fn test_repetitive_overlap_is_not_conflict() {
        let mut a = LookAheadSet::new(1);
        a.add(Sequence::single(1, true));
        let mut b = LookAheadSet::new(1);
        b.add(Sequence::single(1, true));
        assert!(!a.conflicts_with(&b, false));
        let mut c = LookAheadSet::new(1);
        c.add(Sequence::single(1, false));
        assert!(a.conflicts_with(&c, false));
    }
}
