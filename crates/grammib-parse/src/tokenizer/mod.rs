//! Pattern-driven tokenizer.
//!
//! The tokenizer holds two indexes over its patterns: a character trie for
//! literal patterns, walked like a DFA for the longest literal match, and a
//! list of regex matchers tried at the current position. The longest match
//! wins; on a tie the pattern added first wins. Ignored patterns are
//! consumed silently, error patterns are consumed and reported, and an
//! unmatched character is reported and skipped so scanning can continue.

mod pattern;

pub use pattern::{PatternKind, Token, TokenId, TokenPattern};

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::buffer::{CharBuffer, TextSource};
use crate::error::{GrammarError, ParseError, ParseErrorKind};
use crate::regex::{Matcher, Regex};

/// A node in the literal-pattern trie.
#[derive(Clone, Debug, Default)]
struct TrieNode {
    /// Outgoing edges, unordered (literal alphabets are small).
    edges: Vec<(char, usize)>,
    /// Index into `patterns` of the pattern accepted at this node.
    accept: Option<usize>,
}

/// A regex pattern with its compiled matcher.
struct RegexEntry {
    /// Index into `patterns`.
    pattern: usize,
    matcher: Matcher,
}

/// Pattern-driven tokenizer over a [`CharBuffer`].
pub struct Tokenizer {
    patterns: Vec<TokenPattern>,
    trie: Vec<TrieNode>,
    regexes: Vec<RegexEntry>,
    buffer: CharBuffer,
    keep_token_list: bool,
    tokens: Vec<Token>,
}

impl Tokenizer {
    /// Create a tokenizer reading from the given source.
    #[must_use]
    pub fn new(source: Box<dyn TextSource>) -> Self {
        Self {
            patterns: Vec::new(),
            trie: alloc::vec![TrieNode::default()],
            regexes: Vec::new(),
            buffer: CharBuffer::new(source),
            keep_token_list: false,
            tokens: Vec::new(),
        }
    }

    /// Create a tokenizer over in-memory text.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(Box::new(crate::buffer::StringSource::new(text)))
    }

    /// Keep every produced token (including ignored and error tokens) in a
    /// retained list, chained through `previous`/`next` indices.
    pub fn set_keep_token_list(&mut self, keep: bool) {
        self.keep_token_list = keep;
    }

    /// The retained token list (empty unless enabled).
    #[must_use]
    pub fn token_list(&self) -> &[Token] {
        &self.tokens
    }

    /// Register a pattern.
    ///
    /// Fails on duplicate ids and on regex patterns that do not compile.
    pub fn add_pattern(&mut self, pattern: TokenPattern) -> Result<(), GrammarError> {
        if self.patterns.iter().any(|p| p.id == pattern.id) {
            return Err(GrammarError::DuplicateTokenId { id: pattern.id });
        }
        let index = self.patterns.len();
        match pattern.kind {
            PatternKind::Literal => self.insert_literal(&pattern.text, index),
            PatternKind::Regex => {
                let regex = Regex::new(&pattern.text).map_err(|e| {
                    GrammarError::InvalidTokenPattern {
                        name: pattern.name.clone(),
                        message: alloc::format!("{e}"),
                    }
                })?;
                self.regexes.push(RegexEntry {
                    pattern: index,
                    matcher: regex.matcher(),
                });
            }
        }
        self.patterns.push(pattern);
        Ok(())
    }

    fn insert_literal(&mut self, image: &str, pattern: usize) {
        let mut node = 0;
        for c in image.chars() {
            let next = self.trie[node].edges.iter().find(|(e, _)| *e == c).map(|(_, n)| *n);
            node = match next {
                Some(n) => n,
                None => {
                    let n = self.trie.len();
                    self.trie.push(TrieNode::default());
                    self.trie[node].edges.push((c, n));
                    n
                }
            };
        }
        // First registration wins; a duplicate image is unreachable anyway.
        if self.trie[node].accept.is_none() {
            self.trie[node].accept = Some(pattern);
        }
    }

    /// Look up a pattern by id.
    #[must_use]
    pub fn pattern(&self, id: TokenId) -> Option<&TokenPattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    /// Description of the pattern with the given id: the quoted literal
    /// image or `<name>` for regex patterns.
    #[must_use]
    pub fn pattern_description(&self, id: TokenId) -> Option<String> {
        self.pattern(id).map(TokenPattern::description)
    }

    /// 1-based line of the next character to consume.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.buffer.line()
    }

    /// 1-based column of the next character to consume.
    #[must_use]
    pub fn column(&self) -> u32 {
        self.buffer.column()
    }

    /// Rebind the tokenizer to a new source, clearing the retained list.
    pub fn reset(&mut self, source: Box<dyn TextSource>) {
        self.buffer.reset(source);
        self.tokens.clear();
        for entry in &mut self.regexes {
            entry.matcher.reset();
        }
    }

    /// Produce the next token that is not ignored, or `None` at end of
    /// input.
    ///
    /// Errors report an unmatched character (which is skipped, so a later
    /// call can make progress) or a matched error pattern (which is
    /// consumed).
    pub fn next(&mut self) -> Result<Option<Token>, ParseError> {
        loop {
            let line = self.buffer.line();
            let column = self.buffer.column();
            match self.buffer.peek(0) {
                Ok(None) => return Ok(None),
                Ok(Some(ch)) => {
                    let best = self.find_match().map_err(|e| self.io_error(&e))?;
                    let Some((index, len)) = best else {
                        // Nothing matched: report and skip one character.
                        self.buffer.read(1).map_err(|e| self.io_error(&e))?;
                        return Err(ParseError::new(
                            ParseErrorKind::UnexpectedChar { ch },
                            line,
                            column,
                        ));
                    };
                    let image = match self.buffer.read(len).map_err(|e| self.io_error(&e))? {
                        Some(image) => image,
                        None => return Ok(None),
                    };
                    let token = self.build_token(index, image, line, column);
                    let pattern = &self.patterns[index];
                    if pattern.error {
                        let message = pattern
                            .error_message
                            .clone()
                            .unwrap_or_else(|| alloc::format!("invalid token \"{}\"", token.image));
                        return Err(ParseError::new(
                            ParseErrorKind::InvalidToken { message },
                            line,
                            column,
                        ));
                    }
                    if pattern.ignored {
                        continue;
                    }
                    return Ok(Some(token));
                }
                Err(e) => return Err(self.io_error(&e)),
            }
        }
    }

    fn io_error(&self, e: &crate::error::SourceError) -> ParseError {
        ParseError::new(
            ParseErrorKind::Io {
                message: e.message.clone(),
            },
            self.buffer.line(),
            self.buffer.column(),
        )
    }

    /// Find the longest match at the current position. Ties go to the
    /// pattern registered first.
    fn find_match(&mut self) -> Result<Option<(usize, usize)>, crate::error::SourceError> {
        let mut best: Option<(usize, usize)> = None;

        // Literal trie walk, tracking the deepest accepting node.
        let mut node = 0;
        let mut depth = 0;
        loop {
            if let Some(pattern) = self.trie[node].accept {
                if Self::better(best, pattern, depth) {
                    best = Some((pattern, depth));
                }
            }
            let Some(c) = self.buffer.peek(depth)? else { break };
            let next = self.trie[node]
                .edges
                .iter()
                .find(|(e, _)| *e == c)
                .map(|(_, n)| *n);
            match next {
                Some(n) => {
                    node = n;
                    depth += 1;
                }
                None => break,
            }
        }

        // Regex patterns.
        for entry in &mut self.regexes {
            if let Some(len) = entry.matcher.match_at(&mut self.buffer, 0)? {
                if len > 0 && Self::better(best, entry.pattern, len) {
                    best = Some((entry.pattern, len));
                }
            }
        }
        Ok(best)
    }

    /// Whether `(pattern, len)` beats the current best: strictly longer, or
    /// equally long but registered earlier.
    fn better(best: Option<(usize, usize)>, pattern: usize, len: usize) -> bool {
        match best {
            None => true,
            Some((bp, bl)) => len > bl || (len == bl && pattern < bp),
        }
    }

    fn build_token(&mut self, index: usize, image: String, line: u32, column: u32) -> Token {
        let pattern = &self.patterns[index];
        // End position: the last character of the image. Walk every
        // character but the last, since the last one does not move the end.
        let mut end_line = line;
        let mut end_column = column;
        let chars: Vec<char> = image.chars().collect();
        for c in chars.iter().take(chars.len().saturating_sub(1)) {
            if *c == '\n' {
                end_line += 1;
                end_column = 1;
            } else {
                end_column += 1;
            }
        }
        let mut token = Token {
            id: pattern.id,
            name: pattern.name.clone(),
            image,
            start_line: line,
            start_column: column,
            end_line,
            end_column,
            previous: None,
            next: None,
        };
        if self.keep_token_list {
            let idx = self.tokens.len();
            if idx > 0 {
                token.previous = Some(idx - 1);
                self.tokens[idx - 1].next = Some(idx);
            }
            self.tokens.push(token.clone());
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INT: TokenId = 1;
    const ID: TokenId = 2;
    const WS: TokenId = 3;
    const KW: TokenId = 4;

    fn scanner(text: &str) -> Tokenizer {
        let mut t = Tokenizer::from_text(text);
        t.add_pattern(TokenPattern::regex(INT, "INT", "[0-9]+")).unwrap();
        t.add_pattern(TokenPattern::regex(ID, "ID", "[A-Za-z_][A-Za-z0-9_]*"))
            .unwrap();
        t.add_pattern(TokenPattern::regex(WS, "WS", "[ \\t\\n]+").ignored())
            .unwrap();
        t
    }

    fn collect(t: &mut Tokenizer) -> Vec<Token> {
        let mut out = Vec::new();
        while let Some(tok) = t.next().unwrap() {
            out.push(tok);
        }
        out
    }

    #[test]
    fn test_scenario_tokens() {
        let mut t = scanner("foo 42\nbar");
        let toks = collect(&mut t);
        assert_eq!(toks.len(), 3);
        assert_eq!((toks[0].id, toks[0].image.as_str()), (ID, "foo"));
        assert_eq!((toks[0].start_line, toks[0].start_column), (1, 1));
        assert_eq!((toks[1].id, toks[1].image.as_str()), (INT, "42"));
        assert_eq!((toks[1].start_line, toks[1].start_column), (1, 5));
        assert_eq!((toks[2].id, toks[2].image.as_str()), (ID, "bar"));
        assert_eq!((toks[2].start_line, toks[2].start_column), (2, 1));
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let mut t = scanner("a 1 b2 c\n3");
            collect(&mut t)
                .into_iter()
                .map(|t| (t.id, t.image, t.start_line, t.start_column))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_longest_match_wins() {
        let mut t = Tokenizer::from_text("forward");
        t.add_pattern(TokenPattern::literal(KW, "FOR", "for")).unwrap();
        t.add_pattern(TokenPattern::regex(ID, "ID", "[a-z]+")).unwrap();
        let tok = t.next().unwrap().unwrap();
        assert_eq!((tok.id, tok.image.as_str()), (ID, "forward"));
    }

    #[test]
    fn test_tie_prefers_earlier_pattern() {
        let mut t = Tokenizer::from_text("for");
        t.add_pattern(TokenPattern::literal(KW, "FOR", "for")).unwrap();
        t.add_pattern(TokenPattern::regex(ID, "ID", "[a-z]+")).unwrap();
        let tok = t.next().unwrap().unwrap();
        assert_eq!(tok.id, KW);
    }

    #[test]
    fn test_unexpected_char_recovers() {
        let mut t = scanner("ab § cd");
        let first = t.next().unwrap().unwrap();
        assert_eq!(first.image, "ab");
        let err = t.next().unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedChar { ch: '§' }));
        assert_eq!((err.line, err.column), (1, 4));
        let next = t.next().unwrap().unwrap();
        assert_eq!(next.image, "cd");
    }

    #[test]
    fn test_error_pattern() {
        let mut t = scanner("foo !! bar");
        t.add_pattern(
            TokenPattern::literal(9, "BANG", "!!").with_error("double bang is not allowed"),
        )
        .unwrap();
        assert_eq!(t.next().unwrap().unwrap().image, "foo");
        let err = t.next().unwrap_err();
        assert!(
            matches!(err.kind, ParseErrorKind::InvalidToken { ref message }
                if message == "double bang is not allowed")
        );
        // The error token was consumed.
        assert_eq!(t.next().unwrap().unwrap().image, "bar");
    }

    #[test]
    fn test_token_list_links() {
        let mut t = scanner("a b");
        t.set_keep_token_list(true);
        collect(&mut t);
        let list = t.token_list();
        // Ignored whitespace is chained too.
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].next, Some(1));
        assert_eq!(list[1].previous, Some(0));
        assert_eq!(list[1].id, WS);
        assert_eq!(list[2].previous, Some(1));
        assert_eq!(list[2].next, None);
    }

    #[test]
    fn test_multi_line_token_end_position() {
        let mut t = Tokenizer::from_text("\"ab\ncd\"x");
        t.add_pattern(TokenPattern::regex(7, "STR", "\"[^\"]*\"")).unwrap();
        t.add_pattern(TokenPattern::regex(ID, "ID", "[a-z]+")).unwrap();
        let tok = t.next().unwrap().unwrap();
        assert_eq!((tok.start_line, tok.start_column), (1, 1));
        assert_eq!((tok.end_line, tok.end_column), (2, 3));
        let x = t.next().unwrap().unwrap();
        assert_eq!((x.start_line, x.start_column), (2, 4));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut t = Tokenizer::from_text("");
        t.add_pattern(TokenPattern::literal(1, "A", "a")).unwrap();
        assert!(matches!(
            t.add_pattern(TokenPattern::literal(1, "B", "b")),
            Err(GrammarError::DuplicateTokenId { id: 1 })
        ));
    }

    #[test]
    fn test_pattern_description() {
        let t = scanner("");
        assert_eq!(t.pattern_description(INT).unwrap(), "<INT>");
        let mut t2 = Tokenizer::from_text("");
        t2.add_pattern(TokenPattern::literal(KW, "FOR", "for")).unwrap();
        assert_eq!(t2.pattern_description(KW).unwrap(), "\"for\"");
    }

    #[test]
    fn test_reset() {
        let mut t = scanner("one");
        assert_eq!(t.next().unwrap().unwrap().image, "one");
        t.reset(Box::new(crate::buffer::StringSource::new("two")));
        let tok = t.next().unwrap().unwrap();
        assert_eq!(tok.image, "two");
        assert_eq!((tok.start_line, tok.start_column), (1, 1));
    }
}
