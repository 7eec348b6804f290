//! LL(k) recursive-descent parser.
//!
//! The parser is driven by [`ProductionPattern`]s and the look-ahead sets
//! computed during [`prepare`](Parser::prepare). Parsing builds a
//! [`Node`] tree, invoking [`Analyzer`] callbacks as nodes are entered,
//! completed and attached.
//!
//! # Error recovery
//!
//! Every lexical or syntactic error is appended to the log and starts a
//! recovery countdown of 3: the offending token is skipped, the element is
//! retried, and analyzer callbacks stay suppressed until three tokens have
//! been consumed and accepted. End-of-input and IO failures abort the
//! parse. A non-empty log is returned as the `Err` of
//! [`parse`](Parser::parse).

mod analyzer;
mod node;

pub use analyzer::{Analyzer, TreeBuilder};
pub use node::{Node, ProductionNode, TokenNode};

use alloc::boxed::Box;
use alloc::collections::{BTreeMap, VecDeque};
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::buffer::TextSource;
use crate::error::{ErrorLog, GrammarError, ParseError, ParseErrorKind};
use crate::grammar::{ElementKind, ProductionElement, ProductionId, ProductionPattern};
use crate::lookahead::{self, LookAheadSet};
use crate::tokenizer::{Token, TokenId, Tokenizer};

/// Number of accepted tokens after an error during which analyzer
/// callbacks stay suppressed.
const RECOVERY_TOKENS: i32 = 3;

/// LL(k) recursive-descent parser.
///
/// The first production pattern added is the start pattern. A parser
/// instance is single-use state-wise: [`reset`](Parser::reset) rebinds it
/// to a new input.
pub struct Parser {
    tokenizer: Tokenizer,
    patterns: Vec<Rc<ProductionPattern>>,
    index: BTreeMap<ProductionId, usize>,
    start: Option<ProductionId>,
    prepared: bool,
    queue: VecDeque<Token>,
    log: ErrorLog,
    error_recovery: i32,
}

impl Parser {
    /// Create a parser over the given tokenizer.
    #[must_use]
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            patterns: Vec::new(),
            index: BTreeMap::new(),
            start: None,
            prepared: false,
            queue: VecDeque::new(),
            log: ErrorLog::new(),
            error_recovery: -1,
        }
    }

    /// The underlying tokenizer.
    #[must_use]
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Mutable access to the underlying tokenizer (pattern registration).
    pub fn tokenizer_mut(&mut self) -> &mut Tokenizer {
        &mut self.tokenizer
    }

    /// Register a production pattern. The first pattern added becomes the
    /// start pattern.
    pub fn add_pattern(&mut self, pattern: ProductionPattern) -> Result<(), GrammarError> {
        if self.index.contains_key(&pattern.id) {
            return Err(GrammarError::DuplicateProductionId { id: pattern.id });
        }
        if self.start.is_none() {
            self.start = Some(pattern.id);
        }
        self.index.insert(pattern.id, self.patterns.len());
        self.patterns.push(Rc::new(pattern));
        self.prepared = false;
        Ok(())
    }

    /// Verify the grammar and compute look-ahead sets.
    ///
    /// Checks that every referenced production and token id exists, that
    /// every production has at least one alternative, and that the
    /// alternatives of each production can be told apart within the
    /// look-ahead limit.
    pub fn prepare(&mut self) -> Result<(), GrammarError> {
        if self.patterns.is_empty() {
            return Err(GrammarError::NoPatterns);
        }
        let mut plain: Vec<ProductionPattern> =
            self.patterns.iter().map(|rc| (**rc).clone()).collect();
        lookahead::analyze(&mut plain, &self.tokenizer)?;
        self.patterns = plain.into_iter().map(Rc::new).collect();
        self.prepared = true;
        Ok(())
    }

    /// Rebind the parser to a new input source, clearing all parse state.
    pub fn reset(&mut self, source: Box<dyn TextSource>) {
        self.tokenizer.reset(source);
        self.queue.clear();
        self.log = ErrorLog::new();
        self.error_recovery = -1;
    }

    /// Parse the input, returning the parse tree root or the aggregated
    /// error log.
    pub fn parse<V>(&mut self, analyzer: &mut dyn Analyzer<V>) -> Result<Node<V>, ErrorLog> {
        if !self.prepared {
            if let Err(e) = self.prepare() {
                self.log.push(ParseError::new(
                    ParseErrorKind::Grammar {
                        message: format!("{e}"),
                    },
                    0,
                    0,
                ));
                return Err(core::mem::take(&mut self.log));
            }
        }
        let Some(start) = self.start else {
            // prepare() rejects empty grammars.
            return Err(core::mem::take(&mut self.log));
        };
        let root = match self.parse_pattern(analyzer, start) {
            Ok(node) => node,
            Err(e) => {
                self.log.push(e);
                None
            }
        };
        // Anything left over is an error.
        let trailing = self
            .peek_token(0)
            .map(|t| (t.image.clone(), t.start_line, t.start_column));
        if let Some((found, line, column)) = trailing {
            self.log.push(ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    found,
                    expected: Vec::new(),
                },
                line,
                column,
            ));
        }
        if !self.log.is_empty() {
            return Err(core::mem::take(&mut self.log));
        }
        let root = root.unwrap_or_else(|| {
            let name = self
                .index
                .get(&start)
                .map(|&i| self.patterns[i].name.clone())
                .unwrap_or_default();
            Node::production(start, name, false)
        });
        Ok(root)
    }

    // === Token access ===

    /// Fill the queue up to `offset` and peek, logging lexical errors as
    /// they surface.
    fn peek_token(&mut self, offset: usize) -> Option<&Token> {
        while self.queue.len() <= offset {
            match self.tokenizer.next() {
                Ok(Some(t)) => self.queue.push_back(t),
                Ok(None) => return None,
                Err(e) => self.report(e),
            }
        }
        self.queue.get(offset)
    }

    /// Peek the token id at `offset`.
    fn peek_id(&mut self, offset: usize) -> Option<TokenId> {
        self.peek_token(offset).map(|t| t.id)
    }

    /// Consume the next token.
    fn next_token(&mut self) -> Result<Token, ParseError> {
        if self.peek_token(0).is_some() {
            if let Some(t) = self.queue.pop_front() {
                return Ok(t);
            }
        }
        Err(ParseError::new(
            ParseErrorKind::UnexpectedEof,
            self.tokenizer.line(),
            self.tokenizer.column(),
        ))
    }

    /// Consume the next token, requiring the given pattern id.
    fn next_token_expect(&mut self, id: TokenId) -> Result<Token, ParseError> {
        let peeked = self
            .peek_token(0)
            .map(|t| (t.id, t.image.clone(), t.start_line, t.start_column));
        match peeked {
            Some((tid, _, _, _)) if tid == id => {
                let Some(token) = self.queue.pop_front() else {
                    return Err(ParseError::new(
                        ParseErrorKind::UnexpectedEof,
                        self.tokenizer.line(),
                        self.tokenizer.column(),
                    ));
                };
                if self.error_recovery > 0 {
                    self.error_recovery -= 1;
                }
                Ok(token)
            }
            Some((_, image, line, column)) => {
                let expected = self
                    .tokenizer
                    .pattern_description(id)
                    .unwrap_or_else(|| format!("token {id}"));
                Err(ParseError::new(
                    ParseErrorKind::UnexpectedToken {
                        found: image,
                        expected: alloc::vec![expected],
                    },
                    line,
                    column,
                ))
            }
            None => Err(ParseError::new(
                ParseErrorKind::UnexpectedEof,
                self.tokenizer.line(),
                self.tokenizer.column(),
            )),
        }
    }

    /// Record an error and arm the recovery countdown.
    fn report(&mut self, e: ParseError) {
        let recoverable = e.is_recoverable();
        self.log.push(e);
        if recoverable {
            self.error_recovery = RECOVERY_TOKENS;
        }
    }

    fn current_location(&mut self) -> (u32, u32) {
        if let Some((line, column)) = self.peek_token(0).map(|t| (t.start_line, t.start_column)) {
            return (line, column);
        }
        (self.tokenizer.line(), self.tokenizer.column())
    }

    // === Look-ahead matching ===

    /// The length of the longest sequence in `set` matching the upcoming
    /// tokens, if any.
    fn match_lookahead(&mut self, set: &LookAheadSet) -> Option<usize> {
        set.longest_match(&mut |i| self.peek_id(i))
    }

    // === Recursive descent ===

    fn parse_pattern<V>(
        &mut self,
        analyzer: &mut dyn Analyzer<V>,
        id: ProductionId,
    ) -> Result<Option<Node<V>>, ParseError> {
        let Some(&pidx) = self.index.get(&id) else {
            // prepare() verified references; defensive.
            return Ok(None);
        };
        let pattern = Rc::clone(&self.patterns[pidx]);
        let mut best: Option<(usize, usize)> = None;
        for (i, alt) in pattern.alternatives().iter().enumerate() {
            if let Some(la) = &alt.lookahead {
                if let Some(len) = self.match_lookahead(la) {
                    let better = match best {
                        None => true,
                        Some((_, blen)) => len > blen,
                    };
                    if better {
                        best = Some((i, len));
                    }
                }
            }
        }
        match best {
            Some((aidx, _)) => self.parse_alternative(analyzer, &pattern, aidx),
            None => Err(self.syntax_error(&pattern)),
        }
    }

    fn parse_alternative<V>(
        &mut self,
        analyzer: &mut dyn Analyzer<V>,
        pattern: &ProductionPattern,
        aidx: usize,
    ) -> Result<Option<Node<V>>, ParseError> {
        let mut node = Node::production(pattern.id, pattern.name.clone(), pattern.synthetic);
        self.enter_node(analyzer, &mut node);
        for elem in pattern.alternatives()[aidx].elements() {
            loop {
                match self.parse_element(analyzer, &mut node, elem) {
                    Ok(()) => break,
                    Err(e) if e.is_recoverable() => {
                        self.report(e);
                        // Skip the offending token, then retry the element.
                        self.next_token()?;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(self.exit_node(analyzer, node))
    }

    fn parse_element<V>(
        &mut self,
        analyzer: &mut dyn Analyzer<V>,
        parent: &mut Node<V>,
        elem: &ProductionElement,
    ) -> Result<(), ParseError> {
        let mut count: u32 = 0;
        while count < elem.max {
            if count >= elem.min {
                // Past the minimum the continuation is optional; consult
                // the element look-ahead.
                let Some(la) = &elem.lookahead else { break };
                if self.match_lookahead(la).is_none() {
                    break;
                }
            }
            match elem.kind {
                ElementKind::Token => {
                    let token = self.next_token_expect(elem.id)?;
                    let mut child = Node::token(token);
                    self.enter_node(analyzer, &mut child);
                    if let Some(child) = self.exit_node(analyzer, child) {
                        self.add_child(analyzer, parent, child);
                    }
                }
                ElementKind::Production => {
                    if let Some(child) = self.parse_pattern(analyzer, elem.id)? {
                        self.add_child(analyzer, parent, child);
                    }
                }
            }
            count += 1;
        }
        Ok(())
    }

    fn syntax_error(&mut self, pattern: &ProductionPattern) -> ParseError {
        let mut expected = Vec::new();
        for alt in pattern.alternatives() {
            if let Some(la) = &alt.lookahead {
                for t in la.first_tokens() {
                    if let Some(desc) = self.tokenizer.pattern_description(t) {
                        if !expected.contains(&desc) {
                            expected.push(desc);
                        }
                    }
                }
            }
        }
        let found = self
            .peek_token(0)
            .map(|t| (t.image.clone(), t.start_line, t.start_column));
        match found {
            Some((found, line, column)) => ParseError::new(
                ParseErrorKind::UnexpectedToken { found, expected },
                line,
                column,
            ),
            None => ParseError::new(
                ParseErrorKind::UnexpectedEof,
                self.tokenizer.line(),
                self.tokenizer.column(),
            ),
        }
    }

    // === Analyzer dispatch ===

    fn is_hidden<V>(node: &Node<V>) -> bool {
        matches!(node, Node::Production(p) if p.synthetic)
    }

    fn enter_node<V>(&mut self, analyzer: &mut dyn Analyzer<V>, node: &mut Node<V>) {
        if self.error_recovery > 0 || Self::is_hidden(node) {
            return;
        }
        if let Err(e) = analyzer.enter(node) {
            self.report_analyzer(&e.message);
        }
    }

    fn exit_node<V>(&mut self, analyzer: &mut dyn Analyzer<V>, mut node: Node<V>) -> Option<Node<V>> {
        if self.error_recovery > 0 || Self::is_hidden(&node) {
            return Some(node);
        }
        match analyzer.exit(&mut node) {
            Ok(true) => Some(node),
            Ok(false) => None,
            Err(e) => {
                self.report_analyzer(&e.message);
                Some(node)
            }
        }
    }

    /// Attach a child, splicing hidden productions into the parent.
    fn add_child<V>(
        &mut self,
        analyzer: &mut dyn Analyzer<V>,
        parent: &mut Node<V>,
        child: Node<V>,
    ) {
        if Self::is_hidden(&child) {
            if let Node::Production(p) = child {
                for c in p.children {
                    self.attach(analyzer, parent, c);
                }
            }
        } else {
            self.attach(analyzer, parent, child);
        }
    }

    fn attach<V>(&mut self, analyzer: &mut dyn Analyzer<V>, parent: &mut Node<V>, child: Node<V>) {
        // Children of a hidden parent are attached directly; the analyzer
        // sees them once they are spliced into the grandparent.
        if self.error_recovery > 0 || Self::is_hidden(parent) {
            parent.add_child(child);
            return;
        }
        if let Err(e) = analyzer.child(parent, child) {
            self.report_analyzer(&e.message);
        }
    }

    /// Analyzer failures become logged parse errors without arming
    /// recovery.
    fn report_analyzer(&mut self, message: &str) {
        let (line, column) = self.current_location();
        self.log.push(ParseError::new(
            ParseErrorKind::Analyzer {
                message: message.into(),
            },
            line,
            column,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;
    use crate::grammar::{ProductionAlternative, UNBOUNDED};
    use crate::tokenizer::TokenPattern;

    const T_ID: TokenId = 1;
    const T_COMMA: TokenId = 2;
    const T_EQ: TokenId = 3;
    const T_LPAREN: TokenId = 4;
    const T_RPAREN: TokenId = 5;
    const T_WS: TokenId = 6;

    const P_LIST: ProductionId = 101;
    const P_REST: ProductionId = 102;
    const P_STMT: ProductionId = 103;

    fn list_parser(text: &str) -> Parser {
        let mut t = Tokenizer::from_text(text);
        t.add_pattern(TokenPattern::literal(T_COMMA, "COMMA", ",")).unwrap();
        t.add_pattern(TokenPattern::regex(T_ID, "ID", "[a-z]+")).unwrap();
        t.add_pattern(TokenPattern::regex(T_WS, "WS", "[ \\t\\n]+").ignored())
            .unwrap();
        let mut p = Parser::new(t);
        // List = ID Rest* ; Rest = "," ID (synthetic)
        p.add_pattern(ProductionPattern::new(P_LIST, "List").with_alternative(alloc::vec![
            ProductionElement::token(T_ID, 1, 1),
            ProductionElement::production(P_REST, 0, UNBOUNDED),
        ]))
        .unwrap();
        p.add_pattern(
            ProductionPattern::new(P_REST, "Rest")
                .synthetic()
                .with_alternative(alloc::vec![
                    ProductionElement::token(T_COMMA, 1, 1),
                    ProductionElement::token(T_ID, 1, 1),
                ]),
        )
        .unwrap();
        p
    }

    fn leaf_images<V>(node: &Node<V>) -> Vec<String> {
        let mut out = Vec::new();
        fn walk<V>(node: &Node<V>, out: &mut Vec<String>) {
            match node {
                Node::Token(t) => out.push(t.token.image.clone()),
                Node::Production(p) => {
                    for c in &p.children {
                        walk(c, out);
                    }
                }
            }
        }
        walk(node, &mut out);
        out
    }

    #[test]
    fn test_simple_list() {
        let mut p = list_parser("a, b, c");
        let tree: Node<()> = p.parse(&mut TreeBuilder).unwrap();
        assert_eq!(leaf_images(&tree), ["a", ",", "b", ",", "c"]);
    }

    #[test]
    fn test_hidden_production_is_spliced() {
        let mut p = list_parser("a, b");
        let tree: Node<()> = p.parse(&mut TreeBuilder).unwrap();
        // Rest is synthetic: its children hang directly off List.
        assert_eq!(tree.children().len(), 3);
        assert!(tree.children().iter().all(Node::is_token));
    }

    #[test]
    fn test_error_recovery_single_error() {
        // A duplicated comma yields one error; the tree still holds all
        // three identifiers.
        let mut p = list_parser("foo,,bar,baz");
        let err = p.parse::<()>(&mut TreeBuilder).unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(matches!(
            err.errors()[0].kind,
            ParseErrorKind::UnexpectedToken { .. }
        ));
        assert_eq!((err.errors()[0].line, err.errors()[0].column), (1, 5));
    }

    #[test]
    fn test_unexpected_eof() {
        let mut p = list_parser("foo,");
        let err = p.parse::<()>(&mut TreeBuilder).unwrap_err();
        assert!(err
            .errors()
            .iter()
            .any(|e| matches!(e.kind, ParseErrorKind::UnexpectedEof)));
    }

    #[test]
    fn test_trailing_input_is_an_error() {
        let mut t = Tokenizer::from_text("a a");
        t.add_pattern(TokenPattern::regex(T_ID, "ID", "[a-z]+")).unwrap();
        t.add_pattern(TokenPattern::regex(T_WS, "WS", " +").ignored()).unwrap();
        let mut p = Parser::new(t);
        p.add_pattern(
            ProductionPattern::new(P_LIST, "One")
                .with_alternative(alloc::vec![ProductionElement::token(T_ID, 1, 1)]),
        )
        .unwrap();
        let err = p.parse::<()>(&mut TreeBuilder).unwrap_err();
        assert_eq!(err.len(), 1);
    }

    /// Grammar needing two tokens of look-ahead:
    /// Stmt = ID "=" ID | ID "(" ")"
    fn two_token_parser(text: &str) -> Parser {
        let mut t = Tokenizer::from_text(text);
        t.add_pattern(TokenPattern::literal(T_EQ, "EQ", "=")).unwrap();
        t.add_pattern(TokenPattern::literal(T_LPAREN, "LPAREN", "(")).unwrap();
        t.add_pattern(TokenPattern::literal(T_RPAREN, "RPAREN", ")")).unwrap();
        t.add_pattern(TokenPattern::regex(T_ID, "ID", "[a-z]+")).unwrap();
        t.add_pattern(TokenPattern::regex(T_WS, "WS", " +").ignored()).unwrap();
        let mut p = Parser::new(t);
        let mut stmt = ProductionPattern::new(P_STMT, "Stmt");
        stmt.add_alternative(ProductionAlternative::from_elements(alloc::vec![
            ProductionElement::token(T_ID, 1, 1),
            ProductionElement::token(T_EQ, 1, 1),
            ProductionElement::token(T_ID, 1, 1),
        ]));
        stmt.add_alternative(ProductionAlternative::from_elements(alloc::vec![
            ProductionElement::token(T_ID, 1, 1),
            ProductionElement::token(T_LPAREN, 1, 1),
            ProductionElement::token(T_RPAREN, 1, 1),
        ]));
        p.add_pattern(stmt).unwrap();
        p
    }

    #[test]
    fn test_two_token_lookahead() {
        let mut p = two_token_parser("x = y");
        let tree: Node<()> = p.parse(&mut TreeBuilder).unwrap();
        assert_eq!(leaf_images(&tree), ["x", "=", "y"]);

        let mut p = two_token_parser("x ( )");
        let tree: Node<()> = p.parse(&mut TreeBuilder).unwrap();
        assert_eq!(leaf_images(&tree), ["x", "(", ")"]);
    }

    #[test]
    fn test_parse_determinism() {
        let run = || {
            let mut p = list_parser("a, b, c, d");
            let tree: Node<()> = p.parse(&mut TreeBuilder).unwrap();
            alloc::format!("{tree}")
        };
        assert_eq!(run(), run());
    }

    /// Counts callbacks; used to verify suppression during recovery.
    #[derive(Default)]
    struct CountingAnalyzer {
        enters: usize,
        exits: usize,
        children: usize,
    }

    impl Analyzer<()> for CountingAnalyzer {
        fn enter(&mut self, _node: &mut Node<()>) -> Result<(), AnalyzerError> {
            self.enters += 1;
            Ok(())
        }

        fn exit(&mut self, _node: &mut Node<()>) -> Result<bool, AnalyzerError> {
            self.exits += 1;
            Ok(true)
        }

        fn child(&mut self, parent: &mut Node<()>, child: Node<()>) -> Result<(), AnalyzerError> {
            self.children += 1;
            parent.add_child(child);
            Ok(())
        }
    }

    #[test]
    fn test_callbacks_suppressed_during_recovery() {
        let mut clean = CountingAnalyzer::default();
        let mut p = list_parser("foo,bar,baz");
        p.parse(&mut clean).unwrap();

        let mut dirty = CountingAnalyzer::default();
        let mut p = list_parser("foo,,bar,baz");
        let _ = p.parse(&mut dirty);

        // The erroring parse fires strictly fewer callbacks than the clean
        // one over the same logical content.
        assert!(dirty.enters < clean.enters);
        assert!(dirty.children < clean.children);
    }

    #[test]
    fn test_exit_discard_drops_subtree() {
        struct Discarder;
        impl Analyzer<()> for Discarder {
            fn exit(&mut self, node: &mut Node<()>) -> Result<bool, AnalyzerError> {
                Ok(!node.token_ref().is_some_and(|t| t.image == "b"))
            }
        }
        let mut p = list_parser("a, b, c");
        let tree = p.parse(&mut Discarder).unwrap();
        assert_eq!(leaf_images(&tree), ["a", ",", ",", "c"]);
    }

    #[test]
    fn test_analyzer_error_is_logged_without_recovery() {
        struct Failing;
        impl Analyzer<()> for Failing {
            fn exit(&mut self, node: &mut Node<()>) -> Result<bool, AnalyzerError> {
                if node.is_token() && node.token_ref().is_some_and(|t| t.image == "b") {
                    Err(AnalyzerError::new("b is forbidden"))
                } else {
                    Ok(true)
                }
            }
        }
        let mut p = list_parser("a, b, c");
        let err = p.parse(&mut Failing).unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(matches!(
            err.errors()[0].kind,
            ParseErrorKind::Analyzer { ref message } if message == "b is forbidden"
        ));
    }

    #[test]
    fn test_empty_grammar_rejected() {
        let t = Tokenizer::from_text("");
        let mut p = Parser::new(t);
        assert!(matches!(p.prepare(), Err(GrammarError::NoPatterns)));
    }

    #[test]
    fn test_unknown_reference_rejected() {
        let mut t = Tokenizer::from_text("");
        t.add_pattern(TokenPattern::regex(T_ID, "ID", "[a-z]+")).unwrap();
        let mut p = Parser::new(t);
        p.add_pattern(
            ProductionPattern::new(P_LIST, "List")
                .with_alternative(alloc::vec![ProductionElement::production(999, 1, 1)]),
        )
        .unwrap();
        assert!(matches!(
            p.prepare(),
            Err(GrammarError::ProductionNotFound { id: 999, .. })
        ));
    }

    #[test]
    fn test_left_recursion_rejected() {
        let mut t = Tokenizer::from_text("");
        t.add_pattern(TokenPattern::regex(T_ID, "ID", "[a-z]+")).unwrap();
        let mut p = Parser::new(t);
        p.add_pattern(ProductionPattern::new(P_LIST, "List").with_alternative(alloc::vec![
            ProductionElement::production(P_LIST, 1, 1),
            ProductionElement::token(T_ID, 1, 1),
        ]))
        .unwrap();
        assert!(matches!(p.prepare(), Err(GrammarError::InfiniteLoop { .. })));
    }

    #[test]
    fn test_ambiguous_alternatives_rejected() {
        let mut t = Tokenizer::from_text("");
        t.add_pattern(TokenPattern::regex(T_ID, "ID", "[a-z]+")).unwrap();
        let mut p = Parser::new(t);
        let mut amb = ProductionPattern::new(P_LIST, "Amb");
        amb.add_alternative(ProductionAlternative::from_elements(alloc::vec![
            ProductionElement::token(T_ID, 1, 1),
        ]));
        amb.add_alternative(ProductionAlternative::from_elements(alloc::vec![
            ProductionElement::token(T_ID, 1, 1),
        ]));
        p.add_pattern(amb).unwrap();
        assert!(matches!(
            p.prepare(),
            Err(GrammarError::AmbiguousAlternatives { .. })
        ));
    }
}
