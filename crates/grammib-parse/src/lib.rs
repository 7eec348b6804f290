//! grammib-parse: grammar-driven parsing runtime
//!
//! A self-contained runtime for building tokenizers and LL(k) parsers from
//! pattern tables supplied at construction time.
//!
//! # Pipeline
//!
//! ```text
//! TextSource → CharBuffer → Tokenizer → Parser (+ Analyzer) → Node tree
//!              ^^^^^^^^^^   ^^^^^^^^^   ^^^^^^
//!              buffer       tokenizer   parser
//! ```
//!
//! - **Buffer** (`buffer`): streaming character window with unbounded
//!   look-ahead and line/column tracking
//! - **Regex** (`regex`): backtracking regular expression engine used by
//!   token patterns
//! - **Tokenizer** (`tokenizer`): longest-match scanning over literal and
//!   regex token patterns
//! - **Grammar** (`grammar`, `lookahead`): production patterns and the
//!   LL(k) look-ahead analysis
//! - **Parser** (`parser`): recursive descent with analyzer callbacks and
//!   error recovery
//!
//! The crate is `no_std` compatible (with `alloc`); the default `std`
//! feature adds an `io::Read`-backed text source.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod buffer;
pub mod error;
pub mod grammar;
pub mod lookahead;
pub mod parser;
pub mod regex;
pub mod tokenizer;

pub use buffer::{CharBuffer, StringSource, TextSource};
pub use error::{AnalyzerError, ErrorLog, GrammarError, ParseError, ParseErrorKind, SourceError};
pub use grammar::{
    ElementKind, ProductionAlternative, ProductionElement, ProductionId, ProductionPattern,
    UNBOUNDED,
};
pub use lookahead::{LookAheadSet, Sequence};
pub use parser::{Analyzer, Node, Parser, TreeBuilder};
pub use regex::{Matcher, Regex, RegexError, RegexErrorKind};
pub use tokenizer::{PatternKind, Token, TokenId, TokenPattern, Tokenizer};

#[cfg(feature = "std")]
pub use buffer::ReaderSource;
