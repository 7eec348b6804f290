//! Error types for the parsing runtime.
//!
//! Every parsing pass collects recoverable errors into an [`ErrorLog`]
//! instead of aborting on the first failure; the log is handed back to the
//! caller once the pass completes. Static grammar defects are reported
//! separately as [`GrammarError`] when the parser is prepared.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// A failure reported by the underlying character source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceError {
    /// Human-readable description of the IO failure.
    pub message: String,
}

impl SourceError {
    /// Create a new source error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IO error: {}", self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SourceError {}

/// The kind of a parse error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The underlying reader failed; parsing cannot continue.
    Io {
        /// Description of the IO failure.
        message: String,
    },
    /// No token pattern matched at the current position.
    UnexpectedChar {
        /// The offending character.
        ch: char,
    },
    /// The parser saw a token that none of the expected patterns allow.
    UnexpectedToken {
        /// Image of the offending token.
        found: String,
        /// Descriptions of the token patterns that were acceptable here.
        expected: Vec<String>,
    },
    /// Input ended while the parser still required a token.
    UnexpectedEof,
    /// A token pattern flagged as an error pattern matched.
    InvalidToken {
        /// The message stored on the error pattern.
        message: String,
    },
    /// An analyzer callback failed.
    Analyzer {
        /// The callback's message.
        message: String,
    },
    /// The grammar itself was defective (reported if parsing is attempted
    /// with a grammar that failed preparation).
    Grammar {
        /// Description of the defect.
        message: String,
    },
}

/// A parse error with its source location.
///
/// Lines and columns are 1-based. A zero line means the location is
/// unknown (grammar errors surfaced through a parse attempt).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// 1-based line of the error.
    pub line: u32,
    /// 1-based column of the error.
    pub column: u32,
}

impl ParseError {
    /// Create a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: u32, column: u32) -> Self {
        Self { kind, line, column }
    }

    /// Check whether the parser may keep going after this error.
    ///
    /// End-of-input and IO failures are final; everything else is subject
    /// to the recovery protocol.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self.kind,
            ParseErrorKind::UnexpectedEof | ParseErrorKind::Io { .. } | ParseErrorKind::Grammar { .. }
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "line {}, column {}: ", self.line, self.column)?;
        }
        match &self.kind {
            ParseErrorKind::Io { message } => write!(f, "IO error: {message}"),
            ParseErrorKind::UnexpectedChar { ch } => {
                write!(f, "unexpected character {ch:?}")
            }
            ParseErrorKind::UnexpectedToken { found, expected } => {
                write!(f, "unexpected token {found:?}")?;
                if !expected.is_empty() {
                    write!(f, ", expected ")?;
                    for (i, e) in expected.iter().enumerate() {
                        if i > 0 {
                            write!(f, " or ")?;
                        }
                        write!(f, "{e}")?;
                    }
                }
                Ok(())
            }
            ParseErrorKind::UnexpectedEof => write!(f, "unexpected end of input"),
            ParseErrorKind::InvalidToken { message } => write!(f, "{message}"),
            ParseErrorKind::Analyzer { message } => write!(f, "{message}"),
            ParseErrorKind::Grammar { message } => write!(f, "grammar error: {message}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

/// An aggregated list of parse errors from a single pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorLog {
    errors: Vec<ParseError>,
}

impl ErrorLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error to the log.
    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Check if the log holds no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of errors in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The collected errors, in the order they occurred.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Consume the log, returning the errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }
}

impl fmt::Display for ErrorLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} parse error(s):", self.errors.len())?;
        for e in &self.errors {
            writeln!(f, "  {e}")?;
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ErrorLog {}

/// A static defect in the grammar, detected during preparation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GrammarError {
    /// Two token patterns were registered with the same id.
    DuplicateTokenId {
        /// The colliding id.
        id: usize,
    },
    /// A token pattern's regex failed to compile.
    InvalidTokenPattern {
        /// Name of the pattern.
        name: String,
        /// The compile error rendered as text.
        message: String,
    },
    /// Two production patterns were registered with the same id.
    DuplicateProductionId {
        /// The colliding id.
        id: usize,
    },
    /// No production patterns were added before preparing.
    NoPatterns,
    /// A production has an empty alternative list.
    EmptyProduction {
        /// Name of the defective production.
        name: String,
    },
    /// An element references a production id that was never added.
    ProductionNotFound {
        /// Name of the referring production.
        referrer: String,
        /// The missing id.
        id: usize,
    },
    /// An element references a token id unknown to the tokenizer.
    TokenNotFound {
        /// Name of the referring production.
        referrer: String,
        /// The missing id.
        id: usize,
    },
    /// Look-ahead computation recursed into the same production without
    /// consuming input (left recursion).
    InfiniteLoop {
        /// Name of the production.
        name: String,
    },
    /// Alternatives of a production could not be told apart within the
    /// look-ahead limit.
    AmbiguousAlternatives {
        /// Name of the production.
        name: String,
    },
    /// A repetition inside an alternative conflicts with what may follow it.
    AmbiguousElement {
        /// Name of the production.
        name: String,
        /// Position of the element inside its alternative.
        position: usize,
    },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateTokenId { id } => write!(f, "duplicate token pattern id {id}"),
            Self::InvalidTokenPattern { name, message } => {
                write!(f, "token pattern {name}: {message}")
            }
            Self::DuplicateProductionId { id } => {
                write!(f, "duplicate production pattern id {id}")
            }
            Self::NoPatterns => write!(f, "no production patterns added"),
            Self::EmptyProduction { name } => {
                write!(f, "production {name} has no alternatives")
            }
            Self::ProductionNotFound { referrer, id } => {
                write!(f, "production {referrer} references unknown production id {id}")
            }
            Self::TokenNotFound { referrer, id } => {
                write!(f, "production {referrer} references unknown token id {id}")
            }
            Self::InfiniteLoop { name } => {
                write!(f, "infinite loop in production {name}")
            }
            Self::AmbiguousAlternatives { name } => {
                write!(f, "ambiguous alternatives in production {name}")
            }
            Self::AmbiguousElement { name, position } => {
                write!(
                    f,
                    "ambiguous repetition at element {position} in production {name}"
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GrammarError {}

/// A failure raised by an [`Analyzer`](crate::parser::Analyzer) callback.
///
/// The parser attaches the current source location and records it in the
/// error log without entering recovery mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyzerError {
    /// The callback's message.
    pub message: String,
}

impl AnalyzerError {
    /// Create a new analyzer error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AnalyzerError {}
