//! Token patterns and tokens.

use alloc::format;
use alloc::string::String;

/// Identifier of a token pattern, chosen by the grammar author.
pub type TokenId = usize;

/// How a token pattern matches input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternKind {
    /// An exact character sequence.
    Literal,
    /// A regular expression.
    Regex,
}

/// A token pattern registered with the tokenizer.
#[derive(Clone, Debug)]
pub struct TokenPattern {
    /// Pattern id, unique within a tokenizer.
    pub id: TokenId,
    /// Pattern name, used in descriptions and parse trees.
    pub name: String,
    /// How the pattern matches.
    pub kind: PatternKind,
    /// The literal image or the regex source.
    pub text: String,
    /// Matched lexemes are consumed but never surfaced to the parser.
    pub ignored: bool,
    /// Matched lexemes produce a parse error with `error_message`.
    pub error: bool,
    /// Message reported when an error pattern matches.
    pub error_message: Option<String>,
}

impl TokenPattern {
    /// Create a literal pattern.
    #[must_use]
    pub fn literal(id: TokenId, name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: PatternKind::Literal,
            text: image.into(),
            ignored: false,
            error: false,
            error_message: None,
        }
    }

    /// Create a regex pattern.
    #[must_use]
    pub fn regex(id: TokenId, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: PatternKind::Regex,
            text: pattern.into(),
            ignored: false,
            error: false,
            error_message: None,
        }
    }

    /// Mark the pattern as ignored.
    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// Mark the pattern as an error pattern with the given message.
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = true;
        self.error_message = Some(message.into());
        self
    }

    /// Human-readable description: the quoted image for literals, the
    /// bracketed name for regex patterns.
    #[must_use]
    pub fn description(&self) -> String {
        match self.kind {
            PatternKind::Literal => format!("\"{}\"", self.text),
            PatternKind::Regex => format!("<{}>", self.name),
        }
    }
}

/// A matched token: a parse-tree leaf.
///
/// `previous` and `next` are indices into the tokenizer's retained token
/// list and are only populated when the tokenizer keeps that list; `next`
/// is filled in on the listed copy once the following token is read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Id of the pattern that matched.
    pub id: TokenId,
    /// Name of the pattern that matched.
    pub name: String,
    /// The matched text.
    pub image: String,
    /// 1-based line of the first character.
    pub start_line: u32,
    /// 1-based column of the first character.
    pub start_column: u32,
    /// 1-based line of the last character.
    pub end_line: u32,
    /// 1-based column of the last character.
    pub end_column: u32,
    /// Index of the previous token in the retained list.
    pub previous: Option<usize>,
    /// Index of the next token in the retained list.
    pub next: Option<usize>,
}
