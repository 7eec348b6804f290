//! Production patterns.
//!
//! A grammar is a set of [`ProductionPattern`]s, each holding ordered
//! [`ProductionAlternative`]s of [`ProductionElement`]s. Elements reference
//! tokens or other productions by id and carry a repetition range. The
//! parser computes a look-ahead set per alternative (and per repeatable
//! element) during preparation.

use alloc::string::String;
use alloc::vec::Vec;

use crate::lookahead::LookAheadSet;
use crate::tokenizer::TokenId;

/// Identifier of a production pattern, chosen by the grammar author.
pub type ProductionId = usize;

/// Unbounded repetition count.
pub const UNBOUNDED: u32 = u32::MAX;

/// What a production element refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    /// A token pattern id.
    Token,
    /// A production pattern id.
    Production,
}

/// One element of an alternative: a token or production reference with a
/// repetition range `min..=max` (`max == UNBOUNDED` for unbounded).
#[derive(Clone, Debug)]
pub struct ProductionElement {
    /// Token or production reference.
    pub kind: ElementKind,
    /// The referenced id.
    pub id: usize,
    /// Minimum number of repetitions.
    pub min: u32,
    /// Maximum number of repetitions.
    pub max: u32,
    /// Look-ahead for deciding whether to parse another repetition, filled
    /// in during preparation for elements with `max > min`.
    pub(crate) lookahead: Option<LookAheadSet>,
}

impl ProductionElement {
    /// A token element.
    #[must_use]
    pub fn token(id: TokenId, min: u32, max: u32) -> Self {
        Self {
            kind: ElementKind::Token,
            id,
            min,
            max,
            lookahead: None,
        }
    }

    /// A production element.
    #[must_use]
    pub fn production(id: ProductionId, min: u32, max: u32) -> Self {
        Self {
            kind: ElementKind::Production,
            id,
            min,
            max,
            lookahead: None,
        }
    }
}

/// An ordered sequence of elements forming one alternative.
#[derive(Clone, Debug, Default)]
pub struct ProductionAlternative {
    elements: Vec<ProductionElement>,
    /// Look-ahead distinguishing this alternative from its siblings,
    /// filled in during preparation.
    pub(crate) lookahead: Option<LookAheadSet>,
}

impl ProductionAlternative {
    /// Create an empty alternative.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an alternative from elements.
    #[must_use]
    pub fn from_elements(elements: Vec<ProductionElement>) -> Self {
        Self {
            elements,
            lookahead: None,
        }
    }

    /// Append an element.
    pub fn add_element(&mut self, element: ProductionElement) {
        self.elements.push(element);
    }

    /// The elements in order.
    #[must_use]
    pub fn elements(&self) -> &[ProductionElement] {
        &self.elements
    }

    pub(crate) fn elements_mut(&mut self) -> &mut [ProductionElement] {
        &mut self.elements
    }
}

/// A production pattern: a named set of alternatives.
#[derive(Clone, Debug)]
pub struct ProductionPattern {
    /// Pattern id, unique within a parser.
    pub id: ProductionId,
    /// Pattern name, used in parse trees and diagnostics.
    pub name: String,
    /// Synthetic productions are helpers (typically generated for
    /// repetitions); their parse-tree nodes are hidden from analyzer
    /// callbacks and their children are spliced into the grandparent.
    pub synthetic: bool,
    alternatives: Vec<ProductionAlternative>,
}

impl ProductionPattern {
    /// Create a pattern with no alternatives.
    #[must_use]
    pub fn new(id: ProductionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            synthetic: false,
            alternatives: Vec::new(),
        }
    }

    /// Mark the pattern as synthetic (hidden).
    #[must_use]
    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    /// Append an alternative.
    pub fn add_alternative(&mut self, alternative: ProductionAlternative) {
        self.alternatives.push(alternative);
    }

    /// Append an alternative built from elements, builder-style.
    #[must_use]
    pub fn with_alternative(mut self, elements: Vec<ProductionElement>) -> Self {
        self.alternatives
            .push(ProductionAlternative::from_elements(elements));
        self
    }

    /// The alternatives in order.
    #[must_use]
    pub fn alternatives(&self) -> &[ProductionAlternative] {
        &self.alternatives
    }

    pub(crate) fn alternatives_mut(&mut self) -> &mut [ProductionAlternative] {
        &mut self.alternatives
    }
}
