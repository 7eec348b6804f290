//! MIB symbols.

use alloc::string::String;

use super::types::MibType;
use super::values::ValueRef;

/// Source location of a symbol within its MIB file (1-based).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolLocation {
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

/// A type assignment.
#[derive(Clone, Debug)]
pub struct TypeSymbol {
    /// The declared name.
    pub name: String,
    /// Where the symbol was declared.
    pub location: SymbolLocation,
    /// The declared type.
    pub ty: MibType,
}

/// A value assignment.
#[derive(Clone, Debug)]
pub struct ValueSymbol {
    /// The declared name.
    pub name: String,
    /// Where the symbol was declared.
    pub location: SymbolLocation,
    /// The declared type (often an SNMP macro invocation).
    pub ty: MibType,
    /// The assigned value; frequently an object identifier.
    pub value: ValueRef,
}

/// A macro definition (body not retained).
#[derive(Clone, Debug)]
pub struct MacroSymbol {
    /// The declared name.
    pub name: String,
    /// Where the symbol was declared.
    pub location: SymbolLocation,
}

/// A symbol declared by a MIB.
#[derive(Clone, Debug)]
pub enum MibSymbol {
    /// A type assignment.
    Type(TypeSymbol),
    /// A value assignment.
    Value(ValueSymbol),
    /// A macro definition.
    Macro(MacroSymbol),
}

impl MibSymbol {
    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Type(s) => &s.name,
            Self::Value(s) => &s.name,
            Self::Macro(s) => &s.name,
        }
    }

    /// Where the symbol was declared.
    #[must_use]
    pub fn location(&self) -> SymbolLocation {
        match self {
            Self::Type(s) => s.location,
            Self::Value(s) => s.location,
            Self::Macro(s) => s.location,
        }
    }

    /// This symbol as a value symbol.
    #[must_use]
    pub fn as_value(&self) -> Option<&ValueSymbol> {
        match self {
            Self::Value(s) => Some(s),
            _ => None,
        }
    }

    /// This symbol as a type symbol.
    #[must_use]
    pub fn as_type(&self) -> Option<&TypeSymbol> {
        match self {
            Self::Type(s) => Some(s),
            _ => None,
        }
    }
}
