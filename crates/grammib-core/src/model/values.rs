//! MIB values and two-phase value references.
//!
//! At parse time a value may cite symbols that are not declared yet, so
//! values are stored as [`ValueRef`]s: either a concrete [`MibValue`] or an
//! unresolved name/OID-component form that the loader's initialize pass
//! rewrites in place.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use super::ids::OidId;

/// A concrete MIB value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MibValue {
    /// An integer value.
    Number(i64),
    /// A quoted string value.
    Str(String),
    /// An object identifier: a node of the OID tree.
    Oid(OidId),
    /// A collection of named bits.
    Bits(Vec<String>),
}

impl MibValue {
    /// The numeric value, if this is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The OID node, if this is an object identifier.
    #[must_use]
    pub fn as_oid(&self) -> Option<OidId> {
        match self {
            Self::Oid(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for MibValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Oid(_) => write!(f, "<oid>"),
            Self::Bits(names) => {
                write!(f, "{{ ")?;
                for (i, n) in names.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{n}")?;
                }
                write!(f, " }}")
            }
        }
    }
}

/// One component of an unresolved OID path.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OidComponent {
    /// Declared name, if the component carries one.
    pub name: Option<String>,
    /// Sub-identifier, if the component carries one.
    pub number: Option<u32>,
}

impl OidComponent {
    /// A purely numeric component.
    #[must_use]
    pub fn number(number: u32) -> Self {
        Self {
            name: None,
            number: Some(number),
        }
    }

    /// A name-only component.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            number: None,
        }
    }

    /// A `name(number)` component.
    #[must_use]
    pub fn named_number(name: impl Into<String>, number: u32) -> Self {
        Self {
            name: Some(name.into()),
            number: Some(number),
        }
    }
}

/// A value that may still cite unresolved names.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueRef {
    /// A concrete value.
    Resolved(MibValue),
    /// A reference to a named value symbol.
    Name(String),
    /// An object-identifier path with possibly-unresolved components.
    OidPath(Vec<OidComponent>),
}

impl ValueRef {
    /// The concrete value, if resolution has happened.
    #[must_use]
    pub fn resolved(&self) -> Option<&MibValue> {
        match self {
            Self::Resolved(v) => Some(v),
            _ => None,
        }
    }

    /// Whether this reference still needs resolution.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        !matches!(self, Self::Resolved(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert_eq!(MibValue::Number(42).as_number(), Some(42));
        assert_eq!(MibValue::Str("x".into()).as_number(), None);
    }

    #[test]
    fn test_unresolved() {
        assert!(ValueRef::Name("iso".into()).is_unresolved());
        assert!(!ValueRef::Resolved(MibValue::Number(1)).is_unresolved());
    }
}
