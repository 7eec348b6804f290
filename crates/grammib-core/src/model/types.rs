//! The MIB type system.
//!
//! Types are tagged variants. A [`MibType::Reference`] cites another type
//! symbol by name; the loader's validate pass flattens references into the
//! concrete type they denote, re-applying local refinements.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use super::values::{MibValue, ValueRef};

/// A named number (INTEGER enumeration member or named bit).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamedNumber {
    /// The label.
    pub name: String,
    /// The numeric value.
    pub number: i64,
}

/// One bound of a value range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RangeBound {
    /// A concrete number.
    Number(i64),
    /// The `MIN` keyword.
    Min,
    /// The `MAX` keyword.
    Max,
}

/// An inclusive value range; a single allowed value has `min == max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueRange {
    /// Lower bound.
    pub min: RangeBound,
    /// Upper bound.
    pub max: RangeBound,
}

impl ValueRange {
    /// Whether `value` falls inside the range.
    #[must_use]
    pub fn contains(&self, value: i64) -> bool {
        let lo = match self.min {
            RangeBound::Number(n) => value >= n,
            RangeBound::Min => true,
            RangeBound::Max => value >= i64::MAX,
        };
        let hi = match self.max {
            RangeBound::Number(n) => value <= n,
            RangeBound::Max => true,
            RangeBound::Min => value <= i64::MIN,
        };
        lo && hi
    }
}

/// A subtype constraint.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Constraint {
    /// Allowed values (ranges or single values).
    Value(Vec<ValueRange>),
    /// Allowed sizes.
    Size(Vec<ValueRange>),
}

impl Constraint {
    /// The ranges, whichever kind.
    #[must_use]
    pub fn ranges(&self) -> &[ValueRange] {
        match self {
            Self::Value(r) | Self::Size(r) => r,
        }
    }
}

/// ASN.1 tag class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TagClass {
    /// `UNIVERSAL`.
    Universal,
    /// `APPLICATION`.
    Application,
    /// `PRIVATE`.
    Private,
    /// Context-specific (no class keyword).
    Context,
}

/// A reference to a type symbol by name, with local refinements.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeRef {
    /// Optional qualifying module name (`Module.Type`).
    pub module: Option<String>,
    /// The referenced type name.
    pub name: String,
    /// Local constraint refinement.
    pub constraint: Option<Constraint>,
    /// Local named-number refinement.
    pub named: Option<Vec<NamedNumber>>,
}

/// Object access level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Access {
    /// `not-accessible`.
    NotAccessible,
    /// `accessible-for-notify`.
    AccessibleForNotify,
    /// `read-only`.
    ReadOnly,
    /// `read-write`.
    ReadWrite,
    /// `read-create`.
    ReadCreate,
    /// `write-only` (deprecated SMIv1 access).
    WriteOnly,
    /// `not-implemented` (AGENT-CAPABILITIES only).
    NotImplemented,
}

impl Access {
    /// Parse an access keyword.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not-accessible" => Some(Self::NotAccessible),
            "accessible-for-notify" => Some(Self::AccessibleForNotify),
            "read-only" => Some(Self::ReadOnly),
            "read-write" => Some(Self::ReadWrite),
            "read-create" => Some(Self::ReadCreate),
            "write-only" => Some(Self::WriteOnly),
            "not-implemented" => Some(Self::NotImplemented),
            _ => None,
        }
    }
}

/// Definition status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// `current` (SMIv2).
    Current,
    /// `deprecated`.
    Deprecated,
    /// `obsolete`.
    Obsolete,
    /// `mandatory` (SMIv1).
    Mandatory,
    /// `optional` (SMIv1).
    Optional,
}

impl Status {
    /// Parse a status keyword.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "current" => Some(Self::Current),
            "deprecated" => Some(Self::Deprecated),
            "obsolete" => Some(Self::Obsolete),
            "mandatory" => Some(Self::Mandatory),
            "optional" => Some(Self::Optional),
            _ => None,
        }
    }
}

/// An INDEX clause entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexItem {
    /// Whether the index is `IMPLIED`.
    pub implied: bool,
    /// The indexing object name.
    pub name: String,
}

/// A REVISION clause.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Revision {
    /// The revision timestamp string.
    pub date: String,
    /// The revision description.
    pub description: String,
}

/// An OBJECT-TYPE invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnmpObjectType {
    /// The SYNTAX clause.
    pub syntax: MibType,
    /// The UNITS clause.
    pub units: Option<String>,
    /// The ACCESS/MAX-ACCESS clause.
    pub access: Option<Access>,
    /// The STATUS clause.
    pub status: Option<Status>,
    /// The DESCRIPTION clause.
    pub description: Option<String>,
    /// The REFERENCE clause.
    pub reference: Option<String>,
    /// INDEX entries (empty unless a row object).
    pub index: Vec<IndexItem>,
    /// AUGMENTS target row, mutually exclusive with `index`.
    pub augments: Option<String>,
    /// The DEFVAL clause.
    pub defval: Option<ValueRef>,
}

/// A MODULE-IDENTITY invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnmpModuleIdentity {
    /// LAST-UPDATED timestamp.
    pub last_updated: String,
    /// ORGANIZATION text.
    pub organization: String,
    /// CONTACT-INFO text.
    pub contact_info: String,
    /// DESCRIPTION text.
    pub description: String,
    /// REVISION history, newest first as written.
    pub revisions: Vec<Revision>,
}

/// An OBJECT-IDENTITY invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnmpObjectIdentity {
    /// The STATUS clause.
    pub status: Option<Status>,
    /// The DESCRIPTION clause.
    pub description: String,
    /// The REFERENCE clause.
    pub reference: Option<String>,
}

/// A NOTIFICATION-TYPE invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnmpNotificationType {
    /// OBJECTS cited by the notification.
    pub objects: Vec<String>,
    /// The STATUS clause.
    pub status: Option<Status>,
    /// The DESCRIPTION clause.
    pub description: String,
    /// The REFERENCE clause.
    pub reference: Option<String>,
}

/// A TRAP-TYPE invocation (SMIv1).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnmpTrapType {
    /// The ENTERPRISE value.
    pub enterprise: ValueRef,
    /// VARIABLES cited by the trap.
    pub variables: Vec<String>,
    /// The DESCRIPTION clause.
    pub description: Option<String>,
    /// The REFERENCE clause.
    pub reference: Option<String>,
}

/// A TEXTUAL-CONVENTION invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnmpTextualConvention {
    /// The DISPLAY-HINT clause.
    pub display_hint: Option<String>,
    /// The STATUS clause.
    pub status: Option<Status>,
    /// The DESCRIPTION clause.
    pub description: String,
    /// The REFERENCE clause.
    pub reference: Option<String>,
    /// The underlying SYNTAX.
    pub syntax: MibType,
}

/// An OBJECT-GROUP invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnmpObjectGroup {
    /// Member objects.
    pub objects: Vec<String>,
    /// The STATUS clause.
    pub status: Option<Status>,
    /// The DESCRIPTION clause.
    pub description: String,
    /// The REFERENCE clause.
    pub reference: Option<String>,
}

/// A NOTIFICATION-GROUP invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnmpNotificationGroup {
    /// Member notifications.
    pub notifications: Vec<String>,
    /// The STATUS clause.
    pub status: Option<Status>,
    /// The DESCRIPTION clause.
    pub description: String,
    /// The REFERENCE clause.
    pub reference: Option<String>,
}

/// One OBJECT or GROUP refinement inside a compliance MODULE part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplianceItem {
    /// Whether this is a GROUP (true) or OBJECT (false) item.
    pub group: bool,
    /// The referenced name.
    pub name: String,
    /// SYNTAX refinement.
    pub syntax: Option<MibType>,
    /// WRITE-SYNTAX refinement.
    pub write_syntax: Option<MibType>,
    /// MIN-ACCESS refinement.
    pub min_access: Option<Access>,
    /// Item description.
    pub description: Option<String>,
}

/// One MODULE part of a MODULE-COMPLIANCE invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComplianceModule {
    /// The module name; `None` means the defining module.
    pub name: Option<String>,
    /// MANDATORY-GROUPS entries.
    pub mandatory_groups: Vec<String>,
    /// GROUP/OBJECT refinements.
    pub items: Vec<ComplianceItem>,
}

/// A MODULE-COMPLIANCE invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnmpModuleCompliance {
    /// The STATUS clause.
    pub status: Option<Status>,
    /// The DESCRIPTION clause.
    pub description: String,
    /// The REFERENCE clause.
    pub reference: Option<String>,
    /// MODULE parts.
    pub modules: Vec<ComplianceModule>,
}

/// One VARIATION inside an AGENT-CAPABILITIES SUPPORTS part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variation {
    /// The varied object name.
    pub name: String,
    /// SYNTAX refinement.
    pub syntax: Option<MibType>,
    /// WRITE-SYNTAX refinement.
    pub write_syntax: Option<MibType>,
    /// ACCESS refinement.
    pub access: Option<Access>,
    /// CREATION-REQUIRES entries.
    pub creation_requires: Vec<String>,
    /// DEFVAL refinement.
    pub defval: Option<ValueRef>,
    /// Variation description.
    pub description: Option<String>,
}

/// One SUPPORTS part of an AGENT-CAPABILITIES invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SupportedModule {
    /// The supported module name.
    pub name: String,
    /// INCLUDES groups.
    pub includes: Vec<String>,
    /// VARIATION parts.
    pub variations: Vec<Variation>,
}

/// An AGENT-CAPABILITIES invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnmpAgentCapabilities {
    /// PRODUCT-RELEASE text.
    pub product_release: String,
    /// The STATUS clause.
    pub status: Option<Status>,
    /// The DESCRIPTION clause.
    pub description: String,
    /// The REFERENCE clause.
    pub reference: Option<String>,
    /// SUPPORTS parts.
    pub supports: Vec<SupportedModule>,
}

/// An SNMP macro invocation used as a type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnmpMacroType {
    /// OBJECT-TYPE.
    ObjectType(Box<SnmpObjectType>),
    /// MODULE-IDENTITY.
    ModuleIdentity(Box<SnmpModuleIdentity>),
    /// OBJECT-IDENTITY.
    ObjectIdentity(SnmpObjectIdentity),
    /// NOTIFICATION-TYPE.
    NotificationType(Box<SnmpNotificationType>),
    /// TRAP-TYPE.
    TrapType(Box<SnmpTrapType>),
    /// TEXTUAL-CONVENTION.
    TextualConvention(Box<SnmpTextualConvention>),
    /// OBJECT-GROUP.
    ObjectGroup(SnmpObjectGroup),
    /// NOTIFICATION-GROUP.
    NotificationGroup(SnmpNotificationGroup),
    /// MODULE-COMPLIANCE.
    ModuleCompliance(Box<SnmpModuleCompliance>),
    /// AGENT-CAPABILITIES.
    AgentCapabilities(Box<SnmpAgentCapabilities>),
}

impl SnmpMacroType {
    /// Whether this macro kind exists only in SMIv2.
    #[must_use]
    pub fn is_smi_v2(&self) -> bool {
        !matches!(self, Self::TrapType(_))
    }
}

/// A MIB type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MibType {
    /// `INTEGER`, possibly constrained or enumerated.
    Integer {
        /// Value constraint.
        constraint: Option<Constraint>,
        /// Enumeration members.
        named: Vec<NamedNumber>,
    },
    /// `OCTET STRING`, possibly size-constrained.
    OctetString {
        /// Size constraint.
        size: Option<Constraint>,
    },
    /// `OBJECT IDENTIFIER`.
    ObjectIdentifier,
    /// ASN.1 `NULL`.
    Null,
    /// `BITS { ... }`.
    Bits {
        /// Named bits.
        named: Vec<NamedNumber>,
    },
    /// `SEQUENCE { ... }` (table row).
    Sequence {
        /// Field names and types.
        elements: Vec<(String, MibType)>,
    },
    /// `SEQUENCE OF ...` (table).
    SequenceOf {
        /// The row type.
        element: Box<MibType>,
        /// Optional size constraint.
        size: Option<Constraint>,
    },
    /// `CHOICE { ... }`.
    Choice {
        /// Alternative names and types.
        elements: Vec<(String, MibType)>,
    },
    /// A tagged type (`[APPLICATION 4] IMPLICIT ...`).
    Tagged {
        /// Tag class.
        class: TagClass,
        /// Tag number.
        number: u32,
        /// Whether the tag is IMPLICIT.
        implicit: bool,
        /// The underlying type.
        inner: Box<MibType>,
    },
    /// A reference to a type symbol, flattened by validate.
    Reference(TypeRef),
    /// An SNMP macro invocation.
    Snmp(SnmpMacroType),
}

impl MibType {
    /// A plain INTEGER.
    #[must_use]
    pub fn integer() -> Self {
        Self::Integer {
            constraint: None,
            named: Vec::new(),
        }
    }

    /// The effective type for value checks, looking through macro wrappers
    /// and tags.
    #[must_use]
    pub fn effective(&self) -> &MibType {
        match self {
            Self::Snmp(SnmpMacroType::ObjectType(o)) => o.syntax.effective(),
            Self::Snmp(SnmpMacroType::TextualConvention(tc)) => tc.syntax.effective(),
            Self::Tagged { inner, .. } => inner.effective(),
            other => other,
        }
    }

    /// Whether `value` is acceptable for this type. References that were
    /// never flattened are accepted leniently.
    #[must_use]
    pub fn is_compatible(&self, value: &MibValue) -> bool {
        match self.effective() {
            Self::Integer { constraint, named } => match value {
                MibValue::Number(n) => {
                    if let Some(c) = constraint {
                        c.ranges().iter().any(|r| r.contains(*n))
                    } else if named.is_empty() {
                        true
                    } else {
                        named.iter().any(|m| m.number == *n)
                    }
                }
                _ => false,
            },
            Self::OctetString { size } => match value {
                MibValue::Str(s) => match size {
                    Some(c) => {
                        let len = s.chars().count() as i64;
                        c.ranges().iter().any(|r| r.contains(len))
                    }
                    None => true,
                },
                // Hex and binary defaults surface as numbers.
                MibValue::Number(_) => true,
                _ => false,
            },
            Self::ObjectIdentifier => matches!(value, MibValue::Oid(_)),
            Self::Bits { named } => match value {
                MibValue::Bits(bits) => bits
                    .iter()
                    .all(|b| named.iter().any(|m| &m.name == b)),
                _ => false,
            },
            Self::Sequence { .. } | Self::SequenceOf { .. } | Self::Choice { .. } => false,
            // Unflattened references and remaining macro kinds: lenient.
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains() {
        let r = ValueRange {
            min: RangeBound::Number(0),
            max: RangeBound::Number(255),
        };
        assert!(r.contains(0));
        assert!(r.contains(255));
        assert!(!r.contains(-1));
        let open = ValueRange {
            min: RangeBound::Min,
            max: RangeBound::Max,
        };
        assert!(open.contains(i64::MIN));
    }

    #[test]
    fn test_integer_compatibility() {
        let ty = MibType::Integer {
            constraint: Some(Constraint::Value(alloc::vec![ValueRange {
                min: RangeBound::Number(1),
                max: RangeBound::Number(10),
            }])),
            named: Vec::new(),
        };
        assert!(ty.is_compatible(&MibValue::Number(5)));
        assert!(!ty.is_compatible(&MibValue::Number(11)));
    }

    #[test]
    fn test_enum_compatibility() {
        let ty = MibType::Integer {
            constraint: None,
            named: alloc::vec![NamedNumber {
                name: "up".into(),
                number: 1,
            }],
        };
        assert!(ty.is_compatible(&MibValue::Number(1)));
        assert!(!ty.is_compatible(&MibValue::Number(2)));
    }

    #[test]
    fn test_string_size_compatibility() {
        let ty = MibType::OctetString {
            size: Some(Constraint::Size(alloc::vec![ValueRange {
                min: RangeBound::Number(0),
                max: RangeBound::Number(3),
            }])),
        };
        assert!(ty.is_compatible(&MibValue::Str("abc".into())));
        assert!(!ty.is_compatible(&MibValue::Str("abcd".into())));
    }

    #[test]
    fn test_effective_unwraps_macro() {
        let ty = MibType::Snmp(SnmpMacroType::ObjectType(Box::new(SnmpObjectType {
            syntax: MibType::integer(),
            units: None,
            access: None,
            status: None,
            description: None,
            reference: None,
            index: Vec::new(),
            augments: None,
            defval: None,
        })));
        assert!(matches!(ty.effective(), MibType::Integer { .. }));
    }

    #[test]
    fn test_access_and_status_parse() {
        assert_eq!(Access::parse("read-only"), Some(Access::ReadOnly));
        assert_eq!(Access::parse("bogus"), None);
        assert_eq!(Status::parse("mandatory"), Some(Status::Mandatory));
    }
}
