//! Parse-tree analysis: building MIB modules.
//!
//! [`MibAnalyzer`] rides the parser's enter/exit/child callbacks. Each
//! production's exit handler folds the values attached to its children
//! into a value of its own, and the assignment-level handlers attach the
//! finished symbols to the module under construction. Names cited before
//! they are declared become unresolved [`ValueRef`]/[`TypeRef`] forms for
//! the loader's later passes.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use grammib_parse::{Analyzer, AnalyzerError, Node};

use super::grammar::{prod, token};
use crate::model::{
    Access, ComplianceItem, ComplianceModule, Constraint, IndexItem, Mib, MibImport, MibSymbol,
    MibType, MibValue, NamedNumber, OidComponent, RangeBound, Revision, SmiVersion,
    SnmpAgentCapabilities, SnmpMacroType, SnmpModuleCompliance, SnmpModuleIdentity,
    SnmpNotificationGroup, SnmpNotificationType, SnmpObjectGroup, SnmpObjectIdentity,
    SnmpObjectType, SnmpTextualConvention, SnmpTrapType, Status, SupportedModule, SymbolLocation,
    TagClass, TypeRef, TypeSymbol, ValueRange, ValueRef, ValueSymbol, Variation,
};
use crate::model::{MacroSymbol, SnmpMacroType as Macro};

/// Semantic value attached to parse-tree nodes.
#[derive(Clone, Debug)]
pub enum AsnValue {
    /// An identifier.
    Ident(String),
    /// A number.
    Number(i64),
    /// A quoted string (quotes stripped).
    Str(String),
    /// A type.
    Type(MibType),
    /// A value reference.
    Value(ValueRef),
    /// Brace-value contents read as OID components.
    Components(Vec<OidComponent>),
    /// Brace-value contents read as a comma-separated name list.
    NamedList(Vec<String>),
    /// One OID component.
    Component(OidComponent),
    /// A comma inside a brace value.
    Comma,
    /// A named number.
    NamedNumber(NamedNumber),
    /// A named-number block.
    NamedNumbers(Vec<NamedNumber>),
    /// A constraint.
    Constraint(Constraint),
    /// A value range.
    Range(ValueRange),
    /// A range bound.
    Bound(RangeBound),
    /// A SEQUENCE/CHOICE field.
    Field {
        /// Field name.
        name: String,
        /// Field type.
        ty: MibType,
    },
    /// A tag.
    Tag {
        /// Tag class.
        class: TagClass,
        /// Tag number.
        number: u32,
    },
    /// A tag class keyword.
    TagClassValue(TagClass),
    /// A symbol list.
    Symbols(Vec<String>),
    /// A STATUS clause.
    Status(Status),
    /// An ACCESS/MAX-ACCESS clause.
    Access(Access),
    /// A UNITS clause.
    Units(String),
    /// A DESCRIPTION clause.
    Description(String),
    /// A REFERENCE clause.
    Reference(String),
    /// A DISPLAY-HINT clause.
    DisplayHint(String),
    /// A SYNTAX clause.
    Syntax(MibType),
    /// A WRITE-SYNTAX clause.
    WriteSyntax(MibType),
    /// A DEFVAL clause.
    DefVal(ValueRef),
    /// An INDEX clause.
    Index(Vec<IndexItem>),
    /// One INDEX entry.
    IndexEntry(IndexItem),
    /// An AUGMENTS clause.
    Augments(String),
    /// An OBJECTS/NOTIFICATIONS/VARIABLES name list.
    Objects(Vec<String>),
    /// A plain name list.
    Names(Vec<String>),
    /// An ENTERPRISE clause.
    Enterprise(ValueRef),
    /// A PRODUCT-RELEASE clause.
    ProductRelease(String),
    /// A LAST-UPDATED clause.
    LastUpdated(String),
    /// An ORGANIZATION clause.
    Organization(String),
    /// A CONTACT-INFO clause.
    ContactInfo(String),
    /// A REVISION clause.
    Revision(Revision),
    /// A MODULE name inside MODULE-COMPLIANCE.
    ModuleName(String),
    /// A MANDATORY-GROUPS clause.
    MandatoryGroups(Vec<String>),
    /// A compliance GROUP/OBJECT refinement.
    ComplianceItem(ComplianceItem),
    /// A compliance MODULE part.
    ComplianceModule(ComplianceModule),
    /// A MIN-ACCESS clause.
    MinAccess(Access),
    /// An AGENT-CAPABILITIES SUPPORTS part.
    SupportedModule(SupportedModule),
    /// A VARIATION part.
    Variation(Variation),
    /// A CREATION-REQUIRES clause.
    CreationRequires(Vec<String>),
}

/// Collected child values with typed removal helpers.
struct Values(Vec<AsnValue>);

macro_rules! pull_fn {
    ($name:ident, $variant:ident, $ty:ty) => {
        fn $name(&mut self) -> Option<$ty> {
            let pos = self.0.iter().position(|v| matches!(v, AsnValue::$variant(_)))?;
            match self.0.remove(pos) {
                AsnValue::$variant(inner) => Some(inner),
                _ => None,
            }
        }
    };
}

impl Values {
    fn new(values: Vec<AsnValue>) -> Self {
        Self(values)
    }

    pull_fn!(ident, Ident, String);
    pull_fn!(number, Number, i64);
    pull_fn!(string, Str, String);
    pull_fn!(ty, Type, MibType);
    pull_fn!(value, Value, ValueRef);
    pull_fn!(components, Components, Vec<OidComponent>);
    pull_fn!(named_list, NamedList, Vec<String>);
    pull_fn!(named_numbers, NamedNumbers, Vec<NamedNumber>);
    pull_fn!(constraint, Constraint, Constraint);
    pull_fn!(status, Status, Status);
    pull_fn!(access, Access, Access);
    pull_fn!(units, Units, String);
    pull_fn!(description, Description, String);
    pull_fn!(reference, Reference, String);
    pull_fn!(display_hint, DisplayHint, String);
    pull_fn!(syntax, Syntax, MibType);
    pull_fn!(write_syntax, WriteSyntax, MibType);
    pull_fn!(defval, DefVal, ValueRef);
    pull_fn!(index, Index, Vec<IndexItem>);
    pull_fn!(augments, Augments, String);
    pull_fn!(objects, Objects, Vec<String>);
    pull_fn!(names, Names, Vec<String>);
    pull_fn!(enterprise, Enterprise, ValueRef);
    pull_fn!(product_release, ProductRelease, String);
    pull_fn!(last_updated, LastUpdated, String);
    pull_fn!(organization, Organization, String);
    pull_fn!(contact_info, ContactInfo, String);
    pull_fn!(module_name, ModuleName, String);
    pull_fn!(mandatory_groups, MandatoryGroups, Vec<String>);
    pull_fn!(min_access, MinAccess, Access);
    pull_fn!(creation_requires, CreationRequires, Vec<String>);

    /// Every remaining identifier, in order.
    fn idents(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(i) = self.ident() {
            out.push(i);
        }
        out
    }

    fn revisions(&mut self) -> Vec<Revision> {
        let mut out = Vec::new();
        self.0.retain(|v| {
            if let AsnValue::Revision(r) = v {
                out.push(r.clone());
                false
            } else {
                true
            }
        });
        out
    }

    fn ranges(&mut self) -> Vec<ValueRange> {
        let mut out = Vec::new();
        self.0.retain(|v| {
            if let AsnValue::Range(r) = v {
                out.push(*r);
                false
            } else {
                true
            }
        });
        out
    }

    fn named_number_items(&mut self) -> Vec<NamedNumber> {
        let mut out = Vec::new();
        self.0.retain(|v| {
            if let AsnValue::NamedNumber(n) = v {
                out.push(n.clone());
                false
            } else {
                true
            }
        });
        out
    }

    fn fields(&mut self) -> Vec<(String, MibType)> {
        let mut out = Vec::new();
        self.0.retain(|v| {
            if let AsnValue::Field { name, ty } = v {
                out.push((name.clone(), ty.clone()));
                false
            } else {
                true
            }
        });
        out
    }

    fn index_entries(&mut self) -> Vec<IndexItem> {
        let mut out = Vec::new();
        self.0.retain(|v| {
            if let AsnValue::IndexEntry(i) = v {
                out.push(i.clone());
                false
            } else {
                true
            }
        });
        out
    }

    fn compliance_items(&mut self) -> Vec<ComplianceItem> {
        let mut out = Vec::new();
        self.0.retain(|v| {
            if let AsnValue::ComplianceItem(i) = v {
                out.push(i.clone());
                false
            } else {
                true
            }
        });
        out
    }

    fn compliance_modules(&mut self) -> Vec<ComplianceModule> {
        let mut out = Vec::new();
        self.0.retain(|v| {
            if let AsnValue::ComplianceModule(m) = v {
                out.push(m.clone());
                false
            } else {
                true
            }
        });
        out
    }

    fn supported_modules(&mut self) -> Vec<SupportedModule> {
        let mut out = Vec::new();
        self.0.retain(|v| {
            if let AsnValue::SupportedModule(m) = v {
                out.push(m.clone());
                false
            } else {
                true
            }
        });
        out
    }

    fn variations(&mut self) -> Vec<Variation> {
        let mut out = Vec::new();
        self.0.retain(|v| {
            if let AsnValue::Variation(x) = v {
                out.push(x.clone());
                false
            } else {
                true
            }
        });
        out
    }

    fn tag(&mut self) -> Option<(TagClass, u32)> {
        let pos = self
            .0
            .iter()
            .position(|v| matches!(v, AsnValue::Tag { .. }))?;
        match self.0.remove(pos) {
            AsnValue::Tag { class, number } => Some((class, number)),
            _ => None,
        }
    }

    fn tag_class(&mut self) -> Option<TagClass> {
        let pos = self
            .0
            .iter()
            .position(|v| matches!(v, AsnValue::TagClassValue(_)))?;
        match self.0.remove(pos) {
            AsnValue::TagClassValue(c) => Some(c),
            _ => None,
        }
    }

    fn has_comma(&self) -> bool {
        self.0.iter().any(|v| matches!(v, AsnValue::Comma))
    }

    fn component_items(&mut self) -> Vec<OidComponent> {
        let mut out = Vec::new();
        self.0.retain(|v| {
            if let AsnValue::Component(c) = v {
                out.push(c.clone());
                false
            } else {
                true
            }
        });
        out
    }
}

/// Builds [`Mib`] modules from parse-tree callbacks.
pub struct MibAnalyzer {
    file: Option<String>,
    mibs: Vec<Mib>,
}

impl MibAnalyzer {
    /// Create an analyzer; `file` is recorded on every module built.
    #[must_use]
    pub fn new(file: Option<String>) -> Self {
        Self {
            file,
            mibs: Vec::new(),
        }
    }

    /// The modules built so far, in source order.
    #[must_use]
    pub fn into_mibs(self) -> Vec<Mib> {
        self.mibs
    }

    fn current(&mut self) -> &mut Mib {
        if self.mibs.is_empty() {
            // Error recovery may reach assignments before any module
            // header was accepted.
            let mut mib = Mib::new("");
            mib.file = self.file.clone();
            self.mibs.push(mib);
        }
        let last = self.mibs.len() - 1;
        &mut self.mibs[last]
    }

    fn bump_v2(&mut self) {
        self.current().smi_version = SmiVersion::V2;
    }

    fn location(node: &Node<AsnValue>) -> SymbolLocation {
        SymbolLocation {
            line: node.start_line().unwrap_or(0),
            column: node.start_column().unwrap_or(0),
        }
    }

    fn has_token(node: &Node<AsnValue>, id: usize) -> bool {
        node.children()
            .iter()
            .any(|c| c.token_ref().is_some_and(|t| t.id == id))
    }

    fn child_token_id(node: &Node<AsnValue>, index: usize) -> Option<usize> {
        node.child(index).and_then(|c| c.token_ref()).map(|t| t.id)
    }

    fn exit_token(node: &mut Node<AsnValue>) -> Result<(), AnalyzerError> {
        let Some(tok) = node.token_ref() else {
            return Ok(());
        };
        let value = match tok.id {
            token::IDENT => Some(AsnValue::Ident(tok.image.clone())),
            token::NUMBER => Some(AsnValue::Number(parse_number(&tok.image)?)),
            token::QUOTED => {
                let inner = tok
                    .image
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
                    .unwrap_or(&tok.image);
                Some(AsnValue::Str(inner.to_string()))
            }
            token::BIN_STRING => Some(AsnValue::Number(parse_based(&tok.image, 2)?)),
            token::HEX_STRING => Some(AsnValue::Number(parse_based(&tok.image, 16)?)),
            _ => None,
        };
        if let Some(value) = value {
            node.add_value(value);
        }
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn exit_production(&mut self, node: &mut Node<AsnValue>) -> Result<bool, AnalyzerError> {
        let location = Self::location(node);
        let mut v = Values::new(node.take_child_values());
        match node.id() {
            prod::MODULE_IDENTIFIER => {
                if let Some(name) = v.ident() {
                    let mut mib = Mib::new(name);
                    mib.file = self.file.clone();
                    self.mibs.push(mib);
                }
            }
            prod::SYMBOL => {
                // Either a plain identifier or a macro keyword acting as one.
                let name = v.ident().or_else(|| {
                    node.child(0)
                        .and_then(|c| c.token_ref())
                        .map(|t| t.image.clone())
                });
                if let Some(name) = name {
                    node.add_value(AsnValue::Ident(name));
                }
            }
            prod::SYMBOL_LIST => {
                node.add_value(AsnValue::Symbols(v.idents()));
            }
            prod::SYMBOLS_FROM => {
                // Children: the symbol list, FROM, then the module name.
                let symbols = match v.0.iter().position(|x| matches!(x, AsnValue::Symbols(_))) {
                    Some(pos) => match v.0.remove(pos) {
                        AsnValue::Symbols(s) => s,
                        _ => Vec::new(),
                    },
                    None => Vec::new(),
                };
                if let Some(module) = v.ident() {
                    if module.starts_with("SNMPv2-") {
                        self.bump_v2();
                    }
                    self.current().add_import(MibImport {
                        module,
                        symbols,
                        resolved: None,
                        location,
                    });
                }
            }
            prod::MACRO_DEFINITION => {
                if let Some(name) = v.ident() {
                    self.current()
                        .add_symbol(MibSymbol::Macro(MacroSymbol { name, location }));
                }
            }
            prod::TYPE_ASSIGNMENT => {
                if let (Some(name), Some(ty)) = (v.ident(), v.ty()) {
                    if matches!(&ty, MibType::Snmp(m) if m.is_smi_v2()) {
                        self.bump_v2();
                    }
                    self.current()
                        .add_symbol(MibSymbol::Type(TypeSymbol { name, location, ty }));
                }
            }
            prod::VALUE_ASSIGNMENT => {
                let name = v.ident();
                let ty = v.ty();
                let value = v.value();
                if let (Some(name), Some(ty), Some(value)) = (name, ty, value) {
                    match &ty {
                        MibType::Snmp(m) if m.is_smi_v2() => self.bump_v2(),
                        _ => {}
                    }
                    self.current().add_symbol(MibSymbol::Value(ValueSymbol {
                        name,
                        location,
                        ty,
                        value,
                    }));
                }
            }
            prod::TYPE | prod::COMPLIANCE_PART | prod::CONSTRAINT => {
                // Pass-through wrappers.
                node.values_mut().append(&mut v.0);
            }
            prod::TAGGED_TYPE => {
                let implicit = Self::has_token(node, token::IMPLICIT);
                if let (Some((class, number)), Some(inner)) = (v.tag(), v.ty()) {
                    node.add_value(AsnValue::Type(MibType::Tagged {
                        class,
                        number,
                        implicit,
                        inner: alloc::boxed::Box::new(inner),
                    }));
                }
            }
            prod::TAG => {
                let class = v.tag_class().unwrap_or(TagClass::Context);
                if let Some(number) = v.number() {
                    node.add_value(AsnValue::Tag {
                        class,
                        number: number.max(0) as u32,
                    });
                }
            }
            prod::TAG_CLASS => {
                let class = match Self::child_token_id(node, 0) {
                    Some(token::UNIVERSAL) => TagClass::Universal,
                    Some(token::APPLICATION) => TagClass::Application,
                    Some(token::PRIVATE) => TagClass::Private,
                    _ => TagClass::Context,
                };
                node.add_value(AsnValue::TagClassValue(class));
            }
            prod::INTEGER_TYPE => {
                let named = v.named_numbers().unwrap_or_default();
                let constraint = v.constraint();
                node.add_value(AsnValue::Type(MibType::Integer { constraint, named }));
            }
            prod::NAMED_NUMBER_BLOCK => {
                node.add_value(AsnValue::NamedNumbers(v.named_number_items()));
            }
            prod::NAMED_NUMBER => {
                if let (Some(name), Some(number)) = (v.ident(), v.number()) {
                    node.add_value(AsnValue::NamedNumber(NamedNumber { name, number }));
                }
            }
            prod::STRING_TYPE => {
                node.add_value(AsnValue::Type(MibType::OctetString { size: v.constraint() }));
            }
            prod::OBJECT_ID_TYPE => {
                node.add_value(AsnValue::Type(MibType::ObjectIdentifier));
            }
            prod::SEQUENCE_TYPE => {
                node.add_value(AsnValue::Type(MibType::Sequence { elements: v.fields() }));
            }
            prod::ELEMENT_TYPE => {
                if let (Some(name), Some(ty)) = (v.ident(), v.ty()) {
                    node.add_value(AsnValue::Field { name, ty });
                }
            }
            prod::SEQUENCE_OF_TYPE => {
                let size = v.constraint();
                if let Some(element) = v.ty() {
                    node.add_value(AsnValue::Type(MibType::SequenceOf {
                        element: alloc::boxed::Box::new(element),
                        size,
                    }));
                }
            }
            prod::CHOICE_TYPE => {
                node.add_value(AsnValue::Type(MibType::Choice { elements: v.fields() }));
            }
            prod::BITS_TYPE => {
                let named = v.named_numbers().unwrap_or_default();
                node.add_value(AsnValue::Type(MibType::Bits { named }));
            }
            prod::DEFINED_TYPE => {
                // With a module qualifier the first identifier is the
                // module, the second the type.
                let first = v.ident();
                let second = v.ident();
                let (module, name) = match (first, second) {
                    (Some(m), Some(n)) => (Some(m), n),
                    (Some(n), None) => (None, n),
                    _ => return Ok(true),
                };
                node.add_value(AsnValue::Type(MibType::Reference(TypeRef {
                    module,
                    name,
                    constraint: v.constraint(),
                    named: v.named_numbers(),
                })));
            }
            prod::SIZE_CONSTRAINT => {
                if let Some(Constraint::Value(ranges)) = v.constraint() {
                    node.add_value(AsnValue::Constraint(Constraint::Size(ranges)));
                }
            }
            prod::RANGE_LIST => {
                node.add_value(AsnValue::Constraint(Constraint::Value(v.ranges())));
            }
            prod::RANGE => {
                let bounds: Vec<RangeBound> = {
                    let mut out = Vec::new();
                    v.0.retain(|x| {
                        if let AsnValue::Bound(b) = x {
                            out.push(*b);
                            false
                        } else {
                            true
                        }
                    });
                    out
                };
                match bounds.as_slice() {
                    [single] => node.add_value(AsnValue::Range(ValueRange {
                        min: *single,
                        max: *single,
                    })),
                    [min, max, ..] => node.add_value(AsnValue::Range(ValueRange {
                        min: *min,
                        max: *max,
                    })),
                    [] => {}
                }
            }
            prod::RANGE_VALUE => {
                let bound = match Self::child_token_id(node, 0) {
                    Some(token::MIN) => Some(RangeBound::Min),
                    Some(token::MAX) => Some(RangeBound::Max),
                    _ => v.number().map(RangeBound::Number),
                };
                if let Some(bound) = bound {
                    node.add_value(AsnValue::Bound(bound));
                }
            }
            prod::VALUE => {
                let value = if let Some(n) = v.number() {
                    Some(ValueRef::Resolved(MibValue::Number(n)))
                } else if let Some(s) = v.string() {
                    Some(ValueRef::Resolved(MibValue::Str(s)))
                } else if let Some(name) = v.ident() {
                    Some(ValueRef::Name(name))
                } else if let Some(names) = v.named_list() {
                    Some(ValueRef::Resolved(MibValue::Bits(names)))
                } else {
                    v.components().map(ValueRef::OidPath)
                };
                if let Some(value) = value {
                    node.add_value(AsnValue::Value(value));
                }
            }
            prod::BRACE_VALUE => {
                let has_comma = v.has_comma();
                let components = v.component_items();
                if has_comma && components.iter().all(|c| c.number.is_none()) {
                    let names = components.into_iter().filter_map(|c| c.name).collect();
                    node.add_value(AsnValue::NamedList(names));
                } else {
                    node.add_value(AsnValue::Components(components));
                }
            }
            prod::BRACE_ITEM => {
                if Self::child_token_id(node, 0) == Some(token::COMMA) {
                    node.add_value(AsnValue::Comma);
                } else if let Some(name) = v.ident() {
                    let component = match v.number() {
                        Some(n) => OidComponent::named_number(name, check_sub_id(n)?),
                        None => OidComponent::name(name),
                    };
                    node.add_value(AsnValue::Component(component));
                } else if let Some(n) = v.number() {
                    node.add_value(AsnValue::Component(OidComponent::number(check_sub_id(n)?)));
                }
            }
            prod::SNMP_MODULE_IDENTITY => {
                self.bump_v2();
                node.add_value(AsnValue::Type(MibType::Snmp(Macro::ModuleIdentity(
                    alloc::boxed::Box::new(SnmpModuleIdentity {
                        last_updated: v.last_updated().unwrap_or_default(),
                        organization: v.organization().unwrap_or_default(),
                        contact_info: v.contact_info().unwrap_or_default(),
                        description: v.description().unwrap_or_default(),
                        revisions: v.revisions(),
                    }),
                ))));
            }
            prod::SNMP_OBJECT_IDENTITY => {
                node.add_value(AsnValue::Type(MibType::Snmp(Macro::ObjectIdentity(
                    SnmpObjectIdentity {
                        status: v.status(),
                        description: v.description().unwrap_or_default(),
                        reference: v.reference(),
                    },
                ))));
            }
            prod::SNMP_OBJECT_TYPE => {
                node.add_value(AsnValue::Type(MibType::Snmp(Macro::ObjectType(
                    alloc::boxed::Box::new(SnmpObjectType {
                        syntax: v.syntax().unwrap_or_else(MibType::integer),
                        units: v.units(),
                        access: v.access(),
                        status: v.status(),
                        description: v.description(),
                        reference: v.reference(),
                        index: v.index().unwrap_or_default(),
                        augments: v.augments(),
                        defval: v.defval(),
                    }),
                ))));
            }
            prod::SNMP_NOTIFICATION_TYPE => {
                node.add_value(AsnValue::Type(MibType::Snmp(Macro::NotificationType(
                    alloc::boxed::Box::new(SnmpNotificationType {
                        objects: v.objects().unwrap_or_default(),
                        status: v.status(),
                        description: v.description().unwrap_or_default(),
                        reference: v.reference(),
                    }),
                ))));
            }
            prod::SNMP_TRAP_TYPE => {
                node.add_value(AsnValue::Type(MibType::Snmp(Macro::TrapType(
                    alloc::boxed::Box::new(SnmpTrapType {
                        enterprise: v
                            .enterprise()
                            .unwrap_or(ValueRef::Resolved(MibValue::Number(0))),
                        variables: v.objects().unwrap_or_default(),
                        description: v.description(),
                        reference: v.reference(),
                    }),
                ))));
            }
            prod::SNMP_TEXTUAL_CONVENTION => {
                node.add_value(AsnValue::Type(MibType::Snmp(Macro::TextualConvention(
                    alloc::boxed::Box::new(SnmpTextualConvention {
                        display_hint: v.display_hint(),
                        status: v.status(),
                        description: v.description().unwrap_or_default(),
                        reference: v.reference(),
                        syntax: v.syntax().unwrap_or_else(MibType::integer),
                    }),
                ))));
            }
            prod::SNMP_OBJECT_GROUP => {
                node.add_value(AsnValue::Type(MibType::Snmp(Macro::ObjectGroup(
                    SnmpObjectGroup {
                        objects: v.objects().unwrap_or_default(),
                        status: v.status(),
                        description: v.description().unwrap_or_default(),
                        reference: v.reference(),
                    },
                ))));
            }
            prod::SNMP_NOTIFICATION_GROUP => {
                node.add_value(AsnValue::Type(MibType::Snmp(Macro::NotificationGroup(
                    SnmpNotificationGroup {
                        notifications: v.objects().unwrap_or_default(),
                        status: v.status(),
                        description: v.description().unwrap_or_default(),
                        reference: v.reference(),
                    },
                ))));
            }
            prod::SNMP_MODULE_COMPLIANCE => {
                node.add_value(AsnValue::Type(MibType::Snmp(Macro::ModuleCompliance(
                    alloc::boxed::Box::new(SnmpModuleCompliance {
                        status: v.status(),
                        description: v.description().unwrap_or_default(),
                        reference: v.reference(),
                        modules: v.compliance_modules(),
                    }),
                ))));
            }
            prod::SNMP_AGENT_CAPABILITIES => {
                node.add_value(AsnValue::Type(MibType::Snmp(Macro::AgentCapabilities(
                    alloc::boxed::Box::new(SnmpAgentCapabilities {
                        product_release: v.product_release().unwrap_or_default(),
                        status: v.status(),
                        description: v.description().unwrap_or_default(),
                        reference: v.reference(),
                        supports: v.supported_modules(),
                    }),
                ))));
            }
            prod::SYNTAX_PART => {
                if let Some(ty) = v.ty() {
                    node.add_value(AsnValue::Syntax(ty));
                }
            }
            prod::WRITE_SYNTAX_PART => {
                if let Some(ty) = v.ty() {
                    node.add_value(AsnValue::WriteSyntax(ty));
                }
            }
            prod::UNITS_PART => {
                if let Some(s) = v.string() {
                    node.add_value(AsnValue::Units(s));
                }
            }
            prod::ACCESS_PART => {
                if let Some(word) = v.ident() {
                    let access = Access::parse(&word).ok_or_else(|| {
                        AnalyzerError::new(alloc::format!("unknown access \"{word}\""))
                    })?;
                    node.add_value(AsnValue::Access(access));
                }
            }
            prod::MIN_ACCESS_PART => {
                if let Some(word) = v.ident() {
                    let access = Access::parse(&word).ok_or_else(|| {
                        AnalyzerError::new(alloc::format!("unknown access \"{word}\""))
                    })?;
                    node.add_value(AsnValue::MinAccess(access));
                }
            }
            prod::STATUS_PART => {
                if let Some(word) = v.ident() {
                    let status = Status::parse(&word).ok_or_else(|| {
                        AnalyzerError::new(alloc::format!("unknown status \"{word}\""))
                    })?;
                    node.add_value(AsnValue::Status(status));
                }
            }
            prod::DESCR_PART => {
                if let Some(s) = v.string() {
                    node.add_value(AsnValue::Description(s));
                }
            }
            prod::REFER_PART => {
                if let Some(s) = v.string() {
                    node.add_value(AsnValue::Reference(s));
                }
            }
            prod::DISPLAY_PART => {
                if let Some(s) = v.string() {
                    node.add_value(AsnValue::DisplayHint(s));
                }
            }
            prod::INDEX_PART => {
                if let Some(items) = v.index() {
                    node.add_value(AsnValue::Index(items));
                } else if let Some(row) = v.ident() {
                    node.add_value(AsnValue::Augments(row));
                }
            }
            prod::INDEX_LIST => {
                node.add_value(AsnValue::Index(v.index_entries()));
            }
            prod::INDEX_ITEM => {
                if let Some(name) = v.ident() {
                    node.add_value(AsnValue::IndexEntry(IndexItem {
                        implied: Self::has_token(node, token::IMPLIED),
                        name,
                    }));
                }
            }
            prod::DEFVAL_PART => {
                if let Some(value) = v.value() {
                    node.add_value(AsnValue::DefVal(value));
                }
            }
            prod::OBJECTS_PART | prod::NOTIFICATIONS_PART | prod::VARIABLES_PART => {
                if let Some(names) = v.names() {
                    node.add_value(AsnValue::Objects(names));
                }
            }
            prod::NAME_LIST => {
                node.add_value(AsnValue::Names(v.idents()));
            }
            prod::ENTERPRISE_PART => {
                if let Some(value) = v.value() {
                    node.add_value(AsnValue::Enterprise(value));
                }
            }
            prod::PRODUCT_RELEASE_PART => {
                if let Some(s) = v.string() {
                    node.add_value(AsnValue::ProductRelease(s));
                }
            }
            prod::LAST_UPDATED_PART => {
                if let Some(s) = v.string() {
                    node.add_value(AsnValue::LastUpdated(s));
                }
            }
            prod::ORGANIZATION_PART => {
                if let Some(s) = v.string() {
                    node.add_value(AsnValue::Organization(s));
                }
            }
            prod::CONTACT_PART => {
                if let Some(s) = v.string() {
                    node.add_value(AsnValue::ContactInfo(s));
                }
            }
            prod::REVISION_PART => {
                if let (Some(date), Some(description)) = (v.string(), v.description()) {
                    node.add_value(AsnValue::Revision(Revision { date, description }));
                }
            }
            prod::MODULE_NAME_PART => {
                if let Some(name) = v.ident() {
                    node.add_value(AsnValue::ModuleName(name));
                }
            }
            prod::MANDATORY_PART => {
                if let Some(names) = v.names() {
                    node.add_value(AsnValue::MandatoryGroups(names));
                }
            }
            prod::COMPLIANCE_GROUP => {
                if let Some(name) = v.ident() {
                    node.add_value(AsnValue::ComplianceItem(ComplianceItem {
                        group: true,
                        name,
                        syntax: None,
                        write_syntax: None,
                        min_access: None,
                        description: v.description(),
                    }));
                }
            }
            prod::COMPLIANCE_OBJECT => {
                if let Some(name) = v.ident() {
                    node.add_value(AsnValue::ComplianceItem(ComplianceItem {
                        group: false,
                        name,
                        syntax: v.syntax(),
                        write_syntax: v.write_syntax(),
                        min_access: v.min_access(),
                        description: v.description(),
                    }));
                }
            }
            prod::MODULE_PART => {
                node.add_value(AsnValue::ComplianceModule(ComplianceModule {
                    name: v.module_name(),
                    mandatory_groups: v.mandatory_groups().unwrap_or_default(),
                    items: v.compliance_items(),
                }));
            }
            prod::MODULE_SUPPORT_PART => {
                if let Some(name) = v.ident() {
                    node.add_value(AsnValue::SupportedModule(SupportedModule {
                        name,
                        includes: v.names().unwrap_or_default(),
                        variations: v.variations(),
                    }));
                }
            }
            prod::VARIATION_PART => {
                if let Some(name) = v.ident() {
                    node.add_value(AsnValue::Variation(Variation {
                        name,
                        syntax: v.syntax(),
                        write_syntax: v.write_syntax(),
                        access: v.access(),
                        creation_requires: v.creation_requires().unwrap_or_default(),
                        defval: v.defval(),
                        description: v.description(),
                    }));
                }
            }
            prod::CREATION_PART => {
                if let Some(names) = v.names() {
                    node.add_value(AsnValue::CreationRequires(names));
                }
            }
            // Structure-only productions contribute nothing upward.
            _ => {}
        }
        Ok(true)
    }
}

impl Analyzer<AsnValue> for MibAnalyzer {
    fn exit(&mut self, node: &mut Node<AsnValue>) -> Result<bool, AnalyzerError> {
        if node.is_token() {
            Self::exit_token(node)?;
            return Ok(true);
        }
        self.exit_production(node)
    }
}

/// Parse a decimal literal, saturating values beyond `i64` (Counter64
/// ranges reach 2^64-1).
fn parse_number(image: &str) -> Result<i64, AnalyzerError> {
    if let Ok(n) = image.parse::<i64>() {
        return Ok(n);
    }
    if image.parse::<u64>().is_ok() {
        return Ok(i64::MAX);
    }
    Err(AnalyzerError::new(alloc::format!(
        "invalid number \"{image}\""
    )))
}

/// Parse a `'...'B` or `'...'H` literal: the digits sit between the
/// quotes.
fn parse_based(image: &str, radix: u32) -> Result<i64, AnalyzerError> {
    let inner = match (image.find('\''), image.rfind('\'')) {
        (Some(start), Some(end)) if end > start => &image[start + 1..end],
        _ => "",
    };
    if inner.is_empty() {
        return Ok(0);
    }
    match u64::from_str_radix(inner, radix) {
        Ok(n) => Ok(i64::try_from(n).unwrap_or(i64::MAX)),
        Err(_) => Err(AnalyzerError::new(alloc::format!(
            "invalid based literal \"{image}\""
        ))),
    }
}

/// Validate an OID sub-identifier.
fn check_sub_id(n: i64) -> Result<u32, AnalyzerError> {
    u32::try_from(n)
        .map_err(|_| AnalyzerError::new(alloc::format!("invalid OID sub-identifier {n}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asn1::grammar::build_parser;

    fn analyze(text: &str) -> Vec<Mib> {
        let mut parser = build_parser(text).unwrap();
        let mut analyzer = MibAnalyzer::new(Some("test.mib".into()));
        parser.parse(&mut analyzer).unwrap();
        analyzer.into_mibs()
    }

    #[test]
    fn test_value_assignment() {
        let mibs = analyze(
            "TEST-MIB DEFINITIONS ::= BEGIN\n\
             testRoot OBJECT IDENTIFIER ::= { iso org(3) 42 }\n\
             END\n",
        );
        assert_eq!(mibs.len(), 1);
        let mib = &mibs[0];
        assert_eq!(mib.name, "TEST-MIB");
        assert_eq!(mib.symbols().len(), 1);
        let symbol = &mib.symbols()[0];
        assert_eq!(symbol.name(), "testRoot");
        let value = symbol.as_value().unwrap();
        match &value.value {
            ValueRef::OidPath(components) => {
                assert_eq!(components.len(), 3);
                assert_eq!(components[0].name.as_deref(), Some("iso"));
                assert_eq!(components[1].number, Some(3));
                assert_eq!(components[2].number, Some(42));
            }
            other => panic!("expected OID path, got {other:?}"),
        }
    }

    #[test]
    fn test_imports_recorded() {
        let mibs = analyze(
            "TEST-MIB DEFINITIONS ::= BEGIN\n\
             IMPORTS mgmt, OBJECT-TYPE FROM RFC1155-SMI\n\
                     DisplayString FROM RFC1213-MIB;\n\
             END\n",
        );
        let mib = &mibs[0];
        assert_eq!(mib.imports().len(), 2);
        assert_eq!(mib.imports()[0].module, "RFC1155-SMI");
        assert_eq!(mib.imports()[0].symbols, ["mgmt", "OBJECT-TYPE"]);
        assert_eq!(mib.imports()[1].symbols, ["DisplayString"]);
        assert_eq!(mib.smi_version, SmiVersion::V1);
    }

    #[test]
    fn test_object_type_clauses() {
        let mibs = analyze(
            "TEST-MIB DEFINITIONS ::= BEGIN\n\
             ifIndex OBJECT-TYPE\n\
                 SYNTAX INTEGER (1..65535)\n\
                 ACCESS read-only\n\
                 STATUS mandatory\n\
                 DESCRIPTION \"Interface index.\"\n\
                 ::= { ifEntry 1 }\n\
             END\n",
        );
        let symbol = mibs[0].symbols()[0].as_value().unwrap();
        let MibType::Snmp(SnmpMacroType::ObjectType(ot)) = &symbol.ty else {
            panic!("expected OBJECT-TYPE");
        };
        assert_eq!(ot.access, Some(Access::ReadOnly));
        assert_eq!(ot.status, Some(Status::Mandatory));
        assert_eq!(ot.description.as_deref(), Some("Interface index."));
        assert!(matches!(&ot.syntax, MibType::Integer { constraint: Some(_), .. }));
    }

    #[test]
    fn test_textual_convention_type_assignment() {
        let mibs = analyze(
            "TEST-MIB DEFINITIONS ::= BEGIN\n\
             DisplayString ::= TEXTUAL-CONVENTION\n\
                 DISPLAY-HINT \"255a\"\n\
                 STATUS current\n\
                 DESCRIPTION \"Textual information.\"\n\
                 SYNTAX OCTET STRING (SIZE (0..255))\n\
             END\n",
        );
        let mib = &mibs[0];
        assert_eq!(mib.smi_version, SmiVersion::V2);
        let ty = &mib.symbols()[0].as_type().unwrap().ty;
        let MibType::Snmp(SnmpMacroType::TextualConvention(tc)) = ty else {
            panic!("expected TEXTUAL-CONVENTION");
        };
        assert_eq!(tc.display_hint.as_deref(), Some("255a"));
        assert!(matches!(&tc.syntax, MibType::OctetString { size: Some(_) }));
    }

    #[test]
    fn test_trap_type_keeps_v1() {
        let mibs = analyze(
            "TEST-MIB DEFINITIONS ::= BEGIN\n\
             linkDown TRAP-TYPE\n\
                 ENTERPRISE snmp\n\
                 VARIABLES { ifIndex }\n\
                 DESCRIPTION \"Link went down.\"\n\
                 ::= 2\n\
             END\n",
        );
        let mib = &mibs[0];
        assert_eq!(mib.smi_version, SmiVersion::V1);
        let symbol = mib.symbols()[0].as_value().unwrap();
        assert_eq!(
            symbol.value,
            ValueRef::Resolved(MibValue::Number(2))
        );
        let MibType::Snmp(SnmpMacroType::TrapType(tt)) = &symbol.ty else {
            panic!("expected TRAP-TYPE");
        };
        assert_eq!(tt.variables, ["ifIndex"]);
    }

    #[test]
    fn test_defval_bits_list() {
        let mibs = analyze(
            "TEST-MIB DEFINITIONS ::= BEGIN\n\
             flags OBJECT-TYPE\n\
                 SYNTAX BITS { a(0), b(1) }\n\
                 MAX-ACCESS read-write\n\
                 STATUS current\n\
                 DESCRIPTION \"Flags.\"\n\
                 DEFVAL { { a, b } }\n\
                 ::= { testRoot 1 }\n\
             END\n",
        );
        let symbol = mibs[0].symbols()[0].as_value().unwrap();
        let MibType::Snmp(SnmpMacroType::ObjectType(ot)) = &symbol.ty else {
            panic!("expected OBJECT-TYPE");
        };
        assert_eq!(
            ot.defval,
            Some(ValueRef::Resolved(MibValue::Bits(alloc::vec![
                "a".into(),
                "b".into()
            ])))
        );
    }

    #[test]
    fn test_sequence_and_table() {
        let mibs = analyze(
            "TEST-MIB DEFINITIONS ::= BEGIN\n\
             IfEntry ::= SEQUENCE {\n\
                 ifIndex INTEGER,\n\
                 ifDescr DisplayString\n\
             }\n\
             ifTable OBJECT-TYPE\n\
                 SYNTAX SEQUENCE OF IfEntry\n\
                 ACCESS not-accessible\n\
                 STATUS mandatory\n\
                 DESCRIPTION \"Interface table.\"\n\
                 ::= { interfaces 2 }\n\
             END\n",
        );
        let mib = &mibs[0];
        let seq = &mib.symbols()[0].as_type().unwrap().ty;
        let MibType::Sequence { elements } = seq else {
            panic!("expected SEQUENCE");
        };
        assert_eq!(elements.len(), 2);
        assert!(matches!(&elements[1].1, MibType::Reference(r) if r.name == "DisplayString"));

        let table = &mib.symbols()[1].as_value().unwrap().ty;
        let MibType::Snmp(SnmpMacroType::ObjectType(ot)) = table else {
            panic!("expected OBJECT-TYPE");
        };
        assert!(matches!(&ot.syntax, MibType::SequenceOf { .. }));
    }

    #[test]
    fn test_unknown_status_is_an_error() {
        let mut parser = build_parser(
            "TEST-MIB DEFINITIONS ::= BEGIN\n\
             x OBJECT-TYPE\n\
                 SYNTAX INTEGER\n\
                 ACCESS read-only\n\
                 STATUS bogus\n\
                 ::= { y 1 }\n\
             END\n",
        )
        .unwrap();
        let mut analyzer = MibAnalyzer::new(None);
        let err = parser.parse(&mut analyzer).unwrap_err();
        assert!(err.errors().iter().any(|e| {
            alloc::format!("{e}").contains("unknown status")
        }));
    }
}
