//! MIB loading and linking.
//!
//! [`MibLoader`] orchestrates multi-module loading:
//!
//! 1. locate the source (configured locators, then the bundled modules)
//! 2. parse it, letting [`MibAnalyzer`] populate symbols and imports
//! 3. load every imported module the same way (modules are registered
//!    before their imports are chased, so circular imports terminate)
//! 4. run `initialize` over each newly loaded module in load order:
//!    imports are bound, each imported name is aliased to the concrete
//!    exporting symbol, and unresolved value references (OID paths and
//!    value names) are rewritten to concrete values
//! 5. run `validate` in the same order: type references are flattened,
//!    default values are checked against their syntax, and the value map
//!    is indexed
//!
//! Errors from every step are batched into a [`MibLoaderLog`]; a
//! non-empty log makes the load fail without discarding already-loaded
//! modules.

pub mod bundle;

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use alloc::collections::BTreeMap;
use core::fmt;

use grammib_parse::{ParseError, Token};

use crate::asn1::{self, MibAnalyzer};
use crate::asn1::grammar::token;
use crate::model::{
    Constraint, Mib, MibId, MibSymbol, MibType, MibValue, OidArena, OidComponent, OidDefinition,
    OidId, SnmpMacroType, SymbolLocation, SymbolRef, TypeRef, ValueRef, ValueSymbol,
};

#[cfg(feature = "tracing")]
use crate::trace::{Phase, TraceEvent, Tracer};

/// A located MIB source.
pub struct MibSource {
    /// The file the text came from, if any.
    pub file: Option<String>,
    /// The source text.
    pub text: String,
}

/// Finds MIB sources by module name or path.
pub trait ResourceLocator {
    /// Locate a source; `None` when this locator has no match.
    fn locate(&mut self, name: &str) -> Option<MibSource>;
}

/// One entry of a loader log.
#[derive(Clone, Debug)]
pub enum LoaderEntry {
    /// A lexical/syntactic error from parsing a file.
    Parse {
        /// The file being parsed.
        file: Option<String>,
        /// The underlying error.
        error: ParseError,
    },
    /// A semantic error from linking or validation.
    Semantic {
        /// The file the module came from.
        file: Option<String>,
        /// Source location within the file.
        location: SymbolLocation,
        /// Human-readable message.
        message: String,
    },
}

impl fmt::Display for LoaderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { file, error } => {
                if let Some(file) = file {
                    write!(f, "{file}: ")?;
                }
                write!(f, "{error}")
            }
            Self::Semantic {
                file,
                location,
                message,
            } => {
                if let Some(file) = file {
                    write!(f, "{file}: ")?;
                }
                if location.line > 0 {
                    write!(f, "line {}, column {}: ", location.line, location.column)?;
                }
                write!(f, "{message}")
            }
        }
    }
}

/// Batched errors from a load operation.
#[derive(Clone, Debug, Default)]
pub struct MibLoaderLog {
    entries: Vec<LoaderEntry>,
}

impl MibLoaderLog {
    /// The entries, in occurrence order.
    #[must_use]
    pub fn entries(&self) -> &[LoaderEntry] {
        &self.entries
    }

    /// Whether any error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn parse_error(&mut self, file: Option<&str>, error: ParseError) {
        self.entries.push(LoaderEntry::Parse {
            file: file.map(ToString::to_string),
            error,
        });
    }

    fn semantic(&mut self, file: Option<&str>, location: SymbolLocation, message: String) {
        self.entries.push(LoaderEntry::Semantic {
            file: file.map(ToString::to_string),
            location,
            message,
        });
    }
}

impl fmt::Display for MibLoaderLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} MIB loader error(s):", self.entries.len())?;
        for e in &self.entries {
            writeln!(f, "  {e}")?;
        }
        Ok(())
    }
}

/// A failed load, carrying the batched log.
#[derive(Clone, Debug)]
pub struct MibLoaderError {
    /// The accumulated errors.
    pub log: MibLoaderLog,
}

impl fmt::Display for MibLoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.log)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MibLoaderError {}

/// Loads and links MIB modules.
pub struct MibLoader {
    locators: Vec<Box<dyn ResourceLocator>>,
    mibs: Vec<Option<Mib>>,
    registry: BTreeMap<String, MibId>,
    arena: OidArena,
    /// Hidden module holding the OID forest roots (ccitt, iso,
    /// joint-iso-ccitt).
    builtin: Option<MibId>,
    log: MibLoaderLog,
    #[cfg(feature = "tracing")]
    tracer: Option<Box<dyn Tracer>>,
}

impl Default for MibLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MibLoader {
    /// Create a loader with the bundled standard modules available and the
    /// OID forest roots pre-registered.
    #[must_use]
    pub fn new() -> Self {
        let mut loader = Self {
            locators: Vec::new(),
            mibs: Vec::new(),
            registry: BTreeMap::new(),
            arena: OidArena::new(),
            builtin: None,
            log: MibLoaderLog::default(),
            #[cfg(feature = "tracing")]
            tracer: None,
        };
        loader.register_roots();
        loader
    }

    /// Install a trace sink receiving structured load events.
    #[cfg(feature = "tracing")]
    pub fn set_tracer(&mut self, tracer: Box<dyn Tracer>) {
        self.tracer = Some(tracer);
    }

    #[cfg(feature = "tracing")]
    fn trace(&mut self, event: TraceEvent<'_>) {
        if let Some(tracer) = self.tracer.as_mut() {
            tracer.trace(event);
        }
    }

    /// The well-known OID forest roots live in a hidden module so that
    /// `{ iso ... }` resolves before any standard module is loaded.
    fn register_roots(&mut self) {
        let mut builtin = Mib::new("");
        for (name, sub_id) in [("ccitt", 0u32), ("iso", 1), ("joint-iso-ccitt", 2)] {
            builtin.add_symbol(MibSymbol::Value(ValueSymbol {
                name: name.into(),
                location: SymbolLocation::default(),
                ty: MibType::ObjectIdentifier,
                value: ValueRef::OidPath(alloc::vec![OidComponent::number(sub_id)]),
            }));
        }
        let id = self.insert_mib(builtin);
        self.builtin = Some(id);
        self.initialize(id);
    }

    /// Append a resource locator; locators are tried in insertion order,
    /// before the bundled modules.
    pub fn add_locator(&mut self, locator: Box<dyn ResourceLocator>) {
        self.locators.push(locator);
    }

    /// The shared OID tree.
    #[must_use]
    pub fn arena(&self) -> &OidArena {
        &self.arena
    }

    /// Access a loaded module.
    #[must_use]
    pub fn mib(&self, id: MibId) -> Option<&Mib> {
        self.mibs.get(id.to_index()).and_then(Option::as_ref)
    }

    fn mib_mut(&mut self, id: MibId) -> Option<&mut Mib> {
        self.mibs.get_mut(id.to_index()).and_then(Option::as_mut)
    }

    /// Look up a loaded module by name.
    #[must_use]
    pub fn get_mib(&self, name: &str) -> Option<&Mib> {
        self.registry.get(name).and_then(|&id| self.mib(id))
    }

    /// Iterate over all loaded modules (excluding the hidden root module).
    pub fn all_mibs(&self) -> impl Iterator<Item = &Mib> {
        let builtin = self.builtin;
        self.mibs
            .iter()
            .filter_map(Option::as_ref)
            .filter(move |m| m.id() != builtin)
    }

    /// Resolve a symbol handle.
    #[must_use]
    pub fn symbol(&self, sref: SymbolRef) -> Option<&MibSymbol> {
        self.mib(sref.mib)?.symbols().get(sref.index)
    }

    /// Look up a symbol visible from `mib` (own, imported, or a forest
    /// root).
    #[must_use]
    pub fn symbol_in(&self, mib: MibId, name: &str) -> Option<&MibSymbol> {
        let sref = self.visible_ref(mib, name)?;
        self.symbol(sref)
    }

    fn visible_ref(&self, mib: MibId, name: &str) -> Option<SymbolRef> {
        if let Some(sref) = self.mib(mib).and_then(|m| m.symbol_ref(name)) {
            return Some(sref);
        }
        let builtin = self.builtin?;
        self.mib(builtin).and_then(|m| m.symbol_ref(name))
    }

    /// The topmost value symbol of a module: starting from its first OID
    /// value symbol, walk up the OID parent chain as long as the parent is
    /// also declared by this module.
    #[must_use]
    pub fn root_symbol(&self, id: MibId) -> Option<&ValueSymbol> {
        let mib = self.mib(id)?;
        let start = mib.symbols().iter().find_map(|s| {
            s.as_value()
                .and_then(|v| v.value.resolved())
                .and_then(MibValue::as_oid)
        })?;
        let mut node = start;
        loop {
            let parent = self.arena.node(node).and_then(|n| n.parent);
            match parent {
                Some(p)
                    if self
                        .arena
                        .node(p)
                        .is_some_and(|n| n.definitions().iter().any(|d| d.mib == id)) =>
                {
                    node = p;
                }
                _ => break,
            }
        }
        let def = self
            .arena
            .node(node)?
            .definitions()
            .iter()
            .find(|d| d.mib == id && d.symbol.is_some())?;
        let index = def.symbol?;
        mib.symbols().get(index).and_then(MibSymbol::as_value)
    }

    /// Load a module by name or path. Loading an already-loaded module
    /// returns the same instance without re-parsing.
    pub fn load(&mut self, name: &str) -> Result<MibId, MibLoaderError> {
        let result = self.load_inner(name, None);
        self.finish(result, name)
    }

    /// Load a module from explicit source text.
    pub fn load_text(&mut self, name: &str, text: &str) -> Result<MibId, MibLoaderError> {
        let result = self.load_inner(
            name,
            Some(MibSource {
                file: None,
                text: text.into(),
            }),
        );
        self.finish(result, name)
    }

    fn finish(
        &mut self,
        result: Option<MibId>,
        name: &str,
    ) -> Result<MibId, MibLoaderError> {
        if self.log.has_errors() {
            let log = core::mem::take(&mut self.log);
            return Err(MibLoaderError { log });
        }
        match result {
            Some(id) => Ok(id),
            None => {
                let mut log = MibLoaderLog::default();
                log.semantic(
                    None,
                    SymbolLocation::default(),
                    format!("couldn't locate a MIB named \"{name}\""),
                );
                Err(MibLoaderError { log })
            }
        }
    }

    fn load_inner(&mut self, name: &str, source: Option<MibSource>) -> Option<MibId> {
        if let Some(&id) = self.registry.get(name) {
            return Some(id);
        }
        let mut newly: Vec<MibId> = Vec::new();
        let source = match source {
            Some(s) => s,
            None => self.locate(name)?,
        };
        let first = self.parse_source(name, source, true, &mut newly)?;

        // Chase imports breadth-first. Modules register before their
        // imports are followed, so cyclic imports terminate.
        let mut cursor = 0;
        while cursor < newly.len() {
            let id = newly[cursor];
            cursor += 1;
            let wanted: Vec<(String, SymbolLocation)> = self
                .mib(id)
                .map(|m| {
                    m.imports()
                        .iter()
                        .map(|i| (i.module.clone(), i.location))
                        .collect()
                })
                .unwrap_or_default();
            let file = self.mib(id).and_then(|m| m.file.clone());
            for (module, location) in wanted {
                if self.registry.contains_key(&module) {
                    continue;
                }
                match self.locate(&module) {
                    Some(source) => {
                        self.parse_source(&module, source, false, &mut newly);
                    }
                    None => {
                        self.log.semantic(
                            file.as_deref(),
                            location,
                            format!("couldn't locate imported MIB \"{module}\""),
                        );
                    }
                }
            }
        }

        // Link in load order over the closed set.
        #[cfg(feature = "tracing")]
        self.trace(TraceEvent::PhaseStart {
            phase: Phase::Initialize,
        });
        for &id in &newly {
            self.initialize(id);
        }
        #[cfg(feature = "tracing")]
        self.trace(TraceEvent::PhaseEnd {
            phase: Phase::Initialize,
        });

        #[cfg(feature = "tracing")]
        self.trace(TraceEvent::PhaseStart {
            phase: Phase::Validate,
        });
        for &id in &newly {
            self.validate(id);
        }
        #[cfg(feature = "tracing")]
        self.trace(TraceEvent::PhaseEnd {
            phase: Phase::Validate,
        });

        Some(first)
    }

    fn locate(&mut self, name: &str) -> Option<MibSource> {
        for locator in &mut self.locators {
            if let Some(source) = locator.locate(name) {
                return Some(source);
            }
        }
        bundle::bundled(name).map(|text| MibSource {
            file: None,
            text: text.into(),
        })
    }

    /// Parse one source, register every module it contains, and return the
    /// first module's id.
    fn parse_source(
        &mut self,
        requested: &str,
        source: MibSource,
        explicit: bool,
        newly: &mut Vec<MibId>,
    ) -> Option<MibId> {
        let mut parser = match asn1::build_parser(&source.text) {
            Ok(p) => p,
            Err(e) => {
                self.log.semantic(
                    source.file.as_deref(),
                    SymbolLocation::default(),
                    format!("grammar error: {e}"),
                );
                return None;
            }
        };
        let mut analyzer = MibAnalyzer::new(source.file.clone());
        if let Err(errors) = parser.parse(&mut analyzer) {
            for error in errors.into_errors() {
                self.log.parse_error(source.file.as_deref(), error);
            }
        }
        let (header, footer) = split_comments(parser.tokenizer().token_list());
        let mut first = None;
        let mibs = analyzer.into_mibs();
        let count = mibs.len();
        for (i, mut mib) in mibs.into_iter().enumerate() {
            if i == 0 {
                mib.header_comment = header.clone();
                mib.loaded_explicitly = explicit;
            }
            if i + 1 == count {
                mib.footer_comment = footer.clone();
            }
            let name = mib.name.clone();
            let id = self.insert_mib(mib);
            #[cfg(feature = "tracing")]
            self.trace(TraceEvent::ModuleParsed { name: &name });
            self.registry.entry(name).or_insert(id);
            newly.push(id);
            if first.is_none() {
                first = Some(id);
                // Also register under the requested name so repeated loads
                // by path short-circuit.
                self.registry.entry(requested.into()).or_insert(id);
            }
        }
        if first.is_none() {
            self.log.semantic(
                source.file.as_deref(),
                SymbolLocation::default(),
                format!("no module found in source for \"{requested}\""),
            );
        }
        first
    }

    fn insert_mib(&mut self, mut mib: Mib) -> MibId {
        let index = self.mibs.len();
        let id = match MibId::from_index(index) {
            Some(id) => id,
            None => unreachable!("mib index overflow"),
        };
        mib.assign_id(id);
        self.mibs.push(Some(mib));
        id
    }

    // === Pass 2: initialize ===

    /// Bind imports and rewrite unresolved value references to concrete
    /// values. Idempotent.
    fn initialize(&mut self, id: MibId) {
        self.bind_imports(id);
        let count = self.mib(id).map_or(0, |m| m.symbols().len());
        for index in 0..count {
            let mut visiting = Vec::new();
            self.resolve_symbol_value(id, index, &mut visiting);
        }
    }

    fn bind_imports(&mut self, id: MibId) {
        let Some(mib) = self.mib(id) else { return };
        let file = mib.file.clone();
        let imports: Vec<(usize, String, Vec<String>, SymbolLocation)> = mib
            .imports()
            .iter()
            .enumerate()
            .map(|(i, imp)| (i, imp.module.clone(), imp.symbols.clone(), imp.location))
            .collect();
        for (i, module, symbols, location) in imports {
            let Some(&exporter) = self.registry.get(&module) else {
                // Missing modules were reported while chasing imports.
                continue;
            };
            if let Some(m) = self.mib_mut(id) {
                if let Some(imp) = m.imports_mut().get_mut(i) {
                    imp.resolved = Some(exporter);
                }
            }
            for symbol in symbols {
                let exported = self
                    .mib(exporter)
                    .and_then(|m| m.symbol_ref(&symbol))
                    .filter(|sref| sref.mib == exporter);
                match exported {
                    Some(sref) => {
                        #[cfg(feature = "tracing")]
                        self.trace(TraceEvent::ImportBound {
                            symbol: &symbol,
                            exporter: &module,
                        });
                        if let Some(m) = self.mib_mut(id) {
                            m.add_alias(symbol, sref);
                        }
                    }
                    // Well-known macro names need no concrete symbol; the
                    // grammar recognizes them directly.
                    None if is_macro_name(&symbol) => {}
                    None => {
                        self.log.semantic(
                            file.as_deref(),
                            location,
                            format!("symbol \"{symbol}\" is not defined in MIB \"{module}\""),
                        );
                    }
                }
            }
        }
    }

    /// Resolve one symbol's value in place, following value references
    /// recursively (the cited symbol may itself still be unresolved).
    fn resolve_symbol_value(
        &mut self,
        mib: MibId,
        index: usize,
        visiting: &mut Vec<(MibId, usize)>,
    ) -> Option<MibValue> {
        let (value, name, location) = {
            let m = self.mib(mib)?;
            let symbol = m.symbols().get(index)?;
            let value_symbol = symbol.as_value()?;
            (
                value_symbol.value.clone(),
                value_symbol.name.clone(),
                value_symbol.location,
            )
        };
        if let ValueRef::Resolved(v) = value {
            return Some(v);
        }
        if visiting.contains(&(mib, index)) {
            let file = self.mib(mib).and_then(|m| m.file.clone());
            self.log.semantic(
                file.as_deref(),
                location,
                format!("circular value reference through \"{name}\""),
            );
            return None;
        }
        visiting.push((mib, index));
        let resolved = match value {
            ValueRef::Name(ref target) => self.resolve_named_value(mib, target, location, visiting),
            ValueRef::OidPath(ref components) => {
                self.resolve_oid_path(mib, &name, components, location, visiting)
            }
            ValueRef::Resolved(v) => Some(v),
        };
        visiting.pop();

        if let Some(resolved) = &resolved {
            if let Some(m) = self.mib_mut(mib) {
                if let Some(MibSymbol::Value(vs)) = m.symbols_mut().get_mut(index) {
                    vs.value = ValueRef::Resolved(resolved.clone());
                }
            }
            if let MibValue::Oid(node) = resolved {
                self.arena.add_definition(
                    *node,
                    OidDefinition {
                        mib,
                        symbol: Some(index),
                        name,
                    },
                );
            }
        }
        resolved
    }

    fn resolve_named_value(
        &mut self,
        mib: MibId,
        target: &str,
        location: SymbolLocation,
        visiting: &mut Vec<(MibId, usize)>,
    ) -> Option<MibValue> {
        match self.visible_ref(mib, target) {
            Some(sref) => self.resolve_symbol_value(sref.mib, sref.index, visiting),
            None => {
                let file = self.mib(mib).and_then(|m| m.file.clone());
                self.log.semantic(
                    file.as_deref(),
                    location,
                    format!("undefined symbol \"{target}\""),
                );
                None
            }
        }
    }

    /// Resolve an OID component path to a tree node, creating nodes as
    /// needed.
    fn resolve_oid_path(
        &mut self,
        mib: MibId,
        owner: &str,
        components: &[OidComponent],
        location: SymbolLocation,
        visiting: &mut Vec<(MibId, usize)>,
    ) -> Option<MibValue> {
        let file = self.mib(mib).and_then(|m| m.file.clone());
        let mut node: Option<OidId> = None;
        for component in components {
            let next = match (component.name.as_deref(), component.number, node) {
                // Leading name: the value of another OID symbol.
                (Some(name), number, None) => match self.visible_ref(mib, name) {
                    Some(sref) => {
                        match self.resolve_symbol_value(sref.mib, sref.index, visiting) {
                            Some(MibValue::Oid(id)) => Some(id),
                            Some(_) => {
                                self.log.semantic(
                                    file.as_deref(),
                                    location,
                                    format!(
                                        "\"{name}\" in the OID of \"{owner}\" is not an object identifier"
                                    ),
                                );
                                None
                            }
                            None => None,
                        }
                    }
                    None => match number {
                        // Unknown name with an explicit number: usable.
                        Some(n) => Some(self.arena.root(n)),
                        None => {
                            self.log.semantic(
                                file.as_deref(),
                                location,
                                format!("undefined symbol \"{name}\" in the OID of \"{owner}\""),
                            );
                            None
                        }
                    },
                },
                (None, Some(n), None) => Some(self.arena.root(n)),
                (name, Some(n), Some(parent)) => {
                    let child = self.arena.child(parent, n);
                    if let Some(name) = name {
                        self.arena.add_definition(
                            child,
                            OidDefinition {
                                mib,
                                symbol: None,
                                name: name.into(),
                            },
                        );
                    }
                    Some(child)
                }
                (Some(name), None, Some(parent)) => {
                    let found = self.arena.child_by_name(parent, name);
                    if found.is_none() {
                        self.log.semantic(
                            file.as_deref(),
                            location,
                            format!(
                                "\"{name}\" is not a known child in the OID of \"{owner}\""
                            ),
                        );
                    }
                    found
                }
                (None, None, _) => None,
            };
            let Some(next) = next else { return None };
            node = Some(next);
        }
        node.map(MibValue::Oid)
    }

    // === Pass 3: validate ===

    /// Flatten type indirection, check default values, and index the value
    /// map. Idempotent and re-runnable.
    fn validate(&mut self, id: MibId) {
        let count = self.mib(id).map_or(0, |m| m.symbols().len());
        for index in 0..count {
            let ty = {
                let Some(m) = self.mib(id) else { return };
                match m.symbols().get(index) {
                    Some(MibSymbol::Type(t)) => Some(t.ty.clone()),
                    Some(MibSymbol::Value(v)) => Some(v.ty.clone()),
                    _ => None,
                }
            };
            if let Some(ty) = ty {
                let mut visiting = Vec::new();
                let flattened = self.flatten_type(id, ty, &mut visiting);
                if let Some(m) = self.mib_mut(id) {
                    match m.symbols_mut().get_mut(index) {
                        Some(MibSymbol::Type(t)) => t.ty = flattened,
                        Some(MibSymbol::Value(v)) => v.ty = flattened,
                        _ => {}
                    }
                }
            }
            self.check_value(id, index);
            self.index_value(id, index);
        }
    }

    fn flatten_type(
        &mut self,
        mib: MibId,
        ty: MibType,
        visiting: &mut Vec<String>,
    ) -> MibType {
        match ty {
            MibType::Reference(r) => self.flatten_reference(mib, r, visiting),
            MibType::Sequence { elements } => MibType::Sequence {
                elements: elements
                    .into_iter()
                    .map(|(n, t)| (n, self.flatten_type(mib, t, visiting)))
                    .collect(),
            },
            MibType::Choice { elements } => MibType::Choice {
                elements: elements
                    .into_iter()
                    .map(|(n, t)| (n, self.flatten_type(mib, t, visiting)))
                    .collect(),
            },
            MibType::SequenceOf { element, size } => MibType::SequenceOf {
                element: Box::new(self.flatten_type(mib, *element, visiting)),
                size,
            },
            MibType::Tagged {
                class,
                number,
                implicit,
                inner,
            } => MibType::Tagged {
                class,
                number,
                implicit,
                inner: Box::new(self.flatten_type(mib, *inner, visiting)),
            },
            MibType::Snmp(SnmpMacroType::ObjectType(mut ot)) => {
                ot.syntax = self.flatten_type(mib, ot.syntax, visiting);
                MibType::Snmp(SnmpMacroType::ObjectType(ot))
            }
            MibType::Snmp(SnmpMacroType::TextualConvention(mut tc)) => {
                tc.syntax = self.flatten_type(mib, tc.syntax, visiting);
                MibType::Snmp(SnmpMacroType::TextualConvention(tc))
            }
            other => other,
        }
    }

    fn flatten_reference(
        &mut self,
        mib: MibId,
        r: TypeRef,
        visiting: &mut Vec<String>,
    ) -> MibType {
        // ASN.1 NULL has no symbol anywhere; it is its own base type.
        if r.name == "NULL" {
            return MibType::Null;
        }
        if visiting.iter().any(|n| n == &r.name) {
            let file = self.mib(mib).and_then(|m| m.file.clone());
            self.log.semantic(
                file.as_deref(),
                SymbolLocation::default(),
                format!("circular type reference through \"{}\"", r.name),
            );
            return MibType::Reference(r);
        }
        let target = self.visible_ref(mib, &r.name);
        let Some(sref) = target else {
            let file = self.mib(mib).and_then(|m| m.file.clone());
            self.log.semantic(
                file.as_deref(),
                SymbolLocation::default(),
                format!("undefined type \"{}\"", r.name),
            );
            return MibType::Reference(r);
        };
        let target_ty = match self.symbol(sref) {
            Some(MibSymbol::Type(t)) => Some(t.ty.clone()),
            Some(_) => None,
            None => return MibType::Reference(r),
        };
        let Some(target_ty) = target_ty else {
            let file = self.mib(mib).and_then(|m| m.file.clone());
            self.log.semantic(
                file.as_deref(),
                SymbolLocation::default(),
                format!("\"{}\" does not refer to a type", r.name),
            );
            return MibType::Reference(r);
        };
        visiting.push(r.name.clone());
        let mut flattened = self.flatten_type(sref.mib, target_ty, visiting);
        visiting.pop();
        apply_refinement(&mut flattened, r.constraint, r.named);
        flattened
    }

    fn check_value(&mut self, id: MibId, index: usize) {
        let problem = {
            let Some(m) = self.mib(id) else { return };
            let Some(MibSymbol::Value(vs)) = m.symbols().get(index) else {
                return;
            };
            let MibType::Snmp(SnmpMacroType::ObjectType(ot)) = &vs.ty else {
                return;
            };
            match &ot.defval {
                Some(ValueRef::Resolved(defval)) if !ot.syntax.is_compatible(defval) => Some((
                    m.file.clone(),
                    vs.location,
                    format!(
                        "default value {defval} is not compatible with the syntax of \"{}\"",
                        vs.name
                    ),
                )),
                _ => None,
            }
        };
        if let Some((file, location, message)) = problem {
            self.log.semantic(file.as_deref(), location, message);
        }
    }

    fn index_value(&mut self, id: MibId, index: usize) {
        let oid = {
            let Some(m) = self.mib(id) else { return };
            let Some(MibSymbol::Value(vs)) = m.symbols().get(index) else {
                return;
            };
            match vs.value.resolved().and_then(MibValue::as_oid) {
                Some(node) => self.arena.dotted(node),
                None => return,
            }
        };
        if let Some(m) = self.mib_mut(id) {
            m.index_value(oid, index);
        }
    }

    // === Unloading ===

    /// Unload a module, detaching its OID nodes. Fails while other loaded
    /// modules still import it.
    pub fn unload(&mut self, name: &str) -> Result<(), MibLoaderError> {
        let Some(&id) = self.registry.get(name) else {
            let mut log = MibLoaderLog::default();
            log.semantic(
                None,
                SymbolLocation::default(),
                format!("no loaded MIB named \"{name}\""),
            );
            return Err(MibLoaderError { log });
        };
        let dependents: Vec<String> = self
            .all_mibs()
            .filter(|m| m.id() != Some(id))
            .filter(|m| m.imports().iter().any(|i| i.resolved == Some(id)))
            .map(|m| m.name.clone())
            .collect();
        if !dependents.is_empty() {
            let mut log = MibLoaderLog::default();
            log.semantic(
                None,
                SymbolLocation::default(),
                format!(
                    "MIB \"{name}\" is still imported by {}",
                    dependents.join(", ")
                ),
            );
            return Err(MibLoaderError { log });
        }
        self.arena.remove_mib(id);
        self.registry.retain(|_, &mut v| v != id);
        if let Some(slot) = self.mibs.get_mut(id.to_index()) {
            *slot = None;
        }
        Ok(())
    }
}

/// Rewrite a flattened base type with the refinements written at the
/// reference site.
fn apply_refinement(
    ty: &mut MibType,
    constraint: Option<Constraint>,
    named: Option<Vec<crate::model::NamedNumber>>,
) {
    if constraint.is_none() && named.is_none() {
        return;
    }
    match ty {
        MibType::Integer {
            constraint: c,
            named: n,
        } => {
            if constraint.is_some() {
                *c = constraint;
            }
            if let Some(named) = named {
                *n = named;
            }
        }
        MibType::OctetString { size } => {
            if constraint.is_some() {
                *size = constraint;
            }
        }
        MibType::Bits { named: n } => {
            if let Some(named) = named {
                *n = named;
            }
        }
        MibType::SequenceOf { size, .. } => {
            if constraint.is_some() {
                *size = constraint;
            }
        }
        MibType::Tagged { inner, .. } => apply_refinement(inner, constraint, named),
        MibType::Snmp(SnmpMacroType::TextualConvention(tc)) => {
            apply_refinement(&mut tc.syntax, constraint, named);
        }
        _ => {}
    }
}

/// Names that may be imported without a backing symbol: the grammar
/// recognizes these macros directly.
fn is_macro_name(name: &str) -> bool {
    matches!(
        name,
        "MODULE-IDENTITY"
            | "OBJECT-IDENTITY"
            | "OBJECT-TYPE"
            | "NOTIFICATION-TYPE"
            | "TRAP-TYPE"
            | "TEXTUAL-CONVENTION"
            | "OBJECT-GROUP"
            | "NOTIFICATION-GROUP"
            | "MODULE-COMPLIANCE"
            | "AGENT-CAPABILITIES"
    )
}

/// Extract the leading and trailing comment blocks from the retained token
/// list.
fn split_comments(tokens: &[Token]) -> (Option<String>, Option<String>) {
    let mut header: Vec<&str> = Vec::new();
    for tok in tokens {
        match tok.id {
            token::COMMENT => header.push(tok.image.as_str()),
            token::WHITESPACE => {}
            _ => break,
        }
    }
    let mut footer: Vec<&str> = Vec::new();
    for tok in tokens.iter().rev() {
        match tok.id {
            token::COMMENT => footer.push(tok.image.as_str()),
            token::WHITESPACE => {}
            _ => break,
        }
    }
    footer.reverse();
    let join = |parts: Vec<&str>| {
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    };
    (join(header), join(footer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roots_preregistered() {
        let loader = MibLoader::new();
        let arena = loader.arena();
        assert_eq!(arena.roots().len(), 3);
        assert!(arena.lookup(&[0]).is_some());
        assert!(arena.lookup(&[1]).is_some());
        assert!(arena.lookup(&[2]).is_some());
        let iso = arena.lookup(&[1]).unwrap();
        assert_eq!(arena.node(iso).unwrap().name(), Some("iso"));
    }

    #[test]
    fn test_load_text_simple_module() {
        let mut loader = MibLoader::new();
        let id = loader
            .load_text(
                "TEST-MIB",
                "TEST-MIB DEFINITIONS ::= BEGIN\n\
                 testRoot OBJECT IDENTIFIER ::= { iso org(3) dod(6) 1 99 }\n\
                 testLeaf OBJECT IDENTIFIER ::= { testRoot 1 }\n\
                 END\n",
            )
            .unwrap();
        let arena_path = {
            let mib = loader.mib(id).unwrap();
            let leaf = mib.symbol("testLeaf").unwrap().as_value().unwrap();
            leaf.value.resolved().unwrap().as_oid().unwrap()
        };
        assert_eq!(loader.arena().dotted(arena_path), "1.3.6.1.99.1");
    }

    #[test]
    fn test_load_is_idempotent() {
        let mut loader = MibLoader::new();
        let text = "TEST-MIB DEFINITIONS ::= BEGIN\n\
                    testRoot OBJECT IDENTIFIER ::= { iso 99 }\n\
                    END\n";
        let first = loader.load_text("TEST-MIB", text).unwrap();
        let second = loader.load_text("TEST-MIB", text).unwrap();
        assert_eq!(first, second);
        assert_eq!(loader.all_mibs().count(), 1);
    }

    #[test]
    fn test_forward_reference_within_module() {
        let mut loader = MibLoader::new();
        let id = loader
            .load_text(
                "TEST-MIB",
                "TEST-MIB DEFINITIONS ::= BEGIN\n\
                 testLeaf OBJECT IDENTIFIER ::= { testRoot 5 }\n\
                 testRoot OBJECT IDENTIFIER ::= { iso 99 }\n\
                 END\n",
            )
            .unwrap();
        let mib = loader.mib(id).unwrap();
        let leaf = mib.symbol("testLeaf").unwrap().as_value().unwrap();
        let node = leaf.value.resolved().unwrap().as_oid().unwrap();
        assert_eq!(loader.arena().dotted(node), "1.99.5");
    }

    #[test]
    fn test_undefined_parent_is_semantic_error() {
        let mut loader = MibLoader::new();
        let err = loader
            .load_text(
                "TEST-MIB",
                "TEST-MIB DEFINITIONS ::= BEGIN\n\
                 testLeaf OBJECT IDENTIFIER ::= { nowhere 5 }\n\
                 END\n",
            )
            .unwrap_err();
        assert!(err.log.has_errors());
        let rendered = format!("{err}");
        assert!(rendered.contains("undefined symbol \"nowhere\""));
    }

    #[test]
    fn test_unload_refused_while_imported() {
        let mut loader = MibLoader::new();
        loader
            .load_text(
                "BASE-MIB",
                "BASE-MIB DEFINITIONS ::= BEGIN\n\
                 baseRoot OBJECT IDENTIFIER ::= { iso 98 }\n\
                 END\n",
            )
            .unwrap();
        loader
            .load_text(
                "LEAF-MIB",
                "LEAF-MIB DEFINITIONS ::= BEGIN\n\
                 IMPORTS baseRoot FROM BASE-MIB;\n\
                 leafNode OBJECT IDENTIFIER ::= { baseRoot 1 }\n\
                 END\n",
            )
            .unwrap();
        assert!(loader.unload("BASE-MIB").is_err());
        loader.unload("LEAF-MIB").unwrap();
        loader.unload("BASE-MIB").unwrap();
        // The shared tree kept only the built-in roots.
        assert!(loader.arena().lookup(&[1, 98]).is_none());
    }

    #[test]
    fn test_header_comment_captured() {
        let mut loader = MibLoader::new();
        let id = loader
            .load_text(
                "TEST-MIB",
                "-- A test module.\n-- Second line.\n\
                 TEST-MIB DEFINITIONS ::= BEGIN\n\
                 testRoot OBJECT IDENTIFIER ::= { iso 99 }\n\
                 END\n",
            )
            .unwrap();
        let mib = loader.mib(id).unwrap();
        let header = mib.header_comment.as_deref().unwrap();
        assert!(header.contains("A test module."));
    }
}
