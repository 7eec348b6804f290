//! The loaded MIB module.
//!
//! A `Mib` owns its symbols in declaration order plus a name map. Imported
//! symbols are aliased into the name map as cross-MIB references once the
//! loader's initialize pass binds the imports, so name lookup from within
//! the importer finds them. The value map (dotted OID → value symbol) is
//! built by the validate pass.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use super::ids::MibId;
use super::symbol::{MibSymbol, SymbolLocation, ValueSymbol};

/// SMI language version of a module.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SmiVersion {
    /// SMIv1 (RFC 1155 / RFC 1212).
    #[default]
    V1,
    /// SMIv2 (RFC 2578).
    V2,
}

/// An IMPORTS clause entry: requested symbols from one module.
#[derive(Clone, Debug)]
pub struct MibImport {
    /// The exporting module name.
    pub module: String,
    /// The requested symbol names.
    pub symbols: Vec<String>,
    /// The exporting MIB once initialize has bound it.
    pub resolved: Option<MibId>,
    /// Where the import was written.
    pub location: SymbolLocation,
}

/// A cross-MIB symbol handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbolRef {
    /// The owning MIB.
    pub mib: MibId,
    /// Symbol index within the owning MIB.
    pub index: usize,
}

/// A loaded MIB module.
#[derive(Clone, Debug)]
pub struct Mib {
    /// The module name.
    pub name: String,
    /// Source file, when loaded from one.
    pub file: Option<String>,
    /// Detected SMI version.
    pub smi_version: SmiVersion,
    /// Comment block preceding the module header.
    pub header_comment: Option<String>,
    /// Comment block following the module END.
    pub footer_comment: Option<String>,
    /// Whether the module was requested directly (vs pulled in as an
    /// import).
    pub loaded_explicitly: bool,
    /// The id assigned by the loader.
    id: Option<MibId>,
    imports: Vec<MibImport>,
    symbols: Vec<MibSymbol>,
    /// Own and aliased symbols by name.
    by_name: BTreeMap<String, SymbolRef>,
    /// Dotted OID string → own value-symbol index; built by validate.
    by_value: BTreeMap<String, usize>,
}

impl Mib {
    /// Create an empty module.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
            smi_version: SmiVersion::V1,
            header_comment: None,
            footer_comment: None,
            loaded_explicitly: false,
            id: None,
            imports: Vec::new(),
            symbols: Vec::new(),
            by_name: BTreeMap::new(),
            by_value: BTreeMap::new(),
        }
    }

    /// The loader-assigned id.
    #[must_use]
    pub fn id(&self) -> Option<MibId> {
        self.id
    }

    /// Assign the loader id, seeding the name map with own symbols.
    pub(crate) fn assign_id(&mut self, id: MibId) {
        self.id = Some(id);
        for (index, symbol) in self.symbols.iter().enumerate() {
            self.by_name
                .entry(symbol.name().into())
                .or_insert(SymbolRef { mib: id, index });
        }
    }

    /// Record an import clause.
    pub fn add_import(&mut self, import: MibImport) {
        self.imports.push(import);
    }

    /// The recorded imports.
    #[must_use]
    pub fn imports(&self) -> &[MibImport] {
        &self.imports
    }

    pub(crate) fn imports_mut(&mut self) -> &mut [MibImport] {
        &mut self.imports
    }

    /// Append a symbol, keeping declaration order.
    pub fn add_symbol(&mut self, symbol: MibSymbol) {
        let index = self.symbols.len();
        if let Some(id) = self.id {
            self.by_name
                .entry(symbol.name().into())
                .or_insert(SymbolRef { mib: id, index });
        }
        self.symbols.push(symbol);
    }

    /// The symbols in declaration order.
    #[must_use]
    pub fn symbols(&self) -> &[MibSymbol] {
        &self.symbols
    }

    pub(crate) fn symbols_mut(&mut self) -> &mut [MibSymbol] {
        &mut self.symbols
    }

    /// Look up one of this module's own symbols by name.
    #[must_use]
    pub fn symbol(&self, name: &str) -> Option<&MibSymbol> {
        let sref = self.by_name.get(name)?;
        if Some(sref.mib) == self.id {
            self.symbols.get(sref.index)
        } else {
            None
        }
    }

    /// Resolve a name to a symbol handle, own or imported.
    #[must_use]
    pub fn symbol_ref(&self, name: &str) -> Option<SymbolRef> {
        self.by_name.get(name).copied()
    }

    /// Alias an imported symbol into this module's name map.
    pub(crate) fn add_alias(&mut self, name: impl Into<String>, sref: SymbolRef) {
        self.by_name.entry(name.into()).or_insert(sref);
    }

    /// Record a value symbol under its dotted OID string.
    pub(crate) fn index_value(&mut self, oid: String, symbol_index: usize) {
        self.by_value.entry(oid).or_insert(symbol_index);
    }

    /// Look up a value symbol by the string form of its value (after
    /// validate).
    #[must_use]
    pub fn symbol_by_value(&self, value: &str) -> Option<&ValueSymbol> {
        let &index = self.by_value.get(value)?;
        self.symbols.get(index).and_then(MibSymbol::as_value)
    }

    /// Look up a value symbol by dotted OID, accepting any trailing
    /// components: the longest declared prefix wins.
    #[must_use]
    pub fn symbol_by_oid(&self, oid: &str) -> Option<&ValueSymbol> {
        let mut cursor = oid;
        loop {
            if let Some(found) = self.symbol_by_value(cursor) {
                return Some(found);
            }
            match cursor.rfind('.') {
                Some(pos) => cursor = &cursor[..pos],
                None => return None,
            }
        }
    }

    /// Iterate the dotted OID strings indexed by validate.
    pub fn indexed_values(&self) -> impl Iterator<Item = (&str, usize)> {
        self.by_value.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::symbol::MacroSymbol;

    #[test]
    fn test_symbol_order_and_lookup() {
        let mut mib = Mib::new("TEST-MIB");
        mib.add_symbol(MibSymbol::Macro(MacroSymbol {
            name: "A".into(),
            location: SymbolLocation::default(),
        }));
        mib.add_symbol(MibSymbol::Macro(MacroSymbol {
            name: "B".into(),
            location: SymbolLocation::default(),
        }));
        mib.assign_id(MibId::from_raw(1).unwrap());
        assert_eq!(mib.symbols()[0].name(), "A");
        assert!(mib.symbol("B").is_some());
        assert!(mib.symbol("C").is_none());
    }

    #[test]
    fn test_alias_resolves_but_is_not_own() {
        let mut mib = Mib::new("TEST-MIB");
        mib.assign_id(MibId::from_raw(1).unwrap());
        mib.add_alias(
            "imported",
            SymbolRef {
                mib: MibId::from_raw(2).unwrap(),
                index: 0,
            },
        );
        assert!(mib.symbol("imported").is_none());
        assert_eq!(
            mib.symbol_ref("imported").unwrap().mib,
            MibId::from_raw(2).unwrap()
        );
    }

    #[test]
    fn test_symbol_by_oid_longest_prefix() {
        use crate::model::types::MibType;
        use crate::model::values::{MibValue, ValueRef};

        let mut mib = Mib::new("TEST-MIB");
        mib.add_symbol(MibSymbol::Value(ValueSymbol {
            name: "sysDescr".into(),
            location: SymbolLocation::default(),
            ty: MibType::ObjectIdentifier,
            value: ValueRef::Resolved(MibValue::Number(0)),
        }));
        mib.assign_id(MibId::from_raw(1).unwrap());
        mib.index_value("1.3.6.1.2.1.1.1".into(), 0);
        assert!(mib.symbol_by_value("1.3.6.1.2.1.1.1").is_some());
        assert!(mib.symbol_by_oid("1.3.6.1.2.1.1.1.0").is_some());
        assert!(mib.symbol_by_oid("1.3.6.1.2.1.1.1.1.2").is_some());
        assert!(mib.symbol_by_oid("2.3.4").is_none());
    }
}
