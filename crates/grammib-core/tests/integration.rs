//! Integration tests over the bundled standard modules.

use grammib_core::loader::MibLoader;
use grammib_core::model::{MibType, MibValue, SmiVersion, SnmpMacroType};

#[test]
fn test_load_rfc1213() {
    let mut loader = MibLoader::new();
    let id = loader.load("RFC1213-MIB").unwrap();
    let mib = loader.mib(id).unwrap();

    assert_eq!(mib.name, "RFC1213-MIB");
    assert_eq!(mib.smi_version, SmiVersion::V1);
    assert!(mib.loaded_explicitly);

    // The imports were pulled in implicitly.
    let smi = loader.get_mib("RFC1155-SMI").unwrap();
    assert!(!smi.loaded_explicitly);
    assert!(loader.get_mib("RFC-1212").is_some());
}

#[test]
fn test_sysdescr_oid() {
    let mut loader = MibLoader::new();
    let id = loader.load("RFC1213-MIB").unwrap();
    let mib = loader.mib(id).unwrap();

    let symbol = mib.symbol("sysDescr").unwrap();
    let value = symbol.as_value().unwrap();
    let node = value.value.resolved().unwrap().as_oid().unwrap();
    assert_eq!(loader.arena().dotted(node), "1.3.6.1.2.1.1.1");

    // The syntax flattened through DisplayString to an OCTET STRING with
    // the local size refinement.
    let MibType::Snmp(SnmpMacroType::ObjectType(ot)) = &value.ty else {
        panic!("sysDescr should be an OBJECT-TYPE");
    };
    assert!(matches!(
        ot.syntax.effective(),
        MibType::OctetString { size: Some(_) }
    ));
}

#[test]
fn test_oid_forest_roots() {
    let mut loader = MibLoader::new();
    loader.load("RFC1213-MIB").unwrap();

    // ccitt(0) and iso(1) are pre-registered roots; internet hangs off
    // iso through the imported chain.
    let arena = loader.arena();
    let ccitt = arena.lookup(&[0]).unwrap();
    assert_eq!(arena.node(ccitt).unwrap().name(), Some("ccitt"));
    let internet = arena.lookup(&[1, 3, 6, 1]).unwrap();
    assert_eq!(arena.node(internet).unwrap().name(), Some("internet"));
}

#[test]
fn test_symbol_by_value_round_trip() {
    let mut loader = MibLoader::new();
    let id = loader.load("RFC1213-MIB").unwrap();
    let mib = loader.mib(id).unwrap();

    let found = mib.symbol_by_value("1.3.6.1.2.1.1.1").unwrap();
    assert_eq!(found.name, "sysDescr");
}

#[test]
fn test_symbol_by_oid_longest_prefix() {
    let mut loader = MibLoader::new();
    let id = loader.load("RFC1213-MIB").unwrap();
    let mib = loader.mib(id).unwrap();

    // An instance suffix is not a declared child: the longest declared
    // prefix wins.
    let found = mib.symbol_by_oid("1.3.6.1.2.1.1.1.0").unwrap();
    assert_eq!(found.name, "sysDescr");
    let found = mib.symbol_by_oid("1.3.6.1.2.1.1.1.1.2").unwrap();
    assert_eq!(found.name, "sysDescr");
    assert!(mib.symbol_by_oid("2.99").is_none());
}

#[test]
fn test_loader_idempotence() {
    let mut loader = MibLoader::new();
    let first = loader.load("RFC1213-MIB").unwrap();
    let second = loader.load("RFC1213-MIB").unwrap();
    assert_eq!(first, second);
    assert_eq!(
        loader.all_mibs().filter(|m| m.name == "RFC1213-MIB").count(),
        1
    );
}

#[test]
fn test_cyclic_imports_between_bundled_modules() {
    // RFC-1212 imports DisplayString from RFC1213-MIB while RFC1213-MIB
    // imports OBJECT-TYPE from RFC-1212. Loading either terminates and
    // binds both sides.
    let mut loader = MibLoader::new();
    loader.load("RFC-1212").unwrap();
    let rfc1212 = loader.get_mib("RFC-1212").unwrap();
    assert!(rfc1212.imports().iter().all(|i| i.resolved.is_some()));
    let rfc1213 = loader.get_mib("RFC1213-MIB").unwrap();
    assert!(rfc1213.imports().iter().all(|i| i.resolved.is_some()));
}

#[test]
fn test_synthetic_cyclic_imports() {
    let mut loader = MibLoader::new();
    loader
        .load_text(
            "A-MIB",
            "A-MIB DEFINITIONS ::= BEGIN\n\
             IMPORTS bRoot FROM B-MIB;\n\
             aRoot OBJECT IDENTIFIER ::= { iso 81 }\n\
             aLeaf OBJECT IDENTIFIER ::= { bRoot 1 }\n\
             END\n",
        )
        .unwrap_err(); // B-MIB is unknown on the first load
    loader
        .load_text(
            "B-MIB",
            "B-MIB DEFINITIONS ::= BEGIN\n\
             IMPORTS aRoot FROM A-MIB;\n\
             bRoot OBJECT IDENTIFIER ::= { iso 82 }\n\
             bLeaf OBJECT IDENTIFIER ::= { aRoot 1 }\n\
             END\n",
        )
        .unwrap();

    let b = loader.get_mib("B-MIB").unwrap();
    let leaf = b.symbol("bLeaf").unwrap().as_value().unwrap();
    let node = leaf.value.resolved().unwrap().as_oid().unwrap();
    assert_eq!(loader.arena().dotted(node), "1.81.1");
}

#[test]
fn test_load_snmpv2_modules() {
    let mut loader = MibLoader::new();
    let id = loader.load("SNMPv2-TC").unwrap();
    let mib = loader.mib(id).unwrap();
    assert_eq!(mib.smi_version, SmiVersion::V2);

    // DisplayString is a textual convention over a sized OCTET STRING.
    let ds = mib.symbol("DisplayString").unwrap().as_type().unwrap();
    let MibType::Snmp(SnmpMacroType::TextualConvention(tc)) = &ds.ty else {
        panic!("DisplayString should be a TEXTUAL-CONVENTION");
    };
    assert_eq!(tc.display_hint.as_deref(), Some("255a"));

    // SNMPv2-SMI came in through the import and laid down the OID spine.
    let smi_id = loader.get_mib("SNMPv2-SMI").unwrap().id().unwrap();
    let zero = loader.arena().lookup(&[0, 0]).unwrap();
    assert!(
        loader
            .arena()
            .node(zero)
            .unwrap()
            .definitions()
            .iter()
            .any(|d| d.mib == smi_id)
    );
}

#[test]
fn test_root_symbol_walk() {
    let mut loader = MibLoader::new();
    let id = loader.load("RFC1213-MIB").unwrap();
    // The module's topmost own OID symbol is mib-2 (its parent, mgmt,
    // belongs to RFC1155-SMI).
    let root = loader.root_symbol(id).unwrap();
    assert_eq!(root.name, "mib-2");
}

#[test]
fn test_shared_oid_nodes_across_modules() {
    let mut loader = MibLoader::new();
    loader.load("RFC1213-MIB").unwrap();
    loader.load("SNMPv2-SMI").unwrap();

    // Both RFC1155-SMI and SNMPv2-SMI declare internet; one node, two
    // definitions.
    let internet = loader.arena().lookup(&[1, 3, 6, 1]).unwrap();
    let defs = loader.arena().node(internet).unwrap().definitions();
    assert!(defs.len() >= 2);
}

#[test]
fn test_enum_and_defval_survive_validation() {
    let mut loader = MibLoader::new();
    let id = loader.load("RFC1213-MIB").unwrap();
    let mib = loader.mib(id).unwrap();

    let status = mib.symbol("ifAdminStatus").unwrap().as_value().unwrap();
    let MibType::Snmp(SnmpMacroType::ObjectType(ot)) = &status.ty else {
        panic!("ifAdminStatus should be an OBJECT-TYPE");
    };
    let MibType::Integer { named, .. } = ot.syntax.effective() else {
        panic!("ifAdminStatus syntax should be INTEGER");
    };
    assert!(named.iter().any(|n| n.name == "up" && n.number == 1));
    assert!(ot.defval.is_some());
}

#[test]
fn test_table_structure() {
    let mut loader = MibLoader::new();
    let id = loader.load("RFC1213-MIB").unwrap();
    let mib = loader.mib(id).unwrap();

    let table = mib.symbol("ifTable").unwrap().as_value().unwrap();
    let MibType::Snmp(SnmpMacroType::ObjectType(ot)) = &table.ty else {
        panic!("ifTable should be an OBJECT-TYPE");
    };
    assert!(matches!(ot.syntax.effective(), MibType::SequenceOf { .. }));

    let row = mib.symbol("ifEntry").unwrap().as_value().unwrap();
    let MibType::Snmp(SnmpMacroType::ObjectType(row_ot)) = &row.ty else {
        panic!("ifEntry should be an OBJECT-TYPE");
    };
    assert_eq!(row_ot.index.len(), 1);
    assert_eq!(row_ot.index[0].name, "ifIndex");
}

#[test]
fn test_unknown_module_fails() {
    let mut loader = MibLoader::new();
    let err = loader.load("NO-SUCH-MIB").unwrap_err();
    assert!(format!("{err}").contains("NO-SUCH-MIB"));
}

#[test]
fn test_symbols_in_declaration_order() {
    let mut loader = MibLoader::new();
    let id = loader.load("RFC1213-MIB").unwrap();
    let mib = loader.mib(id).unwrap();
    let names: Vec<&str> = mib.symbols().iter().map(|s| s.name()).collect();
    let mib2 = names.iter().position(|&n| n == "mib-2").unwrap();
    let system = names.iter().position(|&n| n == "system").unwrap();
    let sysdescr = names.iter().position(|&n| n == "sysDescr").unwrap();
    assert!(mib2 < system && system < sysdescr);
}
