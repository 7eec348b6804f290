//! OID tree dump utility.
//!
//! Usage: mibdump [-d <dir>]... <mib-name-or-file>...
//!
//! Loads the named MIB modules (searching any `-d` directories plus the
//! bundled base modules) and prints the resolved OID tree as
//! `OID<TAB>name<TAB>module` lines, or the loader log on failure.

use std::env;
use std::process;

use grammib_core::loader::MibLoader;
use grammib_core::model::{OidArena, OidId};
use grammib_std::DirLocator;

fn main() {
    let mut dirs: Vec<String> = Vec::new();
    let mut names: Vec<String> = Vec::new();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-d" | "--dir" => match args.next() {
                Some(dir) => dirs.push(dir),
                None => {
                    eprintln!("missing directory after {arg}");
                    process::exit(1);
                }
            },
            _ => names.push(arg),
        }
    }
    if names.is_empty() {
        eprintln!("Usage: mibdump [-d <dir>]... <mib-name-or-file>...");
        process::exit(1);
    }

    let mut loader = MibLoader::new();
    let mut locator = DirLocator::new();
    for dir in dirs {
        locator.add_dir(dir);
    }
    loader.add_locator(Box::new(locator));

    let mut failed = false;
    for name in &names {
        if let Err(e) = loader.load(name) {
            eprintln!("{name}:");
            eprint!("{e}");
            failed = true;
        }
    }

    let arena = loader.arena();
    for &root in arena.roots() {
        dump(&loader, arena, root);
    }
    if failed {
        process::exit(1);
    }
}

fn dump(loader: &MibLoader, arena: &OidArena, id: OidId) {
    if let Some(node) = arena.node(id) {
        for def in node.definitions() {
            let module = loader
                .mib(def.mib)
                .map(|m| m.name.as_str())
                .unwrap_or_default();
            println!("{}\t{}\t{}", arena.dotted(id), def.name, module);
        }
        for &child in node.children() {
            dump(loader, arena, child);
        }
    }
}
