//! grammib-core: SNMP MIB loading and resolution
//!
//! Loads MIB modules written in the SMI subset of ASN.1 and links them
//! into a queryable model.
//!
//! # Pipeline
//!
//! ```text
//! Source → Tokenizer → LL(k) Parser → MibAnalyzer → Mib (+imports)
//!                                                    │
//!                             MibLoader: initialize ─┴→ validate → Model
//! ```
//!
//! - **asn1**: the SMI grammar tables for the generic runtime and the
//!   analyzer building symbols out of parse trees
//! - **model**: modules, symbols, types/values with two-phase references,
//!   and the arena-backed OID tree
//! - **loader**: multi-module loading with import chasing (cycles
//!   tolerated), import binding, reference fix-up and validation
//!
//! # Usage
//!
//! ```ignore
//! use grammib_core::loader::MibLoader;
//!
//! let mut loader = MibLoader::new();
//! let id = loader.load("RFC1213-MIB")?;
//! let mib = loader.mib(id).unwrap();
//! let descr = mib.symbol("sysDescr").unwrap();
//! ```
//!
//! The crate is `no_std` compatible (with `alloc`); filesystem search
//! lives in `grammib-std`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod asn1;
pub mod loader;
pub mod model;

#[cfg(feature = "tracing")]
pub mod trace;

pub use loader::{MibLoader, MibLoaderError, MibLoaderLog, MibSource, ResourceLocator};
pub use model::{Mib, MibId, MibSymbol, MibType, MibValue, OidArena, OidId};
