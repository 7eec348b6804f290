//! The resolved MIB model.
//!
//! ```text
//! Source → Tokenizer → Parser → MibAnalyzer → [Mib + OidArena] → Loader passes
//! ```
//!
//! - Arena-based OID tree with stable index ids (parent/child links would
//!   otherwise form ownership cycles)
//! - Symbols held per module in declaration order, with name and value maps
//! - Two-phase references: names recorded at parse time, rewritten to
//!   concrete values/types by the loader's initialize and validate passes

mod ids;
mod mib;
mod oid;
mod symbol;
mod types;
mod values;

pub use ids::{MibId, OidId};
pub use mib::{Mib, MibImport, SmiVersion, SymbolRef};
pub use oid::{OidArena, OidDefinition, OidNode};
pub use symbol::{MacroSymbol, MibSymbol, SymbolLocation, TypeSymbol, ValueSymbol};
pub use types::{
    Access, ComplianceItem, ComplianceModule, Constraint, IndexItem, MibType, NamedNumber,
    RangeBound, Revision, SnmpAgentCapabilities, SnmpMacroType, SnmpModuleCompliance,
    SnmpModuleIdentity, SnmpNotificationGroup, SnmpNotificationType, SnmpObjectGroup,
    SnmpObjectIdentity, SnmpObjectType, SnmpTextualConvention, SnmpTrapType, Status,
    SupportedModule, TagClass, TypeRef, ValueRange, Variation,
};
pub use values::{MibValue, OidComponent, ValueRef};
