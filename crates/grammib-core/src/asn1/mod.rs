//! The ASN.1 (SMI subset) front-end.
//!
//! `grammar` holds the static token/production tables handed to the
//! generic runtime; `analyzer` turns parse trees into [`Mib`](crate::model::Mib)
//! modules with unresolved references for the loader to link.

pub mod analyzer;
pub mod grammar;

pub use analyzer::{AsnValue, MibAnalyzer};
pub use grammar::{build_parser, register_productions, register_tokens};
