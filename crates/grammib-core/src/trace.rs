//! Loader tracing support (feature-gated).
//!
//! Structured events for debugging load and link behaviour. Zero overhead
//! when the `tracing` feature is disabled.

/// Loader phase identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Pass 2: import binding and value resolution.
    Initialize,
    /// Pass 3: type flattening and validation.
    Validate,
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Phase::Initialize => write!(f, "initialize"),
            Phase::Validate => write!(f, "validate"),
        }
    }
}

/// Structured trace events emitted while loading.
#[derive(Clone, Debug)]
pub enum TraceEvent<'a> {
    /// A module finished parsing and was registered.
    ModuleParsed {
        /// The module name.
        name: &'a str,
    },
    /// A linking phase is starting.
    PhaseStart {
        /// The phase.
        phase: Phase,
    },
    /// A linking phase has ended.
    PhaseEnd {
        /// The phase.
        phase: Phase,
    },
    /// An imported symbol was bound to its exporting module.
    ImportBound {
        /// The imported symbol name.
        symbol: &'a str,
        /// The exporting module name.
        exporter: &'a str,
    },
}

/// Receives trace events during loading.
pub trait Tracer {
    /// Handle one event.
    fn trace(&mut self, event: TraceEvent<'_>);
}
