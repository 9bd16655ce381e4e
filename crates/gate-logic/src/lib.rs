// crates/gate-logic/src/lib.rs
// ============================================================================
// Module: Gate Logic Root
// Description: Public API surface for the gate simulator core.
// Purpose: Wire together the gate model, source compiler and executor.
// Dependencies: crate::{builtin, error, executor, gate, lexer, library, table}
// ============================================================================

//! ## Overview
//! `gate-logic` models digital logic gates as builtin primitives, composite
//! ("normal") gates built from node sequences, and loop nodes that move the
//! evaluation cursor by a signed offset. Gate sources are compiled into a
//! [`Library`] and evaluated with an [`Executor`].

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod builtin;
pub mod error;
pub mod executor;
pub mod gate;
pub mod lexer;
pub mod library;
pub mod table;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use builtin::BuiltinKind;
pub use builtin::Prelude;
pub use error::CompileError;
pub use error::EvalError;
pub use error::GateResult;
pub use executor::EvalLimits;
pub use executor::EvalTrace;
pub use executor::Executor;
pub use executor::JsonLinesTrace;
pub use executor::LoopOutcome;
pub use executor::NoopTrace;
pub use executor::RecordingTrace;
pub use executor::TraceEvent;
pub use gate::Gate;
pub use gate::GateBody;
pub use gate::GateKind;
pub use gate::GateSummary;
pub use gate::Guard;
pub use gate::Node;
pub use gate::NormalGate;
pub use gate::Wire;
pub use lexer::LexError;
pub use lexer::Statement;
pub use library::Library;
pub use table::TruthTable;
pub use table::format_bits;
pub use table::parse_bits;
pub use table::truth_table;
