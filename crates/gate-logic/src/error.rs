// crates/gate-logic/src/error.rs
// ============================================================================
// Module: Gate Error Definitions
// Description: Structured diagnostics for compiling and evaluating gates.
// Purpose: Keep compile-time and run-time failures separate and line-tagged.
// Dependencies: serde, thiserror, crate::lexer::LexError
// ============================================================================

//! ## Overview
//! Compilation failures ([`CompileError`]) always carry the 1-based source line
//! that caused them. Evaluation failures ([`EvalError`]) carry the gate name and
//! node index so a trace can be correlated with the failing node.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::lexer::LexError;

// ============================================================================
// SECTION: Compile Errors
// ============================================================================

/// Errors raised while turning source statements into a gate library.
///
/// # Invariants
/// - Every variant except [`CompileError::Lex`] carries the 1-based line of the
///   offending statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The source could not be tokenized.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// A `DEF` reused a registered gate name.
    #[error("line {line}: gate `{name}` already exists")]
    DuplicateGate {
        /// Source line.
        line: usize,
        /// Conflicting gate name.
        name: String,
    },
    /// A `DEF` declared zero inputs.
    #[error("line {line}: gate `{name}` must declare at least one input")]
    ZeroInputs {
        /// Source line.
        line: usize,
        /// Gate name.
        name: String,
    },
    /// A body statement appeared before any `DEF`.
    #[error("line {line}: statement outside of a gate definition")]
    StatementOutsideDefinition {
        /// Source line.
        line: usize,
    },
    /// A gate application named an unknown gate.
    #[error("line {line}: gate `{name}` does not exist")]
    UnknownGate {
        /// Source line.
        line: usize,
        /// Unresolved gate name.
        name: String,
    },
    /// A gate application supplied the wrong number of input wires.
    #[error("line {line}: gate `{name}` takes {expected} inputs, got {actual}")]
    InputArity {
        /// Source line.
        line: usize,
        /// Applied gate name.
        name: String,
        /// Declared input count.
        expected: usize,
        /// Supplied wire count.
        actual: usize,
    },
    /// A gate application supplied the wrong number of output wires.
    #[error("line {line}: gate `{name}` produces {expected} outputs, got {actual}")]
    OutputArity {
        /// Source line.
        line: usize,
        /// Applied gate name.
        name: String,
        /// Declared output count.
        expected: usize,
        /// Supplied wire count.
        actual: usize,
    },
    /// A label was declared twice in the same definition.
    #[error("line {line}: label `{label}` already declared")]
    DuplicateLabel {
        /// Source line.
        line: usize,
        /// Repeated label.
        label: String,
    },
    /// A `GOTO` targeted a label missing from the definition.
    #[error("line {line}: label `{label}` does not exist")]
    UnknownLabel {
        /// Source line.
        line: usize,
        /// Missing label.
        label: String,
    },
    /// A `GOTO` targeted its own line.
    #[error("line {line}: `GOTO` cannot target its own line (`{label}`)")]
    SelfLoop {
        /// Source line.
        line: usize,
        /// Self-referencing label.
        label: String,
    },
    /// A wire is read but never driven inside the definition.
    #[error("line {line}: wire {wire} is read but never assigned")]
    UnassignedWire {
        /// Source line.
        line: usize,
        /// Undriven wire.
        wire: usize,
    },
    /// A definition ended without `OUT`.
    #[error("line {line}: gate `{name}` has no `OUT` statement")]
    MissingOutputs {
        /// Line of the opening `DEF`.
        line: usize,
        /// Gate name.
        name: String,
    },
    /// `OUT` declared no wires.
    #[error("line {line}: `OUT` must list at least one wire")]
    EmptyOutputs {
        /// Source line.
        line: usize,
    },
    /// A body statement followed `OUT`.
    #[error("line {line}: statement after `OUT` in gate `{name}`")]
    StatementAfterOut {
        /// Source line.
        line: usize,
        /// Gate name.
        name: String,
    },
    /// A definition exceeded the node budget.
    #[error("line {line}: gate `{name}` exceeds {max} nodes")]
    TooManyNodes {
        /// Source line.
        line: usize,
        /// Gate name.
        name: String,
        /// Maximum nodes per definition.
        max: usize,
    },
}

impl CompileError {
    /// Returns the source line the error points at, when known.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::Lex(err) => err.line(),
            Self::DuplicateGate {
                line,
                ..
            }
            | Self::ZeroInputs {
                line,
                ..
            }
            | Self::StatementOutsideDefinition {
                line,
            }
            | Self::UnknownGate {
                line,
                ..
            }
            | Self::InputArity {
                line,
                ..
            }
            | Self::OutputArity {
                line,
                ..
            }
            | Self::DuplicateLabel {
                line,
                ..
            }
            | Self::UnknownLabel {
                line,
                ..
            }
            | Self::SelfLoop {
                line,
                ..
            }
            | Self::UnassignedWire {
                line,
                ..
            }
            | Self::MissingOutputs {
                line,
                ..
            }
            | Self::EmptyOutputs {
                line,
            }
            | Self::StatementAfterOut {
                line,
                ..
            }
            | Self::TooManyNodes {
                line,
                ..
            } => Some(*line),
        }
    }
}

// ============================================================================
// SECTION: Evaluation Errors
// ============================================================================

/// Errors that can occur while evaluating a gate.
///
/// # Invariants
/// - `node` fields index into the failing gate's node sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvalError {
    /// The caller supplied the wrong number of input bits.
    InputArity {
        /// Gate name.
        gate: String,
        /// Declared input count.
        expected: usize,
        /// Supplied input count.
        actual: usize,
    },
    /// A builtin function returned the wrong number of bits.
    OutputArity {
        /// Gate name.
        gate: String,
        /// Declared output count.
        expected: usize,
        /// Produced output count.
        actual: usize,
    },
    /// A node read a wire that has not been driven yet.
    UnassignedWire {
        /// Gate name.
        gate: String,
        /// Node index, or `None` when reading `OUT` wires.
        node: Option<usize>,
        /// Undriven wire.
        wire: usize,
    },
    /// A feedback loop did not settle within the pass budget.
    Unsettled {
        /// Gate name.
        gate: String,
        /// Loop node index.
        node: usize,
        /// Pass budget that was exhausted.
        max_passes: u32,
    },
    /// Total executed nodes exceeded the step budget.
    StepLimitExceeded {
        /// Step budget that was exhausted.
        max_steps: u64,
    },
    /// Gate nesting exceeded the depth budget.
    TooDeep {
        /// Maximum allowed nesting depth.
        max_depth: usize,
    },
    /// A loop offset pointed outside the node sequence.
    InvalidJump {
        /// Gate name.
        gate: String,
        /// Loop node index.
        node: usize,
        /// Offending relative offset.
        change: isize,
    },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputArity {
                gate,
                expected,
                actual,
            } => write!(f, "gate `{gate}` takes {expected} inputs, got {actual}"),
            Self::OutputArity {
                gate,
                expected,
                actual,
            } => write!(f, "gate `{gate}` produced {actual} outputs, expected {expected}"),
            Self::UnassignedWire {
                gate,
                node: Some(node),
                wire,
            } => write!(f, "gate `{gate}` node {node} read unassigned wire {wire}"),
            Self::UnassignedWire {
                gate,
                node: None,
                wire,
            } => write!(f, "gate `{gate}` output wire {wire} was never assigned"),
            Self::Unsettled {
                gate,
                node,
                max_passes,
            } => write!(
                f,
                "gate `{gate}` loop at node {node} did not settle within {max_passes} passes"
            ),
            Self::StepLimitExceeded {
                max_steps,
            } => write!(f, "evaluation exceeded step limit ({max_steps})"),
            Self::TooDeep {
                max_depth,
            } => write!(f, "gate nesting exceeds depth limit ({max_depth})"),
            Self::InvalidJump {
                gate,
                node,
                change,
            } => write!(f, "gate `{gate}` loop at node {node} jumps out of range ({change:+})"),
        }
    }
}

impl std::error::Error for EvalError {}

// ============================================================================
// SECTION: Result Alias
// ============================================================================

/// Convenient result type for gate evaluation.
pub type GateResult<T> = Result<T, EvalError>;
