// crates/gate-logic/src/gate.rs
// ============================================================================
// Module: Gate Model
// Description: Builtin, normal (composite) and loop gate declarations.
// Purpose: Define the immutable gate graph shared by the compiler and executor.
// Dependencies: serde, smallvec, crate::{builtin, executor, lexer}
// ============================================================================

//! ## Overview
//! A [`Gate`] is either a builtin primitive computed by a transfer function or
//! a normal gate built from an ordered sequence of [`Node`]s. A node applies a
//! child gate to numbered wires, or is a loop that moves the evaluation cursor
//! by a signed offset within the same sequence. Gates are immutable once built
//! and children are shared through [`Arc`], so a library can hand the same gate
//! to many parents.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::builtin::BuiltinKind;
use crate::builtin::TransferFn;
use crate::error::GateResult;
use crate::executor::EvalLimits;
use crate::executor::Executor;
use crate::executor::NoopTrace;
use crate::lexer::WireList;

// ============================================================================
// SECTION: Wires
// ============================================================================

/// Numbered wire inside a normal gate.
///
/// Wires `0..inputs` hold the gate inputs when evaluation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wire(pub usize);

impl Wire {
    /// Returns the raw wire number.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wire condition that must hold for a loop to jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guard {
    /// Wire that is tested.
    pub wire: Wire,
    /// When true the jump is taken on a low wire.
    pub negated: bool,
}

impl Guard {
    /// Returns whether the guard passes for the given wire value.
    #[must_use]
    pub const fn passes(self, value: bool) -> bool {
        value != self.negated
    }
}

// ============================================================================
// SECTION: Gate Kinds
// ============================================================================

/// Tag for the three gate shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    /// Primitive computed by a transfer function.
    Builtin,
    /// Composite built from a node sequence.
    Normal,
    /// Relative jump inside a node sequence.
    Loop,
}

impl GateKind {
    /// Returns the lower-case label for display.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Builtin => "builtin",
            Self::Normal => "normal",
            Self::Loop => "loop",
        }
    }
}

// ============================================================================
// SECTION: Gate
// ============================================================================

/// A named gate with a fixed signature.
///
/// # Invariants
/// - `inputs` and `outputs` match the body: the builtin arity, or the normal
///   gate's declared inputs and `OUT` wire count.
/// - Normal gates only reference gates that existed before them, so the graph
///   is acyclic.
#[derive(Debug)]
pub struct Gate {
    /// Gate name as written in source.
    name: String,
    /// Number of input bits.
    inputs: usize,
    /// Number of output bits.
    outputs: usize,
    /// Builtin function or node sequence.
    body: GateBody,
}

/// Gate body.
#[derive(Debug)]
pub enum GateBody {
    /// Primitive gate.
    Builtin(Builtin),
    /// Composite gate.
    Normal(NormalGate),
}

/// Primitive gate computed by a transfer function.
#[derive(Clone, Copy)]
pub struct Builtin {
    /// Builtin kind.
    pub kind: BuiltinKind,
    /// Transfer function over the input bits.
    pub function: TransferFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin").field("kind", &self.kind).finish_non_exhaustive()
    }
}

/// Composite gate: an ordered node sequence plus output wires.
///
/// # Invariants
/// - Loop offsets land inside `0..nodes.len()` and are never zero.
#[derive(Debug, Default)]
pub struct NormalGate {
    /// Nodes in evaluation order.
    pub nodes: Vec<Node>,
    /// Wires read as outputs once the sequence finishes.
    pub outputs: WireList,
}

impl NormalGate {
    /// Returns the number of loop nodes in the sequence.
    #[must_use]
    pub fn loop_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.kind() == GateKind::Loop).count()
    }

    /// Moves the child gates out of the node sequence.
    fn take_children(&mut self) -> impl Iterator<Item = Arc<Gate>> + '_ {
        self.nodes.drain(..).filter_map(|node| match node {
            Node::Gate {
                gate,
                ..
            } => Some(gate),
            Node::Loop {
                ..
            } => None,
        })
    }
}

/// Releases child gates with an explicit work list.
///
/// A definition chain can be as long as the source allows, so dropping the
/// last handle must not recurse once per level.
impl Drop for NormalGate {
    fn drop(&mut self) {
        let mut pending: Vec<Arc<Gate>> = self.take_children().collect();
        while let Some(child) = pending.pop() {
            if let Some(mut child) = Arc::into_inner(child)
                && let GateBody::Normal(normal) = &mut child.body
            {
                pending.extend(normal.take_children());
            }
        }
    }
}

/// Entry of a normal gate's node sequence.
#[derive(Debug)]
pub enum Node {
    /// Apply a child gate.
    Gate {
        /// Child gate.
        gate: Arc<Gate>,
        /// Wires read, one per child input.
        inputs: WireList,
        /// Wires written, one per child output.
        outputs: WireList,
        /// Optional source label.
        label: Option<String>,
    },
    /// Move the evaluation cursor by `change` nodes.
    Loop {
        /// Signed offset relative to this node.
        change: isize,
        /// Optional jump condition.
        guard: Option<Guard>,
        /// Optional source label.
        label: Option<String>,
    },
}

impl Node {
    /// Returns the node's gate kind (`Loop` for loop nodes).
    #[must_use]
    pub fn kind(&self) -> GateKind {
        match self {
            Self::Gate {
                gate,
                ..
            } => gate.kind(),
            Self::Loop {
                ..
            } => GateKind::Loop,
        }
    }

    /// Returns the node label, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Gate {
                label,
                ..
            }
            | Self::Loop {
                label,
                ..
            } => label.as_deref(),
        }
    }
}

impl Gate {
    /// Builds a builtin gate of the given kind.
    #[must_use]
    pub fn builtin(kind: BuiltinKind) -> Self {
        let (inputs, outputs) = kind.arity();
        Self {
            name: kind.name().to_string(),
            inputs,
            outputs,
            body: GateBody::Builtin(Builtin {
                kind,
                function: kind.function(),
            }),
        }
    }

    /// Builds a normal gate; the output count is taken from `body.outputs`.
    #[must_use]
    pub fn normal(name: impl Into<String>, inputs: usize, body: NormalGate) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs: body.outputs.len(),
            body: GateBody::Normal(body),
        }
    }

    /// Returns the gate name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of input bits.
    #[must_use]
    pub const fn inputs(&self) -> usize {
        self.inputs
    }

    /// Returns the number of output bits.
    #[must_use]
    pub const fn outputs(&self) -> usize {
        self.outputs
    }

    /// Returns the gate body.
    #[must_use]
    pub const fn body(&self) -> &GateBody {
        &self.body
    }

    /// Returns the gate kind.
    #[must_use]
    pub const fn kind(&self) -> GateKind {
        match self.body {
            GateBody::Builtin(_) => GateKind::Builtin,
            GateBody::Normal(_) => GateKind::Normal,
        }
    }

    /// Evaluates the gate with the given limits and no tracing.
    ///
    /// # Errors
    /// Returns [`EvalError`](crate::EvalError) when inputs have the wrong
    /// arity, a wire is read before it is driven, a loop fails to settle, or a
    /// limit is exceeded.
    pub fn evaluate(&self, inputs: &[bool], limits: EvalLimits) -> GateResult<Vec<bool>> {
        Executor::new(limits).run(self, inputs, &mut NoopTrace)
    }

    /// Returns a serializable summary of the gate signature.
    #[must_use]
    pub fn summary(&self) -> GateSummary {
        let (nodes, loops) = match &self.body {
            GateBody::Builtin(_) => (0, 0),
            GateBody::Normal(normal) => (normal.nodes.len(), normal.loop_count()),
        };
        GateSummary {
            name: self.name.clone(),
            kind: self.kind(),
            inputs: self.inputs,
            outputs: self.outputs,
            nodes,
            loops,
        }
    }
}

// ============================================================================
// SECTION: Summaries
// ============================================================================

/// Serializable gate signature used by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSummary {
    /// Gate name.
    pub name: String,
    /// Gate kind.
    pub kind: GateKind,
    /// Input count.
    pub inputs: usize,
    /// Output count.
    pub outputs: usize,
    /// Node count (zero for builtins).
    pub nodes: usize,
    /// Loop node count.
    pub loops: usize,
}
