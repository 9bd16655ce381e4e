// crates/gate-logic/src/library.rs
// ============================================================================
// Module: Gate Library
// Description: Registry of builtin and compiled gates.
// Purpose: Compile lexed statements into validated, shareable gates.
// Dependencies: crate::{builtin, error, gate, lexer}
// ============================================================================

//! ## Overview
//! A [`Library`] maps gate names to immutable [`Gate`]s. It starts from a
//! builtin [`Prelude`] and grows as source definitions are compiled. Gates can
//! only reference names registered before their own `DEF`, which keeps every
//! gate graph acyclic.
//!
//! Compilation resolves gate names, checks arity, resolves `GOTO` labels into
//! relative loop offsets and rejects wires that are read but never driven.
//! A failed [`Library::extend`] leaves the library untouched.
//!
//! ```
//! use gate_logic::Library;
//! use gate_logic::Prelude;
//! use gate_logic::EvalLimits;
//!
//! let source = "DEF:half_adder->2\nXOR:0,1->2\nAND:0,1->3\nOUT:2,3\n";
//! let library = Library::compile(source, Prelude::Standard).unwrap();
//! let gate = library.get("half_adder").unwrap();
//! assert_eq!(gate.evaluate(&[true, true], EvalLimits::default()).unwrap(), vec![false, true]);
//! ```

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::builtin::Prelude;
use crate::error::CompileError;
use crate::gate::Gate;
use crate::gate::GateSummary;
use crate::gate::Guard;
use crate::gate::Node;
use crate::gate::NormalGate;
use crate::gate::Wire;
use crate::lexer::Statement;
use crate::lexer::WireList;
use crate::lexer::lex_with_limit;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum nodes in a single definition.
pub const MAX_NODES_PER_GATE: usize = 65_536;

// ============================================================================
// SECTION: Library
// ============================================================================

/// Registry of gates available to definitions and callers.
///
/// # Invariants
/// - `order` and `gates` hold the same gates; `order` is registration order.
/// - Names are unique.
#[derive(Debug, Clone, Default)]
pub struct Library {
    /// Gates by name.
    gates: BTreeMap<String, Arc<Gate>>,
    /// Gates in registration order.
    order: Vec<Arc<Gate>>,
}

impl Library {
    /// Creates a library holding the builtins of `prelude`.
    #[must_use]
    pub fn with_prelude(prelude: Prelude) -> Self {
        let mut library = Self::default();
        for kind in prelude.kinds() {
            library.insert(Arc::new(Gate::builtin(*kind)));
        }
        library
    }

    /// Lexes and compiles `source` on top of `prelude`.
    ///
    /// # Errors
    /// Returns [`CompileError`] for lexing failures or invalid definitions.
    pub fn compile(source: &str, prelude: Prelude) -> Result<Self, CompileError> {
        Self::compile_with_limit(source, prelude, crate::lexer::MAX_SOURCE_BYTES)
    }

    /// Like [`Library::compile`] with an explicit source size limit.
    ///
    /// # Errors
    /// Returns [`CompileError`] for lexing failures or invalid definitions.
    pub fn compile_with_limit(
        source: &str,
        prelude: Prelude,
        max_bytes: usize,
    ) -> Result<Self, CompileError> {
        let statements = lex_with_limit(source, max_bytes)?;
        let mut library = Self::with_prelude(prelude);
        library.extend(statements)?;
        Ok(library)
    }

    /// Compiles `statements` into new gates.
    ///
    /// The library is only updated when every definition compiles.
    ///
    /// # Errors
    /// Returns the first [`CompileError`] found, in source order.
    pub fn extend(&mut self, statements: Vec<Statement>) -> Result<(), CompileError> {
        let mut staged = self.clone();
        let mut current: Option<PendingGate> = None;

        for statement in statements {
            match statement {
                Statement::Def {
                    line,
                    name,
                    inputs,
                } => {
                    if let Some(pending) = current.take() {
                        staged.insert(Arc::new(pending.finish()?));
                    }
                    if staged.gates.contains_key(&name) {
                        return Err(CompileError::DuplicateGate {
                            line,
                            name,
                        });
                    }
                    if inputs == 0 {
                        return Err(CompileError::ZeroInputs {
                            line,
                            name,
                        });
                    }
                    current = Some(PendingGate::new(line, name, inputs));
                }
                Statement::Gate {
                    line,
                    label,
                    gate,
                    inputs,
                    outputs,
                } => {
                    let pending = open_body(&mut current, line)?;
                    let child = staged.gates.get(&gate).cloned().ok_or_else(|| {
                        CompileError::UnknownGate {
                            line,
                            name: gate.clone(),
                        }
                    })?;
                    pending.push_gate(line, label, child, inputs, outputs)?;
                }
                Statement::Goto {
                    line,
                    label,
                    target,
                    guard,
                } => {
                    let pending = open_body(&mut current, line)?;
                    pending.push_loop(line, label, target, guard)?;
                }
                Statement::Out {
                    line,
                    outputs,
                } => {
                    let pending = open_body(&mut current, line)?;
                    pending.set_outputs(line, outputs)?;
                }
            }
        }

        if let Some(pending) = current.take() {
            staged.insert(Arc::new(pending.finish()?));
        }
        *self = staged;
        Ok(())
    }

    /// Returns the gate registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<Gate>> {
        self.gates.get(name)
    }

    /// Returns gate names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|gate| gate.name())
    }

    /// Returns gates in registration order.
    #[must_use]
    pub fn gates(&self) -> &[Arc<Gate>] {
        &self.order
    }

    /// Returns summaries of every gate in registration order.
    #[must_use]
    pub fn summaries(&self) -> Vec<GateSummary> {
        self.order.iter().map(|gate| gate.summary()).collect()
    }

    /// Returns the number of registered gates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true when no gates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registers a gate under its own name.
    fn insert(&mut self, gate: Arc<Gate>) {
        self.gates.insert(gate.name().to_string(), Arc::clone(&gate));
        self.order.push(gate);
    }
}

/// Returns the open definition for a body statement.
fn open_body(current: &mut Option<PendingGate>, line: usize) -> Result<&mut PendingGate, CompileError> {
    let pending = current.as_mut().ok_or(CompileError::StatementOutsideDefinition {
        line,
    })?;
    if pending.outputs.is_some() {
        return Err(CompileError::StatementAfterOut {
            line,
            name: pending.name.clone(),
        });
    }
    Ok(pending)
}

// ============================================================================
// SECTION: Pending Definitions
// ============================================================================

/// Unresolved `GOTO` waiting for its label.
#[derive(Debug)]
struct PendingJump {
    /// Index of the loop node.
    node: usize,
    /// Source line of the `GOTO`.
    line: usize,
    /// Target label.
    target: String,
}

/// Definition being assembled from body statements.
#[derive(Debug)]
struct PendingGate {
    /// Line of the `DEF`.
    line: usize,
    /// Gate name.
    name: String,
    /// Declared input count.
    inputs: usize,
    /// Nodes so far; loop offsets are patched in [`PendingGate::finish`].
    nodes: Vec<Node>,
    /// Label to node index.
    labels: BTreeMap<String, usize>,
    /// Jumps to resolve.
    jumps: Vec<PendingJump>,
    /// Wires read, with the line reading them.
    reads: Vec<(Wire, usize)>,
    /// Wires written by any node.
    written: BTreeSet<Wire>,
    /// Output wires once `OUT` is seen.
    outputs: Option<WireList>,
}

impl PendingGate {
    /// Opens a definition.
    const fn new(line: usize, name: String, inputs: usize) -> Self {
        Self {
            line,
            name,
            inputs,
            nodes: Vec::new(),
            labels: BTreeMap::new(),
            jumps: Vec::new(),
            reads: Vec::new(),
            written: BTreeSet::new(),
            outputs: None,
        }
    }

    /// Reserves a node slot and registers its label.
    fn reserve(&mut self, line: usize, label: Option<&String>) -> Result<usize, CompileError> {
        let index = self.nodes.len();
        if index >= MAX_NODES_PER_GATE {
            return Err(CompileError::TooManyNodes {
                line,
                name: self.name.clone(),
                max: MAX_NODES_PER_GATE,
            });
        }
        if let Some(label) = label {
            if self.labels.insert(label.clone(), index).is_some() {
                return Err(CompileError::DuplicateLabel {
                    line,
                    label: label.clone(),
                });
            }
        }
        Ok(index)
    }

    /// Appends a gate application.
    fn push_gate(
        &mut self,
        line: usize,
        label: Option<String>,
        gate: Arc<Gate>,
        inputs: WireList,
        outputs: WireList,
    ) -> Result<(), CompileError> {
        if inputs.len() != gate.inputs() {
            return Err(CompileError::InputArity {
                line,
                name: gate.name().to_string(),
                expected: gate.inputs(),
                actual: inputs.len(),
            });
        }
        if outputs.len() != gate.outputs() {
            return Err(CompileError::OutputArity {
                line,
                name: gate.name().to_string(),
                expected: gate.outputs(),
                actual: outputs.len(),
            });
        }
        self.reserve(line, label.as_ref())?;
        self.reads.extend(inputs.iter().map(|wire| (*wire, line)));
        self.written.extend(outputs.iter().copied());
        self.nodes.push(Node::Gate {
            gate,
            inputs,
            outputs,
            label,
        });
        Ok(())
    }

    /// Appends a loop whose offset is resolved later.
    fn push_loop(
        &mut self,
        line: usize,
        label: Option<String>,
        target: String,
        guard: Option<Guard>,
    ) -> Result<(), CompileError> {
        let node = self.reserve(line, label.as_ref())?;
        if let Some(guard) = guard {
            self.reads.push((guard.wire, line));
        }
        self.jumps.push(PendingJump {
            node,
            line,
            target,
        });
        self.nodes.push(Node::Loop {
            change: 0,
            guard,
            label,
        });
        Ok(())
    }

    /// Records the `OUT` wires.
    fn set_outputs(&mut self, line: usize, outputs: WireList) -> Result<(), CompileError> {
        if outputs.is_empty() {
            return Err(CompileError::EmptyOutputs {
                line,
            });
        }
        self.reads.extend(outputs.iter().map(|wire| (*wire, line)));
        self.outputs = Some(outputs);
        Ok(())
    }

    /// Resolves jumps, checks wires and builds the gate.
    fn finish(mut self) -> Result<Gate, CompileError> {
        let Some(outputs) = self.outputs.take() else {
            return Err(CompileError::MissingOutputs {
                line: self.line,
                name: self.name,
            });
        };

        for jump in &self.jumps {
            let Some(&target) = self.labels.get(&jump.target) else {
                return Err(CompileError::UnknownLabel {
                    line: jump.line,
                    label: jump.target.clone(),
                });
            };
            if target == jump.node {
                return Err(CompileError::SelfLoop {
                    line: jump.line,
                    label: jump.target.clone(),
                });
            }
            let change = relative_offset(jump.node, target).ok_or_else(|| {
                CompileError::TooManyNodes {
                    line: jump.line,
                    name: self.name.clone(),
                    max: MAX_NODES_PER_GATE,
                }
            })?;
            if let Some(Node::Loop {
                change: slot,
                ..
            }) = self.nodes.get_mut(jump.node)
            {
                *slot = change;
            }
        }

        for (wire, line) in &self.reads {
            if wire.index() >= self.inputs && !self.written.contains(wire) {
                return Err(CompileError::UnassignedWire {
                    line: *line,
                    wire: wire.index(),
                });
            }
        }

        Ok(Gate::normal(self.name, self.inputs, NormalGate {
            nodes: self.nodes,
            outputs,
        }))
    }
}

/// Computes `target - node` as a signed offset.
fn relative_offset(node: usize, target: usize) -> Option<isize> {
    let node = isize::try_from(node).ok()?;
    let target = isize::try_from(target).ok()?;
    target.checked_sub(node)
}
