// crates/gate-logic/src/executor.rs
// ============================================================================
// Module: Gate Executor
// Description: Wire-table interpreter for builtin and normal gates.
// Purpose: Evaluate gate graphs with loop handling, budgets and trace hooks.
// Dependencies: serde, serde_json, crate::{error, gate}
// ============================================================================

//! ## Overview
//! Normal gates are evaluated by walking their node sequence with a program
//! counter over a table of wire values. Gate nodes read their input wires,
//! evaluate the child recursively and write the produced bits back. Loop
//! nodes move the counter:
//!
//! - A forward loop skips ahead unconditionally (or when its guard holds).
//! - A backward loop is a feedback settle: the span is replayed until the
//!   wire table is unchanged between two arrivals at the loop, bounded by
//!   [`EvalLimits::max_settle_passes`].
//!
//! Every executed node counts toward [`EvalLimits::max_steps`], across all
//! nesting levels, so hostile sources cannot spin forever.

use std::collections::BTreeMap;
use std::io;
use std::io::Write;

use serde::Deserialize;
use serde::Serialize;

use crate::error::EvalError;
use crate::error::GateResult;
use crate::gate::Builtin;
use crate::gate::Gate;
use crate::gate::GateBody;
use crate::gate::Node;
use crate::gate::NormalGate;
use crate::gate::Wire;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default step budget for one evaluation.
pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;
/// Default settle pass budget per feedback loop.
pub const DEFAULT_MAX_SETTLE_PASSES: u32 = 64;
/// Default nesting budget.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Evaluation budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalLimits {
    /// Maximum nodes executed across the whole evaluation.
    pub max_steps: u64,
    /// Maximum replays of a single feedback loop before it counts as unsettled.
    pub max_settle_passes: u32,
    /// Maximum gate nesting depth.
    pub max_depth: usize,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_settle_passes: DEFAULT_MAX_SETTLE_PASSES,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// ============================================================================
// SECTION: Trace Hooks
// ============================================================================

/// What a loop node did when it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoopOutcome {
    /// Forward jump taken.
    Forward {
        /// Node index jumped to.
        target: usize,
    },
    /// Feedback jump taken because wires changed since the last arrival.
    Feedback {
        /// Node index jumped to.
        target: usize,
        /// Pass number (1-based).
        pass: u32,
    },
    /// Wires were unchanged; the loop fell through.
    Settled {
        /// Passes replayed before settling.
        passes: u32,
    },
    /// The guard did not hold; the loop fell through.
    GuardBlocked,
}

/// Trace hook invoked by the executor.
///
/// All methods default to doing nothing so implementors only override the
/// events they care about.
pub trait EvalTrace {
    /// Called when a gate starts evaluating.
    fn on_enter(&mut self, _gate: &Gate, _depth: usize, _inputs: &[bool]) {}

    /// Called after a gate node produced its outputs.
    fn on_node(
        &mut self,
        _gate: &Gate,
        _node: usize,
        _child: &Gate,
        _inputs: &[bool],
        _outputs: &[bool],
    ) {
    }

    /// Called after a loop node decided where to go.
    fn on_loop(&mut self, _gate: &Gate, _node: usize, _outcome: LoopOutcome) {}

    /// Called when a gate finished evaluating.
    fn on_exit(&mut self, _gate: &Gate, _depth: usize, _outputs: &[bool]) {}
}

/// No-op trace hook for fast paths.
///
/// # Invariants
/// - Zero-sized marker type; carries no state.
#[derive(Debug, Default)]
pub struct NoopTrace;

impl EvalTrace for NoopTrace {}

/// Serializable trace event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// A gate started evaluating.
    Enter {
        /// Gate name.
        gate: String,
        /// Nesting depth (0 for the evaluated gate).
        depth: usize,
        /// Input bits.
        inputs: Vec<bool>,
    },
    /// A gate node produced outputs.
    Node {
        /// Parent gate name.
        gate: String,
        /// Node index.
        node: usize,
        /// Child gate name.
        child: String,
        /// Bits read.
        inputs: Vec<bool>,
        /// Bits written.
        outputs: Vec<bool>,
    },
    /// A loop node decided where to go.
    Loop {
        /// Parent gate name.
        gate: String,
        /// Node index.
        node: usize,
        /// Decision taken.
        #[serde(flatten)]
        outcome: LoopOutcome,
    },
    /// A gate finished evaluating.
    Exit {
        /// Gate name.
        gate: String,
        /// Nesting depth.
        depth: usize,
        /// Output bits.
        outputs: Vec<bool>,
    },
}

/// Trace hook that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingTrace {
    /// Events in the order they occurred.
    pub events: Vec<TraceEvent>,
}

impl EvalTrace for RecordingTrace {
    fn on_enter(&mut self, gate: &Gate, depth: usize, inputs: &[bool]) {
        self.events.push(TraceEvent::Enter {
            gate: gate.name().to_string(),
            depth,
            inputs: inputs.to_vec(),
        });
    }

    fn on_node(&mut self, gate: &Gate, node: usize, child: &Gate, inputs: &[bool], outputs: &[bool]) {
        self.events.push(TraceEvent::Node {
            gate: gate.name().to_string(),
            node,
            child: child.name().to_string(),
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
        });
    }

    fn on_loop(&mut self, gate: &Gate, node: usize, outcome: LoopOutcome) {
        self.events.push(TraceEvent::Loop {
            gate: gate.name().to_string(),
            node,
            outcome,
        });
    }

    fn on_exit(&mut self, gate: &Gate, depth: usize, outputs: &[bool]) {
        self.events.push(TraceEvent::Exit {
            gate: gate.name().to_string(),
            depth,
            outputs: outputs.to_vec(),
        });
    }
}

/// Trace hook that streams events as JSON lines.
///
/// Write failures are latched; the first one is reported by
/// [`JsonLinesTrace::finish`] and later events are dropped.
pub struct JsonLinesTrace<W: Write> {
    /// Destination for JSON lines.
    writer: W,
    /// Reused event buffer.
    recorder: RecordingTrace,
    /// First write failure, if any.
    error: Option<io::Error>,
}

impl<W: Write> JsonLinesTrace<W> {
    /// Creates a trace writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            recorder: RecordingTrace::default(),
            error: None,
        }
    }

    /// Flushes the writer and returns the first write failure, if any.
    ///
    /// # Errors
    /// Returns the first I/O error encountered while streaming events.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    /// Writes buffered events.
    fn drain(&mut self) {
        for event in self.recorder.events.drain(..) {
            if self.error.is_some() {
                continue;
            }
            let result = serde_json::to_writer(&mut self.writer, &event)
                .map_err(io::Error::from)
                .and_then(|()| self.writer.write_all(b"\n"));
            if let Err(err) = result {
                self.error = Some(err);
            }
        }
    }
}

impl<W: Write> EvalTrace for JsonLinesTrace<W> {
    fn on_enter(&mut self, gate: &Gate, depth: usize, inputs: &[bool]) {
        self.recorder.on_enter(gate, depth, inputs);
        self.drain();
    }

    fn on_node(&mut self, gate: &Gate, node: usize, child: &Gate, inputs: &[bool], outputs: &[bool]) {
        self.recorder.on_node(gate, node, child, inputs, outputs);
        self.drain();
    }

    fn on_loop(&mut self, gate: &Gate, node: usize, outcome: LoopOutcome) {
        self.recorder.on_loop(gate, node, outcome);
        self.drain();
    }

    fn on_exit(&mut self, gate: &Gate, depth: usize, outputs: &[bool]) {
        self.recorder.on_exit(gate, depth, outputs);
        self.drain();
    }
}

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Per-loop settle state.
#[derive(Debug, Default)]
struct SettleState {
    /// Wire table captured at the previous arrival.
    snapshot: Option<BTreeMap<Wire, bool>>,
    /// Feedback passes taken since the loop was last entered.
    passes: u32,
}

/// Gate evaluator carrying the step budget across nested calls.
#[derive(Debug)]
pub struct Executor {
    /// Budgets for this evaluation.
    limits: EvalLimits,
    /// Nodes executed so far.
    steps: u64,
}

impl Executor {
    /// Creates an executor with the given budgets.
    #[must_use]
    pub const fn new(limits: EvalLimits) -> Self {
        Self {
            limits,
            steps: 0,
        }
    }

    /// Returns the number of nodes executed so far.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Evaluates `gate` on `inputs`, reporting events to `trace`.
    ///
    /// # Errors
    /// Returns [`EvalError`] on arity mismatches, reads of undriven wires,
    /// unsettled feedback loops, out-of-range jumps, or exhausted budgets.
    pub fn run<T>(&mut self, gate: &Gate, inputs: &[bool], trace: &mut T) -> GateResult<Vec<bool>>
    where
        T: EvalTrace + ?Sized,
    {
        self.eval(gate, inputs, 0, trace)
    }

    /// Evaluates a gate at the given nesting depth.
    fn eval<T>(
        &mut self,
        gate: &Gate,
        inputs: &[bool],
        depth: usize,
        trace: &mut T,
    ) -> GateResult<Vec<bool>>
    where
        T: EvalTrace + ?Sized,
    {
        if inputs.len() != gate.inputs() {
            return Err(EvalError::InputArity {
                gate: gate.name().to_string(),
                expected: gate.inputs(),
                actual: inputs.len(),
            });
        }
        if depth > self.limits.max_depth {
            return Err(EvalError::TooDeep {
                max_depth: self.limits.max_depth,
            });
        }

        trace.on_enter(gate, depth, inputs);
        let outputs = match gate.body() {
            GateBody::Builtin(builtin) => Self::eval_builtin(gate, *builtin, inputs)?,
            GateBody::Normal(normal) => self.eval_normal(gate, normal, inputs, depth, trace)?,
        };
        trace.on_exit(gate, depth, &outputs);
        Ok(outputs)
    }

    /// Applies a builtin transfer function.
    fn eval_builtin(gate: &Gate, builtin: Builtin, inputs: &[bool]) -> GateResult<Vec<bool>> {
        let outputs = (builtin.function)(inputs);
        if outputs.len() != gate.outputs() {
            return Err(EvalError::OutputArity {
                gate: gate.name().to_string(),
                expected: gate.outputs(),
                actual: outputs.len(),
            });
        }
        Ok(outputs)
    }

    /// Walks a normal gate's node sequence.
    fn eval_normal<T>(
        &mut self,
        gate: &Gate,
        normal: &NormalGate,
        inputs: &[bool],
        depth: usize,
        trace: &mut T,
    ) -> GateResult<Vec<bool>>
    where
        T: EvalTrace + ?Sized,
    {
        let mut wires: BTreeMap<Wire, bool> =
            inputs.iter().copied().enumerate().map(|(index, value)| (Wire(index), value)).collect();
        let mut settles: BTreeMap<usize, SettleState> = BTreeMap::new();
        let mut buffer = Vec::new();
        let mut pc = 0usize;

        while let Some(node) = normal.nodes.get(pc) {
            self.tick()?;
            match node {
                Node::Gate {
                    gate: child,
                    inputs: reads,
                    outputs: writes,
                    ..
                } => {
                    buffer.clear();
                    for wire in reads {
                        buffer.push(read_wire(&wires, gate, Some(pc), *wire)?);
                    }
                    let produced = self.eval(child, &buffer, depth + 1, trace)?;
                    trace.on_node(gate, pc, child, &buffer, &produced);
                    for (wire, value) in writes.iter().zip(produced) {
                        wires.insert(*wire, value);
                    }
                    pc += 1;
                }
                Node::Loop {
                    change,
                    guard,
                    ..
                } => {
                    let target = jump_target(pc, *change, normal.nodes.len()).ok_or_else(|| {
                        EvalError::InvalidJump {
                            gate: gate.name().to_string(),
                            node: pc,
                            change: *change,
                        }
                    })?;
                    let guard_holds = match guard {
                        Some(guard) => guard.passes(read_wire(&wires, gate, Some(pc), guard.wire)?),
                        None => true,
                    };

                    let outcome = if !guard_holds {
                        settles.remove(&pc);
                        LoopOutcome::GuardBlocked
                    } else if *change > 0 {
                        LoopOutcome::Forward {
                            target,
                        }
                    } else {
                        self.settle(gate, pc, target, &wires, &mut settles)?
                    };
                    trace.on_loop(gate, pc, outcome);

                    pc = match outcome {
                        LoopOutcome::Forward {
                            target,
                        }
                        | LoopOutcome::Feedback {
                            target,
                            ..
                        } => target,
                        LoopOutcome::Settled {
                            ..
                        }
                        | LoopOutcome::GuardBlocked => pc + 1,
                    };
                }
            }
        }

        normal.outputs.iter().map(|wire| read_wire(&wires, gate, None, *wire)).collect()
    }

    /// Decides whether a backward loop replays its span or falls through.
    fn settle(
        &self,
        gate: &Gate,
        node: usize,
        target: usize,
        wires: &BTreeMap<Wire, bool>,
        settles: &mut BTreeMap<usize, SettleState>,
    ) -> GateResult<LoopOutcome> {
        let state = settles.entry(node).or_default();
        if state.snapshot.as_ref() == Some(wires) {
            let passes = state.passes;
            settles.remove(&node);
            return Ok(LoopOutcome::Settled {
                passes,
            });
        }

        state.passes += 1;
        if state.passes > self.limits.max_settle_passes {
            return Err(EvalError::Unsettled {
                gate: gate.name().to_string(),
                node,
                max_passes: self.limits.max_settle_passes,
            });
        }
        state.snapshot = Some(wires.clone());
        Ok(LoopOutcome::Feedback {
            target,
            pass: state.passes,
        })
    }

    /// Counts one executed node against the step budget.
    fn tick(&mut self) -> GateResult<()> {
        self.steps += 1;
        if self.steps > self.limits.max_steps {
            return Err(EvalError::StepLimitExceeded {
                max_steps: self.limits.max_steps,
            });
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a driven wire or reports which node read it too early.
fn read_wire(
    wires: &BTreeMap<Wire, bool>,
    gate: &Gate,
    node: Option<usize>,
    wire: Wire,
) -> GateResult<bool> {
    wires.get(&wire).copied().ok_or_else(|| EvalError::UnassignedWire {
        gate: gate.name().to_string(),
        node,
        wire: wire.index(),
    })
}

/// Resolves a relative jump, rejecting zero offsets and out-of-range targets.
fn jump_target(pc: usize, change: isize, len: usize) -> Option<usize> {
    if change == 0 {
        return None;
    }
    pc.checked_add_signed(change).filter(|target| *target < len)
}
