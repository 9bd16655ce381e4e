// crates/gate-logic/tests/library.rs
// ============================================================================
// Module: Library Compiler Tests
// Description: Tests for compiling gate sources into a library.
// Purpose: Validate name resolution, arity checks, labels and wire checks.
// Dependencies: gate_logic::library
// ============================================================================

//! ## Overview
//! Validates compiled gate signatures and every compile-time diagnostic.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use gate_logic::CompileError;
use gate_logic::EvalLimits;
use gate_logic::GateKind;
use gate_logic::LexError;
use gate_logic::Library;
use gate_logic::Prelude;
use gate_logic::lexer::lex;
use support::TestResult;
use support::ensure;

/// Two-bit half adder used across tests.
const HALF_ADDER: &str = "DEF:half_adder->2\nXOR:0,1->2\nAND:0,1->3\nOUT:2,3\n";

/// Compiles `source` with the standard prelude and returns the error.
fn compile_err(source: &str) -> Option<CompileError> {
    Library::compile(source, Prelude::Standard).err()
}

// ============================================================================
// SECTION: Successful Compilation
// ============================================================================

/// Tests registration order and summaries.
#[test]
fn test_compile_registers_after_prelude() -> TestResult {
    let library = Library::compile(HALF_ADDER, Prelude::Standard)?;
    ensure(library.len() == Prelude::Standard.kinds().len() + 1, "Expected prelude plus one")?;
    ensure(library.names().last() == Some("half_adder"), "Expected definition last")?;
    ensure(library.names().next() == Some("AND"), "Expected builtins first")?;

    let summary = library.summaries().pop().ok_or("missing summary")?;
    ensure(summary.kind == GateKind::Normal, "Expected normal gate")?;
    ensure(summary.inputs == 2 && summary.outputs == 2, "Expected 2 -> 2 signature")?;
    ensure(summary.nodes == 2 && summary.loops == 0, "Expected two nodes and no loops")?;
    Ok(())
}

/// Tests composing gates from the minimal prelude.
#[test]
fn test_minimal_prelude_composition() -> TestResult {
    let source = "\
DEF:nand->2
AND:0,1->2
NOT:2->3
OUT:3
DEF:or->2
NOT:0->2
NOT:1->3
nand:2,3->4
OUT:4
";
    let library = Library::compile(source, Prelude::Minimal)?;
    ensure(library.len() == 4, "Expected AND, NOT and two definitions")?;
    let or = library.get("or").ok_or("missing or")?;
    for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
        let out = or.evaluate(&[a, b], EvalLimits::default())?;
        ensure(out == vec![a || b], format!("Unexpected OR output for {a} {b}"))?;
    }
    ensure(
        compile_err_minimal("DEF:x->2\nXOR:0,1->2\nOUT:2\n")
            == Some(CompileError::UnknownGate {
                line: 2,
                name: "XOR".to_string(),
            }),
        "Expected XOR to be missing from the minimal prelude",
    )?;
    Ok(())
}

/// Compiles `source` with the minimal prelude and returns the error.
fn compile_err_minimal(source: &str) -> Option<CompileError> {
    Library::compile(source, Prelude::Minimal).err()
}

/// Tests that labels resolve to relative loop offsets.
#[test]
fn test_compile_counts_loops() -> TestResult {
    let source = "DEF:ring->1\nLOW:->1\nspin;NOT:1->1\nGOTO:spin\nOUT:1\n";
    let library = Library::compile(source, Prelude::Standard)?;
    let summary = library.get("ring").ok_or("missing ring")?.summary();
    ensure(summary.nodes == 3 && summary.loops == 1, "Expected one loop among three nodes")?;
    Ok(())
}

/// Tests that a failed extend leaves the library untouched.
#[test]
fn test_extend_is_atomic() -> TestResult {
    let mut library = Library::compile(HALF_ADDER, Prelude::Standard)?;
    let before = library.len();

    let bad = lex("DEF:ok->1\nNOT:0->1\nOUT:1\nDEF:bad->1\nNOPE:0->1\nOUT:1\n")?;
    let err = library.extend(bad).err();
    ensure(
        err == Some(CompileError::UnknownGate {
            line: 5,
            name: "NOPE".to_string(),
        }),
        format!("Expected UnknownGate, got {err:?}"),
    )?;
    ensure(library.get("ok").is_none(), "Expected earlier definition to be discarded")?;
    ensure(library.len() == before, "Expected library size to be unchanged")?;

    library.extend(lex("DEF:full->2\nhalf_adder:0,1->2,3\nOUT:3,2\n")?)?;
    ensure(library.get("full").is_some(), "Expected extend to reuse earlier gates")?;
    Ok(())
}

// ============================================================================
// SECTION: Diagnostics
// ============================================================================

/// Tests definition-level errors.
#[test]
fn test_definition_errors() -> TestResult {
    ensure(
        compile_err("DEF:AND->2\nAND:0,1->2\nOUT:2\n")
            == Some(CompileError::DuplicateGate {
                line: 1,
                name: "AND".to_string(),
            }),
        "Expected DuplicateGate",
    )?;
    ensure(
        compile_err("DEF:z->0\nHIGH:->1\nOUT:1\n")
            == Some(CompileError::ZeroInputs {
                line: 1,
                name: "z".to_string(),
            }),
        "Expected ZeroInputs",
    )?;
    ensure(
        compile_err("AND:0,1->2\n")
            == Some(CompileError::StatementOutsideDefinition {
                line: 1,
            }),
        "Expected StatementOutsideDefinition",
    )?;
    ensure(
        compile_err("DEF:x->1\nNOT:0->1\nDEF:y->1\nNOT:0->1\nOUT:1\n")
            == Some(CompileError::MissingOutputs {
                line: 1,
                name: "x".to_string(),
            }),
        "Expected MissingOutputs for an unterminated definition",
    )?;
    ensure(
        compile_err("DEF:x->1\nNOT:0->1\n")
            == Some(CompileError::MissingOutputs {
                line: 1,
                name: "x".to_string(),
            }),
        "Expected MissingOutputs at end of input",
    )?;
    ensure(
        compile_err("DEF:x->1\nNOT:0->1\nOUT:\n")
            == Some(CompileError::EmptyOutputs {
                line: 3,
            }),
        "Expected EmptyOutputs",
    )?;
    ensure(
        compile_err("DEF:x->1\nNOT:0->1\nOUT:1\nNOT:1->2\n")
            == Some(CompileError::StatementAfterOut {
                line: 4,
                name: "x".to_string(),
            }),
        "Expected StatementAfterOut",
    )?;
    Ok(())
}

/// Tests arity errors on gate applications.
#[test]
fn test_arity_errors() -> TestResult {
    ensure(
        compile_err("DEF:x->2\nNOT:0,1->2\nOUT:2\n")
            == Some(CompileError::InputArity {
                line: 2,
                name: "NOT".to_string(),
                expected: 1,
                actual: 2,
            }),
        "Expected InputArity",
    )?;
    ensure(
        compile_err("DEF:x->2\nAND:0,1->2,3\nOUT:2\n")
            == Some(CompileError::OutputArity {
                line: 2,
                name: "AND".to_string(),
                expected: 1,
                actual: 2,
            }),
        "Expected OutputArity",
    )?;
    Ok(())
}

/// Tests label resolution errors.
#[test]
fn test_label_errors() -> TestResult {
    ensure(
        compile_err("DEF:x->1\na;NOT:0->1\na;NOT:1->2\nOUT:2\n")
            == Some(CompileError::DuplicateLabel {
                line: 3,
                label: "a".to_string(),
            }),
        "Expected DuplicateLabel",
    )?;
    ensure(
        compile_err("DEF:x->1\nNOT:0->1\nGOTO:nowhere\nOUT:1\n")
            == Some(CompileError::UnknownLabel {
                line: 3,
                label: "nowhere".to_string(),
            }),
        "Expected UnknownLabel",
    )?;
    ensure(
        compile_err("DEF:x->1\nNOT:0->1\nspin;GOTO:spin\nOUT:1\n")
            == Some(CompileError::SelfLoop {
                line: 3,
                label: "spin".to_string(),
            }),
        "Expected SelfLoop",
    )?;
    Ok(())
}

/// Tests wires that are read but never driven.
#[test]
fn test_unassigned_wire_errors() -> TestResult {
    let err = compile_err("DEF:x->1\nAND:0,5->1\nOUT:1\n");
    ensure(
        err == Some(CompileError::UnassignedWire {
            line: 2,
            wire: 5,
        }),
        format!("Expected UnassignedWire, got {err:?}"),
    )?;
    ensure(err.and_then(|err| err.line()) == Some(2), "Expected the error line")?;
    ensure(
        compile_err("DEF:x->1\ntop;NOT:0->1\nGOTO:top?7\nOUT:1\n")
            == Some(CompileError::UnassignedWire {
                line: 3,
                wire: 7,
            }),
        "Expected guard wires to be checked too",
    )?;
    ensure(
        compile_err("DEF:x->1\nNOT:0->1\nOUT:1,9\n")
            == Some(CompileError::UnassignedWire {
                line: 3,
                wire: 9,
            }),
        "Expected output wires to be checked",
    )?;
    Ok(())
}

/// Tests that lexing failures surface unchanged.
#[test]
fn test_lex_errors_pass_through() -> TestResult {
    ensure(
        compile_err("") == Some(CompileError::Lex(LexError::EmptyInput)),
        "Expected EmptyInput",
    )?;
    let err = compile_err("DEF:x->2\nXOX:0,1->2\nOUT:2\n");
    ensure(
        err.as_ref().map(ToString::to_string)
            == Some("line 2: gate `XOX` does not exist".to_string()),
        format!("Unexpected message for {err:?}"),
    )?;
    Ok(())
}

// ============================================================================
// SECTION: Long Definition Chains
// ============================================================================

/// Number of definitions in the chain tests.
const CHAIN_LENGTH: usize = 40_000;

/// Builds `g0 .. g{len-1}` where every gate wraps the one before it.
fn chain_source(len: usize) -> String {
    let mut source = String::from("DEF:g0->1\nNOT:0->1\nOUT:1\n");
    for index in 1 .. len {
        source.push_str(&format!("DEF:g{index}->1\ng{}:0->1\nOUT:1\n", index - 1));
    }
    source
}

/// Tests that a long definition chain compiles, evaluates and drops cleanly.
#[test]
fn test_long_chain_drops_without_recursion() -> TestResult {
    let source = chain_source(CHAIN_LENGTH);
    let library = Library::compile_with_limit(&source, Prelude::Standard, 4 * 1024 * 1024)?;
    ensure(
        library.len() == Prelude::Standard.kinds().len() + CHAIN_LENGTH,
        "Expected every chain definition registered",
    )?;
    let shallow = library.get("g10").ok_or("missing g10")?;
    ensure(
        shallow.evaluate(&[true], EvalLimits::default())? == vec![false],
        "Expected the chain to forward the inverted input",
    )?;
    drop(library);
    Ok(())
}

/// Tests that the newest gate can outlive its library and still drop cleanly.
#[test]
fn test_long_chain_outlives_library() -> TestResult {
    let source = chain_source(CHAIN_LENGTH);
    let library = Library::compile_with_limit(&source, Prelude::Standard, 4 * 1024 * 1024)?;
    let newest = std::sync::Arc::clone(
        library.get(&format!("g{}", CHAIN_LENGTH - 1)).ok_or("missing newest gate")?,
    );
    drop(library);
    ensure(newest.summary().nodes == 1, "Expected a single wrapping node")?;
    drop(newest);
    Ok(())
}
