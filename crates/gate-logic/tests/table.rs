// crates/gate-logic/tests/table.rs
// ============================================================================
// Module: Truth Table Tests
// Description: Tests for exhaustive evaluation and bit-string helpers.
// Purpose: Validate row order, rendering and table limits.
// Dependencies: gate_logic::table
// ============================================================================

//! ## Overview
//! Validates truth table construction, its text rendering and bit parsing.

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

use gate_logic::EvalError;
use gate_logic::EvalLimits;
use gate_logic::Library;
use gate_logic::Prelude;
use gate_logic::format_bits;
use gate_logic::parse_bits;
use gate_logic::table::BitsError;
use gate_logic::table::MAX_TABLE_INPUTS;
use gate_logic::table::TableError;
use gate_logic::truth_table;
use support::TestResult;
use support::ensure;

/// Half adder, a 21-input buffer and an oscillator.
const SOURCE: &str = "\
DEF:half_adder->2
XOR:0,1->2
AND:0,1->3
OUT:2,3
DEF:wide->21
BUF:0->21
OUT:21
DEF:ring->1
LOW:->1
spin;NOT:1->1
GOTO:spin
OUT:1
";

/// Tests row order with input 0 as the most significant bit.
#[test]
fn test_half_adder_rows() -> TestResult {
    let library = Library::compile(SOURCE, Prelude::Standard)?;
    let gate = library.get("half_adder").ok_or("missing half_adder")?;
    let table = truth_table(gate, EvalLimits::default(), 16)?;

    ensure(table.inputs == 2 && table.outputs == 2, "Expected 2 -> 2 table")?;
    let rendered: Vec<String> = table
        .rows
        .iter()
        .map(|row| format!("{}:{}", format_bits(&row.inputs), format_bits(&row.outputs)))
        .collect();
    ensure(
        rendered == ["00:00", "01:10", "10:10", "11:01"],
        format!("Unexpected rows {rendered:?}"),
    )?;
    Ok(())
}

/// Tests the aligned text rendering.
#[test]
fn test_table_display() -> TestResult {
    let library = Library::compile(SOURCE, Prelude::Standard)?;
    let gate = library.get("half_adder").ok_or("missing half_adder")?;
    let text = truth_table(gate, EvalLimits::default(), 16)?.to_string();
    let lines: Vec<&str> = text.lines().collect();
    ensure(lines.len() == 5, format!("Unexpected table text {text}"))?;
    ensure(lines[0] == "in0 in1 | out0 out1", "Expected header")?;
    ensure(lines[1] == "0   0   | 0    0", format!("Unexpected first row `{}`", lines[1]))?;
    ensure(lines[4] == "1   1   | 0    1", format!("Unexpected last row `{}`", lines[4]))?;
    Ok(())
}

/// Tests the configured and hard input limits.
#[test]
fn test_table_input_limits() -> TestResult {
    let library = Library::compile(SOURCE, Prelude::Standard)?;
    let half_adder = library.get("half_adder").ok_or("missing half_adder")?;
    ensure(
        truth_table(half_adder, EvalLimits::default(), 1).err()
            == Some(TableError::TooManyInputs {
                gate: "half_adder".to_string(),
                inputs: 2,
                max: 1,
            }),
        "Expected the configured limit to apply",
    )?;

    let wide = library.get("wide").ok_or("missing wide")?;
    ensure(
        truth_table(wide, EvalLimits::default(), usize::MAX).err()
            == Some(TableError::TooManyInputs {
                gate: "wide".to_string(),
                inputs: 21,
                max: MAX_TABLE_INPUTS,
            }),
        "Expected the hard cap to apply",
    )?;
    Ok(())
}

/// Tests that a failing row is reported with its index.
#[test]
fn test_table_row_failure() -> TestResult {
    let library = Library::compile(SOURCE, Prelude::Standard)?;
    let ring = library.get("ring").ok_or("missing ring")?;
    let err = truth_table(ring, EvalLimits::default(), 16).err();
    ensure(
        matches!(
            &err,
            Some(TableError::Eval { row: 0, source: EvalError::Unsettled { node: 2, .. } })
        ),
        format!("Expected row 0 to be unsettled, got {err:?}"),
    )?;
    Ok(())
}

/// Tests bit parsing and formatting.
#[test]
fn test_bits() -> TestResult {
    ensure(parse_bits("1 0,1")? == vec![true, false, true], "Expected separators to be ignored")?;
    ensure(parse_bits("")?.is_empty(), "Expected empty input to parse")?;
    ensure(
        parse_bits("102").err()
            == Some(BitsError {
                found: '2',
                position: 2,
            }),
        "Expected the offending character",
    )?;
    ensure(format_bits(&[true, false, false]) == "100", "Expected compact output")?;
    Ok(())
}
