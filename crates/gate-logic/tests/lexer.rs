// crates/gate-logic/tests/lexer.rs
// ============================================================================
// Module: Lexer Tests
// Description: Tests for gate source tokenization and its diagnostics.
// Purpose: Validate statement shapes, positions and input limits.
// Dependencies: gate_logic::lexer
// ============================================================================

//! ## Overview
//! Validates that gate source lines lex into positioned statements and that
//! malformed or oversized input is rejected with precise errors.

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

use gate_logic::Guard;
use gate_logic::LexError;
use gate_logic::Statement;
use gate_logic::Wire;
use gate_logic::lexer::MAX_LINE_BYTES;
use gate_logic::lexer::WireList;
use gate_logic::lexer::is_identifier;
use gate_logic::lexer::lex;
use gate_logic::lexer::lex_with_limit;
use support::TestResult;
use support::ensure;

/// Builds a wire list from raw indices.
fn wires(indices: &[usize]) -> WireList {
    indices.iter().copied().map(Wire).collect()
}

// ============================================================================
// SECTION: Statement Shapes
// ============================================================================

/// Tests every statement form, comments and blank lines.
#[test]
fn test_lex_statement_forms() -> TestResult {
    let source = "# latch\nDEF:latch->2\n\ntop;NOR:0,3->2\nGOTO:top?!4\nout:2\n";
    let statements = lex(source)?;

    let expected = vec![
        Statement::Def {
            line: 2,
            name: "latch".to_string(),
            inputs: 2,
        },
        Statement::Gate {
            line: 4,
            label: Some("top".to_string()),
            gate: "NOR".to_string(),
            inputs: wires(&[0, 3]),
            outputs: wires(&[2]),
        },
        Statement::Goto {
            line: 5,
            label: None,
            target: "top".to_string(),
            guard: Some(Guard {
                wire: Wire(4),
                negated: true,
            }),
        },
        Statement::Out {
            line: 6,
            outputs: wires(&[2]),
        },
    ];
    ensure(statements == expected, format!("Unexpected statements: {statements:?}"))?;
    Ok(())
}

/// Tests whitespace tolerance and empty wire lists.
#[test]
fn test_lex_whitespace_and_constant_gates() -> TestResult {
    let statements = lex("  DEF : one -> 1\n  HIGH : -> 1 \n  GOTO: one ? 1\n")?;
    ensure(
        statements[0]
            == Statement::Def {
                line: 1,
                name: "one".to_string(),
                inputs: 1,
            },
        "Expected a trimmed DEF",
    )?;
    ensure(
        statements[1]
            == Statement::Gate {
                line: 2,
                label: None,
                gate: "HIGH".to_string(),
                inputs: WireList::new(),
                outputs: wires(&[1]),
            },
        "Expected HIGH with no inputs",
    )?;
    ensure(
        matches!(
            &statements[2],
            Statement::Goto { guard: Some(Guard { wire: Wire(1), negated: false }), .. }
        ),
        "Expected a positive guard on wire 1",
    )?;
    ensure(statements.iter().map(Statement::line).eq([1, 2, 3]), "Expected 1-based lines")?;
    Ok(())
}

/// Tests identifier rules.
#[test]
fn test_is_identifier() -> TestResult {
    ensure(is_identifier("half_adder"), "Expected snake case to be valid")?;
    ensure(is_identifier("_x9"), "Expected leading underscore to be valid")?;
    ensure(!is_identifier("9x"), "Expected leading digit to be invalid")?;
    ensure(!is_identifier(""), "Expected empty text to be invalid")?;
    ensure(!is_identifier("a-b"), "Expected punctuation to be invalid")?;
    Ok(())
}

// ============================================================================
// SECTION: Diagnostics
// ============================================================================

/// Tests that a gate line without `->` is rejected.
#[test]
fn test_lex_missing_arrow() -> TestResult {
    let err = lex("DEF:x->1\nAND:0,1\n").err();
    ensure(
        err == Some(LexError::MissingArrow {
            line: 2,
        }),
        format!("Expected MissingArrow, got {err:?}"),
    )?;
    ensure(
        err.as_ref().map(ToString::to_string) == Some("line 2: missing `->`".to_string()),
        "Expected line-tagged message",
    )?;
    Ok(())
}

/// Tests number errors report the column of the offending text.
#[test]
fn test_lex_invalid_number_column() -> TestResult {
    let err = lex("DEF:x->1\nNOT:a->1\n").err();
    ensure(
        err == Some(LexError::InvalidNumber {
            raw: "a".to_string(),
            line: 2,
            column: 5,
        }),
        format!("Expected InvalidNumber at 2:5, got {err:?}"),
    )?;
    Ok(())
}

/// Tests keyword names and misplaced labels.
#[test]
fn test_lex_rejects_keywords_and_labels() -> TestResult {
    ensure(
        matches!(lex("DEF:goto->1\n"), Err(LexError::InvalidIdentifier { line: 1, .. })),
        "Expected keyword gate names to be rejected",
    )?;
    ensure(
        matches!(
            lex("DEF:x->1\nend;OUT:0\n"),
            Err(LexError::UnexpectedToken { line: 2, column: 1, .. })
        ),
        "Expected a label on OUT to be rejected",
    )?;
    ensure(
        matches!(lex("9lbl;NOT:0->1\n"), Err(LexError::InvalidIdentifier { line: 1, .. })),
        "Expected invalid label to be rejected",
    )?;
    Ok(())
}

/// Tests a line without a `:` separator.
#[test]
fn test_lex_garbage_line() -> TestResult {
    let err = lex("garbage\n").err();
    ensure(
        matches!(
            &err,
            Some(LexError::UnexpectedToken { found, line: 1, column: 1, .. }) if found == "garbage"
        ),
        format!("Expected UnexpectedToken, got {err:?}"),
    )?;
    Ok(())
}

/// Tests input made only of comments and blanks.
#[test]
fn test_lex_empty_input() -> TestResult {
    ensure(lex("# nothing\n\n   \n").err() == Some(LexError::EmptyInput), "Expected EmptyInput")?;
    ensure(lex("").err() == Some(LexError::EmptyInput), "Expected EmptyInput for empty text")?;
    Ok(())
}

/// Tests the source and line size limits.
#[test]
fn test_lex_limits() -> TestResult {
    ensure(
        lex_with_limit("DEF:x->1", 4).err()
            == Some(LexError::InputTooLarge {
                max_bytes: 4,
                actual_bytes: 8,
            }),
        "Expected InputTooLarge",
    )?;

    let long_comment = format!("#{}\n", "a".repeat(MAX_LINE_BYTES));
    ensure(
        lex(&long_comment).err()
            == Some(LexError::LineTooLong {
                line: 1,
                max_bytes: MAX_LINE_BYTES,
            }),
        "Expected LineTooLong even for comments",
    )?;
    Ok(())
}
