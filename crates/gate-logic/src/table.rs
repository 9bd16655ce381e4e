// crates/gate-logic/src/table.rs
// ============================================================================
// Module: Truth Tables
// Description: Exhaustive evaluation and bit-string helpers.
// Purpose: Enumerate every input combination of a gate.
// Dependencies: serde, thiserror, crate::{error, executor, gate}
// ============================================================================

//! ## Overview
//! Truth tables list rows in ascending binary order with input `0` as the
//! most significant bit. Each row gets a fresh step budget.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::error::EvalError;
use crate::executor::EvalLimits;
use crate::gate::Gate;

/// Hard cap on table inputs regardless of configuration.
pub const MAX_TABLE_INPUTS: usize = 20;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One row of a truth table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthRow {
    /// Input bits.
    pub inputs: Vec<bool>,
    /// Output bits.
    pub outputs: Vec<bool>,
}

/// Complete truth table for a gate.
///
/// # Invariants
/// - `rows.len() == 2^inputs` and rows are in ascending binary order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthTable {
    /// Gate name.
    pub gate: String,
    /// Input count.
    pub inputs: usize,
    /// Output count.
    pub outputs: usize,
    /// Rows.
    pub rows: Vec<TruthRow>,
}

/// Errors raised while building a truth table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The gate has more inputs than the table limit allows.
    #[error("gate `{gate}` has {inputs} inputs, truth tables allow at most {max}")]
    TooManyInputs {
        /// Gate name.
        gate: String,
        /// Gate input count.
        inputs: usize,
        /// Effective limit.
        max: usize,
    },
    /// A row failed to evaluate.
    #[error("row {row}: {source}")]
    Eval {
        /// Row index.
        row: usize,
        /// Underlying failure.
        source: EvalError,
    },
}

// ============================================================================
// SECTION: Table Construction
// ============================================================================

/// Evaluates `gate` on every input combination.
///
/// # Errors
/// Returns [`TableError::TooManyInputs`] when the gate is wider than
/// `max_inputs` (capped at [`MAX_TABLE_INPUTS`]) and [`TableError::Eval`] when a
/// row fails.
pub fn truth_table(
    gate: &Gate,
    limits: EvalLimits,
    max_inputs: usize,
) -> Result<TruthTable, TableError> {
    let max = max_inputs.min(MAX_TABLE_INPUTS);
    let width = gate.inputs();
    if width > max {
        return Err(TableError::TooManyInputs {
            gate: gate.name().to_string(),
            inputs: width,
            max,
        });
    }

    let row_count = 1usize << width;
    let mut rows = Vec::with_capacity(row_count);
    for row in 0 .. row_count {
        let inputs = row_bits(row, width);
        let outputs = gate.evaluate(&inputs, limits).map_err(|source| TableError::Eval {
            row,
            source,
        })?;
        rows.push(TruthRow {
            inputs,
            outputs,
        });
    }

    Ok(TruthTable {
        gate: gate.name().to_string(),
        inputs: width,
        outputs: gate.outputs(),
        rows,
    })
}

/// Expands `row` into `width` bits, most significant first.
fn row_bits(row: usize, width: usize) -> Vec<bool> {
    (0 .. width).map(|bit| (row >> (width - 1 - bit)) & 1 == 1).collect()
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut header: Vec<String> = (0 .. self.inputs).map(|i| format!("in{i}")).collect();
        header.push("|".to_string());
        header.extend((0 .. self.outputs).map(|i| format!("out{i}")));
        writeln!(f, "{}", header.join(" "))?;

        for row in &self.rows {
            let mut cells: Vec<String> = row
                .inputs
                .iter()
                .enumerate()
                .map(|(i, bit)| pad_bit(*bit, &format!("in{i}")))
                .collect();
            cells.push("|".to_string());
            cells.extend(
                row.outputs.iter().enumerate().map(|(i, bit)| pad_bit(*bit, &format!("out{i}"))),
            );
            writeln!(f, "{}", cells.join(" ").trim_end())?;
        }
        Ok(())
    }
}

/// Left-aligns a bit under its column header.
fn pad_bit(bit: bool, header: &str) -> String {
    format!("{:<width$}", u8::from(bit), width = header.len())
}

// ============================================================================
// SECTION: Bit Strings
// ============================================================================

/// Error returned by [`parse_bits`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid bit `{found}` at position {position}")]
pub struct BitsError {
    /// Offending character.
    pub found: char,
    /// Character position (0-based).
    pub position: usize,
}

/// Parses `0`/`1` characters, ignoring whitespace and commas.
///
/// # Errors
/// Returns [`BitsError`] for any other character.
pub fn parse_bits(text: &str) -> Result<Vec<bool>, BitsError> {
    let mut bits = Vec::new();
    for (position, found) in text.chars().enumerate() {
        match found {
            '0' => bits.push(false),
            '1' => bits.push(true),
            ',' => {}
            c if c.is_whitespace() => {}
            _ => {
                return Err(BitsError {
                    found,
                    position,
                });
            }
        }
    }
    Ok(bits)
}

/// Formats bits as a compact `0`/`1` string.
#[must_use]
pub fn format_bits(bits: &[bool]) -> String {
    bits.iter().map(|bit| if *bit { '1' } else { '0' }).collect()
}
