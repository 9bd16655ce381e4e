// crates/gate-logic/src/builtin.rs
// ============================================================================
// Module: Builtin Gates
// Description: Primitive gates computed by plain transfer functions.
// Purpose: Provide the seed set of gates every library starts from.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Builtins are the leaves of every gate graph. Each kind has a fixed arity
//! and a `fn` transfer function; callers own the returned bit vector.

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Builtin Kinds
// ============================================================================

/// Transfer function type for builtin gates.
pub type TransferFn = fn(&[bool]) -> Vec<bool>;

/// Primitive gate kinds.
///
/// # Invariants
/// - [`BuiltinKind::arity`] matches the number of bits the transfer function
///   reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinKind {
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
    /// Logical NOT.
    Not,
    /// Negated AND.
    Nand,
    /// Negated OR.
    Nor,
    /// Exclusive OR.
    Xor,
    /// Negated exclusive OR.
    Xnor,
    /// Identity buffer.
    Buf,
    /// Constant low.
    Low,
    /// Constant high.
    High,
}

/// Every builtin kind in registration order.
pub const ALL_BUILTINS: &[BuiltinKind] = &[
    BuiltinKind::And,
    BuiltinKind::Or,
    BuiltinKind::Not,
    BuiltinKind::Nand,
    BuiltinKind::Nor,
    BuiltinKind::Xor,
    BuiltinKind::Xnor,
    BuiltinKind::Buf,
    BuiltinKind::Low,
    BuiltinKind::High,
];

impl BuiltinKind {
    /// Returns the source-level gate name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Nand => "NAND",
            Self::Nor => "NOR",
            Self::Xor => "XOR",
            Self::Xnor => "XNOR",
            Self::Buf => "BUF",
            Self::Low => "LOW",
            Self::High => "HIGH",
        }
    }

    /// Parses a source-level gate name (exact, upper-case match).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        ALL_BUILTINS.iter().copied().find(|kind| kind.name() == name)
    }

    /// Returns `(inputs, outputs)` for this kind.
    #[must_use]
    pub const fn arity(self) -> (usize, usize) {
        match self {
            Self::And | Self::Or | Self::Nand | Self::Nor | Self::Xor | Self::Xnor => (2, 1),
            Self::Not | Self::Buf => (1, 1),
            Self::Low | Self::High => (0, 1),
        }
    }

    /// Returns the transfer function for this kind.
    ///
    /// Missing inputs read as low; the executor checks arity before calling.
    #[must_use]
    pub fn function(self) -> TransferFn {
        match self {
            Self::And => |inputs| vec![bit(inputs, 0) && bit(inputs, 1)],
            Self::Or => |inputs| vec![bit(inputs, 0) || bit(inputs, 1)],
            Self::Not => |inputs| vec![!bit(inputs, 0)],
            Self::Nand => |inputs| vec![!(bit(inputs, 0) && bit(inputs, 1))],
            Self::Nor => |inputs| vec![!(bit(inputs, 0) || bit(inputs, 1))],
            Self::Xor => |inputs| vec![bit(inputs, 0) ^ bit(inputs, 1)],
            Self::Xnor => |inputs| vec![bit(inputs, 0) == bit(inputs, 1)],
            Self::Buf => |inputs| vec![bit(inputs, 0)],
            Self::Low => |_| vec![false],
            Self::High => |_| vec![true],
        }
    }
}

/// Reads input `index`, treating a short slice as low.
fn bit(inputs: &[bool], index: usize) -> bool {
    inputs.get(index).copied().unwrap_or(false)
}

// ============================================================================
// SECTION: Preludes
// ============================================================================

/// Builtin set a library is seeded with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prelude {
    /// Only `AND` and `NOT`.
    Minimal,
    /// Every builtin kind.
    #[default]
    Standard,
}

impl Prelude {
    /// Returns the builtin kinds included in this prelude.
    #[must_use]
    pub const fn kinds(self) -> &'static [BuiltinKind] {
        match self {
            Self::Minimal => &[BuiltinKind::And, BuiltinKind::Not],
            Self::Standard => ALL_BUILTINS,
        }
    }
}
