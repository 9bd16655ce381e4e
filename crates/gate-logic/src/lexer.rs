// crates/gate-logic/src/lexer.rs
// ============================================================================
// Module: Gate Source Lexer
// Description: Line-oriented tokenizer for gate definition files.
// Purpose: Turn source text into positioned statements for the library compiler.
// Dependencies: smallvec, crate::gate::{Guard, Wire}
// ============================================================================

//! ## Overview
//!
//! Gate sources are line oriented. Each non-blank line that does not start
//! with `#` is one statement:
//!
//! - `DEF:half_adder->2` opens a definition with two inputs (wires `0`, `1`).
//! - `XOR:0,1->2` applies a gate, reading wires `0,1` and writing wire `2`.
//! - `top;AND:0,1->3` labels a line so a loop can target it.
//! - `GOTO:top`, `GOTO:top?4`, `GOTO:top?!4` jump to a label, optionally
//!   guarded by a wire (or its negation).
//! - `OUT:2,3` lists the output wires and closes the body.
//!
//! Keywords are case-insensitive. Gate names and labels are identifiers and
//! compare case-sensitively. Input is untrusted: size and line limits apply.
//!
//! ```
//! use gate_logic::lexer::Statement;
//! use gate_logic::lexer::lex;
//!
//! let statements = lex("DEF:inv->1\nNOT:0->1\nOUT:1\n").unwrap();
//! assert!(matches!(statements[0], Statement::Def { inputs: 1, .. }));
//! assert_eq!(statements.len(), 3);
//! ```

use std::fmt;

use smallvec::SmallVec;

use crate::gate::Guard;
use crate::gate::Wire;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum source size in bytes.
pub const MAX_SOURCE_BYTES: usize = 1024 * 1024;
/// Maximum length of a single source line in bytes.
pub const MAX_LINE_BYTES: usize = 4096;

// ============================================================================
// SECTION: Statements
// ============================================================================

/// Short list of wires attached to a statement or node.
pub type WireList = SmallVec<[Wire; 4]>;

/// A single parsed source line.
///
/// # Invariants
/// - `line` is 1-based and refers to the original source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `DEF:<name>-><inputs>`.
    Def {
        /// Source line.
        line: usize,
        /// Gate name being defined.
        name: String,
        /// Declared input count.
        inputs: usize,
    },
    /// `[label;]<GATE>:<inputs>-><outputs>`.
    Gate {
        /// Source line.
        line: usize,
        /// Optional label for loop targets.
        label: Option<String>,
        /// Applied gate name.
        gate: String,
        /// Wires read by the gate.
        inputs: WireList,
        /// Wires written by the gate.
        outputs: WireList,
    },
    /// `[label;]GOTO:<target>[?[!]<wire>]`.
    Goto {
        /// Source line.
        line: usize,
        /// Optional label for loop targets.
        label: Option<String>,
        /// Label jumped to.
        target: String,
        /// Optional wire guarding the jump.
        guard: Option<Guard>,
    },
    /// `OUT:<wires>`.
    Out {
        /// Source line.
        line: usize,
        /// Output wires in order.
        outputs: WireList,
    },
}

impl Statement {
    /// Returns the 1-based source line of the statement.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Def {
                line,
                ..
            }
            | Self::Gate {
                line,
                ..
            }
            | Self::Goto {
                line,
                ..
            }
            | Self::Out {
                line,
                ..
            } => *line,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors produced while tokenizing gate source.
///
/// # Invariants
/// - `line` and `column` are 1-based; `column` counts bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// Input contained no statements.
    EmptyInput,
    /// Input exceeded the size limit.
    InputTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual input length in bytes.
        actual_bytes: usize,
    },
    /// A line exceeded the line length limit.
    LineTooLong {
        /// Source line.
        line: usize,
        /// Maximum allowed bytes per line.
        max_bytes: usize,
    },
    /// A token did not match what the grammar allows at that position.
    UnexpectedToken {
        /// Human-friendly expectation summary.
        expected: &'static str,
        /// The text that was actually seen.
        found: String,
        /// Source line.
        line: usize,
        /// Source column.
        column: usize,
    },
    /// A wire or count failed to parse.
    InvalidNumber {
        /// Raw text.
        raw: String,
        /// Source line.
        line: usize,
        /// Source column.
        column: usize,
    },
    /// A gate name or label is not a valid identifier.
    InvalidIdentifier {
        /// Raw text.
        raw: String,
        /// Source line.
        line: usize,
        /// Source column.
        column: usize,
    },
    /// A statement that requires `->` has none.
    MissingArrow {
        /// Source line.
        line: usize,
    },
}

impl LexError {
    /// Returns the source line of the error, when it refers to one.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::EmptyInput
            | Self::InputTooLarge {
                ..
            } => None,
            Self::LineTooLong {
                line,
                ..
            }
            | Self::UnexpectedToken {
                line,
                ..
            }
            | Self::InvalidNumber {
                line,
                ..
            }
            | Self::InvalidIdentifier {
                line,
                ..
            }
            | Self::MissingArrow {
                line,
            } => Some(*line),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "input is empty"),
            Self::InputTooLarge {
                max_bytes,
                actual_bytes,
            } => write!(f, "input exceeds size limit: {actual_bytes} bytes (max {max_bytes})"),
            Self::LineTooLong {
                line,
                max_bytes,
            } => write!(f, "line {line}: exceeds {max_bytes} bytes"),
            Self::UnexpectedToken {
                expected,
                found,
                line,
                column,
            } => write!(f, "line {line}:{column}: unexpected `{found}`, expected {expected}"),
            Self::InvalidNumber {
                raw,
                line,
                column,
            } => write!(f, "line {line}:{column}: invalid number `{raw}`"),
            Self::InvalidIdentifier {
                raw,
                line,
                column,
            } => write!(f, "line {line}:{column}: invalid identifier `{raw}`"),
            Self::MissingArrow {
                line,
            } => write!(f, "line {line}: missing `->`"),
        }
    }
}

impl std::error::Error for LexError {}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Tokenizes gate source using the default size limit.
///
/// # Errors
/// Returns [`LexError`] for malformed lines, oversized input, or input with
/// no statements.
pub fn lex(source: &str) -> Result<Vec<Statement>, LexError> {
    lex_with_limit(source, MAX_SOURCE_BYTES)
}

/// Tokenizes gate source, rejecting inputs larger than `max_bytes`.
///
/// # Errors
/// Returns [`LexError`] for malformed lines, oversized input, or input with
/// no statements.
pub fn lex_with_limit(source: &str, max_bytes: usize) -> Result<Vec<Statement>, LexError> {
    if source.len() > max_bytes {
        return Err(LexError::InputTooLarge {
            max_bytes,
            actual_bytes: source.len(),
        });
    }

    let mut statements = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        if raw.len() > MAX_LINE_BYTES {
            return Err(LexError::LineTooLong {
                line,
                max_bytes: MAX_LINE_BYTES,
            });
        }
        let span = Span::new(raw, 0, line).trim();
        if span.text.is_empty() || span.text.starts_with('#') {
            continue;
        }
        statements.push(parse_line(span)?);
    }

    if statements.is_empty() {
        return Err(LexError::EmptyInput);
    }
    Ok(statements)
}

/// Returns true when `text` is a valid gate name or label.
#[must_use]
pub fn is_identifier(text: &str) -> bool {
    let mut bytes = text.bytes();
    match bytes.next() {
        Some(b'a' ..= b'z' | b'A' ..= b'Z' | b'_') => {
            bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
        }
        _ => false,
    }
}

// ============================================================================
// SECTION: Line Parser
// ============================================================================

/// Keywords that cannot be used as gate names.
const KEYWORDS: &[&str] = &["DEF", "OUT", "GOTO"];

/// Slice of a source line with its byte offset.
#[derive(Debug, Clone, Copy)]
struct Span<'a> {
    /// Text covered by the span.
    text: &'a str,
    /// Byte offset of `text` within the line.
    start: usize,
    /// 1-based source line.
    line: usize,
}

impl<'a> Span<'a> {
    /// Creates a span over `text` starting at `start`.
    const fn new(text: &'a str, start: usize, line: usize) -> Self {
        Self {
            text,
            start,
            line,
        }
    }

    /// Trims surrounding whitespace while tracking the offset.
    fn trim(self) -> Self {
        let trimmed_start = self.text.trim_start();
        let offset = self.text.len() - trimmed_start.len();
        Self::new(trimmed_start.trim_end(), self.start + offset, self.line)
    }

    /// Splits on the first occurrence of `delimiter`.
    fn split_once(self, delimiter: &str) -> Option<(Self, Self)> {
        let at = self.text.find(delimiter)?;
        let left = Self::new(&self.text[.. at], self.start, self.line);
        let right_start = at + delimiter.len();
        let right = Self::new(&self.text[right_start ..], self.start + right_start, self.line);
        Some((left.trim(), right.trim()))
    }

    /// Returns the 1-based column of the span.
    const fn column(&self) -> usize {
        self.start + 1
    }

    /// Builds an unexpected-token error at this span.
    fn unexpected(&self, expected: &'static str) -> LexError {
        LexError::UnexpectedToken {
            expected,
            found: if self.text.is_empty() {
                "end of line".to_string()
            } else {
                self.text.to_string()
            },
            line: self.line,
            column: self.column(),
        }
    }

    /// Parses the span as an identifier.
    fn identifier(&self) -> Result<String, LexError> {
        if is_identifier(self.text) {
            Ok(self.text.to_string())
        } else {
            Err(LexError::InvalidIdentifier {
                raw: self.text.to_string(),
                line: self.line,
                column: self.column(),
            })
        }
    }

    /// Parses the span as an unsigned decimal number.
    fn number(&self) -> Result<usize, LexError> {
        let invalid = || LexError::InvalidNumber {
            raw: self.text.to_string(),
            line: self.line,
            column: self.column(),
        };
        if self.text.is_empty() || !self.text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        self.text.parse().map_err(|_| invalid())
    }

    /// Parses the span as a comma-separated wire list (possibly empty).
    fn wires(self) -> Result<WireList, LexError> {
        let mut wires = WireList::new();
        if self.text.is_empty() {
            return Ok(wires);
        }
        let mut rest = self;
        loop {
            match rest.split_once(",") {
                Some((item, tail)) => {
                    wires.push(Wire(item.number()?));
                    rest = tail;
                }
                None => {
                    wires.push(Wire(rest.number()?));
                    return Ok(wires);
                }
            }
        }
    }
}

/// Parses one trimmed, non-empty line.
fn parse_line(span: Span<'_>) -> Result<Statement, LexError> {
    let (label, rest) = match span.split_once(";") {
        Some((label, rest)) => (Some(label), rest),
        None => (None, span),
    };
    let Some((head, body)) = rest.split_once(":") else {
        return Err(rest.unexpected("`<gate>:<wires>`"));
    };
    let line = span.line;

    if head.text.eq_ignore_ascii_case("DEF") {
        if let Some(label) = label {
            return Err(label.unexpected("`DEF` without a label"));
        }
        let (name, inputs) = body.split_once("->").ok_or(LexError::MissingArrow {
            line,
        })?;
        let name_text = name.identifier()?;
        if is_keyword(&name_text) {
            return Err(LexError::InvalidIdentifier {
                raw: name_text,
                line,
                column: name.column(),
            });
        }
        return Ok(Statement::Def {
            line,
            name: name_text,
            inputs: inputs.number()?,
        });
    }

    if head.text.eq_ignore_ascii_case("OUT") {
        if let Some(label) = label {
            return Err(label.unexpected("`OUT` without a label"));
        }
        if body.text.contains("->") {
            return Err(body.unexpected("a wire list"));
        }
        return Ok(Statement::Out {
            line,
            outputs: body.wires()?,
        });
    }

    let label = label.map(|label| label.identifier()).transpose()?;

    if head.text.eq_ignore_ascii_case("GOTO") {
        let (target, guard) = match body.split_once("?") {
            Some((target, guard)) => (target, Some(parse_guard(guard)?)),
            None => (body, None),
        };
        return Ok(Statement::Goto {
            line,
            label,
            target: target.identifier()?,
            guard,
        });
    }

    let gate = head.identifier()?;
    let (inputs, outputs) = body.split_once("->").ok_or(LexError::MissingArrow {
        line,
    })?;
    Ok(Statement::Gate {
        line,
        label,
        gate,
        inputs: inputs.wires()?,
        outputs: outputs.wires()?,
    })
}

/// Parses a `GOTO` guard (`4` or `!4`).
fn parse_guard(span: Span<'_>) -> Result<Guard, LexError> {
    span.text.strip_prefix('!').map_or_else(
        || {
            Ok(Guard {
                wire: Wire(span.number()?),
                negated: false,
            })
        },
        |_| {
            let wire = Span::new(&span.text[1 ..], span.start + 1, span.line).trim();
            Ok(Guard {
                wire: Wire(wire.number()?),
                negated: true,
            })
        },
    )
}

/// Returns true when `name` is a reserved keyword.
fn is_keyword(name: &str) -> bool {
    KEYWORDS.iter().any(|keyword| keyword.eq_ignore_ascii_case(name))
}
