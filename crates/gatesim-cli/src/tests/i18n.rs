// crates/gatesim-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Unit tests for catalog lookups and placeholder substitution.
// Purpose: Ensure CLI messages render consistently.
// Dependencies: gatesim-cli i18n module
// ============================================================================

//! ## Overview
//! Verifies catalog lookups, key fallbacks and placeholder substitution.

use crate::i18n::CATALOG_ITEMS;
use crate::i18n::MessageArg;
use crate::i18n::catalog;
use crate::i18n::translate;

#[test]
fn catalog_has_no_duplicate_keys() {
    assert_eq!(catalog().len(), CATALOG_ITEMS.len(), "catalog keys must be unique");
    assert!(catalog().contains_key("config.validate.ok"));
    assert!(catalog().values().all(|template| !template.is_empty()));
}

#[test]
fn translate_substitutes_placeholders() {
    let output = translate(
        "input.read_too_large",
        vec![
            MessageArg::new("kind", "gate source"),
            MessageArg::new("path", "big.gate"),
            MessageArg::new("size", "9"),
            MessageArg::new("limit", "8"),
        ],
    );
    assert_eq!(output, "Refusing to read gate source at big.gate because it is 9 bytes (limit 8).");
}

#[test]
fn translate_falls_back_to_key() {
    assert_eq!(translate("missing.key", Vec::new()), "missing.key");
}

#[test]
fn translate_leaves_missing_placeholder() {
    let output = translate("gate.unknown", vec![MessageArg::new("other", "x")]);
    assert_eq!(output, "Gate `{gate}` is not defined.");
}

#[test]
fn macro_formats_named_arguments() {
    let output = crate::t!("run.failed", gate = "ring", error = "did not settle");
    assert_eq!(output, "Evaluation of `ring` failed: did not settle");
}
