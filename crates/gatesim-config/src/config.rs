// crates/gatesim-config/src/config.rs
// ============================================================================
// Module: Gatesim Configuration
// Description: Configuration loading and validation for the gate simulator.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: gate-logic, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The file is optional: when no path is given and `GATESIM_CONFIG` is unset,
//! a missing `gatesim.toml` yields the defaults. Explicit paths must exist.
//! Every numeric knob is range checked so a hostile config cannot disable the
//! evaluation budgets.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use gate_logic::EvalLimits;
use gate_logic::Prelude;
use gate_logic::executor::DEFAULT_MAX_DEPTH;
use gate_logic::executor::DEFAULT_MAX_SETTLE_PASSES;
use gate_logic::executor::DEFAULT_MAX_STEPS;
use gate_logic::lexer::MAX_SOURCE_BYTES;
use gate_logic::table::MAX_TABLE_INPUTS;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "gatesim.toml";
/// Environment variable used to locate the config file.
pub const CONFIG_ENV_VAR: &str = "GATESIM_CONFIG";
/// Maximum size of a config file in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum length of the full config path.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for `library.max_source_bytes`.
pub const MAX_SOURCE_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Upper bound for `evaluation.max_steps`.
pub const MAX_STEPS_LIMIT: u64 = 100_000_000;
/// Upper bound for `evaluation.max_settle_passes`.
pub const MAX_SETTLE_PASSES_LIMIT: u32 = 4096;
/// Upper bound for `evaluation.max_depth`.
pub const MAX_DEPTH_LIMIT: usize = 1024;
/// Default for `table.max_inputs`.
pub(crate) const DEFAULT_TABLE_MAX_INPUTS: usize = 16;

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Top-level gatesim configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatesimConfig {
    /// Source compilation settings.
    #[serde(default)]
    pub library: LibraryConfig,
    /// Evaluation budgets.
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    /// Truth table settings.
    #[serde(default)]
    pub table: TableConfig,
    /// File the configuration was read from (not serialized).
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Source compilation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryConfig {
    /// Builtin set every library starts from.
    #[serde(default)]
    pub prelude: Prelude,
    /// Maximum gate source size in bytes.
    #[serde(default = "default_max_source_bytes")]
    pub max_source_bytes: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            prelude: Prelude::default(),
            max_source_bytes: default_max_source_bytes(),
        }
    }
}

impl LibraryConfig {
    /// Validates library settings.
    fn validate(&self) -> Result<(), ConfigError> {
        check_range("library.max_source_bytes", self.max_source_bytes, 1, MAX_SOURCE_BYTES_LIMIT)
    }
}

/// Evaluation budgets applied to every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluationConfig {
    /// Maximum nodes executed per evaluation.
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
    /// Maximum replays of a feedback loop.
    #[serde(default = "default_max_settle_passes")]
    pub max_settle_passes: u32,
    /// Maximum gate nesting depth.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            max_settle_passes: default_max_settle_passes(),
            max_depth: default_max_depth(),
        }
    }
}

impl EvaluationConfig {
    /// Validates evaluation budgets.
    fn validate(&self) -> Result<(), ConfigError> {
        check_range("evaluation.max_steps", self.max_steps, 1, MAX_STEPS_LIMIT)?;
        check_range(
            "evaluation.max_settle_passes",
            self.max_settle_passes,
            1,
            MAX_SETTLE_PASSES_LIMIT,
        )?;
        check_range("evaluation.max_depth", self.max_depth, 1, MAX_DEPTH_LIMIT)
    }
}

/// Truth table settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    /// Widest gate a truth table may enumerate.
    #[serde(default = "default_table_max_inputs")]
    pub max_inputs: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_inputs: default_table_max_inputs(),
        }
    }
}

impl TableConfig {
    /// Validates table settings.
    fn validate(&self) -> Result<(), ConfigError> {
        check_range("table.max_inputs", self.max_inputs, 1, MAX_TABLE_INPUTS)
    }
}

impl GatesimConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        if !explicit && !resolved.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source = Some(resolved);
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.library.validate()?;
        self.evaluation.validate()?;
        self.table.validate()
    }

    /// Returns the evaluation budgets for the executor.
    #[must_use]
    pub const fn eval_limits(&self) -> EvalLimits {
        EvalLimits {
            max_steps: self.evaluation.max_steps,
            max_settle_passes: self.evaluation.max_settle_passes,
            max_depth: self.evaluation.max_depth,
        }
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default gate source size limit.
const fn default_max_source_bytes() -> usize {
    MAX_SOURCE_BYTES
}

/// Default step budget.
const fn default_max_steps() -> u64 {
    DEFAULT_MAX_STEPS
}

/// Default settle budget.
const fn default_max_settle_passes() -> u32 {
    DEFAULT_MAX_SETTLE_PASSES
}

/// Default nesting budget.
const fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Default truth table width.
const fn default_table_max_inputs() -> usize {
    DEFAULT_TABLE_MAX_INPUTS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
///
/// The flag is true when the path was requested explicitly and must exist.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Checks that `value` lies in `min..=max`.
fn check_range<T>(field: &str, value: T, min: T, max: T) -> Result<(), ConfigError>
where
    T: PartialOrd + Display,
{
    if value < min || value > max {
        return Err(ConfigError::Invalid(format!("{field} must be between {min} and {max}")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
