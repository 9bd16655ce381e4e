// crates/gatesim-cli/src/main.rs
// ============================================================================
// Module: Gatesim CLI Entry Point
// Description: Command dispatcher for compiling, running and tabulating gates.
// Purpose: Provide a safe, localized CLI over the gate-logic library.
// Dependencies: clap, gate-logic, gatesim-config, serde, serde_json, thiserror.
// ============================================================================

//! ## Overview
//! The gatesim CLI compiles gate source files, evaluates a named gate on
//! input bits, prints truth tables and validates configuration. All
//! user-facing strings are routed through the message catalog. Inputs are
//! untrusted: source files are read with a hard size limit and evaluation
//! runs under the configured budgets.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use gate_logic::Executor;
use gate_logic::Gate;
use gate_logic::GateKind;
use gate_logic::GateSummary;
use gate_logic::JsonLinesTrace;
use gate_logic::Library;
use gate_logic::NoopTrace;
use gate_logic::format_bits;
use gate_logic::parse_bits;
use gate_logic::truth_table;
use gatesim_cli::t;
use gatesim_config::GatesimConfig;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "gatesim", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Config file path (defaults to gatesim.toml or `GATESIM_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a gate source file and list its gates.
    Check(CheckCommand),
    /// Evaluate a gate on input bits.
    Run(RunCommand),
    /// Print the truth table of a gate.
    Table(TableCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the configuration.
    Validate(ConfigValidateCommand),
}

/// Arguments for `check`.
#[derive(Args, Debug)]
struct CheckCommand {
    /// Gate source file.
    #[arg(value_name = "FILE")]
    file: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Gate source file.
    #[arg(value_name = "FILE")]
    file: PathBuf,
    /// Gate to evaluate.
    #[arg(value_name = "GATE")]
    gate: String,
    /// Input bits, input 0 first (`1 0`, `10` and `1,0` are equivalent).
    #[arg(value_name = "BITS")]
    bits: Vec<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Stream evaluation events to stderr as JSON lines.
    #[arg(long, action = ArgAction::SetTrue)]
    trace: bool,
}

/// Arguments for `table`.
#[derive(Args, Debug)]
struct TableCommand {
    /// Gate source file.
    #[arg(value_name = "FILE")]
    file: PathBuf,
    /// Gate to tabulate.
    #[arg(value_name = "GATE")]
    gate: String,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Output formats for command results.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// JSON output of `check`.
#[derive(Debug, Serialize)]
struct CheckReport {
    /// Source file path.
    file: String,
    /// Gates defined by the file, in source order.
    gates: Vec<GateSummary>,
}

/// JSON output of `run`.
#[derive(Debug, Serialize)]
struct RunReport {
    /// Evaluated gate.
    gate: String,
    /// Input bits.
    inputs: Vec<bool>,
    /// Output bits.
    outputs: Vec<bool>,
    /// Nodes executed.
    steps: u64,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config = GatesimConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;

    match command {
        Commands::Check(command) => command_check(&command, &config),
        Commands::Run(command) => command_run(&command, &config),
        Commands::Table(command) => command_table(&command, &config),
        Commands::Config {
            command,
        } => command_config(&command, &config),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Gate Commands
// ============================================================================

/// Executes the `check` command.
fn command_check(command: &CheckCommand, config: &GatesimConfig) -> CliResult<ExitCode> {
    let library = load_library(&command.file, config)?;
    let gates: Vec<GateSummary> = library
        .summaries()
        .into_iter()
        .filter(|summary| summary.kind != GateKind::Builtin)
        .collect();

    match command.format {
        OutputFormat::Json => write_json(&CheckReport {
            file: command.file.display().to_string(),
            gates,
        })?,
        OutputFormat::Text => {
            let mut output = t!("check.ok", path = command.file.display(), count = gates.len());
            output.push('\n');
            for gate in &gates {
                output.push_str(&t!(
                    "check.entry",
                    name = gate.name,
                    inputs = gate.inputs,
                    outputs = gate.outputs,
                    nodes = gate.nodes,
                    loops = gate.loops
                ));
                output.push('\n');
            }
            write_stdout_bytes(output.as_bytes())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `run` command.
fn command_run(command: &RunCommand, config: &GatesimConfig) -> CliResult<ExitCode> {
    let library = load_library(&command.file, config)?;
    let gate = lookup_gate(&library, &command.gate)?;
    let inputs = parse_bits(&command.bits.join(" "))
        .map_err(|err| CliError::new(t!("run.bits_invalid", error = err)))?;

    let mut executor = Executor::new(config.eval_limits());
    let result = if command.trace {
        let mut trace = JsonLinesTrace::new(std::io::stderr().lock());
        let result = executor.run(&gate, &inputs, &mut trace);
        let stderr = trace.finish().map_err(|err| CliError::new(output_error("stderr", &err)))?;
        drop(stderr);
        result
    } else {
        executor.run(&gate, &inputs, &mut NoopTrace)
    };
    let outputs = result
        .map_err(|err| CliError::new(t!("run.failed", gate = gate.name(), error = err)))?;

    match command.format {
        OutputFormat::Json => write_json(&RunReport {
            gate: gate.name().to_string(),
            inputs,
            outputs,
            steps: executor.steps(),
        })?,
        OutputFormat::Text => write_stdout_line(&format_bits(&outputs))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `table` command.
fn command_table(command: &TableCommand, config: &GatesimConfig) -> CliResult<ExitCode> {
    let library = load_library(&command.file, config)?;
    let gate = lookup_gate(&library, &command.gate)?;
    let table = truth_table(&gate, config.eval_limits(), config.table.max_inputs)
        .map_err(|err| CliError::new(t!("table.failed", gate = gate.name(), error = err)))?;

    match command.format {
        OutputFormat::Json => write_json(&table)?,
        OutputFormat::Text => write_stdout_bytes(table.to_string().as_bytes())
            .map_err(|err| CliError::new(output_error("stdout", &err)))?,
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand, config: &GatesimConfig) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(command, config),
    }
}

/// Executes the config validation command.
///
/// Loading already validated the configuration; this reports where it came from.
fn command_config_validate(
    command: &ConfigValidateCommand,
    config: &GatesimConfig,
) -> CliResult<ExitCode> {
    if command.format == OutputFormat::Json {
        write_json(config)?;
        return Ok(ExitCode::SUCCESS);
    }
    let origin = config.source.as_ref().map_or_else(
        || t!("config.validate.defaults"),
        |path| t!("config.validate.source", path = path.display()),
    );
    write_stdout_line(&t!("config.validate.ok"))
        .and_then(|()| write_stdout_line(&origin))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Source Helpers
// ============================================================================

/// Reads and compiles a gate source file under the configured limits.
fn load_library(path: &Path, config: &GatesimConfig) -> CliResult<Library> {
    let max_bytes = config.library.max_source_bytes;
    let bytes = read_bytes_with_limit(path, max_bytes).map_err(|err| match err {
        ReadLimitError::Io(err) => CliError::new(t!(
            "input.read_failed",
            kind = t!("input.kind.source"),
            path = path.display(),
            error = err
        )),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = t!("input.kind.source"),
            path = path.display(),
            size = size,
            limit = limit
        )),
    })?;
    let source = String::from_utf8(bytes)
        .map_err(|_| CliError::new(t!("source.not_utf8", path = path.display())))?;
    Library::compile_with_limit(&source, config.library.prelude, max_bytes).map_err(|err| {
        CliError::new(t!("source.compile_failed", path = path.display(), error = err))
    })
}

/// Looks up a gate by name.
fn lookup_gate(library: &Library, name: &str) -> CliResult<Arc<Gate>> {
    library
        .get(name)
        .cloned()
        .ok_or_else(|| CliError::new(t!("gate.unknown", gate = name)))
}

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a value to stdout as a single JSON line.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_json::to_vec(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
