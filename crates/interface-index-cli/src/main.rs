// crates/interface-index-cli/src/main.rs
// ============================================================================
// Module: Interface Index CLI Entry Point
// Description: Command dispatcher for serving and checking a deployment.
// Purpose: Start the HTTP server and validate config and schemas offline.
// Dependencies: clap, interface-index-config, interface-index-core, interface-index-server, tokio.
// ============================================================================

//! ## Overview
//! The `interface-index` binary runs the catalog server and offers offline
//! checks for configuration files and schema directories. Every failure is
//! reported as a single stderr line with exit code 1.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use interface_index_config::InterfaceIndexConfig;
use interface_index_core::Kind;
use interface_index_core::SchemaRegistry;
use interface_index_server::InterfaceIndexServer;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "interface-index", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve(ConfigArgs),
    /// Load and validate a config file without starting the server.
    CheckConfig(ConfigArgs),
    /// Compile the bundled schemas or a schema directory.
    CheckSchemas(SchemaArgs),
}

/// Arguments for commands that read a config file.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Config file path (defaults to `INTERFACE_INDEX_CONFIG` or `interface-index.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `check-schemas`.
#[derive(Args, Debug)]
struct SchemaArgs {
    /// Directory holding `interface.schema.json` and `layer.schema.json`.
    #[arg(long, value_name = "PATH")]
    dir: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a one-line message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
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
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Serve(args) => command_serve(args).await,
        Commands::CheckConfig(args) => {
            let summary = check_config(args.config.as_deref())?;
            write_stdout_line(&summary)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckSchemas(args) => {
            let summary = check_schemas(args.dir.as_deref())?;
            write_stdout_line(&summary)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Loads config, builds the server, and serves until the listener fails.
async fn command_serve(args: ConfigArgs) -> CliResult<ExitCode> {
    let config = InterfaceIndexConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let server = InterfaceIndexServer::from_config(&config)
        .map_err(|err| CliError::new(format!("failed to start server: {err}")))?;
    write_stderr_line(&format!("interface-index listening on {}", server.bind_addr()))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Validates a config file and the schemas it points at.
fn check_config(path: Option<&Path>) -> CliResult<String> {
    let config = InterfaceIndexConfig::load(path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    load_registry(config.schemas.directory.as_deref())?;
    Ok(format!("config ok: bind {}", config.server.bind))
}

/// Compiles the schemas from a directory, or the bundled set.
fn check_schemas(dir: Option<&Path>) -> CliResult<String> {
    let registry = load_registry(dir)?;
    let kinds: Vec<String> = Kind::ALL
        .iter()
        .map(|kind| {
            let descriptor = registry.descriptor(*kind);
            format!("{} (key {})", kind.as_str(), descriptor.primary_key())
        })
        .collect();
    Ok(format!("schemas ok: {}", kinds.join(", ")))
}

/// Loads a schema registry from `dir` or the bundled schemas.
fn load_registry(dir: Option<&Path>) -> CliResult<SchemaRegistry> {
    let registry = match dir {
        Some(dir) => SchemaRegistry::from_dir(dir),
        None => SchemaRegistry::bundled(),
    };
    registry.map_err(|err| CliError::new(format!("failed to load schemas: {err}")))
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> CliResult<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
        .map_err(|err| CliError::new(format!("failed to write stderr: {err}")))
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
