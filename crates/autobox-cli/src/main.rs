// crates/autobox-cli/src/main.rs
// ============================================================================
// Module: Autobox CLI Entry Point
// Description: Command dispatcher for building and inspecting toolbox archives.
// Purpose: Turn a manifest into an `.atbx` archive and list archive contents.
// Dependencies: autobox-config, autobox-core, clap, thiserror, tracing, zip
// ============================================================================

//! ## Overview
//! `autobox build` loads a toolbox manifest, builds the toolbox and saves it
//! into an output folder. `autobox inspect` lists the entries of an existing
//! archive. Results go to stdout, diagnostics and errors to stderr.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod logging;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use autobox_config::ConfigError;
use autobox_config::ToolboxManifest;
use autobox_core::SaveOptions;
use autobox_core::ToolboxError;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of an archive read by `inspect`.
const MAX_ARCHIVE_BYTES: usize = 256 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "autobox", version, about = "Build script toolbox archives")]
struct Cli {
    /// Debug logging with targets and line numbers.
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a toolbox archive from a manifest.
    Build(BuildCommand),
    /// List the entries of a toolbox archive.
    Inspect(InspectCommand),
}

/// Configuration for the `build` command.
#[derive(Args, Debug)]
struct BuildCommand {
    /// Manifest path (defaults to `AUTOBOX_MANIFEST`, then `autobox.toml`).
    #[arg(long, value_name = "PATH")]
    manifest: Option<PathBuf>,
    /// Folder receiving the archive.
    #[arg(long, value_name = "DIR", default_value = ".")]
    out: PathBuf,
    /// Replace an existing archive.
    #[arg(long)]
    overwrite: bool,
    /// Fixed `updated` timestamp for reproducible archives.
    #[arg(long, value_name = "TIMESTAMP")]
    updated: Option<String>,
}

/// Configuration for the `inspect` command.
#[derive(Args, Debug)]
struct InspectCommand {
    /// Archive to list.
    #[arg(value_name = "ARCHIVE")]
    archive: PathBuf,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI failures reported on stderr.
#[derive(Debug, Error)]
enum CliError {
    /// Manifest could not be loaded or built.
    #[error("failed to load manifest: {0}")]
    Config(#[from] ConfigError),
    /// Toolbox could not be saved.
    #[error("failed to save toolbox: {0}")]
    Toolbox(#[from] ToolboxError),
    /// Output folder does not exist.
    #[error("output folder does not exist: {}", .0.display())]
    MissingDestination(PathBuf),
    /// Archive could not be read.
    #[error("failed to read archive {}: {message}", path.display())]
    Archive {
        /// Archive path.
        path: PathBuf,
        /// Failure description.
        message: String,
    },
    /// Logging could not be initialized.
    #[error("failed to initialize logging: {0}")]
    Logging(String),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),
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
        Err(err) => report_error(&err),
    }
}

/// Parses arguments and dispatches the selected command.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose).map_err(CliError::Logging)?;
    match cli.command {
        Commands::Build(command) => command_build(&command),
        Commands::Inspect(command) => command_inspect(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Builds and saves the toolbox described by a manifest.
fn command_build(command: &BuildCommand) -> CliResult<ExitCode> {
    let manifest = ToolboxManifest::load(command.manifest.as_deref())?;
    let toolbox = manifest.build()?;
    let mut options = SaveOptions::new().with_overwrite(command.overwrite);
    if let Some(updated) = &command.updated {
        options = options.with_updated(updated);
    }
    let saved = toolbox
        .save_with(&command.out, &options)?
        .ok_or_else(|| CliError::MissingDestination(command.out.clone()))?;
    write_stdout_line(&format!("wrote {}", saved.display()))?;
    Ok(ExitCode::SUCCESS)
}

/// Lists archive entries with their uncompressed sizes.
fn command_inspect(command: &InspectCommand) -> CliResult<ExitCode> {
    let archive_error = |message: String| CliError::Archive {
        path: command.archive.clone(),
        message,
    };
    let bytes =
        read_bytes_with_limit(&command.archive, MAX_ARCHIVE_BYTES).map_err(|err| match err {
            ReadLimitError::Io(err) => archive_error(err.to_string()),
            ReadLimitError::TooLarge {
                size,
                limit,
            } => archive_error(format!("archive exceeds size limit ({size} > {limit})")),
        })?;
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|err| archive_error(err.to_string()))?;
    debug!(entries = archive.len(), "opened archive");
    let mut lines = Vec::with_capacity(archive.len());
    for index in 0 .. archive.len() {
        let entry = archive.by_index(index).map_err(|err| archive_error(err.to_string()))?;
        lines.push(format!("{:>10}  {}", entry.size(), entry.name()));
    }
    let mut stdout = std::io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{line}").map_err(CliError::Output)?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

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
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
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

    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Writes a single line to locked stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{message}").map_err(CliError::Output)
}

/// Writes an error to stderr and returns a failure exit code.
fn report_error(err: &CliError) -> ExitCode {
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "error: {err}");
    ExitCode::FAILURE
}
