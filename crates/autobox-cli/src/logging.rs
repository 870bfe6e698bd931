// crates/autobox-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging
// Description: Tracing subscriber setup for the command line.
// Purpose: Route library diagnostics to stderr under an environment filter.
// Dependencies: tracing, tracing-subscriber
// ============================================================================

//! ## Overview
//! `RUST_LOG` takes precedence when set. Otherwise the filter defaults to
//! `autobox=info`, or `autobox=debug` in verbose mode, which also prints
//! targets and line numbers. Output always goes to stderr so stdout stays
//! reserved for command results.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Default directive when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVE: &str = "autobox=info";
/// Default directive in verbose mode.
const VERBOSE_DIRECTIVE: &str = "autobox=debug";

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns a message when a global subscriber is already installed.
pub fn init(verbose: bool) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_DIRECTIVE } else { DEFAULT_DIRECTIVE })
    });
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_file(verbose)
        .with_line_number(verbose);
    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|err| err.to_string())
}
