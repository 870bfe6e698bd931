// crates/autobox-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests for the build and inspect commands.
// Purpose: Ensure archives are written as reported and failures exit non-zero.
// Dependencies: autobox-cli binary, tempfile
// ============================================================================

//! ## Overview
//! Runs the CLI binary against scratch manifests and checks exit status,
//! stdout results and stderr diagnostics.

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn autobox_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_autobox"))
}

fn write_manifest(root: &Path) -> PathBuf {
    let manifest = r#"
[toolbox]
name = "Survey"
tools = ["Count"]

[[tool]]
name = "Count"
execution = { code = "print('count')" }

[[tool.parameter]]
kind = "GPLong"
label = "Limit"
default = 5
"#;
    let path = root.join("autobox.toml");
    fs::write(&path, manifest.trim()).expect("write manifest");
    path
}

fn build(manifest: &Path, out: &Path, extra: &[&str]) -> Output {
    Command::new(autobox_bin())
        .arg("build")
        .arg("--manifest")
        .arg(manifest)
        .arg("--out")
        .arg(out)
        .args(extra)
        .env_remove("RUST_LOG")
        .output()
        .expect("run build")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies build writes the archive and inspect lists its entries.
#[test]
fn cli_build_then_inspect_lists_entries() {
    let temp = tempfile::tempdir().expect("temp dir");
    let manifest = write_manifest(temp.path());

    let output = build(&manifest, temp.path(), &["--updated", "2024-01-01 00:00:00"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let archive = temp.path().join("Survey.atbx");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Survey.atbx"), "unexpected stdout: {stdout}");
    assert!(archive.is_file());

    let output = Command::new(autobox_bin())
        .arg("inspect")
        .arg(&archive)
        .output()
        .expect("run inspect");
    assert!(output.status.success());
    let listing = String::from_utf8_lossy(&output.stdout);
    let names: Vec<&str> =
        listing.lines().filter_map(|line| line.split_whitespace().nth(1)).collect();
    assert_eq!(
        names,
        [
            "Count.tool/tool.content",
            "Count.tool/tool.content.rc",
            "Count.tool/tool.script.execute.py",
            "toolbox.content",
            "toolbox.content.rc",
        ]
    );
}

/// Verifies an existing archive is only replaced with `--overwrite`.
#[test]
fn cli_build_requires_overwrite_flag() {
    let temp = tempfile::tempdir().expect("temp dir");
    let manifest = write_manifest(temp.path());
    let archive = temp.path().join("Survey.atbx");
    fs::write(&archive, b"previous").expect("write previous archive");

    let output = build(&manifest, temp.path(), &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to save toolbox"), "unexpected stderr: {stderr}");
    assert_eq!(fs::read(&archive).expect("read archive"), b"previous");

    let output = build(&manifest, temp.path(), &["--overwrite"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_ne!(fs::read(&archive).expect("read archive"), b"previous");
}

/// Verifies a missing output folder fails instead of silently succeeding.
#[test]
fn cli_build_rejects_missing_output_folder() {
    let temp = tempfile::tempdir().expect("temp dir");
    let manifest = write_manifest(temp.path());

    let output = build(&manifest, &temp.path().join("missing"), &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("output folder does not exist"), "unexpected stderr: {stderr}");
}

/// Verifies invalid manifests fail closed with the manifest error.
#[test]
fn cli_build_reports_invalid_manifest() {
    let temp = tempfile::tempdir().expect("temp dir");
    let manifest = temp.path().join("autobox.toml");
    fs::write(&manifest, "[toolbox]\nname = \"Bad\"\ntools = [\"Ghost\"]\n")
        .expect("write manifest");

    let output = build(&manifest, temp.path(), &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown tool reference: Ghost"), "unexpected stderr: {stderr}");
}

/// Verifies inspect rejects files that are not archives.
#[test]
fn cli_inspect_rejects_non_archives() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = temp.path().join("notes.atbx");
    fs::write(&path, b"not a zip").expect("write file");

    let output = Command::new(autobox_bin())
        .arg("inspect")
        .arg(&path)
        .output()
        .expect("run inspect");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read archive"), "unexpected stderr: {stderr}");
}
