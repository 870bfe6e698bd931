// crates/autobox-core/src/paths.rs
// ============================================================================
// Module: Path Resolution
// Description: File validation and toolbox-relative path rendering.
// Purpose: Resolve linked scripts and style files against the destination folder.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Referenced files are validated once, when assigned, and stored as
//! canonical absolute paths. At save time they are rendered relative to the
//! *destination* toolbox folder: a file below that folder becomes
//! `..\..\<relative>`; any other file keeps its absolute path. Toolsets are
//! virtual groupings inside the archive, so the two parent steps never
//! depend on toolset depth.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use crate::ToolboxError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix that climbs from `<archive>/<folder>.tool/` back to the toolbox folder.
const RELATIVE_PREFIX: &str = "..\\..\\";

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates that `path` names an existing file and returns its canonical form.
///
/// # Errors
///
/// Returns [`ToolboxError::NotFound`] when the file does not exist and
/// [`ToolboxError::Io`] when it cannot be canonicalized.
pub fn validate_file(path: &Path) -> Result<PathBuf, ToolboxError> {
    if !path.is_file() {
        return Err(ToolboxError::NotFound(path.to_path_buf()));
    }
    path.canonicalize().map_err(|err| ToolboxError::Io(format!("{}: {err}", path.display())))
}

/// Validates a file and checks its extension against an allow-list.
///
/// # Errors
///
/// Returns [`ToolboxError::NotFound`] for missing files and
/// [`ToolboxError::Type`] when the extension is not allowed.
pub fn validate_file_with_extension(
    path: &Path,
    what: &str,
    extensions: &[&str],
) -> Result<PathBuf, ToolboxError> {
    let resolved = validate_file(path)?;
    if has_extension(&resolved, extensions) {
        return Ok(resolved);
    }
    let suffix = extension_with_dot(&resolved);
    Err(ToolboxError::Type(format!("invalid {what} file type: {suffix}")))
}

/// Returns true when the path's extension matches one of `extensions`, ignoring case.
#[must_use]
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
}

/// Returns the extension including its leading dot, or an empty string.
#[must_use]
pub fn extension_with_dot(path: &Path) -> String {
    path.extension().map(|ext| format!(".{}", ext.to_string_lossy())).unwrap_or_default()
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Renders `file` relative to the destination toolbox folder.
///
/// Returns `None` when `file` is the toolbox folder itself.
#[must_use]
pub fn resolve_relative_path(file: &Path, toolbox_folder: &Path) -> Option<String> {
    let folder = toolbox_folder.canonicalize().unwrap_or_else(|_| toolbox_folder.to_path_buf());
    let Ok(relative) = file.strip_prefix(&folder) else {
        return Some(file.display().to_string());
    };
    let parts: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(format!("{RELATIVE_PREFIX}{}", parts.join("\\")))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
