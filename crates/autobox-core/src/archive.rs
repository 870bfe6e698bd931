// crates/autobox-core/src/archive.rs
// ============================================================================
// Module: Archive Packaging
// Description: JSON rendering, staging directories and deterministic zip output.
// Purpose: Turn a staged toolbox tree into a byte-stable `.atbx` archive on disk.
// Dependencies: cap-std, cap-primitives, serde_jcs, serde_json, tempfile, tracing, zip
// ============================================================================

//! ## Overview
//! Serialization happens in two phases. Documents and copied files are first
//! written into a private [`Staging`] directory, then the staged tree is
//! packed into an in-memory zip whose entries are sorted by relative path,
//! deflated and stamped with a fixed timestamp. The archive bytes reach the
//! destination folder through a temporary sibling and an atomic rename, so an
//! existing archive is only ever replaced by a complete one.
//!
//! All filesystem access below the staging root and the destination folder
//! goes through `cap-std` handles opened without following symlinks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::io::Cursor;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;

use cap_primitives::fs::FollowSymlinks;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use cap_std::fs::OpenOptions;
use serde_json::Value;
use tempfile::TempDir;
use tracing::debug;
use zip::CompressionMethod;
use zip::DateTime;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::ToolboxError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum attempts at allocating a unique partial archive name.
const MAX_TEMP_ATTEMPTS: u32 = 64;

/// Permission bits recorded for every archive entry.
const ENTRY_PERMISSIONS: u32 = 0o644;

// ============================================================================
// SECTION: JSON Rendering
// ============================================================================

/// Renders a document as pretty JSON in insertion order, newline terminated.
///
/// Used for content documents, where key order carries meaning (parameter
/// order inside `params`, for example).
///
/// # Errors
///
/// Returns [`ToolboxError::Serialization`] when rendering fails.
pub fn render_json(value: &Value) -> Result<Vec<u8>, ToolboxError> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| ToolboxError::Serialization(err.to_string()))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Renders a document as pretty JSON with canonical (JCS) key ordering.
///
/// Used for resource documents, which are pure lookup tables.
///
/// # Errors
///
/// Returns [`ToolboxError::Serialization`] when canonicalization fails.
pub fn render_json_canonical(value: &Value) -> Result<Vec<u8>, ToolboxError> {
    let canonical =
        serde_jcs::to_vec(value).map_err(|err| ToolboxError::Serialization(err.to_string()))?;
    let canonical_value: Value = serde_json::from_slice(&canonical)
        .map_err(|err| ToolboxError::Serialization(err.to_string()))?;
    render_json(&canonical_value)
}

// ============================================================================
// SECTION: Staging
// ============================================================================

/// Private scratch directory that holds the archive tree before packing.
///
/// # Invariants
/// - The directory is removed when the value drops, on success and on error.
/// - Each save owns its own staging directory.
#[derive(Debug)]
pub struct Staging {
    /// Capability handle rooted at the scratch directory.
    root: Dir,
    /// Owner of the on-disk scratch directory; removes it on drop.
    _temp: TempDir,
}

impl Staging {
    /// Creates a fresh staging directory.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Io`] when the directory cannot be created or opened.
    pub fn new() -> Result<Self, ToolboxError> {
        let temp = TempDir::new().map_err(|err| ToolboxError::Io(err.to_string()))?;
        let root = Dir::open_ambient_dir(temp.path(), ambient_authority())
            .map_err(|err| ToolboxError::Io(err.to_string()))?;
        debug!(path = %temp.path().display(), "opened staging directory");
        Ok(Self {
            root,
            _temp: temp,
        })
    }

    /// Returns the capability handle of the staging root.
    #[must_use]
    pub const fn root(&self) -> &Dir {
        &self.root
    }
}

/// Open options that never follow a symlink in the final component.
fn nofollow(create: bool) -> OpenOptions {
    let mut options = OpenOptions::new();
    if create {
        options.write(true).create_new(true);
    } else {
        options.read(true);
    }
    options._cap_fs_ext_follow(FollowSymlinks::No);
    options
}

/// Creates a tool folder below `parent` and returns a handle to it.
///
/// # Errors
///
/// Returns [`ToolboxError::Io`] when the folder already exists or cannot be opened.
pub fn create_child_dir(parent: &Dir, name: &str) -> Result<Dir, ToolboxError> {
    let io_error = |err: std::io::Error| ToolboxError::Io(format!("{name}: {err}"));
    parent.create_dir(name).map_err(io_error)?;
    let folder = parent.open_with(name, &nofollow(false)).map_err(io_error)?;
    if !folder.metadata().map_err(io_error)?.is_dir() {
        return Err(ToolboxError::Io(format!("{name}: staged entry is not a folder")));
    }
    Ok(Dir::from_std_file(folder.into_std()))
}

/// Writes a new file into `dir`; an existing entry is an error.
///
/// # Errors
///
/// Returns [`ToolboxError::Io`] when the file exists or cannot be written.
pub fn write_new_file(dir: &Dir, name: &str, bytes: &[u8]) -> Result<(), ToolboxError> {
    let io_error = |err: std::io::Error| ToolboxError::Io(format!("{name}: {err}"));
    let mut file = dir.open_with(name, &nofollow(true)).map_err(io_error)?;
    file.write_all(bytes).map_err(io_error)
}

/// Copies an ambient file into `dir` under a new name.
///
/// # Errors
///
/// Returns [`ToolboxError::NotFound`] when the source vanished and
/// [`ToolboxError::Io`] for other failures.
pub fn copy_into(dir: &Dir, source: &Path, name: &str) -> Result<(), ToolboxError> {
    let bytes = std::fs::read(source).map_err(|err| match err.kind() {
        ErrorKind::NotFound => ToolboxError::NotFound(source.to_path_buf()),
        _ => ToolboxError::Io(format!("{}: {err}", source.display())),
    })?;
    write_new_file(dir, name, &bytes)
}

// ============================================================================
// SECTION: Packing
// ============================================================================

/// Lists the archive entry names of the staged tree, `/`-separated and sorted.
///
/// Tool folders are walked with an explicit stack; anything other than plain
/// files and folders aborts the walk.
///
/// # Errors
///
/// Returns [`ToolboxError::Io`] when a folder cannot be read, a name is not
/// utf-8, or the tree holds a symlink.
pub fn staged_entries(root: &Dir) -> Result<BTreeSet<String>, ToolboxError> {
    let io_error = |err: std::io::Error| ToolboxError::Io(err.to_string());
    let mut entries = BTreeSet::new();
    let mut pending = vec![(root.try_clone().map_err(io_error)?, String::new())];
    while let Some((folder, prefix)) = pending.pop() {
        for entry in folder.entries().map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            let name = entry.file_name().into_string().map_err(|name| {
                ToolboxError::Io(format!("non utf-8 staged name: {}", name.to_string_lossy()))
            })?;
            let entry_name = if prefix.is_empty() { name } else { format!("{prefix}/{name}") };
            let file_type = entry.file_type().map_err(io_error)?;
            if file_type.is_dir() {
                pending.push((entry.open_dir().map_err(io_error)?, entry_name));
            } else if file_type.is_file() {
                entries.insert(entry_name);
            } else {
                return Err(ToolboxError::Io(format!("unexpected staged entry: {entry_name}")));
            }
        }
    }
    Ok(entries)
}

/// Options applied to every archive entry.
fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(ENTRY_PERMISSIONS)
}

/// Packs the staged tree into deterministic zip bytes.
///
/// Entries are added in sorted path order with a fixed timestamp, so equal
/// trees always produce equal bytes.
///
/// # Errors
///
/// Returns [`ToolboxError::Io`] for read failures and
/// [`ToolboxError::Archive`] for zip failures.
pub fn pack(root: &Dir) -> Result<Vec<u8>, ToolboxError> {
    let entries = staged_entries(root)?;
    let zip_error = |err: zip::result::ZipError| ToolboxError::Archive(err.to_string());
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for name in &entries {
        let bytes = root.read(name).map_err(|err| ToolboxError::Io(format!("{name}: {err}")))?;
        writer.start_file(name.as_str(), entry_options()).map_err(zip_error)?;
        writer.write_all(&bytes).map_err(|err| ToolboxError::Archive(err.to_string()))?;
    }
    let cursor = writer.finish().map_err(zip_error)?;
    debug!(entries = entries.len(), "packed archive");
    Ok(cursor.into_inner())
}

// ============================================================================
// SECTION: Destination
// ============================================================================

/// Opens the destination folder, or returns `None` when it is not a directory.
///
/// # Errors
///
/// Returns [`ToolboxError::Io`] when an existing folder cannot be opened.
pub fn open_destination(folder: &Path) -> Result<Option<Dir>, ToolboxError> {
    if !folder.is_dir() {
        return Ok(None);
    }
    Dir::open_ambient_dir(folder, ambient_authority())
        .map(Some)
        .map_err(|err| ToolboxError::Io(format!("{}: {err}", folder.display())))
}

/// Returns true when `name` exists in `dir`, without following symlinks.
///
/// # Errors
///
/// Returns [`ToolboxError::Io`] when the entry cannot be inspected.
pub fn entry_exists(dir: &Dir, name: &str) -> Result<bool, ToolboxError> {
    match dir.symlink_metadata(name) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(ToolboxError::Io(format!("{name}: {err}"))),
    }
}

/// Puts archive bytes in place as `archive_name`, replacing any previous archive.
///
/// The bytes go to a hidden `.partial` sibling first, which is renamed over
/// the final name once synced. A failed write removes the partial file.
///
/// # Errors
///
/// Returns [`ToolboxError::Io`] when no partial file can be created or the
/// write or rename fails.
pub fn replace_archive(
    destination: &Dir,
    archive_name: &str,
    bytes: &[u8],
) -> Result<(), ToolboxError> {
    let pid = std::process::id();
    for attempt in 0 .. MAX_TEMP_ATTEMPTS {
        let partial = format!(".{archive_name}.{pid}-{attempt}.partial");
        let mut file = match destination.open_with(&partial, &nofollow(true)) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(ToolboxError::Io(format!("{partial}: {err}"))),
        };
        let written = file
            .write_all(bytes)
            .and_then(|()| file.sync_all())
            .and_then(|()| destination.rename(&partial, destination, archive_name));
        if let Err(err) = written {
            let _ = destination.remove_file(&partial);
            return Err(ToolboxError::Io(format!("{archive_name}: {err}")));
        }
        debug!(archive = archive_name, bytes = bytes.len(), "archive moved into place");
        return Ok(());
    }
    Err(ToolboxError::Io(format!("no free partial file name for {archive_name}")))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
