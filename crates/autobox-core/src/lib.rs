// crates/autobox-core/src/lib.rs
// ============================================================================
// Module: Autobox Core Library
// Description: Toolbox object model and archive serialization engine.
// Purpose: Model script tools and package them as host-readable archives.
// Dependencies: cap-std, serde_json, serde_jcs, tempfile, thiserror, time, tracing, zip
// ============================================================================

//! ## Overview
//! Autobox models a toolbox (a tree of toolsets holding script tools, each
//! tool holding typed parameters) and serializes it into the paired
//! content/resource JSON documents expected by the host application, packed
//! into a deflate zip archive with the `.atbx` extension.
//!
//! Invariants:
//! - Invalid entity state is rejected when a property is assigned, never at save time.
//! - Whole-tree uniqueness rules (tool names, sibling toolsets, parameter names) are checked
//!   at save time before any archive is written.
//! - Serialized documents are deterministic apart from the tool `updated` timestamp, which
//!   callers can pin through [`SaveOptions`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod archive;
pub mod default;
pub mod enums;
pub mod filter;
pub mod keys;
pub mod kind;
pub mod parameter;
pub mod paths;
pub mod sanitize;
pub mod script;
pub mod toolbox;
pub mod toolset;

// ============================================================================
// SECTION: Errors
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or saving a toolbox.
///
/// # Invariants
/// - Variants carry human-readable context including the offending value(s).
/// - [`ToolboxError::Repetition`] lists the full sorted set of conflicting names.
#[derive(Debug, Error)]
pub enum ToolboxError {
    /// A name, label, alias or value failed validation.
    #[error("validation error: {0}")]
    Validation(String),
    /// A value had the wrong type for the property it was assigned to.
    #[error("type error: {0}")]
    Type(String),
    /// Names that must be unique were repeated.
    #[error("{0}")]
    Repetition(String),
    /// A referenced script, image or style file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The target archive exists and overwriting was not permitted.
    #[error("file already exists: {}", .0.display())]
    FileExists(PathBuf),
    /// Filesystem failure while staging or writing the archive.
    #[error("io error: {0}")]
    Io(String),
    /// JSON rendering failure.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Zip packaging failure.
    #[error("archive error: {0}")]
    Archive(String),
}

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use default::BoundingBox;
pub use default::CellSizeXY;
pub use default::DateValue;
pub use default::DefaultType;
pub use default::DefaultValue;
pub use default::Extent;
pub use default::Number;
pub use default::Point;
pub use default::RangeDomain;
pub use default::UnitValue;
pub use enums::ArealUnit;
pub use enums::FieldType;
pub use enums::GeometryType;
pub use enums::LinearUnit;
pub use enums::SACellSize;
pub use enums::TimeUnit;
pub use enums::WorkspaceType;
pub use filter::Filter;
pub use filter::FilterKind;
pub use filter::FilterValue;
pub use kind::Kind;
pub use parameter::Direction;
pub use parameter::Parameter;
pub use parameter::ParameterId;
pub use parameter::Requirement;
pub use script::ExecutionScript;
pub use script::ScriptTool;
pub use script::ToolAttributes;
pub use script::ValidationScript;
pub use toolbox::SaveOptions;
pub use toolbox::Toolbox;
pub use toolset::ToolsetId;
pub use toolset::ToolsetTree;
