// crates/autobox-config/src/lib.rs
// ============================================================================
// Module: Autobox Config Library
// Description: TOML toolbox manifests and their conversion into toolboxes.
// Purpose: Single source of truth for autobox.toml semantics.
// Dependencies: autobox-core, serde, thiserror, time, toml, tracing
// ============================================================================

//! ## Overview
//! `autobox-config` reads a toolbox manifest from TOML with strict size and
//! path limits, validates it as a whole and builds an
//! [`autobox_core::Toolbox`] ready to be saved. Relative paths inside the
//! manifest resolve against the directory holding the manifest file.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod manifest;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use manifest::ConfigError;
pub use manifest::DirectionSetting;
pub use manifest::FilterSection;
pub use manifest::ParameterSection;
pub use manifest::RequirementSetting;
pub use manifest::ScriptSection;
pub use manifest::ToolSection;
pub use manifest::ToolboxManifest;
pub use manifest::ToolboxSection;
pub use manifest::ToolsetSection;
