// crates/autobox-core/src/toolbox.rs
// ============================================================================
// Module: Toolbox
// Description: Toolbox aggregate, tree-wide validation and archive saving.
// Purpose: Serialize the whole toolbox and write the `.atbx` archive atomically.
// Dependencies: cap-std, serde_json, time, tracing
// ============================================================================

//! ## Overview
//! A [`Toolbox`] holds root-level tools and a [`ToolsetTree`]. Saving runs
//! every whole-tree check (tool names unique across the toolbox, sibling
//! toolset names unique at every depth) before anything reaches the
//! destination, stages each tool folder plus the toolbox documents, packs the
//! staging tree and renames the finished archive into place.
//!
//! Toolsets are numbered breadth-first from 1, counting only toolsets that
//! hold tools directly. A toolbox without any reachable tool renders the
//! sentinel `{"<root>": {"tools": [""]}}` so the host still opens it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use cap_std::fs::Dir;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::ToolboxError;
use crate::archive::Staging;
use crate::archive::entry_exists;
use crate::archive::open_destination;
use crate::archive::pack;
use crate::archive::render_json;
use crate::archive::render_json_canonical;
use crate::archive::replace_archive;
use crate::archive::write_new_file;
use crate::default::DATE_TIME_FORMAT;
use crate::keys;
use crate::sanitize::repeated_names;
use crate::sanitize::validate_toolbox_alias;
use crate::sanitize::validate_toolbox_name;
use crate::script::ScriptTool;
use crate::toolset::ToolsetId;
use crate::toolset::ToolsetTree;

// ============================================================================
// SECTION: Save Options
// ============================================================================

/// Options controlling how a toolbox is saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Replace an existing archive.
    pub overwrite: bool,
    /// Timestamp written into every tool; the current local time when `None`.
    pub updated: Option<String>,
}

impl SaveOptions {
    /// Creates default options: no overwrite, current time.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            overwrite: false,
            updated: None,
        }
    }

    /// Sets the overwrite flag.
    #[must_use]
    pub const fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Pins the tool `updated` timestamp.
    #[must_use]
    pub fn with_updated(mut self, updated: &str) -> Self {
        self.updated = Some(updated.to_string());
        self
    }
}

// ============================================================================
// SECTION: Toolbox
// ============================================================================

/// Toolbox aggregate.
///
/// # Invariants
/// - `name` is a sanitized file stem; `alias` is alphanumeric and starts with a letter.
/// - `label` is never blank.
#[derive(Debug)]
pub struct Toolbox {
    /// Archive file stem.
    name: String,
    /// Display label.
    label: String,
    /// Toolbox alias.
    alias: String,
    /// Optional description.
    description: Option<String>,
    /// Tools at the toolbox root.
    tools: Vec<ScriptTool>,
    /// Nested toolsets.
    toolsets: ToolsetTree,
}

impl Toolbox {
    /// Creates a toolbox; label and alias are derived from the name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] when the name is unusable as a
    /// file name or yields no valid alias.
    pub fn new(name: &str) -> Result<Self, ToolboxError> {
        let validated = validate_toolbox_name(name)
            .ok_or_else(|| ToolboxError::Validation(format!("invalid toolbox name: {name}")))?;
        let alias = validate_toolbox_alias(&validated)
            .ok_or_else(|| ToolboxError::Validation(format!("invalid toolbox alias: {name}")))?;
        Ok(Self {
            label: validated.clone(),
            name: validated,
            alias,
            description: None,
            tools: Vec::new(),
            toolsets: ToolsetTree::new(),
        })
    }

    /// Sets the label; blank labels fall back to the name.
    #[must_use]
    pub fn with_label(mut self, label: &str) -> Self {
        let label = label.trim();
        self.label = if label.is_empty() { self.name.clone() } else { label.to_string() };
        self
    }

    /// Sets the alias; an invalid alias keeps the name-derived one.
    #[must_use]
    pub fn with_alias(mut self, alias: &str) -> Self {
        if let Some(alias) = validate_toolbox_alias(alias) {
            self.alias = alias;
        }
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        let description = description.trim();
        self.description =
            if description.is_empty() { None } else { Some(description.to_string()) };
        self
    }

    /// Appends a tool at the toolbox root.
    pub fn add_tool(&mut self, tool: ScriptTool) {
        self.tools.push(tool);
    }

    /// Adds a toolset at the root or below `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] for invalid names and unknown parents.
    pub fn add_toolset(
        &mut self,
        parent: Option<ToolsetId>,
        name: &str,
    ) -> Result<ToolsetId, ToolboxError> {
        self.toolsets.add_toolset(parent, name)
    }

    /// Appends a tool to a toolset.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] when the toolset is unknown.
    pub fn add_tool_to(
        &mut self,
        toolset: ToolsetId,
        tool: ScriptTool,
    ) -> Result<(), ToolboxError> {
        self.toolsets.add_tool(toolset, tool)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Returns the archive file stem.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the alias.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the root-level tools.
    #[must_use]
    pub fn tools(&self) -> &[ScriptTool] {
        &self.tools
    }

    /// Returns the toolset tree.
    #[must_use]
    pub const fn toolsets(&self) -> &ToolsetTree {
        &self.toolsets
    }

    /// Returns the archive file name, `<name>.atbx`.
    #[must_use]
    pub fn archive_file_name(&self) -> String {
        format!("{}.{}", self.name, keys::ARCHIVE_EXTENSION)
    }

    // ------------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------------

    /// Saves the toolbox into `folder` using the current time.
    ///
    /// Returns the archive path, or `None` when `folder` is not a directory.
    ///
    /// # Errors
    ///
    /// See [`Toolbox::save_with`].
    pub fn save(&self, folder: &Path, overwrite: bool) -> Result<Option<PathBuf>, ToolboxError> {
        self.save_with(folder, &SaveOptions::new().with_overwrite(overwrite))
    }

    /// Saves the toolbox into `folder`.
    ///
    /// Returns the archive path, or `None` when `folder` is not a directory.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::FileExists`] when the archive exists and
    /// overwriting is off, [`ToolboxError::Repetition`] for duplicate tool,
    /// toolset or parameter names, and I/O, serialization or archive errors
    /// from staging and writing.
    pub fn save_with(
        &self,
        folder: &Path,
        options: &SaveOptions,
    ) -> Result<Option<PathBuf>, ToolboxError> {
        let Some(destination) = open_destination(folder)? else {
            warn!(folder = %folder.display(), "destination folder does not exist; nothing saved");
            return Ok(None);
        };
        let archive_name = self.archive_file_name();
        let archive_path = folder.join(&archive_name);
        if !options.overwrite && entry_exists(&destination, &archive_name)? {
            return Err(ToolboxError::FileExists(archive_path));
        }

        let updated = match &options.updated {
            Some(updated) => updated.clone(),
            None => current_timestamp()?,
        };
        let staging = Staging::new()?;
        self.serialize(staging.root(), folder, &updated)?;
        let bytes = pack(staging.root())?;
        replace_archive(&destination, &archive_name, &bytes)?;
        info!(toolbox = %self.name, path = %archive_path.display(), "saved toolbox");
        Ok(Some(archive_path))
    }

    /// Writes every tool folder and the toolbox documents into `staging`.
    fn serialize(
        &self,
        staging: &Dir,
        destination: &Path,
        updated: &str,
    ) -> Result<(), ToolboxError> {
        debug!(toolbox = %self.name, "serializing toolbox");
        let (toolsets, toolset_names) = self.build_toolsets(staging, destination, updated)?;

        let mut content = Map::new();
        content.insert(keys::VERSION.to_string(), Value::from(keys::TOOLBOX_VERSION));
        content.insert(keys::ALIAS.to_string(), Value::from(self.alias.as_str()));
        content.insert(
            keys::DISPLAY_NAME.to_string(),
            Value::String(format!("{}{}", keys::RC_PREFIX, keys::TITLE)),
        );
        if self.description.is_some() {
            content.insert(
                keys::DESCRIPTION.to_string(),
                Value::String(format!("{}{}", keys::RC_PREFIX, keys::DESCR)),
            );
        }
        content.insert(keys::TOOLSETS.to_string(), Value::Object(toolsets));

        let mut map = Map::new();
        map.insert(keys::TITLE.to_string(), Value::from(self.label.as_str()));
        if let Some(description) = &self.description {
            map.insert(keys::DESCR.to_string(), Value::from(description.as_str()));
        }
        map.extend(toolset_names);
        let resource = json!({ keys::MAP: map });

        write_new_file(staging, keys::TOOLBOX_CONTENT, &render_json(&Value::Object(content))?)?;
        write_new_file(staging, keys::TOOLBOX_CONTENT_RC, &render_json_canonical(&resource)?)
    }

    /// Serializes all tools and builds the `toolsets` map and toolset names.
    fn build_toolsets(
        &self,
        staging: &Dir,
        destination: &Path,
        updated: &str,
    ) -> Result<(Map<String, Value>, Map<String, Value>), ToolboxError> {
        self.check_tool_repeats()?;
        self.toolsets.check_sibling_names()?;

        let mut toolsets = Map::new();
        let mut toolset_names = Map::new();
        let root_tools = serialize_tools(&self.tools, staging, destination, updated)?;
        if !root_tools.is_empty() {
            toolsets.insert(keys::ROOT.to_string(), json!({ keys::TOOLS: root_tools }));
        }

        let mut counter = 0_usize;
        for id in self.toolsets.breadth_first() {
            let tools = serialize_tools(self.toolsets.tools(id), staging, destination, updated)?;
            if tools.is_empty() {
                continue;
            }
            counter += 1;
            let indexed = format!("{}{counter}.{}", keys::TOOLSET, keys::NAME);
            let key = format!("{}{indexed}", keys::RC_PREFIX);
            toolsets.insert(key, json!({ keys::TOOLS: tools }));
            let qualified = self.toolsets.qualified_name(id).unwrap_or_default();
            toolset_names.insert(indexed, Value::String(qualified));
        }

        if toolsets.is_empty() {
            toolsets.insert(keys::ROOT.to_string(), json!({ keys::TOOLS: [""] }));
        }
        Ok((toolsets, toolset_names))
    }

    /// Fails when two tools anywhere in the toolbox share a name, ignoring case.
    fn check_tool_repeats(&self) -> Result<(), ToolboxError> {
        let names = self.tools.iter().chain(self.toolsets.all_tools()).map(ScriptTool::name);
        let repeated = repeated_names(names);
        if repeated.is_empty() {
            return Ok(());
        }
        Err(ToolboxError::Repetition(format!(
            "Tool name repetition detected: {}",
            repeated.join("; ")
        )))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serializes tools sorted by name and returns their qualified names.
fn serialize_tools(
    tools: &[ScriptTool],
    staging: &Dir,
    destination: &Path,
    updated: &str,
) -> Result<Vec<String>, ToolboxError> {
    let mut sorted: Vec<&ScriptTool> = tools.iter().collect();
    sorted.sort_by(|left, right| left.name().cmp(right.name()));
    let mut names = Vec::with_capacity(sorted.len());
    for tool in sorted {
        tool.serialize(staging, destination, updated)?;
        names.push(tool.qualified_name());
    }
    Ok(names)
}

/// Formats the current local time (UTC when the offset is unknown).
fn current_timestamp() -> Result<String, ToolboxError> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(DATE_TIME_FORMAT).map_err(|err| ToolboxError::Serialization(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
