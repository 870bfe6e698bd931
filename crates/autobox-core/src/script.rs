// crates/autobox-core/src/script.rs
// ============================================================================
// Module: Script Tools
// Description: Script tool entity, execution/validation scripts and tool folders.
// Purpose: Serialize one tool into its `<folder>.tool/` directory of the archive.
// Dependencies: cap-std, serde_json, tracing
// ============================================================================

//! ## Overview
//! A [`ScriptTool`] owns its parameters, scripts and images. Serializing a
//! tool writes `tool.content` (insertion ordered), `tool.content.rc`
//! (canonical), the execution script (a built-in stub when none is attached),
//! the optional validation script and copies of the icon and illustration.
//!
//! Invariants:
//! - Tool names are alphanumeric and start with a letter; reserved device
//!   names get a distinct folder name and a qualified `name:folder.tool` form.
//! - Parameter names are unique per tool ignoring case, checked at save time.
//! - A script always holds inline code or a validated file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use cap_std::fs::Dir;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;

use crate::ToolboxError;
use crate::archive::copy_into;
use crate::archive::create_child_dir;
use crate::archive::render_json;
use crate::archive::render_json_canonical;
use crate::archive::write_new_file;
use crate::keys;
use crate::parameter::CategoryIndex;
use crate::parameter::Parameter;
use crate::paths::extension_with_dot;
use crate::paths::resolve_relative_path;
use crate::paths::validate_file;
use crate::paths::validate_file_with_extension;
use crate::sanitize::repeated_names;
use crate::sanitize::validate_script_folder_name;
use crate::sanitize::validate_script_name;
use crate::sanitize::wrap_markup;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Execution script written when a tool has none attached.
const SCRIPT_STUB: &str = r#"
# -*- coding: utf-8 -*-
"""
Documentation
"""


import arcpy


def example_script_tool(feature_class, field_name):
    """
    Documentation
    """
    return


if __name__ == '__main__':
    param0 = arcpy.GetParameterAsText(0)
    param1 = arcpy.GetParameterAsText(1)
    example_script_tool(param0, param1)
    arcpy.SetParameterAsText(2, 'Result')

"#;

/// Image extensions accepted for icons and illustrations.
const IMAGE_EXTENSIONS: [&str; 2] = ["png", "jpg"];

// ============================================================================
// SECTION: Tool Attributes
// ============================================================================

/// Special behavior flags of a script tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ToolAttributes {
    /// The tool modifies its input data.
    pub modifies_input: bool,
    /// Outputs are not added to the map.
    pub skip_add_to_map: bool,
    /// The tool supports undo inside an edit session.
    pub enable_undo: bool,
    /// The tool consumes credits.
    pub consumes_credits: bool,
}

impl ToolAttributes {
    /// Attribute keywords in their serialized order.
    pub const KEYWORDS: [&'static str; 4] = [
        keys::ATTR_INPUT_DATA_CHANGE,
        keys::ATTR_BLOCK_ADD_TO_MAP,
        keys::ATTR_EDIT_SESSION,
        keys::ATTR_CREDITS,
    ];

    /// Builds attributes from keywords.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] for an unknown keyword.
    pub fn from_keywords<'a>(
        keywords: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ToolboxError> {
        let mut attributes = Self::default();
        for keyword in keywords {
            match keyword.trim() {
                keys::ATTR_INPUT_DATA_CHANGE => attributes.modifies_input = true,
                keys::ATTR_BLOCK_ADD_TO_MAP => attributes.skip_add_to_map = true,
                keys::ATTR_EDIT_SESSION => attributes.enable_undo = true,
                keys::ATTR_CREDITS => attributes.consumes_credits = true,
                other => {
                    return Err(ToolboxError::Validation(format!(
                        "unknown tool attribute: {other}"
                    )));
                }
            }
        }
        Ok(attributes)
    }

    /// Returns the keywords of the set flags in serialized order.
    #[must_use]
    pub fn keywords(&self) -> Vec<&'static str> {
        let flags = [
            self.modifies_input,
            self.skip_add_to_map,
            self.enable_undo,
            self.consumes_credits,
        ];
        flags
            .into_iter()
            .zip(Self::KEYWORDS)
            .filter_map(|(set, keyword)| set.then_some(keyword))
            .collect()
    }

    /// Returns true when any flag is set.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.modifies_input || self.skip_add_to_map || self.enable_undo || self.consumes_credits
    }
}

// ============================================================================
// SECTION: Scripts
// ============================================================================

/// Where a script's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScriptSource {
    /// Inline code, always embedded.
    Code(String),
    /// Validated file, embedded or linked.
    File {
        /// Canonical path of the script.
        path: PathBuf,
        /// Whether the file text is copied into the archive.
        embed: bool,
    },
}

impl ScriptSource {
    /// Builds an inline source, rejecting blank code.
    fn code(code: &str) -> Result<Self, ToolboxError> {
        if code.trim().is_empty() {
            return Err(ToolboxError::Validation("no code provided".to_string()));
        }
        Ok(Self::Code(code.to_string()))
    }

    /// Builds a file source after validating the path.
    fn file(path: &Path, embed: bool) -> Result<Self, ToolboxError> {
        Ok(Self::File {
            path: validate_file(path)?,
            embed,
        })
    }

    /// Returns true when the script text is stored inside the archive.
    const fn is_embedded(&self) -> bool {
        match self {
            Self::Code(_) => true,
            Self::File {
                embed, ..
            } => *embed,
        }
    }

    /// Produces the text written into the archive.
    ///
    /// Linked files render relative to `target` when below it.
    fn content(&self, target: &Path) -> Result<String, ToolboxError> {
        match self {
            Self::Code(code) => Ok(code.clone()),
            Self::File {
                path,
                embed: true,
            } => std::fs::read_to_string(path).map_err(|err| match err.kind() {
                ErrorKind::NotFound => ToolboxError::NotFound(path.clone()),
                _ => ToolboxError::Io(format!("{}: {err}", path.display())),
            }),
            Self::File {
                path,
                embed: false,
            } => Ok(resolve_relative_path(path, target)
                .unwrap_or_else(|| path.display().to_string())),
        }
    }
}

/// Script run when the tool executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionScript {
    /// Script text source.
    source: ScriptSource,
}

impl ExecutionScript {
    /// Creates an embedded script from inline code.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] when the code is blank.
    pub fn from_code(code: &str) -> Result<Self, ToolboxError> {
        Ok(Self {
            source: ScriptSource::code(code)?,
        })
    }

    /// Creates a script from an existing file, embedded or linked.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::NotFound`] when the file does not exist.
    pub fn from_file(path: &Path, embed: bool) -> Result<Self, ToolboxError> {
        Ok(Self {
            source: ScriptSource::file(path, embed)?,
        })
    }

    /// Returns the built-in stub used when a tool has no execution script.
    #[must_use]
    pub fn stub() -> Self {
        Self {
            source: ScriptSource::Code(SCRIPT_STUB.to_string()),
        }
    }

    /// Returns true when the script text is stored inside the archive.
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        self.source.is_embedded()
    }

    /// Returns the archive file name for this script.
    #[must_use]
    pub const fn file_name(&self) -> &'static str {
        if self.is_embedded() {
            keys::TOOL_SCRIPT_EXECUTE_PY
        } else {
            keys::TOOL_SCRIPT_EXECUTE_LINK
        }
    }

    /// Writes the script into a tool folder.
    fn write(&self, tool_dir: &Dir, target: &Path) -> Result<(), ToolboxError> {
        let content = self.source.content(target)?;
        write_new_file(tool_dir, self.file_name(), content.as_bytes())
    }
}

/// Script run by the host to validate parameters; always embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationScript {
    /// Script text source.
    source: ScriptSource,
}

impl ValidationScript {
    /// Creates a validation script from inline code.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] when the code is blank.
    pub fn from_code(code: &str) -> Result<Self, ToolboxError> {
        Ok(Self {
            source: ScriptSource::code(code)?,
        })
    }

    /// Creates a validation script from an existing file.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::NotFound`] when the file does not exist.
    pub fn from_file(path: &Path) -> Result<Self, ToolboxError> {
        Ok(Self {
            source: ScriptSource::file(path, true)?,
        })
    }

    /// Writes the script into a tool folder.
    fn write(&self, tool_dir: &Dir, target: &Path) -> Result<(), ToolboxError> {
        let content = self.source.content(target)?;
        write_new_file(tool_dir, keys::TOOL_SCRIPT_VALIDATE_PY, content.as_bytes())
    }
}

// ============================================================================
// SECTION: Script Tool
// ============================================================================

/// Script tool entity.
///
/// # Invariants
/// - `name` is sanitized; `folder` differs from it only for reserved device names.
/// - `label` is never blank.
/// - Icon and illustration paths are validated `.png`/`.jpg` files.
#[derive(Debug)]
pub struct ScriptTool {
    /// Tool name.
    name: String,
    /// Folder name inside the archive, without the `.tool` suffix.
    folder: String,
    /// Display label.
    label: String,
    /// Plain-text description.
    description: Option<String>,
    /// Summary text, plain or markup.
    summary: Option<String>,
    /// Behavior flags.
    attributes: ToolAttributes,
    /// Execution script; the stub is used when absent.
    execution: Option<ExecutionScript>,
    /// Optional validation script.
    validation: Option<ValidationScript>,
    /// Optional icon image.
    icon: Option<PathBuf>,
    /// Optional illustration image.
    illustration: Option<PathBuf>,
    /// Parameters in display order.
    parameters: Vec<Parameter>,
}

impl ScriptTool {
    /// Creates a tool; the label defaults to the sanitized name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] when the name has no usable characters.
    pub fn new(name: &str) -> Result<Self, ToolboxError> {
        let validated = validate_script_name(name)
            .ok_or_else(|| ToolboxError::Validation(format!("invalid script name: {name}")))?;
        Ok(Self {
            folder: validate_script_folder_name(&validated),
            label: validated.clone(),
            name: validated,
            description: None,
            summary: None,
            attributes: ToolAttributes::default(),
            execution: None,
            validation: None,
            icon: None,
            illustration: None,
            parameters: Vec::new(),
        })
    }

    /// Sets the label; blank labels fall back to the name.
    #[must_use]
    pub fn with_label(mut self, label: &str) -> Self {
        let label = label.trim();
        self.label = if label.is_empty() { self.name.clone() } else { label.to_string() };
        self
    }

    /// Sets the plain-text description.
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = non_blank(description);
        self
    }

    /// Sets the summary.
    #[must_use]
    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = non_blank(summary);
        self
    }

    /// Sets the behavior flags.
    #[must_use]
    pub const fn with_attributes(mut self, attributes: ToolAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Attaches or clears the execution script.
    pub fn set_execution_script(&mut self, script: Option<ExecutionScript>) {
        self.execution = script;
    }

    /// Attaches or clears the validation script.
    pub fn set_validation_script(&mut self, script: Option<ValidationScript>) {
        self.validation = script;
    }

    /// Sets or clears the icon image.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::NotFound`] for missing files and
    /// [`ToolboxError::Type`] for extensions other than `.png`/`.jpg`.
    pub fn set_icon(&mut self, path: Option<&Path>) -> Result<(), ToolboxError> {
        self.icon = path
            .map(|path| validate_file_with_extension(path, "icon", &IMAGE_EXTENSIONS))
            .transpose()?;
        Ok(())
    }

    /// Sets or clears the illustration image.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::NotFound`] for missing files and
    /// [`ToolboxError::Type`] for extensions other than `.png`/`.jpg`.
    pub fn set_illustration(&mut self, path: Option<&Path>) -> Result<(), ToolboxError> {
        self.illustration = path
            .map(|path| validate_file_with_extension(path, "illustration", &IMAGE_EXTENSIONS))
            .transpose()?;
        Ok(())
    }

    /// Appends a parameter.
    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name used in toolset tool lists.
    ///
    /// Tools whose folder differs from their name render as `name:folder.tool`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        if self.folder == self.name {
            return self.name.clone();
        }
        format!("{}:{}", self.name, self.folder_name())
    }

    /// Returns the tool folder name inside the archive.
    #[must_use]
    pub fn folder_name(&self) -> String {
        format!("{}.{}", self.folder, keys::TOOL_SUFFIX)
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the plain-text description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the summary, wrapped in `<xdoc>` when it holds markup.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        self.summary.as_deref().and_then(wrap_markup)
    }

    /// Returns the behavior flags.
    #[must_use]
    pub const fn attributes(&self) -> ToolAttributes {
        self.attributes
    }

    /// Returns the attached execution script.
    #[must_use]
    pub const fn execution_script(&self) -> Option<&ExecutionScript> {
        self.execution.as_ref()
    }

    /// Returns the attached validation script.
    #[must_use]
    pub const fn validation_script(&self) -> Option<&ValidationScript> {
        self.validation.as_ref()
    }

    /// Returns the icon path.
    #[must_use]
    pub fn icon(&self) -> Option<&Path> {
        self.icon.as_deref()
    }

    /// Returns the illustration path.
    #[must_use]
    pub fn illustration(&self) -> Option<&Path> {
        self.illustration.as_deref()
    }

    /// Returns the parameters in display order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Finds a parameter by name, ignoring case.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        let wanted = name.to_lowercase();
        self.parameters.iter().find(|parameter| parameter.name().to_lowercase() == wanted)
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// Writes the tool folder into `staging` and returns its name.
    ///
    /// `destination` is the folder receiving the archive, used to resolve
    /// linked scripts and symbology; `updated` is the timestamp written into
    /// the content document.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Repetition`] for repeated parameter names and
    /// I/O or serialization errors from staging.
    pub fn serialize(
        &self,
        staging: &Dir,
        destination: &Path,
        updated: &str,
    ) -> Result<String, ToolboxError> {
        debug!(tool = %self.name, parameters = self.parameters.len(), "serializing tool");
        let (content, resource) = self.build_documents(destination, updated)?;
        let folder_name = self.folder_name();
        let tool_dir = create_child_dir(staging, &folder_name)?;
        write_new_file(&tool_dir, keys::TOOL_CONTENT, &render_json(&content)?)?;
        write_new_file(&tool_dir, keys::TOOL_CONTENT_RC, &render_json_canonical(&resource)?)?;

        match &self.execution {
            Some(script) => script.write(&tool_dir, destination)?,
            None => ExecutionScript::stub().write(&tool_dir, destination)?,
        }
        if let Some(script) = &self.validation {
            script.write(&tool_dir, destination)?;
        }
        let images = [(keys::TOOL_ICON, &self.icon), (keys::TOOL_ILLUSTRATION, &self.illustration)];
        for (stem, image) in images {
            if let Some(path) = image {
                copy_into(&tool_dir, path, &format!("{stem}{}", extension_with_dot(path)))?;
            }
        }
        Ok(folder_name)
    }

    /// Builds the content and resource documents.
    fn build_documents(
        &self,
        destination: &Path,
        updated: &str,
    ) -> Result<(Value, Value), ToolboxError> {
        let (params, parameter_resources) = self.build_parameters(destination)?;

        let mut content = Map::new();
        content.insert(keys::TYPE.to_string(), Value::from(keys::SCRIPT_TOOL));
        content.insert(keys::DISPLAY_NAME.to_string(), rc_value(keys::TITLE));
        content.insert(keys::APP_VER.to_string(), Value::from(keys::APP_VERSION));
        if self.description.is_some() {
            content.insert(keys::DESCRIPTION.to_string(), rc_value(keys::DESCRIPTION));
        }
        if self.attributes.any() {
            content.insert(keys::ATTRIBUTES.to_string(), Value::from(self.attributes.keywords()));
        }
        content.insert(keys::PRODUCT_KEY.to_string(), Value::from(keys::PRODUCT));
        content.insert(keys::UPDATED.to_string(), Value::from(updated));
        content.insert(keys::PARAMS.to_string(), params);

        let mut map = Map::new();
        map.insert(keys::TITLE.to_string(), Value::from(self.label.as_str()));
        if let Some(description) = &self.description {
            map.insert(keys::DESCRIPTION.to_string(), Value::from(description.as_str()));
        }
        if let Some(summary) = self.summary() {
            map.insert(keys::SUMMARY.to_string(), Value::from(summary));
        }
        map.extend(parameter_resources);

        let mut resource = Map::new();
        resource.insert(keys::MAP.to_string(), Value::Object(map));
        Ok((Value::Object(content), Value::Object(resource)))
    }

    /// Builds the `params` value and the parameter resources.
    ///
    /// A tool without parameters renders `params` as an empty string.
    fn build_parameters(
        &self,
        destination: &Path,
    ) -> Result<(Value, Map<String, Value>), ToolboxError> {
        if self.parameters.is_empty() {
            return Ok((Value::from(""), Map::new()));
        }
        self.check_parameter_repeats()?;

        let mut categories = CategoryIndex::new();
        for category in self.parameters.iter().filter_map(Parameter::category) {
            categories.register(category);
        }

        let mut params = Map::new();
        let mut resources = Map::new();
        for parameter in &self.parameters {
            let (content, resource) = parameter.serialize(&categories, destination);
            resources.extend(resource);
            params.insert(parameter.name().to_string(), Value::Object(content));
        }
        for (index, name) in categories.iter() {
            resources.insert(
                format!("{}.{}{index}", keys::PARAMS, keys::CATEGORY),
                Value::from(name),
            );
        }
        Ok((Value::Object(params), resources))
    }

    /// Fails when two parameters share a name, ignoring case.
    fn check_parameter_repeats(&self) -> Result<(), ToolboxError> {
        let repeated = repeated_names(self.parameters.iter().map(Parameter::name));
        if repeated.is_empty() {
            return Ok(());
        }
        Err(ToolboxError::Repetition(format!(
            "Parameter name repetition detected: {}",
            repeated.join("; ")
        )))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns a `$rc:` indirection to `key`.
fn rc_value(key: &str) -> Value {
    Value::String(format!("{}{key}", keys::RC_PREFIX))
}

/// Returns trimmed text, or `None` when blank.
fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() { None } else { Some(value.to_string()) }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
