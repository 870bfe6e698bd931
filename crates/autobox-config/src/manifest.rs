// crates/autobox-config/src/manifest.rs
// ============================================================================
// Module: Toolbox Manifest
// Description: Manifest loading, validation and toolbox construction.
// Purpose: Provide strict, fail-closed manifest parsing with hard limits.
// Dependencies: autobox-core, serde, thiserror, time, toml, tracing
// ============================================================================

//! ## Overview
//! A manifest is a TOML file with a `[toolbox]` table, any number of
//! `[[toolset]]` entries and `[[tool]]` entries carrying their
//! `[[tool.parameter]]` lists. Loading enforces a size limit and path length
//! limits before parsing, rejects unknown keys and validates every
//! cross-reference before [`ToolboxManifest::build`] assembles the toolbox.
//!
//! Tools are placed by name: `toolbox.tools` lists root tools and each
//! toolset lists its own. A declared tool that no container lists lands at
//! the toolbox root. Toolset parents are qualified toolset names using `\`
//! as the separator and must be declared before their children.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use autobox_core::ArealUnit;
use autobox_core::DefaultType;
use autobox_core::DefaultValue;
use autobox_core::Direction;
use autobox_core::ExecutionScript;
use autobox_core::FieldType;
use autobox_core::Filter;
use autobox_core::FilterKind;
use autobox_core::FilterValue;
use autobox_core::GeometryType;
use autobox_core::Kind;
use autobox_core::LinearUnit;
use autobox_core::Number;
use autobox_core::Parameter;
use autobox_core::Requirement;
use autobox_core::SACellSize;
use autobox_core::ScriptTool;
use autobox_core::TimeUnit;
use autobox_core::ToolAttributes;
use autobox_core::Toolbox;
use autobox_core::ToolboxError;
use autobox_core::UnitValue;
use autobox_core::ValidationScript;
use autobox_core::WorkspaceType;
use serde::Deserialize;
use thiserror::Error;
use time::Date;
use time::PrimitiveDateTime;
use time::Time;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use toml::Value;
use toml::value::Datetime;
use tracing::debug;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default manifest filename when no path is specified.
pub const DEFAULT_MANIFEST_NAME: &str = "autobox.toml";
/// Environment variable used to override the manifest path.
pub const MANIFEST_ENV_VAR: &str = "AUTOBOX_MANIFEST";
/// Maximum manifest file size in bytes.
pub const MAX_MANIFEST_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Layout of date-only defaults.
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
/// Layout of time-only defaults.
const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second][optional [.[subsecond]]]");
/// Layout of local date-time defaults as TOML renders them.
const DATE_TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
);

// ============================================================================
// SECTION: Manifest Types
// ============================================================================

/// Parsed toolbox manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolboxManifest {
    /// Toolbox identity and root tools.
    pub toolbox: ToolboxSection,
    /// Toolsets in declaration order.
    #[serde(default, rename = "toolset")]
    pub toolsets: Vec<ToolsetSection>,
    /// Tool definitions in declaration order.
    #[serde(default, rename = "tool")]
    pub tools: Vec<ToolSection>,
    /// Directory that relative paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// `[toolbox]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolboxSection {
    /// Toolbox name; also the archive file stem.
    pub name: String,
    /// Display label.
    #[serde(default)]
    pub label: Option<String>,
    /// Alias overriding the name-derived one.
    #[serde(default)]
    pub alias: Option<String>,
    /// Description text.
    #[serde(default)]
    pub description: Option<String>,
    /// Names of tools placed at the toolbox root.
    #[serde(default)]
    pub tools: Vec<String>,
}

/// `[[toolset]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsetSection {
    /// Toolset name.
    pub name: String,
    /// Qualified name of the parent toolset.
    #[serde(default)]
    pub parent: Option<String>,
    /// Names of tools placed in this toolset.
    #[serde(default)]
    pub tools: Vec<String>,
}

/// `[[tool]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolSection {
    /// Tool name, also used for placement.
    pub name: String,
    /// Display label.
    #[serde(default)]
    pub label: Option<String>,
    /// Description text.
    #[serde(default)]
    pub description: Option<String>,
    /// Summary text.
    #[serde(default)]
    pub summary: Option<String>,
    /// Attribute keywords.
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Execution script source.
    #[serde(default)]
    pub execution: Option<ScriptSection>,
    /// Validation script source.
    #[serde(default)]
    pub validation: Option<ScriptSection>,
    /// Icon image.
    #[serde(default)]
    pub icon: Option<PathBuf>,
    /// Illustration image.
    #[serde(default)]
    pub illustration: Option<PathBuf>,
    /// Parameters in display order.
    #[serde(default, rename = "parameter")]
    pub parameters: Vec<ParameterSection>,
}

/// Script source: inline code or a file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptSection {
    /// Inline script code.
    #[serde(default)]
    pub code: Option<String>,
    /// Script file.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Whether a script file is embedded or linked.
    #[serde(default = "default_true")]
    pub embed: bool,
}

/// Parameter direction as written in manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionSetting {
    /// Value supplied by the user.
    Input,
    /// Value produced by the tool.
    Output,
}

impl From<DirectionSetting> for Direction {
    fn from(value: DirectionSetting) -> Self {
        match value {
            DirectionSetting::Input => Self::Input,
            DirectionSetting::Output => Self::Output,
        }
    }
}

/// Parameter requirement as written in manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementSetting {
    /// A value must be supplied.
    Required,
    /// A value may be supplied.
    Optional,
    /// Derived output; implies the output direction.
    Derived,
}

/// `[[tool.parameter]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterSection {
    /// Kind keyword or variant name.
    pub kind: String,
    /// Display label.
    pub label: String,
    /// Explicit parameter name.
    #[serde(default)]
    pub name: Option<String>,
    /// Grouping category.
    #[serde(default)]
    pub category: Option<String>,
    /// Description text.
    #[serde(default)]
    pub description: Option<String>,
    /// Direction.
    #[serde(default)]
    pub direction: Option<DirectionSetting>,
    /// Requirement mode.
    #[serde(default)]
    pub requirement: Option<RequirementSetting>,
    /// Multi-value flag.
    #[serde(default)]
    pub multi: bool,
    /// Enabled flag.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Default value: a scalar, or an array for multi-valued parameters.
    #[serde(default)]
    pub default: Option<Value>,
    /// Name of the parameter this one depends on.
    #[serde(default)]
    pub depends_on: Option<String>,
    /// Symbology layer file.
    #[serde(default)]
    pub symbology: Option<PathBuf>,
    /// Value filter.
    #[serde(default)]
    pub filter: Option<FilterSection>,
}

/// Parameter filter entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSection {
    /// Filter kind name.
    pub kind: String,
    /// Filter values; keywords for unit, type and workspace filters.
    #[serde(default)]
    pub values: Vec<Value>,
}

/// Serde default for flags that start enabled.
const fn default_true() -> bool {
    true
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl ToolboxManifest {
    /// Loads a manifest from disk using the default resolution rules.
    ///
    /// The path is taken from the argument, then [`MANIFEST_ENV_VAR`], then
    /// [`DEFAULT_MANIFEST_NAME`] in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let source = ManifestSource::locate(path)?;
        let content = source.read()?;
        let base_dir = source.path.parent().map(Path::to_path_buf).unwrap_or_default();
        let manifest = Self::parse(&content, &base_dir)?;
        debug!(
            path = %source.path.display(),
            origin = source.origin.as_str(),
            tools = manifest.tools.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    /// Parses and validates manifest text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn parse(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut manifest: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        manifest.base_dir = base_dir.to_path_buf();
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validates the manifest for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the manifest is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.toolbox.validate()?;
        let mut declared = BTreeSet::new();
        for tool in &self.tools {
            tool.validate()?;
            if !declared.insert(placement_key(&tool.name)) {
                return Err(ConfigError::Invalid(format!("duplicate tool entry: {}", tool.name)));
            }
        }
        for toolset in &self.toolsets {
            toolset.validate()?;
        }
        let placements = self
            .toolbox
            .tools
            .iter()
            .chain(self.toolsets.iter().flat_map(|toolset| toolset.tools.iter()));
        let mut placed = BTreeSet::new();
        for name in placements {
            let key = placement_key(name);
            if !declared.contains(&key) {
                return Err(ConfigError::Invalid(format!("unknown tool reference: {name}")));
            }
            if !placed.insert(key) {
                return Err(ConfigError::Invalid(format!("tool is placed more than once: {name}")));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Section Validation
// ============================================================================

impl ToolboxSection {
    /// Validates the toolbox table.
    fn validate(&self) -> Result<(), ConfigError> {
        require_non_blank("toolbox.name", &self.name)
    }
}

impl ToolsetSection {
    /// Validates a toolset entry.
    fn validate(&self) -> Result<(), ConfigError> {
        require_non_blank("toolset.name", &self.name)?;
        if let Some(parent) = &self.parent {
            require_non_blank("toolset.parent", parent)?;
        }
        Ok(())
    }
}

impl ToolSection {
    /// Validates a tool entry and its parameters.
    fn validate(&self) -> Result<(), ConfigError> {
        require_non_blank("tool.name", &self.name)?;
        if let Some(script) = &self.execution {
            script.validate("tool.execution")?;
        }
        if let Some(script) = &self.validation {
            script.validate("tool.validation")?;
            if script.path.is_some() && !script.embed {
                return Err(ConfigError::Invalid(format!(
                    "validation scripts are always embedded: {}",
                    self.name
                )));
            }
        }
        if let Some(icon) = &self.icon {
            check_path_limits("tool.icon", icon)?;
        }
        if let Some(illustration) = &self.illustration {
            check_path_limits("tool.illustration", illustration)?;
        }
        for parameter in &self.parameters {
            parameter.validate()?;
        }
        Ok(())
    }
}

/// The single source a script section names.
enum ScriptSource<'a> {
    /// Inline code.
    Code(&'a str),
    /// File relative to the manifest.
    Path(&'a Path),
}

impl ScriptSection {
    /// Returns the script source, requiring exactly one of `code` and `path`.
    fn source(&self, field: &str) -> Result<ScriptSource<'_>, ConfigError> {
        match (&self.code, &self.path) {
            (Some(code), None) => Ok(ScriptSource::Code(code)),
            (None, Some(path)) => Ok(ScriptSource::Path(path)),
            _ => Err(ConfigError::Invalid(format!("{field} needs either code or path"))),
        }
    }

    /// Validates the script source.
    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        match self.source(field)? {
            ScriptSource::Code(code) => require_non_blank(field, code),
            ScriptSource::Path(path) => check_path_limits(field, path),
        }
    }
}

impl ParameterSection {
    /// Validates keywords that can be checked without building the parameter.
    fn validate(&self) -> Result<(), ConfigError> {
        require_non_blank("parameter.label", &self.label)?;
        Kind::from_str(&self.kind).map_err(ConfigError::Invalid)?;
        if let Some(filter) = &self.filter {
            FilterKind::from_str(&filter.kind).map_err(ConfigError::Invalid)?;
        }
        if let Some(symbology) = &self.symbology {
            check_path_limits("parameter.symbology", symbology)?;
        }
        if let Some(Value::Table(_)) = &self.default {
            return Err(ConfigError::Invalid(format!(
                "parameter.default must be a scalar or an array: {}",
                self.label
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Building
// ============================================================================

impl ToolboxManifest {
    /// Builds the toolbox described by the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unresolvable references and
    /// [`ConfigError::Toolbox`] when the toolbox model rejects a value.
    pub fn build(&self) -> Result<Toolbox, ConfigError> {
        let mut built = self
            .tools
            .iter()
            .map(|section| self.build_tool(section).map(Some))
            .collect::<Result<Vec<_>, _>>()?;

        let mut toolbox = Toolbox::new(&self.toolbox.name)?;
        if let Some(label) = &self.toolbox.label {
            toolbox = toolbox.with_label(label);
        }
        if let Some(alias) = &self.toolbox.alias {
            toolbox = toolbox.with_alias(alias);
        }
        if let Some(description) = &self.toolbox.description {
            toolbox = toolbox.with_description(description);
        }

        for name in &self.toolbox.tools {
            toolbox.add_tool(self.take_tool(&mut built, name)?);
        }
        for section in &self.toolsets {
            let parent = match &section.parent {
                Some(parent) => Some(toolbox.toolsets().find(parent.trim()).ok_or_else(|| {
                    ConfigError::Invalid(format!(
                        "unknown parent toolset for {}: {parent}",
                        section.name
                    ))
                })?),
                None => None,
            };
            let id = toolbox.add_toolset(parent, &section.name)?;
            for name in &section.tools {
                toolbox.add_tool_to(id, self.take_tool(&mut built, name)?)?;
            }
        }
        for tool in built.into_iter().flatten() {
            toolbox.add_tool(tool);
        }

        info!(toolbox = toolbox.name(), tools = self.tools.len(), "built toolbox from manifest");
        Ok(toolbox)
    }

    /// Removes a built tool for placement.
    fn take_tool(
        &self,
        built: &mut [Option<ScriptTool>],
        name: &str,
    ) -> Result<ScriptTool, ConfigError> {
        let key = placement_key(name);
        self.tools
            .iter()
            .position(|section| placement_key(&section.name) == key)
            .and_then(|index| built.get_mut(index))
            .and_then(Option::take)
            .ok_or_else(|| ConfigError::Invalid(format!("tool cannot be placed: {name}")))
    }

    /// Builds one tool with its scripts, images and parameters.
    fn build_tool(&self, section: &ToolSection) -> Result<ScriptTool, ConfigError> {
        let attributes =
            ToolAttributes::from_keywords(section.attributes.iter().map(String::as_str))?;
        let mut tool = ScriptTool::new(&section.name)?.with_attributes(attributes);
        if let Some(label) = &section.label {
            tool = tool.with_label(label);
        }
        if let Some(description) = &section.description {
            tool = tool.with_description(description);
        }
        if let Some(summary) = &section.summary {
            tool = tool.with_summary(summary);
        }
        if let Some(script) = &section.execution {
            tool.set_execution_script(Some(self.execution_script(script)?));
        }
        if let Some(script) = &section.validation {
            tool.set_validation_script(Some(self.validation_script(script)?));
        }
        let icon = section.icon.as_deref().map(|path| self.resolve(path));
        tool.set_icon(icon.as_deref())?;
        let illustration = section.illustration.as_deref().map(|path| self.resolve(path));
        tool.set_illustration(illustration.as_deref())?;

        let mut parameters = section
            .parameters
            .iter()
            .map(|parameter| self.build_parameter(parameter))
            .collect::<Result<Vec<_>, _>>()?;
        for (index, parameter) in section.parameters.iter().enumerate() {
            let Some(target_name) = &parameter.depends_on else {
                continue;
            };
            let wanted = target_name.trim().to_lowercase();
            let target = parameters
                .iter()
                .position(|candidate| candidate.name().to_lowercase() == wanted)
                .ok_or_else(|| {
                    ConfigError::Invalid(format!(
                        "unknown dependency in {}: {target_name}",
                        section.name
                    ))
                })?;
            link_dependency(&mut parameters, index, target)?;
        }
        for parameter in parameters {
            tool.add_parameter(parameter);
        }
        debug!(tool = tool.name(), parameters = tool.parameters().len(), "built tool");
        Ok(tool)
    }

    /// Builds an execution script source.
    fn execution_script(&self, section: &ScriptSection) -> Result<ExecutionScript, ConfigError> {
        let script = match section.source("tool.execution")? {
            ScriptSource::Code(code) => ExecutionScript::from_code(code)?,
            ScriptSource::Path(path) => {
                ExecutionScript::from_file(&self.resolve(path), section.embed)?
            }
        };
        Ok(script)
    }

    /// Builds a validation script source.
    fn validation_script(&self, section: &ScriptSection) -> Result<ValidationScript, ConfigError> {
        let script = match section.source("tool.validation")? {
            ScriptSource::Code(code) => ValidationScript::from_code(code)?,
            ScriptSource::Path(path) => ValidationScript::from_file(&self.resolve(path))?,
        };
        Ok(script)
    }

    /// Builds one parameter without its dependency.
    fn build_parameter(&self, section: &ParameterSection) -> Result<Parameter, ConfigError> {
        let kind = Kind::from_str(&section.kind).map_err(ConfigError::Invalid)?;
        let mut parameter = match &section.name {
            Some(name) => Parameter::named(kind, &section.label, name)?,
            None => Parameter::new(kind, &section.label)?,
        };
        parameter.set_category(section.category.as_deref());
        parameter.set_description(section.description.as_deref());
        if let Some(direction) = section.direction {
            parameter = parameter.with_direction(direction.into())?;
        }
        match section.requirement {
            Some(RequirementSetting::Derived) => parameter.set_derived()?,
            Some(RequirementSetting::Required) => {
                parameter = parameter.with_requirement(Requirement::Required)?;
            }
            Some(RequirementSetting::Optional) => {
                parameter = parameter.with_requirement(Requirement::Optional)?;
            }
            None => {}
        }
        parameter = parameter.with_multi(section.multi)?;
        match &section.default {
            Some(Value::Array(items)) => {
                let values = items
                    .iter()
                    .map(|item| self.default_value(kind, item))
                    .collect::<Result<Vec<_>, _>>()?;
                parameter.set_default_values(values)?;
            }
            Some(value) => parameter.set_default_value(Some(self.default_value(kind, value)?))?,
            None => {}
        }
        if let Some(filter) = &section.filter {
            parameter.set_filter(Some(build_filter(filter)?))?;
        }
        let symbology = section.symbology.as_deref().map(|path| self.resolve(path));
        parameter.set_symbology(symbology.as_deref())?;
        parameter.set_enabled(section.enabled);
        Ok(parameter)
    }

    /// Converts a TOML scalar into a default payload for `kind`.
    fn default_value(&self, kind: Kind, value: &Value) -> Result<DefaultValue, ConfigError> {
        match value {
            Value::Boolean(flag) => Ok(DefaultValue::Bool(*flag)),
            Value::Integer(number) => Ok(DefaultValue::Long(*number)),
            Value::Float(number) => Ok(DefaultValue::Double(*number)),
            Value::Datetime(datetime) => date_default(datetime),
            Value::String(text) => self.text_default(kind, text),
            Value::Array(_) | Value::Table(_) => Err(ConfigError::Invalid(format!(
                "default values for {kind} must be scalars"
            ))),
        }
    }

    /// Interprets a string default according to what `kind` accepts.
    ///
    /// Text wins when allowed; unit kinds parse `"<amount> <unit>"` and path
    /// kinds resolve against the manifest directory.
    fn text_default(&self, kind: Kind, text: &str) -> Result<DefaultValue, ConfigError> {
        let allowed = kind.default_types();
        if allowed.is_empty() || allowed.contains(&DefaultType::Text) {
            return Ok(DefaultValue::Text(text.to_string()));
        }
        if allowed.contains(&DefaultType::ArealUnit) {
            return Ok(unit_default::<ArealUnit>(text)?.into());
        }
        if allowed.contains(&DefaultType::LinearUnit) {
            return Ok(unit_default::<LinearUnit>(text)?.into());
        }
        if allowed.contains(&DefaultType::TimeUnit) {
            return Ok(unit_default::<TimeUnit>(text)?.into());
        }
        if allowed.contains(&DefaultType::SACellSize)
            && let Ok(choice) = SACellSize::from_str(text.trim())
        {
            return Ok(choice.into());
        }
        if allowed.contains(&DefaultType::Path) {
            return Ok(DefaultValue::Path(self.resolve(Path::new(text.trim()))));
        }
        Err(ConfigError::Invalid(format!("text defaults are not supported for {kind}: {text}")))
    }

    /// Resolves a manifest path against the manifest directory.
    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }
}

// ============================================================================
// SECTION: Conversion Helpers
// ============================================================================

/// Links the parameter at `index` to the one at `target`.
fn link_dependency(
    parameters: &mut [Parameter],
    index: usize,
    target: usize,
) -> Result<(), ConfigError> {
    if index == target {
        return Err(ConfigError::Invalid("a parameter cannot depend on itself".to_string()));
    }
    let (low, high) = parameters.split_at_mut(index.max(target));
    let (dependent, dependency) = if index < target {
        (low.get_mut(index), high.first())
    } else {
        (high.first_mut(), low.get(target))
    };
    let (Some(dependent), Some(dependency)) = (dependent, dependency) else {
        return Err(ConfigError::Invalid("dependency index out of range".to_string()));
    };
    dependent.set_dependency(Some(dependency))?;
    Ok(())
}

/// Builds a filter, mapping keyword strings onto the kind's vocabulary.
fn build_filter(section: &FilterSection) -> Result<Filter, ConfigError> {
    let kind = FilterKind::from_str(&section.kind).map_err(ConfigError::Invalid)?;
    let inputs = section
        .values
        .iter()
        .map(|value| filter_value(kind, value))
        .collect::<Result<Vec<_>, _>>()?;
    let requested = inputs.len();
    let filter = Filter::new(kind, inputs);
    if filter.values().len() < requested {
        warn!(filter = %kind, requested, kept = filter.values().len(), "filter dropped values");
    }
    Ok(filter)
}

/// Converts one TOML filter value.
fn filter_value(kind: FilterKind, value: &Value) -> Result<FilterValue, ConfigError> {
    match value {
        Value::Integer(number) => Ok(FilterValue::Integer(*number)),
        Value::Float(number) => Ok(FilterValue::Float(*number)),
        Value::String(text) => keyword_filter_value(kind, text.trim()),
        other => Err(ConfigError::Invalid(format!("unsupported {kind} filter value: {other}"))),
    }
}

/// Parses a string filter value as the keyword type `kind` expects.
fn keyword_filter_value(kind: FilterKind, text: &str) -> Result<FilterValue, ConfigError> {
    let value = match kind {
        FilterKind::ArealUnit => ArealUnit::from_str(text).map(FilterValue::from),
        FilterKind::LinearUnit => LinearUnit::from_str(text).map(FilterValue::from),
        FilterKind::TimeUnit => TimeUnit::from_str(text).map(FilterValue::from),
        FilterKind::FeatureClassType => GeometryType::from_str(text).map(FilterValue::from),
        FilterKind::FieldType => FieldType::from_str(text).map(FilterValue::from),
        FilterKind::WorkspaceType => WorkspaceType::from_str(text).map(FilterValue::from),
        FilterKind::FileType
        | FilterKind::StringValue
        | FilterKind::LongRange
        | FilterKind::DoubleRange
        | FilterKind::LongValue
        | FilterKind::DoubleValue => Ok(FilterValue::from(text)),
    };
    value.map_err(ConfigError::Invalid)
}

/// Parses `"<amount> <unit>"`.
fn unit_default<U>(text: &str) -> Result<UnitValue<U>, ConfigError>
where
    U: FromStr<Err = String>,
{
    let (amount, unit) = text
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| ConfigError::Invalid(format!("expected \"<amount> <unit>\": {text}")))?;
    let unit = U::from_str(unit.trim()).map_err(ConfigError::Invalid)?;
    Ok(UnitValue::new(parse_number(amount)?, unit))
}

/// Parses an integer, falling back to a float.
fn parse_number(text: &str) -> Result<Number, ConfigError> {
    if let Ok(value) = text.parse::<i64>() {
        return Ok(Number::from(value));
    }
    text.parse::<f64>()
        .map(Number::from)
        .map_err(|_| ConfigError::Invalid(format!("invalid number: {text}")))
}

/// Converts a local TOML date, time or date-time.
fn date_default(value: &Datetime) -> Result<DefaultValue, ConfigError> {
    if value.offset.is_some() {
        return Err(ConfigError::Invalid(format!("date defaults cannot carry an offset: {value}")));
    }
    let text = value.to_string();
    let invalid = |err: time::error::Parse| {
        ConfigError::Invalid(format!("invalid date default {text}: {err}"))
    };
    match (value.date.is_some(), value.time.is_some()) {
        (true, true) => PrimitiveDateTime::parse(&text, DATE_TIME_FORMAT)
            .map(DefaultValue::from)
            .map_err(invalid),
        (true, false) => Date::parse(&text, DATE_FORMAT).map(DefaultValue::from).map_err(invalid),
        _ => Time::parse(&text, TIME_FORMAT).map(DefaultValue::from).map_err(invalid),
    }
}

/// Case-insensitive key used to match tool placements.
fn placement_key(name: &str) -> String {
    name.trim().to_lowercase()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Manifest loading and building errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading the manifest.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid manifest data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// The toolbox model rejected a manifest value.
    #[error("toolbox error: {0}")]
    Toolbox(#[from] ToolboxError),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Where a manifest path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManifestOrigin {
    /// Passed by the caller.
    Argument,
    /// Read from [`MANIFEST_ENV_VAR`].
    Environment,
    /// [`DEFAULT_MANIFEST_NAME`] in the working directory.
    WorkingDirectory,
}

impl ManifestOrigin {
    /// Label used in diagnostics.
    const fn as_str(self) -> &'static str {
        match self {
            Self::Argument => "argument",
            Self::Environment => MANIFEST_ENV_VAR,
            Self::WorkingDirectory => "working directory",
        }
    }
}

/// A located manifest file.
#[derive(Debug)]
struct ManifestSource {
    /// Manifest path.
    path: PathBuf,
    /// How the path was chosen.
    origin: ManifestOrigin,
}

impl ManifestSource {
    /// Picks the manifest path from the argument, the environment or the default name.
    fn locate(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, origin) = match (path, env::var_os(MANIFEST_ENV_VAR)) {
            (Some(path), _) => (path.to_path_buf(), ManifestOrigin::Argument),
            (None, Some(env_path)) => (PathBuf::from(env_path), ManifestOrigin::Environment),
            (None, None) => {
                (PathBuf::from(DEFAULT_MANIFEST_NAME), ManifestOrigin::WorkingDirectory)
            }
        };
        check_path_limits(&format!("manifest path ({})", origin.as_str()), &path)?;
        Ok(Self { path, origin })
    }

    /// Reads the manifest text, refusing files above [`MAX_MANIFEST_FILE_SIZE`].
    fn read(&self) -> Result<String, ConfigError> {
        let io_error = |err: std::io::Error| ConfigError::Io(err.to_string());
        let file = File::open(&self.path).map_err(io_error)?;
        let limit = u64::try_from(MAX_MANIFEST_FILE_SIZE).unwrap_or(u64::MAX);
        let mut bytes = Vec::new();
        file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(io_error)?;
        if bytes.len() > MAX_MANIFEST_FILE_SIZE {
            return Err(ConfigError::Invalid("manifest file exceeds size limit".to_string()));
        }
        String::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("manifest file must be utf-8".to_string()))
    }
}

/// Rejects empty paths and paths above the length limits.
fn check_path_limits(field: &str, path: &Path) -> Result<(), ConfigError> {
    if path.to_string_lossy().trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if path.components().any(|part| part.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH) {
        return Err(ConfigError::Invalid(format!("{field} path component too long")));
    }
    Ok(())
}

/// Rejects blank strings.
fn require_non_blank(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
