// crates/autobox-core/src/parameter.rs
// ============================================================================
// Module: Parameters
// Description: Tool parameter record, assignment-time validation, fragments.
// Purpose: Build one parameter's content and resource entries.
// Dependencies: serde_json, tracing
// ============================================================================

//! ## Overview
//! A [`Parameter`] is a single record tagged with a [`Kind`]. All
//! kind-specific rules (allowed defaults, filters, dependencies, suffixes,
//! direction) are checked when a property is assigned, so serialization
//! never fails.
//!
//! Serialization emits fragments in a fixed order and drops empty ones:
//! `type`, `direction`, `displayname`, `category`, `datatype`, `domain`,
//! `depends`, `symbology`, `schema`, `value`, `description`. The `enabled`
//! flag is never written.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tracing::debug;

use crate::ToolboxError;
use crate::default::DefaultValue;
use crate::default::join_multi_value;
use crate::filter::Filter;
use crate::keys;
use crate::kind::Kind;
use crate::paths::extension_with_dot;
use crate::paths::resolve_relative_path;
use crate::paths::validate_file_with_extension;
use crate::sanitize::make_parameter_name;
use crate::sanitize::validate_parameter_label;
use crate::sanitize::validate_parameter_name;
use crate::sanitize::wrap_markup;

// ============================================================================
// SECTION: Identity
// ============================================================================

/// Source of process-unique parameter identities.
static NEXT_PARAMETER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a parameter instance, distinct from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterId(u64);

impl ParameterId {
    /// Allocates a fresh identity.
    fn next() -> Self {
        Self(NEXT_PARAMETER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

// ============================================================================
// SECTION: Direction and Requirement
// ============================================================================

/// Parameter direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Value supplied by the user.
    #[default]
    Input,
    /// Value produced by the tool.
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// Requirement mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Requirement {
    /// A value must be supplied.
    #[default]
    Required,
    /// A value may be supplied.
    Optional,
    /// The value is produced by the tool and never supplied.
    Derived,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("required"),
            Self::Optional => f.write_str("optional"),
            Self::Derived => f.write_str("derived"),
        }
    }
}

// ============================================================================
// SECTION: Category Index
// ============================================================================

/// Category names numbered from 1 in first-seen order.
///
/// # Invariants
/// - Built fresh for every tool serialization and never stored on entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    /// Registered names; position + 1 is the index.
    names: Vec<String>,
}

impl CategoryIndex {
    /// Creates an empty index.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            names: Vec::new(),
        }
    }

    /// Registers a category and returns its 1-based index.
    pub fn register(&mut self, name: &str) -> usize {
        if let Some(index) = self.index_of(name) {
            return index;
        }
        self.names.push(name.to_string());
        self.names.len()
    }

    /// Returns the 1-based index of a registered category.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|existing| existing == name).map(|position| position + 1)
    }

    /// Iterates `(index, name)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().enumerate().map(|(position, name)| (position + 1, name.as_str()))
    }

    /// Returns true when no category is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ============================================================================
// SECTION: Parameter
// ============================================================================

/// Snapshot of the parameter another parameter depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Dependency {
    /// Identity of the dependency.
    id: ParameterId,
    /// Name written into `depends`.
    name: String,
    /// Kind used for the compatibility check.
    kind: Kind,
}

/// Tool parameter.
///
/// # Invariants
/// - `label` and `name` are sanitized and non-empty.
/// - Input-only kinds never hold [`Direction::Output`].
/// - Boolean kinds are never [`Requirement::Optional`] and always hold a default.
/// - `defaults` holds at most one value unless the parameter is multi-valued.
#[derive(Debug)]
pub struct Parameter {
    /// Instance identity.
    id: ParameterId,
    /// Kind tag.
    kind: Kind,
    /// Display label.
    label: String,
    /// Parameter name.
    name: String,
    /// Optional grouping category.
    category: Option<String>,
    /// Optional description text.
    description: Option<String>,
    /// Direction.
    direction: Direction,
    /// Requirement mode.
    requirement: Requirement,
    /// Multi-value flag.
    multi: bool,
    /// Enabled flag; never serialized.
    enabled: bool,
    /// Default values.
    defaults: Vec<DefaultValue>,
    /// Optional dependency snapshot.
    dependency: Option<Dependency>,
    /// Optional value filter.
    filter: Option<Filter>,
    /// Optional symbology layer file.
    symbology: Option<PathBuf>,
}

impl Parameter {
    /// Creates a parameter whose name is derived from the label.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] when the label or derived name is invalid.
    pub fn new(kind: Kind, label: &str) -> Result<Self, ToolboxError> {
        Self::build(kind, label, None)
    }

    /// Creates a parameter with an explicit name.
    ///
    /// An invalid explicit name falls back to the label-derived name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] when neither name is usable.
    pub fn named(kind: Kind, label: &str, name: &str) -> Result<Self, ToolboxError> {
        Self::build(kind, label, Some(name))
    }

    /// Shared constructor.
    fn build(kind: Kind, label: &str, name: Option<&str>) -> Result<Self, ToolboxError> {
        let validated_label = validate_parameter_label(label)
            .ok_or_else(|| ToolboxError::Validation(format!("invalid parameter label: {label}")))?;
        let validated_name = name
            .and_then(validate_parameter_name)
            .or_else(|| make_parameter_name(&validated_label))
            .ok_or_else(|| {
                ToolboxError::Validation(format!(
                    "invalid parameter name: {}",
                    name.unwrap_or(validated_label.as_str())
                ))
            })?;
        let defaults = if kind.is_boolean() { vec![DefaultValue::Bool(true)] } else { Vec::new() };
        Ok(Self {
            id: ParameterId::next(),
            kind,
            label: validated_label,
            name: validated_name,
            category: None,
            description: None,
            direction: Direction::Input,
            requirement: Requirement::Required,
            multi: false,
            enabled: true,
            defaults,
            dependency: None,
            filter: None,
            symbology: None,
        })
    }

    // ------------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------------

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: &str) -> Self {
        self.set_category(Some(category));
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.set_description(Some(description));
        self
    }

    /// Sets the direction.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] when an input-only kind is made an output.
    pub fn with_direction(mut self, direction: Direction) -> Result<Self, ToolboxError> {
        if direction == Direction::Output && self.kind.is_input_only() {
            return Err(ToolboxError::Validation(format!(
                "{} parameters can only be inputs: {}",
                self.kind, self.name
            )));
        }
        self.direction = direction;
        Ok(self)
    }

    /// Sets the requirement mode.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] when a boolean parameter is made optional.
    pub fn with_requirement(mut self, requirement: Requirement) -> Result<Self, ToolboxError> {
        if requirement == Requirement::Optional && self.kind.is_boolean() {
            return Err(ToolboxError::Validation(format!(
                "boolean parameters can only be required or derived: {}",
                self.name
            )));
        }
        self.requirement = requirement;
        Ok(self)
    }

    /// Sets the multi-value flag.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] when turning multi off would drop defaults.
    pub fn with_multi(mut self, multi: bool) -> Result<Self, ToolboxError> {
        if !multi && self.defaults.len() > 1 {
            return Err(ToolboxError::Validation(format!(
                "parameter {} holds several defaults and must stay multi-valued",
                self.name
            )));
        }
        self.multi = multi;
        Ok(self)
    }

    /// Sets a single default value.
    ///
    /// # Errors
    ///
    /// See [`Parameter::set_default_value`].
    pub fn with_default(mut self, value: impl Into<DefaultValue>) -> Result<Self, ToolboxError> {
        self.set_default_value(Some(value.into()))?;
        Ok(self)
    }

    /// Sets multi-valued defaults.
    ///
    /// # Errors
    ///
    /// See [`Parameter::set_default_values`].
    pub fn with_defaults(mut self, values: Vec<DefaultValue>) -> Result<Self, ToolboxError> {
        self.set_default_values(values)?;
        Ok(self)
    }

    // ------------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------------

    /// Sets or clears the category; blank names clear it.
    pub fn set_category(&mut self, category: Option<&str>) {
        self.category =
            category.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string);
    }

    /// Sets or clears the description; blank text clears it.
    pub fn set_description(&mut self, description: Option<&str>) {
        self.description =
            description.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string);
    }

    /// Sets the enabled flag.
    pub const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Marks the parameter as a derived output and enables it.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] for input-only kinds.
    pub fn set_derived(&mut self) -> Result<(), ToolboxError> {
        if self.kind.is_input_only() {
            return Err(ToolboxError::Validation(format!(
                "{} parameters cannot be derived: {}",
                self.kind, self.name
            )));
        }
        self.direction = Direction::Output;
        self.requirement = Requirement::Derived;
        self.enabled = true;
        Ok(())
    }

    /// Sets or clears the single default value.
    ///
    /// Multi-valued parameters treat the value as a one-element list.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Type`] when the payload type is not allowed for
    /// the kind and [`ToolboxError::Validation`] for secret kinds, clearing a
    /// boolean default, suffix mismatches or non-positive cell sizes.
    pub fn set_default_value(&mut self, value: Option<DefaultValue>) -> Result<(), ToolboxError> {
        let Some(value) = value else {
            if self.kind.is_boolean() {
                return Err(ToolboxError::Validation(format!(
                    "boolean parameter {} requires a default value",
                    self.name
                )));
            }
            self.defaults.clear();
            return Ok(());
        };
        if self.multi && !self.kind.is_boolean() {
            return self.set_default_values(vec![value]);
        }
        self.check_stored()?;
        self.check_type(&value)?;
        self.check_suffix(&value)?;
        self.check_positive(&value)?;
        self.defaults = vec![value];
        Ok(())
    }

    /// Sets multi-valued defaults.
    ///
    /// Values of a disallowed type are dropped and duplicates removed in
    /// first-seen order; path suffix restrictions keep only matching paths.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Type`] when the parameter is not multi-valued or
    /// nothing usable remains, and [`ToolboxError::Validation`] when no path has
    /// an allowed suffix or a cell size is not positive.
    pub fn set_default_values(&mut self, values: Vec<DefaultValue>) -> Result<(), ToolboxError> {
        if values.is_empty() {
            return self.set_default_value(None);
        }
        if !self.multi || self.kind.is_boolean() {
            return Err(ToolboxError::Type(format!(
                "parameter {} is not multi-valued",
                self.name
            )));
        }
        self.check_stored()?;
        let mut kept: Vec<DefaultValue> = Vec::new();
        for value in values {
            if self.kind.accepts_default(value.default_type()) && !kept.contains(&value) {
                kept.push(value);
            }
        }
        if kept.is_empty() {
            return Err(ToolboxError::Type(format!(
                "invalid default values for {}: {}",
                self.kind, self.name
            )));
        }
        if !self.kind.suffixes().is_empty() {
            let matching: Vec<DefaultValue> =
                kept.iter().filter(|value| self.check_suffix(value).is_ok()).cloned().collect();
            if matching.is_empty() {
                return Err(ToolboxError::Validation(format!(
                    "incorrect file extension for {}: {}",
                    self.kind,
                    join_multi_value(&kept)
                )));
            }
            kept = matching;
        }
        for value in &kept {
            self.check_positive(value)?;
        }
        self.defaults = kept;
        Ok(())
    }

    /// Sets or clears the dependency.
    ///
    /// A derived parameter may depend on another instance of its own kind.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Type`] when the dependency kind is not allowed.
    pub fn set_dependency(&mut self, dependency: Option<&Self>) -> Result<(), ToolboxError> {
        let Some(other) = dependency else {
            self.dependency = None;
            return Ok(());
        };
        let same_kind_for_derived =
            self.is_derived() && other.kind == self.kind && other.id != self.id;
        if !same_kind_for_derived && !self.kind.accepts_dependency(other.kind) {
            return Err(ToolboxError::Type(format!(
                "invalid parameter type for {} dependency: {} ({})",
                self.name, other.name, other.kind
            )));
        }
        self.dependency = Some(Dependency {
            id: other.id,
            name: other.name.clone(),
            kind: other.kind,
        });
        Ok(())
    }

    /// Sets or clears the filter.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Type`] when the kind does not accept the filter.
    pub fn set_filter(&mut self, filter: Option<Filter>) -> Result<(), ToolboxError> {
        if let Some(filter) = &filter
            && !self.kind.accepts_filter(filter.kind())
        {
            return Err(ToolboxError::Type(format!(
                "invalid filter type for {}: {}",
                self.kind,
                filter.kind()
            )));
        }
        self.filter = filter;
        Ok(())
    }

    /// Sets or clears the symbology layer file.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::NotFound`] for missing files and
    /// [`ToolboxError::Type`] unless the file ends with `.lyrx` or `.lyr`.
    pub fn set_symbology(&mut self, path: Option<&Path>) -> Result<(), ToolboxError> {
        self.symbology = match path {
            Some(path) => Some(validate_file_with_extension(path, "layer file", &["lyrx", "lyr"])?),
            None => None,
        };
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Instance identity.
    #[must_use]
    pub const fn id(&self) -> ParameterId {
        self.id
    }

    /// Kind tag.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// Sanitized label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Sanitized name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Description wrapped in the markup envelope when it holds markup.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.description.as_deref().and_then(wrap_markup)
    }

    /// Direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Requirement mode.
    #[must_use]
    pub const fn requirement(&self) -> Requirement {
        self.requirement
    }

    /// Multi-value flag.
    #[must_use]
    pub const fn is_multi(&self) -> bool {
        self.multi
    }

    /// Enabled flag.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns true for enabled derived outputs.
    #[must_use]
    pub fn is_derived(&self) -> bool {
        self.direction == Direction::Output
            && self.requirement == Requirement::Derived
            && self.enabled
    }

    /// First default value, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.defaults.first()
    }

    /// All default values.
    #[must_use]
    pub fn default_values(&self) -> &[DefaultValue] {
        &self.defaults
    }

    /// Name of the dependency, if any.
    #[must_use]
    pub fn dependency_name(&self) -> Option<&str> {
        self.dependency.as_ref().map(|dependency| dependency.name.as_str())
    }

    /// Identity of the dependency, if any.
    #[must_use]
    pub fn dependency_id(&self) -> Option<ParameterId> {
        self.dependency.as_ref().map(|dependency| dependency.id)
    }

    /// Kind of the dependency, if any.
    #[must_use]
    pub fn dependency_kind(&self) -> Option<Kind> {
        self.dependency.as_ref().map(|dependency| dependency.kind)
    }

    /// Filter, if any.
    #[must_use]
    pub const fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// Symbology layer file, if any.
    #[must_use]
    pub fn symbology(&self) -> Option<&Path> {
        self.symbology.as_deref()
    }

    // ------------------------------------------------------------------------
    // Validation Helpers
    // ------------------------------------------------------------------------

    /// Rejects defaults on secret kinds.
    fn check_stored(&self) -> Result<(), ToolboxError> {
        if self.kind.is_not_stored() {
            return Err(ToolboxError::Validation(format!(
                "default value for {} is not stored: {}",
                self.kind, self.name
            )));
        }
        Ok(())
    }

    /// Checks the payload type against the kind.
    fn check_type(&self, value: &DefaultValue) -> Result<(), ToolboxError> {
        if self.kind.accepts_default(value.default_type()) {
            return Ok(());
        }
        Err(ToolboxError::Type(format!(
            "invalid default value for {}: {}",
            self.kind,
            value.to_value_string()
        )))
    }

    /// Checks path suffixes for kinds that restrict them.
    fn check_suffix(&self, value: &DefaultValue) -> Result<(), ToolboxError> {
        let suffixes = self.kind.suffixes();
        let DefaultValue::Path(path) = value else {
            return Ok(());
        };
        if suffixes.is_empty() {
            return Ok(());
        }
        let suffix = extension_with_dot(path).to_lowercase();
        if suffixes.contains(&suffix.as_str()) {
            return Ok(());
        }
        Err(ToolboxError::Validation(format!(
            "incorrect file extension for {}: {}",
            self.kind,
            path.display()
        )))
    }

    /// Checks that numeric cell sizes are greater than zero.
    fn check_positive(&self, value: &DefaultValue) -> Result<(), ToolboxError> {
        if !self.kind.requires_positive_default() {
            return Ok(());
        }
        match value.as_f64() {
            Some(number) if number.is_nan() || number <= 0.0 => Err(ToolboxError::Validation(
                format!("default value for {} must be greater than 0: {}", self.kind, number),
            )),
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// Serializes the parameter into content and resource fragments.
    ///
    /// `categories` maps category names to indices shared across the tool;
    /// `target` is the destination toolbox folder used to resolve symbology.
    #[must_use]
    pub fn serialize(
        &self,
        categories: &CategoryIndex,
        target: &Path,
    ) -> (Map<String, Value>, Map<String, Value>) {
        debug!(parameter = %self.name, kind = %self.kind, "serializing parameter");
        let key = self.name.to_lowercase();
        let mut content = Map::new();
        let mut resources = Map::new();

        match self.requirement {
            Requirement::Required => {}
            Requirement::Optional => {
                insert_text(&mut content, keys::PARAMETER_TYPE, keys::OPTIONAL);
            }
            Requirement::Derived => insert_text(&mut content, keys::PARAMETER_TYPE, keys::DERIVED),
        }
        if self.direction == Direction::Output {
            insert_text(&mut content, keys::DIRECTION, keys::OUT);
        }

        let title_key = format!("{key}.{}", keys::TITLE);
        insert_text(&mut content, keys::DISPLAY_NAME, &format!("{}{title_key}", keys::RC_PREFIX));

        if let Some(index) = self.category.as_deref().and_then(|name| categories.index_of(name)) {
            let category = format!("{}{}.{}{index}", keys::RC_PREFIX, keys::PARAMS, keys::CATEGORY);
            insert_text(&mut content, keys::CATEGORY, &category);
        }

        content.insert(keys::DATA_TYPE.to_string(), self.data_type());

        if let Some(filter) = &self.filter {
            let (domain, domain_resources) = filter.serialize_with_resources(&self.name);
            content.extend(domain);
            resources.extend(domain_resources);
        }

        if let Some(dependency) = &self.dependency {
            content.insert(keys::DEPENDS.to_string(), json!([dependency.name]));
        }

        if let Some(symbology) = self.symbology_path(target) {
            insert_text(&mut content, keys::SYMBOLOGY, &symbology);
        }

        if let Some(schema) = self.schema() {
            content.insert(keys::SCHEMA.to_string(), schema);
        }

        let value = self.value_string();
        if !value.is_empty() {
            insert_text(&mut content, keys::VALUE, &value);
        }

        if let Some(description) = self.description() {
            let descr_key = format!("{key}.{}", keys::DESCR);
            insert_text(
                &mut content,
                keys::DESCRIPTION,
                &format!("{}{descr_key}", keys::RC_PREFIX),
            );
            resources.insert(descr_key, Value::String(description));
        }
        resources.insert(title_key, Value::String(self.label.clone()));

        (content, resources)
    }

    /// Builds the `datatype` fragment.
    fn data_type(&self) -> Value {
        let data_type = json!({ keys::TYPE: self.kind.keyword() });
        if !self.multi {
            return data_type;
        }
        json!({
            keys::DATA_TYPE: data_type,
            keys::TYPE: keys::GP_MULTI_VALUE,
        })
    }

    /// Resolves the symbology path for outputs whose layer file still exists.
    fn symbology_path(&self, target: &Path) -> Option<String> {
        if self.direction != Direction::Output {
            return None;
        }
        let symbology = self.symbology.as_deref()?;
        if !symbology.is_file() {
            return None;
        }
        resolve_relative_path(symbology, target)
    }

    /// Builds the output schema for non-derived outputs of schema-bearing kinds.
    fn schema(&self) -> Option<Value> {
        let schema_type = self.kind.schema_type()?;
        if self.direction != Direction::Output || self.requirement == Requirement::Derived {
            return None;
        }
        Some(json!({
            keys::TYPE: schema_type,
            keys::GENERATE_OUTPUT_CATALOG_PATH: keys::TRUE,
        }))
    }

    /// Renders the default value text; empty when there is none.
    fn value_string(&self) -> String {
        if self.multi && !self.kind.is_boolean() {
            return join_multi_value(&self.defaults);
        }
        self.defaults.first().map(DefaultValue::to_value_string).unwrap_or_default()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Inserts a string value.
fn insert_text(map: &mut Map<String, Value>, key: &str, value: &str) {
    map.insert(key.to_string(), Value::String(value.to_string()));
}

// ============================================================================
// SECTION: Tests
// ============================================================================
