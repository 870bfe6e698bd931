// crates/autobox-core/src/filter.rs
// ============================================================================
// Module: Filters
// Description: Value restrictions and their domain fragments.
// Purpose: Normalize filter inputs and serialize them into `domain` entries.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A [`Filter`] pairs a [`FilterKind`] with the values that survived
//! normalization. Construction never fails: inputs of the wrong type are
//! dropped silently and duplicates are removed in first-seen order. A filter
//! with nothing usable serializes to an empty map, which callers treat as
//! "no domain".
//!
//! The free-text variant ([`FilterKind::StringValue`]) replaces each literal
//! with a resource indirection keyed by the owning parameter's name, so it
//! is serialized through [`Filter::serialize_with_resources`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::default::Number;
use crate::default::format_float;
use crate::enums::ArealUnit;
use crate::enums::FieldType;
use crate::enums::GeometryType;
use crate::enums::LinearUnit;
use crate::enums::TimeUnit;
use crate::enums::WorkspaceType;
use crate::keys;

// ============================================================================
// SECTION: Filter Kinds
// ============================================================================

/// Filter variants understood by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Coded areal unit domain.
    ArealUnit,
    /// Geometry and feature type domain.
    FeatureClassType,
    /// Field type list domain.
    FieldType,
    /// File extension list domain.
    FileType,
    /// Coded linear unit domain.
    LinearUnit,
    /// Coded time unit domain.
    TimeUnit,
    /// Workspace type list domain.
    WorkspaceType,
    /// Integer range domain.
    LongRange,
    /// Floating point range domain.
    DoubleRange,
    /// Coded integer values.
    LongValue,
    /// Coded floating point values.
    DoubleValue,
    /// Coded free-text values with localized resources.
    StringValue,
}

impl FilterKind {
    /// Every filter kind in declaration order.
    pub const ALL: &'static [Self] = &[
        Self::ArealUnit,
        Self::FeatureClassType,
        Self::FieldType,
        Self::FileType,
        Self::LinearUnit,
        Self::TimeUnit,
        Self::WorkspaceType,
        Self::LongRange,
        Self::DoubleRange,
        Self::LongValue,
        Self::DoubleValue,
        Self::StringValue,
    ];

    /// Returns the stable name used in manifests and messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ArealUnit => "ArealUnit",
            Self::FeatureClassType => "FeatureClassType",
            Self::FieldType => "FieldType",
            Self::FileType => "FileType",
            Self::LinearUnit => "LinearUnit",
            Self::TimeUnit => "TimeUnit",
            Self::WorkspaceType => "WorkspaceType",
            Self::LongRange => "LongRange",
            Self::DoubleRange => "DoubleRange",
            Self::LongValue => "LongValue",
            Self::DoubleValue => "DoubleValue",
            Self::StringValue => "StringValue",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("unknown filter kind: {value}"))
    }
}

// ============================================================================
// SECTION: Filter Values
// ============================================================================

/// Heterogeneous filter input; each kind keeps only the variants it accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Placeholder that no filter accepts.
    Null,
    /// Whole number.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Free text or file extension.
    Text(String),
    /// Areal unit keyword.
    ArealUnit(ArealUnit),
    /// Linear unit keyword.
    LinearUnit(LinearUnit),
    /// Time unit keyword.
    TimeUnit(TimeUnit),
    /// Geometry or feature type keyword.
    GeometryType(GeometryType),
    /// Field type keyword.
    FieldType(FieldType),
    /// Workspace type keyword.
    WorkspaceType(WorkspaceType),
}

impl FilterValue {
    /// Returns the numeric payload of integer and float values.
    const fn as_number(&self) -> Option<Number> {
        match self {
            Self::Integer(value) => Some(Number::Integer(*value)),
            Self::Float(value) => Some(Number::Float(*value)),
            _ => None,
        }
    }

    /// Renders the value as its canonical literal.
    fn literal(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => format_float(*value),
            Self::Text(value) => value.clone(),
            Self::ArealUnit(value) => value.as_str().to_string(),
            Self::LinearUnit(value) => value.as_str().to_string(),
            Self::TimeUnit(value) => value.as_str().to_string(),
            Self::GeometryType(value) => value.as_str().to_string(),
            Self::FieldType(value) => value.as_str().to_string(),
            Self::WorkspaceType(value) => value.as_str().to_string(),
        }
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Number> for FilterValue {
    fn from(value: Number) -> Self {
        match value {
            Number::Integer(value) => Self::Integer(value),
            Number::Float(value) => Self::Float(value),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<ArealUnit> for FilterValue {
    fn from(value: ArealUnit) -> Self {
        Self::ArealUnit(value)
    }
}

impl From<LinearUnit> for FilterValue {
    fn from(value: LinearUnit) -> Self {
        Self::LinearUnit(value)
    }
}

impl From<TimeUnit> for FilterValue {
    fn from(value: TimeUnit) -> Self {
        Self::TimeUnit(value)
    }
}

impl From<GeometryType> for FilterValue {
    fn from(value: GeometryType) -> Self {
        Self::GeometryType(value)
    }
}

impl From<FieldType> for FilterValue {
    fn from(value: FieldType) -> Self {
        Self::FieldType(value)
    }
}

impl From<WorkspaceType> for FilterValue {
    fn from(value: WorkspaceType) -> Self {
        Self::WorkspaceType(value)
    }
}

// ============================================================================
// SECTION: Filter
// ============================================================================

/// Normalized value restriction.
///
/// # Invariants
/// - `values` holds only variants accepted by `kind`, deduplicated in first-seen order.
/// - Range kinds hold either nothing or exactly `[minimum, maximum]` with `minimum < maximum`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Filter variant.
    kind: FilterKind,
    /// Normalized values.
    values: Vec<FilterValue>,
}

impl Filter {
    /// Builds a filter, keeping only the inputs its kind accepts.
    #[must_use]
    pub fn new<I, V>(kind: FilterKind, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        let inputs: Vec<FilterValue> = values.into_iter().map(Into::into).collect();
        let values = match kind {
            FilterKind::LongRange => normalize_range(&inputs, to_long),
            FilterKind::DoubleRange => normalize_range(&inputs, to_double),
            FilterKind::LongValue => normalize_numbers(&inputs, to_long),
            FilterKind::DoubleValue => normalize_numbers(&inputs, to_double),
            FilterKind::FileType => unique(
                inputs
                    .iter()
                    .filter_map(|value| match value {
                        FilterValue::Text(text) => Some(text.trim().trim_start_matches('.')),
                        _ => None,
                    })
                    .filter(|text| !text.is_empty())
                    .map(|text| FilterValue::Text(text.to_string())),
            ),
            _ => unique(inputs.into_iter().filter(|value| accepts(kind, value))),
        };
        Self {
            kind,
            values,
        }
    }

    /// Builds an integer range filter from two bounds.
    #[must_use]
    pub fn long_range(minimum: impl Into<FilterValue>, maximum: impl Into<FilterValue>) -> Self {
        Self::new(FilterKind::LongRange, [minimum.into(), maximum.into()])
    }

    /// Builds a floating point range filter from two bounds.
    #[must_use]
    pub fn double_range(minimum: impl Into<FilterValue>, maximum: impl Into<FilterValue>) -> Self {
        Self::new(FilterKind::DoubleRange, [minimum.into(), maximum.into()])
    }

    /// Filter variant.
    #[must_use]
    pub const fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Normalized values.
    #[must_use]
    pub fn values(&self) -> &[FilterValue] {
        &self.values
    }

    /// Returns true when nothing usable survived normalization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Serializes the filter into a `{"domain": ...}` fragment.
    ///
    /// Returns an empty map when no values survived and for
    /// [`FilterKind::StringValue`], which needs an owner name.
    #[must_use]
    pub fn serialize(&self) -> Map<String, Value> {
        let mut content = Map::new();
        if let Some(domain) = self.build_domain() {
            content.insert(keys::DOMAIN.to_string(), domain);
        }
        content
    }

    /// Serializes the filter together with localized resources.
    ///
    /// Free-text values become `$rc:<owner>.domain.<value>` codes and the
    /// literals are returned as resources; other kinds return no resources.
    #[must_use]
    pub fn serialize_with_resources(
        &self,
        owner: &str,
    ) -> (Map<String, Value>, Map<String, Value>) {
        if self.kind != FilterKind::StringValue {
            return (self.serialize(), Map::new());
        }
        let mut content = Map::new();
        let mut resources = Map::new();
        if self.values.is_empty() {
            return (content, resources);
        }
        let prefix = format!("{}.{}", owner.to_lowercase(), keys::DOMAIN);
        let mut items = Vec::with_capacity(self.values.len());
        for value in &self.values {
            let literal = value.literal();
            let code = format!("{prefix}.{literal}");
            items.push(json!({
                keys::ITEM_VALUE: literal,
                keys::ITEM_CODE: format!("{}{code}", keys::RC_PREFIX),
            }));
            resources.insert(code, Value::String(literal));
        }
        content.insert(keys::DOMAIN.to_string(), coded_domain(items));
        (content, resources)
    }

    /// Builds the domain body, or `None` when there is nothing to restrict.
    fn build_domain(&self) -> Option<Value> {
        if self.values.is_empty() {
            return None;
        }
        let literals = || self.values.iter().map(FilterValue::literal).collect::<Vec<_>>();
        match self.kind {
            FilterKind::ArealUnit => Some(keyword_items(keys::GP_AREAL_UNIT, literals())),
            FilterKind::LinearUnit => Some(keyword_items(keys::GP_LINEAR_UNIT, literals())),
            FilterKind::TimeUnit => Some(keyword_items(keys::GP_TIME_UNIT, literals())),
            FilterKind::LongValue => Some(keyword_items(keys::GP_LONG, literals())),
            FilterKind::DoubleValue => Some(keyword_items(keys::GP_DOUBLE, literals())),
            FilterKind::FieldType => Some(json!({
                keys::TYPE: keys::GP_FIELD_DOMAIN,
                keys::FIELD_TYPE: literals(),
            })),
            FilterKind::WorkspaceType => Some(json!({
                keys::TYPE: keys::GP_WORKSPACE_DOMAIN,
                keys::WORKSPACE_TYPE: literals(),
            })),
            FilterKind::FileType => Some(json!({
                keys::TYPE: keys::GP_FILE_DOMAIN,
                keys::FILE_TYPES: literals(),
            })),
            FilterKind::FeatureClassType => Some(self.feature_class_domain()),
            FilterKind::LongRange | FilterKind::DoubleRange => match self.values.as_slice() {
                [minimum, maximum] => Some(json!({
                    keys::TYPE: keys::GP_RANGE_DOMAIN,
                    keys::MIN: minimum.literal(),
                    keys::MAX: maximum.literal(),
                })),
                _ => None,
            },
            FilterKind::StringValue => None,
        }
    }

    /// Splits geometry values into shape types and feature types.
    fn feature_class_domain(&self) -> Value {
        let mut shapes = Vec::new();
        let mut features = Vec::new();
        for value in &self.values {
            if let FilterValue::GeometryType(geometry) = value {
                if geometry.is_feature_type() {
                    features.push(geometry.as_str());
                } else {
                    shapes.push(geometry.as_str());
                }
            }
        }
        let mut domain = Map::new();
        domain.insert(keys::TYPE.to_string(), Value::from(keys::GP_FEATURE_CLASS_DOMAIN));
        if !shapes.is_empty() {
            domain.insert(keys::GEOMETRY_TYPE.to_string(), Value::from(shapes));
        }
        if !features.is_empty() {
            domain.insert(keys::FEATURE_TYPE.to_string(), Value::from(features));
        }
        Value::Object(domain)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when `kind` keeps `value` as-is.
const fn accepts(kind: FilterKind, value: &FilterValue) -> bool {
    matches!(
        (kind, value),
        (FilterKind::ArealUnit, FilterValue::ArealUnit(_))
            | (FilterKind::LinearUnit, FilterValue::LinearUnit(_))
            | (FilterKind::TimeUnit, FilterValue::TimeUnit(_))
            | (FilterKind::FeatureClassType, FilterValue::GeometryType(_))
            | (FilterKind::FieldType, FilterValue::FieldType(_))
            | (FilterKind::WorkspaceType, FilterValue::WorkspaceType(_))
            | (FilterKind::StringValue, FilterValue::Text(_))
    )
}

/// Deduplicates values, keeping the first occurrence.
fn unique(values: impl IntoIterator<Item = FilterValue>) -> Vec<FilterValue> {
    let mut kept: Vec<FilterValue> = Vec::new();
    for value in values {
        if !kept.contains(&value) {
            kept.push(value);
        }
    }
    kept
}

/// Converts a finite number to an integer value, truncating floats.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Values are range-checked before truncating toward zero."
)]
fn to_long(number: Number) -> Option<FilterValue> {
    match number {
        Number::Integer(value) => Some(FilterValue::Integer(value)),
        Number::Float(value) => {
            let truncated = value.trunc();
            let in_range = truncated >= -9_223_372_036_854_775_808.0
                && truncated < 9_223_372_036_854_775_808.0;
            (value.is_finite() && in_range).then(|| FilterValue::Integer(truncated as i64))
        }
    }
}

/// Converts a finite number to a floating point value.
fn to_double(number: Number) -> Option<FilterValue> {
    let value = number.as_f64();
    value.is_finite().then_some(FilterValue::Float(value))
}

/// Keeps finite numbers, converts them and deduplicates.
fn normalize_numbers(
    inputs: &[FilterValue],
    convert: fn(Number) -> Option<FilterValue>,
) -> Vec<FilterValue> {
    unique(inputs.iter().filter_map(FilterValue::as_number).filter_map(convert))
}

/// Reduces numeric inputs to `[minimum, maximum]` when two distinct values remain.
fn normalize_range(
    inputs: &[FilterValue],
    convert: fn(Number) -> Option<FilterValue>,
) -> Vec<FilterValue> {
    let numbers = normalize_numbers(inputs, convert);
    if numbers.len() < 2 {
        return Vec::new();
    }
    let magnitude = |value: &FilterValue| value.as_number().map_or(0.0, Number::as_f64);
    let minimum = numbers.iter().min_by(|a, b| magnitude(a).total_cmp(&magnitude(b)));
    let maximum = numbers.iter().max_by(|a, b| magnitude(a).total_cmp(&magnitude(b)));
    match (minimum, maximum) {
        (Some(minimum), Some(maximum)) => vec![minimum.clone(), maximum.clone()],
        _ => Vec::new(),
    }
}

/// Builds a coded domain whose items carry the given type keyword.
fn keyword_items(keyword: &str, literals: Vec<String>) -> Value {
    let items = literals
        .into_iter()
        .map(|literal| {
            json!({
                keys::TYPE: keyword,
                keys::ITEM_VALUE: literal,
                keys::ITEM_CODE: literal,
            })
        })
        .collect();
    coded_domain(items)
}

/// Wraps items in a coded value domain.
fn coded_domain(items: Vec<Value>) -> Value {
    json!({
        keys::TYPE: keys::GP_CODED_VALUE_DOMAIN,
        keys::ITEMS: items,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
