// crates/autobox-core/src/default.rs
// ============================================================================
// Module: Default Values
// Description: Typed default-value payloads and their canonical text form.
// Purpose: Carry parameter defaults without modeling GIS semantics.
// Dependencies: time, std
// ============================================================================

//! ## Overview
//! A parameter default is a [`DefaultValue`]. Each value reports its
//! [`DefaultType`], which the kind capability table checks at assignment,
//! and renders to the exact text the host application parses: numbers in
//! canonical non-locale form, booleans lower-cased, dates in one of three
//! fixed layouts, spatial payloads as space-separated coordinates.
//!
//! Payload constructors validate their own invariants (ordered, distinct
//! ranges; positive cell sizes) and fail with [`ToolboxError::Validation`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;

use time::Date;
use time::PrimitiveDateTime;
use time::Time;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::ToolboxError;
use crate::enums::ArealUnit;
use crate::enums::LinearUnit;
use crate::enums::SACellSize;
use crate::enums::TimeUnit;
use crate::sanitize::quote;
use crate::sanitize::wrap_quoted;

// ============================================================================
// SECTION: Numbers
// ============================================================================

/// Integer or floating point number, rendered canonically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Whole number.
    Integer(i64),
    /// Floating point number.
    Float(f64),
}

impl Number {
    /// Returns the value as a float for ordering and comparisons.
    #[must_use]
    #[allow(clippy::cast_precision_loss, reason = "Ordering only needs approximate magnitude.")]
    pub const fn as_f64(self) -> f64 {
        match self {
            Self::Integer(value) => value as f64,
            Self::Float(value) => value,
        }
    }

    /// Returns true when the value is finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        match self {
            Self::Integer(_) => true,
            Self::Float(value) => value.is_finite(),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => f.write_str(&format_float(*value)),
        }
    }
}

/// Renders a float in shortest round-trip form, keeping `.0` on whole values.
#[must_use]
#[allow(clippy::float_cmp, reason = "Exact integral check selects the rendering.")]
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.trunc() == value && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

// ============================================================================
// SECTION: Spatial Payloads
// ============================================================================

/// Ordered numeric range with distinct bounds.
///
/// # Invariants
/// - `minimum < maximum`; inputs are reordered when given backwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeDomain {
    /// Lower bound.
    minimum: Number,
    /// Upper bound.
    maximum: Number,
}

impl RangeDomain {
    /// Builds a range from two finite, distinct bounds in any order.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] when a bound is not finite or the bounds are equal.
    pub fn new(first: impl Into<Number>, second: impl Into<Number>) -> Result<Self, ToolboxError> {
        let first = first.into();
        let second = second.into();
        if !first.is_finite() || !second.is_finite() {
            return Err(ToolboxError::Validation("range bounds must be finite".to_string()));
        }
        let (minimum, maximum) =
            if first.as_f64() <= second.as_f64() { (first, second) } else { (second, first) };
        if minimum.as_f64() >= maximum.as_f64() {
            return Err(ToolboxError::Validation(
                "minimum and maximum must be different".to_string(),
            ));
        }
        Ok(Self {
            minimum,
            maximum,
        })
    }

    /// Lower bound.
    #[must_use]
    pub const fn minimum(&self) -> Number {
        self.minimum
    }

    /// Upper bound.
    #[must_use]
    pub const fn maximum(&self) -> Number {
        self.maximum
    }
}

impl fmt::Display for RangeDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.minimum, self.maximum)
    }
}

/// Axis-aligned box built from an x range and a y range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Horizontal extent.
    pub x: RangeDomain,
    /// Vertical extent.
    pub y: RangeDomain,
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x.minimum, self.y.minimum, self.x.maximum, self.y.maximum)
    }
}

/// Bounding box with an optional coordinate system name.
#[derive(Debug, Clone, PartialEq)]
pub struct Extent {
    /// Box coordinates.
    pub bounds: BoundingBox,
    /// Coordinate system; blank names are stored as `None`.
    crs: Option<String>,
}

impl Extent {
    /// Builds an extent, dropping a blank coordinate system name.
    #[must_use]
    pub fn new(bounds: BoundingBox, crs: Option<&str>) -> Self {
        let crs = crs.map(str::trim).filter(|name| !name.is_empty()).map(str::to_string);
        Self {
            bounds,
            crs,
        }
    }

    /// Coordinate system name, if any.
    #[must_use]
    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.crs {
            Some(crs) => write!(f, "{} {crs}", self.bounds),
            None => write!(f, "{}", self.bounds),
        }
    }
}

/// Raster cell size with positive x and y sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSizeXY {
    /// Cell width.
    x: Number,
    /// Cell height.
    y: Number,
}

impl CellSizeXY {
    /// Builds a cell size.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] unless both sides are greater than zero.
    pub fn new(x: impl Into<Number>, y: impl Into<Number>) -> Result<Self, ToolboxError> {
        let x = x.into();
        let y = y.into();
        for (side, value) in [("x", x), ("y", y)] {
            if !(value.is_finite() && value.as_f64() > 0.0) {
                return Err(ToolboxError::Validation(format!("{side} must be greater than 0")));
            }
        }
        Ok(Self {
            x,
            y,
        })
    }
}

impl fmt::Display for CellSizeXY {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

/// Coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate.
    pub x: Number,
    /// Y coordinate.
    pub y: Number,
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

/// Quantity paired with a unit keyword.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitValue<U> {
    /// Magnitude.
    pub value: Number,
    /// Unit keyword.
    pub unit: U,
}

impl<U> UnitValue<U> {
    /// Builds a unit value.
    #[must_use]
    pub fn new(value: impl Into<Number>, unit: U) -> Self {
        Self {
            value: value.into(),
            unit,
        }
    }
}

impl<U: fmt::Display> fmt::Display for UnitValue<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

// ============================================================================
// SECTION: Dates
// ============================================================================

/// Date, time or combined date-time default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    /// Rendered as `%Y-%m-%d %H:%M:%S`.
    DateTime(PrimitiveDateTime),
    /// Rendered as `%Y-%m-%d`.
    Date(Date),
    /// Rendered as `%H:%M:%S`.
    Time(Time),
}

/// Layout of combined date-time values.
pub const DATE_TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
/// Layout of date-only values.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
/// Layout of time-only values.
pub const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = match self {
            Self::DateTime(value) => value.format(DATE_TIME_FORMAT),
            Self::Date(value) => value.format(DATE_FORMAT),
            Self::Time(value) => value.format(TIME_FORMAT),
        };
        f.write_str(&rendered.map_err(|_| fmt::Error)?)
    }
}

// ============================================================================
// SECTION: Default Value
// ============================================================================

/// Payload type tag checked against a kind's allowed default types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultType {
    /// Boolean.
    Bool,
    /// Whole number.
    Long,
    /// Floating point number.
    Double,
    /// Free text.
    Text,
    /// Filesystem path.
    Path,
    /// Date, time or date-time.
    Date,
    /// Areal unit quantity.
    ArealUnit,
    /// Linear unit quantity.
    LinearUnit,
    /// Time unit quantity.
    TimeUnit,
    /// Raster cell size.
    CellSizeXY,
    /// Coordinate pair.
    Point,
    /// Envelope box.
    Envelope,
    /// Extent box with coordinate system.
    Extent,
    /// XY domain box.
    XYDomain,
    /// M range.
    MDomain,
    /// Z range.
    ZDomain,
    /// Spatial Analyst cell size choice.
    SACellSize,
}

/// Parameter default value.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Boolean.
    Bool(bool),
    /// Whole number.
    Long(i64),
    /// Floating point number.
    Double(f64),
    /// Free text.
    Text(String),
    /// Filesystem path.
    Path(PathBuf),
    /// Date, time or date-time.
    Date(DateValue),
    /// Areal unit quantity.
    ArealUnit(UnitValue<ArealUnit>),
    /// Linear unit quantity.
    LinearUnit(UnitValue<LinearUnit>),
    /// Time unit quantity.
    TimeUnit(UnitValue<TimeUnit>),
    /// Raster cell size.
    CellSizeXY(CellSizeXY),
    /// Coordinate pair.
    Point(Point),
    /// Envelope box.
    Envelope(BoundingBox),
    /// Extent box with coordinate system.
    Extent(Extent),
    /// XY domain box.
    XYDomain(BoundingBox),
    /// M range.
    MDomain(RangeDomain),
    /// Z range.
    ZDomain(RangeDomain),
    /// Spatial Analyst cell size choice.
    SACellSize(SACellSize),
}

impl DefaultValue {
    /// Returns the payload type tag.
    #[must_use]
    pub const fn default_type(&self) -> DefaultType {
        match self {
            Self::Bool(_) => DefaultType::Bool,
            Self::Long(_) => DefaultType::Long,
            Self::Double(_) => DefaultType::Double,
            Self::Text(_) => DefaultType::Text,
            Self::Path(_) => DefaultType::Path,
            Self::Date(_) => DefaultType::Date,
            Self::ArealUnit(_) => DefaultType::ArealUnit,
            Self::LinearUnit(_) => DefaultType::LinearUnit,
            Self::TimeUnit(_) => DefaultType::TimeUnit,
            Self::CellSizeXY(_) => DefaultType::CellSizeXY,
            Self::Point(_) => DefaultType::Point,
            Self::Envelope(_) => DefaultType::Envelope,
            Self::Extent(_) => DefaultType::Extent,
            Self::XYDomain(_) => DefaultType::XYDomain,
            Self::MDomain(_) => DefaultType::MDomain,
            Self::ZDomain(_) => DefaultType::ZDomain,
            Self::SACellSize(_) => DefaultType::SACellSize,
        }
    }

    /// Renders a single-valued default.
    #[must_use]
    pub fn to_value_string(&self) -> String {
        match self {
            Self::Bool(value) => value.to_string(),
            Self::Long(value) => value.to_string(),
            Self::Double(value) => format_float(*value),
            Self::Text(value) => value.clone(),
            Self::Path(value) => value.display().to_string(),
            Self::Date(value) => value.to_string(),
            Self::ArealUnit(value) => value.to_string(),
            Self::LinearUnit(value) => value.to_string(),
            Self::TimeUnit(value) => value.to_string(),
            Self::CellSizeXY(value) => value.to_string(),
            Self::Point(value) => value.to_string(),
            Self::Envelope(value) | Self::XYDomain(value) => value.to_string(),
            Self::Extent(value) => value.to_string(),
            Self::MDomain(value) | Self::ZDomain(value) => value.to_string(),
            Self::SACellSize(value) => value.to_string(),
        }
    }

    /// Renders one element of a multi-valued default.
    ///
    /// Text is always quoted so it splits back unambiguously; other values are
    /// quoted only when they contain whitespace, `;` or quotes.
    #[must_use]
    pub fn to_multi_element(&self) -> String {
        match self {
            Self::Text(value) => wrap_quoted(value),
            other => quote(&other.to_value_string()),
        }
    }

    /// Returns the numeric magnitude of `Long` and `Double` values.
    #[must_use]
    #[allow(clippy::cast_precision_loss, reason = "Sign checks only need approximate magnitude.")]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Long(value) => Some(*value as f64),
            Self::Double(value) => Some(*value),
            _ => None,
        }
    }
}

/// Joins multi-valued defaults with `;` after quoting each element.
#[must_use]
pub fn join_multi_value(values: &[DefaultValue]) -> String {
    values.iter().map(DefaultValue::to_multi_element).collect::<Vec<_>>().join(";")
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<PathBuf> for DefaultValue {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<PrimitiveDateTime> for DefaultValue {
    fn from(value: PrimitiveDateTime) -> Self {
        Self::Date(DateValue::DateTime(value))
    }
}

impl From<Date> for DefaultValue {
    fn from(value: Date) -> Self {
        Self::Date(DateValue::Date(value))
    }
}

impl From<Time> for DefaultValue {
    fn from(value: Time) -> Self {
        Self::Date(DateValue::Time(value))
    }
}

impl From<UnitValue<ArealUnit>> for DefaultValue {
    fn from(value: UnitValue<ArealUnit>) -> Self {
        Self::ArealUnit(value)
    }
}

impl From<UnitValue<LinearUnit>> for DefaultValue {
    fn from(value: UnitValue<LinearUnit>) -> Self {
        Self::LinearUnit(value)
    }
}

impl From<UnitValue<TimeUnit>> for DefaultValue {
    fn from(value: UnitValue<TimeUnit>) -> Self {
        Self::TimeUnit(value)
    }
}

impl From<CellSizeXY> for DefaultValue {
    fn from(value: CellSizeXY) -> Self {
        Self::CellSizeXY(value)
    }
}

impl From<Point> for DefaultValue {
    fn from(value: Point) -> Self {
        Self::Point(value)
    }
}

impl From<Extent> for DefaultValue {
    fn from(value: Extent) -> Self {
        Self::Extent(value)
    }
}

impl From<SACellSize> for DefaultValue {
    fn from(value: SACellSize) -> Self {
        Self::SACellSize(value)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
