// crates/autobox-core/src/default/tests.rs
// ============================================================================
// Module: Default Value Unit Tests
// Description: Canonical rendering and payload validation.
// Purpose: Pin the exact text written into parameter `value` entries.
// Dependencies: autobox-core, time
// ============================================================================

//! ## Overview
//! Covers number rendering, spatial payload text, date layouts and the
//! quoting applied to multi-value elements.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use time::macros::date;
use time::macros::datetime;
use time::macros::time;

use super::BoundingBox;
use super::CellSizeXY;
use super::DefaultValue;
use super::Extent;
use super::Number;
use super::RangeDomain;
use super::UnitValue;
use super::join_multi_value;
use crate::enums::LinearUnit;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn numbers_render_canonically() -> Result<(), Box<dyn std::error::Error>> {
    let cases = [
        (Number::Integer(42), "42"),
        (Number::Integer(-7), "-7"),
        (Number::Float(1.0), "1.0"),
        (Number::Float(0.25), "0.25"),
        (Number::Float(-3.5), "-3.5"),
    ];
    for (number, expected) in cases {
        let rendered = number.to_string();
        if rendered != expected {
            return Err(format!("expected {expected}, got {rendered}").into());
        }
    }
    Ok(())
}

#[test]
fn ranges_are_ordered_and_distinct() -> Result<(), Box<dyn std::error::Error>> {
    let range = RangeDomain::new(10_i64, -5_i64)?;
    if range.to_string() != "-5 10" {
        return Err(format!("unexpected range text: {range}").into());
    }
    if RangeDomain::new(3.0, 3.0).is_ok() {
        return Err("equal bounds must be rejected".into());
    }
    if RangeDomain::new(f64::NAN, 1.0).is_ok() {
        return Err("non-finite bounds must be rejected".into());
    }
    Ok(())
}

#[test]
fn spatial_payloads_render_as_coordinates() -> Result<(), Box<dyn std::error::Error>> {
    let bounds = BoundingBox {
        x: RangeDomain::new(0_i64, 100_i64)?,
        y: RangeDomain::new(-50.5, 50.5)?,
    };
    let envelope = DefaultValue::Envelope(bounds);
    if envelope.to_value_string() != "0 -50.5 100 50.5" {
        return Err(format!("unexpected envelope: {}", envelope.to_value_string()).into());
    }
    let extent = Extent::new(bounds, Some("  WGS 1984 "));
    if extent.to_string() != "0 -50.5 100 50.5 WGS 1984" {
        return Err(format!("unexpected extent: {extent}").into());
    }
    let blank = Extent::new(bounds, Some("   "));
    if blank.crs().is_some() {
        return Err("blank coordinate system should be dropped".into());
    }
    let unit = DefaultValue::from(UnitValue::new(12.5, LinearUnit::Meters));
    if unit.to_value_string() != "12.5 Meters" {
        return Err(format!("unexpected unit value: {}", unit.to_value_string()).into());
    }
    Ok(())
}

#[test]
fn cell_sizes_must_be_positive() -> Result<(), Box<dyn std::error::Error>> {
    let cell = CellSizeXY::new(10_i64, 2.5)?;
    if cell.to_string() != "10 2.5" {
        return Err(format!("unexpected cell size: {cell}").into());
    }
    if CellSizeXY::new(0_i64, 1_i64).is_ok() {
        return Err("zero cell size must be rejected".into());
    }
    if CellSizeXY::new(1_i64, -1.0).is_ok() {
        return Err("negative cell size must be rejected".into());
    }
    Ok(())
}

#[test]
fn dates_pick_layout_from_components() -> Result<(), Box<dyn std::error::Error>> {
    let cases = [
        (DefaultValue::from(datetime!(2024-03-09 07:05:01)), "2024-03-09 07:05:01"),
        (DefaultValue::from(date!(2024-12-31)), "2024-12-31"),
        (DefaultValue::from(time!(23:59:00)), "23:59:00"),
    ];
    for (value, expected) in cases {
        let rendered = value.to_value_string();
        if rendered != expected {
            return Err(format!("expected {expected}, got {rendered}").into());
        }
    }
    Ok(())
}

#[test]
fn multi_values_quote_text_and_spaced_values() -> Result<(), Box<dyn std::error::Error>> {
    let values = vec![
        DefaultValue::from("a"),
        DefaultValue::from("it's"),
        DefaultValue::from(3_i64),
        DefaultValue::from(1.0),
        DefaultValue::from(PathBuf::from("/data/my file.shp")),
        DefaultValue::from(datetime!(2024-01-02 03:04:05)),
    ];
    let joined = join_multi_value(&values);
    let expected = "'a';\"it's\";3;1.0;'/data/my file.shp';'2024-01-02 03:04:05'";
    if joined != expected {
        return Err(format!("unexpected multi value: {joined}").into());
    }
    if DefaultValue::Bool(false).to_value_string() != "false" {
        return Err("booleans must render lower-case".into());
    }
    Ok(())
}

#[test]
fn multi_value_text_escapes_quotes_and_backslashes() -> Result<(), Box<dyn std::error::Error>> {
    let values = vec![
        DefaultValue::from("it's \"both\""),
        DefaultValue::from("b"),
        DefaultValue::from("c:\\temp\\x"),
        DefaultValue::from("tab\there"),
    ];
    let joined = join_multi_value(&values);
    let expected = "'it\\'s \"both\"';'b';'c:\\\\temp\\\\x';'tab\\there'";
    if joined != expected {
        return Err(format!("unexpected multi value: {joined}").into());
    }
    Ok(())
}
