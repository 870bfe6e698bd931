// crates/autobox-config/src/manifest/tests.rs
// ============================================================================
// Module: Manifest Unit Tests
// Description: Schema strictness, placement rules and value conversion.
// Purpose: Guard the translation from TOML into the toolbox model.
// Dependencies: autobox-config, autobox-core, time, toml
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::str::FromStr;

use autobox_core::ArealUnit;
use autobox_core::DateValue;
use autobox_core::DefaultValue;
use autobox_core::FilterKind;
use autobox_core::FilterValue;
use autobox_core::Kind;
use autobox_core::LinearUnit;
use autobox_core::UnitValue;
use time::macros::date;
use time::macros::datetime;
use toml::value::Datetime;

use super::ConfigError;
use super::ManifestOrigin;
use super::ManifestSource;
use super::ToolboxManifest;
use super::date_default;
use super::keyword_filter_value;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses manifest text rooted at a fixed base directory.
fn parse(content: &str) -> Result<ToolboxManifest, ConfigError> {
    ToolboxManifest::parse(content, Path::new("/base"))
}

/// Asserts that parsing fails as invalid with a message containing `needle`.
fn expect_invalid(content: &str, needle: &str) -> Result<(), Box<dyn std::error::Error>> {
    let Err(ConfigError::Invalid(message)) = parse(content) else {
        return Err(format!("expected invalid manifest for: {needle}").into());
    };
    if !message.contains(needle) {
        return Err(format!("unexpected message: {message}").into());
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn unknown_keys_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let Err(ConfigError::Parse(_)) = parse("[toolbox]\nname = \"Example\"\ncolour = \"red\"\n")
    else {
        return Err("unknown toolbox key should fail to parse".into());
    };
    let nested = "[toolbox]\nname = \"Example\"\n\n[[tool]]\nname = \"Tool\"\n\n\
                  [[tool.parameter]]\nkind = \"GPLong\"\nlabel = \"Count\"\nsize = 3\n";
    let Err(ConfigError::Parse(_)) = parse(nested) else {
        return Err("unknown parameter key should fail to parse".into());
    };
    Ok(())
}

#[test]
fn placements_must_name_declared_tools_once() -> Result<(), Box<dyn std::error::Error>> {
    expect_invalid(
        "[toolbox]\nname = \"Example\"\ntools = [\"Missing\"]\n",
        "unknown tool reference: Missing",
    )?;
    expect_invalid(
        "[toolbox]\nname = \"Example\"\ntools = [\"Tool\"]\n\n\
         [[toolset]]\nname = \"Set\"\ntools = [\"tool\"]\n\n[[tool]]\nname = \"Tool\"\n",
        "tool is placed more than once: tool",
    )?;
    expect_invalid(
        "[toolbox]\nname = \"Example\"\n\n[[tool]]\nname = \"Tool\"\n\n[[tool]]\nname = \"TOOL\"\n",
        "duplicate tool entry: TOOL",
    )?;
    Ok(())
}

#[test]
fn scripts_need_exactly_one_source() -> Result<(), Box<dyn std::error::Error>> {
    expect_invalid(
        "[toolbox]\nname = \"Example\"\n\n[[tool]]\nname = \"Tool\"\nexecution = {}\n",
        "tool.execution needs either code or path",
    )?;
    expect_invalid(
        "[toolbox]\nname = \"Example\"\n\n[[tool]]\nname = \"Tool\"\n\
         validation = { path = \"check.py\", embed = false }\n",
        "validation scripts are always embedded",
    )?;
    let manifest = parse(
        "[toolbox]\nname = \"Example\"\n\n[[tool]]\nname = \"Tool\"\n\
         execution = { code = \"print(1)\" }\n",
    )?;
    let script = manifest.tools.first().and_then(|tool| tool.execution.as_ref());
    if !script.is_some_and(|script| script.embed) {
        return Err("embed should default to true".into());
    }
    Ok(())
}

#[test]
fn cleared_script_sources_fail_the_build() -> Result<(), Box<dyn std::error::Error>> {
    let mut manifest = parse(
        "[toolbox]\nname = \"Example\"\n\n[[tool]]\nname = \"Tool\"\n\
         execution = { code = \"print(1)\" }\n",
    )?;
    let script = manifest
        .tools
        .first_mut()
        .and_then(|tool| tool.execution.as_mut())
        .ok_or("execution script missing")?;
    script.code = None;
    let Err(ConfigError::Invalid(message)) = manifest.build() else {
        return Err("a script without code or path must not build".into());
    };
    if message != "tool.execution needs either code or path" {
        return Err(format!("unexpected message: {message}").into());
    }
    Ok(())
}

#[test]
fn unknown_kinds_and_filters_are_invalid() -> Result<(), Box<dyn std::error::Error>> {
    expect_invalid(
        "[toolbox]\nname = \"Example\"\n\n[[tool]]\nname = \"Tool\"\n\n\
         [[tool.parameter]]\nkind = \"GPWidget\"\nlabel = \"Widget\"\n",
        "unknown parameter kind: GPWidget",
    )?;
    expect_invalid(
        "[toolbox]\nname = \"Example\"\n\n[[tool]]\nname = \"Tool\"\n\n\
         [[tool.parameter]]\nkind = \"Long\"\nlabel = \"Count\"\n\
         filter = { kind = \"Spiral\", values = [1] }\n",
        "unknown filter kind: Spiral",
    )?;
    Ok(())
}

#[test]
fn string_defaults_follow_the_kind() -> Result<(), Box<dyn std::error::Error>> {
    let manifest = parse("[toolbox]\nname = \"Example\"\n")?;
    let linear = manifest.text_default(Kind::LinearUnit, "10 Meters")?;
    if linear != DefaultValue::LinearUnit(UnitValue::new(10_i64, LinearUnit::Meters)) {
        return Err("linear unit default was not parsed".into());
    }
    let file = manifest.text_default(Kind::File, "data/input.csv")?;
    if file != DefaultValue::Path(Path::new("/base/data/input.csv").to_path_buf()) {
        return Err("file default should resolve against the manifest directory".into());
    }
    let text = manifest.text_default(Kind::String, "round end")?;
    if text != DefaultValue::Text("round end".to_string()) {
        return Err("string default should stay text".into());
    }
    let Err(ConfigError::Invalid(_)) = manifest.text_default(Kind::ArealUnit, "plenty") else {
        return Err("unit default without a unit should fail".into());
    };
    Ok(())
}

#[test]
fn dates_convert_without_offsets() -> Result<(), Box<dyn std::error::Error>> {
    let day = date_default(&Datetime::from_str("1979-05-27")?)?;
    if day != DefaultValue::Date(DateValue::Date(date!(1979 - 05 - 27))) {
        return Err("local date was not converted".into());
    }
    let moment = date_default(&Datetime::from_str("1979-05-27T07:32:00")?)?;
    if moment != DefaultValue::Date(DateValue::DateTime(datetime!(1979-05-27 07:32:00))) {
        return Err("local date-time was not converted".into());
    }
    let Err(ConfigError::Invalid(_)) = date_default(&Datetime::from_str("1979-05-27T07:32:00Z")?)
    else {
        return Err("offset date-times should be rejected".into());
    };
    Ok(())
}

#[test]
fn filter_keywords_are_typed() -> Result<(), Box<dyn std::error::Error>> {
    let acres = keyword_filter_value(FilterKind::ArealUnit, "Acres")?;
    if acres != FilterValue::ArealUnit(ArealUnit::Acres) {
        return Err("areal unit keyword was not typed".into());
    }
    let Err(ConfigError::Invalid(_)) = keyword_filter_value(FilterKind::ArealUnit, "SquareParsecs")
    else {
        return Err("unknown unit keyword should be rejected".into());
    };
    let text = keyword_filter_value(FilterKind::StringValue, "flat")?;
    if text != FilterValue::Text("flat".to_string()) {
        return Err("string filter values stay text".into());
    }
    Ok(())
}

#[test]
fn dependencies_link_by_parameter_name() -> Result<(), Box<dyn std::error::Error>> {
    let manifest = parse(
        "[toolbox]\nname = \"Example\"\n\n[[tool]]\nname = \"Tool\"\n\n\
         [[tool.parameter]]\nkind = \"Field\"\nlabel = \"Key Field\"\n\
         depends_on = \"in_features\"\n\n\
         [[tool.parameter]]\nkind = \"FeatureLayer\"\nlabel = \"Input\"\nname = \"in_features\"\n",
    )?;
    let toolbox = manifest.build()?;
    let tool = toolbox.tools().first().ok_or("tool missing")?;
    let field = tool.parameter("key_field").ok_or("field parameter missing")?;
    if field.dependency_name() != Some("in_features")
        || field.dependency_kind() != Some(Kind::FeatureLayer)
    {
        return Err("dependency should point at the later parameter".into());
    }

    let self_reference = parse(
        "[toolbox]\nname = \"Example\"\n\n[[tool]]\nname = \"Tool\"\n\n\
         [[tool.parameter]]\nkind = \"Field\"\nlabel = \"Key\"\ndepends_on = \"key\"\n",
    )?;
    let Err(ConfigError::Invalid(_)) = self_reference.build() else {
        return Err("a parameter depending on itself should fail".into());
    };
    Ok(())
}

#[test]
fn toolset_parents_resolve_by_qualified_name() -> Result<(), Box<dyn std::error::Error>> {
    let manifest = parse(
        "[toolbox]\nname = \"Example\"\n\n[[toolset]]\nname = \"Her Tools\"\n\n\
         [[toolset]]\nname = \"Nested\"\nparent = \"her tools\"\ntools = [\"Tool\"]\n\n\
         [[tool]]\nname = \"Tool\"\n\n[[tool]]\nname = \"Loose\"\n",
    )?;
    let toolbox = manifest.build()?;
    let nested = toolbox.toolsets().find("Her Tools\\Nested").ok_or("nested toolset missing")?;
    if toolbox.toolsets().tools(nested).len() != 1 {
        return Err("tool should be placed in the nested toolset".into());
    }
    if toolbox.tools().iter().map(|tool| tool.name()).collect::<Vec<_>>() != ["Loose"] {
        return Err("unplaced tools land at the root".into());
    }

    let orphan = parse(
        "[toolbox]\nname = \"Example\"\n\n[[toolset]]\nname = \"Child\"\nparent = \"Nowhere\"\n",
    )?;
    let Err(ConfigError::Invalid(message)) = orphan.build() else {
        return Err("unknown parent should fail".into());
    };
    if !message.contains("unknown parent toolset for Child: Nowhere") {
        return Err(format!("unexpected message: {message}").into());
    }
    Ok(())
}

#[test]
fn explicit_manifest_paths_are_limit_checked() -> Result<(), Box<dyn std::error::Error>> {
    let source = ManifestSource::locate(Some(Path::new("kits/autobox.toml")))?;
    if source.origin != ManifestOrigin::Argument || source.path != Path::new("kits/autobox.toml") {
        return Err("an explicit path should win over every fallback".into());
    }
    let long_component = "a".repeat(300);
    let located = ManifestSource::locate(Some(Path::new(&long_component)));
    let Err(ConfigError::Invalid(message)) = located else {
        return Err("an overlong path component should be rejected".into());
    };
    if message != "manifest path (argument) path component too long" {
        return Err(format!("unexpected message: {message}").into());
    }
    Ok(())
}
