// crates/autobox-core/tests/toolbox_archive.rs
// ============================================================================
// Module: Toolbox Archive Tests
// Description: End-to-end saves inspected through the zip reader.
// Purpose: Pin archive layout, toolset indexing and tree-wide uniqueness.
// Dependencies: autobox-core, serde_json, tempfile, zip
// ============================================================================

//! ## Overview
//! Builds small toolboxes, saves them into scratch folders and reads the
//! resulting archives back to check the documents the host consumes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Cursor;
use std::io::Read;
use std::path::Path;

use autobox_core::DefaultValue;
use autobox_core::ExecutionScript;
use autobox_core::Filter;
use autobox_core::FilterKind;
use autobox_core::Kind;
use autobox_core::Parameter;
use autobox_core::SaveOptions;
use autobox_core::ScriptTool;
use autobox_core::Toolbox;
use autobox_core::ToolboxError;
use serde_json::Value;
use serde_json::json;
use zip::ZipArchive;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Pinned timestamp for reproducible archives.
const UPDATED: &str = "2024-05-06 07:08:09";

/// Returns save options with a pinned timestamp.
fn pinned() -> SaveOptions {
    SaveOptions::new().with_updated(UPDATED)
}

/// Reads every entry name of an archive in stored order.
fn entry_names(archive: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut reader = ZipArchive::new(Cursor::new(fs::read(archive)?))?;
    let mut names = Vec::with_capacity(reader.len());
    for index in 0 .. reader.len() {
        names.push(reader.by_index(index)?.name().to_string());
    }
    Ok(names)
}

/// Reads and parses one JSON entry of an archive.
fn read_json(archive: &Path, entry: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let mut reader = ZipArchive::new(Cursor::new(fs::read(archive)?))?;
    let mut text = String::new();
    reader.by_name(entry)?.read_to_string(&mut text)?;
    Ok(serde_json::from_str(&text)?)
}

/// Builds a toolbox exercising toolsets, categories, filters and multi values.
fn sample_toolbox() -> Result<Toolbox, Box<dyn std::error::Error>> {
    let mut toolbox = Toolbox::new("Sample")?.with_label("Sample Toolbox").with_description("Demo");

    let mut buffer = ScriptTool::new("Buffer")?.with_description("Buffers features");
    buffer.add_parameter(
        Parameter::new(Kind::FeatureLayer, "Input Features")?.with_category("Inputs"),
    );
    buffer.add_parameter(
        Parameter::new(Kind::Long, "Distance")?
            .with_category("Options")
            .with_default(10_i64)?,
    );
    let mut distance = Parameter::new(Kind::Long, "Segments")?;
    distance.set_filter(Some(Filter::long_range(1_i64, 64_i64)))?;
    buffer.add_parameter(distance);
    let mut mode = Parameter::new(Kind::String, "Mode")?.with_multi(true)?;
    mode.set_default_values(vec![DefaultValue::from("round end"), DefaultValue::from("flat")])?;
    mode.set_filter(Some(Filter::new(FilterKind::StringValue, ["round end", "flat", "square"])))?;
    buffer.add_parameter(mode);
    toolbox.add_tool(buffer);
    toolbox.add_tool(ScriptTool::new("Area")?);

    let his = toolbox.add_toolset(None, "His Tools")?;
    let hers = toolbox.add_toolset(None, "Her Tools")?;
    let nested = toolbox.add_toolset(Some(hers), "A Toolset")?;
    toolbox.add_toolset(Some(his), "Unused")?;
    toolbox.add_tool_to(his, ScriptTool::new("Clip")?)?;
    toolbox.add_tool_to(nested, ScriptTool::new("Merge")?)?;
    toolbox.add_tool_to(nested, ScriptTool::new("Dissolve")?)?;
    Ok(toolbox)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn saving_twice_gives_identical_bytes() -> Result<(), Box<dyn std::error::Error>> {
    let first = tempfile::tempdir()?;
    let second = tempfile::tempdir()?;
    let toolbox = sample_toolbox()?;

    let first_path = toolbox.save_with(first.path(), &pinned())?.ok_or("expected an archive")?;
    let second_path = toolbox.save_with(second.path(), &pinned())?.ok_or("expected an archive")?;
    if fs::read(&first_path)? != fs::read(&second_path)? {
        return Err("archives of the same toolbox must be byte identical".into());
    }
    Ok(())
}

#[test]
fn archive_layout_is_sorted() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let archive = sample_toolbox()?.save_with(temp.path(), &pinned())?.ok_or("no archive")?;
    if archive.file_name().and_then(|name| name.to_str()) != Some("Sample.atbx") {
        return Err("archive must be named after the toolbox".into());
    }
    let names = entry_names(&archive)?;
    let mut sorted = names.clone();
    sorted.sort();
    if names != sorted {
        return Err("entries must be stored in sorted order".into());
    }
    for expected in [
        "Area.tool/tool.content",
        "Buffer.tool/tool.content.rc",
        "Buffer.tool/tool.script.execute.py",
        "Merge.tool/tool.content",
        "toolbox.content",
        "toolbox.content.rc",
    ] {
        if !names.iter().any(|name| name == expected) {
            return Err(format!("missing archive entry {expected}").into());
        }
    }
    Ok(())
}

#[test]
fn toolsets_are_indexed_breadth_first() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let archive = sample_toolbox()?.save_with(temp.path(), &pinned())?.ok_or("no archive")?;

    let content = read_json(&archive, "toolbox.content")?;
    let toolsets = content.get("toolsets").ok_or("toolsets missing")?;
    let expected = json!({
        "<root>": { "tools": ["Area", "Buffer"] },
        "$rc:toolset1.name": { "tools": ["Clip"] },
        "$rc:toolset2.name": { "tools": ["Dissolve", "Merge"] },
    });
    if *toolsets != expected {
        return Err(format!("unexpected toolsets: {toolsets}").into());
    }
    let Value::Object(toolsets) = toolsets else {
        return Err("toolsets must be an object".into());
    };
    let keys: Vec<&str> = toolsets.keys().map(String::as_str).collect();
    if keys != ["<root>", "$rc:toolset1.name", "$rc:toolset2.name"] {
        return Err(format!("unexpected toolset order: {}", keys.join(", ")).into());
    }

    let resource = read_json(&archive, "toolbox.content.rc")?;
    let expected = json!({
        "map": {
            "title": "Sample Toolbox",
            "descr": "Demo",
            "toolset1.name": "His Tools",
            "toolset2.name": "Her Tools\\A Toolset",
        }
    });
    if resource != expected {
        return Err(format!("unexpected toolbox resource: {resource}").into());
    }
    Ok(())
}

#[test]
fn parameters_round_trip_through_the_archive() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let archive = sample_toolbox()?.save_with(temp.path(), &pinned())?.ok_or("no archive")?;

    let content = read_json(&archive, "Buffer.tool/tool.content")?;
    let params = content.get("params").ok_or("params missing")?;
    let mode = params.get("mode").ok_or("mode missing")?;
    if mode.get("value") != Some(&Value::from("'round end';'flat'")) {
        return Err(format!("unexpected multi value: {mode}").into());
    }
    let expected_datatype = json!({ "datatype": { "type": "GPString" }, "type": "GPMultiValue" });
    if mode.get("datatype") != Some(&expected_datatype) {
        return Err(format!("unexpected multi datatype: {mode}").into());
    }
    let segments = params.get("segments").ok_or("segments missing")?;
    let expected_domain = json!({ "type": "GPRangeDomain", "min": "1", "max": "64" });
    if segments.get("domain") != Some(&expected_domain) {
        return Err(format!("unexpected range domain: {segments}").into());
    }
    if params.get("distance").and_then(|param| param.get("value")) != Some(&Value::from("10")) {
        return Err("numeric default should render as text".into());
    }

    let resource = read_json(&archive, "Buffer.tool/tool.content.rc")?;
    let map = resource.get("map").ok_or("map missing")?;
    if map.get("mode.domain.square") != Some(&Value::from("square"))
        || map.get("params.category1") != Some(&Value::from("Inputs"))
        || map.get("params.category2") != Some(&Value::from("Options"))
        || map.get("description") != Some(&Value::from("Buffers features"))
    {
        return Err(format!("unexpected tool resource: {map}").into());
    }
    Ok(())
}

#[test]
fn tool_names_are_unique_across_the_toolbox() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let mut toolbox = Toolbox::new("Dupes")?;
    toolbox.add_tool(ScriptTool::new("Tool")?);
    let set = toolbox.add_toolset(None, "Set")?;
    toolbox.add_tool_to(set, ScriptTool::new("tool")?)?;
    toolbox.add_tool_to(set, ScriptTool::new("Other")?)?;

    let Err(err) = toolbox.save_with(temp.path(), &pinned()) else {
        return Err("duplicate tool names must fail".into());
    };
    if err.to_string() != "Tool name repetition detected: Tool; tool" {
        return Err(format!("unexpected error: {err}").into());
    }
    if temp.path().join("Dupes.atbx").exists() {
        return Err("a failed save must not leave an archive".into());
    }
    Ok(())
}

#[test]
fn sibling_toolsets_named_alike_collide() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let mut toolbox = Toolbox::new("Siblings")?;
    let first = toolbox.add_toolset(None, "A Toolset")?;
    let second = toolbox.add_toolset(None, "a toolset")?;
    toolbox.add_tool_to(first, ScriptTool::new("One")?)?;
    toolbox.add_tool_to(second, ScriptTool::new("Two")?)?;

    let Err(ToolboxError::Repetition(message)) = toolbox.save_with(temp.path(), &pinned()) else {
        return Err("sibling toolsets with the same name must fail".into());
    };
    if message != "Toolset name repetition detected: A Toolset; a toolset" {
        return Err(format!("unexpected message: {message}").into());
    }

    let mut toolbox = Toolbox::new("Cousins")?;
    let left = toolbox.add_toolset(None, "Left")?;
    let right = toolbox.add_toolset(None, "Right")?;
    let left_child = toolbox.add_toolset(Some(left), "A Toolset")?;
    let right_child = toolbox.add_toolset(Some(right), "A Toolset")?;
    toolbox.add_tool_to(left_child, ScriptTool::new("One")?)?;
    toolbox.add_tool_to(right_child, ScriptTool::new("Two")?)?;
    if toolbox.save_with(temp.path(), &pinned())?.is_none() {
        return Err("same names under different parents are allowed".into());
    }
    Ok(())
}

#[test]
fn reserved_tool_names_use_suffixed_folders() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let mut toolbox = Toolbox::new("Reserved")?;
    toolbox.add_tool(ScriptTool::new("CON")?);
    let archive = toolbox.save_with(temp.path(), &pinned())?.ok_or("no archive")?;

    let content = read_json(&archive, "toolbox.content")?;
    let tools = content.pointer("/toolsets/<root>/tools").ok_or("root tools missing")?;
    if *tools != json!(["CON:CON_.tool"]) {
        return Err(format!("unexpected qualified names: {tools}").into());
    }
    if !entry_names(&archive)?.iter().any(|name| name == "CON_.tool/tool.content") {
        return Err("tool folder must use the suffixed name".into());
    }
    Ok(())
}

#[test]
fn linked_scripts_resolve_against_the_destination() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let scripts = temp.path().join("scripts");
    fs::create_dir_all(&scripts)?;
    let script = scripts.join("main.py");
    fs::write(&script, "print('hello')\n")?;

    let mut tool = ScriptTool::new("Linked")?;
    tool.set_execution_script(Some(ExecutionScript::from_file(&script, false)?));
    let mut toolbox = Toolbox::new("Links")?;
    let set = toolbox.add_toolset(None, "Deep")?;
    let deeper = toolbox.add_toolset(Some(set), "Deeper")?;
    toolbox.add_tool_to(deeper, tool)?;
    let archive = toolbox.save_with(temp.path(), &pinned())?.ok_or("no archive")?;

    let mut reader = ZipArchive::new(Cursor::new(fs::read(&archive)?))?;
    let mut link = String::new();
    reader.by_name("Linked.tool/tool.script.execute.link")?.read_to_string(&mut link)?;
    if link != "..\\..\\scripts\\main.py" {
        return Err(format!("unexpected link: {link}").into());
    }
    Ok(())
}
