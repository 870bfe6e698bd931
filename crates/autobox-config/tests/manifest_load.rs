// crates/autobox-config/tests/manifest_load.rs
// ============================================================================
// Module: Manifest Load Tests
// Description: Manifests read from disk and saved as archives.
// Purpose: Check file limits and the manifest-to-archive path end to end.
// Dependencies: autobox-config, serde_json, tempfile, zip
// ============================================================================

//! ## Overview
//! Writes manifests and their referenced files into scratch folders, loads
//! them through the public API and inspects the archives they produce.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Cursor;
use std::io::Read;
use std::path::Path;

use autobox_config::ConfigError;
use autobox_config::ToolboxManifest;
use serde_json::Value;
use zip::ZipArchive;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Manifest exercising toolsets, scripts, images, filters and defaults.
const MANIFEST: &str = r#"
[toolbox]
name = "Field Kit"
label = "Field Kit"
description = "Tools for the field"
tools = ["Buffer"]

[[toolset]]
name = "Dates"
tools = ["Stamp"]

[[tool]]
name = "Buffer"
label = "Buffer Features"
summary = "Buffers *features*"
attributes = ["credits"]
execution = { path = "scripts/buffer.py" }
validation = { code = "class ToolValidator: pass" }
icon = "images/buffer.png"

[[tool.parameter]]
kind = "GPFeatureLayer"
label = "Input Features"
category = "Inputs"

[[tool.parameter]]
kind = "GPLinearUnit"
label = "Distance"
default = "25 Meters"
depends_on = "input_features"
filter = { kind = "LinearUnit", values = ["Meters", "Kilometers"] }

[[tool.parameter]]
kind = "GPString"
label = "Side"
multi = true
default = ["left", "right"]
filter = { kind = "StringValue", values = ["left", "right", "full"] }

[[tool]]
name = "Stamp"
execution = { path = "scripts/stamp.py", embed = false }

[[tool.parameter]]
kind = "GPDate"
label = "When"
requirement = "optional"
default = 2024-02-29
"#;

/// Writes the sample manifest and the files it references.
fn write_project(root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(root.join("scripts"))?;
    fs::create_dir_all(root.join("images"))?;
    fs::write(root.join("scripts/buffer.py"), "print('buffer')\n")?;
    fs::write(root.join("scripts/stamp.py"), "print('stamp')\n")?;
    fs::write(root.join("images/buffer.png"), [0x89, b'P', b'N', b'G'])?;
    fs::write(root.join("autobox.toml"), MANIFEST)?;
    Ok(())
}

/// Reads one archive entry as text.
fn read_entry(archive: &Path, entry: &str) -> Result<String, Box<dyn std::error::Error>> {
    let mut reader = ZipArchive::new(Cursor::new(fs::read(archive)?))?;
    let mut text = String::new();
    reader.by_name(entry)?.read_to_string(&mut text)?;
    Ok(text)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn loaded_manifest_saves_a_complete_archive() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let project = temp.path().join("project");
    let out = temp.path().join("out");
    write_project(&project)?;
    fs::create_dir_all(&out)?;

    let manifest = ToolboxManifest::load(Some(&project.join("autobox.toml")))?;
    let toolbox = manifest.build()?;
    let archive = toolbox.save(&out, false)?.ok_or("destination exists, archive expected")?;
    if archive != out.join("Field Kit.atbx") {
        return Err(format!("unexpected archive path: {}", archive.display()).into());
    }

    let mut reader = ZipArchive::new(Cursor::new(fs::read(&archive)?))?;
    let names: Vec<String> = reader.file_names().map(str::to_string).collect();
    for expected in [
        "Buffer.tool/tool.script.execute.py",
        "Buffer.tool/tool.script.validate.py",
        "Buffer.tool/tool.icon.png",
        "Stamp.tool/tool.script.execute.link",
        "toolbox.content",
    ] {
        if !names.iter().any(|name| name == expected) {
            return Err(format!("missing archive entry: {expected}").into());
        }
    }
    let mut script = String::new();
    reader.by_name("Buffer.tool/tool.script.execute.py")?.read_to_string(&mut script)?;
    if script != "print('buffer')\n" {
        return Err("embedded script should be copied verbatim".into());
    }

    let content: Value = serde_json::from_str(&read_entry(&archive, "Buffer.tool/tool.content")?)?;
    let params = content.get("params").ok_or("params missing")?;
    let distance = params.get("distance").ok_or("distance missing")?;
    if distance.get("value") != Some(&Value::from("25 Meters"))
        || distance.get("depends") != Some(&serde_json::json!(["input_features"]))
    {
        return Err(format!("unexpected distance parameter: {distance}").into());
    }
    let side = params.get("side").ok_or("side missing")?;
    if side.get("value") != Some(&Value::from("'left';'right'")) {
        return Err(format!("unexpected multi default: {side}").into());
    }

    let stamp: Value = serde_json::from_str(&read_entry(&archive, "Stamp.tool/tool.content")?)?;
    let when = stamp.get("params").and_then(|params| params.get("when")).ok_or("when missing")?;
    if when.get("value") != Some(&Value::from("2024-02-29")) {
        return Err(format!("unexpected date default: {when}").into());
    }

    let toolbox_content: Value = serde_json::from_str(&read_entry(&archive, "toolbox.content")?)?;
    let expected_toolsets = serde_json::json!({
        "<root>": { "tools": ["Buffer"] },
        "$rc:toolset1.name": { "tools": ["Stamp"] },
    });
    if toolbox_content.get("toolsets") != Some(&expected_toolsets) {
        return Err(format!("unexpected toolsets: {toolbox_content}").into());
    }
    Ok(())
}

#[test]
fn oversized_manifest_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let path = temp.path().join("autobox.toml");
    let padding = "#".repeat(1024 * 1024);
    fs::write(&path, format!("[toolbox]\nname = \"Big\"\n{padding}\n"))?;
    let Err(ConfigError::Invalid(message)) = ToolboxManifest::load(Some(&path)) else {
        return Err("manifest above the size limit must be rejected".into());
    };
    if !message.contains("size limit") {
        return Err(format!("unexpected message: {message}").into());
    }
    Ok(())
}

#[test]
fn unreadable_manifests_fail_closed() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let Err(ConfigError::Io(_)) = ToolboxManifest::load(Some(&temp.path().join("absent.toml")))
    else {
        return Err("missing manifest should be an io error".into());
    };

    let binary = temp.path().join("binary.toml");
    fs::write(&binary, [0xff, 0xfe, 0x00])?;
    let Err(ConfigError::Invalid(message)) = ToolboxManifest::load(Some(&binary)) else {
        return Err("non utf-8 manifest should be invalid".into());
    };
    if message != "manifest file must be utf-8" {
        return Err(format!("unexpected message: {message}").into());
    }
    Ok(())
}

#[test]
fn missing_script_files_surface_as_toolbox_errors() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let manifest = ToolboxManifest::parse(
        "[toolbox]\nname = \"Broken\"\n\n[[tool]]\nname = \"Tool\"\n\
         execution = { path = \"gone.py\" }\n",
        temp.path(),
    )?;
    let Err(ConfigError::Toolbox(_)) = manifest.build() else {
        return Err("a missing script file should fail the build".into());
    };
    Ok(())
}
