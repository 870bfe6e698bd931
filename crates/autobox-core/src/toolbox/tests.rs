// crates/autobox-core/src/toolbox/tests.rs
// ============================================================================
// Module: Toolbox Unit Tests
// Description: Naming rules and save preconditions.
// Purpose: Guard archive placement before any document is inspected.
// Dependencies: autobox-core, tempfile, zip
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Cursor;
use std::io::Read;

use zip::ZipArchive;

use super::SaveOptions;
use super::Toolbox;
use super::current_timestamp;
use crate::ToolboxError;
use crate::script::ScriptTool;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn names_labels_and_aliases() -> Result<(), Box<dyn std::error::Error>> {
    let toolbox = Toolbox::new(" My: Tools.ATBX ")?.with_alias("  ").with_label("Mine");
    if toolbox.name() != "My_ Tools" || toolbox.archive_file_name() != "My_ Tools.atbx" {
        return Err(format!("unexpected toolbox name: {}", toolbox.name()).into());
    }
    if toolbox.alias() != "MyTools" || toolbox.label() != "Mine" {
        let (alias, label) = (toolbox.alias(), toolbox.label());
        return Err(format!("unexpected alias/label: {alias} / {label}").into());
    }
    let Err(ToolboxError::Validation(_)) = Toolbox::new("123") else {
        return Err("name without letters has no alias and must be rejected".into());
    };
    if Toolbox::new("NUL").is_ok() {
        return Err("reserved device names must be rejected".into());
    }
    Ok(())
}

#[test]
fn missing_destination_saves_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let toolbox = Toolbox::new("Example")?;
    if toolbox.save(&temp.path().join("missing"), false)?.is_some() {
        return Err("missing destination should return None".into());
    }
    Ok(())
}

#[test]
fn existing_archive_requires_overwrite() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let target = temp.path().join("Example.atbx");
    fs::write(&target, b"keep")?;
    let mut toolbox = Toolbox::new("Example")?;
    toolbox.add_tool(ScriptTool::new("Tool")?);

    let Err(ToolboxError::FileExists(path)) = toolbox.save(temp.path(), false) else {
        return Err("existing archive must not be replaced silently".into());
    };
    if path != target || fs::read(&target)? != b"keep" {
        return Err("existing archive was touched".into());
    }

    let options = SaveOptions::new().with_overwrite(true).with_updated("2024-01-01 00:00:00");
    let saved = toolbox.save_with(temp.path(), &options)?.ok_or("expected an archive")?;
    let mut archive = ZipArchive::new(Cursor::new(fs::read(&saved)?))?;
    let mut content = String::new();
    archive.by_name("Tool.tool/tool.content")?.read_to_string(&mut content)?;
    if !content.contains("2024-01-01 00:00:00") {
        return Err("pinned timestamp was not written".into());
    }
    Ok(())
}

#[test]
fn empty_toolbox_writes_sentinel() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let mut toolbox = Toolbox::new("Empty")?.with_description("Nothing here");
    toolbox.add_toolset(None, "Hollow")?;
    let saved = toolbox.save(temp.path(), false)?.ok_or("expected an archive")?;

    let mut archive = ZipArchive::new(Cursor::new(fs::read(&saved)?))?;
    if archive.len() != 2 {
        return Err("an empty toolbox holds only the two toolbox documents".into());
    }
    let mut text = String::new();
    archive.by_name("toolbox.content")?.read_to_string(&mut text)?;
    let content: serde_json::Value = serde_json::from_str(&text)?;
    let expected = serde_json::json!({
        "version": "1.0",
        "alias": "Empty",
        "displayname": "$rc:title",
        "description": "$rc:descr",
        "toolsets": { "<root>": { "tools": [""] } },
    });
    if content != expected {
        return Err(format!("unexpected toolbox content: {text}").into());
    }
    Ok(())
}

#[test]
fn timestamps_use_fixed_layout() -> Result<(), Box<dyn std::error::Error>> {
    let stamp = current_timestamp()?;
    let bytes = stamp.as_bytes();
    let separators_ok = bytes.len() == 19
        && bytes.get(4) == Some(&b'-')
        && bytes.get(7) == Some(&b'-')
        && bytes.get(10) == Some(&b' ')
        && bytes.get(13) == Some(&b':')
        && bytes.get(16) == Some(&b':');
    if !separators_ok {
        return Err(format!("unexpected timestamp layout: {stamp}").into());
    }
    Ok(())
}
