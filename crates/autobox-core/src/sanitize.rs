// crates/autobox-core/src/sanitize.rs
// ============================================================================
// Module: Identifier Sanitizer
// Description: Pure string transforms for names, labels and aliases.
// Purpose: Turn user-supplied text into host-safe identifiers or reject it.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Every function here is pure and returns `None` instead of guessing when
//! the input cannot be made valid. Callers turn `None` into a validation
//! error naming the rejected input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt::Write;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Reserved device names that cannot be used as file or folder names.
const RESERVED_NAMES: [&str; 30] = [
    "CON", "PRN", "AUX", "NUL", "CONIN$", "CONOUT$", "COM1", "COM2", "COM3", "COM4", "COM5",
    "COM6", "COM7", "COM8", "COM9", "COM\u{b9}", "COM\u{b2}", "COM\u{b3}", "LPT1", "LPT2", "LPT3",
    "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9", "LPT\u{b9}", "LPT\u{b2}", "LPT\u{b3}",
];

/// Archive suffix stripped from toolbox names.
const ARCHIVE_SUFFIX: &str = ".atbx";

/// Opening tag of the rich-text envelope.
const XDOC_BEGIN: &str = "<xdoc>";

/// Closing tag of the rich-text envelope.
const XDOC_END: &str = "</xdoc>";

// ============================================================================
// SECTION: Toolbox and Tool Names
// ============================================================================

/// Returns true when the name matches a reserved device name, ignoring case.
#[must_use]
pub fn is_reserved_name(value: &str) -> bool {
    let upper = value.to_uppercase();
    RESERVED_NAMES.contains(&upper.as_str())
}

/// Sanitizes a toolbox name into a file name.
///
/// Strips a trailing `.atbx`, replaces forbidden path characters with `_`,
/// collapses repeated underscores and rejects reserved device names.
#[must_use]
pub fn validate_toolbox_name(value: &str) -> Option<String> {
    let mut value = value.trim();
    if value.is_empty() {
        return None;
    }
    let split = value.len().checked_sub(ARCHIVE_SUFFIX.len());
    if let Some(stem) = split.and_then(|index| strip_suffix_ignore_case(value, index)) {
        value = stem;
        if value.is_empty() {
            return None;
        }
    }
    let replaced: String =
        value.chars().map(|c| if is_forbidden_file_char(c) { '_' } else { c }).collect();
    let collapsed = collapse_repeats(&replaced, '_');
    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() || is_reserved_name(trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Sanitizes a toolbox alias: alphanumerics only, starting with a letter.
#[must_use]
pub fn validate_toolbox_alias(value: &str) -> Option<String> {
    alpha_start_sans_special(value)
}

/// Sanitizes a script tool name: alphanumerics only, starting with a letter.
#[must_use]
pub fn validate_script_name(value: &str) -> Option<String> {
    alpha_start_sans_special(value)
}

/// Derives the tool folder name from an already validated tool name.
///
/// Reserved device names gain a trailing underscore; all others are kept.
#[must_use]
pub fn validate_script_folder_name(value: &str) -> String {
    if is_reserved_name(value) { format!("{value}_") } else { value.to_string() }
}

// ============================================================================
// SECTION: Toolset and Parameter Names
// ============================================================================

/// Sanitizes a toolset name; special characters become spaces.
#[must_use]
pub fn validate_toolset_name(value: &str) -> Option<String> {
    name_no_special(value, ' ')
}

/// Sanitizes an explicit parameter name.
#[must_use]
pub fn validate_parameter_name(value: &str) -> Option<String> {
    let spaced = name_no_special(value, ' ')?;
    let underscored = name_no_special(&spaced, '_')?;
    remove_leading_non_alpha(&underscored)
}

/// Sanitizes a parameter label: trimmed, single-spaced and non-empty.
#[must_use]
pub fn validate_parameter_label(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some(collapse_repeats(value, ' '))
}

/// Derives a parameter name from a validated label.
///
/// Non-alphanumerics become `_`, leading non-letters are removed and the
/// result is lower-cased.
#[must_use]
pub fn make_parameter_name(label: &str) -> Option<String> {
    let replaced: String =
        label.chars().map(|c| if c.is_alphanumeric() { c } else { '_' }).collect();
    remove_leading_non_alpha(&replaced).map(|name| name.to_lowercase())
}

/// Returns the sorted, distinct names whose lower-cased form occurs more than once.
#[must_use]
pub fn repeated_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let names: Vec<&str> = names.into_iter().collect();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for name in &names {
        *counts.entry(name.to_lowercase()).or_default() += 1;
    }
    let repeated: BTreeSet<String> = names
        .iter()
        .filter(|name| counts.get(&name.to_lowercase()).is_some_and(|count| *count > 1))
        .map(|name| (*name).to_string())
        .collect();
    repeated.into_iter().collect()
}

// ============================================================================
// SECTION: Text Helpers
// ============================================================================

/// Wraps html-ish text in the `<xdoc>` envelope.
///
/// Returns `None` for blank text; text already wrapped is returned trimmed.
#[must_use]
pub fn wrap_markup(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if value.starts_with(XDOC_BEGIN) && value.ends_with(XDOC_END) {
        return Some(value.to_string());
    }
    if value.contains("</") && value.contains('>') {
        return Some(format!("{XDOC_BEGIN}{value}{XDOC_END}"));
    }
    Some(value.to_string())
}

/// Quotes one element of a multi-value default when it needs quoting.
///
/// Values already wrapped in matching quotes are returned unchanged; values
/// without whitespace, `;` or quote characters are returned as-is.
#[must_use]
pub fn quote(value: &str) -> String {
    if is_fully_quoted(value) {
        return value.to_string();
    }
    let needs_quotes =
        value.chars().any(|c| c.is_whitespace() || matches!(c, ';' | '\'' | '"'));
    if needs_quotes {
        let wrapper = wrapper_for(value);
        format!("{wrapper}{value}{wrapper}")
    } else {
        value.to_string()
    }
}

/// Wraps text in quotes and escapes it so the element splits back losslessly.
///
/// The wrapper is `"` when the text holds `'` but not `"`, otherwise `'`.
/// Backslashes, the wrapper and control characters are backslash-escaped.
#[must_use]
pub fn wrap_quoted(value: &str) -> String {
    let wrapper = wrapper_for(value);
    let mut output = String::with_capacity(value.len() + 2);
    output.push(wrapper);
    for c in value.chars() {
        match c {
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c == wrapper => {
                output.push('\\');
                output.push(c);
            }
            c if c.is_control() && u32::from(c) <= 0xff => {
                let _ = write!(output, "\\x{:02x}", u32::from(c));
            }
            c => output.push(c),
        }
    }
    output.push(wrapper);
    output
}

/// Picks `"` when the text holds `'` but not `"`, otherwise `'`.
fn wrapper_for(value: &str) -> char {
    if value.contains('\'') && !value.contains('"') { '"' } else { '\'' }
}

/// Returns true when the text starts and ends with the same quote character.
fn is_fully_quoted(value: &str) -> bool {
    let mut chars = value.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) => first == last && matches!(first, '\'' | '"'),
        _ => false,
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the stem when `value[index..]` equals the archive suffix.
fn strip_suffix_ignore_case(value: &str, index: usize) -> Option<&str> {
    let suffix = value.get(index ..)?;
    if suffix.eq_ignore_ascii_case(ARCHIVE_SUFFIX) { value.get(.. index) } else { None }
}

/// Returns true for characters that are not allowed in file names.
const fn is_forbidden_file_char(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || (c as u32) < 0x20
}

/// Returns true for characters replaced in toolset and parameter names.
const fn is_special_name_char(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '&' | '"' | '<' | '>' | '|')
}

/// Collapses runs of `repeated` into a single occurrence.
fn collapse_repeats(value: &str, repeated: char) -> String {
    let mut output = String::with_capacity(value.len());
    let mut previous = None;
    for c in value.chars() {
        if c == repeated && previous == Some(repeated) {
            continue;
        }
        output.push(c);
        previous = Some(c);
    }
    output
}

/// Replaces special characters with `replacement` and trims the result.
fn name_no_special(value: &str, replacement: char) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let replaced: String =
        value.chars().map(|c| if is_special_name_char(c) { replacement } else { c }).collect();
    let collapsed = collapse_repeats(&replaced, replacement);
    let trimmed = collapsed.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// Keeps alphanumerics and removes leading non-letters.
fn alpha_start_sans_special(value: &str) -> Option<String> {
    let kept: String = value.trim().chars().filter(|c| c.is_alphanumeric()).collect();
    remove_leading_non_alpha(&kept)
}

/// Removes the leading run of non-letter characters.
fn remove_leading_non_alpha(value: &str) -> Option<String> {
    let stripped = value.trim_start_matches(|c: char| !c.is_alphabetic());
    if stripped.is_empty() { None } else { Some(stripped.to_string()) }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
