// crates/autobox-core/tests/proptest_values.rs
// ============================================================================
// Module: Filter and Default Value Property-Based Tests
// Description: Property tests for filter normalization and multi-value quoting.
// Purpose: Check order-preserving deduplication and lossless quoting across inputs.
// ============================================================================

//! Property-based tests for filter values and multi-valued defaults.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use autobox_core::DefaultValue;
use autobox_core::Filter;
use autobox_core::FilterKind;
use autobox_core::FilterValue;
use autobox_core::default::join_multi_value;
use proptest::prelude::*;
use serde_json::Value;

/// Mixed filter input: free text or an integer.
#[derive(Debug, Clone)]
enum Input {
    Text(String),
    Integer(i64),
}

impl From<Input> for FilterValue {
    fn from(input: Input) -> Self {
        match input {
            Input::Text(text) => Self::from(text),
            Input::Integer(value) => Self::from(value),
        }
    }
}

fn input_strategy() -> impl Strategy<Value = Input> {
    prop_oneof![
        "[a-c ]{1,3}".prop_map(Input::Text),
        (-3_i64 .. 3).prop_map(Input::Integer),
    ]
}

/// Keeps the first occurrence of every item.
fn dedup<T: PartialEq + Clone>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut kept: Vec<T> = Vec::new();
    for item in items {
        if !kept.contains(&item) {
            kept.push(item);
        }
    }
    kept
}

/// Splits a joined multi value on separators outside quotes, then unquotes and
/// unescapes each element.
fn split_multi_value(joined: &str) -> Vec<String> {
    let mut elements = Vec::new();
    let mut chars = joined.chars().peekable();
    while let Some(quote) = chars.next() {
        let mut element = String::new();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('n') => element.push('\n'),
                    Some('r') => element.push('\r'),
                    Some('t') => element.push('\t'),
                    Some(escaped) => element.push(escaped),
                    None => break,
                },
                c if c == quote => break,
                c => element.push(c),
            }
        }
        elements.push(element);
        if chars.peek() == Some(&';') {
            chars.next();
        }
    }
    elements
}

proptest! {
    #[test]
    fn string_filters_keep_first_text_occurrences(
        inputs in prop::collection::vec(input_strategy(), 0 .. 12)
    ) {
        let expected: Vec<String> = dedup(inputs.iter().filter_map(|input| match input {
            Input::Text(text) => Some(text.clone()),
            Input::Integer(_) => None,
        }));
        let filter = Filter::new(FilterKind::StringValue, inputs);
        let (content, resources) = filter.serialize_with_resources("Choice");

        let items = content
            .get("domain")
            .and_then(|domain| domain.get("items"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let values: Vec<String> = items
            .iter()
            .filter_map(|item| item.get("value").and_then(Value::as_str).map(str::to_string))
            .collect();
        prop_assert_eq!(&values, &expected);
        prop_assert_eq!(resources.len(), expected.len());
        for value in &expected {
            let key = format!("choice.domain.{value}");
            prop_assert_eq!(resources.get(&key), Some(&Value::from(value.as_str())));
        }
    }

    #[test]
    fn long_value_filters_keep_first_numeric_occurrences(
        inputs in prop::collection::vec(input_strategy(), 0 .. 12)
    ) {
        let expected: Vec<FilterValue> = dedup(inputs.iter().filter_map(|input| match input {
            Input::Integer(value) => Some(FilterValue::Integer(*value)),
            Input::Text(_) => None,
        }));
        let filter = Filter::new(FilterKind::LongValue, inputs);
        prop_assert_eq!(filter.values(), expected.as_slice());
        prop_assert_eq!(filter.is_empty(), expected.is_empty());
    }

    #[test]
    fn multi_values_split_back_to_the_originals(
        texts in prop::collection::vec("[a-z ;'\"\\\\\t]{0,6}", 1 .. 6)
    ) {
        let values: Vec<DefaultValue> =
            texts.iter().map(|text| DefaultValue::from(text.as_str())).collect();
        let joined = join_multi_value(&values);
        prop_assert_eq!(split_multi_value(&joined), texts);
    }
}
