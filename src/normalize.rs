//! Normalization helpers shared by the processors.

use std::collections::HashSet;

/// Trim surrounding whitespace and lower-case.
pub fn normalize_value(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Normalize every value.
pub fn normalize_values<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .map(|value| normalize_value(value.as_ref()))
        .collect()
}

/// Split on `delimiter`, or return the value unchanged when there is none.
///
/// Pieces are not trimmed.
pub fn split_delimited(value: &str, delimiter: Option<&str>) -> Vec<String> {
    match delimiter {
        Some(delimiter) if !delimiter.is_empty() => {
            value.split(delimiter).map(str::to_string).collect()
        }
        _ => vec![value.to_string()],
    }
}

/// Trim every name.
pub fn trim_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.as_ref().trim().to_string())
        .collect()
}

/// Drop repeated values, keeping the first occurrence.
pub fn dedupe_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
