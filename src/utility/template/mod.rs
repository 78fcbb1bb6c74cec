// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Placeholder rendering for commit messages and discovered names.
//!
//! ```text
//! "Translated ({{ language_name }})"   + {"language_name": "German"}
//!   --> "Translated (German)"
//!
//! {{ stats.translated }}     dotted lookup into nested objects
//! {{ component|title }}      filters: lower, upper, title, slugify
//! {{ missing }}              renders as the empty string
//! ```

use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*([A-Za-z_]+)\s*)?\}\}")
        .unwrap_or_else(|e| unreachable!("placeholder pattern is valid: {e}"))
});

fn lookup<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(context, |value, key| value.get(key))
}

fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Lowercase, ASCII alphanumerics with single dashes.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

fn apply_filter(filter: Option<&str>, text: String) -> String {
    match filter {
        Some("lower") => text.to_lowercase(),
        Some("upper") => text.to_uppercase(),
        Some("title") => title_case(&text),
        Some("slugify") => slugify(&text),
        _ => text,
    }
}

/// Renders `{{ name }}` placeholders from a JSON object.
///
/// # Example
/// ```
/// use serde_json::json;
/// use transync::utility::template::render;
///
/// let context = json!({"component": "main-app", "stats": {"all": 3}});
/// assert_eq!(render("{{ component|title }}: {{ stats.all }}", &context), "Main-App: 3");
/// ```
#[must_use]
pub fn render(template: &str, context: &Value) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let text = lookup(context, &caps[1]).map(to_text).unwrap_or_default();
            apply_filter(caps.get(2).map(|m| m.as_str()), text)
        })
        .into_owned()
}

#[cfg(test)]
mod tests;
