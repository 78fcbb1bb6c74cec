// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::*;
use serde_json::json;

#[test]
fn test_render_nested_and_missing() {
    let context = json!({
        "language_name": "German",
        "stats": {"translated": 2, "translated_percent": 66.7},
    });
    assert_eq!(
        render(
            "{{language_name}} {{ stats.translated }} {{ stats.translated_percent }}% {{ nope }}.",
            &context
        ),
        "German 2 66.7% ."
    );
}

#[test]
fn test_filters() {
    let context = json!({"name": "hello wORLD_x"});
    assert_eq!(render("{{ name|upper }}", &context), "HELLO WORLD_X");
    assert_eq!(render("{{ name|title }}", &context), "Hello World_X");
    assert_eq!(render("{{ name|slugify }}", &context), "hello-world_x");
    assert_eq!(render("{{ name | lower }}", &context), "hello world_x");
}

#[test]
fn test_slugify_collapses_separators() {
    assert_eq!(slugify("  Docs / Guide  "), "docs-guide");
    assert_eq!(slugify("--"), "");
}
