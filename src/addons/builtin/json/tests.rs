// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::*;
use insta::assert_snapshot;
use serde_json::json;

fn addon(configuration: Value) -> JsonAddon {
    JsonAddon {
        config: parse_configuration(METADATA.name, &configuration).expect("valid configuration"),
    }
}

#[test]
fn test_reformat_sorted_two_spaces() {
    let addon = addon(json!({ "sort_keys": true, "indent": 2 }));
    let out = addon
        .reformat("de.json", r#"{"b": "B", "a": {"z": 1, "y": 2}}"#)
        .expect("valid JSON");
    assert_snapshot!(out, @r#"
    {
      "a": {
        "y": 2,
        "z": 1
      },
      "b": "B"
    }
    "#);
}

#[test]
fn test_reformat_keeps_order() {
    let addon = addon(Value::Null);
    let out = addon.reformat("de.json", r#"{"b":"B","a":"A"}"#).expect("valid JSON");
    assert_eq!(out, "{\n    \"b\": \"B\",\n    \"a\": \"A\"\n}\n");
}

#[test]
fn test_reformat_tabs() {
    let addon = addon(json!({ "style": "tabs", "indent": 1 }));
    let out = addon.reformat("de.json", r#"{"a":"A"}"#).expect("valid JSON");
    assert_eq!(out, "{\n\t\"a\": \"A\"\n}\n");
}

#[test]
fn test_invalid_configuration() {
    assert!(create(&json!({ "indent": 40 })).is_err());
    assert!(create(&json!({ "style": "zigzag" })).is_err());
    assert!(create(&json!({ "unknown": true })).is_err());
}
