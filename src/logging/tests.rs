// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{LogConfig, LogContext, LogLevel};

#[test]
fn test_log_context_prefix() {
    let component = LogContext::for_component("demo/core");
    let translation = LogContext::for_component("demo/core").with_language("de");
    let empty = LogContext::default();

    insta::assert_yaml_snapshot!(
        vec![
            ("component", component.prefix()),
            ("translation", translation.prefix()),
            ("empty", empty.prefix()),
        ],
        @r#"
    - - component
      - "[demo/core] "
    - - translation
      - "[demo/core/de] "
    - - empty
      - ""
    "#
    );
    assert_eq!(translation.language(), Some("de"));
}

#[test]
fn test_log_level_conversion() {
    assert_eq!(LogLevel::from_int(0), LogLevel::SILENT);
    assert_eq!(LogLevel::from_int(3), LogLevel::INFO);
    assert_eq!(LogLevel::from_int(100), LogLevel::DUMP);
    assert_eq!(LogLevel::from_u8(7), None);
}

#[test]
fn test_filter_string_quiets_libraries_below_dump() {
    assert_eq!(LogLevel::SILENT.to_filter_string(), "off");
    assert_eq!(
        LogLevel::DEBUG.to_filter_string(),
        "debug,sqlx=warn,gix=warn,hyper=warn,reqwest=warn"
    );
    assert_eq!(
        LogLevel::ERROR.to_filter_string(),
        "error,sqlx=error,gix=error,hyper=error,reqwest=error"
    );
    assert_eq!(LogLevel::DUMP.to_filter_string(), "trace");
}

#[test]
fn test_log_config_defaults() {
    let config = LogConfig::default();
    assert_eq!(config.console_level(), LogLevel::INFO);
    assert_eq!(config.file_level(), LogLevel::TRACE);
    assert!(config.log_file().is_none());
    assert!(!config.json_file());
}
