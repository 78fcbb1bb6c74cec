// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{
    DiscoveryConfig, KnownComponent, MaskMatcher, discover, get_mask_matches, mask_matches,
    mask_to_regex, matched_components,
};
use crate::error::{SyncError, ValidationError};
use std::collections::BTreeSet;
use std::path::Path;
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "").unwrap();
}

fn config(match_regex: &str) -> DiscoveryConfig {
    DiscoveryConfig {
        match_regex: match_regex.to_string(),
        ..DiscoveryConfig::default()
    }
}

#[test]
fn test_mask_to_regex() {
    assert_eq!(mask_to_regex("po/*.po").unwrap(), r"po/(?P<language>[^/]*)\.po");
    assert_eq!(
        mask_to_regex("*/LC_MESSAGES/*.po").unwrap(),
        r"(?P<language>[^/]*)/LC_MESSAGES/(?P=language)\.po"
    );
    assert!(matches!(
        mask_to_regex("po/de.po"),
        Err(ValidationError::InvalidMask { .. })
    ));
}

#[test]
fn test_matcher_requires_language_group() {
    let err = MaskMatcher::new(r"po/(?P<lang>[^/]*)\.po", "^[^.]+$").unwrap_err();
    assert!(matches!(err, ValidationError::MissingLanguageGroup { .. }));

    let err = MaskMatcher::new(r"po/(?P<language>[^/]*\.po", "^[^.]+$").unwrap_err();
    assert!(matches!(err, ValidationError::InvalidRegex { .. }));
}

#[test]
fn test_match_path_replaces_repeated_language() {
    let matcher = MaskMatcher::for_mask("locale/*/LC_MESSAGES/*.po", "^[^.]+$").unwrap();

    let found = matcher.match_path("locale/de/LC_MESSAGES/de.po").unwrap();
    assert_eq!(found.language, "de");
    assert_eq!(found.mask, "locale/*/LC_MESSAGES/*.po");
    assert!(found.groups.is_empty());

    assert!(matcher.match_path("locale/de/LC_MESSAGES/cs.po").is_none());
}

#[test]
fn test_match_path_filters_language() {
    let matcher = MaskMatcher::for_mask("po/*.po", "^[^.]+$").unwrap();
    assert!(matcher.match_path("po/de.po").is_some());
    // "de.old" fails the filter, it is skipped rather than reported
    assert!(matcher.match_path("po/de.old.po").is_none());
}

#[test]
fn test_get_mask_matches_with_named_groups() {
    let temp = temp_dir();
    touch(temp.path(), "po/core/de.po");
    touch(temp.path(), "po/core/cs.po");
    touch(temp.path(), "po/docs/de.po");
    touch(temp.path(), "po/README");

    let matches = get_mask_matches(
        temp.path(),
        r"po/(?P<component>[^/]*)/(?P<language>[^/.]*)\.po",
        "^[^.]+$",
    )
    .unwrap();

    let summary: Vec<(&str, &str, &str)> = matches
        .iter()
        .map(|m| (m.path.as_str(), m.language.as_str(), m.mask.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("po/core/cs.po", "cs", "po/core/*.po"),
            ("po/core/de.po", "de", "po/core/*.po"),
            ("po/docs/de.po", "de", "po/docs/*.po"),
        ]
    );
    assert_eq!(matches[0].groups.get("component").map(String::as_str), Some("core"));
}

#[test]
fn test_matched_components_single_group() {
    let temp = temp_dir();
    touch(temp.path(), "po/cs.po");
    touch(temp.path(), "po/de.po");

    let components = matched_components(temp.path(), &config(&mask_to_regex("po/*.po").unwrap())).unwrap();

    assert_eq!(components.len(), 1);
    assert_eq!(components[0].mask, "po/*.po");
    assert_eq!(
        components[0].languages,
        BTreeSet::from(["cs".to_string(), "de".to_string()])
    );
    assert_eq!(components[0].files, vec!["po/cs.po", "po/de.po"]);
}

#[test]
fn test_matched_components_render_templates() {
    let temp = temp_dir();
    touch(temp.path(), "po/core/de.po");
    touch(temp.path(), "po/core/core.pot");

    let components = matched_components(
        temp.path(),
        &DiscoveryConfig {
            match_regex: r"po/(?P<component>[^/]*)/(?P<language>[^/.]*)\.po".to_string(),
            name_template: "{{ component|title }} messages".to_string(),
            new_base_template: "po/{{ component }}/{{ component }}.pot".to_string(),
            ..DiscoveryConfig::default()
        },
    )
    .unwrap();

    assert_eq!(components[0].name, "Core messages");
    assert_eq!(components[0].slug, "core-messages");
    assert_eq!(components[0].new_base, "po/core/core.pot");
}

#[test]
fn test_discover_dedups_and_skips() {
    let temp = temp_dir();
    touch(temp.path(), "po/core/de.po");
    touch(temp.path(), "po/docs/de.po");
    touch(temp.path(), "po/web/de.po");
    touch(temp.path(), "po/core/core.pot");
    touch(temp.path(), "po/web/web.pot");

    let config = DiscoveryConfig {
        match_regex: r"po/(?P<component>[^/]*)/(?P<language>[^/.]*)\.po".to_string(),
        new_base_template: "po/{{ component }}/{{ component }}.pot".to_string(),
        ..DiscoveryConfig::default()
    };
    let existing = vec![
        KnownComponent {
            name: "core".to_string(),
            slug: "core".to_string(),
            filemask: "src/*.po".to_string(),
        },
        KnownComponent {
            name: "Web".to_string(),
            slug: "web-app".to_string(),
            filemask: "po/web/*.po".to_string(),
        },
    ];

    let result = discover(temp.path(), &config, &existing).unwrap();

    let created: Vec<(&str, &str)> = result
        .created
        .iter()
        .map(|c| (c.name.as_str(), c.slug.as_str()))
        .collect();
    assert_eq!(created, vec![("core 2", "core-2")]);
    assert_eq!(result.matched.len(), 1);
    assert_eq!(result.matched[0].mask, "po/web/*.po");

    assert_eq!(result.skipped.len(), 1);
    insta::assert_snapshot!(result.skipped[0].1, @"New base file po/docs/docs.pot does not exist");
}

#[cfg(unix)]
#[test]
fn test_symlink_aliases_are_excluded() {
    let temp = temp_dir();
    touch(temp.path(), "po/de.po");
    std::os::unix::fs::symlink(temp.path().join("po/de.po"), temp.path().join("po/de_DE.po")).unwrap();

    let outside = temp_dir();
    touch(outside.path(), "cs.po");
    std::os::unix::fs::symlink(outside.path().join("cs.po"), temp.path().join("po/cs.po")).unwrap();

    let matches = mask_matches(temp.path(), "po/*.po", "^[^.]+$").unwrap();
    let paths: Vec<&str> = matches.iter().map(|m| m.path.as_str()).collect();
    assert_eq!(paths, vec!["po/de.po"]);
}

#[test]
fn test_missing_root() {
    let temp = temp_dir();
    let err = mask_matches(&temp.path().join("missing"), "po/*.po", ".*").unwrap_err();
    assert!(matches!(err, SyncError::Fs(_)));
}
