// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{
    CommitPolicy, MergeStyle, UnitState, VcsKind, content_revision, id_hash, parse_link,
    validate_slug,
};

#[test]
fn test_enum_text_round_trips_through_from_str() {
    for kind in VcsKind::ALL {
        assert_eq!(kind.as_str().parse::<VcsKind>().unwrap(), *kind);
    }
    for style in MergeStyle::ALL {
        assert_eq!(style.as_str().parse::<MergeStyle>().unwrap(), *style);
    }
    assert_eq!(
        "without-needs-editing".parse::<CommitPolicy>().unwrap(),
        CommitPolicy::WithoutNeedsEditing
    );
}

#[test]
fn test_enum_rejects_unknown_value() {
    let err = "cvs".parse::<VcsKind>().unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid value for 'vcs' in section '[component]': expected one of git, gerrit, github, subversion, local, mercurial, got 'cvs'"
    );
}

#[test]
fn test_unit_state_ordering_and_storage() {
    assert!(UnitState::Empty < UnitState::NeedsEditing);
    assert!(UnitState::Approved < UnitState::ReadOnly);
    assert_eq!(UnitState::from_i64(30), UnitState::Approved);
    assert_eq!(UnitState::from_i64(UnitState::ReadOnly.as_i64()), UnitState::ReadOnly);
    assert_eq!(UnitState::from_file("", true), UnitState::Empty);
    assert_eq!(UnitState::from_file("Hallo", true), UnitState::NeedsEditing);
    assert_eq!(UnitState::from_file("Hallo", false), UnitState::Translated);
}

#[test]
fn test_id_hash_depends_on_context() {
    assert_eq!(id_hash("Hello", ""), id_hash("Hello", ""));
    assert_ne!(id_hash("Hello", ""), id_hash("Hello", "menu"));
    assert_ne!(id_hash("ab", "c"), id_hash("a", "bc"));
}

#[test]
fn test_content_revision_is_hex_sha256() {
    assert_eq!(
        content_revision(b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn test_parse_link() {
    assert_eq!(parse_link("link://demo/core"), Some(("demo", "core")));
    assert_eq!(parse_link("link://demo"), None);
    assert_eq!(parse_link("link://demo/a/b"), None);
    assert_eq!(parse_link("https://example.com/repo.git"), None);
}

#[test]
fn test_validate_slug() {
    assert!(validate_slug("projects", "web-ui_2").is_ok());
    assert!(validate_slug("projects", "").is_err());
    assert!(validate_slug("projects", "Web").is_err());
}
