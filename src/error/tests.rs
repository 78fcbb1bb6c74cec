// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{
    ConfigError, FormatError, LockError, SyncError, SyncResult, ValidationError, VcsError,
};

#[test]
fn test_config_error_display() {
    let err = ConfigError::MissingKey {
        section: "paths".to_string(),
        key: "data".to_string(),
    };
    insta::assert_snapshot!(err.to_string(), @"missing required config key 'data' in section '[paths]'");
}

#[test]
fn test_sync_error_size() {
    // Box<str> variants (Other) are 16 bytes (fat pointer: ptr + len)
    // With discriminant + alignment = 24 bytes
    let size = std::mem::size_of::<SyncError>();
    assert!(size <= 24, "SyncError is {size} bytes, expected <= 24");
}

#[test]
fn test_sync_result_size() {
    let size = std::mem::size_of::<SyncResult<()>>();
    assert!(size <= 24, "SyncResult<()> is {size} bytes, expected <= 24");
}

#[test]
fn test_command_failed_prefers_stderr() {
    let err = VcsError::CommandFailed {
        command: "git push origin main".to_string(),
        retcode: 1,
        stdout: "Everything up-to-date\n".to_string(),
        stderr: "remote: rejected\nerror: failed to push some refs\n".to_string(),
    };
    insta::assert_snapshot!(
        err.to_string(),
        @"`git push origin main` exited with code 1: error: failed to push some refs"
    );
}

#[test]
fn test_command_failed_output_joins_streams() {
    let err = VcsError::CommandFailed {
        command: "git merge".to_string(),
        retcode: 1,
        stdout: "CONFLICT (content)\n".to_string(),
        stderr: "Automatic merge failed\n".to_string(),
    };
    assert_eq!(
        err.output().as_deref(),
        Some("CONFLICT (content)\nAutomatic merge failed")
    );
}

#[test]
fn test_lock_timeout_is_detected() {
    let err: SyncError = LockError::Timeout {
        path: "/data/vcs/demo/core.lock".to_string(),
        waited_secs: 120,
    }
    .into();
    assert!(err.is_lock_timeout());
    assert!(!err.is_parse_error());
}

#[test]
fn test_parse_error_is_detected() {
    let err: SyncError = FormatError::parse("po/de.po", "unterminated string").into();
    assert!(err.is_parse_error());
    assert!(!err.is_lock_timeout());
}

#[test]
fn test_validation_error_is_shown_verbatim() {
    let err: SyncError = ValidationError::TranslationExists {
        language: "de".to_string(),
        path: "po/de.po".to_string(),
    }
    .into();
    insta::assert_snapshot!(err.to_string(), @"translation for de already exists at po/de.po");
}
