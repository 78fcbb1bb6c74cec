// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::*;
use chrono::{TimeZone, Utc};

fn commit(rev: &str, email: &str) -> RevisionInfo {
    RevisionInfo {
        revision: rev.to_string(),
        author_name: email.split('@').next().unwrap().to_string(),
        author_email: email.to_string(),
        author_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        summary: format!("msg {rev}"),
        message: format!("msg {rev}"),
    }
}

fn revisions(groups: &[Group]) -> Vec<Vec<&str>> {
    groups
        .iter()
        .map(|g| g.commits.iter().map(|c| c.revision.as_str()).collect())
        .collect()
}

#[test]
fn test_group_by_author_keeps_first_appearance() {
    let commits = [
        commit("1", "a@x"),
        commit("2", "b@x"),
        commit("3", "a@x"),
        commit("4", "c@x"),
        commit("5", "b@x"),
    ];
    assert_eq!(
        revisions(&group_by_author(&commits)),
        vec![vec!["1", "3"], vec!["2", "5"], vec!["4"]]
    );
    assert_eq!(
        revisions(&group_adjacent(&commits)),
        vec![vec!["1"], vec!["2"], vec!["3"], vec!["4"], vec!["5"]]
    );
}

#[test]
fn test_co_author_trailers_skip_first_author() {
    let commits = [commit("1", "a@x"), commit("2", "b@x"), commit("3", "b@x")];
    assert_eq!(co_author_trailers(&commits), vec!["Co-authored-by: b <b@x>"]);
}

#[test]
fn test_group_message_deduplicates() {
    let mut second = commit("2", "a@x");
    second.message = "msg 1".to_string();
    let group = Group {
        commits: vec![commit("1", "a@x"), second, commit("3", "a@x")],
    };
    assert_eq!(group.message(), "msg 1\n\nmsg 3");
    assert_eq!(group.author(), "a <a@x>");
}
