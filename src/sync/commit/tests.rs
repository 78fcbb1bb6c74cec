// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::*;
use chrono::TimeZone;

fn change(id: i64, unit_id: i64, author: &str, second: u32, target: &str) -> PendingUnitChange {
    PendingUnitChange {
        id,
        unit_id,
        author: author.to_string(),
        target: target.to_string(),
        state: UnitState::Translated,
        explanation: String::new(),
        add_unit: false,
        timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, second).unwrap(),
    }
}

#[test]
fn test_latest_per_unit() {
    let latest = latest_per_unit(vec![
        change(3, 1, "b", 5, "second"),
        change(1, 1, "a", 1, "first"),
        change(2, 2, "a", 2, "other"),
    ]);
    let targets: Vec<&str> = latest.iter().map(|c| c.target.as_str()).collect();
    assert_eq!(targets, ["second", "other"]);
}

#[test]
fn test_authors_latest_first() {
    let (author, co_authors) = authors(&[
        change(1, 1, "Ann <ann@example.com>", 1, "x"),
        change(2, 2, "Bob <bob@example.com>", 9, "y"),
        change(3, 3, "Ann <ann@example.com>", 3, "z"),
        change(4, 4, " ", 4, "w"),
    ]);
    assert_eq!(author, "Bob <bob@example.com>");
    assert_eq!(co_authors, ["Ann <ann@example.com>"]);
}
