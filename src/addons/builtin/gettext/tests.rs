// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::*;

fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

fn codes(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|c| (*c).to_string()).collect()
}

#[test]
fn test_update_linguas_one_per_line() {
    let (changed, updated) = update_linguas(lines("# Languages\ncs\nfr\n"), &codes(&["cs", "de"]));
    assert!(changed);
    assert_eq!(updated, lines("# Languages\ncs\nde"));

    let (changed, again) = update_linguas(updated.clone(), &codes(&["cs", "de"]));
    assert!(!changed);
    assert_eq!(again, updated);
}

#[test]
fn test_update_linguas_single_line() {
    let (changed, updated) = update_linguas(lines("cs fr # all\n"), &codes(&["cs", "de", "fr"]));
    assert!(changed);
    assert_eq!(updated, lines("cs de fr"));

    let (changed, _) = update_linguas(updated, &codes(&["cs", "de", "fr"]));
    assert!(!changed);
}

#[test]
fn test_update_linguas_empty_file() {
    let (changed, updated) = update_linguas(Vec::new(), &codes(&["pt_BR", "de"]));
    assert!(changed);
    assert_eq!(updated, lines("de\npt_BR"));
}

#[test]
fn test_mo_path() {
    let translation = Translation {
        id: 1,
        component_id: 1,
        language_code: "de".to_string(),
        filename: "po/de.po".to_string(),
        plural_count: 2,
        revision: String::new(),
        is_source: false,
    };
    let addon = MoAddon {
        config: MoConfig::default(),
    };
    assert_eq!(addon.mo_path(&translation), "po/de.mo");

    let addon = MoAddon {
        config: MoConfig {
            path: "locale/{{ language_code }}/LC_MESSAGES/app.mo".to_string(),
        },
    };
    assert_eq!(addon.mo_path(&translation), "locale/de/LC_MESSAGES/app.mo");
}
