// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::*;
use crate::models::Component;

#[test]
fn test_translated_unit_needs_editing() {
    let addon = TargetEditAddon;
    let component = Component::default();

    let mut unit = TranslationUnit::keyed("hello", "Hallo");
    addon.unit_pre_create(&component, &mut unit).expect("hook succeeds");
    assert_eq!(unit.state(), UnitState::NeedsEditing);

    let mut empty = TranslationUnit::keyed("bye", "");
    addon.unit_pre_create(&component, &mut empty).expect("hook succeeds");
    assert_eq!(empty.state(), UnitState::Empty);

    let mut read_only = TranslationUnit {
        read_only: true,
        ..TranslationUnit::keyed("app", "App")
    };
    addon.unit_pre_create(&component, &mut read_only).expect("hook succeeds");
    assert!(!read_only.fuzzy);
}
