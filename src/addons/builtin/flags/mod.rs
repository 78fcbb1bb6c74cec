// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Marks new translated units as needing editing.

use serde_json::Value;

use super::{ALL_SCOPES, NoConfig};
use crate::addons::{AddonHandler, AddonMetadata, Compatibility, parse_configuration};
use crate::error::{AddonError, SyncResult};
use crate::formats::TranslationUnit;
use crate::models::{AddonEvent, Component, UnitState};

pub(super) static METADATA: AddonMetadata = AddonMetadata {
    name: "flags.target_edit",
    verbose: "Flag new translations to need edit",
    description: "Whenever a new translatable string is imported from the VCS, it is flagged as needing editing.",
    events: &[AddonEvent::UnitPreCreate],
    compatibility: Compatibility::ANY,
    scopes: ALL_SCOPES,
    multiple: false,
};

#[derive(Debug)]
struct TargetEditAddon;

pub(super) fn create(configuration: &Value) -> Result<Box<dyn AddonHandler>, AddonError> {
    let NoConfig {} = parse_configuration(METADATA.name, configuration)?;
    Ok(Box::new(TargetEditAddon))
}

impl AddonHandler for TargetEditAddon {
    fn metadata(&self) -> &'static AddonMetadata {
        &METADATA
    }

    fn unit_pre_create(&self, _component: &Component, unit: &mut TranslationUnit) -> SyncResult<()> {
        if unit.state() == UnitState::Translated {
            unit.fuzzy = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
