// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Name to factory table of the known addons.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

use super::{AddonHandler, AddonMetadata, builtin};
use crate::error::AddonError;

/// Builds a handler from its JSON configuration, rejecting invalid ones.
pub type AddonFactory = fn(&Value) -> Result<Box<dyn AddonHandler>, AddonError>;

/// Read-only table of addons, built once at startup.
#[derive(Debug, Default)]
pub struct AddonRegistry {
    addons: BTreeMap<&'static str, (&'static AddonMetadata, AddonFactory)>,
}

impl AddonRegistry {
    /// Registry with every built-in addon.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for &(metadata, factory) in builtin::ALL {
            registry.register(metadata, factory);
        }
        registry
    }

    /// Adds an addon; a later registration under the same name wins.
    pub fn register(&mut self, metadata: &'static AddonMetadata, factory: AddonFactory) {
        self.addons.insert(metadata.name, (metadata, factory));
    }

    /// Metadata of a registered addon.
    ///
    /// # Errors
    ///
    /// Returns `AddonError::UnknownAddon` for an unregistered name.
    pub fn metadata(&self, name: &str) -> Result<&'static AddonMetadata, AddonError> {
        self.addons
            .get(name)
            .map(|(metadata, _)| *metadata)
            .ok_or_else(|| AddonError::UnknownAddon(name.to_string()))
    }

    /// Builds a handler.
    ///
    /// # Errors
    ///
    /// Returns `AddonError::UnknownAddon` or the factory's
    /// `InvalidConfiguration`.
    pub fn create(&self, name: &str, configuration: &Value) -> Result<Box<dyn AddonHandler>, AddonError> {
        let (_, factory) = self
            .addons
            .get(name)
            .ok_or_else(|| AddonError::UnknownAddon(name.to_string()))?;
        factory(configuration)
    }

    /// Registered addons ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &'static AddonMetadata> + '_ {
        self.addons.values().map(|(metadata, _)| *metadata)
    }
}

/// Decodes an addon configuration; `null` yields the default.
///
/// # Errors
///
/// Returns `AddonError::InvalidConfiguration` naming `addon`.
pub fn parse_configuration<T>(addon: &str, configuration: &Value) -> Result<T, AddonError>
where
    T: DeserializeOwned + Default,
{
    if configuration.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(configuration.clone()).map_err(|e| AddonError::InvalidConfiguration {
        addon: addon.to_string(),
        message: e.to_string(),
    })
}
