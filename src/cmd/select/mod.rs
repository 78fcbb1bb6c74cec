// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Component selection by slug, glob or alias.
//!
//! ```text
//! input ["web", "demo/*"]
//!   resolve_aliases: "web"    --> [demo/frontend, docs/site]
//!   match_pattern:   "demo/*" --> [demo/core, demo/frontend]
//!   dedupe + preserve order
//! ```

use std::collections::BTreeSet;

use anyhow::Context;
use wax::{Glob, Program};

use crate::config::types::Aliases;
use crate::error::Result;

/// Resolves command-line component arguments to full slugs.
pub struct ComponentSelector {
    /// Known `project/slug` names.
    slugs: BTreeSet<String>,

    aliases: Aliases,
}

impl ComponentSelector {
    #[must_use]
    pub const fn new(aliases: Aliases) -> Self {
        Self {
            slugs: BTreeSet::new(),
            aliases,
        }
    }

    pub fn register_all(&mut self, slugs: impl IntoIterator<Item = impl Into<String>>) {
        for slug in slugs {
            self.slugs.insert(slug.into());
        }
    }

    #[must_use]
    pub const fn all(&self) -> &BTreeSet<String> {
        &self.slugs
    }

    /// Expands aliases, recursively; other arguments are kept as-is.
    #[must_use]
    pub fn resolve_aliases(&self, patterns: &[String]) -> Vec<String> {
        let mut result = Vec::new();
        for pattern in patterns {
            if let Some(targets) = self.aliases.get(pattern) {
                result.extend(self.resolve_aliases(targets));
            } else {
                result.push(pattern.clone());
            }
        }
        result
    }

    /// Known slugs matching a glob; an exact slug matches itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid glob.
    pub fn match_pattern(&self, pattern: &str) -> Result<Vec<String>> {
        if self.slugs.contains(pattern) {
            return Ok(vec![pattern.to_string()]);
        }

        let glob =
            Glob::new(pattern).with_context(|| format!("Invalid component pattern: {pattern}"))?;

        Ok(self
            .slugs
            .iter()
            .filter(|slug| glob.is_match(slug.as_str()))
            .cloned()
            .collect())
    }

    /// Resolves arguments to distinct slugs in argument order.
    ///
    /// No arguments select every known component.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid glob, or when nothing matched.
    pub fn resolve(&self, specs: &[String]) -> Result<Vec<String>> {
        if specs.is_empty() {
            return Ok(self.slugs.iter().cloned().collect());
        }

        let expanded = self.resolve_aliases(specs);
        let mut result = Vec::new();
        let mut seen = BTreeSet::new();

        for pattern in &expanded {
            let matches = self.match_pattern(pattern)?;
            if matches.is_empty() {
                tracing::warn!(pattern = %pattern, "Pattern matched no components");
            }
            for slug in matches {
                if seen.insert(slug.clone()) {
                    result.push(slug);
                }
            }
        }

        if result.is_empty() {
            anyhow::bail!("no component matches {}", specs.join(", "));
        }
        Ok(result)
    }
}
