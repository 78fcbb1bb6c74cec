// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Translation file discovery.
//!
//! ```text
//! match regex  ^po/(?P<component>[^/]*)/(?P<language>[^/]*)\.po$
//!                  |
//! get_mask_matches(root)           walk checkout, match relative paths,
//!   po/core/de.po  --> mask po/core/*.po   filter language, drop symlink
//!   po/core/cs.po  --> mask po/core/*.po   aliases and escapes from root
//!                  |
//! matched_components()   group by mask, render name/slug/base templates
//!                  |
//! discover(existing)     dedup names and slugs, skip groups whose base
//!                        files are missing
//! ```
//!
//! The regex engine has no backreferences, so `(?P=language)` is rewritten
//! into a numbered group that must capture the same text as `language`.

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{SyncResult, ValidationError};
use crate::utility::fs::walk::{WalkOptions, parallel_walk};
use crate::utility::template::{render, slugify};

const LANGUAGE: &str = "language";
const BACKREF: &str = "(?P=language)";
const BACKREF_PREFIX: &str = "__language_repeat_";

/// Compiled discovery pattern.
#[derive(Debug, Clone)]
pub struct MaskMatcher {
    regex: Regex,
    repeats: Vec<String>,
    language_filter: Regex,
}

impl MaskMatcher {
    /// Compiles a match regex and a language filter.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidRegex` for a pattern that does not
    /// compile and `MissingLanguageGroup` without a `language` group.
    pub fn new(match_regex: &str, language_regex: &str) -> Result<Self, ValidationError> {
        let mut rewritten = String::with_capacity(match_regex.len());
        let mut repeats = Vec::new();
        for (index, part) in match_regex.split(BACKREF).enumerate() {
            if index > 0 {
                let name = format!("{BACKREF_PREFIX}{index}");
                rewritten.push_str(&format!("(?P<{name}>[^/]*?)"));
                repeats.push(name);
            }
            rewritten.push_str(part);
        }

        let regex = compile(&format!("^(?:{rewritten})$"), match_regex)?;
        if !regex.capture_names().flatten().any(|name| name == LANGUAGE) {
            return Err(ValidationError::MissingLanguageGroup {
                pattern: match_regex.to_string(),
            });
        }
        let language_filter = compile(language_regex, language_regex)?;
        Ok(Self {
            regex,
            repeats,
            language_filter,
        })
    }

    /// Matcher for a component file mask such as `po/*.po`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidMask` for a mask without `*`, or the
    /// errors of [`MaskMatcher::new`].
    pub fn for_mask(mask: &str, language_regex: &str) -> Result<Self, ValidationError> {
        Self::new(&mask_to_regex(mask)?, language_regex)
    }

    /// Matches one relative path.
    #[must_use]
    pub fn match_path(&self, relative: &str) -> Option<MaskMatch> {
        let caps = self.regex.captures(relative)?;
        let language = caps.name(LANGUAGE)?;
        let mut spans = vec![language.range()];
        for name in &self.repeats {
            let repeat = caps.name(name)?;
            if repeat.as_str() != language.as_str() {
                return None;
            }
            spans.push(repeat.range());
        }

        if !self.language_filter.is_match(language.as_str()) {
            debug!(path = relative, language = language.as_str(), "skipping language by filter");
            return None;
        }

        spans.sort_by_key(|range| std::cmp::Reverse(range.start));
        let mut mask = relative.to_string();
        for range in spans {
            mask.replace_range(range, "*");
        }

        let groups = self
            .regex
            .capture_names()
            .flatten()
            .filter(|name| *name != LANGUAGE && !name.starts_with(BACKREF_PREFIX))
            .filter_map(|name| Some((name.to_string(), caps.name(name)?.as_str().to_string())))
            .collect();

        Some(MaskMatch {
            path: relative.to_string(),
            language: language.as_str().to_string(),
            groups,
            mask,
        })
    }
}

fn compile(pattern: &str, original: &str) -> Result<Regex, ValidationError> {
    Regex::new(pattern).map_err(|e| ValidationError::InvalidRegex {
        pattern: original.to_string(),
        message: e.to_string(),
    })
}

/// Converts a file mask to a match regex.
///
/// The first `*` becomes the `language` group, later ones must repeat it.
///
/// # Errors
///
/// Returns `ValidationError::InvalidMask` if the mask has no `*`.
pub fn mask_to_regex(mask: &str) -> Result<String, ValidationError> {
    if !mask.contains('*') {
        return Err(ValidationError::InvalidMask {
            mask: mask.to_string(),
        });
    }
    let mut out = String::with_capacity(mask.len() * 2);
    for (index, part) in mask.split('*').enumerate() {
        if index == 1 {
            out.push_str("(?P<language>[^/]*)");
        } else if index > 1 {
            out.push_str(BACKREF);
        }
        out.push_str(&regex::escape(part));
    }
    Ok(out)
}

/// One file matched by a discovery pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaskMatch {
    /// Path relative to the root, `/`-separated.
    pub path: String,
    /// Captured language code, as spelled in the path.
    pub language: String,
    /// Named groups other than `language`.
    pub groups: BTreeMap<String, String>,
    /// Path with every language span replaced by `*`.
    pub mask: String,
}

/// Files below `root` matching `match_regex`.
///
/// Symlinks are followed; a link resolving outside the root, or to a file
/// that is itself part of the result, is left out.
///
/// # Errors
///
/// Returns validation errors for the patterns and `FsError::NotFound` for a
/// missing root.
pub fn get_mask_matches(
    root: &Path,
    match_regex: &str,
    language_regex: &str,
) -> SyncResult<Vec<MaskMatch>> {
    let matcher = MaskMatcher::new(match_regex, language_regex)?;
    matches_with(root, &matcher)
}

/// Files of a component file mask.
///
/// # Errors
///
/// See [`get_mask_matches`].
pub fn mask_matches(root: &Path, mask: &str, language_regex: &str) -> SyncResult<Vec<MaskMatch>> {
    let matcher = MaskMatcher::for_mask(mask, language_regex)?;
    matches_with(root, &matcher)
}

fn matches_with(root: &Path, matcher: &MaskMatcher) -> SyncResult<Vec<MaskMatch>> {
    let entries = parallel_walk(root, &WalkOptions::for_checkout())?;
    let canonical_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

    let mut direct: Vec<(MaskMatch, PathBuf)> = Vec::new();
    let mut aliases: Vec<(MaskMatch, PathBuf)> = Vec::new();
    for entry in entries {
        let Some(found) = matcher.match_path(&entry.relative) else {
            continue;
        };
        let Ok(resolved) = entry.path.canonicalize() else {
            trace!(path = %entry.path.display(), "skipping dangling path");
            continue;
        };
        if !resolved.starts_with(&canonical_root) {
            debug!(path = %found.path, "skipping path resolving outside the checkout");
            continue;
        }
        if resolved == canonical_root.join(&entry.relative) {
            direct.push((found, resolved));
        } else {
            aliases.push((found, resolved));
        }
    }

    let mut seen: HashSet<PathBuf> = direct.iter().map(|(_, resolved)| resolved.clone()).collect();
    let mut result: Vec<MaskMatch> = direct.into_iter().map(|(found, _)| found).collect();
    for (found, resolved) in aliases {
        if seen.insert(resolved) {
            result.push(found);
        } else {
            debug!(path = %found.path, "skipping symlink to an already matched file");
        }
    }
    result.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(result)
}

/// What a discovery run looks for and how it names the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Regex with a `language` group, matched against relative paths.
    pub match_regex: String,
    /// Template of the component name.
    pub name_template: String,
    /// Template of the monolingual base file, empty for none.
    pub base_file_template: String,
    /// Template of the base for new translations, empty for none.
    pub new_base_template: String,
    /// Template of the intermediate language file, empty for none.
    pub intermediate_template: String,
    /// File format of discovered components.
    pub file_format: String,
    /// Languages to include.
    pub language_regex: String,
    /// Delete linked components once no file matches their mask.
    pub remove: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            match_regex: String::new(),
            name_template: "{{ component }}".to_string(),
            base_file_template: String::new(),
            new_base_template: String::new(),
            intermediate_template: String::new(),
            file_format: "po".to_string(),
            language_regex: "^[^.]+$".to_string(),
            remove: false,
        }
    }
}

/// Files sharing one mask: a candidate component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredComponent {
    pub mask: String,
    pub name: String,
    pub slug: String,
    pub languages: BTreeSet<String>,
    pub files: Vec<String>,
    pub groups: BTreeMap<String, String>,
    pub base_file: String,
    pub new_base: String,
    pub intermediate: String,
}

impl DiscoveredComponent {
    fn context(&self) -> Value {
        let mut map: Map<String, Value> = self
            .groups
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        map.insert("mask".to_string(), Value::String(self.mask.clone()));
        Value::Object(map)
    }
}

/// Groups the matches below `root` by mask.
///
/// # Errors
///
/// See [`get_mask_matches`].
pub fn matched_components(root: &Path, config: &DiscoveryConfig) -> SyncResult<Vec<DiscoveredComponent>> {
    let matches = get_mask_matches(root, &config.match_regex, &config.language_regex)?;

    let mut grouped: BTreeMap<String, DiscoveredComponent> = BTreeMap::new();
    for found in matches {
        let entry = grouped
            .entry(found.mask.clone())
            .or_insert_with(|| DiscoveredComponent {
                mask: found.mask.clone(),
                name: String::new(),
                slug: String::new(),
                languages: BTreeSet::new(),
                files: Vec::new(),
                groups: found.groups.clone(),
                base_file: String::new(),
                new_base: String::new(),
                intermediate: String::new(),
            });
        entry.languages.insert(found.language);
        entry.files.push(found.path);
    }

    Ok(grouped
        .into_values()
        .map(|mut component| {
            let context = component.context();
            let rendered = render(&config.name_template, &context);
            component.name = if rendered.trim().is_empty() {
                component.mask.clone()
            } else {
                rendered.trim().to_string()
            };
            component.slug = slugify(&component.name);
            component.base_file = render(&config.base_file_template, &context);
            component.new_base = render(&config.new_base_template, &context);
            component.intermediate = render(&config.intermediate_template, &context);
            component
        })
        .collect())
}

/// An existing component, as far as discovery is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownComponent {
    pub name: String,
    pub slug: String,
    pub filemask: String,
}

/// Outcome of a discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryResult {
    /// New components to create.
    pub created: Vec<DiscoveredComponent>,
    /// Groups already covered by an existing component.
    pub matched: Vec<DiscoveredComponent>,
    /// Groups that cannot become components, with the reason.
    pub skipped: Vec<(DiscoveredComponent, String)>,
}

/// Plans components for the matches below `root`.
///
/// # Errors
///
/// See [`get_mask_matches`].
pub fn discover(
    root: &Path,
    config: &DiscoveryConfig,
    existing: &[KnownComponent],
) -> SyncResult<DiscoveryResult> {
    let mut result = DiscoveryResult::default();
    let mut names: HashSet<String> = existing.iter().map(|c| c.name.clone()).collect();
    let mut slugs: HashSet<String> = existing.iter().map(|c| c.slug.clone()).collect();

    for mut component in matched_components(root, config)? {
        if existing.iter().any(|known| known.filemask == component.mask) {
            result.matched.push(component);
            continue;
        }
        if let Some(reason) = missing_file_reason(root, &component) {
            debug!(mask = %component.mask, reason = %reason, "skipping discovered component");
            result.skipped.push((component, reason));
            continue;
        }

        let (name, slug) = (component.name.clone(), component.slug.clone());
        let mut suffix = 1;
        while names.contains(&component.name) || slugs.contains(&component.slug) {
            suffix += 1;
            component.name = format!("{name} {suffix}");
            component.slug = format!("{slug}-{suffix}");
        }
        names.insert(component.name.clone());
        slugs.insert(component.slug.clone());
        result.created.push(component);
    }
    Ok(result)
}

fn missing_file_reason(root: &Path, component: &DiscoveredComponent) -> Option<String> {
    [
        ("Base file", &component.base_file),
        ("New base file", &component.new_base),
        ("Intermediate language file", &component.intermediate),
    ]
    .into_iter()
    .find(|(_, file)| !file.is_empty() && !root.join(file).is_file())
    .map(|(kind, file)| format!("{kind} {file} does not exist"))
}
