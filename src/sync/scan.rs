// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reading the checkout into the database.

use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

use super::{ComponentHandle, Synchronizer};
use crate::addons::{ActiveAddons, Event};
use crate::db::{self, changes::NewChange, units::UnitData};
use crate::discovery::mask_matches;
use crate::error::{FsError, SyncResult, ValidationError};
use crate::formats::{self, TranslationUnit, language};
use crate::models::{AlertKind, ChangeAction, Translation, content_revision};
use crate::vcs::RepositoryLockGuard;

/// Counts of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Files parsed and stored.
    pub parsed: usize,
    /// Files skipped because their content did not change.
    pub skipped: usize,
    /// Translations seen for the first time.
    pub created: usize,
    /// Translations whose file disappeared.
    pub removed: usize,
    /// Files that failed to parse.
    pub errors: usize,
}

impl ScanReport {
    pub fn merge(&mut self, other: Self) {
        self.parsed += other.parsed;
        self.skipped += other.skipped;
        self.created += other.created;
        self.removed += other.removed;
        self.errors += other.errors;
    }
}

/// Keys of a monolingual template in file order, with their source text.
#[derive(Debug, Default)]
pub(super) struct TemplateSource {
    keys: Vec<String>,
    sources: HashMap<String, String>,
}

impl TemplateSource {
    fn from_units(units: &[TranslationUnit]) -> Self {
        let mut template = Self::default();
        for unit in units {
            if template
                .sources
                .insert(unit.key().to_string(), unit.target.clone())
                .is_none()
            {
                template.keys.push(unit.key().to_string());
            }
        }
        template
    }
}

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FileScan {
    Parsed,
    Unchanged,
    Failed,
}

impl Synchronizer {
    /// Scans the checkout of a component under its lock.
    ///
    /// With `force` every file is parsed even if its content is unchanged.
    ///
    /// # Errors
    ///
    /// Returns lock and store errors, or `ValidationError::MissingFile` when
    /// the template of a monolingual component is gone. Parse failures are
    /// alerts and do not fail the scan.
    pub async fn create_translations(&self, component_id: i64, force: bool) -> SyncResult<ScanReport> {
        let handle = self.open_id(component_id).await?;
        let addons = self.load_addons(&handle).await?;
        let guard = handle.acquire(self.lock_timeout()).await?;
        self.scan_locked(&handle, &guard, &addons, force).await
    }

    /// Parses the template of a monolingual component.
    ///
    /// An unparseable template yields `None`; its parse error is reported
    /// when the template is scanned as the source translation.
    pub(super) fn load_template(&self, handle: &ComponentHandle) -> Option<TemplateSource> {
        if !handle.monolingual() {
            return None;
        }
        let path = handle.template_path()?;
        match formats::load(handle.format.as_ref(), &path) {
            Ok(loaded) => Some(TemplateSource::from_units(&loaded.store.units)),
            Err(e) => {
                warn!(template = %path.display(), error = %e, "failed to load template");
                None
            }
        }
    }

    /// Checks that the configured template and base file exist.
    async fn check_base_files(&self, handle: &ComponentHandle) -> SyncResult<()> {
        let component = &handle.component;
        let settings = &component.settings;
        if handle.monolingual()
            && let Some(template) = handle.template_path()
            && !template.is_file()
        {
            self.raise_alert(
                component,
                None,
                AlertKind::MissingBase,
                json!({ "kind": "template", "file": settings.template }),
            )
            .await?;
            return Err(ValidationError::MissingFile {
                kind: "template",
                path: settings.template.clone(),
            }
            .into());
        }
        if let Some(base) = handle.optional_path(&settings.new_base)
            && !base.is_file()
        {
            self.raise_alert(
                component,
                None,
                AlertKind::MissingBase,
                json!({ "kind": "new_base", "file": settings.new_base }),
            )
            .await?;
            return Ok(());
        }
        self.clear_alerts(component, &[AlertKind::MissingBase]).await
    }

    /// Language code and file of every translation in the checkout.
    ///
    /// A language matched by several files keeps the first path and raises a
    /// `duplicate-language` alert.
    async fn discover_files(&self, handle: &ComponentHandle) -> SyncResult<BTreeMap<String, (String, bool)>> {
        let component = &handle.component;
        let settings = &component.settings;
        let mut files: BTreeMap<String, (String, bool)> = BTreeMap::new();
        let mut duplicates: BTreeMap<String, Vec<String>> = BTreeMap::new();

        let template = (handle.monolingual() && component.has_template()).then_some(settings.template.as_str());
        if let Some(template) = template {
            let code = language::normalize_code(&settings.source_language);
            files.insert(code, (template.to_string(), true));
        }

        let mut matches = mask_matches(&handle.checkout, &settings.filemask, &settings.language_regex)?;
        matches.sort_by(|a, b| a.path.cmp(&b.path));
        for found in matches {
            if Some(found.path.as_str()) == template {
                continue;
            }
            let code = language::normalize_code(&handle.format.parse_language_code(&found.language));
            if code.is_empty() {
                debug!(path = %found.path, "no language code in path, skipping");
                continue;
            }
            match files.get(&code) {
                Some((kept, _)) => duplicates
                    .entry(code)
                    .or_insert_with(|| vec![kept.clone()])
                    .push(found.path),
                None => {
                    files.insert(code, (found.path, false));
                }
            }
        }

        if duplicates.is_empty() {
            self.clear_alerts(component, &[AlertKind::DuplicateLanguage]).await?;
        } else {
            self.raise_alert(
                component,
                None,
                AlertKind::DuplicateLanguage,
                json!({ "duplicates": duplicates }),
            )
            .await?;
        }
        Ok(files)
    }

    /// Scans the files of a component; the caller holds the checkout lock.
    ///
    /// Dispatches `COMPONENT_UPDATE` to the component's addons when done.
    pub(super) async fn scan_locked(
        &self,
        handle: &ComponentHandle,
        guard: &RepositoryLockGuard,
        addons: &ActiveAddons,
        force: bool,
    ) -> SyncResult<ScanReport> {
        let component = &handle.component;
        if !handle.checkout.is_dir() {
            return Err(FsError::NotFound(handle.checkout.display().to_string()).into());
        }
        self.check_base_files(handle).await?;
        let files = self.discover_files(handle).await?;
        let template = self.load_template(handle);

        let mut report = ScanReport::default();
        let mut kept = HashSet::new();
        for (code, (filename, is_source)) in files {
            let translation = match db::translations::find(&self.pool, component.id, &code).await? {
                Some(existing) if existing.filename == filename && existing.is_source == is_source => existing,
                existing => {
                    if let Some(stale) = existing {
                        db::translations::delete(&self.pool, stale.id).await?;
                    }
                    report.created += 1;
                    db::translations::create(
                        &self.pool,
                        component.id,
                        &code,
                        &filename,
                        i64::from(language::plural_count(&code)),
                        is_source,
                    )
                    .await?
                }
            };
            kept.insert(translation.id);
            match self
                .scan_translation(handle, addons, &translation, template.as_ref(), force)
                .await?
            {
                FileScan::Parsed => report.parsed += 1,
                FileScan::Unchanged => report.skipped += 1,
                FileScan::Failed => report.errors += 1,
            }
        }

        for translation in db::translations::list_for_component(&self.pool, component.id).await? {
            if kept.contains(&translation.id) {
                continue;
            }
            db::translations::delete(&self.pool, translation.id).await?;
            db::changes::record(
                &self.pool,
                &NewChange::component(ChangeAction::RemoveTranslation, component.id).with_details(json!({
                    "language": translation.language_code,
                    "filename": translation.filename,
                })),
            )
            .await?;
            info!(component = %component.full_slug(), language = %translation.language_code, "translation removed");
            report.removed += 1;
        }

        if addons.handles(Event::ComponentUpdate.kind()) {
            let ctx = self.context(handle, guard);
            addons.dispatch(&ctx, Event::ComponentUpdate).await;
            let ignored = ctx.take_scan_requests();
            if !ignored.is_empty() {
                debug!(component = %component.full_slug(), requests = ignored.len(), "scan requests during a scan ignored");
            }
        }

        info!(
            component = %component.full_slug(),
            parsed = report.parsed,
            skipped = report.skipped,
            created = report.created,
            removed = report.removed,
            errors = report.errors,
            "component scanned"
        );
        Ok(report)
    }

    /// Parses one translation file and reconciles its units.
    pub(super) async fn scan_translation(
        &self,
        handle: &ComponentHandle,
        addons: &ActiveAddons,
        translation: &Translation,
        template: Option<&TemplateSource>,
        force: bool,
    ) -> SyncResult<FileScan> {
        let component = &handle.component;
        let path = handle.path(&translation.filename);
        let bytes = std::fs::read(&path).map_err(|e| FsError::io(&path, e))?;
        if !force && content_revision(&bytes) == translation.revision {
            debug!(file = %translation.filename, "unchanged, skipping");
            return Ok(FileScan::Unchanged);
        }

        let loaded = match formats::load(handle.format.as_ref(), &path) {
            Ok(loaded) => loaded,
            Err(e) if e.is_parse_error() => {
                self.raise_alert(
                    component,
                    Some(translation.id),
                    AlertKind::ParseError,
                    json!({ "file": translation.filename, "error": e.to_string() }),
                )
                .await?;
                return Ok(FileScan::Failed);
            }
            Err(e) => return Err(e),
        };
        db::alerts::clear(&self.pool, component.id, Some(translation.id), AlertKind::ParseError).await?;

        let mut store = loaded.store;
        addons
            .store_post_load(&self.pool, component, translation, &mut store)
            .await;

        let monolingual = handle.monolingual();
        let known: HashSet<i64> = db::units::list_for_translation(&self.pool, translation.id)
            .await?
            .into_iter()
            .map(|unit| unit.id_hash)
            .collect();

        let mut units = store.units;
        if let Some(template) = template.filter(|_| !translation.is_source) {
            let present: HashSet<String> = units.iter().map(|unit| unit.key().to_string()).collect();
            units.retain(|unit| template.sources.contains_key(unit.key()));
            for key in template.keys.iter().filter(|key| !present.contains(*key)) {
                units.push(TranslationUnit::keyed(key.clone(), ""));
            }
            for unit in &mut units {
                if let Some(source) = template.sources.get(unit.key()) {
                    unit.source.clone_from(source);
                }
            }
        } else if monolingual {
            for unit in &mut units {
                unit.source.clone_from(&unit.target);
            }
        }

        let mut rows = Vec::with_capacity(units.len());
        for (position, mut unit) in units.into_iter().enumerate() {
            let id_hash = unit.id_hash(monolingual);
            if !known.contains(&id_hash) {
                addons.unit_pre_create(&self.pool, component, &mut unit).await;
            }
            let state = unit.state();
            rows.push(UnitData {
                id_hash,
                state,
                flags: unit.flags.join(", "),
                context: unit.context,
                source: unit.source,
                target: unit.target,
                explanation: unit.explanation,
                position: i64::try_from(position).unwrap_or(i64::MAX),
            });
        }

        let mut tx = self.pool.begin().await?;
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            seen.insert(db::units::upsert_from_file(&mut *tx, translation.id, row).await?);
        }
        let deleted = db::units::delete_missing(&mut *tx, translation.id, &seen).await?;
        tx.commit().await?;

        let plural_count = i64::from(language::plural_count(&translation.language_code));
        db::translations::update_revision(&self.pool, translation.id, &loaded.revision, plural_count).await?;
        debug!(
            file = %translation.filename,
            units = rows.len(),
            deleted,
            "translation parsed"
        );
        Ok(FileScan::Parsed)
    }
}
