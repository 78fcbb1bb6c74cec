// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Starting a translation into a new language.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tracing::{info, warn};

use super::{ComponentHandle, Synchronizer};
use crate::addons::Event;
use crate::db::{self, changes::NewChange};
use crate::error::{FsError, SyncResult, ValidationError};
use crate::formats::{self, HeaderUpdate, language};
use crate::models::{ChangeAction, NewLanguagePolicy, Translation};
use crate::utility::template::render;

/// Header fields written for a language.
pub(super) fn header_update(
    handle: &ComponentHandle,
    code: &str,
    last_translator: Option<String>,
    revision_date: Option<DateTime<Utc>>,
) -> HeaderUpdate {
    HeaderUpdate {
        language: handle.format.language_code(code),
        language_name: language::language_name(code),
        plural_forms: language::lookup(code)
            .map(language::Language::plural_forms)
            .unwrap_or_default(),
        plural_count: language::plural_count(code) as usize,
        last_translator,
        revision_date,
        project: handle.project.name.clone(),
    }
}

impl Synchronizer {
    /// Creates the file of a new language from the base file and commits it.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidLanguageCode`, `NewLanguageDisabled`,
    /// `MissingFile` for a configured base that is gone, `TranslationExists`
    /// when the language or its file is already there, `FormatError` for a
    /// format that cannot start translations, and lock, VCS or store errors.
    /// A failed scan or commit removes the new row and file again.
    pub async fn add_new_language(&self, component_id: i64, code: &str, author: &str) -> SyncResult<Translation> {
        let handle = self.open_id(component_id).await?;
        let component = &handle.component;
        let settings = &component.settings;

        let code = language::normalize_code(code);
        if !language::is_valid_code(&code) {
            return Err(ValidationError::InvalidLanguageCode(code).into());
        }
        if settings.new_lang == NewLanguagePolicy::None {
            return Err(ValidationError::NewLanguageDisabled {
                component: component.full_slug(),
            }
            .into());
        }

        let base = handle.new_base_path();
        if let Some(base) = &base
            && !base.is_file()
        {
            let configured = if handle.monolingual() && component.has_template() {
                ("template", settings.template.clone())
            } else {
                ("new_base", settings.new_base.clone())
            };
            return Err(ValidationError::MissingFile {
                kind: configured.0,
                path: configured.1,
            }
            .into());
        }
        formats::is_valid_base_for_new(handle.format.as_ref(), base.as_deref())?;

        let filename = formats::get_language_filename(&settings.filemask, &handle.format.language_code(&code));
        let path = handle.path(&filename);
        let addons = self.load_addons(&handle).await?;
        let guard = handle.acquire(self.lock_timeout()).await?;
        if db::translations::find(&self.pool, component.id, &code).await?.is_some() || path.exists() {
            return Err(ValidationError::TranslationExists { language: code, path: filename }.into());
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FsError::io(parent, e))?;
        }
        let update = header_update(&handle, &code, None, Some(Utc::now()));
        formats::create_new_file(handle.format.as_ref(), &path, base.as_deref(), &update)?;

        let created = db::translations::create(
            &self.pool,
            component.id,
            &code,
            &filename,
            i64::from(language::plural_count(&code)),
            false,
        )
        .await;
        let translation = match created {
            Ok(translation) => translation,
            Err(e) => {
                discard_file(&path);
                return Err(e);
            }
        };

        let mut context = handle.template_context();
        context.insert("language_code".to_string(), json!(code));
        context.insert("language_name".to_string(), json!(language::language_name(&code)));
        let message = render(&settings.add_message, &Value::Object(context));
        let committed = async {
            let template = self.load_template(&handle);
            self.scan_translation(&handle, &addons, &translation, template.as_ref(), true)
                .await?;
            handle
                .repository
                .commit(&guard, &message, author, Utc::now(), &[filename.clone()])
                .await?;
            db::translations::get(&self.pool, translation.id).await
        }
        .await;
        let translation = match committed {
            Ok(translation) => translation,
            Err(e) => {
                warn!(component = %component.full_slug(), language = %code, error = %e, "adding language failed, rolling back");
                if let Err(cleanup) = db::translations::delete(&self.pool, translation.id).await {
                    warn!(language = %code, error = %cleanup, "failed to remove translation row");
                }
                if let Err(cleanup) = handle.repository.forget(&guard, &[filename.clone()]).await {
                    warn!(file = %filename, error = %cleanup, "failed to unstage new language file");
                }
                discard_file(&path);
                return Err(e);
            }
        };

        db::changes::record(
            &self.pool,
            &NewChange::component(ChangeAction::NewTranslation, component.id)
                .with_translation(translation.id)
                .with_author(author)
                .with_details(json!({ "language": code, "filename": filename })),
        )
        .await?;
        info!(component = %component.full_slug(), language = %code, file = %filename, "language added");

        self.fire(&handle, &guard, &addons, Event::PostAdd { translation: &translation })
            .await?;
        let origin = &handle.origin;
        if origin.settings.push_on_commit && origin.can_push() {
            let pushed = if handle.is_linked() {
                let origin_handle = self.open(origin).await?;
                let origin_addons = self.load_addons(&origin_handle).await?;
                self.push_locked(&origin_handle, &guard, &origin_addons).await
            } else {
                self.push_locked(&handle, &guard, &addons).await
            };
            if let Err(e) = pushed {
                warn!(component = %origin.full_slug(), error = %e, "push after adding language failed");
            }
        }
        Ok(translation)
    }
}

fn discard_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "failed to remove new language file");
    }
}
