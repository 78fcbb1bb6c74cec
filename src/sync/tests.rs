// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::testing::{CS_PO, DE_PO, Fixture, PO_COMPONENT, POT, git};
use super::{PushOutcome, UpdateOutcome};
use crate::db::{self, pending::PendingEdit};
use crate::error::{SyncError, ValidationError};
use crate::models::{AlertKind, ChangeAction, Translation, Unit, UnitState};

async fn translation(fx: &Fixture, code: &str) -> Translation {
    db::translations::find(fx.sync.pool(), fx.component.id, code)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("no {code} translation"))
}

async fn unit(fx: &Fixture, code: &str, source: &str) -> Unit {
    let translation = translation(fx, code).await;
    db::units::list_for_translation(fx.sync.pool(), translation.id)
        .await
        .unwrap()
        .into_iter()
        .find(|u| u.source == source || u.context == source)
        .unwrap_or_else(|| panic!("no unit {source} in {code}"))
}

fn edit(author: &str, target: &str) -> PendingEdit {
    PendingEdit::builder()
        .author(author)
        .target(target)
        .state(UnitState::Translated)
        .build()
}

fn validation(err: &SyncError) -> &ValidationError {
    match err {
        SyncError::Validation(e) => e.as_ref(),
        other => panic!("expected a validation error, got {other}"),
    }
}

async fn alert_kinds(fx: &Fixture) -> Vec<AlertKind> {
    db::alerts::list_for_component(fx.sync.pool(), fx.component.id)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.kind)
        .collect()
}

async fn actions(fx: &Fixture) -> Vec<ChangeAction> {
    db::changes::list_for_component(fx.sync.pool(), fx.component.id, 100)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.action)
        .collect()
}

#[tokio::test]
async fn test_setup_scans_translations() {
    let fx = Fixture::po().await;
    let translations = db::translations::list_for_component(fx.sync.pool(), fx.component.id)
        .await
        .unwrap();
    let codes: Vec<&str> = translations.iter().map(|t| t.language_code.as_str()).collect();
    assert_eq!(codes, ["cs", "de"]);
    assert!(translations.iter().all(|t| !t.revision.is_empty()));

    let de = translation(&fx, "de").await;
    let stats = db::units::stats(fx.sync.pool(), de.id).await.unwrap();
    assert_eq!((stats.all, stats.translated), (2, 1));
    assert_eq!(unit(&fx, "de", "Bye").await.target, "Tschüss");
}

#[tokio::test]
async fn test_rescan_skips_unchanged_files() {
    let fx = Fixture::po().await;
    let report = fx.sync.create_translations(fx.component.id, false).await.unwrap();
    assert_eq!((report.parsed, report.skipped), (0, 2));

    let forced = fx.sync.create_translations(fx.component.id, true).await.unwrap();
    assert_eq!((forced.parsed, forced.skipped), (2, 0));
}

#[tokio::test]
async fn test_translate_commit_and_push() {
    let fx = Fixture::po().await;
    let hello = unit(&fx, "de", "Hello").await;
    let updated = fx
        .sync
        .translate(hello.id, "", &edit("Jane Doe <jane@example.com>", "Hallo"))
        .await
        .unwrap();
    assert!(updated.pending);
    assert_eq!(updated.target, "Hallo");

    let report = fx.sync.commit_pending(fx.component.id).await.unwrap();
    assert_eq!((report.translations, report.changes), (1, 1));
    assert!(report.pushed);

    let content = fx.read("po/de.po");
    assert!(content.contains("msgid \"Hello\"\nmsgstr \"Hallo\""), "{content}");
    assert!(content.contains("Last-Translator: Jane Doe <jane@example.com>"), "{content}");
    assert_eq!(fx.upstream_log()[0], "Translated using Transync (German)");
    let author = git(&fx.upstream, &["log", "-1", "--format=%an <%ae>", "main"]);
    assert_eq!(author.trim(), "Jane Doe <jane@example.com>");

    assert_eq!(db::pending::count_for_component(fx.sync.pool(), fx.component.id).await.unwrap(), 0);
    assert!(!unit(&fx, "de", "Hello").await.pending);
    let recorded = actions(&fx).await;
    assert!(recorded.contains(&ChangeAction::Translate));
    assert!(recorded.contains(&ChangeAction::Commit));
    assert!(recorded.contains(&ChangeAction::Push));
}

#[tokio::test]
async fn test_commit_message_lists_co_authors() {
    let fx = Fixture::with(
        &[("po/de.po", DE_PO), ("po/cs.po", CS_PO)],
        "repo = '{upstream}'\nfilemask = 'po/*.po'\npush_on_commit = false\n",
    )
    .await;
    let hello = unit(&fx, "de", "Hello").await;
    let bye = unit(&fx, "de", "Bye").await;
    fx.sync
        .translate(hello.id, "", &edit("Ann <ann@example.com>", "Hallo"))
        .await
        .unwrap();
    fx.sync
        .translate(bye.id, "Tschüss", &edit("Bob <bob@example.com>", "Auf Wiedersehen"))
        .await
        .unwrap();
    let report = fx.sync.commit_pending(fx.component.id).await.unwrap();
    assert!(!report.pushed);

    let message = git(&fx.checkout(), &["log", "-1", "--format=%B"]);
    assert!(message.contains("Co-authored-by: Ann <ann@example.com>"), "{message}");
    let author = git(&fx.checkout(), &["log", "-1", "--format=%an"]);
    assert_eq!(author.trim(), "Bob");
    assert!(fx.upstream_log().iter().all(|s| !s.starts_with("Translated")));
}

#[tokio::test]
async fn test_stale_edit_is_refused() {
    let fx = Fixture::po().await;
    let bye = unit(&fx, "de", "Bye").await;
    let err = fx
        .sync
        .translate(bye.id, "Ciao", &edit("Jane", "Auf Wiedersehen"))
        .await
        .unwrap_err();
    assert!(matches!(validation(&err), ValidationError::StaleUnit { .. }));
    assert_eq!(unit(&fx, "de", "Bye").await.target, "Tschüss");
}

#[tokio::test]
async fn test_locked_component_refuses_edits() {
    let fx = Fixture::po().await;
    let locked = fx.sync.set_locked(fx.component.id, true).await.unwrap();
    assert!(locked.locked);
    let hello = unit(&fx, "de", "Hello").await;
    let err = fx.sync.translate(hello.id, "", &edit("Jane", "Hallo")).await.unwrap_err();
    assert!(matches!(validation(&err), ValidationError::ComponentLocked { .. }));

    fx.sync.set_locked(fx.component.id, false).await.unwrap();
    fx.sync.translate(hello.id, "", &edit("Jane", "Hallo")).await.unwrap();
}

#[tokio::test]
async fn test_update_merges_upstream_changes() {
    let fx = Fixture::po().await;
    assert_eq!(
        fx.sync.update(fx.component.id, false).await.unwrap(),
        UpdateOutcome::UpToDate
    );

    fx.push_upstream("po/cs.po", &CS_PO.replace("msgstr \"\"\n", "msgstr \"Nashle\"\n"), "Czech");
    let outcome = fx.sync.update(fx.component.id, false).await.unwrap();
    assert!(matches!(outcome, UpdateOutcome::Updated { .. }), "{outcome:?}");
    assert_eq!(unit(&fx, "cs", "Bye").await.target, "Nashle");
    assert!(actions(&fx).await.contains(&ChangeAction::Update));
}

#[tokio::test]
async fn test_update_keeps_local_commits() {
    let fx = Fixture::with(
        &[("po/de.po", DE_PO), ("po/cs.po", CS_PO)],
        "repo = '{upstream}'\npush = '{upstream}'\nfilemask = 'po/*.po'\npush_on_commit = false\n",
    )
    .await;
    let hello = unit(&fx, "de", "Hello").await;
    fx.sync.translate(hello.id, "", &edit("Jane", "Hallo")).await.unwrap();
    fx.push_upstream("README", "upstream\n", "Add readme");

    fx.sync.update(fx.component.id, false).await.unwrap();
    assert!(fx.checkout().join("README").exists());
    assert!(fx.read("po/de.po").contains("msgstr \"Hallo\""));
    assert_eq!(db::pending::count_for_component(fx.sync.pool(), fx.component.id).await.unwrap(), 0);

    assert_eq!(fx.sync.push(fx.component.id).await.unwrap(), PushOutcome::Pushed);
    assert_eq!(fx.sync.push(fx.component.id).await.unwrap(), PushOutcome::UpToDate);
}

#[tokio::test]
async fn test_conflict_raises_merge_alert() {
    let fx = Fixture::with(
        &[("po/de.po", DE_PO), ("po/cs.po", CS_PO)],
        "repo = '{upstream}'\nfilemask = 'po/*.po'\npush_on_commit = false\n",
    )
    .await;
    let hello = unit(&fx, "de", "Hello").await;
    fx.sync.translate(hello.id, "", &edit("Jane", "Hallo")).await.unwrap();
    fx.push_upstream(
        "po/de.po",
        &DE_PO.replace("msgid \"Hello\"\nmsgstr \"\"", "msgid \"Hello\"\nmsgstr \"Guten Tag\""),
        "Conflicting German",
    );

    let err = fx.sync.update(fx.component.id, false).await.unwrap_err();
    assert!(err.as_vcs().is_some(), "{err}");
    assert!(alert_kinds(&fx).await.contains(&AlertKind::MergeFailure));
    assert!(actions(&fx).await.contains(&ChangeAction::FailedRebase));
    let status = git(&fx.checkout(), &["status", "--porcelain"]);
    assert!(status.trim().is_empty(), "rebase was not aborted: {status}");
}

#[tokio::test]
async fn test_repeated_failures_lock_component() {
    let fx = Fixture::po().await;
    std::fs::rename(&fx.upstream, fx.tmp.path().join("moved.git")).unwrap();
    for _ in 0..3 {
        fx.sync.update(fx.component.id, false).await.unwrap_err();
    }
    let alerts = db::alerts::list_for_component(fx.sync.pool(), fx.component.id)
        .await
        .unwrap();
    let failure = alerts
        .iter()
        .find(|a| a.kind == AlertKind::UpdateFailure)
        .expect("update failure alert");
    assert_eq!(failure.occurrences, 3);
    assert!(db::components::get(fx.sync.pool(), fx.component.id).await.unwrap().locked);

    std::fs::rename(fx.tmp.path().join("moved.git"), &fx.upstream).unwrap();
    fx.sync.update(fx.component.id, false).await.unwrap();
    assert!(!alert_kinds(&fx).await.contains(&AlertKind::UpdateFailure));
}

#[tokio::test]
async fn test_parse_error_blocks_commit() {
    let fx = Fixture::with(
        &[("po/de.po", DE_PO), ("po/cs.po", CS_PO)],
        "repo = '{upstream}'\nfilemask = 'po/*.po'\npush_on_commit = false\n",
    )
    .await;
    let hello = unit(&fx, "cs", "Hello").await;
    fx.sync.translate(hello.id, "Ahoj", &edit("Jane", "Nazdar")).await.unwrap();
    std::fs::write(fx.checkout().join("po/cs.po"), "msgid \"unterminated\nmsgstr\n").unwrap();

    let report = fx.sync.create_translations(fx.component.id, false).await.unwrap();
    assert_eq!(report.errors, 1);
    let cs = translation(&fx, "cs").await;
    assert!(
        db::alerts::exists(fx.sync.pool(), fx.component.id, Some(cs.id), AlertKind::ParseError)
            .await
            .unwrap()
    );

    let commit = fx.sync.commit_pending(fx.component.id).await.unwrap();
    assert_eq!((commit.translations, commit.skipped), (0, 1));
    assert_eq!(db::pending::count_for_component(fx.sync.pool(), fx.component.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_add_new_language() {
    let fx = Fixture::po().await;
    let fr = fx
        .sync
        .add_new_language(fx.component.id, "fr", "Jane <jane@example.com>")
        .await
        .unwrap();
    assert_eq!((fr.language_code.as_str(), fr.filename.as_str()), ("fr", "po/fr.po"));
    assert!(!fr.revision.is_empty());

    let content = fx.read("po/fr.po");
    assert!(content.contains("Language: fr"), "{content}");
    assert!(content.contains("msgid \"Hello\""), "{content}");
    assert_eq!(
        fx.upstream_log()[0],
        "Added translation using Transync (French)"
    );
    let stats = db::units::stats(fx.sync.pool(), fr.id).await.unwrap();
    assert_eq!((stats.all, stats.translated), (2, 0));

    let err = fx
        .sync
        .add_new_language(fx.component.id, "fr", "Jane")
        .await
        .unwrap_err();
    assert!(matches!(validation(&err), ValidationError::TranslationExists { .. }));
    let err = fx
        .sync
        .add_new_language(fx.component.id, "x1!", "Jane")
        .await
        .unwrap_err();
    assert!(matches!(validation(&err), ValidationError::InvalidLanguageCode(_)));
}

#[tokio::test]
async fn test_add_same_language_concurrently() {
    let fx = Fixture::po().await;
    let (first, second) = tokio::join!(
        fx.sync.add_new_language(fx.component.id, "fr", "Jane <jane@example.com>"),
        fx.sync.add_new_language(fx.component.id, "fr", "John <john@example.com>"),
    );
    let (added, refused) = match (first, second) {
        (Ok(added), Err(refused)) | (Err(refused), Ok(added)) => (added, refused),
        (first, second) => panic!("expected one success and one refusal, got {first:?} and {second:?}"),
    };

    assert!(matches!(validation(&refused), ValidationError::TranslationExists { .. }));
    assert_eq!(translation(&fx, "fr").await.id, added.id);
    assert!(fx.read("po/fr.po").contains("Language: fr"));
    let added_commits = fx
        .upstream_log()
        .iter()
        .filter(|subject| subject.starts_with("Added translation"))
        .count();
    assert_eq!(added_commits, 1);
}

#[tokio::test]
async fn test_add_new_language_rolls_back_failed_commit() {
    use std::os::unix::fs::PermissionsExt;

    let fx = Fixture::po().await;
    let hook = fx.checkout().join(".git/hooks/pre-commit");
    std::fs::create_dir_all(hook.parent().unwrap()).unwrap();
    std::fs::write(&hook, "#!/bin/sh\nexit 1\n").unwrap();
    std::fs::set_permissions(&hook, std::fs::Permissions::from_mode(0o755)).unwrap();

    let err = fx
        .sync
        .add_new_language(fx.component.id, "fr", "Jane <jane@example.com>")
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Vcs(_) | SyncError::Process(_)), "{err}");
    assert!(
        db::translations::find(fx.sync.pool(), fx.component.id, "fr")
            .await
            .unwrap()
            .is_none()
    );
    assert!(!fx.checkout().join("po/fr.po").exists());
    assert_eq!(git(&fx.checkout(), &["status", "--porcelain"]), "");

    std::fs::remove_file(&hook).unwrap();
    let fr = fx
        .sync
        .add_new_language(fx.component.id, "fr", "Jane <jane@example.com>")
        .await
        .unwrap();
    assert_eq!(fr.filename, "po/fr.po");
    assert_eq!(fx.upstream_log()[0], "Added translation using Transync (French)");
}

#[tokio::test]
async fn test_add_language_with_more_plural_forms() {
    let fx = Fixture::po().await;
    db::translations::delete(fx.sync.pool(), translation(&fx, "cs").await.id)
        .await
        .unwrap();
    std::fs::remove_file(fx.checkout().join("po/cs.po")).unwrap();

    let cs = fx
        .sync
        .add_new_language(fx.component.id, "cs", "Jane <jane@example.com>")
        .await
        .unwrap();
    assert_eq!(cs.plural_count, 3);
    let content = fx.read("po/cs.po");
    assert!(content.contains("nplurals=3"), "{content}");
}

#[tokio::test]
async fn test_add_language_disabled() {
    let fx = Fixture::with(
        &[("po/de.po", DE_PO), ("po/messages.pot", POT)],
        &format!("{PO_COMPONENT}new_lang = 'none'\n"),
    )
    .await;
    let err = fx
        .sync
        .add_new_language(fx.component.id, "fr", "Jane")
        .await
        .unwrap_err();
    assert!(matches!(validation(&err), ValidationError::NewLanguageDisabled { .. }));
}

#[tokio::test]
async fn test_duplicate_language_alert() {
    let fx = Fixture::with(
        &[("po/pt_BR.po", DE_PO), ("po/pt-BR.po", CS_PO)],
        "repo = '{upstream}'\nfilemask = 'po/*.po'\n",
    )
    .await;
    assert!(alert_kinds(&fx).await.contains(&AlertKind::DuplicateLanguage));
    let translations = db::translations::list_for_component(fx.sync.pool(), fx.component.id)
        .await
        .unwrap();
    assert_eq!(translations.len(), 1);
    assert_eq!(translations[0].filename, "po/pt-BR.po");
}

#[tokio::test]
async fn test_missing_new_base_raises_alert() {
    let fx = Fixture::with(&[("po/de.po", DE_PO)], PO_COMPONENT).await;
    assert!(alert_kinds(&fx).await.contains(&AlertKind::MissingBase));
}

#[tokio::test]
async fn test_vanished_file_removes_translation() {
    let fx = Fixture::po().await;
    std::fs::remove_file(fx.checkout().join("po/cs.po")).unwrap();
    let report = fx.sync.create_translations(fx.component.id, false).await.unwrap();
    assert_eq!(report.removed, 1);
    assert!(
        db::translations::find(fx.sync.pool(), fx.component.id, "cs")
            .await
            .unwrap()
            .is_none()
    );
    assert!(actions(&fx).await.contains(&ChangeAction::RemoveTranslation));
}

#[tokio::test]
async fn test_reset_discards_local_work() {
    let fx = Fixture::with(
        &[("po/de.po", DE_PO), ("po/cs.po", CS_PO)],
        "repo = '{upstream}'\npush = '{upstream}'\nfilemask = 'po/*.po'\npush_on_commit = false\n",
    )
    .await;
    let hello = unit(&fx, "de", "Hello").await;
    fx.sync.translate(hello.id, "", &edit("Jane", "Hallo")).await.unwrap();
    fx.sync.commit_pending(fx.component.id).await.unwrap();
    let bye = unit(&fx, "de", "Bye").await;
    fx.sync.translate(bye.id, "Tschüss", &edit("Jane", "Ciao")).await.unwrap();

    fx.sync.reset(fx.component.id).await.unwrap();
    assert_eq!(fx.read("po/de.po"), DE_PO);
    assert_eq!(unit(&fx, "de", "Hello").await.target, "");
    assert_eq!(unit(&fx, "de", "Bye").await.target, "Tschüss");
    assert_eq!(db::pending::count_for_component(fx.sync.pool(), fx.component.id).await.unwrap(), 0);
    assert!(!fx.sync.status(fx.component.id).await.unwrap().needs_push);
}

#[tokio::test]
async fn test_commit_sweep_commits_old_changes() {
    let fx = Fixture::with(
        &[("po/de.po", DE_PO)],
        "repo = '{upstream}'\nfilemask = 'po/*.po'\ncommit_pending_age = 0\npush_on_commit = false\n",
    )
    .await;
    assert_eq!(fx.sync.commit_sweep().await.unwrap(), 0);

    let hello = unit(&fx, "de", "Hello").await;
    let old = PendingEdit::builder()
        .author("Jane")
        .target("Hallo")
        .state(UnitState::Translated)
        .timestamp(chrono::Utc::now() - chrono::Duration::minutes(5))
        .build();
    fx.sync.translate(hello.id, "", &old).await.unwrap();
    assert_eq!(fx.sync.commit_sweep().await.unwrap(), 1);
    assert!(fx.read("po/de.po").contains("msgstr \"Hallo\""));
}

#[tokio::test]
async fn test_status_reports_pending() {
    let fx = Fixture::po().await;
    let hello = unit(&fx, "de", "Hello").await;
    fx.sync.translate(hello.id, "", &edit("Jane", "Hallo")).await.unwrap();
    let status = fx.sync.status(fx.component.id).await.unwrap();
    assert_eq!(status.component, "demo/core");
    assert_eq!(status.pending, 1);
    assert_eq!(status.translations, 2);
    assert!(!status.needs_merge);
    assert!(!status.revision.is_empty());
}

#[tokio::test]
async fn test_linked_component_shares_checkout() {
    let fx = Fixture::with_config(
        &[("po/de.po", DE_PO), ("extra/de.po", DE_PO)],
        "repo = '{upstream}'\npush = '{upstream}'\nfilemask = 'po/*.po'\n",
        "[components.\"demo/extra\"]\nrepo = 'link://demo/core'\nfilemask = 'extra/*.po'\n",
    )
    .await;
    let extra = db::components::find(fx.sync.pool(), "demo", "extra")
        .await
        .unwrap()
        .expect("linked component registered");
    fx.sync.setup_component(extra.id).await.unwrap();

    let handle = fx.sync.open(&extra).await.unwrap();
    assert!(handle.is_linked());
    assert_eq!(handle.checkout, fx.checkout());

    let de = db::translations::find(fx.sync.pool(), extra.id, "de").await.unwrap().unwrap();
    let hello = db::units::list_for_translation(fx.sync.pool(), de.id)
        .await
        .unwrap()
        .into_iter()
        .find(|u| u.source == "Hello")
        .unwrap();
    fx.sync.translate(hello.id, "", &edit("Jane", "Hallo")).await.unwrap();

    let report = fx.sync.commit_pending(extra.id).await.unwrap();
    assert_eq!(report.translations, 1);
    assert!(fx.read("extra/de.po").contains("msgstr \"Hallo\""));
    assert!(report.pushed);
}

#[tokio::test]
async fn test_edit_propagates_to_sibling_components() {
    let fx = Fixture::with_config(
        &[("po/de.po", DE_PO), ("extra/de.po", DE_PO), ("other/de.po", DE_PO)],
        "repo = '{upstream}'\npush = '{upstream}'\nfilemask = 'po/*.po'\n",
        "[components.\"demo/extra\"]\nrepo = 'link://demo/core'\nfilemask = 'extra/*.po'\n\n\
         [components.\"demo/other\"]\nrepo = 'link://demo/core'\nfilemask = 'other/*.po'\n\
         source_language = 'fr'\n",
    )
    .await;
    let mut siblings = Vec::new();
    for slug in ["extra", "other"] {
        let component = db::components::find(fx.sync.pool(), "demo", slug)
            .await
            .unwrap()
            .unwrap();
        fx.sync.setup_component(component.id).await.unwrap();
        let de = db::translations::find(fx.sync.pool(), component.id, "de")
            .await
            .unwrap()
            .unwrap();
        let hello = db::units::list_for_translation(fx.sync.pool(), de.id)
            .await
            .unwrap()
            .into_iter()
            .find(|u| u.source == "Hello")
            .unwrap();
        siblings.push((component, hello));
    }

    let hello = unit(&fx, "de", "Hello").await;
    fx.sync.translate(hello.id, "", &edit("Jane", "Hallo")).await.unwrap();

    let (extra, extra_hello) = &siblings[0];
    let mirrored = db::units::get(fx.sync.pool(), extra_hello.id).await.unwrap();
    assert_eq!(mirrored.target, "Hallo");
    assert!(mirrored.pending);
    let extra_actions: Vec<ChangeAction> = db::changes::list_for_component(fx.sync.pool(), extra.id, 100)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.action)
        .collect();
    assert!(extra_actions.contains(&ChangeAction::Propagate));

    // different source language
    let (_, other_hello) = &siblings[1];
    assert_eq!(db::units::get(fx.sync.pool(), other_hello.id).await.unwrap().target, "");

    // mirroring an identical value back is a no-op
    fx.sync
        .translate(extra_hello.id, "Hallo", &edit("Jane", "Hallo"))
        .await
        .unwrap();
    assert_eq!(db::pending::count_for_component(fx.sync.pool(), fx.component.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_component_cascades_to_linked() {
    let fx = Fixture::with_config(
        &[("po/de.po", DE_PO), ("extra/de.po", DE_PO)],
        "repo = '{upstream}'\nfilemask = 'po/*.po'\n",
        "[components.\"demo/extra\"]\nrepo = 'link://demo/core'\nfilemask = 'extra/*.po'\n",
    )
    .await;
    let extra = db::components::find(fx.sync.pool(), "demo", "extra")
        .await
        .unwrap()
        .unwrap();

    fx.sync.delete_component(extra.id).await.unwrap();
    assert!(db::components::find(fx.sync.pool(), "demo", "extra").await.unwrap().is_none());
    assert!(fx.checkout().join("extra/de.po").exists());

    let de = translation(&fx, "de").await;
    fx.sync.delete_component(fx.component.id).await.unwrap();
    assert!(!fx.checkout().exists());
    assert!(db::translations::get(fx.sync.pool(), de.id).await.is_err());
}

#[tokio::test]
async fn test_invalid_link_is_rejected() {
    let fx = Fixture::po().await;
    let mut broken = fx.component.clone();
    broken.settings.repo = "link://demo/missing".to_string();
    let err = fx.sync.open(&broken).await.unwrap_err();
    assert!(matches!(validation(&err), ValidationError::InvalidLink(_)));
}

#[tokio::test]
async fn test_monolingual_template() {
    let fx = Fixture::with(
        &[
            ("locales/en.json", "{\n    \"hello\": \"Hello\",\n    \"bye\": \"Bye\"\n}\n"),
            ("locales/de.json", "{\n    \"hello\": \"Hallo\",\n    \"stale\": \"Alt\"\n}\n"),
        ],
        "repo = '{upstream}'\nfilemask = 'locales/*.json'\nfile_format = 'json'\n\
         template = 'locales/en.json'\npush_on_commit = false\n",
    )
    .await;
    let source = translation(&fx, "en").await;
    assert!(source.is_source);

    let de = translation(&fx, "de").await;
    let units = db::units::list_for_translation(fx.sync.pool(), de.id).await.unwrap();
    let keys: Vec<(&str, &str, &str)> = units
        .iter()
        .map(|u| (u.context.as_str(), u.source.as_str(), u.target.as_str()))
        .collect();
    assert_eq!(keys, [("hello", "Hello", "Hallo"), ("bye", "Bye", "")]);

    let bye = units.iter().find(|u| u.context == "bye").unwrap();
    fx.sync.translate(bye.id, "", &edit("Jane", "Tschüss")).await.unwrap();
    fx.sync.commit_pending(fx.component.id).await.unwrap();
    let content = fx.read("locales/de.json");
    assert!(content.contains("\"bye\": \"Tschüss\""), "{content}");
}

#[tokio::test]
async fn test_missing_template_fails_scan() {
    let fx = Fixture::with(
        &[("locales/en.json", "{\"hello\": \"Hello\"}\n"), ("locales/de.json", "{}\n")],
        "repo = '{upstream}'\nfilemask = 'locales/*.json'\nfile_format = 'json'\n\
         template = 'locales/en.json'\n",
    )
    .await;
    std::fs::remove_file(fx.checkout().join("locales/en.json")).unwrap();
    let err = fx.sync.create_translations(fx.component.id, false).await.unwrap_err();
    assert!(matches!(validation(&err), ValidationError::MissingFile { kind: "template", .. }));
    assert!(alert_kinds(&fx).await.contains(&AlertKind::MissingBase));
}
