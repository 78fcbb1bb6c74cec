// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use super::*;
use crate::error::{AddonError, SyncError};
use crate::models::{AddonScope, AlertKind, UnitState};
use crate::sync::testing::{DE_PO, Fixture};

fn addon_error(err: &SyncError) -> &AddonError {
    match err {
        SyncError::Addon(e) => e.as_ref(),
        other => panic!("expected an addon error, got {other}"),
    }
}

static FAIL: AtomicBool = AtomicBool::new(true);
static FLAKY_RUNS: AtomicUsize = AtomicUsize::new(0);
static STEADY_RUNS: AtomicUsize = AtomicUsize::new(0);

static FLAKY: AddonMetadata = AddonMetadata {
    name: "test.flaky",
    verbose: "Flaky",
    description: "Fails while FAIL is set.",
    events: &[AddonEvent::PostCommit],
    compatibility: Compatibility::ANY,
    scopes: &[AddonScope::Component],
    multiple: false,
};

static STEADY: AddonMetadata = AddonMetadata {
    name: "test.steady",
    verbose: "Steady",
    description: "Counts its runs.",
    events: &[AddonEvent::PostCommit],
    compatibility: Compatibility::ANY,
    scopes: &[AddonScope::Component],
    multiple: false,
};

#[derive(Debug)]
struct Flaky;

#[derive(Debug)]
struct Steady;

impl AddonHandler for Flaky {
    fn metadata(&self) -> &'static AddonMetadata {
        &FLAKY
    }

    fn post_commit<'a>(&'a self, _ctx: &'a AddonContext<'a>) -> AddonFuture<'a> {
        Box::pin(async {
            FLAKY_RUNS.fetch_add(1, Ordering::SeqCst);
            if FAIL.load(Ordering::SeqCst) {
                return Err(AddonError::Failed {
                    addon: FLAKY.name.to_string(),
                    message: "boom".to_string(),
                    output: "tool said no".to_string(),
                }
                .into());
            }
            Ok(())
        })
    }
}

impl AddonHandler for Steady {
    fn metadata(&self) -> &'static AddonMetadata {
        &STEADY
    }

    fn post_commit<'a>(&'a self, _ctx: &'a AddonContext<'a>) -> AddonFuture<'a> {
        Box::pin(async {
            STEADY_RUNS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

static BROKEN: AddonMetadata = AddonMetadata {
    name: "test.broken",
    verbose: "Broken",
    description: "Always fails.",
    events: &[AddonEvent::PostCommit],
    compatibility: Compatibility::ANY,
    scopes: &[AddonScope::Component],
    multiple: false,
};

static GRUMPY: AddonMetadata = AddonMetadata {
    name: "test.grumpy",
    verbose: "Grumpy",
    description: "Fails while GRUMPY_FAIL is set.",
    events: &[AddonEvent::PostCommit],
    compatibility: Compatibility::ANY,
    scopes: &[AddonScope::Component],
    multiple: false,
};

static ALWAYS: AtomicBool = AtomicBool::new(true);
static GRUMPY_FAIL: AtomicBool = AtomicBool::new(true);

/// Fails with its own output while `fail` is set.
#[derive(Debug)]
struct Failing {
    metadata: &'static AddonMetadata,
    output: &'static str,
    fail: &'static AtomicBool,
}

impl AddonHandler for Failing {
    fn metadata(&self) -> &'static AddonMetadata {
        self.metadata
    }

    fn post_commit<'a>(&'a self, _ctx: &'a AddonContext<'a>) -> AddonFuture<'a> {
        Box::pin(async {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AddonError::Failed {
                    addon: self.metadata.name.to_string(),
                    message: "exit status 1".to_string(),
                    output: self.output.to_string(),
                }
                .into());
            }
            Ok(())
        })
    }
}

fn create_broken(_: &Value) -> Result<Box<dyn AddonHandler>, AddonError> {
    Ok(Box::new(Failing {
        metadata: &BROKEN,
        output: "disk full",
        fail: &ALWAYS,
    }))
}

fn create_grumpy(_: &Value) -> Result<Box<dyn AddonHandler>, AddonError> {
    Ok(Box::new(Failing {
        metadata: &GRUMPY,
        output: "not today",
        fail: &GRUMPY_FAIL,
    }))
}

fn create_flaky(_: &Value) -> Result<Box<dyn AddonHandler>, AddonError> {
    Ok(Box::new(Flaky))
}

fn create_steady(_: &Value) -> Result<Box<dyn AddonHandler>, AddonError> {
    Ok(Box::new(Steady))
}

fn test_registry() -> AddonRegistry {
    let mut registry = AddonRegistry::builtin();
    registry.register(&FLAKY, create_flaky);
    registry.register(&STEADY, create_steady);
    registry.register(&BROKEN, create_broken);
    registry.register(&GRUMPY, create_grumpy);
    registry
}

#[test]
fn test_builtin_registry() {
    let registry = AddonRegistry::builtin();
    let names: Vec<&str> = registry.iter().map(|m| m.name).collect();
    assert_eq!(
        names,
        [
            "cleanup.generic",
            "discovery.discovery",
            "flags.target_edit",
            "gettext.linguas",
            "gettext.mo",
            "gettext.msgmerge",
            "git.squash",
            "json.customize",
            "properties.sort",
        ]
    );
    assert!(registry.metadata("git.squash").unwrap().handles(AddonEvent::PrePush));
    assert!(matches!(
        registry.metadata("nope"),
        Err(AddonError::UnknownAddon(name)) if name == "nope"
    ));
}

#[test]
fn test_configuration_is_validated() {
    let registry = AddonRegistry::builtin();
    let squash = registry.create("git.squash", &json!({ "squash": "language" })).unwrap();
    assert_eq!(squash.configuration(), json!({ "squash": "language" }));
    assert_eq!(
        registry.create("git.squash", &Value::Null).unwrap().configuration(),
        json!({ "squash": "all" })
    );

    for (name, configuration) in [
        ("git.squash", json!({ "squash": "weekly" })),
        ("flags.target_edit", json!({ "extra": 1 })),
        ("discovery.discovery", json!({})),
    ] {
        let err = registry.create(name, &configuration).unwrap_err();
        assert!(
            matches!(err, AddonError::InvalidConfiguration { ref addon, .. } if addon == name),
            "{name}: {err}"
        );
    }
}

#[test]
fn test_compatibility() {
    let mut component = Component::default();
    component.settings.file_format = "po".to_string();
    let gettext = Compatibility {
        formats: &["po"],
        vcs: &[],
        monolingual: Some(false),
    };
    assert!(gettext.accepts(&component, false));
    assert!(!gettext.accepts(&component, true));
    component.settings.file_format = "json".to_string();
    assert!(!gettext.accepts(&component, false));
    assert!(Compatibility::ANY.accepts(&component, true));
}

#[tokio::test]
async fn test_install_validations() {
    let fx = Fixture::po().await;
    let pool = fx.sync.pool();
    let registry = AddonRegistry::builtin();
    let target = InstallTarget::Component {
        component: &fx.component,
        monolingual: false,
    };

    let record = install(pool, &registry, target, "gettext.linguas", &Value::Null)
        .await
        .unwrap();
    assert_eq!(record.scope, AddonScope::Component);
    assert_eq!(record.component_id, Some(fx.component.id));

    let err = install(pool, &registry, target, "gettext.linguas", &Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(addon_error(&err), AddonError::AlreadyInstalled { .. }));

    let err = install(pool, &registry, target, "json.customize", &Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(addon_error(&err), AddonError::Incompatible { .. }));

    let project = db::projects::find_by_slug(pool, "demo").await.unwrap().unwrap();
    let err = install(
        pool,
        &registry,
        InstallTarget::Project(&project),
        "discovery.discovery",
        &json!({ "match_regex": "(?P<component>[^/]*)/(?P<language>[^/]*)\\.po" }),
    )
    .await
    .unwrap_err();
    assert!(matches!(addon_error(&err), AddonError::InvalidConfiguration { .. }));

    let err = install(pool, &registry, target, "nope", &Value::Null).await.unwrap_err();
    assert!(matches!(addon_error(&err), AddonError::UnknownAddon(_)));

    install(pool, &registry, InstallTarget::Project(&project), "flags.target_edit", &Value::Null)
        .await
        .unwrap();
    let names: Vec<String> = db::addons::for_component(pool, &fx.component)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, ["gettext.linguas", "flags.target_edit"]);

    let changes = db::changes::list_for_component(pool, fx.component.id, 10).await.unwrap();
    assert!(changes.iter().any(|c| c.action == ChangeAction::AddonInstalled));
}

#[tokio::test]
async fn test_failing_addon_does_not_stop_others() {
    let fx = Fixture::po().await;
    let pool = fx.sync.pool();
    let registry = test_registry();
    let target = InstallTarget::Component {
        component: &fx.component,
        monolingual: false,
    };
    install(pool, &registry, target, "test.flaky", &Value::Null).await.unwrap();
    install(pool, &registry, target, "test.steady", &Value::Null).await.unwrap();

    let addons = ActiveAddons::load(pool, &registry, &fx.component, false).await.unwrap();
    assert_eq!(addons.names().collect::<Vec<_>>(), ["test.flaky", "test.steady"]);
    assert!(addons.handles(AddonEvent::PostCommit));
    assert!(!addons.handles(AddonEvent::PrePush));

    let handle = fx.sync.open(&fx.component).await.unwrap();
    let guard = handle.acquire(Duration::from_secs(5)).await.unwrap();
    let ctx = AddonContext::new(pool, &handle, &guard, &fx.sync.config().vcs);

    FAIL.store(true, Ordering::SeqCst);
    assert_eq!(addons.dispatch(&ctx, Event::PostCommit).await, 1);
    assert_eq!(FLAKY_RUNS.load(Ordering::SeqCst), 1);
    assert_eq!(STEADY_RUNS.load(Ordering::SeqCst), 1);
    let alerts = db::alerts::list_for_component(pool, fx.component.id).await.unwrap();
    let alert = alerts
        .iter()
        .find(|a| a.kind == AlertKind::AddonError)
        .expect("addon alert raised");
    assert_eq!(alert.details["addon"], "test.flaky");
    assert_eq!(alert.details["output"], "tool said no");

    FAIL.store(false, Ordering::SeqCst);
    let report = addons.run(&ctx, Event::PostCommit).await;
    assert_eq!(report.failures(), 0);
    assert_eq!(report.settle(pool, &fx.component).await, 0);
    assert!(
        !db::alerts::exists(pool, fx.component.id, None, AlertKind::AddonError)
            .await
            .unwrap()
    );
}

/// Subject, captured output and occurrences of each addon alert.
async fn addon_alerts(pool: &crate::db::DbPool, component_id: i64) -> Vec<(String, String, i64)> {
    db::alerts::list_for_component(pool, component_id)
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.kind == AlertKind::AddonError)
        .map(|a| {
            let output = a.details["output"].as_str().unwrap_or_default().to_string();
            (a.subject, output, a.occurrences)
        })
        .collect()
}

#[tokio::test]
async fn test_each_failing_addon_keeps_its_alert() {
    let fx = Fixture::po().await;
    let pool = fx.sync.pool();
    let registry = test_registry();
    let target = InstallTarget::Component {
        component: &fx.component,
        monolingual: false,
    };
    install(pool, &registry, target, "test.broken", &Value::Null).await.unwrap();
    install(pool, &registry, target, "test.grumpy", &Value::Null).await.unwrap();

    let addons = ActiveAddons::load(pool, &registry, &fx.component, false).await.unwrap();
    let handle = fx.sync.open(&fx.component).await.unwrap();
    let guard = handle.acquire(Duration::from_secs(5)).await.unwrap();
    let ctx = AddonContext::new(pool, &handle, &guard, &fx.sync.config().vcs);

    assert_eq!(addons.dispatch(&ctx, Event::PostCommit).await, 2);
    assert_eq!(
        addon_alerts(pool, fx.component.id).await,
        [
            ("test.broken".to_string(), "disk full".to_string(), 1),
            ("test.grumpy".to_string(), "not today".to_string(), 1),
        ]
    );

    GRUMPY_FAIL.store(false, Ordering::SeqCst);
    assert_eq!(addons.dispatch(&ctx, Event::PostCommit).await, 1);
    assert_eq!(
        addon_alerts(pool, fx.component.id).await,
        [("test.broken".to_string(), "disk full".to_string(), 2)]
    );
}

#[tokio::test]
async fn test_context_collects_changed_files() {
    let fx = Fixture::po().await;
    let handle = fx.sync.open(&fx.component).await.unwrap();
    let guard = handle.acquire(Duration::from_secs(5)).await.unwrap();
    let ctx = AddonContext::new(fx.sync.pool(), &handle, &guard, &fx.sync.config().vcs);

    assert!(!ctx.commit_changes("gettext.linguas").await.unwrap());
    std::fs::write(ctx.path("po/LINGUAS"), "cs de\n").unwrap();
    ctx.mark_changed("po/LINGUAS");
    ctx.mark_changed("po/LINGUAS");
    assert!(ctx.commit_changes("gettext.linguas").await.unwrap());
    assert!(ctx.take_changed().is_empty());

    let subject = crate::sync::testing::git(&fx.checkout(), &["log", "-1", "--format=%s%n%an"]);
    assert!(subject.starts_with("Update translation files"), "{subject}");
    assert!(subject.trim_end().ends_with("Transync"), "{subject}");

    ctx.request_scan(7);
    assert_eq!(ctx.take_scan_requests(), [7]);
    assert!(ctx.take_scan_requests().is_empty());
}

#[tokio::test]
async fn test_new_units_are_flagged_on_update() {
    let fx = Fixture::po().await;
    install(
        fx.sync.pool(),
        fx.sync.addon_registry(),
        InstallTarget::Site,
        "flags.target_edit",
        &Value::Null,
    )
    .await
    .unwrap();
    fx.push_upstream(
        "po/de.po",
        &format!("{DE_PO}\nmsgid \"Welcome\"\nmsgstr \"Willkommen\"\n"),
        "New string",
    );
    fx.sync.update(fx.component.id, false).await.unwrap();

    let de = db::translations::find(fx.sync.pool(), fx.component.id, "de")
        .await
        .unwrap()
        .unwrap();
    let units = db::units::list_for_translation(fx.sync.pool(), de.id).await.unwrap();
    let welcome = units.iter().find(|u| u.source == "Welcome").unwrap();
    assert_eq!(welcome.state, UnitState::NeedsEditing);
    let bye = units.iter().find(|u| u.source == "Bye").unwrap();
    assert_eq!(bye.state, UnitState::Translated);
}

async fn project_slugs(fx: &Fixture) -> Vec<String> {
    db::components::list_for_project(fx.sync.pool(), fx.component.project_id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.slug)
        .collect()
}

#[tokio::test]
async fn test_discovery_adds_and_removes_components() {
    let fx = Fixture::with(
        &[
            ("po/de.po", DE_PO),
            ("locale/web/de.po", DE_PO),
            ("locale/docs/de.po", DE_PO),
        ],
        "repo = '{upstream}'\npush = '{upstream}'\nfilemask = 'po/*.po'\n",
    )
    .await;
    install(
        fx.sync.pool(),
        fx.sync.addon_registry(),
        InstallTarget::Component {
            component: &fx.component,
            monolingual: false,
        },
        "discovery.discovery",
        &json!({
            "match_regex": r"locale/(?P<component>[^/]*)/(?P<language>[^/.]*)\.po",
            "remove": true,
        }),
    )
    .await
    .unwrap();

    fx.sync.update(fx.component.id, true).await.unwrap();
    let mut slugs = project_slugs(&fx).await;
    slugs.sort();
    assert_eq!(slugs, ["core", "docs", "web"]);

    fx.delete_upstream("locale/docs/de.po", "Drop docs");
    fx.sync.update(fx.component.id, false).await.unwrap();
    let mut slugs = project_slugs(&fx).await;
    slugs.sort();
    assert_eq!(slugs, ["core", "web"]);
}
