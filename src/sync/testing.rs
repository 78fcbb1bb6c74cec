// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Fixtures: a bare upstream repository and a synchronizer working on it.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use tempfile::TempDir;

use super::Synchronizer;
use crate::addons::AddonRegistry;
use crate::config::Config;
use crate::db;
use crate::models::Component;

pub(crate) const DE_PO: &str = "msgid \"\"
msgstr \"\"
\"Language: de\\n\"
\"Content-Type: text/plain; charset=UTF-8\\n\"

msgid \"Hello\"
msgstr \"\"

msgid \"Bye\"
msgstr \"Tschüss\"
";

pub(crate) const CS_PO: &str = "msgid \"\"
msgstr \"\"
\"Language: cs\\n\"
\"Content-Type: text/plain; charset=UTF-8\\n\"

msgid \"Hello\"
msgstr \"Ahoj\"

msgid \"Bye\"
msgstr \"\"
";

/// Component settings of the default fixture; `{upstream}` is replaced.
pub(crate) const PO_COMPONENT: &str = "repo = '{upstream}'
push = '{upstream}'
filemask = 'po/*.po'
new_base = 'po/messages.pot'
";

pub(crate) const POT: &str = "msgid \"\"
msgstr \"\"
\"Content-Type: text/plain; charset=UTF-8\\n\"

msgid \"Hello\"
msgstr \"\"

msgid \"Bye\"
msgstr \"\"
";

/// Runs git with a fixed identity, panicking on failure.
pub(crate) fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Seed")
        .env("GIT_AUTHOR_EMAIL", "seed@example.com")
        .env("GIT_COMMITTER_NAME", "Seed")
        .env("GIT_COMMITTER_EMAIL", "seed@example.com")
        .output()
        .expect("git should run");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Creates `upstream.git` on branch `main` holding `files`.
pub(crate) fn seed_upstream(root: &Path, files: &[(&str, &str)]) -> PathBuf {
    let seed = root.join("seed");
    std::fs::create_dir_all(&seed).unwrap();
    git(&seed, &["init", "--quiet", "--initial-branch", "main"]);
    for (name, content) in files {
        let path = seed.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
    git(&seed, &["add", "."]);
    git(&seed, &["commit", "--quiet", "-m", "Initial commit"]);
    git(root, &["clone", "--quiet", "--bare", "seed", "upstream.git"]);
    root.join("upstream.git")
}

pub(crate) struct Fixture {
    pub tmp: TempDir,
    pub upstream: PathBuf,
    pub sync: Synchronizer,
    pub component: Component,
}

impl Fixture {
    /// Gettext component `demo/core` with German and Czech, set up.
    pub async fn po() -> Self {
        Self::with(
            &[("po/de.po", DE_PO), ("po/cs.po", CS_PO), ("po/messages.pot", POT)],
            PO_COMPONENT,
        )
        .await
    }

    /// Component `demo/core` configured by `component` over `files`.
    pub async fn with(files: &[(&str, &str)], component: &str) -> Self {
        Self::with_config(files, component, "").await
    }

    /// As [`Fixture::with`], with extra TOML appended to the configuration.
    pub async fn with_config(files: &[(&str, &str)], component: &str, extra: &str) -> Self {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let upstream = seed_upstream(tmp.path(), files);
        let toml = format!(
            "[paths]\ndata = '{data}'\n\n\
             [vcs]\nlock_timeout = 5\ncommitter_email = 'transync@example.com'\n\n\
             [projects.demo]\nname = 'Demo'\n\n\
             [components.\"demo/core\"]\n{component}\n{extra}",
            data = tmp.path().join("data").display(),
            component = component.replace("{upstream}", &upstream.display().to_string()),
        );
        let mut config = Config::parse(&toml).expect("fixture configuration is valid");
        config.resolve_and_validate().expect("fixture configuration validates");

        let pool = db::initialize(&config.paths.database()).await.unwrap();
        let sync = Synchronizer::new(pool, Arc::new(config), Arc::new(AddonRegistry::builtin()));
        let components = sync.register_from_config().await.unwrap();
        let component = components
            .into_iter()
            .find(|c| c.slug == "core")
            .expect("demo/core is registered");
        sync.setup_component(component.id).await.unwrap();
        Self {
            tmp,
            upstream,
            sync,
            component,
        }
    }

    pub fn checkout(&self) -> PathBuf {
        self.sync.config().paths.checkout("demo", "core")
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.checkout().join(name)).unwrap()
    }

    fn contributor(&self) -> PathBuf {
        let work = self.tmp.path().join("contributor");
        if !work.exists() {
            git(self.tmp.path(), &["clone", "--quiet", "upstream.git", "contributor"]);
        } else {
            git(&work, &["pull", "--quiet", "--rebase"]);
        }
        work
    }

    /// Commits `content` to `name` upstream, as another contributor would.
    pub fn push_upstream(&self, name: &str, content: &str, message: &str) {
        let work = self.contributor();
        let path = work.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
        git(&work, &["add", "."]);
        git(&work, &["commit", "--quiet", "-m", message]);
        git(&work, &["push", "--quiet", "origin", "HEAD:main"]);
    }

    /// Removes `name` upstream.
    pub fn delete_upstream(&self, name: &str, message: &str) {
        let work = self.contributor();
        git(&work, &["rm", "--quiet", name]);
        git(&work, &["commit", "--quiet", "-m", message]);
        git(&work, &["push", "--quiet", "origin", "HEAD:main"]);
    }

    /// Subjects of the upstream `main` history, newest first.
    pub fn upstream_log(&self) -> Vec<String> {
        git(&self.upstream, &["log", "--format=%s", "main"])
            .lines()
            .map(str::to_string)
            .collect()
    }
}
