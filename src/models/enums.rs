// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! String-backed enums stored in config files and database columns.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;

/// Generates `as_str`, `Display`, `FromStr` and serde impls from one table.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($key:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ConfigError::InvalidValue {
                        section: "component".to_string(),
                        key: $key.to_string(),
                        message: format!(
                            "expected one of {}, got '{s}'",
                            [$($text),+].join(", ")
                        ),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_enum! {
    /// Version control backend of a component.
    VcsKind ("vcs") {
        Git => "git",
        Gerrit => "gerrit",
        GitHub => "github",
        Subversion => "subversion",
        Local => "local",
        Mercurial => "mercurial",
    }
}

impl Default for VcsKind {
    fn default() -> Self {
        Self::Git
    }
}

string_enum! {
    /// How upstream changes are integrated.
    MergeStyle ("merge_style") {
        Merge => "merge",
        Rebase => "rebase",
        MergeNoFf => "merge-no-ff",
    }
}

impl Default for MergeStyle {
    fn default() -> Self {
        Self::Rebase
    }
}

string_enum! {
    /// Which pending changes are written on commit.
    CommitPolicy ("commit_policy") {
        All => "all",
        WithoutNeedsEditing => "without-needs-editing",
        ApprovedOnly => "approved-only",
    }
}

impl Default for CommitPolicy {
    fn default() -> Self {
        Self::All
    }
}

string_enum! {
    /// Whether new languages may be started.
    NewLanguagePolicy ("new_lang") {
        Add => "add",
        None => "none",
    }
}

impl Default for NewLanguagePolicy {
    fn default() -> Self {
        Self::Add
    }
}

string_enum! {
    /// Kind of persistent alert.
    AlertKind ("alert") {
        MergeFailure => "merge-failure",
        UpdateFailure => "update-failure",
        PushFailure => "push-failure",
        ParseError => "parse-error",
        AddonError => "addon-error",
        MissingBase => "missing-base",
        DuplicateLanguage => "duplicate-language",
    }
}

impl AlertKind {
    /// Repository alerts count towards auto-locking.
    #[must_use]
    pub const fn is_repository(self) -> bool {
        matches!(
            self,
            Self::MergeFailure | Self::UpdateFailure | Self::PushFailure
        )
    }
}

string_enum! {
    /// Audit log action.
    ChangeAction ("action") {
        Update => "update",
        Commit => "commit",
        Push => "push",
        Reset => "reset",
        Cleanup => "cleanup",
        NewTranslation => "new-translation",
        RemoveTranslation => "remove-translation",
        Translate => "translate",
        Propagate => "propagate",
        FailedMerge => "failed-merge",
        FailedRebase => "failed-rebase",
        FailedPush => "failed-push",
        FailedUpdate => "failed-update",
        AddonInstalled => "addon-installed",
        AddonRemoved => "addon-removed",
        ComponentLocked => "component-locked",
        ComponentUnlocked => "component-unlocked",
    }
}

string_enum! {
    /// Lifecycle point addons subscribe to.
    AddonEvent ("events") {
        PostPush => "post-push",
        PostUpdate => "post-update",
        PreCommit => "pre-commit",
        PostCommit => "post-commit",
        PostAdd => "post-add",
        UnitPreCreate => "unit-pre-create",
        StorePostLoad => "store-post-load",
        PreUpdate => "pre-update",
        PrePush => "pre-push",
        Daily => "daily",
        ComponentUpdate => "component-update",
        Change => "change",
    }
}

string_enum! {
    /// Where an addon instance applies.
    AddonScope ("scope") {
        Component => "component",
        Project => "project",
        Site => "site",
    }
}

/// Translation state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum UnitState {
    #[default]
    Empty,
    NeedsEditing,
    Translated,
    Approved,
    ReadOnly,
}

impl UnitState {
    /// Numeric value stored in the database.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Empty => 0,
            Self::NeedsEditing => 10,
            Self::Translated => 20,
            Self::Approved => 30,
            Self::ReadOnly => 100,
        }
    }

    /// Inverse of [`Self::as_i64`]; unknown values map to the nearest lower state.
    #[must_use]
    pub const fn from_i64(value: i64) -> Self {
        match value {
            i64::MIN..=9 => Self::Empty,
            10..=19 => Self::NeedsEditing,
            20..=29 => Self::Translated,
            30..=99 => Self::Approved,
            _ => Self::ReadOnly,
        }
    }

    /// Derive the state of a unit read from a file.
    #[must_use]
    pub fn from_file(target: &str, fuzzy: bool) -> Self {
        if target.is_empty() {
            Self::Empty
        } else if fuzzy {
            Self::NeedsEditing
        } else {
            Self::Translated
        }
    }
}

impl std::fmt::Display for UnitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Empty => "empty",
            Self::NeedsEditing => "needs-editing",
            Self::Translated => "translated",
            Self::Approved => "approved",
            Self::ReadOnly => "read-only",
        })
    }
}

impl std::str::FromStr for UnitState {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty" => Ok(Self::Empty),
            "needs-editing" | "fuzzy" => Ok(Self::NeedsEditing),
            "translated" => Ok(Self::Translated),
            "approved" => Ok(Self::Approved),
            "read-only" => Ok(Self::ReadOnly),
            _ => Err(ConfigError::InvalidValue {
                section: "unit".to_string(),
                key: "state".to_string(),
                message: format!(
                    "expected empty, needs-editing, translated, approved or read-only, got '{s}'"
                ),
            }),
        }
    }
}

impl Serialize for UnitState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}
