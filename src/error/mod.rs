// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!              SyncError (~24 bytes)
//!                     |
//!   +-----+-----+-----+-----+-----+-----+-----+
//!   |     |     |     |     |     |     |     |
//!   v     v     v     v     v     v     v     v
//! Bail   Vcs  Format Store Lock  Valid Addon  Cfg/Proc/Net/Fs/Io
//!        Box   Box   Box   Box   Box   Box    Box
//!
//! Sub-errors (unboxed internally):
//!   Vcs        CommandFailed{stdout,stderr,retcode}, LockNotHeld, Gix
//!   Format     Parse (file parse error), Unsupported, InvalidBase
//!   Store      Sqlx, Migration, NotFound
//!   Lock       Timeout (retried by jobs), Io
//!   Validation InvalidRegex, DuplicateLanguage, TranslationExists, StaleUnit
//!   Addon      UnknownAddon, InvalidConfiguration, Failed{output}
//!
//! All variants boxed => SyncError fits in 24 bytes.
//! ```

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`SyncError`].
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Top-level error type of the synchronizer layers.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Version control operation failed.
    #[error("repository error: {0}")]
    Vcs(#[from] Box<VcsError>),

    /// Translation file could not be read or written.
    #[error("format error: {0}")]
    Format(#[from] Box<FormatError>),

    /// Database operation failed.
    #[error("store error: {0}")]
    Store(#[from] Box<StoreError>),

    /// Repository lock could not be acquired.
    #[error("lock error: {0}")]
    Lock(#[from] Box<LockError>),

    /// Invalid input or configuration rejected before any side effect.
    #[error("{0}")]
    Validation(#[from] Box<ValidationError>),

    /// Addon failed or is misconfigured.
    #[error("addon error: {0}")]
    Addon(#[from] Box<AddonError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// Network operation failed.
    #[error("network error: {0}")]
    Network(#[from] Box<NetworkError>),

    /// Filesystem error.
    #[error("filesystem error: {0}")]
    Fs(#[from] Box<FsError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

impl SyncError {
    /// Generic error from a message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into().into_boxed_str())
    }

    /// Whether this is a lock timeout that a retry may resolve.
    #[must_use]
    pub fn is_lock_timeout(&self) -> bool {
        matches!(self, Self::Lock(e) if matches!(**e, LockError::Timeout { .. }))
    }

    /// Whether this is a translation file parse failure.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Format(e) if matches!(**e, FormatError::Parse { .. }))
    }

    /// Returns the failed VCS command details, if any.
    #[must_use]
    pub fn as_vcs(&self) -> Option<&VcsError> {
        match self {
            Self::Vcs(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for SyncError {
                fn from(err: $error) -> Self {
                    SyncError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    VcsError => Vcs,
    FormatError => Format,
    StoreError => Store,
    LockError => Lock,
    ValidationError => Validation,
    AddonError => Addon,
    ConfigError => Config,
    ProcessError => Process,
    NetworkError => Network,
    FsError => Fs,
    std::io::Error => Io,
}

impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        Self::Store(Box::new(StoreError::Sqlx(err)))
    }
}

// --- Gix Errors ---

/// Wrapper for gix-specific errors.
///
/// gix has multiple error types that are converted through this enum.
/// Large error types are boxed to keep enum size manageable.
#[derive(Debug, Error)]
pub enum GixError {
    /// Failed to discover repository from path.
    #[error("failed to discover repository: {0}")]
    Discover(#[from] Box<gix::discover::Error>),

    /// HEAD could not be peeled to a commit.
    #[error("failed to resolve revision: {0}")]
    Revision(String),
}

// --- VCS Errors ---

/// Version control errors.
#[derive(Debug, Error)]
pub enum VcsError {
    /// External VCS command exited with a non-zero code.
    #[error("`{command}` exited with code {retcode}: {}", summarize_output(.stderr, .stdout))]
    CommandFailed {
        command: String,
        retcode: i32,
        stdout: String,
        stderr: String,
    },

    /// A mutating call was made without holding the checkout lock.
    #[error("repository lock for {path} is not held by the caller")]
    LockNotHeld { path: String },

    /// The checkout directory is not a repository.
    #[error("not a repository: {path}")]
    NotARepository { path: String },

    /// Error from gix library.
    #[error("gix error: {0}")]
    Gix(#[from] GixError),

    /// Operation not supported by this backend.
    #[error("{backend} does not support {operation}")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },

    /// Remote branch could not be determined.
    #[error("remote branch not found: {branch}")]
    BranchNotFound { branch: String },

    /// Pull request could not be opened.
    #[error("failed to open pull request: {message}")]
    PullRequest { message: String },
}

impl VcsError {
    /// Combined stdout and stderr of a failed command.
    #[must_use]
    pub fn output(&self) -> Option<String> {
        match self {
            Self::CommandFailed { stdout, stderr, .. } => {
                let mut out = String::new();
                for part in [stdout.trim(), stderr.trim()] {
                    if part.is_empty() {
                        continue;
                    }
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(part);
                }
                Some(out)
            }
            _ => None,
        }
    }
}

fn summarize_output(stderr: &str, stdout: &str) -> String {
    let text = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };
    text.lines().last().unwrap_or_default().to_string()
}

// --- Format Errors ---

/// Translation file format errors.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The file could not be parsed.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// No adapter is registered under this id.
    #[error("unknown file format: {0}")]
    UnknownFormat(String),

    /// The adapter lacks a capability.
    #[error("format {format} does not support {operation}")]
    Unsupported {
        format: String,
        operation: &'static str,
    },

    /// Base file cannot seed a new translation.
    #[error("{path} is not a valid base for new translations: {reason}")]
    InvalidBase { path: String, reason: String },

    /// The store could not be serialized.
    #[error("failed to serialize {format}: {message}")]
    Serialize { format: String, message: String },
}

impl FormatError {
    /// Parse error for a file.
    pub fn parse(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

// --- Store Errors ---

/// Database errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Error from sqlx.
    #[error("sqlite error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Row not found.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Stored value has an unexpected shape.
    #[error("corrupt {entity} row: {message}")]
    Corrupt {
        entity: &'static str,
        message: String,
    },
}

// --- Lock Errors ---

/// Repository lock errors.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another worker held the lock for the whole wait period.
    #[error("timed out after {waited_secs}s waiting for lock {path}, try again later")]
    Timeout { path: String, waited_secs: u64 },

    /// Lock file could not be opened.
    #[error("failed to open lock file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// --- Validation Errors ---

/// Errors surfaced synchronously for invalid input.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A regular expression failed to compile.
    #[error("invalid regular expression '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    /// The discovery regex lacks a `language` group.
    #[error("regular expression '{pattern}' has no 'language' group")]
    MissingLanguageGroup { pattern: String },

    /// File mask has no language placeholder.
    #[error("file mask '{mask}' has no '*' placeholder")]
    InvalidMask { mask: String },

    /// Two files map to the same language.
    #[error("files {first} and {second} both map to language {language}")]
    DuplicateLanguage {
        language: String,
        first: String,
        second: String,
    },

    /// Translation already exists for this language.
    #[error("translation for {language} already exists at {path}")]
    TranslationExists { language: String, path: String },

    /// The component does not accept new languages.
    #[error("adding new languages is disabled for {component}")]
    NewLanguageDisabled { component: String },

    /// Template or base file is required but missing.
    #[error("{kind} file {path} does not exist")]
    MissingFile { kind: &'static str, path: String },

    /// Language code is not acceptable.
    #[error("invalid language code: {0}")]
    InvalidLanguageCode(String),

    /// The unit changed since the caller read it.
    #[error("the string changed meanwhile, reload and try again (unit {unit_id})")]
    StaleUnit { unit_id: i64 },

    /// The unit cannot be translated.
    #[error("unit {unit_id} is read-only")]
    ReadOnlyUnit { unit_id: i64 },

    /// Component is locked against edits.
    #[error("component {component} is locked")]
    ComponentLocked { component: String },

    /// No component matches the selection.
    #[error("component not found: {0}")]
    UnknownComponent(String),

    /// Linked repository reference is malformed.
    #[error("invalid linked repository '{0}', expected link://<project>/<component>")]
    InvalidLink(String),
}

// --- Addon Errors ---

/// Addon errors.
#[derive(Debug, Error)]
pub enum AddonError {
    /// No addon registered under this name.
    #[error("unknown addon: {0}")]
    UnknownAddon(String),

    /// Configuration rejected by the addon.
    #[error("invalid configuration for {addon}: {message}")]
    InvalidConfiguration { addon: String, message: String },

    /// Addon cannot be installed on the component.
    #[error("{addon} is not compatible with {component}")]
    Incompatible { addon: String, component: String },

    /// Addon is already installed and may only be installed once.
    #[error("{addon} is already installed on {component}")]
    AlreadyInstalled { addon: String, component: String },

    /// Addon execution failed.
    #[error("{addon} failed: {message}")]
    Failed {
        addon: String,
        message: String,
        output: String,
    },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// Configuration file not found.
    #[error("config file not found: {0}")]
    NotFound(String),
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Process exited with a code outside the success set.
    #[error("process '{command}' exited with code {code}")]
    NonZeroExit {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    /// Process timed out.
    #[error("process '{command}' timed out after {timeout_secs} seconds")]
    Timeout { command: String, timeout_secs: u64 },

    /// Waiting on or writing to the process failed.
    #[error("i/o error talking to process '{command}': {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

// --- Network Errors ---

/// Network operation errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// HTTP error response.
    #[error("http error {status}: {url}: {body}")]
    HttpError {
        status: u16,
        url: String,
        body: String,
    },

    /// Error from reqwest library.
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

// --- Filesystem Errors ---

/// Filesystem operation errors.
#[derive(Debug, Error)]
pub enum FsError {
    /// Path not found.
    #[error("path not found: {0}")]
    NotFound(String),

    /// General I/O error.
    #[error("I/O error on '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    /// I/O error on a path.
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests;
