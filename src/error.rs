//! Error types for preset operations.
//!
//! This module defines [`PresetError`], the primary error type used throughout
//! the engine, the per-stage error kinds it wraps, and a [`Result`] type alias.
//!
//! # Error Handling Strategy
//!
//! - Resolution and load failures ([`ResolutionError`], [`ImportError`]) abort a
//!   run before any file is touched
//! - Action failures carry the identity of the failing action
//! - Every variant renders as one line; wrapped causes are reachable through
//!   [`std::error::Error::source`] and only printed in verbose output

use std::path::PathBuf;
use thiserror::Error;

use crate::actions::ActionType;

/// Core error type for preset operations.
#[derive(Debug, Error)]
pub enum PresetError {
    /// The preset identifier could not be turned into a local path.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The preset definition could not be loaded.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// No handler is registered for the action's type.
    #[error("No handler registered for action type '{kind}' (action #{index})")]
    ActionDispatch { index: usize, kind: ActionType },

    /// A handler failed while applying an action.
    #[error("{} failed", action_label(.index, .kind, .title))]
    Handler {
        index: usize,
        kind: ActionType,
        title: Option<String>,
        #[source]
        source: HandlerError,
    },

    /// The preset's `actions` could not be computed.
    #[error("Could not plan actions for preset '{preset}'")]
    Plan {
        preset: String,
        #[source]
        source: anyhow::Error,
    },

    /// A `${...}` expression could not be resolved.
    #[error("Cannot interpolate '{input}': {message}")]
    Interpolation { input: String, message: String },

    /// An option value does not match the preset's option schema.
    #[error("Invalid value for option '{name}': {message}")]
    InvalidOption { name: String, message: String },

    /// A settings file could not be parsed.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// A prompt was required but no answer could be obtained.
    #[error("Cannot prompt for '{key}' in non-interactive mode (no default value)")]
    PromptUnavailable { key: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn action_label(index: &usize, kind: &ActionType, title: &Option<String>) -> String {
    match title {
        Some(title) => format!("Action #{} ({}, \"{}\")", index, kind, title),
        None => format!("Action #{} ({})", index, kind),
    }
}

/// Failure to turn a preset identifier into a path that holds a preset.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Every strategy declined the identifier.
    #[error("Could not resolve preset '{identifier}'")]
    NoStrategyMatched { identifier: String },

    /// A path-like identifier points at nothing.
    #[error("Preset path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// The resolved path is a file, not a directory.
    #[error("Preset path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// The directory holds no preset entry file.
    #[error("No preset.yml found in {path}")]
    MissingEntry { path: PathBuf },

    /// The identifier looks like a remote reference but is not a valid one.
    #[error("Malformed remote preset '{identifier}': {message}")]
    MalformedRemote { identifier: String, message: String },

    /// Cloning or downloading failed.
    #[error("Failed to fetch preset '{identifier}'")]
    RemoteFetch {
        identifier: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Failure to load a preset definition.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The preset file does not exist.
    #[error("Preset configuration not found: {path}")]
    NotFound { path: PathBuf },

    /// The preset file exists but could not be evaluated.
    #[error("Preset at {path} could not be evaluated")]
    Evaluation {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Failure inside a single action handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A file the action requires does not exist.
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// A required glob matched no files.
    #[error("No files matching '{pattern}' in {dir}")]
    NoMatches { pattern: String, dir: PathBuf },

    /// A glob pattern is syntactically invalid.
    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A destination path would leave the target directory.
    #[error("Path '{path}' must be relative and stay inside the target directory")]
    OutsideTarget { path: String },

    /// A structured file could not be parsed.
    #[error("Invalid JSON in {path}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A copied template could not be interpolated.
    #[error("Cannot interpolate {path}: {message}")]
    Template { path: PathBuf, message: String },

    /// A hook command exited unsuccessfully.
    #[error("Hook command failed with exit code {code:?}: {command}")]
    HookFailed { command: String, code: Option<i32> },

    /// A hook callback returned an error.
    #[error("Hook callback failed")]
    Callback(#[source] anyhow::Error),

    /// A handler was given an action of another type.
    #[error("Handler for '{expected}' cannot apply a '{found}' action")]
    UnexpectedAction {
        expected: ActionType,
        found: ActionType,
    },

    /// Asking the user about a conflict failed.
    #[error("Prompt failed: {message}")]
    Prompt { message: String },

    /// Filesystem failure on a specific path.
    #[error("IO error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HandlerError {
    /// Wrap an IO error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for preset operations.
pub type Result<T> = std::result::Result<T, PresetError>;

/// Render an error with its full cause chain, one cause per line.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\n  caused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Render an error and its causes on one line, separated by `: `.
pub fn error_summary(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
